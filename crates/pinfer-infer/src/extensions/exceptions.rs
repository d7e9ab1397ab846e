//! Exceptions thrown by framework helper functions such as `abort()`.

use pinfer_ast::{Callee, Expr};
use pinfer_solver::TypeId;
use rustc_hash::FxHashMap;

use super::{ExceptionExtension, ExtensionContext};
use crate::scope::Scope;

const HTTP_EXCEPTION: &str = "Symfony\\Component\\HttpKernel\\Exception\\HttpException";

pub struct HelperExceptions {
    /// Lowercased function name to the exception class it throws.
    helpers: FxHashMap<String, String>,
}

impl HelperExceptions {
    pub fn new() -> Self {
        let mut helpers = FxHashMap::default();
        for name in ["abort", "abort_if", "abort_unless"] {
            helpers.insert(name.to_string(), HTTP_EXCEPTION.to_string());
        }
        HelperExceptions { helpers }
    }

    pub fn with_helper(mut self, function: &str, exception: &str) -> Self {
        self.helpers.insert(
            function.trim_start_matches('\\').to_ascii_lowercase(),
            exception.trim_start_matches('\\').to_string(),
        );
        self
    }
}

impl Default for HelperExceptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExceptionExtension for HelperExceptions {
    fn exceptions(&self, expr: &Expr, scope: &Scope, ctx: &ExtensionContext<'_>) -> Vec<TypeId> {
        let Expr::Call {
            callee: Callee::Name(name),
            ..
        } = expr
        else {
            return Vec::new();
        };
        let resolved = scope.resolve_function_name(name);
        let short = pinfer_ast::short_name(&resolved).to_ascii_lowercase();
        let exception = self
            .helpers
            .get(&resolved.to_ascii_lowercase())
            .or_else(|| self.helpers.get(&short));
        match exception {
            Some(class) => vec![ctx.interner().object(class)],
            None => Vec::new(),
        }
    }
}
