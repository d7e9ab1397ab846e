//! Per-file name resolution table: the namespace plus `use` imports.

use rustc_hash::FxHashMap;

/// Import table of one file.
///
/// Aliases are matched case-insensitively, the way PHP matches class names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NameTable {
    namespace: Option<String>,
    classes: FxHashMap<String, String>,
    functions: FxHashMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        let namespace: String = namespace.into();
        let namespace = namespace.trim_matches('\\').to_string();
        NameTable {
            namespace: (!namespace.is_empty()).then_some(namespace),
            ..Self::default()
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `use Foo\Bar;` or `use Foo\Bar as Baz;`
    pub fn add_use(&mut self, fqn: &str, alias: Option<&str>) {
        let fqn = fqn.trim_start_matches('\\');
        let alias = alias.unwrap_or_else(|| short_name(fqn));
        self.classes
            .insert(alias.to_ascii_lowercase(), fqn.to_string());
    }

    /// `use function Foo\bar;`
    pub fn add_function_use(&mut self, fqn: &str, alias: Option<&str>) {
        let fqn = fqn.trim_start_matches('\\');
        let alias = alias.unwrap_or_else(|| short_name(fqn));
        self.functions
            .insert(alias.to_ascii_lowercase(), fqn.to_string());
    }

    /// Resolve a class name as written to its fully-qualified form.
    pub fn resolve_class(&self, name: &str) -> String {
        if let Some(fully_qualified) = name.strip_prefix('\\') {
            return fully_qualified.to_string();
        }
        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(imported) = self.classes.get(&first.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{imported}\\{rest}"),
                None => imported.clone(),
            };
        }
        self.qualify(name)
    }

    /// Resolve a function name as written.
    ///
    /// Unqualified names resolve into the current namespace; callers fall back
    /// to the global function of the same short name when that misses.
    pub fn resolve_function(&self, name: &str) -> String {
        if let Some(fully_qualified) = name.strip_prefix('\\') {
            return fully_qualified.to_string();
        }
        if !name.contains('\\')
            && let Some(imported) = self.functions.get(&name.to_ascii_lowercase())
        {
            return imported.clone();
        }
        if name.contains('\\') {
            return self.resolve_class(name);
        }
        self.qualify(name)
    }

    fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}\\{name}"),
            None => name.to_string(),
        }
    }
}

/// Last segment of a qualified name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

#[cfg(test)]
#[path = "../tests/names_tests.rs"]
mod names_tests;
