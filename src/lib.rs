//! Static type inference for PHP sources.
//!
//! `pinfer` infers return, property and exception types of PHP classes and
//! functions so an OpenAPI generator can describe request and response
//! bodies. The workspace is split by layer:
//!
//! - [`common`]: string interning and limits
//! - [`ast`]: the syntax tree an external parser hands in
//! - [`solver`]: the type model, normalization and template solving
//! - [`infer`]: definitions, body analysis, resolution and extensions
//!
//! Most consumers only need [`Infer`]:
//!
//! ```
//! use pinfer::ast::builder::{function, param, ret, var};
//! use pinfer::ast::{NameTable, SourceFile};
//! use pinfer::{Infer, MemorySources};
//!
//! let identity = function("identity").param(param("a")).body(vec![ret(var("a"))]).build();
//! let file = SourceFile::new(NameTable::new()).with_function(identity);
//! let infer = Infer::new(MemorySources::new().with_file(file));
//! let ty = infer.function_type("identity").unwrap();
//! assert_eq!(infer.format(ty), "<TA>(TA): TA");
//! ```

pub use pinfer_ast as ast;
pub use pinfer_common as common;
pub use pinfer_infer as infer;
pub use pinfer_solver as solver;

pub use pinfer_infer::{
    ConfigError, ExtensionsBroker, Infer, InferError, InferOptions, MemorySources,
    SourceProvider,
};
pub use pinfer_solver::{TypeId, TypeInterner};

pub mod tracing_config;
