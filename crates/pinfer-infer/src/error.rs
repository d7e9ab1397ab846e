//! Errors surfaced to callers querying the completed definition graph.
//!
//! Analysis itself never fails; these only report queries naming something
//! the graph does not contain.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferError {
    UnknownMethod { class: String, method: String },
    UnknownProperty { class: String, property: String },
    UnknownFunction(String),
}

impl std::fmt::Display for InferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferError::UnknownMethod { class, method } => {
                write!(f, "method {class}::{method}() is not defined")
            }
            InferError::UnknownProperty { class, property } => {
                write!(f, "property {class}::${property} is not defined")
            }
            InferError::UnknownFunction(name) => write!(f, "function {name}() is not defined"),
        }
    }
}

impl std::error::Error for InferError {}
