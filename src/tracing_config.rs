//! Tracing setup for inspecting an inference run.
//!
//! Output format is chosen by `PINFER_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`, which follows one
//!   definition's analysis and resolution nicely
//! - `json`: one JSON object per event
//!
//! ```bash
//! PINFER_LOG=debug PINFER_LOG_FORMAT=tree cargo test --test scenarios
//! PINFER_LOG="pinfer_infer::resolver=trace" cargo test --test scenarios
//! ```
//!
//! Nothing is installed unless `PINFER_LOG` or `RUST_LOG` is set.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("PINFER_LOG_FORMAT").unwrap_or_default())
    }
}

/// `PINFER_LOG` wins over `RUST_LOG`; both use `RUST_LOG` syntax.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(value) = std::env::var("PINFER_LOG") {
        return Some(EnvFilter::builder().parse_lossy(value));
    }
    std::env::var("RUST_LOG")
        .is_ok()
        .then(EnvFilter::from_default_env)
}

/// Install the global subscriber, writing to stderr.
///
/// Safe to call more than once; only the first call with logging requested
/// installs anything.
pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };
    INIT.call_once(|| match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            let _ = Registry::default().with(filter).with(tree_layer).try_init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            let _ = Registry::default().with(filter).with(json_layer).try_init();
        }
        LogFormat::Text => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("verbose"), LogFormat::Text);
    }
}
