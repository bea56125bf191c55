//! PromQL label injection
//!
//! This crate rewrites PromQL expressions so that every aggregation and every
//! binary operation with an explicit `on (...)` matching clause carries a
//! given label. It is meant to be plugged into a templating or evaluation
//! engine as a single native function.
//!
//! # Architecture
//!
//! ```text
//! PromQL String → Parser → AST (Expr) → Walker(LabelInjector) → Printer → PromQL String
//! ```
//!
//! # Modules
//!
//! - [`parser`] - PromQL parsing and printing using the promql-parser crate
//! - [`walker`] - Generic pre-order traversal over a mutable AST
//! - [`inject`] - The label injection rewrite rules
//! - [`native`] - Native function descriptor for hosting engines
//! - [`config`] - Configuration loading
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! let rewritten = rewriter::label_inject("sum(rate(foo[5m]))", "cluster").unwrap();
//! assert_eq!(rewritten, "sum by (cluster) (rate(foo[5m]))");
//! ```

pub mod config;
pub mod error;
pub mod inject;
pub mod native;
pub mod parser;
pub mod walker;

pub use error::RewriteError;
pub use inject::{LabelInjector, inject_label};
pub use native::NativeFunction;

/// Rewrite `expression` so that every aggregation and every `on (...)`
/// binary operation includes `label`.
///
/// The returned text is whatever the PromQL printer produces for the mutated
/// tree, so spacing and clause layout are canonicalized.
pub fn label_inject(expression: &str, label: &str) -> Result<String, RewriteError> {
    let mut expr = parser::parse(expression)?;
    inject_label(&mut expr, label);
    Ok(parser::print(&expr))
}
