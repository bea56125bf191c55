//! PromQL parser wrapper
//!
//! This module provides a thin wrapper around the promql-parser crate with
//! rewriter-specific error handling. Parsing and printing are delegated
//! entirely to promql-parser; this module makes no formatting decisions.

use promql_parser::parser::{self, Expr};

use crate::error::RewriteError;

/// Parse a PromQL query string into an AST expression
///
/// # Arguments
/// * `query` - The PromQL query string to parse
///
/// # Returns
/// The parsed expression AST, or an [`RewriteError::InvalidExpression`]
/// carrying the parser's diagnostic verbatim
///
/// # Examples
/// ```
/// use rewriter::parser::parse;
///
/// let expr = parse("rate(http_requests_total[5m])").unwrap();
/// let expr = parse("sum by (job)(rate(http_requests_total[5m]))").unwrap();
/// ```
pub fn parse(query: &str) -> Result<Expr, RewriteError> {
    parser::parse(query).map_err(|e| {
        tracing::debug!(query, error = %e, "failed to parse PromQL expression");
        RewriteError::invalid_expression(e)
    })
}

/// Check if a query string is syntactically valid
pub fn validate(query: &str) -> Result<(), RewriteError> {
    parse(query).map(|_| ())
}

/// Render an expression back to canonical PromQL text
pub fn print(expr: &Expr) -> String {
    expr.to_string()
}
