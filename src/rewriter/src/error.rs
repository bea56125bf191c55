//! Error types for label injection

/// Errors that can occur while rewriting a PromQL expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// The input text is not a valid PromQL expression
    #[error("invalid PromQL expression: {message}")]
    InvalidExpression {
        /// Diagnostic reported by the parser
        message: String,
    },
    /// A native function was called with the wrong number of arguments
    #[error("function '{function}' expects {expected} arguments, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },
    /// A native function argument has the wrong type
    #[error("function '{function}': parameter '{param}' must be a {expected}")]
    ArgumentType {
        function: String,
        param: String,
        expected: &'static str,
    },
}

impl RewriteError {
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            message: message.into(),
        }
    }
}
