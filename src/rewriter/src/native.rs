//! Native function descriptor for hosting engines
//!
//! Templating and evaluation engines expose host functions by name with a
//! fixed parameter list and JSON-like values. [`NativeFunction`] describes the
//! label injection rewrite in those terms so an engine can register it
//! alongside its own functions.

use std::fmt;

use serde_json::Value;

use crate::error::RewriteError;

/// Name the label injection function is exposed under by default
pub const FUNC_PROMQL_AGGREGATE_BY: &str = "promqlAggregateBy";

type NativeFn = fn(&[&str]) -> Result<String, RewriteError>;

/// A host-callable function taking string arguments and returning a string
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    params: &'static [&'static str],
    func: NativeFn,
}

impl NativeFunction {
    /// The label injection rewrite, registered as `promqlAggregateBy(expr, label)`
    pub fn label_inject() -> Self {
        Self::with_name(FUNC_PROMQL_AGGREGATE_BY)
    }

    /// The label injection rewrite, registered under a custom name
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: &["expr", "label"],
            func: |args| crate::label_inject(args[0], args[1]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[&'static str] {
        self.params
    }

    /// Invoke the function with engine-supplied arguments.
    ///
    /// Arity and argument types are checked before the underlying function
    /// runs; every parameter must be a JSON string.
    pub fn call(&self, args: &[Value]) -> Result<Value, RewriteError> {
        if args.len() != self.params.len() {
            return Err(RewriteError::ArgumentCount {
                function: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }

        let strings = args
            .iter()
            .zip(self.params)
            .map(|(arg, param)| {
                arg.as_str().ok_or_else(|| RewriteError::ArgumentType {
                    function: self.name.clone(),
                    param: param.to_string(),
                    expected: "string",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(function = %self.name, "calling native function");
        (self.func)(&strings).map(Value::String)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(", "))
    }
}
