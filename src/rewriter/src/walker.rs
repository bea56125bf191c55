//! Generic pre-order traversal over a mutable PromQL AST
//!
//! The walker knows how to enumerate the children of every [`Expr`] variant
//! and nothing else. What happens at each node is decided by the supplied
//! [`ExprVisitorMut`], which may mutate the node in place before its children
//! are visited.

use promql_parser::parser::Expr;

/// Per-node callback invoked by [`walk_mut`]
pub trait ExprVisitorMut {
    type Error;

    /// Visit a single node. Returning an error stops the traversal.
    fn visit(&mut self, expr: &mut Expr) -> Result<(), Self::Error>;
}

impl<F, E> ExprVisitorMut for F
where
    F: FnMut(&mut Expr) -> Result<(), E>,
{
    type Error = E;

    fn visit(&mut self, expr: &mut Expr) -> Result<(), E> {
        self(expr)
    }
}

/// Visit every node reachable from `expr` exactly once, parent before children.
///
/// Children are visited after the visitor has returned for their parent, so
/// any mutation of the parent is observed by the traversal. The first error
/// returned by the visitor aborts the walk and is propagated unchanged.
pub fn walk_mut<V>(visitor: &mut V, expr: &mut Expr) -> Result<(), V::Error>
where
    V: ExprVisitorMut + ?Sized,
{
    tracing::trace!(kind = kind(expr), "visiting node");
    visitor.visit(expr)?;
    for child in children_mut(expr) {
        walk_mut(visitor, child)?;
    }
    Ok(())
}

/// The direct children of `expr`, in source order.
pub fn children_mut(expr: &mut Expr) -> Vec<&mut Expr> {
    match expr {
        Expr::Aggregate(agg) => {
            let mut children = Vec::with_capacity(2);
            if let Some(param) = agg.param.as_deref_mut() {
                children.push(param);
            }
            children.push(agg.expr.as_mut());
            children
        }
        Expr::Binary(bin) => vec![bin.lhs.as_mut(), bin.rhs.as_mut()],
        Expr::Paren(paren) => vec![paren.expr.as_mut()],
        Expr::Unary(unary) => vec![unary.expr.as_mut()],
        Expr::Subquery(sq) => vec![sq.expr.as_mut()],
        Expr::Call(call) => call.args.args.iter_mut().map(|arg| arg.as_mut()).collect(),
        Expr::VectorSelector(_)
        | Expr::MatrixSelector(_)
        | Expr::NumberLiteral(_)
        | Expr::StringLiteral(_)
        | Expr::Extension(_) => Vec::new(),
    }
}

/// Short name of the node kind, for logging
pub fn kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Aggregate(_) => "aggregate",
        Expr::Binary(_) => "binary",
        Expr::Paren(_) => "paren",
        Expr::Unary(_) => "unary",
        Expr::Subquery(_) => "subquery",
        Expr::Call(_) => "call",
        Expr::VectorSelector(_) => "vector_selector",
        Expr::MatrixSelector(_) => "matrix_selector",
        Expr::NumberLiteral(_) => "number",
        Expr::StringLiteral(_) => "string",
        Expr::Extension(_) => "extension",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::convert::Infallible;

    fn visit_order(query: &str) -> Vec<&'static str> {
        let mut expr = parse(query).unwrap();
        let mut seen = Vec::new();
        walk_mut(
            &mut |e: &mut Expr| -> Result<(), Infallible> {
                seen.push(kind(e));
                Ok(())
            },
            &mut expr,
        )
        .unwrap();
        seen
    }

    #[test]
    fn test_walk_is_pre_order() {
        let seen = visit_order("sum(rate(foo[5m])) + 1");
        assert_eq!(
            seen,
            vec!["binary", "aggregate", "call", "matrix_selector", "number"]
        );
    }

    #[test]
    fn test_walk_visits_aggregate_param_before_inner() {
        let seen = visit_order("topk(3, foo)");
        assert_eq!(seen, vec!["aggregate", "number", "vector_selector"]);
    }

    #[test]
    fn test_walk_enters_paren_unary_and_subquery() {
        let seen = visit_order("-(max_over_time(rate(foo[5m])[30m:1m]))");
        assert_eq!(
            seen,
            vec!["unary", "paren", "call", "subquery", "call", "matrix_selector"]
        );
    }

    #[test]
    fn test_walk_visits_every_call_argument() {
        let seen = visit_order("histogram_quantile(0.9, sum by (le) (rate(foo[5m])))");
        assert_eq!(
            seen,
            vec!["call", "number", "aggregate", "call", "matrix_selector"]
        );
    }

    #[test]
    fn test_walk_stops_on_first_error() {
        let mut expr = parse("sum(foo) + max(bar)").unwrap();
        let mut visited = 0;
        let result = walk_mut(
            &mut |e: &mut Expr| {
                visited += 1;
                if matches!(e, Expr::Aggregate(_)) {
                    return Err("stop");
                }
                Ok(())
            },
            &mut expr,
        );
        assert_eq!(result, Err("stop"));
        // binary root, then the first aggregate; nothing below or beside it
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_walk_descends_into_mutated_node() {
        let mut expr = parse("foo").unwrap();
        let mut seen = Vec::new();
        let mut replaced = false;
        walk_mut(
            &mut |e: &mut Expr| -> Result<(), Infallible> {
                seen.push(kind(e));
                if !replaced {
                    replaced = true;
                    *e = parse("sum(bar)").unwrap();
                }
                Ok(())
            },
            &mut expr,
        )
        .unwrap();
        assert_eq!(seen, vec!["vector_selector", "vector_selector"]);
        assert!(matches!(expr, Expr::Aggregate(_)));
    }
}
