//! Label injection rewrite rules
//!
//! [`LabelInjector`] is an [`ExprVisitorMut`] that makes sure a label takes
//! part in every aggregation's grouping and in every binary operation that
//! matches `on (...)` an explicit label set. Only the node being visited is
//! inspected, so the result does not depend on traversal order.
//!
//! | Node                         | Rewrite                                        |
//! |------------------------------|------------------------------------------------|
//! | `agg without (...)`          | remove the label from the list                 |
//! | `agg by (...)` / no clause   | append the label unless already listed         |
//! | `a op on (...) b`            | append to `on` unless in `on` or `group_x`     |
//! | `a op ignoring (...) b`      | untouched                                      |
//! | `a op b`                     | untouched                                      |

use std::convert::Infallible;

use promql_parser::label::Labels;
use promql_parser::parser::{AggregateExpr, BinaryExpr, Expr, LabelModifier, VectorMatchCardinality};

use crate::walker::{ExprVisitorMut, walk_mut};

/// Injects a single label into aggregations and `on (...)` matchings
#[derive(Debug, Clone, Copy)]
pub struct LabelInjector<'a> {
    label: &'a str,
}

impl<'a> LabelInjector<'a> {
    pub fn new(label: &'a str) -> Self {
        Self { label }
    }

    pub fn label(&self) -> &'a str {
        self.label
    }

    /// Rewrite the grouping clause of an aggregation.
    ///
    /// Returns `true` if the node was changed. The `by`/`without` mode is
    /// never switched; a missing clause is treated as an empty `by ()`.
    pub fn rewrite_aggregate(&self, agg: &mut AggregateExpr) -> bool {
        let label = self.label;
        let modifier = agg
            .modifier
            .get_or_insert_with(|| LabelModifier::Include(Labels { labels: Vec::new() }));

        match modifier {
            LabelModifier::Exclude(excluded) => {
                let before = excluded.labels.len();
                excluded.labels.retain(|l| l != label);
                excluded.labels.len() != before
            }
            LabelModifier::Include(grouping) => {
                if grouping.labels.iter().any(|l| l == label) {
                    return false;
                }
                grouping.labels.push(label.to_string());
                true
            }
        }
    }

    /// Rewrite the vector matching of a binary operation.
    ///
    /// Returns `true` if the node was changed. Only `on (...)` matching is
    /// touched; the label goes to the `on` list, never to `group_left` or
    /// `group_right`.
    pub fn rewrite_binary(&self, bin: &mut BinaryExpr) -> bool {
        let label = self.label;
        let Some(modifier) = bin.modifier.as_mut() else {
            return false;
        };
        let Some(LabelModifier::Include(matching)) = modifier.matching.as_mut() else {
            return false;
        };

        let included: &[String] = match &modifier.card {
            VectorMatchCardinality::ManyToOne(ls) | VectorMatchCardinality::OneToMany(ls) => {
                &ls.labels
            }
            _ => &[],
        };

        if matching.labels.iter().chain(included).any(|l| l == label) {
            return false;
        }
        matching.labels.push(label.to_string());
        true
    }
}

impl ExprVisitorMut for LabelInjector<'_> {
    type Error = Infallible;

    fn visit(&mut self, expr: &mut Expr) -> Result<(), Infallible> {
        let changed = match expr {
            Expr::Aggregate(agg) => self.rewrite_aggregate(agg),
            Expr::Binary(bin) => self.rewrite_binary(bin),
            _ => false,
        };
        if changed {
            tracing::debug!(label = self.label, "injected label into {}", crate::walker::kind(expr));
        }
        Ok(())
    }
}

/// Inject `label` into every aggregation and `on (...)` matching of `expr`.
pub fn inject_label(expr: &mut Expr, label: &str) {
    let mut injector = LabelInjector::new(label);
    match walk_mut(&mut injector, expr) {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, print};

    fn rewrite(query: &str, label: &str) -> String {
        let mut expr = parse(query).unwrap();
        inject_label(&mut expr, label);
        print(&expr)
    }

    fn first_aggregate(expr: &mut Expr) -> &mut AggregateExpr {
        match expr {
            Expr::Aggregate(agg) => agg,
            other => panic!("Expected aggregate, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_without_clause_gets_by() {
        assert_eq!(rewrite("sum(foo)", "cluster"), "sum by (cluster) (foo)");
    }

    #[test]
    fn test_aggregate_by_appends_last() {
        assert_eq!(
            rewrite("sum by (job, instance) (foo)", "cluster"),
            "sum by (job, instance, cluster) (foo)"
        );
    }

    #[test]
    fn test_aggregate_by_already_present() {
        let mut expr = parse("sum by (cluster, job) (foo)").unwrap();
        let injector = LabelInjector::new("cluster");
        assert!(!injector.rewrite_aggregate(first_aggregate(&mut expr)));
        assert_eq!(print(&expr), "sum by (cluster, job) (foo)");
    }

    #[test]
    fn test_aggregate_without_removes_label() {
        let mut expr = parse("sum without (bar, cluster, baz) (foo)").unwrap();
        let injector = LabelInjector::new("cluster");
        assert!(injector.rewrite_aggregate(first_aggregate(&mut expr)));
        assert_eq!(print(&expr), "sum without (bar, baz) (foo)");
    }

    #[test]
    fn test_aggregate_without_keeps_mode() {
        let mut expr = parse("sum without (bar) (foo)").unwrap();
        let injector = LabelInjector::new("cluster");
        let agg = first_aggregate(&mut expr);
        assert!(!injector.rewrite_aggregate(agg));
        assert!(matches!(agg.modifier, Some(LabelModifier::Exclude(_))));
    }

    #[test]
    fn test_parameterized_aggregate() {
        assert_eq!(
            rewrite("quantile(0.9, foo)", "cluster"),
            "quantile by (cluster) (0.9, foo)"
        );
    }

    #[test]
    fn test_binary_on_appends_to_matching() {
        assert_eq!(rewrite("foo * on (job) bar", "cluster"), "foo * on (job, cluster) bar");
    }

    #[test]
    fn test_binary_on_with_set_operator() {
        assert_eq!(rewrite("foo and on (job) bar", "cluster"), "foo and on (job, cluster) bar");
    }

    #[test]
    fn test_binary_on_label_in_group_right() {
        assert_eq!(
            rewrite("foo / on (job) group_right (cluster) bar", "cluster"),
            "foo / on (job) group_right (cluster) bar"
        );
    }

    #[test]
    fn test_binary_on_label_already_matched() {
        assert_eq!(
            rewrite("foo - on (cluster) bar", "cluster"),
            "foo - on (cluster) bar"
        );
    }

    #[test]
    fn test_binary_default_matching_untouched() {
        assert_eq!(rewrite("foo + bar", "cluster"), "foo + bar");
        assert_eq!(rewrite("foo > bool bar", "cluster"), "foo > bool bar");
    }

    #[test]
    fn test_binary_ignoring_untouched() {
        assert_eq!(
            rewrite("foo * ignoring (job) bar", "cluster"),
            "foo * ignoring (job) bar"
        );
    }

    #[test]
    fn test_nested_aggregations_in_call_and_subquery() {
        assert_eq!(
            rewrite("max_over_time(sum(rate(foo[5m]))[1h:5m])", "cluster"),
            "max_over_time(sum by (cluster) (rate(foo[5m]))[1h:5m])"
        );
    }

    #[test]
    fn test_inject_is_idempotent() {
        let query = "sum(max(foo) * on (bar) group_left (baz) topk(1, max(qux))) > 0";
        let once = rewrite(query, "cluster");
        assert_eq!(rewrite(&once, "cluster"), once);
    }

    #[test]
    fn test_injector_visit_is_infallible_on_other_nodes() {
        let mut expr = parse("rate(foo[5m])").unwrap();
        let mut injector = LabelInjector::new("cluster");
        assert!(injector.visit(&mut expr).is_ok());
        assert_eq!(print(&expr), "rate(foo[5m])");
    }
}
