//! Consistency checks on instances that were built or edited in memory.
//!
//! Parsed instances pass all these checks by construction. Each check returns
//! the list of problems found, an empty list meaning the instance is sound.

use std::collections::HashSet;

use log::warn;

use crate::config::*;
use crate::instance::PreflibInstance;

fn check(condition: bool, issue: impl FnOnce() -> String, issues: &mut Vec<String>) {
    if !condition {
        let issue = issue();
        warn!("sanity: {}", issue);
        issues.push(issue);
    }
}

/// Counts in the header against the orders and the names.
pub fn basic_numbers(instance: &PreflibInstance) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();
    let i = &mut issues;

    check(
        instance.orders.len() == instance.order_multiplicity.len(),
        || {
            format!(
                "{} orders but {} multiplicities",
                instance.orders.len(),
                instance.order_multiplicity.len()
            )
        },
        i,
    );

    if instance.kind() == DataKind::Ordinal {
        let total: u64 = instance.order_multiplicity.values().sum();
        check(
            instance.num_voters == total,
            || {
                format!(
                    "{} voters but the multiplicities sum to {}",
                    instance.num_voters, total
                )
            },
            i,
        );
        check(
            instance.num_unique_order == instance.orders.len(),
            || {
                format!(
                    "{} unique orders declared but {} orders",
                    instance.num_unique_order,
                    instance.orders.len()
                )
            },
            i,
        );
    }

    let appearing: HashSet<AltId> = instance.orders.iter().flatten().flatten().copied().collect();
    check(
        appearing.len() <= instance.num_alternatives,
        || {
            format!(
                "{} alternatives appear in the orders but {} are declared",
                appearing.len(),
                instance.num_alternatives
            )
        },
        i,
    );

    check(
        instance.num_alternatives == instance.alternatives_name.len(),
        || {
            format!(
                "{} alternatives but {} names",
                instance.num_alternatives,
                instance.alternatives_name.len()
            )
        },
        i,
    );

    let names: HashSet<&String> = instance.alternatives_name.values().collect();
    check(
        names.len() == instance.alternatives_name.len(),
        || {
            format!(
                "some alternatives share a name: {} distinct names for {} alternatives",
                names.len(),
                instance.alternatives_name.len()
            )
        },
        i,
    );

    issues
}

/// Each order against the number of alternatives and the declared type.
pub fn orders(instance: &PreflibInstance) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();
    if instance.kind() != DataKind::Ordinal {
        return issues;
    }
    for (pos, order) in instance.orders.iter().enumerate() {
        let alternatives: Vec<AltId> = order.iter().flatten().copied().collect();
        let distinct: HashSet<AltId> = alternatives.iter().copied().collect();
        check(
            alternatives.len() <= instance.num_alternatives,
            || format!("order {:?} at position {} has too many alternatives", order, pos),
            &mut issues,
        );
        check(
            alternatives.len() == distinct.len(),
            || format!("order {:?} at position {} repeats alternatives", order, pos),
            &mut issues,
        );
        if instance.data_type.requires_complete() {
            check(
                distinct.len() == instance.num_alternatives,
                || format!("order {:?} at position {} is not complete", order, pos),
                &mut issues,
            );
        }
        if instance.data_type.requires_strict() {
            check(
                order.iter().all(|c| c.len() == 1),
                || format!("order {:?} at position {} is not strict", order, pos),
                &mut issues,
            );
        }
    }
    let distinct_orders: HashSet<&Order> = instance.orders.iter().collect();
    check(
        distinct_orders.len() == instance.orders.len(),
        || {
            format!(
                "some orders are listed several times: {} distinct out of {}",
                distinct_orders.len(),
                instance.orders.len()
            )
        },
        &mut issues,
    );
    issues
}

/// The declared type against the type inferred from the orders.
pub fn data_type(instance: &PreflibInstance) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();
    if instance.kind() == DataKind::Ordinal {
        let inferred = instance.infer_type();
        check(
            instance.data_type == inferred,
            || format!("data type {} should be {}", instance.data_type, inferred),
            &mut issues,
        );
    }
    issues
}

/// Runs all the checks.
pub fn check_all(instance: &PreflibInstance) -> Vec<String> {
    let mut issues = basic_numbers(instance);
    issues.extend(orders(instance));
    issues.extend(data_type(instance));
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_voters() -> PreflibInstance {
        PreflibInstance::parse_str(
            "3\n1,A\n2,B\n3,C\n3,3,2\n2,1,2,3\n1,3,2,1",
            DataType::Soc,
            "two.soc",
        )
        .unwrap()
    }

    #[test]
    fn parsed_instances_are_sound() {
        assert!(check_all(&two_voters()).is_empty());
        let graph = PreflibInstance::parse_str(
            "3\n1,A\n2,B\n3,C\n8,8,3\n3,1,2\n1,1,3\n5,2,1\n",
            DataType::Pwg,
            "",
        )
        .unwrap();
        assert!(check_all(&graph).is_empty());
    }

    #[test]
    fn edited_counts() {
        let mut instance = two_voters();
        instance.num_voters = 5;
        instance.alternatives_name.insert(3, "A".to_string());
        let issues = basic_numbers(&instance);
        assert_eq!(issues.len(), 2, "{:?}", issues);
        assert!(issues[0].contains("5 voters"));
        assert!(issues[1].contains("share a name"));
    }

    #[test]
    fn edited_orders() {
        let mut instance = two_voters();
        instance.orders.push(vec![vec![1, 2], vec![2]]);
        let issues = orders(&instance);
        assert_eq!(issues.len(), 3, "{:?}", issues);
        assert_eq!(data_type(&instance).len(), 1);
    }
}
