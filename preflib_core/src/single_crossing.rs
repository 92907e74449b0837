use std::collections::{BTreeSet, HashMap};

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::instance::PreflibInstance;

type ConflictSet = BTreeSet<(AltId, AltId)>;

fn ranks(order: &[AltId]) -> HashMap<AltId, usize> {
    order.iter().enumerate().map(|(i, a)| (*a, i)).collect()
}

/// The pairs `(a, b)`, `a < b`, ordered differently by the two orders.
fn conflict_set(first: &[AltId], second: &HashMap<AltId, usize>) -> ConflictSet {
    let mut res = ConflictSet::new();
    for (i, &a) in first.iter().enumerate() {
        for &b in first[i + 1..].iter() {
            // `a` is above `b` in the first order.
            if second.get(&a) > second.get(&b) {
                res.insert((a.min(b), a.max(b)));
            }
        }
    }
    res
}

fn nested(a: &ConflictSet, b: &ConflictSet) -> bool {
    a.is_subset(b) || b.is_subset(a)
}

/// Checks whether a `soc` profile is single-crossing.
///
/// The distinct orders are single-crossing when one of them, taken as
/// reference, has conflict sets with all the others that form a chain for
/// inclusion. Multiplicities play no role.
///
/// For `V` distinct orders over `A` alternatives this takes `O(V^3 A^2)` in
/// the worst case, which is only practical for small profiles.
pub fn is_single_crossing(instance: &PreflibInstance) -> PreflibResult<bool> {
    ensure!(
        instance.data_type == DataType::Soc,
        PropertyNotApplicableSnafu {
            property: "isSC",
            data_type: instance.data_type
        }
    );
    ensure!(!instance.orders.is_empty(), EmptyProfileSnafu);
    let orders: Vec<Vec<AltId>> = instance
        .flatten_strict()?
        .into_iter()
        .map(|(order, _)| order)
        .collect();
    let rank_maps: Vec<HashMap<AltId, usize>> = orders.iter().map(|o| ranks(o)).collect();

    for (i, reference) in orders.iter().enumerate() {
        let conflicts: Vec<ConflictSet> = rank_maps
            .iter()
            .map(|other| conflict_set(reference, other))
            .collect();
        let chain = conflicts
            .iter()
            .enumerate()
            .all(|(j, cj)| conflicts[j + 1..].iter().all(|ck| nested(cj, ck)));
        if chain {
            debug!("is_single_crossing: order {} is a valid reference", i);
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::InstanceBuilder;
    use proptest::prelude::*;

    fn strict(orders: &[Vec<AltId>]) -> PreflibInstance {
        let mut builder = InstanceBuilder::new();
        for order in orders {
            let order: Order = order.iter().map(|a| vec![*a]).collect();
            builder.add_order(&order, 1);
        }
        builder.build().unwrap()
    }

    #[test]
    fn conflicts() {
        let reference = vec![1, 2, 3];
        assert!(conflict_set(&reference, &ranks(&[1, 2, 3])).is_empty());
        let c = conflict_set(&reference, &ranks(&[3, 1, 2]));
        assert_eq!(c.into_iter().collect::<Vec<_>>(), vec![(1, 3), (2, 3)]);
    }

    #[test]
    fn crossing_profile() {
        // Each pair swaps once along the list.
        let instance = strict(&[
            vec![1, 2, 3, 4],
            vec![2, 1, 3, 4],
            vec![2, 3, 1, 4],
            vec![3, 2, 4, 1],
            vec![4, 3, 2, 1],
        ]);
        assert!(is_single_crossing(&instance).unwrap());
    }

    #[test]
    fn not_crossing() {
        let chain = strict(&[vec![1, 2, 3, 4], vec![2, 1, 3, 4], vec![2, 1, 4, 3]]);
        assert!(is_single_crossing(&chain).unwrap());

        // Every reference sees the swaps of {1, 2} and {3, 4} separately.
        let square = strict(&[
            vec![1, 2, 3, 4],
            vec![2, 1, 3, 4],
            vec![1, 2, 4, 3],
            vec![2, 1, 4, 3],
        ]);
        assert!(!is_single_crossing(&square).unwrap());

        let cyclic = strict(&[vec![1, 2, 3], vec![2, 3, 1], vec![3, 1, 2]]);
        assert!(!is_single_crossing(&cyclic).unwrap());
    }

    #[test]
    fn single_order() {
        assert!(is_single_crossing(&strict(&[vec![2, 1, 3]])).unwrap());
    }

    #[test]
    fn only_strict_complete_profiles() {
        let mut instance = PreflibInstance::empty(DataType::Toc);
        instance.append_order_list(&[vec![vec![1, 2]]]).unwrap();
        assert!(matches!(
            is_single_crossing(&instance),
            Err(PreflibError::PropertyNotApplicable { property: "isSC", .. })
        ));
    }

    fn arb_profile() -> impl Strategy<Value = Vec<Vec<AltId>>> {
        let order = Just((1..=4).collect::<Vec<AltId>>()).prop_shuffle();
        prop::collection::vec(order, 1..6)
    }

    proptest! {
        #[test]
        fn reversing_every_order(orders in arb_profile()) {
            let reversed: Vec<Vec<AltId>> = orders
                .iter()
                .map(|o| o.iter().rev().copied().collect())
                .collect();
            let forward = is_single_crossing(&strict(&orders)).unwrap();
            let backward = is_single_crossing(&strict(&reversed)).unwrap();
            prop_assert_eq!(forward, backward);
        }
    }
}
