use std::collections::HashMap;

use snafu::prelude::*;

use crate::config::*;
use crate::instance::PreflibInstance;

/// A builder for ordinal instances.
///
/// Alternatives are registered by name and receive the ids 1, 2, ... in
/// the order they are given. Ballots can then be added by name or by id.
///
/// ```
/// use preflib_core::builder::InstanceBuilder;
/// # use preflib_core::PreflibError;
///
/// let mut builder = InstanceBuilder::new()
///     .alternatives(&["Anna".to_string(), "Bob".to_string()]);
///
/// builder.add_vote_simple(&["Bob".to_string(), "Anna".to_string()])?;
/// builder.add_vote(&[vec!["Anna".to_string(), "Bob".to_string()]], 3)?;
///
/// let instance = builder.build()?;
/// assert_eq!(instance.num_voters, 4);
/// assert_eq!(instance.data_type, preflib_core::DataType::Toc);
/// # Ok::<(), PreflibError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstanceBuilder {
    names: Vec<String>,
    votes: Vec<(Order, u64)>,
}

impl InstanceBuilder {
    pub fn new() -> InstanceBuilder {
        InstanceBuilder::default()
    }

    pub fn alternatives(self, names: &[String]) -> InstanceBuilder {
        InstanceBuilder {
            names: names.to_vec(),
            votes: self.votes,
        }
    }

    fn lookup(&self) -> HashMap<&str, AltId> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), (idx + 1) as AltId))
            .collect()
    }

    /// Adds a strict ballot cast by a single voter.
    pub fn add_vote_simple(&mut self, names: &[String]) -> PreflibResult<()> {
        let classes: Vec<Vec<String>> = names.iter().map(|n| vec![n.clone()]).collect();
        self.add_vote(&classes, 1)
    }

    /// Adds a ballot given as indifference classes of names, with a weight.
    pub fn add_vote(&mut self, classes: &[Vec<String>], count: u64) -> PreflibResult<()> {
        let lookup = self.lookup();
        let mut order: Order = Vec::with_capacity(classes.len());
        for class in classes {
            let mut ids: IndifClass = Vec::with_capacity(class.len());
            for name in class {
                let id = lookup
                    .get(name.as_str())
                    .context(UnknownAlternativeSnafu { name: name.clone() })?;
                ids.push(*id);
            }
            order.push(ids);
        }
        self.add_order(&order, count);
        Ok(())
    }

    /// Adds a ballot given by alternative ids.
    pub fn add_order(&mut self, order: &Order, count: u64) {
        self.votes.push((order.clone(), count));
    }

    pub fn build(self) -> PreflibResult<PreflibInstance> {
        let mut instance = PreflibInstance::empty(DataType::Soc);
        instance.alternatives_name = self
            .names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| ((idx + 1) as AltId, name))
            .collect();
        instance.num_alternatives = instance.alternatives_name.len();
        instance.append_vote_map(self.votes)?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_strict_profile() {
        let mut builder = InstanceBuilder::new().alternatives(&names(&["A", "B", "C"]));
        builder.add_vote_simple(&names(&["A", "B", "C"])).unwrap();
        builder.add_vote_simple(&names(&["C", "B", "A"])).unwrap();
        builder.add_vote_simple(&names(&["A", "B", "C"])).unwrap();
        let instance = builder.build().unwrap();
        assert_eq!(instance.data_type, DataType::Soc);
        assert_eq!(instance.num_voters, 3);
        assert_eq!(instance.num_unique_order, 2);
        assert_eq!(instance.orders[0], vec![vec![1], vec![2], vec![3]]);
        assert_eq!(instance.multiplicity(&instance.orders[0]), 2);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut builder = InstanceBuilder::new().alternatives(&names(&["A"]));
        let res = builder.add_vote_simple(&names(&["Z"]));
        assert!(matches!(
            res,
            Err(PreflibError::UnknownAlternative { name }) if name == "Z"
        ));
    }

    #[test]
    fn unnamed_alternatives_get_default_names() {
        let mut builder = InstanceBuilder::new();
        builder.add_order(&vec![vec![2], vec![1]], 4);
        let instance = builder.build().unwrap();
        assert_eq!(instance.num_alternatives, 2);
        assert_eq!(instance.alternatives_name[&1], "Alternative 1");
    }

    #[test]
    fn ids_beyond_the_names_extend_the_profile() {
        let mut builder = InstanceBuilder::new().alternatives(&names(&["A", "B"]));
        builder.add_order(&vec![vec![1], vec![5]], 1);
        let instance = builder.build().unwrap();
        assert_eq!(instance.num_alternatives, 5);
        assert_eq!(instance.alternatives_name[&2], "B");
        assert_eq!(instance.alternatives_name[&4], "Alternative 4");

        let written = instance.to_preflib_string();
        let reparsed = PreflibInstance::parse_str(&written, instance.data_type, "").unwrap();
        assert_eq!(reparsed.orders, instance.orders);
        assert_eq!(reparsed.num_alternatives, 5);
    }

    #[test]
    fn sparse_ids_are_not_single_peaked_input() {
        let mut builder = InstanceBuilder::new().alternatives(&names(&["A", "B", "C"]));
        builder.add_order(&vec![vec![5], vec![1], vec![2]], 1);
        let instance = builder.build().unwrap();
        assert_eq!(instance.data_type, DataType::Soi);
        let res = crate::single_peaked::is_single_peaked(&instance, &SinglePeakedConfig::DEFAULT);
        assert!(matches!(
            res,
            Err(PreflibError::PropertyNotApplicable { .. })
        ));
    }

    #[test]
    fn malformed_orders_fail_the_build() {
        let mut builder = InstanceBuilder::new();
        builder.add_order(&vec![vec![1], vec![1]], 1);
        assert!(matches!(
            builder.build(),
            Err(PreflibError::RepeatedAlternative { .. })
        ));
    }

    #[test]
    fn incomplete_ballots_change_the_type() {
        let mut builder = InstanceBuilder::new().alternatives(&names(&["A", "B", "C"]));
        builder.add_vote_simple(&names(&["A"])).unwrap();
        assert_eq!(builder.build().unwrap().data_type, DataType::Soi);
    }
}
