//! Descriptive properties of an instance.
//!
//! All the functions only read the instance. Calling a function on a data
//! type it does not apply to returns [PreflibError::PropertyNotApplicable].

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::instance::PreflibInstance;

pub fn num_alternatives(instance: &PreflibInstance) -> usize {
    instance.num_alternatives
}

pub fn num_voters(instance: &PreflibInstance) -> u64 {
    instance.num_voters
}

pub fn sum_vote_count(instance: &PreflibInstance) -> u64 {
    instance.sum_vote_count
}

pub fn num_unique_orders(instance: &PreflibInstance) -> usize {
    instance.num_unique_order
}

fn ballot_size(order: &Order) -> usize {
    order.iter().map(|c| c.len()).sum()
}

fn num_ties(order: &Order) -> usize {
    order.iter().filter(|c| c.len() > 1).count()
}

fn ballot_sizes<'a>(
    instance: &'a PreflibInstance,
    property: &'static str,
) -> PreflibResult<impl Iterator<Item = usize> + 'a> {
    instance.ensure_ordinal(property)?;
    ensure!(!instance.orders.is_empty(), EmptyProfileSnafu);
    Ok(instance.orders.iter().map(ballot_size))
}

/// The largest number of alternatives ranked by a single ballot.
pub fn largest_ballot(instance: &PreflibInstance) -> PreflibResult<usize> {
    Ok(ballot_sizes(instance, "largestBallot")?.max().unwrap_or(0))
}

/// The smallest number of alternatives ranked by a single ballot.
pub fn smallest_ballot(instance: &PreflibInstance) -> PreflibResult<usize> {
    Ok(ballot_sizes(instance, "smallestBallot")?.min().unwrap_or(0))
}

/// The largest number of ties (indifference classes with more than one
/// alternative) in a single ballot. 0 for an empty profile.
pub fn max_num_indif(instance: &PreflibInstance) -> PreflibResult<usize> {
    instance.ensure_ordinal("maxNumIndif")?;
    Ok(instance.orders.iter().map(num_ties).max().unwrap_or(0))
}

/// The smallest number of ties in a single ballot. 0 for an empty profile.
pub fn min_num_indif(instance: &PreflibInstance) -> PreflibResult<usize> {
    instance.ensure_ordinal("minNumIndif")?;
    Ok(instance.orders.iter().map(num_ties).min().unwrap_or(0))
}

fn tie_sizes<'a>(
    instance: &'a PreflibInstance,
    property: &'static str,
) -> PreflibResult<impl Iterator<Item = usize> + 'a> {
    instance.ensure_ordinal(property)?;
    Ok(instance
        .orders
        .iter()
        .flat_map(|o| o.iter().map(|c| c.len()))
        .filter(|size| *size > 1))
}

/// The size of the largest tie of the profile, 0 if there is no tie.
pub fn largest_indif(instance: &PreflibInstance) -> PreflibResult<usize> {
    Ok(tie_sizes(instance, "largestIndif")?.max().unwrap_or(0))
}

/// The size of the smallest tie of the profile, 0 if there is no tie.
pub fn smallest_indif(instance: &PreflibInstance) -> PreflibResult<usize> {
    Ok(tie_sizes(instance, "smallestIndif")?.min().unwrap_or(0))
}

pub fn is_strict(instance: &PreflibInstance) -> PreflibResult<bool> {
    Ok(largest_indif(instance)? == 0)
}

pub fn is_complete(instance: &PreflibInstance) -> PreflibResult<bool> {
    Ok(smallest_ballot(instance)? == instance.num_alternatives)
}

/// Approval data: every ballot is a single class of approved alternatives,
/// or every ballot splits all the alternatives into approved and
/// disapproved.
pub fn is_approval(instance: &PreflibInstance) -> PreflibResult<bool> {
    instance.ensure_ordinal("isApproval")?;
    ensure!(!instance.orders.is_empty(), EmptyProfileSnafu);
    let max_classes = instance.orders.iter().map(|o| o.len()).max().unwrap_or(0);
    match max_classes {
        // Only empty ballots: nothing was approved.
        0 => Ok(false),
        1 => Ok(true),
        2 => is_complete(instance),
        _ => Ok(false),
    }
}

/// Whether a graph instance has a Condorcet winner.
///
/// For tournaments and (weighted) majority graphs, a winner has an edge to
/// every other node. For pairwise graphs, a winner `n` needs, for every other
/// node `m`, an edge `n -> m` whose weight is at least the weight of `m -> n`
/// when that reverse edge exists.
pub fn has_condorcet(instance: &PreflibInstance) -> PreflibResult<bool> {
    ensure!(
        instance.kind() == DataKind::Graph,
        PropertyNotApplicableSnafu {
            property: "hasCondorcet",
            data_type: instance.data_type
        }
    );
    let graph = match instance.graph.as_ref() {
        Some(g) => g,
        None => return Ok(false),
    };
    let num_nodes = graph.num_nodes();
    let winner = if instance.data_type == DataType::Pwg {
        graph.nodes().find(|&n| {
            graph.nodes().filter(|&m| m != n).all(|m| {
                match (graph.weight(n, m), graph.weight(m, n)) {
                    (Some(_), None) => true,
                    (Some(forward), Some(backward)) => forward >= backward,
                    _ => false,
                }
            })
        })
    } else {
        graph.nodes().find(|&n| {
            graph
                .neighbours(n)
                .map(|heads| heads.iter().filter(|&&h| h != n).count() == num_nodes - 1)
                .unwrap_or(false)
        })
    };
    debug!("has_condorcet: winner {:?}", winner);
    Ok(winner.is_some())
}
