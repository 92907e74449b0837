//! The catalog of properties, addressed by their short names.

use std::fmt::Display;
use std::str::FromStr;

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::instance::PreflibInstance;
use crate::properties;
use crate::single_crossing::is_single_crossing;
use crate::single_peaked::is_single_peaked;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Property {
    NumAlternatives,
    NumVoters,
    SumVoteCount,
    NumUniqueOrders,
    IsStrict,
    IsComplete,
    IsApproval,
    IsSinglePeaked,
    IsSingleCrossing,
    LargestBallot,
    SmallestBallot,
    MaxNumIndif,
    MinNumIndif,
    LargestIndif,
    SmallestIndif,
    HasCondorcet,
}

impl Property {
    pub const ALL: [Property; 16] = [
        Property::NumAlternatives,
        Property::NumVoters,
        Property::SumVoteCount,
        Property::NumUniqueOrders,
        Property::IsStrict,
        Property::IsComplete,
        Property::IsApproval,
        Property::IsSinglePeaked,
        Property::IsSingleCrossing,
        Property::LargestBallot,
        Property::SmallestBallot,
        Property::MaxNumIndif,
        Property::MinNumIndif,
        Property::LargestIndif,
        Property::SmallestIndif,
        Property::HasCondorcet,
    ];

    pub fn short_name(&self) -> &'static str {
        match self {
            Property::NumAlternatives => "numAlt",
            Property::NumVoters => "numVot",
            Property::SumVoteCount => "sumVot",
            Property::NumUniqueOrders => "numUniq",
            Property::IsStrict => "isStrict",
            Property::IsComplete => "isComplete",
            Property::IsApproval => "isApproval",
            Property::IsSinglePeaked => "isSP",
            Property::IsSingleCrossing => "isSC",
            Property::LargestBallot => "largestBallot",
            Property::SmallestBallot => "smallestBallot",
            Property::MaxNumIndif => "maxNumIndif",
            Property::MinNumIndif => "minNumIndif",
            Property::LargestIndif => "largestIndif",
            Property::SmallestIndif => "smallestIndif",
            Property::HasCondorcet => "hasCondorcet",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Property::NumAlternatives => "Number of alternatives",
            Property::NumVoters => "Number of voters",
            Property::SumVoteCount => "Sum of vote count",
            Property::NumUniqueOrders => "Number of unique orders",
            Property::IsStrict => "Strict orders",
            Property::IsComplete => "Complete orders",
            Property::IsApproval => "Approval profile",
            Property::IsSinglePeaked => "Single-peaked",
            Property::IsSingleCrossing => "Single-crossing",
            Property::LargestBallot => "Size of the largest ballot",
            Property::SmallestBallot => "Size of the smallest ballot",
            Property::MaxNumIndif => "Maximum number of indifferences",
            Property::MinNumIndif => "Minimum number of indifferences",
            Property::LargestIndif => "Size of the largest indifference",
            Property::SmallestIndif => "Size of the smallest indifference",
            Property::HasCondorcet => "Has a Condorcet winner",
        }
    }

    /// The data types the property can be computed on.
    pub fn applies_to(&self) -> &'static [DataType] {
        match self {
            Property::NumAlternatives
            | Property::NumVoters
            | Property::SumVoteCount
            | Property::NumUniqueOrders => &DataType::ALL,
            Property::IsSinglePeaked | Property::IsSingleCrossing => &[DataType::Soc],
            Property::HasCondorcet => &DataType::GRAPH,
            _ => &DataType::ORDINAL,
        }
    }

    pub fn applies(&self, data_type: DataType) -> bool {
        self.applies_to().contains(&data_type)
    }

    /// The properties that can be computed on a data type, in catalog order.
    pub fn applicable(data_type: DataType) -> Vec<Property> {
        Property::ALL
            .iter()
            .copied()
            .filter(|p| p.applies(data_type))
            .collect()
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for Property {
    type Err = PreflibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .iter()
            .find(|p| p.short_name() == s.trim())
            .copied()
            .context(UnknownPropertySnafu { name: s })
    }
}

/// The value of a property.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PropertyValue {
    Count(u64),
    Flag(bool),
    /// The result of the single-peakedness test: an axis, or `None` when the
    /// profile is not single-peaked.
    Axis(Option<Vec<AltId>>),
}

impl PropertyValue {
    /// The value seen as a yes/no answer, if it is one.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Count(_) => None,
            PropertyValue::Flag(b) => Some(*b),
            PropertyValue::Axis(axis) => Some(axis.is_some()),
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Count(c) => write!(f, "{}", c),
            PropertyValue::Flag(b) => write!(f, "{}", b),
            PropertyValue::Axis(None) => write!(f, "false"),
            PropertyValue::Axis(Some(axis)) => {
                let axis: Vec<String> = axis.iter().map(|a| a.to_string()).collect();
                write!(f, "[{}]", axis.join(","))
            }
        }
    }
}

/// Computes one property of an instance.
pub fn compute_property(
    property: Property,
    instance: &PreflibInstance,
    config: &PropertyConfig,
) -> PreflibResult<PropertyValue> {
    ensure!(
        property.applies(instance.data_type),
        PropertyNotApplicableSnafu {
            property: property.short_name(),
            data_type: instance.data_type
        }
    );
    debug!(
        "compute_property: {} on {:?}",
        property, instance.file_name
    );
    let count = |c: usize| PropertyValue::Count(c as u64);
    let res = match property {
        Property::NumAlternatives => count(properties::num_alternatives(instance)),
        Property::NumVoters => PropertyValue::Count(properties::num_voters(instance)),
        Property::SumVoteCount => PropertyValue::Count(properties::sum_vote_count(instance)),
        Property::NumUniqueOrders => count(properties::num_unique_orders(instance)),
        Property::IsStrict => PropertyValue::Flag(properties::is_strict(instance)?),
        Property::IsComplete => PropertyValue::Flag(properties::is_complete(instance)?),
        Property::IsApproval => PropertyValue::Flag(properties::is_approval(instance)?),
        Property::IsSinglePeaked => {
            PropertyValue::Axis(is_single_peaked(instance, &config.single_peaked)?)
        }
        Property::IsSingleCrossing => PropertyValue::Flag(is_single_crossing(instance)?),
        Property::LargestBallot => count(properties::largest_ballot(instance)?),
        Property::SmallestBallot => count(properties::smallest_ballot(instance)?),
        Property::MaxNumIndif => count(properties::max_num_indif(instance)?),
        Property::MinNumIndif => count(properties::min_num_indif(instance)?),
        Property::LargestIndif => count(properties::largest_indif(instance)?),
        Property::SmallestIndif => count(properties::smallest_indif(instance)?),
        Property::HasCondorcet => PropertyValue::Flag(properties::has_condorcet(instance)?),
    };
    Ok(res)
}

/// Computes every property that applies to the instance.
///
/// Properties that fail (for instance on an empty profile) are returned with
/// their error so that the caller can decide to skip them.
pub fn compute_all(
    instance: &PreflibInstance,
    config: &PropertyConfig,
) -> Vec<(Property, PreflibResult<PropertyValue>)> {
    Property::applicable(instance.data_type)
        .into_iter()
        .map(|p| (p, compute_property(p, instance, config)))
        .collect()
}
