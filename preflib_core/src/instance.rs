use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use snafu::prelude::*;

use crate::config::*;
use crate::graph::Graph;
use crate::parser;

/// A mapping from each distinct order to the number of voters who submitted it.
pub type VoteMap = HashMap<Order, u64>;

/// The content of a PrefLib data file.
///
/// Alternatives are identified by their 1-based id, as in the file. For
/// ordinal data, `orders` lists the distinct ballots in file order and
/// `order_multiplicity` counts the voters behind each of them. Graph-shaped
/// data fills `graph` instead.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreflibInstance {
    pub file_name: String,
    pub data_type: DataType,
    pub num_alternatives: usize,
    pub alternatives_name: BTreeMap<AltId, String>,
    pub num_voters: u64,
    /// Sum of the declared weights. It differs from `num_voters` when the data
    /// was induced from another profile.
    pub sum_vote_count: u64,
    pub num_unique_order: usize,
    pub orders: Vec<Order>,
    pub order_multiplicity: HashMap<Order, u64>,
    pub graph: Option<Graph>,
    /// The untouched content of `dat` and `csv` files.
    pub raw_lines: Vec<String>,
}

impl PreflibInstance {
    pub fn empty(data_type: DataType) -> PreflibInstance {
        PreflibInstance {
            file_name: String::new(),
            data_type,
            num_alternatives: 0,
            alternatives_name: BTreeMap::new(),
            num_voters: 0,
            sum_vote_count: 0,
            num_unique_order: 0,
            orders: Vec::new(),
            order_multiplicity: HashMap::new(),
            graph: None,
            raw_lines: Vec::new(),
        }
    }

    /// Parses a file. The data type is given by the file extension.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> PreflibResult<PreflibInstance> {
        let data_type: DataType = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .parse()?;
        PreflibInstance::parse_file_as(path, data_type)
    }

    /// Parses a file with the given data type, whatever its extension.
    pub fn parse_file_as<P: AsRef<Path>>(
        path: P,
        data_type: DataType,
    ) -> PreflibResult<PreflibInstance> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        info!("Attempting to read {} file {:?}", data_type, path_str);
        let contents = fs::read_to_string(path).context(IoSnafu { path: path_str })?;
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        PreflibInstance::parse_str(&contents, data_type, &file_name)
    }

    /// Parses the content of a file whose data type is known.
    pub fn parse_str(
        contents: &str,
        data_type: DataType,
        file_name: &str,
    ) -> PreflibResult<PreflibInstance> {
        let lines: Vec<&str> = contents.lines().collect();
        let mut instance = parser::parse_lines(&lines, data_type)?;
        instance.file_name = file_name.to_string();
        Ok(instance)
    }

    pub fn kind(&self) -> DataKind {
        self.data_type.kind()
    }

    pub(crate) fn ensure_ordinal(&self, property: &'static str) -> PreflibResult<()> {
        ensure!(
            self.kind() == DataKind::Ordinal,
            PropertyNotApplicableSnafu {
                property,
                data_type: self.data_type
            }
        );
        Ok(())
    }

    /// The orders mapped to their multiplicity.
    pub fn vote_map(&self) -> VoteMap {
        self.order_multiplicity.clone()
    }

    /// Every order, repeated as many times as its multiplicity.
    pub fn full_profile(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter().flat_map(move |order| {
            let count = self.multiplicity(order);
            std::iter::repeat(order).take(count as usize)
        })
    }

    pub fn multiplicity(&self, order: &Order) -> u64 {
        self.order_multiplicity.get(order).copied().unwrap_or(0)
    }

    /// Strict orders as plain sequences of alternatives, with their multiplicity.
    ///
    /// Fails on the first order that has an indifference class of size other
    /// than one.
    pub fn flatten_strict(&self) -> PreflibResult<Vec<(Vec<AltId>, u64)>> {
        self.ensure_ordinal("flatten_strict")?;
        let mut res: Vec<(Vec<AltId>, u64)> = Vec::with_capacity(self.orders.len());
        for order in self.orders.iter() {
            ensure!(
                order.iter().all(|c| c.len() == 1),
                NotStrictSnafu {
                    order: order.clone()
                }
            );
            let flat: Vec<AltId> = order.iter().map(|c| c[0]).collect();
            res.push((flat, self.multiplicity(order)));
        }
        Ok(res)
    }

    /// The most restrictive ordinal type consistent with all the orders.
    pub fn infer_type(&self) -> DataType {
        let strict = self.orders.iter().all(|o| o.iter().all(|c| c.len() == 1));
        let complete = self
            .orders
            .iter()
            .all(|o| o.iter().map(|c| c.len()).sum::<usize>() == self.num_alternatives);
        DataType::from_ordinal_flags(strict, complete)
    }

    /// Adds a list of orders, each one standing for a single voter.
    pub fn append_order_list(&mut self, orders: &[Order]) -> PreflibResult<()> {
        self.append_vote_map(orders.iter().map(|o| (o.clone(), 1)))
    }

    /// Adds weighted orders to the profile.
    ///
    /// The alternatives are numbered from 1 to the largest id seen so far.
    /// Ids that were never named are registered as `Alternative <id>` and the
    /// data type is inferred again from the whole profile. Nothing is added
    /// when one of the orders is malformed.
    pub fn append_vote_map<I>(&mut self, vote_map: I) -> PreflibResult<()>
    where
        I: IntoIterator<Item = (Order, u64)>,
    {
        self.ensure_ordinal("append_vote_map")?;
        let votes: Vec<(Order, u64)> = vote_map.into_iter().collect();
        for (order, _) in votes.iter() {
            check_order(order)?;
        }
        let largest = votes
            .iter()
            .flat_map(|(order, _)| order.iter().flatten())
            .chain(self.alternatives_name.keys())
            .map(|alt| *alt as usize)
            .max()
            .unwrap_or(0);
        self.num_alternatives = self.num_alternatives.max(largest);
        for alt in 1..=self.num_alternatives as AltId {
            self.alternatives_name
                .entry(alt)
                .or_insert_with(|| format!("Alternative {}", alt));
        }
        for (order, multiplicity) in votes {
            match self.order_multiplicity.get_mut(&order) {
                Some(m) => *m += multiplicity,
                None => {
                    self.order_multiplicity.insert(order.clone(), multiplicity);
                    self.orders.push(order);
                }
            }
            self.num_voters += multiplicity;
            self.sum_vote_count += multiplicity;
        }
        self.num_unique_order = self.order_multiplicity.len();
        self.data_type = self.infer_type();
        debug!(
            "append_vote_map: {} voters, {} unique orders, inferred type {}",
            self.num_voters, self.num_unique_order, self.data_type
        );
        Ok(())
    }

    /// For every alternative, the number of alternatives ranked strictly
    /// below it, summed over all the voters.
    pub fn borda_scores(&self) -> PreflibResult<BTreeMap<AltId, u64>> {
        self.ensure_ordinal("borda_scores")?;
        let mut scores: BTreeMap<AltId, u64> =
            self.alternatives_name.keys().map(|alt| (*alt, 0)).collect();
        for order in self.orders.iter() {
            let multiplicity = self.multiplicity(order);
            let mut below: u64 = order.iter().map(|c| c.len() as u64).sum();
            for class in order.iter() {
                below -= class.len() as u64;
                for alt in class.iter() {
                    *scores.entry(*alt).or_insert(0) += below * multiplicity;
                }
            }
        }
        Ok(scores)
    }

    /// `tally[(a, b)]` is the number of voters ranking `a` strictly above `b`.
    /// Unranked alternatives are below all the ranked ones.
    pub fn pairwise_tally(&self) -> PreflibResult<HashMap<(AltId, AltId), u64>> {
        self.ensure_ordinal("pairwise_tally")?;
        let alternatives: Vec<AltId> = self.alternatives_name.keys().copied().collect();
        let mut tally: HashMap<(AltId, AltId), u64> = HashMap::new();
        for order in self.orders.iter() {
            let multiplicity = self.multiplicity(order);
            let rank: HashMap<AltId, usize> = order
                .iter()
                .enumerate()
                .flat_map(|(idx, class)| class.iter().map(move |alt| (*alt, idx)))
                .collect();
            for &a in alternatives.iter() {
                for &b in alternatives.iter() {
                    let above = match (rank.get(&a), rank.get(&b)) {
                        (Some(ra), Some(rb)) => ra < rb,
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if above {
                        *tally.entry((a, b)).or_insert(0) += multiplicity;
                    }
                }
            }
        }
        Ok(tally)
    }

    /// Derives a graph instance from an ordinal profile.
    ///
    /// A `wmg` has an edge `a -> b` weighted by the strictly positive margin of
    /// `a` over `b`. A `pwg` has an edge `a -> b` weighted by the number of
    /// voters preferring `a` to `b`, when that number is not zero.
    pub fn pairwise_graph(&self, data_type: DataType) -> PreflibResult<PreflibInstance> {
        ensure!(
            matches!(data_type, DataType::Wmg | DataType::Pwg),
            UnsupportedFormatSnafu {
                data_type: data_type.extension()
            }
        );
        let tally = self.pairwise_tally()?;
        let mut graph = Graph::new();
        for alt in self.alternatives_name.keys() {
            graph.add_node(*alt);
        }
        for (&(a, b), &count) in tally.iter() {
            let weight = match data_type {
                DataType::Wmg => count as i64 - tally.get(&(b, a)).copied().unwrap_or(0) as i64,
                _ => count as i64,
            };
            if weight > 0 {
                graph.add_edge(a, b, weight);
            }
        }

        let mut res = PreflibInstance::empty(data_type);
        res.file_name = self.file_name.clone();
        res.num_alternatives = self.num_alternatives;
        res.alternatives_name = self.alternatives_name.clone();
        res.num_voters = self.num_voters;
        res.sum_vote_count = self.sum_vote_count;
        res.num_unique_order = graph.num_edges();
        res.graph = Some(graph);
        Ok(res)
    }
}

/// The ballot rules of the file format: at least one class, no empty class,
/// ids from 1 and no alternative ranked twice.
fn check_order(order: &Order) -> PreflibResult<()> {
    ensure!(
        !order.is_empty(),
        InvalidOrderSnafu {
            order: order.clone(),
            reason: "empty ballot"
        }
    );
    let mut seen: HashSet<AltId> = HashSet::new();
    for class in order.iter() {
        ensure!(
            !class.is_empty(),
            InvalidOrderSnafu {
                order: order.clone(),
                reason: "empty indifference class"
            }
        );
        for &alt in class.iter() {
            ensure!(
                alt >= 1,
                InvalidOrderSnafu {
                    order: order.clone(),
                    reason: "alternative ids start at 1"
                }
            );
            ensure!(
                seen.insert(alt),
                RepeatedAlternativeSnafu {
                    order: order.clone(),
                    alternative: alt
                }
            );
        }
    }
    Ok(())
}
