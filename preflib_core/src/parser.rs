// Line-oriented reader for the PrefLib text format.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::ParseIntError;
use std::str::FromStr;

use log::{debug, warn};
use snafu::prelude::*;

use crate::config::*;
use crate::graph::Graph;
use crate::instance::PreflibInstance;

/// The non-blank lines of a file, with their 1-based line numbers.
struct LineCursor<'a> {
    lines: Vec<(usize, &'a str)>,
    pos: usize,
    last_line: usize,
}

impl<'a> LineCursor<'a> {
    fn new<S: AsRef<str>>(raw: &'a [S]) -> LineCursor<'a> {
        let lines: Vec<(usize, &'a str)> = raw
            .iter()
            .enumerate()
            .map(|(idx, l)| (idx + 1, l.as_ref().trim_start_matches('\u{feff}').trim()))
            .filter(|(_, l)| !l.is_empty())
            .collect();
        LineCursor {
            lines,
            pos: 0,
            last_line: raw.len(),
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        let res = self.lines.get(self.pos).copied().context(MissingLineSnafu {
            line: self.last_line + 1,
            expected,
        })?;
        self.pos += 1;
        Ok(res)
    }

    fn remaining(&mut self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        let start = self.pos;
        self.pos = self.lines.len();
        self.lines[start..].iter().copied()
    }
}

fn parse_int<T>(line: usize, value: &str) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse::<T>()
        .context(InvalidIntegerSnafu { line, value })
}

fn split_fields(line: usize, text: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = text.split(',').map(|f| f.trim()).collect();
    ensure!(
        fields.len() == expected,
        FieldCountSnafu {
            line,
            expected,
            found: fields.len()
        }
    );
    Ok(fields)
}

fn parse_alternative(
    line: usize,
    value: &str,
    num_alternatives: usize,
) -> Result<AltId, ParseError> {
    let alternative: u64 = parse_int(line, value)?;
    ensure!(
        alternative >= 1 && alternative <= num_alternatives as u64,
        AlternativeOutOfRangeSnafu {
            line,
            alternative,
            num_alternatives
        }
    );
    Ok(alternative as AltId)
}

fn parse_alternative_names(
    cursor: &mut LineCursor,
    num_alternatives: usize,
) -> Result<BTreeMap<AltId, String>, ParseError> {
    let mut names: BTreeMap<AltId, String> = BTreeMap::new();
    for _ in 0..num_alternatives {
        let (line, text) = cursor.next_line("an alternative name")?;
        // Names may contain commas, only the first one separates the id.
        let (id_str, name) = text.split_once(',').context(FieldCountSnafu {
            line,
            expected: 2usize,
            found: 1usize,
        })?;
        let alternative = parse_alternative(line, id_str, num_alternatives)?;
        ensure!(
            !names.contains_key(&alternative),
            DuplicateAlternativeIdSnafu { line, alternative }
        );
        names.insert(alternative, name.trim().to_string());
    }
    Ok(names)
}

/// Reads `<num_voters>,<sum_vote_count>,<num_unique_order>`.
fn parse_counts(cursor: &mut LineCursor) -> Result<(u64, u64, usize), ParseError> {
    let (line, text) = cursor.next_line("the voter counts")?;
    let fields = split_fields(line, text, 3)?;
    Ok((
        parse_int(line, fields[0])?,
        parse_int(line, fields[1])?,
        parse_int(line, fields[2])?,
    ))
}

/// Reads the tokens of a ballot, after the multiplicity.
///
/// A bare integer is a singleton class. A tie group spans the tokens from one
/// starting with `{` to the next one ending with `}`.
pub(crate) fn parse_ballot_tokens<'a, I>(
    line: usize,
    tokens: I,
    num_alternatives: usize,
) -> Result<Order, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Order = Vec::new();
    let mut seen: HashSet<AltId> = HashSet::new();
    let mut group: Option<IndifClass> = None;
    for raw_token in tokens {
        let token = raw_token.trim();
        ensure!(!token.is_empty(), EmptyTokenSnafu { line });
        let (opens, rest) = match token.strip_prefix('{') {
            Some(r) => (true, r),
            None => (false, token),
        };
        let (closes, body) = match rest.strip_suffix('}') {
            Some(b) => (true, b),
            None => (false, rest),
        };
        if opens {
            ensure!(group.is_none(), NestedTieGroupSnafu { line, token });
            group = Some(Vec::new());
        } else if closes {
            ensure!(group.is_some(), UnopenedTieGroupSnafu { line, token });
        }
        ensure!(!body.is_empty(), EmptyTokenSnafu { line });
        let alternative = parse_alternative(line, body, num_alternatives)?;
        ensure!(
            seen.insert(alternative),
            DuplicateAlternativeSnafu { line, alternative }
        );
        match group.as_mut() {
            Some(g) => g.push(alternative),
            None => order.push(vec![alternative]),
        }
        if closes {
            if let Some(g) = group.take() {
                order.push(g);
            }
        }
    }
    ensure!(group.is_none(), UnterminatedTieGroupSnafu { line });
    Ok(order)
}

fn check_ballot_shape(
    line: usize,
    order: &Order,
    data_type: DataType,
    num_alternatives: usize,
) -> Result<(), ParseError> {
    if data_type.requires_strict() {
        ensure!(
            order.iter().all(|c| c.len() == 1),
            TypeMismatchSnafu {
                line,
                data_type,
                reason: "the ballot contains a tie"
            }
        );
    }
    if data_type.requires_complete() {
        let size: usize = order.iter().map(|c| c.len()).sum();
        ensure!(
            size == num_alternatives,
            TypeMismatchSnafu {
                line,
                data_type,
                reason: "the ballot does not rank every alternative"
            }
        );
    }
    Ok(())
}

fn parse_orders(
    cursor: &mut LineCursor,
    data_type: DataType,
) -> Result<PreflibInstance, ParseError> {
    let (line, text) = cursor.next_line("the number of alternatives")?;
    let num_alternatives: usize = parse_int(line, text)?;
    let alternatives_name = parse_alternative_names(cursor, num_alternatives)?;
    let (num_voters, sum_vote_count, num_unique_order) = parse_counts(cursor)?;

    let mut orders: Vec<Order> = Vec::new();
    let mut order_multiplicity: HashMap<Order, u64> = HashMap::new();
    for (line, text) in cursor.remaining() {
        let mut elements = text.split(',');
        // split always yields at least one element
        let multiplicity: u64 = parse_int(line, elements.next().unwrap_or_default())?;
        let order = parse_ballot_tokens(line, elements, num_alternatives)?;
        check_ballot_shape(line, &order, data_type, num_alternatives)?;
        if let Some(m) = order_multiplicity.get_mut(&order) {
            warn!(
                "parse_orders: line {}: order {:?} already seen, merging multiplicities",
                line, order
            );
            *m += multiplicity;
        } else {
            order_multiplicity.insert(order.clone(), multiplicity);
            orders.push(order);
        }
    }

    let found: u64 = order_multiplicity.values().sum();
    ensure!(
        found == num_voters,
        VoterCountSnafu {
            declared: num_voters,
            found
        }
    );
    ensure!(
        orders.len() == num_unique_order,
        UniqueOrderCountSnafu {
            declared: num_unique_order,
            found: orders.len()
        }
    );
    debug!(
        "parse_orders: {} alternatives, {} voters, {} unique orders",
        num_alternatives, num_voters, num_unique_order
    );

    let mut instance = PreflibInstance::empty(data_type);
    instance.num_alternatives = num_alternatives;
    instance.alternatives_name = alternatives_name;
    instance.num_voters = num_voters;
    instance.sum_vote_count = sum_vote_count;
    instance.num_unique_order = num_unique_order;
    instance.orders = orders;
    instance.order_multiplicity = order_multiplicity;
    Ok(instance)
}

fn parse_graph(
    cursor: &mut LineCursor,
    data_type: DataType,
) -> Result<PreflibInstance, ParseError> {
    let is_matching = data_type.kind() == DataKind::Matching;
    let mut instance = PreflibInstance::empty(data_type);

    // Weighted matching data puts the number of voters on the first line.
    let (line, text) = cursor.next_line("the number of alternatives")?;
    if is_matching {
        let fields = split_fields(line, text, 2)?;
        instance.num_alternatives = parse_int(line, fields[0])?;
        instance.num_voters = parse_int(line, fields[1])?;
    } else {
        instance.num_alternatives = parse_int(line, text)?;
    }
    let num_alternatives = instance.num_alternatives;
    instance.alternatives_name = parse_alternative_names(cursor, num_alternatives)?;
    if !is_matching {
        let (num_voters, sum_vote_count, num_unique_order) = parse_counts(cursor)?;
        instance.num_voters = num_voters;
        instance.sum_vote_count = sum_vote_count;
        instance.num_unique_order = num_unique_order;
    }

    let mut graph = Graph::new();
    for alt in 1..=num_alternatives {
        graph.add_node(alt as AltId);
    }
    for (line, text) in cursor.remaining() {
        let fields = split_fields(line, text, 3)?;
        if is_matching {
            let tail = parse_alternative(line, fields[0], num_alternatives)?;
            let head = parse_alternative(line, fields[1], num_alternatives)?;
            let weight: i64 = parse_int(line, fields[2])?;
            graph.add_edge(tail, head, weight);
            graph.add_edge(head, tail, weight);
        } else {
            let weight: i64 = parse_int(line, fields[0])?;
            let tail = parse_alternative(line, fields[1], num_alternatives)?;
            let head = parse_alternative(line, fields[2], num_alternatives)?;
            graph.add_edge(tail, head, weight);
        }
    }
    debug!(
        "parse_graph: {} nodes, {} edges",
        graph.num_nodes(),
        graph.num_edges()
    );
    instance.graph = Some(graph);
    Ok(instance)
}

/// Parses the lines of a PrefLib file whose data type is already known.
pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    data_type: DataType,
) -> Result<PreflibInstance, ParseError> {
    let mut cursor = LineCursor::new(lines);
    match data_type.kind() {
        DataKind::Ordinal => parse_orders(&mut cursor, data_type),
        DataKind::Graph | DataKind::Matching => parse_graph(&mut cursor, data_type),
        DataKind::Passthrough => {
            let mut instance = PreflibInstance::empty(data_type);
            instance.raw_lines = lines.iter().map(|l| l.as_ref().to_string()).collect();
            Ok(instance)
        }
    }
}
