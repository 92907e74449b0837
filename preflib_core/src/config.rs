// ********* Data model ***********

use std::fmt::Display;
use std::num::ParseIntError;
use std::str::FromStr;

use snafu::prelude::*;

/// Identifier of an alternative, exactly as written in the file (1-based).
pub type AltId = u32;

/// A set of alternatives ranked equally by a voter.
pub type IndifClass = Vec<AltId>;

/// A ballot: indifference classes from the most to the least preferred.
pub type Order = Vec<IndifClass>;

/// The family a data type belongs to. It decides which parser, writer and
/// properties apply to an instance.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum DataKind {
    /// Orders with possible ties: `soc`, `soi`, `toc`, `toi`.
    Ordinal,
    /// Tournament, majority, weighted majority and pairwise graphs.
    Graph,
    /// Weighted matching data (`wmd`).
    Matching,
    /// Files the core does not interpret (`dat`, `csv`).
    Passthrough,
}

/// All the data types a PrefLib file can declare through its extension.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum DataType {
    /// Strict orders, complete
    Soc,
    /// Strict orders, incomplete
    Soi,
    /// Orders with ties, complete
    Toc,
    /// Orders with ties, incomplete
    Toi,
    /// Tournament graph
    Tog,
    /// Majority graph
    Mjg,
    /// Weighted majority graph
    Wmg,
    /// Pairwise graph
    Pwg,
    /// Weighted matching data
    Wmd,
    Dat,
    Csv,
}

impl DataType {
    pub const ALL: [DataType; 11] = [
        DataType::Soc,
        DataType::Soi,
        DataType::Toc,
        DataType::Toi,
        DataType::Tog,
        DataType::Mjg,
        DataType::Wmg,
        DataType::Pwg,
        DataType::Wmd,
        DataType::Dat,
        DataType::Csv,
    ];

    pub const ORDINAL: [DataType; 4] = [DataType::Soc, DataType::Soi, DataType::Toc, DataType::Toi];

    pub const GRAPH: [DataType; 4] = [DataType::Tog, DataType::Mjg, DataType::Wmg, DataType::Pwg];

    pub fn extension(&self) -> &'static str {
        match self {
            DataType::Soc => "soc",
            DataType::Soi => "soi",
            DataType::Toc => "toc",
            DataType::Toi => "toi",
            DataType::Tog => "tog",
            DataType::Mjg => "mjg",
            DataType::Wmg => "wmg",
            DataType::Pwg => "pwg",
            DataType::Wmd => "wmd",
            DataType::Dat => "dat",
            DataType::Csv => "csv",
        }
    }

    pub fn kind(&self) -> DataKind {
        match self {
            DataType::Soc | DataType::Soi | DataType::Toc | DataType::Toi => DataKind::Ordinal,
            DataType::Tog | DataType::Mjg | DataType::Wmg | DataType::Pwg => DataKind::Graph,
            DataType::Wmd => DataKind::Matching,
            DataType::Dat | DataType::Csv => DataKind::Passthrough,
        }
    }

    /// For ordinal types, whether every ballot must be a strict order.
    pub fn requires_strict(&self) -> bool {
        matches!(self, DataType::Soc | DataType::Soi)
    }

    /// For ordinal types, whether every ballot must rank all the alternatives.
    pub fn requires_complete(&self) -> bool {
        matches!(self, DataType::Soc | DataType::Toc)
    }

    /// The most restrictive ordinal type for a profile with the given shape.
    pub fn from_ordinal_flags(strict: bool, complete: bool) -> DataType {
        match (strict, complete) {
            (true, true) => DataType::Soc,
            (true, false) => DataType::Soi,
            (false, true) => DataType::Toc,
            (false, false) => DataType::Toi,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for DataType {
    type Err = PreflibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_lowercase();
        match DataType::ALL.iter().find(|dt| dt.extension() == lower) {
            Some(dt) => Ok(*dt),
            None => UnsupportedFormatSnafu { data_type: s }.fail(),
        }
    }
}

// ******** Errors *********

/// Format violations found while reading a PrefLib file.
///
/// Line numbers are 1-based, as shown by any text editor.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("line {line}: missing line, expected {expected}"))]
    MissingLine { line: usize, expected: &'static str },

    #[snafu(display("line {line}: {value:?} is not a valid integer"))]
    InvalidInteger {
        line: usize,
        value: String,
        source: ParseIntError,
    },

    #[snafu(display("line {line}: expected {expected} comma-separated fields, found {found}"))]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[snafu(display(
        "line {line}: alternative {alternative} is outside of [1, {num_alternatives}]"
    ))]
    AlternativeOutOfRange {
        line: usize,
        alternative: u64,
        num_alternatives: usize,
    },

    #[snafu(display("line {line}: alternative {alternative} appears several times in the ballot"))]
    DuplicateAlternative { line: usize, alternative: AltId },

    #[snafu(display("line {line}: alternative {alternative} is named twice"))]
    DuplicateAlternativeId { line: usize, alternative: AltId },

    #[snafu(display("line {line}: tie group opened but never closed"))]
    UnterminatedTieGroup { line: usize },

    #[snafu(display("line {line}: tie group opened inside another one at {token:?}"))]
    NestedTieGroup { line: usize, token: String },

    #[snafu(display("line {line}: {token:?} closes a tie group that was never opened"))]
    UnopenedTieGroup { line: usize, token: String },

    #[snafu(display("line {line}: empty token"))]
    EmptyToken { line: usize },

    #[snafu(display("header declares {declared} voters but the ballots count {found}"))]
    VoterCount { declared: u64, found: u64 },

    #[snafu(display("header declares {declared} unique orders but the file has {found}"))]
    UniqueOrderCount { declared: usize, found: usize },

    #[snafu(display("line {line}: ballot is not allowed in a {data_type} file: {reason}"))]
    TypeMismatch {
        line: usize,
        data_type: DataType,
        reason: &'static str,
    },
}

/// Errors reported by the parser, the writer and the property engine.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PreflibError {
    #[snafu(context(false), display("{source}"))]
    Parse { source: ParseError },

    #[snafu(display("data type {data_type:?} is unknown to PrefLib"))]
    UnsupportedFormat { data_type: String },

    #[snafu(display("property {property} does not apply to {data_type} data"))]
    PropertyNotApplicable {
        property: &'static str,
        data_type: DataType,
    },

    #[snafu(display("the SAT search gave up after {decisions} decisions"))]
    SolverTimeout { decisions: u64 },

    #[snafu(display("the profile does not contain any ballot"))]
    EmptyProfile {},

    #[snafu(display("cannot flatten the non-strict order {order:?}"))]
    NotStrict { order: Order },

    #[snafu(display("unknown property {name:?}"))]
    UnknownProperty { name: String },

    #[snafu(display("unknown alternative {name:?}"))]
    UnknownAlternative { name: String },

    #[snafu(display("invalid order {order:?}: {reason}"))]
    InvalidOrder { order: Order, reason: &'static str },

    #[snafu(display("alternative {alternative} appears several times in the order {order:?}"))]
    RepeatedAlternative { order: Order, alternative: AltId },

    #[snafu(display("{num_alternatives} alternatives are too many for the SAT encoding"))]
    TooManyAlternatives { num_alternatives: usize },

    #[snafu(display("I/O error on {path}"))]
    Io {
        source: std::io::Error,
        path: String,
    },
}

pub type PreflibResult<T> = Result<T, PreflibError>;

// ********* Configuration **********

/// The SAT backend used by the single-peakedness search.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SolverChoice {
    /// Conflict-driven clause learning, through `varisat`.
    Cdcl,
    /// The small built-in DPLL search. It is the only backend honouring
    /// [SinglePeakedConfig::max_decisions].
    Dpll,
}

impl SolverChoice {
    pub fn name(&self) -> &'static str {
        match self {
            SolverChoice::Cdcl => "cdcl",
            SolverChoice::Dpll => "dpll",
        }
    }
}

impl Display for SolverChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Bounds for the single-peakedness search.
///
/// The consecutive-ones SAT instance is first built on `initial_columns`
/// alternatives, then grown by `column_step` alternatives as long as it stays
/// satisfiable.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SinglePeakedConfig {
    pub initial_columns: usize,
    pub column_step: usize,
    pub solver: SolverChoice,
    /// Maximum number of branching decisions for each call to the DPLL
    /// backend. `None` lets it run to completion.
    pub max_decisions: Option<u64>,
}

impl SinglePeakedConfig {
    pub const DEFAULT: SinglePeakedConfig = SinglePeakedConfig {
        initial_columns: 10,
        column_step: 5,
        solver: SolverChoice::Cdcl,
        max_decisions: None,
    };
}

impl Default for SinglePeakedConfig {
    fn default() -> Self {
        SinglePeakedConfig::DEFAULT
    }
}

/// Settings shared by all the property computations.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct PropertyConfig {
    pub single_peaked: SinglePeakedConfig,
}
