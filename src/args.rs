use clap::Parser;

/// This program reads PrefLib data files and computes their metadata.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file listing the data files and the properties to compute.
    /// For more information about the file format, read the manual of preflib_core.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing an expected summary in JSON format. If provided, preflib will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, repeatable) A data file to read. Setting this option overrides the files that may be
    /// listed with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (default: the file extension) The data type of the inputs, for example soc or pwg.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (list of comma-separated short names or not specified) The properties to compute, for example
    /// numAlt,isSP. All the properties that apply to a file are computed when not specified.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub meta: Vec<String>,

    /// If passed as an argument, runs the consistency checks on every file and reports the issues.
    #[clap(long, takes_value = false)]
    pub check: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
