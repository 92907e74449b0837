use log::{debug, info, warn};

use preflib_core::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::meta::config_reader::*;

pub mod config_reader;

#[derive(Debug, Snafu)]
pub enum MetaError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid metadata request"))]
    InvalidMetadata { source: PreflibError },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Difference detected between the computed summary and the reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MetaResult<T> = Result<T, MetaError>;

/// Everything needed to summarize a list of files.
#[derive(Debug, Clone)]
pub struct MetaJob {
    pub data_files: Vec<DataFile>,
    /// Relative data file paths start from this directory.
    pub root: PathBuf,
    /// The properties to compute. Empty means all the applicable ones.
    pub properties: Vec<Property>,
    pub property_config: PropertyConfig,
    pub check: bool,
}

fn parse_properties(names: &[String]) -> MetaResult<Vec<Property>> {
    names
        .iter()
        .map(|n| n.parse::<Property>().context(InvalidMetadataSnafu {}))
        .collect()
}

fn value_to_json(value: &PropertyValue) -> JSValue {
    match value {
        PropertyValue::Count(c) => json!(c),
        PropertyValue::Flag(b) => json!(b),
        PropertyValue::Axis(Some(axis)) => json!(axis),
        PropertyValue::Axis(None) => json!(false),
    }
}

fn read_instance(path: &Path, data_type: Option<&str>) -> PreflibResult<PreflibInstance> {
    match data_type {
        Some(dt) => PreflibInstance::parse_file_as(path, dt.parse()?),
        None => PreflibInstance::parse_file(path),
    }
}

/// The summary of a single file. Parsing failures are reported in the summary
/// instead of stopping the job.
fn summarize_file(job: &MetaJob, data_file: &DataFile) -> JSValue {
    let path: PathBuf = job.root.join(&data_file.file_path);
    let instance = match read_instance(&path, data_file.data_type.as_deref()) {
        Ok(instance) => instance,
        Err(e) => {
            warn!("Skipping {:?}: {}", path.display().to_string(), e);
            return json!({ "file": data_file.file_path, "error": e.to_string() });
        }
    };

    let selected: Vec<Property> = if job.properties.is_empty() {
        Property::applicable(instance.data_type)
    } else {
        job.properties
            .iter()
            .copied()
            .filter(|p| p.applies(instance.data_type))
            .collect()
    };

    let mut properties: JSMap<String, JSValue> = JSMap::new();
    for property in selected {
        let value = match compute_property(property, &instance, &job.property_config) {
            Ok(v) => value_to_json(&v),
            Err(e) => {
                warn!("{}: cannot compute {}: {}", data_file.file_path, property, e);
                JSValue::Null
            }
        };
        debug!("{}: {} = {}", data_file.file_path, property, value);
        properties.insert(property.short_name().to_string(), value);
    }

    let mut res = json!({
        "file": data_file.file_path,
        "dataType": instance.data_type.to_string(),
        "properties": properties,
    });
    if job.check {
        res["issues"] = json!(sanity::check_all(&instance));
    }
    res
}

pub fn build_summary(job: &MetaJob) -> JSValue {
    let files: Vec<JSValue> = job
        .data_files
        .iter()
        .map(|df| summarize_file(job, df))
        .collect();
    info!("Summarized {} files", files.len());
    json!({ "files": files })
}

fn job_from_args(args: &Args) -> MetaResult<(MetaJob, OutputSettings)> {
    let (config, root) = match args.config.as_ref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (
            MetaConfig {
                output_settings: OutputSettings::default(),
                data_files: Vec::new(),
                metadata: Vec::new(),
                rules: MetaRules::default(),
            },
            PathBuf::new(),
        ),
    };

    let data_files: Vec<DataFile> = if args.input.is_empty() {
        config.data_files.clone()
    } else {
        args.input
            .iter()
            .map(|p| DataFile {
                file_path: p.clone(),
                data_type: args.input_type.clone(),
            })
            .collect()
    };
    if data_files.is_empty() {
        whatever!("No data file given: use --input or a configuration file with dataFiles");
    }
    // Files given on the command line are relative to the working directory.
    let root = if args.input.is_empty() {
        root
    } else {
        PathBuf::new()
    };

    let metadata = if args.meta.is_empty() {
        &config.metadata
    } else {
        &args.meta
    };
    let job = MetaJob {
        data_files,
        root,
        properties: parse_properties(metadata)?,
        property_config: config.rules.property_config()?,
        check: args.check,
    };
    Ok((job, config.output_settings))
}

fn check_reference(summary: &str, reference_path: &str) -> MetaResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_ref != summary {
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), summary, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

pub fn run(args: &Args) -> MetaResult<()> {
    let (job, output_settings) = job_from_args(args)?;
    let summary = build_summary(&job);

    let pretty_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    let output = if output_settings.pretty.unwrap_or(true) {
        pretty_summary.clone()
    } else {
        serde_json::to_string(&summary).context(ParsingJsonSnafu {})?
    };

    let out_path = args.out.clone().or(output_settings.output_path);
    match out_path.as_deref() {
        None | Some("stdout") => println!("{}", output),
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, output).context(WritingOutputSnafu { path })?;
        }
    }

    if let Some(reference_path) = args.reference.as_ref() {
        check_reference(&pretty_summary, reference_path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("preflib-meta-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args() -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: Vec::new(),
            input_type: None,
            meta: Vec::new(),
            check: false,
            verbose: false,
        }
    }

    const TWO_VOTERS: &str = "3\n1,A\n2,B\n3,C\n2,2,2\n1,1,2,3\n1,3,2,1\n";

    #[test]
    fn summarizes_files_from_a_config() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = scratch_dir("config");
        fs::write(dir.join("two.soc"), TWO_VOTERS).unwrap();
        fs::write(dir.join("broken.soc"), "3\n1,A\n").unwrap();
        fs::write(
            dir.join("config.json"),
            r#"{
                "dataFiles": [{ "filePath": "two.soc" }, { "filePath": "broken.soc" }],
                "metadata": ["numAlt", "isStrict", "isSP", "hasCondorcet"]
            }"#,
        )
        .unwrap();

        let mut a = args();
        a.config = Some(dir.join("config.json").display().to_string());
        let (job, _) = job_from_args(&a).unwrap();
        let summary = build_summary(&job);

        let files = summary["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["dataType"], json!("soc"));
        let properties = files[0]["properties"].as_object().unwrap();
        assert_eq!(properties["numAlt"], json!(3));
        assert_eq!(properties["isStrict"], json!(true));
        assert!(properties["isSP"].is_array());
        // Does not apply to ordinal data.
        assert!(properties.get("hasCondorcet").is_none());
        assert!(files[1]["error"].is_string());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn input_files_and_reference() {
        let dir = scratch_dir("inputs");
        let data = dir.join("two.txt");
        fs::write(&data, TWO_VOTERS).unwrap();

        let mut a = args();
        a.input = vec![data.display().to_string()];
        a.input_type = Some("soc".to_string());
        a.meta = vec!["numVot".to_string(), "isSC".to_string()];
        a.check = true;
        let (job, _) = job_from_args(&a).unwrap();
        let summary = build_summary(&job);
        let file = &summary["files"][0];
        assert_eq!(file["properties"]["numVot"], json!(2));
        assert_eq!(file["properties"]["isSC"], json!(true));
        assert_eq!(file["issues"], json!([]));

        let reference = dir.join("reference.json");
        fs::write(&reference, serde_json::to_string(&summary).unwrap()).unwrap();
        let pretty = serde_json::to_string_pretty(&summary).unwrap();
        assert!(check_reference(&pretty, &reference.display().to_string()).is_ok());
        fs::write(&reference, r#"{ "files": [] }"#).unwrap();
        assert!(matches!(
            check_reference(&pretty, &reference.display().to_string()),
            Err(MetaError::ReferenceMismatch {})
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unknown_properties_are_rejected() {
        let mut a = args();
        a.input = vec!["x.soc".to_string()];
        a.meta = vec!["isFoo".to_string()];
        assert!(matches!(
            job_from_args(&a),
            Err(MetaError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn requires_some_input() {
        assert!(job_from_args(&args()).is_err());
    }

    #[test]
    fn writes_the_summary() {
        let dir = scratch_dir("output");
        let data = dir.join("graph.pwg");
        fs::write(&data, "3\n1,A\n2,B\n3,C\n9,9,3\n3,1,2\n5,2,1\n1,1,3\n").unwrap();
        let out = dir.join("summary.json");

        let mut a = args();
        a.input = vec![data.display().to_string()];
        a.out = Some(out.display().to_string());
        run(&a).unwrap();

        let written = read_summary(&out.display().to_string()).unwrap();
        let properties = &written["files"][0]["properties"];
        assert_eq!(properties["hasCondorcet"], json!(false));
        assert_eq!(properties["numAlt"], json!(3));
        assert!(properties.get("isStrict").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
