use crate::meta::*;

use preflib_core::{PropertyConfig, SinglePeakedConfig, SolverChoice};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "pretty")]
    pub pretty: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataFile {
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Overrides the data type given by the extension.
    #[serde(rename = "dataType")]
    pub data_type: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaRules {
    #[serde(rename = "singlePeakedInitialColumns")]
    pub single_peaked_initial_columns: Option<usize>,
    #[serde(rename = "singlePeakedColumnStep")]
    pub single_peaked_column_step: Option<usize>,
    #[serde(rename = "singlePeakedSolver")]
    pub single_peaked_solver: Option<String>,
    #[serde(rename = "solverMaxDecisions")]
    pub solver_max_decisions: Option<u64>,
}

impl MetaRules {
    pub fn solver(&self) -> MetaResult<SolverChoice> {
        let res = match self.single_peaked_solver.as_deref() {
            None | Some("cdcl") => SolverChoice::Cdcl,
            Some("dpll") => SolverChoice::Dpll,
            Some(x) => whatever!("Unknown singlePeakedSolver {:?}: use cdcl or dpll", x),
        };
        Ok(res)
    }

    pub fn property_config(&self) -> MetaResult<PropertyConfig> {
        let default = SinglePeakedConfig::DEFAULT;
        let initial_columns = self
            .single_peaked_initial_columns
            .unwrap_or(default.initial_columns);
        let column_step = self
            .single_peaked_column_step
            .unwrap_or(default.column_step);
        if initial_columns == 0 {
            whatever!("singlePeakedInitialColumns must be at least 1");
        }
        if column_step == 0 {
            whatever!("singlePeakedColumnStep must be at least 1");
        }
        Ok(PropertyConfig {
            single_peaked: SinglePeakedConfig {
                initial_columns,
                column_step,
                solver: self.solver()?,
                max_decisions: self.solver_max_decisions,
            },
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataFiles")]
    pub data_files: Vec<DataFile>,
    /// Short names of the properties, all the applicable ones when empty.
    #[serde(rename = "metadata", default)]
    pub metadata: Vec<String>,
    #[serde(rename = "rules", default)]
    pub rules: MetaRules,
}

pub fn read_config(path: &str) -> MetaResult<MetaConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: MetaConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> MetaResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}
