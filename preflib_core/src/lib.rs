/*!
Reading, writing and analysing PrefLib preference data.

PrefLib files describe the preferences of voters over a set of alternatives,
either as orders (`soc`, `soi`, `toc`, `toi`), as graphs (`tog`, `mjg`, `wmg`,
`pwg`) or as weighted matching data (`wmd`). This crate parses them into a
[PreflibInstance], writes them back, and computes the structural properties
listed in the PrefLib catalog, such as single-peakedness or the existence of
a Condorcet winner.

```
use preflib_core::*;

let instance = parse_str("3\n1,A\n2,B\n3,C\n2,2,2\n1,1,2,3\n1,3,2,1", DataType::Soc)?;
let config = PropertyConfig::default();
assert_eq!(
    compute_property(Property::IsStrict, &instance, &config)?,
    PropertyValue::Flag(true)
);
assert!(compute_property(Property::IsSinglePeaked, &instance, &config)?
    .as_flag()
    .unwrap_or(false));
# Ok::<(), PreflibError>(())
```

See the [manual] for the file formats and the properties.
*/

mod config;
pub mod builder;
pub mod graph;
pub mod instance;
pub mod manual;
pub mod parser;
pub mod properties;
pub mod registry;
pub mod sanity;
pub mod sat;
pub mod single_crossing;
pub mod single_peaked;
mod writer;

use std::path::{Path, PathBuf};

pub use crate::builder::InstanceBuilder;
pub use crate::config::*;
pub use crate::graph::Graph;
pub use crate::instance::{PreflibInstance, VoteMap};
pub use crate::registry::{compute_all, compute_property, Property, PropertyValue};

/// Parses a file, the data type being given by its extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> PreflibResult<PreflibInstance> {
    PreflibInstance::parse_file(path)
}

/// Parses the contents of a file of the given data type.
pub fn parse_str(contents: &str, data_type: DataType) -> PreflibResult<PreflibInstance> {
    PreflibInstance::parse_str(contents, data_type, "")
}

/// Writes an instance, see [PreflibInstance::write].
pub fn write<P: AsRef<Path>>(instance: &PreflibInstance, path: P) -> PreflibResult<PathBuf> {
    instance.write(path)
}
