// Serialization back to the PrefLib text format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use snafu::prelude::*;

use crate::config::*;
use crate::instance::PreflibInstance;

fn write_order_tokens(order: &Order) -> String {
    order
        .iter()
        .map(|class| match class.as_slice() {
            [alt] => alt.to_string(),
            _ => {
                let inner: Vec<String> = class.iter().map(|a| a.to_string()).collect();
                format!("{{{}}}", inner.join(","))
            }
        })
        .collect::<Vec<String>>()
        .join(",")
}

impl PreflibInstance {
    fn write_names<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for (alt, name) in self.alternatives_name.iter() {
            writeln!(w, "{},{}", alt, name)?;
        }
        Ok(())
    }

    fn write_orders<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{}", self.num_alternatives)?;
        self.write_names(w)?;
        writeln!(
            w,
            "{},{},{}",
            self.num_voters, self.sum_vote_count, self.num_unique_order
        )?;
        for order in self.orders.iter() {
            let multiplicity = self.multiplicity(order);
            if order.is_empty() {
                writeln!(w, "{}", multiplicity)?;
            } else {
                writeln!(w, "{},{}", multiplicity, write_order_tokens(order))?;
            }
        }
        Ok(())
    }

    fn write_graph<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        let is_matching = self.kind() == DataKind::Matching;
        if is_matching {
            writeln!(w, "{},{}", self.num_alternatives, self.num_voters)?;
        } else {
            writeln!(w, "{}", self.num_alternatives)?;
        }
        self.write_names(w)?;
        if !is_matching {
            writeln!(
                w,
                "{},{},{}",
                self.num_voters, self.sum_vote_count, self.num_unique_order
            )?;
        }
        if let Some(graph) = self.graph.as_ref() {
            for (tail, head, weight) in graph.edges() {
                if is_matching {
                    // Matching edges are stored in both directions, write them once.
                    if tail <= head {
                        writeln!(w, "{},{},{}", tail, head, weight)?;
                    }
                } else {
                    writeln!(w, "{},{},{}", weight, tail, head)?;
                }
            }
        }
        Ok(())
    }

    /// Writes the instance in the PrefLib format.
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        match self.kind() {
            DataKind::Ordinal => self.write_orders(w),
            DataKind::Graph | DataKind::Matching => self.write_graph(w),
            DataKind::Passthrough => {
                for line in self.raw_lines.iter() {
                    writeln!(w, "{}", line)?;
                }
                Ok(())
            }
        }
    }

    pub fn to_preflib_string(&self) -> String {
        let mut buf: Vec<u8> = Vec::new();
        // Writing to memory cannot fail and every piece is valid UTF-8.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Writes the instance to a file. The data type is used as extension when
    /// the path does not have one. Returns the path actually written.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> PreflibResult<PathBuf> {
        let mut path = path.as_ref().to_path_buf();
        if path.extension().is_none() {
            path.set_extension(self.data_type.extension());
        }
        let path_str = path.display().to_string();
        info!("Writing {} instance to {:?}", self.data_type, path_str);
        let file = File::create(&path).context(IoSnafu {
            path: path_str.clone(),
        })?;
        let mut w = BufWriter::new(file);
        self.write_to(&mut w)
            .and_then(|_| w.flush())
            .context(IoSnafu { path: path_str })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::InstanceBuilder;
    use proptest::prelude::*;

    const WEAK: &str = "4\n1,a\n2,b\n3,c\n4,d\n5,5,2\n3,{1,2},3\n2,4\n";

    #[test]
    fn writes_ties_with_braces() {
        let instance = PreflibInstance::parse_str(WEAK, DataType::Toi, "").unwrap();
        assert_eq!(instance.to_preflib_string(), WEAK);
    }

    #[test]
    fn canonical_output_is_stable() {
        let messy = "3\n 1, A\n2,B\n3,C\n\n2,2,2\n1, 1,2,3\n1,{3},2,1\n";
        let instance = PreflibInstance::parse_str(messy, DataType::Soc, "").unwrap();
        let written = instance.to_preflib_string();
        assert_eq!(written, "3\n1,A\n2,B\n3,C\n2,2,2\n1,1,2,3\n1,3,2,1\n");
        let reparsed = PreflibInstance::parse_str(&written, DataType::Soc, "").unwrap();
        assert_eq!(reparsed.to_preflib_string(), written);
    }

    #[test]
    fn writes_graphs() {
        let text = "3\n1,A\n2,B\n3,C\n8,8,3\n3,1,2\n1,1,3\n5,2,1\n";
        let instance = PreflibInstance::parse_str(text, DataType::Pwg, "").unwrap();
        assert_eq!(instance.to_preflib_string(), text);
    }

    #[test]
    fn writes_matching_edges_once() {
        let text = "3,12\n1,a\n2,b\n3,c\n2,3,-1\n1,2,7\n";
        let instance = PreflibInstance::parse_str(text, DataType::Wmd, "").unwrap();
        let written = instance.to_preflib_string();
        assert_eq!(written, "3,12\n1,a\n2,b\n3,c\n1,2,7\n2,3,-1\n");
        let reparsed = PreflibInstance::parse_str(&written, DataType::Wmd, "").unwrap();
        assert_eq!(reparsed.graph, instance.graph);
    }

    #[test]
    fn write_adds_the_extension() {
        let instance = PreflibInstance::parse_str(WEAK, DataType::Toi, "").unwrap();
        let dir = std::env::temp_dir().join(format!("preflib-writer-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let written = instance.write(dir.join("weak")).unwrap();
        assert_eq!(written.extension().and_then(|e| e.to_str()), Some("toi"));
        let reparsed = PreflibInstance::parse_file(&written).unwrap();
        assert_eq!(reparsed.orders, instance.orders);
        assert_eq!(reparsed.file_name, "weak.toi");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    fn arb_order(num_alternatives: u32) -> impl Strategy<Value = Order> {
        let alternatives: Vec<AltId> = (1..=num_alternatives).collect();
        (
            Just(alternatives).prop_shuffle(),
            1..=num_alternatives as usize,
            prop::collection::vec(any::<bool>(), num_alternatives as usize),
        )
            .prop_map(|(alts, len, cuts)| {
                // `cuts[i]` starts a new indifference class before alts[i].
                let mut order: Order = Vec::new();
                for (idx, alt) in alts.into_iter().take(len).enumerate() {
                    if cuts[idx] || order.is_empty() {
                        order.push(vec![alt]);
                    } else if let Some(class) = order.last_mut() {
                        class.push(alt);
                    }
                }
                order
            })
    }

    fn arb_profile() -> impl Strategy<Value = (u32, Vec<(Order, u64)>)> {
        (1..6u32).prop_flat_map(|m| {
            (
                Just(m),
                prop::collection::vec((arb_order(m), 1..4u64), 1..8),
            )
        })
    }

    proptest! {
        #[test]
        fn parse_write_round_trip((m, profile) in arb_profile()) {
            let names: Vec<String> = (1..=m).map(|a| format!("alt {}", a)).collect();
            let mut builder = InstanceBuilder::new().alternatives(&names);
            for (order, count) in profile.iter() {
                builder.add_order(order, *count);
            }
            let instance = builder.build().unwrap();
            let written = instance.to_preflib_string();
            let reparsed = PreflibInstance::parse_str(&written, instance.data_type, "").unwrap();
            prop_assert_eq!(&reparsed.orders, &instance.orders);
            prop_assert_eq!(&reparsed.order_multiplicity, &instance.order_multiplicity);
            prop_assert_eq!(reparsed.num_alternatives, instance.num_alternatives);
            prop_assert_eq!(&reparsed.alternatives_name, &instance.alternatives_name);
            prop_assert_eq!(reparsed.data_type, instance.data_type);
            prop_assert_eq!(reparsed.to_preflib_string(), written);
        }
    }
}
