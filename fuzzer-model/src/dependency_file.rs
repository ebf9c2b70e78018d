use std::path::Path;

use serde::Deserialize;

use crate::dependency::DependencyGraph;
use crate::error::ModelError;
use crate::op::ExternalOp;

/// Supported `--dependency-file-type` values (§6). RESTler is the only
/// format this system understands; the enum exists so new formats can be
/// added without changing the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyFileType {
    Restler,
}

impl DependencyFileType {
    pub fn from_flag(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "restler" => Some(DependencyFileType::Restler),
            _ => None,
        }
    }
}

/// A single RESTler-style dependency entry: the producing operation, the
/// resource name it produces, and the operations that consume it.
#[derive(Debug, Deserialize)]
struct RestlerEntry {
    producer_endpoint: String,
    producer_method: String,
    consumers: Vec<RestlerConsumer>,
}

#[derive(Debug, Deserialize)]
struct RestlerConsumer {
    endpoint: String,
    method: String,
}

/// Load a static dependency graph from a RESTler-style JSON file and merge
/// it into `graph` (additive: it never removes edges already inferred by
/// name-matching, §3).
pub fn load_into(
    graph: &mut DependencyGraph,
    path: &Path,
    file_type: DependencyFileType,
) -> Result<(), ModelError> {
    match file_type {
        DependencyFileType::Restler => load_restler(graph, path),
    }
}

fn load_restler(graph: &mut DependencyGraph, path: &Path) -> Result<(), ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let entries: Vec<RestlerEntry> = serde_json::from_str(&raw).map_err(|e| ModelError::DependencyFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    for entry in entries {
        let producer = ExternalOp::new(entry.producer_endpoint, entry.producer_method);
        for consumer in entry.consumers {
            let consumer = ExternalOp::new(consumer.endpoint, consumer.method);
            graph.add_edge(producer.clone(), consumer);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_restler_style_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"producer_endpoint": "/a", "producer_method": "POST",
                  "consumers": [{{"endpoint": "/b/{{id}}", "method": "GET"}}]}}]"#
        )
        .unwrap();

        let mut graph = DependencyGraph::new();
        load_into(&mut graph, file.path(), DependencyFileType::Restler).unwrap();

        let producer = ExternalOp::new("/a", "POST");
        assert_eq!(graph.consumers_of(&producer).len(), 1);
    }
}
