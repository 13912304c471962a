//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use aural_config::{EngineConfig, find_config};
use aural_graph::GraphDescription;

/// Loads the engine configuration.
///
/// An explicit `--config` path must exist. Without one, the user config file
/// is used when present and the defaults otherwise.
pub fn load_engine_config(explicit: Option<&Path>) -> anyhow::Result<EngineConfig> {
    if let Some(path) = explicit
        && !path.is_file()
    {
        anyhow::bail!("config file '{}' not found", path.display());
    }

    match find_config(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading engine config");
            EngineConfig::load(&path).with_context(|| format!("loading '{}'", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Reads a graph description; `.json` files are JSON, anything else TOML.
pub fn read_graph(path: &Path) -> anyhow::Result<GraphDescription> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph '{}'", path.display()))?;

    let graph = if is_json(path) {
        serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON graph '{}'", path.display()))?
    } else {
        toml::from_str(&text).with_context(|| format!("invalid TOML graph '{}'", path.display()))?
    };
    Ok(graph)
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_detection_is_by_extension() {
        assert!(is_json(Path::new("graph.json")));
        assert!(is_json(Path::new("GRAPH.JSON")));
        assert!(!is_json(Path::new("graph.toml")));
        assert!(!is_json(Path::new("graph")));
    }

    #[test]
    fn toml_graph_parses() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(
            &path,
            r#"
destination = 2

[[nodes]]
id = 1
kind = "oscillator"
frequency = 220.0

[[nodes]]
id = 2
kind = "destination"

[[connections]]
source = 1
destination = 2
"#,
        )
        .unwrap();

        let graph = read_graph(&path).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.connections.len(), 1);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_engine_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
