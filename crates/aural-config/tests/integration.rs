//! Integration tests for aural-config.
//!
//! These tests go through the file system and into the graph controller.

use aural_config::{ConfigError, EngineConfig, GraphController, ValidationError, find_config};
use aural_graph::nodes::{Destination, Gain, Oscillator};
use aural_graph::{GraphDescription, GraphNodeDescription, NodeId};
use tempfile::TempDir;

/// Saving into a missing directory creates it, and loading returns the same config.
#[test]
fn test_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("engine.toml");

    let mut config = EngineConfig {
        sample_rate: 44_100,
        quantum_size: 256,
        ..EngineConfig::default()
    };
    config.limits.max_channel_count = 8;
    config.save(&path).expect("save should create parent dirs");

    let loaded = EngineConfig::load(&path).expect("load saved config");
    assert_eq!(loaded, config);
    assert_eq!(find_config(Some(&path)), Some(path));
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

/// A file that parses but holds bad values is rejected at load time.
#[test]
fn test_load_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("engine.toml");
    std::fs::write(&path, "quantum_size = 100\n").unwrap();

    let err = EngineConfig::load(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Validation(ValidationError::NotPowerOfTwo { value: 100, .. })
    ));
}

/// A loaded config drives the controller: the quantum sizes every mix bus.
#[test]
fn test_config_drives_compilation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("engine.toml");
    std::fs::write(&path, "quantum_size = 64\n\n[limits]\nmax_channel_count = 4\n").unwrap();
    let config = EngineConfig::load(&path).unwrap();

    let osc = NodeId::new(1);
    let gain = NodeId::new(2);
    let out = NodeId::new(3);
    let graph = GraphDescription::new(out)
        .with_node(osc, GraphNodeDescription::Oscillator(Oscillator::default()))
        .with_node(gain, GraphNodeDescription::Gain(Gain::default()))
        .with_node(out, GraphNodeDescription::Destination(Destination::default()))
        .connect(osc, gain)
        .connect(gain, out);

    let (controller, executor) = GraphController::with_inert_nodes(graph, config.render_settings());
    assert_eq!(controller.settings().quantum_size, 64);
    assert_eq!(controller.node_table().quantum_size(), 64);

    let topology = executor.topology();
    assert_eq!(topology.len(), 3);
    let gain_index = topology.index_of(gain).unwrap();
    assert!(topology.node(gain_index).mixing.channel_count <= 4);
}
