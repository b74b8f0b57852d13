//! Integration tests for loading, saving and building pipeline files

mod common;

use common::builders::{chain_pipeline, node, PipelineBuilder};
use common::{find_node, node_names};
use modpipe_rs::config::{FileFormat, NodeConfig, PipelineFile};
use modpipe_rs::{MappingRequest, ModpipeError, NameSet};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_load_fixture_and_build() {
    let file = PipelineFile::load(fixture("data_processing.toml")).unwrap();
    assert_eq!(file.name, "data_processing");
    assert_eq!(file.nodes.len(), 4);
    assert_eq!(file.modular.len(), 1);

    let pipeline = file.build().unwrap();
    assert_eq!(
        pipeline.inputs().into_iter().collect::<Vec<_>>(),
        vec!["companies", "params:model_options", "reviews", "shuttles"]
    );
}

#[test]
fn test_build_namespaced_fixture() {
    let file = PipelineFile::load(fixture("data_processing.toml")).unwrap();
    let pipeline = file.build_namespaced().unwrap();

    assert_eq!(
        pipeline.inputs().into_iter().collect::<Vec<_>>(),
        vec!["companies", "params:shared_options", "reviews", "shuttles"]
    );
    assert_eq!(
        pipeline.outputs().into_iter().collect::<Vec<_>>(),
        vec!["data_processing.X_test", "train_set"]
    );

    let split = find_node(&pipeline, "data_processing.split_data_node");
    assert_eq!(
        split.outputs(),
        &NameSet::from([("train", "train_set"), ("test", "data_processing.X_test")])
    );

    let table = find_node(&pipeline, "data_processing.create_model_input_table_node");
    assert!(table.tags().contains("model_input"));
    assert_eq!(table.namespace(), Some("data_processing"));
}

#[test]
fn test_save_and_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("pipeline.toml");

    let file = PipelineFile::from_pipeline("chain", &chain_pipeline())
        .with_layer(MappingRequest::new().namespace("ns").inputs("A"));
    file.save(&path).unwrap();

    let loaded = PipelineFile::load(&path).unwrap();
    assert_eq!(loaded, file);

    let built = loaded.build_namespaced().unwrap();
    assert_eq!(node_names(&built), vec!["ns.node1", "ns.node2", "ns.node3"]);
}

#[test]
fn test_save_and_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.json");

    let raw = PipelineBuilder::new()
        .node(
            node("split", "raw", [("left", "L"), ("right", "R")])
                .tags(["prep"])
                .build()
                .unwrap(),
        )
        .build();
    let file = PipelineFile::from_pipeline("split", &raw);
    file.save(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.trim_start().starts_with('{'));

    let loaded = PipelineFile::load(&path).unwrap();
    assert_eq!(loaded.build().unwrap(), raw);
}

#[test]
fn test_namespaced_pipeline_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("namespaced.toml");

    let file = PipelineFile::new("two_layers")
        .with_layer(MappingRequest::new().namespace("inner"))
        .with_layer(MappingRequest::new().namespace("outer"));
    let file = PipelineFile {
        nodes: vec![NodeConfig::new("identity", "A", "B").with_name("node1")],
        ..file
    };

    let namespaced = file.build_namespaced().unwrap();
    PipelineFile::from_pipeline("flattened", &namespaced)
        .save(&path)
        .unwrap();

    let reloaded = PipelineFile::load(&path).unwrap().build().unwrap();
    assert_eq!(reloaded, namespaced);
    assert_eq!(reloaded.nodes()[0].namespace(), Some("outer.inner"));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = PipelineFile::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ModpipeError::Config(_)));
}

#[test]
fn test_failing_layer_reports_index() {
    let file = PipelineFile::parse(
        r#"
        [[nodes]]
        func = "identity"
        inputs = "A"
        outputs = "B"

        [[modular]]
        namespace = "ok"

        [[modular]]
        inputs = { B = "C" }
        "#,
        FileFormat::Toml,
    )
    .unwrap();

    let err = file.build_namespaced().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Modular layer 1 failed"), "{}", message);
    assert!(message.contains("Failed to map datasets and/or parameters: B"));
}
