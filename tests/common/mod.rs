//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use modpipe_rs::{ModularPipelineError, Node, Pipeline};

/// Node names of a pipeline in execution order
pub fn node_names(pipeline: &Pipeline) -> Vec<String> {
    pipeline.nodes().iter().map(|node| node.name()).collect()
}

/// Find a node by its full name
pub fn find_node<'a>(pipeline: &'a Pipeline, name: &str) -> &'a Node {
    pipeline
        .node_list()
        .iter()
        .find(|node| node.name() == name)
        .unwrap_or_else(|| panic!("No node named {name} in {:?}", node_names(pipeline)))
}

/// Assert an error message contains a fragment
pub fn assert_error_contains(err: &ModularPipelineError, fragment: &str) {
    let message = err.to_string();
    assert!(
        message.contains(fragment),
        "Expected error message {:?} to contain {:?}",
        message,
        fragment
    );
}
