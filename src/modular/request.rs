//! Mapping requests: what to rename, what to keep, which namespace to apply.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Names selected by one argument of a mapping request.
///
/// A single name or a set of names means "keep these names unprefixed"
/// (identity mapping); a map renames `old → new`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameSpec {
    #[default]
    None,
    Single(String),
    Set(BTreeSet<String>),
    Map(BTreeMap<String, String>),
}

impl NameSpec {
    /// These names as an `old → new` table; single and set forms map each name
    /// to itself.
    pub fn to_mapping(&self) -> BTreeMap<String, String> {
        match self {
            NameSpec::None => BTreeMap::new(),
            NameSpec::Single(name) => BTreeMap::from([(name.clone(), name.clone())]),
            NameSpec::Set(names) => names.iter().map(|n| (n.clone(), n.clone())).collect(),
            NameSpec::Map(map) => map.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NameSpec::None => true,
            NameSpec::Single(_) => false,
            NameSpec::Set(names) => names.is_empty(),
            NameSpec::Map(map) => map.is_empty(),
        }
    }
}

impl From<&str> for NameSpec {
    fn from(name: &str) -> Self {
        NameSpec::Single(name.to_string())
    }
}

impl From<String> for NameSpec {
    fn from(name: String) -> Self {
        NameSpec::Single(name)
    }
}

impl<const N: usize> From<[&str; N]> for NameSpec {
    fn from(names: [&str; N]) -> Self {
        NameSpec::Set(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<Vec<&str>> for NameSpec {
    fn from(names: Vec<&str>) -> Self {
        NameSpec::Set(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for NameSpec {
    fn from(names: Vec<String>) -> Self {
        NameSpec::Set(names.into_iter().collect())
    }
}

impl From<BTreeSet<String>> for NameSpec {
    fn from(names: BTreeSet<String>) -> Self {
        NameSpec::Set(names)
    }
}

impl From<HashSet<String>> for NameSpec {
    fn from(names: HashSet<String>) -> Self {
        NameSpec::Set(names.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for NameSpec {
    fn from(map: BTreeMap<String, String>) -> Self {
        NameSpec::Map(map)
    }
}

impl From<HashMap<String, String>> for NameSpec {
    fn from(map: HashMap<String, String>) -> Self {
        NameSpec::Map(map.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for NameSpec {
    fn from(pairs: [(&str, &str); N]) -> Self {
        NameSpec::Map(
            pairs
                .iter()
                .map(|(old, new)| (old.to_string(), new.to_string()))
                .collect(),
        )
    }
}

impl<T: Into<NameSpec>> From<Option<T>> for NameSpec {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A request to namespace and/or remap a pipeline.
///
/// ```
/// use modpipe_rs::modular::MappingRequest;
///
/// let request = MappingRequest::new()
///     .namespace("data_science")
///     .inputs([("model_input", "model_input_table")])
///     .parameters("split_ratio");
/// assert_eq!(request.namespace_prefix(), Some("data_science"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingRequest {
    /// Free inputs to keep or rename.
    #[serde(skip_serializing_if = "NameSpec::is_empty")]
    pub inputs: NameSpec,
    /// Outputs to keep or rename.
    #[serde(skip_serializing_if = "NameSpec::is_empty")]
    pub outputs: NameSpec,
    /// Parameters to keep or rename; bare keys mean `params:<key>`.
    #[serde(skip_serializing_if = "NameSpec::is_empty")]
    pub parameters: NameSpec,
    /// Prefix for every name not explicitly resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl MappingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(mut self, inputs: impl Into<NameSpec>) -> Self {
        self.inputs = inputs.into();
        self
    }

    pub fn outputs(mut self, outputs: impl Into<NameSpec>) -> Self {
        self.outputs = outputs.into();
        self
    }

    pub fn parameters(mut self, parameters: impl Into<NameSpec>) -> Self {
        self.parameters = parameters.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The namespace to apply; an empty string counts as none.
    pub fn namespace_prefix(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    /// Whether the request leaves every name unchanged.
    pub fn is_identity(&self) -> bool {
        self.namespace_prefix().is_none()
            && [&self.inputs, &self.outputs, &self.parameters]
                .iter()
                .flat_map(|spec| spec.to_mapping())
                .all(|(old, new)| old == new)
    }
}
