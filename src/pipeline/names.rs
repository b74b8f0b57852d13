//! Dataset name containers for node inputs and outputs.
//!
//! A node declares its inputs (and outputs) in one of four shapes. Renaming
//! must hand back the same shape it was given, so the shape is kept as a
//! tagged variant instead of being flattened to a list.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The datasets a node reads or writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameSet {
    /// No datasets.
    #[default]
    None,
    /// A single dataset passed positionally.
    Single(String),
    /// Datasets passed positionally, in order.
    Sequence(Vec<String>),
    /// Datasets passed by argument name (argument → dataset).
    Keyed(BTreeMap<String, String>),
}

impl NameSet {
    /// Dataset names in declaration order. For keyed sets this is argument order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            NameSet::None => Vec::new(),
            NameSet::Single(name) => vec![name.as_str()],
            NameSet::Sequence(names) => names.iter().map(String::as_str).collect(),
            NameSet::Keyed(map) => map.values().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NameSet::None => 0,
            NameSet::Single(_) => 1,
            NameSet::Sequence(names) => names.len(),
            NameSet::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` is one of the datasets (not an argument name).
    pub fn contains(&self, name: &str) -> bool {
        self.names().contains(&name)
    }

    /// Rebuild the set with every dataset name passed through `f`.
    ///
    /// The shape is preserved: a single name stays single, a sequence keeps
    /// its length and order, and a keyed set keeps its argument names.
    pub fn map_names<F>(&self, mut f: F) -> NameSet
    where
        F: FnMut(&str) -> String,
    {
        match self {
            NameSet::None => NameSet::None,
            NameSet::Single(name) => NameSet::Single(f(name)),
            NameSet::Sequence(names) => NameSet::Sequence(names.iter().map(|n| f(n)).collect()),
            NameSet::Keyed(map) => {
                NameSet::Keyed(map.iter().map(|(arg, n)| (arg.clone(), f(n))).collect())
            }
        }
    }
}

/// Renders as `[A,B]`, the form used in derived node names.
impl fmt::Display for NameSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names().join(","))
    }
}

impl From<&str> for NameSet {
    fn from(name: &str) -> Self {
        NameSet::Single(name.to_string())
    }
}

impl From<String> for NameSet {
    fn from(name: String) -> Self {
        NameSet::Single(name)
    }
}

impl From<Vec<String>> for NameSet {
    fn from(names: Vec<String>) -> Self {
        NameSet::Sequence(names)
    }
}

impl From<Vec<&str>> for NameSet {
    fn from(names: Vec<&str>) -> Self {
        NameSet::Sequence(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for NameSet {
    fn from(names: [&str; N]) -> Self {
        NameSet::Sequence(names.iter().map(|n| n.to_string()).collect())
    }
}

impl From<BTreeMap<String, String>> for NameSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        NameSet::Keyed(map)
    }
}

impl From<HashMap<String, String>> for NameSet {
    fn from(map: HashMap<String, String>) -> Self {
        NameSet::Keyed(map.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for NameSet {
    fn from(pairs: [(&str, &str); N]) -> Self {
        NameSet::Keyed(
            pairs
                .iter()
                .map(|(arg, name)| (arg.to_string(), name.to_string()))
                .collect(),
        )
    }
}

impl<T: Into<NameSet>> From<Option<T>> for NameSet {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
