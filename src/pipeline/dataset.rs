//! Dataset name helpers.
//!
//! Dataset names are plain strings with two reserved conventions:
//!
//! - **Transcoding**: `base@format` refers to dataset `base` read or written
//!   in a specific format. Graph matching and renaming work on `base`; the
//!   `@format` suffix travels with the name unchanged.
//! - **Parameters**: the literal `parameters` names the whole parameter set,
//!   and `params:<key>` names a single parameter.

use crate::pipeline::error::{PipelineError, PipelineResult};

/// Separator between a dataset base name and its transcoding format.
pub const TRANSCODING_SEPARATOR: char = '@';

/// Name of the pseudo-dataset holding every parameter.
pub const ALL_PARAMETERS: &str = "parameters";

/// Prefix marking a single parameter.
pub const PARAMS_PREFIX: &str = "params:";

/// Split `name` into `(base, suffix)` on the transcoding separator.
///
/// The suffix is empty when the name is not transcoded.
pub fn transcode_split(name: &str) -> PipelineResult<(&str, &str)> {
    let count = name.matches(TRANSCODING_SEPARATOR).count();
    if count > 1 {
        return Err(PipelineError::InvalidTranscoding {
            name: name.to_string(),
            count,
        });
    }
    Ok(name
        .split_once(TRANSCODING_SEPARATOR)
        .unwrap_or((name, "")))
}

/// Base name of a possibly transcoded dataset.
///
/// Names with more than one separator are only rejected at node construction;
/// here everything after the first separator is dropped.
pub fn strip_transcoding(name: &str) -> &str {
    name.split_once(TRANSCODING_SEPARATOR)
        .map(|(base, _)| base)
        .unwrap_or(name)
}

/// Whether `name` carries a transcoding suffix.
pub fn is_transcoded(name: &str) -> bool {
    name.contains(TRANSCODING_SEPARATOR)
}

/// Whether `name` is the whole-parameters literal.
pub fn is_all_parameters(name: &str) -> bool {
    name == ALL_PARAMETERS
}

/// Whether `name` refers to a single `params:<key>` parameter.
pub fn is_single_parameter(name: &str) -> bool {
    name.starts_with(PARAMS_PREFIX)
}

/// Whether `name` is any kind of parameter identifier.
pub fn is_parameter(name: &str) -> bool {
    is_all_parameters(name) || is_single_parameter(name)
}

/// Key portion of a `params:<key>` name.
pub fn parameter_key(name: &str) -> Option<&str> {
    name.strip_prefix(PARAMS_PREFIX)
}

/// Canonical `params:<key>` form. Names that already are parameter
/// identifiers are returned as-is.
pub fn canonical_parameter(name: &str) -> String {
    if is_parameter(name) {
        name.to_string()
    } else {
        format!("{PARAMS_PREFIX}{name}")
    }
}

/// Prefix `name` with `namespace.` when a namespace is given.
pub fn prefix(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}.{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_split() {
        assert_eq!(transcode_split("A").unwrap(), ("A", ""));
        assert_eq!(transcode_split("A@pandas").unwrap(), ("A", "pandas"));
        assert_eq!(
            transcode_split("A@pandas@spark").unwrap_err(),
            PipelineError::InvalidTranscoding {
                name: "A@pandas@spark".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_strip_transcoding() {
        assert_eq!(strip_transcoding("C@spark"), "C");
        assert_eq!(strip_transcoding("C"), "C");
        assert!(is_transcoded("C@spark"));
        assert!(!is_transcoded("C"));
    }

    #[test]
    fn test_parameter_detection() {
        assert!(is_parameter("parameters"));
        assert!(is_parameter("params:x"));
        assert!(!is_parameter("params"));
        assert!(!is_parameter("my_parameters"));
        assert!(is_all_parameters("parameters"));
        assert!(!is_single_parameter("parameters"));
        assert_eq!(parameter_key("params:a.b"), Some("a.b"));
        assert_eq!(parameter_key("a"), None);
    }

    #[test]
    fn test_canonical_parameter() {
        assert_eq!(canonical_parameter("x"), "params:x");
        assert_eq!(canonical_parameter("params:x"), "params:x");
        assert_eq!(canonical_parameter("parameters"), "parameters");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(prefix(Some("ns"), "A"), "ns.A");
        assert_eq!(prefix(None, "A"), "A");
    }
}
