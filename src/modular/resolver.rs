//! Name Resolver.
//!
//! Turns a [`MappingRequest`] into the complete `old → new` table for every
//! dataset and parameter name referenced by a pipeline. All request
//! validation happens here, before the rewriter touches any node.
//!
//! # Resolution order
//!
//! For each name, the first matching rule wins:
//!
//! 1. the full name is an explicit key (`inputs`, `outputs` or `parameters`)
//!    → the mapped value, verbatim;
//! 2. the name is the `parameters` literal → unchanged;
//! 3. the name is `params:<key>` → `params:<namespace>.<key>` (or unchanged
//!    without a namespace);
//! 4. the transcoding base is an explicit key → mapped base + `@format`;
//! 5. a namespace is set → `<namespace>.<name>`;
//! 6. unchanged.

use crate::modular::error::{ModularPipelineError, ModularResult};
use crate::modular::request::{MappingRequest, NameSpec};
use crate::pipeline::dataset::{
    canonical_parameter, is_all_parameters, is_parameter, parameter_key, prefix,
    strip_transcoding, PARAMS_PREFIX, TRANSCODING_SEPARATOR,
};
use crate::pipeline::Pipeline;
use std::collections::{BTreeMap, BTreeSet};

/// Resolved `old → new` names for one transform call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMapping {
    table: BTreeMap<String, String>,
    namespace: Option<String>,
}

impl NameMapping {
    /// New name for `name`. Names outside the table are returned unchanged.
    pub fn rename(&self, name: &str) -> String {
        self.table
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(String::as_str)
    }

    /// The namespace the table was resolved under, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Computes a [`NameMapping`] for a pipeline and a request.
pub struct NameResolver<'a> {
    namespace: Option<&'a str>,
    explicit: BTreeMap<String, String>,
}

impl<'a> NameResolver<'a> {
    /// Validate `request` against `pipeline` and resolve every name.
    pub fn resolve(pipeline: &Pipeline, request: &'a MappingRequest) -> ModularResult<NameMapping> {
        let inputs = request.inputs.to_mapping();
        let outputs = request.outputs.to_mapping();
        let parameters = Self::canonical_parameters(&request.parameters);

        Self::validate_no_parameters(&inputs, &outputs)?;
        Self::validate_names_exist(pipeline, &inputs, &outputs, &parameters)?;
        Self::validate_inputs_outputs(pipeline, &inputs, &outputs)?;

        let mut explicit = inputs;
        explicit.extend(outputs);
        explicit.extend(parameters);

        let resolver = NameResolver {
            namespace: request.namespace_prefix(),
            explicit,
        };

        let table: BTreeMap<String, String> = pipeline
            .data_sets()
            .into_iter()
            .map(|name| {
                let new_name = resolver.resolve_name(&name);
                tracing::trace!("{} -> {}", name, new_name);
                (name, new_name)
            })
            .collect();

        Self::validate_no_collisions(&table)?;

        tracing::debug!(
            "Resolved {} names (namespace: {:?}, explicit: {})",
            table.len(),
            resolver.namespace,
            resolver.explicit.len()
        );

        Ok(NameMapping {
            table,
            namespace: resolver.namespace.map(str::to_string),
        })
    }

    /// Parameter specs accept bare keys: `x → y` means `params:x → params:y`.
    /// Keys that already are parameter identifiers are kept with their value.
    fn canonical_parameters(spec: &NameSpec) -> BTreeMap<String, String> {
        spec.to_mapping()
            .into_iter()
            .map(|(old, new)| {
                if is_parameter(&old) {
                    (old, new)
                } else {
                    (canonical_parameter(&old), canonical_parameter(&new))
                }
            })
            .collect()
    }

    fn validate_no_parameters(
        inputs: &BTreeMap<String, String>,
        outputs: &BTreeMap<String, String>,
    ) -> ModularResult<()> {
        if inputs
            .keys()
            .chain(outputs.keys())
            .any(|name| is_parameter(strip_transcoding(name)))
        {
            return Err(ModularPipelineError::ParametersInInputsOrOutputs);
        }
        Ok(())
    }

    fn validate_names_exist(
        pipeline: &Pipeline,
        inputs: &BTreeMap<String, String>,
        outputs: &BTreeMap<String, String>,
        parameters: &BTreeMap<String, String>,
    ) -> ModularResult<()> {
        let existing: BTreeSet<String> = pipeline
            .data_sets()
            .iter()
            .map(|name| strip_transcoding(name).to_string())
            .collect();

        let missing: BTreeSet<&str> = inputs
            .keys()
            .chain(outputs.keys())
            .map(|name| strip_transcoding(name))
            .chain(parameters.keys().map(String::as_str))
            .filter(|name| !existing.contains(*name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModularPipelineError::MissingNames(
                missing.into_iter().map(str::to_string).collect(),
            ))
        }
    }

    fn validate_inputs_outputs(
        pipeline: &Pipeline,
        inputs: &BTreeMap<String, String>,
        outputs: &BTreeMap<String, String>,
    ) -> ModularResult<()> {
        let free_inputs: BTreeSet<String> = pipeline
            .inputs()
            .iter()
            .map(|name| strip_transcoding(name).to_string())
            .collect();

        if !inputs
            .keys()
            .all(|name| free_inputs.contains(strip_transcoding(name)))
        {
            return Err(ModularPipelineError::InputsNotFree);
        }

        if outputs
            .keys()
            .any(|name| free_inputs.contains(strip_transcoding(name)))
        {
            return Err(ModularPipelineError::OutputsContainFreeInputs);
        }

        Ok(())
    }

    /// Distinct source datasets must stay distinct. Matching is by base name,
    /// so `X@csv → Y@csv` collides with a kept `Y@pandas`, while the
    /// transcoded forms of one dataset may share a target base.
    fn validate_no_collisions(table: &BTreeMap<String, String>) -> ModularResult<()> {
        // target base -> source base -> original names
        let mut by_target: BTreeMap<&str, BTreeMap<&str, Vec<&str>>> = BTreeMap::new();
        for (old, new) in table {
            by_target
                .entry(strip_transcoding(new))
                .or_default()
                .entry(strip_transcoding(old))
                .or_default()
                .push(old.as_str());
        }

        match by_target
            .into_iter()
            .find(|(_, source_bases)| source_bases.len() > 1)
        {
            Some((target, source_bases)) => Err(ModularPipelineError::DuplicateTarget {
                target: target.to_string(),
                sources: source_bases
                    .into_values()
                    .flatten()
                    .map(str::to_string)
                    .collect(),
            }),
            None => Ok(()),
        }
    }

    fn resolve_name(&self, name: &str) -> String {
        if let Some(new_name) = self.explicit.get(name) {
            return new_name.clone();
        }

        if is_all_parameters(name) {
            return name.to_string();
        }

        if let Some(key) = parameter_key(name) {
            return format!("{PARAMS_PREFIX}{}", prefix(self.namespace, key));
        }

        if let Some((base, format)) = name.split_once(TRANSCODING_SEPARATOR) {
            if let Some(new_base) = self.explicit.get(base) {
                return format!("{new_base}{TRANSCODING_SEPARATOR}{format}");
            }
        }

        prefix(self.namespace, name)
    }
}
