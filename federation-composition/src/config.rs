use serde::Deserialize;
use serde::Serialize;

/// Options controlling a composition run.
///
/// The options can be deserialized from the composition section of a host configuration file;
/// unknown keys are rejected so that typos surface instead of silently using defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositionOptions {
    /// Skips the root-field resolvability walk entirely. Merge errors are still reported and
    /// still prevent a supergraph from being produced.
    ///
    /// Only intended for migrating existing graphs whose subgraphs are known to be resolvable
    /// through means the walk does not model.
    ///
    /// Defaults to false.
    pub disable_resolvability_validation: bool,
}
