pub mod resolvability;

use crate::config::CompositionOptions;
use crate::error::CompositionError;
use crate::merger::merge;
use crate::subgraph::Subgraph;
use crate::subgraph::model::build_subgraph_model;
use crate::subgraph::normalize::normalize_subgraphs;
use crate::supergraph::Supergraph;

/// Composes `subgraphs` into a supergraph with the default options.
///
/// The order of `subgraphs` drives the order of types and fields in the supergraph and the
/// order errors are reported in, but never whether composition succeeds.
pub fn compose(subgraphs: Vec<Subgraph>) -> Result<Supergraph, Vec<CompositionError>> {
    compose_with_options(subgraphs, &CompositionOptions::default())
}

#[cfg_attr(
    feature = "snapshot_tracing",
    tracing::instrument(level = "trace", skip_all, name = "composition::compose")
)]
pub fn compose_with_options(
    subgraphs: Vec<Subgraph>,
    options: &CompositionOptions,
) -> Result<Supergraph, Vec<CompositionError>> {
    tracing::debug!(subgraphs = subgraphs.len(), "composing subgraphs");
    let normalized = normalize_subgraphs(&subgraphs)?;
    let models = normalized.into_iter().map(build_subgraph_model).collect();

    let (graph, mut errors) = merge(models);
    if options.disable_resolvability_validation {
        tracing::debug!("resolvability validation is disabled");
    } else {
        errors.extend(
            resolvability::validate_resolvability(&graph)
                .into_iter()
                .map(CompositionError::from),
        );
    }
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "composition failed");
        return Err(errors);
    }

    Supergraph::from_federated_graph(&graph).map_err(|error| vec![error])
}
