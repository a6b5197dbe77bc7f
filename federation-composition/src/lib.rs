//! Composition of federated GraphQL subgraphs.
//!
//! Given an ordered list of independently authored subgraph schemas, [`compose`] merges them
//! into a single supergraph and proves that every field reachable from the root operation
//! types can be resolved by some combination of subgraph fetches, jumping between subgraphs
//! through entity keys where needed.
//!
//! The pipeline runs in five passes:
//!
//! 1. [`subgraph::normalize`] validates each subgraph document and folds extensions into
//!    whole definitions.
//! 2. [`subgraph::model`] turns a normalized subgraph into a per-type map carrying entity
//!    keys and field-level federation annotations.
//! 3. [`merger`] folds all subgraph models into one [`merger::FederatedGraph`].
//! 4. [`composition::resolvability`] walks the federated graph from every root field.
//! 5. [`supergraph`] prints the validated graph back into an AST document.
//!
//! Composition is all-or-nothing: any error means no supergraph is produced.

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod composition;
pub mod config;
pub mod error;
pub mod merger;
pub mod schema;
pub mod subgraph;
pub mod supergraph;
pub(crate) mod utils;

pub use crate::composition::compose;
pub use crate::composition::compose_with_options;
pub use crate::composition::resolvability::ResolvabilityError;
pub use crate::composition::resolvability::RootTypeFieldData;
pub use crate::composition::resolvability::unresolvable_field_error;
pub use crate::config::CompositionOptions;
pub use crate::error::CompositionError;
pub use crate::subgraph::Subgraph;
pub use crate::supergraph::Supergraph;

const _: () = {
    const fn assert_thread_safe<T: Sync + Send>() {}

    assert_thread_safe::<Subgraph>();
    assert_thread_safe::<Supergraph>();
    assert_thread_safe::<merger::FederatedGraph>();
};
