use std::fmt;

use apollo_compiler::ast;

use crate::error::CompositionError;

pub mod model;
pub mod normalize;
pub mod spec;

pub use spec::FederationVersion;

/// One independently owned schema contributed to a federation.
///
/// The document is the already-parsed type-system document of the subgraph. Subgraphs are
/// immutable once handed to composition; their order in the input list is the iteration order
/// of the whole pipeline.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub name: String,
    pub url: String,
    pub document: ast::Document,
}

impl Subgraph {
    pub fn new(name: &str, url: &str, document: ast::Document) -> Self {
        Self {
            name: name.to_owned(),
            url: url.to_owned(),
            document,
        }
    }

    /// Parses `schema_str` as the SDL of a subgraph named `name`.
    pub fn parse(name: &str, url: &str, schema_str: &str) -> Result<Self, CompositionError> {
        let document = ast::Document::parse(schema_str, format!("{name}.graphql"))
            .map_err(|with_errors| CompositionError::parse(name, with_errors.errors.to_string()))?;
        Ok(Self::new(name, url, document))
    }
}

/// Position of a subgraph in the ordered composition input.
///
/// Sets of subgraph ids iterate in input order, which keeps every diagnostic deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubgraphId(pub(crate) usize);

impl SubgraphId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SubgraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
