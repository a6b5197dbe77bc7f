use apollo_compiler::Name;

use crate::composition::resolvability::ResolvabilityError;

/// Any error that can be reported by a composition run.
///
/// Normalization errors (`InvalidSubgraphName`, `Parse`, `DirectiveUsage`) abort composition
/// before merging. Merge errors and resolvability errors are collected together so that a
/// single run reports the complete diagnostic set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositionError {
    #[error("{message}")]
    InvalidSubgraphName { message: String },
    #[error("[{subgraph}] {message}")]
    Parse { subgraph: String, message: String },
    #[error("[{subgraph}] {message}")]
    DirectiveUsage { subgraph: String, message: String },
    #[error("{message}")]
    ShareableConflict {
        type_name: Name,
        field_name: Name,
        message: String,
    },
    #[error("{message}")]
    TypeMismatch { type_name: Name, message: String },
    #[error("{message}")]
    ExternalMissingOnBase {
        type_name: Name,
        field_name: Name,
        message: String,
    },
    #[error("{message}")]
    InvalidInterfaceImplementation { type_name: Name, message: String },
    #[error("{0}")]
    UnresolvableField(Box<ResolvabilityError>),
    #[error("An internal error occurred during composition: {message}")]
    Internal { message: String },
}

impl CompositionError {
    /// A stable, machine readable code for this error, e.g. `SHAREABLE_CONFLICT`.
    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Whether this error is detected while folding subgraphs together, as opposed to while
    /// validating a single subgraph or walking the merged graph.
    pub fn is_merge_error(&self) -> bool {
        matches!(
            self,
            Self::ShareableConflict { .. }
                | Self::TypeMismatch { .. }
                | Self::ExternalMissingOnBase { .. }
                | Self::InvalidInterfaceImplementation { .. }
        )
    }

    pub fn as_resolvability_error(&self) -> Option<&ResolvabilityError> {
        match self {
            Self::UnresolvableField(error) => Some(error),
            _ => None,
        }
    }

    pub(crate) fn parse(subgraph: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            subgraph: subgraph.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn directive_usage(subgraph: &str, message: impl Into<String>) -> Self {
        Self::DirectiveUsage {
            subgraph: subgraph.to_owned(),
            message: message.into(),
        }
    }
}

impl From<ResolvabilityError> for CompositionError {
    fn from(error: ResolvabilityError) -> Self {
        Self::UnresolvableField(Box::new(error))
    }
}
