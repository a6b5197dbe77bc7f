use std::fmt;

use apollo_compiler::Name;
use apollo_compiler::collections::IndexSet;

use crate::error::CompositionError;
use crate::utils::human_readable::human_readable_subgraph_names;

/// The root field whose walk found an unresolvable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTypeFieldData {
    pub field_name: Name,
    /// The printed type of the root field, e.g. `[Human]`.
    pub field_type_node_string: String,
    /// `Type.field` of the root field.
    pub path: String,
    /// Subgraphs resolving the root field.
    pub subgraphs: IndexSet<String>,
    pub type_name: Name,
}

/// A field reachable from a root field that no reachable subgraph can resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvabilityError {
    pub root_type_field_data: RootTypeFieldData,
    pub unresolvable_field_name: Name,
    /// Subgraphs defining the field, none of which is reachable on this path.
    pub culprit_subgraphs: Vec<String>,
    pub full_path: String,
    pub unresolvable_type_name: Name,
}

impl fmt::Display for ResolvabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = &self.root_type_field_data;
        let coordinate = format!(
            "{}.{}",
            self.unresolvable_type_name, self.unresolvable_field_name
        );
        write!(
            f,
            "The path \"{}\" cannot be resolved: the root field \"{}\" is resolved by {}, but \"{coordinate}\" is only defined in {}, which cannot be reached from there. \
             Either make \"{}\" an entity whose key is resolvable from the root field subgraphs, or define \"{coordinate}\" in a subgraph reachable on this path.",
            self.full_path,
            root.path,
            human_readable_subgraph_names(&root.subgraphs),
            human_readable_subgraph_names(&self.culprit_subgraphs),
            self.unresolvable_type_name,
        )
    }
}

impl std::error::Error for ResolvabilityError {}

/// Builds the composition error reported for an unresolvable field.
pub fn unresolvable_field_error(
    root_type_field_data: RootTypeFieldData,
    unresolvable_field_name: Name,
    culprit_subgraphs: Vec<String>,
    full_path: impl Into<String>,
    unresolvable_type_name: Name,
) -> CompositionError {
    ResolvabilityError {
        root_type_field_data,
        unresolvable_field_name,
        culprit_subgraphs,
        full_path: full_path.into(),
        unresolvable_type_name,
    }
    .into()
}
