//! Schema-level building blocks shared by the composition passes.

pub mod field_set;

pub use field_set::FieldSet;
pub use field_set::FieldSetSelection;

/// The closed set of named type kinds a subgraph or the federated graph can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Scalar,
    Enum,
    #[strum(to_string = "input object")]
    InputObject,
}

impl TypeKind {
    /// Object, interface and union types, i.e. types that need a selection set.
    pub fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::Union)
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Interface | Self::Union)
    }

    pub fn is_input(self) -> bool {
        matches!(self, Self::Scalar | Self::Enum | Self::InputObject)
    }

    /// Object and interface types, i.e. types that declare fields.
    pub fn has_fields(self) -> bool {
        matches!(self, Self::Object | Self::Interface)
    }
}

/// A key declared on an entity by one subgraph.
///
/// A subgraph declaring a resolvable key can resolve the entity standalone given the values of
/// the key fields, which is what permits a subgraph jump during the resolvability walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub fields: FieldSet,
    pub resolvable: bool,
}
