//! Names and placement rules of the federation directives understood by composition.

use crate::schema::TypeKind;

pub(crate) const KEY_DIRECTIVE_NAME: &str = "key";
pub(crate) const EXTENDS_DIRECTIVE_NAME: &str = "extends";
pub(crate) const SHAREABLE_DIRECTIVE_NAME: &str = "shareable";
pub(crate) const EXTERNAL_DIRECTIVE_NAME: &str = "external";
pub(crate) const PROVIDES_DIRECTIVE_NAME: &str = "provides";
pub(crate) const REQUIRES_DIRECTIVE_NAME: &str = "requires";
pub(crate) const OVERRIDE_DIRECTIVE_NAME: &str = "override";
pub(crate) const INACCESSIBLE_DIRECTIVE_NAME: &str = "inaccessible";
pub(crate) const TAG_DIRECTIVE_NAME: &str = "tag";
pub(crate) const LINK_DIRECTIVE_NAME: &str = "link";

pub(crate) const FIELDS_ARGUMENT_NAME: &str = "fields";
pub(crate) const RESOLVABLE_ARGUMENT_NAME: &str = "resolvable";
pub(crate) const FROM_ARGUMENT_NAME: &str = "from";
pub(crate) const URL_ARGUMENT_NAME: &str = "url";

pub(crate) const FEDERATION_V2_LINK_PREFIX: &str = "specs.apollo.dev/federation/v2";
const FEDERATION_DIRECTIVE_PREFIX: &str = "federation__";

/// Directive applications carried over from the subgraphs into the supergraph.
pub(crate) const PERSISTED_DIRECTIVE_NAMES: [&str; 4] = [
    "deprecated",
    "specifiedBy",
    TAG_DIRECTIVE_NAME,
    INACCESSIBLE_DIRECTIVE_NAME,
];

/// Field-level directives that may be applied at most once per field.
pub(crate) const NON_REPEATABLE_DIRECTIVE_NAMES: [&str; 3] = [
    PROVIDES_DIRECTIVE_NAME,
    REQUIRES_DIRECTIVE_NAME,
    OVERRIDE_DIRECTIVE_NAME,
];

pub(crate) const BUILT_IN_SCALAR_NAMES: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Subgraph plumbing generated by federation-aware servers, never merged.
const FEDERATION_TYPE_NAMES: [&str; 6] = [
    "_Service",
    "_Entity",
    "_Any",
    "_FieldSet",
    "FieldSet",
    "openfed__FieldSet",
];
pub(crate) const FEDERATION_QUERY_FIELD_NAMES: [&str; 2] = ["_service", "_entities"];

pub(crate) const QUERY_TYPE_NAME: &str = "Query";
pub(crate) const MUTATION_TYPE_NAME: &str = "Mutation";
pub(crate) const SUBSCRIPTION_TYPE_NAME: &str = "Subscription";
pub(crate) const ROOT_TYPE_NAMES: [&str; 3] =
    [QUERY_TYPE_NAME, MUTATION_TYPE_NAME, SUBSCRIPTION_TYPE_NAME];

const SUPERGRAPH_BASE_SCHEMA_V1: &str = r#"
directive @tag(name: String!) repeatable on ARGUMENT_DEFINITION | ENUM | ENUM_VALUE | FIELD_DEFINITION | INPUT_FIELD_DEFINITION | INPUT_OBJECT | INTERFACE | OBJECT | SCALAR | UNION
"#;

const SUPERGRAPH_BASE_SCHEMA_V2: &str = r#"
directive @tag(name: String!) repeatable on ARGUMENT_DEFINITION | ENUM | ENUM_VALUE | FIELD_DEFINITION | INPUT_FIELD_DEFINITION | INPUT_OBJECT | INTERFACE | OBJECT | SCALAR | UNION
directive @inaccessible on ARGUMENT_DEFINITION | ENUM | ENUM_VALUE | FIELD_DEFINITION | INPUT_FIELD_DEFINITION | INPUT_OBJECT | INTERFACE | OBJECT | SCALAR | UNION
"#;

/// The federation version a subgraph is written against.
///
/// In Federation 1 every field is implicitly shareable; Federation 2 requires `@shareable` (or
/// a key) on every field resolved by more than one subgraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum_macros::Display)]
pub enum FederationVersion {
    #[default]
    #[strum(to_string = "Federation 1")]
    V1,
    #[strum(to_string = "Federation 2")]
    V2,
}

impl FederationVersion {
    /// The directive definitions every supergraph of this version starts with.
    pub fn base_schema(self) -> &'static str {
        match self {
            Self::V1 => SUPERGRAPH_BASE_SCHEMA_V1,
            Self::V2 => SUPERGRAPH_BASE_SCHEMA_V2,
        }
    }
}

/// Where a directive is applied, at the granularity placement rules need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub(crate) enum DirectiveTarget {
    #[strum(to_string = "object type")]
    Object,
    #[strum(to_string = "interface type")]
    Interface,
    #[strum(to_string = "union type")]
    Union,
    #[strum(to_string = "scalar type")]
    Scalar,
    #[strum(to_string = "enum type")]
    Enum,
    #[strum(to_string = "input object type")]
    InputObject,
    #[strum(to_string = "object field")]
    ObjectField,
    #[strum(to_string = "interface field")]
    InterfaceField,
    #[strum(to_string = "argument")]
    Argument,
    #[strum(to_string = "enum value")]
    EnumValue,
    #[strum(to_string = "input field")]
    InputField,
    #[strum(to_string = "schema")]
    Schema,
}

impl DirectiveTarget {
    pub(crate) fn for_type(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Object => Self::Object,
            TypeKind::Interface => Self::Interface,
            TypeKind::Union => Self::Union,
            TypeKind::Scalar => Self::Scalar,
            TypeKind::Enum => Self::Enum,
            TypeKind::InputObject => Self::InputObject,
        }
    }

    pub(crate) fn for_field(kind: TypeKind) -> Self {
        if kind == TypeKind::Interface {
            Self::InterfaceField
        } else {
            Self::ObjectField
        }
    }
}

const ANYWHERE: &[DirectiveTarget] = &[
    DirectiveTarget::Object,
    DirectiveTarget::Interface,
    DirectiveTarget::Union,
    DirectiveTarget::Scalar,
    DirectiveTarget::Enum,
    DirectiveTarget::InputObject,
    DirectiveTarget::ObjectField,
    DirectiveTarget::InterfaceField,
    DirectiveTarget::Argument,
    DirectiveTarget::EnumValue,
    DirectiveTarget::InputField,
];

/// Placement rules of one federation directive.
#[derive(Debug)]
pub(crate) struct FederationDirective {
    pub(crate) name: &'static str,
    pub(crate) targets: &'static [DirectiveTarget],
    /// Using this directive makes a subgraph a Federation 2 subgraph.
    pub(crate) v2_only: bool,
    /// Directives composition knows about but cannot honor.
    pub(crate) supported: bool,
}

pub(crate) const FEDERATION_DIRECTIVES: &[FederationDirective] = &[
    FederationDirective {
        name: KEY_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::Object, DirectiveTarget::Interface],
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: EXTENDS_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::Object, DirectiveTarget::Interface],
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: SHAREABLE_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::Object, DirectiveTarget::ObjectField],
        v2_only: true,
        supported: true,
    },
    FederationDirective {
        name: EXTERNAL_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::Object, DirectiveTarget::ObjectField],
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: PROVIDES_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::ObjectField],
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: REQUIRES_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::ObjectField],
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: OVERRIDE_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::ObjectField],
        v2_only: true,
        supported: true,
    },
    FederationDirective {
        name: INACCESSIBLE_DIRECTIVE_NAME,
        targets: ANYWHERE,
        v2_only: true,
        supported: true,
    },
    FederationDirective {
        name: TAG_DIRECTIVE_NAME,
        targets: ANYWHERE,
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: LINK_DIRECTIVE_NAME,
        targets: &[DirectiveTarget::Schema],
        v2_only: false,
        supported: true,
    },
    FederationDirective {
        name: "composeDirective",
        targets: &[DirectiveTarget::Schema],
        v2_only: true,
        supported: true,
    },
    FederationDirective {
        name: "interfaceObject",
        targets: &[DirectiveTarget::Object],
        v2_only: true,
        supported: false,
    },
    FederationDirective {
        name: "context",
        targets: &[DirectiveTarget::Object, DirectiveTarget::Interface, DirectiveTarget::Union],
        v2_only: true,
        supported: false,
    },
    FederationDirective {
        name: "fromContext",
        targets: &[DirectiveTarget::Argument],
        v2_only: true,
        supported: false,
    },
];

/// Strips the `federation__` namespace some subgraphs use for federation directives.
pub(crate) fn canonical_directive_name(name: &str) -> &str {
    name.strip_prefix(FEDERATION_DIRECTIVE_PREFIX).unwrap_or(name)
}

pub(crate) fn federation_directive(name: &str) -> Option<&'static FederationDirective> {
    let name = canonical_directive_name(name);
    FEDERATION_DIRECTIVES
        .iter()
        .find(|directive| directive.name == name)
}

pub(crate) fn is_persisted_directive(name: &str) -> bool {
    PERSISTED_DIRECTIVE_NAMES.contains(&canonical_directive_name(name))
}

pub(crate) fn is_federation_type_name(name: &str) -> bool {
    FEDERATION_TYPE_NAMES.contains(&name)
        || name.starts_with("link__")
        || name.starts_with(FEDERATION_DIRECTIVE_PREFIX)
}

pub(crate) fn is_built_in_scalar(name: &str) -> bool {
    BUILT_IN_SCALAR_NAMES.contains(&name)
}

pub(crate) fn is_root_type_name(name: &str) -> bool {
    ROOT_TYPE_NAMES.contains(&name)
}
