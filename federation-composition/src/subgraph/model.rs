use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::collections::IndexSet;

use crate::schema::EntityKey;
use crate::schema::FieldSet;
use crate::schema::TypeKind;
use crate::subgraph::normalize::NormalizedField;
use crate::subgraph::normalize::NormalizedSubgraph;
use crate::subgraph::normalize::NormalizedType;
use crate::subgraph::spec::FederationVersion;
use crate::subgraph::spec::canonical_directive_name;
use crate::subgraph::spec::is_persisted_directive;

/// The per-type view of one subgraph that the merger folds together.
#[derive(Debug, Clone)]
pub struct SubgraphModel {
    pub name: Arc<str>,
    pub url: String,
    pub version: FederationVersion,
    pub types: IndexMap<Name, TypeModel>,
}

#[derive(Debug, Clone)]
pub struct TypeModel {
    pub name: Name,
    pub kind: TypeKind,
    pub description: Option<Node<str>>,
    /// Persisted directive applications only.
    pub directives: ast::DirectiveList,
    pub fields: IndexMap<Name, FieldModel>,
    pub implements_interfaces: IndexSet<Name>,
    pub union_members: IndexSet<Name>,
    pub enum_values: Vec<Node<ast::EnumValueDefinition>>,
    pub input_fields: Vec<Node<ast::InputValueDefinition>>,
    /// Every key this subgraph declares for the type, resolvable or not.
    pub keys: Vec<EntityKey>,
}

impl TypeModel {
    /// Whether this subgraph can resolve the type standalone through at least one key.
    pub fn is_entity(&self) -> bool {
        self.keys.iter().any(|key| key.resolvable)
    }

    pub fn resolvable_keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.keys.iter().filter(|key| key.resolvable)
    }
}

/// A field of one subgraph type, with its federation annotations resolved.
#[derive(Debug, Clone)]
pub struct FieldModel {
    /// The field as it appears in the supergraph, persisted directives only.
    pub definition: Node<ast::FieldDefinition>,
    /// Effective shareability: explicitly `@shareable`, a key field, or any field of a
    /// Federation 1 subgraph.
    pub shareable: bool,
    /// Whether the field is `@external` and not part of a key of its type.
    pub external: bool,
    pub provides: Option<FieldSet>,
    pub requires: Option<FieldSet>,
    pub override_from: Option<String>,
}

pub fn build_subgraph_model(subgraph: NormalizedSubgraph) -> SubgraphModel {
    let version = subgraph.version;
    let types: IndexMap<Name, TypeModel> = subgraph
        .types
        .into_iter()
        .map(|(name, ty)| (name, build_type_model(ty, version)))
        .collect();
    tracing::trace!(subgraph = %subgraph.name, types = types.len(), "built subgraph model");
    SubgraphModel {
        name: subgraph.name,
        url: subgraph.url,
        version,
        types,
    }
}

fn build_type_model(ty: NormalizedType, version: FederationVersion) -> TypeModel {
    let key_fields: IndexSet<Name> = ty
        .keys
        .iter()
        .flat_map(|key| key.fields.top_level_field_names())
        .cloned()
        .collect();
    let fields = ty
        .fields
        .into_iter()
        .map(|(name, field)| {
            let is_key_field = key_fields.contains(&name);
            (name, build_field_model(field, is_key_field, version))
        })
        .collect();

    TypeModel {
        name: ty.name,
        kind: ty.kind,
        description: ty.description,
        directives: persisted_directives(&ty.directives),
        fields,
        implements_interfaces: ty.implements_interfaces.into_iter().collect(),
        union_members: ty.union_members.into_iter().collect(),
        enum_values: ty
            .enum_values
            .into_iter()
            .map(|mut value| {
                let directives = persisted_directives(&value.directives);
                value.make_mut().directives = directives;
                value
            })
            .collect(),
        input_fields: ty
            .input_fields
            .into_iter()
            .map(|input_field| strip_input_value(&input_field))
            .collect(),
        keys: ty.keys,
    }
}

fn build_field_model(
    field: NormalizedField,
    is_key_field: bool,
    version: FederationVersion,
) -> FieldModel {
    let mut definition = field.definition;
    let directives = persisted_directives(&definition.directives);
    let arguments = definition.arguments.iter().map(strip_input_value).collect();
    let definition_mut = definition.make_mut();
    definition_mut.directives = directives;
    definition_mut.arguments = arguments;

    FieldModel {
        definition,
        shareable: field.shareable || is_key_field || version == FederationVersion::V1,
        external: field.external && !is_key_field,
        provides: field.provides,
        requires: field.requires,
        override_from: field.override_from,
    }
}

fn strip_input_value(
    input_value: &Node<ast::InputValueDefinition>,
) -> Node<ast::InputValueDefinition> {
    let mut input_value = input_value.clone();
    let directives = persisted_directives(&input_value.directives);
    input_value.make_mut().directives = directives;
    input_value
}

/// Keeps the directive applications the supergraph carries, under their unprefixed names.
fn persisted_directives(directives: &ast::DirectiveList) -> ast::DirectiveList {
    ast::DirectiveList(
        directives
            .iter()
            .filter(|directive| is_persisted_directive(&directive.name))
            .map(|directive| {
                let canonical = canonical_directive_name(&directive.name);
                match Name::new(canonical) {
                    Ok(name) if name != directive.name => {
                        let mut directive = directive.clone();
                        directive.make_mut().name = name;
                        directive
                    }
                    _ => directive.clone(),
                }
            })
            .collect(),
    )
}
