//! The federated type graph and the merger that builds it.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::collections::IndexMap;

use crate::schema::EntityKey;
use crate::schema::FieldSet;
use crate::schema::TypeKind;
use crate::subgraph::SubgraphId;
use crate::subgraph::spec::FederationVersion;
use crate::subgraph::spec::ROOT_TYPE_NAMES;

mod interfaces;
#[allow(clippy::module_inception)]
mod merger;

pub use merger::merge;

/// A set of subgraphs, iterating in composition input order.
pub type SubgraphSet = BTreeSet<SubgraphId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphInfo {
    pub name: Arc<str>,
    pub url: String,
    pub version: FederationVersion,
}

/// All subgraphs folded into one graph of named types.
///
/// Built by [`merge`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FederatedGraph {
    pub subgraphs: Vec<SubgraphInfo>,
    pub version: FederationVersion,
    /// Types in first-seen order across the input subgraphs.
    pub types: IndexMap<Name, TypeNode>,
}

impl FederatedGraph {
    pub fn subgraph_name(&self, id: SubgraphId) -> &str {
        self.subgraphs
            .get(id.index())
            .map(|subgraph| &*subgraph.name)
            .unwrap_or_default()
    }

    /// Names of the subgraphs in `set`, in input order.
    pub fn subgraph_names<'a>(
        &'a self,
        set: impl IntoIterator<Item = &'a SubgraphId>,
    ) -> Vec<String> {
        set.into_iter()
            .map(|id| self.subgraph_name(*id).to_owned())
            .collect()
    }

    pub fn subgraph_id(&self, name: &str) -> Option<SubgraphId> {
        self.subgraphs
            .iter()
            .position(|subgraph| &*subgraph.name == name)
            .map(SubgraphId)
    }

    /// The root operation types present in the graph, `Query` first.
    pub fn root_types(&self) -> impl Iterator<Item = &TypeNode> {
        ROOT_TYPE_NAMES
            .iter()
            .filter_map(|name| self.types.get(*name))
            .filter(|node| node.kind == TypeKind::Object)
    }

    /// The object types an abstract type can resolve to, each with the subgraphs declaring
    /// the membership.
    ///
    /// Possible types come in graph order.
    pub fn possible_types<'a>(
        &'a self,
        abstract_type: &'a TypeNode,
    ) -> impl Iterator<Item = (&'a TypeNode, &'a SubgraphSet)> + 'a {
        self.types
            .values()
            .filter(|node| node.kind == TypeKind::Object)
            .filter_map(move |node| {
                let membership = match abstract_type.kind {
                    TypeKind::Union => abstract_type.union_members.get(&node.name),
                    TypeKind::Interface => node.implemented_interfaces.get(&abstract_type.name),
                    _ => None,
                }?;
                Some((node, membership))
            })
    }
}

/// One named type of the federated graph.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: Name,
    pub kind: TypeKind,
    pub description: Option<Node<str>>,
    pub directives: ast::DirectiveList,
    pub fields: IndexMap<Name, FieldNode>,
    /// Implemented interface, with the subgraphs declaring the implementation.
    pub implemented_interfaces: IndexMap<Name, SubgraphSet>,
    /// Union member, with the subgraphs declaring the membership.
    pub union_members: IndexMap<Name, SubgraphSet>,
    pub enum_values: IndexMap<Name, Node<ast::EnumValueDefinition>>,
    pub input_fields: IndexMap<Name, InputFieldNode>,
    /// Subgraphs defining the type.
    pub subgraphs: SubgraphSet,
    /// Keys per declaring subgraph.
    pub keys: BTreeMap<SubgraphId, Vec<EntityKey>>,
}

impl TypeNode {
    pub(crate) fn new(name: Name, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            description: None,
            directives: Default::default(),
            fields: Default::default(),
            implemented_interfaces: Default::default(),
            union_members: Default::default(),
            enum_values: Default::default(),
            input_fields: Default::default(),
            subgraphs: Default::default(),
            keys: Default::default(),
        }
    }

    /// Resolvable keys per subgraph. Subgraphs whose keys are all non-resolvable are left out.
    pub fn resolvable_keys(&self) -> impl Iterator<Item = (SubgraphId, &EntityKey)> {
        self.keys.iter().flat_map(|(subgraph, keys)| {
            keys.iter()
                .filter(|key| key.resolvable)
                .map(move |key| (*subgraph, key))
        })
    }

    pub fn is_entity(&self) -> bool {
        self.resolvable_keys().next().is_some()
    }
}

/// One field of an object or interface type of the federated graph.
#[derive(Debug, Clone)]
pub struct FieldNode {
    pub name: Name,
    /// The merged definition: first non-external declaration, with arguments unioned.
    pub definition: Node<ast::FieldDefinition>,
    /// Every subgraph declaring the field, external declarations included.
    pub declared_in: SubgraphSet,
    /// Subgraphs able to resolve the field: declared, not `@external`, not overridden.
    pub subgraphs: SubgraphSet,
    pub shareable_in: SubgraphSet,
    pub external_in: SubgraphSet,
    /// Subgraphs whose declaration was taken over through `@override`.
    pub overridden_in: SubgraphSet,
    pub provides: BTreeMap<SubgraphId, FieldSet>,
    pub requires: BTreeMap<SubgraphId, FieldSet>,
    /// Overriding subgraph, with the name of the subgraph it overrides.
    pub overrides: BTreeMap<SubgraphId, String>,
    pub(crate) definition_subgraph: Option<SubgraphId>,
    /// `@external` declarations seen before the authoritative one, checked once it arrives.
    pub(crate) pending_external_types: Vec<(SubgraphId, ast::Type)>,
}

impl FieldNode {
    pub(crate) fn new(definition: Node<ast::FieldDefinition>) -> Self {
        Self {
            name: definition.name.clone(),
            definition,
            declared_in: Default::default(),
            subgraphs: Default::default(),
            shareable_in: Default::default(),
            external_in: Default::default(),
            overridden_in: Default::default(),
            provides: Default::default(),
            requires: Default::default(),
            overrides: Default::default(),
            definition_subgraph: None,
            pending_external_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputFieldNode {
    pub definition: Node<ast::InputValueDefinition>,
    pub subgraphs: SubgraphSet,
}

impl fmt::Display for FederatedGraph {
    /// A compact dump of the graph for trace snapshots.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.types.values() {
            writeln!(
                f,
                "{} {} [{}]",
                node.kind,
                node.name,
                self.subgraph_names(&node.subgraphs).join(", ")
            )?;
            for field in node.fields.values() {
                writeln!(
                    f,
                    "  {}: {} [{}]",
                    field.name,
                    field.definition.ty,
                    self.subgraph_names(&field.subgraphs).join(", ")
                )?;
            }
        }
        Ok(())
    }
}
