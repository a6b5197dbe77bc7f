//! Proves that every field reachable from a root field can be resolved.
//!
//! Each root field is walked depth-first over the federated graph. The walk carries the set of
//! subgraphs able to resolve everything seen so far on the current path. Entering an object
//! type may widen that set through entity keys: a subgraph with a resolvable key on the type
//! joins the set when the key's fields are themselves resolvable by the set. The widening is
//! repeated until nothing changes, so subgraphs reached through one key can satisfy the keys of
//! yet other subgraphs.
//!
//! A field is resolvable when at least one subgraph of the widened set resolves it. Descending
//! narrows the set to those subgraphs. An unresolvable field is reported once per path and not
//! walked further. A descent stops when it reaches a position already on its own path, so
//! cycles terminate while sibling paths through the same type are each checked.

use std::collections::BTreeMap;

use apollo_compiler::Name;
use apollo_compiler::collections::HashSet;

use crate::merger::FederatedGraph;
use crate::merger::FieldNode;
use crate::merger::SubgraphSet;
use crate::merger::TypeNode;
use crate::schema::FieldSet;
use crate::schema::FieldSetSelection;
use crate::schema::TypeKind;
use crate::subgraph::SubgraphId;

mod path;
mod resolvability_error;

use path::ResolvabilityPath;
pub use resolvability_error::ResolvabilityError;
pub use resolvability_error::RootTypeFieldData;
pub use resolvability_error::unresolvable_field_error;

/// Selections made available by `@provides`, per providing subgraph, at the current position.
type Provided = BTreeMap<SubgraphId, FieldSet>;

/// Walks every root field of `graph` and returns one error per unresolvable field.
///
/// Errors come in traversal order: root types, then root fields, then fields in graph order.
#[cfg_attr(
    feature = "snapshot_tracing",
    tracing::instrument(level = "trace", skip_all, name = "resolvability::validate")
)]
pub fn validate_resolvability(graph: &FederatedGraph) -> Vec<ResolvabilityError> {
    let mut errors = Vec::new();
    for root in graph.root_types() {
        for field in root.fields.values() {
            if field.subgraphs.is_empty() {
                // Reported while merging.
                continue;
            }
            let root_data = RootTypeFieldData {
                field_name: field.name.clone(),
                field_type_node_string: field.definition.ty.to_string(),
                path: format!("{}.{}", root.name, field.name),
                subgraphs: graph.subgraph_names(&field.subgraphs).into_iter().collect(),
                type_name: root.name.clone(),
            };
            let provided: Provided = field
                .provides
                .iter()
                .map(|(subgraph, field_set)| (*subgraph, field_set.clone()))
                .collect();

            let mut walker = Walker {
                graph,
                root: &root_data,
                ancestors: Default::default(),
                errors: &mut errors,
            };
            walker.visit_type(
                field.definition.ty.inner_named_type(),
                field.subgraphs.clone(),
                provided,
                ResolvabilityPath::root(&root.name, &field.name),
            );
        }
    }
    tracing::debug!(errors = errors.len(), "validated resolvability");
    errors
}

/// The walk of a single root field.
struct Walker<'a> {
    graph: &'a FederatedGraph,
    root: &'a RootTypeFieldData,
    /// Object positions on the current descent. Sibling branches may revisit a position,
    /// only a descendant may not.
    ancestors: HashSet<(Name, SubgraphSet, Provided)>,
    errors: &'a mut Vec<ResolvabilityError>,
}

impl<'a> Walker<'a> {
    fn visit_type(
        &mut self,
        type_name: &Name,
        resolving: SubgraphSet,
        provided: Provided,
        path: ResolvabilityPath,
    ) {
        let graph = self.graph;
        let Some(node) = graph.types.get(type_name) else {
            return;
        };
        match node.kind {
            TypeKind::Object => self.visit_object(node, resolving, provided, path),
            TypeKind::Interface | TypeKind::Union => {
                self.visit_abstract(node, &resolving, &provided, &path)
            }
            TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject => {}
        }
    }

    /// Fans out into the possible types that a subgraph of `resolving` declares as members.
    ///
    /// Keys on an interface are entered first, so an implementation declared only by a
    /// subgraph reachable through the interface key is walked too.
    fn visit_abstract(
        &mut self,
        node: &'a TypeNode,
        resolving: &SubgraphSet,
        provided: &Provided,
        path: &ResolvabilityPath,
    ) {
        let graph = self.graph;
        let reachable = self.reachable_subgraphs(node, resolving, path);
        for (possible_type, membership) in graph.possible_types(node) {
            let narrowed: SubgraphSet = reachable.intersection(membership).copied().collect();
            if narrowed.is_empty() {
                tracing::trace!(
                    abstract_type = %node.name,
                    possible_type = %possible_type.name,
                    %path,
                    "possible type is unreachable, skipping"
                );
                continue;
            }
            let provided = provided
                .iter()
                .filter(|(subgraph, _)| narrowed.contains(*subgraph))
                .map(|(subgraph, field_set)| {
                    (
                        *subgraph,
                        field_set.for_possible_type(&node.name, &possible_type.name),
                    )
                })
                .collect();
            self.visit_object(
                possible_type,
                narrowed,
                provided,
                path.fragment(&possible_type.name),
            );
        }
    }

    fn visit_object(
        &mut self,
        node: &'a TypeNode,
        resolving: SubgraphSet,
        provided: Provided,
        path: ResolvabilityPath,
    ) {
        let position = (node.name.clone(), resolving, provided);
        if self.ancestors.contains(&position) {
            tracing::trace!(type_name = %node.name, %path, "position is its own ancestor, stopping");
            return;
        }
        self.ancestors.insert(position.clone());
        let (_, resolving, provided) = &position;
        self.walk_fields(node, resolving, provided, &path);
        self.ancestors.remove(&position);
    }

    fn walk_fields(
        &mut self,
        node: &'a TypeNode,
        resolving: &SubgraphSet,
        provided: &Provided,
        path: &ResolvabilityPath,
    ) {
        let reachable = self.reachable_subgraphs(node, resolving, path);
        for field in node.fields.values() {
            let field_path = path.field(&field.name);
            let declaring = self.declaring_subgraphs(node, field, &reachable, provided);
            let next: SubgraphSet = declaring.intersection(&reachable).copied().collect();
            if next.is_empty() {
                if field.subgraphs.is_empty() {
                    // Only declared `@external`, reported while merging.
                    continue;
                }
                self.errors.push(ResolvabilityError {
                    root_type_field_data: self.root.clone(),
                    unresolvable_field_name: field.name.clone(),
                    culprit_subgraphs: self.graph.subgraph_names(&field.subgraphs),
                    full_path: field_path.to_string(),
                    unresolvable_type_name: node.name.clone(),
                });
                continue;
            }
            let provided_below = child_provided(field, &next, provided);
            self.visit_type(
                field.definition.ty.inner_named_type(),
                next,
                provided_below,
                field_path,
            );
        }
    }

    /// Widens `resolving` with every subgraph enterable through a satisfiable entity key.
    fn reachable_subgraphs(
        &self,
        node: &TypeNode,
        resolving: &SubgraphSet,
        path: &ResolvabilityPath,
    ) -> SubgraphSet {
        let mut reachable = resolving.clone();
        loop {
            let jumps: SubgraphSet = node
                .resolvable_keys()
                .filter(|(subgraph, _)| !reachable.contains(subgraph))
                .filter(|(_, key)| self.is_satisfiable(node, &key.fields, &reachable))
                .map(|(subgraph, _)| subgraph)
                .collect();
            if jumps.is_empty() {
                return reachable;
            }
            for subgraph in jumps {
                tracing::trace!(
                    type_name = %node.name,
                    subgraph = self.graph.subgraph_name(subgraph),
                    %path,
                    "entering subgraph through entity key"
                );
                reachable.insert(subgraph);
            }
        }
    }

    /// Subgraphs able to resolve `field` at this position: its resolvers whose `@requires`
    /// is satisfiable, plus subgraphs providing it through `@provides`.
    fn declaring_subgraphs(
        &self,
        node: &TypeNode,
        field: &FieldNode,
        reachable: &SubgraphSet,
        provided: &Provided,
    ) -> SubgraphSet {
        let mut declaring: SubgraphSet = field
            .subgraphs
            .iter()
            .filter(|subgraph| {
                field
                    .requires
                    .get(*subgraph)
                    .is_none_or(|requires| self.is_satisfiable(node, requires, reachable))
            })
            .copied()
            .collect();
        for (subgraph, field_set) in provided {
            let is_provided = field_set
                .top_level_field_names()
                .into_iter()
                .any(|name| *name == field.name);
            if is_provided && field.declared_in.contains(subgraph) {
                declaring.insert(*subgraph);
            }
        }
        declaring
    }

    /// Whether `field_set`, selected on `node`, can be resolved by the `available` subgraphs.
    fn is_satisfiable(&self, node: &TypeNode, field_set: &FieldSet, available: &SubgraphSet) -> bool {
        field_set.selections.iter().all(|selection| match selection {
            FieldSetSelection::Field { name, selections } => {
                let Some(field) = node.fields.get(name) else {
                    return false;
                };
                let resolvers: SubgraphSet =
                    field.subgraphs.intersection(available).copied().collect();
                if resolvers.is_empty() {
                    return false;
                }
                if selections.is_empty() {
                    return true;
                }
                self.graph
                    .types
                    .get(field.definition.ty.inner_named_type())
                    .is_some_and(|child| self.is_satisfiable(child, selections, &resolvers))
            }
            FieldSetSelection::InlineFragment {
                type_condition,
                selections,
            } => {
                let target = type_condition
                    .as_ref()
                    .and_then(|condition| self.graph.types.get(condition))
                    .unwrap_or(node);
                self.is_satisfiable(target, selections, available)
            }
        })
    }
}

/// Selections `@provides` makes available below `field` for the subgraphs resolving it.
fn child_provided(field: &FieldNode, next: &SubgraphSet, provided: &Provided) -> Provided {
    let mut child = Provided::new();
    for (subgraph, field_set) in provided {
        if !next.contains(subgraph) {
            continue;
        }
        if let Some(selection) = field_set
            .selection_for_field(&field.name)
            .filter(|selection| !selection.is_empty())
        {
            child.entry(*subgraph).or_default().extend(selection);
        }
    }
    for (subgraph, field_set) in &field.provides {
        if next.contains(subgraph) {
            child.entry(*subgraph).or_default().extend(field_set.clone());
        }
    }
    child
}
