use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use indexmap::map::Entry;

use crate::error::CompositionError;
use crate::merger::FederatedGraph;
use crate::merger::FieldNode;
use crate::merger::InputFieldNode;
use crate::merger::SubgraphInfo;
use crate::merger::TypeNode;
use crate::merger::interfaces::validate_interface_implementations;
use crate::schema::TypeKind;
use crate::subgraph::SubgraphId;
use crate::subgraph::model::FieldModel;
use crate::subgraph::model::SubgraphModel;
use crate::subgraph::model::TypeModel;
use crate::utils::human_readable::human_readable_subgraph_names;
use crate::utils::logging::snapshot;

/// Folds subgraph models into one federated graph.
///
/// Subgraphs are folded in input order, so types and fields keep their first-seen order.
/// Errors do not stop merging: the graph is always returned so resolvability can still be
/// evaluated and reported alongside the merge errors.
#[cfg_attr(
    feature = "snapshot_tracing",
    tracing::instrument(level = "trace", skip_all, name = "merger::merge")
)]
pub fn merge(subgraphs: Vec<SubgraphModel>) -> (FederatedGraph, Vec<CompositionError>) {
    let mut merger = Merger::new(&subgraphs);
    for (index, subgraph) in subgraphs.iter().enumerate() {
        let id = SubgraphId(index);
        for ty in subgraph.types.values() {
            merger.merge_type(id, ty);
        }
    }
    merger.resolve_field_ownership();
    merger.check_shareability();

    let Merger {
        graph, mut errors, ..
    } = merger;
    errors.extend(validate_interface_implementations(&graph));

    snapshot!("FederatedGraph", graph.to_string(), "merged federated graph");
    tracing::debug!(
        types = graph.types.len(),
        errors = errors.len(),
        version = %graph.version,
        "merged subgraphs"
    );
    (graph, errors)
}

struct Merger {
    graph: FederatedGraph,
    subgraph_names: Vec<String>,
    errors: Vec<CompositionError>,
}

impl Merger {
    fn new(subgraphs: &[SubgraphModel]) -> Self {
        let version = subgraphs
            .iter()
            .map(|subgraph| subgraph.version)
            .max()
            .unwrap_or_default();
        Self {
            graph: FederatedGraph {
                subgraphs: subgraphs
                    .iter()
                    .map(|subgraph| SubgraphInfo {
                        name: subgraph.name.clone(),
                        url: subgraph.url.clone(),
                        version: subgraph.version,
                    })
                    .collect(),
                version,
                types: Default::default(),
            },
            subgraph_names: subgraphs
                .iter()
                .map(|subgraph| subgraph.name.to_string())
                .collect(),
            errors: Vec::new(),
        }
    }

    fn merge_type(&mut self, id: SubgraphId, ty: &TypeModel) {
        let subgraph_names = &self.subgraph_names;
        let name_of = |id: SubgraphId| subgraph_names[id.index()].as_str();

        let node = match self.graph.types.entry(ty.name.clone()) {
            Entry::Vacant(entry) => entry.insert(TypeNode::new(ty.name.clone(), ty.kind)),
            Entry::Occupied(entry) => {
                let node = entry.into_mut();
                if node.kind != ty.kind {
                    let first = node.subgraphs.first().copied().unwrap_or(id);
                    self.errors.push(CompositionError::TypeMismatch {
                        type_name: ty.name.clone(),
                        message: format!(
                            "Type \"{}\" is defined as {} type in subgraph \"{}\" but as {} type in subgraph \"{}\"",
                            ty.name,
                            node.kind,
                            name_of(first),
                            ty.kind,
                            name_of(id)
                        ),
                    });
                    return;
                }
                node
            }
        };

        node.subgraphs.insert(id);
        merge_description(&mut node.description, &ty.description);
        merge_directives(&mut node.directives, &ty.directives);
        if !ty.keys.is_empty() {
            node.keys.insert(id, ty.keys.clone());
        }
        for interface in &ty.implements_interfaces {
            node.implemented_interfaces
                .entry(interface.clone())
                .or_default()
                .insert(id);
        }
        for member in &ty.union_members {
            node.union_members.entry(member.clone()).or_default().insert(id);
        }
        for value in &ty.enum_values {
            match node.enum_values.entry(value.value.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(value.clone());
                }
                Entry::Occupied(mut entry) => {
                    let merged = entry.get_mut().make_mut();
                    merge_description(&mut merged.description, &value.description);
                    merge_directives(&mut merged.directives, &value.directives);
                }
            }
        }
        for input_field in &ty.input_fields {
            match node.input_fields.entry(input_field.name.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(InputFieldNode {
                        definition: input_field.clone(),
                        subgraphs: [id].into(),
                    });
                }
                Entry::Occupied(mut entry) => {
                    let merged = entry.get_mut();
                    if merged.definition.ty != input_field.ty {
                        self.errors.push(CompositionError::TypeMismatch {
                            type_name: ty.name.clone(),
                            message: format!(
                                "Input field \"{}.{}\" has type \"{}\" in {} but type \"{}\" in subgraph \"{}\"",
                                ty.name,
                                input_field.name,
                                merged.definition.ty,
                                human_readable_subgraph_names(merged.subgraphs.iter().map(|id| name_of(*id))),
                                input_field.ty,
                                name_of(id)
                            ),
                        });
                    }
                    merged.subgraphs.insert(id);
                    let definition = merged.definition.make_mut();
                    merge_description(&mut definition.description, &input_field.description);
                    merge_directives(&mut definition.directives, &input_field.directives);
                }
            }
        }
        for field in ty.fields.values() {
            let errors = merge_field(node, id, field, &name_of);
            self.errors.extend(errors);
        }
    }

    /// Applies `@override` and `@external` to find the subgraphs resolving each field.
    fn resolve_field_ownership(&mut self) {
        let subgraph_names = &self.subgraph_names;
        let subgraph_id = |name: &str| {
            subgraph_names
                .iter()
                .position(|subgraph_name| subgraph_name == name)
                .map(SubgraphId)
        };

        for node in self.graph.types.values_mut() {
            for field in node.fields.values_mut() {
                for (overrider, from) in &field.overrides {
                    match subgraph_id(from.as_str()) {
                        Some(from_id) if from_id != *overrider => {
                            if field.declared_in.contains(&from_id) {
                                field.overridden_in.insert(from_id);
                            }
                        }
                        Some(_) => {}
                        None => tracing::debug!(
                            field = %format_args!("{}.{}", node.name, field.name),
                            from = from.as_str(),
                            "@override references an unknown subgraph"
                        ),
                    }
                }
                field.subgraphs = field
                    .declared_in
                    .iter()
                    .filter(|id| !field.external_in.contains(id) && !field.overridden_in.contains(id))
                    .copied()
                    .collect();

                if node.kind == TypeKind::Object && field.subgraphs.is_empty() {
                    let declarers = field
                        .declared_in
                        .iter()
                        .map(|id| subgraph_names[id.index()].as_str());
                    self.errors.push(CompositionError::ExternalMissingOnBase {
                        type_name: node.name.clone(),
                        field_name: field.name.clone(),
                        message: format!(
                            "Field \"{}.{}\" is marked @external in {} but is not defined by any subgraph",
                            node.name,
                            field.name,
                            human_readable_subgraph_names(declarers)
                        ),
                    });
                }
            }
        }
    }

    /// A field resolved by more than one subgraph must be shareable in every one of them.
    fn check_shareability(&mut self) {
        let graph = &self.graph;
        for node in graph.types.values() {
            if node.kind != TypeKind::Object {
                continue;
            }
            for field in node.fields.values() {
                if field.subgraphs.len() < 2 {
                    continue;
                }
                let non_shareable: Vec<&str> = field
                    .subgraphs
                    .iter()
                    .filter(|id| !field.shareable_in.contains(id))
                    .map(|id| graph.subgraph_name(*id))
                    .collect();
                if non_shareable.is_empty() {
                    continue;
                }
                let resolvers = field.subgraphs.iter().map(|id| graph.subgraph_name(*id));
                self.errors.push(CompositionError::ShareableConflict {
                    type_name: node.name.clone(),
                    field_name: field.name.clone(),
                    message: format!(
                        "Non-shareable field \"{}.{}\" is resolved from multiple subgraphs: it is resolved from {} and defined as non-shareable in {}",
                        node.name,
                        field.name,
                        human_readable_subgraph_names(resolvers),
                        human_readable_subgraph_names(non_shareable)
                    ),
                });
            }
        }
    }
}

fn merge_field<'a>(
    node: &mut TypeNode,
    id: SubgraphId,
    field: &FieldModel,
    name_of: &impl Fn(SubgraphId) -> &'a str,
) -> Vec<CompositionError> {
    let mut errors = Vec::new();
    let type_name = node.name.clone();
    let merged = node
        .fields
        .entry(field.definition.name.clone())
        .or_insert_with(|| FieldNode::new(field.definition.clone()));

    match merged.definition_subgraph {
        None if !field.external => {
            // The first non-external declaration is authoritative.
            let arguments = merged.definition.arguments.clone();
            merged.definition = field.definition.clone();
            merged.definition_subgraph = Some(id);
            merge_arguments(&mut merged.definition, &arguments);
            for (external, ty) in std::mem::take(&mut merged.pending_external_types) {
                if ty != field.definition.ty {
                    errors.push(external_type_mismatch(
                        &type_name,
                        field,
                        (id, &field.definition.ty),
                        (external, &ty),
                        name_of,
                    ));
                }
            }
        }
        None => merged
            .pending_external_types
            .push((id, field.definition.ty.clone())),
        Some(first) if field.external => {
            if merged.definition.ty != field.definition.ty {
                let authoritative = merged.definition.ty.clone();
                errors.push(external_type_mismatch(
                    &type_name,
                    field,
                    (first, &authoritative),
                    (id, &field.definition.ty),
                    name_of,
                ));
            }
        }
        Some(first) => {
            if merged.definition.ty != field.definition.ty {
                errors.push(CompositionError::TypeMismatch {
                    type_name: type_name.clone(),
                    message: format!(
                        "Field \"{type_name}.{}\" has type \"{}\" in subgraph \"{}\" but type \"{}\" in subgraph \"{}\"",
                        field.definition.name,
                        merged.definition.ty,
                        name_of(first),
                        field.definition.ty,
                        name_of(id)
                    ),
                });
            }
            for argument in &field.definition.arguments {
                let existing = merged
                    .definition
                    .arguments
                    .iter()
                    .find(|existing| existing.name == argument.name);
                if let Some(existing) = existing.filter(|existing| existing.ty != argument.ty) {
                    errors.push(CompositionError::TypeMismatch {
                        type_name: type_name.clone(),
                        message: format!(
                            "Argument \"{type_name}.{}({}:)\" has type \"{}\" in subgraph \"{}\" but type \"{}\" in subgraph \"{}\"",
                            field.definition.name,
                            argument.name,
                            existing.ty,
                            name_of(first),
                            argument.ty,
                            name_of(id)
                        ),
                    });
                }
            }
            let definition = merged.definition.make_mut();
            merge_description(&mut definition.description, &field.definition.description);
            merge_directives(&mut definition.directives, &field.definition.directives);
            merge_arguments(&mut merged.definition, &field.definition.arguments);
        }
    }

    merged.declared_in.insert(id);
    if field.external {
        merged.external_in.insert(id);
    }
    if field.shareable {
        merged.shareable_in.insert(id);
    }
    if let Some(provides) = &field.provides {
        merged.provides.insert(id, provides.clone());
    }
    if let Some(requires) = &field.requires {
        merged.requires.insert(id, requires.clone());
    }
    if let Some(from) = &field.override_from {
        merged.overrides.insert(id, from.clone());
    }
    errors
}

fn external_type_mismatch<'a>(
    type_name: &Name,
    field: &FieldModel,
    (authoritative, authoritative_ty): (SubgraphId, &ast::Type),
    (external, external_ty): (SubgraphId, &ast::Type),
    name_of: &impl Fn(SubgraphId) -> &'a str,
) -> CompositionError {
    CompositionError::TypeMismatch {
        type_name: type_name.clone(),
        message: format!(
            "Field \"{type_name}.{}\" has type \"{authoritative_ty}\" in subgraph \"{}\" but type \"{external_ty}\" in subgraph \"{}\", where it is marked @external",
            field.definition.name,
            name_of(authoritative),
            name_of(external)
        ),
    }
}

/// Appends the arguments of `arguments` missing from `definition`.
fn merge_arguments(
    definition: &mut Node<ast::FieldDefinition>,
    arguments: &[Node<ast::InputValueDefinition>],
) {
    let missing: Vec<_> = arguments
        .iter()
        .filter(|argument| {
            !definition
                .arguments
                .iter()
                .any(|existing| existing.name == argument.name)
        })
        .cloned()
        .collect();
    if !missing.is_empty() {
        definition.make_mut().arguments.extend(missing);
    }
}

/// The first non-empty description wins.
fn merge_description(merged: &mut Option<Node<str>>, new: &Option<Node<str>>) {
    let is_empty = merged
        .as_ref()
        .is_none_or(|description| description.trim().is_empty());
    match new.as_ref().filter(|description| !description.trim().is_empty()) {
        Some(description) if is_empty => *merged = Some(description.clone()),
        _ => {}
    }
}

fn merge_directives(merged: &mut ast::DirectiveList, new: &ast::DirectiveList) {
    for directive in new.iter() {
        if !merged.iter().any(|existing| existing == directive) {
            merged.push(directive.clone());
        }
    }
}
