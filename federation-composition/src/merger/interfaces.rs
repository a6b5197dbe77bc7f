use apollo_compiler::ast;

use crate::error::CompositionError;
use crate::merger::FederatedGraph;
use crate::merger::TypeNode;
use crate::schema::TypeKind;

/// Checks every implementation declared in the merged graph against the merged interface.
pub(crate) fn validate_interface_implementations(graph: &FederatedGraph) -> Vec<CompositionError> {
    let mut errors = Vec::new();
    for node in graph.types.values() {
        if !node.kind.has_fields() {
            continue;
        }
        for interface_name in node.implemented_interfaces.keys() {
            let interface = match graph.types.get(interface_name) {
                Some(interface) if interface.kind == TypeKind::Interface => interface,
                _ => {
                    errors.push(CompositionError::InvalidInterfaceImplementation {
                        type_name: node.name.clone(),
                        message: format!(
                            "Type \"{}\" implements \"{interface_name}\", which is not an interface type",
                            node.name
                        ),
                    });
                    continue;
                }
            };
            validate_implementation(graph, node, interface, &mut errors);
        }
    }
    errors
}

fn validate_implementation(
    graph: &FederatedGraph,
    node: &TypeNode,
    interface: &TypeNode,
    errors: &mut Vec<CompositionError>,
) {
    let mut invalid = |message: String| {
        errors.push(CompositionError::InvalidInterfaceImplementation {
            type_name: node.name.clone(),
            message,
        })
    };
    for interface_field in interface.fields.values() {
        let Some(field) = node.fields.get(&interface_field.name) else {
            invalid(format!(
                "Type \"{}\" implements interface \"{}\" but does not define field \"{}.{}\"",
                node.name, interface.name, interface.name, interface_field.name
            ));
            continue;
        };
        let interface_ty = &interface_field.definition.ty;
        let ty = &field.definition.ty;
        if !is_valid_implementation_type(graph, ty, interface_ty) {
            invalid(format!(
                "Field \"{}.{}\" of type \"{ty}\" is not a valid implementation of field \"{}.{}\" of type \"{interface_ty}\"",
                node.name, field.name, interface.name, interface_field.name
            ));
        }
        for interface_argument in &interface_field.definition.arguments {
            let argument = field
                .definition
                .arguments
                .iter()
                .find(|argument| argument.name == interface_argument.name);
            match argument {
                None => invalid(format!(
                    "Field \"{}.{}\" does not define argument \"{}\" required by interface field \"{}.{}\"",
                    node.name,
                    field.name,
                    interface_argument.name,
                    interface.name,
                    interface_field.name
                )),
                Some(argument) if argument.ty != interface_argument.ty => invalid(format!(
                    "Argument \"{}.{}({}:)\" has type \"{}\" but interface field \"{}.{}\" declares it as \"{}\"",
                    node.name,
                    field.name,
                    argument.name,
                    argument.ty,
                    interface.name,
                    interface_field.name,
                    interface_argument.ty
                )),
                Some(_) => {}
            }
        }
    }
}

/// Whether `ty` can implement a field of type `interface_ty`.
///
/// Implementations may be covariant: stricter nullability, or a named type that is a possible
/// type of the interface field's abstract type.
fn is_valid_implementation_type(
    graph: &FederatedGraph,
    ty: &ast::Type,
    interface_ty: &ast::Type,
) -> bool {
    use ast::Type;

    match (ty, interface_ty) {
        (Type::NonNullNamed(name), Type::NonNullNamed(interface_name))
        | (Type::NonNullNamed(name) | Type::Named(name), Type::Named(interface_name)) => {
            is_subtype(graph, name, interface_name)
        }
        (Type::NonNullList(item), Type::NonNullList(interface_item))
        | (Type::NonNullList(item) | Type::List(item), Type::List(interface_item)) => {
            is_valid_implementation_type(graph, item, interface_item)
        }
        _ => false,
    }
}

fn is_subtype(graph: &FederatedGraph, name: &str, abstract_name: &str) -> bool {
    if name == abstract_name {
        return true;
    }
    let Some(node) = graph.types.get(name) else {
        return false;
    };
    match graph.types.get(abstract_name) {
        Some(abstract_type) if abstract_type.kind == TypeKind::Union => {
            abstract_type.union_members.contains_key(name)
        }
        Some(abstract_type) if abstract_type.kind == TypeKind::Interface => {
            node.implemented_interfaces.contains_key(abstract_name)
        }
        _ => false,
    }
}
