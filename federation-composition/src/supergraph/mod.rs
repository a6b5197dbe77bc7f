use std::fmt;

use apollo_compiler::Node;
use apollo_compiler::ast;

use crate::error::CompositionError;
use crate::merger::FederatedGraph;
use crate::merger::TypeNode;
use crate::schema::TypeKind;
use crate::subgraph::spec::FederationVersion;
use crate::utils::logging::snapshot;

/// The merged and validated schema produced by a successful composition.
///
/// The document starts with the definitions of the directives the supergraph keeps
/// (`@tag`, plus `@inaccessible` for Federation 2), followed by every type in first-seen order.
#[derive(Debug, Clone)]
pub struct Supergraph {
    document: ast::Document,
    version: FederationVersion,
}

impl Supergraph {
    #[cfg_attr(
        feature = "snapshot_tracing",
        tracing::instrument(level = "trace", skip_all, name = "supergraph::emit")
    )]
    pub(crate) fn from_federated_graph(graph: &FederatedGraph) -> Result<Self, CompositionError> {
        let mut document =
            ast::Document::parse(graph.version.base_schema(), "supergraph_base.graphql").map_err(
                |with_errors| CompositionError::Internal {
                    message: format!(
                        "the {} base schema is invalid: {}",
                        graph.version, with_errors.errors
                    ),
                },
            )?;
        document
            .definitions
            .extend(graph.types.values().map(type_definition));

        snapshot!("Supergraph", document.to_string(), "emitted supergraph");
        tracing::debug!(
            types = graph.types.len(),
            version = %graph.version,
            "emitted supergraph"
        );
        Ok(Self {
            document,
            version: graph.version,
        })
    }

    pub fn document(&self) -> &ast::Document {
        &self.document
    }

    pub fn into_document(self) -> ast::Document {
        self.document
    }

    /// Federation 2 as soon as one subgraph is.
    pub fn version(&self) -> FederationVersion {
        self.version
    }
}

impl fmt::Display for Supergraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)
    }
}

fn type_definition(node: &TypeNode) -> ast::Definition {
    let description = node.description.clone();
    let name = node.name.clone();
    let directives = node.directives.clone();
    match node.kind {
        TypeKind::Object => ast::Definition::ObjectTypeDefinition(Node::new(
            ast::ObjectTypeDefinition {
                description,
                name,
                implements_interfaces: node.implemented_interfaces.keys().cloned().collect(),
                directives,
                fields: node
                    .fields
                    .values()
                    .map(|field| field.definition.clone())
                    .collect(),
            },
        )),
        TypeKind::Interface => ast::Definition::InterfaceTypeDefinition(Node::new(
            ast::InterfaceTypeDefinition {
                description,
                name,
                implements_interfaces: node.implemented_interfaces.keys().cloned().collect(),
                directives,
                fields: node
                    .fields
                    .values()
                    .map(|field| field.definition.clone())
                    .collect(),
            },
        )),
        TypeKind::Union => {
            ast::Definition::UnionTypeDefinition(Node::new(ast::UnionTypeDefinition {
                description,
                name,
                directives,
                members: node.union_members.keys().cloned().collect(),
            }))
        }
        TypeKind::Scalar => {
            ast::Definition::ScalarTypeDefinition(Node::new(ast::ScalarTypeDefinition {
                description,
                name,
                directives,
            }))
        }
        TypeKind::Enum => ast::Definition::EnumTypeDefinition(Node::new(ast::EnumTypeDefinition {
            description,
            name,
            directives,
            values: node.enum_values.values().cloned().collect(),
        })),
        TypeKind::InputObject => ast::Definition::InputObjectTypeDefinition(Node::new(
            ast::InputObjectTypeDefinition {
                description,
                name,
                directives,
                fields: node
                    .input_fields
                    .values()
                    .map(|input_field| input_field.definition.clone())
                    .collect(),
            },
        )),
    }
}
