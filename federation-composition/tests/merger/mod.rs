use federation_composition::CompositionError;
use federation_composition::merger::FederatedGraph;
use federation_composition::merger::merge;
use federation_composition::subgraph::Subgraph;
use federation_composition::subgraph::model::build_subgraph_model;
use federation_composition::subgraph::normalize::normalize_subgraphs;
use pretty_assertions::assert_eq;

use crate::composition::test_helpers::ServiceDefinition;
use crate::composition::test_helpers::compose_services;
use crate::composition::test_helpers::errors;

fn merged_graph(services: &[ServiceDefinition]) -> (FederatedGraph, Vec<CompositionError>) {
    let subgraphs: Vec<Subgraph> = services
        .iter()
        .map(|service| Subgraph::parse(service.name, "", service.type_defs).unwrap())
        .collect();
    let models = normalize_subgraphs(&subgraphs)
        .unwrap()
        .into_iter()
        .map(build_subgraph_model)
        .collect();
    merge(models)
}

fn messages(errors: &[CompositionError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

#[test]
fn non_shareable_field_in_two_subgraphs() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: r#"
            type Query {
              friend: Friend @shareable
            }

            type Friend {
              name: String! @shareable
            }
        "#,
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: r#"
            type Query {
              friend: Friend @shareable
            }

            type Friend {
              name: String!
            }
        "#,
    };
    let errors = errors(compose_services(&[a, b]));
    assert_eq!(
        messages(&errors),
        vec![
            r#"Non-shareable field "Friend.name" is resolved from multiple subgraphs: it is resolved from subgraphs "a" and "b" and defined as non-shareable in subgraph "b""#
        ]
    );
    assert_eq!(errors[0].code(), "SHAREABLE_CONFLICT");
    assert!(errors[0].is_merge_error());
}

#[test]
fn federation_one_fields_are_implicitly_shareable() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: "type Query { friend: Friend } type Friend { name: String! }",
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: "type Query { friend: Friend } type Friend { name: String! }",
    };
    assert!(compose_services(&[a, b]).is_ok());
}

#[test]
fn field_types_must_match() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: "type Query { age: Int @shareable }",
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: "type Query { age: String @shareable }",
    };
    let errors = errors(compose_services(&[a, b]));
    assert_eq!(
        messages(&errors),
        vec![r#"Field "Query.age" has type "Int" in subgraph "a" but type "String" in subgraph "b""#]
    );
    assert_eq!(errors[0].code(), "TYPE_MISMATCH");
}

#[test]
fn type_kinds_must_match() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: "type Query { e: E @shareable } enum E { A }",
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: "type Query { e: E @shareable } scalar E",
    };
    let errors = errors(compose_services(&[a, b]));
    assert_eq!(
        messages(&errors),
        vec![r#"Type "E" is defined as enum type in subgraph "a" but as scalar type in subgraph "b""#]
    );
}

#[test]
fn enum_values_are_unioned() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: "type Query { a: Color } enum Color { RED GREEN }",
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: "type Query { b: Color } enum Color { GREEN BLUE }",
    };
    let (graph, errors) = merged_graph(&[a, b]);
    assert!(errors.is_empty(), "{errors:?}");
    let values: Vec<&str> = graph.types["Color"]
        .enum_values
        .keys()
        .map(|value| value.as_str())
        .collect();
    assert_eq!(values, ["RED", "GREEN", "BLUE"]);
}

#[test]
fn override_moves_field_ownership() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: r#"
            type Query {
              me: User @shareable
            }

            type User @key(fields: "id") {
              id: ID!
              name: String
            }
        "#,
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: r#"
            type Query {
              me: User @shareable
            }

            type User @key(fields: "id") {
              id: ID!
              name: String @override(from: "a")
            }
        "#,
    };
    let (graph, errors) = merged_graph(&[a, b]);
    assert!(errors.is_empty(), "{errors:?}");
    let name = &graph.types["User"].fields["name"];
    assert_eq!(graph.subgraph_names(&name.declared_in), ["a", "b"]);
    assert_eq!(graph.subgraph_names(&name.subgraphs), ["b"]);
    assert_eq!(graph.subgraph_names(&name.overridden_in), ["a"]);

    assert!(compose_services(&[a, b]).is_ok());
}

#[test]
fn external_field_needs_a_resolving_subgraph() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: r#"
            type Query {
              user: User
            }

            type User @key(fields: "id") {
              id: ID!
              name: String @external
            }
        "#,
    };
    let errors = errors(compose_services(&[a]));
    assert_eq!(
        messages(&errors),
        vec![r#"Field "User.name" is marked @external in subgraph "a" but is not defined by any subgraph"#]
    );
    assert_eq!(errors[0].code(), "EXTERNAL_MISSING_ON_BASE");
}

#[test]
fn implementations_must_define_merged_interface_fields() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: r#"
            type Query {
              nodes: [Node]
            }

            interface Node {
              id: ID!
            }

            type User implements Node {
              id: ID!
            }
        "#,
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: r#"
            interface Node {
              id: ID!
              name: String
            }
        "#,
    };
    let errors = errors(compose_services(&[a, b]));
    assert_eq!(
        messages(&errors),
        vec![r#"Type "User" implements interface "Node" but does not define field "Node.name""#]
    );
    assert_eq!(errors[0].code(), "INVALID_INTERFACE_IMPLEMENTATION");
}

#[test]
fn merge_and_resolvability_errors_are_reported_together() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: r#"
            type Query {
              friend: Friend @shareable
              age: Int @shareable
            }

            type Friend {
              name: String!
            }
        "#,
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: r#"
            type Query {
              age: String @shareable
            }

            type Friend {
              hobbies: [String!]!
            }
        "#,
    };
    let codes: Vec<&str> = errors(compose_services(&[a, b]))
        .iter()
        .map(CompositionError::code)
        .collect();
    assert_eq!(codes, ["TYPE_MISMATCH", "UNRESOLVABLE_FIELD"]);
}

#[test]
fn external_field_type_must_match_the_base_definition() {
    let a = ServiceDefinition {
        name: "a",
        type_defs: r#"
            type Query {
              t: T
            }

            type T @key(fields: "id") {
              id: ID!
              name: String
            }
        "#,
    };
    let b = ServiceDefinition {
        name: "b",
        type_defs: r#"
            type T @key(fields: "id") {
              id: ID!
              name: Int @external
              size: Int @requires(fields: "name")
            }
        "#,
    };
    let expected = vec![
        r#"Field "T.name" has type "String" in subgraph "a" but type "Int" in subgraph "b", where it is marked @external"#,
    ];
    let errors = errors(compose_services(&[a, b]));
    assert_eq!(messages(&errors), expected);
    assert_eq!(errors[0].code(), "TYPE_MISMATCH");

    let (_, errors) = merged_graph(&[b, a]);
    assert_eq!(messages(&errors), expected);
}
