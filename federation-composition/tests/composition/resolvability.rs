use apollo_compiler::Name;
use federation_composition::RootTypeFieldData;
use federation_composition::subgraph::FederationVersion;
use federation_composition::unresolvable_field_error;
use pretty_assertions::assert_eq;

use super::ServiceDefinition;
use super::compose_services;
use super::errors;
use super::expected_sdl;
use super::supergraph;

fn root_field(field_name: &str, field_type: &str, subgraph: &str) -> RootTypeFieldData {
    RootTypeFieldData {
        field_name: Name::new(field_name).unwrap(),
        field_type_node_string: field_type.to_owned(),
        path: format!("Query.{field_name}"),
        subgraphs: [subgraph.to_owned()].into_iter().collect(),
        type_name: Name::new("Query").unwrap(),
    }
}

#[test]
fn nested_shared_root_field_resolvable_over_multiple_subgraphs() {
    let result = compose_services(&[SUBGRAPH_A, SUBGRAPH_B]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V2,
            r#"
            type Query {
              query: Nested
            }

            type Nested {
              nest: Nested2
            }

            type Nested2 {
              nest: Nested3
            }

            type Nested3 {
              nest: Nested4
            }

            type Nested4 {
              name: String
              age: Int
            }
            "#,
        )
    );
}

#[test]
fn nested_field_only_in_a_subgraph_without_root_fields_is_unresolvable() {
    let errors = errors(compose_services(&[SUBGRAPH_B, SUBGRAPH_C]));
    assert_eq!(
        errors,
        vec![unresolvable_field_error(
            root_field("query", "Nested", "subgraph-b"),
            Name::new("name").unwrap(),
            vec!["subgraph-c".to_owned()],
            "Query.query.nest.nest.nest.name",
            Name::new("Nested4").unwrap(),
        )]
    );
}

#[test]
fn field_only_in_an_unreachable_subgraph_is_unresolvable() {
    let expected = vec![unresolvable_field_error(
        root_field("friend", "Friend", "subgraph-d"),
        Name::new("age").unwrap(),
        vec!["subgraph-f".to_owned()],
        "Query.friend.age",
        Name::new("Friend").unwrap(),
    )];
    assert_eq!(errors(compose_services(&[SUBGRAPH_D, SUBGRAPH_F])), expected);
    // The subgraph defining the unresolvable field comes first.
    assert_eq!(errors(compose_services(&[SUBGRAPH_F, SUBGRAPH_D])), expected);
}

#[test]
fn every_unresolvable_field_is_reported() {
    let errors = errors(compose_services(&[SUBGRAPH_D, SUBGRAPH_F, SUBGRAPH_G]));
    assert_eq!(
        errors,
        vec![
            unresolvable_field_error(
                root_field("friend", "Friend", "subgraph-d"),
                Name::new("age").unwrap(),
                vec!["subgraph-f".to_owned()],
                "Query.friend.age",
                Name::new("Friend").unwrap(),
            ),
            unresolvable_field_error(
                root_field("friend", "Friend", "subgraph-d"),
                Name::new("hobbies").unwrap(),
                vec!["subgraph-g".to_owned()],
                "Query.friend.hobbies",
                Name::new("Friend").unwrap(),
            ),
        ]
    );
}

#[test]
fn shared_root_field_resolvable_over_multiple_subgraphs() {
    let result = compose_services(&[SUBGRAPH_D, SUBGRAPH_E]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V2,
            r#"
            type Query {
              friend: Friend
            }

            type Friend {
              name: String!
              age: Int!
            }
            "#,
        )
    );
}

#[test]
fn shared_interface_resolvable_over_multiple_subgraphs() {
    let result = compose_services(&[SUBGRAPH_H, SUBGRAPH_I]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V1,
            r#"
            type Query {
              humans: [Human]
            }

            interface Human {
              name: String!
              age: Int!
            }

            type Friend implements Human {
              name: String!
              age: Int!
            }
            "#,
        )
    );
}

#[test]
fn interface_implementation_with_unreachable_field() {
    let errors = errors(compose_services(&[SUBGRAPH_I, SUBGRAPH_J]));
    assert_eq!(
        errors,
        vec![unresolvable_field_error(
            root_field("humans", "[Human]", "subgraph-i"),
            Name::new("name").unwrap(),
            vec!["subgraph-j".to_owned()],
            "Query.humans ... on Friend name",
            Name::new("Friend").unwrap(),
        )]
    );
}

#[test]
fn nested_interface_implementation_with_unreachable_field() {
    let errors = errors(compose_services(&[SUBGRAPH_K, SUBGRAPH_L]));
    assert_eq!(
        errors,
        vec![unresolvable_field_error(
            root_field("humans", "[Human]", "subgraph-k"),
            Name::new("age").unwrap(),
            vec!["subgraph-l".to_owned()],
            "Query.humans ... on Friend pets ... on Cat age",
            Name::new("Cat").unwrap(),
        )]
    );
}

#[test]
fn shared_union_resolvable_over_multiple_subgraphs() {
    let result = compose_services(&[SUBGRAPH_M, SUBGRAPH_N]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V1,
            r#"
            type Query {
              humans: [Human]
            }

            union Human = Friend | Enemy

            type Friend {
              name: String!
            }

            type Enemy {
              name: String!
            }
            "#,
        )
    );
}

#[test]
fn union_member_with_unreachable_field() {
    let errors = errors(compose_services(&[SUBGRAPH_O, SUBGRAPH_P]));
    assert_eq!(
        errors,
        vec![unresolvable_field_error(
            root_field("humans", "[Human]", "subgraph-o"),
            Name::new("age").unwrap(),
            vec!["subgraph-p".to_owned()],
            "Query.humans ... on Enemy age",
            Name::new("Enemy").unwrap(),
        )]
    );
}

#[test]
fn entity_ancestor_gives_access_to_nested_fields() {
    let result = compose_services(&[SUBGRAPH_Q, SUBGRAPH_R]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V1,
            r#"
            type Query {
              entity: SometimesEntity!
            }

            type SometimesEntity {
              id: ID!
              object: Object!
            }

            type Object {
              nestedObject: NestedObject!
            }

            type NestedObject {
              name: String!
              age: Int!
            }
            "#,
        )
    );
}

#[test]
fn self_referential_types_terminate() {
    let result = compose_services(&[SUBGRAPH_S, SUBGRAPH_D]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V2,
            r#"
            type Query {
              object: Object!
              friend: Friend
            }

            type Object {
              nestedObject: NestedObject!
            }

            type NestedObject {
              object: Object!
            }

            type Friend {
              name: String!
            }
            "#,
        )
    );
}

#[test]
fn unreachable_interface_implementations_are_not_walked() {
    let result = compose_services(&[SUBGRAPH_T, SUBGRAPH_U]);
    assert_eq!(
        supergraph(result).to_string(),
        expected_sdl(
            FederationVersion::V1,
            r#"
            type Query {
              query: Interface!
            }

            interface Interface {
              field: String!
            }

            type Object implements Interface {
              field: String!
            }

            type OtherObject implements Interface {
              field: String!
            }
            "#,
        )
    );
}

#[test]
fn entity_key_lets_the_walk_jump_subgraphs() {
    let users = ServiceDefinition {
        name: "users",
        type_defs: r#"
            type Query {
              user: User
            }

            type User {
              id: ID!
            }
        "#,
    };
    let accounts = ServiceDefinition {
        name: "accounts",
        type_defs: r#"
            type User @key(fields: "id") {
              id: ID!
              email: String
            }
        "#,
    };
    assert!(compose_services(&[users, accounts]).is_ok());

    // Without the key field the entity cannot be entered.
    let users = ServiceDefinition {
        name: "users",
        type_defs: r#"
            type Query {
              user: User
            }

            type User {
              name: String
            }
        "#,
    };
    let paths: Vec<String> = errors(compose_services(&[users, accounts]))
        .iter()
        .filter_map(|error| error.as_resolvability_error())
        .map(|error| error.full_path.clone())
        .collect();
    assert_eq!(paths, vec!["Query.user.id", "Query.user.email"]);
}

#[test]
fn provides_makes_external_fields_resolvable_locally() {
    let reviews = ServiceDefinition {
        name: "reviews",
        type_defs: r#"
            type Query {
              reviews: [Review]
            }

            type Review {
              body: String
              author: User @provides(fields: "username")
            }

            type User @key(fields: "id") {
              id: ID!
              username: String @external
            }
        "#,
    };
    let users = ServiceDefinition {
        name: "users",
        type_defs: r#"
            type User @key(fields: "id", resolvable: false) {
              id: ID!
              username: String
              birthday: String
            }
        "#,
    };
    let errors = errors(compose_services(&[reviews, users]));
    let paths: Vec<&str> = errors
        .iter()
        .filter_map(|error| error.as_resolvability_error())
        .map(|error| error.full_path.as_str())
        .collect();
    // Only the unprovided field is out of reach.
    assert_eq!(paths, vec!["Query.reviews.author.birthday"]);
}

pub(super) const SUBGRAPH_A: ServiceDefinition = ServiceDefinition {
    name: "subgraph-a",
    type_defs: r#"
        type Query {
          query: Nested @shareable
        }

        type Nested @shareable {
          nest: Nested2
        }

        type Nested2 @shareable {
          nest: Nested3
        }

        type Nested3 @shareable {
          nest: Nested4
        }

        type Nested4 {
          name: String
        }
    "#,
};

pub(super) const SUBGRAPH_B: ServiceDefinition = ServiceDefinition {
    name: "subgraph-b",
    type_defs: r#"
        type Query {
          query: Nested @shareable
        }

        type Nested @shareable {
          nest: Nested2
        }

        type Nested2 @shareable {
          nest: Nested3
        }

        type Nested3 @shareable {
          nest: Nested4
        }

        type Nested4 {
          age: Int
        }
    "#,
};

pub(super) const SUBGRAPH_C: ServiceDefinition = ServiceDefinition {
    name: "subgraph-c",
    type_defs: r#"
        type Nested @shareable {
          nest: Nested2
        }

        type Nested2 @shareable {
          nest: Nested3
        }

        type Nested3 @shareable {
          nest: Nested4
        }

        type Nested4 {
          name: String
        }
    "#,
};

pub(super) const SUBGRAPH_D: ServiceDefinition = ServiceDefinition {
    name: "subgraph-d",
    type_defs: r#"
        type Query {
          friend: Friend @shareable
        }

        type Friend {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_E: ServiceDefinition = ServiceDefinition {
    name: "subgraph-e",
    type_defs: r#"
        type Query {
          friend: Friend @shareable
        }

        type Friend {
          age: Int!
        }
    "#,
};

pub(super) const SUBGRAPH_F: ServiceDefinition = ServiceDefinition {
    name: "subgraph-f",
    type_defs: r#"
        type Friend {
          age: Int!
        }
    "#,
};

pub(super) const SUBGRAPH_G: ServiceDefinition = ServiceDefinition {
    name: "subgraph-g",
    type_defs: r#"
        type Friend {
          hobbies: [String!]!
        }
    "#,
};

pub(super) const SUBGRAPH_H: ServiceDefinition = ServiceDefinition {
    name: "subgraph-h",
    type_defs: r#"
        type Query {
          humans: [Human]
        }

        interface Human {
          name: String!
        }

        type Friend implements Human {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_I: ServiceDefinition = ServiceDefinition {
    name: "subgraph-i",
    type_defs: r#"
        type Query {
          humans: [Human]
        }

        interface Human {
          age: Int!
        }

        type Friend implements Human {
          age: Int!
        }
    "#,
};

pub(super) const SUBGRAPH_J: ServiceDefinition = ServiceDefinition {
    name: "subgraph-j",
    type_defs: r#"
        interface Human {
          name: String!
        }

        type Friend implements Human {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_K: ServiceDefinition = ServiceDefinition {
    name: "subgraph-k",
    type_defs: r#"
        type Query {
          humans: [Human]
        }

        interface Human {
          name: String!
          pets: [Pet]
        }

        interface Pet {
          name: String!
        }

        type Cat implements Pet {
          name: String!
        }

        type Friend implements Human {
          name: String!
          pets: [Pet]
        }
    "#,
};

pub(super) const SUBGRAPH_L: ServiceDefinition = ServiceDefinition {
    name: "subgraph-l",
    type_defs: r#"
        interface Human {
          name: String!
          pets: [Pet]
        }

        interface Pet {
          age: Int!
        }

        type Cat implements Pet {
          age: Int!
        }

        type Friend implements Human {
          name: String!
          pets: [Pet]
        }
    "#,
};

pub(super) const SUBGRAPH_M: ServiceDefinition = ServiceDefinition {
    name: "subgraph-m",
    type_defs: r#"
        type Query {
          humans: [Human]
        }

        union Human = Friend

        type Friend {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_N: ServiceDefinition = ServiceDefinition {
    name: "subgraph-n",
    type_defs: r#"
        type Query {
          humans: [Human]
        }

        union Human = Enemy

        type Enemy {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_O: ServiceDefinition = ServiceDefinition {
    name: "subgraph-o",
    type_defs: r#"
        type Query {
          humans: [Human]
        }

        union Human = Friend | Enemy

        type Friend {
          name: String!
        }

        type Enemy {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_P: ServiceDefinition = ServiceDefinition {
    name: "subgraph-p",
    type_defs: r#"
        union Human = Enemy

        type Enemy {
          age: Int!
        }
    "#,
};

pub(super) const SUBGRAPH_Q: ServiceDefinition = ServiceDefinition {
    name: "subgraph-q",
    type_defs: r#"
        type Query {
          entity: SometimesEntity!
        }

        type SometimesEntity {
          id: ID!
          object: Object!
        }

        type Object {
          nestedObject: NestedObject!
        }

        type NestedObject {
          name: String!
        }
    "#,
};

pub(super) const SUBGRAPH_R: ServiceDefinition = ServiceDefinition {
    name: "subgraph-r",
    type_defs: r#"
        type SometimesEntity @key(fields: "id") {
          id: ID!
          object: Object!
        }

        type Object {
          nestedObject: NestedObject!
        }

        type NestedObject {
          age: Int!
        }
    "#,
};

pub(super) const SUBGRAPH_S: ServiceDefinition = ServiceDefinition {
    name: "subgraph-s",
    type_defs: r#"
        type Query {
          object: Object!
        }

        type Object {
          nestedObject: NestedObject!
        }

        type NestedObject {
          object: Object!
        }
    "#,
};

pub(super) const SUBGRAPH_T: ServiceDefinition = ServiceDefinition {
    name: "subgraph-t",
    type_defs: r#"
        type Query {
          query: Interface!
        }

        interface Interface {
          field: String!
        }

        type Object implements Interface {
          field: String!
        }
    "#,
};

pub(super) const SUBGRAPH_U: ServiceDefinition = ServiceDefinition {
    name: "subgraph-u",
    type_defs: r#"
        interface Interface {
          field: String!
        }

        type OtherObject implements Interface {
          field: String!
        }
    "#,
};
