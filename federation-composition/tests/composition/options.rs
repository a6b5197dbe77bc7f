use federation_composition::CompositionOptions;
use federation_composition::subgraph::FederationVersion;
use pretty_assertions::assert_eq;

use super::ServiceDefinition;
use super::compose_services_with_options;
use super::errors;
use super::expected_sdl;
use super::resolvability::SUBGRAPH_D;
use super::resolvability::SUBGRAPH_F;
use super::supergraph;

fn without_resolvability() -> CompositionOptions {
    CompositionOptions {
        disable_resolvability_validation: true,
    }
}

#[test]
fn disabled_resolvability_validation_accepts_unreachable_fields() {
    let result = compose_services_with_options(&[SUBGRAPH_D, SUBGRAPH_F], &without_resolvability());
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
fn disabled_resolvability_validation_still_reports_merge_errors() {
    let first = ServiceDefinition {
        name: "first",
        type_defs: r#"
            type Query {
              friend: Friend @shareable
            }

            type Friend {
              name: String!
            }
        "#,
    };
    let second = ServiceDefinition {
        name: "second",
        type_defs: r#"
            type Query {
              friend: Friend @shareable
            }

            type Friend {
              name: String!
            }
        "#,
    };
    let errors = errors(compose_services_with_options(
        &[first, second],
        &without_resolvability(),
    ));
    let codes: Vec<&str> = errors.iter().map(|error| error.code()).collect();
    assert_eq!(codes, vec!["SHAREABLE_CONFLICT"]);
}
