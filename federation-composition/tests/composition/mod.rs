mod options;
mod resolvability;

pub(crate) mod test_helpers {
    use apollo_compiler::ast;
    use federation_composition::CompositionError;
    use federation_composition::CompositionOptions;
    use federation_composition::Supergraph;
    use federation_composition::compose_with_options;
    use federation_composition::subgraph::FederationVersion;
    use federation_composition::subgraph::Subgraph;

    #[derive(Debug, Clone, Copy)]
    pub(crate) struct ServiceDefinition<'a> {
        pub(crate) name: &'a str,
        pub(crate) type_defs: &'a str,
    }

    pub(crate) fn compose_services(
        services: &[ServiceDefinition],
    ) -> Result<Supergraph, Vec<CompositionError>> {
        compose_services_with_options(services, &CompositionOptions::default())
    }

    pub(crate) fn compose_services_with_options(
        services: &[ServiceDefinition],
        options: &CompositionOptions,
    ) -> Result<Supergraph, Vec<CompositionError>> {
        let subgraphs = services
            .iter()
            .map(|service| {
                Subgraph::parse(service.name, &format!("http://{}", service.name), service.type_defs)
                    .unwrap()
            })
            .collect();
        compose_with_options(subgraphs, options)
    }

    pub(crate) fn errors(result: Result<Supergraph, Vec<CompositionError>>) -> Vec<CompositionError> {
        match result {
            Ok(supergraph) => panic!("Expected an error, but got a supergraph:\n{supergraph}"),
            Err(errors) => errors,
        }
    }

    pub(crate) fn supergraph(result: Result<Supergraph, Vec<CompositionError>>) -> Supergraph {
        match result {
            Ok(supergraph) => supergraph,
            Err(errors) => panic!(
                "Expected a supergraph, but composition failed:\n{}",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    /// Prints the supergraph expected for `types`, in the same layout as [`Supergraph`].
    pub(crate) fn expected_sdl(version: FederationVersion, types: &str) -> String {
        let source = format!("{}\n{types}", version.base_schema());
        ast::Document::parse(source, "expected.graphql")
            .unwrap()
            .to_string()
    }
}

pub(crate) use test_helpers::ServiceDefinition;
pub(crate) use test_helpers::compose_services;
pub(crate) use test_helpers::compose_services_with_options;
pub(crate) use test_helpers::errors;
pub(crate) use test_helpers::expected_sdl;
pub(crate) use test_helpers::supergraph;
