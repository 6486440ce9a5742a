use std::collections::BTreeSet;

use infra_core::{
    assemble, assemble_with, AssemblyError, AssemblyOptions, Configuration, DependencyError,
    FunctionSpec, LayerSpec, Runtime, StackBlueprint,
};
use proptest::prelude::*;

const DECLARED_LAYERS: [&str; 3] = ["DB lib", "Auth lib", "Metrics lib"];

fn optional_value() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z0-9-]{1,12}")
}

fn configuration() -> impl Strategy<Value = Configuration> {
    (
        "[a-z][a-z0-9-]{0,20}",
        optional_value(),
        optional_value(),
        optional_value(),
        optional_value(),
        optional_value(),
    )
        .prop_map(
            |(project_name, stage_name, identifier, owner, account_id, region)| Configuration {
                project_name,
                stage_name,
                identifier,
                owner,
                account_id,
                region,
            },
        )
}

/// Blueprints over a subset of known layers whose functions may also name
/// "Cache lib", which is never declared.
fn blueprint() -> impl Strategy<Value = StackBlueprint> {
    let referenced = prop::sample::select(vec!["DB lib", "Auth lib", "Metrics lib", "Cache lib"]);
    (
        prop::sample::subsequence(DECLARED_LAYERS.to_vec(), 0..=DECLARED_LAYERS.len()),
        prop::collection::vec(prop::collection::vec(referenced, 0..3), 0..4),
    )
        .prop_map(|(layers, functions)| StackBlueprint {
            layers: layers
                .into_iter()
                .map(|name| LayerSpec::new(name, "layers/shared").runtime(Runtime::Python38))
                .collect(),
            functions: functions
                .into_iter()
                .enumerate()
                .map(|(index, refs)| {
                    refs.into_iter().fold(
                        FunctionSpec::new(format!("Lambda {index}"), format!("lambdas/{index}")),
                        |function, layer| function.layer(layer),
                    )
                })
                .collect(),
        })
}

proptest! {
    #[test]
    fn assembly_is_idempotent(config in configuration()) {
        match (assemble(&config), assemble(&config)) {
            (Ok(first), Ok(second)) => {
                prop_assert_eq!(&first.identity, &second.identity);
                prop_assert_eq!(&first.tags, &second.tags);
                prop_assert_eq!(&first.layers, &second.layers);
                prop_assert_eq!(&first.functions, &second.functions);
                prop_assert_eq!(
                    first.fingerprint().expect("fingerprint"),
                    second.fingerprint().expect("fingerprint")
                );
            }
            (Err(first), Err(second)) => prop_assert_eq!(first, second),
            _ => prop_assert!(false, "assembly outcome differed between runs"),
        }
    }

    #[test]
    fn layer_dependencies_always_resolve(config in configuration()) {
        if let Ok(graph) = assemble(&config) {
            for function in &graph.functions {
                for layer in &function.depends_on_layers {
                    prop_assert!(graph.layer(layer).is_some());
                }
            }
        }
    }

    #[test]
    fn generated_blueprints_resolve_or_report_unknown_layer(blueprint in blueprint()) {
        let declared: BTreeSet<&str> = blueprint.layers.iter().map(|layer| layer.name.as_str()).collect();
        let dangling = blueprint
            .functions
            .iter()
            .flat_map(|function| &function.layers)
            .any(|layer| !declared.contains(layer.as_str()));
        let config = Configuration::default().with_stage("dev");

        match assemble_with(&config, &blueprint, &AssemblyOptions::default()) {
            Ok(graph) => {
                prop_assert!(!dangling);
                for function in &graph.functions {
                    for layer in &function.depends_on_layers {
                        prop_assert!(graph.layer(layer).is_some());
                    }
                }
            }
            Err(error) => {
                prop_assert!(dangling, "unexpected failure: {}", error);
                prop_assert!(
                    matches!(error, AssemblyError::Dependency(DependencyError::UnknownLayer { .. })),
                    "unexpected failure: {}",
                    error
                );
            }
        }
    }

    #[test]
    fn fails_only_without_stage_or_identifier(config in configuration()) {
        let has_suffix = config.stage_name.is_some() || config.identifier.is_some();
        prop_assert_eq!(assemble(&config).is_ok(), has_suffix);
    }

    #[test]
    fn owner_tag_present_iff_owner_configured(config in configuration()) {
        if let Ok(graph) = assemble(&config) {
            prop_assert_eq!(graph.tag("Owner").is_some(), config.owner.is_some());
        }
    }
}
