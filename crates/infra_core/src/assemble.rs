use std::collections::BTreeSet;

use crate::blueprint::{FunctionDefaults, FunctionSpec, StackBlueprint};
use crate::config::{non_blank, ConfigKey, Configuration};
use crate::error::{AssemblyError, ConfigurationError, DependencyError};
use crate::graph::{FunctionNode, LayerNode, StackGraph, Tag};

pub const IDENTITY_SEPARATOR: &str = "-";
pub const MEMORY_LIMITS_MB: (u32, u32) = (128, 10_240);
pub const TIMEOUT_LIMITS_SECONDS: (u32, u32) = (1, 900);
pub const MAX_IDENTITY_LEN: usize = 128;

/// What to do when a tag has no value in the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTagPolicy {
    #[default]
    Omit,
    /// Owner and Stage become required.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub missing_tags: MissingTagPolicy,
    pub defaults: FunctionDefaults,
}

/// Assembles the default monorepo blueprint with default options.
pub fn assemble(config: &Configuration) -> Result<StackGraph, AssemblyError> {
    assemble_with(config, &StackBlueprint::monorepo(), &AssemblyOptions::default())
}

pub fn assemble_with(
    config: &Configuration,
    blueprint: &StackBlueprint,
    options: &AssemblyOptions,
) -> Result<StackGraph, AssemblyError> {
    let identity = derive_identity(config)?;
    let tags = build_tags(config, options.missing_tags)?;

    let mut names = BTreeSet::new();
    let mut layers = Vec::with_capacity(blueprint.layers.len());
    for spec in &blueprint.layers {
        claim_name(&mut names, &spec.name)?;
        layers.push(LayerNode {
            name: spec.name.clone(),
            source_directory: spec.source_directory.clone(),
            compatible_runtimes: spec.compatible_runtimes.clone(),
        });
    }

    let mut functions = Vec::with_capacity(blueprint.functions.len());
    for spec in &blueprint.functions {
        claim_name(&mut names, &spec.name)?;
        let function = build_function(spec, &options.defaults)?;
        validate_layer_dependencies(&function, &layers)?;
        functions.push(function);
    }

    Ok(StackGraph {
        identity,
        layers,
        functions,
        tags,
    })
}

/// `{project}-{identifier}` when an identifier is set, `{project}-{stage}`
/// otherwise.
///
/// The identity doubles as the stack name and the template file name, so it
/// must match `[A-Za-z][A-Za-z0-9-]*` and stay within 128 characters.
pub fn derive_identity(config: &Configuration) -> Result<String, ConfigurationError> {
    let project = config.project_name.trim();
    if project.is_empty() {
        return Err(ConfigurationError::MissingKey(ConfigKey::ProjectName));
    }

    let suffix = non_blank(config.identifier.clone())
        .or_else(|| non_blank(config.stage_name.clone()))
        .ok_or(ConfigurationError::MissingStageOrIdentifier)?;

    let identity = format!("{project}{IDENTITY_SEPARATOR}{suffix}");
    if !is_valid_stack_name(&identity) {
        return Err(ConfigurationError::InvalidIdentity(identity));
    }
    Ok(identity)
}

fn is_valid_stack_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && name.len() <= MAX_IDENTITY_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Stack-wide tags in the fixed order Project, Owner, Client, Stage.
pub fn build_tags(
    config: &Configuration,
    policy: MissingTagPolicy,
) -> Result<Vec<Tag>, ConfigurationError> {
    let candidates = [
        ("Project", ConfigKey::ProjectName, Some(config.project_name.clone()), true),
        ("Owner", ConfigKey::Owner, config.owner.clone(), true),
        ("Client", ConfigKey::Identifier, config.identifier.clone(), false),
        ("Stage", ConfigKey::Stage, config.stage_name.clone(), true),
    ];

    let mut tags = Vec::with_capacity(candidates.len());
    for (tag, key, value, required_when_strict) in candidates {
        match non_blank(value) {
            Some(value) => tags.push(Tag::new(tag, value)),
            None if policy == MissingTagPolicy::Reject && required_when_strict => {
                return Err(ConfigurationError::MissingTag { tag, key });
            }
            None => {}
        }
    }
    Ok(tags)
}

fn claim_name(names: &mut BTreeSet<String>, name: &str) -> Result<(), DependencyError> {
    if names.insert(name.to_string()) {
        Ok(())
    } else {
        Err(DependencyError::DuplicateName(name.to_string()))
    }
}

fn build_function(
    spec: &FunctionSpec,
    defaults: &FunctionDefaults,
) -> Result<FunctionNode, ConfigurationError> {
    let memory_mb = spec.memory_mb.unwrap_or(defaults.memory_mb);
    let timeout_seconds = spec.timeout_seconds.unwrap_or(defaults.timeout_seconds);
    check_limit(&spec.name, "memory_mb", memory_mb, MEMORY_LIMITS_MB)?;
    check_limit(
        &spec.name,
        "timeout_seconds",
        timeout_seconds,
        TIMEOUT_LIMITS_SECONDS,
    )?;

    Ok(FunctionNode {
        name: spec.name.clone(),
        source_directory: spec.source_directory.clone(),
        handler: spec.handler_spec(),
        memory_mb,
        timeout_seconds,
        runtime: spec.runtime.unwrap_or(defaults.runtime),
        depends_on_layers: spec.layers.clone(),
    })
}

fn check_limit(
    function: &str,
    field: &'static str,
    value: u32,
    (min, max): (u32, u32),
) -> Result<(), ConfigurationError> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ConfigurationError::InvalidLimit {
        function: function.to_string(),
        field,
        value,
        min,
        max,
    })
}

fn validate_layer_dependencies(
    function: &FunctionNode,
    layers: &[LayerNode],
) -> Result<(), DependencyError> {
    for layer_name in &function.depends_on_layers {
        let Some(layer) = layers.iter().find(|layer| &layer.name == layer_name) else {
            return Err(DependencyError::UnknownLayer {
                function: function.name.clone(),
                layer: layer_name.clone(),
            });
        };
        if !layer.compatible_runtimes.contains(&function.runtime) {
            return Err(DependencyError::IncompatibleRuntime {
                function: function.name.clone(),
                layer: layer.name.clone(),
                runtime: function.runtime,
            });
        }
    }
    Ok(())
}
