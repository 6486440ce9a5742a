use std::fs;
use std::path::{Path, PathBuf};

use infra_core::template::render_template;
use infra_core::StackGraph;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::target::DeploymentTarget;

pub const CLOUD_ASSEMBLY_VERSION: &str = "21.0.0";
pub const TREE_VERSION: &str = "tree-0.1";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const TREE_FILE: &str = "tree.json";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize synthesis output: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthOutput {
    pub template_path: PathBuf,
    pub manifest_path: PathBuf,
    pub tree_path: PathBuf,
    pub fingerprint: String,
}

/// Consumer of an assembled graph. Implementations decide how the graph is
/// turned into deployable artifacts.
pub trait SynthesisBackend {
    fn synthesize(
        &self,
        graph: &StackGraph,
        target: &DeploymentTarget,
    ) -> Result<SynthOutput, BackendError>;
}

/// Writes a cloud assembly directory: the template, a manifest and the
/// construct tree.
pub struct CloudAssemblyBackend {
    output_dir: PathBuf,
}

impl CloudAssemblyBackend {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl SynthesisBackend for CloudAssemblyBackend {
    fn synthesize(
        &self,
        graph: &StackGraph,
        target: &DeploymentTarget,
    ) -> Result<SynthOutput, BackendError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| BackendError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let fingerprint = graph.fingerprint()?;
        let template_file = template_file_name(&graph.identity);

        let template_path = self.output_dir.join(&template_file);
        write_json(&template_path, &render_template(graph))?;

        let manifest_path = self.output_dir.join(MANIFEST_FILE);
        write_json(
            &manifest_path,
            &manifest(graph, target, &template_file, &fingerprint),
        )?;

        let tree_path = self.output_dir.join(TREE_FILE);
        write_json(&tree_path, &construct_tree(graph))?;

        tracing::debug!(
            stack = %graph.identity,
            dir = %self.output_dir.display(),
            "cloud assembly written"
        );

        Ok(SynthOutput {
            template_path,
            manifest_path,
            tree_path,
            fingerprint,
        })
    }
}

pub fn template_file_name(identity: &str) -> String {
    format!("{identity}.template.json")
}

fn write_json(path: &Path, value: &Value) -> Result<(), BackendError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    fs::write(path, bytes).map_err(|source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn manifest(
    graph: &StackGraph,
    target: &DeploymentTarget,
    template_file: &str,
    fingerprint: &str,
) -> Value {
    let tags: Map<String, Value> = graph
        .tags
        .iter()
        .map(|tag| (tag.key.clone(), Value::from(tag.value.clone())))
        .collect();

    let mut artifacts = Map::new();
    artifacts.insert(
        graph.identity.clone(),
        json!({
            "type": "aws:cloudformation:stack",
            "environment": target.environment_uri(),
            "properties": {
                "templateFile": template_file,
                "tags": tags,
            },
            "metadata": {
                "graphFingerprint": fingerprint,
            },
        }),
    );
    artifacts.insert(
        "Tree".to_string(),
        json!({
            "type": "cdk:tree",
            "properties": { "file": TREE_FILE },
        }),
    );

    json!({
        "version": CLOUD_ASSEMBLY_VERSION,
        "artifacts": artifacts,
    })
}

fn construct_tree(graph: &StackGraph) -> Value {
    let mut children = Map::new();
    let names = graph
        .layers
        .iter()
        .map(|layer| layer.name.as_str())
        .chain(graph.functions.iter().map(|function| function.name.as_str()));
    for name in names {
        children.insert(
            name.to_string(),
            json!({
                "id": name,
                "path": format!("{}/{name}", graph.identity),
            }),
        );
    }

    let mut stacks = Map::new();
    stacks.insert(
        graph.identity.clone(),
        json!({
            "id": graph.identity,
            "path": graph.identity,
            "children": children,
        }),
    );

    json!({
        "version": TREE_VERSION,
        "tree": {
            "id": "App",
            "path": "",
            "children": stacks,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_core::{assemble, Configuration};

    #[test]
    fn manifest_records_environment_and_template() {
        let graph = assemble(&Configuration::default().with_stage("dev")).expect("graph");
        let value = manifest(
            &graph,
            &DeploymentTarget::default(),
            "lambda-monorepo-example-dev.template.json",
            "abc",
        );

        let artifact = &value["artifacts"]["lambda-monorepo-example-dev"];
        assert_eq!(artifact["type"], "aws:cloudformation:stack");
        assert_eq!(artifact["environment"], "aws://unknown-account/unknown-region");
        assert_eq!(
            artifact["properties"]["templateFile"],
            "lambda-monorepo-example-dev.template.json"
        );
        assert_eq!(artifact["properties"]["tags"]["Stage"], "dev");
    }

    #[test]
    fn tree_lists_every_resource_under_the_stack() {
        let graph = assemble(&Configuration::default().with_stage("dev")).expect("graph");
        let tree = construct_tree(&graph);
        let stack = &tree["tree"]["children"]["lambda-monorepo-example-dev"];
        let children = stack["children"].as_object().expect("children");
        assert_eq!(children.len(), 3);
        assert_eq!(children["Lambda 2"]["path"], "lambda-monorepo-example-dev/Lambda 2");
    }
}
