//! Renders a [`StackGraph`] into a CloudFormation-shaped template.
//!
//! Source directories are referenced as assets only; building and uploading
//! the archives is left to whichever backend deploys the template.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::graph::{FunctionNode, LayerNode, StackGraph, Tag};
use crate::naming::{asset_id, logical_id};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

pub fn render_template(graph: &StackGraph) -> Value {
    let mut resources = Map::new();

    for layer in &graph.layers {
        resources.insert(logical_id(&[layer.name.as_str()]), layer_resource(graph, layer));
    }

    for function in &graph.functions {
        let role_id = logical_id(&[function.name.as_str(), "ServiceRole"]);
        resources.insert(role_id.clone(), role_resource(graph, function));
        resources.insert(
            logical_id(&[function.name.as_str()]),
            function_resource(graph, function, &role_id),
        );
    }

    json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Description": format!("Lambda monorepo stack {}", graph.identity),
        "Resources": resources,
    })
}

/// CloudFormation tag list, sorted by key.
pub fn render_tags(tags: &[Tag]) -> Value {
    let mut sorted: Vec<&Tag> = tags.iter().collect();
    sorted.sort_by(|left, right| left.key.cmp(&right.key));
    Value::Array(
        sorted
            .into_iter()
            .map(|tag| json!({ "Key": tag.key, "Value": tag.value }))
            .collect(),
    )
}

/// Forward-slash form of a relative path, identical on every platform.
pub fn portable_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn asset_code(source_directory: &Path) -> Value {
    json!({
        "S3Bucket": { "Fn::Sub": "cdk-assets-${AWS::AccountId}-${AWS::Region}" },
        "S3Key": format!("{}.zip", asset_id(&portable_path(source_directory))),
    })
}

fn metadata(graph: &StackGraph, name: &str, source: Option<(&Path, &str)>) -> Value {
    let mut metadata = Map::new();
    metadata.insert(
        "aws:cdk:path".to_string(),
        Value::from(format!("{}/{name}/Resource", graph.identity)),
    );
    if let Some((directory, property)) = source {
        metadata.insert(
            "aws:asset:path".to_string(),
            Value::from(portable_path(directory)),
        );
        metadata.insert("aws:asset:property".to_string(), Value::from(property));
    }
    Value::Object(metadata)
}

fn layer_resource(graph: &StackGraph, layer: &LayerNode) -> Value {
    let source = Some((layer.source_directory.as_path(), "Content"));
    let runtimes: Vec<&str> = layer
        .compatible_runtimes
        .iter()
        .map(|runtime| runtime.identifier())
        .collect();
    json!({
        "Type": "AWS::Lambda::LayerVersion",
        "Properties": {
            "Content": asset_code(&layer.source_directory),
            "CompatibleRuntimes": runtimes,
        },
        "Metadata": metadata(graph, &layer.name, source),
    })
}

fn role_resource(graph: &StackGraph, function: &FunctionNode) -> Value {
    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "AssumeRolePolicyDocument": {
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                }],
                "Version": "2012-10-17",
            },
            "ManagedPolicyArns": [{
                "Fn::Join": ["", [
                    "arn:",
                    { "Ref": "AWS::Partition" },
                    format!(":iam::aws:policy/{BASIC_EXECUTION_POLICY}"),
                ]],
            }],
            "Tags": render_tags(&graph.tags),
        },
        "Metadata": metadata(graph, &format!("{}/ServiceRole", function.name), None),
    })
}

fn function_resource(graph: &StackGraph, function: &FunctionNode, role_id: &str) -> Value {
    let layer_ids: Vec<String> = function
        .depends_on_layers
        .iter()
        .map(|layer| logical_id(&[layer.as_str()]))
        .collect();
    let layer_refs: Vec<Value> = layer_ids.iter().map(|id| json!({ "Ref": id })).collect();

    let source = Some((function.source_directory.as_path(), "Code"));
    let mut depends_on = vec![role_id.to_string()];
    depends_on.extend(layer_ids);

    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "Code": asset_code(&function.source_directory),
            "Handler": function.handler,
            "Runtime": function.runtime.identifier(),
            "MemorySize": function.memory_mb,
            "Timeout": function.timeout_seconds,
            "Role": { "Fn::GetAtt": [role_id, "Arn"] },
            "Layers": layer_refs,
            "Tags": render_tags(&graph.tags),
        },
        "DependsOn": depends_on,
        "Metadata": metadata(graph, &function.name, source),
    })
}
