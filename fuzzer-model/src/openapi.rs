use std::collections::HashMap;
use std::path::Path;

use openapiv3::{OpenAPI, Parameter, ParameterSchemaOrContent, ReferenceOr};
use serde_json::Value;

use crate::error::ModelError;
use crate::internal_op::InternalOperation;
use crate::op::{ExternalOp, InternalEndpoint, ParamLocation, ParamSpec};

/// Load an OpenAPI document (YAML or JSON, dispatched on extension) and
/// build one `ExternalOp` per declared `(path, method)`.
///
/// This is the external-collaborator boundary named in spec §1/§6: beyond
/// this function the core never touches the `openapiv3` types again, only
/// the `ExternalOp`/`InternalOperation` shapes below.
pub fn load_external_ops(path: &Path) -> Result<Vec<ExternalOp>, ModelError> {
    let doc = load_document(path)?;
    Ok(external_ops_from_document(&doc))
}

/// Load one internal service's OpenAPI document into `InternalOperation`s,
/// keyed under the given (pre-normalization) service name.
pub fn load_internal_ops(service: &str, path: &Path) -> Result<Vec<InternalOperation>, ModelError> {
    let doc = load_document(path)?;
    Ok(internal_ops_from_document(service, &doc))
}

fn load_document(path: &Path) -> Result<OpenAPI, ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let doc: OpenAPI = if is_json {
        serde_json::from_str(&raw).map_err(|e| ModelError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&raw).map_err(|e| ModelError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
    };
    Ok(doc)
}

fn external_ops_from_document(doc: &OpenAPI) -> Vec<ExternalOp> {
    let mut ops = Vec::new();
    for (path, item) in doc.paths.iter() {
        let Some(item) = item.as_item() else { continue };
        for (method, operation) in method_operations(item) {
            let mut op = ExternalOp::new(path.clone(), method);
            populate_parameters(&mut op.parameters, &operation.parameters, doc);
            op.request_body_schema = request_body_schema(&operation.request_body, doc);
            op.responses = response_schemas(&operation.responses);
            ops.push(op);
        }
    }
    ops
}

fn internal_ops_from_document(service: &str, doc: &OpenAPI) -> Vec<InternalOperation> {
    let mut ops = Vec::new();
    for (path, item) in doc.paths.iter() {
        let Some(item) = item.as_item() else { continue };
        for (method, operation) in method_operations(item) {
            let key = InternalEndpoint::new(service, path.clone(), method);
            let mut op = InternalOperation::new(key);
            populate_parameters(&mut op.parameters, &operation.parameters, doc);
            op.request_body_schema = request_body_schema(&operation.request_body, doc);
            op.responses = response_schemas(&operation.responses);
            ops.push(op);
        }
    }
    ops
}

fn method_operations(item: &openapiv3::PathItem) -> Vec<(&'static str, &openapiv3::Operation)> {
    let mut out = Vec::new();
    macro_rules! push {
        ($field:ident, $verb:expr) => {
            if let Some(op) = &item.$field {
                out.push(($verb, op));
            }
        };
    }
    push!(get, "GET");
    push!(put, "PUT");
    push!(post, "POST");
    push!(delete, "DELETE");
    push!(options, "OPTIONS");
    push!(head, "HEAD");
    push!(patch, "PATCH");
    push!(trace, "TRACE");
    out
}

fn populate_parameters(out: &mut Vec<ParamSpec>, params: &[ReferenceOr<Parameter>], doc: &OpenAPI) {
    for p in params {
        let Some(p) = resolve_parameter(p, doc) else { continue };
        let data = p.parameter_data_ref();
        let location = match p {
            Parameter::Path { .. } => ParamLocation::Path,
            Parameter::Query { .. } => ParamLocation::Query,
            Parameter::Header { .. } => ParamLocation::Header,
            Parameter::Cookie { .. } => continue,
        };
        let schema = match &data.format {
            ParameterSchemaOrContent::Schema(s) => schema_to_value(s),
            ParameterSchemaOrContent::Content(_) => Value::Object(Default::default()),
        };
        out.push(ParamSpec {
            name: data.name.clone(),
            location,
            schema,
            required: data.required,
        });
    }
}

fn resolve_parameter<'a>(p: &'a ReferenceOr<Parameter>, _doc: &OpenAPI) -> Option<&'a Parameter> {
    // Component $ref resolution is out of scope (spec treats the doc as
    // "already parsed"); unresolved refs are skipped rather than panicking.
    p.as_item()
}

fn schema_to_value(schema: &ReferenceOr<openapiv3::Schema>) -> Value {
    match schema.as_item() {
        Some(s) => serde_json::to_value(s).unwrap_or(Value::Null),
        None => Value::Object(Default::default()),
    }
}

fn request_body_schema(
    body: &Option<ReferenceOr<openapiv3::RequestBody>>,
    _doc: &OpenAPI,
) -> Option<Value> {
    let body = body.as_ref()?.as_item()?;
    let media = body.content.get("application/json")?;
    let schema = media.schema.as_ref()?;
    Some(schema_to_value(schema))
}

fn response_schemas(responses: &openapiv3::Responses) -> HashMap<String, Value> {
    let mut out = HashMap::new();
    if let Some(default) = &responses.default {
        if let Some(item) = default.as_item() {
            out.insert("default".to_string(), response_body_schema(item));
        }
    }
    for (status, resp) in &responses.responses {
        let Some(item) = resp.as_item() else { continue };
        out.insert(status.to_string(), response_body_schema(item));
    }
    out
}

fn response_body_schema(resp: &openapiv3::Response) -> Value {
    resp.content
        .get("application/json")
        .and_then(|m| m.schema.as_ref())
        .map(schema_to_value)
        .unwrap_or(Value::Object(Default::default()))
}

/// Load `--internal-service-openapi-spec`: either a single JSON map
/// `{service: path}`, or a path to a file containing such a map (§6).
pub fn load_internal_service_map(arg: &str) -> Result<HashMap<String, String>, ModelError> {
    let as_map: Result<HashMap<String, String>, _> = serde_json::from_str(arg);
    if let Ok(map) = as_map {
        return Ok(map);
    }
    let path = Path::new(arg);
    let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| ModelError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
