//! Operation index: `operationId` → (method, path template, raw operation).
//!
//! Indexing never fails. Anything that does not look like an operation is skipped: non-object
//! method slots, keys that are not HTTP methods (`parameters`, `summary`, `x-*`), and operations
//! without an `operationId`. Missing fields become `None`/empty.

use crate::document::SpecDocument;
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawParameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub schema: Option<Value>,
    pub description: Option<String>,
}

/// Properties and required names of one object shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

/// The `application/json` request body schema.
#[derive(Debug, Clone, PartialEq)]
pub enum BodySchema {
    /// A schema that declares `properties` directly.
    Object(ObjectShape),
    /// `anyOf` / `oneOf` alternatives. A variant without `properties` is an empty shape.
    Union(Vec<ObjectShape>),
    /// Anything else (arrays, scalars, `allOf`, unresolvable refs).
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawOperation {
    pub summary: Option<String>,
    pub parameters: Vec<RawParameter>,
    pub body: Option<BodySchema>,
}

#[derive(Debug, Clone)]
pub struct IndexedOperation {
    pub method: Method,
    pub path: String,
    pub operation: RawOperation,
}

/// Operations keyed by `operationId`, in document order.
#[derive(Debug, Clone, Default)]
pub struct OperationIndex {
    entries: Vec<(String, IndexedOperation)>,
    by_id: HashMap<String, usize>,
}

impl OperationIndex {
    #[must_use]
    pub fn build(doc: &SpecDocument) -> Self {
        let mut index = Self::default();

        let Some(paths) = doc.root().get("paths").and_then(Value::as_object) else {
            return index;
        };

        for (path, item) in paths {
            let Some(item) = doc.resolve_ref(item).as_object() else {
                continue;
            };
            let shared = item
                .get("parameters")
                .map(|p| read_parameters(doc, p))
                .unwrap_or_default();

            for (key, op) in item {
                let Some(method) = http_method(key) else {
                    continue;
                };
                let Some(op) = op.as_object() else {
                    continue;
                };
                let Some(operation_id) = op.get("operationId").and_then(Value::as_str) else {
                    continue;
                };
                if operation_id.is_empty() {
                    continue;
                }

                let operation = read_operation(doc, op, &shared);
                index.insert(
                    operation_id.to_string(),
                    IndexedOperation {
                        method,
                        path: path.clone(),
                        operation,
                    },
                );
            }
        }

        index
    }

    // Later duplicates replace the entry but keep the first-seen position.
    fn insert(&mut self, id: String, op: IndexedOperation) {
        if let Some(&i) = self.by_id.get(&id) {
            self.entries[i].1 = op;
        } else {
            self.by_id.insert(id.clone(), self.entries.len());
            self.entries.push((id, op));
        }
    }

    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&IndexedOperation> {
        self.by_id.get(operation_id).map(|&i| &self.entries[i].1)
    }

    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn http_method(key: &str) -> Option<Method> {
    match key {
        "get" => Some(Method::GET),
        "put" => Some(Method::PUT),
        "post" => Some(Method::POST),
        "delete" => Some(Method::DELETE),
        "options" => Some(Method::OPTIONS),
        "head" => Some(Method::HEAD),
        "patch" => Some(Method::PATCH),
        "trace" => Some(Method::TRACE),
        _ => None,
    }
}

fn read_operation(
    doc: &SpecDocument,
    op: &Map<String, Value>,
    shared: &[RawParameter],
) -> RawOperation {
    let own = op
        .get("parameters")
        .map(|p| read_parameters(doc, p))
        .unwrap_or_default();

    RawOperation {
        summary: op.get("summary").and_then(Value::as_str).map(str::to_string),
        parameters: merge_parameters(shared, own),
        body: op.get("requestBody").and_then(|rb| read_body(doc, rb)),
    }
}

/// Operation-level parameters override path-level ones with the same (location, name).
fn merge_parameters(shared: &[RawParameter], own: Vec<RawParameter>) -> Vec<RawParameter> {
    let mut merged: Vec<RawParameter> = shared.to_vec();
    for p in own {
        match merged
            .iter_mut()
            .find(|m| m.location == p.location && m.name == p.name)
        {
            Some(slot) => *slot = p,
            None => merged.push(p),
        }
    }
    merged
}

fn read_parameters(doc: &SpecDocument, value: &Value) -> Vec<RawParameter> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| read_parameter(doc, doc.resolve_ref(item)))
        .collect()
}

fn read_parameter(doc: &SpecDocument, value: &Value) -> Option<RawParameter> {
    let obj = value.as_object()?;
    let name = obj.get("name").and_then(Value::as_str)?;
    let location = ParamLocation::parse(obj.get("in").and_then(Value::as_str)?)?;

    Some(RawParameter {
        name: name.to_string(),
        location,
        required: obj.get("required").and_then(Value::as_bool).unwrap_or(false),
        schema: obj.get("schema").map(|s| doc.resolve_ref(s).clone()),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn read_body(doc: &SpecDocument, request_body: &Value) -> Option<BodySchema> {
    let schema = doc
        .resolve_ref(request_body)
        .get("content")?
        .get("application/json")?
        .get("schema")?;
    Some(body_schema(doc, doc.resolve_ref(schema)))
}

fn body_schema(doc: &SpecDocument, schema: &Value) -> BodySchema {
    if schema.get("properties").is_some() {
        return BodySchema::Object(object_shape(doc, schema));
    }

    let variants = schema
        .get("anyOf")
        .or_else(|| schema.get("oneOf"))
        .and_then(Value::as_array);
    match variants {
        Some(variants) => BodySchema::Union(
            variants
                .iter()
                .map(|v| object_shape(doc, doc.resolve_ref(v)))
                .collect(),
        ),
        None => BodySchema::Opaque,
    }
}

fn object_shape(doc: &SpecDocument, schema: &Value) -> ObjectShape {
    let Some(properties) = schema.get("properties") else {
        return ObjectShape::default();
    };

    let properties = properties
        .as_object()
        .map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.clone(), doc.resolve_ref(v).clone()))
                .collect()
        })
        .unwrap_or_default();
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| {
            r.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ObjectShape {
        properties,
        required,
    }
}
