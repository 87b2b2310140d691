//! Flattening one operation into a single agent-facing input schema.
//!
//! Path and query parameters come first, then request-body properties. Body properties never
//! replace a parameter of the same name. For `anyOf`/`oneOf` bodies the property set is the union
//! across variants while the required set is the intersection; a property whose variants pin
//! different `const` values becomes an `enum` of those values.

use crate::index::{BodySchema, ObjectShape, ParamLocation, RawOperation};
use rmcp::model::JsonObject;
use serde_json::{Map, Value};

/// Flat object schema: ordered properties plus required names.
///
/// Every required name is a property key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
}

impl InputSchema {
    /// `{ "type": "object", "properties": …, "required": … }`
    #[must_use]
    pub fn to_json_object(&self) -> JsonObject {
        let mut obj = JsonObject::new();
        obj.insert("type".to_string(), Value::String("object".to_string()));
        obj.insert(
            "properties".to_string(),
            Value::Object(self.properties.clone()),
        );
        obj.insert(
            "required".to_string(),
            Value::Array(self.required.iter().cloned().map(Value::String).collect()),
        );
        obj
    }
}

#[must_use]
pub fn build_input_schema(op: &RawOperation) -> InputSchema {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    for param in &op.parameters {
        if !matches!(param.location, ParamLocation::Path | ParamLocation::Query) {
            continue;
        }

        let mut fragment = param
            .schema
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if let Some(desc) = &param.description {
            fragment.insert("description".to_string(), Value::String(desc.clone()));
        }
        properties.insert(param.name.clone(), Value::Object(fragment));

        if param.location == ParamLocation::Path || param.required {
            required.push(param.name.clone());
        }
    }

    let body = match &op.body {
        Some(BodySchema::Object(shape)) => Some(shape.clone()),
        Some(BodySchema::Union(variants)) => Some(merge_variants(variants)),
        Some(BodySchema::Opaque) | None => None,
    };
    if let Some(body) = body {
        for (name, fragment) in body.properties {
            properties.entry(name).or_insert(fragment);
        }
        required.extend(body.required);
    }

    finalize(properties, required)
}

/// Union of property keys, intersection of required names, `const` collapse.
fn merge_variants(variants: &[ObjectShape]) -> ObjectShape {
    let mut collected: Vec<(&str, Vec<&Value>)> = Vec::new();
    for variant in variants {
        for (name, fragment) in &variant.properties {
            match collected.iter_mut().find(|(n, _)| *n == name.as_str()) {
                Some((_, fragments)) => fragments.push(fragment),
                None => collected.push((name.as_str(), vec![fragment])),
            }
        }
    }

    let properties = collected
        .into_iter()
        .map(|(name, fragments)| (name.to_string(), merge_fragments(&fragments)))
        .collect();

    let required = match variants.split_first() {
        Some((first, rest)) => first
            .required
            .iter()
            .filter(|name| rest.iter().all(|v| v.required.contains(*name)))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    ObjectShape {
        properties,
        required,
    }
}

fn merge_fragments(fragments: &[&Value]) -> Value {
    let Some(first) = fragments.first() else {
        return Value::Object(Map::new());
    };

    let mut consts: Vec<&Value> = Vec::new();
    for c in fragments.iter().filter_map(|f| f.get("const")) {
        if !consts.contains(&c) {
            consts.push(c);
        }
    }
    if consts.len() <= 1 {
        return (*first).clone();
    }

    let mut merged = first.as_object().cloned().unwrap_or_default();
    merged.remove("const");
    merged.insert(
        "enum".to_string(),
        Value::Array(consts.into_iter().cloned().collect()),
    );
    Value::Object(merged)
}

fn finalize(properties: Map<String, Value>, required: Vec<String>) -> InputSchema {
    let mut deduped: Vec<String> = Vec::with_capacity(required.len());
    for name in required {
        if properties.contains_key(&name) && !deduped.contains(&name) {
            deduped.push(name);
        }
    }

    InputSchema {
        properties,
        required: deduped,
    }
}
