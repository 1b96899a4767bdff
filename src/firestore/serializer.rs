//! Conversion between plain JSON documents and the typed-value JSON used by the REST API.
//!
//! Only the shapes a plain JSON document can produce are emitted. On decode, value kinds with no
//! plain JSON counterpart collapse to the closest one: timestamps and references become strings,
//! bytes stay base64 strings, geo points become `{latitude, longitude}` objects.

use std::str::FromStr;

use serde_json::{json, Map, Number, Value as JsonValue};

use crate::firestore::error::{invalid_argument, FirestoreResult};

/// Encodes a top-level JSON object as the `fields` map of a document body.
pub fn encode_document_fields(data: &JsonValue) -> FirestoreResult<JsonValue> {
    let object = data
        .as_object()
        .ok_or_else(|| invalid_argument("Document data must be a JSON object"))?;
    Ok(encode_map_fields(object))
}

/// Decodes the `fields` of a REST document into a plain JSON object. A document without
/// user fields decodes to an empty object.
pub fn decode_document_fields(document: &JsonValue) -> FirestoreResult<JsonValue> {
    match document.get("fields") {
        Some(fields) => decode_fields_object(fields),
        None => Ok(JsonValue::Object(Map::new())),
    }
}

pub fn encode_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "nullValue": JsonValue::Null }),
        JsonValue::Bool(boolean) => json!({ "booleanValue": boolean }),
        JsonValue::Number(number) => encode_number(number),
        JsonValue::String(string) => json!({ "stringValue": string }),
        JsonValue::Array(values) => {
            let values = values.iter().map(encode_value).collect::<Vec<_>>();
            json!({ "arrayValue": { "values": values } })
        }
        JsonValue::Object(map) => json!({
            "mapValue": {
                "fields": encode_map_fields(map)
            }
        }),
    }
}

fn encode_number(number: &Number) -> JsonValue {
    match number.as_i64() {
        Some(integer) => json!({ "integerValue": integer.to_string() }),
        None => json!({ "doubleValue": number.as_f64().unwrap_or_default() }),
    }
}

fn encode_map_fields(map: &Map<String, JsonValue>) -> JsonValue {
    let mut fields = Map::new();
    for (key, value) in map {
        fields.insert(key.clone(), encode_value(value));
    }
    JsonValue::Object(fields)
}

fn decode_fields_object(fields: &JsonValue) -> FirestoreResult<JsonValue> {
    let fields = fields
        .as_object()
        .ok_or_else(|| invalid_argument("Expected 'fields' to be an object"))?;
    let mut decoded = Map::new();
    for (key, value) in fields {
        decoded.insert(key.clone(), decode_value(value)?);
    }
    Ok(JsonValue::Object(decoded))
}

pub fn decode_value(value: &JsonValue) -> FirestoreResult<JsonValue> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid_argument("Expected Firestore value object"))?;
    if object.contains_key("nullValue") {
        return Ok(JsonValue::Null);
    }
    if let Some(bool_value) = object.get("booleanValue") {
        let value = bool_value
            .as_bool()
            .ok_or_else(|| invalid_argument("booleanValue must be bool"))?;
        return Ok(JsonValue::Bool(value));
    }
    if let Some(integer_value) = object.get("integerValue") {
        let parsed = match integer_value {
            JsonValue::String(value) => i64::from_str(value)
                .map_err(|err| invalid_argument(format!("Invalid integerValue: {err}")))?,
            JsonValue::Number(number) => number
                .as_i64()
                .ok_or_else(|| invalid_argument("Integer out of range"))?,
            _ => return Err(invalid_argument("integerValue must be a string or number")),
        };
        return Ok(JsonValue::from(parsed));
    }
    if let Some(double_value) = object.get("doubleValue") {
        let parsed = match double_value {
            JsonValue::Number(number) => number
                .as_f64()
                .ok_or_else(|| invalid_argument("Invalid doubleValue"))?,
            JsonValue::String(value) => value
                .parse::<f64>()
                .map_err(|err| invalid_argument(format!("Invalid doubleValue: {err}")))?,
            _ => return Err(invalid_argument("doubleValue must be a number or string")),
        };
        // NaN and infinities have no JSON form.
        return Ok(Number::from_f64(parsed).map_or(JsonValue::Null, JsonValue::Number));
    }
    for key in ["stringValue", "timestampValue", "referenceValue", "bytesValue"] {
        if let Some(text) = object.get(key) {
            let text = text
                .as_str()
                .ok_or_else(|| invalid_argument(format!("{key} must be string")))?;
            return Ok(JsonValue::String(text.to_owned()));
        }
    }
    if let Some(geo_point) = object.get("geoPointValue") {
        let latitude = geo_point.get("latitude").and_then(JsonValue::as_f64);
        let longitude = geo_point.get("longitude").and_then(JsonValue::as_f64);
        return Ok(json!({
            "latitude": latitude.unwrap_or_default(),
            "longitude": longitude.unwrap_or_default(),
        }));
    }
    if let Some(array_value) = object.get("arrayValue") {
        let decoded = match array_value.get("values").and_then(JsonValue::as_array) {
            Some(entries) => entries
                .iter()
                .map(decode_value)
                .collect::<FirestoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        return Ok(JsonValue::Array(decoded));
    }
    if let Some(map_value) = object.get("mapValue") {
        return match map_value.get("fields") {
            Some(fields) => decode_fields_object(fields),
            None => Ok(JsonValue::Object(Map::new())),
        };
    }

    Err(invalid_argument("Unknown Firestore value type"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_document_fields_with_typed_values() {
        let data = json!({
            "tasks": [{"id": "1", "completed": false}],
            "count": 3,
            "ratio": 0.5,
            "note": null
        });
        let encoded = encode_document_fields(&data).unwrap();

        assert_eq!(encoded["count"], json!({"integerValue": "3"}));
        assert_eq!(encoded["ratio"], json!({"doubleValue": 0.5}));
        assert_eq!(encoded["note"], json!({"nullValue": null}));
        assert_eq!(
            encoded["tasks"]["arrayValue"]["values"][0]["mapValue"]["fields"]["completed"],
            json!({"booleanValue": false})
        );
        assert_eq!(
            decode_document_fields(&json!({ "fields": encoded })).unwrap(),
            data
        );
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(encode_document_fields(&json!([1, 2])).is_err());
    }

    #[test]
    fn decodes_server_only_kinds_to_plain_json() {
        let document = json!({
            "name": "projects/p/databases/(default)/documents/studymate/shared_data",
            "fields": {
                "emptyList": {"arrayValue": {}},
                "emptyMap": {"mapValue": {}},
                "when": {"timestampValue": "2026-01-05T10:00:00Z"},
                "where": {"geoPointValue": {"latitude": 1.5, "longitude": -3.0}}
            }
        });
        let decoded = decode_document_fields(&document).unwrap();
        assert_eq!(decoded["emptyList"], json!([]));
        assert_eq!(decoded["emptyMap"], json!({}));
        assert_eq!(decoded["when"], "2026-01-05T10:00:00Z");
        assert_eq!(decoded["where"], json!({"latitude": 1.5, "longitude": -3.0}));

        assert_eq!(
            decode_document_fields(&json!({"name": "x"})).unwrap(),
            json!({})
        );
        assert!(decode_value(&json!({"mysteryValue": 1})).is_err());
    }
}
