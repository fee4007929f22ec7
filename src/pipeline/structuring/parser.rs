use serde_json::{Map, Value};

use super::normalize::{normalize, PartialInteraction, PartialMedication, PartialRecord};
use super::StructuringError;
use crate::models::PrescriptionRecord;

/// Top-level keys of the record schema. An object carrying none of them is
/// not a prescription record.
const RECORD_KEYS: &[&str] = &[
    "patientName",
    "age",
    "diagnosis",
    "medications",
    "medicalHistory",
    "allergies",
    "interactions",
    "recommendations",
];

/// Recover a record from free-form model output.
///
/// The candidate is everything from the first `{` to the last `}`, so
/// prose before and after the object is ignored. Any failure here is a
/// tier failure for the cascade.
pub fn parse_model_output(output: &str) -> Result<PrescriptionRecord, StructuringError> {
    let candidate = outermost_object(output)?;

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| StructuringError::JsonParsing(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| StructuringError::MalformedResponse("JSON value is not an object".into()))?;

    if !RECORD_KEYS.iter().any(|k| object.contains_key(*k)) {
        return Err(StructuringError::MalformedResponse(
            "object has no prescription fields".into(),
        ));
    }

    Ok(normalize(partial_from_object(object)))
}

fn outermost_object(output: &str) -> Result<&str, StructuringError> {
    let start = output.find('{');
    let end = output.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&output[s..=e]),
        _ => Err(StructuringError::MalformedResponse(
            "No JSON object found in model output".into(),
        )),
    }
}

/// Models drift from the requested shape: strings where lists were asked
/// for, numbers for ages, single objects instead of arrays. Accept those.
fn partial_from_object(object: &Map<String, Value>) -> PartialRecord {
    static NULL: Value = Value::Null;
    let get = |key: &str| object.get(key).unwrap_or(&NULL);

    PartialRecord {
        patient_name: as_text(get("patientName")),
        age: as_text(get("age")),
        diagnosis: as_text_list(get("diagnosis")),
        medications: as_items(get("medications"))
            .into_iter()
            .map(medication_from_value)
            .collect(),
        medical_history: as_text_list(get("medicalHistory")),
        allergies: as_text_list(get("allergies")),
        interactions: as_items(get("interactions"))
            .into_iter()
            .filter_map(interaction_from_value)
            .collect(),
        recommendations: as_text_list(get("recommendations")),
    }
}

fn medication_from_value(value: &Value) -> PartialMedication {
    match value {
        Value::Object(fields) => {
            let field = |key: &str| fields.get(key).and_then(as_text);
            PartialMedication {
                name: field("name"),
                dosage: field("dosage"),
                frequency: field("frequency"),
                duration: field("duration"),
                instructions: field("instructions"),
            }
        }
        // A bare string names the drug and nothing else
        other => PartialMedication {
            name: as_text(other),
            ..Default::default()
        },
    }
}

fn interaction_from_value(value: &Value) -> Option<PartialInteraction> {
    let fields = value.as_object()?;
    Some(PartialInteraction {
        severity: fields.get("severity").and_then(as_text),
        description: fields.get("description").and_then(as_text),
        drugs: fields.get("drugs").map(as_text_list).unwrap_or_default(),
    })
}

/// Scalar rendering of a JSON value; arrays are joined with ", ".
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        other => as_text(other).into_iter().collect(),
    }
}

fn as_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    }
}
