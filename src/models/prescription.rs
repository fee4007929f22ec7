use serde::{Deserialize, Serialize};

use super::enums::InteractionSeverity;

/// Sentinel for identity fields and lists nothing could be recovered for.
pub const UNABLE_TO_EXTRACT: &str = "Unable to extract";
/// Sentinel for medication attributes the source text never stated.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Explicit marker for an empty diagnosis list.
pub const NONE_DETECTED: &str = "None detected";
/// Default allergy entry when the text carries no allergy section.
pub const NONE_SPECIFIED: &str = "None specified";
/// Placeholder recommendation when the model produced none.
pub const REVIEW_MANUALLY: &str = "Please review manually";

/// Canonical structured prescription. Every field is always present;
/// absence is expressed through the sentinel constants above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRecord {
    pub patient_name: String,
    pub age: String,
    pub diagnosis: Vec<String>,
    pub medications: Vec<Medication>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub interactions: Vec<Interaction>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    /// Empty string when the prescription gives no special instructions.
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub severity: InteractionSeverity,
    pub description: String,
    pub drugs: Vec<String>,
}

impl PrescriptionRecord {
    /// Names of all prescribed medications, in prescription order.
    pub fn medication_names(&self) -> Vec<&str> {
        self.medications.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn has_high_severity_interaction(&self) -> bool {
        self.interactions
            .iter()
            .any(|i| i.severity == InteractionSeverity::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PrescriptionRecord {
        PrescriptionRecord {
            patient_name: "Jane Roe".into(),
            age: "62 years old".into(),
            diagnosis: vec!["Atrial fibrillation".into()],
            medications: vec![Medication {
                name: "Warfarin".into(),
                dosage: "5mg".into(),
                frequency: "once daily".into(),
                duration: "ongoing".into(),
                instructions: String::new(),
            }],
            medical_history: vec!["Hypertension".into()],
            allergies: vec![NONE_SPECIFIED.into()],
            interactions: vec![Interaction {
                severity: InteractionSeverity::High,
                description: "Bleeding risk with NSAIDs".into(),
                drugs: vec!["Warfarin".into(), "Ibuprofen".into()],
            }],
            recommendations: vec!["Monitor INR weekly".into()],
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("patientName").is_some());
        assert!(json.get("medicalHistory").is_some());
        assert_eq!(json["interactions"][0]["severity"], "high");
    }

    #[test]
    fn missing_instructions_default_to_empty() {
        let med: Medication = serde_json::from_str(
            r#"{"name":"Aspirin","dosage":"81mg","frequency":"daily","duration":"ongoing"}"#,
        )
        .unwrap();
        assert_eq!(med.instructions, "");
    }

    #[test]
    fn medication_names_in_order() {
        assert_eq!(sample().medication_names(), vec!["Warfarin"]);
    }

    #[test]
    fn detects_high_severity_interaction() {
        let mut record = sample();
        assert!(record.has_high_severity_interaction());
        record.interactions[0].severity = InteractionSeverity::Low;
        assert!(!record.has_high_severity_interaction());
    }
}
