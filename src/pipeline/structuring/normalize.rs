use crate::models::{
    Interaction, InteractionSeverity, Medication, PrescriptionRecord, NOT_SPECIFIED,
    REVIEW_MANUALLY, UNABLE_TO_EXTRACT,
};

/// Loosely-typed record as an extractor produced it: any field may be
/// missing or blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub patient_name: Option<String>,
    pub age: Option<String>,
    pub diagnosis: Vec<String>,
    pub medications: Vec<PartialMedication>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
    pub interactions: Vec<PartialInteraction>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMedication {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialInteraction {
    /// Raw severity label; mapped leniently onto high/medium/low.
    pub severity: Option<String>,
    pub description: Option<String>,
    pub drugs: Vec<String>,
}

/// Map any extractor output onto the canonical record, substituting
/// sentinels for everything missing. Pure and idempotent.
///
/// - `patientName`, `age`: "Unable to extract"
/// - `diagnosis`, `medicalHistory`, `allergies`: `["Unable to extract"]`
/// - `recommendations`: `["Please review manually"]`
/// - `medications`, `interactions`: may stay empty
pub fn normalize(partial: PartialRecord) -> PrescriptionRecord {
    PrescriptionRecord {
        patient_name: scalar_or(partial.patient_name, UNABLE_TO_EXTRACT),
        age: scalar_or(partial.age, UNABLE_TO_EXTRACT),
        diagnosis: list_or(partial.diagnosis, UNABLE_TO_EXTRACT),
        medications: partial
            .medications
            .into_iter()
            .filter_map(normalize_medication)
            .collect(),
        medical_history: list_or(partial.medical_history, UNABLE_TO_EXTRACT),
        allergies: list_or(partial.allergies, UNABLE_TO_EXTRACT),
        interactions: partial
            .interactions
            .into_iter()
            .filter_map(normalize_interaction)
            .collect(),
        recommendations: list_or(partial.recommendations, REVIEW_MANUALLY),
    }
}

/// `None` when the entry carries nothing at all.
fn normalize_medication(med: PartialMedication) -> Option<Medication> {
    let fields = [&med.name, &med.dosage, &med.frequency, &med.duration, &med.instructions];
    if fields.into_iter().all(is_blank) {
        return None;
    }
    Some(Medication {
        name: scalar_or(med.name, NOT_SPECIFIED),
        dosage: scalar_or(med.dosage, NOT_SPECIFIED),
        frequency: scalar_or(med.frequency, NOT_SPECIFIED),
        duration: scalar_or(med.duration, NOT_SPECIFIED),
        instructions: non_blank(med.instructions).unwrap_or_default(),
    })
}

/// An interaction without a description says nothing and is dropped.
fn normalize_interaction(interaction: PartialInteraction) -> Option<Interaction> {
    let description = non_blank(interaction.description)?;
    let severity = interaction
        .severity
        .as_deref()
        .map(InteractionSeverity::parse_lenient)
        .unwrap_or(InteractionSeverity::Medium);
    Some(Interaction {
        severity,
        description,
        drugs: interaction
            .drugs
            .into_iter()
            .filter(|d| !d.trim().is_empty())
            .collect(),
    })
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn scalar_or(value: Option<String>, sentinel: &str) -> String {
    non_blank(value).unwrap_or_else(|| sentinel.to_string())
}

fn list_or(values: Vec<String>, sentinel: &str) -> Vec<String> {
    let kept: Vec<String> = values.into_iter().filter(|v| !v.trim().is_empty()).collect();
    if kept.is_empty() {
        vec![sentinel.to_string()]
    } else {
        kept
    }
}

impl From<PrescriptionRecord> for PartialRecord {
    fn from(record: PrescriptionRecord) -> Self {
        Self {
            patient_name: Some(record.patient_name),
            age: Some(record.age),
            diagnosis: record.diagnosis,
            medications: record
                .medications
                .into_iter()
                .map(|m| PartialMedication {
                    name: Some(m.name),
                    dosage: Some(m.dosage),
                    frequency: Some(m.frequency),
                    duration: Some(m.duration),
                    instructions: Some(m.instructions),
                })
                .collect(),
            medical_history: record.medical_history,
            allergies: record.allergies,
            interactions: record
                .interactions
                .into_iter()
                .map(|i| PartialInteraction {
                    severity: Some(i.severity.as_str().to_string()),
                    description: Some(i.description),
                    drugs: i.drugs,
                })
                .collect(),
            recommendations: record.recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messy() -> PartialRecord {
        PartialRecord {
            patient_name: Some("  ".into()),
            age: None,
            diagnosis: vec!["".into(), "Hypertension".into()],
            medications: vec![
                PartialMedication::default(),
                PartialMedication {
                    name: Some("Lisinopril".into()),
                    dosage: Some("10mg".into()),
                    ..Default::default()
                },
            ],
            medical_history: vec![],
            allergies: vec!["   ".into()],
            interactions: vec![
                PartialInteraction {
                    severity: Some("Severe".into()),
                    description: Some("Hyperkalemia risk".into()),
                    drugs: vec!["Lisinopril".into(), "".into(), "Spironolactone".into()],
                },
                PartialInteraction {
                    severity: Some("low".into()),
                    description: None,
                    drugs: vec![],
                },
            ],
            recommendations: vec![],
        }
    }

    #[test]
    fn empty_partial_gets_all_sentinels() {
        let record = normalize(PartialRecord::default());
        assert_eq!(record.patient_name, UNABLE_TO_EXTRACT);
        assert_eq!(record.age, UNABLE_TO_EXTRACT);
        assert_eq!(record.diagnosis, vec![UNABLE_TO_EXTRACT]);
        assert!(record.medications.is_empty());
        assert_eq!(record.medical_history, vec![UNABLE_TO_EXTRACT]);
        assert_eq!(record.allergies, vec![UNABLE_TO_EXTRACT]);
        assert!(record.interactions.is_empty());
        assert_eq!(record.recommendations, vec![REVIEW_MANUALLY]);
    }

    #[test]
    fn blank_values_replaced_and_real_values_kept() {
        let record = normalize(messy());
        assert_eq!(record.patient_name, UNABLE_TO_EXTRACT);
        assert_eq!(record.diagnosis, vec!["Hypertension"]);
        assert_eq!(record.allergies, vec![UNABLE_TO_EXTRACT]);
    }

    #[test]
    fn medications_filled_and_empty_entries_dropped() {
        let record = normalize(messy());
        assert_eq!(record.medications.len(), 1);
        let med = &record.medications[0];
        assert_eq!(med.name, "Lisinopril");
        assert_eq!(med.dosage, "10mg");
        assert_eq!(med.frequency, NOT_SPECIFIED);
        assert_eq!(med.duration, NOT_SPECIFIED);
        assert_eq!(med.instructions, "");
    }

    #[test]
    fn interactions_severity_mapped_and_undescribed_dropped() {
        let record = normalize(messy());
        assert_eq!(record.interactions.len(), 1);
        assert_eq!(record.interactions[0].severity, InteractionSeverity::High);
        assert_eq!(record.interactions[0].drugs, vec!["Lisinopril", "Spironolactone"]);
        assert!(record.has_high_severity_interaction());
    }

    #[test]
    fn normalize_is_idempotent() {
        for partial in [PartialRecord::default(), messy()] {
            let once = normalize(partial);
            let twice = normalize(PartialRecord::from(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn non_blank_values_pass_verbatim() {
        let partial = PartialRecord {
            patient_name: Some(" John Doe ".into()),
            ..Default::default()
        };
        assert_eq!(normalize(partial).patient_name, " John Doe ");
    }
}
