use std::sync::LazyLock;

use regex::Regex;

use super::normalize::{normalize, PartialInteraction, PartialMedication, PartialRecord};
use crate::models::{PrescriptionRecord, NONE_DETECTED, NONE_SPECIFIED, NOT_SPECIFIED};

const DEFAULT_FREQUENCY: &str = "As directed";
const DEFAULT_DURATION: &str = "As prescribed";
const DEFAULT_INSTRUCTIONS: &str = "Follow doctor's instructions";

const GENERIC_HISTORY: &str = "Medical history extracted from text";
const GENERIC_INTERACTION: &str = "Standard drug interaction monitoring recommended";
const GENERIC_INTERACTION_DRUGS: &str = "All prescribed medications";
const STANDARD_RECOMMENDATIONS: &[&str] = &[
    "Follow prescribed dosage instructions",
    "Monitor for any adverse reactions",
    "Consult healthcare provider for questions",
    "Keep follow-up appointments",
];

/// Whether a rule keeps its first match or every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    First,
    All,
}

/// A compiled pattern and the capture group that holds the value.
struct ExtractionRule {
    regex: Regex,
    group: usize,
    scope: Scope,
}

impl ExtractionRule {
    /// Total: a non-matching rule yields `None`, never an error.
    fn apply(&self, text: &str) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .regex
            .captures_iter(text)
            .filter_map(|c| c.get(self.group))
            .map(|m| clean_segment(m.as_str()))
            .filter(|v| !v.is_empty())
            .take(if self.scope == Scope::First { 1 } else { usize::MAX })
            .collect();
        (!values.is_empty()).then_some(values)
    }
}

fn rule(pattern: &str, group: usize, scope: Scope) -> ExtractionRule {
    ExtractionRule {
        regex: Regex::new(pattern).unwrap(),
        group,
        scope,
    }
}

/// Try each rule in order; the first one that matches wins.
fn first_matching(rules: &[ExtractionRule], text: &str) -> Option<Vec<String>> {
    rules.iter().find_map(|r| r.apply(text))
}

static NAME_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)Patient(?:\s+Name)?[:\s]+([^,\n]+)", 1, Scope::First),
        rule(r"(?i)Name[:\s]+([^,\n]+)", 1, Scope::First),
    ]
});

static AGE_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![rule(r"(?i)(\d+)\s*(?:years?\s*old|y\.?o\.?)", 1, Scope::First)]
});

/// Labeled diagnoses first; bullet lines only when there are none.
static DIAGNOSIS_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)Diagnosis[:\s]+([^.\n]+)", 1, Scope::All),
        rule(r"(?m)^[ \t]*-\s*([^.\n]+)", 1, Scope::All),
    ]
});

static ALLERGY_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![rule(r"(?i)Allerg(?:y|ies)[:\s]+([^.\n]+)", 1, Scope::All)]
});

/// Optional ordinal, a word, then a `<number>mg` dosage.
static MEDICATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+\.\s*)?\b([A-Za-z]+)\s+(\d+(?:\.\d+)?\s?mg)\b").unwrap()
});

/// Another labeled section starting inside a captured value. Single-line
/// prescriptions run their sections together, so captures are cut here.
static NEXT_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:medications?|allerg(?:y|ies)|diagnosis|medical\s+history|patient|age|name)\s*:",
    )
    .unwrap()
});

/// Cut at the next section label, strip leading bullets and colons, trim.
fn clean_segment(raw: &str) -> String {
    let cut = match NEXT_SECTION.find(raw) {
        Some(m) if m.start() > 0 => &raw[..m.start()],
        _ => raw,
    };
    cut.trim_start_matches(|c: char| c == '-' || c == ':' || c.is_whitespace())
        .trim_end_matches(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .to_string()
}

/// Pattern-based extraction straight from prescription text. The last
/// tier of the cascade: it never fails and never leaves a field absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn extract(&self, text: &str) -> PrescriptionRecord {
        let patient_name = first_matching(&NAME_RULES, text).and_then(|v| v.into_iter().next());
        let age = first_matching(&AGE_RULES, text)
            .and_then(|v| v.into_iter().next())
            .map(|years| format!("{years} years old"))
            .unwrap_or_else(|| NOT_SPECIFIED.to_string());
        let diagnosis = first_matching(&DIAGNOSIS_RULES, text)
            .unwrap_or_else(|| vec![NONE_DETECTED.to_string()]);
        let allergies = first_matching(&ALLERGY_RULES, text)
            .unwrap_or_else(|| vec![NONE_SPECIFIED.to_string()]);

        let medications = MEDICATION_PATTERN
            .captures_iter(text)
            .filter_map(|c| {
                let name = c.get(2)?.as_str().trim();
                let dosage: String = c.get(3)?.as_str().split_whitespace().collect();
                Some(PartialMedication {
                    name: Some(name.to_string()),
                    dosage: Some(dosage),
                    frequency: Some(DEFAULT_FREQUENCY.to_string()),
                    duration: Some(DEFAULT_DURATION.to_string()),
                    instructions: Some(DEFAULT_INSTRUCTIONS.to_string()),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            name_found = patient_name.is_some(),
            medications = medications.len(),
            diagnoses = diagnosis.len(),
            "Heuristic extraction complete"
        );

        normalize(PartialRecord {
            patient_name,
            age: Some(age),
            diagnosis,
            medications,
            medical_history: vec![GENERIC_HISTORY.to_string()],
            allergies,
            interactions: vec![PartialInteraction {
                severity: Some("medium".to_string()),
                description: Some(GENERIC_INTERACTION.to_string()),
                drugs: vec![GENERIC_INTERACTION_DRUGS.to_string()],
            }],
            recommendations: STANDARD_RECOMMENDATIONS
                .iter()
                .map(|r| r.to_string())
                .collect(),
        })
    }
}

/// Convenience wrapper around [`HeuristicExtractor::extract`].
pub fn extract_heuristic(text: &str) -> PrescriptionRecord {
    HeuristicExtractor.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InteractionSeverity, UNABLE_TO_EXTRACT};

    const SCENARIO: &str = "Patient: John Doe, 45 years old Diagnosis: Bacterial infection \
                            Medications: 1. Amoxicillin 500mg three times daily";

    #[test]
    fn single_line_scenario() {
        let record = extract_heuristic(SCENARIO);
        assert_eq!(record.patient_name, "John Doe");
        assert_eq!(record.age, "45 years old");
        assert_eq!(record.diagnosis, vec!["Bacterial infection"]);
        assert_eq!(record.medications.len(), 1);
        assert_eq!(record.medications[0].name, "Amoxicillin");
        assert_eq!(record.medications[0].dosage, "500mg");
        assert_eq!(record.medications[0].frequency, DEFAULT_FREQUENCY);
        assert_eq!(record.medications[0].duration, DEFAULT_DURATION);
        assert_eq!(record.medications[0].instructions, DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn empty_text_yields_placeholders_only() {
        let record = extract_heuristic("");
        assert_eq!(record.patient_name, UNABLE_TO_EXTRACT);
        assert_eq!(record.age, NOT_SPECIFIED);
        assert_eq!(record.diagnosis, vec![NONE_DETECTED]);
        assert!(record.medications.is_empty());
        assert_eq!(record.medical_history, vec![GENERIC_HISTORY]);
        assert_eq!(record.allergies, vec![NONE_SPECIFIED]);
        assert_eq!(record.interactions.len(), 1);
        assert_eq!(record.interactions[0].severity, InteractionSeverity::Medium);
        assert_eq!(record.recommendations.len(), 4);
    }

    #[test]
    fn multi_line_prescription() {
        let text = "Name: Maria Lopez\nAge: 8 y.o.\nAllergies: Penicillin\n\
                    Diagnosis: Asthma\nDiagnosis: Seasonal rhinitis\n\
                    1. Salbutamol 100mg inhaled\n2. Cetirizine 5mg nightly\n";
        let record = extract_heuristic(text);
        assert_eq!(record.patient_name, "Maria Lopez");
        assert_eq!(record.age, "8 years old");
        assert_eq!(record.diagnosis, vec!["Asthma", "Seasonal rhinitis"]);
        assert_eq!(record.allergies, vec!["Penicillin"]);
        assert_eq!(record.medication_names(), vec!["Salbutamol", "Cetirizine"]);
        assert_eq!(record.medications[1].dosage, "5mg");
    }

    #[test]
    fn bullet_lines_used_when_no_diagnosis_label() {
        let text = "Patient: Sam\n- Type 2 diabetes\n- Hypertension. Controlled\n";
        let record = extract_heuristic(text);
        assert_eq!(record.diagnosis, vec!["Type 2 diabetes", "Hypertension"]);
    }

    #[test]
    fn decimal_and_spaced_dosages() {
        let record = extract_heuristic("Levothyroxine 0.5 mg daily, Digoxin 62.5mg");
        assert_eq!(record.medications[0].dosage, "0.5mg");
        assert_eq!(record.medications[1].name, "Digoxin");
        assert_eq!(record.medications[1].dosage, "62.5mg");
    }

    #[test]
    fn patient_name_label_not_captured() {
        let record = extract_heuristic("Patient Name: John Doe\nAge: 45 years old");
        assert_eq!(record.patient_name, "John Doe");

        let record = extract_heuristic("PATIENT NAME John Doe, 45 years old");
        assert_eq!(record.patient_name, "John Doe");
    }

    #[test]
    fn arbitrary_input_is_total() {
        for text in ["{}", "mg mg mg", "Patient:", "\u{0}\u{1}", "Diagnosis: ."] {
            let record = extract_heuristic(text);
            assert!(!record.patient_name.is_empty());
            assert!(!record.age.is_empty());
            assert!(!record.diagnosis.is_empty());
            assert!(!record.allergies.is_empty());
            assert!(!record.recommendations.is_empty());
        }
    }
}
