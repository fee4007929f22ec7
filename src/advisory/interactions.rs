use crate::models::{Interaction, InteractionSeverity, PrescriptionRecord};

/// A drug pair with a documented interaction.
struct KnownInteraction {
    drug_a: &'static str,
    drug_b: &'static str,
    severity: InteractionSeverity,
    description: &'static str,
}

const KNOWN_INTERACTIONS: &[KnownInteraction] = &[
    KnownInteraction {
        drug_a: "warfarin",
        drug_b: "aspirin",
        severity: InteractionSeverity::High,
        description: "Increased risk of bleeding when taken together",
    },
    KnownInteraction {
        drug_a: "metformin",
        drug_b: "alcohol",
        severity: InteractionSeverity::Medium,
        description: "May increase risk of lactic acidosis",
    },
];

impl KnownInteraction {
    /// Substring match, so "Warfarin sodium 5mg" counts as warfarin.
    fn involves(&self, drug: &str) -> bool {
        let drug = drug.to_lowercase();
        drug.contains(self.drug_a) || drug.contains(self.drug_b)
    }

    fn to_interaction(&self) -> Interaction {
        Interaction {
            severity: self.severity,
            description: self.description.to_string(),
            drugs: vec![self.drug_a.to_string(), self.drug_b.to_string()],
        }
    }
}

/// Report every known pair that any entered drug belongs to. Blank
/// entries are ignored. Each pair appears at most once, in table order.
pub fn check_interactions<S: AsRef<str>>(drugs: &[S]) -> Vec<Interaction> {
    let entered: Vec<&str> = drugs
        .iter()
        .map(|d| d.as_ref().trim())
        .filter(|d| !d.is_empty())
        .collect();

    let found: Vec<Interaction> = KNOWN_INTERACTIONS
        .iter()
        .filter(|known| entered.iter().any(|d| known.involves(d)))
        .map(KnownInteraction::to_interaction)
        .collect();

    tracing::debug!(
        drugs = entered.len(),
        interactions = found.len(),
        "Interaction check complete"
    );
    found
}

/// Run the check over a record's prescribed medications.
pub fn check_record_interactions(record: &PrescriptionRecord) -> Vec<Interaction> {
    check_interactions(&record.medication_names())
}
