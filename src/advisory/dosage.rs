use serde::Serialize;

use super::AdvisoryError;

/// Patients younger than this get pediatric dosing.
const PEDIATRIC_BELOW_YEARS: u32 = 12;
/// Patients older than this get geriatric dosing.
const GERIATRIC_ABOVE_YEARS: u32 = 65;

const ADULT_MG_PER_KG: f64 = 10.0;
const PEDIATRIC_MG_PER_KG: f64 = 8.0;
const GERIATRIC_MG_PER_KG: f64 = 6.0;

const DEFAULT_FREQUENCY: &str = "twice daily";
/// Doses per day allowed at the recommended dose.
const MAX_DAILY_MULTIPLIER: f64 = 2.0;

pub const PEDIATRIC_WARNING: &str = "Pediatric dosing - monitor closely";
pub const GERIATRIC_WARNING: &str = "Geriatric dosing - reduced dose due to age";

/// Weight-based dose estimate for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DosageRecommendation {
    pub medication: String,
    pub age_years: u32,
    pub weight_kg: f64,
    pub recommended_dose: String,
    pub frequency: String,
    pub max_daily: String,
    pub warnings: Vec<String>,
}

/// Estimate a dose from age and weight: 10 mg/kg for adults, 8 mg/kg under
/// 12 and 6 mg/kg over 65, with a warning for either age band.
pub fn recommend_dosage(
    medication: &str,
    age_years: u32,
    weight_kg: f64,
) -> Result<DosageRecommendation, AdvisoryError> {
    let medication = medication.trim();
    if medication.is_empty() {
        return Err(AdvisoryError::MissingMedication);
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(AdvisoryError::InvalidWeight(weight_kg));
    }

    let (mg_per_kg, warnings) = if age_years < PEDIATRIC_BELOW_YEARS {
        (PEDIATRIC_MG_PER_KG, vec![PEDIATRIC_WARNING.to_string()])
    } else if age_years > GERIATRIC_ABOVE_YEARS {
        (GERIATRIC_MG_PER_KG, vec![GERIATRIC_WARNING.to_string()])
    } else {
        (ADULT_MG_PER_KG, Vec::new())
    };

    let dose = mg_per_kg * weight_kg;
    let max_daily = dose * MAX_DAILY_MULTIPLIER;

    Ok(DosageRecommendation {
        medication: medication.to_string(),
        age_years,
        weight_kg,
        recommended_dose: format!("{dose:.1} mg"),
        frequency: DEFAULT_FREQUENCY.to_string(),
        max_daily: format!("{max_daily:.1} mg"),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adult_dose_is_ten_mg_per_kg() {
        let rec = recommend_dosage("Amoxicillin", 40, 70.0).unwrap();
        assert_eq!(rec.recommended_dose, "700.0 mg");
        assert_eq!(rec.max_daily, "1400.0 mg");
        assert_eq!(rec.frequency, "twice daily");
        assert!(rec.warnings.is_empty());
    }

    #[test]
    fn child_gets_pediatric_rate_and_warning() {
        let rec = recommend_dosage("Paracetamol", 6, 20.5).unwrap();
        assert_eq!(rec.recommended_dose, "164.0 mg");
        assert_eq!(rec.warnings, vec![PEDIATRIC_WARNING]);
    }

    #[test]
    fn elderly_patient_gets_reduced_rate() {
        let rec = recommend_dosage("Metformin", 80, 60.0).unwrap();
        assert_eq!(rec.recommended_dose, "360.0 mg");
        assert_eq!(rec.max_daily, "720.0 mg");
        assert_eq!(rec.warnings, vec![GERIATRIC_WARNING]);
    }

    #[test]
    fn band_edges_are_adult() {
        assert!(recommend_dosage("x", 12, 50.0).unwrap().warnings.is_empty());
        assert!(recommend_dosage("x", 65, 50.0).unwrap().warnings.is_empty());
    }

    #[test]
    fn rejects_missing_name_and_bad_weight() {
        assert_eq!(
            recommend_dosage("  ", 30, 70.0).unwrap_err(),
            AdvisoryError::MissingMedication
        );
        assert!(matches!(
            recommend_dosage("Ibuprofen", 30, 0.0),
            Err(AdvisoryError::InvalidWeight(_))
        ));
        assert!(recommend_dosage("Ibuprofen", 30, f64::NAN).is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(recommend_dosage("A", 30, 1.0).unwrap()).unwrap();
        assert_eq!(json["recommendedDose"], "10.0 mg");
        assert_eq!(json["maxDaily"], "20.0 mg");
    }
}
