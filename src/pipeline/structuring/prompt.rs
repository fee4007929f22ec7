/// Literal JSON shape the models are asked to fill in.
pub const RECORD_JSON_SHAPE: &str = r#"{
  "patientName": "extracted patient name",
  "age": "extracted age",
  "diagnosis": ["list of diagnoses"],
  "medications": [
    {
      "name": "medication name",
      "dosage": "dosage information",
      "frequency": "frequency of administration",
      "duration": "duration of treatment",
      "instructions": "special instructions"
    }
  ],
  "medicalHistory": ["relevant medical history"],
  "allergies": ["known allergies"],
  "interactions": [
    {
      "severity": "high/medium/low",
      "description": "interaction description",
      "drugs": ["drugs involved"]
    }
  ],
  "recommendations": ["clinical recommendations"]
}"#;

/// Build the extraction prompt for one prescription. Both model tiers
/// receive the same prompt.
pub fn build_extraction_prompt(prescription_text: &str) -> String {
    format!(
        "Analyze the following medical prescription and extract structured information. \
         Return a JSON object with the following structure:\n\n\
         {RECORD_JSON_SHAPE}\n\n\
         Prescription text:\n\
         {prescription_text}\n\n\
         Provide only the JSON response without any additional text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_and_shape() {
        let prompt = build_extraction_prompt("Amoxicillin 500mg");
        assert!(prompt.contains("Prescription text:\nAmoxicillin 500mg\n"));
        assert!(prompt.contains("\"medicalHistory\""));
        assert!(prompt.ends_with("Provide only the JSON response without any additional text."));
    }

    #[test]
    fn shape_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(RECORD_JSON_SHAPE).unwrap();
        assert!(value.get("patientName").is_some());
        assert!(value["medications"].is_array());
    }
}
