//! Prescription record – the immutable input to a generation call.
//!
//! Field names follow the JSON payload produced by the prescription API
//! (`prescriptionID`, `patientInfo`, `chiefComplaints`, ...). Sequences that
//! are missing from the payload deserialize as empty, optional text as `None`.

use serde::{Deserialize, Serialize};

/// One prescription, already validated and composition-resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRecord {
    #[serde(rename = "prescriptionID", default)]
    pub id: String,
    #[serde(rename = "prescriptionDate", default)]
    pub date: Option<String>,
    #[serde(rename = "patientInfo")]
    pub patient: PatientSummary,
    #[serde(default)]
    pub findings: Option<Findings>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub medications: Vec<Medication>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub follow_up: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub patient_response: Vec<String>,
    #[serde(default)]
    pub letterhead: Option<Letterhead>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    #[serde(rename = "patientName")]
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub age: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub parity: Option<String>,
    #[serde(rename = "contactNumber", default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Investigation findings. Each list is rendered as its own sub-section and
/// is omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Findings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chief_complaints: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub personal_history: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub family_history: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub examinations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub additional_findings: Vec<String>,
}

impl Findings {
    /// True when every sub-section would be omitted.
    pub fn is_empty(&self) -> bool {
        self.chief_complaints.is_empty()
            && self.personal_history.is_empty()
            && self.family_history.is_empty()
            && self.examinations.is_empty()
            && self.additional_findings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub trade_name: String,
    /// Ingredient names, resolved by the caller before generation.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub composition: Vec<String>,
    #[serde(default)]
    pub dosage: Option<String>,
}

impl Medication {
    /// Ingredient names joined for display: `"A, B, C"`, empty when there
    /// are no ingredients.
    pub fn composition_text(&self) -> String {
        self.composition.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letterhead {
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    pub chamber_name: String,
    #[serde(rename = "chamberAddressLine1", default)]
    pub address_line1: Option<String>,
    #[serde(rename = "chamberAddressLine2", default)]
    pub address_line2: Option<String>,
    #[serde(rename = "chamberAddressLine3", default)]
    pub address_line3: Option<String>,
    #[serde(rename = "chamberPhone", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub fax: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub timings: Option<String>,
}

impl PrescriptionRecord {
    /// Parse a record from its JSON payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// File name a caller should use for the generated document.
pub fn output_file_name(record: &PrescriptionRecord) -> String {
    format!("{}.pdf", record.id)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ages arrive as JSON numbers from older clients and as text from newer
/// ones; both are kept as display text.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|v| match v {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(f) => f.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_join() {
        let mut med = Medication {
            trade_name: "Napa".to_string(),
            composition: vec!["A".into(), "B".into(), "C".into()],
            dosage: None,
        };
        assert_eq!(med.composition_text(), "A, B, C");

        med.composition = vec!["Paracetamol".into()];
        assert_eq!(med.composition_text(), "Paracetamol");

        med.composition.clear();
        assert_eq!(med.composition_text(), "");
    }

    #[test]
    fn parse_api_payload() {
        let json = r#"{
            "prescriptionID": "rx-42",
            "prescriptionDate": "2026-10-19",
            "patientInfo": { "patientName": "Jane Roe", "age": 34, "bloodGroup": "O+" },
            "findings": { "chiefComplaints": ["Fever"], "examinations": null },
            "medications": [ { "tradeName": "Napa", "composition": null, "dosage": "1+0+1" } ],
            "tests": null
        }"#;
        let record = PrescriptionRecord::from_json(json).unwrap();
        assert_eq!(record.id, "rx-42");
        assert_eq!(record.patient.age.as_deref(), Some("34"));
        assert_eq!(record.patient.blood_group.as_deref(), Some("O+"));
        let findings = record.findings.as_ref().unwrap();
        assert_eq!(findings.chief_complaints, vec!["Fever".to_string()]);
        assert!(findings.examinations.is_empty());
        assert!(record.medications[0].composition.is_empty());
        assert!(record.tests.is_empty());
        assert!(record.letterhead.is_none());
    }

    #[test]
    fn file_name_uses_identifier() {
        let record = PrescriptionRecord {
            id: "abc-123".to_string(),
            ..Default::default()
        };
        assert_eq!(output_file_name(&record), "abc-123.pdf");
    }
}
