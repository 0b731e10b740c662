//! Accumulated patient signalment and clinical findings for one chat session.
//!
//! Fields arrive in fragments (regex extraction, LLM-reported data) across
//! many messages. Merging is idempotent: re-sending the same fact never
//! duplicates a symptom or a collected-field marker. Completeness is derived
//! from the collected-field markers, never stored independently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields that must be collected before the diagnosis phase can begin.
pub const REQUIRED_FIELDS: [&str; 4] = ["age", "sex", "race", "symptoms"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientData {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub symptom_duration: Option<String>,
    #[serde(default)]
    pub symptom_progression: Option<String>,
    #[serde(default)]
    pub neurological_exam: BTreeMap<String, Value>,
    #[serde(default)]
    pub other_exams: BTreeMap<String, Value>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub current_medications: Vec<String>,
    #[serde(default)]
    pub collected_fields: Vec<String>,
    #[serde(default)]
    pub is_complete: bool,
    /// Transient merge timestamp, not part of the persisted shape.
    #[serde(skip)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PatientData {
    /// Merge signalment values. Absent or empty arguments leave the
    /// corresponding field untouched; present values overwrite.
    pub fn set_basic_info(
        &mut self,
        age: Option<&str>,
        sex: Option<&str>,
        race: Option<&str>,
        weight: Option<&str>,
    ) {
        if let Some(age) = non_empty(age) {
            self.age = Some(age.to_string());
            self.mark_collected("age");
        }
        if let Some(sex) = non_empty(sex) {
            self.sex = Some(sex.to_string());
            self.mark_collected("sex");
        }
        if let Some(race) = non_empty(race) {
            self.race = Some(race.to_string());
            self.mark_collected("race");
        }
        if let Some(weight) = non_empty(weight) {
            self.weight = Some(weight.to_string());
            self.mark_collected("weight");
        }
    }

    /// Append a symptom if not already recorded. Empty input is ignored.
    pub fn add_symptom(&mut self, symptom: &str) {
        let symptom = symptom.trim();
        if symptom.is_empty() {
            return;
        }
        if !self.symptoms.iter().any(|s| s == symptom) {
            self.symptoms.push(symptom.to_string());
        }
        self.mark_collected("symptoms");
    }

    /// Record an examination finding. Exam types starting with "neuro" land
    /// in the neurological map, everything else in the general one.
    pub fn add_exam_result(&mut self, exam_type: &str, result: Value) {
        let exam_type = exam_type.trim();
        if exam_type.is_empty() {
            return;
        }
        if exam_type.to_lowercase().starts_with("neuro") {
            self.neurological_exam.insert(exam_type.to_string(), result);
        } else {
            self.other_exams.insert(exam_type.to_string(), result);
        }
        self.mark_collected("exams");
    }

    pub fn add_medical_history(&mut self, item: &str) {
        let item = item.trim();
        if item.is_empty() {
            return;
        }
        if !self.medical_history.iter().any(|h| h == item) {
            self.medical_history.push(item.to_string());
        }
        self.mark_collected("medical_history");
    }

    pub fn add_medication(&mut self, medication: &str) {
        let medication = medication.trim();
        if medication.is_empty() {
            return;
        }
        if !self.current_medications.iter().any(|m| m == medication) {
            self.current_medications.push(medication.to_string());
        }
        self.mark_collected("medications");
    }

    /// Set the reported course of the symptoms. These refine context for the
    /// assistant but do not count toward completeness.
    pub fn set_symptom_details(&mut self, duration: Option<&str>, progression: Option<&str>) {
        let mut touched = false;
        if let Some(duration) = non_empty(duration) {
            self.symptom_duration = Some(duration.to_string());
            touched = true;
        }
        if let Some(progression) = non_empty(progression) {
            self.symptom_progression = Some(progression.to_string());
            touched = true;
        }
        if touched {
            self.last_updated = Some(Utc::now());
        }
    }

    /// Required fields not yet collected, in canonical order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.collected_fields.iter().any(|c| c == f))
            .collect()
    }

    pub fn has_any_data(&self) -> bool {
        !self.collected_fields.is_empty()
    }

    fn mark_collected(&mut self, field: &str) {
        if !self.collected_fields.iter().any(|c| c == field) {
            self.collected_fields.push(field.to_string());
        }
        self.last_updated = Some(Utc::now());
        self.recompute_completeness();
    }

    fn recompute_completeness(&mut self) {
        self.is_complete = REQUIRED_FIELDS
            .iter()
            .all(|f| self.collected_fields.iter().any(|c| c == f));
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marking_all_required_fields_completes_profile() {
        let mut data = PatientData::default();
        assert!(!data.is_complete);

        data.add_symptom("tremblements");
        data.set_basic_info(Some("8 ans"), None, None, None);
        data.set_basic_info(None, None, Some("Labrador"), None);
        assert!(!data.is_complete);
        assert_eq!(data.missing_fields(), vec!["sex"]);

        data.set_basic_info(None, Some("mâle entier"), None, None);
        assert!(data.is_complete);
        assert!(data.missing_fields().is_empty());
    }

    #[test]
    fn weight_does_not_count_toward_completeness() {
        let mut data = PatientData::default();
        data.set_basic_info(None, None, None, Some("30 kg"));
        assert!(!data.is_complete);
        assert_eq!(data.missing_fields(), vec!["age", "sex", "race", "symptoms"]);
    }

    #[test]
    fn repeated_merges_are_idempotent() {
        let mut data = PatientData::default();
        data.add_symptom("ataxie");
        data.add_symptom("ataxie");
        data.set_basic_info(Some("3 ans"), None, None, None);
        data.set_basic_info(Some("3 ans"), None, None, None);

        assert_eq!(data.symptoms, vec!["ataxie"]);
        assert_eq!(
            data.collected_fields.iter().filter(|f| *f == "symptoms").count(),
            1
        );
        assert_eq!(
            data.collected_fields.iter().filter(|f| *f == "age").count(),
            1
        );
    }

    #[test]
    fn completeness_never_reverts() {
        let mut data = PatientData::default();
        data.set_basic_info(Some("5 ans"), Some("femelle entière"), Some("Beagle"), None);
        data.add_symptom("convulsions");
        assert!(data.is_complete);

        data.set_basic_info(Some("6 ans"), None, None, Some("12 kg"));
        data.add_symptom("tremblements");
        data.add_medication("phénobarbital");
        assert!(data.is_complete);
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut data = PatientData::default();
        data.set_basic_info(Some(""), Some("  "), None, None);
        data.add_symptom("");
        data.add_symptom("   ");
        data.add_exam_result("", json!("réflexes normaux"));

        assert!(data.collected_fields.is_empty());
        assert!(data.symptoms.is_empty());
        assert!(data.last_updated.is_none());
    }

    #[test]
    fn exam_results_route_by_type() {
        let mut data = PatientData::default();
        data.add_exam_result("neurological_exam", json!("réflexes diminués"));
        data.add_exam_result("Neuro - nerfs crâniens", json!("normaux"));
        data.add_exam_result("radiographie", json!("sans anomalie"));

        assert_eq!(data.neurological_exam.len(), 2);
        assert_eq!(data.other_exams.len(), 1);
        assert_eq!(
            data.collected_fields.iter().filter(|f| *f == "exams").count(),
            1
        );
    }

    #[test]
    fn symptom_details_do_not_mark_fields() {
        let mut data = PatientData::default();
        data.set_symptom_details(Some("depuis 3 jours"), Some("en aggravation"));
        assert_eq!(data.symptom_duration.as_deref(), Some("depuis 3 jours"));
        assert_eq!(data.symptom_progression.as_deref(), Some("en aggravation"));
        assert!(data.collected_fields.is_empty());
        assert!(data.last_updated.is_some());
    }

    #[test]
    fn round_trip_preserves_everything_except_last_updated() {
        let mut data = PatientData::default();
        data.set_basic_info(Some("8 ans"), Some("mâle castré"), Some("Labrador"), Some("32 kg"));
        data.add_symptom("convulsions");
        data.add_exam_result("neurological_exam", json!({"réflexes": "diminués"}));
        data.add_medical_history("otite en 2024");
        data.add_medication("phénobarbital");

        let json = serde_json::to_string(&data).unwrap();
        assert!(!json.contains("last_updated"));

        let restored: PatientData = serde_json::from_str(&json).unwrap();
        let mut expected = data.clone();
        expected.last_updated = None;
        assert_eq!(restored, expected);
        assert!(restored.is_complete);
    }

    #[test]
    fn decodes_partial_legacy_payloads() {
        let restored: PatientData =
            serde_json::from_str(r#"{"age": "2 ans", "symptoms": ["ataxie"]}"#).unwrap();
        assert_eq!(restored.age.as_deref(), Some("2 ans"));
        assert_eq!(restored.symptoms, vec!["ataxie"]);
        assert!(!restored.is_complete);
        assert!(restored.collected_fields.is_empty());
    }
}
