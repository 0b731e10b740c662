//! Structured neurological assessment returned by the diagnostic assistant.
//!
//! Replies arrive as JSON embedded in free text and the shape has drifted
//! across prompt revisions, so decoding is deliberately lenient: every field
//! is optional, the legacy `questions` list collapses onto the single
//! `question` field, and unknown keys are ignored.

use serde::Serialize;
use serde_json::Value;

use super::enums::AssessmentStatus;
use super::patient::PatientData;

pub const CONFIDENCE_LOW: &str = "faible";
pub const CONFIDENCE_MEDIUM: &str = "moyenne";
pub const CONFIDENCE_HIGH: &str = "élevée";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Differential {
    pub condition: String,
    pub probability: String,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VeterinaryAssessment {
    pub assessment: String,
    pub status: AssessmentStatus,
    pub localization: Option<String>,
    pub differentials: Vec<Differential>,
    pub diagnostics: Vec<String>,
    pub treatment: String,
    pub prognosis: String,
    /// Patient fields the assistant reported back, merged into the session
    /// aggregate on receipt.
    pub patient_data: Option<PatientFragment>,
    pub question: String,
    pub confidence_level: String,
}

/// Partial patient-data shape the assistant may embed in a reply. All fields
/// optional; only present ones are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientFragment {
    pub age: Option<String>,
    pub sex: Option<String>,
    pub race: Option<String>,
    pub weight: Option<String>,
    pub symptoms: Vec<String>,
    pub symptom_duration: Option<String>,
    pub symptom_progression: Option<String>,
    pub medical_history: Vec<String>,
    pub current_medications: Vec<String>,
}

impl VeterinaryAssessment {
    /// Decode from an already-parsed JSON value. Returns None unless the
    /// value is an object; everything inside the object is best-effort.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let status = obj
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<AssessmentStatus>().ok())
            .unwrap_or(AssessmentStatus::Processed);

        let question = string_at(obj, "question").or_else(|| first_question(obj)).unwrap_or_default();

        Some(Self {
            assessment: string_at(obj, "assessment").unwrap_or_default(),
            status,
            localization: string_at(obj, "localization"),
            differentials: differentials_at(obj),
            diagnostics: string_list_at(obj, "diagnostics"),
            treatment: string_at(obj, "treatment").unwrap_or_default(),
            prognosis: string_at(obj, "prognosis").unwrap_or_default(),
            patient_data: obj.get("patient_data").and_then(PatientFragment::from_value),
            question,
            confidence_level: string_at(obj, "confidence_level")
                .unwrap_or_else(|| CONFIDENCE_MEDIUM.to_string()),
        })
    }

    /// Wrap a reply that carried no decodable JSON. The raw text becomes the
    /// assessment and the clinician is asked for more detail.
    pub fn from_free_text(text: &str) -> Self {
        Self {
            assessment: text.to_string(),
            status: AssessmentStatus::Processed,
            localization: None,
            differentials: Vec::new(),
            diagnostics: Vec::new(),
            treatment: "Consultation avec votre vétérinaire".to_string(),
            prognosis: "Nécessite examen clinique".to_string(),
            patient_data: None,
            question: "Pouvez-vous fournir plus de détails sur les symptômes?".to_string(),
            confidence_level: CONFIDENCE_MEDIUM.to_string(),
        }
    }

    /// Placeholder produced when the diagnostic service could not be reached
    /// at all. Keeps the conversation alive instead of surfacing a 500.
    pub fn service_failure(reason: &str) -> Self {
        Self {
            assessment: format!("Erreur technique: {reason}"),
            status: AssessmentStatus::Processed,
            localization: None,
            differentials: Vec::new(),
            diagnostics: Vec::new(),
            treatment: "Consultation vétérinaire recommandée".to_string(),
            prognosis: "Indéterminé".to_string(),
            patient_data: None,
            question: "Veuillez reformuler votre question".to_string(),
            confidence_level: CONFIDENCE_LOW.to_string(),
        }
    }

    pub fn question_opt(&self) -> Option<String> {
        if self.question.is_empty() {
            None
        } else {
            Some(self.question.clone())
        }
    }
}

impl PatientFragment {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            age: string_at(obj, "age"),
            sex: string_at(obj, "sex"),
            race: string_at(obj, "race"),
            weight: string_at(obj, "weight"),
            symptoms: string_list_at(obj, "symptoms"),
            symptom_duration: string_at(obj, "symptom_duration"),
            symptom_progression: string_at(obj, "symptom_progression"),
            medical_history: string_list_at(obj, "medical_history"),
            current_medications: string_list_at(obj, "current_medications"),
        })
    }
}

fn string_at(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list_at(obj: &serde_json::Map<String, Value>, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = obj.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn differentials_at(obj: &serde_json::Map<String, Value>) -> Vec<Differential> {
    let Some(Value::Array(items)) = obj.get("differentials") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(entry) => {
                let condition = string_at(entry, "condition")?;
                Some(Differential {
                    condition,
                    probability: string_at(entry, "probability").unwrap_or_default(),
                    rationale: string_at(entry, "rationale").unwrap_or_default(),
                })
            }
            // Some replies list differentials as bare strings.
            Value::String(s) if !s.trim().is_empty() => Some(Differential {
                condition: s.trim().to_string(),
                probability: String::new(),
                rationale: String::new(),
            }),
            _ => None,
        })
        .collect()
}

fn first_question(obj: &serde_json::Map<String, Value>) -> Option<String> {
    // Legacy replies carried a `questions` array instead of one `question`.
    let Some(Value::Array(items)) = obj.get("questions") else {
        return None;
    };
    items.iter().find_map(|item| match item {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_reply() {
        let value = json!({
            "assessment": "Suspicion d'épilepsie idiopathique",
            "status": "completed",
            "localization": "prosencéphale",
            "differentials": [
                {"condition": "Épilepsie idiopathique", "probability": "élevée", "rationale": "âge et race typiques"},
                {"condition": "Tumeur intracrânienne", "probability": "faible", "rationale": "âge jeune"}
            ],
            "diagnostics": ["IRM", "Analyse du LCR"],
            "treatment": "Phénobarbital 2.5 mg/kg BID",
            "prognosis": "Bon avec traitement",
            "question": "Les crises sont-elles généralisées?",
            "confidence_level": "élevée"
        });

        let assessment = VeterinaryAssessment::from_value(&value).unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Completed);
        assert_eq!(assessment.differentials.len(), 2);
        assert_eq!(assessment.differentials[0].condition, "Épilepsie idiopathique");
        assert_eq!(assessment.diagnostics, vec!["IRM", "Analyse du LCR"]);
        assert_eq!(assessment.confidence_level, "élevée");
    }

    #[test]
    fn legacy_questions_list_collapses_to_first() {
        let value = json!({
            "assessment": "Profil incomplet",
            "questions": ["Quel âge a le chien?", "Quelle est sa race?"]
        });

        let assessment = VeterinaryAssessment::from_value(&value).unwrap();
        assert_eq!(assessment.question, "Quel âge a le chien?");
    }

    #[test]
    fn single_question_wins_over_legacy_list() {
        let value = json!({
            "question": "Depuis quand?",
            "questions": ["Autre question?"]
        });

        let assessment = VeterinaryAssessment::from_value(&value).unwrap();
        assert_eq!(assessment.question, "Depuis quand?");
    }

    #[test]
    fn unknown_status_falls_back_to_processed() {
        let value = json!({"assessment": "x", "status": "en_cours"});
        let assessment = VeterinaryAssessment::from_value(&value).unwrap();
        assert_eq!(assessment.status, AssessmentStatus::Processed);
    }

    #[test]
    fn string_differentials_are_accepted() {
        let value = json!({"differentials": ["Épilepsie", "Intoxication"]});
        let assessment = VeterinaryAssessment::from_value(&value).unwrap();
        assert_eq!(assessment.differentials.len(), 2);
        assert_eq!(assessment.differentials[1].condition, "Intoxication");
        assert!(assessment.differentials[1].probability.is_empty());
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(VeterinaryAssessment::from_value(&json!("just text")).is_none());
        assert!(VeterinaryAssessment::from_value(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn patient_fragment_decodes_present_fields_only() {
        let value = json!({
            "patient_data": {
                "age": "8 ans",
                "symptoms": ["convulsions", "ataxie"],
                "weight": null
            }
        });

        let assessment = VeterinaryAssessment::from_value(&value).unwrap();
        let fragment = assessment.patient_data.unwrap();
        assert_eq!(fragment.age.as_deref(), Some("8 ans"));
        assert_eq!(fragment.symptoms, vec!["convulsions", "ataxie"]);
        assert!(fragment.weight.is_none());
        assert!(fragment.race.is_none());
    }

    #[test]
    fn service_failure_uses_low_confidence() {
        let assessment = VeterinaryAssessment::service_failure("connexion refusée");
        assert!(assessment.assessment.starts_with("Erreur technique:"));
        assert_eq!(assessment.confidence_level, CONFIDENCE_LOW);
        assert_eq!(assessment.prognosis, "Indéterminé");
    }

    #[test]
    fn free_text_fallback_keeps_raw_reply() {
        let assessment = VeterinaryAssessment::from_free_text("Je recommande un examen IRM.");
        assert_eq!(assessment.assessment, "Je recommande un examen IRM.");
        assert_eq!(assessment.confidence_level, CONFIDENCE_MEDIUM);
    }
}
