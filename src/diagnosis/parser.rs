use serde_json::Value;

use crate::models::VeterinaryAssessment;

/// Slice the JSON payload out of an assistant reply.
///
/// Prefers a fenced ```json block; otherwise falls back to the outermost
/// brace pair. Returns None when neither is present.
pub fn extract_json_block(text: &str) -> Option<&str> {
    if let Some(fence_start) = text.find("```json") {
        let content_start = fence_start + 7;
        if let Some(fence_len) = text[content_start..].find("```") {
            return Some(text[content_start..content_start + fence_len].trim());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(text[start..=end].trim())
}

/// Decode a structured assessment from a raw reply, if it carries one.
pub fn parse_reply(text: &str) -> Option<VeterinaryAssessment> {
    let block = extract_json_block(text)?;
    let value: Value = serde_json::from_str(block).ok()?;
    VeterinaryAssessment::from_value(&value)
}

/// Interpret a reply: structured when possible, free-text wrapper otherwise.
pub fn interpret_reply(text: &str) -> VeterinaryAssessment {
    parse_reply(text).unwrap_or_else(|| VeterinaryAssessment::from_free_text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CONFIDENCE_MEDIUM;

    #[test]
    fn fenced_block_is_extracted() {
        let reply = "Voici mon évaluation :\n```json\n{\"assessment\": \"Épilepsie probable\"}\n```\nBonne journée.";
        assert_eq!(
            extract_json_block(reply),
            Some("{\"assessment\": \"Épilepsie probable\"}")
        );
    }

    #[test]
    fn bare_object_between_prose_is_extracted() {
        let reply = "Réponse : {\"assessment\": \"Ataxie cérébelleuse\"} — à confirmer.";
        let assessment = parse_reply(reply).unwrap();
        assert_eq!(assessment.assessment, "Ataxie cérébelleuse");
    }

    #[test]
    fn unclosed_fence_falls_back_to_brace_scan() {
        let reply = "```json\n{\"assessment\": \"Suspicion de hernie discale\"}";
        let assessment = parse_reply(reply).unwrap();
        assert_eq!(assessment.assessment, "Suspicion de hernie discale");
    }

    #[test]
    fn text_without_json_yields_none() {
        assert!(extract_json_block("Aucune structure ici.").is_none());
        assert!(parse_reply("Aucune structure ici.").is_none());
    }

    #[test]
    fn invalid_json_yields_none() {
        assert!(parse_reply("{pas du json valide}").is_none());
    }

    #[test]
    fn structured_reply_carries_patient_fragment() {
        let reply = r#"```json
{
  "assessment": "Profil en cours de collecte",
  "status": "processed",
  "question": "Quel âge a votre chien?",
  "patient_data": {"race": "Beagle", "symptoms": ["convulsions"]}
}
```"#;
        let assessment = parse_reply(reply).unwrap();
        assert_eq!(assessment.question, "Quel âge a votre chien?");
        let fragment = assessment.patient_data.unwrap();
        assert_eq!(fragment.race.as_deref(), Some("Beagle"));
        assert_eq!(fragment.symptoms, vec!["convulsions"]);
    }

    #[test]
    fn free_text_reply_becomes_generic_assessment() {
        let assessment = interpret_reply("Je recommande un examen neurologique complet.");
        assert_eq!(
            assessment.assessment,
            "Je recommande un examen neurologique complet."
        );
        assert_eq!(assessment.treatment, "Consultation avec votre vétérinaire");
        assert_eq!(assessment.confidence_level, CONFIDENCE_MEDIUM);
    }
}
