use serde_json::Value;

use crate::models::PatientData;

/// Human-readable patient summary prepended to outbound messages.
///
/// Returns `None` until at least one field has been collected; the first
/// turns of a conversation go out unmodified.
pub fn build_context_block(data: &PatientData) -> Option<String> {
    if !data.has_any_data() {
        return None;
    }

    let mut lines = vec!["[Contexte patient]".to_string()];

    if let Some(age) = &data.age {
        lines.push(format!("Âge: {age}"));
    }
    if let Some(sex) = &data.sex {
        lines.push(format!("Sexe: {sex}"));
    }
    if let Some(race) = &data.race {
        lines.push(format!("Race: {race}"));
    }
    if let Some(weight) = &data.weight {
        lines.push(format!("Poids: {weight}"));
    }

    if !data.symptoms.is_empty() {
        lines.push(format!("Symptômes: {}", data.symptoms.join(", ")));
    }
    if let Some(duration) = &data.symptom_duration {
        lines.push(format!("Durée des symptômes: {duration}"));
    }
    if let Some(progression) = &data.symptom_progression {
        lines.push(format!("Évolution: {progression}"));
    }

    if !data.neurological_exam.is_empty() {
        lines.push("Examen neurologique:".to_string());
        for (exam, result) in &data.neurological_exam {
            lines.push(format!("- {exam}: {}", value_label(result)));
        }
    }
    if !data.other_exams.is_empty() {
        lines.push("Autres examens:".to_string());
        for (exam, result) in &data.other_exams {
            lines.push(format!("- {exam}: {}", value_label(result)));
        }
    }

    if !data.medical_history.is_empty() {
        lines.push(format!("Antécédents: {}", data.medical_history.join(", ")));
    }
    if !data.current_medications.is_empty() {
        lines.push(format!(
            "Traitements en cours: {}",
            data.current_medications.join(", ")
        ));
    }

    Some(lines.join("\n"))
}

/// Outbound content for one turn: summary block plus the raw message, or the
/// raw message alone when nothing has been collected yet.
pub fn with_context(data: Option<&PatientData>, message: &str) -> String {
    match data.and_then(build_context_block) {
        Some(block) => format!("{block}\n\n{message}"),
        None => message.to_string(),
    }
}

fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
