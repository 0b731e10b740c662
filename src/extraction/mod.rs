//! Regex-driven extraction of patient facts from French clinician messages.
//!
//! Every message is scanned for signalment (age, sex, breed, weight) and
//! neurological symptoms. The scan is best-effort by design: a field the
//! text does not mention is simply absent from the result, and no input
//! ever makes extraction fail.

pub mod lexicon;

pub use lexicon::Lexicon;

use std::sync::LazyLock;

use regex::Regex;

/// Fields recognized in a single utterance. Absent means "not mentioned",
/// never "cleared".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub age: Option<String>,
    pub sex: Option<String>,
    pub breed: Option<String>,
    pub weight: Option<String>,
    pub symptoms: Vec<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.sex.is_none()
            && self.breed.is_none()
            && self.weight.is_none()
            && self.symptoms.is_empty()
    }
}

#[derive(Clone, Copy)]
enum AgeUnit {
    Years,
    Months,
    Weeks,
}

struct AgePattern {
    regex: Regex,
    unit: AgeUnit,
}

/// Age phrasings in scan order; the first hit wins and its literal unit
/// word decides the unit.
static AGE_PATTERNS: LazyLock<Vec<AgePattern>> = LazyLock::new(|| {
    vec![
        age_pattern(r"(?i)\b(\d+)\s*(?:ans?|années?)\b", AgeUnit::Years),
        age_pattern(r"(?i)\b(\d+)\s*mois\b", AgeUnit::Months),
        age_pattern(r"(?i)\b(\d+)\s*semaines?\b", AgeUnit::Weeks),
        age_pattern(r"(?i)\bâge\s*:?\s*(\d+)\b", AgeUnit::Years),
        age_pattern(r"(?i)\b(?:il|elle)\s+a\s+(\d+)\b", AgeUnit::Years),
    ]
});

/// Sex phrasings from most to least specific. A neuter word anywhere forces
/// the neutered form for its gender.
static SEX_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (pattern(r"(?i)\bm[âa]le\s+castré"), "mâle castré"),
        (pattern(r"(?i)\bfemelle\s+stérilisée"), "femelle stérilisée"),
        (pattern(r"(?i)\bm[âa]le\s+entier"), "mâle entier"),
        (pattern(r"(?i)\bfemelle\s+enti[èe]re"), "femelle entière"),
        (pattern(r"(?i)\bcastré"), "mâle castré"),
        (pattern(r"(?i)\bstérilisé"), "femelle stérilisée"),
        (pattern(r"(?i)\bm[âa]le\b"), "mâle entier"),
        (pattern(r"(?i)\bfemelle\b"), "femelle entière"),
    ]
});

static WEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\bpoids\s*:?\s*(\d+(?:[.,]\d+)?)"),
        pattern(r"(?i)\bpèse\s+(?:environ\s+)?(\d+(?:[.,]\d+)?)"),
        pattern(r"(?i)\b(\d+(?:[.,]\d+)?)\s*kg\b"),
    ]
});

/// Generic breed phrasings, only consulted when no known breed name was
/// found in the text.
static BREED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\brace\s*:?\s*(\w{3,20})"),
        pattern(r"(?i)\bc'est\s+une?\s+(\w{3,20})"),
        pattern(r"(?i)\bchien(?:ne)?\s+(?:de\s+race\s+)?(\w{3,20})"),
    ]
});

fn pattern(regex_str: &str) -> Regex {
    Regex::new(regex_str).expect("Invalid extraction regex pattern")
}

fn age_pattern(regex_str: &str, unit: AgeUnit) -> AgePattern {
    AgePattern {
        regex: pattern(regex_str),
        unit,
    }
}

pub struct ClinicalExtractor {
    lexicon: Lexicon,
}

impl ClinicalExtractor {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Scan one utterance. Pure; never fails; unmentioned fields stay absent.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        // Typographic apostrophes normalize so "c'est" patterns and cue
        // phrases match either keyboard.
        let text = text.replace('\u{2019}', "'");
        let lower = text.to_lowercase();

        ExtractedFields {
            age: extract_age(&text),
            sex: extract_sex(&text),
            breed: self.extract_breed(&text, &lower),
            weight: extract_weight(&text),
            symptoms: self.lexicon.match_symptoms(&lower),
        }
    }

    fn extract_breed(&self, text: &str, lower: &str) -> Option<String> {
        if let Some(known) = self.lexicon.match_breed(lower) {
            return Some(known);
        }
        for regex in BREED_PATTERNS.iter() {
            if let Some(caps) = regex.captures(text) {
                let capture = caps[1].to_lowercase();
                if self.lexicon.is_stopworded(&capture) {
                    continue;
                }
                return Some(title_case(&capture));
            }
        }
        None
    }
}

impl Default for ClinicalExtractor {
    fn default() -> Self {
        Self::new(Lexicon::standard())
    }
}

fn extract_age(text: &str) -> Option<String> {
    for ap in AGE_PATTERNS.iter() {
        if let Some(caps) = ap.regex.captures(text) {
            if let Ok(n) = caps[1].parse::<u32>() {
                return Some(format_age(n, ap.unit));
            }
        }
    }
    None
}

fn format_age(n: u32, unit: AgeUnit) -> String {
    match unit {
        AgeUnit::Years if n == 1 => "1 an".to_string(),
        AgeUnit::Years => format!("{n} ans"),
        AgeUnit::Months => format!("{n} mois"),
        AgeUnit::Weeks if n == 1 => "1 semaine".to_string(),
        AgeUnit::Weeks => format!("{n} semaines"),
    }
}

fn extract_sex(text: &str) -> Option<String> {
    SEX_PATTERNS
        .iter()
        .find(|(regex, _)| regex.is_match(text))
        .map(|(_, label)| label.to_string())
}

fn extract_weight(text: &str) -> Option<String> {
    for regex in WEIGHT_PATTERNS.iter() {
        if let Some(caps) = regex.captures(text) {
            return Some(format!("{} kg", &caps[1]));
        }
    }
    None
}

/// Uppercase the first letter of each word, lowercase the rest. Hyphenated
/// names capitalize each part.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
                at_word_start = false;
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> ExtractedFields {
        ClinicalExtractor::default().extract(text)
    }

    // =================================================================
    // AGE
    // =================================================================

    #[test]
    fn age_in_years() {
        assert_eq!(extract("Rex a 8 ans").age.as_deref(), Some("8 ans"));
    }

    #[test]
    fn age_singular_year_normalizes() {
        assert_eq!(extract("il a 1 an").age.as_deref(), Some("1 an"));
    }

    #[test]
    fn age_in_months() {
        assert_eq!(extract("un chiot de 3 mois").age.as_deref(), Some("3 mois"));
    }

    #[test]
    fn age_in_weeks() {
        assert_eq!(extract("âgé de 2 semaines seulement").age.as_deref(), Some("2 semaines"));
    }

    #[test]
    fn age_from_label() {
        assert_eq!(extract("Âge : 6").age.as_deref(), Some("6 ans"));
    }

    #[test]
    fn bare_il_a_defaults_to_years() {
        assert_eq!(extract("il a 5 et demi").age.as_deref(), Some("5 ans"));
    }

    #[test]
    fn month_unit_wins_over_default() {
        // "il a 4 mois" must not read as 4 years.
        assert_eq!(extract("il a 4 mois").age.as_deref(), Some("4 mois"));
    }

    // =================================================================
    // SEX
    // =================================================================

    #[test]
    fn explicit_neutered_male() {
        assert_eq!(extract("mâle castré de 8 ans").sex.as_deref(), Some("mâle castré"));
    }

    #[test]
    fn castre_alone_implies_neutered_male() {
        assert_eq!(extract("il est castré").sex.as_deref(), Some("mâle castré"));
        assert_eq!(extract("chienne castrée").sex.as_deref(), Some("mâle castré"));
    }

    #[test]
    fn sterilisee_implies_spayed_female() {
        assert_eq!(extract("elle est stérilisée").sex.as_deref(), Some("femelle stérilisée"));
    }

    #[test]
    fn bare_gender_words_normalize_to_intact() {
        assert_eq!(extract("un mâle de 3 ans").sex.as_deref(), Some("mâle entier"));
        assert_eq!(extract("une femelle de 3 ans").sex.as_deref(), Some("femelle entière"));
    }

    #[test]
    fn unaccented_male_is_recognized() {
        assert_eq!(extract("un male adulte").sex.as_deref(), Some("mâle entier"));
    }

    // =================================================================
    // BREED
    // =================================================================

    #[test]
    fn known_breed_returns_canonical_form() {
        let fields = extract("C'est un berger belge malinois de 4 ans");
        assert_eq!(fields.breed.as_deref(), Some("Berger Belge Malinois"));
    }

    #[test]
    fn known_list_wins_over_generic_patterns() {
        // "race :" would capture "berger" alone; the list scan runs first.
        let fields = extract("race : berger allemand");
        assert_eq!(fields.breed.as_deref(), Some("Berger Allemand"));
    }

    #[test]
    fn generic_race_label() {
        assert_eq!(extract("race : labrador").breed.as_deref(), Some("Labrador"));
    }

    #[test]
    fn generic_cest_un() {
        assert_eq!(extract("c'est un labrador").breed.as_deref(), Some("Labrador"));
    }

    #[test]
    fn curly_apostrophe_is_normalized() {
        assert_eq!(extract("c\u{2019}est un labrador").breed.as_deref(), Some("Labrador"));
    }

    #[test]
    fn stoplist_words_are_rejected() {
        assert!(extract("c'est un chien").breed.is_none());
        assert!(extract("race : trouble").breed.is_none());
        assert!(extract("c'est un cas difficile").breed.is_none());
    }

    #[test]
    fn rejected_capture_falls_through_to_next_pattern() {
        // "c'est un animal" is stopworded but "chien beauceron" still hits
        // the third pattern.
        let fields = extract("c'est un animal calme, un chien beauceron");
        assert_eq!(fields.breed.as_deref(), Some("Beauceron"));
    }

    // =================================================================
    // SYMPTOMS
    // =================================================================

    #[test]
    fn verb_forms_map_to_categories() {
        assert_eq!(extract("il tremble énormément").symptoms, vec!["tremblements"]);
    }

    #[test]
    fn multiple_categories_in_taxonomy_order() {
        let fields = extract("démarche ataxique après une crise, et il tremble");
        assert_eq!(fields.symptoms, vec!["convulsions", "tremblements", "ataxie"]);
    }

    #[test]
    fn posture_phrases_are_detected() {
        assert_eq!(extract("tête penchée à droite").symptoms, vec!["troubles posturaux"]);
    }

    // =================================================================
    // WEIGHT
    // =================================================================

    #[test]
    fn weight_from_label() {
        assert_eq!(extract("poids : 30").weight.as_deref(), Some("30 kg"));
    }

    #[test]
    fn weight_from_pese_keeps_decimal_notation() {
        assert_eq!(extract("il pèse 32,5 kilos").weight.as_deref(), Some("32,5 kg"));
    }

    #[test]
    fn bare_kg_value() {
        assert_eq!(extract("un boxer de 28.4 kg").weight.as_deref(), Some("28.4 kg"));
    }

    // =================================================================
    // WHOLE-UTTERANCE BEHAVIOR
    // =================================================================

    #[test]
    fn neutral_text_yields_empty_result() {
        let fields = extract("Bonjour, comment allez-vous aujourd'hui?");
        assert!(fields.is_empty(), "expected empty, got {fields:?}");
    }

    #[test]
    fn empty_and_whitespace_input_never_fail() {
        assert!(extract("").is_empty());
        assert!(extract("   \n\t  ").is_empty());
    }

    #[test]
    fn full_signalment_in_one_sentence() {
        let fields =
            extract("Mon chien a 8 ans, c'est un Labrador mâle, il tremble énormément.");
        assert_eq!(fields.age.as_deref(), Some("8 ans"));
        assert_eq!(fields.breed.as_deref(), Some("Labrador"));
        assert_eq!(fields.sex.as_deref(), Some("mâle entier"));
        assert_eq!(fields.symptoms, vec!["tremblements"]);
    }

    #[test]
    fn extraction_is_pure() {
        let extractor = ClinicalExtractor::default();
        let a = extractor.extract("femelle stérilisée, 4 ans, ataxie");
        let b = extractor.extract("femelle stérilisée, 4 ans, ataxie");
        assert_eq!(a, b);
    }
}
