//! French veterinary vocabulary backing the clinical text extractor: known
//! breed names, the symptom taxonomy, and the breed-capture stoplist.

use crate::models::reference::DOG_BREEDS;

/// A recognizable breed: lowercase needle scanned against the message,
/// canonical display form returned on a hit.
#[derive(Debug, Clone)]
pub struct BreedEntry {
    pub needle: String,
    pub display: String,
}

/// One symptom category: canonical label plus the lowercase cues that map
/// onto it. Cues are substrings, so a stem like "trembl" covers the whole
/// word family.
#[derive(Debug, Clone)]
pub struct SymptomCategory {
    pub label: String,
    pub cues: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    breeds: Vec<BreedEntry>,
    symptom_taxonomy: Vec<SymptomCategory>,
    breed_stoplist: Vec<String>,
}

impl Lexicon {
    /// The production vocabulary. Breeds come from the reference list, with
    /// slash-separated aliases split and the catch-all "Autre" excluded
    /// since it would match ordinary prose.
    pub fn standard() -> Self {
        let mut breeds = Vec::new();
        for name in DOG_BREEDS {
            if name == "Autre" {
                continue;
            }
            for alias in name.split('/') {
                breeds.push(BreedEntry {
                    needle: alias.trim().to_lowercase(),
                    display: name.to_string(),
                });
            }
        }
        // Longest needle first so "berger belge malinois" beats "berger".
        breeds.sort_by(|a, b| b.needle.chars().count().cmp(&a.needle.chars().count()));

        let symptom_taxonomy = [
            ("convulsions", &["convuls", "crise", "épilep", "spasme"][..]),
            ("tremblements", &["trembl"][..]),
            ("paralysie", &["paralys", "paraplég", "tétraplég"][..]),
            ("parésie", &["parésie", "parétique"][..]),
            (
                "ataxie",
                &[
                    "ataxi",
                    "incoordination",
                    "perte d'équilibre",
                    "trouble de l'équilibre",
                    "démarche ébrieuse",
                ][..],
            ),
            ("boiterie", &["boite", "claudication"][..]),
            (
                "troubles neurologiques",
                &[
                    "trouble neurologique",
                    "troubles neurologiques",
                    "signes neurologiques",
                    "atteinte neurologique",
                ][..],
            ),
            ("nystagmus", &["nystagmus", "mouvements oculaires anormaux"][..]),
            (
                "troubles comportementaux",
                &[
                    "trouble du comportement",
                    "troubles du comportement",
                    "changement de comportement",
                    "comportement anormal",
                    "comportement inhabituel",
                    "compulsif",
                    "désorient",
                    "tourne en rond",
                    "agressivité",
                ][..],
            ),
            (
                "troubles posturaux",
                &[
                    "tête penchée",
                    "head tilt",
                    "port de tête",
                    "posture anormale",
                    "trouble postural",
                    "troubles posturaux",
                ][..],
            ),
            (
                "troubles moteurs",
                &[
                    "trouble moteur",
                    "troubles moteurs",
                    "trouble locomoteur",
                    "troubles locomoteurs",
                    "difficulté à marcher",
                    "difficultés à marcher",
                    "ne peut plus marcher",
                    "motricité",
                ][..],
            ),
        ]
        .into_iter()
        .map(|(label, cues)| SymptomCategory {
            label: label.to_string(),
            cues: cues.iter().map(|c| c.to_string()).collect(),
        })
        .collect();

        let breed_stoplist = [
            "chien",
            "animal",
            "patient",
            "examen",
            "symptômes",
            "problème",
            "trouble",
            "cas",
            "histoire",
            "situation",
            "consultation",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            breeds,
            symptom_taxonomy,
            breed_stoplist,
        }
    }

    /// Scan lowercase text for a known breed. Longest name wins; the
    /// canonical display form is returned.
    pub fn match_breed(&self, lower: &str) -> Option<String> {
        self.breeds
            .iter()
            .find(|entry| lower.contains(entry.needle.as_str()))
            .map(|entry| entry.display.clone())
    }

    /// Collect symptom categories whose cues appear in lowercase text, in
    /// taxonomy order, each category at most once.
    pub fn match_symptoms(&self, lower: &str) -> Vec<String> {
        self.symptom_taxonomy
            .iter()
            .filter(|cat| cat.cues.iter().any(|cue| lower.contains(cue.as_str())))
            .map(|cat| cat.label.clone())
            .collect()
    }

    /// True when a generic breed capture contains a word too common to be a
    /// breed name.
    pub fn is_stopworded(&self, capture_lower: &str) -> bool {
        self.breed_stoplist
            .iter()
            .any(|stop| capture_lower.contains(stop.as_str()))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_breed_name_wins() {
        let lexicon = Lexicon::standard();
        let breed = lexicon.match_breed("c'est un berger belge malinois de 4 ans");
        assert_eq!(breed.as_deref(), Some("Berger Belge Malinois"));
    }

    #[test]
    fn breed_match_returns_canonical_display() {
        let lexicon = Lexicon::standard();
        assert_eq!(
            lexicon.match_breed("un husky sibérien adulte").as_deref(),
            Some("Husky Sibérien")
        );
        assert_eq!(
            lexicon.match_breed("chiot épagneul breton").as_deref(),
            Some("Épagneul Breton")
        );
    }

    #[test]
    fn slash_aliases_are_split() {
        let lexicon = Lexicon::standard();
        assert_eq!(
            lexicon.match_breed("un croisé de 5 ans").as_deref(),
            Some("Croisé/Bâtard")
        );
        assert_eq!(
            lexicon.match_breed("un bâtard adorable").as_deref(),
            Some("Croisé/Bâtard")
        );
    }

    #[test]
    fn autre_is_not_a_matchable_breed() {
        let lexicon = Lexicon::standard();
        assert!(lexicon.match_breed("un autre problème est apparu").is_none());
    }

    #[test]
    fn symptoms_come_back_in_taxonomy_order() {
        let lexicon = Lexicon::standard();
        let symptoms =
            lexicon.match_symptoms("il tremble beaucoup et a eu une crise hier, démarche ataxique");
        assert_eq!(symptoms, vec!["convulsions", "tremblements", "ataxie"]);
    }

    #[test]
    fn each_category_reported_once() {
        let lexicon = Lexicon::standard();
        let symptoms = lexicon.match_symptoms("crises répétées, convulsions, épilepsie suspectée");
        assert_eq!(symptoms, vec!["convulsions"]);
    }

    #[test]
    fn stoplist_rejects_common_words() {
        let lexicon = Lexicon::standard();
        assert!(lexicon.is_stopworded("chien"));
        assert!(lexicon.is_stopworded("chienne"));
        assert!(lexicon.is_stopworded("consultation"));
        assert!(!lexicon.is_stopworded("labrador"));
    }

    #[test]
    fn boite_cue_does_not_match_boxes() {
        let lexicon = Lexicon::standard();
        // "boîte" keeps its circumflex after lowercasing, so the crate of
        // kibble does not read as a limp.
        assert!(lexicon.match_symptoms("une boîte de croquettes").is_empty());
        assert_eq!(lexicon.match_symptoms("il boite depuis hier"), vec!["boiterie"]);
    }
}
