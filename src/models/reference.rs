use serde::Serialize;

/// Breed names offered to the frontend and recognized by the clinical text
/// extractor. Display casing is canonical; matching lowercases.
pub const DOG_BREEDS: [&str; 46] = [
    "Labrador Retriever",
    "Golden Retriever",
    "Berger Allemand",
    "Bulldog Français",
    "Berger Belge Malinois",
    "Border Collie",
    "Rottweiler",
    "Yorkshire Terrier",
    "Chihuahua",
    "Jack Russell Terrier",
    "Cocker Spaniel",
    "Boxer",
    "Husky Sibérien",
    "Beagle",
    "Cavalier King Charles",
    "Caniche",
    "Shih Tzu",
    "Bichon Frisé",
    "Dogue de Bordeaux",
    "Berger Australien",
    "Épagneul Breton",
    "Setter Anglais",
    "Pointer",
    "Braque de Weimar",
    "Doberman",
    "Dogue Allemand",
    "Saint-Bernard",
    "Terre-Neuve",
    "Bouvier Bernois",
    "Akita Inu",
    "Shiba Inu",
    "Basenji",
    "Whippet",
    "Lévrier",
    "Mastiff",
    "Bull Terrier",
    "Staffordshire Bull Terrier",
    "Carlin",
    "Boston Terrier",
    "Schnauzer",
    "Teckel",
    "Spitz",
    "Chow Chow",
    "Shar Pei",
    "Croisé/Bâtard",
    "Autre",
];

/// Presenting complaints selectable when opening a consultation.
pub const CONSULTATION_REASONS: [&str; 6] = [
    "Tremblements et/ou incoordination des mouvements",
    "Convulsion et/ou comportement compulsif",
    "Troubles locomoteurs (trouble de la motricité comme parésie ou paralysie)",
    "Trouble de l'équilibre (ataxie)",
    "Atteinte vestibulaire (tête penchée)",
    "Déficit des nerfs crâniens (hors atteinte vestibulaire)",
];

#[derive(Debug, Clone, Serialize)]
pub struct DogBreed {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultationReason {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}
