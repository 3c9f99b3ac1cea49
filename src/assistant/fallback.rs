//! Rule-based responder
//!
//! Keyword matching over the lower-cased message. Rules are checked in
//! order and the first match wins. This responder always produces an answer.

use rand::Rng;
use tracing::debug;

const GREETINGS: &[&str] = &[
    "Hello! I'm your Odisha Health Assistant. How can I help you today?",
    "Hi there! I can help with health information. What would you like to know?",
    "Welcome! I provide health information and advice. What can I help you with?",
];

const GENERAL: &[&str] = &[
    "I can help you with information about diseases, symptoms, prevention, and vaccinations.",
    "You can ask me about health topics like dengue, malaria, COVID-19, or vaccination schedules.",
    "I provide health information for Odisha residents. What specific health question do you have?",
];

const SYMPTOMS: &[(&str, &str)] = &[
    ("dengue", "Dengue symptoms: high fever, severe headache, pain behind eyes, muscle/joint pain, rash, mild bleeding."),
    ("malaria", "Malaria symptoms: fever, chills, headache, nausea, vomiting, muscle pain, fatigue."),
    ("covid", "COVID-19 symptoms: fever, cough, tiredness, loss of taste/smell, sore throat, headache."),
    ("typhoid", "Typhoid symptoms: sustained high fever, weakness, stomach pain, headache, loss of appetite."),
];

const DEFAULT_SYMPTOMS: &str = "Common illness symptoms may include fever, fatigue, pain, or digestive issues. For specific symptoms, please consult a healthcare provider.";

const PREVENTION: &[(&str, &str)] = &[
    ("dengue", "Prevent dengue: Use mosquito nets, repellents, wear protective clothing, eliminate standing water."),
    ("malaria", "Prevent malaria: Sleep under insecticide-treated nets, use mosquito repellents, take prophylactic drugs if recommended."),
];

const DEFAULT_PREVENTION: &str = "General prevention: Maintain good hygiene, drink clean water, eat nutritious food, get vaccinated, and avoid contact with sick people.";

const VACCINATION: &str = "Vaccination schedule: Birth (BCG, HepB), 6 weeks (DPT, polio, Hib), 10 weeks, 14 weeks, 9-12 months (measles), 16-24 months (booster). Consult local health center for exact dates.";

const DENGUE_SUMMARY: &str = "Dengue is a mosquito-borne viral disease. Symptoms include high fever, severe headache, and joint pain. Prevention involves mosquito control and protection.";

const MALARIA_SUMMARY: &str = "Malaria is caused by parasites transmitted through mosquito bites. Symptoms include fever, chills, and sweating. Use mosquito nets and repellents for prevention.";

const COVID_SUMMARY: &str = "COVID-19 is a respiratory illness. Prevent spread through vaccination, masks, hand washing, and social distancing.";

/// What a message was recognised as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Greeting,
    Symptoms,
    Prevention,
    Vaccination,
    Dengue,
    Malaria,
    Covid,
    General,
}

/// Keyword rules, first match wins
const RULES: &[(&[&str], Category)] = &[
    (&["hello", "hi", "hey", "namaste", "namaskar"], Category::Greeting),
    (&["symptom", "laksan", "sign", "feel", "hurt", "pain"], Category::Symptoms),
    (&["prevent", "roktham", "avoid", "protection", "safe"], Category::Prevention),
    (&["vaccine", "vaccination", "tika", "immunization"], Category::Vaccination),
    (&["dengue"], Category::Dengue),
    (&["malaria"], Category::Malaria),
    (&["covid", "corona"], Category::Covid),
];

/// Classify a message. Matching is plain substring containment, so short
/// keywords such as "hi" also match inside longer words.
pub fn categorize(message: &str) -> Category {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::General)
}

fn lookup(table: &[(&str, &'static str)], lower: &str, default: &'static str) -> &'static str {
    table
        .iter()
        .find(|(disease, _)| lower.contains(disease))
        .map(|(_, text)| *text)
        .unwrap_or(default)
}

/// Picks an index in `0..n` for rules with several variants
pub type Chooser = Box<dyn Fn(usize) -> usize + Send + Sync>;

/// Keyword-table responder
pub struct FallbackResponder {
    choose: Chooser,
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackResponder {
    /// Responder picking variants uniformly at random
    pub fn new() -> Self {
        Self::with_chooser(Box::new(|n| rand::thread_rng().gen_range(0..n)))
    }

    /// Responder with a custom variant picker
    pub fn with_chooser(choose: Chooser) -> Self {
        Self { choose }
    }

    fn pick(&self, variants: &'static [&'static str]) -> &'static str {
        let idx = (self.choose)(variants.len());
        variants[idx.min(variants.len() - 1)]
    }

    /// Answer a message
    pub fn respond(&self, message: &str) -> &'static str {
        let lower = message.to_lowercase();
        let category = categorize(&lower);
        debug!(?category, "Fallback responder matched");

        match category {
            Category::Greeting => self.pick(GREETINGS),
            Category::Symptoms => lookup(SYMPTOMS, &lower, DEFAULT_SYMPTOMS),
            Category::Prevention => lookup(PREVENTION, &lower, DEFAULT_PREVENTION),
            Category::Vaccination => VACCINATION,
            Category::Dengue => DENGUE_SUMMARY,
            Category::Malaria => MALARIA_SUMMARY,
            Category::Covid => COVID_SUMMARY,
            Category::General => self.pick(GENERAL),
        }
    }
}
