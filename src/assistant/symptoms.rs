//! Symptom advice generator
//!
//! Builds a formatted advice text from a symptom description plus optional
//! severity, duration and age. Also hosts the sibling dialogue helpers:
//! prevention tips, urgency assessment and emergency detection.

use serde::{Deserialize, Deserializer, Serialize};

/// Symptoms that short-circuit to the emergency message
const EMERGENCY_SYMPTOMS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "shortness of breath",
    "severe bleeding",
    "stroke symptoms",
    "heart attack",
    "severe burns",
    "unconscious",
    "seizure",
    "severe allergic reaction",
    "choking",
    "severe head injury",
    "severe trauma",
    "can't breathe",
    "severe abdominal pain",
    "severe mental health crisis",
];

/// Extra phrases checked against the raw message only
const EMERGENCY_INDICATORS: &[&str] = &[
    "can't breathe",
    "difficulty breathing",
    "chest pain",
    "severe pain",
    "heart attack",
    "stroke",
    "unconscious",
    "bleeding heavily",
    "severe burns",
    "poisoning",
    "overdose",
    "suicide",
    "self harm",
];

pub const EMERGENCY_MESSAGE: &str = "🚨 **EMERGENCY ALERT** 🚨\n\nBased on your symptoms, you need IMMEDIATE medical attention!\n\n📞 Call Emergency Services NOW:\n• USA: 911\n• UK: 999\n• Europe: 112\n\n🏥 Go to the nearest Emergency Room immediately!";

pub const MISSING_SYMPTOM_MESSAGE: &str =
    "I need to know your symptoms to provide appropriate advice. What are you experiencing?";

/// (symptom, [mild, moderate, severe])
const SYMPTOM_ADVICE: &[(&str, [&str; 3])] = &[
    ("headache", [
        "Rest in a quiet, dark room. Stay hydrated and consider over-the-counter pain relief.",
        "Rest, hydrate, and take pain medication as directed. If persistent, monitor closely.",
        "Seek medical attention if severe headache persists or is accompanied by fever, stiff neck, or vision changes.",
    ]),
    ("migraine", [
        "Rest in a dark, quiet room. Apply cold compress to forehead. Stay hydrated.",
        "Take prescribed migraine medication early. Rest in dark room. Avoid triggers.",
        "Take prescribed medication immediately. If no relief in 2 hours, consider medical attention.",
    ]),
    ("fever", [
        "Rest, stay hydrated, monitor temperature. Use fever reducers as needed.",
        "Rest, increase fluid intake, use fever-reducing medication, monitor symptoms.",
        "Seek medical attention if fever exceeds 103°F (39.4°C) or persists more than 3 days.",
    ]),
    ("cough", [
        "Stay hydrated, use throat lozenges, consider honey for soothing.",
        "Rest, warm liquids, humidifier, over-the-counter cough suppressants.",
        "If cough persists more than 3 weeks or produces blood, seek medical attention.",
    ]),
    ("sore throat", [
        "Gargle with warm salt water, stay hydrated, throat lozenges.",
        "Rest, warm liquids, pain relievers, salt water gargles.",
        "If accompanied by high fever or difficulty swallowing, see a doctor.",
    ]),
    ("stomach ache", [
        "Rest, stay hydrated, BRAT diet (bananas, rice, applesauce, toast).",
        "Clear liquids, rest, avoid solid foods until symptoms improve.",
        "Seek medical attention if severe pain, vomiting, or signs of dehydration.",
    ]),
    ("back pain", [
        "Rest, gentle stretching, heat/cold therapy, over-the-counter pain relief.",
        "Balance rest with gentle movement, pain medication, consider physical therapy.",
        "Medical evaluation needed, especially if pain radiates to legs or causes numbness.",
    ]),
    ("joint pain", [
        "Rest affected joint, apply ice/heat, gentle movement, over-the-counter anti-inflammatory.",
        "Balance rest and gentle exercise, consider anti-inflammatory medication.",
        "Medical evaluation needed, especially if joint is swollen or warm.",
    ]),
    ("fatigue", [
        "Ensure adequate sleep, balanced diet, regular exercise, manage stress.",
        "Prioritize rest, evaluate sleep quality, consider vitamin deficiencies.",
        "If persistent fatigue affects daily activities, medical evaluation recommended.",
    ]),
    ("dizziness", [
        "Sit or lie down, stay hydrated, move slowly when changing positions.",
        "Rest, hydrate, avoid sudden movements, monitor for improvement.",
        "Seek medical attention if accompanied by chest pain, shortness of breath, or confusion.",
    ]),
    ("nausea", [
        "Stay hydrated with small sips, try ginger, eat bland foods.",
        "Clear liquids, rest, avoid strong odors, small frequent meals.",
        "If persistent vomiting or signs of dehydration, seek medical attention.",
    ]),
    ("anxiety", [
        "Practice deep breathing, mindfulness, regular exercise, limit caffeine.",
        "Consider relaxation techniques, talk to someone you trust, maintain routine.",
        "If anxiety interferes with daily life, consider professional mental health support.",
    ]),
    ("depression", [
        "Maintain social connections, regular exercise, good sleep hygiene, engage in activities you enjoy.",
        "Reach out to friends/family, consider counseling, maintain healthy habits.",
        "Professional mental health support recommended. If thoughts of self-harm, seek immediate help.",
    ]),
];

const PREVENTION_TIPS: &[(&str, &str)] = &[
    ("headache", "Stay hydrated, maintain regular sleep schedule, manage stress, avoid known triggers."),
    ("migraine", "Identify and avoid triggers, maintain consistent sleep schedule, manage stress, stay hydrated."),
    ("fever", "Good hand hygiene, avoid contact with sick individuals, maintain strong immune system."),
    ("cough", "Avoid irritants, don't smoke, wash hands frequently, stay hydrated."),
    ("sore throat", "Good hand hygiene, avoid close contact with sick people, don't share utensils."),
    ("stomach ache", "Eat slowly, avoid trigger foods, manage stress, maintain good food hygiene."),
    ("back pain", "Good posture, regular exercise, proper lifting techniques, ergonomic workspace."),
    ("joint pain", "Regular exercise, maintain healthy weight, protect joints during activities."),
    ("fatigue", "Regular sleep schedule, balanced diet, regular exercise, stress management."),
    ("anxiety", "Regular exercise, stress management techniques, limit caffeine, maintain social connections."),
    ("depression", "Regular exercise, social connections, adequate sleep, engage in meaningful activities."),
];

const GENERAL_PREVENTION: &str = "**General Health Prevention:**
• 🥗 Maintain a balanced diet rich in fruits and vegetables
• 💧 Stay well hydrated (8+ glasses of water daily)
• 🏃‍♂️ Exercise regularly (at least 30 minutes, 5 days a week)
• 😴 Get adequate sleep (7-9 hours per night)
• 🧼 Practice good hygiene (frequent hand washing)
• 🚭 Avoid smoking and limit alcohol consumption
• 🧘‍♀️ Manage stress through relaxation techniques
• 💉 Keep up with regular medical checkups and vaccinations
• 🏥 Know when to seek medical attention
• 👥 Maintain healthy social connections";

const GENERAL_WARNINGS: &[&str] = &[
    "Symptoms worsen or don't improve",
    "You develop additional concerning symptoms",
    "You have difficulty with daily activities",
    "You're concerned about your symptoms",
];

const SPECIFIC_WARNINGS: &[(&str, &[&str])] = &[
    ("headache", &["sudden severe headache", "headache with fever and stiff neck", "headache with vision changes"]),
    ("fever", &["fever above 103°F (39.4°C)", "fever with severe headache", "fever with difficulty breathing"]),
    ("chest pain", &["any chest pain", "pain radiating to arm or jaw", "chest pain with shortness of breath"]),
    ("abdominal pain", &["severe abdominal pain", "pain with vomiting blood", "signs of dehydration"]),
    ("back pain", &["pain radiating to legs", "numbness or weakness", "loss of bladder control"]),
];

const HIGH_URGENCY: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "severe bleeding",
    "severe burns",
    "head injury",
    "stroke symptoms",
    "heart attack",
    "severe allergic reaction",
];

const MEDIUM_URGENCY: &[&str] = &[
    "persistent fever",
    "severe headache",
    "abdominal pain",
    "joint swelling",
    "vision problems",
    "hearing loss",
    "persistent cough",
];

const DISCLAIMER: &str = "⚠️ **Important:** This is general information only and not a substitute for professional medical advice.";

/// Symptom description as collected from the user
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SymptomQuery {
    #[serde(default)]
    pub symptom: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    /// Free text or a number; the first integer found is used
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Mild,
    Moderate,
    Severe,
}

fn is_severe(severity: &str) -> bool {
    let lower = severity.to_lowercase();
    ["severe", "unbearable", "intense"]
        .iter()
        .any(|w| lower.contains(w))
}

fn severity_level(severity: Option<&str>) -> Severity {
    match severity {
        Some(s) if is_severe(s) => Severity::Severe,
        Some(s) => {
            let lower = s.to_lowercase();
            if ["moderate", "medium"].iter().any(|w| lower.contains(w)) {
                Severity::Moderate
            } else {
                Severity::Mild
            }
        }
        None => Severity::Mild,
    }
}

/// Capitalize the first letter of every word, lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Table entry whose key is contained in the symptom, or which contains it
fn match_table<'a, T>(table: &'a [(&'static str, T)], normalized: &str) -> Option<&'a T> {
    table
        .iter()
        .find(|(key, _)| normalized.contains(key) || key.contains(normalized))
        .map(|(_, value)| value)
}

fn symptom_advice(normalized: &str, severity: Option<&str>) -> &'static str {
    if let Some(levels) = match_table(SYMPTOM_ADVICE, normalized) {
        return match severity_level(severity) {
            Severity::Mild => levels[0],
            Severity::Moderate => levels[1],
            Severity::Severe => levels[2],
        };
    }

    if severity.is_some_and(is_severe) {
        "For severe symptoms, it's recommended to seek medical attention promptly."
    } else {
        "Monitor your symptoms, rest, stay hydrated, and consider over-the-counter remedies as appropriate."
    }
}

fn duration_advice(duration: &str) -> Option<&'static str> {
    let lower = duration.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["weeks", "months", "chronic", "long"]) {
        Some("Chronic symptoms warrant medical evaluation to rule out underlying conditions.")
    } else if has(&["days", "week"]) {
        Some("Symptoms lasting several days should be monitored closely.")
    } else if has(&["hours", "today", "just started"]) {
        Some("For new symptoms, monitor closely and seek care if they worsen.")
    } else {
        None
    }
}

/// First run of ASCII digits in the text
fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn age_advice(age: &str) -> Option<&'static str> {
    let years = first_integer(age)?;
    if years < 18 {
        Some("For children and adolescents, consider consulting with a pediatrician.")
    } else if years > 65 {
        Some("Older adults should be more cautious with symptoms and consider earlier medical consultation.")
    } else if years > 50 {
        Some("Consider age-related health factors and don't hesitate to seek medical advice.")
    } else {
        None
    }
}

fn when_to_seek_help(normalized: &str) -> String {
    let mut warnings: Vec<&str> = GENERAL_WARNINGS.to_vec();
    if let Some((_, specific)) = SPECIFIC_WARNINGS
        .iter()
        .find(|(key, _)| normalized.contains(key))
    {
        warnings.extend_from_slice(specific);
    }
    warnings.join("; ")
}

fn is_emergency_symptom(symptom: &str) -> bool {
    let lower = symptom.to_lowercase();
    EMERGENCY_SYMPTOMS.iter().any(|e| lower.contains(e))
}

/// Produce advice text for a symptom report
pub fn advise(query: &SymptomQuery) -> String {
    let Some(symptom) = non_empty(&query.symptom) else {
        return MISSING_SYMPTOM_MESSAGE.to_string();
    };

    if is_emergency_symptom(symptom) {
        return EMERGENCY_MESSAGE.to_string();
    }

    let normalized = symptom.trim().to_lowercase();
    let severity = non_empty(&query.severity);
    let duration = non_empty(&query.duration);
    let age = non_empty(&query.age);

    let mut response = format!("**Health Assessment for: {}**\n\n", title_case(symptom));

    if let Some(duration) = duration {
        response.push_str(&format!("⏱️ **Duration:** {}\n", duration));
    }
    if let Some(severity) = severity {
        response.push_str(&format!("📊 **Severity:** {}\n", severity));
    }
    if let Some(age) = age {
        response.push_str(&format!("👤 **Age:** {}\n", age));
    }

    response.push_str(&format!(
        "\n💡 **Recommendation:**\n{}\n",
        symptom_advice(&normalized, severity)
    ));

    if let Some(advice) = duration.and_then(duration_advice) {
        response.push_str(&format!("\n⏰ **Duration Consideration:** {}\n", advice));
    }

    if let Some(advice) = age.and_then(age_advice) {
        response.push_str(&format!("\n👨‍⚕️ **Age Consideration:** {}\n", advice));
    }

    response.push_str(&format!(
        "\n🏥 **Seek Medical Attention If:** {}\n",
        when_to_seek_help(&normalized)
    ));

    response.push('\n');
    response.push_str(DISCLAIMER);
    response
}

/// Prevention tips, with a symptom-specific tip first when one matches
pub fn prevention_tips(symptom: Option<&str>) -> String {
    let mut response = String::from("🛡️ **Health Prevention Tips:**\n\n");

    if let Some(symptom) = symptom.filter(|s| !s.is_empty()) {
        let normalized = symptom.trim().to_lowercase();
        if let Some(tip) = match_table(PREVENTION_TIPS, &normalized) {
            response.push_str(&format!("**For {}:**\n{}\n\n", title_case(symptom), tip));
        }
    }

    response.push_str(GENERAL_PREVENTION);
    response
}

/// How soon the user should seek care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Classify urgency from symptom, severity and duration
pub fn assess_urgency(query: &SymptomQuery) -> Urgency {
    let Some(symptom) = non_empty(&query.symptom) else {
        return Urgency::Low;
    };
    let lower = symptom.to_lowercase();

    if HIGH_URGENCY.iter().any(|s| lower.contains(s)) {
        return Urgency::High;
    }

    if non_empty(&query.severity).is_some_and(is_severe) {
        return Urgency::High;
    }

    if let Some(duration) = non_empty(&query.duration) {
        let duration = duration.to_lowercase();
        if ["weeks", "months", "chronic"]
            .iter()
            .any(|w| duration.contains(w))
        {
            return Urgency::Medium;
        }
    }

    if MEDIUM_URGENCY.iter().any(|s| lower.contains(s)) {
        return Urgency::Medium;
    }

    Urgency::Low
}

/// Recommended next steps for an urgency level
pub fn next_steps(urgency: Urgency) -> String {
    let mut response = String::from("📋 **Recommended Next Steps:**\n\n");

    response.push_str(match urgency {
        Urgency::High => "🚨 **High Priority - Seek Medical Attention:**
• Contact your doctor today or visit urgent care
• Consider emergency room if symptoms are severe
• Don't wait if symptoms worsen
• Have someone accompany you if possible",
        Urgency::Medium => "⚠️ **Medium Priority - Monitor and Schedule:**
• Schedule appointment with your primary care doctor within a few days
• Continue monitoring symptoms
• Keep a symptom diary
• Seek immediate care if symptoms worsen",
        Urgency::Low => "✅ **Low Priority - Self-Care and Monitor:**
• Continue self-care measures
• Monitor symptoms for changes
• Consider seeing a doctor if symptoms persist beyond a week
• Schedule routine checkup if due",
    });

    response.push_str("\n\n**General Recommendations:**\n");
    response.push_str("• 📝 Keep a symptom diary with dates, times, and descriptions\n");
    response.push_str("• 💊 Follow medication instructions carefully\n");
    response.push_str("• 🏠 Create a comfortable recovery environment\n");
    response.push_str("• 👥 Inform trusted contacts about your condition\n");
    response.push_str("• 📞 Keep emergency numbers readily available");
    response
}

/// Whether a symptom or free-text message indicates an emergency.
/// The emergency list is checked against both; the indicator list against
/// the message only.
pub fn assess_emergency(symptom: &str, message: &str) -> bool {
    let symptom = symptom.to_lowercase();
    let message = message.to_lowercase();

    EMERGENCY_SYMPTOMS
        .iter()
        .any(|e| symptom.contains(e) || message.contains(e))
        || EMERGENCY_INDICATORS.iter().any(|i| message.contains(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(symptom: &str) -> SymptomQuery {
        SymptomQuery {
            symptom: Some(symptom.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_emergency_short_circuits() {
        let q = SymptomQuery {
            symptom: Some("Chest pain and sweating".into()),
            severity: Some("severe".into()),
            duration: Some("2 hours".into()),
            age: Some("70".into()),
        };
        let out = advise(&q);
        assert_eq!(out, EMERGENCY_MESSAGE);
        assert!(!out.contains("Severity"));
        assert!(!out.contains("Age Consideration"));
    }

    #[test]
    fn test_missing_symptom() {
        assert_eq!(advise(&SymptomQuery::default()), MISSING_SYMPTOM_MESSAGE);
        assert_eq!(advise(&query("")), MISSING_SYMPTOM_MESSAGE);
    }

    #[test]
    fn test_known_symptom_with_all_fragments() {
        let q = SymptomQuery {
            symptom: Some("bad headache".into()),
            severity: Some("Moderate".into()),
            duration: Some("3 days".into()),
            age: Some("about 70 years".into()),
        };
        let out = advise(&q);
        assert!(out.starts_with("**Health Assessment for: Bad Headache**"));
        assert!(out.contains("Rest, hydrate, and take pain medication as directed."));
        assert!(out.contains("Symptoms lasting several days should be monitored closely."));
        assert!(out.contains("Older adults should be more cautious"));
        assert!(out.contains("sudden severe headache"));
        assert!(out.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_partial_symptom_matches_containing_key() {
        // "ache" is contained in "headache"
        let out = advise(&query("ache"));
        assert!(out.contains("Rest in a quiet, dark room."));
    }

    #[test]
    fn test_unknown_symptom_generic_advice() {
        let mild = advise(&query("itchy elbow"));
        assert!(mild.contains("Monitor your symptoms, rest, stay hydrated"));

        let severe = advise(&SymptomQuery {
            severity: Some("unbearable".into()),
            ..query("itchy elbow")
        });
        assert!(severe.contains("For severe symptoms, it's recommended"));
    }

    #[test]
    fn test_duration_buckets() {
        assert!(duration_advice("two weeks").unwrap().starts_with("Chronic"));
        assert!(duration_advice("a week").unwrap().starts_with("Symptoms lasting"));
        assert!(duration_advice("just started").unwrap().starts_with("For new"));
        assert!(duration_advice("unsure").is_none());
    }

    #[test]
    fn test_age_buckets() {
        assert!(age_advice("12").unwrap().contains("pediatrician"));
        assert!(age_advice("55 yrs").unwrap().contains("age-related"));
        assert!(age_advice("30").is_none());
        assert!(age_advice("old").is_none());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("sore THROAT"), "Sore Throat");
        assert_eq!(title_case("can't sleep"), "Can'T Sleep");
    }

    #[test]
    fn test_prevention_tips() {
        let out = prevention_tips(Some("Migraine"));
        assert!(out.contains("**For Migraine:**\nIdentify and avoid triggers"));
        assert!(out.ends_with("Maintain healthy social connections"));

        let out = prevention_tips(None);
        assert!(!out.contains("**For"));
        assert!(out.contains("General Health Prevention"));
    }

    #[test]
    fn test_urgency() {
        assert_eq!(assess_urgency(&SymptomQuery::default()), Urgency::Low);
        assert_eq!(assess_urgency(&query("head injury")), Urgency::High);
        assert_eq!(
            assess_urgency(&SymptomQuery {
                severity: Some("intense".into()),
                ..query("cough")
            }),
            Urgency::High
        );
        assert_eq!(
            assess_urgency(&SymptomQuery {
                duration: Some("months".into()),
                ..query("cough")
            }),
            Urgency::Medium
        );
        assert_eq!(assess_urgency(&query("persistent cough")), Urgency::Medium);
        assert_eq!(assess_urgency(&query("cough")), Urgency::Low);
        assert!(next_steps(Urgency::High).contains("High Priority"));
    }

    #[test]
    fn test_emergency_assessment() {
        assert!(assess_emergency("", "I think I took an overdose"));
        assert!(assess_emergency("seizure", "help"));
        assert!(assess_emergency("", "Chest pain since morning"));
        assert!(!assess_emergency("cough", "mild cough"));
    }

    #[test]
    fn test_age_accepts_numbers() {
        let q: SymptomQuery =
            serde_json::from_str(r#"{"symptom": "fever", "age": 8}"#).unwrap();
        assert_eq!(q.age.as_deref(), Some("8"));
        assert!(advise(&q).contains("pediatrician"));
    }
}
