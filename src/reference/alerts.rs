//! Outbreak alerts for a district
//!
//! Government advisories followed by outbreak-risk predictions. Both are
//! static tables with a default row; districts match case-insensitively.

const ADVISORIES: &[(&str, &[&str])] = &[
    ("bhubaneswar", &[
        "Dengue outbreak reported in Bhubaneswar. Use mosquito nets and repellents.",
        "Heatwave alert: Temperatures expected to reach 42°C this week.",
    ]),
    ("cuttack", &[
        "Malaria cases increasing in Cuttack. Ensure proper sanitation.",
        "Free vaccination camp organized at SCB Medical College.",
    ]),
];

const DEFAULT_ADVISORIES: &[&str] = &[
    "Stay updated with local health advisories.",
    "Drink plenty of water during summer months.",
];

const PREDICTIONS: &[(&str, &[&str])] = &[
    ("bhubaneswar", &["High probability of dengue outbreak in next 2 weeks"]),
    ("cuttack", &["Moderate risk of malaria cases increasing"]),
];

const DEFAULT_PREDICTIONS: &[&str] = &["Monitor local health advisories for updates"];

fn rows_for(
    table: &[(&str, &'static [&'static str])],
    district: &str,
    default: &'static [&'static str],
) -> &'static [&'static str] {
    table
        .iter()
        .find(|(name, _)| *name == district)
        .map(|(_, rows)| *rows)
        .unwrap_or(default)
}

/// Advisories then predictions for a district
pub fn outbreak_alerts(district: &str) -> Vec<String> {
    let district = district.trim().to_lowercase();
    rows_for(ADVISORIES, &district, DEFAULT_ADVISORIES)
        .iter()
        .chain(rows_for(PREDICTIONS, &district, DEFAULT_PREDICTIONS))
        .map(|s| s.to_string())
        .collect()
}
