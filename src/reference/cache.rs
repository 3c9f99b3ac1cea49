//! File-backed reference data
//!
//! Disease information and the vaccination schedule live as JSON files
//! under the cache directory. A missing or unreadable file is populated
//! from the built-in tables and written back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::types::{HealthBotError, Result};

const VACCINATION_FILE: &str = "vaccination_schedule.json";
const DEFAULT_KEY: &str = "default";

/// Disease summary shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub symptoms: String,
    pub prevention: String,
    pub treatment: String,
}

impl DiseaseInfo {
    fn new(symptoms: &str, prevention: &str, treatment: &str) -> Self {
        Self {
            symptoms: symptoms.to_string(),
            prevention: prevention.to_string(),
            treatment: treatment.to_string(),
        }
    }
}

/// Built-in record for a disease, or the generic default
pub fn builtin_disease_info(disease: &str) -> DiseaseInfo {
    match disease {
        "dengue" => DiseaseInfo::new(
            "High fever, severe headache, pain behind eyes, muscle and joint pain, nausea, vomiting, swollen glands, rash",
            "Use mosquito nets, wear protective clothing, use mosquito repellents, eliminate standing water",
            "Rest, drink fluids, take acetaminophen for pain. Avoid aspirin. Seek medical attention for severe symptoms.",
        ),
        "malaria" => DiseaseInfo::new(
            "Fever, chills, headache, nausea, vomiting, muscle pain, fatigue",
            "Use insecticide-treated mosquito nets, indoor residual spraying, antimalarial medication for high-risk areas",
            "Antimalarial drugs prescribed by healthcare provider based on parasite type and severity",
        ),
        "covid" => DiseaseInfo::new(
            "Fever, cough, fatigue, loss of taste or smell, sore throat, headache",
            "Vaccination, mask-wearing, hand hygiene, physical distancing, ventilation",
            "Rest, hydration, over-the-counter medications for symptoms. Seek medical care for severe symptoms.",
        ),
        _ => DiseaseInfo::new(
            "Fever, fatigue, and other general symptoms. Consult a doctor for accurate diagnosis.",
            "Maintain good hygiene, avoid contaminated water/food, use protective measures.",
            "Rest, hydration, and medical consultation. Follow doctor's advice for specific treatment.",
        ),
    }
}

/// Built-in vaccination schedule keyed by age
pub fn builtin_vaccination_schedule() -> BTreeMap<String, String> {
    [
        ("0", "BCG, Hepatitis B-1, OPV-0 at birth"),
        ("6", "DPT-1, Hepatitis B-2, Hib-1, IPV-1, PCV-1, Rota-1 at 6 weeks"),
        ("10", "DPT-2, Hepatitis B-3, Hib-2, IPV-2, PCV-2, Rota-2 at 10 weeks"),
        ("14", "DPT-3, Hepatitis B-4, Hib-3, IPV-3, PCV-3, Rota-3 at 14 weeks"),
        ("9", "Measles-Rubella-1, JE-1 at 9-12 months"),
        ("16", "DPT booster, Measles-Rubella-2, JE-2, OPV booster at 16-24 months"),
        (DEFAULT_KEY, "Consult your local health center for appropriate vaccination schedule"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn schedule_entry(schedules: &BTreeMap<String, String>, age: u32) -> String {
    schedules
        .get(&age.to_string())
        .or_else(|| schedules.get(DEFAULT_KEY))
        .cloned()
        .unwrap_or_else(|| builtin_vaccination_schedule()[DEFAULT_KEY].clone())
}

/// Normalise a disease name into a cache key.
/// Only letters, digits, `-` and `_` are allowed so the key is a safe file name.
pub fn disease_key(disease: &str) -> Result<String> {
    let key = disease.trim().to_lowercase();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(HealthBotError::BadRequest(format!(
            "Invalid disease name: {}",
            disease
        )));
    }
    Ok(key)
}

/// JSON file cache for reference data
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    dir: PathBuf,
}

impl ReferenceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn disease_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("disease_{}.json", key))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache read error");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache file is not valid JSON");
                None
            }
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) {
        let result = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            let bytes = serde_json::to_vec(value)?;
            tokio::fs::write(path, bytes).await?;
            Ok::<_, HealthBotError>(())
        }
        .await;

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Cache write error");
        }
    }

    /// Disease info, read from cache or populated from the built-in table
    pub async fn disease_info(&self, disease: &str) -> Result<DiseaseInfo> {
        let key = disease_key(disease)?;
        let path = self.disease_path(&key);

        if let Some(info) = Self::read_json::<DiseaseInfo>(&path).await {
            debug!(disease = %key, "Disease info served from cache");
            return Ok(info);
        }

        let info = builtin_disease_info(&key);
        self.write_json(&path, &info).await;
        Ok(info)
    }

    /// Vaccination schedule entry for an age, falling back to the default entry
    pub async fn vaccination_schedule(&self, age: u32) -> String {
        let path = self.dir.join(VACCINATION_FILE);

        if let Some(schedules) = Self::read_json::<BTreeMap<String, String>>(&path).await {
            return schedule_entry(&schedules, age);
        }

        let schedules = builtin_vaccination_schedule();
        self.write_json(&path, &schedules).await;
        schedule_entry(&schedules, age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disease_info_populates_and_caches() {
        let dir = TempDir::new().unwrap();
        let cache = ReferenceCache::new(dir.path().join("cache"));

        let info = cache.disease_info("Dengue").await.unwrap();
        assert!(info.symptoms.starts_with("High fever"));
        assert!(dir.path().join("cache/disease_dengue.json").exists());

        // Edit the cached file; a case-insensitive read must return it as-is
        let edited = DiseaseInfo::new("edited", "p", "t");
        std::fs::write(
            dir.path().join("cache/disease_dengue.json"),
            serde_json::to_vec(&edited).unwrap(),
        )
        .unwrap();
        assert_eq!(cache.disease_info("DENGUE").await.unwrap(), edited);
    }

    #[tokio::test]
    async fn test_unknown_disease_gets_default() {
        let dir = TempDir::new().unwrap();
        let cache = ReferenceCache::new(dir.path());
        let info = cache.disease_info("cholera").await.unwrap();
        assert_eq!(info, builtin_disease_info("anything-else"));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_repopulated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("disease_malaria.json"), b"{not json").unwrap();
        let cache = ReferenceCache::new(dir.path());
        let info = cache.disease_info("malaria").await.unwrap();
        assert_eq!(info, builtin_disease_info("malaria"));
    }

    #[tokio::test]
    async fn test_disease_name_must_be_a_safe_key() {
        let dir = TempDir::new().unwrap();
        let cache = ReferenceCache::new(dir.path());
        assert!(cache.disease_info("../secrets").await.is_err());
        assert!(cache.disease_info("  ").await.is_err());
    }

    #[test]
    fn test_disease_key_is_ascii_only() {
        assert_eq!(disease_key(" Dengue ").unwrap(), "dengue");
        assert_eq!(disease_key("covid_19").unwrap(), "covid_19");
        assert!(disease_key("ଡେଙ୍ଗୁ").is_err());
        assert!(disease_key("डेंगू").is_err());
        assert!(disease_key("malária").is_err());
    }

    #[tokio::test]
    async fn test_vaccination_schedule() {
        let dir = TempDir::new().unwrap();
        let cache = ReferenceCache::new(dir.path());

        assert_eq!(
            cache.vaccination_schedule(9).await,
            "Measles-Rubella-1, JE-1 at 9-12 months"
        );
        assert!(dir.path().join(VACCINATION_FILE).exists());
        assert_eq!(
            cache.vaccination_schedule(30).await,
            "Consult your local health center for appropriate vaccination schedule"
        );
    }

    #[tokio::test]
    async fn test_vaccination_file_without_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VACCINATION_FILE), br#"{"1": "custom"}"#).unwrap();
        let cache = ReferenceCache::new(dir.path());
        assert_eq!(cache.vaccination_schedule(1).await, "custom");
        assert!(cache.vaccination_schedule(2).await.starts_with("Consult"));
    }
}
