//! Data models and structures
//!
//! Defines the identification record handed back to the host application,
//! the fixed model parameters sent with every request, and the runtime
//! configuration used by the command-line shell.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Version of the `key: value` response schema requested from the model.
///
/// Version 1 only carried `common_name` and `scientific_name`; it parses as a
/// subset of version 2.
pub const RESPONSE_SCHEMA_VERSION: u32 = 2;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Risk classification derived from the verbatim `poisonous` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Poisonous {
    Yes,
    No,
    Unknown,
}

/// A successful identification as parsed from the model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantIdentification {
    pub common_name: String,
    pub scientific_name: Option<String>,
    /// Kept exactly as the model wrote it; see [`PlantIdentification::poison_risk`].
    pub poisonous: Option<String>,
    pub blooming_period: Option<String>,
    pub native_region: Option<String>,
    pub symbolism: Option<String>,
    pub gift_to: Option<String>,
    pub story: Option<String>,
}

impl PlantIdentification {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            scientific_name: None,
            poisonous: None,
            blooming_period: None,
            native_region: None,
            symbolism: None,
            gift_to: None,
            story: None,
        }
    }

    /// Only an exact (case-insensitive) "yes" counts as a positive.
    pub fn poison_risk(&self) -> Poisonous {
        match self.poisonous.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes") => Poisonous::Yes,
            Some(v) if v.eq_ignore_ascii_case("no") => Poisonous::No,
            _ => Poisonous::Unknown,
        }
    }

    /// Render the record in the canonical response format.
    pub fn to_response_text(&self) -> String {
        let mut lines = vec![format!("common_name: {}", self.common_name)];
        let optional = [
            ("scientific_name", &self.scientific_name),
            ("poisonous", &self.poisonous),
            ("blooming_period", &self.blooming_period),
            ("native_region", &self.native_region),
            ("symbolism", &self.symbolism),
            ("gift_to", &self.gift_to),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                lines.push(format!("{}: {}", key, value));
            }
        }
        lines.push(format!(
            "story: {}",
            self.story.as_deref().unwrap_or("NONE")
        ));
        lines.join("\n")
    }

    /// Text offered through the share sheet.
    pub fn share_summary(&self, location_name: Option<&str>) -> String {
        let mut text = format!(
            "Check out what I've found!\nCommon Name: {}\nScientific Name: {}",
            self.common_name,
            self.scientific_name.as_deref().unwrap_or("Unknown")
        );
        if let Some(location) = location_name.filter(|l| !l.trim().is_empty()) {
            text.push_str(&format!("\nLocation: {}", location));
        }
        text
    }
}

/// Fixed inference parameters. Not exposed to end users.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            top_p: 1.0,
            max_tokens: 800,
        }
    }
}

// Configuration for the command-line shell
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let timeout = match std::env::var("PLANT_ID_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key: std::env::var("PLANT_ID_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            endpoint: std::env::var("PLANT_ID_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            timeout,
        })
    }
}

fn parse_timeout_secs(raw: &str) -> crate::Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(crate::Error::Config(format!(
            "PLANT_ID_TIMEOUT_SECS must be a positive integer, got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rose() -> PlantIdentification {
        PlantIdentification {
            scientific_name: Some("Rosa".to_string()),
            poisonous: Some("NO".to_string()),
            ..PlantIdentification::new("Rose")
        }
    }

    #[test]
    fn test_poison_risk_only_exact_yes_is_positive() {
        let mut plant = rose();
        plant.poisonous = Some("YES".to_string());
        assert_eq!(plant.poison_risk(), Poisonous::Yes);

        plant.poisonous = Some("yes, mildly".to_string());
        assert_eq!(plant.poison_risk(), Poisonous::Unknown);

        plant.poisonous = Some("No".to_string());
        assert_eq!(plant.poison_risk(), Poisonous::No);

        plant.poisonous = None;
        assert_eq!(plant.poison_risk(), Poisonous::Unknown);
    }

    #[test]
    fn test_response_text_writes_none_for_missing_story() {
        let text = rose().to_response_text();
        assert_eq!(
            text,
            "common_name: Rose\nscientific_name: Rosa\npoisonous: NO\nstory: NONE"
        );
    }

    #[test]
    fn test_share_summary() {
        let summary = rose().share_summary(Some("Kyoto"));
        assert_eq!(
            summary,
            "Check out what I've found!\nCommon Name: Rose\nScientific Name: Rosa\nLocation: Kyoto"
        );

        let unnamed = PlantIdentification::new("Fern").share_summary(None);
        assert!(unnamed.ends_with("Scientific Name: Unknown"));
    }

    #[test]
    fn test_identification_serialization() {
        let json = serde_json::to_string(&rose()).unwrap();
        assert!(json.contains("\"common_name\":\"Rose\""));

        let back: PlantIdentification = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rose());
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs("45").unwrap(), Duration::from_secs(45));
        assert!(matches!(
            parse_timeout_secs("0"),
            Err(crate::Error::Config(_))
        ));
        assert!(matches!(
            parse_timeout_secs("soon"),
            Err(crate::Error::Config(_))
        ));
    }
}
