//! Hosted emotion model, reached over the model hub's inference API.

use crate::emotion::{Classifier, ClassifierProvider, LabelScore};
use anyhow::{bail, Context, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the hosted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub endpoint: String,
    pub model: String,
    /// Token sent as a bearer credential. Never serialized.
    #[serde(skip)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HubConfig {
    #[must_use]
    pub fn model_url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.model)
    }
}

pub struct HubProvider {
    config: HubConfig,
}

impl HubProvider {
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self { config }
    }
}

impl ClassifierProvider for HubProvider {
    fn initialize(&self) -> Result<Box<dyn Classifier>> {
        let Some(token) = self.config.api_token.clone().filter(|t| !t.trim().is_empty()) else {
            bail!("No model hub API token configured (set HF_API_TOKEN or pass --hub-token)");
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for the model hub")?;

        debug!("Model hub client ready for {}", self.config.model_url());
        Ok(Box::new(HubClassifier {
            client,
            url: self.config.model_url(),
            token,
        }))
    }
}

pub struct HubClassifier {
    client: Client,
    url: String,
    token: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// The API nests rankings per input for batched calls, flat otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_ranking(self) -> Vec<LabelScore> {
        let mut ranking = match self {
            Self::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(ranking) => ranking,
        };
        ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranking
    }
}

fn parse_ranking(body: &str) -> Result<Vec<LabelScore>> {
    let response: InferenceResponse =
        serde_json::from_str(body).context("Unexpected response shape from the model hub")?;
    Ok(response.into_ranking())
}

impl Classifier for HubClassifier {
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&InferenceRequest { inputs: text })
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        let body = response.text().context("Failed to read model hub response")?;
        if !status.is_success() {
            bail!("Model hub returned {status}: {body}");
        }

        parse_ranking(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_fails_initialization() {
        let provider = HubProvider::new(HubConfig::default());
        assert!(provider.initialize().is_err());

        let blank = HubProvider::new(HubConfig {
            api_token: Some("  ".to_string()),
            ..HubConfig::default()
        });
        assert!(blank.initialize().is_err());
    }

    #[test]
    fn test_model_url() {
        let config = HubConfig {
            endpoint: "http://localhost:8080/models/".to_string(),
            ..HubConfig::default()
        };
        assert_eq!(
            config.model_url(),
            "http://localhost:8080/models/j-hartmann/emotion-english-distilroberta-base"
        );
    }

    #[test]
    fn test_parse_batched_ranking_sorts_by_score() {
        let body = r#"[[{"label":"neutral","score":0.1},{"label":"joy","score":0.8},{"label":"fear","score":0.1}]]"#;
        let ranking = parse_ranking(body).unwrap();
        assert_eq!(ranking[0].label, "joy");
        assert_eq!(ranking.len(), 3);
    }

    #[test]
    fn test_parse_flat_ranking() {
        let body = r#"[{"label":"sadness","score":0.7},{"label":"anger","score":0.2}]"#;
        let ranking = parse_ranking(body).unwrap();
        assert_eq!(ranking[0].label, "sadness");
    }

    #[test]
    fn test_ranking_order_with_nan_score() {
        let score = |label: &str, score: f64| LabelScore { label: label.to_string(), score };
        let ranking = InferenceResponse::Flat(vec![
            score("calm", 0.2),
            score("broken", f64::NAN),
            score("joy", 0.9),
        ])
        .into_ranking();

        assert!(ranking[0].score.is_nan());
        assert_eq!(ranking[1].label, "joy");
        assert_eq!(ranking[2].label, "calm");
    }

    #[test]
    fn test_parse_rejects_error_payload() {
        assert!(parse_ranking(r#"{"error":"Model is currently loading"}"#).is_err());
    }
}
