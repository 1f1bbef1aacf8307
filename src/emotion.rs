//! # Emotion Classifier Adapter
//!
//! Turns free text into an [`EmotionResult`] using an injected text
//! classification capability.
//!
//! The capability is split in two, mirroring how hosted models are used:
//!
//! - [`ClassifierProvider`] knows how to bring a model up (load weights, build
//!   an HTTP client, ...). It may fail.
//! - [`Classifier`] is the live handle. It returns a ranking of labels; only
//!   the first entry is used.
//!
//! [`EmotionDetector`] owns one provider and at most one handle. The handle is
//! created on first use and then reused. If bringing it up fails, the failure
//! is logged and the next call tries again.
//!
//! ## Degrading gracefully
//!
//! Detection never fails. Whatever goes wrong with the model, the caller gets
//! the neutral fallback:
//!
//! ```text
//! { emotion: "Neutral", score: 0.5, emoji: "😐", color: "emotion-calm" }
//! ```

use anyhow::{bail, Result};
use chrono::{SecondsFormat, Utc};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

/// Label used by the fallback result.
pub const NEUTRAL_LABEL: &str = "Neutral";

/// Score used by the fallback result.
pub const FALLBACK_SCORE: f64 = 0.5;

/// One entry of a classifier ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// A live classification model.
pub trait Classifier {
    /// Rank labels for `text`, best first.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying model (network, bad response, ...).
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>>;
}

/// Brings a [`Classifier`] up.
pub trait ClassifierProvider {
    /// # Errors
    ///
    /// Returns an error if the model cannot be made available.
    fn initialize(&self) -> Result<Box<dyn Classifier>>;
}

/// Emoji and color token used to present an emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionStyle {
    pub emoji: &'static str,
    pub color_token: &'static str,
}

const NEUTRAL_STYLE: EmotionStyle = EmotionStyle {
    emoji: "😐",
    color_token: "emotion-calm",
};

/// Presentation for a lower-case label; unknown labels look neutral.
#[must_use]
pub fn style_for(label: &str) -> EmotionStyle {
    let (emoji, color_token) = match label {
        "joy" | "happiness" => ("😊", "emotion-joy"),
        "sadness" => ("😢", "emotion-sad"),
        "anger" => ("😠", "emotion-angry"),
        "fear" => ("😨", "emotion-sad"),
        "surprise" => ("😲", "emotion-excited"),
        "disgust" => ("🤢", "emotion-angry"),
        "love" => ("❤️", "emotion-love"),
        "calm" => ("😌", "emotion-calm"),
        "excited" => ("🤩", "emotion-excited"),
        _ => return NEUTRAL_STYLE,
    };
    EmotionStyle { emoji, color_token }
}

/// Upper-case the first character, leave the rest alone.
#[must_use]
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Outcome of one analysis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    /// Capitalized label, e.g. `Joy`.
    pub emotion: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
    pub emoji: String,
    #[serde(rename = "color")]
    pub color_token: String,
    /// What the user wrote.
    #[serde(rename = "text")]
    pub source_text: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

impl EmotionResult {
    fn new(label: &str, score: f64, source_text: &str) -> Self {
        let key = label.to_lowercase();
        let style = style_for(&key);
        Self {
            emotion: capitalize(&key),
            score: score.clamp(0.0, 1.0),
            emoji: style.emoji.to_string(),
            color_token: style.color_token.to_string(),
            source_text: source_text.to_string(),
            timestamp: now_timestamp(),
        }
    }

    /// The result handed out when the model is unavailable.
    #[must_use]
    pub fn fallback(source_text: &str) -> Self {
        Self {
            emotion: NEUTRAL_LABEL.to_string(),
            score: FALLBACK_SCORE,
            emoji: NEUTRAL_STYLE.emoji.to_string(),
            color_token: NEUTRAL_STYLE.color_token.to_string(),
            source_text: source_text.to_string(),
            timestamp: now_timestamp(),
        }
    }

    /// Score as a whole percentage.
    #[must_use]
    pub fn confidence_percent(&self) -> u32 {
        // score is clamped to [0, 1]
        (self.score * 100.0).round() as u32
    }
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Detects emotions with a lazily brought-up classifier.
pub struct EmotionDetector {
    provider: Box<dyn ClassifierProvider>,
    handle: Option<Box<dyn Classifier>>,
}

impl EmotionDetector {
    #[must_use]
    pub fn new(provider: Box<dyn ClassifierProvider>) -> Self {
        Self {
            provider,
            handle: None,
        }
    }

    /// Whether the classifier has been brought up.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.handle.is_some()
    }

    /// Classify `text`. Never fails; see the module docs.
    ///
    /// The caller rejects empty input before getting here.
    pub fn detect(&mut self, text: &str) -> EmotionResult {
        match self.try_detect(text) {
            Ok(result) => {
                debug!(
                    "Detected `{}' ({:.3}) for {} chars of input",
                    result.emotion,
                    result.score,
                    text.len()
                );
                result
            }
            Err(err) => {
                error!("Error detecting emotion: {err:#}");
                warn!("Falling back to `{NEUTRAL_LABEL}'");
                EmotionResult::fallback(text)
            }
        }
    }

    fn classifier(&mut self) -> Result<&dyn Classifier> {
        if self.handle.is_none() {
            match self.provider.initialize() {
                Ok(handle) => self.handle = Some(handle),
                Err(err) => {
                    error!("Failed to initialize emotion detection: {err:#}");
                    bail!("Emotion classifier not initialized");
                }
            }
        }
        match self.handle.as_deref() {
            Some(handle) => Ok(handle),
            None => bail!("Emotion classifier not initialized"),
        }
    }

    fn try_detect(&mut self, text: &str) -> Result<EmotionResult> {
        let ranking = self.classifier()?.classify(text)?;

        let Some(top) = ranking.first() else {
            bail!("Classifier returned no labels");
        };
        if !top.score.is_finite() {
            bail!("Classifier returned a non-finite score for `{}'", top.label);
        }

        Ok(EmotionResult::new(&top.label, top.score, text))
    }
}
