//! # Emotion → Playlist Catalog
//!
//! A fixed, hand-curated table mapping each supported emotion to a playlist.
//! Lookups are pure and case-insensitive; anything outside the vocabulary
//! resolves to the calm playlist.
//!
//! ## Vocabulary
//!
//! | key       | playlist           | color token       |
//! |-----------|--------------------|-------------------|
//! | `joy`     | Happy Vibes        | `emotion-joy`     |
//! | `sadness` | Melancholy Moods   | `emotion-sad`     |
//! | `anger`   | Rage Release       | `emotion-angry`   |
//! | `calm`    | Peaceful Moments   | `emotion-calm`    |
//! | `excited` | Energy Boost       | `emotion-excited` |
//! | `love`    | Love Songs         | `emotion-love`    |

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Key used when a lookup misses.
pub const DEFAULT_EMOTION_KEY: &str = "calm";

/// Emotion keys in display order.
const EMOTION_KEYS: [&str; 6] = ["joy", "sadness", "anger", "calm", "excited", "love"];

/// Length of a track, stored as `M:SS`.
///
/// Seconds are always in `0..=59`; parsing rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackDuration {
    minutes: u32,
    seconds: u32,
}

impl TrackDuration {
    /// Build a duration, rejecting seconds outside `0..=59`.
    ///
    /// # Errors
    ///
    /// Returns an error when `seconds` is 60 or more.
    pub fn new(minutes: u32, seconds: u32) -> Result<Self> {
        if seconds > 59 {
            bail!("Seconds out of range in track duration: {minutes}:{seconds}");
        }
        Ok(Self { minutes, seconds })
    }

    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    #[must_use]
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Total length in seconds.
    #[must_use]
    pub fn as_secs(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for TrackDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

impl FromStr for TrackDuration {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (minutes, seconds) = s
            .split_once(':')
            .with_context(|| format!("Track duration `{s}' is not in M:SS form"))?;

        let minutes: u32 = minutes
            .parse()
            .with_context(|| format!("Invalid minutes in track duration `{s}'"))?;

        if seconds.len() != 2 {
            bail!("Track duration `{s}' must have two-digit seconds");
        }
        let seconds: u32 = seconds
            .parse()
            .with_context(|| format!("Invalid seconds in track duration `{s}'"))?;

        Self::new(minutes, seconds)
    }
}

impl TryFrom<String> for TrackDuration {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TrackDuration> for String {
    fn from(duration: TrackDuration) -> Self {
        duration.to_string()
    }
}

/// A single catalog entry. Static; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub duration: TrackDuration,
}

/// An ordered list of tracks curated for one emotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(rename = "songs")]
    pub tracks: Vec<Track>,
    #[serde(rename = "color")]
    pub color_token: String,
}

impl Playlist {
    /// Sum of all track lengths, in seconds.
    #[must_use]
    pub fn total_duration(&self) -> u32 {
        self.tracks.iter().map(|t| t.duration.as_secs()).sum()
    }
}

fn track(title: &str, artist: &str, minutes: u32, seconds: u32) -> Track {
    Track {
        title: title.to_string(),
        artist: artist.to_string(),
        duration: TrackDuration { minutes, seconds },
    }
}

fn playlist(name: &str, color_token: &str, tracks: Vec<Track>) -> Playlist {
    Playlist {
        name: name.to_string(),
        tracks,
        color_token: color_token.to_string(),
    }
}

fn build_catalog() -> HashMap<&'static str, Playlist> {
    let mut catalog = HashMap::new();

    catalog.insert(
        "joy",
        playlist(
            "Happy Vibes",
            "emotion-joy",
            vec![
                track("Happy", "Pharrell Williams", 3, 53),
                track("Good as Hell", "Lizzo", 2, 39),
                track("Can't Stop the Feeling!", "Justin Timberlake", 3, 56),
                track("Walking on Sunshine", "Katrina and the Waves", 3, 59),
            ],
        ),
    );
    catalog.insert(
        "sadness",
        playlist(
            "Melancholy Moods",
            "emotion-sad",
            vec![
                track("Someone Like You", "Adele", 4, 45),
                track("Mad World", "Gary Jules", 3, 7),
                track("Hurt", "Johnny Cash", 3, 38),
                track("Black", "Pearl Jam", 5, 43),
            ],
        ),
    );
    catalog.insert(
        "anger",
        playlist(
            "Rage Release",
            "emotion-angry",
            vec![
                track("Break Stuff", "Limp Bizkit", 2, 47),
                track("Bodies", "Drowning Pool", 3, 23),
                track("Killing in the Name", "Rage Against the Machine", 5, 14),
                track("Freak on a Leash", "Korn", 4, 15),
            ],
        ),
    );
    catalog.insert(
        "calm",
        playlist(
            "Peaceful Moments",
            "emotion-calm",
            vec![
                track("Weightless", "Marconi Union", 8, 8),
                track("Clair de Lune", "Claude Debussy", 5, 2),
                track("River", "Joni Mitchell", 4, 0),
                track("Mad About You", "Sting", 3, 56),
            ],
        ),
    );
    catalog.insert(
        "excited",
        playlist(
            "Energy Boost",
            "emotion-excited",
            vec![
                track("Uptown Funk", "Mark Ronson ft. Bruno Mars", 4, 30),
                track("I Gotta Feeling", "The Black Eyed Peas", 4, 5),
                track("Don't Stop Me Now", "Queen", 3, 29),
                track("Mr. Blue Sky", "Electric Light Orchestra", 5, 3),
            ],
        ),
    );
    catalog.insert(
        "love",
        playlist(
            "Love Songs",
            "emotion-love",
            vec![
                track("Perfect", "Ed Sheeran", 4, 23),
                track("All of Me", "John Legend", 4, 29),
                track("Thinking Out Loud", "Ed Sheeran", 4, 41),
                track("Make You Feel My Love", "Bob Dylan", 3, 32),
            ],
        ),
    );

    catalog
}

lazy_static::lazy_static! {
    static ref CATALOG: HashMap<&'static str, Playlist> = build_catalog();
}

/// Playlist for an emotion label, ignoring case.
///
/// Unrecognized labels get the calm playlist; this is not an error.
///
/// # Examples
///
/// ```
/// use moodtune::catalog::playlist_for;
///
/// let playlist = playlist_for("JOY");
/// assert_eq!(playlist.name, "Happy Vibes");
/// assert_eq!(playlist.tracks.len(), 4);
///
/// assert_eq!(playlist_for("fear").name, "Peaceful Moments");
/// ```
#[must_use]
pub fn playlist_for(emotion_label: &str) -> &'static Playlist {
    let key = emotion_label.trim().to_lowercase();
    match CATALOG.get(key.as_str()) {
        Some(playlist) => playlist,
        None => {
            log::trace!("No playlist for `{key}', using `{DEFAULT_EMOTION_KEY}'");
            &CATALOG[DEFAULT_EMOTION_KEY]
        }
    }
}

/// Reverse lookup by playlist name (exact match).
#[must_use]
pub fn playlist_by_name(name: &str) -> Option<&'static Playlist> {
    CATALOG.values().find(|p| p.name == name)
}

/// Supported emotion keys, in display order.
#[must_use]
pub fn emotion_keys() -> &'static [&'static str] {
    &EMOTION_KEYS
}

/// Badge shown next to a playlist. Unknown emotions get a note.
#[must_use]
pub fn emoji_for_playlist_emotion(emotion_label: &str) -> &'static str {
    match emotion_label.trim().to_lowercase().as_str() {
        "joy" => "😊",
        "sadness" => "😢",
        "anger" => "😠",
        "calm" => "😌",
        "excited" => "🤩",
        "love" => "❤️",
        _ => "🎵",
    }
}

/// One-line description of what a playlist is meant to do for the listener.
#[must_use]
pub fn mood_blurb(emotion_label: &str) -> &'static str {
    match emotion_label.trim().to_lowercase().as_str() {
        "joy" => "amplify your happiness and keep your energy high.",
        "sadness" => "provide comfort and help you process your feelings.",
        "anger" => "help you channel your energy or find calm.",
        "calm" => "maintain your peaceful state and enhance relaxation.",
        "excited" => "match your high energy and enthusiasm.",
        "love" => "celebrate your feelings of love and connection.",
        _ => "complement your current emotional state.",
    }
}

/// `1h 5m` when an hour or longer, otherwise `23m`.
#[must_use]
pub fn format_total_duration(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// `M:SS` clock display for a position in seconds.
#[must_use]
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
