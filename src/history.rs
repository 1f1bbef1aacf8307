//! # Emotion History
//!
//! A capped log of saved analyses, newest first, stored as one JSON array
//! under [`EMOTION_HISTORY_KEY`].
//!
//! - At most [`MAX_ENTRIES`] entries are kept; appending beyond that drops the
//!   oldest.
//! - Ids come from the creation time in milliseconds and are bumped past the
//!   largest stored id, so they stay unique and increasing.
//! - Every operation reads the whole array and, if it changes anything,
//!   writes the whole array back.

use crate::emotion::EmotionResult;
use crate::store::{load_json, save_json, KeyValueStore, EMOTION_HISTORY_KEY};
use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Retention cap.
pub const MAX_ENTRIES: usize = 20;

/// Emotion filter value meaning "any emotion".
pub const ALL_EMOTIONS: &str = "all";

/// Number of rows returned by [`HistoryStore::summary_stats`].
const TOP_EMOTIONS: usize = 5;

/// A saved analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(flatten)]
    pub result: EmotionResult,
    #[serde(rename = "playlist")]
    pub playlist_name: String,
}

/// Criteria for [`HistoryStore::list`]. Both are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the text, emotion or playlist name.
    pub search: Option<String>,
    /// Case-insensitive emotion name, or `"all"`.
    pub emotion: Option<String>,
}

impl HistoryFilter {
    #[must_use]
    pub fn search(text: &str) -> Self {
        Self {
            search: Some(text.to_string()),
            emotion: None,
        }
    }

    #[must_use]
    pub fn emotion(emotion: &str) -> Self {
        Self {
            search: None,
            emotion: Some(emotion.to_string()),
        }
    }

    fn matches(&self, entry: &HistoryEntry) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                entry.result.source_text.to_lowercase().contains(&term)
                    || entry.result.emotion.to_lowercase().contains(&term)
                    || entry.playlist_name.to_lowercase().contains(&term)
            }
        };

        let emotion_ok = match self.emotion.as_deref() {
            None => true,
            Some(e) if e.eq_ignore_ascii_case(ALL_EMOTIONS) => true,
            Some(e) => entry.result.emotion.to_lowercase() == e.to_lowercase(),
        };

        search_ok && emotion_ok
    }
}

/// History operations over a key-value store.
pub struct HistoryStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> HistoryStore<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(load_json(self.store, EMOTION_HISTORY_KEY)?.unwrap_or_default())
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        save_json(self.store, EMOTION_HISTORY_KEY, &entries)
    }

    /// Save `result` as the newest entry.
    ///
    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn append(&self, result: EmotionResult, playlist_name: &str) -> Result<HistoryEntry> {
        let mut entries = self.load()?;

        let now = Utc::now().timestamp_millis();
        let id = entries
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(now, |latest| now.max(latest + 1));

        let entry = HistoryEntry {
            id,
            result,
            playlist_name: playlist_name.to_string(),
        };

        entries.insert(0, entry.clone());
        entries.truncate(MAX_ENTRIES);
        self.save(&entries)?;

        info!(
            "Saved `{}' to history as #{id} ({} entries)",
            entry.result.emotion,
            entries.len()
        );
        Ok(entry)
    }

    /// Entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn list(&self, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>> {
        let entries = self.load()?;
        debug!("Filtering {} history entries with {filter:?}", entries.len());
        Ok(entries.into_iter().filter(|e| filter.matches(e)).collect())
    }

    /// Every entry, newest first.
    ///
    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn all(&self) -> Result<Vec<HistoryEntry>> {
        self.load()
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn get(&self, id: i64) -> Result<Option<HistoryEntry>> {
        Ok(self.load()?.into_iter().find(|e| e.id == id))
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove the entry with `id`. Absent ids are ignored.
    ///
    /// Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            debug!("No history entry #{id}");
            return Ok(false);
        }

        self.save(&entries)?;
        info!("Deleted history entry #{id}");
        Ok(true)
    }

    /// Drop everything. Does not read the stored value, so it also recovers
    /// from a malformed history.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(EMOTION_HISTORY_KEY)?;
        info!("Cleared history");
        Ok(())
    }

    /// The five most frequent emotions with their counts, most frequent
    /// first. Ties keep the order in which the emotions first appear.
    ///
    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn summary_stats(&self) -> Result<Vec<(String, usize)>> {
        let entries = self.load()?;

        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in &entries {
            match counts.iter_mut().find(|(e, _)| *e == entry.result.emotion) {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.result.emotion.clone(), 1)),
            }
        }

        // stable sort keeps first-seen order among ties
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(TOP_EMOTIONS);
        Ok(counts)
    }

    /// Distinct emotions, in first-seen (newest first) order.
    ///
    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn unique_emotions(&self) -> Result<Vec<String>> {
        let mut seen: Vec<String> = Vec::new();
        for entry in self.load()? {
            if !seen.contains(&entry.result.emotion) {
                seen.push(entry.result.emotion);
            }
        }
        Ok(seen)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored history.
    pub fn unique_emotion_count(&self) -> Result<usize> {
        Ok(self.unique_emotions()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn result(emotion: &str, text: &str) -> EmotionResult {
        EmotionResult {
            emotion: emotion.to_string(),
            score: 0.9,
            emoji: "😊".to_string(),
            color_token: "emotion-joy".to_string(),
            source_text: text.to_string(),
            timestamp: "2026-10-19T08:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_append_prepends_with_unique_ids() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);

        let first = history.append(result("Joy", "one"), "Happy Vibes").unwrap();
        let second = history.append(result("Joy", "two"), "Happy Vibes").unwrap();

        assert!(second.id > first.id);
        let entries = history.all().unwrap();
        assert_eq!(entries[0].result.source_text, "two");
        assert_eq!(entries[1].result.source_text, "one");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);

        for i in 0..MAX_ENTRIES {
            history.append(result("Joy", &format!("entry {i}")), "Happy Vibes").unwrap();
        }
        assert_eq!(history.len().unwrap(), MAX_ENTRIES);

        history.append(result("Joy", "newest"), "Happy Vibes").unwrap();
        let entries = history.all().unwrap();

        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].result.source_text, "newest");
        assert!(entries.iter().all(|e| e.result.source_text != "entry 0"));
        assert_eq!(entries[MAX_ENTRIES - 1].result.source_text, "entry 1");
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        let entry = history.append(result("Anger", "ugh"), "Rage Release").unwrap();

        let before = history.all().unwrap();
        assert!(!history.delete_by_id(entry.id + 1000).unwrap());
        assert_eq!(history.all().unwrap(), before);

        assert!(history.delete_by_id(entry.id).unwrap());
        assert!(history.is_empty().unwrap());
        assert!(!history.delete_by_id(entry.id).unwrap());
    }

    #[test]
    fn test_filters() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        history.append(result("Joy", "Sunny morning"), "Happy Vibes").unwrap();
        history.append(result("Sadness", "Rainy afternoon"), "Melancholy Moods").unwrap();
        history.append(result("Joy", "Great dinner"), "Happy Vibes").unwrap();

        let unfiltered = history.list(&HistoryFilter::default()).unwrap();
        assert_eq!(history.list(&HistoryFilter::emotion("all")).unwrap(), unfiltered);
        assert_eq!(history.list(&HistoryFilter::emotion("ALL")).unwrap(), unfiltered);

        let joy = history.list(&HistoryFilter::emotion("joy")).unwrap();
        assert_eq!(joy.len(), 2);
        assert_eq!(joy[0].result.source_text, "Great dinner");

        assert_eq!(history.list(&HistoryFilter::search("RAINY")).unwrap().len(), 1);
        assert_eq!(history.list(&HistoryFilter::search("happy vibes")).unwrap().len(), 2);
        assert_eq!(history.list(&HistoryFilter::search("   ")).unwrap().len(), 3);

        let both = HistoryFilter {
            search: Some("sunny".to_string()),
            emotion: Some("Sadness".to_string()),
        };
        assert!(history.list(&both).unwrap().is_empty());
    }

    #[test]
    fn test_emotion_filter_is_exact() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        history.append(result("Joy", "a"), "Happy Vibes").unwrap();

        assert!(history.list(&HistoryFilter::emotion("jo")).unwrap().is_empty());
    }

    #[test]
    fn test_summary_stats() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        for emotion in ["Joy", "Fear", "Sadness", "Joy", "Anger", "Love", "Surprise", "Sadness", "Joy"] {
            history.append(result(emotion, "x"), "p").unwrap();
        }

        let stats = history.summary_stats().unwrap();
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[0], ("Joy".to_string(), 3));
        assert_eq!(stats[1], ("Sadness".to_string(), 2));
        // newest first among the singletons
        assert_eq!(stats[2], ("Surprise".to_string(), 1));

        assert_eq!(history.unique_emotion_count().unwrap(), 6);
        assert_eq!(history.unique_emotions().unwrap()[0], "Joy");
    }

    #[test]
    fn test_clear_recovers_from_malformed_history() {
        let store = MemoryStore::new();
        store.set(EMOTION_HISTORY_KEY, "[{\"id\":").unwrap();
        let history = HistoryStore::new(&store);

        assert!(history.list(&HistoryFilter::default()).is_err());
        history.clear().unwrap();
        assert!(history.is_empty().unwrap());
    }

    #[test]
    fn test_entry_shape_on_disk() {
        let store = MemoryStore::new();
        let history = HistoryStore::new(&store);
        history.append(result("Joy", "hi"), "Happy Vibes").unwrap();

        let raw = store.get(EMOTION_HISTORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value[0];

        assert!(entry["id"].is_i64());
        assert_eq!(entry["emotion"], "Joy");
        assert_eq!(entry["text"], "hi");
        assert_eq!(entry["playlist"], "Happy Vibes");
    }
}
