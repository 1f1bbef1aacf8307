//! # Mood Flow
//!
//! Wires the pieces together in the order a user walks through them:
//!
//! ```text
//! text ──analyze──▶ current result ──open_playlist──▶ current playlist ──play──▶ playback
//!                        │
//!                        └──save_to_history──▶ history ──replay──▶ current result
//! ```
//!
//! Each step reads what the previous one left in the [`Session`]. When that
//! is missing the step returns [`Step::Redirect`] naming where the user should
//! start over; it is not an error.

use crate::catalog::{self, Playlist};
use crate::emotion::{EmotionDetector, EmotionResult};
use crate::history::{HistoryEntry, HistoryStore};
use crate::session::{PlaybackState, PlaylistSelection, Session};
use crate::store::KeyValueStore;
use log::{info, warn};
use std::fmt;
use thiserror::Error;

/// Entry points a missing-state read sends the user back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    MoodInput,
    Result,
    Playlist,
    Player,
    History,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MoodInput => "mood input",
            Self::Result => "result",
            Self::Playlist => "playlist",
            Self::Player => "player",
            Self::History => "history",
        };
        f.write_str(name)
    }
}

/// Either the data a view needs, or where to go instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    Ready(T),
    Redirect(Route),
}

impl<T> Step<T> {
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Redirect(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Please enter your feelings: share how you're feeling so we can find the perfect music for you")]
    EmptyInput,
    #[error("Track {index} is out of range for `{playlist}' ({len} tracks)")]
    TrackOutOfRange {
        playlist: String,
        index: usize,
        len: usize,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// The application's composition root: one store, one detector.
pub struct MoodFlow<'a> {
    store: &'a dyn KeyValueStore,
    detector: EmotionDetector,
}

impl<'a> MoodFlow<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore, detector: EmotionDetector) -> Self {
        Self { store, detector }
    }

    #[must_use]
    pub fn session(&self) -> Session<'a> {
        Session::new(self.store)
    }

    #[must_use]
    pub fn history(&self) -> HistoryStore<'a> {
        HistoryStore::new(self.store)
    }

    /// Detect the emotion in `text` and make it the current result.
    ///
    /// # Errors
    ///
    /// [`FlowError::EmptyInput`] for blank text, in which case nothing is
    /// stored; [`FlowError::Store`] if the result cannot be saved.
    pub fn analyze(&mut self, text: &str) -> FlowResult<EmotionResult> {
        if text.trim().is_empty() {
            warn!("Rejected empty mood input");
            return Err(FlowError::EmptyInput);
        }

        let result = self.detector.detect(text);
        self.session().set_current_result(&result)?;
        info!(
            "Analyzed mood: {} {} ({}%)",
            result.emoji,
            result.emotion,
            result.confidence_percent()
        );
        Ok(result)
    }

    /// The current result, for the result view.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn current_result(&self) -> FlowResult<Step<EmotionResult>> {
        Ok(match self.session().current_result()? {
            Some(result) => Step::Ready(result),
            None => redirect(Route::MoodInput),
        })
    }

    /// Save the current result along with its playlist name.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn save_to_history(&self) -> FlowResult<Step<HistoryEntry>> {
        let Some(result) = self.session().current_result()? else {
            return Ok(redirect(Route::MoodInput));
        };
        let playlist_name = &catalog::playlist_for(&result.emotion).name;
        Ok(Step::Ready(self.history().append(result, playlist_name)?))
    }

    /// Pick the playlist for the current result and make it current.
    ///
    /// The selection carries the timestamp of the analysis it was picked for.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn open_playlist(&self) -> FlowResult<Step<PlaylistSelection>> {
        let session = self.session();
        let Some(result) = session.current_result()? else {
            return Ok(redirect(Route::MoodInput));
        };

        let selection = PlaylistSelection {
            playlist: catalog::playlist_for(&result.emotion).clone(),
            emotion: result.emotion,
            timestamp: result.timestamp,
        };
        session.set_current_playlist(&selection)?;
        info!("Opened playlist `{}'", selection.playlist.name);
        Ok(Step::Ready(selection))
    }

    /// The current playlist, for the playlist view.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn current_playlist(&self) -> FlowResult<Step<PlaylistSelection>> {
        Ok(match self.session().current_playlist()? {
            Some(selection) => Step::Ready(selection),
            None => redirect(Route::MoodInput),
        })
    }

    /// The playlist view: the stored selection if it was picked for the
    /// current result, otherwise a fresh pick through [`Self::open_playlist`].
    /// With no current result the stored selection is shown as is.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn view_playlist(&self) -> FlowResult<Step<PlaylistSelection>> {
        let session = self.session();
        let Some(result) = session.current_result()? else {
            return self.current_playlist();
        };

        match session.current_playlist()? {
            Some(selection)
                if selection.timestamp == result.timestamp
                    && selection.emotion == result.emotion =>
            {
                Ok(Step::Ready(selection))
            }
            _ => self.open_playlist(),
        }
    }

    /// Start the current playlist from its first track.
    ///
    /// # Errors
    ///
    /// Store failures; [`FlowError::TrackOutOfRange`] for an empty playlist.
    pub fn play_all(&self) -> FlowResult<Step<PlaybackState>> {
        self.play_track(0)
    }

    /// Start the current playlist at `index`.
    ///
    /// # Errors
    ///
    /// Store failures; [`FlowError::TrackOutOfRange`] if `index` is past the
    /// end.
    pub fn play_track(&self, index: usize) -> FlowResult<Step<PlaybackState>> {
        let session = self.session();
        let Some(selection) = session.current_playlist()? else {
            return Ok(redirect(Route::MoodInput));
        };

        let state = start(&selection.playlist, index)?;
        session.set_current_playback(&state)?;
        info!(
            "Now playing `{}' by {} from `{}'",
            state.track.title, state.track.artist, state.playlist_name
        );
        Ok(Step::Ready(state))
    }

    /// Make a saved analysis current again.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn replay(&self, id: i64) -> FlowResult<Step<EmotionResult>> {
        let Some(entry) = self.history().get(id)? else {
            warn!("No history entry #{id} to replay");
            return Ok(redirect(Route::History));
        };
        self.session().set_current_result(&entry.result)?;
        Ok(Step::Ready(entry.result))
    }
}

fn start(playlist: &Playlist, index: usize) -> FlowResult<PlaybackState> {
    PlaybackState::start(playlist, index).ok_or_else(|| FlowError::TrackOutOfRange {
        playlist: playlist.name.clone(),
        index,
        len: playlist.tracks.len(),
    })
}

fn redirect<T>(route: Route) -> Step<T> {
    warn!("Nothing to show here; redirecting to {route}");
    Step::Redirect(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{Classifier, ClassifierProvider, LabelScore};
    use crate::store::{MemoryStore, ALL_KEYS};
    use anyhow::Result;

    struct Scripted(&'static str);

    impl Classifier for Scripted {
        fn classify(&self, _text: &str) -> Result<Vec<LabelScore>> {
            Ok(vec![LabelScore { label: self.0.to_string(), score: 0.88 }])
        }
    }

    impl ClassifierProvider for Scripted {
        fn initialize(&self) -> Result<Box<dyn Classifier>> {
            Ok(Box::new(Scripted(self.0)))
        }
    }

    fn flow<'a>(store: &'a MemoryStore, label: &'static str) -> MoodFlow<'a> {
        MoodFlow::new(store, EmotionDetector::new(Box::new(Scripted(label))))
    }

    #[test]
    fn test_empty_input_mutates_nothing() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "joy");

        assert!(matches!(flow.analyze("   \n\t"), Err(FlowError::EmptyInput)));
        assert!(matches!(flow.analyze(""), Err(FlowError::EmptyInput)));
        for key in ALL_KEYS {
            assert!(store.get(key).unwrap().is_none());
        }
    }

    #[test]
    fn test_missing_state_redirects() {
        let store = MemoryStore::new();
        let flow = flow(&store, "joy");

        assert_eq!(flow.current_result().unwrap(), Step::Redirect(Route::MoodInput));
        assert_eq!(flow.open_playlist().unwrap(), Step::Redirect(Route::MoodInput));
        assert_eq!(flow.save_to_history().unwrap(), Step::Redirect(Route::MoodInput));
        assert_eq!(flow.play_all().unwrap(), Step::Redirect(Route::MoodInput));
        assert_eq!(flow.replay(42).unwrap(), Step::Redirect(Route::History));
    }

    #[test]
    fn test_full_walkthrough() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "sadness");

        let result = flow.analyze("It's been a grey week").unwrap();
        assert_eq!(result.emotion, "Sadness");

        let selection = flow.open_playlist().unwrap().ready().unwrap();
        assert_eq!(selection.playlist.name, "Melancholy Moods");
        assert_eq!(selection.emotion, "Sadness");

        let entry = flow.save_to_history().unwrap().ready().unwrap();
        assert_eq!(entry.playlist_name, "Melancholy Moods");

        let state = flow.play_track(2).unwrap().ready().unwrap();
        assert_eq!(state.track.title, "Hurt");
        assert_eq!(flow.session().current_playback().unwrap(), Some(state));
    }

    #[test]
    fn test_play_out_of_range() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "love");
        flow.analyze("Thinking of you").unwrap();
        flow.open_playlist().unwrap();

        let err = flow.play_track(9).unwrap_err();
        assert!(matches!(err, FlowError::TrackOutOfRange { index: 9, len: 4, .. }));
        assert!(flow.session().current_playback().unwrap().is_none());
    }

    #[test]
    fn test_replay_restores_result() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "anger");
        let original = flow.analyze("Traffic again").unwrap();
        let entry = flow.save_to_history().unwrap().ready().unwrap();

        flow.session().clear_current_result().unwrap();
        let replayed = flow.replay(entry.id).unwrap().ready().unwrap();

        assert_eq!(replayed, original);
        assert_eq!(flow.session().current_result().unwrap(), Some(original));
    }

    fn stamp(store: &MemoryStore, timestamp: &str) {
        let session = Session::new(store);
        let mut result = session.current_result().unwrap().unwrap();
        result.timestamp = timestamp.to_string();
        session.set_current_result(&result).unwrap();
    }

    #[test]
    fn test_playlist_keeps_analysis_timestamp() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "joy");
        flow.analyze("Sunny and free").unwrap();
        stamp(&store, "2026-10-12T07:30:00.000Z");
        let entry = flow.save_to_history().unwrap().ready().unwrap();

        let selection = flow.open_playlist().unwrap().ready().unwrap();
        assert_eq!(selection.timestamp, "2026-10-12T07:30:00.000Z");

        flow.analyze("Something else").unwrap();
        let fresh = flow.current_result().unwrap().ready().unwrap();
        assert_ne!(fresh.timestamp, entry.result.timestamp);

        let replayed = flow.replay(entry.id).unwrap().ready().unwrap();
        let selection = flow.open_playlist().unwrap().ready().unwrap();
        assert_eq!(selection.timestamp, replayed.timestamp);
        assert_eq!(selection.timestamp, "2026-10-12T07:30:00.000Z");
    }

    #[test]
    fn test_view_playlist_reuses_matching_selection() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "love");
        flow.analyze("Date night").unwrap();
        let opened = flow.open_playlist().unwrap().ready().unwrap();

        assert_eq!(flow.view_playlist().unwrap(), Step::Ready(opened.clone()));

        flow.session().clear_current_result().unwrap();
        assert_eq!(flow.view_playlist().unwrap(), Step::Ready(opened));

        flow.session().clear_current_playlist().unwrap();
        assert_eq!(flow.view_playlist().unwrap(), Step::Redirect(Route::MoodInput));
    }

    #[test]
    fn test_view_playlist_repicks_for_new_result() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "joy");
        flow.analyze("Great news").unwrap();
        flow.open_playlist().unwrap();
        stamp(&store, "2026-10-19T09:00:00.000Z");

        let selection = flow.view_playlist().unwrap().ready().unwrap();
        assert_eq!(selection.timestamp, "2026-10-19T09:00:00.000Z");
        assert_eq!(flow.current_playlist().unwrap(), Step::Ready(selection));
    }

    #[test]
    fn test_unknown_emotion_gets_calm_playlist() {
        let store = MemoryStore::new();
        let mut flow = flow(&store, "fear");
        flow.analyze("Exam tomorrow").unwrap();

        let selection = flow.open_playlist().unwrap().ready().unwrap();
        assert_eq!(selection.playlist.name, "Peaceful Moments");
        assert_eq!(selection.emotion, "Fear");
    }
}
