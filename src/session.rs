//! # Session and Playback State
//!
//! Three independent slots, each persisted under its own key so the next
//! command (or the next run) picks up where the last one left off:
//!
//! | slot               | key                | type                  |
//! |--------------------|--------------------|-----------------------|
//! | current result     | `emotionResult`    | [`EmotionResult`]     |
//! | current playlist   | `currentPlaylist`  | [`PlaylistSelection`] |
//! | current playback   | `currentlyPlaying` | [`PlaybackState`]     |
//!
//! An empty slot reads as `None`. Callers send the user back to the start of
//! the relevant flow in that case (see [`crate::flow`]).
//!
//! ## Simulated player
//!
//! The playback controls only rewrite the [`PlaybackState`] record. There is
//! no audio. Transitions are plain methods on [`PlaybackState`]; [`Session`]
//! loads, applies and saves.

use crate::catalog::{self, Playlist, Track};
use crate::emotion::EmotionResult;
use crate::store::{
    load_json, save_json, KeyValueStore, CURRENTLY_PLAYING_KEY, CURRENT_PLAYLIST_KEY,
    EMOTION_RESULT_KEY,
};
use anyhow::Result;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The playlist picked for an analysis, as shown on the playlist view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSelection {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub emotion: String,
    pub timestamp: String,
}

/// Repeat behaviour of the simulated player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// off → all → one → off
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        };
        f.write_str(name)
    }
}

/// What the simulated player is doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Playlist name.
    #[serde(rename = "playlist")]
    pub playlist_name: String,
    #[serde(rename = "song")]
    pub track: Track,
    #[serde(rename = "songIndex")]
    pub track_index: usize,
    pub is_playing: bool,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub repeat: RepeatMode,
    #[serde(default)]
    pub liked: bool,
}

impl PlaybackState {
    /// Start playing `playlist` at `index`. `None` if the index is out of range.
    #[must_use]
    pub fn start(playlist: &Playlist, index: usize) -> Option<Self> {
        let track = playlist.tracks.get(index)?.clone();
        Some(Self {
            playlist_name: playlist.name.clone(),
            track,
            track_index: index,
            is_playing: true,
            shuffle: false,
            repeat: RepeatMode::Off,
            liked: false,
        })
    }

    #[must_use]
    pub fn toggle_play_pause(mut self) -> Self {
        self.is_playing = !self.is_playing;
        self
    }

    #[must_use]
    pub fn toggle_shuffle(mut self) -> Self {
        self.shuffle = !self.shuffle;
        self
    }

    #[must_use]
    pub fn cycle_repeat_mode(mut self) -> Self {
        self.repeat = self.repeat.next();
        self
    }

    #[must_use]
    pub fn toggle_like(mut self) -> Self {
        self.liked = !self.liked;
        self
    }

    fn jump_to(mut self, playlist: &Playlist, index: usize) -> Self {
        if let Some(track) = playlist.tracks.get(index) {
            if index != self.track_index {
                self.liked = false;
            }
            self.track = track.clone();
            self.track_index = index;
        }
        self
    }

    /// Advance within `playlist`.
    ///
    /// - repeat one: stay on the current track
    /// - shuffle: a random other track
    /// - otherwise the following track; past the end it wraps to the first,
    ///   and with repeat off it pauses there
    #[must_use]
    pub fn next_track(self, playlist: &Playlist) -> Self {
        let len = playlist.tracks.len();
        if len == 0 || self.repeat == RepeatMode::One {
            return self;
        }

        if self.shuffle && len > 1 {
            let mut rng = rand::thread_rng();
            // skip over the current index
            let mut index = rng.gen_range(0..len - 1);
            if index >= self.track_index {
                index += 1;
            }
            return self.jump_to(playlist, index);
        }

        let index = self.track_index + 1;
        if index < len {
            return self.jump_to(playlist, index);
        }

        let stop = self.repeat == RepeatMode::Off;
        let mut state = self.jump_to(playlist, 0);
        if stop {
            state.is_playing = false;
        }
        state
    }

    /// Step back within `playlist`, wrapping to the last track.
    #[must_use]
    pub fn previous_track(self, playlist: &Playlist) -> Self {
        let len = playlist.tracks.len();
        if len == 0 {
            return self;
        }
        let index = if self.track_index == 0 || self.track_index >= len {
            len - 1
        } else {
            self.track_index - 1
        };
        self.jump_to(playlist, index)
    }
}

/// Persisted session slots.
pub struct Session<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn current_result(&self) -> Result<Option<EmotionResult>> {
        load_json(self.store, EMOTION_RESULT_KEY)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn set_current_result(&self, result: &EmotionResult) -> Result<()> {
        save_json(self.store, EMOTION_RESULT_KEY, result)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn clear_current_result(&self) -> Result<()> {
        self.store.remove(EMOTION_RESULT_KEY)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn current_playlist(&self) -> Result<Option<PlaylistSelection>> {
        load_json(self.store, CURRENT_PLAYLIST_KEY)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn set_current_playlist(&self, selection: &PlaylistSelection) -> Result<()> {
        save_json(self.store, CURRENT_PLAYLIST_KEY, selection)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn clear_current_playlist(&self) -> Result<()> {
        self.store.remove(CURRENT_PLAYLIST_KEY)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn current_playback(&self) -> Result<Option<PlaybackState>> {
        load_json(self.store, CURRENTLY_PLAYING_KEY)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn set_current_playback(&self, state: &PlaybackState) -> Result<()> {
        save_json(self.store, CURRENTLY_PLAYING_KEY, state)
    }

    /// # Errors
    ///
    /// Store failures.
    pub fn clear_current_playback(&self) -> Result<()> {
        self.store.remove(CURRENTLY_PLAYING_KEY)
    }

    /// Empty all three slots. History is left alone.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub fn clear_all(&self) -> Result<()> {
        self.clear_current_result()?;
        self.clear_current_playlist()?;
        self.clear_current_playback()?;
        info!("Cleared session");
        Ok(())
    }

    /// Load playback, apply `transition`, save. `None` when nothing is playing.
    fn update_playback<F>(&self, transition: F) -> Result<Option<PlaybackState>>
    where
        F: FnOnce(PlaybackState) -> PlaybackState,
    {
        let Some(state) = self.current_playback()? else {
            debug!("No playback to update");
            return Ok(None);
        };
        let state = transition(state);
        self.set_current_playback(&state)?;
        Ok(Some(state))
    }

    /// Transition that needs the playlist's tracks; left unchanged if the
    /// playlist is no longer in the catalog.
    fn update_within_playlist<F>(&self, transition: F) -> Result<Option<PlaybackState>>
    where
        F: FnOnce(PlaybackState, &Playlist) -> PlaybackState,
    {
        self.update_playback(|state| match catalog::playlist_by_name(&state.playlist_name) {
            Some(playlist) => transition(state, playlist),
            None => {
                warn!("Playlist `{}' is not in the catalog", state.playlist_name);
                state
            }
        })
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn toggle_play_pause(&self) -> Result<Option<PlaybackState>> {
        self.update_playback(PlaybackState::toggle_play_pause)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn next_track(&self) -> Result<Option<PlaybackState>> {
        self.update_within_playlist(PlaybackState::next_track)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn previous_track(&self) -> Result<Option<PlaybackState>> {
        self.update_within_playlist(PlaybackState::previous_track)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn toggle_shuffle(&self) -> Result<Option<PlaybackState>> {
        self.update_playback(PlaybackState::toggle_shuffle)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn cycle_repeat_mode(&self) -> Result<Option<PlaybackState>> {
        self.update_playback(PlaybackState::cycle_repeat_mode)
    }

    /// # Errors
    ///
    /// Store failures, or a malformed stored value.
    pub fn toggle_like(&self) -> Result<Option<PlaybackState>> {
        self.update_playback(PlaybackState::toggle_like)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::playlist_for;
    use crate::store::MemoryStore;

    fn playing(index: usize) -> PlaybackState {
        PlaybackState::start(playlist_for("joy"), index).unwrap()
    }

    #[test]
    fn test_start_out_of_range() {
        assert!(PlaybackState::start(playlist_for("joy"), 4).is_none());
        assert_eq!(playing(2).track.title, "Can't Stop the Feeling!");
    }

    #[test]
    fn test_toggle_play_pause_twice_restores() {
        let state = playing(0);
        let twice = state.clone().toggle_play_pause().toggle_play_pause();
        assert_eq!(twice.is_playing, state.is_playing);
        assert!(!state.clone().toggle_play_pause().is_playing);
    }

    #[test]
    fn test_repeat_cycle() {
        let state = playing(0);
        let once = state.clone().cycle_repeat_mode();
        assert_eq!(once.repeat, RepeatMode::All);
        assert_eq!(once.clone().cycle_repeat_mode().repeat, RepeatMode::One);
        assert_eq!(
            state.clone().cycle_repeat_mode().cycle_repeat_mode().cycle_repeat_mode().repeat,
            state.repeat
        );
    }

    #[test]
    fn test_next_track_sequential() {
        let playlist = playlist_for("joy");
        let next = playing(0).next_track(playlist);
        assert_eq!(next.track_index, 1);
        assert_eq!(next.track, playlist.tracks[1]);
        assert!(next.is_playing);
    }

    #[test]
    fn test_next_track_at_end() {
        let playlist = playlist_for("joy");

        let stopped = playing(3).next_track(playlist);
        assert_eq!(stopped.track_index, 0);
        assert!(!stopped.is_playing);

        let looped = playing(3).cycle_repeat_mode().next_track(playlist);
        assert_eq!(looped.repeat, RepeatMode::All);
        assert_eq!(looped.track_index, 0);
        assert!(looped.is_playing);
    }

    #[test]
    fn test_next_track_repeat_one_stays() {
        let playlist = playlist_for("joy");
        let state = playing(2).cycle_repeat_mode().cycle_repeat_mode();
        assert_eq!(state.clone().next_track(playlist), state);
    }

    #[test]
    fn test_shuffle_never_repeats_current() {
        let playlist = playlist_for("love");
        let mut state = PlaybackState::start(playlist, 1).unwrap().toggle_shuffle();
        for _ in 0..50 {
            let previous = state.track_index;
            state = state.next_track(playlist);
            assert_ne!(state.track_index, previous);
            assert!(state.track_index < playlist.tracks.len());
        }
    }

    #[test]
    fn test_previous_track_wraps() {
        let playlist = playlist_for("joy");
        assert_eq!(playing(0).previous_track(playlist).track_index, 3);
        assert_eq!(playing(2).previous_track(playlist).track_index, 1);
    }

    #[test]
    fn test_like_resets_on_track_change() {
        let playlist = playlist_for("joy");
        let liked = playing(0).toggle_like();
        assert!(liked.liked);
        assert!(!liked.next_track(playlist).liked);
    }

    #[test]
    fn test_session_slots_are_independent() {
        let store = MemoryStore::new();
        let session = Session::new(&store);

        assert!(session.current_result().unwrap().is_none());
        assert!(session.current_playlist().unwrap().is_none());
        assert!(session.current_playback().unwrap().is_none());

        session.set_current_playback(&playing(1)).unwrap();
        session.set_current_result(&EmotionResult::fallback("meh")).unwrap();
        session.clear_current_result().unwrap();

        assert!(session.current_result().unwrap().is_none());
        assert_eq!(session.current_playback().unwrap(), Some(playing(1)));
    }

    #[test]
    fn test_session_controls_persist() {
        let store = MemoryStore::new();
        let session = Session::new(&store);

        assert!(session.toggle_play_pause().unwrap().is_none());

        session.set_current_playback(&playing(0)).unwrap();
        session.toggle_play_pause().unwrap();
        session.next_track().unwrap();
        session.toggle_shuffle().unwrap();
        session.cycle_repeat_mode().unwrap();

        let state = session.current_playback().unwrap().unwrap();
        assert!(!state.is_playing);
        assert_eq!(state.track_index, 1);
        assert!(state.shuffle);
        assert_eq!(state.repeat, RepeatMode::All);
    }

    #[test]
    fn test_unknown_playlist_leaves_state() {
        let store = MemoryStore::new();
        let session = Session::new(&store);
        let mut state = playing(0);
        state.playlist_name = "Gone".to_string();
        session.set_current_playback(&state).unwrap();

        assert_eq!(session.next_track().unwrap(), Some(state));
    }

    #[test]
    fn test_playback_shape_on_disk() {
        let json = serde_json::to_value(playing(0)).unwrap();
        assert_eq!(json["playlist"], "Happy Vibes");
        assert_eq!(json["songIndex"], 0);
        assert_eq!(json["isPlaying"], true);
        assert_eq!(json["repeat"], "off");

        let minimal = r#"{"playlist":"Happy Vibes","song":{"title":"Happy","artist":"Pharrell Williams","duration":"3:53"},"songIndex":0,"isPlaying":true}"#;
        let state: PlaybackState = serde_json::from_str(minimal).unwrap();
        assert!(!state.shuffle);
        assert_eq!(state.repeat, RepeatMode::Off);
    }
}
