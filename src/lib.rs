//! Mood-to-music: detect an emotion in free text and pick a playlist for it.
//!
//! Core modules:
//! - [`emotion`] - Classifier adapter with a neutral fallback
//! - [`catalog`] - Static emotion → playlist table
//! - [`history`] - Capped log of saved analyses
//! - [`session`] - Current result, playlist and simulated playback
//! - [`flow`] - The steps a user walks through, wired together
//!
//! ### Supporting Modules
//!
//! - [`store`] - Key-value store (SQLite or in-memory) with typed JSON access
//! - [`hub`] - Hosted classifier over the model hub's inference API
//! - [`config`] - Configuration and data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`view`] - Terminal rendering
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use moodtune::emotion::EmotionDetector;
//! use moodtune::flow::MoodFlow;
//! use moodtune::hub::{HubConfig, HubProvider};
//! use moodtune::store::SqliteStore;
//!
//! let store = SqliteStore::open(&moodtune::config::get_store_path()?)?;
//! let detector = EmotionDetector::new(Box::new(HubProvider::new(HubConfig {
//!     api_token: std::env::var("HF_API_TOKEN").ok(),
//!     ..HubConfig::default()
//! })));
//! let mut flow = MoodFlow::new(&store, detector);
//!
//! let result = flow.analyze("I finally finished my thesis!")?;
//! println!("{} {} ({}%)", result.emoji, result.emotion, result.confidence_percent());
//!
//! if let Some(selection) = flow.open_playlist()?.ready() {
//!     println!("Playlist: {}", selection.playlist.name);
//! }
//! flow.save_to_history()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Persisted State
//!
//! Four keys, each one JSON document:
//!
//! - `emotionResult` - the current analysis
//! - `emotionHistory` - up to 20 saved analyses, newest first
//! - `currentPlaylist` - the playlist picked for the current analysis
//! - `currentlyPlaying` - the simulated player
//!
//! ## Error Handling
//!
//! Library functions return `anyhow::Result`, except the [`flow`] steps, which
//! return [`flow::FlowError`] so callers can tell empty input apart from store
//! failures. A classifier that is unavailable is not an error: detection
//! falls back to Neutral and logs why.
//!
//! ## Logging
//!
//! All modules log through the `log` facade; the binary installs
//! `env_logger`, so `RUST_LOG=moodtune=debug` shows store traffic.

pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod emotion;
pub mod flow;
pub mod history;
pub mod hub;
pub mod session;
pub mod store;
pub mod view;
