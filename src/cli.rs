//! # Command-Line Interface Module
//!
//! Clap definitions for moodtune. Each command stands for one screen of the
//! mood-to-music flow and works on the state the previous command left
//! behind.
//!
//! ## Commands
//!
//! - `analyze`: Detect the emotion in a piece of text
//! - `result`: Show the current analysis
//! - `playlist`: Show the playlist for the current analysis
//! - `play`, `pause`, `next`, `prev`, `shuffle`, `repeat`, `like`: Simulated player
//! - `history`: Browse, search and prune saved analyses
//!
//! ## Examples
//!
//! ```bash
//! moodtune analyze "I'm excited about my upcoming vacation!" --save
//! moodtune playlist
//! moodtune play 2
//! moodtune history list --emotion joy
//! ```

use crate::hub::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser)]
#[command(name = "moodtune")]
#[command(about = "Moodtune: describe how you feel, get a playlist for it")]
#[command(version)]
pub struct Args {
    /// Store file (defaults to the platform data directory)
    #[arg(long, global = true, env = "MOODTUNE_DB")]
    pub db: Option<PathBuf>,

    #[command(flatten)]
    pub hub: HubArgs,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Model hub connection options.
#[derive(ClapArgs, Debug)]
pub struct HubArgs {
    /// API token for the model hub
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hub_token: Option<String>,

    /// Text-classification model to use
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Inference endpoint base URL
    #[arg(long, global = true, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Detect the emotion in a description of how you feel
    ///
    /// The result becomes the current analysis. If the model cannot be
    /// reached, the analysis falls back to Neutral.
    Analyze {
        /// How you're feeling, in your own words
        text: String,

        /// Also save the analysis to history
        #[arg(long)]
        save: bool,
    },

    /// Show the current analysis
    Result,

    /// Save the current analysis to history
    Save,

    /// Show the playlist for the current analysis
    ///
    /// With --emotion, browse the catalog playlist for that emotion instead,
    /// without touching the current analysis.
    Playlist {
        /// Emotion to look up (joy, sadness, anger, calm, excited, love)
        #[arg(long)]
        emotion: Option<String>,
    },

    /// Play the current playlist
    ///
    /// Starts at the given track number (1-based), or the first track.
    Play {
        /// Track number within the playlist, starting at 1
        track: Option<NonZeroUsize>,
    },

    /// Show what the player is doing
    Player,

    /// Toggle play/pause
    Pause,

    /// Skip to the next track
    Next,

    /// Go back to the previous track
    Prev,

    /// Toggle shuffle
    Shuffle,

    /// Cycle repeat mode (off, all, one)
    Repeat,

    /// Like or unlike the current track
    Like,

    /// Manage saved analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// List every playlist in the catalog
    Catalog,

    /// Forget the current analysis, playlist and playback
    ///
    /// History is kept. Also clears values that can no longer be read.
    Reset,

    /// Generate shell completions
    ///
    /// Usage: moodtune completion bash > ~/.local/share/bash-completion/completions/moodtune
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// History management actions
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List saved analyses, newest first
    List {
        /// Search text, emotions and playlist names
        #[arg(short, long)]
        search: Option<String>,

        /// Only show one emotion ("all" for every emotion)
        #[arg(short, long)]
        emotion: Option<String>,
    },

    /// Delete one entry
    Delete {
        /// Entry id as shown by `history list`
        id: i64,
    },

    /// Delete every entry
    Clear,

    /// Show the most frequent emotions
    Stats,

    /// Make a saved analysis current again
    Replay {
        /// Entry id as shown by `history list`
        id: i64,
    },
}
