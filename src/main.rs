//! # Moodtune
//!
//! Describe how you feel; moodtune detects the emotion with a hosted text
//! classification model and hands you a playlist for it. A simulated player
//! and a history of past analyses round it out.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze and keep the result
//! HF_API_TOKEN=... moodtune analyze "I'm so happy today!" --save
//!
//! # Look at the playlist and start playing
//! moodtune playlist
//! moodtune play
//! moodtune next
//!
//! # Browse history
//! moodtune history list --search happy
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::debug;
use moodtune::cli::{self, Command, HistoryAction};
use moodtune::config::RuntimeConfig;
use moodtune::emotion::EmotionDetector;
use moodtune::flow::{FlowError, MoodFlow, Route, Step};
use moodtune::history::HistoryFilter;
use moodtune::hub::{HubConfig, HubProvider};
use moodtune::session::PlaybackState;
use moodtune::store::SqliteStore;
use moodtune::{catalog, completion, view};

/// Print the hint for a redirect, or hand the value on.
fn ready<T>(step: Step<T>) -> Option<T> {
    match step {
        Step::Ready(value) => Some(value),
        Step::Redirect(route) => {
            println!("{}", view::redirect_hint(route));
            None
        }
    }
}

fn show_playback(state: Option<PlaybackState>) {
    match state {
        Some(state) => print!("{}", view::render_player(&state)),
        None => println!("{}", view::redirect_hint(Route::Player)),
    }
}

fn runtime_config(args: &cli::Args) -> Result<RuntimeConfig> {
    let mut config = match &args.db {
        Some(path) => RuntimeConfig::with_store_path(path.clone()),
        None => RuntimeConfig::new()?,
    };
    config.hub = HubConfig {
        endpoint: args.hub.endpoint.clone(),
        model: args.hub.model.clone(),
        api_token: args.hub.hub_token.clone(),
        timeout_secs: args.hub.timeout_secs,
    };
    Ok(config)
}

/// Main entry point.
///
/// Initializes logging, builds the store and the detector, and routes the
/// command. Logging is controlled via `RUST_LOG`, e.g.
/// `RUST_LOG=moodtune=debug moodtune analyze "..."`.
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    if let Command::Completion { shell } = &args.command {
        let mut cmd = cli::Args::command();
        completion::generate_completions(shell, &mut cmd, &mut std::io::stdout());
        return Ok(());
    }

    let config = runtime_config(&args)?;
    debug!("Using store at {}", config.store_path.display());

    let store = SqliteStore::open(&config.store_path)?;
    let detector = EmotionDetector::new(Box::new(HubProvider::new(config.hub.clone())));
    let mut flow = MoodFlow::new(&store, detector);

    match run(args.command, &mut flow) {
        Err(FlowError::EmptyInput) => {
            eprintln!("{}", FlowError::EmptyInput);
            std::process::exit(2);
        }
        other => other.context("Command failed")?,
    }

    Ok(())
}

fn run(command: Command, flow: &mut MoodFlow<'_>) -> Result<(), FlowError> {
    let session = flow.session();
    let history = flow.history();

    match command {
        Command::Analyze { text, save } => {
            let result = flow.analyze(&text)?;
            print!("{}", view::render_result(&result));
            if save {
                if let Some(entry) = ready(flow.save_to_history()?) {
                    println!("Saved to history as #{}", entry.id);
                }
            }
        }
        Command::Result => {
            if let Some(result) = ready(flow.current_result()?) {
                print!("{}", view::render_result(&result));
            }
        }
        Command::Save => {
            if let Some(entry) = ready(flow.save_to_history()?) {
                println!("Saved to history as #{}", entry.id);
            }
        }
        Command::Playlist { emotion: Some(emotion) } => {
            print!("{}", view::render_playlist(&emotion, catalog::playlist_for(&emotion)));
        }
        Command::Playlist { emotion: None } => {
            if let Some(selection) = ready(flow.view_playlist()?) {
                let playing = session
                    .current_playback()?
                    .filter(|p| p.playlist_name == selection.playlist.name)
                    .map(|p| p.track_index);
                print!("{}", view::render_selection(&selection, playing));
            }
        }
        Command::Play { track } => {
            let step = match track {
                Some(number) => flow.play_track(number.get() - 1)?,
                None => flow.play_all()?,
            };
            if let Some(state) = ready(step) {
                print!("{}", view::render_player(&state));
            }
        }
        Command::Player => show_playback(session.current_playback()?),
        Command::Pause => show_playback(session.toggle_play_pause()?),
        Command::Next => show_playback(session.next_track()?),
        Command::Prev => show_playback(session.previous_track()?),
        Command::Shuffle => show_playback(session.toggle_shuffle()?),
        Command::Repeat => show_playback(session.cycle_repeat_mode()?),
        Command::Like => show_playback(session.toggle_like()?),
        Command::History { action } => match action {
            HistoryAction::List { search, emotion } => {
                let entries = history.list(&HistoryFilter { search, emotion })?;
                print!("{}", view::render_history(&entries));
            }
            HistoryAction::Delete { id } => {
                if history.delete_by_id(id)? {
                    println!("Deleted #{id}");
                } else {
                    println!("No history entry #{id}");
                }
            }
            HistoryAction::Clear => {
                history.clear()?;
                println!("History cleared");
            }
            HistoryAction::Stats => {
                print!(
                    "{}",
                    view::render_stats(
                        history.len()?,
                        history.unique_emotion_count()?,
                        &history.summary_stats()?
                    )
                );
            }
            HistoryAction::Replay { id } => {
                if let Some(result) = ready(flow.replay(id)?) {
                    print!("{}", view::render_result(&result));
                }
            }
        },
        Command::Catalog => {
            for key in catalog::emotion_keys() {
                print!("{}", view::render_playlist(key, catalog::playlist_for(key)));
                println!();
            }
        }
        Command::Reset => {
            session.clear_all()?;
            println!("Session cleared (history kept)");
        }
        Command::Completion { .. } => {}
    }

    Ok(())
}
