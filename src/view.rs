//! Plain-text rendering of results, playlists, the player and history for
//! the terminal.

use crate::catalog::{self, format_clock, format_total_duration, Playlist};
use crate::emotion::EmotionResult;
use crate::flow::Route;
use crate::history::HistoryEntry;
use crate::session::{PlaybackState, PlaylistSelection};
use std::fmt::Write;

/// Where the simulated progress bar sits, in percent of the track.
const DEMO_PROGRESS_PERCENT: u32 = 30;

/// Prompts offered to someone who has not analyzed anything yet.
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "I feel so happy and energetic today! The sun is shining and everything seems possible.",
    "I'm feeling a bit down and just want to listen to something calming and peaceful.",
    "I'm angry and frustrated about everything that went wrong today.",
    "I feel nostalgic and want to remember good times from the past.",
    "I'm excited about my upcoming vacation and can't contain my joy!",
];

/// Hint printed when a command has nothing to show.
#[must_use]
pub fn redirect_hint(route: Route) -> String {
    match route {
        Route::MoodInput => {
            let mut out = String::from("Nothing analyzed yet. Start with: moodtune analyze ");
            out.push_str("\"how you feel\"\nTry one of these:");
            for prompt in EXAMPLE_PROMPTS {
                let _ = write!(out, "\n  moodtune analyze \"{prompt}\"");
            }
            out
        }
        Route::Result => "No analysis selected. Run: moodtune result".to_string(),
        Route::Playlist => "No playlist selected. Run: moodtune playlist".to_string(),
        Route::Player => {
            "No music playing. Start playing music from a playlist: moodtune play".to_string()
        }
        Route::History => "No such history entry. See: moodtune history list".to_string(),
    }
}

#[must_use]
pub fn render_result(result: &EmotionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", result.emoji, result.emotion);
    let _ = writeln!(out, "═══════════════════");
    let _ = writeln!(out, "Confidence: {}%", result.confidence_percent());
    let _ = writeln!(out, "You wrote:  \"{}\"", result.source_text);
    let _ = writeln!(out, "Analyzed:   {}", result.timestamp);
    let _ = writeln!(
        out,
        "Playlist:   {}",
        catalog::playlist_for(&result.emotion).name
    );
    out
}

fn render_tracks(out: &mut String, playlist: &Playlist, playing: Option<usize>) {
    for (i, track) in playlist.tracks.iter().enumerate() {
        let marker = if playing == Some(i) { "▶" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:>2}. {} - {} ({})",
            i + 1,
            track.title,
            track.artist,
            track.duration
        );
    }
}

/// Catalog playlist without any analysis attached.
#[must_use]
pub fn render_playlist(emotion: &str, playlist: &Playlist) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} · {} songs, {}",
        catalog::emoji_for_playlist_emotion(emotion),
        playlist.name,
        playlist.tracks.len(),
        format_total_duration(playlist.total_duration())
    );
    let _ = writeln!(out, "═══════════════════");
    render_tracks(&mut out, playlist, None);
    out
}

#[must_use]
pub fn render_selection(selection: &PlaylistSelection, playing: Option<usize>) -> String {
    let playlist = &selection.playlist;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})",
        catalog::emoji_for_playlist_emotion(&selection.emotion),
        playlist.name,
        selection.emotion
    );
    let _ = writeln!(out, "═══════════════════");
    let _ = writeln!(
        out,
        "Curated for your {} mood • {} songs, {}",
        selection.emotion.to_lowercase(),
        playlist.tracks.len(),
        format_total_duration(playlist.total_duration())
    );
    render_tracks(&mut out, playlist, playing);
    let _ = writeln!(
        out,
        "Based on your {} emotion, these songs are designed to {}",
        selection.emotion.to_lowercase(),
        catalog::mood_blurb(&selection.emotion)
    );
    out
}

#[must_use]
pub fn render_player(state: &PlaybackState) -> String {
    let total = state.track.duration.as_secs();
    let elapsed = total * DEMO_PROGRESS_PERCENT / 100;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        if state.is_playing { "▶" } else { "⏸" },
        if state.is_playing { "Now Playing" } else { "Paused" }
    );
    let _ = writeln!(out, "═══════════════════");
    let _ = writeln!(out, "♫ Song:     {}", state.track.title);
    let _ = writeln!(out, "🎤 Artist:  {}", state.track.artist);
    let _ = writeln!(
        out,
        "📀 From:    \"{}\" (track {})",
        state.playlist_name,
        state.track_index + 1
    );
    let _ = writeln!(out, "⏱  Time:    {}/{}", format_clock(elapsed), format_clock(total));
    let _ = writeln!(
        out,
        "🔀 Shuffle: {}  🔁 Repeat: {}  {} ",
        if state.shuffle { "on" } else { "off" },
        state.repeat,
        if state.liked { "❤️" } else { "🤍" }
    );
    out
}

#[must_use]
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No emotion history yet. Start analyzing your emotions to build your mood history.\n"
            .to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "#{} {} {} ({}%) → {}",
            entry.id,
            entry.result.emoji,
            entry.result.emotion,
            entry.result.confidence_percent(),
            entry.playlist_name
        );
        let _ = writeln!(out, "    \"{}\"", entry.result.source_text);
        let _ = writeln!(out, "    {}", entry.result.timestamp);
    }
    out
}

#[must_use]
pub fn render_stats(total: usize, unique: usize, top: &[(String, usize)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Your Emotional Journey");
    let _ = writeln!(out, "═══════════════════");
    let _ = writeln!(out, "Total analyses:    {total}");
    let _ = writeln!(out, "Different emotions: {unique}");
    if let Some((emotion, _)) = top.first() {
        let _ = writeln!(out, "Most common:       {emotion}");
    }
    for (emotion, count) in top {
        let _ = writeln!(out, "  {emotion:<12} {count}");
    }
    out
}
