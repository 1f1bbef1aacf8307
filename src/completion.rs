//! # Shell Completion Module
//!
//! Completion scripts for moodtune, generated from the clap definitions.
//!
//! ```bash
//! moodtune completion bash > ~/.local/share/bash-completion/completions/moodtune
//! moodtune completion zsh > ~/.config/zsh/completions/_moodtune
//! ```

use crate::cli;
use clap::Command;
use clap_complete::{generate, Shell as CompletionShell};
use std::io::Write;

/// Write the completion script for `shell` to `out`.
pub fn generate_completions(shell: &cli::Shell, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(shell_to_completion_shell(shell), cmd, name, out);
}

/// Convert our shell enum to clap_complete's.
#[must_use]
pub fn shell_to_completion_shell(shell: &cli::Shell) -> CompletionShell {
    match shell {
        cli::Shell::Bash => CompletionShell::Bash,
        cli::Shell::Zsh => CompletionShell::Zsh,
        cli::Shell::Fish => CompletionShell::Fish,
        cli::Shell::PowerShell => CompletionShell::PowerShell,
        cli::Shell::Elvish => CompletionShell::Elvish,
    }
}
