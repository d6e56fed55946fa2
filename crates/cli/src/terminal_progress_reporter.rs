//! Terminal output for gitdeps commands
//!
//! Every line a command prints goes through [`TerminalProgressReporter`], so
//! message kinds look the same across commands. Prefixes fall back to plain
//! text markers on terminals without Unicode support, and styling is only
//! applied when colors are enabled.
//!
//! Errors and warnings go to stderr; everything else goes to stdout so that
//! `package list` and `specifier decode` can be piped.

use std::fmt::Display;

use console::{Emoji, style};

static ERROR_EMOJI: Emoji<'_, '_> = Emoji("❌ ", "[E] ");
static INFO_EMOJI: Emoji<'_, '_> = Emoji("ℹ️ ", "[I] ");
static PROGRESS_EMOJI: Emoji<'_, '_> = Emoji("• ", " • ");
static SUGGESTION_EMOJI: Emoji<'_, '_> = Emoji("✨", "-> ");
static SUCCESS_EMOJI: Emoji<'_, '_> = Emoji("✅ ", "OK ");
static WARN_EMOJI: Emoji<'_, '_> = Emoji("⚠️ ", "[W] ");

/// Kinds of status line, each with its own prefix and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MessageType {
    Error,
    Info,
    /// A backend operation was issued or is still running
    Progress,
    Success,
    Suggestion,
    Warning,
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalProgressReporter {
    use_colors: bool,
}

impl TerminalProgressReporter {
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    #[must_use]
    pub(crate) fn use_colors(self) -> bool {
        self.use_colors
    }

    /// Prefix `message` and style it for `message_type`
    pub(crate) fn status_line(self, message_type: MessageType, message: impl Display) -> String {
        let prefix = match message_type {
            MessageType::Error => ERROR_EMOJI,
            MessageType::Info => INFO_EMOJI,
            MessageType::Progress => PROGRESS_EMOJI,
            MessageType::Success => SUCCESS_EMOJI,
            MessageType::Suggestion => SUGGESTION_EMOJI,
            MessageType::Warning => WARN_EMOJI,
        };

        if !self.use_colors {
            return format!("{prefix}{message}");
        }

        let formatted_message = match message_type {
            MessageType::Error => style(message).for_stderr().red().bold().to_string(),
            MessageType::Info => style(message).blue().to_string(),
            MessageType::Progress => style(message).dim().to_string(),
            MessageType::Success => style(message).green().to_string(),
            MessageType::Suggestion => {
                return format!(
                    "{prefix} {}: {}",
                    style("Suggestion").yellow().bold(),
                    &message
                );
            }
            MessageType::Warning => style(message).for_stderr().yellow().bold().to_string(),
        };

        format!("{prefix}{formatted_message}")
    }

    /// `message` behind `indent` spaces, unstyled
    pub(crate) fn format(indent: usize, message: impl Display) -> String {
        format!("{:indent$}{}", "", message, indent = indent)
    }

    pub(crate) fn format_error(self, message: impl Display) -> String {
        self.status_line(MessageType::Error, message)
    }

    pub(crate) fn format_warning(self, message: impl Display) -> String {
        self.status_line(MessageType::Warning, message)
    }

    pub(crate) fn report(indent: usize, message: impl Display) {
        println!("{}", Self::format(indent, message));
    }

    pub(crate) fn report_progress(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Progress, message));
    }

    pub(crate) fn report_success(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Success, message));
    }

    pub(crate) fn report_suggestion(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Suggestion, message));
    }

    pub(crate) fn report_info(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Info, message));
    }

    pub(crate) fn report_warning(self, message: impl Display) {
        eprintln!("{}", self.format_warning(message));
    }

    pub(crate) fn report_error(self, message: impl Display) {
        eprintln!("{}", self.format_error(message));
    }
}
