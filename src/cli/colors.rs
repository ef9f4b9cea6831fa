//! Terminal colors for honeycomb-cleaner
//!
//! Color support detection that respects `NO_COLOR`, `FORCE_COLOR`, dumb
//! terminals and piped output, plus the semantic styles used by the
//! reporter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use honeycomb_cleaner::cli::colors::{CleanerStyles, ColorSupport};
//!
//! ColorSupport::detect().apply();
//! println!("{}", CleanerStyles::ok("OK"));
//! ```

use colored::{ColoredString, Colorize};
use std::io::IsTerminal;

// ============================================================================
// Color Support Detection
// ============================================================================

/// Level of color support detected for the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    /// No color support (NO_COLOR set, TERM=dumb, piped output)
    None,
    /// Basic 16-color support
    Basic,
    /// True color (24-bit) support
    TrueColor,
}

impl ColorSupport {
    /// Detect color support from the process environment and stdout.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(
            |key| std::env::var(key).ok(),
            std::io::stdout().is_terminal(),
        )
    }

    /// Detection against an arbitrary variable source.
    pub fn detect_from<F>(lookup: F, is_tty: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // https://no-color.org/
        if lookup("NO_COLOR").is_some() {
            return Self::None;
        }

        if lookup("FORCE_COLOR").is_some() {
            return Self::level(&lookup);
        }

        if !is_tty {
            return Self::None;
        }

        if lookup("TERM").is_some_and(|term| term == "dumb") {
            return Self::None;
        }

        Self::level(&lookup)
    }

    fn level<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("COLORTERM").as_deref() {
            Some("truecolor" | "24bit") => Self::TrueColor,
            _ => Self::Basic,
        }
    }

    #[must_use]
    pub const fn has_color(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Make `colored` follow this detection result process-wide.
    pub fn apply(self) {
        colored::control::set_override(self.has_color());
    }
}

impl Default for ColorSupport {
    fn default() -> Self {
        Self::detect()
    }
}

// ============================================================================
// Semantic Styles
// ============================================================================

/// Styles used by the cleaner's console output.
pub struct CleanerStyles;

impl CleanerStyles {
    /// Section headings (blue, bold)
    pub fn heading<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().blue().bold()
    }

    /// Environment and dataset names
    pub fn name<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().green()
    }

    /// Destructive-mode banners (red, bold)
    pub fn danger<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().red().bold()
    }

    pub fn ok<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().green().bold()
    }

    pub fn failed<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().red()
    }

    /// Non-fatal errors the run continues past
    pub fn warning<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().yellow()
    }

    /// Suggested follow-up commands
    pub fn hint<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().cyan()
    }

    pub fn muted<S: AsRef<str>>(text: S) -> ColoredString {
        text.as_ref().dimmed()
    }

    /// Arrow (→) prefixing error details
    pub fn arrow() -> ColoredString {
        "→".dimmed()
    }
}
