//! Terminal colours for command output.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Styles for the semantic parts of command output.
pub struct Style;

impl Style {
    /// Section headers.
    pub fn header<T: Display>(text: T) -> String {
        format!("{}", text.bold())
    }

    /// Primary values such as room titles.
    pub fn value<T: Display>(text: T) -> String {
        format!("{}", text.cyan())
    }

    /// Supplementary info such as ids and language names.
    pub fn secondary<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    pub fn success<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    /// Language codes.
    pub fn code<T: Display>(text: T) -> String {
        format!("{}", text.yellow())
    }

    pub fn hint<T: Display>(text: T) -> String {
        format!("{}", text.dimmed().italic())
    }
}
