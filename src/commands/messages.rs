//! Player-facing message templates.
//!
//! Templates use `%prefix%` for the configured chat prefix and `&` colour
//! codes, which [`color`] turns into the host's section-sign codes.
//! Cooldown messages also take `%days%`, `%hours%`, `%minutes%` and
//! `%seconds%`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result};

/// Configurable message templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub must_be_a_player: String,
    pub no_permission: String,
    pub active_cooldown: String,
    pub unknown_command: String,
    pub help_header: String,
    /// One line per command: `%command%` and `%description%`.
    pub help_entry: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            must_be_a_player: "%prefix% &7You must be a player to execute this command.".to_string(),
            no_permission: "%prefix% &7You don't have permission for that.".to_string(),
            active_cooldown:
                "%prefix% &7You are on cooldown for %hours% hours, %minutes% minutes, and %seconds% seconds."
                    .to_string(),
            unknown_command: "%prefix% &7Unknown command.".to_string(),
            help_header: "%prefix% &7Commands:".to_string(),
            help_entry: "&e/%command%&7: %description%".to_string(),
        }
    }
}

impl Messages {
    /// Load templates from a JSON file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| EngineError::io(path, e))
    }
}

/// Substitute `%prefix%` and colour the result.
#[must_use]
pub fn render(template: &str, prefix: &str) -> String {
    color(&template.replace("%prefix%", prefix))
}

/// Fill the `%days%`..`%seconds%` placeholders with a duration.
#[must_use]
pub fn format_duration(template: &str, duration: Duration) -> String {
    let total = duration.as_secs();
    template
        .replace("%days%", &(total / 86_400).to_string())
        .replace("%hours%", &(total / 3_600 % 24).to_string())
        .replace("%minutes%", &(total / 60 % 60).to_string())
        .replace("%seconds%", &(total % 60).to_string())
}

/// Translate `&` colour and format codes to section-sign codes.
///
/// An `&` not followed by a valid code character is left alone.
#[must_use]
pub fn color(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '&' && is_code(next) => out.push('\u{a7}'),
            _ => out.push(c),
        }
    }
    out
}

fn is_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}
