// SPDX-License-Identifier: MIT
//
// Screen configuration.
//
// A plain struct with sensible defaults, optionally overridden from the
// environment. The variables follow curses conventions where one exists
// (`ESCDELAY`, `TERM`) and the `NO_COLOR` convention for monochrome.

use std::env;
use std::time::Duration;

use crate::acs::AcsStyle;
use crate::error::{Result, TermError};

/// Whether color pairs are rendered or collapsed to default colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    /// Emit SGR 30–37 / 40–47 for registered pairs.
    #[default]
    Ansi,
    /// Ignore pairs; only bold reaches the terminal.
    Monochrome,
}

/// Tunables for [`Screen`](crate::screen::Screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenConfig {
    /// How long a lone ESC waits for the rest of an escape sequence
    /// before it is delivered as the Escape key. Default: 25ms.
    pub escape_delay: Duration,

    /// How often a blocked `getch` wakes up to check for a terminal
    /// resize. Default: 50ms.
    pub resize_poll: Duration,

    /// Switch to the alternate screen while active. Default: on.
    pub alt_screen: bool,

    /// Ignore SIGINT while active. Default: on.
    pub ignore_interrupt: bool,

    /// Color rendering.
    pub colors: ColorSupport,

    /// Line-drawing glyph set.
    pub acs: AcsStyle,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            escape_delay: Duration::from_millis(25),
            resize_poll: Duration::from_millis(50),
            alt_screen: true,
            ignore_interrupt: true,
            colors: ColorSupport::Ansi,
            acs: AcsStyle::Unicode,
        }
    }
}

impl ScreenConfig {
    /// Defaults overridden by the process environment.
    ///
    /// | Variable | Effect |
    /// |---|---|
    /// | `ESCDELAY` | escape delay in milliseconds |
    /// | `NO_COLOR` (non-empty) / `TERM=dumb` | monochrome |
    /// | `SARASWATI_ACS` | `unicode` or `ascii` |
    /// | `SARASWATI_ALT_SCREEN` | `0` / `1` |
    /// | `LC_ALL` / `LC_CTYPE` / `LANG` | no UTF-8 mention → ASCII glyphs |
    ///
    /// # Errors
    ///
    /// [`TermError::InvalidConfig`] if a variable is set to something
    /// unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading variables through
    /// `lookup`, so tests don't have to touch the real environment.
    ///
    /// # Errors
    ///
    /// [`TermError::InvalidConfig`] on unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup("ESCDELAY") {
            let ms: u64 = value.trim().parse().map_err(|_| TermError::InvalidConfig {
                var: "ESCDELAY",
                value: value.clone(),
            })?;
            config.escape_delay = Duration::from_millis(ms);
        }

        let no_color = lookup("NO_COLOR").is_some_and(|v| !v.is_empty());
        let dumb = lookup("TERM").is_some_and(|t| t == "dumb");
        if no_color || dumb {
            config.colors = ColorSupport::Monochrome;
        }

        if !locale_is_utf8(&lookup) {
            config.acs = AcsStyle::Ascii;
        }
        if let Some(value) = lookup("SARASWATI_ACS") {
            let style = match value.trim().to_ascii_lowercase().as_str() {
                "unicode" | "utf8" | "utf-8" => Some(AcsStyle::Unicode),
                "ascii" => Some(AcsStyle::Ascii),
                _ => None,
            };
            config.acs = style.ok_or(TermError::InvalidConfig {
                var: "SARASWATI_ACS",
                value,
            })?;
        }

        if let Some(value) = lookup("SARASWATI_ALT_SCREEN") {
            let enabled = match value.trim() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" => Some(false),
                _ => None,
            };
            config.alt_screen = enabled.ok_or(TermError::InvalidConfig {
                var: "SARASWATI_ALT_SCREEN",
                value,
            })?;
        }

        Ok(config)
    }
}

/// The first set locale variable decides; an unset locale counts as UTF-8
/// since every terminal we target defaults to it.
fn locale_is_utf8(lookup: &impl Fn(&str) -> Option<String>) -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .into_iter()
        .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        .is_none_or(|locale| {
            let locale = locale.to_ascii_lowercase();
            locale.contains("utf-8") || locale.contains("utf8")
        })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = ScreenConfig::default();
        assert_eq!(config.escape_delay, Duration::from_millis(25));
        assert!(config.alt_screen);
        assert!(config.ignore_interrupt);
        assert_eq!(config.colors, ColorSupport::Ansi);
        assert_eq!(config.acs, AcsStyle::Unicode);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ScreenConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ScreenConfig::default());
    }

    #[test]
    fn escdelay_is_milliseconds() {
        let config = ScreenConfig::from_lookup(lookup_from(&[("ESCDELAY", "100")])).unwrap();
        assert_eq!(config.escape_delay, Duration::from_millis(100));
    }

    #[test]
    fn escdelay_garbage_is_an_error() {
        let err = ScreenConfig::from_lookup(lookup_from(&[("ESCDELAY", "fast")])).unwrap_err();
        assert!(matches!(err, TermError::InvalidConfig { var: "ESCDELAY", .. }));
    }

    #[test]
    fn no_color_means_monochrome() {
        let config = ScreenConfig::from_lookup(lookup_from(&[("NO_COLOR", "1")])).unwrap();
        assert_eq!(config.colors, ColorSupport::Monochrome);
    }

    #[test]
    fn empty_no_color_is_ignored() {
        let config = ScreenConfig::from_lookup(lookup_from(&[("NO_COLOR", "")])).unwrap();
        assert_eq!(config.colors, ColorSupport::Ansi);
    }

    #[test]
    fn dumb_terminal_means_monochrome() {
        let config = ScreenConfig::from_lookup(lookup_from(&[("TERM", "dumb")])).unwrap();
        assert_eq!(config.colors, ColorSupport::Monochrome);
    }

    #[test]
    fn non_utf8_locale_falls_back_to_ascii() {
        let config = ScreenConfig::from_lookup(lookup_from(&[("LANG", "C")])).unwrap();
        assert_eq!(config.acs, AcsStyle::Ascii);
    }

    #[test]
    fn lc_all_wins_over_lang() {
        let config =
            ScreenConfig::from_lookup(lookup_from(&[("LC_ALL", "en_US.UTF-8"), ("LANG", "C")]))
                .unwrap();
        assert_eq!(config.acs, AcsStyle::Unicode);
    }

    #[test]
    fn explicit_acs_overrides_locale() {
        let config = ScreenConfig::from_lookup(lookup_from(&[
            ("LANG", "C"),
            ("SARASWATI_ACS", "unicode"),
        ]))
        .unwrap();
        assert_eq!(config.acs, AcsStyle::Unicode);
    }

    #[test]
    fn unknown_acs_style_is_an_error() {
        let err =
            ScreenConfig::from_lookup(lookup_from(&[("SARASWATI_ACS", "fancy")])).unwrap_err();
        assert!(matches!(err, TermError::InvalidConfig { var: "SARASWATI_ACS", .. }));
    }

    #[test]
    fn alt_screen_toggle() {
        let config =
            ScreenConfig::from_lookup(lookup_from(&[("SARASWATI_ALT_SCREEN", "0")])).unwrap();
        assert!(!config.alt_screen);
    }
}
