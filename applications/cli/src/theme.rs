//! Light and dark terminal palettes

use crossterm::style::{Color, Stylize};
use serde::{Deserialize, Serialize};
use simo_core::Severity;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                accent: Color::DarkBlue,
                muted: Color::DarkGrey,
                success: Color::DarkGreen,
                info: Color::DarkCyan,
                warning: Color::DarkYellow,
                error: Color::DarkRed,
            },
            Self::Dark => Palette {
                accent: Color::Cyan,
                muted: Color::Grey,
                success: Color::Green,
                info: Color::Blue,
                warning: Color::Yellow,
                error: Color::Red,
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// Foreground colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub muted: Color,
    pub success: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.success,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
        }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        text.with(color).to_string()
    }

    pub fn accent(&self, text: &str) -> String {
        text.with(self.accent).bold().to_string()
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, self.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }

    #[test]
    fn parse_theme() {
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn palettes_differ() {
        let light = Theme::Light.palette();
        let dark = Theme::Dark.palette();
        assert_ne!(light.accent, dark.accent);
        assert_eq!(dark.severity(Severity::Error), Color::Red);
    }

    #[test]
    fn painted_text_keeps_content() {
        let palette = Theme::Dark.palette();
        assert!(palette.paint("3 file(s) uploaded", palette.success).contains("3 file(s) uploaded"));
    }
}
