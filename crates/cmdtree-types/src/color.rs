//! Output color and severity tags.
//!
//! The command engine never interprets these. They ride along with results
//! and history lines so a front-end can style them.

/// A color in RGBA format (0-255 per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GREY: Self = Self::rgb(160, 160, 160);
    pub const YELLOW: Self = Self::rgb(255, 210, 60);
    pub const RED: Self = Self::rgb(255, 80, 80);
}

/// How serious a piece of output is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Ordinary command output or echoed input.
    #[default]
    Normal,
    /// Something odd happened but the command still ran.
    Warning,
    /// The command failed or was skipped.
    Error,
}

impl Severity {
    /// Color a console would use when nothing more specific was requested.
    pub const fn default_color(self) -> Color {
        match self {
            Severity::Normal => Color::WHITE,
            Severity::Warning => Color::YELLOW,
            Severity::Error => Color::RED,
        }
    }

    /// Short label used by plain-text front-ends.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Normal => "",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}
