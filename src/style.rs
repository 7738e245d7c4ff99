//! Style registry – the fixed set of named text styles used by every section
//! of the prescription document.

use serde::{Deserialize, Serialize};

/// Every text run in the document carries one of these roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleRole {
    DoctorName,
    SectionHeader,
    TableHeader,
    SubHeader,
    Body,
}

/// Fully resolved text style for a role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSpec {
    pub family: FontFamily,
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub color: Color,
}

impl StyleSpec {
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.style == FontStyle::Italic
    }
}

/// Leading applied to every role, as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Look up the style for a role.
pub fn style_for(role: StyleRole) -> StyleSpec {
    match role {
        StyleRole::DoctorName => StyleSpec {
            family: FontFamily::Times,
            size: 16.0,
            weight: FontWeight::Bold,
            style: FontStyle::Italic,
            color: Color::BLUE,
        },
        StyleRole::SectionHeader => StyleSpec {
            family: FontFamily::Helvetica,
            size: 10.0,
            weight: FontWeight::Bold,
            style: FontStyle::Normal,
            color: Color::BLACK,
        },
        StyleRole::TableHeader => StyleSpec {
            family: FontFamily::Helvetica,
            size: 8.0,
            weight: FontWeight::Bold,
            style: FontStyle::Normal,
            color: Color::BLACK,
        },
        StyleRole::SubHeader => StyleSpec {
            family: FontFamily::Helvetica,
            size: 7.0,
            weight: FontWeight::Bold,
            style: FontStyle::Normal,
            color: Color::BLUE,
        },
        StyleRole::Body => StyleSpec {
            family: FontFamily::Helvetica,
            size: 7.0,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            color: Color::BLACK,
        },
    }
}

// ---------------------------------------------------------------------------
// Supporting enums
// ---------------------------------------------------------------------------

/// Builtin PDF font families available to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Helvetica,
    Times,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const BLUE: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };

    /// Gray of the given level, 0.0 = black, 1.0 = white.
    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
            a: 1.0,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Fill behind section title bands.
pub const BAND_FILL: Color = Color::gray(0.7);
