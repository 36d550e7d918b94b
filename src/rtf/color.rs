//! RTF color table management.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of colors the document template defines before any CSS color.
pub const EXISTING_COLORS: u32 = 5;

static COLOR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#?([0-9a-fA-F]{3}){1,2}$").expect("valid color regex"));

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red component
    pub red: u8,
    /// Green component
    pub green: u8,
    /// Blue component
    pub blue: u8,
}

/// Decode a 3- or 6-digit hex color (without `#`).
///
/// Shorthand digits are doubled, so `fff` and `ffffff` decode identically.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    match digits.as_slice() {
        [r1, r2, g1, g2, b1, b2] => Some(Rgb {
            red: r1 * 16 + r2,
            green: g1 * 16 + g2,
            blue: b1 * 16 + b2,
        }),
        [r, g, b] => Some(Rgb {
            red: r * 17,
            green: g * 17,
            blue: b * 17,
        }),
        _ => None,
    }
}

/// Color table accumulated over one conversion.
///
/// Colors are numbered in first-seen order after the template's predefined
/// entries. Index 0 means "no color" and is never assigned.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: Vec<(String, u32)>,
    output: String,
}

impl ColorTable {
    /// Create an empty color table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table index for the color at the end of a CSS value, registering it if new.
    ///
    /// Returns 0 when no hex color can be found.
    pub fn color_index(&mut self, style_value: &str) -> u32 {
        let Some(found) = COLOR_TOKEN.find(style_value) else {
            return 0;
        };
        let hex = found.as_str().trim_start_matches('#');

        if let Some(index) = self.index_of(hex) {
            return index;
        }

        let Some(rgb) = hex_to_rgb(hex) else {
            return 0;
        };
        self.output.push_str(&format!(
            ";\\red{}\\green{}\\blue{}",
            rgb.red, rgb.green, rgb.blue
        ));
        let index = self.entries.len() as u32 + 1 + EXISTING_COLORS;
        self.entries.push((hex.to_string(), index));
        log::debug!("color #{} registered as index {}", hex, index);
        index
    }

    /// Index of an already registered hex color.
    pub fn index_of(&self, hex: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(known, _)| known == hex)
            .map(|(_, index)| *index)
    }

    /// The accumulated color table fragment, one `;\redR\greenG\blueB` per color.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Number of colors registered beyond the predefined ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no color has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
