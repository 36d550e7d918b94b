//! Text escaping for RTF output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Node;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid space regex"));

/// Whitespace handling applied while encoding a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizeMode {
    /// Keep text as-is
    #[default]
    Raw,
    /// Collapse runs of spaces into one space
    CollapseSpaces,
    /// Preformatted text: newlines become hard line breaks
    Preformatted,
}

impl NormalizeMode {
    /// Mode from its numeric code (0, 1 or 2).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NormalizeMode::Raw),
            1 => Some(NormalizeMode::CollapseSpaces),
            2 => Some(NormalizeMode::Preformatted),
            _ => None,
        }
    }

    /// Numeric code of this mode.
    pub fn code(self) -> u8 {
        match self {
            NormalizeMode::Raw => 0,
            NormalizeMode::CollapseSpaces => 1,
            NormalizeMode::Preformatted => 2,
        }
    }
}

/// Escape a text run for RTF.
///
/// `following` is the node that comes right after the text in the tree. In
/// preformatted mode a newline followed by a `p` element also closes the
/// current paragraph: `\par ` is appended after the encoded text.
///
/// Control characters below 32 other than newline are passed through.
pub fn encode_text(following: Option<&Node>, text: &str, mode: NormalizeMode) -> String {
    let collapsed;
    let text = if mode == NormalizeMode::CollapseSpaces {
        collapsed = SPACE_RUNS.replace_all(text, " ");
        collapsed.as_ref()
    } else {
        text
    };

    let mut out = String::with_capacity(text.len());
    let mut append_par = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'u') => out.push('\\'),
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '\u{a0}' => out.push_str("\\~"),
            '\n' if mode == NormalizeMode::Preformatted => {
                out.push_str("\\line ");
                if following.is_some_and(|n| n.is_element("p")) {
                    append_par = true;
                }
            }
            c if (c as u32) > 255 => out.push_str(&unicode_escape(c as u32)),
            c => out.push(c),
        }
    }

    if append_par {
        out.push_str("\\par ");
    }
    out
}

/// Unicode control word for a code point, wrapped in its own group.
pub fn unicode_escape(code_point: u32) -> String {
    format!("{{\\u{}  }}", code_point)
}

/// RTF for a character carried by a marker node.
///
/// Non-breaking space uses its control symbol, the rest of the Latin-1
/// printable range uses a hex escape, everything else outside ASCII uses a
/// Unicode control word.
pub fn encode_code_point(code_point: u32) -> String {
    match code_point {
        0xA0 => "\\~".to_string(),
        0xA1..=0xFF => format!("\\'{:02x}", code_point),
        _ if code_point < 0x80 => match char::from_u32(code_point) {
            Some(c) => encode_text(None, &c.to_string(), NormalizeMode::Raw),
            None => String::new(),
        },
        _ => unicode_escape(code_point),
    }
}

/// Escape free text that may contain any character, such as document
/// metadata. Characters outside ASCII go through [`encode_code_point`].
pub fn encode_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut ascii = String::new();
    for ch in text.chars() {
        if ch.is_ascii() {
            ascii.push(ch);
            continue;
        }
        if !ascii.is_empty() {
            out.push_str(&encode_text(None, &ascii, NormalizeMode::CollapseSpaces));
            ascii.clear();
        }
        out.push_str(&encode_code_point(ch as u32));
    }
    if !ascii.is_empty() {
        out.push_str(&encode_text(None, &ascii, NormalizeMode::CollapseSpaces));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;

    #[test]
    fn test_braces_escaped_percent_untouched() {
        assert_eq!(
            encode_text(None, "50% {cost}", NormalizeMode::Raw),
            "50% \\{cost\\}"
        );
    }

    #[test]
    fn test_backslash_escaped_unless_unicode_word() {
        assert_eq!(encode_text(None, "a\\b", NormalizeMode::Raw), "a\\\\b");
        assert_eq!(encode_text(None, "\\u345", NormalizeMode::Raw), "\\u345");
        assert_eq!(encode_text(None, "end\\", NormalizeMode::Raw), "end\\\\");
    }

    #[test]
    fn test_non_breaking_space() {
        assert_eq!(encode_text(None, "a\u{a0}b", NormalizeMode::Raw), "a\\~b");
    }

    #[test]
    fn test_wide_characters_become_unicode_words() {
        assert_eq!(
            encode_text(None, "x\u{4e03}", NormalizeMode::Raw),
            "x{\\u19971  }"
        );
        // Latin-1 range is left alone.
        assert_eq!(encode_text(None, "é", NormalizeMode::Raw), "é");
    }

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(
            encode_text(None, "a    b  c", NormalizeMode::CollapseSpaces),
            "a b c"
        );
        assert_eq!(encode_text(None, "a    b", NormalizeMode::Raw), "a    b");
    }

    #[test]
    fn test_newline_outside_pre_passes_through() {
        assert_eq!(encode_text(None, "a\nb", NormalizeMode::CollapseSpaces), "a\nb");
    }

    #[test]
    fn test_preformatted_newline() {
        assert_eq!(
            encode_text(None, "a\nb\n", NormalizeMode::Preformatted),
            "a\\line b\\line "
        );
    }

    #[test]
    fn test_preformatted_newline_before_paragraph() {
        let next = Node::Element(Element::new("p").with_text("next"));
        assert_eq!(
            encode_text(Some(&next), "a\nb", NormalizeMode::Preformatted),
            "a\\line b\\par "
        );
    }

    #[test]
    fn test_preformatted_newline_before_text_sibling() {
        let next = Node::text("more");
        assert_eq!(
            encode_text(Some(&next), "a\n", NormalizeMode::Preformatted),
            "a\\line "
        );
    }

    #[test]
    fn test_control_characters_pass_through() {
        assert_eq!(encode_text(None, "a\tb\u{1}", NormalizeMode::Raw), "a\tb\u{1}");
    }

    #[test]
    fn test_encode_code_point() {
        assert_eq!(encode_code_point(160), "\\~");
        assert_eq!(encode_code_point(233), "\\'e9");
        assert_eq!(encode_code_point(1268), "{\\u1268  }");
        assert_eq!(encode_code_point(0x85), "{\\u133  }");
        assert_eq!(encode_code_point('{' as u32), "\\{");
    }

    #[test]
    fn test_encode_plain() {
        assert_eq!(encode_plain("Caf\u{e9} {x}  \u{6771}"), "Caf\\'e9 \\{x\\} {\\u26481  }");
    }

    #[test]
    fn test_mode_codes() {
        for code in 0..3 {
            assert_eq!(NormalizeMode::from_code(code).unwrap().code(), code);
        }
        assert_eq!(NormalizeMode::from_code(3), None);
    }
}
