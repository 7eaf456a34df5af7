//! ASCII character → HID usage translation for typed text.
//!
//! Typing a character means pressing the key at its US-QWERTY position,
//! optionally with Shift held. The returned usage is the raw HID Usage ID
//! (page 0x07); the boolean is the Shift requirement. Characters with no
//! mapping (non-ASCII, control codes other than `\n`/`\t`) return `None`
//! and are skipped by the caller.

/// Translates one character to `(usage_id, needs_shift)`.
pub fn char_to_usage(ch: char) -> Option<(u8, bool)> {
    match ch {
        'a'..='z' => Some((0x04 + (ch as u8 - b'a'), false)),
        'A'..='Z' => Some((0x04 + (ch as u8 - b'A'), true)),
        '1'..='9' => Some((0x1E + (ch as u8 - b'1'), false)),
        '0' => Some((0x27, false)),

        '\n' => Some((0x28, false)), // Enter
        '\t' => Some((0x2B, false)), // Tab
        ' ' => Some((0x2C, false)),

        // Unshifted punctuation row
        '-' => Some((0x2D, false)),
        '=' => Some((0x2E, false)),
        '[' => Some((0x2F, false)),
        ']' => Some((0x30, false)),
        '\\' => Some((0x31, false)),
        ';' => Some((0x33, false)),
        '\'' => Some((0x34, false)),
        '`' => Some((0x35, false)),
        ',' => Some((0x36, false)),
        '.' => Some((0x37, false)),
        '/' => Some((0x38, false)),

        // Shifted digits
        '!' => Some((0x1E, true)),
        '@' => Some((0x1F, true)),
        '#' => Some((0x20, true)),
        '$' => Some((0x21, true)),
        '%' => Some((0x22, true)),
        '^' => Some((0x23, true)),
        '&' => Some((0x24, true)),
        '*' => Some((0x25, true)),
        '(' => Some((0x26, true)),
        ')' => Some((0x27, true)),

        // Shifted punctuation
        '_' => Some((0x2D, true)),
        '+' => Some((0x2E, true)),
        '{' => Some((0x2F, true)),
        '}' => Some((0x30, true)),
        '|' => Some((0x31, true)),
        ':' => Some((0x33, true)),
        '"' => Some((0x34, true)),
        '~' => Some((0x35, true)),
        '<' => Some((0x36, true)),
        '>' => Some((0x37, true)),
        '?' => Some((0x38, true)),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_letters_map_without_shift() {
        assert_eq!(char_to_usage('a'), Some((0x04, false)));
        assert_eq!(char_to_usage('z'), Some((0x1D, false)));
    }

    #[test]
    fn test_uppercase_letters_map_with_shift() {
        assert_eq!(char_to_usage('A'), Some((0x04, true)));
        assert_eq!(char_to_usage('H'), Some((0x0B, true)));
    }

    #[test]
    fn test_digits_map_to_top_row() {
        assert_eq!(char_to_usage('1'), Some((0x1E, false)));
        assert_eq!(char_to_usage('9'), Some((0x26, false)));
        // Zero sits after nine on the usage page, not before one.
        assert_eq!(char_to_usage('0'), Some((0x27, false)));
    }

    #[test]
    fn test_shifted_digit_symbols_share_usage_with_digit() {
        assert_eq!(char_to_usage('!'), Some((0x1E, true)));
        assert_eq!(char_to_usage(')'), Some((0x27, true)));
    }

    #[test]
    fn test_whitespace_and_newline() {
        assert_eq!(char_to_usage(' '), Some((0x2C, false)));
        assert_eq!(char_to_usage('\n'), Some((0x28, false)));
        assert_eq!(char_to_usage('\t'), Some((0x2B, false)));
    }

    #[test]
    fn test_unmapped_characters_return_none() {
        for ch in ['é', '€', '\r', '\u{7}'] {
            assert_eq!(char_to_usage(ch), None, "{ch:?} must be unmapped");
        }
    }
}
