//! Text entry limits and the small field type used by the overlay forms.

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Single-line fields (dates, titles, meeting names, search).
pub const MAX_LINE_LENGTH: usize = 200;

/// Knowledge entry content and chat messages.
pub const MAX_TEXT_LENGTH: usize = 4000;

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Push `c` onto `buf` if it is printable and `buf` is below `max` chars.
pub fn push_limited(buf: &mut String, c: char, max: usize) -> bool {
    if buf.chars().count() < max && is_valid_input_char(c) {
        buf.push(c);
        true
    } else {
        false
    }
}

/// An editable line with a character cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    max_len: usize,
    masked: bool,
}

impl TextInput {
    pub fn new(max_len: usize) -> Self {
        Self { value: String::new(), max_len, masked: false }
    }

    pub fn password() -> Self {
        Self { value: String::new(), max_len: MAX_PASSWORD_LENGTH, masked: true }
    }

    pub fn username() -> Self {
        Self::new(MAX_USERNAME_LENGTH)
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.chars().take(self.max_len).collect();
        self
    }

    pub fn push(&mut self, c: char) -> bool {
        push_limited(&mut self.value, c, self.max_len)
    }

    /// Line break for multi-line fields; `push` rejects control characters.
    pub fn push_newline(&mut self) -> bool {
        if self.value.chars().count() < self.max_len {
            self.value.push('\n');
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// What to draw: the value, or one `*` per character when masked.
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, '@'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\t'));
    }

    #[test]
    fn test_text_input_cap_and_mask() {
        let mut input = TextInput::new(3);
        for c in "abcd".chars() {
            input.push(c);
        }
        assert_eq!(input.value(), "abc");

        let mut secret = TextInput::password();
        secret.push('é');
        secret.push('x');
        assert_eq!(secret.display(), "**");
        secret.pop();
        assert_eq!(secret.value(), "é");
    }

    #[test]
    fn test_with_value_truncates_by_chars() {
        let input = TextInput::new(2).with_value("äöü");
        assert_eq!(input.value(), "äö");
    }
}
