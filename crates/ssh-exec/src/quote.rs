//! POSIX shell quoting and word splitting.
//!
//! The remote side of the recovery protocol embeds the caller's command in
//! an explicit `sh -c '...'` invocation, so the command must be quoted for a
//! POSIX shell. The local side never goes through a shell; the only
//! splitting performed locally is for the raw `extra_args` passthrough,
//! which is split into words the way a shell would have, with the content of
//! each word preserved verbatim.

/// Bytes that never need quoting in a POSIX shell word.
const fn is_safe_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'_' | b'@' | b'%' | b'+' | b'=' | b':' | b',' | b'.' | b'/' | b'-'
        )
}

/// Quote a string so a POSIX shell treats it as a single word.
///
/// Single-quote quoting: the only byte that needs special handling inside
/// single quotes is the single quote itself, which is emitted as `'\''`.
#[must_use]
pub fn sh_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.bytes().all(is_safe_byte) {
        return s.to_string();
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Wrap a command string in an explicit `sh -c` invocation.
#[must_use]
pub fn sh_wrap(command: &str) -> String {
    format!("sh -c {}", sh_quote(command))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Normal,
    Single,
    Double,
}

/// Split a flag string into words the way a POSIX shell would.
///
/// Quotes group words and are removed; backslashes escape the next
/// character outside single quotes. An unterminated quote takes the rest of
/// the string. Word content is never re-escaped.
#[must_use]
pub fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut state = SplitState::Normal;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match state {
            SplitState::Normal => match c {
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                '\'' => {
                    state = SplitState::Single;
                    in_word = true;
                }
                '"' => {
                    state = SplitState::Double;
                    in_word = true;
                }
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                    in_word = true;
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
            SplitState::Single => {
                if c == '\'' {
                    state = SplitState::Normal;
                } else {
                    current.push(c);
                }
            }
            SplitState::Double => match c {
                '"' => state = SplitState::Normal,
                '\\' => {
                    // Inside double quotes only `"` `\` `$` and backquote
                    // are escapable; any other pair stays literal.
                    match chars.next() {
                        Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                        Some(next) => {
                            current.push('\\');
                            current.push(next);
                        }
                        None => current.push('\\'),
                    }
                }
                c => current.push(c),
            },
        }
    }

    if in_word {
        words.push(current);
    }
    words
}
