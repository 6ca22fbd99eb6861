//! Shortcut compiler - turns a human-readable shortcut string into an
//! ordered key-token sequence
//!
//! Recognized tokens after splitting on `+` and case-folding:
//! - modifiers: `cmd`/`command`, `ctrl`/`control`, `shift`, `alt`/`option`
//! - a single A-Z letter, `f1`..`f24`, or `space`
//!
//! Anything else is dropped rather than failing the whole shortcut, so
//! `"Cmd+Foo+C"` still compiles to `[Cmd, C]`. Token order is preserved
//! because the result is consumed as a press sequence, not a set.

use tracing::debug;

/// An abstract key ready for injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyToken {
    Cmd,
    Ctrl,
    Shift,
    Alt,
    /// An A-Z letter, stored uppercase
    Letter(char),
    /// A function key F1..F24
    Function(u8),
    Space,
}

/// Compile a shortcut string into key tokens.
///
/// An empty result is legal and dispatches as a no-op.
pub fn compile(shortcut: &str) -> Vec<KeyToken> {
    shortcut
        .split('+')
        .filter_map(|raw| {
            let token = raw.trim().to_ascii_lowercase();
            let parsed = parse_token(&token);
            if parsed.is_none() && !token.is_empty() {
                debug!("dropping unrecognized shortcut token {:?}", token);
            }
            parsed
        })
        .collect()
}

fn parse_token(token: &str) -> Option<KeyToken> {
    match token {
        "cmd" | "command" => return Some(KeyToken::Cmd),
        "ctrl" | "control" => return Some(KeyToken::Ctrl),
        "shift" => return Some(KeyToken::Shift),
        "alt" | "option" => return Some(KeyToken::Alt),
        "space" => return Some(KeyToken::Space),
        _ => {}
    }

    // Single A-Z letter (checked before F-keys so a bare "f" is a letter)
    let mut chars = token.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_alphabetic() {
            return Some(KeyToken::Letter(ch.to_ascii_uppercase()));
        }
    }

    // Function key: f1..f24, no leading zero
    if let Some(digits) = token.strip_prefix('f') {
        if !digits.is_empty() && !digits.starts_with('0') {
            if let Ok(n) = digits.parse::<u8>() {
                if (1..=24).contains(&n) {
                    return Some(KeyToken::Function(n));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_then_letter_order() {
        assert_eq!(
            compile("Cmd+C"),
            vec![KeyToken::Cmd, KeyToken::Letter('C')]
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(compile("cmd+c"), compile("Cmd+C"));
        assert_eq!(compile("CMD+SHIFT+Z"), compile("cmd+shift+z"));
    }

    #[test]
    fn test_modifier_aliases() {
        assert_eq!(compile("command+x"), compile("cmd+x"));
        assert_eq!(compile("control+x"), compile("ctrl+x"));
        assert_eq!(compile("option+x"), compile("alt+x"));
    }

    #[test]
    fn test_unrecognized_token_dropped() {
        assert_eq!(compile("Cmd+Zz+C"), compile("Cmd+C"));
        assert_eq!(compile("Cmd+Foo+C"), vec![KeyToken::Cmd, KeyToken::Letter('C')]);
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(compile("F1"), vec![KeyToken::Function(1)]);
        assert_eq!(compile("ctrl+f12"), vec![KeyToken::Ctrl, KeyToken::Function(12)]);
        assert_eq!(compile("F24"), vec![KeyToken::Function(24)]);
        // Out of range or malformed F-keys are dropped
        assert_eq!(compile("F25"), vec![]);
        assert_eq!(compile("F0"), vec![]);
        assert_eq!(compile("F01"), vec![]);
    }

    #[test]
    fn test_bare_f_is_a_letter() {
        assert_eq!(compile("f"), vec![KeyToken::Letter('F')]);
    }

    #[test]
    fn test_space() {
        assert_eq!(compile("alt+space"), vec![KeyToken::Alt, KeyToken::Space]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(compile(" Cmd + Shift + Z "), compile("Cmd+Shift+Z"));
    }

    #[test]
    fn test_empty_and_all_unrecognized() {
        assert_eq!(compile(""), vec![]);
        assert_eq!(compile("foo+bar"), vec![]);
    }
}
