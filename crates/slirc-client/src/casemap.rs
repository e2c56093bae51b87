//! Nick and channel name comparison.
//!
//! Servers compare names with the `rfc1459` case mapping, where `[]\~` are
//! the uppercase forms of `{}|^`. Roster keys are stored folded so lookups
//! from console input and server traffic agree.

/// Fold a single character with the `rfc1459` mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        'A'..='Z' => c.to_ascii_lowercase(),
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c,
    }
}

/// Fold a whole name for use as a map key.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive name equality.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.chars()
            .map(irc_lower_char)
            .eq(b.chars().map(irc_lower_char))
}

/// Whether `name` looks like a channel (RFC 2812 section 1.3).
///
/// The first character must be one of `#&+!`. Space, comma, BEL and NUL
/// are rejected, as is anything over 50 characters.
pub fn is_channel_name(name: &str) -> bool {
    let mut chars = name.chars();
    if !matches!(chars.next(), Some('#' | '&' | '+' | '!')) {
        return false;
    }
    name.chars().count() <= 50 && chars.all(|c| !matches!(c, ' ' | ',' | '\x07' | '\0'))
}
