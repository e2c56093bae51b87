//! Channel mode parsing, driven by the server's ISUPPORT tokens.
//!
//! A bot only needs to know which mode letters consume an argument so it can
//! pair `+o`/`-o` with the right nick. Which letters those are is
//! server-specific, so [`ModeSpec`] starts from RFC 2812 defaults and is
//! updated from `PREFIX=` and `CHANMODES=` in RPL_ISUPPORT.
//!
//! # Reference
//! - RFC 2812 Section 3.2.3 (Channel Modes)
//! - <https://modern.ircdocs.horse/#rplisupport-005>

use crate::error::ModeParseError;

/// A single `+x`/`-x` change, with its argument when the mode takes one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChange {
    /// `true` for `+`, `false` for `-`.
    pub adding: bool,
    /// Mode letter.
    pub mode: char,
    /// Argument consumed by this mode, if any.
    pub arg: Option<String>,
}

/// Argument rules for channel modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeSpec {
    /// Membership prefix modes, in rank order, with their NAMES/WHO symbol.
    prefixes: Vec<(char, char)>,
    /// Type A (list) and type B modes: always take an argument.
    always_arg: String,
    /// Type C modes: take an argument only when set.
    set_arg: String,
}

impl Default for ModeSpec {
    fn default() -> Self {
        Self {
            prefixes: vec![('o', '@'), ('v', '+')],
            always_arg: "beIk".to_string(),
            set_arg: "l".to_string(),
        }
    }
}

impl ModeSpec {
    /// Apply one ISUPPORT token (`KEY=VALUE`). Unknown keys are ignored.
    pub fn apply_isupport(&mut self, token: &str) {
        let Some((key, value)) = token.split_once('=') else {
            return;
        };
        match key {
            "PREFIX" => {
                let Some((modes, symbols)) = value
                    .strip_prefix('(')
                    .and_then(|v| v.split_once(')'))
                else {
                    return;
                };
                if modes.chars().count() == symbols.chars().count() && !modes.is_empty() {
                    self.prefixes = modes.chars().zip(symbols.chars()).collect();
                }
            }
            "CHANMODES" => {
                let groups: Vec<&str> = value.split(',').collect();
                if groups.len() >= 3 {
                    self.always_arg = format!("{}{}", groups[0], groups[1]);
                    self.set_arg = groups[2].to_string();
                }
            }
            _ => {}
        }
    }

    /// Mode letter for a NAMES/WHO prefix symbol (`@` → `o`).
    pub fn mode_for_symbol(&self, symbol: char) -> Option<char> {
        self.prefixes
            .iter()
            .find(|(_, s)| *s == symbol)
            .map(|(m, _)| *m)
    }

    /// Whether `symbol` is any membership prefix symbol.
    pub fn is_prefix_symbol(&self, symbol: char) -> bool {
        self.mode_for_symbol(symbol).is_some()
    }

    /// Whether `mode` is a membership prefix mode (`o`, `v`, ...).
    pub fn is_prefix_mode(&self, mode: char) -> bool {
        self.prefixes.iter().any(|(m, _)| *m == mode)
    }

    fn takes_arg(&self, mode: char, adding: bool) -> bool {
        self.is_prefix_mode(mode)
            || self.always_arg.contains(mode)
            || (adding && self.set_arg.contains(mode))
    }

    /// Parse a channel MODE change (`+ov-b alice bob *!*@spam`).
    ///
    /// `params` is everything after the target: the mode string first, then
    /// its arguments.
    pub fn parse(&self, params: &[String]) -> Result<Vec<ModeChange>, ModeParseError> {
        let Some((modestring, args)) = params.split_first() else {
            return Ok(Vec::new());
        };
        let mut args = args.iter();
        let mut adding = match modestring.chars().next() {
            Some('+') => true,
            Some('-') => false,
            Some(_) => return Err(ModeParseError::MissingModeModifier),
            None => return Ok(Vec::new()),
        };

        let mut changes = Vec::new();
        for c in modestring.chars() {
            match c {
                '+' => adding = true,
                '-' => adding = false,
                mode => {
                    let arg = if self.takes_arg(mode, adding) {
                        Some(
                            args.next()
                                .cloned()
                                .ok_or(ModeParseError::MissingArgument(mode))?,
                        )
                    } else {
                        None
                    };
                    changes.push(ModeChange { adding, mode, arg });
                }
            }
        }
        Ok(changes)
    }
}
