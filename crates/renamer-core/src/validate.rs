//! Target name validation.
//!
//! Names are checked against the portable (Windows-compatible) naming rules
//! regardless of the host platform, so a plan behaves the same everywhere.

use thiserror::Error;

/// Characters that may not appear in a target name, in reporting order.
pub const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Reserved device names, compared against the upper-cased stem.
pub const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Maximum name length in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Why a target name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidName {
    /// The name contains a forbidden character.
    #[error("invalid character: '{0}'")]
    InvalidCharacter(char),

    /// The stem is a reserved device name such as `CON` or `LPT1`.
    #[error("reserved device name")]
    ReservedDeviceName,

    /// The name is longer than [`MAX_NAME_LEN`] characters.
    #[error("name too long (max 255)")]
    TooLong { len: usize },
}

/// Validate a target name.
///
/// Rules are checked in order and the first failure wins: forbidden
/// characters (scanning [`INVALID_CHARS`] in order), reserved device names,
/// then length. Blank names are not rejected here; callers treat them as
/// "no target assigned".
pub fn validate(name: &str) -> Result<(), InvalidName> {
    if let Some(c) = INVALID_CHARS.into_iter().find(|c| name.contains(*c)) {
        return Err(InvalidName::InvalidCharacter(c));
    }

    let upper_name = name.to_uppercase();
    let base_name = upper_name.split('.').next().unwrap_or("");
    if RESERVED_NAMES.contains(&base_name) {
        return Err(InvalidName::ReservedDeviceName);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(InvalidName::TooLong { len });
    }

    Ok(())
}
