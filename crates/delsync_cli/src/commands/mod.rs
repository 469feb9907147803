//! CLI command implementations.

pub mod encode;
pub mod inspect;
pub mod lower;
pub mod raise;

/// Result type shared by the commands.
pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Parses a hex argument, tolerating surrounding whitespace and a `0x` prefix.
pub fn parse_hex(input: &str) -> CommandResult<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| format!("invalid hex input: {e}").into())
}
