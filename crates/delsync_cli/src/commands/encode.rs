//! Encode command implementation.

use super::CommandResult;
use crate::view::ContentsView;
use delsync_protocol::Encode;

/// Encodes a JSON intent set to durable hex.
pub fn encode(json: &str) -> CommandResult<String> {
    let view: ContentsView = serde_json::from_str(json)?;
    let contents = view.to_contents()?;
    Ok(hex::encode(contents.encode()?))
}

/// Runs the encode command.
pub fn run(json: &str) -> CommandResult<()> {
    println!("{}", encode(json)?);
    Ok(())
}
