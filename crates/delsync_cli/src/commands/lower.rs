//! Lower command implementation.

use super::{parse_hex, CommandResult};
use delsync_protocol::wire::SyncMessage;
use delsync_protocol::{Contents, Decode};
use tracing::info;

/// Lowers a durable payload to protobuf `SyncMessage` hex.
pub fn lower(input: &str) -> CommandResult<String> {
    let contents = Contents::decode(&parse_hex(input)?)?;
    let lowered = contents.to_wire();
    if lowered.omitted > 0 {
        info!(omitted = lowered.omitted, "entries with no wire representation omitted");
    }
    Ok(hex::encode(
        SyncMessage::delete_for_me(lowered.delete_for_me).to_bytes(),
    ))
}

/// Runs the lower command.
pub fn run(input: &str) -> CommandResult<()> {
    println!("{}", lower(input)?);
    Ok(())
}
