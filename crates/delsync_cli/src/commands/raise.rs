//! Raise command implementation.

use super::{parse_hex, CommandResult};
use delsync_protocol::wire::SyncMessage;
use delsync_protocol::{Contents, Encode};
use tracing::info;

/// Raises protobuf `SyncMessage` hex to a durable payload.
pub fn raise(input: &str) -> CommandResult<String> {
    let message = SyncMessage::from_bytes(&parse_hex(input)?)?;
    let delete_for_me = message
        .delete_for_me
        .ok_or("sync message carries no delete-for-me payload")?;
    let raised = Contents::from_wire(&delete_for_me);
    if raised.dropped > 0 {
        info!(dropped = raised.dropped, "unaddressable entries dropped");
    }
    Ok(hex::encode(raised.contents.encode()?))
}

/// Runs the raise command.
pub fn run(input: &str) -> CommandResult<()> {
    println!("{}", raise(input)?);
    Ok(())
}
