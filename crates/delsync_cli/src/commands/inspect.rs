//! Inspect command implementation.

use super::{parse_hex, CommandResult};
use crate::view::ContentsView;
use delsync_protocol::{Contents, Decode};
use serde::Serialize;

/// Summary of a durable payload.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Payload size in bytes.
    pub size: usize,
    /// Number of message-level delete entries.
    pub message_delete_count: usize,
    /// Number of conversation delete entries.
    pub conversation_delete_count: usize,
    /// Number of local-only conversation delete entries.
    pub local_only_delete_count: usize,
    /// Addressable messages carried, anchors included.
    pub addressable_message_count: usize,
    /// The decoded payload.
    pub contents: ContentsView,
}

/// Decodes `input` and builds the summary.
pub fn inspect(input: &str) -> CommandResult<InspectResult> {
    let bytes = parse_hex(input)?;
    let contents = Contents::decode(&bytes)?;
    Ok(InspectResult {
        size: bytes.len(),
        message_delete_count: contents.message_deletes.len(),
        conversation_delete_count: contents.conversation_deletes.len(),
        local_only_delete_count: contents.local_only_conversation_deletes.len(),
        addressable_message_count: contents.addressable_message_count(),
        contents: ContentsView::from(&contents),
    })
}

/// Runs the inspect command.
pub fn run(input: &str, format: &str) -> CommandResult<()> {
    let result = inspect(input)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Delete-for-me payload");
    println!("=====================");
    println!("Size:                  {} bytes", result.size);
    println!("Message deletes:       {}", result.message_delete_count);
    println!("Conversation deletes:  {}", result.conversation_delete_count);
    println!("Local-only deletes:    {}", result.local_only_delete_count);
    println!("Addressable messages:  {}", result.addressable_message_count);

    for delete in &result.contents.message_deletes {
        println!();
        println!("Message delete in {:?}", delete.conversation);
        for message in &delete.messages {
            println!("  {:?} at {}", message.author, message.sent_timestamp);
        }
    }
    for delete in &result.contents.conversation_deletes {
        println!();
        println!(
            "Conversation delete in {:?} (full: {})",
            delete.conversation, delete.is_full_delete
        );
        for anchor in &delete.most_recent_messages {
            println!("  anchor {:?} at {}", anchor.author, anchor.sent_timestamp);
        }
    }
    for conversation in &result.contents.local_only_conversation_deletes {
        println!();
        println!("Local-only delete in {conversation:?}");
    }
}
