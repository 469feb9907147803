//! Protobuf wire schema for the delete-for-me sync message.
//!
//! Field numbers follow the messaging service's `SyncMessage.DeleteForMe`
//! definition. Only the fields this crate produces are declared; prost
//! skips unknown fields when decoding.

/// Envelope body for sync messages sent to the user's own linked devices.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SyncMessage {
    /// Delete-for-me payload.
    #[prost(message, optional, tag = "21")]
    pub delete_for_me: ::core::option::Option<sync_message::DeleteForMe>,
}

/// Nested message types in `SyncMessage`.
pub mod sync_message {
    /// Deletions to mirror on linked devices.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteForMe {
        /// Message-level deletes.
        #[prost(message, repeated, tag = "1")]
        pub message_deletes: ::prost::alloc::vec::Vec<delete_for_me::MessageDeletes>,
        /// Conversation-level deletes.
        #[prost(message, repeated, tag = "2")]
        pub conversation_deletes: ::prost::alloc::vec::Vec<delete_for_me::ConversationDelete>,
        /// Local-only conversation deletes.
        #[prost(message, repeated, tag = "3")]
        pub local_only_conversation_deletes:
            ::prost::alloc::vec::Vec<delete_for_me::LocalOnlyConversationDelete>,
    }

    /// Nested message types in `DeleteForMe`.
    pub mod delete_for_me {
        /// Identifies a conversation.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ConversationIdentifier {
            /// The one populated identifier.
            #[prost(oneof = "conversation_identifier::Identifier", tags = "1, 2, 3")]
            pub identifier: ::core::option::Option<conversation_identifier::Identifier>,
        }

        /// Nested types in `ConversationIdentifier`.
        pub mod conversation_identifier {
            /// Conversation identifier variants.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Identifier {
                /// Peer service id.
                #[prost(string, tag = "1")]
                ThreadServiceId(::prost::alloc::string::String),
                /// Group id bytes.
                #[prost(bytes = "vec", tag = "2")]
                ThreadGroupId(::prost::alloc::vec::Vec<u8>),
                /// Peer phone number.
                #[prost(string, tag = "3")]
                ThreadE164(::prost::alloc::string::String),
            }
        }

        /// Identifies a message by author and sent timestamp.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct AddressableMessage {
            /// The one populated author identifier.
            #[prost(oneof = "addressable_message::Author", tags = "1, 2")]
            pub author: ::core::option::Option<addressable_message::Author>,
            /// Sent timestamp in epoch milliseconds.
            #[prost(uint64, optional, tag = "3")]
            pub sent_timestamp: ::core::option::Option<u64>,
        }

        /// Nested types in `AddressableMessage`.
        pub mod addressable_message {
            /// Author variants.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Author {
                /// Author service id.
                #[prost(string, tag = "1")]
                AuthorServiceId(::prost::alloc::string::String),
                /// Author phone number.
                #[prost(string, tag = "2")]
                AuthorE164(::prost::alloc::string::String),
            }
        }

        /// Specific messages to delete in one conversation.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct MessageDeletes {
            /// Target conversation.
            #[prost(message, optional, tag = "1")]
            pub conversation: ::core::option::Option<ConversationIdentifier>,
            /// Target messages.
            #[prost(message, repeated, tag = "2")]
            pub messages: ::prost::alloc::vec::Vec<AddressableMessage>,
        }

        /// Whole-conversation delete bounded by anchors.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ConversationDelete {
            /// Target conversation.
            #[prost(message, optional, tag = "1")]
            pub conversation: ::core::option::Option<ConversationIdentifier>,
            /// Anchors, most recent first.
            #[prost(message, repeated, tag = "2")]
            pub most_recent_messages: ::prost::alloc::vec::Vec<AddressableMessage>,
            /// Delete all history regardless of anchors.
            #[prost(bool, optional, tag = "3")]
            pub is_full_delete: ::core::option::Option<bool>,
        }

        /// Conversation cleared with no addressable messages.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct LocalOnlyConversationDelete {
            /// Target conversation.
            #[prost(message, optional, tag = "1")]
            pub conversation: ::core::option::Option<ConversationIdentifier>,
        }
    }
}
