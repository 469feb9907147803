//! Configuration for delete-for-me sync.

/// Default number of anchor messages carried by a conversation delete.
pub const DEFAULT_MAX_ANCHOR_MESSAGES: usize = 5;

/// Default number of addressable messages carried by one sync message.
pub const DEFAULT_MAX_ADDRESSABLE_MESSAGES_PER_SYNC: usize = 500;

/// Limits applied when building outgoing delete syncs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSyncConfig {
    /// How many of a thread's most recent addressable messages to send as
    /// anchors for a conversation delete.
    pub max_anchor_messages: usize,
    /// Intent sets addressing more messages than this are split across
    /// several outgoing envelopes.
    pub max_addressable_messages_per_sync: usize,
}

impl DeleteSyncConfig {
    /// Creates a configuration with default limits.
    pub fn new() -> Self {
        Self {
            max_anchor_messages: DEFAULT_MAX_ANCHOR_MESSAGES,
            max_addressable_messages_per_sync: DEFAULT_MAX_ADDRESSABLE_MESSAGES_PER_SYNC,
        }
    }

    /// Sets the anchor count.
    pub fn with_max_anchor_messages(mut self, count: usize) -> Self {
        self.max_anchor_messages = count;
        self
    }

    /// Sets the per-envelope addressable message limit.
    pub fn with_max_addressable_messages_per_sync(mut self, count: usize) -> Self {
        self.max_addressable_messages_per_sync = count;
        self
    }
}

impl Default for DeleteSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = DeleteSyncConfig::new()
            .with_max_anchor_messages(3)
            .with_max_addressable_messages_per_sync(10);

        assert_eq!(config.max_anchor_messages, 3);
        assert_eq!(config.max_addressable_messages_per_sync, 10);
    }

    #[test]
    fn config_defaults() {
        let config = DeleteSyncConfig::default();
        assert_eq!(config.max_anchor_messages, DEFAULT_MAX_ANCHOR_MESSAGES);
        assert_eq!(
            config.max_addressable_messages_per_sync,
            DEFAULT_MAX_ADDRESSABLE_MESSAGES_PER_SYNC
        );
    }
}
