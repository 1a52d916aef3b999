//! Events broadcast to the rest of the application on every state change.

use std::fmt;
use std::time::SystemTime;

/// Where a [`SyncEvent`] came from.
///
/// The UI uses the tag to decide which widget a piece of text belongs in:
/// sent text goes to the outbound field, received and clipboard text to the
/// inbound field, and server info to the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    /// Nothing has happened yet; used for the initial UI state.
    Empty,
    /// The local user published text to the outbound snapshot.
    Sent,
    /// The local user accepted a queued item.
    Received,
    /// Server status or queue length changed.
    ServerInfo,
    /// Text was read from the local clipboard.
    Clipboard,
}

impl SourceTag {
    /// Short lowercase name used in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::Empty => "empty",
            SourceTag::Sent => "sent",
            SourceTag::Received => "received",
            SourceTag::ServerInfo => "serverInfo",
            SourceTag::Clipboard => "clipboard",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable notification of one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub text: String,
    pub source: SourceTag,
    pub updated_at: SystemTime,
}

impl SyncEvent {
    /// Creates an event stamped with the current time.
    pub fn new(text: impl Into<String>, source: SourceTag) -> Self {
        Self::at(text, source, SystemTime::now())
    }

    /// Creates an event with an explicit timestamp.
    pub fn at(text: impl Into<String>, source: SourceTag, updated_at: SystemTime) -> Self {
        Self {
            text: text.into(),
            source,
            updated_at,
        }
    }

    /// The event a freshly attached UI starts from.
    pub fn empty() -> Self {
        Self::new(String::new(), SourceTag::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tag_names() {
        assert_eq!(SourceTag::Empty.to_string(), "empty");
        assert_eq!(SourceTag::Sent.to_string(), "sent");
        assert_eq!(SourceTag::Received.to_string(), "received");
        assert_eq!(SourceTag::ServerInfo.to_string(), "serverInfo");
        assert_eq!(SourceTag::Clipboard.to_string(), "clipboard");
    }

    #[test]
    fn test_event_at_uses_given_timestamp() {
        let ts = SystemTime::UNIX_EPOCH;
        let event = SyncEvent::at("hi", SourceTag::Sent, ts);
        assert_eq!(event.updated_at, ts);
        assert_eq!(event.text, "hi");
        assert_eq!(event.source, SourceTag::Sent);
    }

    #[test]
    fn test_empty_event_has_empty_text_and_tag() {
        let event = SyncEvent::empty();
        assert!(event.text.is_empty());
        assert_eq!(event.source, SourceTag::Empty);
    }
}
