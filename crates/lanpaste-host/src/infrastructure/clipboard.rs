//! Clipboard access for the "paste from clipboard" action.
//!
//! The facade only needs to read plain text.  [`SystemClipboard`] does that
//! through `arboard`; tests inject [`mock::MockClipboard`] instead so they
//! never depend on a desktop session.

use thiserror::Error;

/// Error type for clipboard reads.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    /// The platform clipboard could not be opened (e.g. no display server).
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    /// The clipboard is empty or holds something other than text.
    #[error("clipboard holds no text")]
    NoText,
}

/// Trait abstracting where clipboard text comes from.
pub trait ClipboardSource: Send + Sync {
    /// Returns the current clipboard text.
    fn read_text(&self) -> Result<String, ClipboardError>;
}

/// The desktop clipboard.
///
/// A fresh `arboard::Clipboard` handle is opened per read so this type stays
/// `Send + Sync` on every platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard.get_text().map_err(|e| match e {
            arboard::Error::ContentNotAvailable => ClipboardError::NoText,
            other => ClipboardError::Unavailable(other.to_string()),
        })
    }
}

pub mod mock {
    //! In-memory clipboard for tests.

    use std::sync::{Mutex, PoisonError};

    use super::{ClipboardError, ClipboardSource};

    /// A clipboard whose content the test sets directly.
    #[derive(Debug, Default)]
    pub struct MockClipboard {
        content: Mutex<Option<String>>,
        reads: Mutex<u32>,
    }

    impl MockClipboard {
        /// Creates a mock holding `text`.
        pub fn with_text(text: impl Into<String>) -> Self {
            let mock = Self::default();
            mock.set_text(text);
            mock
        }

        /// Creates a mock with nothing on it.
        pub fn empty() -> Self {
            Self::default()
        }

        pub fn set_text(&self, text: impl Into<String>) {
            *self.content.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.into());
        }

        /// Number of times [`ClipboardSource::read_text`] was called.
        pub fn read_count(&self) -> u32 {
            *self.reads.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl ClipboardSource for MockClipboard {
        fn read_text(&self) -> Result<String, ClipboardError> {
            *self.reads.lock().unwrap_or_else(PoisonError::into_inner) += 1;
            self.content
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
                .ok_or(ClipboardError::NoText)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockClipboard;
    use super::*;

    #[test]
    fn test_mock_returns_text_it_was_given() {
        let clipboard = MockClipboard::with_text("copied");
        assert_eq!(clipboard.read_text(), Ok("copied".to_string()));
    }

    #[test]
    fn test_empty_mock_reports_no_text() {
        let clipboard = MockClipboard::empty();
        assert_eq!(clipboard.read_text(), Err(ClipboardError::NoText));
    }

    #[test]
    fn test_mock_counts_reads() {
        let clipboard = MockClipboard::with_text("x");
        let _ = clipboard.read_text();
        let _ = clipboard.read_text();
        assert_eq!(clipboard.read_count(), 2);
    }

    #[test]
    fn test_mock_text_can_be_replaced() {
        let clipboard = MockClipboard::empty();
        clipboard.set_text("later");
        assert_eq!(clipboard.read_text(), Ok("later".to_string()));
    }
}
