//! Text or buffer view of a computed string.
//!
//! Both formats carry the same bytes. The buffer form takes ownership of the string's
//! allocation instead of copying it.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Requested delivery format for a string result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    #[default]
    Text,
    Buffer,
}

impl ResultFormat {
    /// `buffer: true` in host options selects [`ResultFormat::Buffer`].
    pub fn from_buffer_flag(buffer: bool) -> Self {
        if buffer {
            ResultFormat::Buffer
        } else {
            ResultFormat::Text
        }
    }
}

/// A computed string handed to the caller as text or as an owned byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Buffer(Bytes),
}

impl Payload {
    /// Wrap `value` in the requested format. `Buffer` reuses the string's allocation.
    pub fn from_string(value: String, format: ResultFormat) -> Self {
        match format {
            ResultFormat::Text => Payload::Text(value),
            ResultFormat::Buffer => Payload::Buffer(Bytes::from(value.into_bytes())),
        }
    }

    pub fn format(&self) -> ResultFormat {
        match self {
            Payload::Text(_) => ResultFormat::Text,
            Payload::Buffer(_) => ResultFormat::Buffer,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Buffer(buf) => buf,
        }
    }

    /// Text view. `None` only for a buffer holding invalid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Buffer(buf) => std::str::from_utf8(buf).ok(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Payload::Text(text) => Bytes::from(text.into_bytes()),
            Payload::Buffer(buf) => buf,
        }
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_and_text_carry_identical_bytes() {
        let text = Payload::from_string("hello world".to_string(), ResultFormat::Text);
        let buffer = Payload::from_string("hello world".to_string(), ResultFormat::Buffer);
        assert_eq!(text.as_bytes(), buffer.as_bytes());
        assert_eq!(buffer.as_str(), Some("hello world"));
        assert_eq!(buffer.format(), ResultFormat::Buffer);
    }

    #[test]
    fn test_buffer_reuses_allocation() {
        let value = "...threads are busy bees...world".to_string();
        let ptr = value.as_ptr();
        let payload = Payload::from_string(value, ResultFormat::Buffer);
        assert_eq!(payload.as_bytes().as_ptr(), ptr);
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::from_string(String::new(), ResultFormat::Buffer);
        assert!(payload.is_empty());
        assert_eq!(payload.as_str(), Some(""));
    }

    #[test]
    fn test_format_from_flag() {
        assert_eq!(ResultFormat::from_buffer_flag(true), ResultFormat::Buffer);
        assert_eq!(ResultFormat::from_buffer_flag(false), ResultFormat::Text);
        assert_eq!(ResultFormat::default(), ResultFormat::Text);
    }
}
