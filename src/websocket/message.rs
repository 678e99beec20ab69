//! WebSocket frame types
//!
//! Data frames carry an opaque payload plus its type tag and are relayed
//! exactly as received. Control frames never reach the broadcaster.

use axum::body::Bytes;
use axum::extract::ws;

/// Type tag of a data frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Binary,
}

/// WebSocket message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// Ping frame
    Ping(Vec<u8>),
    /// Pong frame
    Pong(Vec<u8>),
    /// Close frame
    Close(Option<CloseFrame>),
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::Binary(data.into())
    }

    /// Type tag for data frames, `None` for control frames
    pub fn kind(&self) -> Option<MessageKind> {
        match self {
            Self::Text(_) => Some(MessageKind::Text),
            Self::Binary(_) => Some(MessageKind::Binary),
            Self::Ping(_) | Self::Pong(_) | Self::Close(_) => None,
        }
    }

    /// Whether this frame is relayed by the broadcaster
    pub fn is_data(&self) -> bool {
        self.kind().is_some()
    }

    /// Raw payload bytes
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(data) | Self::Ping(data) | Self::Pong(data) => data,
            Self::Close(_) => &[],
        }
    }

    /// Convert from Axum's WebSocket message
    pub fn from_axum(msg: ws::Message) -> Self {
        match msg {
            ws::Message::Text(text) => Self::Text(text.as_str().to_owned()),
            ws::Message::Binary(data) => Self::Binary(data.to_vec()),
            ws::Message::Ping(data) => Self::Ping(data.to_vec()),
            ws::Message::Pong(data) => Self::Pong(data.to_vec()),
            ws::Message::Close(frame) => Self::Close(frame.map(|f| CloseFrame {
                code: f.code,
                reason: f.reason.as_str().to_owned(),
            })),
        }
    }

    /// Convert to Axum's WebSocket message
    pub fn into_axum(self) -> ws::Message {
        match self {
            Self::Text(text) => ws::Message::Text(ws::Utf8Bytes::from(text)),
            Self::Binary(data) => ws::Message::Binary(Bytes::from(data)),
            Self::Ping(data) => ws::Message::Ping(Bytes::from(data)),
            Self::Pong(data) => ws::Message::Pong(Bytes::from(data)),
            Self::Close(frame) => ws::Message::Close(frame.map(|f| ws::CloseFrame {
                code: f.code,
                reason: ws::Utf8Bytes::from(f.reason),
            })),
        }
    }
}

/// WebSocket close frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: u16,
    pub reason: String,
}
