use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FrameError, Result};

/// Message header: a single u32 payload length.
pub const HEADER_SIZE: usize = 4;

/// Default maximum payload size: 64 MiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Encode a value into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────────────┐
/// │ Length (4B)      │ Payload                  │
/// │ host-native u32  │ UTF-8 JSON (Length bytes)│
/// └──────────────────┴──────────────────────────┘
/// ```
pub fn encode_message<T: Serialize + ?Sized>(
    value: &T,
    max_size: usize,
    dst: &mut BytesMut,
) -> Result<()> {
    let payload = serde_json::to_vec(value)?;
    let limit = max_size.min(u32::MAX as usize);
    if payload.len() > limit {
        return Err(FrameError::MessageTooLarge {
            size: payload.len(),
            max: limit,
        });
    }

    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&(payload.len() as u32).to_ne_bytes());
    dst.put_slice(&payload);
    Ok(())
}

/// Decode one message payload from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete message yet.
/// On success, consumes the message bytes from the buffer and returns the
/// raw JSON payload.
pub fn decode_message(src: &mut BytesMut, max_size: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let payload_len = payload_length(&src[..HEADER_SIZE]);
    if payload_len > max_size {
        return Err(FrameError::MessageTooLarge {
            size: payload_len,
            max: max_size,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Parse a raw payload as UTF-8 JSON into `T`.
pub fn parse_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(payload)?;
    Ok(serde_json::from_str(text)?)
}

pub(crate) fn payload_length(header: &[u8]) -> usize {
    let mut prefix = [0u8; HEADER_SIZE];
    prefix.copy_from_slice(&header[..HEADER_SIZE]);
    u32::from_ne_bytes(prefix) as usize
}

/// Configuration for the message codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 64 MiB.
    pub max_message_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
