use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;

use crate::codec::{decode_message, parse_payload, payload_length, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Reads length-prefixed JSON messages from any `Read` stream.
///
/// Reads exactly the bytes of one message and nothing more, so the rest of
/// the stream stays untouched for whoever owns it next.
pub struct MessageReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read and parse the next message (blocking).
    ///
    /// Returns `Ok(None)` when fewer than 4 header bytes are available or the
    /// prefix announces an empty payload: the peer sent nothing. A short
    /// payload or malformed JSON is an error.
    pub fn read_message<M: DeserializeOwned>(&mut self) -> Result<Option<M>> {
        match self.read_payload()? {
            Some(payload) => parse_payload(&payload).map(Some),
            None => Ok(None),
        }
    }

    /// Read the next raw payload without parsing it.
    pub fn read_payload(&mut self) -> Result<Option<Bytes>> {
        let mut frame = BytesMut::zeroed(HEADER_SIZE);
        let read = read_full(&mut self.inner, &mut frame)?;
        if read < HEADER_SIZE {
            tracing::debug!(read, "end of input before message header");
            return Ok(None);
        }

        // A bare header only decodes when the prefix is zero.
        let max = self.config.max_message_size;
        if decode_message(&mut frame, max)?.is_some() {
            tracing::debug!("empty message payload");
            return Ok(None);
        }

        let expected = payload_length(&frame);
        frame.resize(HEADER_SIZE + expected, 0);
        let actual = read_full(&mut self.inner, &mut frame[HEADER_SIZE..])?;
        if actual < expected {
            return Err(FrameError::Truncated { expected, actual });
        }

        tracing::trace!(size = expected, "read message");
        decode_message(&mut frame, max)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Fill `buf` until it is full or the stream hits EOF. Returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};
    use serde_json::{json, Value};

    use super::*;
    use crate::codec::encode_message;
    use crate::message::HostRequest;

    fn wire(value: &Value) -> Vec<u8> {
        let mut dst = BytesMut::new();
        encode_message(value, usize::MAX, &mut dst).unwrap();
        dst.to_vec()
    }

    #[test]
    fn read_single_message() {
        let mut reader = MessageReader::new(Cursor::new(wire(&json!({"cdxml": "<CDXML/>"}))));
        let value: Value = reader.read_message().unwrap().unwrap();
        assert_eq!(value, json!({"cdxml": "<CDXML/>"}));
    }

    #[test]
    fn read_typed_request() {
        let mut reader = MessageReader::new(Cursor::new(wire(&json!({"cdxBase64": "AAEC"}))));
        let request: HostRequest = reader.read_message().unwrap().unwrap();
        assert_eq!(request.encoded_cdx(), Some("AAEC"));
        assert!(request.cdxml.is_none());
    }

    #[test]
    fn empty_stream_is_end_of_input() {
        let mut reader = MessageReader::new(Cursor::new(Vec::<u8>::new()));
        let message: Option<Value> = reader.read_message().unwrap();
        assert!(message.is_none());
    }

    #[test]
    fn partial_header_is_end_of_input() {
        let mut reader = MessageReader::new(Cursor::new(vec![0x05, 0x00, 0x00]));
        let message: Option<Value> = reader.read_message().unwrap();
        assert!(message.is_none());
    }

    #[test]
    fn zero_length_prefix_is_end_of_input() {
        let mut reader = MessageReader::new(Cursor::new(0u32.to_ne_bytes().to_vec()));
        let message: Option<Value> = reader.read_message().unwrap();
        assert!(message.is_none());
    }

    #[test]
    fn short_payload_is_truncated() {
        let mut partial = BytesMut::new();
        partial.put_slice(&32u32.to_ne_bytes());
        partial.put_slice(br#"{"cdxml":"#);

        let mut reader = MessageReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_message::<Value>().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Truncated {
                expected: 32,
                actual: 9
            }
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let mut bad = BytesMut::new();
        bad.put_slice(&5u32.to_ne_bytes());
        bad.put_slice(b"{oops");

        let mut reader = MessageReader::new(Cursor::new(bad.to_vec()));
        let err = reader.read_message::<Value>().unwrap_err();
        assert!(matches!(err, FrameError::Json(_)));
    }

    #[test]
    fn oversized_prefix_is_rejected_before_allocation() {
        let mut wire = BytesMut::new();
        wire.put_slice(&u32::MAX.to_ne_bytes());

        let cfg = FrameConfig {
            max_message_size: 1024,
        };
        let mut reader = MessageReader::with_config(Cursor::new(wire.to_vec()), cfg);
        let err = reader.read_payload().unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { max: 1024, .. }));
    }

    #[test]
    fn reads_only_one_message() {
        let mut bytes = wire(&json!({"n": 1}));
        bytes.extend_from_slice(b"trailing");

        let mut reader = MessageReader::new(Cursor::new(bytes));
        let _: Value = reader.read_message().unwrap().unwrap();
        let cursor = reader.into_inner();
        assert_eq!(cursor.position() as usize, cursor.get_ref().len() - 8);
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&json!({"slow": true})),
            pos: 0,
        };
        let mut reader = MessageReader::new(byte_reader);
        let value: Value = reader.read_message().unwrap().unwrap();
        assert_eq!(value, json!({"slow": true}));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(wire(&json!({"ok": 1}))),
        };
        let mut reader = MessageReader::new(reader);
        let value: Value = reader.read_message().unwrap().unwrap();
        assert_eq!(value, json!({"ok": 1}));
    }

    #[test]
    fn other_io_errors_propagate() {
        let mut reader = MessageReader::new(FailingReader);
        let err = reader.read_payload().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }
}
