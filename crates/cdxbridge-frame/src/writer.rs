use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use serde::Serialize;

use crate::codec::{encode_message, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes length-prefixed JSON messages to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> MessageWriter<T> {
    /// Create a new message writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Serialize, frame and send a message, then flush (blocking).
    pub fn write_message<M: Serialize + ?Sized>(&mut self, message: &M) -> Result<()> {
        self.buf.clear();
        encode_message(message, self.config.max_message_size, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        tracing::trace!(size = self.buf.len(), "wrote message");
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::{json, Value};

    use super::*;
    use crate::message::HostResponse;
    use crate::reader::MessageReader;

    #[test]
    fn roundtrip_through_reader() {
        let mut writer = MessageWriter::new(Cursor::new(Vec::<u8>::new()));
        let message = json!({"success": false, "error": "No input", "nested": {"n": [1, 2]}});
        writer.write_message(&message).unwrap();

        let bytes = writer.into_inner().into_inner();
        let mut reader = MessageReader::new(Cursor::new(bytes));
        let decoded: Value = reader.read_message().unwrap().unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn success_response_omits_error() {
        let mut writer = MessageWriter::new(Vec::<u8>::new());
        writer.write_message(&HostResponse::ok()).unwrap();

        let bytes = writer.into_inner();
        assert_eq!(&bytes[4..], br#"{"success":true}"#);
    }

    #[test]
    fn write_flushes_stream() {
        let mut writer = MessageWriter::new(FlushTracking::default());
        writer.write_message(&json!({"success": true})).unwrap();
        assert_eq!(writer.get_ref().flushes, 1);
        assert!(!writer.get_ref().data.is_empty());
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = MessageWriter::new(OneBytePerWrite::default());
        writer.write_message(&json!({"cdx": "AAEC"})).unwrap();

        let bytes = writer.into_inner().data;
        let mut reader = MessageReader::new(Cursor::new(bytes));
        let decoded: Value = reader.read_message().unwrap().unwrap();
        assert_eq!(decoded, json!({"cdx": "AAEC"}));
    }

    #[test]
    fn zero_length_write_is_error() {
        let mut writer = MessageWriter::new(ClosedWriter);
        let err = writer.write_message(&json!({})).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn oversized_message_is_rejected() {
        let cfg = FrameConfig {
            max_message_size: 8,
        };
        let mut writer = MessageWriter::with_config(Vec::<u8>::new(), cfg);
        let err = writer
            .write_message(&json!({"error": "a long reason"}))
            .unwrap_err();
        assert!(matches!(err, FrameError::MessageTooLarge { .. }));
        assert!(writer.get_ref().is_empty());
    }

    #[derive(Default)]
    struct FlushTracking {
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for FlushTracking {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct OneBytePerWrite {
        data: Vec<u8>,
    }

    impl Write for OneBytePerWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            match buf.first() {
                Some(byte) => {
                    self.data.push(*byte);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
