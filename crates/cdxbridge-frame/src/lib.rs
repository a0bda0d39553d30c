//! Length-prefixed JSON message channel for browser native messaging hosts.
//!
//! Every message on the wire is:
//! - A 4-byte unsigned payload length in host-native byte order
//! - A UTF-8 encoded JSON object of exactly that length
//!
//! A host performs one read and one write per invocation; there is no
//! message loop and no multiplexing.

pub mod codec;
pub mod error;
pub mod message;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_message, encode_message, parse_payload, FrameConfig, DEFAULT_MAX_MESSAGE_SIZE,
    HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use message::{HostRequest, HostResponse};
pub use reader::MessageReader;
pub use writer::MessageWriter;
