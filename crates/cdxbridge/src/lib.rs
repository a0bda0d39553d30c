//! Deliver CDXML structures to ChemDraw as CDX.
//!
//! cdxbridge turns CDXML markup into the binary CDX interchange format and
//! hands it to the caller: onto the Windows clipboard for a browser extension
//! speaking native messaging, or as a file download over HTTP.
//!
//! # Crate Structure
//!
//! - [`frame`]: length-prefixed JSON messages for the native-messaging channel
//! - [`convert`]: prioritized conversion chain with a pre-encoded fallback
//! - [`clipboard`]: transactional clipboard writes
//! - [`http`]: HTTP endpoint (behind the `http` feature)
//! - [`host`]: the single-shot native-messaging host

/// Re-export framing types.
pub mod frame {
    pub use cdxbridge_frame::*;
}

/// Re-export conversion types.
pub mod convert {
    pub use cdxbridge_convert::*;
}

/// Re-export clipboard types.
pub mod clipboard {
    pub use cdxbridge_clipboard::*;
}

/// Re-export HTTP types (requires `http` feature).
#[cfg(feature = "http")]
pub mod http {
    pub use cdxbridge_http::*;
}

pub mod host;

#[cfg(feature = "cli")]
pub mod logging;
