//! KISS TNC client for packet radio over TCP.
//!
//! kisslink talks to a Terminal Node Controller using the KISS framing
//! protocol: it sends data and TNC parameter frames, and delivers received
//! data frames to the application from a background receive thread.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP stream to the TNC
//! - [`frame`]: byte-stuffed framing, escaping and stream reassembly
//! - [`client`]: connection lifecycle, typed send operations and receive pump

/// Re-export transport types.
pub mod transport {
    pub use kisslink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use kisslink_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use kisslink_client::*;
}

pub use kisslink_client::{ClientError, Connection, FrameHandler, ReceiveEvent};
