//! Length-prefixed request/response messaging over TCP.
//!
//! # Crate Structure
//!
//! - [`transport`] — Blocking TCP stream handle and listener
//! - [`frame`] — Wire codec and exact-size stream I/O
//! - [`client`] — Request/response exchange, client connection, sequence driver

/// Re-export transport types.
pub mod transport {
    pub use lenframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use lenframe_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use lenframe_client::*;
}
