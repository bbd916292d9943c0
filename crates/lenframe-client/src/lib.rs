//! Synchronous request/response client for lenframe.
//!
//! One request frame goes out, one response frame comes back, strictly in
//! order and with a single exchange in flight. [`Client`] owns the connection;
//! [`run_sequence`] drives an ordered list of requests and stops at the first
//! failure.

pub mod client;
pub mod connector;
pub mod driver;
pub mod error;
pub mod exchange;

#[cfg(test)]
mod test_support;

pub use client::{Client, ClientConfig};
pub use connector::{connect, connect_with_config};
pub use driver::{
    run, run_sequence, Exchanged, SequenceFailure, SequenceReport, DEFAULT_ADDR,
    DEFAULT_REQUESTS,
};
pub use error::{ClientError, Result};
pub use exchange::{exchange, query, Direction, ExchangeError, Stage};
