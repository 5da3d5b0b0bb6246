//! Blocking HTTP access to the pixiv ajax API.
//!
//! - `transport`: the `Transport` seam and its `ureq` implementation
//! - `envelope`: decoding of the `{ error, message, body }` response envelope

pub mod envelope;
pub mod transport;

#[cfg(test)]
pub mod fake;

pub use envelope::get_body;
pub use transport::{Transport, UreqTransport};
