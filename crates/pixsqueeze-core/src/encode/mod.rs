//! Lossy re-encoding for pixsqueeze.
//!
//! The only output codec is baseline JPEG; the caller picks the size/fidelity
//! tradeoff with a [`Quality`](crate::Quality).

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError, JPEG_CONTENT_TYPE};
