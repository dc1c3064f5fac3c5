//! Client for the `YouTube` Data API v3.
//!
//! Covers the three calls ingestion needs: keyword search, video statistics,
//! and top-level comment threads. Requests rotate through a [`KeyPool`].

pub mod client;
pub mod error;
pub mod key_pool;
pub mod types;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use key_pool::KeyPool;
