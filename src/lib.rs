//! gather — fetches syndicated news feeds and archives their metadata in
//! SQLite.
//!
//! The crate is split along the seams the binary composes:
//! - [`fetch`] retrieves a feed document over HTTP(S), negotiates its
//!   transport encoding, and fingerprints the decoded content
//! - [`feed`] validates feed descriptions and owns the entity lifecycle
//!   (construct, list, insert, refresh; update/delete are stubs)
//! - [`storage`] maps feed records to rows of the `rss_feeds` table behind
//!   a single exclusive SQLite connection
//! - [`config`] reads the optional TOML configuration

pub mod config;
pub mod feed;
pub mod fetch;
pub mod storage;
