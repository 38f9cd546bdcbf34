//! Tubely Database Library
//!
//! Persistence for video records: the [`VideoStore`] seam used by the upload
//! pipeline and handlers, and its PostgreSQL implementation.

pub mod db;

pub use db::{VideoRepository, VideoStore};
