//! Core types and pipeline for the Faculty teacher directory.
//!
//! Raw person records from two differently-shaped sources are normalised into
//! one canonical [`Teacher`](teacher::Teacher) schema, deduplicated by
//! identity key, validated, and then queried by filter, sort, search and
//! aggregate helpers.
//!
//! This crate is deliberately free of I/O. Payload decoding lives in
//! `faculty-source`; reading files and printing results lives in
//! `faculty-cli`.

pub mod config;
pub mod directory;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod raw;
pub mod stats;
pub mod teacher;
pub mod validate;
pub mod view;

mod lenient;

pub use error::{Error, Result};
