#![forbid(unsafe_code)]

//! Shared library for the redub batch tools.
//!
//! The crate is intentionally small; it exposes the modules the pipeline
//! binaries share: configuration, the YouTube discovery client, task-file
//! handling, and the publish-side helpers (translation, titles, scheduling,
//! uploader config).

pub mod config;
pub mod schedule;
pub mod tasks;
pub mod titles;
pub mod translate;
pub mod upload;
pub mod youtube;
