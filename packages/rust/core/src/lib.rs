//! Core run orchestration and domain logic for tubedigest.
//!
//! This crate ties together feed parsing, transcript retrieval,
//! summarization, storage, and notification into the end-to-end channel run.

pub mod digest;
pub mod pipeline;
pub mod processor;
pub mod vcs;
