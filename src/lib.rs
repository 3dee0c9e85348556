//! Command line time tracker. Activities live in a named hierarchy, and starting or stopping
//! one records time spans in a per-user, day bucketed timeline.
//!
//! Every command loads the user's whole timeline, changes it in memory and writes it back as one
//! document. Running several tyme processes against the same user at once is not supported: the
//! last one to save wins.

pub mod cli;
pub mod storage;
pub mod timeline;
pub mod utils;
