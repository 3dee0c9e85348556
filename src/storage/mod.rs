//! Persistence of user timelines.
//!  - Every user has one document holding both the activity tree and the timeline log.
//!  - Documents are JSON files, read once at startup and replaced as a whole on save.
//!  - `state.json` next to them remembers the default user.

pub mod document;
pub mod user_store;
