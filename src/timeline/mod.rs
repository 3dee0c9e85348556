//! The timeline engine. An [activity_tree::ActivityTree] names what time can be spent on, a
//! [log::TimelineLog] records when it was spent, and [engine::TimelineEngine] ties both together
//! and owns their persistence.

pub mod activity_tree;
pub mod engine;
pub mod error;
pub mod log;
