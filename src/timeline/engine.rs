use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    storage::{document::TimelineDocument, user_store::UserStore},
    utils::clock::Clock,
};

use super::{
    activity_tree::{ActivityTree, ResolvedActivity},
    error::{TimelineError, TimelineResult},
    log::{ClosedSpan, TimeSpan, TimelineLog},
};

/// Picks where a new activity given by a bare name should live.
#[cfg_attr(test, mockall::automock)]
pub trait PathSelector {
    /// `options` starts with `"/"` followed by every existing prefix such as `"work/"`.
    /// Returns the chosen prefix, or `None` when the user aborted.
    fn select(&mut self, name: &str, options: &[String]) -> Option<String>;
}

/// Orchestrates the activity tree and the timeline log of one user.
///
/// Operations only mutate memory. Nothing reaches the disk until [TimelineEngine::save], and a
/// failed operation must not be followed by a save.
pub struct TimelineEngine {
    user: String,
    store: UserStore,
    document: TimelineDocument,
    clock: Box<dyn Clock>,
}

impl TimelineEngine {
    pub fn new(
        user: String,
        store: UserStore,
        document: TimelineDocument,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            user,
            store,
            document,
            clock,
        }
    }

    /// Loads the timeline of `user`, or of the default user when `None`.
    pub fn load(
        store: UserStore,
        user: Option<&str>,
        clock: Box<dyn Clock>,
    ) -> TimelineResult<Self> {
        let user = store.resolve_user(user)?;
        let document = store.read_document(&user)?;

        for span in document.timeline.days().values().flatten() {
            if document.activities.path_of_id(span.id).is_none() {
                warn!("Record '{}' refers to unknown activity {}", span.name, span.id);
            }
        }

        info!("Loaded timeline of {user}");
        Ok(Self::new(user, store, document, clock))
    }

    /// Writes the whole state back, replacing the previous document.
    pub fn save(&self) -> TimelineResult<()> {
        self.store.write_document(&self.user, &self.document)
    }

    /// Starts an activity now. Whatever was ongoing is stopped at the same instant and returned.
    pub fn start(&mut self, name_or_path: &str) -> TimelineResult<Option<ClosedSpan>> {
        let activity = self
            .document
            .activities
            .resolve(name_or_path)
            .ok_or_else(|| TimelineError::ActivityNotFound(name_or_path.to_string()))?;

        let now = self.clock.time();
        let closed = if self.document.timeline.current_ongoing().is_some() {
            Some(self.close_at(now)?)
        } else {
            None
        };

        self.document
            .timeline
            .append_start(activity.id, &activity.name, now)?;
        info!("Started {} at {now}", activity.path);
        Ok(closed)
    }

    /// Stops the ongoing activity now.
    pub fn stop(&mut self) -> TimelineResult<ClosedSpan> {
        let now = self.clock.time();
        self.close_at(now)
    }

    pub fn status(&self) -> Option<&TimeSpan> {
        self.document.timeline.current_ongoing()
    }

    pub fn recent(&self, limit: usize) -> BTreeMap<String, Vec<TimeSpan>> {
        self.document.timeline.most_recent(limit)
    }

    /// Creates an activity. An absolute path is used as is, a bare name is placed where
    /// `selector` decides.
    pub fn create_activity(
        &mut self,
        path: &str,
        create_parents: bool,
        selector: &mut dyn PathSelector,
    ) -> TimelineResult<ResolvedActivity> {
        let path = self.placement_path(path, selector)?;
        let id = self.document.activities.create(&path, create_parents)?;
        info!("Created activity {path}");

        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Ok(ResolvedActivity { id, name, path })
    }

    /// Absolute path of an activity, found by name or path.
    pub fn activity_path(&self, name_or_path: &str) -> TimelineResult<String> {
        self.document
            .activities
            .resolve(name_or_path)
            .map(|v| v.path)
            .ok_or_else(|| TimelineError::ActivityNotFound(name_or_path.to_string()))
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn activities(&self) -> &ActivityTree {
        &self.document.activities
    }

    pub fn timeline(&self) -> &TimelineLog {
        &self.document.timeline
    }

    pub fn document(&self) -> &TimelineDocument {
        &self.document
    }

    /// Current time as seen by the engine.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.time()
    }

    fn close_at(&mut self, now: DateTime<Utc>) -> TimelineResult<ClosedSpan> {
        let closed = self.document.timeline.close_ongoing(now)?;
        info!("Stopped {} at {now}", closed.name);
        Ok(closed)
    }

    fn placement_path(&self, path: &str, selector: &mut dyn PathSelector) -> TimelineResult<String> {
        if path.starts_with('/') {
            return Ok(path.to_string());
        }
        if path.contains('/') {
            return Err(TimelineError::malformed_path(
                path,
                "activity names can't contain '/'",
            ));
        }

        let mut options = vec!["/".to_string()];
        options.extend(self.document.activities.enumerate_paths());

        let prefix = selector
            .select(path, &options)
            .ok_or(TimelineError::NoSelectionMade)?;
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            Ok(format!("/{path}"))
        } else {
            Ok(format!("/{prefix}/{path}"))
        }
    }
}
