use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    storage::document::timestamp_ser,
    utils::time::{date_to_record_name, days_after},
};

use super::error::{TimelineError, TimelineResult};

/// A span of time spent on an activity. A span without `end` is the ongoing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub id: Uuid,
    /// Name of the activity at the moment the span was started.
    pub name: String,
    #[serde(with = "timestamp_ser")]
    pub start: DateTime<Utc>,
    #[serde(
        default,
        with = "timestamp_ser::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<DateTime<Utc>>,
    /// Marks a copy filed under a day that a cross-midnight span passed through.
    #[serde(default, alias = "previous", skip_serializing_if = "is_false")]
    pub synthetic: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TimeSpan {
    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }

    /// The latest moment this span covers. Ongoing spans only know their start.
    fn last_moment(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }
}

/// Span that has just been closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub name: String,
}

/// Day bucketed log of spans. Keys are `YYYY-MM-DD`, so lexicographic order of the keys is the
/// chronological order, and within a bucket spans are kept in the order they were started.
///
/// The ongoing span, if any, is always the last span of the last bucket. It is never tracked
/// separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineLog {
    days: BTreeMap<String, Vec<TimeSpan>>,
}

impl TimelineLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days(&self) -> &BTreeMap<String, Vec<TimeSpan>> {
        &self.days
    }

    /// Opens a new span at `at`. Closing whatever is ongoing is the caller's job.
    pub fn append_start(
        &mut self,
        activity_id: Uuid,
        name: &str,
        at: DateTime<Utc>,
    ) -> TimelineResult<()> {
        if let Some(last) = self.last_span() {
            if last.is_ongoing() {
                return Err(TimelineError::ActivityAlreadyOngoing(last.name.clone()));
            }
            if at < last.last_moment() {
                return Err(TimelineError::ClockRegression {
                    previous: last.last_moment(),
                    at,
                });
            }
        }

        self.days
            .entry(date_to_record_name(at.date_naive()))
            .or_default()
            .push(TimeSpan {
                id: activity_id,
                name: name.to_string(),
                start: at,
                end: None,
                synthetic: false,
            });
        Ok(())
    }

    /// Closes the ongoing span at `at`. When the span started on an earlier day, every following
    /// day up to and including the day of `at` gets a synthetic copy of the closed span.
    pub fn close_ongoing(&mut self, at: DateTime<Utc>) -> TimelineResult<ClosedSpan> {
        let Some(ongoing) = self
            .days
            .values_mut()
            .next_back()
            .and_then(|spans| spans.last_mut())
            .filter(|span| span.is_ongoing())
        else {
            return Err(TimelineError::NoOngoingActivity);
        };

        if at < ongoing.start {
            return Err(TimelineError::ClockRegression {
                previous: ongoing.start,
                at,
            });
        }

        ongoing.end = Some(at);
        let closed = ongoing.clone();

        for day in days_after(closed.start.date_naive(), at.date_naive()) {
            let key = date_to_record_name(day);
            debug!("Filing continuation of '{}' under {key}", closed.name);
            self.days.entry(key).or_default().push(TimeSpan {
                synthetic: true,
                ..closed.clone()
            });
        }

        Ok(ClosedSpan {
            start: closed.start,
            end: at,
            name: closed.name,
        })
    }

    pub fn current_ongoing(&self) -> Option<&TimeSpan> {
        self.last_span().filter(|span| span.is_ongoing())
    }

    /// Collects up to `limit` of the latest non-synthetic spans, grouped by day. Each day keeps
    /// its spans in chronological order.
    pub fn most_recent(&self, limit: usize) -> BTreeMap<String, Vec<TimeSpan>> {
        let mut collected = BTreeMap::<String, Vec<TimeSpan>>::new();
        let latest = self
            .days
            .iter()
            .rev()
            .flat_map(|(day, spans)| spans.iter().rev().map(move |span| (day, span)))
            .filter(|(_, span)| !span.synthetic)
            .take(limit);

        for (day, span) in latest {
            collected.entry(day.clone()).or_default().push(span.clone());
        }
        for spans in collected.values_mut() {
            spans.reverse();
        }
        collected
    }

    /// Checks the invariants a loaded log must satisfy: at most one ongoing span, placed last in
    /// the last bucket, and no closed span ending before it starts.
    pub fn validate(&self) -> TimelineResult<()> {
        let ongoing = self
            .days
            .values()
            .flatten()
            .filter(|span| span.is_ongoing())
            .count();
        if ongoing > 1 {
            return Err(TimelineError::CorruptTimeline(format!(
                "{ongoing} activities are ongoing at the same time"
            )));
        }
        if ongoing == 1 && self.current_ongoing().is_none() {
            return Err(TimelineError::CorruptTimeline(
                "the ongoing activity is not the latest record".into(),
            ));
        }
        if let Some((day, span)) = self.days.iter().find_map(|(day, spans)| {
            spans
                .iter()
                .find(|span| span.end.is_some_and(|end| end < span.start))
                .map(|span| (day, span))
        }) {
            return Err(TimelineError::CorruptTimeline(format!(
                "'{}' on {day} ends before it starts",
                span.name
            )));
        }
        info!(
            "Timeline has {} days, {} ongoing",
            self.days.len(),
            ongoing
        );
        Ok(())
    }

    fn last_span(&self) -> Option<&TimeSpan> {
        self.days.values().next_back().and_then(|spans| spans.last())
    }
}
