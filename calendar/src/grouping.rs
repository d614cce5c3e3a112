use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::date_key::{normalize, DateKey};
use crate::event::Event;

/// Events bucketed by local calendar day.
///
/// Only days with at least one event have an entry, and each bucket keeps the
/// order in which events were supplied.
#[derive(Debug, Clone, Default)]
pub struct EventsByDate<'a> {
    buckets: BTreeMap<DateKey, Vec<&'a Event>>,
    skipped: usize,
}

impl<'a> EventsByDate<'a> {
    /// Events on one day, in bucket order
    pub fn events_on(&self, key: &DateKey) -> &[&'a Event] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get(&self, key: &DateKey) -> Option<&Vec<&'a Event>> {
        self.buckets.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DateKey> + '_ {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &Vec<&'a Event>)> + '_ {
        self.buckets.iter()
    }

    /// Number of distinct days with events
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total events placed in a bucket
    pub fn event_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Events left out because their start date could not be read
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Bucket events by the local date of their start, skipping unreadable dates
pub fn group_by_date<'a, I>(events: I, tz: &Tz) -> EventsByDate<'a>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut grouped = EventsByDate::default();

    for event in events {
        match normalize(&event.start_date, tz) {
            Ok(key) => grouped.buckets.entry(key).or_default().push(event),
            Err(e) => {
                warn!("Skipping {} event {}: {}", event.source.name(), event.id, e);
                grouped.skipped += 1;
            }
        }
    }

    debug!(
        "Grouped {} events into {} dates ({} skipped)",
        grouped.event_count(),
        grouped.len(),
        grouped.skipped
    );
    grouped
}
