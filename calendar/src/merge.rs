use tracing::{debug, warn};

use crate::errors::CalendarError;
use crate::event::{Event, EventSource};

/// Outcome of fetching one event feed
#[derive(Debug, Clone)]
pub enum SourceFetch {
    Loaded(Vec<Event>),
    Failed(CalendarError),
}

impl SourceFetch {
    /// Events to show for this feed; a failed fetch contributes none
    pub fn events(&self) -> &[Event] {
        match self {
            SourceFetch::Loaded(events) => events,
            SourceFetch::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&CalendarError> {
        match self {
            SourceFetch::Loaded(_) => None,
            SourceFetch::Failed(error) => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceFetch::Failed(_))
    }
}

impl From<Result<Vec<Event>, CalendarError>> for SourceFetch {
    fn from(result: Result<Vec<Event>, CalendarError>) -> Self {
        match result {
            Ok(events) => SourceFetch::Loaded(events),
            Err(error) => SourceFetch::Failed(error),
        }
    }
}

/// Combine both feeds into one list, local events first.
///
/// Order within each feed is kept and nothing is deduplicated, so the same
/// listing appearing in both feeds shows up twice.
pub fn merge<'a>(local: &'a [Event], external: &'a [Event]) -> Vec<&'a Event> {
    let mut merged = Vec::with_capacity(local.len() + external.len());
    merged.extend(local.iter());
    merged.extend(external.iter());
    debug!(
        "Merged {} local and {} external events",
        local.len(),
        external.len()
    );
    merged
}

/// Merge two fetch outcomes, degrading to whichever feed succeeded
pub fn merge_fetched<'a>(local: &'a SourceFetch, external: &'a SourceFetch) -> Vec<&'a Event> {
    for (source, fetch) in [(EventSource::Local, local), (EventSource::External, external)] {
        if let Some(error) = fetch.error() {
            warn!("Continuing without {} events: {}", source.name(), error);
        }
    }

    merge(local.events(), external.events())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_events() -> Vec<Event> {
        vec![
            Event::new(1, "Startup Breakfast", "2025-11-12T08:00:00"),
            Event::new(2, "Grant Writing Workshop", "2025-11-12T13:00:00"),
        ]
    }

    fn external_events() -> Vec<Event> {
        vec![Event::new("ext-1", "Regional Demo Day", "2025-11-12T18:00:00")
            .with_source(EventSource::External)]
    }

    #[test]
    fn test_local_events_precede_external() {
        let local = local_events();
        let external = external_events();

        let merged = merge(&local, &external);
        let titles: Vec<&str> = merged.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Startup Breakfast", "Grant Writing Workshop", "Regional Demo Day"]
        );
    }

    #[test]
    fn test_empty_external_returns_local_unchanged() {
        let local = local_events();
        let merged = merge(&local, &[]);
        assert_eq!(merged, local.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_both_empty() {
        assert!(merge(&[], &[]).is_empty());
    }

    #[test]
    fn test_duplicates_across_feeds_are_kept() {
        let local = vec![Event::new(1, "Demo Day", "2025-11-12T18:00:00")];
        let external = vec![Event::new("ext-9", "Demo Day", "2025-11-12T18:00:00")
            .with_source(EventSource::External)];

        assert_eq!(merge(&local, &external).len(), 2);
    }

    #[test]
    fn test_failed_external_fetch_degrades_to_local() {
        let local = SourceFetch::Loaded(local_events());
        let external =
            SourceFetch::Failed(CalendarError::source_fetch("external", "502 Bad Gateway"));

        let merged = merge_fetched(&local, &external);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|event| !event.is_external()));
    }

    #[test]
    fn test_failed_local_fetch_keeps_external() {
        let local = SourceFetch::Failed(CalendarError::Network { message: "refused".into() });
        let external = SourceFetch::Loaded(external_events());

        let merged = merge_fetched(&local, &external);
        assert_eq!(merged.len(), 1);
        assert!(merged[0].is_external());
    }
}
