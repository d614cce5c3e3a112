use anyhow::Result;
use chrono_tz::Tz;

use crate::calendar_grid::CalendarGrid;
use crate::date_key::{local_datetime, DateKey};
use crate::event::Event;
use crate::facets::Facets;

pub mod json;
pub mod terminal;

pub use json::JsonCalendarFormatter;
pub use terminal::TerminalCalendarFormatter;

/// Renders pipeline output for one kind of consumer
pub trait CalendarFormatter {
    /// Month grid, truncating each day to `events_per_day`
    fn format_month(
        &self,
        grid: &CalendarGrid<'_>,
        events_per_day: usize,
        timezone: Tz,
    ) -> Result<String>;

    /// Every event of one day, in bucket order
    fn format_day(&self, key: DateKey, events: &[&Event], timezone: Tz) -> Result<String>;

    /// Full details of a single event
    fn format_event(&self, event: &Event, timezone: Tz) -> Result<String>;

    fn format_facets(&self, facets: &Facets) -> Result<String>;
}

/// Lowercase 12-hour clock label such as "4:30 pm"
pub fn format_time(date: &str, timezone: &Tz) -> Option<String> {
    local_datetime(date, timezone)
        .ok()
        .map(|local| local.format("%-I:%M %P").to_string())
}

/// Start label, followed by the end label when the event has a distinct end
pub fn time_range(event: &Event, timezone: &Tz) -> String {
    let start = format_time(&event.start_date, timezone).unwrap_or_default();
    match event.end_date.as_deref() {
        Some(end) if end != event.start_date => match format_time(end, timezone) {
            Some(end_label) => format!("{} - {}", start, end_label),
            None => start,
        },
        _ => start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_is_lowercase_twelve_hour() {
        let tz = chrono_tz::America::New_York;
        assert_eq!(format_time("2025-11-12T16:30:00", &tz).as_deref(), Some("4:30 pm"));
        assert_eq!(format_time("2025-11-13T05:05:00Z", &tz).as_deref(), Some("12:05 am"));
        assert_eq!(format_time("not a date", &tz), None);
    }

    #[test]
    fn test_time_range() {
        let tz = chrono_tz::UTC;
        let event = Event::new(1, "Workshop", "2025-11-12T09:00:00");
        assert_eq!(time_range(&event, &tz), "9:00 am");

        let event = event.with_end_date("2025-11-12T11:30:00");
        assert_eq!(time_range(&event, &tz), "9:00 am - 11:30 am");

        let same =
            Event::new(2, "Instant", "2025-11-12T09:00:00").with_end_date("2025-11-12T09:00:00");
        assert_eq!(time_range(&same, &tz), "9:00 am");
    }
}
