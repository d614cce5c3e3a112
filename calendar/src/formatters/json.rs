use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Serialize;

use super::{time_range, CalendarFormatter};
use crate::calendar_grid::CalendarGrid;
use crate::date_key::DateKey;
use crate::event::Event;
use crate::facets::Facets;

#[derive(Debug, Serialize)]
struct MonthOutput<'a> {
    month: String,
    title: String,
    weeks: Vec<Vec<DayOutput<'a>>>,
}

#[derive(Debug, Serialize)]
struct DayOutput<'a> {
    date: DateKey,
    is_current_month: bool,
    is_today: bool,
    events: Vec<EventOutput<'a>>,
    more_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    more_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventOutput<'a> {
    #[serde(flatten)]
    event: &'a Event,
    time: String,
}

#[derive(Debug, Serialize)]
struct DayListOutput<'a> {
    date: DateKey,
    events: Vec<EventOutput<'a>>,
}

/// Machine-readable output for scripts and other front-ends
pub struct JsonCalendarFormatter {
    pub pretty: bool,
}

impl JsonCalendarFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("Failed to serialize calendar output")
    }
}

impl Default for JsonCalendarFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

fn event_output<'a>(event: &'a Event, timezone: &Tz) -> EventOutput<'a> {
    EventOutput {
        event,
        time: time_range(event, timezone),
    }
}

impl CalendarFormatter for JsonCalendarFormatter {
    fn format_month(
        &self,
        grid: &CalendarGrid<'_>,
        events_per_day: usize,
        timezone: Tz,
    ) -> Result<String> {
        let weeks = grid
            .weeks
            .iter()
            .map(|week| {
                week.days
                    .iter()
                    .map(|cell| {
                        let more_count = cell.overflow_count(events_per_day);
                        DayOutput {
                            date: cell.key(),
                            is_current_month: cell.is_current_month,
                            is_today: cell.is_today,
                            events: cell
                                .visible_events(events_per_day)
                                .iter()
                                .map(|event| event_output(event, &timezone))
                                .collect(),
                            more_count,
                            more_link: (more_count > 0).then(|| cell.drill_through_path()),
                        }
                    })
                    .collect()
            })
            .collect();

        self.to_json(&MonthOutput {
            month: grid.month.to_string(),
            title: grid.month.title(),
            weeks,
        })
    }

    fn format_day(&self, key: DateKey, events: &[&Event], timezone: Tz) -> Result<String> {
        self.to_json(&DayListOutput {
            date: key,
            events: events.iter().map(|event| event_output(event, &timezone)).collect(),
        })
    }

    fn format_event(&self, event: &Event, timezone: Tz) -> Result<String> {
        self.to_json(&event_output(event, &timezone))
    }

    fn format_facets(&self, facets: &Facets) -> Result<String> {
        self.to_json(facets)
    }
}
