use anyhow::Result;
use chrono_tz::Tz;

use super::{format_time, time_range, CalendarFormatter};
use crate::calendar_grid::{CalendarCell, CalendarGrid, WEEKDAY_HEADERS};
use crate::date_key::{local_datetime, DateKey};
use crate::event::Event;
use crate::facets::Facets;

const CELL_WIDTH: usize = 16;

/// Terminal formatter for CLI output with color support
pub struct TerminalCalendarFormatter {
    pub use_colors: bool,
}

impl TerminalCalendarFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            match color {
                "red" => format!("\x1b[31m{}\x1b[0m", text),
                "blue" => format!("\x1b[34m{}\x1b[0m", text),
                "gray" => format!("\x1b[90m{}\x1b[0m", text),
                "green" => format!("\x1b[32m{}\x1b[0m", text),
                "bold" => format!("\x1b[1m{}\x1b[0m", text),
                _ => text.to_string(),
            }
        } else {
            text.to_string()
        }
    }

    /// Lines shown inside one day cell below its day number
    fn cell_lines(
        &self,
        cell: &CalendarCell<'_>,
        events_per_day: usize,
        timezone: &Tz,
    ) -> Vec<String> {
        let mut lines: Vec<String> = cell
            .visible_events(events_per_day)
            .iter()
            .map(|event| {
                let time = format_time(&event.start_date, timezone).unwrap_or_default();
                fit(&format!("{} {}", time, event.title).trim().to_string())
            })
            .collect();

        let more = cell.overflow_count(events_per_day);
        if more > 0 {
            lines.push(fit(&format!("+ {} more", more)));
        }
        lines
    }

    fn day_label(&self, cell: &CalendarCell<'_>) -> String {
        let label = if cell.is_today {
            format!("{:>2} today", cell.day_number())
        } else {
            format!("{:>2}", cell.day_number())
        };
        let padded = pad(&label);

        if !cell.is_current_month {
            self.colorize(&padded, "gray")
        } else if cell.is_today {
            self.colorize(&padded, "blue")
        } else {
            padded
        }
    }

    fn push_event_details(&self, output: &mut String, event: &Event) {
        if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
            output.push_str(&format!("   📍 {}\n", location));
        }
        if let Some(url) = event.url() {
            output.push_str(&self.colorize(&format!("   🔗 {}", url), "gray"));
            output.push('\n');
        }
    }
}

/// Clip to the cell width, leaving one column of spacing
fn fit(text: &str) -> String {
    let limit = CELL_WIDTH - 1;
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(limit - 1).collect();
        format!("{}…", clipped)
    }
}

fn pad(text: &str) -> String {
    format!("{:<width$}", text, width = CELL_WIDTH)
}

impl CalendarFormatter for TerminalCalendarFormatter {
    fn format_month(
        &self,
        grid: &CalendarGrid<'_>,
        events_per_day: usize,
        timezone: Tz,
    ) -> Result<String> {
        let mut output = String::new();
        let rule = "─".repeat(CELL_WIDTH * WEEKDAY_HEADERS.len());

        output.push_str(&self.colorize(&format!("📅 {}", grid.month.title()), "bold"));
        output.push('\n');
        for header in WEEKDAY_HEADERS {
            output.push_str(&self.colorize(&pad(header), "bold"));
        }
        output.push('\n');
        output.push_str(&self.colorize(&rule, "gray"));
        output.push('\n');

        for week in &grid.weeks {
            for cell in &week.days {
                output.push_str(&self.day_label(cell));
            }
            output.push('\n');

            let cell_lines: Vec<Vec<String>> = week
                .days
                .iter()
                .map(|cell| self.cell_lines(cell, events_per_day, &timezone))
                .collect();
            let height = cell_lines.iter().map(Vec::len).max().unwrap_or(0);

            for row in 0..height {
                for (cell, lines) in week.days.iter().zip(&cell_lines) {
                    let text = pad(lines.get(row).map(String::as_str).unwrap_or(""));
                    if cell.is_current_month {
                        output.push_str(&text);
                    } else {
                        output.push_str(&self.colorize(&text, "gray"));
                    }
                }
                output.push('\n');
            }

            output.push_str(&self.colorize(&rule, "gray"));
            output.push('\n');
        }

        let total = grid.event_count();
        output.push_str(&self.colorize(&format!("{} events this month", total), "gray"));
        output.push('\n');
        Ok(output)
    }

    fn format_day(&self, key: DateKey, events: &[&Event], timezone: Tz) -> Result<String> {
        let mut output = String::new();
        let heading = key.date().format("%A, %B %-d, %Y").to_string();
        output.push_str(&self.colorize(&format!("📅 {}", heading), "bold"));
        output.push('\n');

        if events.is_empty() {
            output.push_str(&self.colorize("No events on this day", "green"));
            output.push('\n');
            return Ok(output);
        }

        for (i, event) in events.iter().enumerate() {
            let time = time_range(event, &timezone);
            let source = if event.is_external() { " (external)" } else { "" };
            output.push_str(&format!("{}. ", i + 1));
            output.push_str(&self.colorize(&event.title, "bold"));
            output.push_str(&self.colorize(source, "gray"));
            output.push('\n');
            if !time.is_empty() {
                output.push_str(&format!("   🕐 {}\n", time));
            }
            self.push_event_details(&mut output, event);
        }

        Ok(output)
    }

    fn format_event(&self, event: &Event, timezone: Tz) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.colorize(&event.title, "bold"));
        output.push('\n');

        match local_datetime(&event.start_date, &timezone) {
            Ok(start) => {
                output.push_str(&format!("   📅 {}\n", start.format("%A, %B %-d, %Y")));
                output.push_str(&format!("   🕐 {}\n", time_range(event, &timezone)));
            }
            Err(e) => {
                output.push_str(&self.colorize(&format!("   {}", e), "red"));
                output.push('\n');
            }
        }

        if let Some(category) = event.category.as_deref() {
            output.push_str(&format!("   Category: {}\n", category));
        }
        if let Some(audience) = event.audience.as_deref() {
            output.push_str(&format!("   Audience: {}\n", audience));
        }
        self.push_event_details(&mut output, event);

        if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
            output.push('\n');
            output.push_str(description);
            output.push('\n');
        }

        Ok(output)
    }

    fn format_facets(&self, facets: &Facets) -> Result<String> {
        let mut output = String::new();
        let sections = [
            ("Categories", &facets.categories),
            ("Audiences", &facets.audiences),
        ];
        for (heading, values) in sections {
            output.push_str(&self.colorize(heading, "bold"));
            output.push('\n');
            if values.is_empty() {
                output.push_str(&self.colorize("  (none)", "gray"));
                output.push('\n');
            }
            for value in values {
                output.push_str(&format!("  - {}\n", value));
            }
        }
        Ok(output)
    }
}

impl Default for TerminalCalendarFormatter {
    fn default() -> Self {
        Self::new(true) // Use colors by default
    }
}
