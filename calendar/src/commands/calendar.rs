use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use super::{Command, CommandContext};
use crate::calendar_grid::YearMonth;
use crate::date_key::DateKey;
use crate::filter::FilterCriteria;

/// Command to render one month of events as a calendar grid
pub struct MonthCommand {
    pub month: Option<YearMonth>,
    pub criteria: FilterCriteria,
}

/// Command to list every event of one day
pub struct DayCommand {
    pub date: DateKey,
    pub criteria: FilterCriteria,
}

/// Command to show a single stored event
pub struct ShowCommand {
    pub id: String,
}

/// Command to list the available filter options
pub struct FacetsCommand;

#[async_trait]
impl Command for MonthCommand {
    async fn execute(&mut self, context: &CommandContext) -> Result<()> {
        let service = &context.calendar;
        let now = Utc::now();
        let month = match self.month {
            Some(month) => month,
            None => YearMonth::containing(now.with_timezone(&service.timezone()).date_naive())?,
        };

        info!("Rendering calendar for {}", month);
        let feeds = service.fetch_feeds(&self.criteria).await;
        if feeds.all_failed() {
            warn!("No event feed could be reached; showing an empty calendar");
        }

        let grid = service.month_grid(&feeds, &self.criteria, month, now);
        let output = context
            .formatter()
            .format_month(&grid, context.events_per_day(), service.timezone())?;
        print!("{}", output);

        let matching = service.matching_count(&feeds, &self.criteria);
        service.record_search(&self.criteria, matching).await;
        Ok(())
    }
}

#[async_trait]
impl Command for DayCommand {
    async fn execute(&mut self, context: &CommandContext) -> Result<()> {
        let service = &context.calendar;
        let feeds = service.fetch_feeds(&self.criteria).await;

        let events = service.day_events(&feeds, &self.criteria, self.date);
        info!("Found {} events on {}", events.len(), self.date);

        let output = context
            .formatter()
            .format_day(self.date, &events, service.timezone())?;
        print!("{}", output);

        service.record_search(&self.criteria, events.len()).await;
        Ok(())
    }
}

#[async_trait]
impl Command for ShowCommand {
    async fn execute(&mut self, context: &CommandContext) -> Result<()> {
        let service = &context.calendar;
        let event = service
            .event(&self.id)
            .await
            .with_context(|| format!("Failed to load event {}", self.id))?;

        let output = context.formatter().format_event(&event, service.timezone())?;
        print!("{}", output);
        Ok(())
    }
}

#[async_trait]
impl Command for FacetsCommand {
    async fn execute(&mut self, context: &CommandContext) -> Result<()> {
        let service = &context.calendar;
        let feeds = service.fetch_feeds(&FilterCriteria::default()).await;
        let facets = service.facets(&feeds);

        let output = context.formatter().format_facets(&facets)?;
        print!("{}", output);
        Ok(())
    }
}
