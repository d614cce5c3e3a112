use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::api_client::{EventsApiClient, FetchedFeeds};
use crate::calendar_grid::{build_calendar, CalendarGrid, YearMonth};
use crate::config::Config;
use crate::date_key::DateKey;
use crate::errors::CalendarResult;
use crate::event::Event;
use crate::facets::{collect_facets, Facets};
use crate::filter::{filter_events, FilterCriteria};
use crate::grouping::group_by_date;

/// Service for fetching event feeds and shaping them into calendar views
pub struct CalendarService {
    client: EventsApiClient,
    timezone: Tz,
}

impl CalendarService {
    pub fn new(config: &Config) -> CalendarResult<Self> {
        Ok(Self::with_client(
            EventsApiClient::from_config(config)?,
            config.get_timezone(),
        ))
    }

    pub fn with_client(client: EventsApiClient, timezone: Tz) -> Self {
        Self { client, timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Fetch both feeds for the given filters
    pub async fn fetch_feeds(&self, criteria: &FilterCriteria) -> FetchedFeeds {
        info!("Fetching events from {}", self.client.base_url());
        let feeds = self.client.fetch_all(criteria).await;
        debug!(
            "Fetched {} local and {} external events",
            feeds.local.events().len(),
            feeds.external.events().len()
        );
        feeds
    }

    /// Month grid for the fetched feeds, with "today" taken from `now`
    pub fn month_grid<'a>(
        &self,
        feeds: &'a FetchedFeeds,
        criteria: &FilterCriteria,
        month: YearMonth,
        now: DateTime<Utc>,
    ) -> CalendarGrid<'a> {
        for fetch in [&feeds.local, &feeds.external] {
            if let Some(error) = fetch.error() {
                warn!("Calendar shown without part of its data: {}", error);
            }
        }

        build_calendar(
            feeds.local.events(),
            feeds.external.events(),
            criteria,
            month,
            now,
            &self.timezone,
        )
    }

    /// Every matching event on one day, in bucket order
    pub fn day_events<'a>(
        &self,
        feeds: &'a FetchedFeeds,
        criteria: &FilterCriteria,
        key: DateKey,
    ) -> Vec<&'a Event> {
        let filtered = filter_events(feeds.merged(), criteria);
        group_by_date(filtered, &self.timezone).events_on(&key).to_vec()
    }

    /// Filter options across everything fetched
    pub fn facets(&self, feeds: &FetchedFeeds) -> Facets {
        collect_facets(feeds.merged())
    }

    /// Number of events matching `criteria` across both feeds
    pub fn matching_count(&self, feeds: &FetchedFeeds, criteria: &FilterCriteria) -> usize {
        filter_events(feeds.merged(), criteria).len()
    }

    /// Log a text search with its result count; never fails the caller
    pub async fn record_search(&self, criteria: &FilterCriteria, results_count: usize) {
        let Some(query) = criteria.active_search_text() else {
            return;
        };

        if let Err(e) = self.client.log_search(query, results_count).await {
            warn!("Error logging search: {}", e);
        }
    }

    pub async fn event(&self, id: &str) -> CalendarResult<Event> {
        self.client.fetch_event(id).await
    }
}
