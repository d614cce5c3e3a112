use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{CalendarError, CalendarResult};
use crate::event::{Event, EventSource, ExternalFeed};
use crate::filter::FilterCriteria;
use crate::http_utils::{handle_api_response, parse_json_response};
use crate::merge::{merge_fetched, SourceFetch};

#[derive(Debug, Serialize)]
struct SearchLogEntry<'a> {
    query: &'a str,
    results_count: usize,
}

/// Both event feeds as fetched for one render
#[derive(Debug, Clone)]
pub struct FetchedFeeds {
    pub local: SourceFetch,
    pub external: SourceFetch,
}

impl FetchedFeeds {
    /// Unified list, local first, skipping whichever feed failed
    pub fn merged(&self) -> Vec<&Event> {
        merge_fetched(&self.local, &self.external)
    }

    pub fn all_failed(&self) -> bool {
        self.local.is_failed() && self.external.is_failed()
    }
}

/// Client for the directory's events endpoints
pub struct EventsApiClient {
    base_url: String,
    auth_token: Option<String>,
    fetch_external: bool,
    http_client: reqwest::Client,
}

impl EventsApiClient {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> CalendarResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
            fetch_external: true,
            http_client,
        })
    }

    pub fn from_config(config: &Config) -> CalendarResult<Self> {
        let mut client = Self::new(
            config.get_api_url(),
            config.get_auth_token(),
            config.get_request_timeout(),
        )?;
        client.fetch_external = config.api.fetch_external;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http_client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Events stored by the directory backend, filtered server-side where supported
    pub async fn fetch_local_events(
        &self,
        criteria: &FilterCriteria,
    ) -> CalendarResult<Vec<Event>> {
        let mut query = Vec::new();
        if let Some(category) = criteria.active_category() {
            query.push(("category", category));
        }
        if let Some(audience) = criteria.active_audience() {
            query.push(("audience", audience));
        }
        if let Some(search) = criteria.active_search_text() {
            query.push(("search", search));
        }

        let response = self.request(Method::GET, "/events").query(&query).send().await?;
        let response = handle_api_response(response, "events").await?;
        let records: Vec<serde_json::Value> = parse_json_response(response, "events").await?;
        let events = decode_records(records, EventSource::Local);

        debug!("Database events count: {}", events.len());
        Ok(events)
    }

    /// Events proxied from the third-party feed.
    ///
    /// The feed may report an error next to a partial list; the list is still used.
    pub async fn fetch_external_events(&self) -> CalendarResult<Vec<Event>> {
        let response = self
            .request(Method::GET, "/events/external/fetch")
            .send()
            .await?;
        let response = handle_api_response(response, "external events").await?;
        let feed: ExternalFeed = parse_json_response(response, "external events").await?;

        if let Some(error) = feed.error.as_deref().filter(|e| !e.is_empty()) {
            warn!("External events feed reported an error: {}", error);
        }

        let events = decode_records(feed.events, EventSource::External);
        debug!("External events count: {}", events.len());
        Ok(events)
    }

    /// Fetch both feeds concurrently; either may fail without affecting the other
    pub async fn fetch_all(&self, criteria: &FilterCriteria) -> FetchedFeeds {
        let local_request = self.fetch_local_events(criteria);
        let external_request = async {
            if self.fetch_external {
                self.fetch_external_events().await
            } else {
                Ok(Vec::new())
            }
        };

        let (local, external) = tokio::join!(local_request, external_request);

        FetchedFeeds {
            local: into_fetch(local, EventSource::Local),
            external: into_fetch(external, EventSource::External),
        }
    }

    /// A single stored event
    pub async fn fetch_event(&self, id: &str) -> CalendarResult<Event> {
        let response = self
            .request(Method::GET, &format!("/events/{}", id))
            .send()
            .await?;
        let response = handle_api_response(response, &format!("event {}", id)).await?;
        let event: Event = parse_json_response(response, "event").await?;
        Ok(event.with_source(EventSource::Local))
    }

    /// Record a search and its result count for the directory's insights page
    pub async fn log_search(&self, query: &str, results_count: usize) -> CalendarResult<()> {
        let entry = SearchLogEntry { query, results_count };
        let response = self
            .request(Method::POST, "/search/log")
            .json(&entry)
            .send()
            .await?;
        handle_api_response(response, "search log").await?;
        info!("Logged search '{}' with {} results", query, results_count);
        Ok(())
    }
}

/// Decode each feed record on its own, dropping the ones that do not fit `Event`
fn decode_records(records: Vec<serde_json::Value>, source: EventSource) -> Vec<Event> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Event>(record) {
            Ok(event) => Some(event.with_source(source)),
            Err(e) => {
                warn!("Skipping {} event #{}: {}", source.name(), index, e);
                None
            }
        })
        .collect()
}

fn into_fetch(result: CalendarResult<Vec<Event>>, source: EventSource) -> SourceFetch {
    match result {
        Ok(events) => SourceFetch::Loaded(events),
        Err(e) => {
            warn!("Error fetching {} events: {}", source.name(), e);
            SourceFetch::Failed(CalendarError::source_fetch(source.name(), e.to_string()))
        }
    }
}
