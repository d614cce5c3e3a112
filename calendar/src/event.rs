use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend identifier of an event: numeric for local records, usually a string
/// for records proxied from the external feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Numeric(id) => write!(f, "{}", id),
            EventId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        EventId::Numeric(id)
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        EventId::Numeric(i64::from(id))
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        EventId::Text(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        EventId::Text(id.to_string())
    }
}

/// Which feed an event came from, attached by the fetch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    #[default]
    Local,
    External,
}

impl EventSource {
    pub fn name(&self) -> &'static str {
        match self {
            EventSource::Local => "local",
            EventSource::External => "external",
        }
    }
}

/// Event record as served by the events API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// ISO-8601 start; kept as received so a bad value only drops this event
    #[serde(default, deserialize_with = "null_as_empty")]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Raw comma-separated audience list
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub source: EventSource,
}

impl Event {
    pub fn new(
        id: impl Into<EventId>,
        title: impl Into<String>,
        start_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_date: start_date.into(),
            end_date: None,
            category: None,
            audience: None,
            location: None,
            description: None,
            link: None,
            external_url: None,
            source: EventSource::Local,
        }
    }

    pub fn with_source(mut self, source: EventSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_external(&self) -> bool {
        self.source == EventSource::External
    }

    /// Outbound link for the event, preferring the third-party listing
    pub fn url(&self) -> Option<&str> {
        self.external_url
            .as_deref()
            .or(self.link.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Individual audiences from the comma-separated field
    pub fn audiences(&self) -> impl Iterator<Item = &str> + '_ {
        self.audience
            .as_deref()
            .unwrap_or_default()
            .split(", ")
            .map(str::trim)
            .filter(|audience| !audience.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload of the external feed endpoint.
///
/// Records stay raw JSON so one malformed entry cannot reject the whole feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalFeed {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}
