use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Active event filters; unset or blank fields do not filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub audience: Option<String>,
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn search_text(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = Some(search_text.into());
        self
    }

    pub fn active_category(&self) -> Option<&str> {
        active(&self.category)
    }

    pub fn active_audience(&self) -> Option<&str> {
        active(&self.audience)
    }

    pub fn active_search_text(&self) -> Option<&str> {
        active(&self.search_text)
    }

    pub fn is_empty(&self) -> bool {
        self.active_category().is_none()
            && self.active_audience().is_none()
            && self.active_search_text().is_none()
    }

    /// Whether one event passes every active filter
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category) = self.active_category() {
            if !field_contains(event.category.as_deref(), category) {
                return false;
            }
        }

        // Audience is matched against the raw comma-separated text
        if let Some(audience) = self.active_audience() {
            if !field_contains(event.audience.as_deref(), audience) {
                return false;
            }
        }

        if let Some(text) = self.active_search_text() {
            let in_any_field = field_contains(Some(&event.title), text)
                || field_contains(event.description.as_deref(), text)
                || field_contains(event.location.as_deref(), text);
            if !in_any_field {
                return false;
            }
        }

        true
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase()))
}

/// Keep the events matching all active criteria, in input order
pub fn filter_events<'a, I>(events: I, criteria: &FilterCriteria) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .filter(|event| criteria.matches(event))
        .collect()
}
