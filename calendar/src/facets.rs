use serde::Serialize;
use std::collections::HashSet;

use crate::event::Event;

/// Filter options offered for the current event list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub audiences: Vec<String>,
}

/// Distinct categories and audiences, in first-seen order
pub fn collect_facets<'a, I>(events: I) -> Facets
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut facets = Facets::default();
    let mut seen_categories = HashSet::new();
    let mut seen_audiences = HashSet::new();

    for event in events {
        if let Some(category) = event.category.as_deref().map(str::trim) {
            if !category.is_empty() && seen_categories.insert(category) {
                facets.categories.push(category.to_string());
            }
        }

        for audience in event.audiences() {
            if seen_audiences.insert(audience) {
                facets.audiences.push(audience.to_string());
            }
        }
    }

    facets
}
