//! Event aggregation and month-calendar grouping for the innovation-ecosystem
//! directory.
//!
//! The pipeline is made of pure functions: [`merge`] the local and external
//! feeds, [`filter_events`] by category/audience/text, [`group_by_date`] on
//! the local calendar day, then [`build_grid`] for a month. [`build_calendar`]
//! runs all four. Fetching the feeds lives in [`api_client`].

pub mod api_client;
pub mod calendar_grid;
pub mod commands;
pub mod config;
pub mod date_key;
pub mod errors;
pub mod event;
pub mod facets;
pub mod filter;
pub mod formatters;
pub mod grouping;
pub mod http_utils;
pub mod merge;
pub mod services;

pub use calendar_grid::{
    build_calendar, build_grid, CalendarCell, CalendarGrid, CalendarWeek, YearMonth,
    DEFAULT_EVENTS_PER_DAY,
};
pub use date_key::{normalize, DateKey};
pub use errors::{CalendarError, CalendarResult};
pub use event::{Event, EventId, EventSource};
pub use facets::{collect_facets, Facets};
pub use filter::{filter_events, FilterCriteria};
pub use grouping::{group_by_date, EventsByDate};
pub use merge::{merge, merge_fetched, SourceFetch};
