use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::date_key::DateKey;
use crate::errors::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::filter::{filter_events, FilterCriteria};
use crate::grouping::{group_by_date, EventsByDate};
use crate::merge::merge;

pub const DAYS_PER_WEEK: usize = 7;

/// Events surfaced directly in a day cell before the "+ N more" summary
pub const DEFAULT_EVENTS_PER_DAY: usize = 3;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub const WEEKDAY_HEADERS: [&str; DAYS_PER_WEEK] =
    ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// A calendar month, the unit the grid is built for.
///
/// Only months whose whole grid, spillover weeks included, lies inside
/// chrono's date range can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
    last_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> CalendarResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(Self::from_first_day)
            .ok_or_else(|| CalendarError::invalid_date(format!("{:04}-{:02}", year, month)))
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> CalendarResult<Self> {
        Self::new(date.year(), date.month())
    }

    fn from_first_day(first_day: NaiveDate) -> Option<Self> {
        let last_day = first_day.checked_add_months(Months::new(1))?.pred_opt()?;
        first_day.checked_sub_days(Days::new(DAYS_PER_WEEK as u64 - 1))?;
        last_day.checked_add_days(Days::new(DAYS_PER_WEEK as u64 - 1))?;
        Some(Self { first_day, last_day })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The month before, or `None` at the start of the supported range
    pub fn previous(&self) -> Option<Self> {
        self.first_day
            .checked_sub_months(Months::new(1))
            .and_then(Self::from_first_day)
    }

    /// The month after, or `None` at the end of the supported range
    pub fn next(&self) -> Option<Self> {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(Self::from_first_day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Display title such as "November 2025"
    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0()], self.year())
    }

    fn month0(&self) -> usize {
        self.first_day.month0() as usize
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::invalid_date(s);
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One day of the month grid
#[derive(Debug, Clone, Serialize)]
pub struct CalendarCell<'a> {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub events: Vec<&'a Event>,
}

impl<'a> CalendarCell<'a> {
    pub fn key(&self) -> DateKey {
        DateKey::from_date(self.date)
    }

    pub fn day_number(&self) -> u32 {
        self.date.day()
    }

    /// The first `limit` events, in bucket order
    pub fn visible_events(&self, limit: usize) -> &[&'a Event] {
        &self.events[..self.events.len().min(limit)]
    }

    /// How many events are summarised instead of shown
    pub fn overflow_count(&self, limit: usize) -> usize {
        self.events.len().saturating_sub(limit)
    }

    /// Link target listing every event of this day
    pub fn drill_through_path(&self) -> String {
        format!("/events?date={}", self.key())
    }
}

/// Seven consecutive cells, Sunday first
#[derive(Debug, Clone, Serialize)]
pub struct CalendarWeek<'a> {
    pub days: Vec<CalendarCell<'a>>,
}

/// Full month grid including spillover days from adjacent months
#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid<'a> {
    pub month: YearMonth,
    pub weeks: Vec<CalendarWeek<'a>>,
}

impl<'a> CalendarGrid<'a> {
    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell<'a>> + '_ {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }

    pub fn cell_count(&self) -> usize {
        self.weeks.iter().map(|week| week.days.len()).sum()
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell<'a>> {
        self.cells().find(|cell| cell.date == date)
    }

    /// Events attached to current-month cells
    pub fn event_count(&self) -> usize {
        self.cells()
            .filter(|cell| cell.is_current_month)
            .map(|cell| cell.events.len())
            .sum()
    }
}

/// Lay out `month` as Sunday-first weeks and attach each day's events.
///
/// `today` is supplied by the caller so the result depends only on inputs.
pub fn build_grid<'a>(
    month: YearMonth,
    grouped: &EventsByDate<'a>,
    today: NaiveDate,
) -> CalendarGrid<'a> {
    let first = month.first_day();
    let last = month.last_day();

    let leading = u64::from(first.weekday().num_days_from_sunday());
    let trailing = 6 - u64::from(last.weekday().num_days_from_sunday());
    let grid_start = first - Days::new(leading);
    let grid_end = last + Days::new(trailing);

    let mut weeks = Vec::new();
    let mut current = Vec::with_capacity(DAYS_PER_WEEK);

    for date in grid_start.iter_days().take_while(|date| *date <= grid_end) {
        let key = DateKey::from_date(date);
        current.push(CalendarCell {
            date,
            is_current_month: month.contains(date),
            is_today: date == today,
            events: grouped.events_on(&key).to_vec(),
        });

        if current.len() == DAYS_PER_WEEK {
            weeks.push(CalendarWeek {
                days: std::mem::replace(&mut current, Vec::with_capacity(DAYS_PER_WEEK)),
            });
        }
    }

    debug!(
        "Built {} grid: {} weeks from {} to {}",
        month,
        weeks.len(),
        grid_start,
        grid_end
    );

    CalendarGrid { month, weeks }
}

/// Merge, filter, group and lay out both feeds for one month
pub fn build_calendar<'a>(
    local: &'a [Event],
    external: &'a [Event],
    criteria: &FilterCriteria,
    month: YearMonth,
    now: DateTime<Utc>,
    tz: &Tz,
) -> CalendarGrid<'a> {
    let merged = merge(local, external);
    let filtered = filter_events(merged, criteria);
    let grouped = group_by_date(filtered, tz);
    let today = now.with_timezone(tz).date_naive();
    build_grid(month, &grouped, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSource;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_grid(year: i32, month: u32) -> CalendarGrid<'static> {
        build_grid(YearMonth::new(year, month).unwrap(), &EventsByDate::default(), date(2000, 1, 1))
    }

    #[test]
    fn test_november_2025_layout() {
        let grid = empty_grid(2025, 11);
        let cells: Vec<_> = grid.cells().collect();

        assert_eq!(cells.first().unwrap().date, date(2025, 10, 26));
        assert_eq!(cells.iter().filter(|c| c.date.month() == 10).count(), 6);
        // The 30th is a Sunday, so a sixth week is needed
        assert_eq!(grid.week_count(), 6);
        assert_eq!(grid.cell_count(), 42);
        assert_eq!(cells.last().unwrap().date, date(2025, 12, 6));
    }

    #[test]
    fn test_month_ending_on_saturday_has_no_spillover() {
        let grid = empty_grid(2026, 1);
        let cells: Vec<_> = grid.cells().collect();

        assert_eq!(grid.cell_count(), 35);
        assert_eq!(cells.first().unwrap().date, date(2025, 12, 28));
        assert_eq!(cells.last().unwrap().date, date(2026, 1, 31));
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_leading_cells() {
        let grid = empty_grid(2026, 2);
        assert_eq!(grid.cell_count(), 28);
        assert_eq!(grid.week_count(), 4);
        assert!(grid.cells().all(|c| c.is_current_month));
    }

    #[test]
    fn test_grid_shape_over_many_months() {
        let mut month = YearMonth::new(2023, 1).unwrap();
        for _ in 0..48 {
            let grid = build_grid(month, &EventsByDate::default(), date(2000, 1, 1));

            assert_eq!(grid.cell_count() % DAYS_PER_WEEK, 0);
            assert!((4..=6).contains(&grid.week_count()));
            assert!(grid.weeks.iter().all(|w| w.days.len() == DAYS_PER_WEEK));
            assert!(grid.weeks.iter().all(|w| w.days[0].date.weekday() == chrono::Weekday::Sun));

            let days: Vec<u32> = grid
                .cells()
                .filter(|c| c.is_current_month)
                .map(|c| c.day_number())
                .collect();
            assert_eq!(days, (1..=month.days_in_month()).collect::<Vec<_>>());

            month = month.next().unwrap();
        }
    }

    #[test]
    fn test_today_flag_uses_injected_date() {
        let november = YearMonth::new(2025, 11).unwrap();
        let grid = build_grid(november, &EventsByDate::default(), date(2025, 11, 12));
        let today: Vec<_> = grid.cells().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2025, 11, 12));
    }

    #[test]
    fn test_spillover_cells_carry_their_own_events() {
        let events = vec![
            Event::new(1, "Halloween Hack Night", "2025-10-31T19:00:00"),
            Event::new(2, "Kickoff", "2025-11-03T09:00:00"),
        ];
        let grouped = group_by_date(&events, &chrono_tz::UTC);
        let grid = build_grid(YearMonth::new(2025, 11).unwrap(), &grouped, date(2025, 11, 1));

        let october = grid.cell(date(2025, 10, 31)).unwrap();
        assert!(!october.is_current_month);
        assert_eq!(october.events[0].title, "Halloween Hack Night");
        assert_eq!(grid.cell(date(2025, 11, 3)).unwrap().events.len(), 1);
        assert_eq!(grid.event_count(), 1);
    }

    #[test]
    fn test_truncation_keeps_bucket_order() {
        let events: Vec<Event> = (1..=5)
            .map(|i| Event::new(i, format!("Session {}", i), "2025-11-20T10:00:00"))
            .collect();
        let grouped = group_by_date(&events, &chrono_tz::UTC);
        let grid = build_grid(YearMonth::new(2025, 11).unwrap(), &grouped, date(2025, 11, 1));
        let cell = grid.cell(date(2025, 11, 20)).unwrap();

        let shown: Vec<&str> = cell
            .visible_events(DEFAULT_EVENTS_PER_DAY)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(shown, vec!["Session 1", "Session 2", "Session 3"]);
        assert_eq!(cell.overflow_count(DEFAULT_EVENTS_PER_DAY), 2);
        assert_eq!(cell.drill_through_path(), "/events?date=2025-11-20");

        let quiet = grid.cell(date(2025, 11, 21)).unwrap();
        assert!(quiet.visible_events(DEFAULT_EVENTS_PER_DAY).is_empty());
        assert_eq!(quiet.overflow_count(DEFAULT_EVENTS_PER_DAY), 0);
    }

    #[test]
    fn test_build_calendar_composes_pipeline() {
        let tz = chrono_tz::America::New_York;
        let local = vec![
            Event::new(1, "A", "2025-11-12T09:00:00").with_category("Tech"),
            Event::new(2, "B", "2025-11-12T23:30:00-05:00").with_category("Tech"),
            Event::new(3, "Unrelated", "2025-11-12T10:00:00").with_category("Arts"),
            Event::new(4, "Broken", "invalid-date").with_category("Tech"),
        ];
        let external = vec![Event::new("c", "C", "2025-11-13T02:00:00Z")
            .with_category("tech")
            .with_source(EventSource::External)];
        let now = Utc.with_ymd_and_hms(2025, 11, 13, 3, 0, 0).unwrap();

        let grid = build_calendar(
            &local,
            &external,
            &FilterCriteria::new().category("tech"),
            YearMonth::new(2025, 11).unwrap(),
            now,
            &tz,
        );

        let cell = grid.cell(date(2025, 11, 12)).unwrap();
        let titles: Vec<&str> = cell.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        // 03:00 UTC on the 13th is still the 12th in New York
        assert!(cell.is_today);
    }

    #[test]
    fn test_year_month_navigation_and_parsing() {
        let december: YearMonth = "2025-12".parse().unwrap();
        assert_eq!(december.next(), Some(YearMonth::new(2026, 1).unwrap()));
        assert_eq!(december.previous().unwrap().title(), "November 2025");
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::containing(date(2025, 11, 17)).unwrap().to_string(), "2025-11");

        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("November".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_rejects_months_at_the_edge_of_the_date_range() {
        let max = NaiveDate::MAX;
        let min = NaiveDate::MIN;

        assert!(matches!(
            YearMonth::new(max.year(), max.month()),
            Err(CalendarError::InvalidDate { .. })
        ));
        assert!(format!("{}-{:02}", max.year(), max.month())
            .parse::<YearMonth>()
            .is_err());
        assert!(YearMonth::containing(max).is_err());
        assert!(YearMonth::new(min.year(), min.month()).is_err());

        // The last supported month still lays out, but has no successor
        let late = YearMonth::containing(max - Days::new(31)).unwrap();
        assert_eq!(late.next(), None);
        let grid = build_grid(late, &EventsByDate::default(), date(2000, 1, 1));
        assert_eq!(grid.cell_count() % DAYS_PER_WEEK, 0);
        let in_month = grid.cells().filter(|c| c.is_current_month).count();
        assert_eq!(in_month as u32, late.days_in_month());

        let early = YearMonth::containing(min + Days::new(31)).unwrap();
        assert_eq!(early.previous(), None);
    }
}
