use crate::error::{ContribError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

/// Date format of the keys in [`AuthorData::changes_by_date`].
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Upper bound on an explicit `--to` length, roughly ten years.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Activity of one author on one calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub additions: u64,
    pub deletions: u64,
    pub files: u64,
    pub commits: u64,
}

impl ChangeSet {
    pub fn lines(&self) -> u64 {
        self.additions + self.deletions
    }

    pub fn metric(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Lines => self.lines(),
            Metric::Files => self.files,
            Metric::Commits => self.commits,
        }
    }

    pub fn add(&mut self, other: &ChangeSet) {
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.files += other.files;
        self.commits += other.commits;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorData {
    pub name: String,
    /// Lower-cased; identity key of the author.
    pub email: String,
    pub changes_by_date: BTreeMap<String, ChangeSet>,
}

impl AuthorData {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            changes_by_date: BTreeMap::new(),
        }
    }

    /// Bucket for `date`, created zeroed on first use.
    pub fn change_set_mut(&mut self, date: &str) -> &mut ChangeSet {
        self.changes_by_date.entry(date.to_string()).or_default()
    }

    /// Bucket for `date`; a missing bucket reads as all zeroes.
    pub fn change_set(&self, date: &str) -> ChangeSet {
        self.changes_by_date.get(date).copied().unwrap_or_default()
    }

    /// Sum of additions and deletions over every date. Used for ordering.
    pub fn total_changes(&self) -> u64 {
        self.changes_by_date.values().map(ChangeSet::lines).sum()
    }

    pub fn totals(&self) -> ChangeSet {
        let mut total = ChangeSet::default();
        for changes in self.changes_by_date.values() {
            total.add(changes);
        }
        total
    }
}

/// Authors keyed by lower-cased email, remembering discovery order.
#[derive(Debug, Clone, Default)]
pub struct AuthorStore {
    authors: Vec<AuthorData>,
    index: HashMap<String, usize>,
}

impl AuthorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the author with `email`, inserting a new entry named `name` if absent.
    pub fn get_or_insert(&mut self, email: &str, name: &str) -> usize {
        if let Some(&idx) = self.index.get(email) {
            return idx;
        }
        let idx = self.authors.len();
        self.authors.push(AuthorData::new(name, email));
        self.index.insert(email.to_string(), idx);
        idx
    }

    pub fn get(&self, email: &str) -> Option<&AuthorData> {
        self.index.get(email).map(|&idx| &self.authors[idx])
    }

    pub(crate) fn at_mut(&mut self, idx: usize) -> &mut AuthorData {
        &mut self.authors[idx]
    }

    pub(crate) fn len(&self) -> usize {
        self.authors.len()
    }

    /// Authors by descending total changes. Ties keep discovery order.
    pub fn sorted_by_total_changes(&self) -> Vec<&AuthorData> {
        let mut authors: Vec<(u64, &AuthorData)> =
            self.authors.iter().map(|a| (a.total_changes(), a)).collect();
        // `sort_by` is a stable sort.
        authors.sort_by(|a, b| b.0.cmp(&a.0));
        authors.into_iter().map(|(_, a)| a).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Lines,
    Files,
    Commits,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Lines => "Lines",
            Metric::Files => "Files",
            Metric::Commits => "Commits",
        };
        f.write_str(s)
    }
}

impl FromStr for Metric {
    type Err = ContribError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lines" => Ok(Metric::Lines),
            "files" => Ok(Metric::Files),
            "commits" => Ok(Metric::Commits),
            other => Err(ContribError::Configuration(format!(
                "unknown metric '{other}', expected one of: lines, files, commits"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "metric")]
pub enum ReportMode {
    Totals,
    ByDay(Metric),
    InvertedByDay(Metric),
}

impl ReportMode {
    pub fn select(by_day: Option<Metric>, inverted: bool) -> Result<Self> {
        match (by_day, inverted) {
            (None, false) => Ok(ReportMode::Totals),
            (None, true) => Err(ContribError::Configuration(
                "an inverted report needs a by-day metric".to_string(),
            )),
            (Some(metric), false) => Ok(ReportMode::ByDay(metric)),
            (Some(metric), true) => Ok(ReportMode::InvertedByDay(metric)),
        }
    }
}

/// Consecutive calendar days starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    days: u32,
}

impl DateWindow {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    /// Window from `start` covering `to_days` days, or up to and including
    /// `today` when `to_days` is zero.
    pub fn from_start(start: NaiveDate, to_days: u32, today: NaiveDate) -> Result<Self> {
        if to_days > MAX_WINDOW_DAYS {
            return Err(ContribError::Configuration(format!(
                "--to {to_days} exceeds the maximum of {MAX_WINDOW_DAYS} days"
            )));
        }
        if to_days > 0 {
            return Ok(Self::new(start, to_days));
        }
        if start > today {
            return Err(ContribError::InvalidDate(format!(
                "start date {start} is after today ({today})"
            )));
        }
        let span = (today - start).num_days() + 1;
        let days = u32::try_from(span)
            .map_err(|_| ContribError::InvalidDate(format!("window of {span} days is too large")))?;
        Ok(Self::new(start, days))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// First date after the window.
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(self.days as u64))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }

    /// Window predicate over `YYYY-MM-DD` keys. Unparseable dates are outside.
    pub fn contains(&self, date: &str) -> bool {
        NaiveDate::parse_from_str(date, DATE_KEY_FORMAT)
            .map(|d| self.contains_date(d))
            .unwrap_or(false)
    }

    /// Every date of the window in chronological order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start.iter_days().take(self.days as usize).collect()
    }
}
