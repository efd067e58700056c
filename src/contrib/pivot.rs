//! Reshape an [`AuthorStore`] into one of the three report tables.
//!
//! Every view orders authors by [`AuthorStore::sorted_by_total_changes`] and
//! reads date buckets through [`AuthorData::change_set`], so an author with
//! no activity on a date contributes zero to that cell.

use crate::model::{
    AuthorData, AuthorStore, ChangeSet, DateWindow, Metric, ReportMode, DATE_KEY_FORMAT,
};
use serde::{Deserialize, Serialize};

pub const SUMMARY_LABEL: &str = "Summary Totals";
pub const TOTAL_HEADER: &str = "Total";
pub const TREND_HEADER: &str = "Trend";
const DAY_HEADER_FORMAT: &str = "%m/%d";

pub const TREND_FLAT_LOW: &str = "▄▄▄";
pub const TREND_RISING: &str = "▄■▀";
pub const TREND_FALLING: &str = "▀■▄";
pub const TREND_STEADY: &str = "■■■";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<u64>,
    /// Sparkline glyphs, present only on totals rows when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
}

impl TableRow {
    pub fn new(label: impl Into<String>, values: Vec<u64>) -> Self {
        Self {
            label: label.into(),
            values,
            trend: None,
        }
    }
}

/// Presentation-ready report: the renderer only formats, never computes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    /// Label column header followed by one header per value column, then
    /// [`TREND_HEADER`] when rows carry a trend.
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<TableRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub show_summary: bool,
    /// Only the totals view has a trend column.
    pub show_trend: bool,
}

pub fn build_report(
    store: &AuthorStore,
    mode: ReportMode,
    window: &DateWindow,
    options: ReportOptions,
) -> ReportTable {
    let show_summary = options.show_summary;
    match mode {
        ReportMode::Totals if options.show_trend => {
            let mut table = totals_table(store, show_summary);
            add_trend_column(&mut table, store, window);
            table
        }
        ReportMode::Totals => totals_table(store, show_summary),
        ReportMode::ByDay(metric) => by_day_table(store, metric, window, show_summary),
        ReportMode::InvertedByDay(metric) => {
            inverted_by_day_table(store, metric, window, show_summary)
        }
    }
}

pub fn totals_table(store: &AuthorStore, show_summary: bool) -> ReportTable {
    let mut summary = ChangeSet::default();
    let rows = store
        .sorted_by_total_changes()
        .into_iter()
        .map(|author| {
            let totals = author.totals();
            summary.add(&totals);
            TableRow::new(
                author.name.clone(),
                vec![totals.commits, totals.files, totals.lines()],
            )
        })
        .collect();

    ReportTable {
        title: "Totals By Author".to_string(),
        headers: ["Author", "Commits", "Files", "Lines"].map(String::from).to_vec(),
        rows,
        footer: show_summary.then(|| {
            TableRow::new(
                SUMMARY_LABEL,
                vec![summary.commits, summary.files, summary.lines()],
            )
        }),
    }
}

/// Append a trend of each author's daily lines changed across the window.
/// Rows are matched to authors in the same order `totals_table` emits them.
fn add_trend_column(table: &mut ReportTable, store: &AuthorStore, window: &DateWindow) {
    let (keys, _) = window_columns(window);
    let authors = store.sorted_by_total_changes();
    for (row, author) in table.rows.iter_mut().zip(authors) {
        let series = day_values(author, Metric::Lines, &keys);
        row.trend = Some(trend_line(&series).to_string());
    }
    table.headers.push(TREND_HEADER.to_string());
}

/// Three-glyph sketch of a series: low when the average stays under half of
/// the peak, otherwise rising, falling or steady by comparing the ends.
pub fn trend_line(series: &[u64]) -> &'static str {
    let (Some(&first), Some(&last)) = (series.first(), series.last()) else {
        return TREND_FLAT_LOW;
    };
    let max = series.iter().copied().max().unwrap_or(0);
    let average = series.iter().sum::<u64>() as f64 / series.len() as f64;

    if average < max as f64 * 0.5 {
        TREND_FLAT_LOW
    } else if last > first {
        TREND_RISING
    } else if last < first {
        TREND_FALLING
    } else {
        TREND_STEADY
    }
}

pub fn by_day_table(
    store: &AuthorStore,
    metric: Metric,
    window: &DateWindow,
    show_summary: bool,
) -> ReportTable {
    let (keys, day_headers) = window_columns(window);

    let mut headers = vec!["Author's Name".to_string()];
    headers.extend(day_headers);
    headers.push(TOTAL_HEADER.to_string());

    let mut column_sums = vec![0u64; keys.len()];
    let rows = store
        .sorted_by_total_changes()
        .into_iter()
        .map(|author| {
            let mut values = day_values(author, metric, &keys);
            for (sum, value) in column_sums.iter_mut().zip(&values) {
                *sum += value;
            }
            let total: u64 = values.iter().sum();
            values.push(total);
            TableRow::new(author.name.clone(), values)
        })
        .collect();

    ReportTable {
        title: format!("Total {metric} By Author By Day"),
        headers,
        rows,
        footer: show_summary.then(|| summary_row(column_sums)),
    }
}

pub fn inverted_by_day_table(
    store: &AuthorStore,
    metric: Metric,
    window: &DateWindow,
    show_summary: bool,
) -> ReportTable {
    let (keys, day_headers) = window_columns(window);
    let authors = store.sorted_by_total_changes();

    let mut headers = vec!["Date".to_string()];
    headers.extend(authors.iter().map(|a| a.name.clone()));
    headers.push(TOTAL_HEADER.to_string());

    let mut column_sums = vec![0u64; authors.len()];
    let rows = keys
        .iter()
        .zip(day_headers)
        .map(|(key, label)| {
            let mut values: Vec<u64> = authors
                .iter()
                .map(|author| author.change_set(key).metric(metric))
                .collect();
            for (sum, value) in column_sums.iter_mut().zip(&values) {
                *sum += value;
            }
            let total: u64 = values.iter().sum();
            values.push(total);
            TableRow::new(label, values)
        })
        .collect();

    ReportTable {
        title: format!("Total {metric} By Day By Author"),
        headers,
        rows,
        footer: show_summary.then(|| summary_row(column_sums)),
    }
}

/// Lookup keys and display headers for each day of the window.
fn window_columns(window: &DateWindow) -> (Vec<String>, Vec<String>) {
    window
        .dates()
        .into_iter()
        .map(|d| {
            (
                d.format(DATE_KEY_FORMAT).to_string(),
                d.format(DAY_HEADER_FORMAT).to_string(),
            )
        })
        .unzip()
}

fn day_values(author: &AuthorData, metric: Metric, keys: &[String]) -> Vec<u64> {
    keys.iter()
        .map(|key| author.change_set(key).metric(metric))
        .collect()
}

fn summary_row(mut column_sums: Vec<u64>) -> TableRow {
    let grand_total: u64 = column_sums.iter().sum();
    column_sums.push(grand_total);
    TableRow::new(SUMMARY_LABEL, column_sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn window() -> DateWindow {
        DateWindow::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 3)
    }

    /// Alice: 100 lines, Bob: 50 lines, Carol: 50 lines (discovered after Bob).
    fn store() -> AuthorStore {
        let mut store = AuthorStore::new();
        let bob = store.get_or_insert("bob@x.com", "Bob");
        let alice = store.get_or_insert("alice@x.com", "Alice");
        let carol = store.get_or_insert("carol@x.com", "Carol");

        let day = store.at_mut(bob).change_set_mut("2024-01-05");
        *day = change_set(40, 10, 2, 1);

        let day = store.at_mut(alice).change_set_mut("2024-01-05");
        *day = change_set(30, 0, 1, 1);
        let day = store.at_mut(alice).change_set_mut("2024-01-07");
        *day = change_set(60, 10, 3, 2);

        let day = store.at_mut(carol).change_set_mut("2024-01-06");
        *day = change_set(25, 25, 1, 4);
        store
    }

    fn change_set(additions: u64, deletions: u64, files: u64, commits: u64) -> ChangeSet {
        ChangeSet {
            additions,
            deletions,
            files,
            commits,
        }
    }

    fn labels(table: &ReportTable) -> Vec<&str> {
        table.rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn totals_order_and_summary() {
        let table = totals_table(&store(), true);
        assert_eq!(labels(&table), vec!["Alice", "Bob", "Carol"]);
        assert_eq!(table.rows[0].values, vec![3, 4, 100]);
        assert_eq!(
            table.footer,
            Some(TableRow::new(SUMMARY_LABEL, vec![8, 7, 200]))
        );
    }

    #[test]
    fn totals_without_summary_has_no_footer() {
        assert_eq!(totals_table(&store(), false).footer, None);
    }

    #[test]
    fn two_authors_summary_scenario() {
        let mut store = AuthorStore::new();
        let b = store.get_or_insert("b@x.com", "B");
        store.at_mut(b).change_set_mut("2024-01-05").additions = 50;
        let a = store.get_or_insert("a@x.com", "A");
        store.at_mut(a).change_set_mut("2024-01-06").deletions = 100;

        let table = totals_table(&store, true);
        assert_eq!(labels(&table), vec!["A", "B"]);
        assert_eq!(table.footer.unwrap().values[2], 150);
    }

    #[test]
    fn by_day_lines() {
        let table = by_day_table(&store(), Metric::Lines, &window(), true);
        assert_eq!(table.title, "Total Lines By Author By Day");
        assert_eq!(table.headers, vec!["Author's Name", "01/05", "01/06", "01/07", "Total"]);
        assert_eq!(table.rows[0].values, vec![30, 0, 70, 100]);
        assert_eq!(table.rows[1].values, vec![50, 0, 0, 50]);
        assert_eq!(table.rows[2].values, vec![0, 50, 0, 50]);
        assert_eq!(table.footer.unwrap().values, vec![80, 50, 70, 200]);
    }

    #[test]
    fn by_day_commits_metric() {
        let table = by_day_table(&store(), Metric::Commits, &window(), false);
        assert_eq!(table.rows[0].values, vec![1, 0, 2, 3]);
        assert_eq!(table.rows[2].values, vec![0, 4, 0, 4]);
        assert!(table.footer.is_none());
    }

    #[test]
    fn by_day_total_matches_totals_view_lines() {
        let store = store();
        let by_day = by_day_table(&store, Metric::Lines, &window(), false);
        let totals = totals_table(&store, false);
        for (day_row, total_row) in by_day.rows.iter().zip(&totals.rows) {
            assert_eq!(day_row.values.last(), total_row.values.last());
        }
    }

    #[test]
    fn inverted_is_transposed() {
        let table = inverted_by_day_table(&store(), Metric::Files, &window(), true);
        assert_eq!(table.title, "Total Files By Day By Author");
        assert_eq!(table.headers, vec!["Date", "Alice", "Bob", "Carol", "Total"]);
        assert_eq!(labels(&table), vec!["01/05", "01/06", "01/07"]);
        assert_eq!(table.rows[0].values, vec![1, 2, 0, 3]);
        assert_eq!(table.rows[1].values, vec![0, 0, 1, 1]);
        assert_eq!(table.rows[2].values, vec![3, 0, 0, 3]);
        assert_eq!(table.footer.unwrap().values, vec![4, 2, 1, 7]);
    }

    #[test]
    fn build_report_dispatches_on_mode() {
        let store = store();
        let options = ReportOptions::default();
        let mode = ReportMode::InvertedByDay(Metric::Lines);
        let table = build_report(&store, mode, &window(), options);
        assert_eq!(table.headers[0], "Date");
        let table = build_report(&store, ReportMode::Totals, &window(), options);
        assert_eq!(table.headers[0], "Author");
        assert!(table.rows.iter().all(|r| r.trend.is_none()));
    }

    #[test]
    fn totals_trend_column() {
        let options = ReportOptions {
            show_summary: true,
            show_trend: true,
        };
        let mut store = store();
        let dave = store.get_or_insert("dave@x.com", "Dave");
        for (day, lines) in [("2024-01-05", 40), ("2024-01-06", 45), ("2024-01-07", 80)] {
            store.at_mut(dave).change_set_mut(day).additions = lines;
        }

        let table = build_report(&store, ReportMode::Totals, &window(), options);
        assert_eq!(table.headers, vec!["Author", "Commits", "Files", "Lines", "Trend"]);
        assert_eq!(labels(&table), vec!["Dave", "Alice", "Bob", "Carol"]);
        assert_eq!(table.rows[0].trend.as_deref(), Some(TREND_RISING));
        // Alice [30, 0, 70] averages under half of her peak.
        assert_eq!(table.rows[1].trend.as_deref(), Some(TREND_FLAT_LOW));
        assert_eq!(table.footer.unwrap().trend, None);
    }

    #[test]
    fn trend_is_only_added_to_totals() {
        let options = ReportOptions {
            show_summary: false,
            show_trend: true,
        };
        let table = build_report(&store(), ReportMode::ByDay(Metric::Lines), &window(), options);
        assert_eq!(table.headers.last().map(String::as_str), Some(TOTAL_HEADER));
        assert!(table.rows.iter().all(|r| r.trend.is_none()));
    }

    #[test]
    fn trend_line_shapes() {
        assert_eq!(trend_line(&[]), TREND_FLAT_LOW);
        assert_eq!(trend_line(&[0, 0, 0]), TREND_STEADY);
        assert_eq!(trend_line(&[4, 5, 6]), TREND_RISING);
        assert_eq!(trend_line(&[6, 5, 4]), TREND_FALLING);
        assert_eq!(trend_line(&[5, 6, 5]), TREND_STEADY);
        assert_eq!(trend_line(&[0, 0, 0, 10]), TREND_FLAT_LOW);
    }

    #[test]
    fn empty_store_yields_empty_rows() {
        let table = by_day_table(&AuthorStore::new(), Metric::Lines, &window(), true);
        assert!(table.rows.is_empty());
        assert_eq!(table.footer.unwrap().values, vec![0, 0, 0, 0]);
    }
}
