use super::output::{output_json, output_table};
use super::parse::{parse_log, IgnoreLists};
use super::pivot::{build_report, ReportOptions};
use crate::cli::ContribArgs;
use crate::git::GitRepo;
use crate::model::{DateWindow, ReportMode};
use crate::util::resolve_start;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::info;

pub fn exec(args: ContribArgs) -> anyhow::Result<()> {
    let mode = ReportMode::select(args.by_day, args.inverted)?;
    let repo = GitRepo::open(args.path.as_ref())?;

    let today = Local::now().date_naive();
    let window = resolve_window(args.from.as_deref(), args.to, today)?;
    info!(start = %window.start(), days = window.days(), ?mode, "collecting contributions");

    let ignore = IgnoreLists {
        authors: args.ignore_authors,
        files: args.ignore_files,
    };

    let stdout = Term::stdout();
    let spinner = stdout.is_term().then(start_spinner);
    let started = Instant::now();

    let store = repo
        .stream_log(&window, |reader| {
            parse_log(reader, |date| window.contains(date), &ignore)
        })
        .context("Failed to collect contributions from git log");

    let store = match (store, spinner) {
        (Ok(store), Some(pb)) => {
            let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
            pb.finish_with_message(format!("Done in {}", humantime::format_duration(elapsed)));
            store
        }
        (result, pb) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            result?
        }
    };

    let options = ReportOptions {
        show_summary: args.show_summary,
        show_trend: args.trend,
    };
    let table = build_report(&store, mode, &window, options);

    if args.json {
        output_json(&table, repo.path(), &window, mode)?;
    } else {
        let max_width = match mode {
            ReportMode::Totals => None,
            _ if stdout.is_term() => Some(stdout.size().1 as usize),
            _ => None,
        };
        output_table(&table, max_width)?;
    }

    Ok(())
}

fn resolve_window(from: Option<&str>, to: u32, today: NaiveDate) -> anyhow::Result<DateWindow> {
    let start = match from {
        Some(phrase) => resolve_start(phrase, today)
            .with_context(|| format!("Failed to resolve --from '{phrase}'"))?,
        None => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN),
    };
    Ok(DateWindow::from_start(start, to, today)?)
}

fn start_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Processing git log...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
