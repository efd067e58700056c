use crate::model::{Metric, MAX_WINDOW_DAYS};
use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-contrib")]
#[command(about = "Statistics by author for a git repository, as totals or by day")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub args: ContribArgs,
}

#[derive(Args, Clone, Debug)]
pub struct ContribArgs {
    #[arg(help = "Path to the repository (defaults to the current directory)")]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        help = "Start of the range: YYYY-MM-DD, \"week\", \"workweek\" or \"<n> days|weeks|months\""
    )]
    pub from: Option<String>,

    #[arg(
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_DAYS as i64),
        help = "Number of days to include from the start (0 = up to today)"
    )]
    pub to: u32,

    #[arg(
        long = "by-day",
        value_name = "METRIC",
        help = "Show results by day [lines, files, commits]"
    )]
    pub by_day: Option<Metric>,

    #[arg(long, requires = "by_day", help = "Show one row per day and one column per author")]
    pub inverted: bool,

    #[arg(long, help = "Add a summary totals row")]
    pub show_summary: bool,

    #[arg(long, conflicts_with = "by_day", help = "Add a trend column to the totals")]
    pub trend: bool,

    #[arg(long, value_delimiter = ',', help = "Authors to ignore (case-insensitive substring)")]
    pub ignore_authors: Vec<String>,

    #[arg(long, value_delimiter = ',', help = "Files to ignore (case-insensitive substring)")]
    pub ignore_files: Vec<String>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        crate::contrib::exec(self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("git-contrib").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.args.path, None);
        assert_eq!(cli.args.to, 0);
        assert_eq!(cli.args.by_day, None);
        assert!(cli.args.ignore_authors.is_empty());
    }

    #[test]
    fn lists_and_metric() {
        let cli = parse(&[
            "repo",
            "--by-day",
            "Commits",
            "--ignore-authors",
            "bot,ci",
            "--ignore-files",
            "vendor/",
            "--ignore-files",
            ".lock",
        ])
        .unwrap();
        assert_eq!(cli.args.path, Some(PathBuf::from("repo")));
        assert_eq!(cli.args.by_day, Some(Metric::Commits));
        assert_eq!(cli.args.ignore_authors, vec!["bot", "ci"]);
        assert_eq!(cli.args.ignore_files, vec!["vendor/", ".lock"]);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!(parse(&["--by-day", "words"]).is_err());
    }

    #[test]
    fn to_is_capped() {
        let limit = MAX_WINDOW_DAYS.to_string();
        assert_eq!(parse(&["--to", &limit]).unwrap().args.to, MAX_WINDOW_DAYS);
        let over = (MAX_WINDOW_DAYS + 1).to_string();
        assert!(parse(&["--to", &over]).is_err());
    }

    #[test]
    fn trend_is_for_totals_only() {
        assert!(parse(&["--trend"]).unwrap().args.trend);
        assert!(parse(&["--trend", "--by-day", "lines"]).is_err());
    }

    #[test]
    fn inverted_requires_by_day() {
        assert!(parse(&["--inverted"]).is_err());
        assert!(parse(&["--inverted", "--by-day", "lines"]).is_ok());
    }
}
