//! Single-pass parser for `git log --numstat` output.
//!
//! The log is requested with [`LOG_FORMAT`], which yields one header line per
//! commit followed by one `<added>\t<deleted>\t<path>` line per changed file:
//!
//! ```text
//! ^1a2b3c4|2024-01-05T10:11:12+01:00|Jane Doe|<Jane@Example.com>
//! 10	2	src/lib.rs
//! ```
//!
//! The same commit can be printed several times when it is reachable from
//! more than one ref; only its first occurrence is counted.

use crate::error::{ContribError, Result};
use crate::model::AuthorStore;
use crate::util::contains_any_ignore_case;
use std::collections::HashSet;
use std::io::BufRead;
use tracing::{debug, trace};

pub const HEADER_MARKER: char = '^';
pub const HEADER_DELIMITER: char = '|';
pub const LOG_FORMAT: &str = "--format=^%h|%aI|%aN|<%aE>";

const HEADER_FIELDS: usize = 4;

/// Case-insensitive substring filters applied while parsing.
#[derive(Debug, Clone, Default)]
pub struct IgnoreLists {
    pub authors: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum LineKind {
    Blank,
    Header,
    FileStat,
    Other,
}

fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if line.starts_with(HEADER_MARKER) {
        LineKind::Header
    } else if line.starts_with(|c: char| c.is_ascii_digit()) {
        LineKind::FileStat
    } else {
        LineKind::Other
    }
}

#[derive(Debug, PartialEq, Eq)]
struct CommitHeader<'a> {
    hash: &'a str,
    date: &'a str,
    author_name: &'a str,
    author_email: String,
}

/// Hash and date are taken from the left, the bracketed email from the
/// right; everything in between is the author name, `|` included.
fn parse_header(line: &str) -> Result<CommitHeader<'_>> {
    let too_few = || {
        ContribError::grammar(line, format!("commit header needs {HEADER_FIELDS} fields"))
    };

    let (hash, rest) = line.split_once(HEADER_DELIMITER).ok_or_else(too_few)?;
    let (date, rest) = rest.split_once(HEADER_DELIMITER).ok_or_else(too_few)?;
    let (author_name, email) = rest.rsplit_once(HEADER_DELIMITER).ok_or_else(too_few)?;

    let hash = hash.trim_start_matches(HEADER_MARKER);
    let date = date.split('T').next().unwrap_or_default().trim();
    let author_email = email
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_lowercase();

    Ok(CommitHeader {
        hash,
        date,
        author_name,
        author_email,
    })
}

#[derive(Debug, PartialEq, Eq)]
struct FileStatLine<'a> {
    line: &'a str,
    additions: &'a str,
    deletions: &'a str,
    path: String,
}

fn split_file_stat(line: &str) -> Result<FileStatLine<'_>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ContribError::grammar(line, "file stat line has fewer than 2 fields"));
    }
    Ok(FileStatLine {
        line,
        additions: tokens[0],
        deletions: tokens[1],
        path: tokens[2..].join(" "),
    })
}

impl FileStatLine<'_> {
    fn counts(&self) -> Result<(u64, u64)> {
        Ok((
            parse_count(self.line, self.additions, "additions")?,
            parse_count(self.line, self.deletions, "deletions")?,
        ))
    }
}

fn parse_count(line: &str, token: &str, what: &str) -> Result<u64> {
    token
        .parse()
        .map_err(|_| ContribError::grammar(line, format!("invalid number for {what}: '{token}'")))
}

/// Commit that subsequent file stat lines are attributed to.
#[derive(Debug)]
struct Attribution {
    author: usize,
    date: String,
}

/// Parser state for one run. Nothing outlives [`LogParser::finish`].
pub struct LogParser<'a, F> {
    in_window: F,
    ignore: &'a IgnoreLists,
    store: AuthorStore,
    seen_commits: HashSet<String>,
    current: Option<Attribution>,
    skipping: bool,
}

impl<'a, F> LogParser<'a, F>
where
    F: Fn(&str) -> bool,
{
    /// `in_window` decides whether a `YYYY-MM-DD` author date is reported.
    pub fn new(in_window: F, ignore: &'a IgnoreLists) -> Self {
        Self {
            in_window,
            ignore,
            store: AuthorStore::new(),
            seen_commits: HashSet::new(),
            current: None,
            skipping: false,
        }
    }

    pub fn feed(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches(['\r', '\n']);
        let kind = classify(line);

        if kind == LineKind::Blank {
            return Ok(());
        }
        if self.skipping && kind != LineKind::Header {
            return Ok(());
        }

        match kind {
            LineKind::Header => self.on_header(line),
            LineKind::FileStat if self.current.is_some() => self.on_file_stat(line),
            _ => Ok(()),
        }
    }

    fn on_header(&mut self, line: &str) -> Result<()> {
        let header = parse_header(line)?;

        if self.seen_commits.contains(header.hash) {
            trace!(hash = header.hash, "skipping already counted commit");
            self.skipping = true;
            return Ok(());
        }
        self.skipping = false;
        self.seen_commits.insert(header.hash.to_string());
        self.current = None;

        if !(self.in_window)(header.date) {
            debug!(hash = header.hash, date = header.date, "commit outside date window");
            return Ok(());
        }

        if contains_any_ignore_case(header.author_name, &self.ignore.authors) {
            debug!(hash = header.hash, author = header.author_name, "ignoring author");
            return Ok(());
        }

        let idx = self.store.get_or_insert(&header.author_email, header.author_name);
        self.store.at_mut(idx).change_set_mut(header.date).commits += 1;
        self.current = Some(Attribution {
            author: idx,
            date: header.date.to_string(),
        });
        Ok(())
    }

    fn on_file_stat(&mut self, line: &str) -> Result<()> {
        let Some(current) = &self.current else {
            return Ok(());
        };

        let stat = split_file_stat(line)?;
        if contains_any_ignore_case(&stat.path, &self.ignore.files) {
            trace!(path = %stat.path, "ignoring file");
            return Ok(());
        }
        let (additions, deletions) = stat.counts()?;

        let changes = self.store.at_mut(current.author).change_set_mut(&current.date);
        changes.additions += additions;
        changes.deletions += deletions;
        changes.files += 1;
        Ok(())
    }

    pub fn finish(self) -> AuthorStore {
        debug!(
            commits = self.seen_commits.len(),
            authors = self.store.len(),
            "finished parsing git log"
        );
        self.store
    }
}

/// Parse a complete log stream. Read failures surface as
/// [`ContribError::SourceIo`], malformed lines as [`ContribError::Grammar`].
pub fn parse_log<R, F>(reader: R, in_window: F, ignore: &IgnoreLists) -> Result<AuthorStore>
where
    R: BufRead,
    F: Fn(&str) -> bool,
{
    let mut parser = LogParser::new(in_window, ignore);
    for line in reader.lines() {
        parser.feed(&line?)?;
    }
    Ok(parser.finish())
}
