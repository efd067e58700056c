pub mod exec;
pub mod output;
pub mod parse;
pub mod pivot;

pub use exec::exec;
pub use output::{output_json, output_table, render_table};
pub use parse::{parse_log, IgnoreLists, LogParser};
pub use pivot::{build_report, trend_line, ReportOptions, ReportTable, TableRow};
