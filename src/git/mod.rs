pub mod log;

pub use log::{is_git_directory, GitRepo};
