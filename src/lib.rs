pub mod cli;
pub mod contrib;
pub mod error;
pub mod git;
pub mod model;
pub mod util;

pub use error::{ContribError, Result};
