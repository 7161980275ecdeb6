pub mod error;
pub mod process;
pub mod validate;

pub use error::{Result, TimeDiffError};
pub use process::{run, RunSummary};
