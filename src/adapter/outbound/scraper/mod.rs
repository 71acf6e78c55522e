//! Activity scrapers.
//!
//! The browser automation lives in an external program; this adapter runs
//! it, reads the raw activity table it prints and normalizes each row into
//! an [`ActivityEvent`](crate::domain::ActivityEvent).

mod command;
mod row;

pub use command::{CommandScraper, CommandScraperConfig};
pub use row::{normalize_rows, RawActivityRow};
