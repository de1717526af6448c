//! CLI subcommand implementations for the `magic-showtimes` binary.

pub mod doctor;
pub mod extract_cmd;
pub mod output;
pub mod scrape_cmd;
