pub mod browser;
pub mod cli;
pub mod error;
pub mod fixtures;
pub mod page;
pub mod report;
pub mod spec;
pub mod trace;
