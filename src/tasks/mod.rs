//! The sequential stages of a research run.

pub mod complete;
pub mod compose;
pub mod crawl;
pub mod parse;
