//! ytmp3-core: Bounded-concurrency batch downloads of YouTube audio as MP3

pub mod batch;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetch;
pub mod list;
pub mod metadata;
pub mod outcome;

pub use batch::Batch;
pub use config::{Bitrate, Config};
pub use error::{Result, Ytmp3Error};
pub use fetch::Fetch;
pub use outcome::{Outcome, OutcomeStatus, Summary, WorkItem};
