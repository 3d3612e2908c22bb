//! TDL core: retrying batch downloader for movie trailers.
//!
//! Reads a work list, drives each item through the retry state machine
//! against a fetch backend, and reports per-item outcomes and run totals.

pub mod batch;
pub mod collect;
pub mod config;
pub mod fetch;
pub mod input;
pub mod item;
pub mod logging;
pub mod retry;
pub mod url_model;

pub use item::{Disposition, ItemResult, ItemStatus, RunSummary, WorkItem};
