//! Service layer for pdfsweep.
//!
//! Domain logic that drives the browser through the [`crate::browser`]
//! traits, independent of how the browser was started.

pub mod download;

pub use download::{download_pdfs, DownloadConfig, DownloadSummary};
