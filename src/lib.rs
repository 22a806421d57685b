//! pdfsweep - browser-driven bulk download of the PDFs linked from a page.
//!
//! A real browser loads the target page, every element that looks like a
//! PDF link is visited in its own tab so the browser's download manager
//! saves the file, and each finished file is renamed with a zero-padded
//! sequence prefix (`001-report.pdf`, `002-...`).

pub mod browser;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod harvest;
pub mod services;
pub mod storage;

pub use config::Settings;
pub use harvest::harvest;
pub use services::DownloadSummary;
