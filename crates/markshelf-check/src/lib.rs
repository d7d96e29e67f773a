//! Link checking for markshelf.
//!
//! Probes bookmark URLs concurrently and reports the ones that are broken.
//!
//! # Example
//!
//! ```rust,no_run
//! use markshelf_check::{CheckConfig, LinkChecker};
//! use markshelf_core::{Bookmark, Folder};
//!
//! # async fn run() -> Result<(), markshelf_check::CheckError> {
//! let tree = Folder::root().with_child(Bookmark::new("Rust", "https://www.rust-lang.org"));
//! let checker = LinkChecker::new(CheckConfig::default())?;
//!
//! for link in checker.find_broken_links(&tree).await {
//!     println!("{} ({})", link.url(), link.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use markshelf_check::{CheckConfig, LinkChecker};
//!
//! # fn run() -> Result<(), markshelf_check::CheckError> {
//! let checker = LinkChecker::new(CheckConfig::default())?;
//! let mut progress_rx = checker.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("{}/{} checked", progress.checked, progress.total);
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod checker;
mod error;
mod filter;
mod probe;
mod progress;

pub use checker::{LinkChecker, check_link};
pub use error::CheckError;
pub use filter::{UrlFilter, is_checkable_url, is_pseudo_scheme};
pub use probe::{HttpProbe, ProbeFailure, ProbeMethod, ReqwestProbe};
pub use progress::CheckProgress;

// Re-export core types for convenience
pub use markshelf_core::{BrokenLink, CheckConfig, LinkStatus};
