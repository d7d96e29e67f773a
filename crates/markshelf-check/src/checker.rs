//! Concurrent link checker.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use markshelf_core::{BrokenLink, CheckConfig, FlatBookmark, Folder, LinkStatus, flatten};
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::CheckError;
use crate::filter::{UrlFilter, is_pseudo_scheme};
use crate::probe::{HttpProbe, ProbeMethod, ReqwestProbe};
use crate::progress::{CheckProgress, ProgressTracker};

/// Status codes after which a HEAD probe is retried with GET.
const RETRY_WITH_GET: [u16; 3] = [403, 404, 405];

/// Probe one URL and classify the result.
///
/// HEAD is tried first; servers answering 403, 404 or 405 get a second
/// chance with GET.
pub async fn check_link<P>(probe: &P, url: &str, timeout: Duration) -> LinkStatus
where
    P: HttpProbe + ?Sized,
{
    if is_pseudo_scheme(url) {
        return LinkStatus::Skipped;
    }

    let result = match probe.probe(url, ProbeMethod::Head, timeout).await {
        Ok(code) if RETRY_WITH_GET.contains(&code) => {
            probe.probe(url, ProbeMethod::Get, timeout).await
        }
        other => other,
    };

    match result {
        Ok(code) => LinkStatus::Http(code),
        Err(failure) => failure.into(),
    }
}

/// Checks bookmark URLs for liveness with a bounded number of requests in flight.
pub struct LinkChecker<P = ReqwestProbe> {
    probe: Arc<P>,
    config: CheckConfig,
    filter: UrlFilter,
    cancel: CancellationToken,
    progress_tx: broadcast::Sender<CheckProgress>,
}

impl LinkChecker<ReqwestProbe> {
    /// Create a checker that probes over HTTP.
    pub fn new(config: CheckConfig) -> Result<Self, CheckError> {
        let probe = ReqwestProbe::new(&config)?;
        Self::with_probe(probe, config)
    }
}

impl<P: HttpProbe + 'static> LinkChecker<P> {
    /// Create a checker with a custom probe.
    ///
    /// Configs built as struct literals skip the builder's validation, so
    /// zero concurrency or timeout is rejected here too.
    pub fn with_probe(probe: P, config: CheckConfig) -> Result<Self, CheckError> {
        if config.concurrency == 0 {
            return Err(CheckError::invalid_config("concurrency must be at least 1"));
        }
        if config.timeout_secs == 0 {
            return Err(CheckError::invalid_config("timeout_secs must be at least 1"));
        }
        let filter = UrlFilter::new(&config.exclude_patterns)?;
        let (progress_tx, _) = broadcast::channel(100);
        Ok(Self {
            probe: Arc::new(probe),
            config,
            filter,
            cancel: CancellationToken::new(),
            progress_tx,
        })
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<CheckProgress> {
        self.progress_tx.subscribe()
    }

    /// Token that stops the current and future runs when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configuration in use.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// The probe requests go through.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Flatten the tree and check every bookmark in it.
    pub async fn find_broken_links(&self, root: &Folder) -> Vec<BrokenLink> {
        self.check_all(&flatten(root)).await
    }

    /// Check the given bookmarks and return the broken ones.
    ///
    /// Results come back in completion order. Bookmarks rejected by the
    /// URL filter are never probed and never reported. After cancellation
    /// or the deadline, pending bookmarks are dropped from the result.
    pub async fn check_all(&self, bookmarks: &[FlatBookmark]) -> Vec<BrokenLink> {
        let candidates: Vec<FlatBookmark> = bookmarks
            .iter()
            .filter(|b| self.filter.should_check(b.url()))
            .cloned()
            .collect();

        let total = candidates.len();
        tracing::info!(
            total,
            skipped = bookmarks.len() - total,
            concurrency = self.config.concurrency,
            "checking links"
        );

        let run = self.cancel.child_token();
        let deadline = self.config.deadline().map(|limit| {
            let run = run.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!(?limit, "deadline reached, stopping link check");
                run.cancel();
            })
        });

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let timeout = self.config.timeout();
        let mut tasks = JoinSet::new();

        for bookmark in candidates {
            let probe = Arc::clone(&self.probe);
            let semaphore = Arc::clone(&semaphore);
            let run = run.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit.ok()?,
                    _ = run.cancelled() => return None,
                };

                let probing = AssertUnwindSafe(check_link(probe.as_ref(), bookmark.url(), timeout))
                    .catch_unwind();

                let status = tokio::select! {
                    outcome = probing => outcome.unwrap_or_else(|panic| {
                        LinkStatus::Unexpected(panic_message(panic.as_ref()))
                    }),
                    _ = run.cancelled() => return None,
                };

                Some((bookmark, status))
            });
        }

        let mut tracker = ProgressTracker::new(total);
        let mut broken = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (bookmark, status) = match joined {
                Ok(Some(result)) => result,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "link check task failed");
                    continue;
                }
            };

            let is_broken = status.is_broken();
            tracker.record(bookmark.url(), is_broken);
            // Sending fails only when nobody is subscribed.
            let _ = self.progress_tx.send(tracker.snapshot());

            if is_broken {
                tracing::debug!(url = bookmark.url(), %status, "broken link");
                broken.push(BrokenLink::new(bookmark, status));
            }
        }

        if let Some(timer) = deadline {
            timer.abort();
        }

        let progress = tracker.snapshot();
        tracing::info!(
            checked = progress.checked,
            broken = progress.broken,
            elapsed = ?progress.elapsed,
            "link check finished"
        );

        broken
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "probe panicked".to_string()
    }
}
