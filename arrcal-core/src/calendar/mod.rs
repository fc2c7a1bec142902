pub mod store;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ArrcalError;
use crate::models::ReleaseBatch;
use crate::sources::CalendarSource;

pub use store::{day_of, CalendarStore};

/// Days fetched on either side of today, and per forward extension.
pub const DEFAULT_SPAN_DAYS: u32 = 45;

/// Cancels the calendar's in-flight fetch. Cancellation is a clean
/// abort: partial merges stay, no error is reported.
#[derive(Clone)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Aggregated release calendar over every configured instance.
///
/// Owns the date axis (each day a load attempt has covered, exactly
/// once, in append order) and the day-indexed merge store. All state is
/// mutated on the caller's task; the per-instance fetches are the only
/// concurrent part and report back through their join handles.
pub struct MediaCalendar {
    sources: Vec<Arc<dyn CalendarSource>>,
    dates: Vec<NaiveDate>,
    store: CalendarStore,
    days: u32,
    is_loading: bool,
    is_loading_future: bool,
    error: Option<ArrcalError>,
    cancel_tx: watch::Sender<bool>,
    revision_tx: watch::Sender<u64>,
}

impl MediaCalendar {
    pub fn new(sources: Vec<Arc<dyn CalendarSource>>, days: u32) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        let (revision_tx, _) = watch::channel(0);
        Self {
            sources,
            dates: Vec::new(),
            store: CalendarStore::new(),
            days,
            is_loading: false,
            is_loading_future: false,
            error: None,
            cancel_tx,
            revision_tx,
        }
    }

    /// Fetch `[today - days, today + days]`. Already-loading calls
    /// return immediately; the flag is cleared on every exit path.
    pub async fn load(&mut self) {
        if self.is_loading {
            return;
        }
        self.is_loading = true;

        let today = self.today();
        let span = Duration::days(self.days as i64);
        self.fetch(today - span, today + span).await;

        self.is_loading = false;
    }

    /// Extend the axis forward from its latest day. Safe to call
    /// repeatedly; an outstanding extension makes this a no-op.
    pub async fn load_more_dates(&mut self) {
        if self.is_loading_future {
            return;
        }
        let Some(last) = self.dates.last().copied() else {
            return;
        };
        self.is_loading_future = true;

        self.fetch(last, last + Duration::days(self.days as i64)).await;

        self.is_loading_future = false;
    }

    pub fn reset(&mut self) {
        self.sources.clear();
        self.dates.clear();
        self.store.reset();
        self.error = None;
        self.notify();
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel_tx.clone())
    }

    /// Receiver that observes a revision bump after every completed
    /// fetch or reset; consumers re-read state when it changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// The axis in display order. Appends happen in fetch-completion
    /// order, so the raw axis is only sorted within one fetch window.
    pub fn sorted_dates(&self) -> Vec<NaiveDate> {
        let mut dates = self.dates.clone();
        dates.sort_unstable();
        dates
    }

    pub fn store(&self) -> &CalendarStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_loading_future(&self) -> bool {
        self.is_loading_future
    }

    pub fn error(&self) -> Option<&ArrcalError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// One concurrent releases query per source, joined without
    /// short-circuit, then merged sequentially on this task. Partial
    /// merges survive failures; the axis only grows on a clean pass.
    async fn fetch(&mut self, start: NaiveDate, end: NaiveDate) {
        self.error = None;

        if end < start {
            self.error = Some(ArrcalError::InvalidRange { start, end });
            self.notify();
            return;
        }

        // send_replace stores the value even with no live receivers, so
        // a cancel raised between fetches cannot leak into this one
        self.cancel_tx.send_replace(false);

        let handles: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let mut cancel_rx = self.cancel_tx.subscribe();
                tokio::spawn(async move {
                    tokio::select! {
                        result = source.releases(start, end) => result,
                        _ = cancel_rx.wait_for(|&cancelled| cancelled) => {
                            Err(ArrcalError::Cancelled)
                        }
                    }
                })
            })
            .collect();

        let mut batches: Vec<ReleaseBatch> = Vec::new();
        let mut failure: Option<ArrcalError> = None;
        let mut cancelled = false;

        for handle in handles {
            match handle.await {
                Ok(Ok(batch)) => batches.push(batch),
                Ok(Err(err)) if err.is_cancelled() => cancelled = true,
                Ok(Err(err)) => {
                    warn!(error = %err, "calendar fetch failed");
                    failure = Some(err);
                }
                Err(err) => {
                    failure = Some(ArrcalError::Source(format!("fetch task failed: {err}")));
                }
            }
        }

        for batch in &batches {
            self.store.apply(batch);
        }

        match failure {
            Some(err) => self.error = Some(err),
            None if !cancelled => self.insert_dates(start, end),
            None => debug!(%start, %end, "calendar fetch cancelled"),
        }

        self.notify();
    }

    fn insert_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        let mut day = start;
        while day <= end {
            if !self.dates.contains(&day) {
                self.dates.push(day);
            }
            day += Duration::days(1);
        }
    }

    fn notify(&self) {
        self.revision_tx.send_modify(|revision| *revision += 1);
    }
}
