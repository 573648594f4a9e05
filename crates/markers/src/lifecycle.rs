//! Marker lifecycle manager.
//!
//! Every selection pass is reconciled against the markers that already
//! exist. New stations get a marker, deselected ones are hidden and
//! reselected ones are shown again; a marker is never destroyed. Stations
//! that became visible without data for the active date are queued and
//! fetched in fixed-size batches: all requests of a batch run concurrently
//! and the next batch starts only after every request of the current one
//! has resolved.
//!
//! ## State
//!
//! All bookkeeping (markers, visible set, in-flight set, fetched set, active
//! date) lives behind one lock, so a reconcile pass and a fetch completion
//! never interleave halfway. The lock is never held across a network call.
//!
//! ## Late results
//!
//! In-flight fetches are not cancelled when their station scrolls out of
//! view. The result still lands in the series cache and on the marker, but
//! an `Updated` event is only emitted when the station is still selected.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use declutter::SelectionSet;
use futures::future::join_all;
use map_common::SeriesPoint;
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use storage::{SeriesKey, TtlCache};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::display::{date_range, display_value, Clock, SystemClock};
use crate::error::{MarkerError, ProviderError, Result};
use crate::marker::{Marker, MarkerId, MarkerSnapshot};
use crate::provider::DataProvider;

/// Station series cached by `(code, start, end)`.
pub type SeriesCache = TtlCache<SeriesKey, Arc<Vec<SeriesPoint>>>;

/// Default number of concurrent series requests per batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Requests issued together before waiting (default: 20)
    pub batch_size: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MarkerError::InvalidConfig(
                "marker batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Change notifications for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    /// First selection of a station; the marker is drawn neutral.
    Created(MarkerSnapshot),
    /// A hidden marker was selected again, with whatever value it holds.
    Shown(MarkerSnapshot),
    /// The station left the selection. The marker and its value are kept.
    Hidden { code: String },
    /// Value, colour or staleness changed on a visible marker.
    Updated(MarkerSnapshot),
}

impl MarkerEvent {
    pub fn code(&self) -> &str {
        match self {
            Self::Created(m) | Self::Shown(m) | Self::Updated(m) => &m.code,
            Self::Hidden { code } => code,
        }
    }
}

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub created: usize,
    pub shown: usize,
    pub hidden: usize,
    /// Station codes that need data for the active date, in selection order
    pub queued: Vec<String>,
}

/// Outcome of draining a fetch queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub batches: usize,
    /// Results applied to markers
    pub applied: usize,
    /// Requests answered from the series cache
    pub cache_hits: usize,
    pub failed: usize,
    /// Queued codes dropped at batch start (hidden, fetched or in flight)
    pub skipped: usize,
    /// Results that arrived after the active date changed
    pub discarded: usize,
    /// Stations fetched again because their result was for a superseded date
    pub requeued: usize,
}

struct Registry {
    markers: HashMap<String, Marker>,
    visible: HashSet<String>,
    /// Visible codes in selection order
    shown_order: Vec<String>,
    pending: HashSet<String>,
    fetched: HashSet<String>,
    active_date: NaiveDate,
    next_id: u64,
}

impl Registry {
    fn next_id(&mut self) -> MarkerId {
        self.next_id += 1;
        MarkerId(self.next_id)
    }

    fn settle(&mut self, code: &str) {
        if let Some(marker) = self.markers.get_mut(code) {
            marker.settle();
        }
    }
}

pub struct MarkerManager {
    provider: Arc<dyn DataProvider>,
    cache: Arc<SeriesCache>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
    registry: Mutex<Registry>,
    events: mpsc::UnboundedSender<MarkerEvent>,
}

impl MarkerManager {
    /// Create a manager on the system clock. The active date starts at today.
    pub fn new(
        provider: Arc<dyn DataProvider>,
        cache: Arc<SeriesCache>,
        config: LifecycleConfig,
    ) -> (Self, mpsc::UnboundedReceiver<MarkerEvent>) {
        Self::with_clock(provider, cache, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        provider: Arc<dyn DataProvider>,
        cache: Arc<SeriesCache>,
        mut config: LifecycleConfig,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::UnboundedReceiver<MarkerEvent>) {
        config.batch_size = config.batch_size.max(1);
        let (events, rx) = mpsc::unbounded_channel();
        let registry = Registry {
            markers: HashMap::new(),
            visible: HashSet::new(),
            shown_order: Vec::new(),
            pending: HashSet::new(),
            fetched: HashSet::new(),
            active_date: clock.today(),
            next_id: 0,
        };

        let manager = Self {
            provider,
            cache,
            clock,
            config,
            registry: Mutex::new(registry),
            events,
        };
        (manager, rx)
    }

    /// Reconcile and then fetch whatever the pass queued.
    pub async fn update(&self, selection: &SelectionSet<'_>) -> (ReconcileReport, FetchReport) {
        let reconcile = self.reconcile(selection).await;
        let fetch = self.process_queue(&reconcile.queued).await;
        (reconcile, fetch)
    }

    /// Bring markers in line with `selection` and return the codes to fetch.
    pub async fn reconcile(&self, selection: &SelectionSet<'_>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut guard = self.registry.lock().await;
        let registry = &mut *guard;

        let selected = selection.codes();

        for station in selection.iter() {
            match registry.markers.get_mut(&station.code) {
                Some(marker) => {
                    if !marker.is_visible() {
                        marker.set_visible(true);
                        report.shown += 1;
                        self.emit(MarkerEvent::Shown(marker.snapshot()));
                    }
                }
                None => {
                    let id = registry.next_id();
                    let marker = Marker::new(id, station.clone());
                    report.created += 1;
                    self.emit(MarkerEvent::Created(marker.snapshot()));
                    registry.markers.insert(station.code.clone(), marker);
                }
            }

            let needs_data = !registry.fetched.contains(&station.code)
                && !registry.pending.contains(&station.code);
            if needs_data {
                if let Some(marker) = registry.markers.get_mut(&station.code) {
                    marker.mark_pending();
                }
                report.queued.push(station.code.clone());
            }
        }

        let mut left: Vec<String> = registry.visible.difference(&selected).cloned().collect();
        left.sort_unstable();
        for code in left {
            if let Some(marker) = registry.markers.get_mut(&code) {
                marker.set_visible(false);
                report.hidden += 1;
                self.emit(MarkerEvent::Hidden { code });
            }
        }
        registry.visible = selected;
        registry.shown_order = selection.iter().map(|s| s.code.clone()).collect();

        gauge!("dashboard_selection_size").set(selection.len() as f64);
        info!(
            selected = selection.len(),
            created = report.created,
            shown = report.shown,
            hidden = report.hidden,
            queued = report.queued.len(),
            total_markers = registry.markers.len(),
            "Reconciled markers"
        );
        report
    }

    /// Fetch series for `queue` in batches of `batch_size`.
    ///
    /// At the start of each batch, codes that are no longer visible, already
    /// fetched for the active date, or in flight elsewhere are dropped. A
    /// result that lands after the active date moved on is discarded, and the
    /// station is fetched again for the new date if it is still visible.
    pub async fn process_queue(&self, queue: &[String]) -> FetchReport {
        let mut report = FetchReport::default();
        let mut round: Vec<String> = queue.to_vec();

        while !round.is_empty() {
            let mut follow_up = Vec::new();

            for chunk in round.chunks(self.config.batch_size) {
                let (batch, date) = self.start_batch(chunk, &mut report).await;
                if batch.is_empty() {
                    continue;
                }

                report.batches += 1;
                debug!(
                    batch = report.batches,
                    size = batch.len(),
                    date = %date,
                    "Fetching series batch"
                );

                let fetches = batch.iter().map(|code| self.fetch_series(code, date));
                let results = join_all(fetches).await;

                let mut registry = self.registry.lock().await;
                for (code, (result, cache_hit)) in batch.iter().zip(results) {
                    registry.pending.remove(code);
                    if cache_hit {
                        report.cache_hits += 1;
                    }
                    let superseded = date != registry.active_date;
                    self.apply_result(&mut registry, code, date, result, &mut report);

                    let still_needed = registry.visible.contains(code)
                        && !registry.fetched.contains(code)
                        && !registry.pending.contains(code);
                    if superseded && still_needed {
                        if let Some(marker) = registry.markers.get_mut(code) {
                            marker.mark_pending();
                        }
                        follow_up.push(code.clone());
                    }
                }
            }

            if !follow_up.is_empty() {
                debug!(count = follow_up.len(), "Re-queueing stations for the new active date");
                report.requeued += follow_up.len();
            }
            round = follow_up;
        }

        if report.batches > 0 {
            info!(
                batches = report.batches,
                applied = report.applied,
                cache_hits = report.cache_hits,
                failed = report.failed,
                skipped = report.skipped,
                requeued = report.requeued,
                "Series fetch complete"
            );
        }
        report
    }

    /// Claim the eligible codes of `chunk` and capture the date to fetch for.
    async fn start_batch(
        &self,
        chunk: &[String],
        report: &mut FetchReport,
    ) -> (Vec<String>, NaiveDate) {
        let mut guard = self.registry.lock().await;
        let registry = &mut *guard;
        let mut batch = Vec::with_capacity(chunk.len());

        for code in chunk {
            let eligible = registry.visible.contains(code)
                && !registry.fetched.contains(code)
                && !registry.pending.contains(code);
            if eligible {
                registry.pending.insert(code.clone());
                if let Some(marker) = registry.markers.get_mut(code) {
                    marker.mark_pending();
                }
                batch.push(code.clone());
            } else {
                if !registry.pending.contains(code) {
                    registry.settle(code);
                }
                report.skipped += 1;
            }
        }
        (batch, registry.active_date)
    }

    /// Switch the date markers display.
    ///
    /// Every marker keeps its value but turns stale (neutral colour) until
    /// data for the new date arrives; the next reconcile re-queues visible
    /// stations. Dates after today are rejected.
    pub async fn set_active_date(&self, date: NaiveDate) -> Result<()> {
        let today = self.clock.today();
        if date > today {
            return Err(MarkerError::FutureDate { date, today });
        }

        let mut registry = self.registry.lock().await;
        registry.active_date = date;
        registry.fetched.clear();

        for marker in registry.markers.values_mut() {
            marker.mark_stale();
            if marker.is_visible() {
                self.emit(MarkerEvent::Updated(marker.snapshot()));
            }
        }

        info!(date = %date, markers = registry.markers.len(), "Active date changed");
        Ok(())
    }

    pub async fn active_date(&self) -> NaiveDate {
        self.registry.lock().await.active_date
    }

    pub async fn marker(&self, code: &str) -> Option<MarkerSnapshot> {
        self.registry
            .lock()
            .await
            .markers
            .get(code)
            .map(Marker::snapshot)
    }

    /// Snapshots of every marker currently shown, in selection order.
    pub async fn visible_markers(&self) -> Vec<MarkerSnapshot> {
        let registry = self.registry.lock().await;
        registry
            .shown_order
            .iter()
            .filter_map(|code| registry.markers.get(code))
            .map(Marker::snapshot)
            .collect()
    }

    /// Markers created so far, hidden ones included. Bounded by the catalog.
    pub async fn marker_count(&self) -> usize {
        self.registry.lock().await.markers.len()
    }

    pub async fn pending_count(&self) -> usize {
        self.registry.lock().await.pending.len()
    }

    pub fn cache(&self) -> &Arc<SeriesCache> {
        &self.cache
    }

    /// Fetch one station's series, going through the cache.
    ///
    /// Returns the result and whether it was a cache hit.
    async fn fetch_series(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> (std::result::Result<Arc<Vec<SeriesPoint>>, ProviderError>, bool) {
        let (start, end) = date_range(date, self.clock.today());
        let key = SeriesKey::new(code, start, end);

        if let Some(points) = self.cache.get(&key).await {
            counter!("dashboard_cache_hits_total").increment(1);
            return (Ok(points), true);
        }

        match self.provider.fetch_station_series(code, start, end).await {
            Ok(points) => {
                let points = Arc::new(points);
                self.cache.insert(key, points.clone()).await;
                (Ok(points), false)
            }
            Err(e) => (Err(e), false),
        }
    }

    fn apply_result(
        &self,
        registry: &mut Registry,
        code: &str,
        date: NaiveDate,
        result: std::result::Result<Arc<Vec<SeriesPoint>>, ProviderError>,
        report: &mut FetchReport,
    ) {
        let points = match result {
            Ok(points) => points,
            Err(e) => {
                counter!("dashboard_fetch_total", "outcome" => "error").increment(1);
                warn!(station = %code, error = %e, kind = e.kind(), "Series fetch failed");
                registry.settle(code);
                report.failed += 1;
                return;
            }
        };

        if date != registry.active_date {
            debug!(station = %code, date = %date, "Discarding series for previous date");
            registry.settle(code);
            report.discarded += 1;
            return;
        }

        if points.is_empty() {
            counter!("dashboard_fetch_total", "outcome" => "empty").increment(1);
            debug!(station = %code, "Empty series");
            registry.settle(code);
            return;
        }

        let now = self.clock.now();
        let daily = date != self.clock.today();
        let value = display_value(&points, date, now);

        let visible = registry.visible.contains(code);
        if let Some(marker) = registry.markers.get_mut(code) {
            marker.apply_value(value, daily);
            if visible {
                self.emit(MarkerEvent::Updated(marker.snapshot()));
            }
        }
        registry.fetched.insert(code.to_string());
        counter!("dashboard_fetch_total", "outcome" => "ok").increment(1);
        report.applied += 1;
    }

    fn emit(&self, event: MarkerEvent) {
        // No receiver just means nobody is rendering
        let _ = self.events.send(event);
    }
}
