//! Repeating render timer
//!
//! A ticker task wakes up on a fixed period, extrapolates the debt from the
//! current engine snapshot and hands the result to a renderer. Baseline
//! refreshes go through [`EngineFeed`], which publishes a whole new engine so
//! a tick never observes a baseline without its matching rates.

use crate::projection::{LoadError, Projection, ProjectionEngine, ProjectionError};
use chrono::{DateTime, Utc};
use log::debug;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Source of the current time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Presentation adapter receiving each projection
pub trait Render: Send + 'static {
    fn render(&mut self, projection: &Projection);
}

impl<F> Render for F
where
    F: FnMut(&Projection) + Send + 'static,
{
    fn render(&mut self, projection: &Projection) {
        self(projection)
    }
}

/// Publisher of engine snapshots
#[derive(Debug)]
pub struct EngineFeed {
    tx: watch::Sender<ProjectionEngine>,
}

impl EngineFeed {
    pub fn new(engine: ProjectionEngine) -> Self {
        let (tx, _rx) = watch::channel(engine);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProjectionEngine> {
        self.tx.subscribe()
    }

    /// Copy of the currently published engine
    pub fn snapshot(&self) -> ProjectionEngine {
        *self.tx.borrow()
    }

    /// Swap the baseline of the published engine
    ///
    /// Validation and publication happen under the channel lock, so
    /// concurrent refreshes never start from a stale snapshot.
    pub fn replace_baseline(
        &self,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<(), ProjectionError> {
        self.publish(|engine| engine.replace_baseline(value, timestamp))
    }

    /// Parse and publish a JSON baseline document
    pub fn apply_document(&self, json: &str) -> Result<(), LoadError> {
        self.publish(|engine| engine.load_document(json))
    }

    // Engine updates leave the engine untouched on error, so a failed
    // update publishes nothing.
    fn publish<E>(
        &self,
        update: impl FnOnce(&mut ProjectionEngine) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut outcome = Ok(());
        self.tx.send_if_modified(|engine| match update(engine) {
            Ok(()) => true,
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }
}

/// Running ticker; dropping the handle leaves the task running
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Cancel the ticker; the task ends at its next scheduling point
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a ticker on the current tokio runtime
///
/// The first tick fires immediately. Ticks missed because the runtime was
/// busy are skipped rather than replayed.
///
/// # Panics
/// Panics if `period` is zero or if called outside a tokio runtime.
pub fn spawn_ticker<C, R>(
    engine: watch::Receiver<ProjectionEngine>,
    period: Duration,
    clock: C,
    mut renderer: R,
) -> TickerHandle
where
    C: Clock,
    R: Render,
{
    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let snapshot = *engine.borrow();
            let projection = snapshot.extrapolate(clock.now());
            debug!("tick: {:.0} EUR", projection.total);
            renderer.render(&projection);
        }
    });
    TickerHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<Projection>>>, impl Render) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |p: &Projection| sink.lock().unwrap().push(*p))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_stopped() {
        let feed = EngineFeed::new(ProjectionEngine::default());
        let at = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let (seen, renderer) = recorder();

        let handle = spawn_ticker(
            feed.subscribe(),
            Duration::from_millis(100),
            FixedClock(at),
            renderer,
        );
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.stop();

        let count = seen.lock().unwrap().len();
        assert!((3..=5).contains(&count), "rendered {count} times");
        assert!(seen.lock().unwrap().iter().all(|p| p.total == 3416.3e9));

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(seen.lock().unwrap().len(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_finishes() {
        let feed = EngineFeed::new(ProjectionEngine::default());
        let (_seen, renderer) = recorder();
        let handle = spawn_ticker(
            feed.subscribe(),
            Duration::from_millis(100),
            SystemClock,
            renderer,
        );
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!handle.is_finished());

        handle.stop();
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_are_skipped() {
        let feed = EngineFeed::new(ProjectionEngine::default());
        let at = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let (seen, renderer) = recorder();

        let handle = spawn_ticker(
            feed.subscribe(),
            Duration::from_millis(100),
            FixedClock(at),
            renderer,
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);

        // Ten periods elapse without the task getting to run
        tokio::time::advance(Duration::from_millis(1000)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.stop();

        let count = seen.lock().unwrap().len();
        assert!(count <= 2, "rendered {count} times");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_sees_replaced_baseline() {
        let feed = EngineFeed::new(ProjectionEngine::default());
        let at = Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap();
        let (seen, renderer) = recorder();

        let handle = spawn_ticker(
            feed.subscribe(),
            Duration::from_millis(100),
            FixedClock(at),
            renderer,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        feed.replace_baseline(3482.2e9, at).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.stop();

        let seen = seen.lock().unwrap();
        assert_ne!(seen.first().unwrap().total, 3482.2e9);
        assert_eq!(seen.last().unwrap().total, 3482.2e9);
    }

    #[test]
    fn test_feed_rejects_bad_document() {
        let feed = EngineFeed::new(ProjectionEngine::default());
        let before = feed.snapshot();

        assert!(feed.apply_document(r#"{"dette": 1.0}"#).is_err());
        assert!(feed.replace_baseline(f64::NAN, Utc::now()).is_err());
        assert_eq!(feed.snapshot(), before);

        feed.apply_document(r#"{"derniereMiseAJour": "2025-09-30", "dette": 3482.2}"#)
            .unwrap();
        assert_eq!(feed.snapshot().baseline().value(), 3482.2e9);
    }

    #[test]
    fn test_concurrent_refreshes_keep_document_rate() {
        let at = Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap();
        let document = r#"{"derniereMiseAJour": "2025-09-30", "dette": 3482.2,
            "tauxAugmentationAnnuel": 4.25}"#;

        for _ in 0..200 {
            let feed = EngineFeed::new(ProjectionEngine::default());
            std::thread::scope(|s| {
                s.spawn(|| feed.apply_document(document).unwrap());
                s.spawn(|| feed.replace_baseline(3500.0e9, at).unwrap());
            });

            let engine = feed.snapshot();
            assert_eq!(engine.baseline().annual_rate(), 4.25);
            assert_eq!(*engine.rates(), crate::projection::rate(engine.baseline()));
        }
    }
}
