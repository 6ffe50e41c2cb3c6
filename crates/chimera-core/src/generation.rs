//! Single-flight simulated generation pipeline.
//!
//! The engine only sequences progress; it is content-agnostic. States:
//! Idle -> Running -> Completed, or Running -> Cancelled. Starting a new
//! run cancels any prior run first, so at most one run is active and stale
//! progress events can never fire after a newer run has begun.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use chimera_types::generation::{GenerationEvent, GenerationStep};

/// Buffered events per run; generously above any sane step table size.
const EVENT_CHANNEL_CAPACITY: usize = 32;

struct ActiveRun {
    run_id: Uuid,
    cancel: CancellationToken,
    finished: Arc<AtomicBool>,
}

/// Drives one simulated generation at a time.
#[derive(Default)]
pub struct GenerationFlowEngine {
    active: Option<ActiveRun>,
}

impl GenerationFlowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a run over `steps`, cancelling any run already in flight.
    ///
    /// Returns the run id and the event stream: `Started`, one `Progress`
    /// per step (percent = `(i+1)/n * 100`, floored, capped at 100,
    /// exactly 100 only on the final step), then `Completed` exactly once.
    /// Dropping the receiver ends the run quietly.
    pub fn start(
        &mut self,
        steps: Vec<GenerationStep>,
    ) -> (Uuid, mpsc::Receiver<GenerationEvent>) {
        self.cancel();

        let run_id = Uuid::now_v7();
        let cancel = CancellationToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let token = cancel.clone();
        let done = Arc::clone(&finished);
        tokio::spawn(async move {
            run_steps(steps, tx, token).await;
            done.store(true, Ordering::Release);
        });

        debug!(%run_id, "generation run started");
        self.active = Some(ActiveRun {
            run_id,
            cancel,
            finished,
        });
        (run_id, rx)
    }

    /// Stop the in-flight run, if any. Safe to call when idle.
    ///
    /// Cancellation never produces a `Completed` event.
    pub fn cancel(&mut self) {
        if let Some(run) = self.active.take() {
            debug!(run_id = %run.run_id, "generation run cancelled");
            run.cancel.cancel();
        }
    }

    /// Whether a run is currently stepping.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| !run.finished.load(Ordering::Acquire))
    }

    /// Id of the active (possibly just-completed) run.
    pub fn active_run_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|run| run.run_id)
    }
}

async fn run_steps(
    steps: Vec<GenerationStep>,
    tx: mpsc::Sender<GenerationEvent>,
    cancel: CancellationToken,
) {
    let total = steps.len();
    if tx.send(GenerationEvent::Started).await.is_err() {
        return;
    }

    for (i, step) in steps.into_iter().enumerate() {
        if cancel.is_cancelled() {
            return;
        }
        let percent = (((i + 1) * 100) / total).min(100) as u8;
        let event = GenerationEvent::Progress {
            percent,
            message: step.message,
        };
        if tx.send(event).await.is_err() {
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(Duration::from_millis(step.duration_ms)) => {}
        }
    }

    if cancel.is_cancelled() {
        return;
    }
    let _ = tx.send(GenerationEvent::Completed).await;
}

#[cfg(test)]
mod tests {
    use chimera_types::generation::default_steps;

    use super::*;

    fn quick_steps(n: usize) -> Vec<GenerationStep> {
        (0..n)
            .map(|i| GenerationStep::new(100, format!("step {i}")))
            .collect()
    }

    async fn drain(mut rx: mpsc::Receiver<GenerationEvent>) -> Vec<GenerationEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_emits_started_progress_completed() {
        let mut engine = GenerationFlowEngine::new();
        let (_, rx) = engine.start(default_steps());
        let events = drain(rx).await;

        assert_eq!(events.first(), Some(&GenerationEvent::Started));
        assert_eq!(events.last(), Some(&GenerationEvent::Completed));
        let progress: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![20, 40, 60, 80, 100]);
        // Completed exactly once.
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GenerationEvent::Completed))
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_monotone_and_caps_at_100() {
        let mut engine = GenerationFlowEngine::new();
        let (_, rx) = engine.start(quick_steps(7));
        let progress: Vec<u8> = drain(rx)
            .await
            .into_iter()
            .filter_map(|e| match e {
                GenerationEvent::Progress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect();

        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 100);
        // 100 appears only at the final step.
        assert_eq!(progress.iter().filter(|&&p| p == 100).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_remaining_events() {
        let mut engine = GenerationFlowEngine::new();
        let (_, mut rx) = engine.start(quick_steps(3));

        assert_eq!(rx.recv().await, Some(GenerationEvent::Started));
        assert!(matches!(
            rx.recv().await,
            Some(GenerationEvent::Progress { percent: 33, .. })
        ));

        engine.cancel();
        // The task exits inside its sleep; the channel closes with no
        // further events and no Completed.
        assert_eq!(rx.recv().await, None);
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_when_idle_is_noop() {
        let mut engine = GenerationFlowEngine::new();
        engine.cancel();
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_second_start_cancels_first() {
        let mut engine = GenerationFlowEngine::new();
        let (first_id, mut first_rx) = engine.start(quick_steps(5));

        assert_eq!(first_rx.recv().await, Some(GenerationEvent::Started));
        assert!(matches!(
            first_rx.recv().await,
            Some(GenerationEvent::Progress { .. })
        ));

        let (second_id, second_rx) = engine.start(quick_steps(2));
        assert_ne!(first_id, second_id);
        assert_eq!(engine.active_run_id(), Some(second_id));

        // The first run's channel closes without ever completing.
        assert_eq!(first_rx.recv().await, None);

        // Only the second run completes.
        let events = drain(second_rx).await;
        assert_eq!(events.last(), Some(&GenerationEvent::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_step_table_completes_immediately() {
        let mut engine = GenerationFlowEngine::new();
        let (_, rx) = engine.start(Vec::new());
        let events = drain(rx).await;
        assert_eq!(
            events,
            vec![GenerationEvent::Started, GenerationEvent::Completed]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_running_transitions() {
        let mut engine = GenerationFlowEngine::new();
        assert!(!engine.is_running());

        let (_, rx) = engine.start(quick_steps(2));
        assert!(engine.is_running());

        drain(rx).await;
        // Give the spawned task a tick to flip the finished flag.
        tokio::task::yield_now().await;
        assert!(!engine.is_running());
    }
}
