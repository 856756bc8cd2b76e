//! EthClip - Clipboard monitoring module
//!
//! Polls the system clipboard and rewrites detected addresses in place

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use super::io::{ClipboardError, ClipboardIo};
use crate::address::{self, NormalizationMode};
use crate::context::AppContext;

/// Opens a clipboard handle on the poll thread
pub type ClipboardFactory = Arc<dyn Fn() -> Box<dyn ClipboardIo> + Send + Sync>;

/// Result of a single poll iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Same text under the same mode as last time
    Unchanged,
    /// New text that is not an address
    NotAnAddress,
    /// Address already in the active mode's form
    AlreadyCanonical,
    /// Address rewritten on the clipboard
    Rewritten {
        from: String,
        to: String,
        mode: NormalizationMode,
    },
}

/// Run one poll iteration against `clipboard`
///
/// A failed write drops the snapshot so the value is retried on the next tick.
pub fn poll_once(
    context: &AppContext,
    clipboard: &mut dyn ClipboardIo,
) -> Result<PollOutcome, ClipboardError> {
    let current = clipboard.read_text()?;

    let Some(mode) = context.observe(&current) else {
        return Ok(PollOutcome::Unchanged);
    };

    let Some(normalized) = address::normalized(&current, mode) else {
        return Ok(PollOutcome::NotAnAddress);
    };

    if normalized == current {
        return Ok(PollOutcome::AlreadyCanonical);
    }

    if let Err(e) = clipboard.write_text(&normalized) {
        context.invalidate_snapshot();
        return Err(e);
    }
    context.record_write(normalized.clone(), mode);

    Ok(PollOutcome::Rewritten {
        from: current,
        to: normalized,
        mode,
    })
}

/// Clipboard monitor
///
/// Owns the poll thread. Each start spawns a fresh loop instance tagged with a
/// generation number; a loop exits once monitoring is off or a newer instance
/// has replaced it.
pub struct ClipboardMonitor {
    context: Arc<AppContext>,
    clipboard: ClipboardFactory,
    /// Sleep between iterations
    poll_interval: Duration,
    /// Sleep after a clipboard error
    error_backoff: Duration,
    generation: Arc<AtomicU64>,
    /// Poll threads not yet joined, including superseded generations
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ClipboardMonitor {
    /// Create a new monitor
    pub fn new(
        context: Arc<AppContext>,
        clipboard: ClipboardFactory,
        poll_interval_ms: u64,
        error_backoff_ms: u64,
    ) -> Self {
        Self {
            context,
            clipboard,
            poll_interval: Duration::from_millis(poll_interval_ms),
            error_backoff: Duration::from_millis(error_backoff_ms),
            generation: Arc::new(AtomicU64::new(0)),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Start monitoring; returns false if already running
    pub fn start(&self) -> bool {
        if self.context.set_monitoring(true) {
            log::warn!("[Monitor] Clipboard monitor is already running");
            return false;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current_generation = Arc::clone(&self.generation);
        let context = Arc::clone(&self.context);
        let factory = Arc::clone(&self.clipboard);
        let interval = self.poll_interval;
        let backoff = self.error_backoff;

        let handle = thread::spawn(move || {
            log::info!(
                "[Monitor] Clipboard monitor started with {}ms interval",
                interval.as_millis()
            );
            let mut clipboard = factory();

            while context.is_monitoring()
                && current_generation.load(Ordering::SeqCst) == generation
            {
                let pause = match poll_once(&context, clipboard.as_mut()) {
                    Ok(PollOutcome::Rewritten { from, to, mode }) => {
                        log::info!("[Monitor] Address converted to {}: {} → {}", mode, from, to);
                        interval
                    }
                    Ok(outcome) => {
                        if outcome != PollOutcome::Unchanged {
                            log::debug!("[Monitor] New clipboard content: {:?}", outcome);
                        }
                        interval
                    }
                    Err(e) => {
                        log::error!("[Monitor] Monitoring error: {}", e);
                        backoff
                    }
                };
                thread::sleep(pause);
            }

            log::info!("[Monitor] Clipboard monitor stopped");
        });

        let mut workers = self.workers.lock();
        workers.retain(|worker| !worker.is_finished());
        workers.push(handle);
        true
    }

    /// Stop monitoring; the loop exits after its current iteration
    pub fn stop(&self) -> bool {
        self.context.set_monitoring(false)
    }

    /// Flip between running and paused, returning whether monitoring is now on
    pub fn toggle(&self) -> bool {
        if self.is_running() {
            self.stop();
            false
        } else {
            self.start();
            true
        }
    }

    pub fn is_running(&self) -> bool {
        self.context.is_monitoring()
    }

    /// Stop monitoring and wait for every poll thread to finish
    pub fn shutdown(&self) {
        self.stop();
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                log::error!("[Monitor] Poll thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    const UPPER: &str = "0xFB6916095CA1DF60BB79CE92CE3EA74C37C5D359";
    const LOWER: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
    const CHECKSUMMED: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    #[derive(Default)]
    struct FakeState {
        text: String,
        writes: Vec<String>,
        fail_reads: usize,
        fail_writes: usize,
    }

    /// In-memory clipboard shared between the test and the poller
    #[derive(Clone, Default)]
    struct FakeClipboard(Arc<Mutex<FakeState>>);

    impl FakeClipboard {
        fn with_text(text: &str) -> Self {
            let fake = Self::default();
            fake.set(text);
            fake
        }

        fn set(&self, text: &str) {
            self.0.lock().text = text.to_string();
        }

        fn text(&self) -> String {
            self.0.lock().text.clone()
        }

        fn writes(&self) -> Vec<String> {
            self.0.lock().writes.clone()
        }
    }

    impl ClipboardIo for FakeClipboard {
        fn read_text(&mut self) -> Result<String, ClipboardError> {
            let mut state = self.0.lock();
            if state.fail_reads > 0 {
                state.fail_reads -= 1;
                return Err(ClipboardError::Read("locked".to_string()));
            }
            Ok(state.text.clone())
        }

        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            let mut state = self.0.lock();
            if state.fail_writes > 0 {
                state.fail_writes -= 1;
                return Err(ClipboardError::Write("locked".to_string()));
            }
            state.text = text.to_string();
            state.writes.push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_non_address_is_never_written() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::with_text("just some text");
        assert_eq!(poll_once(&ctx, &mut clip).unwrap(), PollOutcome::NotAnAddress);
        assert_eq!(poll_once(&ctx, &mut clip).unwrap(), PollOutcome::Unchanged);
        assert!(clip.writes().is_empty());
    }

    #[test]
    fn test_address_is_rewritten_exactly_once() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::with_text(UPPER);

        let outcome = poll_once(&ctx, &mut clip).unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Rewritten {
                from: UPPER.to_string(),
                to: LOWER.to_string(),
                mode: NormalizationMode::Lowercase,
            }
        );
        assert_eq!(ctx.snapshot().map(|s| s.text), Some(LOWER.to_string()));

        assert_eq!(poll_once(&ctx, &mut clip).unwrap(), PollOutcome::Unchanged);
        assert_eq!(poll_once(&ctx, &mut clip).unwrap(), PollOutcome::Unchanged);
        assert_eq!(clip.writes(), vec![LOWER.to_string()]);
    }

    #[test]
    fn test_canonical_address_is_left_alone() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::with_text(LOWER);
        assert_eq!(poll_once(&ctx, &mut clip).unwrap(), PollOutcome::AlreadyCanonical);
        assert!(clip.writes().is_empty());
    }

    #[test]
    fn test_sequence_of_clipboard_states() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::default();

        for value in ["hello", UPPER, "world", CHECKSUMMED, LOWER] {
            clip.set(value);
            poll_once(&ctx, &mut clip).unwrap();
            poll_once(&ctx, &mut clip).unwrap();
        }

        // UPPER and CHECKSUMMED each rewritten once; LOWER matches the snapshot
        assert_eq!(clip.writes(), vec![LOWER.to_string(), LOWER.to_string()]);
    }

    #[test]
    fn test_mode_toggle_alone_triggers_renormalization() {
        let ctx = AppContext::new(NormalizationMode::Lowercase);
        let mut clip = FakeClipboard::with_text(UPPER);

        poll_once(&ctx, &mut clip).unwrap();
        assert_eq!(clip.text(), LOWER);

        ctx.toggle_mode();
        let outcome = poll_once(&ctx, &mut clip).unwrap();
        assert!(matches!(outcome, PollOutcome::Rewritten { .. }));
        assert_eq!(clip.text(), CHECKSUMMED);

        ctx.toggle_mode();
        poll_once(&ctx, &mut clip).unwrap();
        assert_eq!(clip.text(), LOWER);
        assert_eq!(clip.writes().len(), 3);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed_on_rewrite() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::with_text(&format!("  {}\n", LOWER));
        poll_once(&ctx, &mut clip).unwrap();
        assert_eq!(clip.text(), LOWER);
    }

    #[test]
    fn test_read_error_is_reported_and_recovered() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::with_text(UPPER);
        clip.0.lock().fail_reads = 1;

        assert!(matches!(poll_once(&ctx, &mut clip), Err(ClipboardError::Read(_))));
        assert!(poll_once(&ctx, &mut clip).is_ok());
        assert_eq!(clip.text(), LOWER);
    }

    #[test]
    fn test_write_error_is_retried_next_tick() {
        let ctx = AppContext::default();
        let mut clip = FakeClipboard::with_text(UPPER);
        clip.0.lock().fail_writes = 1;

        assert!(matches!(poll_once(&ctx, &mut clip), Err(ClipboardError::Write(_))));
        assert_eq!(clip.text(), UPPER);

        assert!(matches!(
            poll_once(&ctx, &mut clip).unwrap(),
            PollOutcome::Rewritten { .. }
        ));
        assert_eq!(clip.writes(), vec![LOWER.to_string()]);
    }

    fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_monitor_thread_rewrites_and_stops() {
        let ctx = Arc::new(AppContext::default());
        let clip = FakeClipboard::with_text(UPPER);
        let factory_clip = clip.clone();
        let factory: ClipboardFactory = Arc::new(move || Box::new(factory_clip.clone()) as Box<dyn ClipboardIo>);
        let monitor = ClipboardMonitor::new(Arc::clone(&ctx), factory, 10, 20);

        assert!(monitor.start());
        assert!(!monitor.start());
        assert!(wait_for(Duration::from_secs(2), || clip.text() == LOWER));

        ctx.toggle_mode();
        assert!(wait_for(Duration::from_secs(2), || clip.text() == CHECKSUMMED));

        monitor.shutdown();
        assert!(!monitor.is_running());

        clip.set(UPPER);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(clip.text(), UPPER);
        assert_eq!(clip.writes().len(), 2);
    }

    #[test]
    fn test_monitor_toggle_restarts_loop() {
        let ctx = Arc::new(AppContext::default());
        let clip = FakeClipboard::with_text("idle");
        let factory_clip = clip.clone();
        let factory: ClipboardFactory = Arc::new(move || Box::new(factory_clip.clone()) as Box<dyn ClipboardIo>);
        let monitor = ClipboardMonitor::new(Arc::clone(&ctx), factory, 10, 20);

        assert!(monitor.toggle());
        assert!(!monitor.toggle());
        assert!(monitor.toggle());

        clip.set(UPPER);
        assert!(wait_for(Duration::from_secs(2), || clip.text() == LOWER));
        monitor.shutdown();
        assert_eq!(clip.writes(), vec![LOWER.to_string()]);
    }

    #[test]
    fn test_monitor_thread_survives_clipboard_errors() {
        let ctx = Arc::new(AppContext::default());
        let clip = FakeClipboard::with_text(UPPER);
        {
            let mut state = clip.0.lock();
            state.fail_reads = 3;
            state.fail_writes = 1;
        }
        let factory_clip = clip.clone();
        let factory: ClipboardFactory = Arc::new(move || Box::new(factory_clip.clone()) as Box<dyn ClipboardIo>);
        let monitor = ClipboardMonitor::new(Arc::clone(&ctx), factory, 10, 20);

        assert!(monitor.start());
        assert!(wait_for(Duration::from_secs(2), || clip.text() == LOWER));
        assert!(monitor.is_running());
        {
            let state = clip.0.lock();
            assert_eq!(state.fail_reads, 0);
            assert_eq!(state.fail_writes, 0);
        }

        thread::sleep(Duration::from_millis(50));
        assert_eq!(clip.writes(), vec![LOWER.to_string()]);
        monitor.shutdown();
    }

    /// Counts clipboard handles still held by poll threads
    struct CountedClipboard {
        inner: FakeClipboard,
        live: Arc<AtomicUsize>,
    }

    impl ClipboardIo for CountedClipboard {
        fn read_text(&mut self) -> Result<String, ClipboardError> {
            self.inner.read_text()
        }

        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.inner.write_text(text)
        }
    }

    impl Drop for CountedClipboard {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_shutdown_joins_superseded_poll_threads() {
        let ctx = Arc::new(AppContext::default());
        let clip = FakeClipboard::with_text("idle");
        let live = Arc::new(AtomicUsize::new(0));
        let opened = Arc::new(AtomicUsize::new(0));
        let factory: ClipboardFactory = {
            let live = Arc::clone(&live);
            let opened = Arc::clone(&opened);
            Arc::new(move || {
                live.fetch_add(1, Ordering::SeqCst);
                opened.fetch_add(1, Ordering::SeqCst);
                Box::new(CountedClipboard {
                    inner: clip.clone(),
                    live: Arc::clone(&live),
                }) as Box<dyn ClipboardIo>
            })
        };
        // Long interval keeps the first loop asleep across the restart
        let monitor = ClipboardMonitor::new(Arc::clone(&ctx), factory, 300, 300);

        assert!(monitor.start());
        assert!(wait_for(Duration::from_secs(2), || opened.load(Ordering::SeqCst) == 1));
        assert!(monitor.stop());
        assert!(monitor.start());
        assert!(wait_for(Duration::from_secs(2), || opened.load(Ordering::SeqCst) == 2));

        monitor.shutdown();
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}
