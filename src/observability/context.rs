//! Thread-local context tracking for crash reports.
//!
//! Context is per thread, so each rayon worker reports the device it was
//! working on. Progress is global and atomic.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Processed/total device counters.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounters {
    pub const fn new() -> Self {
        Self {
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, processed: usize, total: usize) {
        self.processed.store(processed, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> (usize, usize) {
        (
            self.processed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

static PROGRESS: ProgressCounters = ProgressCounters::new();

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// What the engine was doing on this thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    /// Canonical name of the device being processed
    pub current_device: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_device: None,
        }
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    InputLoading,
    Normalization,
    Aggregation,
    EscalationAnalysis,
    Scoring,
    TimelineCorrelation,
    OutputGeneration,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InputLoading => "input_loading",
            Self::Normalization => "normalization",
            Self::Aggregation => "aggregation",
            Self::EscalationAnalysis => "escalation_analysis",
            Self::Scoring => "scoring",
            Self::TimelineCorrelation => "timeline_correlation",
            Self::OutputGeneration => "output_generation",
        };
        f.write_str(name)
    }
}

/// Restores the previous context when dropped.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Set the current phase until the guard drops.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update(|ctx| ctx.phase = Some(phase))
}

/// Set the device being processed until the guard drops.
#[must_use]
pub fn set_current_device(device: impl Into<String>) -> ContextGuard {
    let device = device.into();
    update(|ctx| ctx.current_device = Some(device))
}

pub fn set_progress(processed: usize, total: usize) {
    PROGRESS.set(processed, total);
}

/// Count one more device as finished. Safe from parallel iterators.
pub fn increment_processed() {
    PROGRESS.increment();
}

#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// (processed, total) devices.
#[must_use]
pub fn get_progress() -> (usize, usize) {
    PROGRESS.get()
}

#[cfg(test)]
fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| *ctx.borrow_mut() = AnalysisContext::new());
}
