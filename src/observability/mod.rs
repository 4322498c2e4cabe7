//! Crash-report context for the analysis pipeline.
//!
//! - **Panic hook**: prints a structured crash report naming the phase and
//!   device being processed when the panic happened
//! - **Context tracking**: thread-local phase and device, restored by RAII guards
//! - **Progress**: atomic counters of devices analyzed
//!
//! ```ignore
//! use maude_risk::observability::{set_phase, set_current_device, AnalysisPhase};
//!
//! let _phase = set_phase(AnalysisPhase::Scoring);
//! for device in devices {
//!     let _device = set_current_device(device.as_str());
//!     score(device);
//! }
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, get_progress, increment_processed, set_current_device,
    set_phase, set_progress, AnalysisContext, AnalysisPhase, ContextGuard, ProgressCounters,
};
pub use panic_hook::install_panic_hook;
