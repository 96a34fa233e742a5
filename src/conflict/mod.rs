//! Wave conflict detection for shoal.
//!
//! Before the scheduler dispatches a wave (a batch of DAG nodes intended to
//! run concurrently), it asks this module whether the members can safely run
//! in parallel. The analysis is static and approximate by design: it works
//! from predicted file lists and prompt classification, because actual
//! writes are unknown ahead of execution.
//!
//! Two passes, sharing path normalization with the lock manager:
//! - **Singleton pass**: nodes resolving to the same singleton kind cannot
//!   share one exclusive lease, and any singleton node excludes the whole
//!   wave: a build or install touches whole-repository state that
//!   concurrent work could perturb.
//! - **File pass**: any normalized path predicted by two or more nodes is a
//!   conflict naming all claimants.
//!
//! A "cannot parallelize" result is a first-class successful outcome, not an
//! error; the scheduler serializes the wave and surfaces the remediation
//! text.

mod detector;
mod types;


pub use detector::{analyze_wave, find_all_conflicts};
pub use types::{ConflictKind, NodeConflict, WaveConflictAnalysis};
