//! Worker units.
//!
//! Each worker is a single sequential message processor draining its own
//! channel; no two messages are handled concurrently by the same unit, and
//! cross-worker communication is channel sends only. Workers suspend solely
//! at the generation service call.

mod audit;
mod generator;
mod prompt;
mod substitution;

pub use audit::{
    AuditRecord, AuditSink, AuditWorker, FileAuditSink, TracingAuditSink,
    DEFAULT_AUDIT_CHANNEL_CAPACITY,
};
pub use generator::{
    GenerateJob, GenerationOutcome, GenerationWorker, DEFAULT_JOB_CHANNEL_CAPACITY,
};
pub use prompt::{build_recipe_prompt, build_substitution_prompt};
pub use substitution::{
    SubstitutionHandle, SubstitutionJob, SubstitutionReply, SubstitutionWorker, WorkerClosed,
};
