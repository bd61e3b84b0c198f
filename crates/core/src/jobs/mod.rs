//! Job submission: the downstream queue boundary and the guarded submit flow.

mod queue;
mod submit;

pub use queue::{InMemoryJobQueue, JobQueue, JobSubmission, QueueError};
pub use submit::{submission_for, submit_job, SubmitError, SubmitOutcome};
