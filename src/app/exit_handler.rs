//! Exit code logic for the slidegrab process.
//!
//! Single responsibility: map the batch outcome to the process exit outcome
//! and tell the operator what went wrong.

use slidegrab_core::{BatchError, BatchSummary};

use crate::ProcessExit;

/// Determines the process exit outcome from the batch result.
pub(crate) fn determine_exit_outcome(outcome: &Result<BatchSummary, BatchError>) -> ProcessExit {
    match outcome {
        Ok(_) => ProcessExit::Success,
        Err(_) => ProcessExit::Failure,
    }
}

/// Operator-facing description of a failed batch.
pub(crate) fn failure_message(err: &BatchError) -> String {
    let mut message = format!("Error: {err}");
    match err {
        BatchError::TaskFailure { .. } => {
            message.push_str("\n  Merge skipped. Already downloaded pages were kept.");
        }
        BatchError::Aggregation(_) => {
            message.push_str("\n  Downloaded pages were kept; merge them manually or rerun.");
        }
        _ => {}
    }
    if let Some(code) = err.triggering_exit_code() {
        message.push_str(&format!("\n  Exit code: {code}"));
    }
    message
}
