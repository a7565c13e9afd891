use crate::error::RenderFailure;
use crate::types::ReportOutcome;

/// Classifies a raw render result. Any failure, and a zero-length document,
/// is a `Failure`; only a non-empty payload counts as `Success`.
pub fn classify(rendered: Result<Vec<u8>, RenderFailure>) -> ReportOutcome {
    match rendered {
        Ok(payload) if payload.is_empty() => ReportOutcome::Failure(RenderFailure::EmptyPayload),
        Ok(payload) => ReportOutcome::Success(payload),
        Err(failure) => ReportOutcome::Failure(failure),
    }
}
