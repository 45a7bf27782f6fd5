mod envelope;
mod extract;
mod normalize;
mod record;

pub use envelope::{Envelope, unwrap_payload};
pub use extract::{DEFAULT_HEADINGS, EvaluationParser};
pub use normalize::normalize_text;
pub use record::{EvaluationRecord, ParseFailure, SectionScore};
