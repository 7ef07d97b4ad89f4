//! @dose
//! purpose: Entry point of the documentation extractor. Defines the fatal error type and
//!     wires the line classifier, the state machine and the signature normalizer together.
//!
//! when-editing:
//!     - !ExtractError variants are all structural: any of them aborts the whole run
//!     - Recoverable conditions go to Diagnostics, never into ExtractError
//!
//! invariants:
//!     - extract_unit performs no I/O; callers read the file
//!     - Identical text and tables always produce an identical ExtractionResult
//!
//! flows:
//!     - extract_unit: Extractor::new -> run over text -> section-keyed ExtractionResult

pub mod extractor;
pub mod line;
pub mod normalize;

use crate::types::{Diagnostics, ExtractionResult};
use thiserror::Error;

pub use extractor::{decide, Action, Extractor, ParserState};
pub use line::{classify, LineShape, Marker};
pub use normalize::Normalizer;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{unit}:{line}: unexpected line inside {state}: {text:?}")]
    UnexpectedLine {
        unit: String,
        line: usize,
        state: String,
        text: String,
    },
    #[error("{unit}: signature is missing a parenthesis pair: {signature:?}")]
    UnbalancedSignature { unit: String, signature: String },
}

/// Extract the declarations of one documentation unit
pub fn extract_unit(
    unit: &str,
    text: &str,
    normalizer: &Normalizer,
    diagnostics: &mut Diagnostics,
) -> Result<ExtractionResult, ExtractError> {
    Extractor::new(unit, normalizer).run(text, diagnostics)
}
