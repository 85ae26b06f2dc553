//! Context assembly from the top-ranked chunks.

use crate::rank::Ranking;
use ragscope_core::{AppError, AppResult};

/// Separator placed between chunk texts in an assembled context.
pub const CONTEXT_DELIMITER: &str = "\n\n";

/// Reject a top-K value below 1.
pub fn validate_k(k: usize) -> AppResult<()> {
    if k == 0 {
        return Err(AppError::invalid_parameter("k", k, "must be at least 1"));
    }
    Ok(())
}

/// Join the texts of the first `k` ranked chunks with [`CONTEXT_DELIMITER`].
///
/// A `k` larger than the ranking takes every chunk. Overlapping text from
/// adjacent chunks is kept as is.
pub fn assemble(ranking: &Ranking, k: usize) -> AppResult<String> {
    validate_k(k)?;

    let texts: Vec<&str> = ranking.top(k).iter().map(|r| r.text.as_str()).collect();
    Ok(texts.join(CONTEXT_DELIMITER))
}
