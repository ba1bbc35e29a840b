//! Selection filter for interactive runs
//!
//! The terminal prompt loop lives in the binary; what the core provides is
//! the pure narrowing step from a candidate list and a decision to the
//! subset that will actually be executed.

use crate::diff::Operation;

/// A user's decision over a displayed candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Execute every candidate
    All,

    /// Execute the candidate at this zero-based index
    One(usize),

    /// Execute nothing
    Quit,
}

/// Narrow a candidate list according to a choice
///
/// An out-of-range index yields an empty selection; the prompt adapter
/// treats that as an invalid answer and asks again.
pub fn select(candidates: &[Operation], choice: Choice) -> Vec<Operation> {
    match choice {
        Choice::All => candidates.to_vec(),
        Choice::One(i) => candidates.get(i).cloned().into_iter().collect(),
        Choice::Quit => Vec::new(),
    }
}
