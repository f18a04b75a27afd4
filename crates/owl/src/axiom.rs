//! Balanced extraction of the `EquivalentClasses(...)` axiom.
//!
//! A single regex cannot capture an expression with nested groups: a non-recursive
//! `\(([^)]+)\)` stops at the first inner `)` and truncates intersections and restrictions.
//! The span is therefore recovered with a depth counter.

use crate::{OwlError, OwlResult};

/// Keyword that opens the stated definition of a class, including its open parenthesis.
pub const EQUIVALENT_CLASSES_KEYWORD: &str = "EquivalentClasses(";

/// Returns the full `EquivalentClasses(...)` span of `block`, keyword included.
///
/// Returns `Ok(None)` when the block has no such keyword; most classes have no stated
/// definition. Every `(` after the keyword opens a level and every `)` closes one; the span
/// ends at the `)` that brings the depth back to zero.
///
/// # Errors
///
/// Returns [`OwlError::UnbalancedAxiom`] if the block ends before the expression closes.
pub fn extract_axiom(block: &str) -> OwlResult<Option<&str>> {
    let Some(start) = block.find(EQUIVALENT_CLASSES_KEYWORD) else {
        return Ok(None);
    };

    let body_start = start + EQUIVALENT_CLASSES_KEYWORD.len();
    let mut open: usize = 1;

    for (offset, byte) in block.as_bytes()[body_start..].iter().enumerate() {
        match byte {
            b'(' => open += 1,
            b')' => {
                open -= 1;
                if open == 0 {
                    let end = body_start + offset + 1;
                    return Ok(Some(&block[start..end]));
                }
            }
            _ => {}
        }
    }

    Err(OwlError::UnbalancedAxiom { start, open })
}
