//! User merge capability
//!
//! The actual combining of artifacts is supplied by the caller; the scheduler
//! treats it as opaque. Inputs are always handed over in the left-to-right
//! chunk order the planner established, since merge semantics may be
//! order-sensitive (concatenation, for one).

use anyhow::Result;
use async_trait::async_trait;

/// User-supplied merge routine over artifacts of type `A`
#[async_trait]
pub trait MergeCapability<A>: Send + Sync {
    /// Combine the ordered inputs into one artifact
    ///
    /// Called with 1 to `merge_factor` inputs. A one-element input still goes
    /// through the merge so every node's output is produced the same way.
    async fn merge(&self, inputs: Vec<A>) -> Result<A>;

    /// Whether a previously persisted artifact is acceptable for reuse
    ///
    /// Consulted when resuming: outputs that fail this check are treated as
    /// incomplete and recomputed. The default accepts anything that loaded.
    fn validate(&self, _artifact: &A) -> bool {
        true
    }
}
