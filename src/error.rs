//! Tolerated-conflict classification shared by every collaborator error.
//!
//! Creating something that a previous run already created is not a failure
//! for an idempotent workflow. Each collaborator error reports whether it is
//! such a conflict, and callers absorb it in one place with
//! [`tolerate_conflict`] instead of matching provider-specific variants.

/// Errors that can signal "the target already exists".
pub trait Conflict {
    /// True when the failed operation found its target already in place.
    fn is_conflict(&self) -> bool;
}

/// Result of an idempotent create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// This run created the resource.
    Created,
    /// A previous run had already created it.
    AlreadyExisted,
}

impl Applied {
    pub fn was_created(self) -> bool {
        matches!(self, Applied::Created)
    }
}

/// Absorb a conflict into [`Applied::AlreadyExisted`]; every other error
/// is returned unchanged.
pub fn tolerate_conflict<E: Conflict>(result: Result<(), E>) -> Result<Applied, E> {
    match result {
        Ok(()) => Ok(Applied::Created),
        Err(e) if e.is_conflict() => Ok(Applied::AlreadyExisted),
        Err(e) => Err(e),
    }
}
