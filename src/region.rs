//! Guarded regions: ordered handler clauses around a body.
//!
//! The body has already run by the time a [`Guarded`] exists. Each clause
//! method is one step of first-match dispatch; once a clause accepts the
//! payload, the rest are skipped.
//!
//! The catch-all must be last. [`Guarded::catch_all`] returns [`Sealed`],
//! which has nothing left to add:
//!
//! ```compile_fail
//! use raise_this::{Runtime, Result};
//!
//! fn f(rt: &mut Runtime) -> Result<i32> {
//!     rt.guard(|rt| -> Result<i32> { Err(rt.raise(0)) })
//!         .catch_all(|_, _| Ok(1))
//!         .catch(|_, v: i32, _| Ok(v))
//!         .end()
//! }
//! ```

use core::fmt;

use tracing::debug;

use crate::error::RegionError;
use crate::payload::{Accepts, Payload, Raisable};
use crate::raised::{Hop, Raised, Site};
use crate::runtime::Runtime;
use crate::Result;

// ============================================================
// Identity
// ============================================================

/// Identity of one evaluation of a guarded region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegionId(pub(crate) u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region #{}", self.0)
    }
}

/// A region whose body is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRegion {
    pub id: RegionId,
    /// Stack depth when the region was entered.
    pub frame_depth: usize,
    pub site: Site,
}

// ============================================================
// Handling - the payload a clause is working on
// ============================================================

/// The payload currently being handled, threaded into a clause.
///
/// Only clauses receive one, so only clauses can [`rethrow`](Self::rethrow).
#[derive(Debug)]
pub struct Handling {
    raised: Raised,
    region: RegionId,
}

impl Handling {
    pub fn payload(&self) -> Payload {
        *self.raised.payload()
    }

    pub fn raised(&self) -> &Raised {
        &self.raised
    }

    /// Region whose clause is running.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Send the same payload to the next enclosing region.
    ///
    /// Identity is kept: the returned [`Raised`] has the original
    /// [`RaiseId`](crate::RaiseId), site and trail.
    pub fn rethrow(self) -> Raised {
        let Handling { mut raised, region } = self;
        debug!(raise = %raised.id(), %region, payload = %raised.payload(), "rethrow");
        raised.record(Hop::Rethrown(region));
        raised
    }

    /// [`rethrow`](Self::rethrow) without giving up the handling.
    ///
    /// Used from a region nested in the clause, so the clause can still
    /// rethrow afterwards. Same identity either way.
    pub fn rethrow_ref(&self) -> Raised {
        let mut raised = self.raised.clone();
        debug!(raise = %raised.id(), region = %self.region, payload = %raised.payload(), "rethrow");
        raised.record(Hop::Rethrown(self.region));
        raised
    }
}

// ============================================================
// Dispatch
// ============================================================

enum State<T> {
    /// Body completed, or a clause ran.
    Done(Result<T>),
    /// Body raised and no clause has accepted the payload yet.
    Pending(Raised),
}

/// Clause dispatcher returned by [`Runtime::guard`].
#[must_use = "a guarded region does nothing until `.end()`"]
pub struct Guarded<'r, T> {
    rt: &'r mut Runtime,
    region: RegionId,
    clauses: usize,
    state: State<T>,
}

impl<'r, T> Guarded<'r, T> {
    pub(crate) fn completed(rt: &'r mut Runtime, region: RegionId, value: T) -> Self {
        Self { rt, region, clauses: 0, state: State::Done(Ok(value)) }
    }

    pub(crate) fn pending(rt: &'r mut Runtime, region: RegionId, raised: Raised) -> Self {
        Self { rt, region, clauses: 0, state: State::Pending(raised) }
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Typed clause: runs if the payload's kind is `K::KIND` and no earlier
    /// clause ran.
    pub fn catch<K, F>(self, clause: F) -> Self
    where
        K: Raisable,
        F: FnOnce(&mut Runtime, K, Handling) -> Result<T>,
    {
        let Guarded { rt, region, clauses, state } = self;
        let state = match state {
            State::Pending(raised) => match K::from_payload(raised.payload()) {
                Some(value) => {
                    debug!(raise = %raised.id(), %region, clause = clauses, accepts = %K::KIND, "caught");
                    State::Done(clause(&mut *rt, value, Handling { raised, region }))
                }
                None => State::Pending(raised),
            },
            done => done,
        };
        Guarded { rt, region, clauses: clauses + 1, state }
    }

    /// Catch-all clause. Must be last; the returned [`Sealed`] only ends.
    pub fn catch_all<F>(self, clause: F) -> Sealed<'r, T>
    where
        F: FnOnce(&mut Runtime, Handling) -> Result<T>,
    {
        let Guarded { rt, region, clauses, state } = self;
        let state = match state {
            State::Pending(raised) => {
                debug!(raise = %raised.id(), %region, clause = clauses, accepts = %Accepts::Any, "caught");
                State::Done(clause(&mut *rt, Handling { raised, region }))
            }
            done => done,
        };
        Sealed {
            inner: Guarded { rt, region, clauses: clauses + 1, state },
        }
    }

    /// Finish dispatch: the body's value, the clause's result, or the payload
    /// passed on untouched.
    pub fn end(self) -> Result<T> {
        match self.state {
            State::Done(result) => result,
            State::Pending(mut raised) => {
                debug!(raise = %raised.id(), region = %self.region, clauses = self.clauses, "no clause matched");
                raised.record(Hop::Passed(self.region));
                Err(raised)
            }
        }
    }
}

/// A region whose catch-all has been added.
#[must_use = "a guarded region does nothing until `.end()`"]
pub struct Sealed<'r, T> {
    inner: Guarded<'r, T>,
}

impl<'r, T> Sealed<'r, T> {
    pub fn end(self) -> Result<T> {
        self.inner.end()
    }
}

/// Check a clause list: non-empty, one catch-all at most, and it comes last.
pub fn validate_clauses(clauses: &[Accepts]) -> core::result::Result<(), RegionError> {
    if clauses.is_empty() {
        return Err(RegionError::NoClauses);
    }

    let mut catch_all = None;
    for (position, accepts) in clauses.iter().enumerate() {
        if !accepts.is_catch_all() {
            continue;
        }
        if catch_all.is_some() {
            return Err(RegionError::DuplicateCatchAll { position });
        }
        catch_all = Some(position);
    }

    match catch_all {
        Some(position) if position + 1 != clauses.len() => Err(RegionError::CatchAllNotLast {
            position,
            total: clauses.len(),
        }),
        _ => Ok(()),
    }
}
