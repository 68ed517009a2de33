//! The in-flight failure and the trail it leaves while propagating.

use core::fmt;

use smallvec::SmallVec;

use crate::payload::{Payload, PayloadKind};
use crate::region::RegionId;

// ============================================================
// Identity and location
// ============================================================

/// Identity of one raise.
///
/// Minted once per [`Runtime::raise`](crate::Runtime::raise). A rethrow keeps
/// it; raising an equal payload again gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RaiseId(pub(crate) u64);

impl RaiseId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RaiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source location - cheap, no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
    pub col: u32,
}

impl Site {
    /// Location of the caller (through any `#[track_caller]` chain).
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        let loc = core::panic::Location::caller();
        Self {
            file: loc.file(),
            line: loc.line(),
            col: loc.column(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

// ============================================================
// Hops
// ============================================================

/// One step of the payload's trip outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Hop {
    /// A call frame was popped after running `released` scoped resources.
    Unwound { function: &'static str, released: usize },
    /// A region released `released` resources acquired inside its body.
    Released { region: RegionId, released: usize },
    /// A region tried its clauses and none accepted the payload.
    Passed(RegionId),
    /// A clause of this region caught the payload and rethrew it.
    Rethrown(RegionId),
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hop::Unwound { function, released } => {
                write!(f, "unwound `{}` ({} released)", function, released)
            }
            Hop::Released { region, released } => {
                write!(f, "left {} ({} released)", region, released)
            }
            Hop::Passed(region) => write!(f, "passed {}", region),
            Hop::Rethrown(region) => write!(f, "rethrown from {}", region),
        }
    }
}

/// Inline hop storage; deeper trails spill to the heap.
const INLINE_HOPS: usize = 4;

// ============================================================
// Raised
// ============================================================

/// A payload in flight.
///
/// This is the `Err` side of [`Result`](crate::Result): propagating is `?`,
/// handling is a clause of a guarded region taking it by value.
#[must_use = "an in-flight payload must be propagated or handled"]
#[derive(Debug, Clone)]
pub struct Raised {
    id: RaiseId,
    payload: Payload,
    origin: &'static str,
    site: Site,
    hops: SmallVec<[Hop; INLINE_HOPS]>,
    hop_limit: usize,
}

impl Raised {
    pub(crate) fn new(
        id: RaiseId,
        payload: Payload,
        origin: &'static str,
        site: Site,
        hop_limit: usize,
    ) -> Self {
        Self {
            id,
            payload,
            origin,
            site,
            hops: SmallVec::new(),
            hop_limit,
        }
    }

    pub fn id(&self) -> RaiseId {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Function whose frame was on top when the payload was raised.
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Recorded hops, innermost first. Capped at the runtime's hop limit.
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Names of the frames torn down so far, innermost first.
    pub fn unwound(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hops.iter().filter_map(|hop| match hop {
            Hop::Unwound { function, .. } => Some(*function),
            _ => None,
        })
    }

    /// How many clauses have caught and rethrown this payload.
    pub fn rethrow_count(&self) -> usize {
        self.hops.iter().filter(|hop| matches!(hop, Hop::Rethrown(_))).count()
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    #[inline]
    pub(crate) fn record(&mut self, hop: Hop) {
        if self.hops.len() < self.hop_limit {
            self.hops.push(hop);
        }
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} raised {} in `{}` at {}",
            self.payload, self.id, self.origin, self.site
        )?;

        if !self.hops.is_empty() {
            write!(f, "\n\nPropagation (innermost first):")?;
            for hop in &self.hops {
                write!(f, "\n  {}", hop)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Raised {}

// ============================================================
// Serde support
// ============================================================

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{Serialize, Serializer};

    #[derive(Serialize)]
    struct SerializedRaised<'a> {
        id: u64,
        payload: &'a Payload,
        origin: &'a str,
        site: String,
        hops: &'a [Hop],
    }

    impl Serialize for Raised {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            SerializedRaised {
                id: self.id.0,
                payload: &self.payload,
                origin: self.origin,
                site: self.site.to_string(),
                hops: &self.hops,
            }
            .serialize(serializer)
        }
    }

    impl Serialize for Site {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }
}
