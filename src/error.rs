//! Fatal conditions and construction errors.

use crate::raised::Raised;

/// A payload reached the process boundary with no clause to take it.
///
/// Never recoverable: [`terminate_on_fatal`](crate::terminate_on_fatal) turns
/// it into abnormal termination.
#[derive(Debug, thiserror::Error)]
pub enum Fatal {
    /// Raised while running an initializer, before the entry point.
    #[error("initializer `{name}` raised uncaught {}", .raised.payload())]
    Init {
        name: &'static str,
        #[source]
        raised: Raised,
    },

    /// Escaped the entry point.
    #[error("uncaught {} escaped `{entry}`", .raised.payload())]
    Uncaught {
        entry: &'static str,
        #[source]
        raised: Raised,
    },
}

impl Fatal {
    pub fn raised(&self) -> &Raised {
        match self {
            Fatal::Init { raised, .. } | Fatal::Uncaught { raised, .. } => raised,
        }
    }

    pub fn into_raised(self) -> Raised {
        match self {
            Fatal::Init { raised, .. } | Fatal::Uncaught { raised, .. } => raised,
        }
    }
}

/// Invalid clause list for a guarded region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RegionError {
    #[error("guarded region has no handler clauses")]
    NoClauses,

    #[error("catch-all at clause {position} of {total} must be the last clause")]
    CatchAllNotLast { position: usize, total: usize },

    #[error("second catch-all at clause {position}")]
    DuplicateCatchAll { position: usize },
}
