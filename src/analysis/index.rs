//! Building a [`ProgramIndex`].

use tracing::trace;

use super::{CallSite, Catcher, FunctionNode, ProgramIndex, SourceLoc, Thrower, TryBlock, TryBlockId};
use crate::error::RegionError;
use crate::payload::{Accepts, PayloadKind};
use crate::region::validate_clauses;

/// Malformed program structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("function `{name}` declared twice (at {first} and {second})")]
    Redeclared {
        name: String,
        first: SourceLoc,
        second: SourceLoc,
    },

    #[error("function `{inner}` declared inside `{outer}`")]
    NestedFunction { outer: String, inner: String },

    #[error("{what} at {loc} is outside any function")]
    OutsideFunction { what: &'static str, loc: SourceLoc },

    #[error("{what} at {loc} has no open region")]
    NoOpenRegion { what: &'static str, loc: SourceLoc },

    #[error("region opened at {loc} is never closed")]
    UnclosedRegion { loc: SourceLoc },

    #[error("function `{name}` is never closed")]
    UnclosedFunction { name: String },

    #[error("rethrow at {loc} is not inside a catch clause")]
    RethrowOutsideClause { loc: SourceLoc },

    #[error("invalid clauses for region at {loc}")]
    Region {
        loc: SourceLoc,
        #[source]
        source: RegionError,
    },
}

/// A region being walked.
#[derive(Debug)]
struct OpenTry {
    id: TryBlockId,
    /// Clause being walked; None while in the body.
    handling: Option<usize>,
}

/// Walks a program and records what it sees.
///
/// ```
/// use raise_this::analysis::{Indexer, SourceLoc};
/// use raise_this::{Accepts, PayloadKind};
///
/// let at = |line, col| SourceLoc::new("main.cpp", line, col);
/// let mut ix = Indexer::new();
/// ix.function("foo", at(1, 1))?
///     .throw(at(2, 5), PayloadKind::Int)?
///     .end_function()?;
/// ix.function("main", at(5, 1))?
///     .enter_try(at(6, 5))?
///     .call("foo", at(7, 9))?
///     .catch(at(8, 5), Accepts::Any)?
///     .end_try()?
///     .end_function()?;
/// let index = ix.finish()?;
///
/// let tree = index.throw_tree(&index.throwers()[0]);
/// assert_eq!(tree.leaves.len(), 1);
/// # Ok::<(), raise_this::analysis::IndexError>(())
/// ```
#[derive(Debug, Default)]
pub struct Indexer {
    index: ProgramIndex,
    current: Option<String>,
    open: Vec<OpenTry>,
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> &mut FunctionNode {
        self.index
            .functions
            .entry(name.to_string())
            .or_insert_with(|| FunctionNode {
                name: name.to_string(),
                ..FunctionNode::default()
            })
    }

    fn current(&self, what: &'static str, loc: &SourceLoc) -> Result<String, IndexError> {
        self.current.clone().ok_or_else(|| IndexError::OutsideFunction {
            what,
            loc: loc.clone(),
        })
    }

    /// Regions whose body encloses the current point, outermost first.
    ///
    /// A region does not guard its own clauses.
    fn guarding(&self) -> Vec<TryBlockId> {
        self.open
            .iter()
            .filter(|t| t.handling.is_none())
            .map(|t| t.id)
            .collect()
    }

    // ========================================================
    // Functions
    // ========================================================

    pub fn function(&mut self, name: &str, loc: SourceLoc) -> Result<&mut Self, IndexError> {
        if let Some(outer) = &self.current {
            return Err(IndexError::NestedFunction {
                outer: outer.clone(),
                inner: name.to_string(),
            });
        }

        let node = self.node(name);
        if let Some(first) = &node.decl {
            return Err(IndexError::Redeclared {
                name: name.to_string(),
                first: first.clone(),
                second: loc,
            });
        }
        trace!(function = name, %loc, "index function");
        node.decl = Some(loc);
        self.current = Some(name.to_string());
        Ok(self)
    }

    pub fn end_function(&mut self) -> Result<&mut Self, IndexError> {
        if let Some(open) = self.open.last() {
            let loc = self.index.try_blocks[open.id.0].loc.clone();
            return Err(IndexError::UnclosedRegion { loc });
        }
        if self.current.take().is_none() {
            return Err(IndexError::OutsideFunction {
                what: "end of function",
                loc: SourceLoc::default(),
            });
        }
        Ok(self)
    }

    // ========================================================
    // Calls and raises
    // ========================================================

    pub fn call(&mut self, callee: &str, loc: SourceLoc) -> Result<&mut Self, IndexError> {
        let caller = self.current("call", &loc)?;
        let try_stack = self.guarding();

        self.node(&caller).calls.push(CallSite {
            function: callee.to_string(),
            loc: loc.clone(),
            try_stack: try_stack.clone(),
        });
        self.node(callee).callers.push(CallSite {
            function: caller,
            loc,
            try_stack,
        });
        Ok(self)
    }

    pub fn throw(&mut self, loc: SourceLoc, kind: PayloadKind) -> Result<&mut Self, IndexError> {
        let function = self.current("throw", &loc)?;
        let try_stack = self.guarding();
        self.index.throwers.push(Thrower {
            function,
            loc,
            kind: Some(kind),
            rethrow: false,
            try_stack,
        });
        Ok(self)
    }

    /// Rethrow of the payload handled by the innermost clause being walked.
    pub fn rethrow(&mut self, loc: SourceLoc) -> Result<&mut Self, IndexError> {
        let function = self.current("rethrow", &loc)?;

        let handled = self.open.iter().rev().find_map(|t| {
            let clause = t.handling?;
            Some(self.index.try_blocks[t.id.0].catchers[clause].accepts)
        });
        let kind = match handled {
            Some(Accepts::Kind(kind)) => Some(kind),
            Some(Accepts::Any) => None,
            None => return Err(IndexError::RethrowOutsideClause { loc }),
        };

        let try_stack = self.guarding();
        self.index.throwers.push(Thrower {
            function,
            loc,
            kind,
            rethrow: true,
            try_stack,
        });
        Ok(self)
    }

    // ========================================================
    // Regions
    // ========================================================

    pub fn enter_try(&mut self, loc: SourceLoc) -> Result<&mut Self, IndexError> {
        let function = self.current("try", &loc)?;
        let id = TryBlockId(self.index.try_blocks.len());
        self.index.try_blocks.push(TryBlock {
            id,
            loc,
            function,
            catchers: Vec::new(),
        });
        self.open.push(OpenTry { id, handling: None });
        Ok(self)
    }

    /// Start the next clause of the innermost open region.
    pub fn catch(&mut self, loc: SourceLoc, accepts: Accepts) -> Result<&mut Self, IndexError> {
        let Some(open) = self.open.last_mut() else {
            return Err(IndexError::NoOpenRegion { what: "catch", loc });
        };
        let block = &mut self.index.try_blocks[open.id.0];
        open.handling = Some(block.catchers.len());
        block.catchers.push(Catcher { loc, accepts });
        Ok(self)
    }

    /// Close the innermost open region and check its clause list.
    pub fn end_try(&mut self) -> Result<&mut Self, IndexError> {
        let Some(open) = self.open.pop() else {
            return Err(IndexError::NoOpenRegion {
                what: "end of region",
                loc: SourceLoc::default(),
            });
        };
        let block = &self.index.try_blocks[open.id.0];
        let accepts: Vec<Accepts> = block.catchers.iter().map(|c| c.accepts).collect();
        validate_clauses(&accepts).map_err(|source| IndexError::Region {
            loc: block.loc.clone(),
            source,
        })?;
        Ok(self)
    }

    pub fn finish(self) -> Result<ProgramIndex, IndexError> {
        if let Some(open) = self.open.last() {
            let loc = self.index.try_blocks[open.id.0].loc.clone();
            return Err(IndexError::UnclosedRegion { loc });
        }
        if let Some(name) = self.current {
            return Err(IndexError::UnclosedFunction { name });
        }
        Ok(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, column: u32) -> SourceLoc {
        SourceLoc::new("main.cpp", line, column)
    }

    #[test]
    fn test_redeclared() {
        let mut ix = Indexer::new();
        ix.function("foo", at(1, 1)).unwrap().end_function().unwrap();
        let err = ix.function("foo", at(9, 1)).unwrap_err();
        assert!(matches!(err, IndexError::Redeclared { .. }));
    }

    #[test]
    fn test_call_before_declaration() {
        let mut ix = Indexer::new();
        ix.function("main", at(1, 1)).unwrap().call("later", at(2, 5)).unwrap().end_function().unwrap();
        ix.function("later", at(5, 1)).unwrap().end_function().unwrap();
        let index = ix.finish().unwrap();
        assert_eq!(index.function("later").unwrap().callers[0].function, "main");
    }

    #[test]
    fn test_clause_is_not_guarded_by_its_region() {
        let mut ix = Indexer::new();
        ix.function("main", at(1, 1))
            .unwrap()
            .enter_try(at(2, 5))
            .unwrap()
            .call("in_body", at(3, 9))
            .unwrap()
            .catch(at(4, 5), Accepts::Kind(PayloadKind::Int))
            .unwrap()
            .call("in_clause", at(5, 9))
            .unwrap()
            .rethrow(at(6, 9))
            .unwrap()
            .end_try()
            .unwrap()
            .end_function()
            .unwrap();
        let index = ix.finish().unwrap();

        assert_eq!(index.function("in_body").unwrap().callers[0].try_stack, vec![TryBlockId(0)]);
        assert!(index.function("in_clause").unwrap().callers[0].try_stack.is_empty());

        let rethrow = &index.throwers()[0];
        assert!(rethrow.rethrow);
        assert_eq!(rethrow.kind, Some(PayloadKind::Int));
        assert!(rethrow.try_stack.is_empty());
    }

    #[test]
    fn test_rethrow_outside_clause() {
        let mut ix = Indexer::new();
        ix.function("f", at(1, 1)).unwrap().enter_try(at(2, 5)).unwrap();
        assert!(matches!(
            ix.rethrow(at(3, 9)).unwrap_err(),
            IndexError::RethrowOutsideClause { .. }
        ));
    }

    #[test]
    fn test_catch_all_must_be_last() {
        let mut ix = Indexer::new();
        ix.function("f", at(1, 1))
            .unwrap()
            .enter_try(at(2, 5))
            .unwrap()
            .catch(at(3, 5), Accepts::Any)
            .unwrap()
            .catch(at(4, 5), Accepts::Kind(PayloadKind::Int))
            .unwrap();
        let err = ix.end_try().unwrap_err();
        assert_eq!(
            err,
            IndexError::Region {
                loc: at(2, 5),
                source: RegionError::CatchAllNotLast { position: 0, total: 2 },
            }
        );
    }

    #[test]
    fn test_unclosed() {
        let mut ix = Indexer::new();
        ix.function("f", at(1, 1)).unwrap().enter_try(at(2, 5)).unwrap();
        assert!(matches!(ix.end_function().unwrap_err(), IndexError::UnclosedRegion { .. }));

        let mut ix = Indexer::new();
        ix.function("f", at(1, 1)).unwrap();
        assert!(matches!(ix.finish().unwrap_err(), IndexError::UnclosedFunction { .. }));
    }

    #[test]
    fn test_outside_function() {
        let mut ix = Indexer::new();
        assert!(matches!(
            ix.call("foo", at(1, 1)).unwrap_err(),
            IndexError::OutsideFunction { what: "call", .. }
        ));
        assert!(matches!(
            ix.catch(at(1, 1), Accepts::Any).unwrap_err(),
            IndexError::NoOpenRegion { .. }
        ));
    }
}
