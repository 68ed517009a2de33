//! Static throw analysis.
//!
//! A [`ProgramIndex`] records a program's functions, the calls between them,
//! its guarded regions with their clauses, and every raise site, each with
//! the stack of regions open around it. [`ThrowTree`] answers, for one raise
//! site, which clauses can end up handling it and which paths escape.
//!
//! Indexes are built with an [`Indexer`], the way a syntax walk visits a
//! program: enter a function, note calls and raises, open and close regions.

use core::fmt;
use std::collections::BTreeMap;
use std::path::Path;

use crate::payload::{Accepts, PayloadKind};

mod index;
mod tree;

pub use index::{IndexError, Indexer};
pub use tree::{Leaf, ThrowTree, TreeNode};

// ============================================================
// Locations
// ============================================================

/// A position in a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// `basename:line:col`, or nothing when the file is unknown.
impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            return Ok(());
        }
        let base = Path::new(&self.file)
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| self.file.as_str().into());
        write!(f, "{}:{}:{}", base, self.line, self.column)
    }
}

// ============================================================
// Regions
// ============================================================

/// Index of a region within a [`ProgramIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TryBlockId(pub usize);

impl fmt::Display for TryBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "try#{}", self.0)
    }
}

/// One clause of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Catcher {
    pub loc: SourceLoc,
    pub accepts: Accepts,
}

/// A guarded region and its clauses in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TryBlock {
    pub id: TryBlockId,
    pub loc: SourceLoc,
    pub function: String,
    pub catchers: Vec<Catcher>,
}

impl TryBlock {
    /// Position of the first clause that takes `kind`.
    ///
    /// `None` is a payload of unknown kind (a rethrow from a catch-all); only
    /// a catch-all is certain to take it.
    pub fn first_match(&self, kind: Option<PayloadKind>) -> Option<usize> {
        self.catchers.iter().position(|c| match kind {
            Some(kind) => c.accepts.matches(kind),
            None => c.accepts.is_catch_all(),
        })
    }
}

// ============================================================
// Call graph
// ============================================================

/// One edge of the call graph, seen from either end.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CallSite {
    /// The other function: the callee in `calls`, the caller in `callers`.
    pub function: String,
    pub loc: SourceLoc,
    /// Regions guarding the call, outermost first.
    pub try_stack: Vec<TryBlockId>,
}

/// A node of the call graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionNode {
    pub name: String,
    /// None for a function that is called but never declared.
    pub decl: Option<SourceLoc>,
    pub callers: Vec<CallSite>,
    pub calls: Vec<CallSite>,
}

/// A raise site.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Thrower {
    pub function: String,
    pub loc: SourceLoc,
    /// None for a rethrow whose kind is unknown.
    pub kind: Option<PayloadKind>,
    pub rethrow: bool,
    /// Regions guarding the raise, outermost first.
    pub try_stack: Vec<TryBlockId>,
}

// ============================================================
// ProgramIndex
// ============================================================

/// Everything known about a program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProgramIndex {
    pub(crate) functions: BTreeMap<String, FunctionNode>,
    pub(crate) try_blocks: Vec<TryBlock>,
    pub(crate) throwers: Vec<Thrower>,
}

impl ProgramIndex {
    /// Functions by name.
    pub fn functions(&self) -> &BTreeMap<String, FunctionNode> {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&FunctionNode> {
        self.functions.get(name)
    }

    pub fn try_blocks(&self) -> &[TryBlock] {
        &self.try_blocks
    }

    pub fn try_block(&self, id: TryBlockId) -> Option<&TryBlock> {
        self.try_blocks.get(id.0)
    }

    /// Raise sites in the order they were indexed.
    pub fn throwers(&self) -> &[Thrower] {
        &self.throwers
    }

    /// Callers of `name`; empty for an unknown function.
    pub(crate) fn callers_of(&self, name: &str) -> &[CallSite] {
        self.functions.get(name).map_or(&[], |f| f.callers.as_slice())
    }

    /// The clause that takes `kind` within `try_stack`, innermost region first.
    pub fn catch_in(&self, try_stack: &[TryBlockId], kind: Option<PayloadKind>) -> Option<Leaf> {
        try_stack.iter().rev().find_map(|id| {
            let block = self.try_block(*id)?;
            let clause = block.first_match(kind)?;
            Some(Leaf::Caught {
                try_block: *id,
                clause,
                function: block.function.clone(),
                loc: block.catchers[clause].loc.clone(),
            })
        })
    }

    pub fn throw_tree(&self, thrower: &Thrower) -> ThrowTree {
        ThrowTree::build(thrower, self)
    }

    pub fn call_graph_report(&self) -> CallGraphReport<'_> {
        CallGraphReport { index: self }
    }

    pub fn throw_tree_report(&self) -> ThrowTreeReport<'_> {
        ThrowTreeReport { index: self }
    }
}

// ============================================================
// Reports
// ============================================================

struct Stack<'a>(&'a [TryBlockId]);

impl fmt::Display for Stack<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", id)?;
        }
        f.write_str("]")
    }
}

/// Every function with its callers and callees.
pub struct CallGraphReport<'a> {
    index: &'a ProgramIndex,
}

impl fmt::Display for CallGraphReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, node) in &self.index.functions {
            match &node.decl {
                Some(decl) => writeln!(f, "Node: {} ({})", name, decl)?,
                None => writeln!(f, "Node: {} (undeclared)", name)?,
            }
            for c in &node.callers {
                writeln!(f, "  caller: {} at {} {}", c.function, c.loc, Stack(&c.try_stack))?;
            }
            for c in &node.calls {
                writeln!(f, "  calls:  {} at {} {}", c.function, c.loc, Stack(&c.try_stack))?;
            }
        }
        Ok(())
    }
}

/// For every raise site, the clauses that take it or `uncaught`.
pub struct ThrowTreeReport<'a> {
    index: &'a ProgramIndex,
}

impl fmt::Display for ThrowTreeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for thrower in &self.index.throwers {
            let tree = ThrowTree::build(thrower, self.index);
            let kind = thrower.kind.map_or("unknown", PayloadKind::name);
            let what = if thrower.rethrow { "rethrow" } else { "throw" };
            writeln!(f, "{}: {} : {}", what, thrower.loc, kind)?;
            for leaf in &tree.leaves {
                writeln!(f, "  catch: {}", leaf.describe(self.index))?;
            }
        }
        Ok(())
    }
}
