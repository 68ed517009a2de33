//! Where a raise can end up.

use core::fmt;
use std::collections::BTreeSet;

use super::{CallSite, ProgramIndex, SourceLoc, Thrower, TryBlockId};
use crate::payload::PayloadKind;

/// End of one propagation path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Leaf {
    /// A clause takes the payload.
    Caught {
        try_block: TryBlockId,
        /// Position of the clause in its region.
        clause: usize,
        /// Function containing the region.
        function: String,
        /// Location of the clause.
        loc: SourceLoc,
    },
    /// Reaches `function` with no clause to take it, and nothing new calls
    /// `function`: it has no callers, or only callers already on the path.
    Uncaught { function: String },
}

impl Leaf {
    pub fn is_caught(&self) -> bool {
        matches!(self, Leaf::Caught { .. })
    }

    /// Leaf with the accepting clause spelled out.
    pub fn describe<'a>(&'a self, index: &'a ProgramIndex) -> impl fmt::Display + 'a {
        Described { leaf: self, index }
    }
}

struct Described<'a> {
    leaf: &'a Leaf,
    index: &'a ProgramIndex,
}

impl fmt::Display for Described<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.leaf {
            Leaf::Caught { try_block, clause, function, loc } => {
                let accepts = self
                    .index
                    .try_block(*try_block)
                    .and_then(|b| b.catchers.get(*clause))
                    .map(|c| c.accepts.to_string())
                    .unwrap_or_default();
                write!(f, "{} ({}) clause {} `{}` in {}", loc, try_block, clause, accepts, function)
            }
            Leaf::Uncaught { function } => write!(f, "uncaught in {}", function),
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Caught { try_block, clause, function, loc } => {
                write!(f, "{} ({}) clause {} in {}", loc, try_block, clause, function)
            }
            Leaf::Uncaught { function } => write!(f, "uncaught in {}", function),
        }
    }
}

/// A raise site or a call site on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TreeNode {
    /// The raising function at the root; the calling function below it.
    pub function: String,
    pub loc: SourceLoc,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(function: &str, loc: &SourceLoc) -> Self {
        Self {
            function: function.to_string(),
            loc: loc.clone(),
            children: Vec::new(),
        }
    }
}

/// A raise site at the root, call sites as inner nodes, and the clauses
/// (or escapes) the payload can reach as leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ThrowTree {
    pub root: TreeNode,
    pub kind: Option<PayloadKind>,
    pub leaves: Vec<Leaf>,
}

impl ThrowTree {
    /// Follow `thrower` outward.
    ///
    /// A compatible clause in the raise's own regions is the only leaf.
    /// Otherwise every caller is followed, skipping functions already on the
    /// path, until a call site's regions take the kind or a function with no
    /// callers left to follow is reached.
    pub fn build(thrower: &Thrower, index: &ProgramIndex) -> Self {
        let mut tree = Self {
            root: TreeNode::new(&thrower.function, &thrower.loc),
            kind: thrower.kind,
            leaves: Vec::new(),
        };

        if let Some(leaf) = index.catch_in(&thrower.try_stack, thrower.kind) {
            tree.leaves.push(leaf);
            return tree;
        }

        let callers = index.callers_of(&thrower.function);
        let mut walk = Walk {
            index,
            kind: thrower.kind,
            leaves: &mut tree.leaves,
        };
        walk.children(&mut tree.root, callers, &BTreeSet::new());
        tree
    }

    /// Every path ends at a clause. A tree with no leaves is not caught.
    pub fn is_fully_caught(&self) -> bool {
        !self.leaves.is_empty() && self.leaves.iter().all(Leaf::is_caught)
    }
}

struct Walk<'a, 'l> {
    index: &'a ProgramIndex,
    kind: Option<PayloadKind>,
    leaves: &'l mut Vec<Leaf>,
}

impl<'a> Walk<'a, '_> {
    fn children(&mut self, node: &mut TreeNode, callers: &'a [CallSite], visited: &BTreeSet<&'a str>) {
        let mut open = callers
            .iter()
            .filter(|c| !visited.contains(c.function.as_str()))
            .peekable();

        if open.peek().is_none() {
            self.leaves.push(Leaf::Uncaught {
                function: node.function.clone(),
            });
            return;
        }

        for caller in open {
            let mut child = TreeNode::new(&caller.function, &caller.loc);

            match self.index.catch_in(&caller.try_stack, self.kind) {
                Some(leaf) => self.leaves.push(leaf),
                None => {
                    let mut visited = visited.clone();
                    visited.insert(caller.function.as_str());
                    let next = self.index.callers_of(&caller.function);
                    self.children(&mut child, next, &visited);
                }
            }

            node.children.push(child);
        }
    }
}

impl fmt::Display for ThrowTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn node(f: &mut fmt::Formatter<'_>, n: &TreeNode, depth: usize) -> fmt::Result {
            writeln!(f, "{:indent$}{} {}", "", n.function, n.loc, indent = depth * 2)?;
            for child in &n.children {
                node(f, child, depth + 1)?;
            }
            Ok(())
        }

        node(f, &self.root, 0)?;
        for leaf in &self.leaves {
            writeln!(f, "=> {}", leaf)?;
        }
        Ok(())
    }
}
