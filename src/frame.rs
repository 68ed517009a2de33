//! Explicit call frames with scoped resources.
//!
//! Teardown never relies on Rust's own unwinding: every frame owns its
//! resources and releases them, newest first, when it is popped.

use core::fmt;

use smallvec::SmallVec;
use tracing::trace;

/// Inline resource slots per frame before spilling to the heap.
const INLINE_RESOURCES: usize = 4;

// ============================================================
// Resource
// ============================================================

/// A scoped resource: a label and the callback that releases it.
pub struct Resource {
    label: &'static str,
    release: Box<dyn FnOnce()>,
}

impl Resource {
    pub fn new(label: &'static str, release: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            release: Box::new(release),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn release(self) {
        (self.release)()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resource").field(&self.label).finish()
    }
}

// ============================================================
// Frame
// ============================================================

/// One active invocation.
pub struct Frame {
    name: &'static str,
    resources: SmallVec<[Resource; INLINE_RESOURCES]>,
}

impl Frame {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            resources: SmallVec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Labels of held resources, oldest first.
    pub fn resources(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.iter().map(Resource::label)
    }

    /// Release resources down to `keep`, newest first. Returns how many ran.
    fn release_to(&mut self, keep: usize) -> usize {
        let mut released = 0;
        while self.resources.len() > keep {
            let Some(resource) = self.resources.pop() else {
                break;
            };
            trace!(function = self.name, resource = resource.label, "release");
            resource.release();
            released += 1;
        }
        released
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("name", &self.name)
            .field("resources", &self.resources)
            .finish()
    }
}

// ============================================================
// CallStack
// ============================================================

/// Position on the stack a region can be unwound back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark {
    depth: usize,
    resources: usize,
}

impl ScopeMark {
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Stack of call frames. The root frame is never popped.
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new(root: &'static str) -> Self {
        Self {
            frames: vec![Frame::new(root)],
        }
    }

    pub fn push(&mut self, name: &'static str) {
        trace!(function = name, depth = self.frames.len(), "enter");
        self.frames.push(Frame::new(name));
    }

    /// Pop the top frame, releasing its resources. Returns how many were
    /// released. The root frame stays.
    pub fn pop(&mut self) -> usize {
        if self.frames.len() <= 1 {
            return 0;
        }
        match self.frames.pop() {
            Some(mut frame) => frame.release_to(0),
            None => 0,
        }
    }

    /// Register a resource on the top frame.
    pub fn defer(&mut self, resource: Resource) {
        if let Some(top) = self.frames.last_mut() {
            top.resources.push(resource);
        }
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark {
            depth: self.frames.len(),
            resources: self.frames.last().map_or(0, |f| f.resources.len()),
        }
    }

    /// Unwind back to `mark`: pop frames above it, then release resources the
    /// marked frame acquired after the mark. Returns how many were released.
    pub fn release_to(&mut self, mark: ScopeMark) -> usize {
        let mut released = 0;
        while self.frames.len() > mark.depth.max(1) {
            released += self.pop();
        }
        if self.frames.len() == mark.depth {
            if let Some(top) = self.frames.last_mut() {
                released += top.release_to(mark.resources);
            }
        }
        released
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Function names, outermost first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.frames.iter().map(Frame::name)
    }

    pub fn current_name(&self) -> &'static str {
        self.frames.last().map_or("", Frame::name)
    }
}

impl Drop for CallStack {
    fn drop(&mut self) {
        while let Some(mut frame) = self.frames.pop() {
            frame.release_to(0);
        }
    }
}
