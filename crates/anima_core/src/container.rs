//! Node container and builder
//!
//! The [`Container`] owns every node in a single arena and hands out
//! [`Anim`] handles. Handles are plain keys: they are cheap to copy, never
//! own anything, and can only be evaluated together with the container that
//! issued them. Dropping the container releases the whole arena at once.
//!
//! # Example
//!
//! ```
//! use anima_core::{action, children, Container};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let x = Rc::new(Cell::new(0.0));
//! let sink = x.clone();
//!
//! let mut anim = Container::<f64>::new();
//! let fade = anim.between(0.5, 1.5, action(move |t: f64| sink.set(t)));
//! let root = anim.parallel(children![fade]);
//!
//! // A single child is returned as-is instead of being wrapped
//! assert_eq!(root, fade);
//!
//! root.play_simple(&anim, 1.0);
//! assert_eq!(x.get(), 0.5);
//! ```
//!
//! # Threading
//!
//! Containers are neither `Send` nor `Sync`: host callbacks are not required
//! to be thread-safe, so a tree can only be built and evaluated on the thread
//! that owns it.

use smallvec::SmallVec;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::child::Child;
use crate::error::{AnimaError, Result};
use crate::node::{play_key, Arena, ChildKeys, Node, NodeKey, NodeKind};
use crate::time::TimeValue;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    fn next() -> Self {
        ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Handle to a node owned by a [`Container`]
///
/// Handles never own their node; the node lives until its container is
/// dropped.
pub struct Anim<T> {
    key: NodeKey,
    owner: ContainerId,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Anim<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Anim<T> {}

impl<T> PartialEq for Anim<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.owner == other.owner
    }
}

impl<T> Eq for Anim<T> {}

impl<T> std::hash::Hash for Anim<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.owner.hash(state);
    }
}

impl<T> fmt::Debug for Anim<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anim")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .finish()
    }
}

// A single handle can be passed wherever a child list is expected.
impl<T> IntoIterator for Anim<T> {
    type Item = Anim<T>;
    type IntoIter = std::iter::Once<Anim<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self)
    }
}

impl<T> Anim<T> {
    /// Arena key of the node
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Identity of the container that issued this handle
    pub fn owner(&self) -> ContainerId {
        self.owner
    }
}

impl<T: TimeValue> Anim<T> {
    /// Evaluate the node at `t` with previous position `t0`
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by another container.
    pub fn play(self, container: &Container<T>, t: T, t0: T) {
        container.play(self, t, t0);
    }

    /// Evaluate the node at `t` with `t0 == t`
    ///
    /// No edge can be observed this way, so `Event` nodes below never fire.
    pub fn play_simple(self, container: &Container<T>, t: T) {
        container.play(self, t, t);
    }
}

/// A node handle bound to its container
///
/// Borrowing the container keeps the arena alive for as long as the
/// reference exists.
pub struct NodeRef<'c, T> {
    container: &'c Container<T>,
    key: NodeKey,
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<'c, T: TimeValue> NodeRef<'c, T> {
    pub fn play(&self, t: T, t0: T) {
        play_key(&self.container.nodes, self.key, t, t0);
    }

    /// Same as `play(t, t)`; disables edge detection below this node
    pub fn play_simple(&self, t: T) {
        self.play(t, t);
    }

    pub fn handle(&self) -> Anim<T> {
        self.container.handle(self.key)
    }

    pub fn kind(&self) -> NodeKind {
        self.container.nodes[self.key].kind()
    }
}

impl<T: TimeValue> fmt::Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key)
            .field("node", &self.container.nodes[self.key])
            .finish()
    }
}

/// Construction-time settings for a container
#[derive(Clone, Debug, Default)]
pub struct ContainerConfig {
    /// Number of nodes to reserve up front
    pub capacity: usize,
    /// Name used in log output
    pub label: Option<String>,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Statistics about the nodes in a container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// `ActionVoid` and `ActionTime` nodes
    pub leaf_count: usize,
    /// `After`, `Before` and `Between` nodes
    pub gate_count: usize,
    /// `Seek`, `Stretch` and `TimeTransform` nodes
    pub remap_count: usize,
    pub event_count: usize,
    pub parallel_count: usize,
}

impl ContainerStats {
    pub fn total(&self) -> usize {
        self.leaf_count
            + self.gate_count
            + self.remap_count
            + self.event_count
            + self.parallel_count
    }
}

/// Owner of every node built through it
pub struct Container<T> {
    id: ContainerId,
    label: Option<String>,
    nodes: Arena<T>,
}

impl<T: TimeValue> Container<T> {
    /// Create an empty container
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Create an empty container with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(ContainerConfig::new().capacity(capacity))
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        let id = ContainerId::next();
        tracing::debug!(
            container = id.0,
            label = config.label.as_deref().unwrap_or(""),
            capacity = config.capacity,
            "container created"
        );
        Self {
            id,
            label: config.label,
            nodes: Arena::with_capacity_and_key(config.capacity),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    // =========================================================================
    // BUILDER
    // =========================================================================

    /// Wrap a callback receiving the position into a leaf node
    pub fn action(&mut self, f: impl FnMut(T) + 'static) -> Anim<T> {
        let key = self.insert(Node::action(f));
        self.handle(key)
    }

    /// Wrap a callback ignoring the position into a leaf node
    pub fn trigger(&mut self, f: impl FnMut() + 'static) -> Anim<T> {
        let key = self.insert(Node::trigger(f));
        self.handle(key)
    }

    /// Group children so they run together, in the given order
    ///
    /// A single child is returned directly without an extra parallel node.
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn parallel<I>(&mut self, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let key = self.normalize(children);
        self.handle(key)
    }

    /// Create a parallel node with no children, to be grown with [`add`](Self::add)
    pub fn parallel_empty(&mut self) -> Anim<T> {
        let key = self.insert(Node::Parallel {
            children: ChildKeys::new(),
        });
        self.handle(key)
    }

    /// Run children while `start <= t < finish`, with local time measured from `start`
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn between<I>(&mut self, start: T, finish: T, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::Between {
            start,
            finish,
            child,
        })
    }

    /// Run children while `t < finish`, with local time measured from `finish`
    ///
    /// Local time is therefore negative while the children run.
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn before<I>(&mut self, finish: T, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::Before { finish, child })
    }

    /// Run children while `t >= start`, with local time measured from `start`
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn after<I>(&mut self, start: T, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::After { start, child })
    }

    /// Run children once whenever the sampled interval crosses `moment`
    ///
    /// Crossing is detected from `t0` to `t` in either direction, and the
    /// children receive the positions unchanged. Evaluating with `t0 == t`
    /// never fires.
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn event<I>(&mut self, moment: T, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::Event { moment, child })
    }

    /// Run children with positions multiplied by `scale`
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn stretch<I>(&mut self, scale: T, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::Stretch { scale, child })
    }

    /// Run children with positions shifted forward by `skip`
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn seek<I>(&mut self, skip: T, children: I) -> Anim<T>
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::Seek { skip, child })
    }

    /// Run children with both positions passed through `transform`
    ///
    /// # Panics
    ///
    /// Panics if a child handle was issued by another container.
    pub fn time_transform<F, I>(&mut self, transform: F, children: I) -> Anim<T>
    where
        F: Fn(T) -> T + 'static,
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let child = self.normalize(children);
        self.wrap(Node::TimeTransform {
            transform: Box::new(transform),
            child,
        })
    }

    /// Append a child to an existing parallel node
    ///
    /// The child runs after every child already present. Fails if `parallel`
    /// is not a parallel node, if either handle does not belong to this
    /// container, or if `parallel` is reachable from the child.
    ///
    /// Returns the handle of the appended child, which is a new leaf when a
    /// callback was passed.
    pub fn add(&mut self, parallel: Anim<T>, child: impl Into<Child<T>>) -> Result<Anim<T>> {
        let target = self.check_reported(parallel)?;
        let kind = self.nodes[target].kind();
        if kind != NodeKind::Parallel {
            tracing::warn!(%kind, "rejected add to non-parallel node");
            return Err(AnimaError::NotParallel { kind });
        }

        let child_key = match child.into() {
            Child::Node(anim) => {
                let key = self.check_reported(anim)?;
                if self.reaches(key, target) {
                    tracing::warn!("rejected add that would create a cycle");
                    return Err(AnimaError::Cycle);
                }
                key
            }
            Child::Action(f) => self.insert(Node::ActionTime(f.into())),
            Child::Trigger(f) => self.insert(Node::ActionVoid(f.into())),
        };

        if let Some(Node::Parallel { children }) = self.nodes.get_mut(target) {
            children.push(child_key);
            tracing::debug!(children = children.len(), "parallel grown");
        }
        Ok(self.handle(child_key))
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    /// Bind a handle to this container
    ///
    /// Returns `None` for handles issued by another container.
    pub fn node(&self, anim: Anim<T>) -> Option<NodeRef<'_, T>> {
        let key = self.check(anim).ok()?;
        Some(NodeRef {
            container: self,
            key,
        })
    }

    /// Evaluate `anim` at `t` with previous position `t0`
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by another container.
    pub fn play(&self, anim: Anim<T>, t: T, t0: T) {
        if let Err(err) = self.try_play(anim, t, t0) {
            panic!("cannot play node: {err}");
        }
    }

    /// Evaluate `anim`, reporting foreign or unknown handles as errors
    pub fn try_play(&self, anim: Anim<T>, t: T, t0: T) -> Result<()> {
        let key = self.check_reported(anim)?;
        play_key(&self.nodes, key, t, t0);
        Ok(())
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    /// Number of nodes owned by this container
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `anim` refers to a node of this container
    pub fn contains(&self, anim: Anim<T>) -> bool {
        self.check(anim).is_ok()
    }

    pub fn kind(&self, anim: Anim<T>) -> Option<NodeKind> {
        let key = self.check(anim).ok()?;
        Some(self.nodes[key].kind())
    }

    /// Direct children of `anim`, in evaluation order
    pub fn children(&self, anim: Anim<T>) -> Option<SmallVec<[Anim<T>; 4]>> {
        let key = self.check(anim).ok()?;
        Some(
            self.nodes[key]
                .child_keys()
                .into_iter()
                .map(|child| self.handle(child))
                .collect(),
        )
    }

    /// Get statistics about the nodes in this container
    pub fn stats(&self) -> ContainerStats {
        let mut stats = ContainerStats::default();
        for node in self.nodes.values() {
            let kind = node.kind();
            if kind.is_leaf() {
                stats.leaf_count += 1;
            } else if kind.is_gate() {
                stats.gate_count += 1;
            } else if kind.is_remap() {
                stats.remap_count += 1;
            } else if kind == NodeKind::Event {
                stats.event_count += 1;
            } else {
                stats.parallel_count += 1;
            }
        }
        stats
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn handle(&self, key: NodeKey) -> Anim<T> {
        Anim {
            key,
            owner: self.id,
            _marker: PhantomData,
        }
    }

    fn insert(&mut self, node: Node<T>) -> NodeKey {
        let kind = node.kind();
        let key = self.nodes.insert(node);
        tracing::trace!(?key, %kind, "node registered");
        key
    }

    fn wrap(&mut self, node: Node<T>) -> Anim<T> {
        let key = self.insert(node);
        self.handle(key)
    }

    /// Resolve a handle to its key without logging
    fn check(&self, anim: Anim<T>) -> Result<NodeKey> {
        if anim.owner != self.id {
            return Err(AnimaError::ForeignHandle {
                expected: self.id,
                found: anim.owner,
            });
        }
        if !self.nodes.contains_key(anim.key) {
            return Err(AnimaError::StaleHandle);
        }
        Ok(anim.key)
    }

    /// Resolve a handle on a path that fails or panics when it is invalid
    fn check_reported(&self, anim: Anim<T>) -> Result<NodeKey> {
        self.check(anim).map_err(|err| {
            tracing::warn!(
                container = self.id.0,
                found = anim.owner.0,
                %err,
                "rejected handle"
            );
            err
        })
    }

    /// Turn one child specification into an arena key
    fn realize(&mut self, child: Child<T>) -> NodeKey {
        match child {
            Child::Node(anim) => match self.check_reported(anim) {
                Ok(key) => key,
                Err(err) => panic!("invalid child handle: {err}"),
            },
            Child::Action(f) => self.insert(Node::ActionTime(f.into())),
            Child::Trigger(f) => self.insert(Node::ActionVoid(f.into())),
        }
    }

    /// Turn a child list into a single key, grouping several into a parallel node
    fn normalize<I>(&mut self, children: I) -> NodeKey
    where
        I: IntoIterator,
        I::Item: Into<Child<T>>,
    {
        let mut keys: ChildKeys = children
            .into_iter()
            .map(|child| self.realize(child.into()))
            .collect();
        if keys.len() == 1 {
            return keys.remove(0);
        }
        self.insert(Node::Parallel { children: keys })
    }

    /// Whether `target` is `from` or one of its descendants
    fn reaches(&self, from: NodeKey, target: NodeKey) -> bool {
        let mut stack: SmallVec<[NodeKey; 16]> = smallvec::smallvec![from];
        while let Some(key) = stack.pop() {
            if key == target {
                return true;
            }
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.child_keys());
            }
        }
        false
    }
}

impl<T: TimeValue> Default for Container<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Container<T> {
    fn drop(&mut self) {
        tracing::debug!(
            container = self.id.0,
            label = self.label.as_deref().unwrap_or(""),
            nodes = self.nodes.len(),
            "container released"
        );
    }
}

impl<T: TimeValue> fmt::Debug for Container<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
