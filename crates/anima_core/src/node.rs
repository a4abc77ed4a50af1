//! Timeline nodes
//!
//! A closed set of node kinds evaluated by recursive descent over the
//! container's arena. Each evaluation receives the current position `t` and
//! the previous position `t0`:
//!
//! - Leaves (`ActionVoid`, `ActionTime`) invoke host callbacks unconditionally
//! - Gates (`After`, `Before`, `Between`) invoke their child only while the
//!   position lies inside their window, re-anchoring time at the boundary
//! - Remaps (`Seek`, `Stretch`, `TimeTransform`) always delegate with
//!   transformed positions
//! - `Event` delegates once when the interval `t0..t` crosses its moment
//! - `Parallel` fans out to every child in insertion order

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;

use crate::time::TimeValue;

new_key_type! {
    /// Arena key of a node
    pub struct NodeKey;
}

/// Storage for every node owned by a container
pub(crate) type Arena<T> = SlotMap<NodeKey, Node<T>>;

/// Host callback that ignores the position
pub type TriggerFn = Box<dyn FnMut()>;

/// Host callback that receives the local position
pub type ActionFn<T> = Box<dyn FnMut(T)>;

/// Position remapping function used by `TimeTransform`
pub type TransformFn<T> = Box<dyn Fn(T) -> T>;

/// Child list of a parallel node
pub(crate) type ChildKeys = SmallVec<[NodeKey; 4]>;

/// A single node in the arena
///
/// Child references are arena keys; the node never owns its children.
pub(crate) enum Node<T> {
    ActionVoid(RefCell<TriggerFn>),
    ActionTime(RefCell<ActionFn<T>>),
    After {
        start: T,
        child: NodeKey,
    },
    Before {
        finish: T,
        child: NodeKey,
    },
    Between {
        start: T,
        finish: T,
        child: NodeKey,
    },
    Seek {
        skip: T,
        child: NodeKey,
    },
    Event {
        moment: T,
        child: NodeKey,
    },
    Stretch {
        scale: T,
        child: NodeKey,
    },
    TimeTransform {
        transform: TransformFn<T>,
        child: NodeKey,
    },
    Parallel {
        children: ChildKeys,
    },
}

/// Kind of a node, without its parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ActionVoid,
    ActionTime,
    After,
    Before,
    Between,
    Seek,
    Event,
    Stretch,
    TimeTransform,
    Parallel,
}

impl NodeKind {
    /// Whether this kind wraps a host callback
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::ActionVoid | NodeKind::ActionTime)
    }

    /// Whether this kind invokes its child only while the position lies in a window
    pub fn is_gate(self) -> bool {
        matches!(self, NodeKind::After | NodeKind::Before | NodeKind::Between)
    }

    /// Whether this kind always delegates with transformed positions
    pub fn is_remap(self) -> bool {
        matches!(
            self,
            NodeKind::Seek | NodeKind::Stretch | NodeKind::TimeTransform
        )
    }

    /// Variant name, as used in log output
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::ActionVoid => "ActionVoid",
            NodeKind::ActionTime => "ActionTime",
            NodeKind::After => "After",
            NodeKind::Before => "Before",
            NodeKind::Between => "Between",
            NodeKind::Seek => "Seek",
            NodeKind::Event => "Event",
            NodeKind::Stretch => "Stretch",
            NodeKind::TimeTransform => "TimeTransform",
            NodeKind::Parallel => "Parallel",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the sampled interval `t0..t` crosses `moment`, in either direction
///
/// A forward crossing includes the moment at `t`; a backward crossing
/// includes it at `t` as well, so sampling exactly onto the moment fires
/// once and leaving it again does not fire a second time.
pub fn crosses<T: TimeValue>(moment: T, t: T, t0: T) -> bool {
    (moment <= t && t0 < moment) || (t <= moment && moment < t0)
}

impl<T: TimeValue> Node<T> {
    pub(crate) fn action(f: impl FnMut(T) + 'static) -> Self {
        Node::ActionTime(RefCell::new(Box::new(f)))
    }

    pub(crate) fn trigger(f: impl FnMut() + 'static) -> Self {
        Node::ActionVoid(RefCell::new(Box::new(f)))
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::ActionVoid(_) => NodeKind::ActionVoid,
            Node::ActionTime(_) => NodeKind::ActionTime,
            Node::After { .. } => NodeKind::After,
            Node::Before { .. } => NodeKind::Before,
            Node::Between { .. } => NodeKind::Between,
            Node::Seek { .. } => NodeKind::Seek,
            Node::Event { .. } => NodeKind::Event,
            Node::Stretch { .. } => NodeKind::Stretch,
            Node::TimeTransform { .. } => NodeKind::TimeTransform,
            Node::Parallel { .. } => NodeKind::Parallel,
        }
    }

    /// Keys of the direct children, in evaluation order
    pub(crate) fn child_keys(&self) -> ChildKeys {
        match self {
            Node::ActionVoid(_) | Node::ActionTime(_) => ChildKeys::new(),
            Node::After { child, .. }
            | Node::Before { child, .. }
            | Node::Between { child, .. }
            | Node::Seek { child, .. }
            | Node::Event { child, .. }
            | Node::Stretch { child, .. }
            | Node::TimeTransform { child, .. } => smallvec::smallvec![*child],
            Node::Parallel { children } => children.clone(),
        }
    }

    /// Evaluate this node at `t` with previous position `t0`
    ///
    /// Host callback panics propagate to the caller untouched.
    pub(crate) fn play(&self, arena: &Arena<T>, t: T, t0: T) {
        match self {
            Node::ActionVoid(f) => (*f.borrow_mut())(),
            Node::ActionTime(f) => (*f.borrow_mut())(t),
            Node::After { start, child } => {
                if *start <= t {
                    play_key(arena, *child, t - *start, t0 - *start);
                }
            }
            Node::Before { finish, child } => {
                if t < *finish {
                    play_key(arena, *child, t - *finish, t0 - *finish);
                }
            }
            Node::Between {
                start,
                finish,
                child,
            } => {
                if *start <= t && t < *finish {
                    play_key(arena, *child, t - *start, t0 - *start);
                }
            }
            Node::Seek { skip, child } => play_key(arena, *child, t + *skip, t0 + *skip),
            Node::Event { moment, child } => {
                if crosses(*moment, t, t0) {
                    tracing::trace!(moment = ?moment, t = ?t, t0 = ?t0, "event fired");
                    play_key(arena, *child, t, t0);
                }
            }
            Node::Stretch { scale, child } => play_key(arena, *child, t * *scale, t0 * *scale),
            Node::TimeTransform { transform, child } => {
                play_key(arena, *child, transform(t), transform(t0))
            }
            Node::Parallel { children } => {
                for child in children {
                    play_key(arena, *child, t, t0);
                }
            }
        }
    }
}

/// Evaluate the node stored under `key`
///
/// Keys held by nodes are never removed from their arena, so a miss can only
/// come from a key that was never inserted here and is ignored.
pub(crate) fn play_key<T: TimeValue>(arena: &Arena<T>, key: NodeKey, t: T, t0: T) {
    if let Some(node) = arena.get(key) {
        node.play(arena, t, t0);
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::ActionVoid(_) => f.write_str("ActionVoid"),
            Node::ActionTime(_) => f.write_str("ActionTime"),
            Node::After { start, child } => f
                .debug_struct("After")
                .field("start", start)
                .field("child", child)
                .finish(),
            Node::Before { finish, child } => f
                .debug_struct("Before")
                .field("finish", finish)
                .field("child", child)
                .finish(),
            Node::Between {
                start,
                finish,
                child,
            } => f
                .debug_struct("Between")
                .field("start", start)
                .field("finish", finish)
                .field("child", child)
                .finish(),
            Node::Seek { skip, child } => f
                .debug_struct("Seek")
                .field("skip", skip)
                .field("child", child)
                .finish(),
            Node::Event { moment, child } => f
                .debug_struct("Event")
                .field("moment", moment)
                .field("child", child)
                .finish(),
            Node::Stretch { scale, child } => f
                .debug_struct("Stretch")
                .field("scale", scale)
                .field("child", child)
                .finish(),
            Node::TimeTransform { child, .. } => f
                .debug_struct("TimeTransform")
                .field("child", child)
                .finish_non_exhaustive(),
            Node::Parallel { children } => f
                .debug_struct("Parallel")
                .field("children", children)
                .finish(),
        }
    }
}
