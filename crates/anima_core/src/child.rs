//! Child specifications accepted by the container builder
//!
//! Builder calls take any mix of existing node handles and host callbacks.
//! Each element is described by a [`Child`], which the container turns into a
//! node before grouping:
//!
//! ```ignore
//! use anima_core::{action, children, trigger};
//!
//! let root = anim.between(0.0, 10.0, children![
//!     intro,
//!     action(|t: f64| println!("local time {t}")),
//!     trigger(|| println!("tick")),
//! ]);
//! ```

use std::fmt;

use crate::container::Anim;
use crate::node::{ActionFn, TriggerFn};

/// One element of a builder argument list
pub enum Child<T> {
    /// An existing node owned by the same container
    Node(Anim<T>),
    /// A callback receiving the local position
    Action(ActionFn<T>),
    /// A callback ignoring the position
    Trigger(TriggerFn),
}

impl<T> Child<T> {
    pub fn action(f: impl FnMut(T) + 'static) -> Self {
        Child::Action(Box::new(f))
    }

    pub fn trigger(f: impl FnMut() + 'static) -> Self {
        Child::Trigger(Box::new(f))
    }
}

/// Wrap a callback receiving the local position
pub fn action<T>(f: impl FnMut(T) + 'static) -> Child<T> {
    Child::action(f)
}

/// Wrap a callback that ignores the position
pub fn trigger<T>(f: impl FnMut() + 'static) -> Child<T> {
    Child::trigger(f)
}

impl<T> From<Anim<T>> for Child<T> {
    fn from(anim: Anim<T>) -> Self {
        Child::Node(anim)
    }
}

// A single child can be passed wherever a list is expected.
impl<T> IntoIterator for Child<T> {
    type Item = Child<T>;
    type IntoIter = std::iter::Once<Child<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self)
    }
}

impl<T> fmt::Debug for Child<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Node(anim) => f.debug_tuple("Node").field(anim).finish(),
            Child::Action(_) => f.write_str("Action"),
            Child::Trigger(_) => f.write_str("Trigger"),
        }
    }
}

/// Build a `Vec<Child<T>>` from a heterogeneous list of handles and children
///
/// Every element is converted with `Child::from`, so node handles and values
/// produced by [`action`](crate::action) / [`trigger`](crate::trigger) can
/// be mixed freely.
#[macro_export]
macro_rules! children {
    ($($child:expr),* $(,)?) => {
        ::std::vec![$($crate::Child::from($child)),*]
    };
}
