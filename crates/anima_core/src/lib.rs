//! Anima Core
//!
//! A composable timeline algebra: trees of nodes evaluated at positions
//! supplied by the host, with no internal clock or scheduler.
//!
//! - **Leaves**: host callbacks, with or without the local position
//! - **Gates**: `after`, `before` and `between` windows that re-anchor time
//! - **Remaps**: `seek`, `stretch` and arbitrary `time_transform`
//! - **Events**: fire once when the sampled interval `t0..t` crosses a moment
//! - **Parallel**: run several children in insertion order
//! - **Container**: owns every node in one arena and hands out `Copy` handles
//!
//! Evaluation is synchronous recursive descent. `play(t, t0)` threads the
//! previous position through the tree so events can detect crossings;
//! `play_simple(t)` is `play(t, t)` and therefore never fires events.
//!
//! # Example
//!
//! ```rust
//! use anima_core::{action, children, trigger, Container, Playhead};
//! use std::cell::{Cell, RefCell};
//! use std::rc::Rc;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let x = Rc::new(Cell::new(0.0));
//!
//! let mut anim = Container::<f64>::new();
//!
//! let sink = x.clone();
//! let slide = anim.between(1.0, 3.0, action(move |t: f64| sink.set(t)));
//!
//! let events = log.clone();
//! let halfway = anim.event(2.0, trigger(move || events.borrow_mut().push("halfway")));
//!
//! let root = anim.parallel(children![slide, halfway]);
//!
//! let mut head = Playhead::new(0.0);
//! head.advance_to(&anim, root, 1.5);
//! assert_eq!(x.get(), 0.5);
//! assert!(log.borrow().is_empty());
//!
//! head.advance_to(&anim, root, 2.5);
//! assert_eq!(x.get(), 1.5);
//! assert_eq!(*log.borrow(), vec!["halfway"]);
//! ```

pub mod child;
pub mod container;
pub mod error;
pub mod node;
pub mod playhead;
pub mod time;

pub use child::{action, trigger, Child};
pub use container::{Anim, Container, ContainerConfig, ContainerId, ContainerStats, NodeRef};
pub use error::{AnimaError, Result};
pub use node::{crosses, NodeKey, NodeKind};
pub use playhead::Playhead;
pub use time::TimeValue;
