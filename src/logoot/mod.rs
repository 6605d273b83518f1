//! Logoot: a sequence CRDT built on dense position identifiers.
//!
//! Every character owns a position, a path of [`Id`] segments that is
//! compared lexicographically. A new character receives a fresh path
//! strictly between its neighbours, so remote insertions commute and need
//! no causal delivery. Paths are stored in a trie whose nodes cache the
//! number of visible characters below them, which turns a visible index
//! into a path in time proportional to the depth.
//!
//! A deletion that overtakes the insertion it targets is remembered in a
//! delete queue; the insertion is dropped when it arrives.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use seqcrdt::prelude::*;
//! use seqcrdt::logoot;
//!
//! let outbox = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&outbox);
//! let mut alice = logoot::Document::new(0, move |ops| sink.borrow_mut().extend(ops));
//! let mut bob = logoot::Document::new(1, |_| {});
//!
//! alice.insert("hello", 0);
//! alice.delete(0, 1);
//! bob.apply_operations(&outbox.borrow());
//! assert_eq!(bob.to_string(), "ello");
//! ```

mod document;
mod id;
mod node;
mod operation;
mod position;
mod tree;

pub use document::Document;
pub use id::{Id, BASE, MAX, MIN};
pub use operation::{Operation, OperationKind};
pub use position::{doubled_base, PositionGenerator, BIAS};
pub use tree::Tree;
