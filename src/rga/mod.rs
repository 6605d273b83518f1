//! RGA over chunks: a linked list of text runs with a split tree.
//!
//! An insertion carries a whole run of text and a five-part [`Key`]:
//! replica, session, the sum of the issuing replica's vector clock, and the
//! offset and length of the slice it names. A run that is later cut by an
//! insertion or a partial deletion keeps its identity: its pieces hang below
//! it in a split tree, so operations that still name the original run are
//! routed to the right piece.
//!
//! Concurrent runs anchored at the same character are ordered by their keys,
//! newest first, and a run is never interleaved with another. Operations
//! naming runs this replica has not seen yet wait in a pending list.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use seqcrdt::prelude::*;
//! use seqcrdt::rga;
//!
//! let outbox = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&outbox);
//! let mut alice = rga::Document::new(0, move |ops| sink.borrow_mut().extend(ops));
//! let mut bob = rga::Document::new(1, |_| {});
//!
//! alice.insert("the cat", 0);
//! alice.replace("the dog");
//! bob.apply_operations(&outbox.borrow());
//! assert_eq!(bob.to_string(), "the dog");
//! ```

mod chunk;
pub mod diff;
mod document;
mod key;
mod operation;
mod tree;
mod vector_clock;
mod view;

pub use document::{Document, DEFAULT_SESSION};
pub use key::{ChunkId, Key};
pub use operation::{Operation, OperationKind, Payload};
pub use tree::Tree;
pub use vector_clock::VectorClock;
pub use view::View;
