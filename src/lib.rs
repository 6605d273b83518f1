//! # seqcrdt
//!
//! Sequence CRDTs for collaboratively edited plain text.
//!
//! Each replica edits its own copy of a document and hands the resulting
//! operations to a dispatch callback. Other replicas replay them in any
//! order, with any delay and any number of times, and every replica that
//! received the same operations renders the same text.
//!
//! ## Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use seqcrdt::prelude::*;
//!
//! let outbox = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&outbox);
//! let mut local = woot::Document::new(0, move |ops| sink.borrow_mut().extend(ops));
//! let mut remote = woot::Document::new(1, |_| {});
//!
//! local.insert("hello", 0);
//! remote.apply_operations(&outbox.borrow());
//! assert_eq!(remote.to_string(), "hello");
//! ```
//!
//! ## Available CRDTs
//!
//! - [`woot`] - Characters linked to their neighbours at insertion time,
//!   integrated once both neighbours are known.
//! - [`logoot`] - Characters placed by dense, totally ordered position
//!   identifiers stored in a trie.
//! - [`rga`] - Runs of text in a linked list, split on demand and
//!   addressed through a split tree.
//!
//! ## The `Crdt` Trait
//!
//! All documents implement the [`Crdt`] trait: `insert` and `delete` at
//! visible indices, `apply_operations` for remote edits, and [`Display`]
//! for the current text.
//!
//! ## Features
//!
//! - `serde` (default): JSON wire format for operations.
//! - `wasm`: JavaScript bindings through `wasm-bindgen`.
//!
//! [`Display`]: core::fmt::Display

#![warn(missing_docs)]

mod crdt;
mod error;
#[cfg(feature = "wasm")]
mod wasm;

pub mod logoot;
pub mod prelude;
pub mod rga;
pub mod woot;

pub use crdt::{Crdt, Dispatch, ReplicaId};
pub use error::{Error, Result};
