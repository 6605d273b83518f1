//! WOOT: a sequence CRDT without operational transformation.
//!
//! Every character remembers the identifiers of the two characters it was
//! inserted between. A remote insertion is integrated once both neighbours
//! are present; concurrent insertions between the same neighbours are
//! ordered by their identifiers. Operations whose neighbours have not
//! arrived yet wait in a causal pool.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use seqcrdt::prelude::*;
//! use seqcrdt::woot;
//!
//! let outbox = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&outbox);
//! let mut alice = woot::Document::new(0, move |ops| sink.borrow_mut().extend(ops));
//! let mut bob = woot::Document::new(1, |_| {});
//!
//! alice.insert("hello", 0);
//! bob.apply_operations(&outbox.borrow());
//! assert_eq!(bob.to_string(), "hello");
//! ```

mod character;
mod document;
mod id;
mod operation;
mod sequence;

pub use character::Char;
pub use document::Document;
pub use id::Id;
pub use operation::{Operation, OperationKind};
pub use sequence::Sequence;
