//! Convenient re-exports for common usage.
//!
//! ```
//! use seqcrdt::prelude::*;
//! ```

pub use crate::{logoot, rga, woot};
pub use crate::{Crdt, ReplicaId};
