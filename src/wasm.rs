//! WebAssembly bindings for seqcrdt.
//!
//! Enable with the `wasm` feature:
//!
//! ```toml
//! [dependencies]
//! seqcrdt = { version = "0.1", features = ["wasm"] }
//! ```
//!
//! Every document is exposed as a JavaScript class. Operations cross the
//! boundary as JSON: local edits return the batch they produced, and
//! `applyOperations` takes a JSON array of remote operations. The optional
//! `onDispatch` callback receives each non-empty batch as well.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{logoot, rga, woot, Crdt, ReplicaId};

type Outbox<O> = Rc<RefCell<Vec<O>>>;

/// A document whose dispatched operations are collected for JavaScript.
struct Bridge<D: Crdt> {
    document: D,
    outbox: Outbox<D::Operation>,
    on_dispatch: Option<Function>,
}

impl<D> Bridge<D>
where
    D: Crdt,
    D::Operation: Serialize + 'static,
{
    fn new(
        on_dispatch: Option<Function>,
        build: impl FnOnce(Box<dyn FnMut(Vec<D::Operation>)>) -> D,
    ) -> Self {
        let outbox: Outbox<D::Operation> = Rc::default();
        let sink = Rc::clone(&outbox);
        let document = build(Box::new(move |ops| sink.borrow_mut().extend(ops)));
        Self {
            document,
            outbox,
            on_dispatch,
        }
    }

    fn edit(&mut self, edit: impl FnOnce(&mut D)) -> Result<String, JsError> {
        edit(&mut self.document);
        let batch: Vec<D::Operation> = self.outbox.borrow_mut().drain(..).collect();
        let json = serde_json::to_string(&batch).map_err(crate::Error::from)?;
        match &self.on_dispatch {
            Some(on_dispatch) if !batch.is_empty() => {
                on_dispatch
                    .call1(&JsValue::NULL, &JsValue::from_str(&json))
                    .map_err(|_| JsError::new("onDispatch callback threw"))?;
            }
            _ => {}
        }
        Ok(json)
    }

    fn apply(
        &mut self,
        json: &str,
        decode: fn(&str) -> crate::Result<D::Operation>,
    ) -> Result<(), JsError> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(json).map_err(crate::Error::from)?;
        let operations = values
            .iter()
            .map(|value| decode(&value.to_string()))
            .collect::<crate::Result<Vec<_>>>()?;
        self.document.apply_operations(&operations);
        Ok(())
    }
}

// ── WOOT ────────────────────────────────────────────────────────────

/// A WOOT document for use from JavaScript.
#[wasm_bindgen(js_name = WootDocument)]
pub struct WasmWootDocument {
    inner: Bridge<woot::Document>,
}

#[wasm_bindgen(js_class = WootDocument)]
impl WasmWootDocument {
    /// Create an empty document for the given replica.
    #[wasm_bindgen(constructor)]
    pub fn new(replica_id: ReplicaId, on_dispatch: Option<Function>) -> Self {
        Self {
            inner: Bridge::new(on_dispatch, |dispatch| {
                woot::Document::new(replica_id, dispatch)
            }),
        }
    }

    /// Insert text at a visible index. Returns the dispatched batch.
    pub fn insert(&mut self, text: &str, position: usize) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.insert(text, position))
    }

    /// Delete a visible range. Returns the dispatched batch.
    pub fn delete(&mut self, position: usize, length: usize) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.delete(position, length))
    }

    /// Replay a JSON array of remote operations.
    #[wasm_bindgen(js_name = applyOperations)]
    pub fn apply_operations(&mut self, json: &str) -> Result<(), JsError> {
        self.inner.apply(json, woot::Operation::from_json)
    }

    /// Get the current visible text.
    #[wasm_bindgen(js_name = toString)]
    pub fn to_string_js(&self) -> String {
        self.inner.document.to_string()
    }

    /// Get the number of visible characters.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.document.len()
    }

    /// Identifier of this replica.
    #[wasm_bindgen(getter, js_name = replicaId)]
    pub fn replica_id(&self) -> ReplicaId {
        self.inner.document.replica_id()
    }
}

// ── Logoot ──────────────────────────────────────────────────────────

/// A Logoot document for use from JavaScript.
#[wasm_bindgen(js_name = LogootDocument)]
pub struct WasmLogootDocument {
    inner: Bridge<logoot::Document>,
}

#[wasm_bindgen(js_class = LogootDocument)]
impl WasmLogootDocument {
    /// Create an empty document. A `seed` makes position allocation
    /// reproducible.
    #[wasm_bindgen(constructor)]
    pub fn new(replica_id: ReplicaId, seed: Option<u32>, on_dispatch: Option<Function>) -> Self {
        Self {
            inner: Bridge::new(on_dispatch, |dispatch| match seed {
                Some(seed) => logoot::Document::with_seed(replica_id, u64::from(seed), dispatch),
                None => logoot::Document::new(replica_id, dispatch),
            }),
        }
    }

    /// Insert text at a visible index. Returns the dispatched batch.
    pub fn insert(&mut self, text: &str, position: usize) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.insert(text, position))
    }

    /// Delete a visible range. Returns the dispatched batch.
    pub fn delete(&mut self, position: usize, length: usize) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.delete(position, length))
    }

    /// Replay a JSON array of remote operations.
    #[wasm_bindgen(js_name = applyOperations)]
    pub fn apply_operations(&mut self, json: &str) -> Result<(), JsError> {
        self.inner.apply(json, logoot::Operation::from_json)
    }

    /// Get the current visible text.
    #[wasm_bindgen(js_name = toString)]
    pub fn to_string_js(&self) -> String {
        self.inner.document.to_string()
    }

    /// Get the number of visible characters.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.document.len()
    }

    /// Identifier of this replica.
    #[wasm_bindgen(getter, js_name = replicaId)]
    pub fn replica_id(&self) -> ReplicaId {
        self.inner.document.replica_id()
    }
}

// ── RGA ─────────────────────────────────────────────────────────────

/// An RGA document for use from JavaScript.
#[wasm_bindgen(js_name = RgaDocument)]
pub struct WasmRgaDocument {
    inner: Bridge<rga::Document>,
}

#[wasm_bindgen(js_class = RgaDocument)]
impl WasmRgaDocument {
    /// Create an empty document, optionally in a given session.
    #[wasm_bindgen(constructor)]
    pub fn new(replica_id: ReplicaId, session: Option<u32>, on_dispatch: Option<Function>) -> Self {
        let session = session.unwrap_or(rga::DEFAULT_SESSION);
        Self {
            inner: Bridge::new(on_dispatch, |dispatch| {
                rga::Document::with_session(replica_id, session, dispatch)
            }),
        }
    }

    /// Insert text at a visible index. Returns the dispatched batch.
    pub fn insert(&mut self, text: &str, position: usize) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.insert(text, position))
    }

    /// Delete a visible range. Returns the dispatched batch.
    pub fn delete(&mut self, position: usize, length: usize) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.delete(position, length))
    }

    /// Replace the whole text, sending only the changed range.
    pub fn replace(&mut self, text: &str) -> Result<String, JsError> {
        self.inner.edit(|doc| doc.replace(text))
    }

    /// Replay a JSON array of remote operations.
    #[wasm_bindgen(js_name = applyOperations)]
    pub fn apply_operations(&mut self, json: &str) -> Result<(), JsError> {
        self.inner.apply(json, rga::Operation::from_json)
    }

    /// Get the current visible text.
    #[wasm_bindgen(js_name = toString)]
    pub fn to_string_js(&self) -> String {
        self.inner.document.to_string()
    }

    /// Get the number of visible characters.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.document.len()
    }

    /// Identifier of this replica.
    #[wasm_bindgen(getter, js_name = replicaId)]
    pub fn replica_id(&self) -> ReplicaId {
        self.inner.document.replica_id()
    }
}
