//! Property-based tests for the sequence CRDTs.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use seqcrdt::prelude::*;
use seqcrdt::rga::diff::diff;

// =============================================================================
// Test helpers
// =============================================================================

#[derive(Clone, Debug)]
enum Edit {
    Insert { at: f64, text: String },
    Delete { at: f64, len: usize },
}

fn arbitrary_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0.0..=1.0f64, "[a-zé]{1,6}").prop_map(|(at, text)| Edit::Insert { at, text }),
        2 => (0.0..=1.0f64, 1..5usize).prop_map(|(at, len)| Edit::Delete { at, len }),
    ]
}

/// Apply `edit` to a document and to a plain character vector.
fn apply<D: Crdt>(doc: &mut D, model: &mut Vec<char>, edit: &Edit) {
    let len = model.len();
    match edit {
        Edit::Insert { at, text } => {
            let position = ((*at * len as f64) as usize).min(len);
            doc.insert(text, position);
            model.splice(position..position, text.chars());
        }
        Edit::Delete { at, len: count } => {
            if len == 0 {
                return;
            }
            let position = ((*at * len as f64) as usize).min(len - 1);
            doc.delete(position, *count);
            let end = (position + count).min(len);
            model.drain(position..end);
        }
    }
}

#[derive(Clone, Debug)]
enum Step {
    Edit(usize, Edit),
    /// Hand everything `from` sent so far to `to`.
    Deliver { from: usize, to: usize },
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0..3usize, arbitrary_edit()).prop_map(|(replica, edit)| Step::Edit(replica, edit)),
        2 => (0..3usize, 0..3usize).prop_map(|(from, to)| Step::Deliver { from, to }),
    ]
}

type Outbox<O> = Rc<RefCell<Vec<Vec<O>>>>;

/// Apply the batches of `from` that `to` has not seen yet.
fn catch_up<D: Crdt>(
    replicas: &mut [(D, Outbox<D::Operation>)],
    delivered: &mut [Vec<usize>],
    from: usize,
    to: usize,
) where
    D::Operation: Clone,
{
    if from == to {
        return;
    }
    let batches: Vec<Vec<D::Operation>> =
        replicas[from].1.borrow()[delivered[to][from]..].to_vec();
    delivered[to][from] += batches.len();
    for batch in &batches {
        replicas[to].0.apply_operations(batch);
    }
}

/// Every local edit splices the text its replica currently shows, however
/// little of the other replicas' work has reached it.
fn splices_after_partial_delivery<D: Crdt>(
    mut replicas: Vec<(D, Outbox<D::Operation>)>,
    steps: &[Step],
) -> Result<(), TestCaseError>
where
    D::Operation: Clone,
{
    let size = replicas.len();
    let mut delivered = vec![vec![0; size]; size];
    for step in steps {
        match step {
            Step::Edit(replica, edit) => {
                let doc = &mut replicas[*replica].0;
                let mut model: Vec<char> = doc.to_string().chars().collect();
                apply(doc, &mut model, edit);
                prop_assert_eq!(doc.to_string(), model.iter().collect::<String>());
            }
            Step::Deliver { from, to } => catch_up(&mut replicas, &mut delivered, *from, *to),
        }
    }
    for to in 0..size {
        for from in 0..size {
            catch_up(&mut replicas, &mut delivered, from, to);
        }
    }
    let expected = replicas[0].0.to_string();
    for (doc, _) in &replicas {
        prop_assert_eq!(doc.to_string(), expected.clone());
    }
    Ok(())
}

fn with_outbox<D, O: 'static>(
    build: impl FnOnce(Box<dyn FnMut(Vec<O>)>) -> D,
) -> (D, Rc<RefCell<Vec<Vec<O>>>>) {
    let outbox: Rc<RefCell<Vec<Vec<O>>>> = Rc::default();
    let sink = Rc::clone(&outbox);
    (build(Box::new(move |ops| sink.borrow_mut().push(ops))), outbox)
}

fn woot_doc(replica_id: ReplicaId) -> (woot::Document, Rc<RefCell<Vec<Vec<woot::Operation>>>>) {
    with_outbox(|dispatch| woot::Document::new(replica_id, dispatch))
}

fn logoot_doc(
    replica_id: ReplicaId,
) -> (logoot::Document, Rc<RefCell<Vec<Vec<logoot::Operation>>>>) {
    with_outbox(|dispatch| logoot::Document::with_seed(replica_id, 99, dispatch))
}

fn rga_doc(replica_id: ReplicaId) -> (rga::Document, Rc<RefCell<Vec<Vec<rga::Operation>>>>) {
    with_outbox(|dispatch| rga::Document::new(replica_id, dispatch))
}

/// Each replica edits on its own, then receives every other replica's
/// batches in a random order.
fn converges<D: Crdt>(
    mut replicas: Vec<(D, Rc<RefCell<Vec<Vec<D::Operation>>>>)>,
    edits: &[Vec<Edit>],
    seed: u64,
) -> Result<(), TestCaseError>
where
    D::Operation: Clone,
{
    for ((doc, _), edits) in replicas.iter_mut().zip(edits) {
        let mut model: Vec<char> = doc.to_string().chars().collect();
        for edit in edits {
            apply(doc, &mut model, edit);
        }
    }
    let batches: Vec<Vec<Vec<D::Operation>>> = replicas
        .iter()
        .map(|(_, outbox)| outbox.borrow().clone())
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    for (replica, (doc, _)) in replicas.iter_mut().enumerate() {
        let mut incoming: Vec<&Vec<D::Operation>> = batches
            .iter()
            .enumerate()
            .filter(|(sender, _)| *sender != replica)
            .flat_map(|(_, sent)| sent.iter())
            .collect();
        incoming.shuffle(&mut rng);
        for batch in incoming {
            doc.apply_operations(batch);
        }
    }

    let expected = replicas[0].0.to_string();
    for (doc, _) in &replicas {
        prop_assert_eq!(doc.to_string(), expected.clone());
    }
    Ok(())
}

// =============================================================================
// Sequential editing
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A lone replica behaves like a string being spliced.
    #[test]
    fn woot_matches_string_splicing(edits in prop::collection::vec(arbitrary_edit(), 1..40)) {
        let (mut doc, _) = woot_doc(0);
        let mut model = Vec::new();
        for edit in &edits {
            apply(&mut doc, &mut model, edit);
            prop_assert_eq!(doc.to_string(), model.iter().collect::<String>());
            prop_assert_eq!(doc.len(), model.len());
        }
    }

    #[test]
    fn logoot_matches_string_splicing(edits in prop::collection::vec(arbitrary_edit(), 1..40)) {
        let (mut doc, _) = logoot_doc(0);
        let mut model = Vec::new();
        for edit in &edits {
            apply(&mut doc, &mut model, edit);
            prop_assert_eq!(doc.to_string(), model.iter().collect::<String>());
            prop_assert_eq!(doc.len(), model.len());
        }
    }

    #[test]
    fn rga_matches_string_splicing(edits in prop::collection::vec(arbitrary_edit(), 1..40)) {
        let (mut doc, _) = rga_doc(0);
        let mut model = Vec::new();
        for edit in &edits {
            apply(&mut doc, &mut model, edit);
            prop_assert_eq!(doc.to_string(), model.iter().collect::<String>());
            prop_assert_eq!(doc.len(), model.len());
        }
    }

    /// Replaying a replica's batches elsewhere reproduces its text.
    #[test]
    fn rga_replace_replays_remotely(
        texts in prop::collection::vec("[ab ]{0,12}", 1..10),
    ) {
        let (mut doc, outbox) = rga_doc(0);
        let (mut replay, _) = rga_doc(1);
        for text in &texts {
            doc.replace(text);
            prop_assert_eq!(doc.to_string(), text.clone());
        }
        for batch in outbox.borrow().iter() {
            prop_assert!(batch.len() <= 2);
            replay.apply_operations(batch);
        }
        prop_assert_eq!(replay.to_string(), doc.to_string());
    }

    /// Whatever the cursor, the reported edit turns the old text into the new.
    #[test]
    fn diff_reconstructs_new_text(old in "[abc]{0,10}", new in "[abc]{0,10}", cursor in 0..12usize) {
        let edit = diff(&old, &new, cursor);
        let old: Vec<char> = old.chars().collect();
        prop_assert!(edit.start <= edit.end && edit.end <= old.len());
        let rebuilt: String = old[..edit.start]
            .iter()
            .copied()
            .chain(edit.inserted.chars())
            .chain(old[edit.end..].iter().copied())
            .collect();
        prop_assert_eq!(rebuilt, new);
    }
}

// =============================================================================
// Convergence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn woot_converges_under_any_delivery_order(
        edits in prop::collection::vec(prop::collection::vec(arbitrary_edit(), 0..12), 3),
        seed in any::<u64>(),
    ) {
        converges((0..3).map(woot_doc).collect(), &edits, seed)?;
    }

    #[test]
    fn logoot_converges_under_any_delivery_order(
        edits in prop::collection::vec(prop::collection::vec(arbitrary_edit(), 0..12), 3),
        seed in any::<u64>(),
    ) {
        converges((0..3).map(logoot_doc).collect(), &edits, seed)?;
    }

    #[test]
    fn rga_converges_under_any_delivery_order(
        edits in prop::collection::vec(prop::collection::vec(arbitrary_edit(), 0..12), 3),
        seed in any::<u64>(),
    ) {
        converges((0..3).map(rga_doc).collect(), &edits, seed)?;
    }

    #[test]
    fn woot_splices_after_partial_delivery(steps in prop::collection::vec(arbitrary_step(), 1..40)) {
        splices_after_partial_delivery((0..3).map(woot_doc).collect(), &steps)?;
    }

    #[test]
    fn logoot_splices_after_partial_delivery(steps in prop::collection::vec(arbitrary_step(), 1..40)) {
        splices_after_partial_delivery((0..3).map(logoot_doc).collect(), &steps)?;
    }

    #[test]
    fn rga_splices_after_partial_delivery(steps in prop::collection::vec(arbitrary_step(), 1..40)) {
        splices_after_partial_delivery((0..3).map(rga_doc).collect(), &steps)?;
    }
}
