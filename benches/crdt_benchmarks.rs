use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seqcrdt::prelude::*;

/// Random typing and deleting, replayed identically for every engine.
fn random_edits<D: Crdt>(doc: &mut D, count: usize) {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..count {
        let len = doc.len();
        if len == 0 || rng.gen_bool(0.7) {
            doc.insert("abc", rng.gen_range(0..=len));
        } else {
            let position = rng.gen_range(0..len);
            doc.delete(position, 1);
        }
    }
}

fn recorded<O: 'static>() -> (Rc<RefCell<Vec<Vec<O>>>>, impl FnMut(Vec<O>) + 'static) {
    let outbox: Rc<RefCell<Vec<Vec<O>>>> = Rc::default();
    let sink = Rc::clone(&outbox);
    (outbox, move |ops| sink.borrow_mut().push(ops))
}

fn bench_woot(c: &mut Criterion) {
    c.bench_function("woot::Document random edits x500", |b| {
        b.iter(|| {
            let mut doc = woot::Document::new(0, |_| {});
            random_edits(&mut doc, 500);
            black_box(doc.len())
        })
    });

    let (outbox, dispatch) = recorded::<woot::Operation>();
    let mut source = woot::Document::new(0, dispatch);
    random_edits(&mut source, 500);
    let batches = outbox.take();
    c.bench_function("woot::Document replay 500 edits", |b| {
        b.iter(|| {
            let mut doc = woot::Document::new(1, |_| {});
            for batch in &batches {
                doc.apply_operations(batch);
            }
            black_box(doc.len())
        })
    });
}

fn bench_logoot(c: &mut Criterion) {
    c.bench_function("logoot::Document random edits x500", |b| {
        b.iter(|| {
            let mut doc = logoot::Document::with_seed(0, 1, |_| {});
            random_edits(&mut doc, 500);
            black_box(doc.len())
        })
    });

    let (outbox, dispatch) = recorded::<logoot::Operation>();
    let mut source = logoot::Document::with_seed(0, 1, dispatch);
    random_edits(&mut source, 500);
    let batches = outbox.take();
    c.bench_function("logoot::Document replay 500 edits", |b| {
        b.iter(|| {
            let mut doc = logoot::Document::with_seed(1, 1, |_| {});
            for batch in &batches {
                doc.apply_operations(batch);
            }
            black_box(doc.len())
        })
    });
}

fn bench_rga(c: &mut Criterion) {
    c.bench_function("rga::Document random edits x500", |b| {
        b.iter(|| {
            let mut doc = rga::Document::new(0, |_| {});
            random_edits(&mut doc, 500);
            black_box(doc.len())
        })
    });

    let (outbox, dispatch) = recorded::<rga::Operation>();
    let mut source = rga::Document::new(0, dispatch);
    random_edits(&mut source, 500);
    let batches = outbox.take();
    c.bench_function("rga::Document replay 500 edits", |b| {
        b.iter(|| {
            let mut doc = rga::Document::new(1, |_| {});
            for batch in &batches {
                doc.apply_operations(batch);
            }
            black_box(doc.len())
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut woot = woot::Document::new(0, |_| {});
    let mut logoot = logoot::Document::with_seed(0, 1, |_| {});
    let mut rga = rga::Document::new(0, |_| {});
    random_edits(&mut woot, 1000);
    random_edits(&mut logoot, 1000);
    random_edits(&mut rga, 1000);

    c.bench_function("woot::Document to_string", |b| {
        b.iter(|| black_box(woot.to_string()))
    });
    c.bench_function("logoot::Document to_string", |b| {
        b.iter(|| black_box(logoot.to_string()))
    });
    c.bench_function("rga::Document to_string", |b| {
        b.iter(|| black_box(rga.to_string()))
    });
}

criterion_group!(benches, bench_woot, bench_logoot, bench_rga, bench_render);
criterion_main!(benches);
