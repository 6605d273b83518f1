//! Three replicas typing into the same document over a lossy-ordered
//! network.
//!
//! Operations travel as JSON and are delivered after a random number of
//! ticks, so they routinely arrive out of order. Each engine ends with all
//! replicas showing the same text.
//!
//! ```sh
//! RUST_LOG=seqcrdt=debug cargo run --example collaborate
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seqcrdt::prelude::*;
use tracing_subscriber::EnvFilter;

const REPLICAS: usize = 3;
const TICKS: usize = 40;

/// A JSON message in flight to `to`, delivered at tick `due`.
struct Message {
    to: usize,
    due: usize,
    json: String,
}

fn run<D>(
    name: &str,
    build: impl Fn(ReplicaId, Box<dyn FnMut(Vec<D::Operation>)>) -> D,
    encode: fn(&D::Operation) -> seqcrdt::Result<String>,
    decode: fn(&str) -> seqcrdt::Result<D::Operation>,
) -> seqcrdt::Result<()>
where
    D: Crdt,
    D::Operation: 'static,
{
    let mut rng = StdRng::seed_from_u64(2024);
    let mut replicas = Vec::new();
    let mut outboxes = Vec::new();
    for replica_id in 0..REPLICAS as ReplicaId {
        let outbox: Rc<RefCell<Vec<D::Operation>>> = Rc::default();
        let sink = Rc::clone(&outbox);
        replicas.push(build(replica_id, Box::new(move |ops| sink.borrow_mut().extend(ops))));
        outboxes.push(outbox);
    }

    let words = ["lorem ", "ipsum ", "dolor ", "sit ", "amet "];
    let mut in_flight: Vec<Message> = Vec::new();
    for tick in 0..TICKS {
        for (from, doc) in replicas.iter_mut().enumerate() {
            let len = doc.len();
            if len > 8 && rng.gen_bool(0.3) {
                doc.delete(rng.gen_range(0..len), rng.gen_range(1..4));
            } else {
                doc.insert(words[rng.gen_range(0..words.len())], rng.gen_range(0..=len));
            }
            for operation in outboxes[from].borrow_mut().drain(..) {
                let json = encode(&operation)?;
                for to in (0..REPLICAS).filter(|&to| to != from) {
                    let due = tick + rng.gen_range(1..6);
                    in_flight.push(Message {
                        to,
                        due,
                        json: json.clone(),
                    });
                }
            }
        }

        let (due, later): (Vec<_>, Vec<_>) = in_flight.into_iter().partition(|m| m.due <= tick);
        in_flight = later;
        for message in due {
            let operation = decode(&message.json)?;
            replicas[message.to].apply_operations(&[operation]);
        }
    }

    for message in in_flight {
        let operation = decode(&message.json)?;
        replicas[message.to].apply_operations(&[operation]);
    }

    println!("{name}:");
    for doc in &replicas {
        println!("  replica {}: {:?}", doc.replica_id(), doc.to_string());
    }
    let first = replicas[0].to_string();
    assert!(replicas.iter().all(|doc| doc.to_string() == first));
    Ok(())
}

fn main() -> seqcrdt::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    run::<woot::Document>(
        "WOOT",
        |replica_id, dispatch| woot::Document::new(replica_id, dispatch),
        woot::Operation::to_json,
        woot::Operation::from_json,
    )?;
    run::<logoot::Document>(
        "Logoot",
        |replica_id, dispatch| logoot::Document::with_seed(replica_id, 7, dispatch),
        logoot::Operation::to_json,
        logoot::Operation::from_json,
    )?;
    run::<rga::Document>(
        "RGA",
        |replica_id, dispatch| rga::Document::new(replica_id, dispatch),
        rga::Operation::to_json,
        rga::Operation::from_json,
    )?;
    Ok(())
}
