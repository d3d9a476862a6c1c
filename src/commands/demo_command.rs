use crate::crypto::KeyPair;
use crate::handler::TxHandler;
use crate::hash::Sha256;
use crate::transaction::{Output, Transaction, TxHash};
use crate::utxo::{Utxo, UtxoPool};
use clap::{App, Arg, ArgMatches};
use std::error::Error;

struct DemoCliOptions {
    num_transactions: u32,
}

impl DemoCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            num_transactions: matches.value_of("transactions").unwrap().parse()?,
        })
    }
}

pub fn demo_command() -> App<'static> {
    App::new("demo")
        .version("0.1")
        .about("Runs one epoch of transactions through the handler against a seeded pool.")
        .arg(
            Arg::new("transactions")
                .short('t')
                .long("transactions")
                .value_name("COUNT")
                .about("Number of candidate transactions in the epoch.")
                .takes_value(true)
                .default_value("5"),
        )
}

pub fn run_demo_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = DemoCliOptions::parse(matches)?;
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();

    // Seed the pool with one genesis output per candidate, all owned by
    // Alice.
    let genesis_hash = TxHash::from(Sha256::digest(b"genesis"));
    let mut pool = UtxoPool::new();
    for output_index in 0..options.num_transactions {
        pool.add(
            Utxo::new(genesis_hash.clone(), output_index),
            Output::new(10.0, alice.public_key()),
        );
    }

    // Alice pays Bob from each genesis output. The last candidate tries
    // to overspend its input and should be rejected.
    let mut candidates = Vec::new();
    for output_index in 0..options.num_transactions {
        let is_last = output_index + 1 == options.num_transactions;
        let value = if is_last { 11.0 } else { 9.5 };
        let mut tx = Transaction::new();
        tx.add_input(genesis_hash.clone(), output_index);
        tx.add_output(value, bob.public_key());
        let message = tx.signable_bytes(0)?;
        let signature = alice.sign(&message)?;
        tx.set_signature(0, signature)?;
        tx.finalize();
        candidates.push(tx);
    }

    let num_candidates = candidates.len();
    let accepted = TxHandler::handle_batch(candidates, &mut pool);

    println!("Accepted {} of {} transactions.", accepted.len(), num_candidates);
    for tx in &accepted {
        let hash = tx.hash().expect("accepted transactions are finalized");
        println!("  {}", hash);
    }
    println!("Pool now holds {} unspent outputs:", pool.len());
    for utxo in pool.utxos() {
        let output = pool.get(&utxo).expect("key came from the pool snapshot");
        println!("  {} -> {}", utxo, output.value());
    }
    Ok(())
}
