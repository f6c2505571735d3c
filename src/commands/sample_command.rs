use crate::{
    Coin, OutputRef, PublicKey, Scenario, Sha256, Signature, TransactionBuilder, TransactionId,
    TransactionOutput, UtxoPool,
};
use clap::{Arg, ArgMatches, Command};
use ed25519_dalek::{Signer, SigningKey};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

struct SampleCliOptions {
    output: Option<PathBuf>,
}

impl SampleCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            output: matches.value_of("output").map(PathBuf::from),
        })
    }
}

pub fn sample_command() -> Command<'static> {
    Command::new("sample")
        .version("0.1")
        .about("Writes a sample scenario: two transactions spending the same coin with different fees.")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Where to write the scenario. Prints to stdout if omitted.")
                .takes_value(true)
                .required(false),
        )
}

pub fn run_sample_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SampleCliOptions::parse(matches)?;
    let json = sample_scenario().to_json()?;
    match options.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

/// Scrooge owns a coin of 10 and signs two spends of it to Alice: one paying a fee of 1,
/// the other a fee of 2. The keys are derived from fixed seeds so the output is stable.
pub fn sample_scenario() -> Scenario {
    let scrooge = SigningKey::from_bytes(&[1; 32]);
    let alice = PublicKey::from_raw(SigningKey::from_bytes(&[2; 32]).verifying_key().to_bytes());

    let coin = OutputRef::new(TransactionId::new(Sha256::digest(b"scrooge")), 0);
    let mut pool = UtxoPool::new();
    pool.add(
        coin,
        TransactionOutput::new(
            Coin::new(10),
            PublicKey::from_raw(scrooge.verifying_key().to_bytes()),
        ),
    );

    let batch = [[5, 3, 1], [4, 3, 1]]
        .iter()
        .map(|amounts| {
            amounts
                .iter()
                .fold(TransactionBuilder::new().input(coin), |builder, amount| {
                    builder.output(Coin::new(*amount), alice)
                })
                .sign_all(|_, message| Signature::new(scrooge.sign(message).to_bytes().to_vec()))
                .build()
        })
        .collect();
    Scenario::new(&pool, batch)
}
