use crate::{Ed25519Verifier, Scenario, TransactionValidator};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

struct ValidateCliOptions {
    scenario: PathBuf,
}

impl ValidateCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            scenario: matches
                .value_of("scenario")
                .map(PathBuf::from)
                .ok_or("Missing scenario file.")?,
        })
    }
}

pub fn validate_command() -> Command<'static> {
    Command::new("validate")
        .version("0.1")
        .about("Checks every transaction of the batch against the initial pool, one at a time.")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("JSON file with the initial pool and the batch.")
                .takes_value(true)
                .required(true),
        )
}

pub fn run_validate_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = ValidateCliOptions::parse(matches)?;
    let scenario = Scenario::from_file(&options.scenario)?;
    let pool = scenario.pool();
    let validator = TransactionValidator::new(Ed25519Verifier);
    for transaction in scenario.batch() {
        match validator.validate(transaction, &pool) {
            Ok(fee) => println!("{}: valid, fee: {}", transaction.id(), fee),
            Err(e) => println!("{}: invalid, {}", transaction.id(), e),
        }
    }
    Ok(())
}
