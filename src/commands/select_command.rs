use crate::{
    Ed25519Verifier, OutputRef, Scenario, Selection, SelectionPolicy, TransactionHandler,
    TransactionOutput,
};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

struct SelectCliOptions {
    scenario: PathBuf,
    policy: SelectionPolicy,
}

impl SelectCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            scenario: matches
                .value_of("scenario")
                .map(PathBuf::from)
                .ok_or("Missing scenario file.")?,
            policy: matches.value_of_t::<SelectionPolicy>("policy")?,
        })
    }
}

pub fn select_command() -> Command<'static> {
    Command::new("select")
        .version("0.1")
        .about("Selects a mutually valid subset of the batch and applies it to the pool.")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("JSON file with the initial pool and the batch.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("policy")
                .short('p')
                .long("policy")
                .value_name("POLICY")
                .help("How conflicting transactions are resolved.")
                .takes_value(true)
                .possible_values(["first-seen", "max-fee"])
                .default_value("max-fee"),
        )
}

pub fn run_select_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SelectCliOptions::parse(matches)?;
    let scenario = Scenario::from_file(&options.scenario)?;
    let handler = TransactionHandler::new(&scenario.pool(), Ed25519Verifier, options.policy);
    let selection = handler.select(scenario.batch());
    write_selection(&mut io::stdout().lock(), &selection)?;
    Ok(())
}

/// Prints the selection outcome with the resulting pool sorted by output reference.
pub fn write_selection<W: Write>(out: &mut W, selection: &Selection) -> io::Result<()> {
    writeln!(out, "Accepted")?;
    for transaction in selection.accepted() {
        writeln!(out, "  {}", transaction.id())?;
    }
    writeln!(out, "Rejected")?;
    for (id, reason) in selection.rejected() {
        writeln!(out, "  {}: {}", id, reason)?;
    }
    writeln!(out, "Displaced")?;
    for id in selection.displaced() {
        writeln!(out, "  {}: replaced by a higher fee transaction", id)?;
    }
    writeln!(out, "Total fee: {}", selection.total_fee())?;

    writeln!(out, "Pool")?;
    let mut utxos = selection
        .pool()
        .iter()
        .collect::<Vec<(&OutputRef, &TransactionOutput)>>();
    utxos.sort_by_key(|(output_ref, _)| **output_ref);
    for (output_ref, output) in utxos {
        writeln!(out, "  {} -> {}", output_ref, output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sample_scenario;
    use std::fs;
    use tempfile::TempDir;

    fn select_matches(scenario: &str, policy: &str) -> ArgMatches {
        select_command().get_matches_from(vec!["select", "--scenario", scenario, "--policy", policy])
    }

    #[test]
    fn report_lists_displaced_transactions_under_their_own_heading() {
        let scenario = sample_scenario();
        let handler =
            TransactionHandler::new(&scenario.pool(), Ed25519Verifier, SelectionPolicy::MaxFee);
        let selection = handler.select(scenario.batch());
        let mut out = Vec::new();

        write_selection(&mut out, &selection).unwrap();

        let report = String::from_utf8(out).unwrap();
        let displaced = scenario.batch()[0].id().to_string();
        let accepted = scenario.batch()[1].id().to_string();
        let lines = report.lines().collect::<Vec<&str>>();
        let heading = |name: &str| lines.iter().position(|line| *line == name).unwrap();
        assert_eq!(lines[heading("Accepted") + 1], format!("  {}", accepted));
        assert_eq!(heading("Rejected") + 1, heading("Displaced"));
        assert_eq!(
            lines[heading("Displaced") + 1],
            format!("  {}: replaced by a higher fee transaction", displaced)
        );
        assert!(report.contains("Total fee: 2 SCR"));
    }

    #[test]
    fn runs_on_a_scenario_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scenario.json");
        fs::write(&path, sample_scenario().to_json().unwrap()).unwrap();
        let path = path.to_str().unwrap();

        for policy in &["first-seen", "max-fee"] {
            assert!(run_select_command(&select_matches(path, policy)).is_ok());
        }
    }

    #[test]
    fn fails_on_a_missing_scenario_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        assert!(run_select_command(&select_matches(path.to_str().unwrap(), "max-fee")).is_err());
    }
}
