use clap::{Arg, Command};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("scroogecoin")
        .about("Validates UTXO transactions and selects mutually valid batches.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("enable_logging")
                .long("enable_logging")
                .help("If set, accept, reject and replacement decisions are logged to stderr.")
                .takes_value(false)
                .global(true),
        )
        .subcommand(scroogecoin_lib::commands::validate_command())
        .subcommand(scroogecoin_lib::commands::select_command())
        .subcommand(scroogecoin_lib::commands::sample_command())
        .get_matches();

    scroogecoin_lib::commands::init_logging(matches.is_present("enable_logging"));

    match matches.subcommand() {
        Some(("validate", matches)) => scroogecoin_lib::commands::run_validate_command(matches),
        Some(("select", matches)) => scroogecoin_lib::commands::run_select_command(matches),
        Some(("sample", matches)) => scroogecoin_lib::commands::run_sample_command(matches),
        _ => Err("Should report help.".into()),
    }
}
