use clap::{App, AppSettings};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = App::new("epochcoin")
        .about("EpochCoin UTXO transaction validation tools.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(epochcoin_lib::commands::demo_command())
        .get_matches();

    if let Some(ref matches) = matches.subcommand_matches("demo") {
        epochcoin_lib::commands::run_demo_command(&matches)
    } else {
        panic!("Should report help.");
    }
}
