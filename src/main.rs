use anyhow::anyhow;
use structopt::StructOpt;

mod cli;

use linkcheck::discover::{self, LinkReport};
use linkcheck::exchange::{ExchangeConfig, Outcome, TestCase, LINK_TEST_CASES};
use linkcheck::SerialChannel;

fn print_report(cases: &[TestCase], report: &LinkReport) {
    println!("Results for {}:", report.port);

    for (index, (case, outcome)) in cases.iter().zip(&report.outcomes).enumerate() {
        let verdict = match outcome {
            Outcome::Pass => "ok".to_owned(),
            Outcome::Mismatch { response } => format!("FAIL - unexpected response {:?}", response),
            Outcome::NoResponse => "FAIL - no response".to_owned(),
            Outcome::ChannelError { message } => format!("FAIL - {}", message),
        };

        println!("  {:2}. {:<12} {}", index + 1, case.command, verdict);
    }
}

fn main() -> Result<(), anyhow::Error> {
    // Create a logger with a timestamp that logs everything at Info level or above
    pretty_env_logger::init_timed();

    // Parse the command-line arguments
    let opts = cli::Opts::from_args();

    let baud_rate = opts.baud_rate;

    let candidates: Vec<String> = match opts.serial_port {
        Some(port) => vec![port],
        None => discover::DEFAULT_CANDIDATES
            .iter()
            .map(|port| (*port).to_owned())
            .collect(),
    };

    println!(
        "Checking UART link at {} baud, {} commands",
        baud_rate,
        LINK_TEST_CASES.len()
    );

    let config = ExchangeConfig::default();
    let report = discover::discover_and_run(
        &candidates,
        |port| SerialChannel::open(port, baud_rate),
        LINK_TEST_CASES,
        &config,
    )?;

    print_report(LINK_TEST_CASES, &report);

    if report.all_passed() {
        println!("Link check passed on {}", report.port);

        Ok(())
    } else {
        let failed = report
            .outcomes
            .iter()
            .filter(|outcome| !outcome.is_pass())
            .count();

        Err(anyhow!(
            "{} of {} commands failed on {}",
            failed,
            report.outcomes.len(),
            report.port
        ))
    }
}
