// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: app.rs

use crate::ksm::mac::commands::{
	run_algorithms, run_compute, run_verify, ComputeOptions, MacInput,
	VerifyOptions, VerifyOutcome,
};
use clap::{crate_name, Arg, ArgAction, ArgMatches};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const HELP_TEMPLATE: &str = "{before-help}{name} {version}
{about-with-newline}
Commands:
  ksm compute --keyset <FILE> <input>          Tag data with the primary key
  ksm verify --keyset <FILE> --tag <HEX> <input>  Check a tag against enabled keys
  ksm algorithms                               List supported MAC algorithms
{usage-heading} {usage}

{all-args}{after-help}
";

pub fn run() -> Result<ExitCode, Box<dyn Error>> {
	let matches = build_cli().get_matches();
	init_tracing(matches.get_flag("verbose"));

	match matches.subcommand() {
		Some(("compute", m)) => {
			run_compute(ComputeOptions {
				keyset: keyset_path(m),
				input: mac_input(m),
				json: m.get_flag("json"),
			})?;
		}
		Some(("verify", m)) => {
			let tag = m
				.get_one::<String>("tag")
				.cloned()
				.unwrap_or_default();
			let outcome = run_verify(VerifyOptions {
				keyset: keyset_path(m),
				tag,
				input: mac_input(m),
				json: m.get_flag("json"),
			})?;
			if outcome == VerifyOutcome::Invalid {
				return Ok(ExitCode::FAILURE);
			}
		}
		Some(("algorithms", m)) => run_algorithms(m.get_flag("json")),
		_ => unreachable!("clap requires a subcommand"),
	}
	Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_level));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
}

fn keyset_path(m: &ArgMatches) -> PathBuf {
	m.get_one::<PathBuf>("keyset").cloned().unwrap_or_default()
}

fn mac_input(m: &ArgMatches) -> MacInput {
	if let Some(text) = m.get_one::<String>("data") {
		MacInput::Inline(text.clone())
	} else if let Some(path) = m.get_one::<PathBuf>("file") {
		MacInput::File(path.clone())
	} else {
		MacInput::Stdin
	}
}

fn keyset_arg() -> Arg {
	Arg::new("keyset")
		.long("keyset")
		.short('k')
		.value_name("FILE")
		.help("JSON keyset document")
		.required(true)
		.value_parser(clap::value_parser!(PathBuf))
}

fn input_args() -> [Arg; 2] {
	[
		Arg::new("data")
			.long("data")
			.short('d')
			.value_name("TEXT")
			.help("Message given inline")
			.conflicts_with("file"),
		Arg::new("file")
			.long("file")
			.short('f')
			.value_name("PATH")
			.help("Read the message from a file (stdin when neither is set)")
			.value_parser(clap::value_parser!(PathBuf)),
	]
}

fn json_arg() -> Arg {
	Arg::new("json")
		.long("json")
		.help("Emit JSON output")
		.action(ArgAction::SetTrue)
}

fn build_cli() -> clap::Command {
	clap::Command::new(crate_name!())
		.color(clap::ColorChoice::Never)
		.help_template(HELP_TEMPLATE)
		.bin_name("ksm")
		.version(clap::crate_version!())
		.about("Compute and verify MAC tags with a multi-key keyset")
		.subcommand_required(true)
		.arg_required_else_help(true)
		.arg(
			Arg::new("verbose")
				.long("verbose")
				.short('v')
				.help("Log keyset resolution to stderr")
				.action(ArgAction::SetTrue)
				.global(true),
		)
		.subcommand(
			clap::Command::new("compute")
				.about("Tag a message with the keyset's primary key")
				.arg(keyset_arg())
				.args(input_args())
				.arg(json_arg()),
		)
		.subcommand(
			clap::Command::new("verify")
				.about("Verify a tag against every enabled key")
				.arg(keyset_arg())
				.arg(
					Arg::new("tag")
						.long("tag")
						.short('t')
						.value_name("HEX")
						.help("Hex-encoded tag")
						.required(true),
				)
				.args(input_args())
				.arg(json_arg()),
		)
		.subcommand(
			clap::Command::new("algorithms")
				.about("List the built-in MAC algorithms")
				.arg(json_arg()),
		)
}
