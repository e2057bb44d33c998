// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: commands.rs

//! CLI dispatch for `ksm compute`, `ksm verify` and `ksm algorithms`.

use crate::ksm::keyset::Keyset;
use crate::ksm::mac::executor::{read_message, tag_from_hex, tag_to_hex};
use crate::ksm::mac::registry::{MacErrorKind, Registry};
use crate::ksm::mac::resolver::PrimitiveResolver;
use crate::ksm::mac::wrapper::MultiKeyMac;
use colored::*;
use serde_json::json;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum MacInput {
	Inline(String),
	File(PathBuf),
	Stdin,
}

impl MacInput {
	fn read(&self) -> Result<Vec<u8>, Box<dyn Error>> {
		match self {
			MacInput::Inline(text) => Ok(text.as_bytes().to_vec()),
			MacInput::File(path) => {
				let file = File::open(path).map_err(|err| {
					io::Error::other(format!(
						"failed to open `{}`: {}",
						path.display(),
						err
					))
				})?;
				Ok(read_message(file)?)
			}
			MacInput::Stdin => Ok(read_message(io::stdin().lock())?),
		}
	}

	fn describe(&self) -> serde_json::Value {
		match self {
			MacInput::Inline(text) => {
				json!({ "type": "inline", "value": text })
			}
			MacInput::File(path) => {
				json!({ "type": "file", "value": path.display().to_string() })
			}
			MacInput::Stdin => json!({ "type": "stdin" }),
		}
	}
}

#[derive(Debug)]
pub struct ComputeOptions {
	pub keyset: PathBuf,
	pub input: MacInput,
	pub json: bool,
}

#[derive(Debug)]
pub struct VerifyOptions {
	pub keyset: PathBuf,
	pub tag: String,
	pub input: MacInput,
	pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
	Valid,
	Invalid,
}

pub fn run_compute(options: ComputeOptions) -> Result<(), Box<dyn Error>> {
	let mac = load_mac(&options.keyset)?;
	let message = options.input.read()?;
	let tag = mac.compute_mac(&message)?;
	let hex = tag_to_hex(&tag);

	if options.json {
		let payload = json!({
			"tag": hex,
			"primary_key_id": mac.primary_key_id(),
			"output_prefix": mac.primitive_set().primary().info().output_prefix.to_string(),
			"input": options.input.describe(),
		});
		println!("{}", payload);
	} else {
		println!("{}", hex);
	}
	Ok(())
}

pub fn run_verify(
	options: VerifyOptions,
) -> Result<VerifyOutcome, Box<dyn Error>> {
	let mac = load_mac(&options.keyset)?;
	let tag = tag_from_hex(&options.tag).map_err(|err| {
		io::Error::other(format!("tag is not valid hex: {}", err))
	})?;
	let message = options.input.read()?;

	let outcome = match mac.verify_mac(&tag, &message) {
		Ok(()) => VerifyOutcome::Valid,
		Err(err)
			if matches!(
				err.kind(),
				MacErrorKind::VerificationFailed
					| MacErrorKind::InvalidTagLength
			) =>
		{
			VerifyOutcome::Invalid
		}
		Err(err) => return Err(Box::new(err)),
	};

	let valid = outcome == VerifyOutcome::Valid;
	if options.json {
		let payload = json!({
			"valid": valid,
			"input": options.input.describe(),
		});
		println!("{}", payload);
	} else if valid {
		println!("valid");
	} else {
		println!("invalid");
	}
	Ok(outcome)
}

pub fn run_algorithms(json: bool) {
	let registry = Registry::with_defaults();
	for metadata in registry.metadata() {
		if json {
			let payload = json!({
				"algorithm": metadata.identifier,
				"display_name": metadata.display_name,
				"legacy": metadata.is_legacy(),
			});
			println!("{}", payload);
		} else if metadata.is_legacy() {
			println!(
				"{:<16} {} {}",
				metadata.identifier,
				metadata.display_name,
				"(legacy)".yellow()
			);
		} else {
			println!(
				"{:<16} {}",
				metadata.identifier, metadata.display_name
			);
		}
	}
}

fn load_mac(path: &Path) -> Result<MultiKeyMac, Box<dyn Error>> {
	let keyset = Keyset::from_file(path)?;
	let registry = Registry::with_defaults();
	let mac =
		MultiKeyMac::from_keyset(&keyset, &PrimitiveResolver::new(&registry))?;
	Ok(mac)
}
