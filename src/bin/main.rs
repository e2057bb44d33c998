// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: main.rs

use keysetmac::ksm::app;
use std::process::ExitCode;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
	app::run()
}
