// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: executor.rs

//! Message input and tag encoding helpers for the CLI.

use hex::{decode, encode};
use std::io::{self, Read};

const MAC_BUFFER_SIZE: usize = 8192;

pub fn read_message<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
	let mut message = Vec::new();
	let mut buffer = [0u8; MAC_BUFFER_SIZE];
	loop {
		let n = reader.read(&mut buffer)?;
		if n == 0 {
			break;
		}
		message.extend_from_slice(&buffer[..n]);
	}
	Ok(message)
}

pub fn tag_to_hex(tag: &[u8]) -> String {
	encode(tag)
}

pub fn tag_from_hex(tag: &str) -> Result<Vec<u8>, hex::FromHexError> {
	decode(tag.trim())
}
