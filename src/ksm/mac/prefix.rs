// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: prefix.rs

//! Tag framing. Non-RAW tags start with a format byte followed by the
//! big-endian key id; LEGACY keys additionally MAC `data || 0x00`.

use std::borrow::Cow;

use crate::ksm::keyset::OutputPrefix;

pub const NON_RAW_PREFIX_SIZE: usize = 5;
pub const TINK_START_BYTE: u8 = 0x01;
pub const LEGACY_START_BYTE: u8 = 0x00;
const LEGACY_PADDING: u8 = 0x00;

pub type PrefixBytes = [u8; NON_RAW_PREFIX_SIZE];

impl OutputPrefix {
	/// Bytes prepended to tags of `key_id`, or `None` for RAW.
	pub fn prefix_bytes(self, key_id: u32) -> Option<PrefixBytes> {
		let start = match self {
			OutputPrefix::Tink => TINK_START_BYTE,
			OutputPrefix::Legacy | OutputPrefix::Crunchy => {
				LEGACY_START_BYTE
			}
			OutputPrefix::Raw => return None,
		};
		let mut prefix = [0u8; NON_RAW_PREFIX_SIZE];
		prefix[0] = start;
		prefix[1..].copy_from_slice(&key_id.to_be_bytes());
		Some(prefix)
	}

	/// Input actually fed to the single-key MAC for `data`.
	pub fn mac_input(self, data: &[u8]) -> Cow<'_, [u8]> {
		match self {
			OutputPrefix::Legacy => {
				let mut padded = Vec::with_capacity(data.len() + 1);
				padded.extend_from_slice(data);
				padded.push(LEGACY_PADDING);
				Cow::Owned(padded)
			}
			_ => Cow::Borrowed(data),
		}
	}
}
