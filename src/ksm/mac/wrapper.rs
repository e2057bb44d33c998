// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: wrapper.rs

//! The keyset-level MAC. Tags are always computed with the primary key;
//! verification accepts a tag from any enabled key so that tags issued
//! before a rotation keep verifying until their key is disabled.

use std::hint::black_box;
use std::sync::Arc;

use tracing::trace;

use super::prefix::NON_RAW_PREFIX_SIZE;
use super::primitive_set::PrimitiveSet;
use super::registry::{MacError, MacErrorKind};
use super::resolver::PrimitiveResolver;
use crate::ksm::keyset::Keyset;

/// Cheap to clone; clones share the same immutable primitive set.
#[derive(Debug, Clone)]
pub struct MultiKeyMac {
	set: Arc<PrimitiveSet>,
}

impl MultiKeyMac {
	pub fn new(set: PrimitiveSet) -> Self {
		Self { set: Arc::new(set) }
	}

	/// Resolves and validates `keyset`, then wraps the result.
	pub fn from_keyset(
		keyset: &Keyset,
		resolver: &PrimitiveResolver<'_>,
	) -> Result<Self, MacError> {
		PrimitiveSet::build(keyset, resolver).map(Self::new)
	}

	pub fn primitive_set(&self) -> &PrimitiveSet {
		&self.set
	}

	pub fn primary_key_id(&self) -> u32 {
		self.set.primary().info().key_id
	}

	pub fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
		let primary = self.set.primary();
		let raw_tag = primary.compute_raw(data)?;
		match primary.info().prefix {
			Some(prefix) => {
				let mut tag = Vec::with_capacity(prefix.len() + raw_tag.len());
				tag.extend_from_slice(&prefix);
				tag.extend_from_slice(&raw_tag);
				Ok(tag)
			}
			None => Ok(raw_tag),
		}
	}

	/// Succeeds if any enabled key accepts `tag`. Every rejection is the
	/// same `VerificationFailed` error.
	pub fn verify_mac(&self, tag: &[u8], data: &[u8]) -> Result<(), MacError> {
		if tag.len() <= NON_RAW_PREFIX_SIZE {
			return Err(MacError::new(
				MacErrorKind::InvalidTagLength,
				format!(
					"MAC tag must be longer than {} bytes",
					NON_RAW_PREFIX_SIZE
				),
			));
		}

		let (prefix, body) = tag.split_at(NON_RAW_PREFIX_SIZE);
		let prefixed = self.set.entry_for_prefix(prefix);
		match prefixed {
			Some(entry) => {
				if entry.verify_raw(body, data).is_ok() {
					return Ok(());
				}
			}
			None => {
				// An unknown prefix still costs one MAC computation.
				let _ = black_box(self.set.primary().verify_raw(body, data));
			}
		}

		for entry in self.set.raw_entries() {
			if entry.verify_raw(tag, data).is_ok() {
				return Ok(());
			}
		}

		trace!(
			prefix_matched = prefixed.is_some(),
			"MAC verification failed"
		);
		Err(MacError::verification_failed())
	}
}
