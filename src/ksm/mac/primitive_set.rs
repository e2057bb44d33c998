// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: primitive_set.rs

//! Validated, immutable set of per-key primitives built from a keyset.
//!
//! Construction resolves every non-destroyed entry and checks the
//! keyset invariants once: at least one entry, exactly one enabled
//! primary, and no two enabled entries sharing `(prefix, key_id)`.
//! Any failure aborts the build; there are no partially built sets.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::prefix::PrefixBytes;
use super::registry::{MacError, MacErrorKind, SingleKeyMac};
use super::resolver::PrimitiveResolver;
use crate::ksm::keyset::{KeyStatus, Keyset, OutputPrefix};

/// Key metadata kept next to the primitive. Never holds key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
	pub key_id: u32,
	pub status: KeyStatus,
	pub is_primary: bool,
	pub output_prefix: OutputPrefix,
	pub prefix: Option<PrefixBytes>,
	pub algorithm: String,
}

pub struct PrimitiveEntry {
	info: EntryInfo,
	primitive: Box<dyn SingleKeyMac>,
}

impl PrimitiveEntry {
	pub fn info(&self) -> &EntryInfo {
		&self.info
	}

	/// Tag for `data` without the output prefix, LEGACY padding applied.
	pub fn compute_raw(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
		let input = self.info.output_prefix.mac_input(data);
		self.primitive.compute_mac(&input).map_err(|err| {
			MacError::new(MacErrorKind::ComputationFailed, err.to_string())
				.for_key(self.info.key_id)
		})
	}

	/// Checks an unprefixed tag, LEGACY padding applied.
	pub fn verify_raw(
		&self,
		raw_tag: &[u8],
		data: &[u8],
	) -> Result<(), MacError> {
		let input = self.info.output_prefix.mac_input(data);
		self.primitive.verify_mac(raw_tag, &input)
	}
}

impl std::fmt::Debug for PrimitiveEntry {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("PrimitiveEntry")
			.field("info", &self.info)
			.finish_non_exhaustive()
	}
}

#[derive(Debug)]
pub struct PrimitiveSet {
	// Every non-destroyed entry, in keyset order.
	entries: Vec<PrimitiveEntry>,
	primary: usize,
	by_prefix: HashMap<PrefixBytes, usize>,
	raw: Vec<usize>,
}

impl PrimitiveSet {
	pub fn build(
		keyset: &Keyset,
		resolver: &PrimitiveResolver<'_>,
	) -> Result<Self, MacError> {
		if keyset.is_empty() {
			return Err(MacError::new(
				MacErrorKind::EmptyKeyset,
				"keyset contains no keys",
			));
		}

		let mut entries = Vec::with_capacity(keyset.len());
		for entry in keyset.entries() {
			if entry.status == KeyStatus::Destroyed {
				debug!(key_id = entry.key_id, "skipping destroyed key");
				continue;
			}
			let primitive = resolver.resolve(entry)?;
			entries.push(PrimitiveEntry {
				info: EntryInfo {
					key_id: entry.key_id,
					status: entry.status,
					is_primary: entry.is_primary,
					output_prefix: entry.output_prefix,
					prefix: entry.output_prefix.prefix_bytes(entry.key_id),
					algorithm: entry.key_material.algorithm().to_owned(),
				},
				primitive,
			});
		}

		let primary = find_primary(&entries)?;

		let mut seen = HashSet::new();
		let mut by_prefix = HashMap::new();
		let mut raw = Vec::new();
		for (index, entry) in entries.iter().enumerate() {
			let info = &entry.info;
			if info.status != KeyStatus::Enabled {
				continue;
			}
			if !seen.insert((info.prefix, info.key_id)) {
				return Err(MacError::new(
					MacErrorKind::DuplicatePrefix,
					format!(
						"enabled keys share output prefix {} and key id {}",
						info.output_prefix, info.key_id
					),
				));
			}
			match info.prefix {
				Some(prefix) => {
					by_prefix.insert(prefix, index);
				}
				None => raw.push(index),
			}
		}

		debug!(
			keys = keyset.len(),
			resolved = entries.len(),
			enabled = by_prefix.len() + raw.len(),
			primary_key_id = entries[primary].info.key_id,
			"built MAC primitive set"
		);

		Ok(Self {
			entries,
			primary,
			by_prefix,
			raw,
		})
	}

	pub fn primary(&self) -> &PrimitiveEntry {
		&self.entries[self.primary]
	}

	/// Enabled entry whose tags start with `prefix`, if any.
	pub fn entry_for_prefix(&self, prefix: &[u8]) -> Option<&PrimitiveEntry> {
		let prefix: PrefixBytes = prefix.try_into().ok()?;
		self.by_prefix.get(&prefix).map(|&index| &self.entries[index])
	}

	/// Enabled RAW entries in keyset order.
	pub fn raw_entries(&self) -> impl Iterator<Item = &PrimitiveEntry> {
		self.raw.iter().map(|&index| &self.entries[index])
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn find_primary(entries: &[PrimitiveEntry]) -> Result<usize, MacError> {
	let mut primaries = entries.iter().enumerate().filter(|(_, entry)| {
		entry.info.is_primary && entry.info.status == KeyStatus::Enabled
	});
	match (primaries.next(), primaries.next()) {
		(Some((index, _)), None) => Ok(index),
		(None, _) => Err(MacError::new(
			MacErrorKind::NoPrimaryKey,
			"keyset has no enabled primary key",
		)),
		(Some((_, first)), Some((_, second))) => Err(MacError::new(
			MacErrorKind::MultiplePrimaryKeys,
			format!(
				"keys {} and {} are both marked primary",
				first.info.key_id, second.info.key_id
			),
		)),
	}
}
