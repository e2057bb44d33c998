// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: keyset.rs

//! Keyset data model: key entries, their status and output prefix
//! discipline, plus a JSON document loader used by the CLI.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use strum::{Display, EnumIter};
use zeroize::Zeroizing;

use super::mac::registry::{MacError, MacErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum KeyStatus {
	Enabled,
	Disabled,
	Destroyed,
}

/// Framing applied to tags produced by a key. See `mac::prefix` for the
/// byte layout of each variant.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OutputPrefix {
	Tink,
	Legacy,
	Raw,
	Crunchy,
}

/// Secret bytes plus the registry identifier of the algorithm that
/// consumes them. The bytes are wiped when the material is dropped.
#[derive(Clone, Deserialize)]
pub struct KeyMaterial {
	algorithm: String,
	#[serde(default, deserialize_with = "deserialize_hex_secret")]
	value: Zeroizing<Vec<u8>>,
	#[serde(default)]
	tag_size: Option<usize>,
}

impl KeyMaterial {
	pub fn new(algorithm: impl Into<String>, value: &[u8]) -> Self {
		Self {
			algorithm: algorithm.into(),
			value: Zeroizing::new(value.to_vec()),
			tag_size: None,
		}
	}

	pub fn with_tag_size(mut self, tag_size: usize) -> Self {
		self.tag_size = Some(tag_size);
		self
	}

	pub fn algorithm(&self) -> &str {
		&self.algorithm
	}

	pub fn value(&self) -> &[u8] {
		self.value.as_slice()
	}

	pub fn tag_size(&self) -> Option<usize> {
		self.tag_size
	}
}

impl std::fmt::Debug for KeyMaterial {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("KeyMaterial")
			.field("algorithm", &self.algorithm)
			.field("tag_size", &self.tag_size)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyEntry {
	pub key_id: u32,
	pub status: KeyStatus,
	#[serde(rename = "primary", default)]
	pub is_primary: bool,
	pub output_prefix: OutputPrefix,
	pub key_material: KeyMaterial,
}

impl KeyEntry {
	/// Creates an enabled, non-primary entry.
	pub fn new(
		key_id: u32,
		output_prefix: OutputPrefix,
		key_material: KeyMaterial,
	) -> Self {
		Self {
			key_id,
			status: KeyStatus::Enabled,
			is_primary: false,
			output_prefix,
			key_material,
		}
	}

	pub fn primary(mut self) -> Self {
		self.is_primary = true;
		self
	}

	pub fn with_status(mut self, status: KeyStatus) -> Self {
		self.status = status;
		self
	}

	pub fn is_enabled(&self) -> bool {
		self.status == KeyStatus::Enabled
	}
}

/// Ordered collection of key entries. Order is preserved from the
/// source document and drives verification order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Keyset {
	#[serde(rename = "keys")]
	entries: Vec<KeyEntry>,
}

impl Keyset {
	pub fn new(entries: Vec<KeyEntry>) -> Self {
		Self { entries }
	}

	pub fn from_json(document: &str) -> Result<Self, MacError> {
		serde_json::from_str(document).map_err(|err| {
			MacError::new(
				MacErrorKind::MalformedKeyMaterial,
				format!("failed to parse keyset document: {}", err),
			)
		})
	}

	pub fn from_file(path: &Path) -> Result<Self, MacError> {
		let document =
			Zeroizing::new(fs::read_to_string(path).map_err(|err| {
				MacError::new(
					MacErrorKind::MalformedKeyMaterial,
					format!(
						"failed to read keyset file `{}`: {}",
						path.display(),
						err
					),
				)
			})?);
		Self::from_json(&document)
	}

	pub fn entries(&self) -> &[KeyEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Changes the status of the entry with `key_id`. Returns `false`
	/// when no such entry exists.
	pub fn set_status(&mut self, key_id: u32, status: KeyStatus) -> bool {
		match self.entries.iter_mut().find(|e| e.key_id == key_id) {
			Some(entry) => {
				entry.status = status;
				true
			}
			None => false,
		}
	}

	/// Moves the primary flag to `key_id`, clearing it everywhere else.
	pub fn set_primary(&mut self, key_id: u32) -> bool {
		if !self.entries.iter().any(|e| e.key_id == key_id) {
			return false;
		}
		for entry in &mut self.entries {
			entry.is_primary = entry.key_id == key_id;
		}
		true
	}
}

fn deserialize_hex_secret<'de, D>(
	deserializer: D,
) -> Result<Zeroizing<Vec<u8>>, D::Error>
where
	D: Deserializer<'de>,
{
	let encoded = Zeroizing::new(String::deserialize(deserializer)?);
	hex::decode(encoded.as_str())
		.map(Zeroizing::new)
		.map_err(|err| {
			serde::de::Error::custom(format!(
				"key material is not valid hex: {}",
				err
			))
		})
}
