// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: resolver.rs

//! Turns a single key entry into its single-key MAC primitive.

use tracing::warn;

use super::registry::{
	KeyManager, MacError, MacErrorKind, Registry, SingleKeyMac,
};
use crate::ksm::keyset::KeyEntry;

/// Resolves entries through an explicit [`Registry`], optionally
/// consulting a caller-supplied [`KeyManager`] first.
#[derive(Clone, Copy)]
pub struct PrimitiveResolver<'a> {
	registry: &'a Registry,
	custom: Option<&'a dyn KeyManager>,
}

impl<'a> PrimitiveResolver<'a> {
	pub fn new(registry: &'a Registry) -> Self {
		Self {
			registry,
			custom: None,
		}
	}

	/// Entries whose algorithm `manager` supports are built by it
	/// instead of the registry.
	pub fn with_key_manager(mut self, manager: &'a dyn KeyManager) -> Self {
		self.custom = Some(manager);
		self
	}

	pub fn resolve(
		&self,
		entry: &KeyEntry,
	) -> Result<Box<dyn SingleKeyMac>, MacError> {
		let algorithm = entry.key_material.algorithm();
		let manager = self.manager_for(algorithm).ok_or_else(|| {
			MacError::new(
				MacErrorKind::UnsupportedKeyType,
				format!("no key manager for MAC algorithm `{}`", algorithm),
			)
			.for_key(entry.key_id)
		})?;
		let metadata = manager.metadata();
		if metadata.is_legacy() {
			warn!(
				key_id = entry.key_id,
				algorithm = metadata.display_name,
				"keyset uses a legacy MAC algorithm"
			);
		}
		manager
			.primitive(&entry.key_material)
			.map_err(|err| err.for_key(entry.key_id))
	}

	fn manager_for(&self, algorithm: &str) -> Option<&'a dyn KeyManager> {
		match self.custom {
			Some(custom) if custom.supports(algorithm) => Some(custom),
			_ => self.registry.key_manager(algorithm),
		}
	}
}
