// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: registry.rs

//! Registry definitions for single-key MAC algorithms: the error
//! taxonomy, the primitive and key manager capabilities, and the
//! explicitly constructed registry that maps algorithm identifiers to
//! their constructors.

use std::borrow::Cow;

use super::{cmac, hmac};
use crate::ksm::keyset::KeyMaterial;

/// A MAC bound to exactly one key. Implementations compare tags in
/// constant time.
pub trait SingleKeyMac: Send + Sync {
	fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError>;
	fn verify_mac(&self, tag: &[u8], data: &[u8])
		-> Result<(), MacError>;
}

/// Capability that turns key material of one algorithm into a
/// [`SingleKeyMac`].
pub trait KeyManager: Send + Sync {
	fn metadata(&self) -> MacAlgorithmMetadata;

	fn primitive(
		&self,
		material: &KeyMaterial,
	) -> Result<Box<dyn SingleKeyMac>, MacError>;

	fn supports(&self, algorithm: &str) -> bool {
		self.metadata().identifier.eq_ignore_ascii_case(algorithm)
	}
}

#[derive(Clone, Copy, Debug)]
pub struct MacAlgorithmMetadata {
	pub identifier: &'static str,
	pub display_name: &'static str,
	pub legacy: bool,
}

impl MacAlgorithmMetadata {
	pub const fn new(
		identifier: &'static str,
		display_name: &'static str,
		legacy: bool,
	) -> Self {
		Self {
			identifier,
			display_name,
			legacy,
		}
	}

	pub const fn legacy(
		identifier: &'static str,
		display_name: &'static str,
	) -> Self {
		Self::new(identifier, display_name, true)
	}

	pub const fn current(
		identifier: &'static str,
		display_name: &'static str,
	) -> Self {
		Self::new(identifier, display_name, false)
	}

	pub fn is_legacy(&self) -> bool {
		self.legacy
	}
}

pub type MacFactory =
	fn(&KeyMaterial) -> Result<Box<dyn SingleKeyMac>, MacError>;

/// Built-in catalog entry: metadata plus a constructor function.
#[derive(Clone, Copy)]
pub struct MacAlgorithm {
	pub metadata: MacAlgorithmMetadata,
	pub factory: MacFactory,
}

impl MacAlgorithm {
	pub const fn new(
		metadata: MacAlgorithmMetadata,
		factory: MacFactory,
	) -> Self {
		Self { metadata, factory }
	}
}

impl KeyManager for MacAlgorithm {
	fn metadata(&self) -> MacAlgorithmMetadata {
		self.metadata
	}

	fn primitive(
		&self,
		material: &KeyMaterial,
	) -> Result<Box<dyn SingleKeyMac>, MacError> {
		(self.factory)(material)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacErrorKind {
	EmptyKeyset,
	NoPrimaryKey,
	MultiplePrimaryKeys,
	DuplicatePrefix,
	UnsupportedKeyType,
	MalformedKeyMaterial,
	ComputationFailed,
	InvalidTagLength,
	VerificationFailed,
}

#[derive(Debug)]
pub struct MacError {
	kind: MacErrorKind,
	message: Cow<'static, str>,
}

impl MacError {
	pub fn new(
		kind: MacErrorKind,
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	/// The single failure returned for every rejected tag, whatever
	/// the reason.
	pub fn verification_failed() -> Self {
		Self::new(
			MacErrorKind::VerificationFailed,
			"MAC verification failed",
		)
	}

	pub fn kind(&self) -> MacErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		self.message.as_ref()
	}

	pub fn is_verification_failure(&self) -> bool {
		self.kind == MacErrorKind::VerificationFailed
	}

	/// Prefixes the message with the offending key id.
	pub fn for_key(self, key_id: u32) -> Self {
		Self {
			kind: self.kind,
			message: format!("key {}: {}", key_id, self.message).into(),
		}
	}
}

impl std::fmt::Display for MacError {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		write!(f, "{}", self.message)
	}
}

impl std::error::Error for MacError {}

/// Lookup table from algorithm identifier to key manager. Built by the
/// caller and passed into resolution; nothing here is process-global.
#[derive(Default)]
pub struct Registry {
	managers: Vec<Box<dyn KeyManager>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry preloaded with every built-in HMAC and AES-CMAC variant.
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		for algorithm in builtin_algorithms() {
			registry.register(Box::new(*algorithm));
		}
		registry
	}

	/// Adds a manager. Managers registered later shadow earlier ones
	/// for the same identifier.
	pub fn register(&mut self, manager: Box<dyn KeyManager>) {
		self.managers.push(manager);
	}

	pub fn key_manager(&self, algorithm: &str) -> Option<&dyn KeyManager> {
		self.managers
			.iter()
			.rev()
			.find(|manager| manager.supports(algorithm))
			.map(|manager| &**manager)
	}

	pub fn metadata(&self) -> Vec<MacAlgorithmMetadata> {
		self.managers.iter().map(|m| m.metadata()).collect()
	}

	pub fn len(&self) -> usize {
		self.managers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.managers.is_empty()
	}
}

pub fn builtin_algorithms() -> impl Iterator<Item = &'static MacAlgorithm>
{
	hmac::catalog().iter().chain(cmac::catalog().iter())
}
