// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// Module: mac (keyset message authentication codes)

//! Keyset-level MAC support. Submodules provide the algorithm registry,
//! per-algorithm primitives, key resolution, the validated primitive
//! set, the multi-key wrapper, and CLI handlers.

pub mod cmac;
pub mod commands;
pub mod executor;
pub mod hmac;
pub mod key;
pub mod prefix;
pub mod primitive_set;
pub mod registry;
pub mod resolver;
pub mod wrapper;

pub use primitive_set::{EntryInfo, PrimitiveEntry, PrimitiveSet};
pub use registry::{
	KeyManager, MacAlgorithmMetadata, MacError, MacErrorKind, Registry,
	SingleKeyMac,
};
pub use resolver::PrimitiveResolver;
pub use wrapper::MultiKeyMac;
