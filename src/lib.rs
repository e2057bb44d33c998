// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: lib.rs

//! Resolve a multi-key keyset into one MAC primitive.
//!
//! ```
//! use keysetmac::ksm::keyset::{KeyEntry, KeyMaterial, Keyset, OutputPrefix};
//! use keysetmac::ksm::mac::{MultiKeyMac, PrimitiveResolver, Registry};
//!
//! let registry = Registry::with_defaults();
//! let keyset = Keyset::new(vec![KeyEntry::new(
//! 	1,
//! 	OutputPrefix::Tink,
//! 	KeyMaterial::new("hmac-sha256", &[7u8; 32]),
//! )
//! .primary()]);
//! let mac =
//! 	MultiKeyMac::from_keyset(&keyset, &PrimitiveResolver::new(&registry))?;
//! let tag = mac.compute_mac(b"hello")?;
//! mac.verify_mac(&tag, b"hello")?;
//! # Ok::<(), keysetmac::ksm::mac::MacError>(())
//! ```

pub mod ksm {
	pub mod app;
	pub mod keyset;
	pub mod mac;
}
