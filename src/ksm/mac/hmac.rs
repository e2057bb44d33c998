// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: hmac.rs

//! HMAC single-key primitives covering SHA-1 (legacy) and SHA-2/SHA-3
//! variants, with optional left truncation of the tag.

use digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::key::{resolve_tag_size, validate_hmac_key_length};
use super::registry::{
	MacAlgorithm, MacAlgorithmMetadata, MacError, MacErrorKind,
	SingleKeyMac,
};
use crate::ksm::keyset::KeyMaterial;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;
type HmacSha3_256 = Hmac<Sha3_256>;
type HmacSha3_512 = Hmac<Sha3_512>;

pub fn catalog() -> &'static [MacAlgorithm] {
	const ALGORITHMS: &[MacAlgorithm] = &[
		MacAlgorithm::new(
			MacAlgorithmMetadata::legacy("hmac-sha1", "HMAC-SHA1"),
			create_hmac_sha1,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"hmac-sha256",
				"HMAC-SHA256",
			),
			create_hmac_sha256,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"hmac-sha384",
				"HMAC-SHA384",
			),
			create_hmac_sha384,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"hmac-sha512",
				"HMAC-SHA512",
			),
			create_hmac_sha512,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"hmac-sha3-256",
				"HMAC-SHA3-256",
			),
			create_hmac_sha3_256,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"hmac-sha3-512",
				"HMAC-SHA3-512",
			),
			create_hmac_sha3_512,
		),
	];
	ALGORITHMS
}

#[derive(Clone, Copy)]
enum HmacVariant {
	Sha1,
	Sha256,
	Sha384,
	Sha512,
	Sha3_256,
	Sha3_512,
}

impl HmacVariant {
	fn display_name(self) -> &'static str {
		match self {
			HmacVariant::Sha1 => "HMAC-SHA1",
			HmacVariant::Sha256 => "HMAC-SHA256",
			HmacVariant::Sha384 => "HMAC-SHA384",
			HmacVariant::Sha512 => "HMAC-SHA512",
			HmacVariant::Sha3_256 => "HMAC-SHA3-256",
			HmacVariant::Sha3_512 => "HMAC-SHA3-512",
		}
	}

	fn output_len(self) -> usize {
		match self {
			HmacVariant::Sha1 => 20,
			HmacVariant::Sha256 | HmacVariant::Sha3_256 => 32,
			HmacVariant::Sha384 => 48,
			HmacVariant::Sha512 | HmacVariant::Sha3_512 => 64,
		}
	}
}

struct HmacPrimitive {
	variant: HmacVariant,
	key: Zeroizing<Vec<u8>>,
	tag_size: usize,
}

impl HmacPrimitive {
	fn full_tag(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
		match self.variant {
			HmacVariant::Sha1 => keyed_tag::<HmacSha1>(&self.key, data),
			HmacVariant::Sha256 => {
				keyed_tag::<HmacSha256>(&self.key, data)
			}
			HmacVariant::Sha384 => {
				keyed_tag::<HmacSha384>(&self.key, data)
			}
			HmacVariant::Sha512 => {
				keyed_tag::<HmacSha512>(&self.key, data)
			}
			HmacVariant::Sha3_256 => {
				keyed_tag::<HmacSha3_256>(&self.key, data)
			}
			HmacVariant::Sha3_512 => {
				keyed_tag::<HmacSha3_512>(&self.key, data)
			}
		}
	}
}

impl SingleKeyMac for HmacPrimitive {
	fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
		let mut tag = self.full_tag(data)?;
		tag.truncate(self.tag_size);
		Ok(tag)
	}

	fn verify_mac(
		&self,
		tag: &[u8],
		data: &[u8],
	) -> Result<(), MacError> {
		let expected = Zeroizing::new(self.compute_mac(data)?);
		if bool::from(expected.as_slice().ct_eq(tag)) {
			Ok(())
		} else {
			Err(MacError::verification_failed())
		}
	}
}

fn keyed_tag<M>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, MacError>
where
	M: Mac + KeyInit,
{
	let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| {
		MacError::new(
			MacErrorKind::ComputationFailed,
			"HMAC rejected the stored key",
		)
	})?;
	mac.update(data);
	Ok(mac.finalize().into_bytes().to_vec())
}

fn create_hmac(
	variant: HmacVariant,
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	let key = material.value();
	validate_hmac_key_length(key)?;
	let tag_size = resolve_tag_size(
		variant.display_name(),
		material.tag_size(),
		variant.output_len(),
	)?;
	Ok(Box::new(HmacPrimitive {
		variant,
		key: Zeroizing::new(key.to_vec()),
		tag_size,
	}))
}

fn create_hmac_sha1(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_hmac(HmacVariant::Sha1, material)
}

fn create_hmac_sha256(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_hmac(HmacVariant::Sha256, material)
}

fn create_hmac_sha384(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_hmac(HmacVariant::Sha384, material)
}

fn create_hmac_sha512(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_hmac(HmacVariant::Sha512, material)
}

fn create_hmac_sha3_256(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_hmac(HmacVariant::Sha3_256, material)
}

fn create_hmac_sha3_512(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_hmac(HmacVariant::Sha3_512, material)
}
