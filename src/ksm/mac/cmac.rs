// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: cmac.rs

//! CMAC single-key primitives for AES-128/192/256 keys.

use aes::{Aes128, Aes192, Aes256};
use cmac::{Cmac, Mac};
use digest::KeyInit;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::key::{resolve_tag_size, validate_cmac_key_length};
use super::registry::{
	MacAlgorithm, MacAlgorithmMetadata, MacError, MacErrorKind,
	SingleKeyMac,
};
use crate::ksm::keyset::KeyMaterial;

type CmacAes128 = Cmac<Aes128>;
type CmacAes192 = Cmac<Aes192>;
type CmacAes256 = Cmac<Aes256>;

const CMAC_TAG_LEN: usize = 16;

pub fn catalog() -> &'static [MacAlgorithm] {
	const ALGORITHMS: &[MacAlgorithm] = &[
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"cmac-aes128",
				"CMAC-AES128",
			),
			create_cmac_aes128,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"cmac-aes192",
				"CMAC-AES192",
			),
			create_cmac_aes192,
		),
		MacAlgorithm::new(
			MacAlgorithmMetadata::current(
				"cmac-aes256",
				"CMAC-AES256",
			),
			create_cmac_aes256,
		),
	];
	ALGORITHMS
}

enum CmacVariant {
	Aes128,
	Aes192,
	Aes256,
}

// Only the zeroizing key copy is stored; the AES key schedule is
// rebuilt per call.
struct CmacPrimitive {
	variant: CmacVariant,
	key: Zeroizing<Vec<u8>>,
	tag_size: usize,
}

impl SingleKeyMac for CmacPrimitive {
	fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
		let mut tag = match self.variant {
			CmacVariant::Aes128 => {
				keyed_tag::<CmacAes128>(&self.key, data)?
			}
			CmacVariant::Aes192 => {
				keyed_tag::<CmacAes192>(&self.key, data)?
			}
			CmacVariant::Aes256 => {
				keyed_tag::<CmacAes256>(&self.key, data)?
			}
		};
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
			"AES-CMAC rejected the stored key",
		)
	})?;
	mac.update(data);
	Ok(mac.finalize().into_bytes().to_vec())
}

fn create_cmac(
	variant: CmacVariant,
	display_name: &str,
	expected_len: usize,
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	let key = material.value();
	validate_cmac_key_length(key)?;
	if key.len() != expected_len {
		return Err(MacError::new(
			MacErrorKind::MalformedKeyMaterial,
			format!(
				"Invalid {} key length: expected {} bytes but received {}",
				display_name,
				expected_len,
				key.len()
			),
		));
	}
	let tag_size =
		resolve_tag_size(display_name, material.tag_size(), CMAC_TAG_LEN)?;
	Ok(Box::new(CmacPrimitive {
		variant,
		key: Zeroizing::new(key.to_vec()),
		tag_size,
	}))
}

fn create_cmac_aes128(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_cmac(CmacVariant::Aes128, "CMAC-AES128", 16, material)
}

fn create_cmac_aes192(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_cmac(CmacVariant::Aes192, "CMAC-AES192", 24, material)
}

fn create_cmac_aes256(
	material: &KeyMaterial,
) -> Result<Box<dyn SingleKeyMac>, MacError> {
	create_cmac(CmacVariant::Aes256, "CMAC-AES256", 32, material)
}
