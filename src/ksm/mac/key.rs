// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac
// File: key.rs

//! Key-length and tag-size checks shared by the algorithm catalogs.

use super::registry::{MacError, MacErrorKind};

const AES_CMAC_KEY_LENGTHS: &[usize] = &[16, 24, 32];
pub const MIN_HMAC_KEY_LENGTH: usize = 16;
pub const MIN_TAG_SIZE: usize = 10;

/// Validates that the provided key length is suitable for AES-CMAC.
pub fn validate_cmac_key_length(key: &[u8]) -> Result<(), MacError> {
	if AES_CMAC_KEY_LENGTHS.contains(&key.len()) {
		Ok(())
	} else {
		Err(MacError::new(
			MacErrorKind::MalformedKeyMaterial,
			format!(
				"Invalid CMAC key length: expected 16, 24, or 32 bytes but received {}",
				key.len()
			),
		))
	}
}

pub fn validate_hmac_key_length(key: &[u8]) -> Result<(), MacError> {
	if key.len() >= MIN_HMAC_KEY_LENGTH {
		Ok(())
	} else {
		Err(MacError::new(
			MacErrorKind::MalformedKeyMaterial,
			format!(
				"HMAC keys must be at least {} bytes but received {}",
				MIN_HMAC_KEY_LENGTH,
				key.len()
			),
		))
	}
}

/// Picks the tag size for a key: the requested size when it lies in
/// `MIN_TAG_SIZE..=max`, otherwise `max` when nothing was requested.
pub fn resolve_tag_size(
	display_name: &str,
	requested: Option<usize>,
	max: usize,
) -> Result<usize, MacError> {
	match requested {
		None => Ok(max),
		Some(size) if (MIN_TAG_SIZE..=max).contains(&size) => Ok(size),
		Some(size) => Err(MacError::new(
			MacErrorKind::MalformedKeyMaterial,
			format!(
				"{} tag size must be between {} and {} bytes but {} was requested",
				display_name, MIN_TAG_SIZE, max, size
			),
		)),
	}
}
