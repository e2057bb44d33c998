// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keysetmac

use hex_literal::hex;
use keysetmac::ksm::keyset::{
	KeyEntry, KeyMaterial, KeyStatus, Keyset, OutputPrefix,
};
use keysetmac::ksm::mac::{
	KeyManager, MacAlgorithmMetadata, MacError, MacErrorKind, MultiKeyMac,
	PrimitiveResolver, Registry, SingleKeyMac,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strum::IntoEnumIterator;

fn hmac_entry(key_id: u32, prefix: OutputPrefix) -> KeyEntry {
	KeyEntry::new(
		key_id,
		prefix,
		KeyMaterial::new("hmac-sha256", &[key_id as u8; 32]),
	)
}

fn build(keyset: &Keyset) -> Result<MultiKeyMac, MacError> {
	let registry = Registry::with_defaults();
	MultiKeyMac::from_keyset(keyset, &PrimitiveResolver::new(&registry))
}

fn fixture(name: &str) -> Keyset {
	let path = Path::new("tests/fixtures/keysets").join(name);
	Keyset::from_file(&path).expect("fixture keyset")
}

#[test]
fn compute_then_verify_round_trips_for_every_prefix() {
	for prefix in OutputPrefix::iter() {
		let mac =
			build(&Keyset::new(vec![hmac_entry(7, prefix).primary()]))
				.expect("mac");
		let messages: [&[u8]; 3] = [b"", b"hello", &[0u8; 1000]];
		for message in messages {
			let tag = mac.compute_mac(message).expect("tag");
			assert!(
				mac.verify_mac(&tag, message).is_ok(),
				"{} round trip",
				prefix
			);
		}
	}
}

#[test]
fn tampering_any_byte_fails_verification() {
	let mac = build(&Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Tink).primary(),
		hmac_entry(2, OutputPrefix::Raw),
	]))
	.expect("mac");
	let tag = mac.compute_mac(b"payload").expect("tag");
	for index in 0..tag.len() {
		let mut forged = tag.clone();
		forged[index] ^= 0x01;
		let err = mac.verify_mac(&forged, b"payload").unwrap_err();
		assert_eq!(err.kind(), MacErrorKind::VerificationFailed);
	}
	assert!(mac.verify_mac(&tag, b"payloae").is_err());
}

#[test]
fn rotation_example_from_hello() {
	let mut keyset = Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Tink).primary(),
		hmac_entry(2, OutputPrefix::Tink),
	]);
	let mac = build(&keyset).expect("mac");
	let tag = mac.compute_mac(b"hello").expect("tag");
	assert_eq!(&tag[..5], &hex!("0100000001"));

	// Promote key 2; tags from key 1 still verify while it is enabled.
	keyset.set_primary(2);
	let rotated = build(&keyset).expect("rotated");
	let fresh = rotated.compute_mac(b"hello").expect("tag");
	assert_eq!(&fresh[..5], &hex!("0100000002"));
	assert!(rotated.verify_mac(&tag, b"hello").is_ok());

	keyset.set_status(1, KeyStatus::Disabled);
	let disabled = build(&keyset).expect("disabled");
	let err = disabled.verify_mac(&tag, b"hello").unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::VerificationFailed);

	keyset.set_status(1, KeyStatus::Destroyed);
	let destroyed = build(&keyset).expect("destroyed");
	assert!(destroyed.verify_mac(&tag, b"hello").is_err());
}

#[test]
fn disabling_the_primary_key_invalidates_its_tags() {
	let mut keyset = Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Tink).primary(),
		hmac_entry(2, OutputPrefix::Tink),
	]);
	let tag = build(&keyset)
		.and_then(|mac| mac.compute_mac(b"hello"))
		.expect("tag");
	keyset.set_status(1, KeyStatus::Disabled);
	let err = build(&keyset).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::NoPrimaryKey);
	keyset.set_primary(2);
	let mac = build(&keyset).expect("mac");
	assert!(mac
		.verify_mac(&tag, b"hello")
		.unwrap_err()
		.is_verification_failure());
}

#[test]
fn every_raw_key_is_tried() {
	let keyset = Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Tink).primary(),
		hmac_entry(2, OutputPrefix::Raw),
		hmac_entry(3, OutputPrefix::Raw),
		hmac_entry(4, OutputPrefix::Raw),
	]);
	let verifier = build(&keyset).expect("mac");
	for key_id in 2..=4 {
		let signer = build(&Keyset::new(vec![
			hmac_entry(key_id, OutputPrefix::Raw).primary(),
		]))
		.expect("signer");
		let tag = signer.compute_mac(b"raw message").expect("tag");
		assert!(verifier.verify_mac(&tag, b"raw message").is_ok());
	}
}

#[test]
fn construction_errors_follow_the_taxonomy() {
	let kind = |entries: Vec<KeyEntry>| {
		build(&Keyset::new(entries)).unwrap_err().kind()
	};
	assert_eq!(kind(Vec::new()), MacErrorKind::EmptyKeyset);
	assert_eq!(
		kind(vec![hmac_entry(1, OutputPrefix::Tink)]),
		MacErrorKind::NoPrimaryKey
	);
	assert_eq!(
		kind(vec![
			hmac_entry(1, OutputPrefix::Tink).primary(),
			hmac_entry(2, OutputPrefix::Raw).primary(),
		]),
		MacErrorKind::MultiplePrimaryKeys
	);
	assert_eq!(
		kind(vec![
			hmac_entry(1, OutputPrefix::Crunchy).primary(),
			hmac_entry(1, OutputPrefix::Legacy),
		]),
		MacErrorKind::DuplicatePrefix
	);
	assert_eq!(
		kind(vec![KeyEntry::new(
			1,
			OutputPrefix::Tink,
			KeyMaterial::new("kmac256", &[0u8; 32]),
		)
		.primary()]),
		MacErrorKind::UnsupportedKeyType
	);
	assert_eq!(
		kind(vec![KeyEntry::new(
			1,
			OutputPrefix::Tink,
			KeyMaterial::new("cmac-aes128", &[0u8; 32]),
		)
		.primary()]),
		MacErrorKind::MalformedKeyMaterial
	);
}

#[test]
fn disabled_duplicates_are_tolerated() {
	let keyset = Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Tink).primary(),
		hmac_entry(1, OutputPrefix::Tink).with_status(KeyStatus::Disabled),
	]);
	assert!(build(&keyset).is_ok());
}

#[test]
fn fixture_keyset_verifies_each_enabled_key() {
	let keyset = fixture("rotation.json");
	assert_eq!(keyset.len(), 4);
	let mac = build(&keyset).expect("mac");
	assert_eq!(mac.primary_key_id(), 1);
	assert_eq!(mac.primitive_set().len(), 3);

	// Key 1 is HMAC-SHA256 with the RFC 4231 case 1 key.
	let tag = mac.compute_mac(b"Hi There").expect("tag");
	assert_eq!(
		tag,
		hex!("0100000001b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
	);

	// Key 3 is RAW AES-CMAC with the RFC 4493 key.
	let cmac_tag = hex!("bb1d6929e95937287fa37d129b756746");
	assert!(mac.verify_mac(&cmac_tag, b"").is_ok());
	assert!(mac.verify_mac(&cmac_tag, b"x").is_err());
}

#[test]
fn fixture_with_two_primaries_is_rejected() {
	let err = build(&fixture("two_primaries.json")).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::MultiplePrimaryKeys);
}

#[test]
fn short_tags_report_invalid_length() {
	let mac = build(&Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Raw).primary()
	]))
	.expect("mac");
	for len in 0..=5 {
		let err = mac.verify_mac(&vec![0u8; len], b"m").unwrap_err();
		assert_eq!(err.kind(), MacErrorKind::InvalidTagLength);
	}
}

#[test]
fn shared_across_threads() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<MultiKeyMac>();

	let mac = build(&Keyset::new(vec![
		hmac_entry(1, OutputPrefix::Tink).primary(),
		hmac_entry(2, OutputPrefix::Raw),
	]))
	.expect("mac");
	std::thread::scope(|scope| {
		for worker in 0..4u8 {
			let mac = &mac;
			scope.spawn(move || {
				for round in 0..50u8 {
					let message = [worker, round];
					let tag = mac.compute_mac(&message).expect("tag");
					assert!(mac.verify_mac(&tag, &message).is_ok());
				}
			});
		}
	});
}

struct CountingMac {
	inner: Box<dyn SingleKeyMac>,
	verifications: Arc<AtomicUsize>,
}

impl SingleKeyMac for CountingMac {
	fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>, MacError> {
		self.inner.compute_mac(data)
	}

	fn verify_mac(
		&self,
		tag: &[u8],
		data: &[u8],
	) -> Result<(), MacError> {
		self.verifications.fetch_add(1, Ordering::SeqCst);
		self.inner.verify_mac(tag, data)
	}
}

struct CountingManager {
	verifications: Arc<AtomicUsize>,
}

impl KeyManager for CountingManager {
	fn metadata(&self) -> MacAlgorithmMetadata {
		MacAlgorithmMetadata::current("counting-hmac", "Counting HMAC")
	}

	fn primitive(
		&self,
		material: &KeyMaterial,
	) -> Result<Box<dyn SingleKeyMac>, MacError> {
		let registry = Registry::with_defaults();
		let hmac = registry
			.key_manager("hmac-sha256")
			.expect("hmac manager")
			.primitive(material)?;
		Ok(Box::new(CountingMac {
			inner: hmac,
			verifications: Arc::clone(&self.verifications),
		}))
	}
}

#[test]
fn unknown_and_wrong_tags_cost_the_same_work() {
	let verifications = Arc::new(AtomicUsize::new(0));
	let manager = CountingManager {
		verifications: Arc::clone(&verifications),
	};
	let registry = Registry::new();
	let resolver =
		PrimitiveResolver::new(&registry).with_key_manager(&manager);
	let keyset = Keyset::new(vec![KeyEntry::new(
		1,
		OutputPrefix::Tink,
		KeyMaterial::new("counting-hmac", &[9u8; 32]),
	)
	.primary()]);
	let mac = MultiKeyMac::from_keyset(&keyset, &resolver).expect("mac");
	let tag = mac.compute_mac(b"m").expect("tag");

	let mut wrong = tag.clone();
	let last = wrong.len() - 1;
	wrong[last] ^= 0xff;
	let wrong_err = mac.verify_mac(&wrong, b"m").unwrap_err();
	let wrong_work = verifications.swap(0, Ordering::SeqCst);

	let mut unknown = tag.clone();
	unknown[1..5].copy_from_slice(&99u32.to_be_bytes());
	let unknown_err = mac.verify_mac(&unknown, b"m").unwrap_err();
	let unknown_work = verifications.swap(0, Ordering::SeqCst);

	assert_eq!(wrong_work, 1);
	assert_eq!(unknown_work, wrong_work);
	assert_eq!(wrong_err.kind(), unknown_err.kind());
	assert_eq!(wrong_err.to_string(), unknown_err.to_string());

	assert!(mac.verify_mac(&tag, b"m").is_ok());
	assert_eq!(verifications.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_prefix_costs_the_same_work_with_raw_keys() {
	let verifications = Arc::new(AtomicUsize::new(0));
	let manager = CountingManager {
		verifications: Arc::clone(&verifications),
	};
	let registry = Registry::new();
	let resolver =
		PrimitiveResolver::new(&registry).with_key_manager(&manager);
	let keyset = Keyset::new(vec![
		KeyEntry::new(
			1,
			OutputPrefix::Tink,
			KeyMaterial::new("counting-hmac", &[9u8; 32]),
		)
		.primary(),
		KeyEntry::new(
			2,
			OutputPrefix::Raw,
			KeyMaterial::new("counting-hmac", &[5u8; 32]),
		),
	]);
	let mac = MultiKeyMac::from_keyset(&keyset, &resolver).expect("mac");
	let tag = mac.compute_mac(b"m").expect("tag");

	let mut wrong = tag.clone();
	let last = wrong.len() - 1;
	wrong[last] ^= 0xff;
	assert!(mac.verify_mac(&wrong, b"m").is_err());
	let wrong_work = verifications.swap(0, Ordering::SeqCst);

	let mut unknown = tag.clone();
	unknown[1..5].copy_from_slice(&99u32.to_be_bytes());
	assert!(mac.verify_mac(&unknown, b"m").is_err());
	let unknown_work = verifications.swap(0, Ordering::SeqCst);

	assert_eq!(wrong_work, 2);
	assert_eq!(unknown_work, wrong_work);
}
