// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared certificate population for the resolver integration tests.
//!
//! | Address | OpenPGP | S/MIME |
//! |---------|---------|--------|
//! | sender-mixed | ultimate, secret | full, secret |
//! | sender-openpgp | ultimate, secret | - |
//! | sender-smime | - | full, secret |
//! | prefer-openpgp | ultimate | full |
//! | full-validity | full | full |
//! | prefer-smime | marginal | full |

#![allow(dead_code)]

use std::sync::Arc;

use keyresolver_core::{Certificate, InMemoryCertificateStore, Protocol, UserId, Validity};

const FIXTURES: &[(&str, Protocol, &str, Validity, bool)] = &[
    ("sender-mixed@example.net", Protocol::OpenPgp, "1BA323932B3FAA826132C79E8D9860C58F246DE6", Validity::Ultimate, true),
    ("sender-mixed@example.net", Protocol::Cms, "C7A3CC3B48B17F1A3EE6B6B0A8B5B4E8DD5E3F01", Validity::Full, true),
    ("sender-openpgp@example.net", Protocol::OpenPgp, "3FDC0EA5A1A1E2A4B4C3D5F6E7A8B9C0D1E2F304", Validity::Ultimate, true),
    ("sender-smime@example.net", Protocol::Cms, "9E0B8D5F1B4C2A3E4F5061728394A5B6C7D8E905", Validity::Full, true),
    ("prefer-openpgp@example.net", Protocol::OpenPgp, "2E4B3C4D5E6F708192A3B4C5D6E7F8091A2B3C06", Validity::Ultimate, false),
    ("prefer-openpgp@example.net", Protocol::Cms, "5A6B7C8D9E0F1A2B3C4D5E6F708192A3B4C5D607", Validity::Full, false),
    ("full-validity@example.net", Protocol::OpenPgp, "6C7D8E9FA0B1C2D3E4F5061728394A5B6C7D8E08", Validity::Full, false),
    ("full-validity@example.net", Protocol::Cms, "7D8E9FA0B1C2D3E4F5061728394A5B6C7D8E9F09", Validity::Full, false),
    ("prefer-smime@example.net", Protocol::OpenPgp, "8E9FA0B1C2D3E4F5061728394A5B6C7D8E9FA00A", Validity::Marginal, false),
    ("prefer-smime@example.net", Protocol::Cms, "9FA0B1C2D3E4F5061728394A5B6C7D8E9FA0B10B", Validity::Full, false),
];

pub fn test_certificate(address: &str, protocol: Protocol) -> Certificate {
    let (address, protocol, fingerprint, validity, secret) = FIXTURES
        .iter()
        .find(|(a, p, ..)| *a == address && *p == protocol)
        .copied()
        .unwrap_or_else(|| panic!("no {protocol} fixture for {address}"));
    let uid = UserId::new(address.parse().unwrap(), validity);
    let cert = Certificate::new(fingerprint, protocol, uid).with_encryption();
    if secret {
        cert.with_signing().with_secret()
    } else {
        cert
    }
}

pub fn fingerprint(address: &str, protocol: Protocol) -> String {
    test_certificate(address, protocol).fingerprint
}

pub fn test_store() -> Arc<InMemoryCertificateStore> {
    let store = InMemoryCertificateStore::new();
    for (address, protocol, ..) in FIXTURES {
        store.insert(test_certificate(address, *protocol));
    }
    Arc::new(store)
}
