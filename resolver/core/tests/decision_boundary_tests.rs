// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Table-driven checks of the decision engine at its boundaries: both, exactly
//! one, or neither protocol complete, crossed with the mixing and preference
//! settings.

mod common;

use common::test_store;
use keyresolver_core::{
    KeyResolver, Protocol, ProtocolUsage, ResolutionStatus, ResolvedProtocol, ResolverPolicy,
};

const BOTH: &[&str] = &["full-validity@example.net"];
const OPENPGP_ONLY: &[&str] = &["sender-openpgp@example.net"];
const CMS_ONLY: &[&str] = &["sender-smime@example.net"];
const SPLIT: &[&str] = &["sender-openpgp@example.net", "sender-smime@example.net"];
const UNKNOWN: &[&str] = &["unknown@example.net"];

struct Case {
    recipients: &'static [&'static str],
    allow_mixed: bool,
    preferred: Option<Protocol>,
    forced: Option<Protocol>,
    status: ResolutionStatus,
    protocol: ResolvedProtocol,
    usage: ProtocolUsage,
    alternative: bool,
}

const fn case(
    recipients: &'static [&'static str],
    allow_mixed: bool,
    preferred: Option<Protocol>,
    forced: Option<Protocol>,
    status: ResolutionStatus,
    protocol: ResolvedProtocol,
    usage: ProtocolUsage,
    alternative: bool,
) -> Case {
    Case {
        recipients,
        allow_mixed,
        preferred,
        forced,
        status,
        protocol,
        usage,
        alternative,
    }
}

#[test]
fn test_decision_table() {
    use ProtocolUsage::{CmsOnly, Mixed as MixedUsage, OpenPgpOnly};
    use ResolutionStatus::{FullyResolved as Done, NeedsDisambiguation as Ask};
    use ResolvedProtocol::{Cms, Mixed, OpenPgp};

    let pgp = Some(Protocol::OpenPgp);
    let cms = Some(Protocol::Cms);

    let cases = [
        // both protocols complete
        case(BOTH, true, None, None, Done, Mixed, OpenPgpOnly, false),
        case(BOTH, true, cms, None, Done, Mixed, CmsOnly, false),
        case(BOTH, false, None, None, Done, OpenPgp, OpenPgpOnly, true),
        case(BOTH, false, pgp, None, Done, OpenPgp, OpenPgpOnly, true),
        case(BOTH, false, cms, None, Done, Cms, CmsOnly, true),
        // exactly one protocol complete
        case(OPENPGP_ONLY, true, None, None, Done, Mixed, OpenPgpOnly, false),
        case(OPENPGP_ONLY, true, cms, None, Done, Mixed, OpenPgpOnly, false),
        case(OPENPGP_ONLY, false, cms, None, Done, OpenPgp, OpenPgpOnly, false),
        case(CMS_ONLY, true, None, None, Done, Mixed, CmsOnly, false),
        case(CMS_ONLY, false, pgp, None, Done, Cms, CmsOnly, false),
        // neither complete, merge closes the gap
        case(SPLIT, true, None, None, Done, Mixed, MixedUsage, false),
        case(SPLIT, false, None, None, Ask, OpenPgp, OpenPgpOnly, true),
        case(SPLIT, false, cms, None, Ask, Cms, CmsOnly, true),
        // neither complete, gap remains
        case(UNKNOWN, true, None, None, Ask, Mixed, OpenPgpOnly, false),
        case(UNKNOWN, false, cms, None, Ask, Cms, CmsOnly, true),
        // forced protocol
        case(BOTH, true, None, cms, Done, Cms, CmsOnly, false),
        case(CMS_ONLY, true, None, pgp, Ask, OpenPgp, OpenPgpOnly, false),
        case(SPLIT, false, None, cms, Ask, Cms, CmsOnly, false),
    ];

    let store = test_store();
    for (i, case) in cases.iter().enumerate() {
        let policy = ResolverPolicy {
            allow_mixed: case.allow_mixed,
            preferred_protocol: case.preferred,
            forced_protocol: case.forced,
            ..Default::default()
        };
        let mut resolver = KeyResolver::new(store.clone(), policy);
        resolver.set_recipients(case.recipients.iter().copied()).unwrap();

        let result = resolver.resolve().unwrap();

        assert_eq!(result.status, case.status, "case {i}");
        assert_eq!(result.solution.protocol, case.protocol, "case {i}");
        assert_eq!(result.usage, case.usage, "case {i}");
        assert_eq!(result.alternative.is_some(), case.alternative, "case {i}");
        assert_eq!(
            result.solution.encryption_certificates.len(),
            case.recipients.len(),
            "case {i}: every recipient is reported"
        );
    }
}

#[test]
fn test_signing_completes_or_blocks_a_protocol() {
    // sender-openpgp can only sign with OpenPGP; encrypting to an S/MIME-only
    // recipient leaves no complete protocol, and the merged solution lacks an
    // S/MIME signing certificate.
    let mut resolver = KeyResolver::new(
        test_store(),
        ResolverPolicy {
            sign: true,
            ..Default::default()
        },
    );
    resolver.set_sender("sender-openpgp@example.net").unwrap();
    resolver.set_recipients(["sender-smime@example.net"]).unwrap();

    let result = resolver.resolve().unwrap();

    assert_eq!(result.status, ResolutionStatus::NeedsDisambiguation);
    assert!(result.missing_signing());
    assert!(result.unresolved_addresses().is_empty());
}
