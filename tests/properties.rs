//! End-to-end scenarios S1-S6, exercised through the crate's public API
//! exactly the way a handshake implementation would drive it: construct on
//! one side, collect + dispatch on the other.

use tls_ext_core::context::{ContextFlags, Version};
use tls_ext_core::crypto::RingHkdf;
use tls_ext_core::custom::NoCustomExtensions;
use tls_ext_core::error::Error;
use tls_ext_core::psk::{derive_binder, verify_binder, PskOrigin};
use tls_ext_core::session::{Role, SessionState};
use tls_ext_core::wire::{VecWriter, Writer};
use tls_ext_core::{collector, dispatcher};

fn encode_extension(w: &mut VecWriter, type_code: u16, body: &[u8]) {
    w.put_u16(type_code);
    w.start_u16_length_prefixed();
    w.put_bytes(body);
    w.close(false);
}

/// S1: a ClientHello with `supported_groups` listed twice is rejected at
/// the collect phase, before any leaf ever runs.
#[test]
fn s1_duplicate_supported_groups_rejected() {
    let mut w = VecWriter::new();
    encode_extension(&mut w, 10, &[0x00, 0x02, 0x00, 0x1d]);
    encode_extension(&mut w, 10, &[0x00, 0x02, 0x00, 0x17]);

    let server = SessionState::builder(Role::Server).build();
    let mut registry = NoCustomExtensions;
    let err =
        collector::collect_extensions(w.bytes(), ContextFlags::CLIENT_HELLO, &server, &mut registry)
            .unwrap_err();
    assert!(matches!(err, Error::Duplicate(10)));
}

/// S2: `pre_shared_key` must be the last extension in a ClientHello; a
/// padding extension trailing it is rejected outright, regardless of the
/// padding's own validity.
#[test]
fn s2_psk_not_last_rejected() {
    let mut w = VecWriter::new();
    encode_extension(&mut w, 41, &[0x00, 0x00]);
    encode_extension(&mut w, 21, &[0x00, 0x00, 0x00]);

    let server = SessionState::builder(Role::Server).build();
    let mut registry = NoCustomExtensions;
    let err =
        collector::collect_extensions(w.bytes(), ContextFlags::CLIENT_HELLO, &server, &mut registry)
            .unwrap_err();
    assert!(matches!(err, Error::PskNotLast));
}

/// S3: a server that sends `server_name` in a ServerHello the client never
/// solicited is a protocol violation, not a silently ignored extension.
#[test]
fn s3_unsolicited_server_name_rejected() {
    let mut w = VecWriter::new();
    encode_extension(&mut w, 0, &[]);

    let client = SessionState::builder(Role::Client).build();
    let mut registry = NoCustomExtensions;
    let err = collector::collect_extensions(
        w.bytes(),
        ContextFlags::TLS1_2_SERVER_HELLO,
        &client,
        &mut registry,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Unsolicited(0)));
}

/// S4: a server with no key-share group in common with the client's single
/// offered share, but a mutually supported group elsewhere in
/// `supported_groups`, must trigger a HelloRetryRequest rather than
/// failing the handshake outright. The ClientHello is built through the
/// real `construct_all` pipeline (not hand-encoded), which is the only way
/// `signature_algorithms` actually ends up mandatory-and-present.
#[test]
fn s4_key_share_mismatch_triggers_hello_retry_request() {
    let mut client = SessionState::builder(Role::Client)
        .with_version(Version::Tls1_3)
        .build();
    let mut custom = NoCustomExtensions;
    let mut out = VecWriter::new();
    dispatcher::construct_all(&mut client, &mut out, ContextFlags::CLIENT_HELLO, &mut custom).unwrap();

    let mut server = SessionState::builder(Role::Server)
        .with_version(Version::Tls1_3)
        .build();
    server.supported_groups_local = vec![23, 24];
    server.supported_groups_peer = Some(vec![29, 24]);
    server.key_share_group = None;

    // `construct_all` wraps its output in its own 2-byte length prefix
    // (spec §4.4 step 1), which a caller strips before collecting.
    let collected = collector::collect_extensions(
        &out.bytes()[2..],
        ContextFlags::CLIENT_HELLO,
        &server,
        &mut custom,
    )
    .unwrap();
    dispatcher::init_all(&mut server, ContextFlags::CLIENT_HELLO).unwrap();
    dispatcher::parse_all(&mut server, &collected, ContextFlags::CLIENT_HELLO, &mut custom).unwrap();

    assert!(server.hello_retry_request);
}

/// S5: resuming a session that used `extended_master_secret` but whose new
/// ClientHello omits it (or vice versa) is a downgrade attempt and must
/// fail the handshake.
#[test]
fn s5_extended_master_secret_inconsistency_rejected() {
    // no extended_master_secret extension present this time
    let mut server = SessionState::builder(Role::Server)
        .with_version(Version::Tls1_2)
        .build();
    server.is_resumption = true;
    server.ems_was_used_in_resumed_session = true;

    let mut registry = NoCustomExtensions;
    let collected =
        collector::collect_extensions(&[], ContextFlags::CLIENT_HELLO, &server, &mut registry).unwrap();
    dispatcher::init_all(&mut server, ContextFlags::CLIENT_HELLO).unwrap();
    let err = dispatcher::parse_all(
        &mut server,
        &collected,
        ContextFlags::CLIENT_HELLO,
        &mut NoCustomExtensions,
    )
    .unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
}

/// S6: a PSK binder computed over the right transcript hash and PSK
/// verifies; a binder computed over a different PSK does not.
#[test]
fn s6_psk_binder_detects_wrong_psk() {
    let hkdf = RingHkdf::sha256();
    let transcript_hash = [0x55u8; 32];
    let real_psk = [0xAAu8; 32];
    let wrong_psk = [0xBBu8; 32];

    let binder = derive_binder(&hkdf, &hkdf, &real_psk, PskOrigin::Resumption, &transcript_hash);
    assert!(verify_binder(
        &hkdf,
        &hkdf,
        &real_psk,
        PskOrigin::Resumption,
        &transcript_hash,
        &binder
    )
    .is_ok());
    assert!(verify_binder(
        &hkdf,
        &hkdf,
        &wrong_psk,
        PskOrigin::Resumption,
        &transcript_hash,
        &binder
    )
    .is_err());
}

/// S6b: the same binder engine driven through `construct_all`/`collect_extensions`/
/// `parse_all` rather than called directly, so a correct binder written by a
/// real ClientHello actually verifies end to end, and a tampered one is
/// caught as a handshake failure rather than silently accepted.
#[test]
fn s6b_psk_binder_round_trips_through_the_real_dispatch_pipeline() {
    let identity = b"resumption-ticket".to_vec();
    let secret = vec![0x5cu8; 32];

    let mut client = SessionState::builder(Role::Client)
        .with_version(Version::Tls1_3)
        .build();
    client.psk_kex_modes = Some(vec![tls_ext_core::builtins::PSK_DHE_KE]);
    client.psk_crypto = Some(Box::new(RingHkdf::sha256()));
    client.psk_offers.push(tls_ext_core::session::PskOffer {
        identity: identity.clone(),
        secret: secret.clone(),
        origin: PskOrigin::Resumption,
        obfuscated_ticket_age: 0,
    });

    let mut custom = NoCustomExtensions;
    let mut out = VecWriter::new();
    dispatcher::construct_all(&mut client, &mut out, ContextFlags::CLIENT_HELLO, &mut custom).unwrap();

    let build_server = |secret: Vec<u8>, identity: Vec<u8>| {
        let mut server = SessionState::builder(Role::Server)
            .with_version(Version::Tls1_3)
            .build();
        server.psk_crypto = Some(Box::new(RingHkdf::sha256()));
        server.psk_lookup = Some(Box::new(move |id: &[u8]| {
            (id == identity.as_slice()).then(|| (secret.clone(), PskOrigin::Resumption))
        }));
        server
    };

    let mut server = build_server(secret.clone(), identity.clone());
    let collected = collector::collect_extensions(
        &out.bytes()[2..],
        ContextFlags::CLIENT_HELLO,
        &server,
        &mut custom,
    )
    .unwrap();
    dispatcher::init_all(&mut server, ContextFlags::CLIENT_HELLO).unwrap();
    dispatcher::parse_all(&mut server, &collected, ContextFlags::CLIENT_HELLO, &mut custom).unwrap();
    assert_eq!(server.psk_server_selected, Some(0));

    // Tamper with the last binder byte and confirm the same pipeline now
    // rejects it.
    let mut tampered = out.bytes().to_vec();
    *tampered.last_mut().unwrap() ^= 0xFF;
    let mut bad_server = build_server(secret, identity);
    let collected = collector::collect_extensions(
        &tampered[2..],
        ContextFlags::CLIENT_HELLO,
        &bad_server,
        &mut custom,
    )
    .unwrap();
    dispatcher::init_all(&mut bad_server, ContextFlags::CLIENT_HELLO).unwrap();
    let err = dispatcher::parse_all(&mut bad_server, &collected, ContextFlags::CLIENT_HELLO, &mut custom)
        .unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
}
