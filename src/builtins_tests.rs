use super::*;
use crate::session::Role;
use crate::wire::{SliceReader, VecWriter};

fn state() -> SessionState {
    SessionState::builder(Role::Client).build()
}

#[test]
fn server_name_round_trips_client_to_server() {
    let mut client = state();
    client.server_name = Some(b"example.com".to_vec());
    let mut w = VecWriter::new();
    server_name::construct_ctos(&mut client, &mut w, ContextFlags::CLIENT_HELLO).unwrap();

    let mut server = SessionState::builder(Role::Server).build();
    let mut r = SliceReader::new(w.bytes());
    server_name::parse_ctos(&mut server, &mut r, ContextFlags::CLIENT_HELLO).unwrap();
    assert_eq!(server.server_name.as_deref(), Some(&b"example.com"[..]));
}

#[test]
fn ec_point_formats_finalize_rejects_missing_uncompressed() {
    let mut s = state();
    s.cipher_is_ecc = true;
    s.ec_point_formats_peer = Some(alloc::vec![1, 2]);
    let err = ec_point_formats::finalize(&mut s, ContextFlags::NONE, true).unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
}

#[test]
fn ec_point_formats_finalize_ignores_non_ecc_cipher() {
    let mut s = state();
    s.cipher_is_ecc = false;
    s.ec_point_formats_peer = Some(alloc::vec![1, 2]);
    assert!(ec_point_formats::finalize(&mut s, ContextFlags::NONE, true).is_ok());
}

#[test]
fn extended_master_secret_finalize_detects_resumption_mismatch() {
    let mut s = state();
    s.is_resumption = true;
    s.ems_was_used_in_resumed_session = true;
    s.ems_peer = false;
    let err = extended_master_secret::finalize(&mut s, ContextFlags::NONE, true).unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
}

#[test]
fn renegotiate_finalize_requires_extension_on_renegotiation() {
    let mut s = state();
    s.is_renegotiation = true;
    let err = renegotiate::finalize(&mut s, ContextFlags::NONE, false).unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
    assert!(renegotiate::finalize(&mut s, ContextFlags::NONE, true).is_ok());
}

#[test]
fn key_share_server_side_triggers_hrr_on_common_group_mismatch() {
    let mut s = SessionState::builder(Role::Server).build();
    s.supported_groups_local = alloc::vec![23, 24];
    s.supported_groups_peer = Some(alloc::vec![29, 24]);
    s.key_share_group = None;
    key_share::finalize(&mut s, ContextFlags::CLIENT_HELLO, false).unwrap();
    assert!(s.hello_retry_request);
}

#[test]
fn key_share_server_side_fails_with_no_common_group_and_no_psk() {
    let mut s = SessionState::builder(Role::Server).build();
    s.supported_groups_local = alloc::vec![23];
    s.supported_groups_peer = Some(alloc::vec![29]);
    s.key_share_group = None;
    let err = key_share::finalize(&mut s, ContextFlags::CLIENT_HELLO, false).unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
}

#[test]
fn early_data_finalize_rejects_after_hello_retry_request() {
    let mut s = state();
    s.hello_retry_request = true;
    s.early_data_accepted = true;
    let err = early_data::finalize(&mut s, ContextFlags::NONE, true).unwrap_err();
    assert!(matches!(err, Error::HandshakeFailure(_)));
}

#[test]
fn padding_omitted_without_a_configured_target() {
    let mut s = state();
    let mut w = VecWriter::new();
    let res = padding::construct_ctos(&mut s, &mut w, ContextFlags::CLIENT_HELLO).unwrap();
    assert_eq!(res, ConstructResult::NotSent);
}

#[test]
fn signature_algorithms_round_trips_client_to_server() {
    use crate::sigalg::SignatureScheme;

    let mut client = state();
    client.sigalgs_local = alloc::vec![SignatureScheme::ECDSA_NISTP256_SHA256, SignatureScheme::ED25519];
    let mut w = VecWriter::new();
    let res = signature_algorithms::construct_ctos(&mut client, &mut w, ContextFlags::CLIENT_HELLO).unwrap();
    assert_eq!(res, ConstructResult::Sent);

    let mut server = SessionState::builder(Role::Server).build();
    let mut r = SliceReader::new(w.bytes());
    signature_algorithms::parse_ctos(&mut server, &mut r, ContextFlags::CLIENT_HELLO).unwrap();
    assert_eq!(
        server.sigalgs_peer,
        Some(alloc::vec![SignatureScheme::ECDSA_NISTP256_SHA256, SignatureScheme::ED25519])
    );
}

#[test]
fn signature_algorithms_construct_stoc_only_sent_in_certificate_request() {
    let mut s = state();
    let mut w = VecWriter::new();
    let res =
        signature_algorithms::construct_stoc(&mut s, &mut w, ContextFlags::TLS1_3_SERVER_HELLO).unwrap();
    assert_eq!(res, ConstructResult::NotSent);

    let mut w = VecWriter::new();
    let res = signature_algorithms::construct_stoc(&mut s, &mut w, ContextFlags::TLS1_3_CERTIFICATE_REQUEST)
        .unwrap();
    assert_eq!(res, ConstructResult::Sent);
}

#[test]
fn padding_emits_zero_bytes_up_to_target() {
    let mut s = state();
    s.padding_target = Some(4);
    let mut w = VecWriter::new();
    padding::construct_ctos(&mut s, &mut w, ContextFlags::CLIENT_HELLO).unwrap();
    assert_eq!(w.bytes(), &[0, 0, 0, 0]);
}
