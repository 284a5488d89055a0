use super::*;

#[test]
fn validate_context_is_intersection_not_equality() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::TLS1_3_HELLO_RETRY_REQUEST;
    assert!(validate_context(ext, ContextFlags::CLIENT_HELLO, false));
    assert!(validate_context(ext, ContextFlags::TLS1_3_HELLO_RETRY_REQUEST, false));
    assert!(!validate_context(ext, ContextFlags::TLS1_3_CERTIFICATE, false));
}

#[test]
fn validate_context_rejects_tls_only_extension_over_dtls() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::TLS_ONLY;
    assert!(validate_context(ext, ContextFlags::CLIENT_HELLO, false));
    assert!(!validate_context(ext, ContextFlags::CLIENT_HELLO, true));
}

#[test]
fn validate_context_rejects_dtls_only_extension_over_tls() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::DTLS_ONLY;
    assert!(validate_context(ext, ContextFlags::CLIENT_HELLO, true));
    assert!(!validate_context(ext, ContextFlags::CLIENT_HELLO, false));
}

#[test]
fn tls13_only_extension_irrelevant_below_tls13() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::TLS1_3_ONLY;
    assert!(!extension_is_relevant(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        false,
        false,
    ));
    assert!(extension_is_relevant(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_3,
        false,
        false,
    ));
}

#[test]
fn ignore_on_resumption_flag_suppresses_relevance() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::IGNORE_ON_RESUMPTION;
    assert!(extension_is_relevant(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        false,
        false,
    ));
    assert!(!extension_is_relevant(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        true,
        false,
    ));
}

#[test]
fn tls_implementation_only_extension_excluded_under_dtls() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::TLS_IMPLEMENTATION_ONLY;
    assert!(extension_is_relevant(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        false,
        false,
    ));
    assert!(!extension_is_relevant(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        false,
        true,
    ));
}

#[test]
fn ssl3_abandons_extensions_not_marked_ssl3_allowed() {
    let ext = ContextFlags::CLIENT_HELLO;
    assert!(!should_add_extension(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Ssl3,
        Version::Ssl3,
        false,
        false,
    ));
    let ext_allowed = ext | ContextFlags::SSL3_ALLOWED;
    assert!(should_add_extension(
        ext_allowed,
        ContextFlags::CLIENT_HELLO,
        Version::Ssl3,
        Version::Ssl3,
        false,
        false,
    ));
}

#[test]
fn should_add_extension_bypasses_for_tls13_only_client_hello_when_max_version_reaches_tls13() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::TLS1_3_ONLY;
    // Negotiated version is still TLS 1.2 (nothing negotiated yet for an
    // outgoing ClientHello), but the local max reaches TLS 1.3.
    assert!(should_add_extension(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        Version::Tls1_3,
        false,
        false,
    ));
}

#[test]
fn should_add_extension_bypass_does_not_apply_over_dtls() {
    let ext = ContextFlags::CLIENT_HELLO | ContextFlags::TLS1_3_ONLY;
    assert!(!should_add_extension(
        ext,
        ContextFlags::CLIENT_HELLO,
        Version::Tls1_2,
        Version::Tls1_3,
        false,
        true,
    ));
}

#[test]
fn should_add_extension_bypass_does_not_apply_outside_client_hello() {
    let ext = ContextFlags::TLS1_3_SERVER_HELLO | ContextFlags::TLS1_3_ONLY;
    assert!(!should_add_extension(
        ext,
        ContextFlags::TLS1_3_SERVER_HELLO,
        Version::Tls1_2,
        Version::Tls1_3,
        false,
        false,
    ));
}
