//! The extension registry: one `const` table, row order fixed by spec §3/§9.
//!
//! Row order matters in two independent ways that must never be confused:
//! *table-index order* drives cross-extension dependencies (an extension's
//! `final` can assume every earlier row's `init`/`parse` already ran), while
//! *wire order* (the order extensions actually appear in a message) is
//! unconstrained except for the single PSK-last rule enforced in
//! `collector.rs`. The table below fixes the former; it says nothing about
//! the latter.

use crate::builtins;
use crate::context::ContextFlags;
use crate::error::Error;
use crate::session::{ConstructResult, SessionState};
use crate::wire::{Reader, Writer};

/// Sentinel type-code for a row whose extension is compiled out. Outside
/// the `u16` wire range so it can never collide with a real extension type.
pub const INVALID_EXTENSION_TYPE: u32 = 0x1_0000;

pub type InitFn = fn(&mut SessionState, ContextFlags) -> Result<(), Error>;
pub type ParseFn = for<'a> fn(&mut SessionState, &mut dyn Reader<'a>, ContextFlags) -> Result<(), Error>;
pub type ConstructFn =
    fn(&mut SessionState, &mut dyn Writer, ContextFlags) -> Result<ConstructResult, Error>;
pub type FinalFn = fn(&mut SessionState, ContextFlags, bool) -> Result<(), Error>;

/// One row of the extension table: a fixed type code, the contexts it is
/// legal in, and the (possibly absent) hooks that implement it.
pub struct ExtensionDef {
    pub name: &'static str,
    pub type_code: u32,
    pub context: ContextFlags,
    pub init: Option<InitFn>,
    pub parse_ctos: Option<ParseFn>,
    pub parse_stoc: Option<ParseFn>,
    pub construct_ctos: Option<ConstructFn>,
    pub construct_stoc: Option<ConstructFn>,
    pub finalize: Option<FinalFn>,
}

impl ExtensionDef {
    pub const fn is_invalid(&self) -> bool {
        self.type_code == INVALID_EXTENSION_TYPE
    }
}

const INVALID: ExtensionDef = ExtensionDef {
    name: "<invalid>",
    type_code: INVALID_EXTENSION_TYPE,
    context: ContextFlags::NONE,
    init: None,
    parse_ctos: None,
    parse_stoc: None,
    construct_ctos: None,
    construct_stoc: None,
    finalize: None,
};

pub const ROW_RENEGOTIATE: usize = 0;
pub const ROW_SERVER_NAME: usize = 1;
pub const ROW_EC_POINT_FORMATS: usize = 2;
pub const ROW_SUPPORTED_GROUPS: usize = 3;
pub const ROW_SESSION_TICKET: usize = 4;
pub const ROW_SIGNATURE_ALGORITHMS: usize = 5;
pub const ROW_STATUS_REQUEST: usize = 6;
pub const ROW_ALPN: usize = 7;
pub const ROW_ENCRYPT_THEN_MAC: usize = 8;
pub const ROW_SIGNED_CERTIFICATE_TIMESTAMP: usize = 9;
pub const ROW_EXTENDED_MASTER_SECRET: usize = 10;
pub const ROW_SUPPORTED_VERSIONS: usize = 11;
pub const ROW_PSK_KEY_EXCHANGE_MODES: usize = 12;
pub const ROW_KEY_SHARE: usize = 13;
pub const ROW_COOKIE: usize = 14;
pub const ROW_EARLY_DATA: usize = 15;
pub const ROW_CERTIFICATE_AUTHORITIES: usize = 16;
pub const ROW_PADDING: usize = 17;
pub const ROW_PRE_SHARED_KEY: usize = 18;

pub const NUM_BUILTIN_EXTENSIONS: usize = 19;

/// Row `NUM_BUILTIN_EXTENSIONS - 1` must be `pre_shared_key`: the collector
/// relies on this to enforce "PSK, if present, is the last extension".
const _: () = assert!(ROW_PRE_SHARED_KEY == NUM_BUILTIN_EXTENSIONS - 1);

#[cfg(feature = "status_request")]
const STATUS_REQUEST_ROW: ExtensionDef = ExtensionDef {
    name: "status_request",
    type_code: 5,
    context: ContextFlags::CLIENT_HELLO
        .union(ContextFlags::TLS1_3_CERTIFICATE)
        .union(ContextFlags::TLS1_2_SERVER_HELLO)
        .union(ContextFlags::SSL3_ALLOWED),
    init: Some(builtins::status_request::init),
    parse_ctos: Some(builtins::status_request::parse_ctos),
    parse_stoc: Some(builtins::status_request::parse_stoc),
    construct_ctos: Some(builtins::status_request::construct_ctos),
    construct_stoc: Some(builtins::status_request::construct_stoc),
    finalize: None,
};

#[cfg(not(feature = "status_request"))]
const STATUS_REQUEST_ROW: ExtensionDef = INVALID;

/// The fixed extension table, in the order `original_source` defines it
/// (minus the legacy/DTLS-only extras this core doesn't model: srp,
/// next_proto_neg, use_srtp, the CryptoPro bug workaround).
pub static EXT_DEFS: [ExtensionDef; NUM_BUILTIN_EXTENSIONS] = [
    ExtensionDef {
        name: "renegotiate",
        type_code: 0xff01,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED)
            .union(ContextFlags::TLS1_2_AND_BELOW_ONLY),
        init: None,
        parse_ctos: Some(builtins::renegotiate::parse_ctos),
        parse_stoc: Some(builtins::renegotiate::parse_stoc),
        construct_ctos: Some(builtins::renegotiate::construct_ctos),
        construct_stoc: Some(builtins::renegotiate::construct_stoc),
        finalize: Some(builtins::renegotiate::finalize),
    },
    ExtensionDef {
        name: "server_name",
        type_code: 0,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_ENCRYPTED_EXTENSIONS)
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED),
        init: Some(builtins::server_name::init),
        parse_ctos: Some(builtins::server_name::parse_ctos),
        parse_stoc: Some(builtins::server_name::parse_stoc),
        construct_ctos: Some(builtins::server_name::construct_ctos),
        construct_stoc: Some(builtins::server_name::construct_stoc),
        finalize: Some(builtins::server_name::finalize),
    },
    ExtensionDef {
        name: "ec_point_formats",
        type_code: 11,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED)
            .union(ContextFlags::TLS1_2_AND_BELOW_ONLY),
        init: None,
        parse_ctos: Some(builtins::ec_point_formats::parse_ctos),
        parse_stoc: Some(builtins::ec_point_formats::parse_stoc),
        construct_ctos: Some(builtins::ec_point_formats::construct_ctos),
        construct_stoc: Some(builtins::ec_point_formats::construct_stoc),
        finalize: Some(builtins::ec_point_formats::finalize),
    },
    ExtensionDef {
        name: "supported_groups",
        type_code: 10,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_ENCRYPTED_EXTENSIONS)
            .union(ContextFlags::SSL3_ALLOWED),
        init: None,
        parse_ctos: Some(builtins::supported_groups::parse_ctos),
        parse_stoc: None,
        construct_ctos: Some(builtins::supported_groups::construct_ctos),
        construct_stoc: Some(builtins::supported_groups::construct_stoc),
        finalize: None,
    },
    ExtensionDef {
        name: "session_ticket",
        type_code: 35,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED)
            .union(ContextFlags::TLS1_2_AND_BELOW_ONLY),
        init: Some(builtins::session_ticket::init),
        parse_ctos: Some(builtins::session_ticket::parse_ctos),
        parse_stoc: Some(builtins::session_ticket::parse_stoc),
        construct_ctos: Some(builtins::session_ticket::construct_ctos),
        construct_stoc: Some(builtins::session_ticket::construct_stoc),
        finalize: None,
    },
    ExtensionDef {
        name: "signature_algorithms",
        type_code: 13,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_CERTIFICATE_REQUEST)
            .union(ContextFlags::SSL3_ALLOWED),
        init: Some(builtins::signature_algorithms::init),
        parse_ctos: Some(builtins::signature_algorithms::parse_ctos),
        parse_stoc: None,
        construct_ctos: Some(builtins::signature_algorithms::construct_ctos),
        construct_stoc: Some(builtins::signature_algorithms::construct_stoc),
        finalize: Some(builtins::signature_algorithms::finalize),
    },
    STATUS_REQUEST_ROW,
    ExtensionDef {
        name: "application_layer_protocol_negotiation",
        type_code: 16,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_ENCRYPTED_EXTENSIONS)
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED),
        init: Some(builtins::alpn::init),
        parse_ctos: Some(builtins::alpn::parse_ctos),
        parse_stoc: Some(builtins::alpn::parse_stoc),
        construct_ctos: Some(builtins::alpn::construct_ctos),
        construct_stoc: Some(builtins::alpn::construct_stoc),
        finalize: None,
    },
    ExtensionDef {
        name: "encrypt_then_mac",
        type_code: 22,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED)
            .union(ContextFlags::TLS1_2_AND_BELOW_ONLY),
        init: None,
        parse_ctos: Some(builtins::encrypt_then_mac::parse_ctos),
        parse_stoc: Some(builtins::encrypt_then_mac::parse_stoc),
        construct_ctos: Some(builtins::encrypt_then_mac::construct_ctos),
        construct_stoc: Some(builtins::encrypt_then_mac::construct_stoc),
        finalize: None,
    },
    ExtensionDef {
        name: "signed_certificate_timestamp",
        type_code: 18,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_CERTIFICATE)
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED),
        init: None,
        parse_ctos: None,
        parse_stoc: Some(builtins::sct::parse_stoc),
        construct_ctos: Some(builtins::sct::construct_ctos),
        construct_stoc: None,
        finalize: None,
    },
    ExtensionDef {
        name: "extended_master_secret",
        type_code: 23,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_2_SERVER_HELLO)
            .union(ContextFlags::SSL3_ALLOWED)
            .union(ContextFlags::TLS1_2_AND_BELOW_ONLY),
        init: Some(builtins::extended_master_secret::init),
        parse_ctos: Some(builtins::extended_master_secret::parse_ctos),
        parse_stoc: Some(builtins::extended_master_secret::parse_stoc),
        construct_ctos: Some(builtins::extended_master_secret::construct_ctos),
        construct_stoc: Some(builtins::extended_master_secret::construct_stoc),
        finalize: Some(builtins::extended_master_secret::finalize),
    },
    ExtensionDef {
        name: "supported_versions",
        type_code: 43,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_SERVER_HELLO)
            .union(ContextFlags::TLS1_3_HELLO_RETRY_REQUEST)
            .union(ContextFlags::TLS1_3_ONLY),
        init: None,
        parse_ctos: None,
        parse_stoc: None,
        construct_ctos: Some(builtins::supported_versions::construct_ctos),
        construct_stoc: Some(builtins::supported_versions::construct_stoc),
        finalize: None,
    },
    ExtensionDef {
        name: "psk_key_exchange_modes",
        type_code: 45,
        context: ContextFlags::CLIENT_HELLO.union(ContextFlags::TLS1_3_ONLY),
        init: Some(builtins::psk_kex_modes::init),
        parse_ctos: Some(builtins::psk_kex_modes::parse_ctos),
        parse_stoc: None,
        construct_ctos: Some(builtins::psk_kex_modes::construct_ctos),
        construct_stoc: None,
        finalize: None,
    },
    ExtensionDef {
        name: "key_share",
        type_code: 51,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_SERVER_HELLO)
            .union(ContextFlags::TLS1_3_HELLO_RETRY_REQUEST)
            .union(ContextFlags::TLS1_3_ONLY),
        init: None,
        parse_ctos: Some(builtins::key_share::parse_ctos),
        parse_stoc: Some(builtins::key_share::parse_stoc),
        construct_ctos: Some(builtins::key_share::construct_ctos),
        construct_stoc: Some(builtins::key_share::construct_stoc),
        finalize: Some(builtins::key_share::finalize),
    },
    ExtensionDef {
        name: "cookie",
        type_code: 44,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_HELLO_RETRY_REQUEST)
            .union(ContextFlags::TLS1_3_ONLY),
        init: None,
        parse_ctos: None,
        parse_stoc: Some(builtins::cookie::parse_stoc),
        construct_ctos: Some(builtins::cookie::construct_ctos),
        construct_stoc: None,
        finalize: None,
    },
    ExtensionDef {
        name: "early_data",
        type_code: 42,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_ENCRYPTED_EXTENSIONS)
            .union(ContextFlags::TLS1_3_NEW_SESSION_TICKET)
            .union(ContextFlags::TLS1_3_ONLY),
        init: Some(builtins::early_data::init),
        parse_ctos: Some(builtins::early_data::parse_ctos),
        parse_stoc: Some(builtins::early_data::parse_stoc),
        construct_ctos: Some(builtins::early_data::construct_ctos),
        construct_stoc: Some(builtins::early_data::construct_stoc),
        finalize: Some(builtins::early_data::finalize),
    },
    ExtensionDef {
        name: "certificate_authorities",
        type_code: 47,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_CERTIFICATE_REQUEST)
            .union(ContextFlags::TLS1_3_ONLY),
        init: Some(builtins::certificate_authorities::init),
        parse_ctos: Some(builtins::certificate_authorities::parse_ctos),
        parse_stoc: None,
        construct_ctos: Some(builtins::certificate_authorities::construct_ctos),
        construct_stoc: None,
        finalize: None,
    },
    ExtensionDef {
        name: "padding",
        type_code: 21,
        context: ContextFlags::CLIENT_HELLO,
        init: None,
        parse_ctos: Some(builtins::padding::parse_ctos),
        parse_stoc: None,
        construct_ctos: Some(builtins::padding::construct_ctos),
        construct_stoc: None,
        finalize: None,
    },
    ExtensionDef {
        name: "pre_shared_key",
        type_code: 41,
        context: ContextFlags::CLIENT_HELLO
            .union(ContextFlags::TLS1_3_SERVER_HELLO)
            .union(ContextFlags::TLS1_3_ONLY),
        init: None,
        parse_ctos: Some(builtins::psk::parse_ctos),
        parse_stoc: Some(builtins::psk::parse_stoc),
        construct_ctos: Some(builtins::psk::construct_ctos),
        construct_stoc: Some(builtins::psk::construct_stoc),
        finalize: None,
    },
];

/// Finds the row for a wire type code. Unknown/compiled-out types both
/// return `None` — the collector treats "no such row" and "row is a
/// tombstone" identically (spec §4.2's `lookup`).
pub fn lookup(type_code: u16) -> Option<usize> {
    EXT_DEFS
        .iter()
        .position(|def| !def.is_invalid() && def.type_code == type_code as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psk_is_the_last_row() {
        assert_eq!(EXT_DEFS.last().unwrap().name, "pre_shared_key");
    }

    #[test]
    fn lookup_finds_known_type_and_rejects_unknown() {
        assert_eq!(lookup(0), Some(ROW_SERVER_NAME));
        assert_eq!(lookup(51), Some(ROW_KEY_SHARE));
        assert_eq!(lookup(0xBEEF), None);
    }

    #[test]
    fn row_constants_match_static_table_order() {
        assert_eq!(EXT_DEFS[ROW_RENEGOTIATE].name, "renegotiate");
        assert_eq!(EXT_DEFS[ROW_KEY_SHARE].name, "key_share");
        assert_eq!(EXT_DEFS[ROW_PRE_SHARED_KEY].name, "pre_shared_key");
    }

    #[cfg(not(feature = "status_request"))]
    #[test]
    fn status_request_row_is_invalid_when_feature_disabled() {
        assert!(EXT_DEFS[ROW_STATUS_REQUEST].is_invalid());
        assert_eq!(lookup(5), None);
    }
}
