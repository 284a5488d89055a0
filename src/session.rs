//! `SessionState`: every piece of per-connection state the registry's hooks
//! read or write, plus the builder that constructs it (spec §3, §9 "no
//! global mutable state").
//!
//! There is deliberately one flat struct here rather than one type per
//! extension with some dependency-injection graph between them — spec §9
//! is explicit that cross-extension dependencies are expressed only as
//! table-index ordering, never as a runtime graph.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::context::Version;
use crate::crypto::CryptoProvider;
use crate::error::Alert;
use crate::psk::PskOrigin;
use crate::registry::NUM_BUILTIN_EXTENSIONS;
use crate::sigalg::SignatureScheme;

/// Which end of the connection this `SessionState` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Per-row `SENT` bookkeeping (spec §3). Indexed by registry row index, not
/// by extension type code, so lookups never need a match/hash.
#[derive(Debug, Clone)]
pub struct ExtFlags {
    sent: Vec<bool>,
}

impl ExtFlags {
    fn new(len: usize) -> Self {
        Self {
            sent: alloc::vec![false; len],
        }
    }

    pub fn set_sent(&mut self, row: usize) {
        self.sent[row] = true;
    }

    pub fn is_sent(&self, row: usize) -> bool {
        self.sent[row]
    }
}

/// Outcome of a `construct_*` hook: did it actually emit an extension body?
/// Errors are conveyed through `Result::Err`, so unlike the source's
/// three-way `EXT_RETURN` this is a plain two-way enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructResult {
    Sent,
    NotSent,
}

type ServerNameCallback = Box<dyn Fn(&[u8]) -> Result<(), Alert> + Send + Sync>;

/// Maps a PSK identity the peer offered to the secret and origin we know it
/// under, or `None` if we don't recognise it. Mirrors `ServerNameCallback`'s
/// boxed-closure shape.
type PskLookupCallback = Box<dyn Fn(&[u8]) -> Option<(Vec<u8>, PskOrigin)> + Send + Sync>;

/// A PSK a client is offering in its `pre_shared_key` extension. The binder
/// itself is computed by the dispatcher's second pass
/// ([`crate::dispatcher::construct_all`]), not stored here.
#[derive(Debug, Clone)]
pub struct PskOffer {
    pub identity: Vec<u8>,
    pub secret: Vec<u8>,
    pub origin: PskOrigin,
    pub obfuscated_ticket_age: u32,
}

/// All mutable state the collect/dispatch/finalise pipeline threads through
/// the registry's hooks. One instance per handshake.
pub struct SessionState {
    pub role: Role,
    pub version: Version,
    /// Local maximum version this connection could still reach, used by
    /// `should_add_extension`'s ClientHello bypass for as-yet-unnegotiated
    /// TLS 1.3-only extensions.
    pub max_version: Version,
    pub is_dtls: bool,
    pub is_resumption: bool,
    pub hello_retry_request: bool,
    pub extflags: ExtFlags,

    // server_name (RFC 6066 §3)
    pub server_name: Option<Vec<u8>>,
    pub server_name_acked: bool,
    pub server_name_callback: Option<ServerNameCallback>,

    // ec_point_formats (RFC 8422 §5.1)
    pub ec_point_formats_peer: Option<Vec<u8>>,
    pub cipher_is_ecc: bool,

    // supported_groups / key_share
    pub supported_groups_peer: Option<Vec<u16>>,
    pub supported_groups_local: Vec<u16>,
    pub key_share_group: Option<u16>,
    pub key_share_data: Option<Vec<u8>>,

    // signature_algorithms
    pub sigalgs_peer: Option<Vec<SignatureScheme>>,
    pub sigalgs_local: Vec<SignatureScheme>,

    // alpn
    pub alpn_proposed: Option<Vec<Vec<u8>>>,
    pub alpn_selected: Option<Vec<u8>>,

    // extended_master_secret
    pub ems_requested: bool,
    pub ems_peer: bool,
    pub ems_was_used_in_resumed_session: bool,

    // psk_key_exchange_modes / pre_shared_key
    pub psk_kex_modes: Option<Vec<u8>>,
    pub psk_identity_chosen: Option<u16>,

    // early_data
    pub early_data_requested: bool,
    pub early_data_accepted: bool,
    pub max_early_data_size: Option<u32>,

    // cookie
    pub cookie: Option<Vec<u8>>,

    // renegotiate (RFC 5746)
    pub renegotiate_verify_data: Option<Vec<u8>>,
    pub is_renegotiation: bool,

    // supported_versions (construct-only, no parse needed here)
    pub supported_versions_local: Vec<u16>,

    // session_ticket
    pub session_ticket_supported: bool,

    // encrypt_then_mac
    pub etm_peer: bool,
    pub etm_local: bool,

    // signed_certificate_timestamp
    pub sct_peer: Option<Vec<u8>>,

    // certificate_authorities
    pub ca_list_peer: Option<Vec<u8>>,
    pub ca_list_local: Option<Vec<u8>>,

    // padding
    pub padding_target: Option<usize>,

    // pre_shared_key, beyond the binder engine's own state (psk.rs)
    pub psk_server_selected: Option<u16>,
    /// Client-side: PSKs offered in the outgoing ClientHello. Populated by
    /// the application before `construct_all`; `construct_ctos` writes
    /// placeholder binders, `construct_all`'s second pass patches in the
    /// real ones once the rest of the extensions block is known.
    pub psk_offers: Vec<PskOffer>,
    /// Server-side: identities the peer offered, recorded by `parse_ctos`
    /// for the binder-verification second pass.
    pub psk_identities_peer: Vec<(Vec<u8>, u32)>,
    /// Where the binders list starts within the `pre_shared_key`
    /// extension's own body. Set by `parse_ctos`/`construct_ctos`, consumed
    /// by the dispatcher and cleared once used.
    pub psk_binders_offset_in_body: Option<usize>,
    /// Application-supplied PSK store, consulted to verify a received
    /// binder. `None` means PSK resumption is not offered by this endpoint.
    pub psk_lookup: Option<PskLookupCallback>,
    /// Hash/HMAC provider for binder derivation and verification.
    pub psk_crypto: Option<Box<dyn CryptoProvider>>,
    /// Handshake bytes preceding the extensions block (legacy_version
    /// through the session ID, for a ClientHello), supplied by the caller.
    /// The transcript hash for a binder covers this prefix plus the
    /// extensions written/collected so far, not the bytes this crate never
    /// sees on its own.
    pub transcript_prefix: Vec<u8>,
}

impl SessionState {
    pub fn builder(role: Role) -> SessionStateBuilder {
        SessionStateBuilder::new(role)
    }
}

/// Builder for [`SessionState`], following the fluent `with_*` pattern used
/// throughout this codebase's config builders.
pub struct SessionStateBuilder {
    role: Role,
    version: Version,
    max_version: Option<Version>,
    is_dtls: bool,
    is_resumption: bool,
    server_name_callback: Option<ServerNameCallback>,
    cipher_is_ecc: bool,
    sigalgs_local: Vec<SignatureScheme>,
}

impl SessionStateBuilder {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            version: Version::Tls1_3,
            max_version: None,
            is_dtls: false,
            is_resumption: false,
            server_name_callback: None,
            cipher_is_ecc: false,
            sigalgs_local: alloc::vec![
                SignatureScheme::ECDSA_NISTP256_SHA256,
                SignatureScheme::RSA_PSS_SHA256,
                SignatureScheme::ED25519,
                SignatureScheme::RSA_PKCS1_SHA256,
            ],
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Local maximum version this connection could still reach. Defaults to
    /// `version` if unset.
    pub fn with_max_version(mut self, max_version: Version) -> Self {
        self.max_version = Some(max_version);
        self
    }

    pub fn with_dtls(mut self, is_dtls: bool) -> Self {
        self.is_dtls = is_dtls;
        self
    }

    pub fn with_signature_schemes(mut self, schemes: Vec<SignatureScheme>) -> Self {
        self.sigalgs_local = schemes;
        self
    }

    pub fn with_resumption(mut self, is_resumption: bool) -> Self {
        self.is_resumption = is_resumption;
        self
    }

    pub fn with_cipher_is_ecc(mut self, is_ecc: bool) -> Self {
        self.cipher_is_ecc = is_ecc;
        self
    }

    pub fn with_server_name_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> Result<(), Alert> + Send + Sync + 'static,
    {
        self.server_name_callback = Some(Box::new(f));
        self
    }

    pub fn build(self) -> SessionState {
        SessionState {
            role: self.role,
            version: self.version,
            max_version: self.max_version.unwrap_or(self.version),
            is_dtls: self.is_dtls,
            is_resumption: self.is_resumption,
            hello_retry_request: false,
            extflags: ExtFlags::new(NUM_BUILTIN_EXTENSIONS),
            server_name: None,
            server_name_acked: false,
            server_name_callback: self.server_name_callback,
            ec_point_formats_peer: None,
            cipher_is_ecc: self.cipher_is_ecc,
            supported_groups_peer: None,
            supported_groups_local: Vec::new(),
            key_share_group: None,
            key_share_data: None,
            sigalgs_peer: None,
            sigalgs_local: self.sigalgs_local,
            alpn_proposed: None,
            alpn_selected: None,
            ems_requested: false,
            ems_peer: false,
            ems_was_used_in_resumed_session: false,
            psk_kex_modes: None,
            psk_identity_chosen: None,
            early_data_requested: false,
            early_data_accepted: false,
            max_early_data_size: None,
            cookie: None,
            renegotiate_verify_data: None,
            is_renegotiation: false,
            supported_versions_local: Vec::new(),
            session_ticket_supported: false,
            etm_peer: false,
            etm_local: false,
            sct_peer: None,
            ca_list_peer: None,
            ca_list_local: None,
            padding_target: None,
            psk_server_selected: None,
            psk_offers: Vec::new(),
            psk_identities_peer: Vec::new(),
            psk_binders_offset_in_body: None,
            psk_lookup: None,
            psk_crypto: None,
            transcript_prefix: Vec::new(),
        }
    }
}
