//! Message contexts and the relevance predicates built on them (spec §4.1).
//!
//! A [`ContextFlags`] value tags either an extension's legal contexts (a
//! row in the registry) or the message currently being processed (passed in
//! by the caller). `validate_context`, `extension_is_relevant` and
//! `should_add_extension` are pure functions of these flags plus a handful
//! of connection-state booleans — there is deliberately no hidden state.

/// Bitset of handshake message types / connection conditions an extension
/// may legally appear in. Hand-rolled rather than pulled from a bitflags
/// crate, the way the wire enums in this codebase's ancestry are hand-rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextFlags(u32);

impl ContextFlags {
    pub const CLIENT_HELLO: Self = Self(1 << 0);
    pub const TLS1_2_SERVER_HELLO: Self = Self(1 << 1);
    pub const TLS1_3_SERVER_HELLO: Self = Self(1 << 2);
    pub const TLS1_3_HELLO_RETRY_REQUEST: Self = Self(1 << 3);
    pub const TLS1_3_ENCRYPTED_EXTENSIONS: Self = Self(1 << 4);
    pub const TLS1_3_CERTIFICATE_REQUEST: Self = Self(1 << 5);
    pub const TLS1_3_CERTIFICATE: Self = Self(1 << 6);
    pub const TLS1_3_NEW_SESSION_TICKET: Self = Self(1 << 7);

    /// Extension is allowed in a plain SSLv3 ClientHello/ServerHello.
    pub const SSL3_ALLOWED: Self = Self(1 << 8);
    /// Extension only makes sense at or below TLS 1.2.
    pub const TLS1_2_AND_BELOW_ONLY: Self = Self(1 << 9);
    /// Extension only makes sense at TLS 1.3.
    pub const TLS1_3_ONLY: Self = Self(1 << 10);
    /// Extension is meaningless over DTLS.
    pub const TLS_IMPLEMENTATION_ONLY: Self = Self(1 << 11);
    /// Extension is ignored entirely when the connection is a resumption.
    pub const IGNORE_ON_RESUMPTION: Self = Self(1 << 12);
    /// Extension only makes sense over a stream (TLS) transport.
    pub const TLS_ONLY: Self = Self(1 << 13);
    /// Extension only makes sense over a datagram (DTLS) transport.
    pub const DTLS_ONLY: Self = Self(1 << 14);

    pub const NONE: Self = Self(0);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for ContextFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// The protocol version actually negotiated/in use for the message being
/// processed. Extension relevance depends on this, not just on message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Ssl3,
    Tls1_2,
    Tls1_3,
}

/// `validate_context`: does this extension's declared context mask
/// intersect the context mask of the message we're currently processing,
/// *and* is the transport bit compatible? Both context masks may be legal
/// in several message types at once, so the message-type test is
/// intersection, not equality; the transport check is separate because
/// `TLS_Only`/`DTLS_Only` describe the connection as a whole, not the
/// message type.
pub fn validate_context(ext_ctx: ContextFlags, message_ctx: ContextFlags, is_dtls: bool) -> bool {
    if !ext_ctx.intersects(message_ctx) {
        return false;
    }
    if is_dtls && ext_ctx.contains(ContextFlags::TLS_ONLY) {
        return false;
    }
    if !is_dtls && ext_ctx.contains(ContextFlags::DTLS_ONLY) {
        return false;
    }
    true
}

/// `extension_is_relevant`: layers version/transport/resumption filtering on
/// top of `validate_context`. An extension can be in-context for the
/// message type and still be irrelevant, e.g. a TLS1.3-only extension in a
/// TLS 1.2 ClientHello, or a `TLS_Implementation_Only` extension over DTLS.
pub fn extension_is_relevant(
    ext_ctx: ContextFlags,
    message_ctx: ContextFlags,
    version: Version,
    is_resumption: bool,
    is_dtls: bool,
) -> bool {
    if !validate_context(ext_ctx, message_ctx, is_dtls) {
        return false;
    }
    if ext_ctx.contains(ContextFlags::TLS1_3_ONLY) && version != Version::Tls1_3 {
        return false;
    }
    if ext_ctx.contains(ContextFlags::TLS1_2_AND_BELOW_ONLY) && version == Version::Tls1_3 {
        return false;
    }
    if ext_ctx.contains(ContextFlags::IGNORE_ON_RESUMPTION) && is_resumption {
        return false;
    }
    if is_dtls && ext_ctx.contains(ContextFlags::TLS_IMPLEMENTATION_ONLY) {
        return false;
    }
    true
}

/// `should_add_extension`: the construct-side counterpart. An extension is
/// only offered/echoed when it is relevant to the outgoing message *and*
/// the SSL3-allowed bit is set if we are actually speaking SSLv3 (matching
/// the source's explicit SSL3-abandon carve-out).
///
/// `version` is the version actually negotiated so far for this message
/// (meaningless for an as-yet-unnegotiated ClientHello); `max_version` is
/// the local maximum the connection could still reach. A ClientHello may
/// still advertise a `TLS1_3_Only` extension when `max_version` reaches
/// TLS 1.3 and the transport isn't DTLS, even though nothing has actually
/// been negotiated as TLS 1.3 yet.
pub fn should_add_extension(
    ext_ctx: ContextFlags,
    message_ctx: ContextFlags,
    version: Version,
    max_version: Version,
    is_resumption: bool,
    is_dtls: bool,
) -> bool {
    if version == Version::Ssl3 && !ext_ctx.contains(ContextFlags::SSL3_ALLOWED) {
        return false;
    }
    if extension_is_relevant(ext_ctx, message_ctx, version, is_resumption, is_dtls) {
        return true;
    }
    message_ctx.contains(ContextFlags::CLIENT_HELLO)
        && ext_ctx.contains(ContextFlags::TLS1_3_ONLY)
        && max_version == Version::Tls1_3
        && !is_dtls
        && validate_context(ext_ctx, message_ctx, is_dtls)
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
