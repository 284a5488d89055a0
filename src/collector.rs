//! The collect phase (spec §4.2): walks the wire extensions block once,
//! validating structural invariants, before any extension's `parse` hook
//! ever runs.
//!
//! Two orderings are load-bearing here, both confirmed against
//! `original_source`'s `tls_collect_extensions`/`verify_extension`:
//! the duplicate check and the PSK-must-be-last check happen *before* the
//! solicitedness check, and solicitedness is never applied to extension
//! types we don't recognise.

use alloc::vec::Vec;

use crate::context::{self, ContextFlags};
use crate::custom::CustomExtensionRegistry;
use crate::error::Error;
use crate::registry::{self, ROW_COOKIE, ROW_PRE_SHARED_KEY, ROW_RENEGOTIATE, ROW_SIGNED_CERTIFICATE_TIMESTAMP};
use crate::session::{Role, SessionState};
use crate::wire::{Reader, SliceReader};

/// One extension as it appeared on the wire, before any leaf has looked at
/// its contents. `data` borrows directly from the input message — nothing
/// is copied during collection.
#[derive(Debug, Clone, Copy)]
pub struct RawExtension<'a> {
    pub type_code: u16,
    pub data: &'a [u8],
    pub received_order: u32,
}

/// Rows solicitedness does not apply to, even though they are recognised
/// built-ins — a server may send these without the client having offered
/// them first (spec §4.2, confirmed against `verify_extension`'s
/// exception list).
const SOLICITEDNESS_EXEMPT: [usize; 3] = [
    ROW_RENEGOTIATE,
    ROW_COOKIE,
    ROW_SIGNED_CERTIFICATE_TIMESTAMP,
];

/// Output of the collect phase: one optional slot per built-in row, plus
/// whatever extension types weren't recognised (forwarded to the
/// application's [`CustomExtensionRegistry`] at dispatch time).
pub struct Collected<'a> {
    pub slots: Vec<Option<RawExtension<'a>>>,
    pub unknown: Vec<RawExtension<'a>>,
    /// The full extensions-block buffer this was collected from. The PSK
    /// binder engine's verification pass needs to hash a prefix of it that
    /// spans more than just the `pre_shared_key` extension's own body.
    pub source: &'a [u8],
    /// Offset within `source` where the `pre_shared_key` extension's body
    /// begins, if present. Set here rather than recomputed via pointer
    /// arithmetic later.
    pub psk_body_offset: Option<usize>,
}

impl<'a> Collected<'a> {
    fn empty(source: &'a [u8]) -> Self {
        Self {
            slots: alloc::vec![None; registry::NUM_BUILTIN_EXTENSIONS],
            unknown: Vec::new(),
            source,
            psk_body_offset: None,
        }
    }
}

pub fn collect_extensions<'a>(
    data: &'a [u8],
    message_ctx: ContextFlags,
    state: &SessionState,
    custom: &mut dyn CustomExtensionRegistry,
) -> Result<Collected<'a>, Error> {
    #[cfg(feature = "log")]
    log::trace!("collecting extensions for context {message_ctx:?}");

    if message_ctx.contains(ContextFlags::CLIENT_HELLO) {
        custom.init();
    }

    let mut r = SliceReader::new(data);
    if !r.any_left() {
        return Ok(Collected::empty(data));
    }

    let mut collected = Collected::empty(data);
    let mut order: u32 = 0;
    let mut psk_seen = false;

    while r.any_left() {
        if psk_seen {
            return Err(Error::PskNotLast);
        }

        let type_code = r.get_u16()?;
        let len_pos = r.position();
        let body = r.get_length_prefixed_u16()?;
        let body_start = len_pos + 2;
        let raw = RawExtension {
            type_code,
            data: body,
            received_order: order,
        };
        order += 1;

        let Some(row) = registry::lookup(type_code) else {
            if collected.unknown.iter().any(|e| e.type_code == type_code) {
                return Err(Error::Duplicate(type_code));
            }
            if custom.find(state.role, type_code).is_none() {
                #[cfg(feature = "log")]
                log::warn!("ignoring unrecognised extension type {type_code}");
            }
            collected.unknown.push(raw);
            continue;
        };

        if collected.slots[row].is_some() {
            return Err(Error::Duplicate(type_code));
        }

        let def = &registry::EXT_DEFS[row];
        if !context::validate_context(def.context, message_ctx, state.is_dtls) {
            return Err(Error::HandshakeFailure(
                "extension not valid in this handshake message",
            ));
        }

        if row == ROW_PRE_SHARED_KEY {
            psk_seen = true;
            collected.psk_body_offset = Some(body_start);
        }

        let exempt = SOLICITEDNESS_EXEMPT.contains(&row);
        // Solicitedness is only checked for messages other than ClientHello,
        // CertificateRequest and NewSessionTicket (spec §4.2 step 7) — those
        // three carry the server's own content, not an echo of something
        // the client offered.
        let requires_solicitedness = !message_ctx.intersects(
            ContextFlags::CLIENT_HELLO
                .union(ContextFlags::TLS1_3_CERTIFICATE_REQUEST)
                .union(ContextFlags::TLS1_3_NEW_SESSION_TICKET),
        );
        if !exempt
            && requires_solicitedness
            && state.role == Role::Client
            && !state.extflags.is_sent(row)
        {
            return Err(Error::Unsolicited(type_code));
        }

        collected.slots[row] = Some(raw);
    }

    Ok(collected)
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::custom::NoCustomExtensions;
    use crate::session::Role;
    use crate::wire::{VecWriter, Writer};
    use proptest::prelude::*;

    fn encode_extension(w: &mut VecWriter, type_code: u16, body: &[u8]) {
        w.put_u16(type_code);
        w.start_u16_length_prefixed();
        w.put_bytes(body);
        w.close(false);
    }

    proptest! {
        // Feature: extension collection, Property 2: uniqueness.
        // Any input containing the same known type code twice is rejected.
        #[test]
        fn duplicate_known_type_is_always_rejected(
            bodies in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..8), 2..3)
        ) {
            let mut w = VecWriter::new();
            // supported_groups (type 10) is a simple known row with no
            // context restriction beyond ClientHello.
            encode_extension(&mut w, 10, &bodies[0]);
            encode_extension(&mut w, 10, &bodies[1]);
            let state = SessionState::builder(Role::Server).build();
            let mut registry = NoCustomExtensions;
            let result = collect_extensions(w.bytes(), ContextFlags::CLIENT_HELLO, &state, &mut registry);
            prop_assert!(matches!(result, Err(Error::Duplicate(10))));
        }

        // Feature: extension collection, Property 3: PSK-last.
        // Any extension following pre_shared_key is rejected, regardless
        // of its own type or body.
        #[test]
        fn extension_after_psk_is_always_rejected(trailing_type in any::<u16>(), body in prop::collection::vec(any::<u8>(), 0..8)) {
            prop_assume!(registry::lookup(trailing_type) != Some(ROW_PRE_SHARED_KEY));
            let mut w = VecWriter::new();
            encode_extension(&mut w, 41, &[0x00, 0x00]); // pre_shared_key, minimal
            encode_extension(&mut w, trailing_type, &body);
            let state = SessionState::builder(Role::Server).build();
            let mut registry = NoCustomExtensions;
            let result = collect_extensions(w.bytes(), ContextFlags::CLIENT_HELLO, &state, &mut registry);
            prop_assert!(matches!(result, Err(Error::PskNotLast)));
        }
    }
}
