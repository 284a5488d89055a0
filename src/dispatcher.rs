//! The dispatch phase (spec §4.3/§4.4): `init`, `parse`, the finaliser
//! pass, and `construct`, each iterating the registry table in its fixed
//! row order.
//!
//! `parse_all`'s finaliser loop runs over every built-in row independently
//! of whether that row's `init`/`parse` actually ran for this message —
//! confirmed against `original_source`'s `tls_parse_all_extensions`, which
//! does exactly this because a row's `init` context check and its
//! `final` context check are the same check (spec §4.3).

use alloc::vec::Vec;

use crate::collector::Collected;
use crate::context::{self, ContextFlags, Version};
use crate::custom::CustomExtensionRegistry;
use crate::error::Error;
use crate::registry;
use crate::session::{ConstructResult, Role, SessionState};
use crate::wire::{Reader, SliceReader, VecWriter, Writer};

/// Runs every row's `init` hook whose context matches this message, in
/// table order. Always runs, whether or not the extension was actually
/// present on the wire — mirrors `original_source`'s unconditional
/// `init_extensions` pass before parsing begins.
pub fn init_all(state: &mut SessionState, message_ctx: ContextFlags) -> Result<(), Error> {
    for def in registry::EXT_DEFS.iter() {
        if def.is_invalid()
            || !context::extension_is_relevant(
                def.context,
                message_ctx,
                state.version,
                state.is_resumption,
                state.is_dtls,
            )
        {
            continue;
        }
        if let Some(init) = def.init {
            init(state, message_ctx)?;
        }
    }
    Ok(())
}

/// Parses every collected extension, in table order, then runs the
/// finaliser pass. Unknown extensions are forwarded to `custom` and, if it
/// doesn't recognise them either, silently dropped (spec §9 Open Question
/// (b): kept permissive).
pub fn parse_all(
    state: &mut SessionState,
    collected: &Collected<'_>,
    message_ctx: ContextFlags,
    custom: &mut dyn CustomExtensionRegistry,
) -> Result<(), Error> {
    for (row, def) in registry::EXT_DEFS.iter().enumerate() {
        let Some(raw) = collected.slots[row] else {
            continue;
        };
        if def.is_invalid()
            || !context::extension_is_relevant(
                def.context,
                message_ctx,
                state.version,
                state.is_resumption,
                state.is_dtls,
            )
        {
            continue;
        }
        let parse = match state.role {
            Role::Server => def.parse_ctos,
            Role::Client => def.parse_stoc,
        };
        if let Some(parse) = parse {
            let mut r = SliceReader::new(raw.data);
            parse(state, &mut r, message_ctx)?;
        }
    }

    verify_psk_binders(state, collected)?;

    for raw in &collected.unknown {
        if let Some(offset) = custom.find(state.role, raw.type_code) {
            custom.parse(offset, state.role, raw.data)?;
        }
        #[cfg(feature = "log")]
        if custom.find(state.role, raw.type_code).is_none() {
            log::debug!("dropping unrecognised extension type {}", raw.type_code);
        }
    }

    for (row, def) in registry::EXT_DEFS.iter().enumerate() {
        if def.is_invalid() || !context::validate_context(def.context, message_ctx, state.is_dtls) {
            continue;
        }
        if let Some(finalize) = def.finalize {
            let sent = collected.slots[row].is_some();
            finalize(state, message_ctx, sent)?;
        }
    }

    Ok(())
}

/// The PSK binder engine's parse-side second pass (spec §4.6): re-hashes
/// the transcript up to the binders list using the offsets `collect`
/// recorded and the leaf's `parse_ctos` recorded, then verifies the first
/// binder whose identity the application's PSK store recognises.
///
/// Mirrors `original_source`'s `tls_psk_do_binder` being a standalone call
/// from `tls_parse_ctos_early_data`/`tls_process_client_hello`, not one of
/// the `ext_defs[]` table's own `parse_ctos` hooks: both binder derivation
/// and the post-processing it requires need the full message buffer, which
/// `ConstructFn`/`ParseFn`'s per-row sub-reader can't see.
fn verify_psk_binders(state: &mut SessionState, collected: &Collected<'_>) -> Result<(), Error> {
    if state.role != Role::Server || collected.slots[registry::ROW_PRE_SHARED_KEY].is_none() {
        return Ok(());
    }
    let (Some(body_offset), Some(binders_offset_in_body)) = (
        collected.psk_body_offset,
        state.psk_binders_offset_in_body.take(),
    ) else {
        return Ok(());
    };
    if state.psk_lookup.is_none() {
        return Ok(());
    }
    let Some(crypto) = state.psk_crypto.as_deref() else {
        return Err(Error::Internal(
            "pre_shared_key received with no crypto provider configured",
        ));
    };

    let abs_binders_offset = body_offset + binders_offset_in_body;
    let mut transcript = state.transcript_prefix.clone();
    transcript.extend_from_slice(&collected.source[..abs_binders_offset]);
    let transcript_hash = crypto.hash(&transcript);

    let mut binders_outer = SliceReader::new(&collected.source[abs_binders_offset..]);
    let mut binders_list = SliceReader::new(binders_outer.get_length_prefixed_u16()?);
    let mut received_binders = Vec::new();
    while binders_list.any_left() {
        received_binders.push(binders_list.get_length_prefixed_u8()?.to_vec());
    }
    if received_binders.len() != state.psk_identities_peer.len() {
        return Err(Error::Decode(
            "pre_shared_key identity/binder count mismatch".into(),
        ));
    }

    let identities = state.psk_identities_peer.clone();
    let lookup = state.psk_lookup.as_ref().expect("checked above");
    for (idx, (identity, _age)) in identities.iter().enumerate() {
        let Some((secret, origin)) = lookup(identity) else {
            continue;
        };
        crate::psk::verify_binder(
            crypto,
            crypto,
            &secret,
            origin,
            &transcript_hash,
            &received_binders[idx],
        )?;
        state.psk_server_selected = Some(idx as u16);
        return Ok(());
    }
    Ok(())
}

/// Builds the extensions block for an outgoing message. Custom extensions
/// are written first (matching `original_source`'s
/// `tls_construct_extensions`), then built-ins in table order. Returns
/// whether anything at all was written, so a caller building an SSLv3
/// ClientHello can omit the surrounding extensions field entirely when
/// this is `false`.
pub fn construct_all(
    state: &mut SessionState,
    out: &mut dyn Writer,
    message_ctx: ContextFlags,
    custom: &mut dyn CustomExtensionRegistry,
) -> Result<bool, Error> {
    let mut any_sent = false;
    let mut psk_binders_abs_offset = None;

    if message_ctx.contains(ContextFlags::CLIENT_HELLO) {
        custom.init();
    }

    // Abandon the whole sub-packet on zero length only for a ClientHello or
    // TLS 1.2 ServerHello actually speaking SSL 3.0 (spec §4.4 step 1) — an
    // SSL3 peer can't parse an extensions field at all, so it must be
    // omitted entirely rather than sent empty.
    let abandon_on_zero_length = state.version == Version::Ssl3
        && message_ctx.intersects(ContextFlags::CLIENT_HELLO.union(ContextFlags::TLS1_2_SERVER_HELLO));

    out.start_u16_length_prefixed();

    for offset in 0..custom.count() {
        // Custom extensions own their type-code space entirely, so they
        // write their own type code and length prefix directly.
        if custom.add(offset, state.role, out)? == ConstructResult::Sent {
            any_sent = true;
        }
    }

    for (row, def) in registry::EXT_DEFS.iter().enumerate() {
        if def.is_invalid()
            || !context::should_add_extension(
                def.context,
                message_ctx,
                state.version,
                state.max_version,
                state.is_resumption,
                state.is_dtls,
            )
        {
            continue;
        }
        let construct = match state.role {
            Role::Client => def.construct_ctos,
            Role::Server => def.construct_stoc,
        };
        let Some(construct) = construct else {
            continue;
        };
        let mut scratch = VecWriter::new();
        if construct(state, &mut scratch, message_ctx)? == ConstructResult::Sent {
            let body_start = out.len() + 4;
            if row == registry::ROW_PRE_SHARED_KEY {
                if let Some(offset_in_body) = state.psk_binders_offset_in_body.take() {
                    psk_binders_abs_offset = Some(body_start + offset_in_body);
                }
            }
            write_extension_body(out, &mut any_sent, def.type_code as u16, scratch.into_bytes());
            if message_ctx.intersects(
                ContextFlags::CLIENT_HELLO
                    .union(ContextFlags::TLS1_3_CERTIFICATE_REQUEST)
                    .union(ContextFlags::TLS1_3_NEW_SESSION_TICKET),
            ) {
                state.extflags.set_sent(row);
            }
        }
    }

    if let Some(abs_offset) = psk_binders_abs_offset {
        patch_psk_binders(state, out, abs_offset)?;
    }

    out.close(abandon_on_zero_length);

    Ok(any_sent)
}

fn write_extension_body(out: &mut dyn Writer, any_sent: &mut bool, type_code: u16, body: Vec<u8>) {
    out.put_u16(type_code);
    out.start_u16_length_prefixed();
    out.put_bytes(&body);
    out.close(false);
    *any_sent = true;
}

/// The PSK binder engine's construct-side second pass: once the rest of
/// the extensions block is known, hash the transcript up to the binders
/// list and patch each placeholder binder `psk::construct_ctos` wrote with
/// its real value.
fn patch_psk_binders(state: &mut SessionState, out: &mut dyn Writer, abs_offset: usize) -> Result<(), Error> {
    let Some(crypto) = state.psk_crypto.as_deref() else {
        return Err(Error::Internal(
            "pre_shared_key offered with no crypto provider configured",
        ));
    };
    let mut transcript = state.transcript_prefix.clone();
    transcript.extend_from_slice(&out.as_slice()[..abs_offset]);
    let transcript_hash = crypto.hash(&transcript);

    let hash_size = crypto.hash_size();
    let mut entry_offset = abs_offset + 2; // skip the binders list's own u16 length prefix
    for offer in &state.psk_offers {
        let binder = crate::psk::derive_binder(crypto, crypto, &offer.secret, offer.origin, &transcript_hash);
        out.patch(entry_offset + 1, &binder); // skip this entry's 1-byte length prefix
        entry_offset += 1 + hash_size;
    }
    Ok(())
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
