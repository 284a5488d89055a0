//! Leaf implementations: one `init`/`parse_*`/`construct_*`/`finalize` set
//! per built-in extension, grouped into one file the way `extensions.rs` in
//! this codebase's ancestry groups several extensions' `Codec` impls
//! together rather than one-file-per-extension.
//!
//! These are intentionally thin. Per spec, the core's job is to orchestrate
//! extensions table-driven, not to fully implement each extension's
//! cryptographic body — so each leaf does only as much parsing/state
//! bookkeeping as its own `finalize` hook (also defined here, alongside
//! the rest of that extension's hooks) needs.

use alloc::vec::Vec;

use crate::context::ContextFlags;
use crate::error::Error;
use crate::session::{ConstructResult, SessionState};
use crate::wire::{Reader, Writer};

pub mod renegotiate {
    use super::*;

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let data = r.get_length_prefixed_u8()?;
        if state.is_renegotiation {
            let expected = state.renegotiate_verify_data.as_deref().unwrap_or(&[]);
            if data != expected {
                return Err(Error::HandshakeFailure(
                    "renegotiation verify data mismatch",
                ));
            }
        } else if !data.is_empty() {
            return Err(Error::HandshakeFailure(
                "renegotiation_info sent with non-empty data on initial handshake",
            ));
        }
        state.renegotiate_verify_data = Some(data.to_vec());
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        parse_ctos(state, r, ctx)
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        w.start_u16_length_prefixed();
        let data = state.renegotiate_verify_data.clone().unwrap_or_default();
        w.put_u8(data.len() as u8);
        w.put_bytes(&data);
        w.close(false);
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        construct_ctos(state, w, ctx)
    }

    /// `final_renegotiate`: a renegotiation handshake with no
    /// `renegotiation_info` extension at all is a downgrade to unsafe
    /// renegotiation and must fail.
    pub fn finalize(state: &mut SessionState, _ctx: ContextFlags, sent: bool) -> Result<(), Error> {
        if state.is_renegotiation && !sent {
            return Err(Error::HandshakeFailure(
                "secure renegotiation not supported by peer",
            ));
        }
        Ok(())
    }
}

pub mod server_name {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.server_name_acked = false;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut list = {
            let body = r.get_length_prefixed_u16()?;
            crate::wire::SliceReader::new(body)
        };
        while list.any_left() {
            let name_type = list.get_u8()?;
            let host = list.get_length_prefixed_u16()?;
            if name_type == 0 && state.server_name.is_none() {
                state.server_name = Some(host.to_vec());
            }
        }
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        _r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.server_name_acked = true;
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(name) = state.server_name.clone() else {
            return Ok(ConstructResult::NotSent);
        };
        w.start_u16_length_prefixed();
        w.put_u8(0);
        w.start_u16_length_prefixed();
        w.put_bytes(&name);
        w.close(false);
        w.close(false);
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.server_name_acked {
            Ok(ConstructResult::Sent)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }

    /// `final_server_name`: dispatches the application's server-name
    /// callback, if any, translating its verdict into an alert.
    pub fn finalize(state: &mut SessionState, _ctx: ContextFlags, sent: bool) -> Result<(), Error> {
        if !sent {
            return Ok(());
        }
        let Some(name) = state.server_name.clone() else {
            return Ok(());
        };
        if let Some(cb) = state.server_name_callback.as_ref() {
            if let Err(alert) = cb(&name) {
                return Err(Error::Policy(alert, "server_name callback rejected name".into()));
            }
        }
        Ok(())
    }
}

pub mod ec_point_formats {
    use super::*;

    pub const UNCOMPRESSED: u8 = 0;

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.ec_point_formats_peer = Some(r.get_length_prefixed_u8()?.to_vec());
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        parse_ctos(state, r, ctx)
    }

    pub fn construct_ctos(
        _state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        w.start_u16_length_prefixed();
        w.put_u8(1);
        w.put_u8(UNCOMPRESSED);
        w.close(false);
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        construct_ctos(state, w, ctx)
    }

    /// `final_ec_pt_formats`: an ECC cipher suite with a peer that doesn't
    /// advertise the uncompressed point format is unusable.
    pub fn finalize(state: &mut SessionState, _ctx: ContextFlags, _sent: bool) -> Result<(), Error> {
        if !state.cipher_is_ecc {
            return Ok(());
        }
        if let Some(formats) = &state.ec_point_formats_peer {
            if !formats.contains(&UNCOMPRESSED) {
                return Err(Error::HandshakeFailure(
                    "peer does not support the uncompressed EC point format",
                ));
            }
        }
        Ok(())
    }
}

pub mod supported_groups {
    use super::*;

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut body = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        let mut groups = Vec::new();
        while body.any_left() {
            groups.push(body.get_u16()?);
        }
        state.supported_groups_peer = Some(groups);
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.supported_groups_local.is_empty() {
            return Ok(ConstructResult::NotSent);
        }
        w.start_u16_length_prefixed();
        for g in &state.supported_groups_local {
            w.put_u16(*g);
        }
        w.close(false);
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        construct_ctos(state, w, ctx)
    }
}

pub mod session_ticket {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.session_ticket_supported = false;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        r.rest();
        state.session_ticket_supported = true;
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        parse_ctos(state, r, ctx)
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.session_ticket_supported {
            Ok(ConstructResult::Sent)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        construct_ctos(state, w, ctx)
    }
}

pub mod signature_algorithms {
    use super::*;
    use crate::sigalg::SignatureScheme;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.sigalgs_peer = None;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut body = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        let mut schemes = Vec::new();
        while body.any_left() {
            schemes.push(SignatureScheme::from(body.get_u16()?));
        }
        state.sigalgs_peer = Some(schemes);
        Ok(())
    }

    /// `final_sig_algs`: TLS 1.3 requires `signature_algorithms` in every
    /// ClientHello; its absence is a missing-extension failure, not a
    /// silent default.
    pub fn finalize(state: &mut SessionState, ctx: ContextFlags, sent: bool) -> Result<(), Error> {
        use crate::context::Version;
        if state.version == Version::Tls1_3
            && ctx.contains(ContextFlags::CLIENT_HELLO)
            && !sent
        {
            return Err(Error::MissingExtension("signature_algorithms"));
        }
        Ok(())
    }

    fn write_schemes(w: &mut dyn Writer, schemes: &[SignatureScheme]) {
        w.start_u16_length_prefixed();
        for scheme in schemes {
            w.put_u16(scheme.code());
        }
        w.close(false);
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.sigalgs_local.is_empty() {
            return Ok(ConstructResult::NotSent);
        }
        write_schemes(w, &state.sigalgs_local);
        Ok(ConstructResult::Sent)
    }

    /// Only sent in a TLS 1.3 CertificateRequest, where a server advertises
    /// the schemes it's willing to verify the client's certificate with.
    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if !ctx.contains(ContextFlags::TLS1_3_CERTIFICATE_REQUEST) || state.sigalgs_local.is_empty() {
            return Ok(ConstructResult::NotSent);
        }
        write_schemes(w, &state.sigalgs_local);
        Ok(ConstructResult::Sent)
    }
}

#[cfg(feature = "status_request")]
pub mod status_request {
    use super::*;

    pub fn init(_state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        Ok(())
    }

    pub fn parse_ctos<'a>(
        _state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        r.rest();
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.sct_peer = None;
        r.rest();
        Ok(())
    }

    pub fn construct_ctos(
        _state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        w.put_u8(1); // status_type = ocsp
        w.start_u16_length_prefixed();
        w.close(false); // empty responder_id_list
        w.start_u16_length_prefixed();
        w.close(false); // empty request_extensions
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        _state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        Ok(ConstructResult::NotSent)
    }
}

pub mod alpn {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.alpn_selected = None;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut body = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        let mut protos = Vec::new();
        while body.any_left() {
            protos.push(body.get_length_prefixed_u8()?.to_vec());
        }
        state.alpn_proposed = Some(protos);
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut body = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        state.alpn_selected = Some(body.get_length_prefixed_u8()?.to_vec());
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(protos) = state.alpn_proposed.clone() else {
            return Ok(ConstructResult::NotSent);
        };
        w.start_u16_length_prefixed();
        for p in &protos {
            w.put_u8(p.len() as u8);
            w.put_bytes(p);
        }
        w.close(false);
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(selected) = state.alpn_selected.clone() else {
            return Ok(ConstructResult::NotSent);
        };
        w.start_u16_length_prefixed();
        w.put_u8(selected.len() as u8);
        w.put_bytes(&selected);
        w.close(false);
        Ok(ConstructResult::Sent)
    }
}

pub mod encrypt_then_mac {
    use super::*;

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        r.rest();
        state.etm_peer = true;
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        parse_ctos(state, r, ctx)
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.etm_local {
            Ok(ConstructResult::Sent)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.etm_peer {
            construct_ctos(state, w, ctx)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }
}

pub mod sct {
    use super::*;

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.sct_peer = Some(r.rest().to_vec());
        Ok(())
    }

    pub fn construct_ctos(
        _state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        Ok(ConstructResult::Sent)
    }
}

pub mod extended_master_secret {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.ems_peer = false;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        r.rest();
        state.ems_peer = true;
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        parse_ctos(state, r, ctx)
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        state.ems_requested = true;
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.ems_peer {
            construct_ctos(state, w, ctx)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }

    /// `final_ems`: a resumed session must agree with the original session
    /// on whether extended_master_secret was used — a peer flipping this on
    /// resumption is a downgrade/triple-handshake attempt.
    pub fn finalize(state: &mut SessionState, _ctx: ContextFlags, _sent: bool) -> Result<(), Error> {
        if state.is_resumption && state.ems_was_used_in_resumed_session != state.ems_peer {
            return Err(Error::HandshakeFailure(
                "extended_master_secret usage differs from the original session",
            ));
        }
        Ok(())
    }
}

pub mod supported_versions {
    use super::*;

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.supported_versions_local.is_empty() {
            return Ok(ConstructResult::NotSent);
        }
        w.put_u8((state.supported_versions_local.len() * 2) as u8);
        for v in &state.supported_versions_local {
            w.put_u16(*v);
        }
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(v) = state.supported_versions_local.first() else {
            return Ok(ConstructResult::NotSent);
        };
        w.put_u16(*v);
        Ok(ConstructResult::Sent)
    }
}

pub mod psk_kex_modes {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.psk_kex_modes = None;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.psk_kex_modes = Some(r.get_length_prefixed_u8()?.to_vec());
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(modes) = state.psk_kex_modes.clone() else {
            return Ok(ConstructResult::NotSent);
        };
        w.put_u8(modes.len() as u8);
        w.put_bytes(&modes);
        Ok(ConstructResult::Sent)
    }
}

/// PSK key-exchange mode wire values (RFC 8446 §4.2.9).
pub const PSK_KE: u8 = 0;
pub const PSK_DHE_KE: u8 = 1;

pub mod key_share {
    use super::*;

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut body = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        let mut first = true;
        while body.any_left() {
            let group = body.get_u16()?;
            let data = body.get_length_prefixed_u16()?;
            if first {
                state.key_share_group = Some(group);
                state.key_share_data = Some(data.to_vec());
                first = false;
            }
        }
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        let group = r.get_u16()?;
        state.key_share_group = Some(group);
        if ctx.contains(ContextFlags::TLS1_3_HELLO_RETRY_REQUEST) {
            state.hello_retry_request = true;
            state.key_share_data = None;
        } else {
            state.key_share_data = Some(r.get_length_prefixed_u16()?.to_vec());
        }
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let (Some(group), Some(data)) = (state.key_share_group, state.key_share_data.clone())
        else {
            return Ok(ConstructResult::NotSent);
        };
        w.start_u16_length_prefixed();
        w.put_u16(group);
        w.start_u16_length_prefixed();
        w.put_bytes(&data);
        w.close(false);
        w.close(false);
        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(group) = state.key_share_group else {
            return Ok(ConstructResult::NotSent);
        };
        w.put_u16(group);
        if !ctx.contains(ContextFlags::TLS1_3_HELLO_RETRY_REQUEST) {
            let data = state.key_share_data.clone().unwrap_or_default();
            w.start_u16_length_prefixed();
            w.put_bytes(&data);
            w.close(false);
        }
        Ok(ConstructResult::Sent)
    }

    /// `final_key_share`: the HRR decision. Grounded directly on
    /// `original_source`'s `final_key_share`: client-side, a missing share
    /// is only tolerable if a PSK-only mode was offered; server-side, a
    /// share in an unsupported group triggers HelloRetryRequest rather than
    /// an immediate failure, provided the client's `supported_groups`
    /// contains a group we do support.
    pub fn finalize(state: &mut SessionState, ctx: ContextFlags, sent: bool) -> Result<(), Error> {
        use crate::session::Role;

        if state.role == Role::Client && ctx.contains(ContextFlags::TLS1_3_SERVER_HELLO) {
            if !sent {
                let psk_only = state
                    .psk_kex_modes
                    .as_ref()
                    .is_some_and(|modes| modes.contains(&PSK_KE) && !modes.contains(&PSK_DHE_KE));
                if !psk_only {
                    return Err(Error::MissingExtension("key_share"));
                }
            }
            return Ok(());
        }

        if state.role == Role::Server && ctx.contains(ContextFlags::CLIENT_HELLO) {
            if state.key_share_group.is_some() {
                return Ok(());
            }
            let has_common_group = state
                .supported_groups_peer
                .as_ref()
                .map(|groups| {
                    groups
                        .iter()
                        .any(|g| state.supported_groups_local.contains(g))
                })
                .unwrap_or(false);
            if has_common_group {
                state.hello_retry_request = true;
                return Ok(());
            }
            let psk_dhe_ok = state
                .psk_kex_modes
                .as_ref()
                .is_some_and(|modes| modes.contains(&PSK_DHE_KE));
            if psk_dhe_ok {
                return Ok(());
            }
            return Err(Error::HandshakeFailure(
                "no mutually supported group for key_share",
            ));
        }
        Ok(())
    }
}

pub mod cookie {
    use super::*;

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.cookie = Some(r.get_length_prefixed_u16()?.to_vec());
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(cookie) = state.cookie.clone() else {
            return Ok(ConstructResult::NotSent);
        };
        w.start_u16_length_prefixed();
        w.put_bytes(&cookie);
        w.close(false);
        Ok(ConstructResult::Sent)
    }
}

pub mod early_data {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.early_data_requested = false;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        r.rest();
        state.early_data_requested = true;
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        ctx: ContextFlags,
    ) -> Result<(), Error> {
        if ctx.contains(ContextFlags::TLS1_3_NEW_SESSION_TICKET) {
            state.max_early_data_size = Some(r.get_u32()?);
        } else {
            r.rest();
            state.early_data_accepted = true;
        }
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        _w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.early_data_requested {
            Ok(ConstructResult::Sent)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if ctx.contains(ContextFlags::TLS1_3_NEW_SESSION_TICKET) {
            let Some(size) = state.max_early_data_size else {
                return Ok(ConstructResult::NotSent);
            };
            w.put_u32(size);
            return Ok(ConstructResult::Sent);
        }
        if state.early_data_accepted {
            Ok(ConstructResult::Sent)
        } else {
            Ok(ConstructResult::NotSent)
        }
    }

    /// `final_early_data`: rejected unconditionally once a
    /// HelloRetryRequest has been sent (decided in SPEC_FULL §9(a)).
    pub fn finalize(state: &mut SessionState, _ctx: ContextFlags, _sent: bool) -> Result<(), Error> {
        if state.hello_retry_request && state.early_data_accepted {
            return Err(Error::HandshakeFailure(
                "early_data accepted after hello_retry_request",
            ));
        }
        if state.hello_retry_request {
            state.early_data_accepted = false;
        }
        Ok(())
    }
}

pub mod certificate_authorities {
    use super::*;

    pub fn init(state: &mut SessionState, _ctx: ContextFlags) -> Result<(), Error> {
        state.ca_list_peer = None;
        Ok(())
    }

    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.ca_list_peer = Some(r.get_length_prefixed_u16()?.to_vec());
        Ok(())
    }

    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(list) = state.ca_list_local.clone() else {
            return Ok(ConstructResult::NotSent);
        };
        w.start_u16_length_prefixed();
        w.put_bytes(&list);
        w.close(false);
        Ok(ConstructResult::Sent)
    }
}

pub mod padding {
    use super::*;

    pub fn parse_ctos<'a>(
        _state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        r.rest();
        Ok(())
    }

    /// Grounded on the teacher's `PaddingExtension`: pads the ClientHello
    /// out to a target size with zero bytes. A `None` target means no
    /// padding policy is configured, so the extension is simply omitted.
    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(target) = state.padding_target else {
            return Ok(ConstructResult::NotSent);
        };
        w.put_bytes(&alloc::vec![0u8; target]);
        Ok(ConstructResult::Sent)
    }
}

pub mod psk {
    use super::*;

    /// Records identities and the within-body offset of the binders list;
    /// the dispatcher's `verify_psk_binders` second pass re-reads the
    /// binders themselves directly out of `Collected::source`, since it
    /// needs the transcript hash up to that point, not just the bytes.
    pub fn parse_ctos<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        let mut identities = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        let mut parsed = Vec::new();
        while identities.any_left() {
            let identity = identities.get_length_prefixed_u16()?;
            let age = identities.get_u32()?;
            parsed.push((identity.to_vec(), age));
        }
        if parsed.is_empty() {
            return Err(Error::Decode("pre_shared_key with no identities".into()));
        }

        state.psk_binders_offset_in_body = Some(r.position());

        let mut binders = crate::wire::SliceReader::new(r.get_length_prefixed_u16()?);
        let mut binder_count = 0usize;
        while binders.any_left() {
            binders.get_length_prefixed_u8()?;
            binder_count += 1;
        }
        if binder_count != parsed.len() {
            return Err(Error::Decode(
                "pre_shared_key identity/binder count mismatch".into(),
            ));
        }

        state.psk_identities_peer = parsed;
        Ok(())
    }

    pub fn parse_stoc<'a>(
        state: &mut SessionState,
        r: &mut dyn Reader<'a>,
        _ctx: ContextFlags,
    ) -> Result<(), Error> {
        state.psk_identity_chosen = Some(r.get_u16()?);
        Ok(())
    }

    /// Writes identities and zero-filled binder placeholders of the right
    /// length; the real binder values require the transcript hash up to
    /// this point, which is only available after every other extension has
    /// been serialized, so `construct_all`'s second pass patches them in
    /// once the whole block is known (matching `original_source`'s
    /// two-pass `tls_construct_extensions`/`tls_psk_do_binder` split).
    pub fn construct_ctos(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        if state.psk_offers.is_empty() {
            return Ok(ConstructResult::NotSent);
        }
        let hash_size = state.psk_crypto.as_deref().map(|c| c.hash_size()).unwrap_or(32);

        w.start_u16_length_prefixed();
        for offer in &state.psk_offers {
            w.start_u16_length_prefixed();
            w.put_bytes(&offer.identity);
            w.close(false);
            w.put_u32(offer.obfuscated_ticket_age);
        }
        w.close(false);

        state.psk_binders_offset_in_body = Some(w.len());

        w.start_u16_length_prefixed();
        for _ in &state.psk_offers {
            w.put_u8(hash_size as u8);
            w.put_bytes(&alloc::vec![0u8; hash_size]);
        }
        w.close(false);

        Ok(ConstructResult::Sent)
    }

    pub fn construct_stoc(
        state: &mut SessionState,
        w: &mut dyn Writer,
        _ctx: ContextFlags,
    ) -> Result<ConstructResult, Error> {
        let Some(chosen) = state.psk_server_selected else {
            return Ok(ConstructResult::NotSent);
        };
        w.put_u16(chosen);
        Ok(ConstructResult::Sent)
    }
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
