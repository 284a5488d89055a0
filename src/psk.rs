//! The PSK binder engine (spec §4.6), grounded on
//! `original_source`'s `tls_psk_do_binder`: early-secret/binder-key/
//! finished-key derivation via HKDF-Expand-Label, HMAC over the transcript
//! hash taken up to (not including) the binders list, and a constant-time
//! comparison on verification.
//!
//! Key material is zeroized as soon as it's no longer needed, the same
//! discipline `original_source` applies via `OPENSSL_cleanse` in its
//! `err:` cleanup path.

use alloc::vec::Vec;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::crypto::{Hkdf, Hmac};
use crate::error::Error;

/// Selects the binder label per RFC 8446 §4.2.11.2: a binder over an
/// out-of-band/externally-provisioned PSK uses `"ext binder"`; one over a
/// resumption PSK (derived from a previous connection's `resumption_master_secret`)
/// uses `"res binder"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PskOrigin {
    External,
    Resumption,
}

impl PskOrigin {
    fn label(self) -> &'static [u8] {
        match self {
            PskOrigin::External => b"ext binder",
            PskOrigin::Resumption => b"res binder",
        }
    }
}

/// Derives the binder value for one PSK identity over a given transcript
/// hash (the hash of the ClientHello truncated just before the binders
/// list, per RFC 8446 §4.2.11.2).
pub fn derive_binder(
    hkdf: &dyn Hkdf,
    hmac: &dyn Hmac,
    psk: &[u8],
    origin: PskOrigin,
    transcript_hash: &[u8],
) -> Vec<u8> {
    let zero_salt = alloc::vec![0u8; hkdf.hash_size()];
    let mut early_secret = hkdf.extract(&zero_salt, psk);

    let empty_hash = hkdf.empty_hash();
    let mut binder_key = hkdf.expand_label(&early_secret, origin.label(), &empty_hash, hkdf.hash_size());
    let mut finished_key = hkdf.expand_label(&binder_key, b"finished", b"", hkdf.hash_size());

    let binder = hmac.mac(&finished_key, transcript_hash);

    finished_key.zeroize();
    binder_key.zeroize();
    early_secret.zeroize();

    binder
}

/// Verifies a binder received from the peer against one we compute
/// ourselves, in constant time. A mismatch is always a handshake failure,
/// never silently tolerated.
pub fn verify_binder(
    hkdf: &dyn Hkdf,
    hmac: &dyn Hmac,
    psk: &[u8],
    origin: PskOrigin,
    transcript_hash: &[u8],
    received_binder: &[u8],
) -> Result<(), Error> {
    let expected = derive_binder(hkdf, hmac, psk, origin, transcript_hash);
    if expected.len() != received_binder.len()
        || expected.ct_eq(received_binder).unwrap_u8() != 1
    {
        return Err(Error::HandshakeFailure("pre_shared_key binder verification failed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RingHkdf;

    #[test]
    fn correct_binder_verifies() {
        let hkdf = RingHkdf::sha256();
        let psk = [0x42u8; 32];
        let transcript = [0x99u8; 32];
        let binder = derive_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &transcript);
        assert!(verify_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &transcript, &binder).is_ok());
    }

    #[test]
    fn tampered_binder_is_rejected() {
        let hkdf = RingHkdf::sha256();
        let psk = [0x42u8; 32];
        let transcript = [0x99u8; 32];
        let mut binder = derive_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &transcript);
        binder[0] ^= 0xFF;
        assert!(verify_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &transcript, &binder).is_err());
    }

    #[test]
    fn external_and_resumption_labels_produce_different_binders() {
        let hkdf = RingHkdf::sha256();
        let psk = [0x11u8; 32];
        let transcript = [0x22u8; 32];
        let ext = derive_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &transcript);
        let res = derive_binder(&hkdf, &hkdf, &psk, PskOrigin::Resumption, &transcript);
        assert_ne!(ext, res);
    }

    #[test]
    fn wrong_transcript_hash_is_rejected() {
        let hkdf = RingHkdf::sha256();
        let psk = [0x33u8; 32];
        let binder = derive_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &[0xAA; 32]);
        assert!(verify_binder(&hkdf, &hkdf, &psk, PskOrigin::External, &[0xBB; 32], &binder).is_err());
    }
}
