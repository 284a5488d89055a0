//! Narrow HKDF/HMAC interfaces the PSK binder engine is generic over
//! (spec §6), plus a `ring`-backed reference implementation — the same
//! role `rustls-ring` plays as the reference `CryptoProvider` for rustls
//! proper.

use alloc::vec;
use alloc::vec::Vec;

/// HKDF-Extract/Expand-Label, abstracted over hash algorithm.
pub trait Hkdf {
    fn extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8>;
    fn expand_label(&self, secret: &[u8], label: &[u8], context: &[u8], out_len: usize) -> Vec<u8>;
    fn hash_size(&self) -> usize;
    /// `Hash(Messages = "")`, needed to derive the binder key and early
    /// secret when no prior transcript exists.
    fn empty_hash(&self) -> Vec<u8>;
    /// Plain digest of `data`, used by the PSK binder engine's dispatcher-level
    /// second pass to hash the ClientHello transcript up to the binders list
    /// (spec §4.6 step 7).
    fn hash(&self, data: &[u8]) -> Vec<u8>;
}

/// A keyed MAC, used both for the Finished/binder computation and (if the
/// application wires it up) for renegotiation verify-data.
pub trait Hmac {
    fn mac(&self, key: &[u8], data: &[u8]) -> Vec<u8>;
}

/// Bundles the two narrow traits the PSK binder engine needs behind one
/// object-safe trait, so `SessionState` can hold a single boxed provider
/// rather than two — the same role `rustls-ring`'s `CryptoProvider` plays
/// for rustls proper.
pub trait CryptoProvider: Hkdf + Hmac {}
impl<T: Hkdf + Hmac> CryptoProvider for T {}

/// `ring`-backed provider for SHA-256 transcripts. TLS 1.3 cipher suites
/// using SHA-384 would need a second instance parameterised the same way;
/// this crate only needs one to exercise the binder engine end-to-end.
pub struct RingHkdf {
    algorithm: ring::hkdf::Algorithm,
    digest_algorithm: &'static ring::digest::Algorithm,
}

impl RingHkdf {
    pub fn sha256() -> Self {
        Self {
            algorithm: ring::hkdf::HKDF_SHA256,
            digest_algorithm: &ring::digest::SHA256,
        }
    }

    pub fn sha384() -> Self {
        Self {
            algorithm: ring::hkdf::HKDF_SHA384,
            digest_algorithm: &ring::digest::SHA384,
        }
    }
}

/// TLS 1.3 `HkdfLabel` encoding (RFC 8446 §7.1): a `u16` length, a
/// length-prefixed `"tls13 " + label`, and a length-prefixed context.
fn hkdf_label(label: &[u8], context: &[u8], out_len: usize) -> Vec<u8> {
    let mut full_label = Vec::with_capacity(6 + label.len());
    full_label.extend_from_slice(b"tls13 ");
    full_label.extend_from_slice(label);

    let mut out = Vec::with_capacity(2 + 1 + full_label.len() + 1 + context.len());
    out.extend_from_slice(&(out_len as u16).to_be_bytes());
    out.push(full_label.len() as u8);
    out.extend_from_slice(&full_label);
    out.push(context.len() as u8);
    out.extend_from_slice(context);
    out
}

struct OutLen(usize);

impl ring::hkdf::KeyType for OutLen {
    fn len(&self) -> usize {
        self.0
    }
}

impl Hkdf for RingHkdf {
    /// HKDF-Extract(salt, IKM) = HMAC-Hash(salt, IKM) (RFC 5869 §2.2).
    /// `ring::hkdf::Prk` deliberately hides the raw PRK to discourage
    /// misuse, so the extract step is done directly via `ring::hmac` and
    /// fed back in through `Prk::new_less_safe` wherever it is expanded.
    fn extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
        let hmac_algorithm = if self.hash_size() == 32 {
            ring::hmac::HMAC_SHA256
        } else {
            ring::hmac::HMAC_SHA384
        };
        let key = ring::hmac::Key::new(hmac_algorithm, salt);
        ring::hmac::sign(&key, ikm).as_ref().to_vec()
    }

    fn expand_label(&self, secret: &[u8], label: &[u8], context: &[u8], out_len: usize) -> Vec<u8> {
        let prk = ring::hkdf::Prk::new_less_safe(self.algorithm, secret);
        let info = hkdf_label(label, context, out_len);
        let mut out = vec![0u8; out_len];
        prk.expand(&[&info], OutLen(out_len))
            .expect("hkdf expand with valid length")
            .fill(&mut out)
            .expect("fill sized buffer");
        out
    }

    fn hash_size(&self) -> usize {
        self.digest_algorithm.output_len()
    }

    fn empty_hash(&self) -> Vec<u8> {
        ring::digest::digest(self.digest_algorithm, b"").as_ref().to_vec()
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        ring::digest::digest(self.digest_algorithm, data).as_ref().to_vec()
    }
}

impl Hmac for RingHkdf {
    fn mac(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        let hmac_algorithm = if self.digest_algorithm.output_len() == 32 {
            ring::hmac::HMAC_SHA256
        } else {
            ring::hmac::HMAC_SHA384
        };
        let key = ring::hmac::Key::new(hmac_algorithm, key);
        ring::hmac::sign(&key, data).as_ref().to_vec()
    }
}
