//! `SignatureScheme` — the leaf type carried by the `signature_algorithms`
//! extension. Values are the IANA TLS SignatureScheme registry codes; this
//! crate only needs to round-trip them, not implement any signing.

/// A TLS 1.2/1.3 `SignatureScheme` wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureScheme(pub u16);

impl SignatureScheme {
    pub const RSA_PKCS1_SHA256: Self = Self(0x0401);
    pub const RSA_PKCS1_SHA384: Self = Self(0x0501);
    pub const RSA_PKCS1_SHA512: Self = Self(0x0601);
    pub const ECDSA_NISTP256_SHA256: Self = Self(0x0403);
    pub const ECDSA_NISTP384_SHA384: Self = Self(0x0503);
    pub const ECDSA_NISTP521_SHA512: Self = Self(0x0603);
    pub const RSA_PSS_SHA256: Self = Self(0x0804);
    pub const RSA_PSS_SHA384: Self = Self(0x0805);
    pub const RSA_PSS_SHA512: Self = Self(0x0806);
    pub const ED25519: Self = Self(0x0807);
    pub const ED448: Self = Self(0x0808);

    pub const fn code(self) -> u16 {
        self.0
    }
}

impl From<u16> for SignatureScheme {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u16() {
        let s = SignatureScheme::from(0x0403);
        assert_eq!(s, SignatureScheme::ECDSA_NISTP256_SHA256);
        assert_eq!(s.code(), 0x0403);
    }
}
