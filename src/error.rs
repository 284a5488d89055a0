//! Alert codes and the core's error type.
//!
//! Every failure path in this crate ends in an [`Error`], which always
//! carries the [`Alert`] the caller should send on the wire (spec §6/§7).
//! There is no retry and no partial success: a leaf error aborts the whole
//! extension-block operation currently in progress.

use alloc::string::String;
use core::fmt;

/// TLS alert descriptions relevant to extension processing.
///
/// Only the alerts this crate can actually produce are listed; this is not
/// a general `AlertDescription` enumeration of the whole protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Alert {
    HandshakeFailure,
    IllegalParameter,
    DecodeError,
    MissingExtension,
    UnsupportedExtension,
    UnrecognizedName,
    InternalError,
    /// Whatever alert the application's server-name callback chose.
    Custom(u8),
}

impl Alert {
    /// The one-byte wire value (RFC 8446 §6).
    pub const fn code(self) -> u8 {
        match self {
            Alert::HandshakeFailure => 40,
            Alert::IllegalParameter => 47,
            Alert::DecodeError => 50,
            Alert::InternalError => 80,
            Alert::MissingExtension => 109,
            Alert::UnsupportedExtension => 110,
            Alert::UnrecognizedName => 112,
            Alert::Custom(code) => code,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert({})", self.code())
    }
}

/// The core's error type. Every variant maps to exactly one [`Alert`].
#[derive(Debug, Clone)]
pub enum Error {
    /// Wire-level decode failure: truncated block, bad length prefix.
    Decode(String),
    /// Two extensions of the same known type in one message.
    Duplicate(u16),
    /// PSK extension present but not last in a ClientHello.
    PskNotLast,
    /// A recognised built-in extension arrived without having been sent.
    Unsolicited(u16),
    /// A TLS 1.3 mandatory extension is missing.
    MissingExtension(&'static str),
    /// A semantic/security invariant was violated (EMS, EC formats, renegotiation).
    HandshakeFailure(&'static str),
    /// The server-name callback (or another application policy hook) asked
    /// for a specific alert.
    Policy(Alert, String),
    /// Resource exhaustion or an invariant the core itself should never
    /// violate (never caused by peer input).
    Internal(&'static str),
}

impl Error {
    /// The alert this error maps to, per the table in spec §6.
    pub fn alert(&self) -> Alert {
        match self {
            Error::Decode(_) => Alert::DecodeError,
            Error::Duplicate(_) | Error::PskNotLast => Alert::IllegalParameter,
            Error::Unsolicited(_) => Alert::UnsupportedExtension,
            Error::MissingExtension(_) => Alert::MissingExtension,
            Error::HandshakeFailure(_) => Alert::HandshakeFailure,
            Error::Policy(alert, _) => *alert,
            Error::Internal(_) => Alert::InternalError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(msg) => write!(f, "decode error: {msg}"),
            Error::Duplicate(ty) => write!(f, "duplicate extension (type {ty})"),
            Error::PskNotLast => write!(f, "pre_shared_key extension was not last"),
            Error::Unsolicited(ty) => write!(f, "unsolicited extension (type {ty})"),
            Error::MissingExtension(name) => write!(f, "missing mandatory extension: {name}"),
            Error::HandshakeFailure(why) => write!(f, "handshake failure: {why}"),
            Error::Policy(alert, msg) => write!(f, "policy alert {alert}: {msg}"),
            Error::Internal(why) => write!(f, "internal error: {why}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn alert_codes_match_rfc8446() {
        assert_eq!(Alert::HandshakeFailure.code(), 40);
        assert_eq!(Alert::IllegalParameter.code(), 47);
        assert_eq!(Alert::DecodeError.code(), 50);
        assert_eq!(Alert::InternalError.code(), 80);
        assert_eq!(Alert::MissingExtension.code(), 109);
        assert_eq!(Alert::UnsupportedExtension.code(), 110);
        assert_eq!(Alert::UnrecognizedName.code(), 112);
    }

    #[test]
    fn error_alert_mapping() {
        assert_eq!(Error::Decode("x".to_string()).alert(), Alert::DecodeError);
        assert_eq!(Error::Duplicate(10).alert(), Alert::IllegalParameter);
        assert_eq!(Error::PskNotLast.alert(), Alert::IllegalParameter);
        assert_eq!(Error::Unsolicited(0).alert(), Alert::UnsupportedExtension);
        assert_eq!(
            Error::MissingExtension("sigalgs").alert(),
            Alert::MissingExtension
        );
        assert_eq!(
            Error::HandshakeFailure("ems").alert(),
            Alert::HandshakeFailure
        );
        assert_eq!(Error::Internal("oom").alert(), Alert::InternalError);
    }

    #[test]
    fn policy_alert_is_whatever_the_callback_chose() {
        let err = Error::Policy(Alert::Custom(71), "insufficient_security".to_string());
        assert_eq!(err.alert(), Alert::Custom(71));
    }
}
