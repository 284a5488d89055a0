//! Table-driven extension processing core for a TLS 1.2/1.3 handshake
//! endpoint.
//!
//! This crate owns exactly four things: the fixed extension registry
//! ([`registry`]), the collect/dispatch/construct pipeline that walks it
//! ([`collector`], [`dispatcher`]), the small set of cross-extension
//! finalisers that can't be expressed as a single row's hooks
//! ([`builtins`], invoked through `dispatcher::parse_all`), and the PSK
//! binder engine ([`psk`]). Record-layer framing, certificate
//! verification, cipher-suite selection and the contents of any one
//! extension's crypto payload are all out of scope — see each module's
//! docs for the exact boundary.
//!
//! ```
//! use tls_ext_core::session::{Role, SessionState};
//! use tls_ext_core::context::{ContextFlags, Version};
//! use tls_ext_core::custom::NoCustomExtensions;
//! use tls_ext_core::{collector, dispatcher};
//!
//! // TLS 1.3 here, not just TLS 1.2: `construct_all` writes a mandatory
//! // signature_algorithms extension on its own (the client's default
//! // `sigalgs_local`), so a real TLS 1.3 ClientHello round-trips through
//! // this crate's own pipeline without the caller doing anything extra.
//! let mut client = SessionState::builder(Role::Client)
//!     .with_version(Version::Tls1_3)
//!     .build();
//! client.server_name = Some(b"example.com".to_vec());
//!
//! let mut custom = NoCustomExtensions;
//! let mut out = tls_ext_core::wire::VecWriter::new();
//! dispatcher::construct_all(&mut client, &mut out, ContextFlags::CLIENT_HELLO, &mut custom)
//!     .expect("construct");
//!
//! let mut server = SessionState::builder(Role::Server)
//!     .with_version(Version::Tls1_3)
//!     .build();
//! // `construct_all` wraps its output in its own 2-byte length prefix
//! // (the same framing a real ClientHello's extensions field carries),
//! // so a caller collecting straight from it strips that first.
//! let collected =
//!     collector::collect_extensions(&out.bytes()[2..], ContextFlags::CLIENT_HELLO, &server, &mut custom)
//!         .expect("collect");
//! dispatcher::init_all(&mut server, ContextFlags::CLIENT_HELLO).expect("init");
//! dispatcher::parse_all(&mut server, &collected, ContextFlags::CLIENT_HELLO, &mut custom)
//!     .expect("parse");
//! assert_eq!(server.server_name.as_deref(), Some(&b"example.com"[..]));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod builtins;
pub mod collector;
pub mod context;
pub mod crypto;
pub mod custom;
pub mod dispatcher;
pub mod error;
pub mod psk;
pub mod registry;
pub mod session;
pub mod sigalg;
pub mod wire;

pub use crate::error::{Alert, Error};
pub use crate::session::{Role, SessionState, SessionStateBuilder};
