//! The custom-extension bridge (spec §4.7/§6): the core only ever consumes
//! this trait, never discovers or negotiates new extension types itself —
//! that remains an explicit non-goal.

use crate::error::Error;
use crate::session::{ConstructResult, Role};
use crate::wire::Writer;

/// Application-supplied registry of extensions the core doesn't know
/// about. Implementors own the type-code space, parsing and construction
/// entirely; the core only calls through this interface at the points
/// spec §4.2/§4.4 describe.
pub trait CustomExtensionRegistry {
    /// Called once per message before collection, mirroring the built-in
    /// table's per-row `init`.
    fn init(&mut self) {}

    /// Returns an opaque handle for `type_code` if this registry handles
    /// it for the given role, or `None` to let the extension be ignored.
    fn find(&self, role: Role, type_code: u16) -> Option<usize>;

    /// Parses a received extension body. `offset` is the handle returned
    /// by `find`.
    fn parse(&mut self, offset: usize, role: Role, data: &[u8]) -> Result<(), Error>;

    /// Offers to construct an extension at `offset`. Returning
    /// `ConstructResult::NotSent` means the extension is omitted entirely,
    /// not sent with an empty body.
    fn add(&mut self, offset: usize, role: Role, out: &mut dyn Writer) -> Result<ConstructResult, Error>;

    /// How many custom extensions are registered, for iterating `add`.
    fn count(&self) -> usize {
        0
    }
}

/// The default registry: no custom extensions at all. Applications that
/// need them bring their own implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCustomExtensions;

impl CustomExtensionRegistry for NoCustomExtensions {
    fn find(&self, _role: Role, _type_code: u16) -> Option<usize> {
        None
    }

    fn parse(&mut self, _offset: usize, _role: Role, _data: &[u8]) -> Result<(), Error> {
        Err(Error::Internal("NoCustomExtensions cannot parse anything"))
    }

    fn add(
        &mut self,
        _offset: usize,
        _role: Role,
        _out: &mut dyn Writer,
    ) -> Result<ConstructResult, Error> {
        Ok(ConstructResult::NotSent)
    }
}
