//! Request contexts.
//!
//! A [`Context`] scopes one unit of client-facing work: which application is
//! being served, in which mode, and with what access level. Contexts are
//! plain owned values handed back to the service when the work ends; nothing
//! here is thread-local.

use crate::base::Descriptor;

/// Engine execution mode. Dev always recomputes freshness; Prod trusts
/// published watermarks while preloading.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Dev,
    Prod,
}

/// Client access level carried by the context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// One active unit of work against the definition service.
#[derive(Clone, Debug)]
pub struct Context {
    mode: Mode,
    access: Access,
    root: Descriptor,
    preloading: bool,
}

impl Context {
    pub fn new(mode: Mode, access: Access, root: Descriptor) -> Self {
        Self {
            mode,
            access,
            root,
            preloading: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// The application (or component) this context serves.
    pub fn root(&self) -> &Descriptor {
        &self.root
    }

    /// Whether this context is in the preload phase, where Prod may reuse
    /// published watermarks.
    pub fn preloading(&self) -> bool {
        self.preloading
    }

    pub fn set_preloading(&mut self, preloading: bool) {
        self.preloading = preloading;
    }
}
