//! Error types shared by the registries and facades.

use thiserror::Error;

use crate::id::Id;

/// Errors surfaced by registry operations.
///
/// Every operation that takes an id can fail when no matching entry exists;
/// nothing in the library panics on a bad id. Remote-control handlers have
/// no caller to hand a `Result` to, so they log the error and drop the
/// command instead.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// No dialog was declared or registered with this id.
    #[error("no dialog declared or registered with id '{0}'")]
    UnknownDialog(Id),

    /// The dialog entry exists but no surface is currently mounted for it.
    #[error("dialog '{0}' has no mounted surface")]
    DialogNotMounted(Id),

    /// No toaster layer is registered with this id.
    #[error("no toaster layer registered with id '{0}'")]
    UnknownLayer(Id),

    /// No upper layer was declared with this id.
    #[error("no upper layer declared with id '{0}'")]
    UnknownUpperLayer(Id),

    /// Id resolution found no explicit id and no enclosing scope.
    #[error("no id provided and none available from the enclosing scope")]
    MissingId,
}

/// Convenience alias for registry results.
pub type Result<T> = std::result::Result<T, Error>;
