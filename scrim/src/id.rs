//! Caller-chosen string ids and the id resolution chain.

use crate::error::{Error, Result};

/// Identifier for dialogs, toaster layers, toasts, and upper layers.
///
/// Ids are plain caller-chosen strings; the registries never mint them.
pub type Id = String;

/// Resolve an id from up to three sources in precedence order: the explicit
/// per-call argument, then the id the facade was declared with, then the
/// ambient id of the enclosing scope.
///
/// An explicit id that disagrees with the ambient one wins, but the mismatch
/// is logged in debug builds since it usually means a component was moved
/// without updating its id.
///
/// # Example
///
/// ```
/// use scrim::id::resolve_id;
///
/// let id = resolve_id(None, Some("settings"), Some("root")).unwrap();
/// assert_eq!(id, "settings");
/// ```
pub fn resolve_id(
    explicit: Option<&str>,
    declared: Option<&str>,
    ambient: Option<&str>,
) -> Result<Id> {
    #[cfg(debug_assertions)]
    if let (Some(explicit), Some(ambient)) = (explicit, ambient) {
        if explicit != ambient {
            log::warn!(
                "explicit id '{}' does not match the enclosing scope id '{}'; using '{}'",
                explicit,
                ambient,
                explicit
            );
        }
    }

    explicit
        .or(declared)
        .or(ambient)
        .map(str::to_owned)
        .ok_or(Error::MissingId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        let id = resolve_id(Some("a"), Some("b"), Some("c")).unwrap();
        assert_eq!(id, "a");
    }

    #[test]
    fn test_declared_beats_ambient() {
        let id = resolve_id(None, Some("b"), Some("c")).unwrap();
        assert_eq!(id, "b");
    }

    #[test]
    fn test_ambient_is_last() {
        let id = resolve_id(None, None, Some("c")).unwrap();
        assert_eq!(id, "c");
    }

    #[test]
    fn test_no_source_errors() {
        assert!(matches!(resolve_id(None, None, None), Err(Error::MissingId)));
    }
}
