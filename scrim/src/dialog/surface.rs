//! Host-side traits driven by the dialog registry.
//!
//! The registry never renders anything itself. The host hands it a
//! [`DialogSurface`] per dialog at registration time and, optionally, one
//! [`OverflowLock`] shared by all dialogs.

/// A host modal surface the registry shows and dismisses.
///
/// The registry holds the surface for as long as its dialog stays
/// registered. Re-registering the same id swaps the surface in without
/// closing the previous one.
pub trait DialogSurface: Send + Sync {
    /// Put the surface on screen as a modal.
    fn show_modal(&self);

    /// Take the surface off screen.
    fn close_modal(&self);
}

/// Page-level scroll lock shared by all blocking dialogs.
///
/// `engage` is called each time a blocking dialog finishes opening, so it
/// may run repeatedly while several blocking dialogs are up; implementations
/// must tolerate redundant calls. `release` is only called once a close
/// leaves no opened blocking dialog behind.
pub trait OverflowLock: Send + Sync {
    /// Engage the lock.
    fn engage(&self);

    /// Release the lock.
    fn release(&self);
}
