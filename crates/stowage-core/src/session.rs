//! Session-scoped on/off toggle for extended weighting.
//!
//! The resolver checks the flag once per placement decision, so it is an
//! atomic rather than a locked value.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use stowage_types::SessionState;

/// Whether extended weighting is active in the current game.
#[derive(Debug)]
pub struct SessionSettings {
    enabled: AtomicBool,
    default_enabled: bool,
}

impl SessionSettings {
    /// Create settings starting at `default_enabled`.
    pub const fn new(default_enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(default_enabled),
            default_enabled,
        }
    }

    /// Whether the resolver should act.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn weighting on or off.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(enabled, "extended weighting toggled");
        }
    }

    /// Flip the toggle and return the new value.
    pub fn toggle(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::AcqRel);
        info!(enabled, "extended weighting toggled");
        enabled
    }

    /// Back to the configured default, as at the start of a new game.
    pub fn reset(&self) {
        self.enabled.store(self.default_enabled, Ordering::Release);
    }

    /// Persistable form of the current state.
    pub fn state(&self) -> SessionState {
        SessionState {
            enabled: self.is_enabled(),
        }
    }

    /// Apply a persisted state.
    pub fn restore(&self, state: SessionState) {
        self.enabled.store(state.enabled, Ordering::Release);
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_default() {
        assert!(SessionSettings::new(true).is_enabled());
        assert!(!SessionSettings::new(false).is_enabled());
        assert!(SessionSettings::default().is_enabled());
    }

    #[test]
    fn toggle_flips_and_reports() {
        let session = SessionSettings::new(true);
        assert!(!session.toggle());
        assert!(!session.is_enabled());
        assert!(session.toggle());
        assert!(session.is_enabled());
    }

    #[test]
    fn reset_returns_to_configured_default() {
        let session = SessionSettings::new(false);
        session.set_enabled(true);
        session.reset();
        assert!(!session.is_enabled());
    }

    #[test]
    fn state_roundtrip() {
        let session = SessionSettings::new(true);
        session.restore(SessionState { enabled: false });
        assert_eq!(session.state(), SessionState { enabled: false });
    }
}
