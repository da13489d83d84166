//! Navigation-loss protection.
//!
//! While installed, closing or reloading asks the host for its native
//! confirmation, and back-navigation asks the user explicitly. Declining
//! re-pushes the current location so the user stays on the page.

use tracing::{debug, info};

/// Prompt shown when the user tries to navigate back.
pub const LEAVE_PROMPT: &str = "Are you sure you want to leave? Your analysis progress will be lost.";

/// The environment hosting the page: a browser window or a terminal.
pub trait NavigationHost {
    /// Re-push the current location onto the history stack.
    fn push_current_entry(&mut self);

    /// Ask the user a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Leave the page.
    fn leave(&mut self);
}

/// Answer to a close/reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadPolicy {
    Allow,
    RequestConfirmation,
}

/// What happened to a back-navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The user confirmed and the host left the page.
    Left,
    /// The user declined; the current entry was re-pushed.
    Stayed,
    /// Protection is not installed; the host navigates on its own.
    Unguarded,
}

#[derive(Debug, Default)]
pub struct NavigationGuard {
    installed: bool,
    installs: usize,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install protection and push an entry so the first back press lands
    /// on this page. Installing twice without an uninstall is a no-op.
    pub fn install(&mut self, host: &mut dyn NavigationHost) {
        if self.installed {
            debug!("Navigation guard already installed");
            return;
        }

        host.push_current_entry();
        self.installed = true;
        self.installs += 1;
        debug!("Navigation guard installed (mount #{})", self.installs);
    }

    pub fn uninstall(&mut self) {
        if self.installed {
            self.installed = false;
            debug!("Navigation guard removed");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn on_before_unload(&self) -> UnloadPolicy {
        if self.installed {
            UnloadPolicy::RequestConfirmation
        } else {
            UnloadPolicy::Allow
        }
    }

    pub fn on_back_navigation(&mut self, host: &mut dyn NavigationHost) -> NavigationOutcome {
        if !self.installed {
            return NavigationOutcome::Unguarded;
        }

        if host.confirm(LEAVE_PROMPT) {
            info!("User confirmed leaving the analysis");
            host.leave();
            NavigationOutcome::Left
        } else {
            host.push_current_entry();
            NavigationOutcome::Stayed
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Host that answers prompts from a queue and records every effect.
    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub answers: VecDeque<bool>,
        pub prompts: Vec<String>,
        pub pushes: usize,
        pub left: bool,
    }

    impl RecordingHost {
        pub fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl NavigationHost for RecordingHost {
        fn push_current_entry(&mut self) {
            self.pushes += 1;
        }

        fn confirm(&mut self, prompt: &str) -> bool {
            self.prompts.push(prompt.to_string());
            self.answers.pop_front().unwrap_or(false)
        }

        fn leave(&mut self) {
            self.left = true;
        }
    }

    #[test]
    fn test_install_pushes_entry_once() {
        let mut host = RecordingHost::default();
        let mut guard = NavigationGuard::new();

        guard.install(&mut host);
        guard.install(&mut host);

        assert!(guard.is_installed());
        assert_eq!(host.pushes, 1);
        assert_eq!(guard.on_before_unload(), UnloadPolicy::RequestConfirmation);
    }

    #[test]
    fn test_decline_back_navigation_stays() {
        let mut host = RecordingHost::answering(&[false]);
        let mut guard = NavigationGuard::new();
        guard.install(&mut host);

        let outcome = guard.on_back_navigation(&mut host);

        assert_eq!(outcome, NavigationOutcome::Stayed);
        assert_eq!(host.pushes, 2);
        assert!(!host.left);
        assert_eq!(host.prompts, vec![LEAVE_PROMPT.to_string()]);
    }

    #[test]
    fn test_confirm_back_navigation_leaves() {
        let mut host = RecordingHost::answering(&[true]);
        let mut guard = NavigationGuard::new();
        guard.install(&mut host);

        assert_eq!(guard.on_back_navigation(&mut host), NavigationOutcome::Left);
        assert!(host.left);
        assert_eq!(host.pushes, 1);
    }

    #[test]
    fn test_uninstalled_guard_does_not_intercept() {
        let mut host = RecordingHost::answering(&[false]);
        let mut guard = NavigationGuard::new();

        assert_eq!(guard.on_before_unload(), UnloadPolicy::Allow);
        assert_eq!(guard.on_back_navigation(&mut host), NavigationOutcome::Unguarded);
        assert!(host.prompts.is_empty());
    }

    #[test]
    fn test_remount_reinstalls_identically() {
        let mut host = RecordingHost::default();
        let mut guard = NavigationGuard::new();

        guard.install(&mut host);
        guard.uninstall();
        assert_eq!(guard.on_before_unload(), UnloadPolicy::Allow);

        guard.install(&mut host);
        assert_eq!(host.pushes, 2);
        assert_eq!(guard.on_before_unload(), UnloadPolicy::RequestConfirmation);
    }
}
