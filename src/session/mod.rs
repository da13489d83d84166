//! Session guard and navigation-loss protection.

pub mod guard;
pub mod navigation;

pub use guard::{AnalyzeTicket, SessionGuard, SessionPhase, SessionState};
pub use navigation::{NavigationGuard, NavigationHost, NavigationOutcome, UnloadPolicy, LEAVE_PROMPT};
