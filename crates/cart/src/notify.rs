//! User-facing outcome messages.
//!
//! The cart store reports every failed operation through a [`Notifier`]. The
//! call is fire-and-forget: it cannot fail and nothing waits on it.

use mockall::automock;

/// Delivers a short message to the user.
#[automock]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Emits notices as `warn` events on the `notice` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "notice", "{message}");
    }
}
