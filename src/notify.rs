// src/notify.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{error, info};

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration_ms: TOAST_DURATION.as_millis() as u64,
            created_at: Utc::now(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast::new(ToastLevel::Success, message));
    }

    fn error(&self, message: &str) {
        self.notify(Toast::new(ToastLevel::Error, message));
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success => info!(target: "toast", "{}", toast.message),
            ToastLevel::Error => error!(target: "toast", "{}", toast.message),
        }
    }
}

/// Keeps every toast in memory, newest last.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<(ToastLevel, String)> {
        self.toasts()
            .into_iter()
            .map(|t| (t.level, t.message))
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, toast: Toast) {
        self.lock().push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_keeps_order() {
        let notifier = MemoryNotifier::new();
        notifier.success("Depositing...");
        notifier.error("execution reverted");

        assert_eq!(
            notifier.messages(),
            vec![
                (ToastLevel::Success, "Depositing...".to_string()),
                (ToastLevel::Error, "execution reverted".to_string()),
            ]
        );
        assert!(notifier.toasts().iter().all(|t| t.duration_ms == 2000));
    }

    #[test]
    fn poisoned_lock_keeps_toasts() {
        let notifier = MemoryNotifier::new();
        notifier.success("before");
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = notifier.toasts.lock().unwrap();
            panic!("poison the lock");
        }));
        assert!(poisoned.is_err());
        assert!(notifier.toasts.is_poisoned());

        notifier.error("after");
        assert_eq!(
            notifier.messages(),
            vec![
                (ToastLevel::Success, "before".to_string()),
                (ToastLevel::Error, "after".to_string()),
            ]
        );
    }
}
