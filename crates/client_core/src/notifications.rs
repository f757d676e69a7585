//! Application-wide notification queue shared by every view.

use std::{collections::VecDeque, sync::Mutex};

use tracing::{info, warn};

pub const NOTIFICATION_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, title: &str, message: &str) -> u64;

    fn info(&self, title: &str, message: &str) -> u64 {
        self.notify(NotificationLevel::Info, title, message)
    }

    fn success(&self, title: &str, message: &str) -> u64 {
        self.notify(NotificationLevel::Success, title, message)
    }

    fn warning(&self, title: &str, message: &str) -> u64 {
        self.notify(NotificationLevel::Warning, title, message)
    }

    fn error(&self, title: &str, message: &str) -> u64 {
        self.notify(NotificationLevel::Error, title, message)
    }
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    items: VecDeque<Notification>,
}

/// Bounded FIFO of pending notifications. When full, the oldest entry is
/// dropped to make room.
#[derive(Debug)]
pub struct NotificationCenter {
    capacity: usize,
    queue: Mutex<Queue>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_capacity(NOTIFICATION_CAPACITY)
    }
}

impl NotificationCenter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(Queue::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn pending(&self) -> Vec<Notification> {
        self.lock().items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pop_front(&self) -> Option<Notification> {
        self.lock().items.pop_front()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.items.len();
        queue.items.retain(|notification| notification.id != id);
        queue.items.len() != before
    }

    pub fn clear(&self) {
        self.lock().items.clear();
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, level: NotificationLevel, title: &str, message: &str) -> u64 {
        match level {
            NotificationLevel::Warning | NotificationLevel::Error => {
                warn!(?level, title, message, "notification")
            }
            _ => info!(?level, title, message, "notification"),
        }

        let mut queue = self.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        if queue.items.len() >= self.capacity {
            queue.items.pop_front();
        }
        queue.items.push_back(Notification {
            id,
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues_in_order_and_dismisses_by_id() {
        let center = NotificationCenter::default();
        let first = center.info("Import", "started");
        let second = center.error("Import", "failed");
        assert!(second > first);

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        let pending = center.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].level, NotificationLevel::Error);
    }

    #[test]
    fn drops_oldest_when_full() {
        let center = NotificationCenter::with_capacity(2);
        center.info("a", "1");
        center.info("b", "2");
        center.info("c", "3");
        let titles: Vec<String> = center.pending().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["b", "c"]);
        assert_eq!(center.pop_front().map(|n| n.title), Some("b".to_string()));
        center.clear();
        assert!(center.is_empty());
    }
}
