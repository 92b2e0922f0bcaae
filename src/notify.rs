use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub const VISIBLE_MS: u64 = 5000;
pub const FADE_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoticeView {
    pub message: String,
    pub kind: NoticeKind,
    /// Past the visible window, about to be removed. Rendered dimmed.
    pub fading: bool,
}

struct Notice {
    message: String,
    kind: NoticeKind,
    created_at: Instant,
}

/// Transient operator messages with auto-expiry.
///
/// Entries live for the visible duration, are reported as fading for the
/// fade duration, then disappear. Expiry is applied on access rather than by
/// timers, so there is no removal handle to manage and callers may drop
/// their references at any time.
pub struct NotificationQueue {
    inner: Mutex<Vec<Notice>>,
    visible: Duration,
    fade: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(VISIBLE_MS),
            Duration::from_millis(FADE_MS),
        )
    }
}

impl NotificationQueue {
    pub fn new(visible: Duration, fade: Duration) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            visible,
            fade,
        }
    }

    /// Append a notification. Empty messages are dropped.
    pub fn push(&self, message: &str, kind: NoticeKind) {
        if message.is_empty() {
            return;
        }
        self.inner.lock().unwrap().push(Notice {
            message: message.to_string(),
            kind,
            created_at: Instant::now(),
        });
    }

    /// Sweep expired entries and return the survivors, oldest first.
    pub fn active(&self) -> Vec<NoticeView> {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap();
        inner.retain(|n| now.duration_since(n.created_at) < self.visible + self.fade);
        inner
            .iter()
            .map(|n| NoticeView {
                message: n.message.clone(),
                kind: n.kind,
                fading: now.duration_since(n.created_at) >= self.visible,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn empty_message_is_dropped() {
        let queue = NotificationQueue::default();
        queue.push("", NoticeKind::Info);
        assert!(queue.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn notice_fades_then_expires() {
        let queue = NotificationQueue::default();
        queue.push("Connected to server", NoticeKind::Info);

        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert!(!active[0].fading);

        tokio::time::advance(Duration::from_millis(VISIBLE_MS + 100)).await;
        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert!(active[0].fading);

        tokio::time::advance(Duration::from_millis(FADE_MS)).await;
        assert!(queue.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn notices_coexist_without_dedup() {
        let queue = NotificationQueue::default();
        queue.push("Connection error. Retrying...", NoticeKind::Error);
        tokio::time::advance(Duration::from_millis(1000)).await;
        queue.push("Connection error. Retrying...", NoticeKind::Error);

        let active = queue.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].kind, NoticeKind::Error);
        assert_eq!(active[0].message, active[1].message);
    }

    #[tokio::test(start_paused = true)]
    async fn older_notice_expires_before_newer() {
        let queue = NotificationQueue::default();
        queue.push("first", NoticeKind::Info);
        tokio::time::advance(Duration::from_millis(3000)).await;
        queue.push("second", NoticeKind::Info);

        tokio::time::advance(Duration::from_millis(VISIBLE_MS - 2000)).await;
        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "second");
    }
}
