//! Transient, self-expiring messages.

use std::time::Duration;
use tokio::time::Instant;

/// Transient message with an expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text shown to the user.
    pub text: String,
    /// Instant after which the message is gone.
    pub deadline: Instant,
}

impl Notice {
    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// Holds at most one notice and expires it lazily against the tokio clock.
#[derive(Debug, Default)]
pub(crate) struct NoticeSlot {
    notice: Option<Notice>,
}

impl NoticeSlot {
    pub(crate) fn show(&mut self, text: impl Into<String>, ttl: Duration) {
        self.notice = Some(Notice {
            text: text.into(),
            deadline: Instant::now() + ttl,
        });
    }

    pub(crate) fn clear(&mut self) {
        self.notice = None;
    }

    /// Drop the notice if its deadline has passed. Returns true if it was dropped.
    pub(crate) fn expire(&mut self) -> bool {
        let now = Instant::now();
        if self.notice.as_ref().is_some_and(|notice| notice.is_expired_at(now)) {
            self.notice = None;
            return true;
        }
        false
    }

    pub(crate) fn visible(&mut self) -> Option<Notice> {
        self.expire();
        self.notice.clone()
    }
}
