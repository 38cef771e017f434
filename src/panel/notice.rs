//! Transient notice banners fed by the one-shot result slot.

use std::time::{Duration, Instant};

use super::style::NoticeTone;

/// How long a banner stays on screen before self-dismissing.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// One transient success/error banner.
pub struct NoticeBanner {
    /// Message shown to the user.
    pub text: String,
    /// Display tone.
    pub tone: NoticeTone,
    shown_at: Instant,
}

impl NoticeBanner {
    /// Start a banner's display window now.
    pub fn new(text: impl Into<String>, tone: NoticeTone) -> Self {
        Self {
            text: text.into(),
            tone,
            shown_at: Instant::now(),
        }
    }

    /// True once the display window has elapsed.
    pub fn expired(&self) -> bool {
        self.expired_after(NOTICE_TTL)
    }

    fn expired_after(&self, ttl: Duration) -> bool {
        self.shown_at.elapsed() >= ttl
    }
}
