//! Transient status banners.
//!
//! Banners are shown in creation order with no cap. Each one is visible until
//! its time-to-live elapses, then hidden (so a fade transition can run), then
//! removed. Manual dismissal removes a banner at once; the timer steps that
//! follow find nothing and do nothing.
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Parse a severity name; unknown names fall back to `Info`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "danger" | "error" => Self::Danger,
            _ => Self::Info,
        }
    }

    #[must_use]
    pub fn alert_class(self) -> String {
        format!("alert-{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub text: String,
    pub severity: Severity,
    pub ttl: Duration,
}

impl FeedbackMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Info)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Success)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning)
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Danger)
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Anything that can surface a feedback message to the user.
pub trait FeedbackSink {
    fn show(&self, message: FeedbackMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BannerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BannerPhase {
    Visible,
    /// Fading out; removal follows.
    Hiding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub message: FeedbackMessage,
    pub phase: BannerPhase,
}

/// Ordered set of live banners.
#[derive(Debug, Clone, Default)]
pub struct FeedbackBoard {
    next_id: u64,
    banners: Vec<Banner>,
}

impl FeedbackBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visible banner and return its id.
    pub fn show(&mut self, message: FeedbackMessage) -> BannerId {
        self.next_id += 1;
        let id = BannerId(self.next_id);
        self.banners.push(Banner {
            id,
            message,
            phase: BannerPhase::Visible,
        });
        id
    }

    /// Start hiding a banner. Returns `true` only on the visible to hiding transition.
    pub fn hide(&mut self, id: BannerId) -> bool {
        match self.banners.iter_mut().find(|banner| banner.id == id) {
            Some(banner) if banner.phase == BannerPhase::Visible => {
                banner.phase = BannerPhase::Hiding;
                true
            }
            _ => false,
        }
    }

    /// Drop a banner, whatever its phase.
    pub fn remove(&mut self, id: BannerId) -> Option<Banner> {
        let index = self.banners.iter().position(|banner| banner.id == id)?;
        Some(self.banners.remove(index))
    }

    /// Manual close from the banner's button.
    pub fn dismiss(&mut self, id: BannerId) -> Option<Banner> {
        let removed = self.remove(id);
        if removed.is_some() {
            log::debug!("banner {} dismissed", id.0);
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: BannerId) -> Option<&Banner> {
        self.banners.iter().find(|banner| banner.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Banner> {
        self.banners.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.banners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.banners.is_empty()
    }
}
