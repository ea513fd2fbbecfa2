//! Persisted accessibility preferences: high contrast, font scale and theme.
use crate::config::Messages;
use crate::{KeyValueStore, RenderPort};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const HIGH_CONTRAST_KEY: &str = "highContrast";
pub const FONT_SCALE_KEY: &str = "fontScale";
pub const THEME_KEY: &str = "userTheme";

pub const HIGH_CONTRAST_CLASS: &str = "high-contrast";
pub const FONT_SCALE_PROPERTY: &str = "--font-size-scale";

/// Persona themes; exactly one theme class sits on the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Student,
    Accessible,
    Admin,
}

impl Theme {
    pub const ALL: [Self; 3] = [Self::Student, Self::Accessible, Self::Admin];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Accessible => "accessible",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Student => "theme-student",
            Self::Accessible => "theme-accessible",
            Self::Admin => "theme-admin",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontAction {
    Increase,
    Decrease,
    Reset,
}

impl FontAction {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "increase" => Some(Self::Increase),
            "decrease" => Some(Self::Decrease),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Font scale held in tenths so repeated steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", from = "f64")]
pub struct FontScale(u8);

impl FontScale {
    const MIN_TENTHS: u8 = 8;
    const MAX_TENTHS: u8 = 15;

    pub const MIN: Self = Self(Self::MIN_TENTHS);
    pub const MAX: Self = Self(Self::MAX_TENTHS);
    pub const DEFAULT: Self = Self(10);

    /// Round to the nearest tenth and clamp into `[0.8, 1.5]`.
    ///
    /// Returns `None` for NaN or infinite input.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tenths = (value * 10.0)
            .round()
            .clamp(f64::from(Self::MIN_TENTHS), f64::from(Self::MAX_TENTHS))
            as u8;
        Some(Self(tenths))
    }

    /// Parse a stored value, `None` when it is not a number.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().and_then(Self::from_f64)
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    #[must_use]
    pub const fn apply(self, action: FontAction) -> Self {
        match action {
            FontAction::Increase if self.0 < Self::MAX_TENTHS => Self(self.0 + 1),
            FontAction::Decrease if self.0 > Self::MIN_TENTHS => Self(self.0 - 1),
            FontAction::Increase | FontAction::Decrease => self,
            FontAction::Reset => Self::DEFAULT,
        }
    }
}

impl Default for FontScale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FontScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl From<FontScale> for f64 {
    fn from(value: FontScale) -> Self {
        value.as_f64()
    }
}

impl From<f64> for FontScale {
    fn from(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub high_contrast: bool,
    pub font_scale: FontScale,
    pub theme: Theme,
}

impl Preferences {
    /// Read every preference from storage, falling back to defaults per key.
    pub fn read<S: KeyValueStore + ?Sized>(storage: &S) -> Self {
        let high_contrast = storage
            .get(HIGH_CONTRAST_KEY)
            .is_some_and(|value| value == "true");
        let font_scale = storage
            .get(FONT_SCALE_KEY)
            .and_then(|value| FontScale::parse(&value))
            .unwrap_or_default();
        let theme = storage
            .get(THEME_KEY)
            .and_then(|value| Theme::from_name(&value))
            .unwrap_or_default();
        Self {
            high_contrast,
            font_scale,
            theme,
        }
    }

    /// Push every preference to the document.
    pub fn apply<R: RenderPort + ?Sized>(&self, port: &R) {
        port.set_body_class(HIGH_CONTRAST_CLASS, self.high_contrast);
        port.set_root_property(FONT_SCALE_PROPERTY, &self.font_scale.to_string());
        apply_theme(port, self.theme);
    }
}

fn apply_theme<R: RenderPort + ?Sized>(port: &R, theme: Theme) {
    for other in Theme::ALL {
        port.set_body_class(other.class(), false);
    }
    port.set_body_class(theme.class(), true);
}

/// Owns the preference record and writes every change straight back to storage.
pub struct PreferenceStore<S: KeyValueStore> {
    storage: S,
    prefs: Preferences,
    messages: Messages,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Load preferences from `storage`.
    pub fn load(storage: S, messages: Messages) -> Self {
        let prefs = Preferences::read(&storage);
        log::debug!("restored preferences: {prefs:?}");
        Self {
            storage,
            prefs,
            messages,
        }
    }

    #[must_use]
    pub const fn preferences(&self) -> Preferences {
        self.prefs
    }

    /// Apply the current record to the document without announcing anything.
    pub fn restore<R: RenderPort + ?Sized>(&self, port: &R) {
        self.prefs.apply(port);
    }

    /// Flip high contrast, persist and announce it. Returns the new state.
    pub fn toggle_high_contrast<R: RenderPort + ?Sized>(&mut self, port: &R) -> bool {
        let enabled = !self.prefs.high_contrast;
        self.prefs.high_contrast = enabled;
        port.set_body_class(HIGH_CONTRAST_CLASS, enabled);
        self.persist(HIGH_CONTRAST_KEY, if enabled { "true" } else { "false" });
        port.announce(if enabled {
            self.messages.contrast_on.as_str()
        } else {
            self.messages.contrast_off.as_str()
        });
        enabled
    }

    /// Step the font scale, persist and announce it. Returns the new scale.
    pub fn adjust_font_size<R: RenderPort + ?Sized>(
        &mut self,
        port: &R,
        action: FontAction,
    ) -> FontScale {
        let scale = self.prefs.font_scale.apply(action);
        self.prefs.font_scale = scale;
        let value = scale.to_string();
        port.set_root_property(FONT_SCALE_PROPERTY, &value);
        self.persist(FONT_SCALE_KEY, &value);
        port.announce(match action {
            FontAction::Increase => self.messages.font_increased.as_str(),
            FontAction::Decrease => self.messages.font_decreased.as_str(),
            FontAction::Reset => self.messages.font_reset.as_str(),
        });
        scale
    }

    /// Switch to the named theme. Unknown names leave everything untouched.
    pub fn switch_theme<R: RenderPort + ?Sized>(&mut self, port: &R, name: &str) -> bool {
        let Some(theme) = Theme::from_name(name) else {
            log::debug!("ignoring unknown theme {name:?}");
            return false;
        };
        self.prefs.theme = theme;
        apply_theme(port, theme);
        self.persist(THEME_KEY, theme.name());
        true
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.set(key, value) {
            log::warn!("could not persist {key}: {err}");
        }
    }
}
