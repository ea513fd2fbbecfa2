//! Keyboard shortcuts.
use crate::config::ShortcutPaths;
use crate::prefs::FontAction;

/// The parts of a keydown event the shortcuts care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord<'a> {
    pub key: &'a str,
    pub alt: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Home,
    Search,
    Polos,
    Accessibility,
}

impl Destination {
    #[must_use]
    pub fn path(self, paths: &ShortcutPaths) -> &str {
        match self {
            Self::Home => &paths.home,
            Self::Search => &paths.search,
            Self::Polos => &paths.polos,
            Self::Accessibility => &paths.accessibility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Navigate(Destination),
    ToggleContrast,
    Font(FontAction),
}

impl Shortcut {
    /// Alt+1/2/3/0 navigate, Alt+C toggles contrast, Ctrl with `+`, `=`, `-`
    /// or `0` scales the font. Alt chords win when both modifiers are held.
    #[must_use]
    pub fn from_chord(chord: KeyChord<'_>) -> Option<Self> {
        if chord.alt {
            let shortcut = match chord.key {
                "1" => Self::Navigate(Destination::Home),
                "2" => Self::Navigate(Destination::Search),
                "3" => Self::Navigate(Destination::Polos),
                "0" => Self::Navigate(Destination::Accessibility),
                "c" | "C" => Self::ToggleContrast,
                _ => return None,
            };
            return Some(shortcut);
        }
        if chord.ctrl {
            let action = match chord.key {
                "+" | "=" => FontAction::Increase,
                "-" => FontAction::Decrease,
                "0" => FontAction::Reset,
                _ => return None,
            };
            return Some(Self::Font(action));
        }
        None
    }

    /// Font chords shadow the browser's own zoom keys.
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::Font(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(key: &str, alt: bool, ctrl: bool) -> Option<Shortcut> {
        Shortcut::from_chord(KeyChord { key, alt, ctrl })
    }

    #[test]
    fn alt_digits_navigate() {
        let paths = ShortcutPaths::default();
        let expected = [
            ("1", "/"),
            ("2", "/busca/"),
            ("3", "/polos/"),
            ("0", "/acessibilidade/"),
        ];
        for (key, path) in expected {
            let Some(Shortcut::Navigate(dest)) = chord(key, true, false) else {
                panic!("alt+{key} should navigate");
            };
            assert_eq!(dest.path(&paths), path);
        }
    }

    #[test]
    fn alt_c_toggles_contrast() {
        assert_eq!(chord("c", true, false), Some(Shortcut::ToggleContrast));
        assert_eq!(chord("c", false, false), None);
    }

    #[test]
    fn ctrl_keys_scale_font() {
        assert_eq!(chord("+", false, true), Some(Shortcut::Font(FontAction::Increase)));
        assert_eq!(chord("=", false, true), Some(Shortcut::Font(FontAction::Increase)));
        assert_eq!(chord("-", false, true), Some(Shortcut::Font(FontAction::Decrease)));
        assert_eq!(chord("0", false, true), Some(Shortcut::Font(FontAction::Reset)));
        assert!(Shortcut::Font(FontAction::Reset).prevents_default());
        assert!(!Shortcut::ToggleContrast.prevents_default());
    }

    #[test]
    fn plain_and_unknown_keys_are_ignored() {
        assert_eq!(chord("1", false, false), None);
        assert_eq!(chord("x", true, false), None);
        assert_eq!(chord("x", false, true), None);
    }
}
