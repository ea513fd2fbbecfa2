//! Page-level state shared by every enhancement.
use crate::feedback::DomFeedback;
use crate::geo::{BrowserGeolocator, FetchGeocoder};
use crate::render::DocumentRenderer;
use crate::storage::LocalStore;
use once_cell::sync::Lazy;
use polo_core::{
    FeedbackMessage, FeedbackSink, FontAction, LocationResolver, PoloConfig, PreferenceStore,
    Severity,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

static CONFIG: Lazy<PoloConfig> = Lazy::new(PoloConfig::load_from_static);

/// Configuration bundled with the web assets.
#[must_use]
pub fn config() -> &'static PoloConfig {
    &CONFIG
}

pub type WebResolver = LocationResolver<BrowserGeolocator, FetchGeocoder>;

/// Handles wired into the page's event listeners.
#[derive(Clone)]
pub struct Page {
    pub config: &'static PoloConfig,
    pub renderer: Rc<DocumentRenderer>,
    pub feedback: Rc<DomFeedback>,
    pub prefs: Rc<RefCell<PreferenceStore<LocalStore>>>,
    pub resolver: Rc<WebResolver>,
}

impl Page {
    /// Load saved preferences and apply them to the document.
    #[must_use]
    pub fn boot(config: &'static PoloConfig) -> Self {
        let renderer = Rc::new(DocumentRenderer::new(
            config.elements.cep.clone(),
            Duration::from_millis(u64::from(config.feedback.announce_ms)),
        ));
        let feedback = Rc::new(DomFeedback::new(
            config.elements.feedback_container.clone(),
            config.feedback.fade(),
            config.messages.dismiss_label.clone(),
        ));
        let prefs = PreferenceStore::load(LocalStore, config.messages.clone());
        prefs.restore(renderer.as_ref());
        let resolver = LocationResolver::new(
            BrowserGeolocator,
            FetchGeocoder::new(config.geocoder.endpoint.clone()),
            config,
        );
        Self {
            config,
            renderer,
            feedback,
            prefs: Rc::new(RefCell::new(prefs)),
            resolver: Rc::new(resolver),
        }
    }

    /// Install every enhancement whose elements are present.
    pub fn enhance(&self) {
        crate::forms::enhance_cep_input(self);
        crate::forms::enhance_locate_button(self);
        crate::forms::enhance_validation(self);
        crate::map::enhance_map(
            &self.config.elements.map,
            &self.config.elements.map_instructions,
            &self.config.messages,
            Rc::clone(&self.renderer),
        );
        crate::keyboard::install(self);
    }

    pub fn toggle_high_contrast(&self) -> bool {
        self.prefs
            .borrow_mut()
            .toggle_high_contrast(self.renderer.as_ref())
    }

    pub fn adjust_font_size(&self, action: FontAction) -> f64 {
        self.prefs
            .borrow_mut()
            .adjust_font_size(self.renderer.as_ref(), action)
            .as_f64()
    }

    pub fn switch_theme(&self, name: &str) -> bool {
        self.prefs
            .borrow_mut()
            .switch_theme(self.renderer.as_ref(), name)
    }

    /// Show a banner with the configured ttl unless one is given.
    pub fn show_feedback(&self, text: &str, severity: Severity, ttl: Option<Duration>) {
        let message = FeedbackMessage::new(text, severity)
            .with_ttl(ttl.unwrap_or_else(|| self.config.feedback.ttl()));
        self.feedback.show(message);
    }
}
