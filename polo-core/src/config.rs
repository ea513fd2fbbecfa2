//! Site configuration: element ids, geocoder endpoint, timings and copy.
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Element ids the enhancements look for. Every element is optional on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub cep: String,
    pub locate_button: String,
    pub map: String,
    pub map_instructions: String,
    pub feedback_container: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            cep: "cep".to_string(),
            locate_button: "use-location".to_string(),
            map: "mapa".to_string(),
            map_instructions: "map-instructions".to_string(),
            feedback_container: "feedback-container".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Reverse endpoint; `lat`, `lon` and `format=json` are appended as query parameters.
    pub endpoint: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/reverse".to_string(),
        }
    }
}

/// Banner and announcement timings in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub ttl_ms: u32,
    pub fade_ms: u32,
    pub announce_ms: u32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 5000,
            fade_ms: 300,
            announce_ms: 1000,
        }
    }
}

impl FeedbackConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms as u64)
    }

    #[must_use]
    pub const fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms as u64)
    }
}

/// Navigation targets for the Alt+digit shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutPaths {
    pub home: String,
    pub search: String,
    pub polos: String,
    pub accessibility: String,
}

impl Default for ShortcutPaths {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            search: "/busca/".to_string(),
            polos: "/polos/".to_string(),
            accessibility: "/acessibilidade/".to_string(),
        }
    }
}

/// User-facing copy, announced or shown in banners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub locating: String,
    pub location_success: String,
    pub location_failed: String,
    pub postcode_failed: String,
    pub cep_formatted: String,
    pub contrast_on: String,
    pub contrast_off: String,
    pub font_increased: String,
    pub font_decreased: String,
    pub font_reset: String,
    pub zoom_in: String,
    pub zoom_out: String,
    pub form_invalid: String,
    pub dismiss_label: String,
    pub zoom_in_label: String,
    pub zoom_out_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            locating: "Obtendo sua localização...".to_string(),
            location_success: "Localização obtida com sucesso!".to_string(),
            location_failed: "Erro ao obter localização. Por favor, digite o CEP.".to_string(),
            postcode_failed: "Erro ao obter CEP da localização.".to_string(),
            cep_formatted: "CEP formatado corretamente".to_string(),
            contrast_on: "Modo alto contraste ativado".to_string(),
            contrast_off: "Modo alto contraste desativado".to_string(),
            font_increased: "Tamanho da fonte aumentado".to_string(),
            font_decreased: "Tamanho da fonte diminuído".to_string(),
            font_reset: "Tamanho da fonte restaurado".to_string(),
            zoom_in: "Zoom aumentado".to_string(),
            zoom_out: "Zoom diminuído".to_string(),
            form_invalid: "Por favor, preencha todos os campos obrigatórios.".to_string(),
            dismiss_label: "Fechar".to_string(),
            zoom_in_label: "Aumentar zoom do mapa".to_string(),
            zoom_out_label: "Diminuir zoom do mapa".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoloConfig {
    pub elements: ElementIds,
    pub geocoder: GeocoderConfig,
    pub feedback: FeedbackConfig,
    pub shortcuts: ShortcutPaths,
    pub messages: Messages,
}

impl PoloConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the configuration bundled with the web assets.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(include_str!(
            "../../polo-web/static/assets/data/polo.json"
        ))
        .unwrap_or_else(|err| {
            log::warn!("bundled polo config is invalid, using defaults: {err}");
            Self::default()
        })
    }
}
