//! Scenario catalog.
//!
//! Every scenario is a property check driven by a seeded `ChaCha20Rng`, so a
//! failing seed can be replayed with `--seeds`.
use anyhow::{Result, bail, ensure};
use async_trait::async_trait;
use futures::future::join_all;
use polo_core::prefs::{FONT_SCALE_KEY, FONT_SCALE_PROPERTY, HIGH_CONTRAST_CLASS};
use polo_core::testing::{
    FixedGeocoder, FixedGeolocator, MemoryStore, RecordingFeedback, RecordingRenderer,
};
use polo_core::{
    BannerId, BannerPhase, Cep, Coordinates, FeedbackBoard, FeedbackMessage,
    FontAction, FontScale, GeocodeError, KeyChord, KeyValueStore, LocateError, LocationError,
    LocationResolver, MaskedInput, PoloConfig, PreferenceStore, RenderPort, ReverseGeocoder,
    Severity, Shortcut, Theme, digits_only, format_cep, is_complete, parse_reverse_response,
};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tokio::sync::oneshot;

pub type LocalCheck = Pin<Box<dyn Future<Output = Result<()>>>>;

#[derive(Clone, Copy)]
pub enum Check {
    Sync(fn(&mut ChaCha20Rng) -> Result<()>),
    Async(fn(ChaCha20Rng) -> LocalCheck),
}

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub check: Check,
}

const CATALOG: &[Scenario] = &[
    Scenario {
        name: "cep-mask",
        description: "Masked CEP keeps the #####-### shape for noisy input",
        check: Check::Sync(cep_mask),
    },
    Scenario {
        name: "cep-typing",
        description: "Typing a CEP announces completion exactly once",
        check: Check::Sync(cep_typing),
    },
    Scenario {
        name: "font-scale",
        description: "Font scale random walk stays in [0.8, 1.5] and persists",
        check: Check::Sync(font_scale_walk),
    },
    Scenario {
        name: "theme-exclusive",
        description: "Exactly one theme class after any sequence of switches",
        check: Check::Sync(theme_exclusive),
    },
    Scenario {
        name: "preference-restore",
        description: "Preferences read back after a reload match what was set",
        check: Check::Sync(preference_restore),
    },
    Scenario {
        name: "shortcuts",
        description: "Keyboard chords map to the documented shortcuts",
        check: Check::Sync(shortcut_chords),
    },
    Scenario {
        name: "feedback-lifecycle",
        description: "Banners stack in order and hide/remove/dismiss stay consistent",
        check: Check::Sync(feedback_lifecycle),
    },
    Scenario {
        name: "geocode-malformed",
        description: "Malformed reverse geocoding bodies never yield a postcode",
        check: Check::Sync(geocode_malformed),
    },
    Scenario {
        name: "location-success",
        description: "A found postcode is masked into the field with a success banner",
        check: Check::Async(location_success),
    },
    Scenario {
        name: "location-failure",
        description: "Any lookup failure leaves the field untouched and shows a danger banner",
        check: Check::Async(location_failure),
    },
    Scenario {
        name: "location-race",
        description: "Only the latest of several overlapping location requests writes",
        check: Check::Async(location_race),
    },
];

pub fn get_scenario(name: &str) -> Option<Scenario> {
    let wanted = name.to_lowercase();
    CATALOG.iter().copied().find(|s| s.name == wanted)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.iter().map(|s| (s.name, s.description)).collect()
}

pub fn all_names() -> Vec<String> {
    CATALOG.iter().map(|s| s.name.to_string()).collect()
}

const NOISE: &[char] = &['-', '.', ' ', '/', 'a', 'Z', '(', ')', 'ç', '٣'];

fn noisy_input(rng: &mut ChaCha20Rng) -> String {
    let len = rng.gen_range(0..20);
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.6) {
                char::from(b'0' + rng.gen_range(0..10u8))
            } else {
                NOISE[rng.gen_range(0..NOISE.len())]
            }
        })
        .collect()
}

fn random_digits(rng: &mut ChaCha20Rng, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn cep_mask(rng: &mut ChaCha20Rng) -> Result<()> {
    let shape = Regex::new(r"^\d{1,5}(-\d{1,3})?$")?;
    for _ in 0..64 {
        let raw = noisy_input(rng);
        let masked = format_cep(&raw);
        let digits = digits_only(&raw);
        if digits.is_empty() {
            ensure!(masked.is_empty(), "{raw:?} has no digits but masked to {masked:?}");
            continue;
        }
        ensure!(shape.is_match(&masked), "{raw:?} masked to {masked:?}");
        let kept: String = digits.chars().take(8).collect();
        ensure!(digits_only(&masked) == kept, "{raw:?} lost digits: {masked:?}");
        ensure!(format_cep(&masked) == masked, "masking {masked:?} again changed it");
        if kept.len() == 8 {
            ensure!(is_complete(&masked), "{masked:?} should be complete");
            let cep = Cep::parse(&masked)?;
            ensure!(cep.to_string() == masked, "{cep} differs from {masked:?}");
        } else {
            ensure!(Cep::parse(&raw).is_err(), "{raw:?} parsed with {} digits", kept.len());
        }
    }
    Ok(())
}

fn cep_typing(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut field = String::new();
    let mut completions = 0;
    let mut typed_digits = 0;
    while typed_digits < 10 {
        let key = if rng.gen_bool(0.8) {
            typed_digits += 1;
            char::from(b'0' + rng.gen_range(0..10u8))
        } else {
            NOISE[rng.gen_range(0..NOISE.len())]
        };
        let current = format!("{field}{key}");
        let step = MaskedInput::apply(&field, &current);
        if step.completed {
            completions += 1;
            ensure!(is_complete(&step.value), "announced incomplete {:?}", step.value);
        }
        field = step.value;
    }
    ensure!(completions == 1, "completion announced {completions} times");
    ensure!(field.len() == 9, "field ended as {field:?}");
    Ok(())
}

const ACTIONS: [FontAction; 3] = [FontAction::Increase, FontAction::Decrease, FontAction::Reset];

fn font_scale_walk(rng: &mut ChaCha20Rng) -> Result<()> {
    let storage = MemoryStore::default();
    let renderer = RecordingRenderer::default();
    let mut store = PreferenceStore::load(&storage, PoloConfig::default().messages);
    let mut expected: i32 = 10;
    for step in 0..200 {
        let action = ACTIONS[rng.gen_range(0..ACTIONS.len())];
        expected = match action {
            FontAction::Increase => (expected + 1).min(15),
            FontAction::Decrease => (expected - 1).max(8),
            FontAction::Reset => 10,
        };
        let scale = store.adjust_font_size(&renderer, action);
        let value = scale.as_f64();
        ensure!((0.8..=1.5).contains(&value), "step {step}: scale {value} out of range");
        ensure!(
            (value - f64::from(expected) / 10.0).abs() < 1e-9,
            "step {step}: expected {expected} tenths, got {value}"
        );
        let shown = renderer.property(FONT_SCALE_PROPERTY);
        ensure!(shown == Some(scale.to_string()), "step {step}: property {shown:?}");
        let stored = storage.get(FONT_SCALE_KEY).and_then(|raw| FontScale::parse(&raw));
        ensure!(stored == Some(scale), "step {step}: stored {stored:?}");
    }
    ensure!(renderer.announcements().len() == 200, "one announcement per step");
    Ok(())
}

const THEME_NAMES: &[&str] = &["student", "accessible", "admin", "pirate", "", "STUDENT"];

fn theme_exclusive(rng: &mut ChaCha20Rng) -> Result<()> {
    let storage = MemoryStore::default();
    let renderer = RecordingRenderer::default();
    let mut store = PreferenceStore::load(&storage, PoloConfig::default().messages);
    store.restore(&renderer);
    let mut expected = Theme::default();
    for _ in 0..50 {
        let name = THEME_NAMES[rng.gen_range(0..THEME_NAMES.len())];
        let known = Theme::from_name(name);
        let switched = store.switch_theme(&renderer, name);
        ensure!(switched == known.is_some(), "switch_theme({name:?}) returned {switched}");
        if let Some(theme) = known {
            expected = theme;
        }
        let classes = renderer.theme_classes();
        ensure!(
            classes == vec![expected.class().to_string()],
            "after {name:?}: theme classes {classes:?}"
        );
    }
    Ok(())
}

fn preference_restore(rng: &mut ChaCha20Rng) -> Result<()> {
    let storage = MemoryStore::default();
    let first_page = RecordingRenderer::default();
    let messages = PoloConfig::default().messages;
    let mut store = PreferenceStore::load(&storage, messages.clone());
    for _ in 0..rng.gen_range(1..20) {
        match rng.gen_range(0..3) {
            0 => {
                store.toggle_high_contrast(&first_page);
            }
            1 => {
                store.adjust_font_size(&first_page, ACTIONS[rng.gen_range(0..ACTIONS.len())]);
            }
            _ => {
                let theme = Theme::ALL[rng.gen_range(0..Theme::ALL.len())];
                store.switch_theme(&first_page, theme.name());
            }
        }
    }
    let saved = store.preferences();
    let reloaded = PreferenceStore::load(&storage, messages);
    ensure!(reloaded.preferences() == saved, "{:?} != {saved:?}", reloaded.preferences());

    let second_page = RecordingRenderer::default();
    reloaded.restore(&second_page);
    ensure!(
        second_page.has_class(HIGH_CONTRAST_CLASS) == saved.high_contrast,
        "high contrast class does not match {saved:?}"
    );
    ensure!(
        second_page.theme_classes() == vec![saved.theme.class().to_string()],
        "restored theme classes {:?}",
        second_page.theme_classes()
    );
    ensure!(
        second_page.announcements().is_empty(),
        "restoring must not announce anything"
    );
    Ok(())
}

const KEYS: &[&str] = &["1", "2", "3", "0", "c", "C", "+", "=", "-", "x", "Enter", "9"];

fn shortcut_chords(rng: &mut ChaCha20Rng) -> Result<()> {
    let paths = PoloConfig::default().shortcuts;
    for _ in 0..100 {
        let key = KEYS[rng.gen_range(0..KEYS.len())];
        let chord = KeyChord {
            key,
            alt: rng.gen_bool(0.5),
            ctrl: rng.gen_bool(0.5),
        };
        let shortcut = Shortcut::from_chord(chord);
        if !chord.alt && !chord.ctrl {
            ensure!(shortcut.is_none(), "plain {key:?} triggered {shortcut:?}");
            continue;
        }
        match shortcut {
            Some(Shortcut::Navigate(destination)) => {
                ensure!(chord.alt, "navigation without Alt for {key:?}");
                ensure!(destination.path(&paths).starts_with('/'), "{destination:?} path");
            }
            Some(Shortcut::ToggleContrast) => {
                ensure!(chord.alt && key.eq_ignore_ascii_case("c"), "contrast on {chord:?}");
            }
            Some(Shortcut::Font(_)) => {
                ensure!(chord.ctrl && !chord.alt, "font change on {chord:?}");
            }
            None => {}
        }
        if let Some(shortcut) = shortcut {
            ensure!(
                shortcut.prevents_default() == matches!(shortcut, Shortcut::Font(_)),
                "{shortcut:?} default handling"
            );
        }
    }
    Ok(())
}

const SEVERITIES: [Severity; 4] = [
    Severity::Info,
    Severity::Success,
    Severity::Warning,
    Severity::Danger,
];

fn feedback_lifecycle(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut board = FeedbackBoard::new();
    let mut model: Vec<(BannerId, BannerPhase)> = Vec::new();
    let mut issued: Vec<BannerId> = Vec::new();
    for step in 0..200 {
        let op = rng.gen_range(0..4);
        if op == 0 || issued.is_empty() {
            let severity = SEVERITIES[rng.gen_range(0..SEVERITIES.len())];
            let id = board.show(FeedbackMessage::new(format!("banner {step}"), severity));
            if let Some(last) = issued.last() {
                ensure!(id > *last, "ids must increase");
            }
            issued.push(id);
            model.push((id, BannerPhase::Visible));
            continue;
        }
        let id = issued[rng.gen_range(0..issued.len())];
        let position = model.iter().position(|(known, _)| *known == id);
        match op {
            1 => {
                let visible = position.is_some_and(|i| model[i].1 == BannerPhase::Visible);
                ensure!(board.hide(id) == visible, "step {step}: hide({id:?})");
                if let Some(i) = position {
                    model[i].1 = BannerPhase::Hiding;
                }
            }
            2 => {
                ensure!(board.remove(id).is_some() == position.is_some(), "step {step}: remove");
                if let Some(i) = position {
                    model.remove(i);
                }
            }
            _ => {
                ensure!(board.dismiss(id).is_some() == position.is_some(), "step {step}: dismiss");
                if let Some(i) = position {
                    model.remove(i);
                }
            }
        }
        let live: Vec<(BannerId, BannerPhase)> =
            board.iter().map(|banner| (banner.id, banner.phase)).collect();
        ensure!(live == model, "step {step}: board {live:?} != model {model:?}");
    }
    Ok(())
}

const MALFORMED: &[&str] = &[
    "",
    "{",
    "[]",
    "null",
    "\"01310-930\"",
    r#"{"address":{}}"#,
    r#"{"address":null}"#,
    r#"{"display_name":"Avenida Paulista"}"#,
    r#"{"address":{"postcode":42}}"#,
];

fn geocode_malformed(rng: &mut ChaCha20Rng) -> Result<()> {
    let mut bodies: Vec<&str> = MALFORMED.to_vec();
    bodies.shuffle(rng);
    for body in bodies {
        if let Ok(postcode) = parse_reverse_response(body) {
            bail!("{body:?} yielded postcode {postcode:?}");
        }
    }
    let digits = random_digits(rng, 8);
    let body = format!(r#"{{"address":{{"postcode":"{digits}","city":"São Paulo"}}}}"#);
    ensure!(parse_reverse_response(&body)? == digits, "well-formed body rejected");
    Ok(())
}

const SAO_PAULO: Coordinates = Coordinates {
    latitude: -23.561_414,
    longitude: -46.655_881,
};

fn decorate_postcode(rng: &mut ChaCha20Rng, digits: &str) -> String {
    match rng.gen_range(0..3) {
        0 => digits.to_string(),
        1 => format!("{}-{}", &digits[..5], &digits[5..]),
        _ => format!(" {} {} ", &digits[..5], &digits[5..]),
    }
}

fn location_success(mut rng: ChaCha20Rng) -> LocalCheck {
    Box::pin(async move {
        let config = PoloConfig::default();
        let digits = random_digits(&mut rng, 8);
        let reply = decorate_postcode(&mut rng, &digits);
        let resolver = LocationResolver::new(
            FixedGeolocator(Ok(SAO_PAULO)),
            FixedGeocoder(Ok(reply.clone())),
            &config,
        );
        let renderer = RecordingRenderer::default();
        let feedback = RecordingFeedback::default();
        let value = resolver.resolve(&renderer, &feedback).await?;
        let expected = format_cep(&digits);
        ensure!(value == expected, "{reply:?} resolved to {value:?}");
        ensure!(renderer.field_value() == expected, "field holds {:?}", renderer.field_value());
        ensure!(
            feedback.severities() == vec![Severity::Info, Severity::Success],
            "banners {:?}",
            feedback.severities()
        );
        Ok(())
    })
}

fn random_failure(rng: &mut ChaCha20Rng) -> (FixedGeolocator, FixedGeocoder, bool) {
    let ok_geocoder = FixedGeocoder(Ok("01310-930".to_string()));
    match rng.gen_range(0..8) {
        0 => (FixedGeolocator(Err(LocateError::PermissionDenied)), ok_geocoder, true),
        1 => (FixedGeolocator(Err(LocateError::PositionUnavailable)), ok_geocoder, true),
        2 => (FixedGeolocator(Err(LocateError::Timeout)), ok_geocoder, true),
        3 => (FixedGeolocator(Err(LocateError::Unsupported)), ok_geocoder, true),
        4 => (
            FixedGeolocator(Ok(SAO_PAULO)),
            FixedGeocoder(Err(GeocodeError::Network("connection reset".to_string()))),
            false,
        ),
        5 => (
            FixedGeolocator(Ok(SAO_PAULO)),
            FixedGeocoder(Err(GeocodeError::Status(rng.gen_range(400..600)))),
            false,
        ),
        6 => (
            FixedGeolocator(Ok(SAO_PAULO)),
            FixedGeocoder(Err(GeocodeError::MissingPostcode)),
            false,
        ),
        _ => (
            FixedGeolocator(Ok(SAO_PAULO)),
            FixedGeocoder(Ok("sem CEP".to_string())),
            false,
        ),
    }
}

fn location_failure(mut rng: ChaCha20Rng) -> LocalCheck {
    Box::pin(async move {
        let config = PoloConfig::default();
        let (locator, geocoder, locate_failed) = random_failure(&mut rng);
        let resolver = LocationResolver::new(locator, geocoder, &config);
        let renderer = RecordingRenderer::default();
        renderer.set_field_value("99999-999");
        let feedback = RecordingFeedback::default();
        let outcome = resolver.resolve(&renderer, &feedback).await;
        ensure!(outcome.is_err(), "lookup unexpectedly produced {outcome:?}");
        ensure!(renderer.field_value() == "99999-999", "field was overwritten");
        ensure!(
            feedback.severities() == vec![Severity::Info, Severity::Danger],
            "banners {:?}",
            feedback.severities()
        );
        let expected_text = if locate_failed {
            &config.messages.location_failed
        } else {
            &config.messages.postcode_failed
        };
        ensure!(
            feedback.texts().last() == Some(expected_text),
            "danger banner text {:?}",
            feedback.texts().last()
        );
        ensure!(
            feedback
                .messages()
                .iter()
                .all(|msg| msg.ttl == config.feedback.ttl()),
            "banners must use the configured ttl"
        );
        Ok(())
    })
}

/// Geocoder whose replies arrive only when the test sends them.
struct PendingGeocoder {
    replies: RefCell<VecDeque<oneshot::Receiver<String>>>,
    calls: Rc<Cell<usize>>,
}

#[async_trait(?Send)]
impl ReverseGeocoder for PendingGeocoder {
    async fn postcode_for(&self, _coords: Coordinates) -> Result<String, GeocodeError> {
        let reply = self.replies.borrow_mut().pop_front();
        self.calls.set(self.calls.get() + 1);
        match reply {
            Some(rx) => rx
                .await
                .map_err(|_| GeocodeError::Network("reply dropped".to_string())),
            None => Err(GeocodeError::Network("no reply queued".to_string())),
        }
    }
}

fn location_race(mut rng: ChaCha20Rng) -> LocalCheck {
    Box::pin(async move {
        let config = PoloConfig::default();
        let triggers = rng.gen_range(2..6);
        let mut senders = Vec::with_capacity(triggers);
        let mut receivers = VecDeque::with_capacity(triggers);
        for _ in 0..triggers {
            let (tx, rx) = oneshot::channel();
            senders.push(Some(tx));
            receivers.push_back(rx);
        }
        let calls = Rc::new(Cell::new(0));
        let geocoder = PendingGeocoder {
            replies: RefCell::new(receivers),
            calls: Rc::clone(&calls),
        };
        let resolver = LocationResolver::new(FixedGeolocator(Ok(SAO_PAULO)), geocoder, &config);
        let renderer = RecordingRenderer::default();
        let feedback = RecordingFeedback::default();

        let postcodes: Vec<String> = (0..triggers).map(|_| random_digits(&mut rng, 8)).collect();
        let mut order: Vec<usize> = (0..triggers).collect();
        order.shuffle(&mut rng);

        let requests = join_all((0..triggers).map(|_| resolver.resolve(&renderer, &feedback)));
        let replies = async {
            while calls.get() < triggers {
                tokio::task::yield_now().await;
            }
            for &index in &order {
                if let Some(tx) = senders[index].take() {
                    let _ = tx.send(postcodes[index].clone());
                }
                tokio::task::yield_now().await;
            }
        };
        let (outcomes, ()) = tokio::join!(requests, replies);

        let last = triggers - 1;
        let expected = format_cep(&postcodes[last]);
        for (index, outcome) in outcomes.iter().enumerate() {
            if index == last {
                ensure!(outcome.as_ref().ok() == Some(&expected), "latest got {outcome:?}");
            } else {
                ensure!(
                    matches!(outcome, Err(LocationError::Superseded)),
                    "request {index} of {triggers} got {outcome:?} (order {order:?})"
                );
            }
        }
        ensure!(renderer.field_value() == expected, "field holds {:?}", renderer.field_value());
        let successes = feedback
            .severities()
            .iter()
            .filter(|s| **s == Severity::Success)
            .count();
        ensure!(successes == 1, "{successes} success banners");
        ensure!(
            !feedback.severities().contains(&Severity::Danger),
            "superseded requests must stay silent"
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn catalog_names_are_unique_and_resolvable() {
        let names = all_names();
        for name in &names {
            assert!(get_scenario(name).is_some(), "{name}");
        }
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
        assert!(get_scenario("CEP-MASK").is_some());
        assert!(get_scenario("nope").is_none());
    }

    #[test]
    fn sync_scenarios_pass_for_fixed_seed() {
        for scenario in CATALOG {
            if let Check::Sync(check) = scenario.check {
                let mut rng = ChaCha20Rng::seed_from_u64(1337);
                check(&mut rng).unwrap_or_else(|err| panic!("{}: {err:#}", scenario.name));
            }
        }
    }

    #[tokio::test]
    async fn async_scenarios_pass_for_fixed_seed() {
        for scenario in CATALOG {
            if let Check::Async(check) = scenario.check {
                for seed in 0..8 {
                    check(ChaCha20Rng::seed_from_u64(seed))
                        .await
                        .unwrap_or_else(|err| panic!("{} seed {seed}: {err:#}", scenario.name));
                }
            }
        }
    }
}
