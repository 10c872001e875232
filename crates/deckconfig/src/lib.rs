//! Show configuration for the section navigator.
//!
//! A show is an ordered list of full-screen panels. Each panel may own an
//! internal step sequence (text blocks, slides, tabs) and a set of floating
//! cards. Navigation timing (transition length, easing, cooldowns, gesture
//! thresholds) lives in the `[navigation]` table and can be overridden per
//! panel where the behaviour is panel-local.
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Minimum edge length, in pixels, a resizable card may shrink to.
pub const MIN_CARD_EDGE: f32 = 100.0;

/// Cooldowns above this are almost certainly a unit mistake (`450` meaning ms).
const MAX_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShowConfig {
    pub version: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub navigation: NavigationSettings,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default = "default_exempt_markers")]
    pub exempt_markers: Vec<String>,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavigationSettings {
    #[serde(
        default = "default_transition_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub transition_duration: Duration,
    #[serde(default, deserialize_with = "deserialize_ease")]
    pub ease: EaseSetting,
    #[serde(default = "default_background_shift")]
    pub background_shift: f32,
    #[serde(default = "default_wrapper_travel")]
    pub wrapper_travel: f32,
    #[serde(
        default = "default_navigation_cooldown",
        deserialize_with = "deserialize_duration"
    )]
    pub cooldown: Duration,
    #[serde(default = "default_wheel_tolerance")]
    pub wheel_tolerance: f32,
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f32,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            transition_duration: default_transition_duration(),
            ease: EaseSetting::default(),
            background_shift: default_background_shift(),
            wrapper_travel: default_wrapper_travel(),
            cooldown: default_navigation_cooldown(),
            wheel_tolerance: default_wheel_tolerance(),
            swipe_threshold: default_swipe_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f32,
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelConfig {
    pub name: String,
    #[serde(default)]
    pub self_handling: Option<bool>,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
    #[serde(
        default = "default_step_cooldown",
        deserialize_with = "deserialize_duration"
    )]
    pub cooldown: Duration,
    #[serde(default)]
    pub wheel_threshold: f32,
    #[serde(default = "default_true")]
    pub chain_forward: bool,
    #[serde(default = "default_true")]
    pub chain_backward: bool,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

impl PanelConfig {
    /// Panels that declare steps handle their own gestures unless told otherwise.
    pub fn is_self_handling(&self) -> bool {
        self.self_handling.unwrap_or(!self.steps.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepConfig {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub media: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardConfig {
    pub id: String,
    #[serde(default)]
    pub kind: CardKind,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default = "default_card_edge")]
    pub width: f32,
    #[serde(default = "default_card_edge")]
    pub height: f32,
    /// Layout used below the mobile breakpoint. Unset fields keep the
    /// desktop value.
    #[serde(default)]
    pub mobile: Option<CardGeometry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct CardGeometry {
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

impl CardConfig {
    /// Position and size for a desktop or mobile layout, as `(x, y, width, height)`.
    pub fn geometry(&self, mobile: bool) -> (f32, f32, f32, f32) {
        let overrides = self.mobile.filter(|_| mobile).unwrap_or_default();
        (
            overrides.x.unwrap_or(self.x),
            overrides.y.unwrap_or(self.y),
            overrides.width.unwrap_or(self.width),
            overrides.height.unwrap_or(self.height),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    #[default]
    Draggable,
    Resizable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EaseSetting {
    Linear,
    Smoothstep,
    #[default]
    EaseInOut,
    Power2In,
    Power2Out,
}

fn default_exempt_markers() -> Vec<String> {
    vec!["no-swipe".to_string()]
}

fn default_transition_duration() -> Duration {
    Duration::from_millis(1250)
}

fn default_navigation_cooldown() -> Duration {
    Duration::from_millis(500)
}

fn default_step_cooldown() -> Duration {
    Duration::from_millis(450)
}

fn default_background_shift() -> f32 {
    15.0
}

fn default_wrapper_travel() -> f32 {
    100.0
}

fn default_wheel_tolerance() -> f32 {
    10.0
}

fn default_swipe_threshold() -> f32 {
    50.0
}

fn default_viewport_width() -> f32 {
    1920.0
}

fn default_viewport_height() -> f32 {
    1080.0
}

fn default_card_edge() -> f32 {
    256.0
}

fn default_true() -> bool {
    true
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer)?
        .ok_or_else(|| de::Error::custom("duration may not be empty"))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v.trim())
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_ease<'de, D>(deserializer: D) -> Result<EaseSetting, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_ease(&raw).map_err(de::Error::custom)
}

/// Accepts our own names as well as the tween-library spellings authors tend
/// to copy over (`power1.inOut`, `power2.out`).
pub fn parse_ease(raw: &str) -> Result<EaseSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "linear" | "none" => Ok(EaseSetting::Linear),
        "smoothstep" => Ok(EaseSetting::Smoothstep),
        "easeinout" | "ease-in-out" | "power1.inout" | "quad.inout" => Ok(EaseSetting::EaseInOut),
        "power2in" | "power2.in" | "cubic.in" => Ok(EaseSetting::Power2In),
        "power2out" | "power2.out" | "cubic.out" => Ok(EaseSetting::Power2Out),
        other => Err(format!("invalid ease '{other}'")),
    }
}

impl ShowConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ShowConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.panels.is_empty() {
            return Err(ConfigError::Invalid(
                "config must define at least one panel".into(),
            ));
        }

        self.validate_navigation()?;

        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ConfigError::Invalid(
                "viewport dimensions must be greater than zero".into(),
            ));
        }

        if self.exempt_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "exempt_markers may not contain empty entries".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for panel in &self.panels {
            if panel.name.trim().is_empty() {
                return Err(ConfigError::Invalid("panel name may not be empty".into()));
            }
            if !seen.insert(panel.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "panel '{}' is declared more than once",
                    panel.name
                )));
            }
            validate_panel(panel)?;
        }

        Ok(())
    }

    fn validate_navigation(&self) -> Result<(), ConfigError> {
        let nav = &self.navigation;
        if nav.transition_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "navigation.transition_duration must be greater than zero".into(),
            ));
        }
        if nav.cooldown > MAX_COOLDOWN {
            return Err(ConfigError::Invalid(format!(
                "navigation.cooldown must not exceed {}",
                humantime::format_duration(MAX_COOLDOWN)
            )));
        }
        for (field, value) in [
            ("background_shift", nav.background_shift),
            ("wrapper_travel", nav.wrapper_travel),
            ("wheel_tolerance", nav.wheel_tolerance),
            ("swipe_threshold", nav.swipe_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "navigation.{field} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

fn validate_panel(panel: &PanelConfig) -> Result<(), ConfigError> {
    let name = &panel.name;

    if panel.self_handling == Some(false) && !panel.steps.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "panel '{name}' declares steps but sets self_handling = false"
        )));
    }

    if panel.cooldown > MAX_COOLDOWN {
        return Err(ConfigError::Invalid(format!(
            "panel '{name}' cooldown must not exceed {}",
            humantime::format_duration(MAX_COOLDOWN)
        )));
    }

    if !panel.wheel_threshold.is_finite() || panel.wheel_threshold < 0.0 {
        return Err(ConfigError::Invalid(format!(
            "panel '{name}' wheel_threshold must be >= 0"
        )));
    }

    let mut card_ids = BTreeSet::new();
    for card in &panel.cards {
        if card.id.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "panel '{name}' contains a card with empty id"
            )));
        }
        if !card_ids.insert(card.id.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "panel '{name}' card '{}' is declared more than once",
                card.id
            )));
        }
        for (layout, mobile) in [("", false), ("mobile ", true)] {
            let (x, y, width, height) = card.geometry(mobile);
            if !x.is_finite() || !y.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "panel '{name}' card '{}' {layout}position must be finite",
                    card.id
                )));
            }
            if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "panel '{name}' card '{}' {layout}dimensions must be > 0",
                    card.id
                )));
            }
            if card.kind == CardKind::Resizable && (width < MIN_CARD_EDGE || height < MIN_CARD_EDGE)
            {
                return Err(ConfigError::Invalid(format!(
                    "panel '{name}' card '{}' {layout}size must be at least {MIN_CARD_EDGE}px on each edge",
                    card.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
title = "Sample"

[navigation]
transition_duration = "1.25s"
ease = "power1.inOut"
cooldown = "500ms"

[viewport]
width = 1280
height = 720

[[panels]]
name = "hero"

[[panels]]
name = "intro"
cooldown = "450ms"

[[panels.steps]]
text = "one"
media = "slide/one.png"

[[panels.steps]]
text = "two"

[[panels]]
name = "slider"
self_handling = true
wheel_threshold = 20
cooldown = 0.6
chain_forward = false

[[panels.cards]]
id = "vault"
kind = "resizable"
width = 200
height = 180
"#;

    #[test]
    fn parses_sample_config() {
        let config = ShowConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.panels.len(), 3);
        assert_eq!(config.navigation.ease, EaseSetting::EaseInOut);
        assert_eq!(
            config.navigation.transition_duration,
            Duration::from_millis(1250)
        );
        assert_eq!(config.viewport.width, 1280.0);
        assert_eq!(config.exempt_markers, vec!["no-swipe".to_string()]);
        assert_eq!(config.panels[2].name, "slider");
    }

    fn panel<'a>(config: &'a ShowConfig, name: &str) -> &'a PanelConfig {
        config
            .panels
            .iter()
            .find(|panel| panel.name == name)
            .unwrap_or_else(|| panic!("panel {name}"))
    }

    #[test]
    fn self_handling_follows_steps_unless_explicit() {
        let config = ShowConfig::from_toml_str(SAMPLE).unwrap();
        assert!(!panel(&config, "hero").is_self_handling());
        assert!(panel(&config, "intro").is_self_handling());
        let slider = panel(&config, "slider");
        assert!(slider.is_self_handling());
        assert!(slider.steps.is_empty());
        assert!(!slider.chain_forward);
        assert!(slider.chain_backward);
        assert_eq!(slider.cooldown, Duration::from_millis(600));
        assert_eq!(slider.cards[0].kind, CardKind::Resizable);
    }

    #[test]
    fn applies_defaults() {
        let config = ShowConfig::from_toml_str(
            r#"
version = 1

[[panels]]
name = "only"
"#,
        )
        .unwrap();
        let nav = &config.navigation;
        assert_eq!(nav.cooldown, Duration::from_millis(500));
        assert_eq!(nav.background_shift, 15.0);
        assert_eq!(nav.wrapper_travel, 100.0);
        assert_eq!(nav.wheel_tolerance, 10.0);
        assert_eq!(nav.swipe_threshold, 50.0);
        assert_eq!(config.panels[0].cooldown, Duration::from_millis(450));
    }

    #[test]
    fn rejects_duplicate_panels() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1

[[panels]]
name = "a"

[[panels]]
name = "a"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_empty_show_and_bad_version() {
        assert!(matches!(
            ShowConfig::from_toml_str("version = 1").unwrap_err(),
            ConfigError::Invalid(_)
        ));
        let err = ShowConfig::from_toml_str(
            r#"
version = 2

[[panels]]
name = "a"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));
    }

    #[test]
    fn rejects_undersized_resizable_card() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1

[[panels]]
name = "cards"

[[panels.cards]]
id = "tiny"
kind = "resizable"
width = 64
height = 64
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn mobile_geometry_overrides_only_what_it_sets() {
        let config = ShowConfig::from_toml_str(
            r#"
version = 1

[[panels]]
name = "cards"

[[panels.cards]]
id = "facade"
x = -420
y = -180
width = 320
height = 220
mobile = { x = -90, width = 200 }
"#,
        )
        .unwrap();
        let card = &config.panels[0].cards[0];
        assert_eq!(card.geometry(false), (-420.0, -180.0, 320.0, 220.0));
        assert_eq!(card.geometry(true), (-90.0, -180.0, 200.0, 220.0));
    }

    #[test]
    fn rejects_undersized_mobile_resizable_card() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1

[[panels]]
name = "cards"

[[panels.cards]]
id = "mosaic"
kind = "resizable"
width = 240
height = 300
mobile = { width = 80 }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("mobile size"));
    }

    #[test]
    fn out_of_range_float_durations_are_parse_errors() {
        for value in ["inf", "1e30", "nan"] {
            let err = ShowConfig::from_toml_str(&format!(
                "version = 1\n\n[navigation]\ntransition_duration = {value}\n\n[[panels]]\nname = \"a\"\n"
            ))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{value}: {err}");
        }
    }

    #[test]
    fn rejects_steps_on_non_self_handling_panel() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1

[[panels]]
name = "confused"
self_handling = false

[[panels.steps]]
text = "x"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("self_handling = false"));
    }

    #[test]
    fn rejects_unknown_ease() {
        let err = ShowConfig::from_toml_str(
            r#"
version = 1

[navigation]
ease = "bounce"

[[panels]]
name = "a"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parses_ease_aliases() {
        assert_eq!(parse_ease("power2.out"), Ok(EaseSetting::Power2Out));
        assert_eq!(parse_ease(" Power2.In "), Ok(EaseSetting::Power2In));
        assert_eq!(parse_ease("linear"), Ok(EaseSetting::Linear));
        assert!(parse_ease("elastic").is_err());
    }
}
