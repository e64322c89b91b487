use crate::error::{ParcelError, Result};
use crate::models::RawPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Order in which the resolver visits pending polygons
///
/// The order decides which of two overlapping polygons survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingOrder {
    /// Order of the input records
    #[default]
    InputOrder,
    /// Largest area first, ties broken by input position
    AreaDescending,
}

impl fmt::Display for ProcessingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingOrder::InputOrder => f.write_str("input_order"),
            ProcessingOrder::AreaDescending => f.write_str("area_descending"),
        }
    }
}

/// Origin used when a rotation does not name one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationOrigin {
    /// Vertex centroid of the ring being rotated
    #[default]
    Centroid,
    ExplicitPoint { longitude: f64, latitude: f64 },
}

impl RotationOrigin {
    pub fn explicit(point: RawPoint) -> Self {
        RotationOrigin::ExplicitPoint { longitude: point.longitude, latitude: point.latitude }
    }

    /// The fixed point, if any
    pub fn point(&self) -> Option<RawPoint> {
        match self {
            RotationOrigin::Centroid => None,
            RotationOrigin::ExplicitPoint { longitude, latitude } => {
                Some(RawPoint::new(*longitude, *latitude))
            }
        }
    }
}

impl fmt::Display for RotationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationOrigin::Centroid => f.write_str("centroid"),
            RotationOrigin::ExplicitPoint { longitude, latitude } => {
                write!(f, "{},{}", longitude, latitude)
            }
        }
    }
}

/// Options consumed by one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Polygons smaller than this after cleaning are rejected
    pub minimum_area_acres: f64,
    /// Overlap share of a polygon's own area that may be clipped instead of rejected
    pub negligible_overlap_fraction: f64,
    /// Shared area at or below this counts as boundary contact, not overlap
    pub overlap_tolerance_acres: f64,
    pub processing_order: ProcessingOrder,
    pub rotation_default_origin: RotationOrigin,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            minimum_area_acres: DEFAULT_MINIMUM_AREA_ACRES,
            negligible_overlap_fraction: DEFAULT_NEGLIGIBLE_OVERLAP_FRACTION,
            overlap_tolerance_acres: DEFAULT_OVERLAP_TOLERANCE_ACRES,
            processing_order: ProcessingOrder::InputOrder,
            rotation_default_origin: RotationOrigin::Centroid,
        }
    }
}

pub const DEFAULT_MINIMUM_AREA_ACRES: f64 = 0.01;
pub const DEFAULT_NEGLIGIBLE_OVERLAP_FRACTION: f64 = 0.1;
pub const DEFAULT_OVERLAP_TOLERANCE_ACRES: f64 = 0.0001;

impl PipelineConfig {
    pub fn with_minimum_area(mut self, acres: f64) -> Self {
        self.minimum_area_acres = acres;
        self
    }

    pub fn with_negligible_overlap(mut self, fraction: f64) -> Self {
        self.negligible_overlap_fraction = fraction;
        self
    }

    pub fn with_overlap_tolerance(mut self, acres: f64) -> Self {
        self.overlap_tolerance_acres = acres;
        self
    }

    pub fn with_order(mut self, order: ProcessingOrder) -> Self {
        self.processing_order = order;
        self
    }

    pub fn with_rotation_origin(mut self, origin: RotationOrigin) -> Self {
        self.rotation_default_origin = origin;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.minimum_area_acres.is_finite() || self.minimum_area_acres < 0.0 {
            return Err(ParcelError::ConfigInvalid {
                key: "minimum_area_acres".to_string(),
                reason: format!("must be a non-negative number, got {}", self.minimum_area_acres),
            });
        }

        if !(0.0..=1.0).contains(&self.negligible_overlap_fraction) {
            return Err(ParcelError::ConfigInvalid {
                key: "negligible_overlap_fraction".to_string(),
                reason: format!(
                    "must be between 0 and 1, got {}",
                    self.negligible_overlap_fraction
                ),
            });
        }

        if !self.overlap_tolerance_acres.is_finite() || self.overlap_tolerance_acres < 0.0 {
            return Err(ParcelError::ConfigInvalid {
                key: "overlap_tolerance_acres".to_string(),
                reason: format!(
                    "must be a non-negative number, got {}",
                    self.overlap_tolerance_acres
                ),
            });
        }

        if let Some(point) = self.rotation_default_origin.point() {
            if !point.longitude.is_finite() || !point.latitude.is_finite() {
                return Err(ParcelError::ConfigInvalid {
                    key: "rotation_default_origin".to_string(),
                    reason: "explicit origin must have finite coordinates".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for parcelnorm
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub minimum_area_acres: ConfigValue<f64>,
    pub negligible_overlap_fraction: ConfigValue<f64>,
    pub overlap_tolerance_acres: ConfigValue<f64>,
    pub processing_order: ConfigValue<ProcessingOrder>,
    pub rotation_default_origin: ConfigValue<RotationOrigin>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            minimum_area_acres: ConfigValue::new(defaults.minimum_area_acres, ConfigSource::Default),
            negligible_overlap_fraction: ConfigValue::new(
                defaults.negligible_overlap_fraction,
                ConfigSource::Default,
            ),
            overlap_tolerance_acres: ConfigValue::new(
                defaults.overlap_tolerance_acres,
                ConfigSource::Default,
            ),
            processing_order: ConfigValue::new(defaults.processing_order, ConfigSource::Default),
            rotation_default_origin: ConfigValue::new(
                defaults.rotation_default_origin,
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ParcelError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ParcelError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(acres) = file_config.minimum_area_acres {
            self.minimum_area_acres.update(acres, ConfigSource::File);
        }

        if let Some(fraction) = file_config.negligible_overlap_fraction {
            self.negligible_overlap_fraction.update(fraction, ConfigSource::File);
        }

        if let Some(acres) = file_config.overlap_tolerance_acres {
            self.overlap_tolerance_acres.update(acres, ConfigSource::File);
        }

        if let Some(order) = file_config.processing_order {
            self.processing_order.update(order, ConfigSource::File);
        }

        if let Some(origin) = file_config.rotation_default_origin {
            self.rotation_default_origin.update(origin, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // PARCELNORM_MIN_AREA_ACRES
        if let Ok(raw) = env::var("PARCELNORM_MIN_AREA_ACRES") {
            match raw.trim().parse::<f64>() {
                Ok(acres) => self.minimum_area_acres.update(acres, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PARCELNORM_MIN_AREA_ACRES value '{}': expected a number",
                    raw
                ),
            }
        }

        // PARCELNORM_NEGLIGIBLE_OVERLAP
        if let Ok(raw) = env::var("PARCELNORM_NEGLIGIBLE_OVERLAP") {
            match raw.trim().parse::<f64>() {
                Ok(fraction) => {
                    self.negligible_overlap_fraction.update(fraction, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid PARCELNORM_NEGLIGIBLE_OVERLAP value '{}': expected a number between 0 and 1",
                    raw
                ),
            }
        }

        // PARCELNORM_OVERLAP_TOLERANCE_ACRES
        if let Ok(raw) = env::var("PARCELNORM_OVERLAP_TOLERANCE_ACRES") {
            match raw.trim().parse::<f64>() {
                Ok(acres) => self.overlap_tolerance_acres.update(acres, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PARCELNORM_OVERLAP_TOLERANCE_ACRES value '{}': expected a number",
                    raw
                ),
            }
        }

        // PARCELNORM_PROCESSING_ORDER
        if let Ok(raw) = env::var("PARCELNORM_PROCESSING_ORDER") {
            match parse_processing_order(&raw) {
                Ok(order) => self.processing_order.update(order, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PARCELNORM_PROCESSING_ORDER value '{}': expected input_order or area_descending",
                    raw
                ),
            }
        }

        // PARCELNORM_ROTATION_ORIGIN
        if let Ok(raw) = env::var("PARCELNORM_ROTATION_ORIGIN") {
            match parse_rotation_origin(&raw) {
                Ok(origin) => self.rotation_default_origin.update(origin, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PARCELNORM_ROTATION_ORIGIN value '{}': expected centroid or lon,lat",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(acres) = overrides.minimum_area_acres {
            self.minimum_area_acres.update(acres, ConfigSource::Cli);
        }

        if let Some(fraction) = overrides.negligible_overlap_fraction {
            self.negligible_overlap_fraction.update(fraction, ConfigSource::Cli);
        }

        if let Some(acres) = overrides.overlap_tolerance_acres {
            self.overlap_tolerance_acres.update(acres, ConfigSource::Cli);
        }

        if let Some(order) = overrides.processing_order {
            self.processing_order.update(order, ConfigSource::Cli);
        }

        if let Some(origin) = overrides.rotation_default_origin {
            self.rotation_default_origin.update(origin, ConfigSource::Cli);
        }
    }

    /// Resolve the layered values into a validated pipeline configuration
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            minimum_area_acres: self.minimum_area_acres.value,
            negligible_overlap_fraction: self.negligible_overlap_fraction.value,
            overlap_tolerance_acres: self.overlap_tolerance_acres.value,
            processing_order: self.processing_order.value,
            rotation_default_origin: self.rotation_default_origin.value,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "minimum_area_acres".to_string(),
            (self.minimum_area_acres.value.to_string(), self.minimum_area_acres.source),
        );

        map.insert(
            "negligible_overlap_fraction".to_string(),
            (
                self.negligible_overlap_fraction.value.to_string(),
                self.negligible_overlap_fraction.source,
            ),
        );

        map.insert(
            "overlap_tolerance_acres".to_string(),
            (self.overlap_tolerance_acres.value.to_string(), self.overlap_tolerance_acres.source),
        );

        map.insert(
            "processing_order".to_string(),
            (self.processing_order.value.to_string(), self.processing_order.source),
        );

        map.insert(
            "rotation_default_origin".to_string(),
            (self.rotation_default_origin.value.to_string(), self.rotation_default_origin.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    minimum_area_acres: Option<f64>,
    negligible_overlap_fraction: Option<f64>,
    overlap_tolerance_acres: Option<f64>,
    processing_order: Option<ProcessingOrder>,
    rotation_default_origin: Option<RotationOrigin>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub minimum_area_acres: Option<f64>,
    pub negligible_overlap_fraction: Option<f64>,
    pub overlap_tolerance_acres: Option<f64>,
    pub processing_order: Option<ProcessingOrder>,
    pub rotation_default_origin: Option<RotationOrigin>,
}

/// Parse processing order from string
pub fn parse_processing_order(s: &str) -> Result<ProcessingOrder> {
    match s.trim().to_lowercase().as_str() {
        "input_order" | "input" => Ok(ProcessingOrder::InputOrder),
        "area_descending" | "area" => Ok(ProcessingOrder::AreaDescending),
        _ => Err(ParcelError::ConfigInvalid {
            key: "processing_order".to_string(),
            reason: format!("Invalid processing order: {}. Use input_order or area_descending", s),
        }),
    }
}

/// Parse rotation origin from `centroid` or `lon,lat`
pub fn parse_rotation_origin(s: &str) -> Result<RotationOrigin> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("centroid") {
        return Ok(RotationOrigin::Centroid);
    }

    let invalid = || ParcelError::ConfigInvalid {
        key: "rotation_default_origin".to_string(),
        reason: format!("Invalid rotation origin: {}. Use centroid or lon,lat", s),
    };

    let (lon, lat) = trimmed.split_once(',').ok_or_else(invalid)?;
    let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
    let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(invalid());
    }

    Ok(RotationOrigin::ExplicitPoint { longitude, latitude })
}
