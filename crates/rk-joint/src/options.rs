//! Export options for joint resolution and XML generation

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::OptionsError;

/// Export options
///
/// The defaults reproduce the behavior of the Fusion exporter. Options can be
/// loaded from RON; missing fields keep their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Element-wise tolerance when comparing reported origins
    pub origin_tolerance: f64,
    /// Kernel length units per meter (lengths are divided by this)
    pub kernel_units_per_meter: f64,
    /// Decimal places kept for axes, limits and origins
    pub decimals: u32,
    /// `effort` attribute of `limit` elements
    pub effort: f64,
    /// `velocity` attribute of `limit` elements
    pub velocity: f64,
    /// Hardware interface of transmission joints and actuators
    pub hardware_interface: String,
    /// Transmission `type` text
    pub transmission_type: String,
    /// Actuator mechanical reduction
    pub mechanical_reduction: f64,
    /// Component names treated as the assembly root
    pub base_link_names: Vec<String>,
    /// Link name the assembly root is exported as
    pub base_link: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            origin_tolerance: ORIGIN_TOLERANCE,
            kernel_units_per_meter: KERNEL_UNITS_PER_METER,
            decimals: ROUND_DECIMALS,
            effort: DEFAULT_EFFORT,
            velocity: DEFAULT_VELOCITY,
            hardware_interface: DEFAULT_HARDWARE_INTERFACE.to_string(),
            transmission_type: DEFAULT_TRANSMISSION_TYPE.to_string(),
            mechanical_reduction: 1.0,
            base_link_names: BASE_LINK_ALIASES.iter().map(|s| s.to_string()).collect(),
            base_link: BASE_LINK.to_string(),
        }
    }
}

impl ExportOptions {
    /// Load options from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| OptionsError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse options from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, OptionsError> {
        let options: Self =
            ron::from_str(content).map_err(|e| OptionsError::Deserialize(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values that would corrupt every exported number
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.decimals > MAX_DECIMALS {
            return Err(OptionsError::Invalid(format!(
                "decimals must be at most {}, got {}",
                MAX_DECIMALS, self.decimals
            )));
        }
        if !(self.kernel_units_per_meter.is_finite() && self.kernel_units_per_meter > 0.0) {
            return Err(OptionsError::Invalid(format!(
                "kernel_units_per_meter must be positive, got {}",
                self.kernel_units_per_meter
            )));
        }
        Ok(())
    }

    /// Serialize options to pretty RON
    pub fn to_ron_string(&self) -> Result<String, OptionsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| OptionsError::Serialize(e.to_string()))
    }

    /// Check if a component name denotes the assembly root
    pub fn is_base_link(&self, component_name: &str) -> bool {
        self.base_link_names.iter().any(|n| n == component_name)
    }

    /// Round a value to the configured number of decimals
    ///
    /// Rounds the exact binary value (ties to even), so `0.1234565`, stored
    /// just below the tie, becomes `0.123456`. Negative zero comes back as
    /// positive zero.
    pub fn round(&self, value: f64) -> f64 {
        let decimals = self.decimals.min(MAX_DECIMALS) as usize;
        format!("{:.*}", decimals, value)
            .parse::<f64>()
            .unwrap_or(value)
            + 0.0
    }

    /// Convert a kernel length to meters, rounded
    pub fn to_meters(&self, value: f64) -> f64 {
        self.round(value / self.kernel_units_per_meter)
    }
}
