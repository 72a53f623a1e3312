//! # Design Configuration
//!
//! Settings that shape a design but are not properties of the room:
//! safety margin, the cascade threshold, unit limits and heat exchanger
//! approaches.
//!
//! `safety_margin` has no default. Every design states it explicitly.
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::config::DesignConfig;
//!
//! let json = r#"{ "safety_margin": 0.1 }"#;
//! let config: DesignConfig = serde_json::from_str(json).unwrap();
//! assert_eq!(config.cascade_threshold_c, -35.0);
//! assert!(config.validate().is_ok());
//!
//! // The margin is required
//! assert!(serde_json::from_str::<DesignConfig>("{}").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{first_error, CalcError, CalcResult};

/// How the low stage's compressor work is estimated when the selected
/// compressor has no power model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CopEstimate {
    /// Fixed coefficient of performance
    Fixed(f64),
    /// Fraction of the Carnot COP between the stage's temperatures
    CarnotFraction(f64),
}

impl Default for CopEstimate {
    fn default() -> Self {
        CopEstimate::CarnotFraction(0.5)
    }
}

/// Cascade system settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Intermediate temperature (°C). When absent, the geometric mean of the
    /// absolute evaporating and condensing temperatures.
    #[serde(default)]
    pub intermediate_c: Option<f64>,

    /// Low-stage condensing minus high-stage evaporating temperature (K)
    #[serde(default = "default_hx_approach")]
    pub heat_exchanger_approach_k: f64,

    #[serde(default)]
    pub low_stage_cop: CopEstimate,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        CascadeConfig {
            intermediate_c: None,
            heat_exchanger_approach_k: default_hx_approach(),
            low_stage_cop: CopEstimate::default(),
        }
    }
}

/// Load each equipment group is sized against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizingBasis {
    /// Air coolers and compressors both cover the total load
    #[default]
    Total,
    /// Air coolers cover the equipment load, compressors the mechanical load
    Diversified,
}

/// Product diversity factor for rooms up to a volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversityBracket {
    /// Upper bound of the bracket; `None` for the last one
    pub max_volume_m3: Option<f64>,
    pub factor: f64,
}

/// Coefficients of the equipment and mechanical loads.
///
/// The equipment load raises the product terms by `pull_down_factor` when
/// the product is pulled down by `pull_down_threshold_k` or more. The
/// mechanical load applies diversity: the product terms by room volume, the
/// operational terms (air change, people, lighting, fans, defrost) by a flat
/// factor, then `piping_factor` for suction line losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingConfig {
    #[serde(default)]
    pub basis: SizingBasis,

    #[serde(default = "default_pull_down_factor")]
    pub pull_down_factor: f64,

    /// Entry minus target temperature at which `pull_down_factor` applies (K)
    #[serde(default = "default_pull_down_threshold")]
    pub pull_down_threshold_k: f64,

    /// Product diversity for rooms below 0 °C, ascending by volume
    #[serde(default = "default_frozen_diversity")]
    pub frozen_product_diversity: Vec<DiversityBracket>,

    /// Product diversity for rooms at or above 0 °C, ascending by volume
    #[serde(default = "default_chilled_diversity")]
    pub chilled_product_diversity: Vec<DiversityBracket>,

    #[serde(default = "default_operational_diversity")]
    pub operational_diversity: f64,

    #[serde(default = "default_piping_factor")]
    pub piping_factor: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        SizingConfig {
            basis: SizingBasis::default(),
            pull_down_factor: default_pull_down_factor(),
            pull_down_threshold_k: default_pull_down_threshold(),
            frozen_product_diversity: default_frozen_diversity(),
            chilled_product_diversity: default_chilled_diversity(),
            operational_diversity: default_operational_diversity(),
            piping_factor: default_piping_factor(),
        }
    }
}

impl SizingConfig {
    /// Multiplier on the product terms of the equipment load
    pub fn pull_down_multiplier(&self, entry_temp_c: f64, target_temp_c: f64) -> f64 {
        if entry_temp_c - target_temp_c >= self.pull_down_threshold_k {
            self.pull_down_factor
        } else {
            1.0
        }
    }

    /// Diversity on the product terms of the mechanical load
    pub fn product_diversity(&self, volume_m3: f64, design_temp_c: f64) -> f64 {
        let brackets = if design_temp_c < 0.0 {
            &self.frozen_product_diversity
        } else {
            &self.chilled_product_diversity
        };
        brackets
            .iter()
            .find(|b| b.max_volume_m3.map_or(true, |max| volume_m3 <= max))
            .map(|b| b.factor)
            .unwrap_or(1.0)
    }

    fn validation_errors(&self) -> Vec<CalcError> {
        let mut errors = Vec::new();
        if !(self.pull_down_factor >= 1.0) {
            errors.push(CalcError::invalid_input(
                "sizing.pull_down_factor",
                self.pull_down_factor.to_string(),
                "Pull-down factor cannot be below 1",
            ));
        }
        if !(self.pull_down_threshold_k >= 0.0) {
            errors.push(CalcError::invalid_input(
                "sizing.pull_down_threshold_k",
                self.pull_down_threshold_k.to_string(),
                "Pull-down threshold cannot be negative",
            ));
        }
        for (field, brackets) in [
            ("sizing.frozen_product_diversity", &self.frozen_product_diversity),
            ("sizing.chilled_product_diversity", &self.chilled_product_diversity),
        ] {
            if let Some(bad) = brackets.iter().find(|b| !(b.factor > 0.0 && b.factor <= 1.0)) {
                errors.push(CalcError::invalid_input(
                    field,
                    bad.factor.to_string(),
                    "Diversity factors must be in (0, 1]",
                ));
            }
        }
        if !(self.operational_diversity > 0.0 && self.operational_diversity <= 1.0) {
            errors.push(CalcError::invalid_input(
                "sizing.operational_diversity",
                self.operational_diversity.to_string(),
                "Diversity factors must be in (0, 1]",
            ));
        }
        if !(self.piping_factor >= 1.0) {
            errors.push(CalcError::invalid_input(
                "sizing.piping_factor",
                self.piping_factor.to_string(),
                "Piping factor cannot be below 1",
            ));
        }
        errors
    }
}

/// Design configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Fraction added on top of the summed load terms, in [0, 1]
    pub safety_margin: f64,

    /// Evaporating temperatures below this use a cascade system (°C)
    #[serde(default = "default_cascade_threshold")]
    pub cascade_threshold_c: f64,

    /// Maximum identical compressors per stage
    #[serde(default = "default_max_units")]
    pub max_units_per_stage: u32,

    /// Maximum identical air coolers per room
    #[serde(default = "default_max_air_coolers")]
    pub max_air_coolers: u32,

    /// Room air minus evaporating temperature (K)
    #[serde(default = "default_evaporator_approach")]
    pub evaporator_approach_k: f64,

    /// Condensing minus ambient temperature (K)
    #[serde(default = "default_condenser_approach")]
    pub condenser_approach_k: f64,

    #[serde(default)]
    pub evaporating_override_c: Option<f64>,

    #[serde(default)]
    pub condensing_override_c: Option<f64>,

    /// Relative humidity of the room air, for infiltration enthalpy (%)
    #[serde(default = "default_room_rh")]
    pub room_relative_humidity_pct: f64,

    /// Fraction of the year the compressors run, for the energy estimate
    #[serde(default = "default_run_time_fraction")]
    pub run_time_fraction: f64,

    #[serde(default)]
    pub cascade: CascadeConfig,

    #[serde(default)]
    pub sizing: SizingConfig,
}

fn default_hx_approach() -> f64 {
    5.0
}
fn default_cascade_threshold() -> f64 {
    -35.0
}
fn default_max_units() -> u32 {
    4
}
fn default_max_air_coolers() -> u32 {
    6
}
fn default_evaporator_approach() -> f64 {
    8.0
}
fn default_condenser_approach() -> f64 {
    10.0
}
fn default_room_rh() -> f64 {
    90.0
}
fn default_run_time_fraction() -> f64 {
    0.8
}
fn default_pull_down_factor() -> f64 {
    1.3
}
fn default_pull_down_threshold() -> f64 {
    15.0
}
fn default_operational_diversity() -> f64 {
    0.5
}
fn default_piping_factor() -> f64 {
    1.07
}
fn default_frozen_diversity() -> Vec<DiversityBracket> {
    vec![
        DiversityBracket { max_volume_m3: Some(7_000.0), factor: 0.5 },
        DiversityBracket { max_volume_m3: Some(20_000.0), factor: 0.65 },
        DiversityBracket { max_volume_m3: None, factor: 0.8 },
    ]
}
fn default_chilled_diversity() -> Vec<DiversityBracket> {
    vec![
        DiversityBracket { max_volume_m3: Some(1_000.0), factor: 0.6 },
        DiversityBracket { max_volume_m3: Some(3_000.0), factor: 0.45 },
        DiversityBracket { max_volume_m3: None, factor: 0.3 },
    ]
}

impl DesignConfig {
    /// Configuration with the given safety margin and defaults elsewhere
    pub fn new(safety_margin: f64) -> Self {
        DesignConfig {
            safety_margin,
            cascade_threshold_c: default_cascade_threshold(),
            max_units_per_stage: default_max_units(),
            max_air_coolers: default_max_air_coolers(),
            evaporator_approach_k: default_evaporator_approach(),
            condenser_approach_k: default_condenser_approach(),
            evaporating_override_c: None,
            condensing_override_c: None,
            room_relative_humidity_pct: default_room_rh(),
            run_time_fraction: default_run_time_fraction(),
            cascade: CascadeConfig::default(),
            sizing: SizingConfig::default(),
        }
    }

    /// Every problem with the configuration
    pub fn validation_errors(&self) -> Vec<CalcError> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.safety_margin) {
            errors.push(CalcError::invalid_input(
                "safety_margin",
                self.safety_margin.to_string(),
                "Safety margin must be between 0 and 1",
            ));
        }
        if self.max_units_per_stage == 0 {
            errors.push(CalcError::invalid_input(
                "max_units_per_stage",
                "0",
                "At least one unit per stage is required",
            ));
        }
        if self.max_air_coolers == 0 {
            errors.push(CalcError::invalid_input(
                "max_air_coolers",
                "0",
                "At least one air cooler is required",
            ));
        }
        if !(self.evaporator_approach_k > 0.0) {
            errors.push(CalcError::invalid_input(
                "evaporator_approach_k",
                self.evaporator_approach_k.to_string(),
                "Evaporator approach must be positive",
            ));
        }
        if !(self.condenser_approach_k > 0.0) {
            errors.push(CalcError::invalid_input(
                "condenser_approach_k",
                self.condenser_approach_k.to_string(),
                "Condenser approach must be positive",
            ));
        }
        if !(self.room_relative_humidity_pct > 0.0 && self.room_relative_humidity_pct <= 100.0) {
            errors.push(CalcError::invalid_input(
                "room_relative_humidity_pct",
                self.room_relative_humidity_pct.to_string(),
                "Relative humidity must be in (0, 100]",
            ));
        }
        if !(self.run_time_fraction > 0.0 && self.run_time_fraction <= 1.0) {
            errors.push(CalcError::invalid_input(
                "run_time_fraction",
                self.run_time_fraction.to_string(),
                "Run time fraction must be in (0, 1]",
            ));
        }
        if self.cascade.heat_exchanger_approach_k < 0.0 {
            errors.push(CalcError::invalid_input(
                "cascade.heat_exchanger_approach_k",
                self.cascade.heat_exchanger_approach_k.to_string(),
                "Heat exchanger approach cannot be negative",
            ));
        }
        match self.cascade.low_stage_cop {
            CopEstimate::Fixed(cop) if !(cop > 0.0) => {
                errors.push(CalcError::invalid_input(
                    "cascade.low_stage_cop",
                    cop.to_string(),
                    "COP must be positive",
                ));
            }
            CopEstimate::CarnotFraction(f) if !(f > 0.0 && f <= 1.0) => {
                errors.push(CalcError::invalid_input(
                    "cascade.low_stage_cop",
                    f.to_string(),
                    "Carnot fraction must be in (0, 1]",
                ));
            }
            _ => {}
        }
        errors.extend(self.sizing.validation_errors());

        errors
    }

    pub fn validate(&self) -> CalcResult<()> {
        first_error(self.validation_errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = DesignConfig::new(0.1);
        assert_eq!(c.max_units_per_stage, 4);
        assert_eq!(c.max_air_coolers, 6);
        assert_eq!(c.cascade.heat_exchanger_approach_k, 5.0);
        assert_eq!(c.cascade.low_stage_cop, CopEstimate::CarnotFraction(0.5));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults_match_new() {
        let parsed: DesignConfig = serde_json::from_str(r#"{"safety_margin": 0.15}"#).unwrap();
        assert_eq!(parsed, DesignConfig::new(0.15));
    }

    #[test]
    fn test_margin_out_of_range() {
        for margin in [-0.01, 1.5, f64::NAN] {
            let err = DesignConfig::new(margin).validate().unwrap_err();
            match err {
                CalcError::InvalidInput { field, .. } => assert_eq!(field, "safety_margin"),
                other => panic!("unexpected: {:?}", other),
            }
        }
        assert!(DesignConfig::new(0.0).validate().is_ok());
        assert!(DesignConfig::new(1.0).validate().is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let mut c = DesignConfig::new(2.0);
        c.max_units_per_stage = 0;
        c.run_time_fraction = 0.0;
        assert_eq!(c.validation_errors().len(), 3);
    }

    #[test]
    fn test_sizing_defaults() {
        let sizing = SizingConfig::default();
        assert_eq!(sizing.basis, SizingBasis::Total);
        assert_eq!(sizing.pull_down_multiplier(10.0, -5.0), 1.3);
        assert_eq!(sizing.pull_down_multiplier(10.0, -4.9), 1.0);
        assert_eq!(sizing.product_diversity(320.0, -18.0), 0.5);
        assert_eq!(sizing.product_diversity(15_000.0, -18.0), 0.65);
        assert_eq!(sizing.product_diversity(50_000.0, -18.0), 0.8);
        assert_eq!(sizing.product_diversity(320.0, 2.0), 0.6);
        assert_eq!(sizing.product_diversity(2_500.0, 2.0), 0.45);
        assert_eq!(sizing.product_diversity(8_000.0, 2.0), 0.3);
    }

    #[test]
    fn test_sizing_from_json() {
        let json = r#"{ "safety_margin": 0.1, "sizing": { "basis": "Diversified", "piping_factor": 1.1 } }"#;
        let config: DesignConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sizing.basis, SizingBasis::Diversified);
        assert_eq!(config.sizing.piping_factor, 1.1);
        assert_eq!(config.sizing.operational_diversity, 0.5);
    }

    #[test]
    fn test_sizing_validation() {
        let mut c = DesignConfig::new(0.1);
        c.sizing.piping_factor = 0.9;
        c.sizing.operational_diversity = 0.0;
        c.sizing.frozen_product_diversity[1].factor = 1.5;
        let fields: Vec<String> = c
            .validation_errors()
            .into_iter()
            .map(|e| match e {
                CalcError::InvalidInput { field, .. } => field,
                other => panic!("unexpected: {:?}", other),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "sizing.frozen_product_diversity",
                "sizing.operational_diversity",
                "sizing.piping_factor",
            ]
        );
    }

    #[test]
    fn test_cop_estimate_json() {
        let json = serde_json::to_string(&CopEstimate::Fixed(3.0)).unwrap();
        assert_eq!(json, r#"{"type":"Fixed","value":3.0}"#);
    }
}
