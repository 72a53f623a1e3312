//! # Equipment Catalog
//!
//! Air coolers and compressors with their rated capacity, rating point,
//! operating envelope and correction curve.
//!
//! ## Capacity Correction
//!
//! Rated capacity is quoted at one reference point. Three correction forms
//! move it to the actual operating point:
//!
//! - **Linear**: `Q = Q_rated · (1 + a·(Te − Te_ref) + b·(Tc − Tc_ref))`
//! - **EN 12900 polynomial**: ten-coefficient cubic in (Te, Tc), result in W
//! - **Temperature difference** (air coolers): `Q = Q_rated · (t_room − Te) / TD_rated`
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::catalog::EquipmentCatalog;
//! use coldstore_core::selection::OperatingPoint;
//!
//! let catalog = EquipmentCatalog::standard();
//! let cds = catalog.get("CDS3001B").unwrap();
//!
//! let op = OperatingPoint::new(-35.0, -20.0, -27.0);
//! let q = cds.corrected_capacity_kw(&op);
//! assert!((q - 103.489).abs() < 0.01);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::selection::OperatingPoint;
use crate::units::{Celsius, Kelvin};

static STANDARD_EQUIPMENT: Lazy<EquipmentCatalog> = Lazy::new(EquipmentCatalog::build_standard);

/// Equipment kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    AirCooler,
    Compressor,
}

/// Position of a unit in the refrigeration system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageRole {
    /// Single-stage system (air coolers are always `Single`)
    Single,
    /// High stage of a cascade, absorbs the cascade heat exchanger duty
    High,
    /// Low stage of a cascade, serves the room
    Low,
}

impl StageRole {
    /// Stage name used in error messages and logs
    pub fn stage_name(&self) -> &'static str {
        match self {
            StageRole::Single => "single",
            StageRole::High => "high",
            StageRole::Low => "low",
        }
    }
}

/// Air cooler defrost method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DefrostMethod {
    #[default]
    Electric,
    /// Hot gas defrost uses the electric-defrost cooler series
    HotGas,
    Water,
    /// Off-cycle defrost, rooms above freezing only
    Natural,
}

impl DefrostMethod {
    /// Cooler series built for this defrost method
    pub fn cooler_series(&self) -> DefrostMethod {
        match self {
            DefrostMethod::HotGas => DefrostMethod::Electric,
            other => *other,
        }
    }
}

/// Closed temperature interval (°C)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempRange {
    pub min_c: f64,
    pub max_c: f64,
}

impl TempRange {
    pub fn new(min_c: f64, max_c: f64) -> Self {
        TempRange { min_c, max_c }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.min_c && t <= self.max_c
    }
}

/// Conditions at which `rated_capacity_kw` is quoted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingPoint {
    pub evaporating_c: f64,
    pub condensing_c: f64,
    /// Entering air temperature (air coolers)
    #[serde(default)]
    pub room_c: Option<f64>,
}

/// Application limits of a unit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub evaporating: Option<TempRange>,
    #[serde(default)]
    pub condensing: Option<TempRange>,
    #[serde(default)]
    pub room: Option<TempRange>,
    /// Minimum condensing minus evaporating temperature (K)
    #[serde(default)]
    pub min_lift_k: Option<f64>,
}

/// Why an operating point falls outside a unit's envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "limit")]
pub enum EnvelopeViolation {
    Evaporating { value_c: f64, min_c: f64, max_c: f64 },
    Condensing { value_c: f64, min_c: f64, max_c: f64 },
    Room { value_c: f64, min_c: f64, max_c: f64 },
    Lift { lift_k: f64, min_lift_k: f64 },
}

/// Capacity correction curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CapacityCorrection {
    /// Fractional change per kelvin away from the rating point
    Linear {
        evap_coeff_per_k: f64,
        cond_coeff_per_k: f64,
    },
    /// EN 12900 capacity polynomial, result in W
    Polynomial { coefficients: [f64; 10] },
    /// Proportional to the air-to-refrigerant temperature difference
    TemperatureDifference { rated_td_k: f64 },
}

/// Compressor power model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PowerModel {
    /// COP at the rating point, scaled with the Carnot COP elsewhere
    RatedCop { cop: f64 },
    /// EN 12900 power polynomial, result in W
    Polynomial { coefficients: [f64; 10] },
}

/// Evaluate an EN 12900 ten-coefficient polynomial.
///
/// `y = c1 + c2·to + c3·tc + c4·to² + c5·to·tc + c6·tc² + c7·to³ + c8·tc·to² + c9·to·tc² + c10·tc³`
pub fn en12900(c: &[f64; 10], to: f64, tc: f64) -> f64 {
    c[0] + c[1] * to
        + c[2] * tc
        + c[3] * to * to
        + c[4] * to * tc
        + c[5] * tc * tc
        + c[6] * to * to * to
        + c[7] * tc * to * to
        + c[8] * to * tc * tc
        + c[9] * tc * tc * tc
}

/// Carnot refrigeration COP between two Celsius temperatures.
///
/// Returns `None` when the lift is not positive.
pub fn carnot_cop(evaporating_c: f64, condensing_c: f64) -> Option<f64> {
    let te: Kelvin = Celsius(evaporating_c).into();
    let tc: Kelvin = Celsius(condensing_c).into();
    let lift = (tc - te).value();
    if lift > 0.0 {
        Some(te.value() / lift)
    } else {
        None
    }
}

/// One catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    pub model_id: String,
    pub kind: EquipmentKind,
    pub role: StageRole,
    pub refrigerant: String,
    pub rated_capacity_kw: f64,
    pub rating: RatingPoint,
    #[serde(default)]
    pub envelope: Envelope,
    pub correction: CapacityCorrection,
    #[serde(default)]
    pub power: Option<PowerModel>,
    #[serde(default)]
    pub fan_power_kw: f64,
    #[serde(default)]
    pub defrost_power_kw: f64,
    #[serde(default)]
    pub defrost_method: Option<DefrostMethod>,
}

impl EquipmentEntry {
    /// Check the operating point against the envelope.
    ///
    /// Returns the first violated limit.
    pub fn check_envelope(&self, op: &OperatingPoint) -> Result<(), EnvelopeViolation> {
        let env = &self.envelope;
        if let Some(r) = env.evaporating {
            if !r.contains(op.evaporating_c) {
                return Err(EnvelopeViolation::Evaporating {
                    value_c: op.evaporating_c,
                    min_c: r.min_c,
                    max_c: r.max_c,
                });
            }
        }
        if let Some(r) = env.condensing {
            if !r.contains(op.condensing_c) {
                return Err(EnvelopeViolation::Condensing {
                    value_c: op.condensing_c,
                    min_c: r.min_c,
                    max_c: r.max_c,
                });
            }
        }
        if let Some(r) = env.room {
            if !r.contains(op.room_c) {
                return Err(EnvelopeViolation::Room {
                    value_c: op.room_c,
                    min_c: r.min_c,
                    max_c: r.max_c,
                });
            }
        }
        if let Some(min_lift_k) = env.min_lift_k {
            let lift_k = op.condensing_c - op.evaporating_c;
            if lift_k < min_lift_k {
                return Err(EnvelopeViolation::Lift { lift_k, min_lift_k });
            }
        }
        Ok(())
    }

    /// Capacity of one unit at the operating point (kW).
    ///
    /// May be zero, negative or non-finite far from the rating point; the
    /// selector treats those as rejections.
    pub fn corrected_capacity_kw(&self, op: &OperatingPoint) -> f64 {
        match &self.correction {
            CapacityCorrection::Linear {
                evap_coeff_per_k,
                cond_coeff_per_k,
            } => {
                let factor = 1.0
                    + evap_coeff_per_k * (op.evaporating_c - self.rating.evaporating_c)
                    + cond_coeff_per_k * (op.condensing_c - self.rating.condensing_c);
                self.rated_capacity_kw * factor
            }
            CapacityCorrection::Polynomial { coefficients } => {
                en12900(coefficients, op.evaporating_c, op.condensing_c) / 1000.0
            }
            CapacityCorrection::TemperatureDifference { rated_td_k } => {
                self.rated_capacity_kw * (op.room_c - op.evaporating_c) / rated_td_k
            }
        }
    }

    /// COP of the unit at the operating point, if it has a power model
    pub fn cop_at(&self, op: &OperatingPoint) -> Option<f64> {
        let cop = match self.power.as_ref()? {
            PowerModel::RatedCop { cop } => {
                let at_rating = carnot_cop(self.rating.evaporating_c, self.rating.condensing_c)?;
                let at_op = carnot_cop(op.evaporating_c, op.condensing_c)?;
                cop * at_op / at_rating
            }
            PowerModel::Polynomial { coefficients } => {
                let power_w = en12900(coefficients, op.evaporating_c, op.condensing_c);
                let capacity_kw = self.corrected_capacity_kw(op);
                capacity_kw * 1000.0 / power_w
            }
        };
        if cop.is_finite() && cop > 0.0 {
            Some(cop)
        } else {
            None
        }
    }

    /// Shaft power needed to deliver `load_kw` at the operating point (kW)
    pub fn power_input_kw(&self, op: &OperatingPoint, load_kw: f64) -> Option<f64> {
        self.cop_at(op).map(|cop| load_kw / cop)
    }
}

/// The Equipment Catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCatalog {
    pub entries: Vec<EquipmentEntry>,
}

impl EquipmentCatalog {
    /// The built-in catalog, shared process-wide
    pub fn standard() -> &'static EquipmentCatalog {
        &STANDARD_EQUIPMENT
    }

    /// Build a catalog from entries, rejecting duplicate or empty model ids
    /// and non-positive ratings.
    pub fn new(entries: Vec<EquipmentEntry>) -> CalcResult<Self> {
        let catalog = EquipmentCatalog { entries };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> CalcResult<()> {
        let mut seen = std::collections::HashSet::new();
        for e in &self.entries {
            if e.model_id.trim().is_empty() {
                return Err(CalcError::invalid_input("model_id", "", "Model id cannot be empty"));
            }
            if !seen.insert(e.model_id.as_str()) {
                return Err(CalcError::invalid_input(
                    "model_id",
                    &e.model_id,
                    "Duplicate model id in equipment catalog",
                ));
            }
            if !(e.rated_capacity_kw > 0.0) {
                return Err(CalcError::invalid_input(
                    format!("{}.rated_capacity_kw", e.model_id),
                    e.rated_capacity_kw.to_string(),
                    "Rated capacity must be positive",
                ));
            }
            if let CapacityCorrection::TemperatureDifference { rated_td_k } = e.correction {
                if !(rated_td_k > 0.0) {
                    return Err(CalcError::invalid_input(
                        format!("{}.rated_td_k", e.model_id),
                        rated_td_k.to_string(),
                        "Rated temperature difference must be positive",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Look up an entry by model id
    pub fn get(&self, model_id: &str) -> CalcResult<&EquipmentEntry> {
        self.entries
            .iter()
            .find(|e| e.model_id == model_id)
            .ok_or_else(|| CalcError::unknown_entry("equipment", model_id))
    }

    /// Entries of one kind and role, in ascending model id order
    pub fn candidates(&self, kind: EquipmentKind, role: StageRole) -> Vec<&EquipmentEntry> {
        let mut out: Vec<&EquipmentEntry> = self
            .entries
            .iter()
            .filter(|e| e.kind == kind && e.role == role)
            .collect();
        out.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        out
    }

    fn build_standard() -> EquipmentCatalog {
        let mut entries = Vec::new();

        // R507A semi-hermetic compressors for single-stage systems
        for (id, kw) in [
            ("SC-010", 10.0),
            ("SC-020", 20.0),
            ("SC-035", 35.0),
            ("SC-050", 50.0),
            ("SC-080", 80.0),
            ("SC-120", 120.0),
        ] {
            entries.push(linear_compressor(
                id,
                StageRole::Single,
                "R507A",
                kw,
                (-10.0, 40.0),
                TempRange::new(-40.0, 5.0),
                TempRange::new(25.0, 55.0),
                2.2,
            ));
        }

        // R507A high stage, evaporating on the cascade heat exchanger
        for (id, kw) in [
            ("HS-030", 30.0),
            ("HS-060", 60.0),
            ("HS-100", 100.0),
            ("HS-160", 160.0),
        ] {
            entries.push(linear_compressor(
                id,
                StageRole::High,
                "R507A",
                kw,
                (-10.0, 40.0),
                TempRange::new(-20.0, 5.0),
                TempRange::new(25.0, 55.0),
                2.2,
            ));
        }

        // CO2 low stage
        for (id, kw) in [("LS-CO2-015", 15.0), ("LS-CO2-030", 30.0)] {
            entries.push(linear_compressor(
                id,
                StageRole::Low,
                "R744",
                kw,
                (-35.0, -5.0),
                TempRange::new(-55.0, -25.0),
                TempRange::new(-15.0, 10.0),
                4.1,
            ));
        }
        entries.push(EquipmentEntry {
            model_id: "CDS3001B".to_string(),
            kind: EquipmentKind::Compressor,
            role: StageRole::Low,
            refrigerant: "R744".to_string(),
            rated_capacity_kw: 84.57,
            rating: RatingPoint {
                evaporating_c: -35.0,
                condensing_c: -5.0,
                room_c: None,
            },
            envelope: Envelope {
                evaporating: Some(TempRange::new(-50.0, -20.0)),
                condensing: Some(TempRange::new(-20.0, 15.0)),
                room: None,
                min_lift_k: Some(15.0),
            },
            correction: CapacityCorrection::Polynomial {
                coefficients: [
                    278492.0139,
                    8289.511277,
                    -3958.798994,
                    81.04891123,
                    -96.58054093,
                    -9.974927429,
                    0.2305085396,
                    -0.6471373423,
                    -0.2592241153,
                    0.166966151,
                ],
            },
            power: Some(PowerModel::Polynomial {
                coefficients: [
                    2916.46822,
                    -1547.694568,
                    1607.57633,
                    -36.8808604,
                    46.42174442,
                    -6.856472424,
                    -0.2590277293,
                    0.440912048,
                    -0.2009014748,
                    0.02600566231,
                ],
            }),
            fan_power_kw: 0.0,
            defrost_power_kw: 0.0,
            defrost_method: None,
        });

        // Air coolers, rated at 8 K air-to-refrigerant difference
        for (id, kw, fan, defrost) in [
            ("ACE-04", 4.0, 0.25, 2.5),
            ("ACE-08", 8.0, 0.45, 4.5),
            ("ACE-12", 12.0, 0.7, 6.8),
            ("ACE-20", 20.0, 1.1, 11.0),
            ("ACE-30", 30.0, 1.6, 16.5),
        ] {
            entries.push(air_cooler(id, kw, fan, defrost, DefrostMethod::Electric, TempRange::new(-45.0, 10.0)));
        }
        for (id, kw, fan) in [("ACW-06", 6.0, 0.35), ("ACW-12", 12.0, 0.7), ("ACW-25", 25.0, 1.3)] {
            entries.push(air_cooler(id, kw, fan, 0.0, DefrostMethod::Water, TempRange::new(-5.0, 15.0)));
        }
        for (id, kw, fan) in [("ACN-05", 5.0, 0.3), ("ACN-10", 10.0, 0.55), ("ACN-20", 20.0, 1.1)] {
            entries.push(air_cooler(id, kw, fan, 0.0, DefrostMethod::Natural, TempRange::new(2.0, 15.0)));
        }

        EquipmentCatalog { entries }
    }
}

#[allow(clippy::too_many_arguments)]
fn linear_compressor(
    model_id: &str,
    role: StageRole,
    refrigerant: &str,
    rated_capacity_kw: f64,
    rating: (f64, f64),
    evaporating: TempRange,
    condensing: TempRange,
    rated_cop: f64,
) -> EquipmentEntry {
    EquipmentEntry {
        model_id: model_id.to_string(),
        kind: EquipmentKind::Compressor,
        role,
        refrigerant: refrigerant.to_string(),
        rated_capacity_kw,
        rating: RatingPoint {
            evaporating_c: rating.0,
            condensing_c: rating.1,
            room_c: None,
        },
        envelope: Envelope {
            evaporating: Some(evaporating),
            condensing: Some(condensing),
            room: None,
            min_lift_k: Some(15.0),
        },
        correction: CapacityCorrection::Linear {
            evap_coeff_per_k: 0.035,
            cond_coeff_per_k: -0.012,
        },
        power: Some(PowerModel::RatedCop { cop: rated_cop }),
        fan_power_kw: 0.0,
        defrost_power_kw: 0.0,
        defrost_method: None,
    }
}

fn air_cooler(
    model_id: &str,
    rated_capacity_kw: f64,
    fan_power_kw: f64,
    defrost_power_kw: f64,
    defrost_method: DefrostMethod,
    room: TempRange,
) -> EquipmentEntry {
    EquipmentEntry {
        model_id: model_id.to_string(),
        kind: EquipmentKind::AirCooler,
        role: StageRole::Single,
        refrigerant: "any".to_string(),
        rated_capacity_kw,
        rating: RatingPoint {
            evaporating_c: -8.0,
            condensing_c: 40.0,
            room_c: Some(0.0),
        },
        envelope: Envelope {
            evaporating: None,
            condensing: None,
            room: Some(room),
            min_lift_k: None,
        },
        correction: CapacityCorrection::TemperatureDifference { rated_td_k: 8.0 },
        power: None,
        fan_power_kw,
        defrost_power_kw,
        defrost_method: Some(defrost_method),
    }
}
