//! # Single-Stage Selector
//!
//! Picks the smallest adequate unit for a load at one operating point.
//!
//! ## Algorithm
//!
//! 1. Take catalog entries of the requested kind and role in ascending
//!    model id order.
//! 2. Reject entries with the wrong defrost method, entries whose envelope
//!    excludes the operating point, and entries whose corrected capacity is
//!    not a positive finite number. Every rejection is recorded.
//! 3. Single units: the smallest corrected capacity at or above the load.
//! 4. Otherwise groups of `n = 2..=max_units` identical units: the smallest
//!    `n` that covers the load, then the smallest combined capacity.
//!
//! Ties go to the lower model id. The result is fully determined by the
//! inputs.

use tracing::debug;

use super::{EquipmentSelection, OperatingPoint, Rejection, RejectionReason, SelectionCriteria};
use crate::catalog::{EquipmentCatalog, EquipmentEntry, EquipmentKind};
use crate::errors::{CalcError, CalcResult};

/// Select equipment covering `required_kw` at `op`.
///
/// # Errors
///
/// - `InvalidInput` if `required_kw` is not a positive finite number or
///   `max_units` is zero
/// - `NoCandidate` if no unit or group of up to `max_units` covers the load;
///   `max_available_kw` is the best corrected unit capacity times
///   `max_units`, zero when nothing is in range
///
/// # Example
///
/// ```rust
/// use coldstore_core::catalog::{EquipmentCatalog, StageRole};
/// use coldstore_core::selection::{select, OperatingPoint, SelectionCriteria};
///
/// let op = OperatingPoint::new(-10.0, 40.0, -2.0);
/// let criteria = SelectionCriteria::compressors(StageRole::Single, 4);
/// let sel = select(18.0, &op, EquipmentCatalog::standard(), &criteria).unwrap();
///
/// assert_eq!(sel.model_id, "SC-020");
/// assert_eq!(sel.units, 1);
/// ```
pub fn select(
    required_kw: f64,
    op: &OperatingPoint,
    catalog: &EquipmentCatalog,
    criteria: &SelectionCriteria,
) -> CalcResult<EquipmentSelection> {
    if !(required_kw > 0.0 && required_kw.is_finite()) {
        return Err(CalcError::invalid_input(
            "required_kw",
            required_kw.to_string(),
            "Required capacity must be a positive number",
        ));
    }
    if criteria.max_units == 0 {
        return Err(CalcError::invalid_input(
            "max_units",
            "0",
            "At least one unit must be allowed",
        ));
    }

    let stage = criteria.stage_name();
    let mut rejections = Vec::new();
    let mut feasible: Vec<(&EquipmentEntry, f64)> = Vec::new();

    for entry in catalog.candidates(criteria.kind, criteria.role) {
        if let Some(reason) = rejection_reason(entry, op, criteria) {
            debug!(stage, model = %entry.model_id, ?reason, "rejected");
            rejections.push(Rejection {
                model_id: entry.model_id.clone(),
                reason,
            });
            continue;
        }
        feasible.push((entry, entry.corrected_capacity_kw(op)));
    }

    // Single units; min_by keeps the first (lowest id) of equal capacities
    let single = feasible
        .iter()
        .filter(|(_, cap)| *cap >= required_kw)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let chosen = match single {
        Some(&(entry, cap)) => Some((entry, cap, 1)),
        None => (2..=criteria.max_units).find_map(|n| {
            feasible
                .iter()
                .filter(|(_, cap)| cap * f64::from(n) >= required_kw)
                .min_by(|a, b| (a.1 * f64::from(n)).total_cmp(&(b.1 * f64::from(n))))
                .map(|&(entry, cap)| (entry, cap, n))
        }),
    };

    let Some((entry, unit_capacity_kw, units)) = chosen else {
        let best = feasible.iter().map(|(_, cap)| *cap).fold(0.0, f64::max);
        let max_available_kw = best * f64::from(criteria.max_units);
        debug!(stage, required_kw, max_available_kw, "no candidate");
        return Err(CalcError::no_candidate(stage, required_kw, max_available_kw));
    };

    let total_capacity_kw = unit_capacity_kw * f64::from(units);
    let margin_kw = total_capacity_kw - required_kw;

    let (power_input_kw, cop) = match entry.kind {
        EquipmentKind::Compressor => (entry.power_input_kw(op, required_kw), entry.cop_at(op)),
        EquipmentKind::AirCooler => (None, None),
    };

    debug!(
        stage,
        model = %entry.model_id,
        units,
        unit_capacity_kw,
        required_kw,
        "selected"
    );

    Ok(EquipmentSelection {
        model_id: entry.model_id.clone(),
        kind: entry.kind,
        role: entry.role,
        refrigerant: entry.refrigerant.clone(),
        units,
        unit_capacity_kw,
        total_capacity_kw,
        required_kw,
        margin_kw,
        margin_fraction: margin_kw / required_kw,
        operating: *op,
        power_input_kw,
        cop,
        fan_power_kw: entry.fan_power_kw * f64::from(units),
        defrost_power_kw: entry.defrost_power_kw * f64::from(units),
        rejections,
    })
}

fn rejection_reason(
    entry: &EquipmentEntry,
    op: &OperatingPoint,
    criteria: &SelectionCriteria,
) -> Option<RejectionReason> {
    if let Some(method) = criteria.defrost_method {
        let required = method.cooler_series();
        if entry.defrost_method.map(|m| m.cooler_series()) != Some(required) {
            return Some(RejectionReason::DefrostMismatch {
                required,
                found: entry.defrost_method,
            });
        }
    }
    if let Err(violation) = entry.check_envelope(op) {
        return Some(RejectionReason::OutsideEnvelope { violation });
    }
    let capacity_kw = entry.corrected_capacity_kw(op);
    if !(capacity_kw.is_finite() && capacity_kw > 0.0) {
        return Some(RejectionReason::NoCapacity {
            capacity_kw: capacity_kw.is_finite().then_some(capacity_kw),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        CapacityCorrection, DefrostMethod, Envelope, RatingPoint, StageRole, TempRange,
    };

    fn rating_point() -> OperatingPoint {
        OperatingPoint::new(-10.0, 40.0, -2.0)
    }

    fn compressor(id: &str, kw: f64) -> EquipmentEntry {
        EquipmentEntry {
            model_id: id.to_string(),
            kind: EquipmentKind::Compressor,
            role: StageRole::Single,
            refrigerant: "R507A".to_string(),
            rated_capacity_kw: kw,
            rating: RatingPoint {
                evaporating_c: -10.0,
                condensing_c: 40.0,
                room_c: None,
            },
            envelope: Envelope {
                evaporating: Some(TempRange::new(-40.0, 5.0)),
                ..Envelope::default()
            },
            correction: CapacityCorrection::Linear {
                evap_coeff_per_k: 0.035,
                cond_coeff_per_k: -0.012,
            },
            power: None,
            fan_power_kw: 0.0,
            defrost_power_kw: 0.0,
            defrost_method: None,
        }
    }

    fn small_catalog() -> EquipmentCatalog {
        EquipmentCatalog::new(vec![
            compressor("C-30", 30.0),
            compressor("C-10", 10.0),
            compressor("C-20", 20.0),
            compressor("C-20B", 20.0),
        ])
        .unwrap()
    }

    fn criteria(max_units: u32) -> SelectionCriteria {
        SelectionCriteria::compressors(StageRole::Single, max_units)
    }

    #[test]
    fn test_smallest_single_unit() {
        let sel = select(15.0, &rating_point(), &small_catalog(), &criteria(4)).unwrap();
        assert_eq!(sel.model_id, "C-20");
        assert_eq!(sel.units, 1);
        assert!((sel.margin_kw - 5.0).abs() < 1e-9);
        assert!((sel.margin_fraction - 5.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_lower_id() {
        let sel = select(20.0, &rating_point(), &small_catalog(), &criteria(4)).unwrap();
        assert_eq!(sel.model_id, "C-20");
    }

    #[test]
    fn test_multiple_units_when_no_single_fits() {
        // 2 x 30 = 60 covers 55; no group of two smaller units does
        let sel = select(55.0, &rating_point(), &small_catalog(), &criteria(4)).unwrap();
        assert_eq!(sel.units, 2);
        assert_eq!(sel.model_id, "C-30");
        assert_eq!(sel.total_capacity_kw, 60.0);
    }

    #[test]
    fn test_smallest_combined_capacity_within_unit_count() {
        // n = 2: C-20 x2 = 40 beats C-30 x2 = 60 for a 38 kW load
        let sel = select(38.0, &rating_point(), &small_catalog(), &criteria(4)).unwrap();
        assert_eq!(sel.units, 2);
        assert_eq!(sel.model_id, "C-20");
    }

    #[test]
    fn test_no_candidate_reports_max_capacity() {
        let err = select(500.0, &rating_point(), &small_catalog(), &criteria(4)).unwrap_err();
        match err {
            CalcError::NoCandidate {
                stage,
                required_kw,
                max_available_kw,
            } => {
                assert_eq!(stage, "single");
                assert_eq!(required_kw, 500.0);
                assert_eq!(max_available_kw, 120.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_no_candidate_in_range_reports_zero() {
        let op = OperatingPoint::new(-60.0, 40.0, -52.0);
        let err = select(10.0, &op, &small_catalog(), &criteria(4)).unwrap_err();
        match err {
            CalcError::NoCandidate { max_available_kw, .. } => assert_eq!(max_available_kw, 0.0),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rejections_recorded_in_id_order() {
        let op = OperatingPoint::new(-60.0, 40.0, -52.0);
        let mut catalog = small_catalog();
        catalog.entries.push(EquipmentEntry {
            envelope: Envelope::default(),
            correction: CapacityCorrection::Linear {
                evap_coeff_per_k: 0.0,
                cond_coeff_per_k: 0.0,
            },
            ..compressor("C-99", 99.0)
        });
        let sel = select(10.0, &op, &catalog, &criteria(1)).unwrap();
        assert_eq!(sel.model_id, "C-99");
        let ids: Vec<&str> = sel.rejections.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, vec!["C-10", "C-20", "C-20B", "C-30"]);
        assert!(matches!(
            sel.rejections[0].reason,
            RejectionReason::OutsideEnvelope { .. }
        ));
    }

    #[test]
    fn test_non_positive_capacity_rejected() {
        // Linear correction goes negative far below the rating point
        let mut catalog = small_catalog();
        for e in &mut catalog.entries {
            e.envelope = Envelope::default();
        }
        let op = OperatingPoint::new(-45.0, 40.0, -37.0);
        let err = select(1.0, &op, &catalog, &criteria(4)).unwrap_err();
        assert_eq!(err.error_code(), "NO_CANDIDATE");
    }

    #[test]
    fn test_invalid_required_load() {
        for required in [0.0, -1.0, f64::NAN] {
            let err = select(required, &rating_point(), &small_catalog(), &criteria(4)).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_air_cooler_defrost_filter() {
        let catalog = EquipmentCatalog::standard();
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let sel = select(9.0, &op, catalog, &SelectionCriteria::air_coolers(6, DefrostMethod::HotGas)).unwrap();
        assert!(sel.model_id.starts_with("ACE"));
        assert_eq!(sel.model_id, "ACE-12");
        assert!(sel.rejections.iter().any(|r| matches!(
            r.reason,
            RejectionReason::DefrostMismatch { .. }
        )));
        assert!(sel.power_input_kw.is_none());
        assert!(sel.fan_power_kw > 0.0);
    }

    #[test]
    fn test_water_defrost_out_of_room_range() {
        let catalog = EquipmentCatalog::standard();
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let err = select(9.0, &op, catalog, &SelectionCriteria::air_coolers(6, DefrostMethod::Water)).unwrap_err();
        match err {
            CalcError::NoCandidate { stage, max_available_kw, .. } => {
                assert_eq!(stage, "air cooler");
                assert_eq!(max_available_kw, 0.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_compressor_power_reported() {
        let op = OperatingPoint::new(-26.0, 45.0, -18.0);
        let sel = select(9.0, &op, EquipmentCatalog::standard(), &criteria(4)).unwrap();
        assert_eq!(sel.model_id, "SC-035");
        let cop = sel.cop.unwrap();
        assert!((sel.power_input_kw.unwrap() - 9.0 / cop).abs() < 1e-9);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn selection_is_deterministic(required in 0.5f64..200.0, te in -40.0f64..0.0) {
                let op = OperatingPoint::new(te, 40.0, te + 8.0);
                let catalog = EquipmentCatalog::standard();
                let c = criteria(4);
                let a = select(required, &op, catalog, &c);
                let b = select(required, &op, catalog, &c);
                prop_assert_eq!(a, b);
            }

            #[test]
            fn single_unit_choice_is_minimal(required in 0.5f64..120.0) {
                let op = rating_point();
                let catalog = small_catalog();
                if let Ok(sel) = select(required, &op, &catalog, &criteria(4)) {
                    prop_assert!(sel.total_capacity_kw >= required);
                    if sel.units == 1 {
                        for e in &catalog.entries {
                            let cap = e.corrected_capacity_kw(&op);
                            prop_assert!(!(cap >= required && cap < sel.unit_capacity_kw));
                        }
                    } else {
                        for e in &catalog.entries {
                            prop_assert!(e.corrected_capacity_kw(&op) < required);
                        }
                    }
                }
            }
        }
    }
}
