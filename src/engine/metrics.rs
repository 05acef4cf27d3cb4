//! Case metric derivation under the DIP payment scheme.
//!
//! The formulas and their order are the scheme's payment logic:
//!
//! 1. `effective_weight = base_weight * tier_coefficient`
//! 2. `total_cost = treatment + exam + drug + material`
//! 3. `medical_income = treatment + exam`
//! 4. `drug_material_income = drug + material`
//! 5. `treatment_cost = medical_income * med_ratio + drug_material_income * dm_ratio`
//! 6. `patient_out_of_pocket = total_cost - payer_contribution`
//! 7. `payment_standard = effective_weight * point_value`
//! 8. `settlement_amount = max(payment_standard - patient_out_of_pocket, 0)`
//! 9. `true_profit_loss = payment_standard - treatment_cost`
//! 10. `settlement_rate = settlement_amount / payer_contribution` (0 when the contribution is 0)
//! 11. `net_profit_loss = settlement_amount - payer_contribution`

use crate::domain::{CostInputs, DipMetrics, InputField};
use crate::error::InputError;

/// Check every input is finite and inside its domain bound.
///
/// Fields are checked in `InputField::ALL` order; the first offender is reported.
pub fn validate(inputs: &CostInputs) -> Result<(), InputError> {
    for field in InputField::ALL {
        let value = inputs.get(field);
        let (min, max) = field.bounds();

        if !value.is_finite() {
            return Err(InputError {
                field,
                value,
                reason: "must be a finite number".to_string(),
            });
        }
        if value < min {
            return Err(InputError {
                field,
                value,
                reason: format!("must be >= {min}"),
            });
        }
        if let Some(max) = max {
            if value > max {
                return Err(InputError {
                    field,
                    value,
                    reason: format!("must be <= {max}"),
                });
            }
        }
    }
    Ok(())
}

/// Validate the inputs and derive all case metrics.
pub fn compute(inputs: &CostInputs) -> Result<DipMetrics, InputError> {
    validate(inputs)?;

    let effective_weight = inputs.base_weight * inputs.tier_coefficient;

    let total_cost = inputs.treatment_fee + inputs.exam_fee + inputs.drug_fee + inputs.material_fee;
    let medical_income = inputs.treatment_fee + inputs.exam_fee;
    let drug_material_income = inputs.drug_fee + inputs.material_fee;
    let treatment_cost = medical_income * inputs.medical_income_cost_ratio
        + drug_material_income * inputs.drug_material_cost_ratio;
    let patient_out_of_pocket = total_cost - inputs.payer_contribution;
    let payment_standard = effective_weight * inputs.point_value;

    let settlement_amount = floor_settlement(payment_standard, patient_out_of_pocket);

    let true_profit_loss = payment_standard - treatment_cost;
    let settlement_rate = settlement_rate(settlement_amount, inputs.payer_contribution);
    let net_profit_loss = settlement_amount - inputs.payer_contribution;

    let metrics = DipMetrics {
        effective_weight,
        total_cost,
        medical_income,
        drug_material_income,
        treatment_cost,
        patient_out_of_pocket,
        payment_standard,
        settlement_amount,
        true_profit_loss,
        settlement_rate,
        net_profit_loss,
    };

    if !all_finite(&metrics) {
        return Err(overflow_error(inputs));
    }
    Ok(metrics)
}

fn all_finite(m: &DipMetrics) -> bool {
    [
        m.effective_weight,
        m.total_cost,
        m.medical_income,
        m.drug_material_income,
        m.treatment_cost,
        m.patient_out_of_pocket,
        m.payment_standard,
        m.settlement_amount,
        m.true_profit_loss,
        m.settlement_rate,
        m.net_profit_loss,
    ]
    .iter()
    .all(|v| v.is_finite())
}

/// Blame the largest unbounded input for a derived value leaving the f64 range.
fn overflow_error(inputs: &CostInputs) -> InputError {
    let field = InputField::ALL
        .into_iter()
        .filter(|f| f.bounds().1.is_none())
        .fold(InputField::TreatmentFee, |best, f| {
            if inputs.get(f) > inputs.get(best) { f } else { best }
        });
    InputError {
        field,
        value: inputs.get(field),
        reason: "too large: derived amounts overflow".to_string(),
    }
}

/// Settlement credited under the scheme: negative settlements count as zero.
pub fn floor_settlement(payment_standard: f64, patient_out_of_pocket: f64) -> f64 {
    (payment_standard - patient_out_of_pocket).max(0.0)
}

/// Settlement as a fraction of the payer contribution.
///
/// A zero contribution yields a zero rate rather than a division fault.
pub fn settlement_rate(settlement_amount: f64, payer_contribution: f64) -> f64 {
    if payer_contribution != 0.0 {
        settlement_amount / payer_contribution
    } else {
        0.0
    }
}

/// Effective weight for display before a full calculation is triggered.
pub fn effective_weight(base_weight: f64, tier_coefficient: f64) -> f64 {
    base_weight * tier_coefficient
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FALLBACK_BASE_WEIGHT;

    fn scenario_a() -> CostInputs {
        CostInputs {
            treatment_fee: 3936.93,
            exam_fee: 3348.15,
            drug_fee: 2001.41,
            material_fee: 3115.78,
            medical_income_cost_ratio: 0.50,
            drug_material_cost_ratio: 1.00,
            payer_contribution: 7657.03,
            base_weight: FALLBACK_BASE_WEIGHT,
            tier_coefficient: 1.0330,
            point_value: 73.6011,
        }
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn scenario_a_settlement_is_floored() {
        let m = compute(&scenario_a()).unwrap();

        assert!(close(m.effective_weight, 28.6319709, 1e-6), "effective_weight={}", m.effective_weight);
        assert!(close(m.total_cost, 12402.27, 1e-6));
        assert!(close(m.medical_income, 7285.08, 1e-6));
        assert!(close(m.drug_material_income, 5117.19, 1e-6));
        assert!(close(m.treatment_cost, 8759.73, 1e-6));
        assert!(close(m.patient_out_of_pocket, 4745.24, 1e-6));
        assert!(close(m.payment_standard, 2107.3445534, 1e-6), "payment_standard={}", m.payment_standard);

        // payment standard < out of pocket, so the settlement floors at zero.
        assert_eq!(m.settlement_amount, 0.0);
        assert!(m.true_profit_loss < 0.0);
        assert!(close(m.true_profit_loss, m.payment_standard - m.treatment_cost, 1e-9));
        assert_eq!(m.settlement_rate, 0.0);
        assert!(close(m.net_profit_loss, -7657.03, 1e-9));
    }

    #[test]
    fn zero_contribution_gives_zero_rate() {
        let inputs = CostInputs {
            payer_contribution: 0.0,
            ..scenario_a()
        };
        let m = compute(&inputs).unwrap();
        assert_eq!(m.settlement_rate, 0.0);
        assert!(m.settlement_rate.is_finite());
    }

    #[test]
    fn scenario_c_zero_costs_settle_full_standard() {
        let inputs = CostInputs {
            treatment_fee: 0.0,
            exam_fee: 0.0,
            drug_fee: 0.0,
            material_fee: 0.0,
            medical_income_cost_ratio: 0.5,
            drug_material_cost_ratio: 1.0,
            payer_contribution: 0.0,
            base_weight: 45.2,
            tier_coefficient: 1.0,
            point_value: 63.3253,
        };
        let m = compute(&inputs).unwrap();

        assert!(close(m.payment_standard, 2862.30356, 1e-6), "payment_standard={}", m.payment_standard);
        assert_eq!(m.patient_out_of_pocket, 0.0);
        assert_eq!(m.settlement_amount, m.payment_standard);
        assert_eq!(m.true_profit_loss, m.payment_standard);
        // Guard triggers even though the settlement is positive.
        assert_eq!(m.settlement_rate, 0.0);
        assert_eq!(m.net_profit_loss, m.settlement_amount);
    }

    #[test]
    fn positive_settlement_rate() {
        let inputs = CostInputs {
            treatment_fee: 1000.0,
            exam_fee: 0.0,
            drug_fee: 0.0,
            material_fee: 0.0,
            medical_income_cost_ratio: 0.5,
            drug_material_cost_ratio: 1.0,
            payer_contribution: 800.0,
            base_weight: 10.0,
            tier_coefficient: 1.0,
            point_value: 100.0,
        };
        let m = compute(&inputs).unwrap();
        // standard 1000, out of pocket 200, settlement 800.
        assert!(close(m.settlement_amount, 800.0, 1e-9));
        assert!(close(m.settlement_rate, 1.0, 1e-12));
        assert!(close(m.net_profit_loss, 0.0, 1e-9));
    }

    #[test]
    fn total_cost_is_exact_sum() {
        let fees = [
            (0.0, 0.0, 0.0, 0.0),
            (0.1, 0.2, 0.3, 0.4),
            (1e9, 3.5, 7.25, 1e-3),
            (3936.93, 3348.15, 2001.41, 3115.78),
        ];
        for (t, e, d, mat) in fees {
            let inputs = CostInputs {
                treatment_fee: t,
                exam_fee: e,
                drug_fee: d,
                material_fee: mat,
                ..scenario_a()
            };
            let m = compute(&inputs).unwrap();
            assert_eq!(m.total_cost, t + e + d + mat);
        }
    }

    #[test]
    fn settlement_floor_holds_for_any_combination() {
        let values = [-5000.0, -1.0, 0.0, 0.5, 10.0, 2107.34, 4745.24, 1e7];
        for &standard in &values {
            for &oop in &values {
                let s = floor_settlement(standard, oop);
                assert!(s >= 0.0, "standard={standard} oop={oop} -> {s}");
                if standard - oop > 0.0 {
                    assert_eq!(s, standard - oop);
                }
            }
        }
    }

    #[test]
    fn settlement_rate_guard() {
        assert_eq!(settlement_rate(0.0, 0.0), 0.0);
        assert_eq!(settlement_rate(1234.5, 0.0), 0.0);
        assert_eq!(settlement_rate(50.0, 100.0), 0.5);
    }

    #[test]
    fn compute_is_idempotent() {
        let inputs = scenario_a();
        let first = compute(&inputs).unwrap();
        let second = compute(&inputs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases = [
            (CostInputs { exam_fee: -1.0, ..scenario_a() }, InputField::ExamFee),
            (CostInputs { drug_material_cost_ratio: 1.6, ..scenario_a() }, InputField::DrugMaterialCostRatio),
            (CostInputs { medical_income_cost_ratio: 1.01, ..scenario_a() }, InputField::MedicalIncomeCostRatio),
            (CostInputs { tier_coefficient: 0.4, ..scenario_a() }, InputField::TierCoefficient),
            (CostInputs { point_value: 200.5, ..scenario_a() }, InputField::PointValue),
            (CostInputs { payer_contribution: f64::NAN, ..scenario_a() }, InputField::PayerContribution),
            (CostInputs { base_weight: f64::INFINITY, ..scenario_a() }, InputField::BaseWeight),
        ];

        for (inputs, field) in cases {
            let err = compute(&inputs).unwrap_err();
            assert_eq!(err.field, field);
            assert!(err.to_string().contains(field.name()));
        }
    }

    #[test]
    fn overflowing_sums_are_rejected() {
        let inputs = CostInputs {
            treatment_fee: 1e308,
            exam_fee: 1e308,
            ..scenario_a()
        };
        let err = compute(&inputs).unwrap_err();
        assert_eq!(err.field, InputField::TreatmentFee);
        assert!(err.to_string().contains("overflow"));

        let inputs = CostInputs {
            base_weight: 1e307,
            ..scenario_a()
        };
        assert_eq!(compute(&inputs).unwrap_err().field, InputField::BaseWeight);
    }

    #[test]
    fn bounds_are_inclusive() {
        let inputs = CostInputs {
            medical_income_cost_ratio: 1.0,
            drug_material_cost_ratio: 1.5,
            tier_coefficient: 2.0,
            point_value: 200.0,
            ..scenario_a()
        };
        assert!(compute(&inputs).is_ok());

        let inputs = CostInputs {
            tier_coefficient: 0.5,
            point_value: 0.0,
            base_weight: 0.0,
            ..scenario_a()
        };
        assert!(compute(&inputs).is_ok());
    }

    #[test]
    fn effective_weight_matches_engine() {
        let inputs = scenario_a();
        let m = compute(&inputs).unwrap();
        assert_eq!(effective_weight(inputs.base_weight, inputs.tier_coefficient), m.effective_weight);
    }
}
