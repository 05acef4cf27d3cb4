//! Shared calculation pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! request -> base-weight resolution -> engine inputs -> metrics
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSet, Selection, WeightResolution, resolve_base_weight};
use crate::domain::{CostInputs, DipMetrics, EMPLOYEE_POINT_VALUE, InputField, InsurancePool};
use crate::error::AppError;

/// A snapshot of every user parameter at the moment a calculation is triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRequest {
    pub treatment_fee: f64,
    pub exam_fee: f64,
    pub drug_fee: f64,
    pub material_fee: f64,
    pub medical_income_cost_ratio: f64,
    pub drug_material_cost_ratio: f64,
    pub payer_contribution: f64,
    pub tier_coefficient: f64,
    pub pool: InsurancePool,
    pub point_value: f64,
    pub diagnosis: Selection,
    pub procedure: Selection,
    /// Manually entered base weight; replaces the catalog resolution when set.
    pub base_weight_override: Option<f64>,
}

impl Default for CalcRequest {
    /// The tool's starting form: a sample case on the employee pool, nothing selected.
    fn default() -> Self {
        Self {
            treatment_fee: 3936.93,
            exam_fee: 3348.15,
            drug_fee: 2001.41,
            material_fee: 3115.78,
            medical_income_cost_ratio: 0.50,
            drug_material_cost_ratio: 1.00,
            payer_contribution: 7657.03,
            tier_coefficient: 1.0330,
            pool: InsurancePool::Employee,
            point_value: EMPLOYEE_POINT_VALUE,
            diagnosis: Selection::Unchosen,
            procedure: Selection::Unchosen,
            base_weight_override: None,
        }
    }
}

impl CalcRequest {
    /// Engine inputs for a resolved base weight.
    pub fn to_inputs(&self, base_weight: f64) -> CostInputs {
        CostInputs {
            treatment_fee: self.treatment_fee,
            exam_fee: self.exam_fee,
            drug_fee: self.drug_fee,
            material_fee: self.material_fee,
            medical_income_cost_ratio: self.medical_income_cost_ratio,
            drug_material_cost_ratio: self.drug_material_cost_ratio,
            payer_contribution: self.payer_contribution,
            base_weight,
            tier_coefficient: self.tier_coefficient,
            point_value: self.point_value,
        }
    }

    /// Current value of a numeric form field; the base weight reads the override.
    pub fn value(&self, field: InputField) -> Option<f64> {
        match field {
            InputField::BaseWeight => self.base_weight_override,
            other => Some(self.to_inputs(0.0).get(other)),
        }
    }

    /// Set a numeric form field; the base weight sets the override.
    pub fn set_value(&mut self, field: InputField, value: f64) {
        match field {
            InputField::TreatmentFee => self.treatment_fee = value,
            InputField::ExamFee => self.exam_fee = value,
            InputField::DrugFee => self.drug_fee = value,
            InputField::MaterialFee => self.material_fee = value,
            InputField::MedicalIncomeCostRatio => self.medical_income_cost_ratio = value,
            InputField::DrugMaterialCostRatio => self.drug_material_cost_ratio = value,
            InputField::PayerContribution => self.payer_contribution = value,
            InputField::BaseWeight => self.base_weight_override = Some(value),
            InputField::TierCoefficient => self.tier_coefficient = value,
            InputField::PointValue => self.point_value = value,
        }
    }
}

/// All computed outputs of a single calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcOutput {
    pub request: CalcRequest,
    pub resolution: WeightResolution,
    pub inputs: CostInputs,
    pub metrics: DipMetrics,
}

impl CalcOutput {
    /// Whether the base weight came from a manual override.
    pub fn weight_overridden(&self) -> bool {
        self.request.base_weight_override.is_some()
    }
}

/// Base weight the request would use, without running the engine.
pub fn effective_base_weight(catalogs: &CatalogSet, request: &CalcRequest) -> (WeightResolution, f64) {
    let resolution = resolve_base_weight(&catalogs.dip, &request.diagnosis, &request.procedure);
    let base_weight = request
        .base_weight_override
        .unwrap_or_else(|| resolution.base_weight());
    (resolution, base_weight)
}

/// Execute one calculation against the given catalogs.
pub fn run_calc(catalogs: &CatalogSet, request: &CalcRequest) -> Result<CalcOutput, AppError> {
    // 1) Resolve base weight (catalog match, fallback, or manual override).
    let (resolution, base_weight) = effective_base_weight(catalogs, request);

    // 2) Build engine inputs and derive metrics.
    let inputs = request.to_inputs(base_weight);
    let metrics = crate::engine::compute(&inputs)?;

    Ok(CalcOutput {
        request: request.clone(),
        resolution,
        inputs,
        metrics,
    })
}
