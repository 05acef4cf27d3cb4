//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between the CLI, the TUI and the calculation pipeline
//! - exported to JSON snapshots
//! - reloaded later for re-rendering a report

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Base weight used when no catalog row matches the current selection.
///
/// This is the tool's bootstrap default, not a catalog fact.
pub const FALLBACK_BASE_WEIGHT: f64 = 27.7173;

/// Label substituted for blank catalog cells and used for "no procedure".
pub const NONE_LABEL: &str = "无";

/// Point value preset for the resident insurance pool.
pub const RESIDENT_POINT_VALUE: f64 = 63.3253;

/// Point value preset for the employee insurance pool.
pub const EMPLOYEE_POINT_VALUE: f64 = 73.6011;

/// Insurance pool; selects the default point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InsurancePool {
    /// Urban and rural resident basic medical insurance (居民).
    Resident,
    /// Employee basic medical insurance (职工).
    #[default]
    Employee,
}

impl InsurancePool {
    pub fn display_name(self) -> &'static str {
        match self {
            InsurancePool::Resident => "居民",
            InsurancePool::Employee => "职工",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            InsurancePool::Resident => InsurancePool::Employee,
            InsurancePool::Employee => InsurancePool::Resident,
        }
    }
}

/// The three reference catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// DIP weight catalog (diagnosis × procedure → base weight).
    Dip,
    /// Procedure catalog (code → name → category).
    Procedure,
    /// Diagnosis catalog (code → name).
    Diagnosis,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 3] = [CatalogKind::Dip, CatalogKind::Procedure, CatalogKind::Diagnosis];

    pub fn display_name(self) -> &'static str {
        match self {
            CatalogKind::Dip => "DIP catalog (DIP目录)",
            CatalogKind::Procedure => "Procedure catalog (手术操作目录)",
            CatalogKind::Diagnosis => "Diagnosis catalog (诊断目录)",
        }
    }
}

/// Names every numeric case input, for validation errors and form labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    TreatmentFee,
    ExamFee,
    DrugFee,
    MaterialFee,
    MedicalIncomeCostRatio,
    DrugMaterialCostRatio,
    PayerContribution,
    BaseWeight,
    TierCoefficient,
    PointValue,
}

impl InputField {
    pub const ALL: [InputField; 10] = [
        InputField::TreatmentFee,
        InputField::ExamFee,
        InputField::DrugFee,
        InputField::MaterialFee,
        InputField::MedicalIncomeCostRatio,
        InputField::DrugMaterialCostRatio,
        InputField::PayerContribution,
        InputField::BaseWeight,
        InputField::TierCoefficient,
        InputField::PointValue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InputField::TreatmentFee => "treatment_fee",
            InputField::ExamFee => "exam_fee",
            InputField::DrugFee => "drug_fee",
            InputField::MaterialFee => "material_fee",
            InputField::MedicalIncomeCostRatio => "medical_income_cost_ratio",
            InputField::DrugMaterialCostRatio => "drug_material_cost_ratio",
            InputField::PayerContribution => "payer_contribution",
            InputField::BaseWeight => "base_weight",
            InputField::TierCoefficient => "tier_coefficient",
            InputField::PointValue => "point_value",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputField::TreatmentFee => "诊疗费用",
            InputField::ExamFee => "检查检验费用",
            InputField::DrugFee => "药品费用",
            InputField::MaterialFee => "耗材费用",
            InputField::MedicalIncomeCostRatio => "医疗性收入成本率",
            InputField::DrugMaterialCostRatio => "药耗成本率",
            InputField::PayerContribution => "统筹基金支付金额",
            InputField::BaseWeight => "入组的DIP基准分值",
            InputField::TierCoefficient => "医院等级系数",
            InputField::PointValue => "点值",
        }
    }

    /// Inclusive `(min, max)` domain bound; `None` means unbounded above.
    pub fn bounds(self) -> (f64, Option<f64>) {
        match self {
            InputField::MedicalIncomeCostRatio => (0.0, Some(1.0)),
            InputField::DrugMaterialCostRatio => (0.0, Some(1.5)),
            InputField::TierCoefficient => (0.5, Some(2.0)),
            InputField::PointValue => (0.0, Some(200.0)),
            _ => (0.0, None),
        }
    }

    /// Step used by interactive adjustment.
    pub fn step(self) -> f64 {
        match self {
            InputField::MedicalIncomeCostRatio | InputField::DrugMaterialCostRatio => 0.01,
            InputField::TierCoefficient | InputField::PointValue | InputField::BaseWeight => 0.0001,
            _ => 100.0,
        }
    }

    /// Number of decimals shown in input forms.
    pub fn decimals(self) -> usize {
        match self {
            InputField::MedicalIncomeCostRatio | InputField::DrugMaterialCostRatio => 2,
            InputField::TierCoefficient | InputField::PointValue | InputField::BaseWeight => 4,
            _ => 2,
        }
    }
}

/// All inputs of a single DIP case calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub treatment_fee: f64,
    pub exam_fee: f64,
    pub drug_fee: f64,
    pub material_fee: f64,
    /// Share of (treatment + exam) income consumed as cost.
    pub medical_income_cost_ratio: f64,
    /// Share of (drug + material) income consumed as cost.
    pub drug_material_cost_ratio: f64,
    /// Amount reimbursed by the pooled fund.
    pub payer_contribution: f64,
    pub base_weight: f64,
    pub tier_coefficient: f64,
    pub point_value: f64,
}

impl CostInputs {
    pub fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::TreatmentFee => self.treatment_fee,
            InputField::ExamFee => self.exam_fee,
            InputField::DrugFee => self.drug_fee,
            InputField::MaterialFee => self.material_fee,
            InputField::MedicalIncomeCostRatio => self.medical_income_cost_ratio,
            InputField::DrugMaterialCostRatio => self.drug_material_cost_ratio,
            InputField::PayerContribution => self.payer_contribution,
            InputField::BaseWeight => self.base_weight,
            InputField::TierCoefficient => self.tier_coefficient,
            InputField::PointValue => self.point_value,
        }
    }
}

/// Derived metrics of one case. Computed fresh on every calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipMetrics {
    /// Base weight scaled by the tier coefficient (入组的DIP分值).
    pub effective_weight: f64,
    /// 住院总费用
    pub total_cost: f64,
    /// 医疗性收入
    pub medical_income: f64,
    /// 药耗收入
    pub drug_material_income: f64,
    /// 治疗成本
    pub treatment_cost: f64,
    /// 病人自付金额
    pub patient_out_of_pocket: f64,
    /// DIP支付标准
    pub payment_standard: f64,
    /// DIP核算金额, floored at zero.
    pub settlement_amount: f64,
    /// 病例真实盈亏金额
    pub true_profit_loss: f64,
    /// DIP回款率; zero when the payer contributed nothing.
    pub settlement_rate: f64,
    /// DIP盈亏金额
    pub net_profit_loss: f64,
}
