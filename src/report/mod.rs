//! Reporting utilities: summary cards, chart series and the detail table.
//!
//! Everything here is derived from a `CalcOutput`; the CLI prints it as text
//! (`format`), the TUI renders the same values as widgets.

use crate::domain::{CostInputs, DipMetrics};

pub mod format;

pub use format::*;

/// One headline card: title, formatted value and a short delta tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: &'static str,
    pub value: String,
    pub delta: String,
    /// Whether the card reads as favourable (drives colouring).
    pub positive: bool,
}

/// The three headline cards: true profit/loss, settlement rate, net profit/loss.
pub fn summary_cards(metrics: &DipMetrics) -> [Card; 3] {
    [
        Card {
            title: "病例真实盈亏金额",
            value: fmt_currency(metrics.true_profit_loss),
            delta: profit_label(metrics.true_profit_loss).to_string(),
            positive: metrics.true_profit_loss >= 0.0,
        },
        Card {
            title: "DIP回款率",
            value: fmt_rate(metrics.settlement_rate),
            delta: rate_delta(metrics.settlement_rate),
            positive: metrics.settlement_rate >= 1.0,
        },
        Card {
            title: "DIP盈亏金额",
            value: fmt_currency(metrics.net_profit_loss),
            delta: profit_label(metrics.net_profit_loss).to_string(),
            positive: metrics.net_profit_loss >= 0.0,
        },
    ]
}

/// A labelled detail-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// The ten-row detail table, in display order.
pub fn detail_rows(metrics: &DipMetrics) -> Vec<DetailRow> {
    let money = |label, v| DetailRow {
        label,
        value: fmt_currency(v),
    };
    vec![
        money("住院总费用", metrics.total_cost),
        money("医疗性收入", metrics.medical_income),
        money("药耗收入", metrics.drug_material_income),
        money("治疗成本", metrics.treatment_cost),
        money("病人自付金额", metrics.patient_out_of_pocket),
        money("DIP支付标准", metrics.payment_standard),
        money("DIP核算金额", metrics.settlement_amount),
        money("病例真实盈亏金额", metrics.true_profit_loss),
        money("DIP盈亏金额", metrics.net_profit_loss),
        DetailRow {
            label: "DIP回款率",
            value: fmt_rate(metrics.settlement_rate),
        },
    ]
}

/// One bar of a chart. `share` is the fraction of the series total, when meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: f64,
    pub share: Option<f64>,
}

/// Cost structure: the four fee components and their share of total cost.
pub fn cost_structure(inputs: &CostInputs) -> Vec<ChartBar> {
    let parts = [
        ("诊疗费用", inputs.treatment_fee),
        ("检查检验费用", inputs.exam_fee),
        ("药品费用", inputs.drug_fee),
        ("耗材费用", inputs.material_fee),
    ];
    let total: f64 = parts.iter().map(|(_, v)| v).sum();
    parts
        .into_iter()
        .map(|(label, value)| ChartBar {
            label,
            value,
            share: (total > 0.0).then(|| value / total),
        })
        .collect()
}

/// Standard vs cost vs settlement vs fund payment.
pub fn comparison(inputs: &CostInputs, metrics: &DipMetrics) -> Vec<ChartBar> {
    [
        ("DIP支付标准", metrics.payment_standard),
        ("治疗成本", metrics.treatment_cost),
        ("DIP核算金额", metrics.settlement_amount),
        ("统筹基金支付", inputs.payer_contribution),
    ]
    .into_iter()
    .map(|(label, value)| ChartBar {
        label,
        value,
        share: None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FALLBACK_BASE_WEIGHT;

    fn sample() -> (CostInputs, DipMetrics) {
        let inputs = CostInputs {
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
        };
        let metrics = crate::engine::compute(&inputs).unwrap();
        (inputs, metrics)
    }

    #[test]
    fn cards_for_a_losing_case() {
        let (_, metrics) = sample();
        let cards = summary_cards(&metrics);

        assert_eq!(cards[0].value, "¥-6,652.39");
        assert_eq!(cards[0].delta, "亏损");
        assert!(!cards[0].positive);

        assert_eq!(cards[1].value, "0.00%");
        assert_eq!(cards[1].delta, "0%");

        assert_eq!(cards[2].value, "¥-7,657.03");
        assert_eq!(cards[2].delta, "亏损");
    }

    #[test]
    fn rate_card_delta_is_relative_to_full_repayment() {
        let metrics = DipMetrics {
            settlement_rate: 1.25,
            ..sample().1
        };
        let cards = summary_cards(&metrics);
        assert_eq!(cards[1].value, "125.00%");
        assert_eq!(cards[1].delta, "25.0%");
        assert!(cards[1].positive);
    }

    #[test]
    fn detail_table_has_ten_rows_in_order() {
        let (_, metrics) = sample();
        let rows = detail_rows(&metrics);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].label, "住院总费用");
        assert_eq!(rows[0].value, "¥12,402.27");
        assert_eq!(rows[4].value, "¥4,745.24");
        assert_eq!(rows[6].value, "¥0.00");
        assert_eq!(rows[9].label, "DIP回款率");
        assert_eq!(rows[9].value, "0.00%");
    }

    #[test]
    fn cost_shares_sum_to_one() {
        let (inputs, _) = sample();
        let bars = cost_structure(&inputs);
        assert_eq!(bars.len(), 4);
        let total: f64 = bars.iter().filter_map(|b| b.share).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_costs_have_no_shares() {
        let (inputs, _) = sample();
        let zero = CostInputs {
            treatment_fee: 0.0,
            exam_fee: 0.0,
            drug_fee: 0.0,
            material_fee: 0.0,
            ..inputs
        };
        assert!(cost_structure(&zero).iter().all(|b| b.share.is_none()));
    }

    #[test]
    fn comparison_uses_payer_contribution() {
        let (inputs, metrics) = sample();
        let bars = comparison(&inputs, &metrics);
        assert_eq!(bars[3].label, "统筹基金支付");
        assert_eq!(bars[3].value, 7657.03);
        assert_eq!(bars[2].value, 0.0);
    }
}
