//! Built-in catalogs used until the user imports their own.

use super::{DiagnosisRow, DipWeightRow, ProcedureRow};
use crate::domain::NONE_LABEL;

/// Default DIP weight groups.
pub fn dip_rows() -> Vec<DipWeightRow> {
    // (seq, dip code, dip name, group type, diagnosis code, diagnosis name,
    //  procedure code, procedure name, case count, base weight)
    let rows = [
        (1, "B11.0S001", "高血压病-手术组01", "核心病种", "I10", "特发性高血压", NONE_LABEL, NONE_LABEL, 1000, 15.5000),
        (2, "C12.0T001", "糖尿病-治疗组01", "核心病种", "E11.9", "2型糖尿病", NONE_LABEL, NONE_LABEL, 800, 12.3000),
        (3, "D13.0S001", "冠心病-手术组01", "核心病种", "I25.1", "动脉粥样硬化性心脏病", "36.06", "冠状动脉搭桥术", 500, 45.2000),
        (
            4,
            "H25.0S002",
            "老年性初期白内障-手术组02",
            "基层病种",
            "H25.0",
            "老年性初期白内障",
            "13.4100x001",
            "白内障超声乳化抽吸术",
            7568,
            78.0521,
        ),
    ];

    rows.into_iter()
        .map(
            |(seq, dip_code, dip_name, group_type, dx_code, dx_name, proc_code, proc_name, cases, weight)| DipWeightRow {
                seq: Some(seq.to_string()),
                dip_code: Some(dip_code.to_string()),
                dip_name: Some(dip_name.to_string()),
                group_type: Some(group_type.to_string()),
                diagnosis_code: dx_code.to_string(),
                diagnosis_name: dx_name.to_string(),
                procedure_code: proc_code.to_string(),
                procedure_name: proc_name.to_string(),
                case_count: Some(cases.to_string()),
                base_weight: weight,
                extra: Vec::new(),
            },
        )
        .collect()
}

/// Default procedure classification.
pub fn procedure_rows() -> Vec<ProcedureRow> {
    [
        ("13.4100x001", "白内障超声乳化抽吸术", "手术"),
        ("36.06", "冠状动脉搭桥术", "手术"),
        ("54.11", "腹腔镜胆囊切除术", "手术"),
        ("88.01", "胸部X线检查", "诊断性操作"),
    ]
    .into_iter()
    .map(|(code, name, category)| ProcedureRow {
        code: code.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        extra: Vec::new(),
    })
    .collect()
}

/// Default diagnosis codes.
pub fn diagnosis_rows() -> Vec<DiagnosisRow> {
    [
        ("I10", "特发性高血压"),
        ("I10.x00", "特发性高血压"),
        ("I11.900", "高血压性心脏病"),
        ("I20.000", "不稳定型心绞痛"),
        ("I21.900", "急性心肌梗死"),
        ("J18.900", "肺炎"),
        ("J44.900", "慢性阻塞性肺病"),
        ("K35.900", "急性阑尾炎"),
        ("N17.900", "急性肾衰竭"),
        ("R50.900", "发热"),
        ("E11.9", "2型糖尿病"),
        ("I25.1", "动脉粥样硬化性心脏病"),
        ("H25.0", "老年性初期白内障"),
    ]
    .into_iter()
    .map(|(code, name)| DiagnosisRow {
        code: code.to_string(),
        name: name.to_string(),
        extra: Vec::new(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sizes() {
        assert_eq!(dip_rows().len(), 4);
        assert_eq!(procedure_rows().len(), 4);
        assert_eq!(diagnosis_rows().len(), 13);
    }

    #[test]
    fn fallback_weight_is_not_a_catalog_weight() {
        let fallback = crate::domain::FALLBACK_BASE_WEIGHT;
        assert!(dip_rows().iter().all(|r| r.base_weight != fallback));
    }
}
