//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine and catalog code stay free of presentation concerns
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::CalcOutput;

use super::{comparison, cost_structure, detail_rows, summary_cards};

/// Widest cell shown in catalog tables (display columns).
const MAX_CELL_WIDTH: usize = 28;

/// `¥` + thousands separators + two decimals; negatives as `¥-1,234.50`.
pub fn fmt_currency(v: f64) -> String {
    fmt_currency_with(v, 2)
}

/// Currency with a custom number of decimals.
pub fn fmt_currency_with(v: f64, decimals: usize) -> String {
    let digits = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    let sign = if v < 0.0 && !is_zero { "-" } else { "" };

    let mut out = format!("¥{sign}{}", group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fraction as a percentage with two decimals (`0.1234` → `12.34%`).
pub fn fmt_rate(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// Settlement-rate delta against full repayment; `0%` when the rate is zero.
pub fn rate_delta(rate: f64) -> String {
    if rate != 0.0 {
        format!("{:.1}%", rate * 100.0 - 100.0)
    } else {
        "0%".to_string()
    }
}

pub fn profit_label(v: f64) -> &'static str {
    if v >= 0.0 { "盈利" } else { "亏损" }
}

/// Full `dip calc` report: case header, cards, optional charts, detail table.
pub fn format_report(output: &CalcOutput, chart_width: usize, plot: bool) -> String {
    let request = &output.request;
    let mut out = String::new();

    out.push_str("=== dip - DIP case calculator ===\n");
    out.push_str(&format!("诊断: {}\n", request.diagnosis.label()));
    out.push_str(&format!("操作: {}\n", request.procedure.label()));
    out.push_str(&format!(
        "医保类型: {} | 点值: {:.4} | 医院等级系数: {:.4}\n",
        request.pool.display_name(),
        request.point_value,
        request.tier_coefficient
    ));

    let weight_source = if output.weight_overridden() {
        "manual override".to_string()
    } else {
        output.resolution.describe()
    };
    out.push_str(&format!(
        "基准分值: {:.4} ({weight_source}) | DIP分值: {:.4}\n",
        output.inputs.base_weight, output.metrics.effective_weight
    ));
    out.push('\n');

    for card in summary_cards(&output.metrics) {
        out.push_str(&format!(
            "{}  {}  [{}]\n",
            pad_display(card.title, 16),
            card.value,
            card.delta
        ));
    }
    out.push('\n');

    if plot {
        out.push_str(&crate::plot::render_bar_chart(
            "费用结构分布",
            &cost_structure(&output.inputs),
            chart_width,
            8,
        ));
        out.push('\n');
        out.push_str(&crate::plot::render_bar_chart(
            "费用对比分析",
            &comparison(&output.inputs, &output.metrics),
            chart_width,
            8,
        ));
        out.push('\n');
    }

    out.push_str("详细计算结果:\n");
    let rows: Vec<Vec<String>> = detail_rows(&output.metrics)
        .into_iter()
        .map(|r| vec![r.label.to_string(), r.value])
        .collect();
    out.push_str(&format_table(&["项目".to_string(), "金额/比率".to_string()], &rows));

    out
}

/// Titled catalog table.
pub fn format_catalog(title: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = format!("{title} ({} rows)\n", rows.len());
    out.push_str(&format_table(headers, rows));
    out
}

/// Numbered option list, as printed by `dip options`.
pub fn format_options(title: &str, options: &[String]) -> String {
    let mut out = format!("{title}:\n");
    if options.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, option) in options.iter().enumerate() {
        out.push_str(&format!("{:>3}. {option}\n", i + 1));
    }
    out
}

/// Left-aligned text table sized by display width (CJK counts double).
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let w = display_width(cell).min(MAX_CELL_WIDTH);
            match widths.get_mut(i) {
                Some(slot) => *slot = (*slot).max(w),
                None => widths.push(w),
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format_line(headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_line(&rule, &widths));
    for row in rows {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let parts: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            pad_display(&truncate_display(cell, *w), *w)
        })
        .collect();
    let mut line = parts.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

/// Terminal display width: East Asian wide characters take two columns.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
    )
}

/// Right-pad to `width` display columns.
pub fn pad_display(s: &str, width: usize) -> String {
    let w = display_width(s);
    let mut out = s.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(w)));
    out
}

/// Cut to at most `max` display columns, marking the cut with `.`.
pub fn truncate_display(s: &str, max: usize) -> String {
    if display_width(s) <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = if is_wide(ch) { 2 } else { 1 };
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{CalcRequest, run_calc};
    use crate::catalog::CatalogSet;

    #[test]
    fn currency_formatting() {
        assert_eq!(fmt_currency(0.0), "¥0.00");
        assert_eq!(fmt_currency(12.5), "¥12.50");
        assert_eq!(fmt_currency(1234.5), "¥1,234.50");
        assert_eq!(fmt_currency(-1234.5), "¥-1,234.50");
        assert_eq!(fmt_currency(1234567.891), "¥1,234,567.89");
        assert_eq!(fmt_currency(-0.001), "¥0.00");
        assert_eq!(fmt_currency_with(2107.34, 0), "¥2,107");
    }

    #[test]
    fn rate_and_label_formatting() {
        assert_eq!(fmt_rate(0.1234), "12.34%");
        assert_eq!(fmt_rate(0.0), "0.00%");
        assert_eq!(rate_delta(0.0), "0%");
        assert_eq!(rate_delta(0.8), "-20.0%");
        assert_eq!(profit_label(0.0), "盈利");
        assert_eq!(profit_label(-0.01), "亏损");
    }

    #[test]
    fn display_width_counts_cjk_double() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("诊断"), 4);
        assert_eq!(display_width("¥1,234"), 6);
        assert_eq!(pad_display("诊断", 6), "诊断  ");
        assert_eq!(truncate_display("冠状动脉搭桥术", 7), "冠状动.");
    }

    #[test]
    fn table_aligns_columns() {
        let headers = vec!["项目".to_string(), "值".to_string()];
        let rows = vec![
            vec!["住院总费用".to_string(), "¥1.00".to_string()],
            vec!["a".to_string(), "b".to_string()],
        ];
        let txt = format_table(&headers, &rows);
        let expected = concat!(
            "项目        值\n",
            "----------  -----\n",
            "住院总费用  ¥1.00\n",
            "a           b\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn report_mentions_fallback_and_cards() {
        let out = run_calc(&CatalogSet::default(), &CalcRequest::default()).unwrap();
        let txt = format_report(&out, 40, false);
        assert!(txt.contains("诊断: 请选择..."));
        assert!(txt.contains("no selection; default base weight 27.7173"));
        assert!(txt.contains("¥-6,652.39"));
        assert!(txt.contains("DIP回款率"));
        assert!(!txt.contains("费用结构分布"));
    }

    #[test]
    fn options_list_is_numbered() {
        let txt = format_options("诊断", &["肺炎".to_string()]);
        assert_eq!(txt, "诊断:\n  1. 肺炎\n");
        assert_eq!(format_options("操作", &[]), "操作:\n  (none)\n");
    }
}
