//! ASCII bar charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Bars are drawn with `#` above (or below) a `-` zero baseline and tagged
//! with letters; the legend under the grid maps each letter to its label,
//! amount and share.

use crate::report::{ChartBar, fmt_currency, fmt_rate};

/// Render a vertical bar chart with a legend.
pub fn render_bar_chart(title: &str, bars: &[ChartBar], width: usize, height: usize) -> String {
    let mut out = format!("{title}\n");
    if bars.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let width = width.max(10);
    let height = height.max(5);
    let slot = (width / bars.len()).max(2);
    let grid_width = slot * bars.len();

    let (lo, hi) = value_range(bars);
    let zero_row = map_y(0.0, lo, hi, height);

    let mut grid = vec![vec![' '; grid_width]; height];

    for (i, bar) in bars.iter().enumerate() {
        if bar.value == 0.0 || !bar.value.is_finite() {
            continue;
        }
        let top = map_y(bar.value, lo, hi, height);
        let (from, to) = if top <= zero_row { (top, zero_row) } else { (zero_row, top) };
        let x0 = slot * i;
        for row in grid.iter_mut().take(to + 1).skip(from) {
            for cell in row.iter_mut().skip(x0).take(slot - 1) {
                *cell = '#';
            }
        }
    }

    for cell in grid[zero_row].iter_mut() {
        if *cell == ' ' {
            *cell = '-';
        }
    }

    for row in grid {
        let line: String = row.into_iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let mut tags = vec![' '; grid_width];
    for (i, tag) in bar_tags(bars.len()).enumerate() {
        tags[slot * i] = tag;
    }
    out.push_str(tags.into_iter().collect::<String>().trim_end());
    out.push('\n');

    for (bar, tag) in bars.iter().zip(bar_tags(bars.len())) {
        let mut line = format!("{tag}  {}  {}", bar.label, fmt_currency(bar.value));
        if let Some(share) = bar.share {
            line.push_str(&format!("  ({})", fmt_rate(share)));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn bar_tags(n: usize) -> impl Iterator<Item = char> {
    ('A'..='Z').take(n)
}

/// Value range always including zero, so the baseline is on the grid.
fn value_range(bars: &[ChartBar]) -> (f64, f64) {
    let mut lo: f64 = 0.0;
    let mut hi: f64 = 0.0;
    for bar in bars.iter().filter(|b| b.value.is_finite()) {
        lo = lo.min(bar.value);
        hi = hi.max(bar.value);
    }
    if hi > lo { (lo, hi) } else { (0.0, 1.0) }
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(label: &'static str, value: f64) -> ChartBar {
        ChartBar {
            label,
            value,
            share: None,
        }
    }

    #[test]
    fn bar_chart_golden_snapshot_small() {
        let txt = render_bar_chart("t", &[bar("x", 10.0), bar("y", 5.0)], 10, 5);
        let expected = concat!(
            "t\n",
            "####\n",
            "####\n",
            "#### ####\n",
            "#### ####\n",
            "####-####-\n",
            "A    B\n",
            "A  x  ¥10.00\n",
            "B  y  ¥5.00\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn negative_bars_hang_below_baseline() {
        let txt = render_bar_chart("t", &[bar("x", 4.0), bar("y", -4.0)], 10, 5);
        let expected = concat!(
            "t\n",
            "####\n",
            "####\n",
            "####-####-\n",
            "     ####\n",
            "     ####\n",
            "A    B\n",
            "A  x  ¥4.00\n",
            "B  y  ¥-4.00\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn zero_bars_leave_only_baseline() {
        let txt = render_bar_chart("t", &[bar("x", 0.0)], 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[5], "----------");
        assert!(lines[1..5].iter().all(|l| l.is_empty()));
    }

    #[test]
    fn shares_are_listed_in_legend() {
        let bars = [ChartBar {
            label: "药品费用",
            value: 250.0,
            share: Some(0.25),
        }];
        let txt = render_bar_chart("t", &bars, 10, 5);
        assert!(txt.contains("A  药品费用  ¥250.00  (25.00%)"));
    }

    #[test]
    fn empty_series() {
        assert_eq!(render_bar_chart("t", &[], 10, 5), "t\n(no data)\n");
    }
}
