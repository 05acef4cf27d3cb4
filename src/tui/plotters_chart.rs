//! Plotters-powered bar chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `BarChart` widget?
//! - real value axis with tick labels (including negative amounts)
//! - per-bar colours matching the legend
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::report::ChartBar;

/// Bar colours, cycled by bar index. Legends use the same order.
pub const PALETTE: [(u8, u8, u8); 4] = [(31, 119, 180), (255, 127, 14), (44, 160, 44), (214, 39, 40)];

/// Ratatui colour of the bar at `index`, for legends drawn next to the chart.
pub fn legend_color(index: usize) -> Color {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    Color::Rgb(r, g, b)
}

/// A render-only bar chart description; bounds are computed by the caller.
pub struct BarPlottersChart<'a> {
    pub bars: &'a [ChartBar],
    /// Y bounds (yuan).
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for BarPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];
        if self.bars.is_empty() || !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            return;
        }

        // Bar `i` is centred on x = i, so integer ticks land under the bars.
        let x0 = -0.5;
        let x1 = self.bars.len() as f64 - 0.5;
        let n = self.bars.len();

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(n)
                .y_labels(5)
                .x_label_formatter(&|v| bar_tag(*v, n))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart.draw_series(self.bars.iter().enumerate().map(|(i, bar)| {
                let (r, g, b) = PALETTE[i % PALETTE.len()];
                let x = i as f64;
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, bar.value)], RGBColor(r, g, b).filled())
            }))?;

            if y0 < 0.0 {
                chart.draw_series(LineSeries::new([(x0, 0.0), (x1, 0.0)], &WHITE))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Letter under bar `i` when `v` sits on its centre; blank elsewhere.
fn bar_tag(v: f64, n: usize) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 || idx as usize >= n {
        return String::new();
    }
    char::from(b'A' + (idx as u8 % 26)).to_string()
}

/// Y bounds that always include zero, padded above the largest bar.
pub fn bar_bounds(bars: &[ChartBar]) -> [f64; 2] {
    let mut lo: f64 = 0.0;
    let mut hi: f64 = 0.0;
    for bar in bars.iter().filter(|b| b.value.is_finite()) {
        lo = lo.min(bar.value);
        hi = hi.max(bar.value);
    }
    if hi <= lo {
        return [0.0, 1.0];
    }
    let pad = (hi - lo) * 0.1;
    [if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(value: f64) -> ChartBar {
        ChartBar {
            label: "x",
            value,
            share: None,
        }
    }

    #[test]
    fn bounds_start_at_zero_for_positive_series() {
        assert_eq!(bar_bounds(&[bar(50.0), bar(100.0)]), [0.0, 110.0]);
        assert_eq!(bar_bounds(&[bar(0.0)]), [0.0, 1.0]);
    }

    #[test]
    fn bounds_extend_below_zero_for_losses() {
        let [lo, hi] = bar_bounds(&[bar(-100.0), bar(100.0)]);
        assert_eq!(lo, -120.0);
        assert_eq!(hi, 120.0);
    }

    #[test]
    fn tags_only_on_bar_centres() {
        assert_eq!(bar_tag(0.0, 4), "A");
        assert_eq!(bar_tag(3.0, 4), "D");
        assert_eq!(bar_tag(0.5, 4), "");
        assert_eq!(bar_tag(4.0, 4), "");
        assert_eq!(bar_tag(-1.0, 4), "");
    }
}
