//! Fixed-column tabular rendering of backtest metrics (§4.K), mirroring the
//! console layout used for ticket summaries: stable widths, "-" for
//! unknown/NaN.

use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};

use crate::metrics::{DualMetrics, RaceMetrics};

fn rate_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{:.3}", value)
    } else {
        "-".into()
    }
}

fn metric_row(label: &str, metrics: &RaceMetrics) -> Row {
    Row::new(
        Styles::default(),
        vec![
            label.into(),
            rate_cell(metrics.precision_at_1).into(),
            rate_cell(metrics.precision_at_3).into(),
            rate_cell(metrics.hit_rate_rank_1).into(),
            rate_cell(metrics.hit_rate_rank_2).into(),
            rate_cell(metrics.hit_rate_rank_3).into(),
            metrics.races.to_string().into(),
        ],
    )
}

/// Renders the ML-ranked and factor-ranked variants side by side, one row each.
pub fn tabulate_dual_metrics(metrics: &DualMetrics) -> Table {
    let table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Ranking".into(), "P@1".into(), "P@3".into(), "Hit@1".into(), "Hit@2".into(), "Hit@3".into(), "Races".into()],
        ))
        .with_row(metric_row("ml", &metrics.ml))
        .with_row(metric_row("factor", &metrics.factor));
    table
}

pub fn render(table: &Table) -> String {
    format!("{}", Console::default().render(table))
}
