//! Fixed-column tabular rendering for ticket summaries (§4.K): stable column
//! widths, unknown/NaN values rendered as "-".

use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

fn rate_cell(value: f64) -> String {
    if value.is_finite() {
        format!("{:.3}", value)
    } else {
        "-".into()
    }
}

fn header_row(labels: &[&str]) -> Row {
    Row::new(Styles::default().with(Header(true)), labels.iter().map(|s| (*s).into()).collect())
}

fn summary_cols() -> Vec<Col> {
    vec![
        Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Centred)),
        Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        Col::new(Styles::default().with(Separator(true)).with(MinWidth(10)).with(HAlign::Right)),
    ]
}

/// One row per ticket kind: races, hits, hit rate, investment, payout, return rate.
pub struct TicketSummaryRow {
    pub ticket_kind: &'static str,
    pub races: usize,
    pub hits: usize,
    pub hit_rate: f64,
    pub total_investment: u64,
    pub total_payout: u64,
    pub return_rate: f64,
}

pub fn tabulate_ticket_summaries(rows: &[TicketSummaryRow]) -> Table {
    let mut table = Table::default()
        .with_cols(summary_cols())
        .with_row(header_row(&["Ticket", "Races", "Hits", "Hit Rate", "Investment", "Payout", "Return"]));

    for row in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                row.ticket_kind.into(),
                row.races.to_string().into(),
                row.hits.to_string().into(),
                rate_cell(row.hit_rate).into(),
                row.total_investment.to_string().into(),
                row.total_payout.to_string().into(),
                rate_cell(row.return_rate).into(),
            ],
        ));
    }
    table
}

pub fn render(table: &Table) -> String {
    format!("{}", Console::default().render(table))
}
