//! Terminal card for a contract's timeline.
//!
//! Renders the derived timeline grouped into sections, with an ASCII
//! progress bar marking elapsed time, the original end date and milestones.

use std::fmt::Write as _;

use clausula_core::dates::format_date_long;
use clausula_core::numerals::format_currency;
use clausula_core::{ContractRecord, DerivedTimeline};

const BAR_WIDTH: usize = 40;
const MAX_MILESTONES: usize = 10;

// ── Public API ──

/// Print a contract's timeline as a vertical card.
pub fn print_timeline_card(contract: &ContractRecord, timeline: &DerivedTimeline) {
    print!("{}", render_timeline_card(contract, timeline));
}

pub fn render_timeline_card(contract: &ContractRecord, timeline: &DerivedTimeline) -> String {
    let mut out = String::new();
    let number = contract
        .contract_number
        .as_deref()
        .or(contract.id.as_deref())
        .unwrap_or("-");

    let _ = writeln!(out, "=== Contrato {number} ===");
    if let Some(name) = &contract.contractor_name {
        let _ = writeln!(out, "{name}");
    }
    let _ = writeln!(out);

    let (Some(start), Some(original_end), Some(final_end)) =
        (timeline.start, timeline.original_end, timeline.final_end)
    else {
        let _ = writeln!(out, "  sin fechas de inicio y fin: no hay línea de tiempo");
        return out;
    };

    let _ = writeln!(out, "Plazo");
    row(&mut out, "inicio", &format_date_long(start));
    row(&mut out, "fin original", &format_date_long(original_end));
    if timeline.is_extended() {
        row(
            &mut out,
            "fin con prórrogas",
            &format!(
                "{} (+{} días)",
                format_date_long(final_end),
                timeline.total_extension_days
            ),
        );
    }
    row(
        &mut out,
        "días transcurridos",
        &format!("{} de {}", timeline.elapsed_days, timeline.total_days),
    );
    row(&mut out, "días restantes", &timeline.remaining_days.to_string());
    let _ = writeln!(out);

    let _ = writeln!(out, "Estado");
    row(&mut out, "estado", timeline.state.label());
    row(&mut out, "avance", &progress_bar(timeline, BAR_WIDTH));
    let _ = writeln!(out);

    if !timeline.milestones.is_empty() {
        let _ = writeln!(out, "Hitos ({})", timeline.milestones.len());
        for milestone in timeline.milestones.iter().take(MAX_MILESTONES) {
            let _ = writeln!(
                out,
                "  {:<30} {}  {:>5.1}%",
                milestone.label, milestone.date, milestone.percent
            );
        }
        if timeline.milestones.len() > MAX_MILESTONES {
            let _ = writeln!(
                out,
                "  ... y {} más",
                timeline.milestones.len() - MAX_MILESTONES
            );
        }
        let _ = writeln!(out);
    }

    if contract.value.is_some() || timeline.added_value > 0 {
        let _ = writeln!(out, "Valor");
        row(&mut out, "valor inicial", &format_currency(contract.value));
        if timeline.added_value > 0 {
            row(&mut out, "adiciones", &format_currency(Some(timeline.added_value)));
            let total = contract.value.unwrap_or(0).saturating_add(timeline.added_value);
            row(&mut out, "valor total", &format_currency(Some(total)));
        }
        let _ = writeln!(out);
    }

    out
}

/// `[=====|===*      ] 49.9%`: `=` elapsed, `|` original end when extended,
/// `*` milestones.
pub fn progress_bar(timeline: &DerivedTimeline, width: usize) -> String {
    let width = width.max(1);
    let cell = |percent: f64| ((percent / 100.0 * width as f64) as usize).min(width - 1);

    let filled = (timeline.elapsed_percent / 100.0 * width as f64).round() as usize;
    let mut cells = vec![' '; width];
    for c in cells.iter_mut().take(filled.min(width)) {
        *c = '=';
    }
    if timeline.is_extended() {
        cells[cell(timeline.original_end_percent)] = '|';
    }
    for milestone in &timeline.milestones {
        cells[cell(milestone.percent)] = '*';
    }

    let bar: String = cells.into_iter().collect();
    format!("[{bar}] {:.1}%", timeline.elapsed_percent)
}

// ── Helpers ──

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<26} {value}");
}
