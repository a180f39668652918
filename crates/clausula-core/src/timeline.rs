//! Contract progress along a normalised time axis.
//!
//! Extensions push the nominal end date out; the axis runs from the start
//! date to that adjusted end. Positions are percentages on this axis clamped
//! to `[0, 100]`.
//!
//! # Algorithm
//!
//! 1. Sum the day counts of all extension additions.
//! 2. `final_end = original_end + total_extension_days`.
//! 3. `elapsed = (as_of - start) / (final_end - start)`, clamped.
//! 4. The original end date and every milestone addition are placed on the
//!    same axis.
//! 5. A zero-length axis places everything at 0%.

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use tracing::debug;

use crate::model::{AdditionKind, AdditionPayload, AdditionRecord, ContractRecord};
use crate::numerals::format_currency;

/// Display state derived from the elapsed percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

impl ProgressState {
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 0.0 {
            ProgressState::NotStarted
        } else if percent >= 100.0 {
            ProgressState::Finished
        } else {
            ProgressState::InProgress
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressState::NotStarted => "Sin iniciar",
            ProgressState::InProgress => "En ejecución",
            ProgressState::Finished => "Finalizado",
        }
    }
}

/// A notable addition placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub kind: AdditionKind,
    pub label: String,
    pub date: NaiveDate,
    pub percent: f64,
}

/// Everything the progress view needs, derived from a contract and its
/// additions at a given date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedTimeline {
    pub start: Option<NaiveDate>,
    pub original_end: Option<NaiveDate>,
    pub final_end: Option<NaiveDate>,
    pub total_extension_days: i64,
    /// Days on the axis from start to final end.
    pub total_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    pub elapsed_percent: f64,
    pub original_end_percent: f64,
    pub milestones: Vec<Milestone>,
    /// Sum of monetary additions, in pesos.
    pub added_value: u64,
    pub state: ProgressState,
}

impl DerivedTimeline {
    /// Whether extensions moved the end date.
    pub fn is_extended(&self) -> bool {
        self.total_extension_days > 0
    }
}

/// Derive the timeline of `contract` as of `as_of`.
///
/// Additions of other contracts are not filtered here; callers pass the
/// additions that belong to `contract`.
pub fn derive_timeline(
    contract: &ContractRecord,
    additions: &[AdditionRecord],
    as_of: NaiveDate,
) -> DerivedTimeline {
    let total_extension_days: i64 = additions
        .iter()
        .filter(|a| a.kind == Some(AdditionKind::Extension))
        .map(AdditionRecord::extension_days)
        .fold(0, i64::saturating_add);
    let added_value = additions
        .iter()
        .filter(|a| a.kind == Some(AdditionKind::MonetaryAddition))
        .map(AdditionRecord::added_amount)
        .fold(0, u64::saturating_add);

    let (Some(start), Some(original_end)) = (contract.start_date, contract.end_date) else {
        debug!(
            contract = contract.id.as_deref().unwrap_or("-"),
            "contract lacks start or end date, timeline left empty"
        );
        return DerivedTimeline {
            start: contract.start_date,
            original_end: contract.end_date,
            total_extension_days,
            added_value,
            ..DerivedTimeline::default()
        };
    };

    let final_end = TimeDelta::try_days(total_extension_days)
        .and_then(|delta| original_end.checked_add_signed(delta))
        .unwrap_or(NaiveDate::MAX);
    let total_days = (final_end - start).num_days().max(0);
    let axis = Axis { start, total_days };

    let elapsed_percent = axis.position(as_of);
    let elapsed_days = (as_of - start).num_days().clamp(0, total_days);

    let mut milestones: Vec<Milestone> = additions
        .iter()
        .filter_map(|addition| {
            let kind = addition.kind.filter(|k| k.is_milestone())?;
            let date = addition.start_date?;
            Some(Milestone {
                kind,
                label: milestone_label(addition, kind),
                date,
                percent: axis.position(date),
            })
        })
        .collect();
    milestones.sort_by_key(|m| m.date);

    DerivedTimeline {
        start: Some(start),
        original_end: Some(original_end),
        final_end: Some(final_end),
        total_extension_days,
        total_days,
        elapsed_days,
        remaining_days: total_days - elapsed_days,
        elapsed_percent,
        original_end_percent: axis.position(original_end),
        milestones,
        added_value,
        state: ProgressState::from_percent(elapsed_percent),
    }
}

struct Axis {
    start: NaiveDate,
    total_days: i64,
}

impl Axis {
    fn position(&self, date: NaiveDate) -> f64 {
        if self.total_days <= 0 {
            return 0.0;
        }
        let fraction = (date - self.start).num_days() as f64 / self.total_days as f64;
        fraction.clamp(0.0, 1.0) * 100.0
    }
}

fn milestone_label(addition: &AdditionRecord, kind: AdditionKind) -> String {
    match addition.payload {
        AdditionPayload::Extension { days: Some(days) } if days > 0 => {
            let noun = if days == 1 { "día" } else { "días" };
            format!("{} ({days} {noun})", kind.label())
        }
        AdditionPayload::MonetaryAddition {
            amount: Some(amount),
        } => format!("{} ({})", kind.label(), format_currency(Some(amount))),
        _ => kind.label().to_string(),
    }
}
