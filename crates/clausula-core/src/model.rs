//! Contract and addition records as returned by the contract endpoints.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::UnknownAdditionKind;
use crate::lenient::Fields;

/// A contract as stored upstream. Every field is optional.
///
/// Deserialisation is lenient: wrongly typed values become `None` (or an
/// empty list) instead of failing the record, and camelCase spellings are
/// accepted next to the snake_case ones. When a payload carries several
/// spellings of one field, the snake_case one is tried first and the first
/// decodable value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractRecord {
    pub id: Option<String>,
    pub contract_number: Option<String>,
    pub contractor_name: Option<String>,
    pub contractor_id_type: Option<String>,
    pub contractor_id_number: Option<String>,
    pub contractor_email: Option<String>,
    /// Contract object: what is being contracted.
    pub object: Option<String>,
    /// Value in pesos.
    pub value: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub obligations: Vec<String>,
    pub deliverables: Vec<String>,
    pub execution_place: Option<String>,
    pub payment_method: Option<String>,
    pub supervisor_name: Option<String>,
    /// Legal representative signing for the contracting entity.
    pub signatory_name: Option<String>,
    /// Budget availability certificate numbers.
    pub budget_certificates: Vec<String>,
    pub signed_on: Option<NaiveDate>,
}

impl<'de> Deserialize<'de> for ContractRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let f = Fields::new(&map);
        Ok(Self {
            id: f.text(&["id"]),
            contract_number: f.text(&["contract_number", "contractNumber"]),
            contractor_name: f.text(&["contractor_name", "contractorName"]),
            contractor_id_type: f.text(&["contractor_id_type", "contractorIdType"]),
            contractor_id_number: f.text(&["contractor_id_number", "contractorIdNumber"]),
            contractor_email: f.text(&["contractor_email", "contractorEmail", "email"]),
            object: f.text(&["object"]),
            value: f.amount(&["value"]),
            start_date: f.date(&["start_date", "startDate"]),
            end_date: f.date(&["end_date", "endDate"]),
            obligations: f.list(&["obligations"]),
            deliverables: f.list(&["deliverables"]),
            execution_place: f.text(&["execution_place", "executionPlace"]),
            payment_method: f.text(&["payment_method", "paymentMethod"]),
            supervisor_name: f.text(&["supervisor_name", "supervisorName"]),
            signatory_name: f.text(&["signatory_name", "signatoryName"]),
            budget_certificates: f.list(&["budget_certificates", "budgetCertificates"]),
            signed_on: f.date(&["signed_on", "signedOn"]),
        })
    }
}

/// The fixed set of modification events that can be recorded against a
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionKind {
    Extension,
    MonetaryAddition,
    Modification,
    ScopeChange,
    Suspension,
    Restart,
    Assignment,
    BilateralSettlement,
    UnilateralSettlement,
}

impl AdditionKind {
    pub const ALL: [AdditionKind; 9] = [
        AdditionKind::Extension,
        AdditionKind::MonetaryAddition,
        AdditionKind::Modification,
        AdditionKind::ScopeChange,
        AdditionKind::Suspension,
        AdditionKind::Restart,
        AdditionKind::Assignment,
        AdditionKind::BilateralSettlement,
        AdditionKind::UnilateralSettlement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdditionKind::Extension => "extension",
            AdditionKind::MonetaryAddition => "monetary_addition",
            AdditionKind::Modification => "modification",
            AdditionKind::ScopeChange => "scope_change",
            AdditionKind::Suspension => "suspension",
            AdditionKind::Restart => "restart",
            AdditionKind::Assignment => "assignment",
            AdditionKind::BilateralSettlement => "bilateral_settlement",
            AdditionKind::UnilateralSettlement => "unilateral_settlement",
        }
    }

    /// Spanish display label.
    pub fn label(self) -> &'static str {
        match self {
            AdditionKind::Extension => "Prórroga",
            AdditionKind::MonetaryAddition => "Adición",
            AdditionKind::Modification => "Modificación",
            AdditionKind::ScopeChange => "Cambio de alcance",
            AdditionKind::Suspension => "Suspensión",
            AdditionKind::Restart => "Reinicio",
            AdditionKind::Assignment => "Cesión",
            AdditionKind::BilateralSettlement => "Liquidación bilateral",
            AdditionKind::UnilateralSettlement => "Liquidación unilateral",
        }
    }

    /// Kinds drawn as markers on the progress timeline.
    pub fn is_milestone(self) -> bool {
        matches!(
            self,
            AdditionKind::Extension
                | AdditionKind::MonetaryAddition
                | AdditionKind::BilateralSettlement
                | AdditionKind::UnilateralSettlement
        )
    }
}

impl fmt::Display for AdditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the snake-case tag or the Spanish label, ignoring case, accents,
/// and the choice of space, hyphen or underscore.
impl FromStr for AdditionKind {
    type Err = UnknownAdditionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = fold(s);
        AdditionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key || fold(kind.label()) == key)
            .ok_or_else(|| UnknownAdditionKind(s.to_string()))
    }
}

fn fold(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            ' ' | '-' => '_',
            c => c,
        })
        .collect()
}

/// Kind-specific data carried by an addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdditionPayload {
    Extension {
        days: Option<i64>,
    },
    MonetaryAddition {
        amount: Option<u64>,
    },
    #[default]
    None,
}

/// A modification event recorded against a contract.
///
/// On the wire the record is flat (`type`, `days`, `amount`, ...); the payload
/// is assembled from the fields that matter for its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "RawAddition")]
pub struct AdditionRecord {
    pub id: Option<String>,
    pub contract_id: Option<String>,
    pub kind: Option<AdditionKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub justification: Option<String>,
    pub payload: AdditionPayload,
}

impl AdditionRecord {
    pub fn new(kind: AdditionKind, start_date: NaiveDate) -> Self {
        Self {
            kind: Some(kind),
            start_date: Some(start_date),
            ..Self::default()
        }
    }

    pub fn extension(start_date: NaiveDate, days: i64) -> Self {
        Self {
            payload: AdditionPayload::Extension { days: Some(days) },
            ..Self::new(AdditionKind::Extension, start_date)
        }
    }

    pub fn monetary(start_date: NaiveDate, amount: u64) -> Self {
        Self {
            payload: AdditionPayload::MonetaryAddition {
                amount: Some(amount),
            },
            ..Self::new(AdditionKind::MonetaryAddition, start_date)
        }
    }

    /// Days added by an extension; zero for other kinds, missing counts, and
    /// negative counts.
    pub fn extension_days(&self) -> i64 {
        match self.payload {
            AdditionPayload::Extension { days } => days.unwrap_or(0).max(0),
            _ => 0,
        }
    }

    /// Pesos added by a monetary addition; zero otherwise.
    pub fn added_amount(&self) -> u64 {
        match self.payload {
            AdditionPayload::MonetaryAddition { amount } => amount.unwrap_or(0),
            _ => 0,
        }
    }
}

impl<'de> Deserialize<'de> for AdditionRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let f = Fields::new(&map);
        Ok(RawAddition {
            id: f.text(&["id"]),
            contract_id: f.text(&["contract_id", "contractId"]),
            kind: f.addition_kind(&["type", "kind", "tipo"]),
            start_date: f.date(&["start_date", "startDate"]),
            end_date: f.date(&["end_date", "endDate"]),
            justification: f.text(&["justification"]),
            days: f.days(&["days", "dias"]),
            amount: f.amount(&["amount", "valor", "value"]),
        }
        .into())
    }
}

/// Flat wire form of an addition.
#[derive(Debug, Clone, Default, Serialize)]
struct RawAddition {
    id: Option<String>,
    contract_id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<AdditionKind>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<u64>,
}

impl From<RawAddition> for AdditionRecord {
    fn from(raw: RawAddition) -> Self {
        let payload = match raw.kind {
            Some(AdditionKind::Extension) => AdditionPayload::Extension { days: raw.days },
            Some(AdditionKind::MonetaryAddition) => {
                AdditionPayload::MonetaryAddition { amount: raw.amount }
            }
            _ => AdditionPayload::None,
        };
        Self {
            id: raw.id,
            contract_id: raw.contract_id,
            kind: raw.kind,
            start_date: raw.start_date,
            end_date: raw.end_date,
            justification: raw.justification,
            payload,
        }
    }
}

impl From<AdditionRecord> for RawAddition {
    fn from(record: AdditionRecord) -> Self {
        let (days, amount) = match record.payload {
            AdditionPayload::Extension { days } => (days, None),
            AdditionPayload::MonetaryAddition { amount } => (None, amount),
            AdditionPayload::None => (None, None),
        };
        Self {
            id: record.id,
            contract_id: record.contract_id,
            kind: record.kind,
            start_date: record.start_date,
            end_date: record.end_date,
            justification: record.justification,
            days,
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn contract_from_mixed_encodings() {
        let record: ContractRecord = serde_json::from_value(json!({
            "id": 42,
            "contractorName": "  María Pérez ",
            "contractor_id_number": 1032456789,
            "value": "$ 12.000.000",
            "startDate": "2024-02-01T00:00:00Z",
            "end_date": "30/11/2024",
            "obligations": "{\"Presentar informes\",\"Asistir a reuniones\"}",
            "deliverables": ["Informe final"],
            "budgetCertificates": "{124,587}",
            "payment_method": null,
            "execution_place": ""
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("42"));
        assert_eq!(record.contractor_name.as_deref(), Some("María Pérez"));
        assert_eq!(record.contractor_id_number.as_deref(), Some("1032456789"));
        assert_eq!(record.value, Some(12_000_000));
        assert_eq!(record.start_date, Some(date(2024, 2, 1)));
        assert_eq!(record.end_date, Some(date(2024, 11, 30)));
        assert_eq!(
            record.obligations,
            vec!["Presentar informes", "Asistir a reuniones"]
        );
        assert_eq!(record.deliverables, vec!["Informe final"]);
        assert_eq!(record.budget_certificates, vec!["124", "587"]);
        assert!(record.payment_method.is_none());
        assert!(record.execution_place.is_none());
    }

    #[test]
    fn wrongly_typed_fields_degrade_to_absent() {
        let record: ContractRecord = serde_json::from_value(json!({
            "value": {"amount": 5},
            "start_date": 20240101,
            "end_date": "pronto",
            "obligations": 17,
            "object": ["no", "texto"]
        }))
        .unwrap();
        assert_eq!(record, ContractRecord::default());
    }

    #[test]
    fn empty_object_is_default() {
        let record: ContractRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, ContractRecord::default());
    }

    #[test]
    fn duplicate_spellings_do_not_fail_the_record() {
        let record: ContractRecord = serde_json::from_value(json!({
            "contractor_email": "ana@correo.co",
            "email": "otra@correo.co",
            "startDate": "2024-03-01",
            "start_date": "2024-02-01",
            "endDate": "2024-12-31",
            "end_date": "sin fecha",
            "budget_certificates": [],
            "budgetCertificates": "{124}"
        }))
        .unwrap();
        assert_eq!(record.contractor_email.as_deref(), Some("ana@correo.co"));
        assert_eq!(record.start_date, Some(date(2024, 2, 1)));
        assert_eq!(record.end_date, Some(date(2024, 12, 31)));
        assert_eq!(record.budget_certificates, vec!["124"]);

        let addition: AdditionRecord = serde_json::from_value(json!({
            "type": "prorroga",
            "tipo": "adicion",
            "days": 15,
            "dias": 40,
            "contract_id": "7",
            "contractId": "8"
        }))
        .unwrap();
        assert_eq!(addition.kind, Some(AdditionKind::Extension));
        assert_eq!(addition.extension_days(), 15);
        assert_eq!(addition.contract_id.as_deref(), Some("7"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(serde_json::from_value::<ContractRecord>(json!([1, 2])).is_err());
        assert!(serde_json::from_value::<AdditionRecord>(json!("prorroga")).is_err());
    }

    #[test]
    fn addition_kind_parses_tags_and_labels() {
        assert_eq!("extension".parse(), Ok(AdditionKind::Extension));
        assert_eq!("Prórroga".parse(), Ok(AdditionKind::Extension));
        assert_eq!("PRORROGA".parse(), Ok(AdditionKind::Extension));
        assert_eq!("monetary-addition".parse(), Ok(AdditionKind::MonetaryAddition));
        assert_eq!("Adición".parse(), Ok(AdditionKind::MonetaryAddition));
        assert_eq!("cambio de alcance".parse(), Ok(AdditionKind::ScopeChange));
        assert_eq!(
            "Liquidación Unilateral".parse(),
            Ok(AdditionKind::UnilateralSettlement)
        );
        assert_eq!(
            "renegociación".parse::<AdditionKind>(),
            Err(UnknownAdditionKind("renegociación".into()))
        );
        assert!("liquidacion".parse::<AdditionKind>().is_err());
        assert!("addition".parse::<AdditionKind>().is_err());
    }

    #[test]
    fn every_kind_round_trips_through_its_tag_and_label() {
        for kind in AdditionKind::ALL {
            assert_eq!(kind.as_str().parse(), Ok(kind));
            assert_eq!(kind.label().parse(), Ok(kind));
        }
    }

    #[test]
    fn milestone_subset() {
        let milestones: Vec<_> = AdditionKind::ALL
            .into_iter()
            .filter(|k| k.is_milestone())
            .collect();
        assert_eq!(
            milestones,
            vec![
                AdditionKind::Extension,
                AdditionKind::MonetaryAddition,
                AdditionKind::BilateralSettlement,
                AdditionKind::UnilateralSettlement,
            ]
        );
    }

    #[test]
    fn addition_payload_follows_kind() {
        let additions: Vec<AdditionRecord> = serde_json::from_value(json!([
            {"type": "prorroga", "contractId": "7", "start_date": "2024-06-01", "days": "30"},
            {"tipo": "adicion", "startDate": "2024-06-15", "valor": 2500000},
            {"type": "suspension", "start_date": "2024-07-01", "days": 10},
            {"type": "desconocido", "days": 99}
        ]))
        .unwrap();

        assert_eq!(additions[0].kind, Some(AdditionKind::Extension));
        assert_eq!(additions[0].contract_id.as_deref(), Some("7"));
        assert_eq!(additions[0].extension_days(), 30);
        assert_eq!(additions[1].added_amount(), 2_500_000);
        assert_eq!(additions[1].extension_days(), 0);
        assert_eq!(additions[2].payload, AdditionPayload::None);
        assert_eq!(additions[2].extension_days(), 0);
        assert_eq!(additions[3].kind, None);
    }

    #[test]
    fn missing_or_negative_extension_days_count_as_zero() {
        let start = date(2024, 1, 1);
        let mut missing = AdditionRecord::new(AdditionKind::Extension, start);
        missing.payload = AdditionPayload::Extension { days: None };
        assert_eq!(missing.extension_days(), 0);
        assert_eq!(AdditionRecord::extension(start, -5).extension_days(), 0);
        assert_eq!(AdditionRecord::extension(start, 12).extension_days(), 12);
    }

    #[test]
    fn addition_serialises_flat() {
        let record = AdditionRecord::extension(date(2024, 6, 1), 30);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "extension");
        assert_eq!(value["days"], 30);
        assert_eq!(value["start_date"], "2024-06-01");
        let back: AdditionRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
