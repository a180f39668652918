//! Contract document templating.
//!
//! A template is plain text with `{{name}}` placeholders. It is scanned once
//! into literal and placeholder tokens; rendering walks the tokens and looks
//! each placeholder up on a [`ContractRecord`]. Substituted values are never
//! scanned again, so field content that happens to contain `{{` or `}}` is
//! emitted verbatim.
//!
//! Rendering is total: a field with no value renders the placeholder marker,
//! and the output records which regions were substituted.

use std::fmt::Write as _;
use std::sync::LazyLock;

use serde::Serialize;

use crate::dates::{date_in_words, duration_days, format_date_long};
use crate::error::TemplateError;
use crate::model::ContractRecord;
use crate::normalize::{enumerate_lines, enumerate_numbers};
use crate::numerals::{apocopated_words, format_amount_legal, format_currency};

/// Substituted for any field with no value.
pub const PLACEHOLDER_MARKER: &str = "__________";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

const BUILTIN_SOURCE: &str = include_str!("../templates/prestacion_servicios.txt");

static BUILTIN: LazyLock<Template> = LazyLock::new(|| Template::parse(BUILTIN_SOURCE));

/// Placeholder names understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ContractNumber,
    ContractorName,
    ContractorIdType,
    ContractorIdNumber,
    ContractorEmail,
    Object,
    Value,
    ValueFigures,
    StartDate,
    EndDate,
    Duration,
    Obligations,
    Deliverables,
    ExecutionPlace,
    PaymentMethod,
    SupervisorName,
    SignatoryName,
    BudgetCertificates,
    SignedOn,
}

impl Field {
    pub const ALL: [Field; 19] = [
        Field::ContractNumber,
        Field::ContractorName,
        Field::ContractorIdType,
        Field::ContractorIdNumber,
        Field::ContractorEmail,
        Field::Object,
        Field::Value,
        Field::ValueFigures,
        Field::StartDate,
        Field::EndDate,
        Field::Duration,
        Field::Obligations,
        Field::Deliverables,
        Field::ExecutionPlace,
        Field::PaymentMethod,
        Field::SupervisorName,
        Field::SignatoryName,
        Field::BudgetCertificates,
        Field::SignedOn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::ContractNumber => "contract_number",
            Field::ContractorName => "contractor_name",
            Field::ContractorIdType => "contractor_id_type",
            Field::ContractorIdNumber => "contractor_id_number",
            Field::ContractorEmail => "contractor_email",
            Field::Object => "object",
            Field::Value => "value",
            Field::ValueFigures => "value_figures",
            Field::StartDate => "start_date",
            Field::EndDate => "end_date",
            Field::Duration => "duration",
            Field::Obligations => "obligations",
            Field::Deliverables => "deliverables",
            Field::ExecutionPlace => "execution_place",
            Field::PaymentMethod => "payment_method",
            Field::SupervisorName => "supervisor_name",
            Field::SignatoryName => "signatory_name",
            Field::BudgetCertificates => "budget_certificates",
            Field::SignedOn => "signed_on",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }

    /// The rendered value of this field, or `None` when the record lacks it.
    pub fn resolve(self, record: &ContractRecord) -> Option<String> {
        match self {
            Field::ContractNumber => record
                .contract_number
                .clone()
                .or_else(|| record.id.clone()),
            Field::ContractorName => record.contractor_name.clone(),
            Field::ContractorIdType => record.contractor_id_type.clone(),
            Field::ContractorIdNumber => record.contractor_id_number.clone(),
            Field::ContractorEmail => record.contractor_email.clone(),
            Field::Object => record.object.clone(),
            Field::Value => record.value.map(format_amount_legal),
            Field::ValueFigures => record.value.map(|v| format_currency(Some(v))),
            Field::StartDate => record.start_date.map(format_date_long),
            Field::EndDate => record.end_date.map(format_date_long),
            Field::Duration => {
                let (start, end) = (record.start_date?, record.end_date?);
                let days = duration_days(start, end);
                (days > 0).then(|| {
                    let noun = if days == 1 { "día" } else { "días" };
                    format!("{} ({days}) {noun}", apocopated_words(days.unsigned_abs()))
                })
            }
            Field::Obligations => non_empty(&record.obligations).map(enumerate_lines),
            Field::Deliverables => non_empty(&record.deliverables).map(enumerate_lines),
            Field::ExecutionPlace => record.execution_place.clone(),
            Field::PaymentMethod => record.payment_method.clone(),
            Field::SupervisorName => record.supervisor_name.clone(),
            Field::SignatoryName => record.signatory_name.clone(),
            Field::BudgetCertificates => {
                non_empty(&record.budget_certificates).map(enumerate_numbers)
            }
            Field::SignedOn => record.signed_on.map(date_in_words),
        }
    }
}

fn non_empty(items: &[String]) -> Option<&[String]> {
    (!items.is_empty()).then_some(items)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(Field),
    Unknown(String),
}

/// A scanned document template.
#[derive(Debug, Clone)]
pub struct Template {
    tokens: Vec<Token>,
    issues: Vec<TemplateError>,
}

/// Knobs for [`Template::render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub marker: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            marker: PLACEHOLDER_MARKER.to_string(),
        }
    }
}

impl Template {
    /// The built-in service contract template.
    pub fn builtin() -> &'static Template {
        &BUILTIN
    }

    /// Scan template source into tokens.
    ///
    /// Never fails. A `{{` that is not followed by a name and `}}` is literal
    /// text, as are lone braces. Unknown names are kept and render the
    /// marker; see [`Template::validate`].
    pub fn parse(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut issues = Vec::new();
        let mut literal = String::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find(OPEN) {
            let after_open = &rest[open + OPEN.len()..];
            let Some(close) = after_open.find(CLOSE) else {
                issues.push(TemplateError::UnclosedPlaceholder {
                    offset: offset + open,
                });
                break;
            };

            let name = after_open[..close].trim();
            if !is_placeholder_name(name) {
                // Not a placeholder: keep the braces and rescan after them.
                let consumed = open + OPEN.len();
                literal.push_str(&rest[..consumed]);
                offset += consumed;
                rest = &rest[consumed..];
                continue;
            }

            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            match Field::from_name(name) {
                Some(field) => tokens.push(Token::Field(field)),
                None => {
                    issues.push(TemplateError::UnknownPlaceholder {
                        name: name.to_string(),
                        offset: offset + open,
                    });
                    tokens.push(Token::Unknown(name.to_string()));
                }
            }

            let consumed = open + OPEN.len() + close + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self { tokens, issues }
    }

    /// Problems found while scanning: unknown names and unclosed `{{`.
    pub fn issues(&self) -> &[TemplateError] {
        &self.issues
    }

    /// Reject templates with unknown placeholders or an unclosed `{{`.
    pub fn validate(&self) -> Result<(), TemplateError> {
        match self.issues.first() {
            Some(issue) => Err(issue.clone()),
            None => Ok(()),
        }
    }

    /// Fields referenced by this template, in first-use order.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        for token in &self.tokens {
            if let Token::Field(field) = token
                && !fields.contains(field)
            {
                fields.push(*field);
            }
        }
        fields
    }

    pub fn render(&self, record: &ContractRecord, options: &RenderOptions) -> Document {
        let mut document = Document::default();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => document.push(text, SegmentKind::Literal),
                Token::Field(field) => match field.resolve(record) {
                    Some(value) => document.push(&value, SegmentKind::Substituted(*field)),
                    None => document.push(&options.marker, SegmentKind::Missing(Some(*field))),
                },
                Token::Unknown(_) => document.push(&options.marker, SegmentKind::Missing(None)),
            }
        }
        document
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// What a rendered region came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Template boilerplate.
    Literal,
    /// A field value.
    Substituted(Field),
    /// The marker, for a field without a value or an unknown placeholder.
    Missing(Option<Field>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    /// The field this region was rendered from, if the placeholder named one.
    pub fn field(&self) -> Option<Field> {
        match self.kind {
            SegmentKind::Literal => None,
            SegmentKind::Substituted(field) => Some(field),
            SegmentKind::Missing(field) => field,
        }
    }

    /// True when the region holds a field value.
    pub fn is_substituted(&self) -> bool {
        matches!(self.kind, SegmentKind::Substituted(_))
    }

    /// True for every region that came from a placeholder, markers included.
    pub fn is_placeholder(&self) -> bool {
        !matches!(self.kind, SegmentKind::Literal)
    }
}

/// A rendered document as an ordered list of segments.
///
/// Adjacent literal segments are merged; placeholder segments are never
/// merged, so substitution boundaries stay exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub segments: Vec<Segment>,
}

impl Document {
    fn push(&mut self, text: &str, kind: SegmentKind) {
        if kind == SegmentKind::Literal
            && let Some(last) = self.segments.last_mut()
            && last.kind == SegmentKind::Literal
        {
            last.text.push_str(text);
            return;
        }
        self.segments.push(Segment {
            text: text.to_string(),
            kind,
        });
    }

    pub fn to_plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// HTML fragment: text is escaped, placeholder regions are wrapped in
    /// `<mark>`, and newlines become `<br>`.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let body = escape_html(&segment.text).replace('\n', "<br>\n");
            match segment.kind {
                SegmentKind::Literal => out.push_str(&body),
                SegmentKind::Substituted(field) => {
                    let _ = write!(out, r#"<mark data-field="{}">{body}</mark>"#, field.name());
                }
                SegmentKind::Missing(Some(field)) => {
                    let _ = write!(
                        out,
                        r#"<mark class="missing" data-field="{}">{body}</mark>"#,
                        field.name()
                    );
                }
                SegmentKind::Missing(None) => {
                    let _ = write!(out, r#"<mark class="missing">{body}</mark>"#);
                }
            }
        }
        out
    }

    /// Fields that rendered the marker, in first-use order.
    pub fn missing_fields(&self) -> Vec<Field> {
        let mut missing = Vec::new();
        for segment in &self.segments {
            if let SegmentKind::Missing(Some(field)) = segment.kind
                && !missing.contains(&field)
            {
                missing.push(field);
            }
        }
        missing
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_record() -> ContractRecord {
        ContractRecord {
            id: Some("88".into()),
            contract_number: Some("CPS-042-2024".into()),
            contractor_name: Some("Laura Gómez".into()),
            contractor_id_type: Some("cédula de ciudadanía".into()),
            contractor_id_number: Some("52.123.456".into()),
            contractor_email: Some("laura@example.org".into()),
            object: Some("Prestar servicios profesionales de apoyo jurídico.".into()),
            value: Some(24_000_000),
            start_date: Some(date(2024, 2, 1)),
            end_date: Some(date(2024, 2, 29)),
            obligations: vec!["Revisar contratos".into(), "Emitir conceptos".into()],
            deliverables: vec!["Informe mensual".into()],
            execution_place: Some("Bogotá D.C.".into()),
            payment_method: Some("pagos mensuales vencidos".into()),
            supervisor_name: Some("Jorge Ruiz".into()),
            signatory_name: Some("Ana Torres".into()),
            budget_certificates: vec!["124".into(), "587".into()],
            signed_on: Some(date(2024, 1, 30)),
        }
    }

    #[test]
    fn builtin_template_is_valid_and_uses_every_field() {
        let template = Template::builtin();
        assert_eq!(template.validate(), Ok(()));
        let used = template.fields();
        for field in Field::ALL {
            assert!(used.contains(&field), "builtin template never uses {field:?}");
        }
    }

    #[test]
    fn empty_record_renders_only_markers_and_boilerplate() {
        let document = Template::builtin().render(&ContractRecord::default(), &RenderOptions::default());
        let text = document.to_plain();
        assert!(!text.contains("{{"));
        assert!(!text.contains("undefined"));
        assert!(!text.contains("null"));
        assert!(!text.contains("None"));
        assert!(text.contains(PLACEHOLDER_MARKER));
        assert!(!document.segments.iter().any(Segment::is_substituted));
        for segment in document.segments.iter().filter(|s| s.is_placeholder()) {
            assert_eq!(segment.text, PLACEHOLDER_MARKER);
            assert!(matches!(segment.kind, SegmentKind::Missing(Some(_))));
            assert!(segment.field().is_some());
        }
        assert_eq!(document.missing_fields().len(), Field::ALL.len());
    }

    #[test]
    fn full_record_substitutes_every_field() {
        let document = Template::builtin().render(&full_record(), &RenderOptions::default());
        assert!(document.missing_fields().is_empty());
        let text = document.to_plain();
        assert!(!text.contains(PLACEHOLDER_MARKER));
        assert!(text.contains("No. CPS-042-2024"));
        assert!(text.contains("VEINTICUATRO MILLONES DE PESOS M/CTE ($24.000.000)"));
        assert!(text.contains("el valor de $24.000.000 de la siguiente"));
        assert!(text.contains("1. Revisar contratos\n2. Emitir conceptos"));
        assert!(text.contains("veintinueve (29) días, contados desde el 1 de febrero de 2024 hasta el 29 de febrero de 2024"));
        assert!(text.contains("disponibilidad presupuestal número 124, número 587."));
        assert!(text.contains("a los treinta (30) días del mes de enero de dos mil veinticuatro (2024)"));
    }

    #[test]
    fn contract_number_falls_back_to_id() {
        let record = ContractRecord {
            id: Some("88".into()),
            ..ContractRecord::default()
        };
        assert_eq!(Field::ContractNumber.resolve(&record), Some("88".into()));
    }

    #[test]
    fn one_day_duration_is_singular() {
        let record = ContractRecord {
            start_date: Some(date(2024, 5, 1)),
            end_date: Some(date(2024, 5, 1)),
            ..ContractRecord::default()
        };
        assert_eq!(Field::Duration.resolve(&record), Some("un (1) día".into()));
    }

    #[test]
    fn field_content_is_not_rescanned() {
        let template = Template::parse("Objeto: {{object}}.");
        let record = ContractRecord {
            object: Some("copiar {{contractor_name}} y {{value}}".into()),
            contractor_name: Some("NO DEBE APARECER".into()),
            ..ContractRecord::default()
        };
        let text = template.render(&record, &RenderOptions::default()).to_plain();
        assert_eq!(text, "Objeto: copiar {{contractor_name}} y {{value}}.");
    }

    #[test]
    fn literal_braces_survive() {
        let template = Template::parse("a {b} {{ no es nombre }} c}} {{object}} {{");
        assert_eq!(template.fields(), vec![Field::Object]);
        let record = ContractRecord {
            object: Some("X".into()),
            ..ContractRecord::default()
        };
        let text = template.render(&record, &RenderOptions::default()).to_plain();
        assert_eq!(text, "a {b} {{ no es nombre }} c}} X {{");
        assert_eq!(
            template.validate(),
            Err(TemplateError::UnclosedPlaceholder { offset: 40 })
        );
    }

    #[test]
    fn unknown_placeholder_renders_marker_and_fails_validation() {
        let template = Template::parse("Hola {{apodo}}!");
        assert_eq!(
            template.validate(),
            Err(TemplateError::UnknownPlaceholder {
                name: "apodo".into(),
                offset: 5
            })
        );
        let document = template.render(&ContractRecord::default(), &RenderOptions::default());
        assert_eq!(document.to_plain(), "Hola __________!");
        assert!(document.missing_fields().is_empty());
        let marker = &document.segments[1];
        assert_eq!(marker.kind, SegmentKind::Missing(None));
        assert!(marker.is_placeholder());
        assert!(!marker.is_substituted());
        assert_eq!(marker.field(), None);
    }

    #[test]
    fn whitespace_inside_braces_is_allowed() {
        let template = Template::parse("{{ object }}");
        assert_eq!(template.fields(), vec![Field::Object]);
    }

    #[test]
    fn custom_marker() {
        let options = RenderOptions {
            marker: "[FALTA]".into(),
        };
        let text = Template::parse("{{object}}")
            .render(&ContractRecord::default(), &options)
            .to_plain();
        assert_eq!(text, "[FALTA]");
    }

    #[test]
    fn segments_keep_boundaries() {
        let record = ContractRecord {
            contractor_name: Some("Ana".into()),
            ..ContractRecord::default()
        };
        let document =
            Template::parse("A {{contractor_name}}{{object}} B").render(&record, &RenderOptions::default());
        assert_eq!(
            document.segments,
            vec![
                Segment {
                    text: "A ".into(),
                    kind: SegmentKind::Literal
                },
                Segment {
                    text: "Ana".into(),
                    kind: SegmentKind::Substituted(Field::ContractorName)
                },
                Segment {
                    text: PLACEHOLDER_MARKER.into(),
                    kind: SegmentKind::Missing(Some(Field::Object))
                },
                Segment {
                    text: " B".into(),
                    kind: SegmentKind::Literal
                },
            ]
        );
    }

    #[test]
    fn html_escapes_and_marks() {
        let record = ContractRecord {
            object: Some("<script>\"x\" & 'y'</script>".into()),
            obligations: vec!["uno".into(), "dos".into()],
            ..ContractRecord::default()
        };
        let html = Template::parse("<b>{{object}}</b>\n{{obligations}}{{payment_method}}")
            .render(&record, &RenderOptions::default())
            .to_html();
        assert!(html.starts_with("&lt;b&gt;<mark data-field=\"object\">&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;</mark>&lt;/b&gt;<br>\n"));
        assert!(html.contains("<mark data-field=\"obligations\">1. uno<br>\n2. dos</mark>"));
        assert!(html.ends_with("<mark class=\"missing\" data-field=\"payment_method\">__________</mark>"));
    }
}
