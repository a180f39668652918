//! Contract text and timeline derivations: Spanish numerals and dates, list
//! normalisation, document templating, and progress along the contract term.

pub mod dates;
mod error;
mod lenient;
pub mod model;
pub mod normalize;
pub mod numerals;
pub mod template;
pub mod timeline;

pub use error::{TemplateError, UnknownAdditionKind};
pub use model::{AdditionKind, AdditionPayload, AdditionRecord, ContractRecord};
pub use normalize::{ListField, normalize};
pub use numerals::{format_currency, number_to_words};
pub use template::{Document, Field, RenderOptions, Segment, SegmentKind, Template};
pub use timeline::{DerivedTimeline, Milestone, ProgressState, derive_timeline};
