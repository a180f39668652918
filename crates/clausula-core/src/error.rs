use thiserror::Error;

/// Problems found in a user-supplied document template.
///
/// Rendering never fails; these are reported by `Template::validate` so a
/// caller can reject a template before using it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder `{name}` at byte {offset}")]
    UnknownPlaceholder { name: String, offset: usize },

    #[error("placeholder opened at byte {offset} is never closed")]
    UnclosedPlaceholder { offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown addition type: {0}")]
pub struct UnknownAdditionKind(pub String);
