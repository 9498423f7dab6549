use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid language: {0} (expected DE or EN)")]
    InvalidLanguage(String),

    #[error("invalid search field: {0} (expected patient-id, sample-id or name)")]
    InvalidSearchField(String),

    #[error("invalid template kind: {0} (expected report or annex)")]
    InvalidTemplateKind(String),

    #[error("search value must not be empty")]
    EmptySearchValue,
}
