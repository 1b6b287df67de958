#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No video link is pending")]
    NoPendingLink,
    #[error("Session is missing the link or the chosen action")]
    MissingSessionData,
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),
}
