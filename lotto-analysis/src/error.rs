pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnalysisError {
    #[error("entrée invalide : {0}")]
    InvalidInput(String),

    #[error("tirage {0} présent plusieurs fois dans l'historique")]
    DuplicateRound(u32),

    #[error("configuration invalide : {0}")]
    InvalidConfig(String),
}
