use evalboard_core::{
    ConfigError, DbError, EvaluationServiceError, LoggingError, RepoError, ResultsServiceError,
    RosterServiceError, ScoringError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub(crate) enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Scoring(ScoringError),
    Evaluation(EvaluationServiceError),
    Roster(RosterServiceError),
    Results(ResultsServiceError),
    Json(serde_json::Error),
    /// Bad command line input the parser cannot catch.
    Usage(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "logging error: {err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Repo(err) => write!(f, "storage error: {err}"),
            Self::Scoring(err) => write!(f, "{err}"),
            Self::Evaluation(err) => write!(f, "{err}"),
            Self::Roster(err) => write!(f, "{err}"),
            Self::Results(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "failed to render JSON: {err}"),
            Self::Usage(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Scoring(err) => Some(err),
            Self::Evaluation(err) => Some(err),
            Self::Roster(err) => Some(err),
            Self::Results(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Usage(_) => None,
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(value: $source) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from!(
    ConfigError => Config,
    LoggingError => Logging,
    DbError => Db,
    RepoError => Repo,
    ScoringError => Scoring,
    EvaluationServiceError => Evaluation,
    RosterServiceError => Roster,
    ResultsServiceError => Results,
    serde_json::Error => Json,
);
