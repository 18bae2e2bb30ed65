use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("share for '{api}' must be within 0..=100 (got {share})")]
    InvalidShare { api: String, share: f64 },
    #[error("unknown api '{0}'")]
    UnknownApi(String),
    #[error("user count must be >= 0 (got {0})")]
    NegativeUserCount(i64),
    #[error("distribution must sum to 100 (got {0})")]
    DistributionSum(f64),
    #[error("a distribution is required for this catalog: the default custom profile uses api '{0}', which the catalog does not define")]
    DistributionRequired(String),
    #[error("invalid share entry '{0}': expected api:percent")]
    InvalidShareEntry(String),
    #[error("duplicate share for api '{0}'")]
    DuplicateShare(String),
    #[error("api catalog must not be empty")]
    EmptyCatalog,
    #[error("duplicate api id '{0}'")]
    DuplicateApiId(String),
    #[error("base latency must be > 0 for api '{0}'")]
    InvalidBaseLatency(String),
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("duplicate scenario key '{0}'")]
    DuplicateScenario(String),
    #[error("no result available: {0}")]
    NoResult(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Persist(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
