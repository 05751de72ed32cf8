//! Runtime settings resolved from the process environment.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::DrugInfoError;

pub(crate) const RXNORM_BASE: &str = "https://rxnav.nlm.nih.gov/REST";
pub(crate) const RXNORM_BASE_ENV: &str = "DRUGINFO_RXNORM_BASE";
pub(crate) const OPENFDA_BASE: &str = "https://api.fda.gov";
pub(crate) const OPENFDA_BASE_ENV: &str = "DRUGINFO_OPENFDA_BASE";
pub(crate) const PILLBOX_BASE: &str = "https://pillbox.nlm.nih.gov/api";
pub(crate) const PILLBOX_BASE_ENV: &str = "DRUGINFO_PILLBOX_BASE";

const CACHE_CAPACITY_ENV: &str = "DRUGINFO_CACHE_CAPACITY";
const ALTERNATIVES_FILE_ENV: &str = "DRUGINFO_ALTERNATIVES_FILE";
const OPENFDA_API_KEY_ENV: &str = "OPENFDA_API_KEY";

#[derive(Debug, Clone)]
pub struct Settings {
    pub rxnorm_base: Cow<'static, str>,
    pub openfda_base: Cow<'static, str>,
    pub pillbox_base: Cow<'static, str>,
    pub openfda_api_key: Option<String>,
    /// Entries kept per fetcher cache.
    pub cache_capacity: usize,
    /// JSON file replacing the built-in alternatives table.
    pub alternatives_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rxnorm_base: Cow::Borrowed(RXNORM_BASE),
            openfda_base: Cow::Borrowed(OPENFDA_BASE),
            pillbox_base: Cow::Borrowed(PILLBOX_BASE),
            openfda_api_key: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            alternatives_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, DrugInfoError> {
        let cache_capacity = match env_value(CACHE_CAPACITY_ENV) {
            Some(raw) => parse_capacity(&raw)?,
            None => DEFAULT_CACHE_CAPACITY,
        };

        Ok(Self {
            rxnorm_base: env_base(RXNORM_BASE, RXNORM_BASE_ENV),
            openfda_base: env_base(OPENFDA_BASE, OPENFDA_BASE_ENV),
            pillbox_base: env_base(PILLBOX_BASE, PILLBOX_BASE_ENV),
            openfda_api_key: env_value(OPENFDA_API_KEY_ENV),
            cache_capacity,
            alternatives_file: env_value(ALTERNATIVES_FILE_ENV).map(PathBuf::from),
        })
    }
}

fn env_value(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn env_base(default: &'static str, env_var: &str) -> Cow<'static, str> {
    env_value(env_var)
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed(default))
}

fn parse_capacity(raw: &str) -> Result<usize, DrugInfoError> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(DrugInfoError::InvalidArgument(format!(
            "{CACHE_CAPACITY_ENV} must be a positive integer, got '{raw}'"
        ))),
        Ok(n) => Ok(n),
    }
}
