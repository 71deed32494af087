use crate::error::InternalError;
use tierdb_schema::MAX_TABLE_NAME_LEN;

pub const ENV_SEED_LOOKUPS: &str = "TIERDB_SEED_LOOKUPS";
pub const ENV_MAX_TABLE_NAME_LEN: &str = "TIERDB_MAX_TABLE_NAME_LEN";

///
/// DbConfig
///
/// Runtime knobs for a `Db`. Defaults seed lookup tables on construction
/// and use the schema's table name limit. Env vars allow overrides:
/// `TIERDB_SEED_LOOKUPS`, `TIERDB_MAX_TABLE_NAME_LEN`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DbConfig {
    pub seed_lookups: bool,
    pub max_table_name_len: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            seed_lookups: true,
            max_table_name_len: MAX_TABLE_NAME_LEN,
        }
    }
}

impl DbConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, InternalError> {
        let mut config = Self::default();

        if let Some(value) = env_value(ENV_SEED_LOOKUPS) {
            config.seed_lookups = parse_bool(&value).ok_or_else(|| {
                InternalError::config(format!(
                    "{ENV_SEED_LOOKUPS} must be a boolean, found '{value}'"
                ))
            })?;
        }

        if let Some(value) = env_value(ENV_MAX_TABLE_NAME_LEN) {
            config.max_table_name_len = value
                .parse::<usize>()
                .ok()
                .filter(|len| *len > 0)
                .ok_or_else(|| {
                    InternalError::config(format!(
                        "{ENV_MAX_TABLE_NAME_LEN} must be a positive integer, found '{value}'"
                    ))
                })?;
        }

        Ok(config)
    }

    #[must_use]
    pub const fn with_seed_lookups(mut self, seed_lookups: bool) -> Self {
        self.seed_lookups = seed_lookups;
        self
    }

    #[must_use]
    pub const fn with_max_table_name_len(mut self, len: usize) -> Self {
        self.max_table_name_len = len;
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

///
/// TESTS
///
