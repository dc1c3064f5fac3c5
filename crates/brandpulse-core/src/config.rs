use std::path::PathBuf;

use crate::app_config::{AppConfig, ClassifierEndpoints, Environment, FusionConfig, LexiconPaths};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got {other:?}"))),
        }
    };

    // Fractions are validated into [0, 1]; weights and thresholds outside
    // that range have no meaning for probabilities.
    let parse_fraction = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(invalid(var, format!("{value} is outside [0, 1]")))
        }
    };

    let database_url = require("DATABASE_URL")?;
    let youtube_api_keys = parse_api_keys(&require("YOUTUBE_API_KEYS")?)?;

    let env = parse_environment(&or_default("BRANDPULSE_ENV", "development"))?;
    let log_level = or_default("BRANDPULSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("BRANDPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BRANDPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BRANDPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let request_timeout_secs = parse_u64("BRANDPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_search_results = parse_u32("BRANDPULSE_MAX_SEARCH_RESULTS", "50")?;
    let max_comments_per_video = parse_usize("BRANDPULSE_MAX_COMMENTS_PER_VIDEO", "200")?;
    let max_concurrent_videos = parse_usize("BRANDPULSE_MAX_CONCURRENT_VIDEOS", "1")?;
    let snapshot_dir = PathBuf::from(or_default("BRANDPULSE_SNAPSHOT_DIR", "./data"));

    let lexicon = LexiconPaths {
        sinhala_garbage: PathBuf::from(or_default(
            "BRANDPULSE_SI_GARBAGE_LEXICON_PATH",
            "./data/garbage_lexicon_sinhala.json",
        )),
        sinhala_aspects: PathBuf::from(or_default(
            "BRANDPULSE_SI_ASPECT_LEXICON_PATH",
            "./data/sinhala_aspect_lexicon.json",
        )),
        english_words: PathBuf::from(or_default(
            "BRANDPULSE_ENGLISH_WORDS_PATH",
            "./data/english_words.txt",
        )),
        allow_empty: parse_bool("BRANDPULSE_ALLOW_EMPTY_LEXICON", "false")?,
    };

    let classifiers = ClassifierEndpoints {
        english_garbage: require("BRANDPULSE_EN_GARBAGE_MODEL_URL")?,
        english_aspect: require("BRANDPULSE_EN_ASPECT_MODEL_URL")?,
        sinhala_garbage: require("BRANDPULSE_SI_GARBAGE_MODEL_URL")?,
        sinhala_aspect: require("BRANDPULSE_SI_ASPECT_MODEL_URL")?,
    };

    let fusion = FusionConfig {
        model_weight: parse_fraction("BRANDPULSE_FUSION_MODEL_WEIGHT", "0.7")?,
        lexicon_weight: parse_fraction("BRANDPULSE_FUSION_LEXICON_WEIGHT", "0.3")?,
        downgrade_model_threshold: parse_fraction("BRANDPULSE_DOWNGRADE_MODEL_THRESHOLD", "0.4")?,
        downgrade_lexicon_threshold: parse_fraction(
            "BRANDPULSE_DOWNGRADE_LEXICON_THRESHOLD",
            "0.1",
        )?,
        keyword_match_ratio: parse_fraction("BRANDPULSE_KEYWORD_MATCH_RATIO", "0.3")?,
    };
    let phrase_override = parse_bool("BRANDPULSE_PHRASE_OVERRIDE", "true")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        youtube_api_keys,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        request_timeout_secs,
        max_search_results,
        max_comments_per_video,
        max_concurrent_videos,
        snapshot_dir,
        lexicon,
        classifiers,
        fusion,
        phrase_override,
    })
}

/// Split the comma-separated key list, dropping blanks.
fn parse_api_keys(raw: &str) -> Result<Vec<String>, ConfigError> {
    let keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect();
    if keys.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "YOUTUBE_API_KEYS".to_string(),
            reason: "no API keys listed".to_string(),
        });
    }
    Ok(keys)
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BRANDPULSE_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
