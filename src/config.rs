// src/config.rs
use crate::api::ChunkPolicy;
use crate::constants::{
    ALL_AT_ONCE_THRESHOLD, API_KEY_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES,
    DELETION_CHUNK_SIZE, MAX_DELETION_CHUNK_SIZE, MAX_PAGE_SIZE, QUOTA_LOW_WATER_MARK,
    VIDEO_PAGE_SIZE,
};
use crate::error::AppError;
use crate::model::LanguageFilter;
use crate::types::{ApiKey, BaseUrl, LanguageTag, ValidationError};
use clap::Parser;
use std::default::Default;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Platform API base URL
    #[arg(long, env = "CAPTIONSWEEP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Videos requested per catalog page (1-100)
    #[arg(long, default_value_t = VIDEO_PAGE_SIZE)]
    pub page_size: u32,

    /// Retries after the first attempt before a request is given up on
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Deletions per chunk once a video has more captions than --all-at-once (1-100)
    #[arg(long, default_value_t = DELETION_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Caption counts up to this are deleted in one concurrent burst
    #[arg(long, default_value_t = ALL_AT_ONCE_THRESHOLD)]
    pub all_at_once: usize,

    /// Remaining-quota count below which the run slows down
    #[arg(long, default_value_t = QUOTA_LOW_WATER_MARK)]
    pub low_water_mark: u32,

    /// Only delete captions in this language (repeatable, e.g. --language en --language fr)
    #[arg(short = 'l', long = "language")]
    pub languages: Vec<String>,

    /// Discover and count captions without deleting anything
    #[arg(short = 'n', long, default_value_t = false)]
    pub dry_run: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Resolved run configuration, validated and ready to drive a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: ApiKey,
    pub base_url: BaseUrl,
    pub page_size: u32,
    pub max_retries: u32,
    pub chunk_policy: ChunkPolicy,
    pub low_water_mark: u32,
    pub languages: LanguageFilter,
    pub dry_run: bool,
    pub verbose: bool,
}

impl RunConfig {
    /// Resolves a complete run configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key_str = std::env::var(API_KEY_ENV_VAR).map_err(|_| {
            AppError::MissingConfiguration(format!(
                "{} environment variable not set",
                API_KEY_ENV_VAR
            ))
        })?;

        Self::from_parts(ApiKey::new(api_key_str)?, cli)
    }

    /// Validates CLI input against an already-obtained API key.
    pub fn from_parts(api_key: ApiKey, cli: CommandLineInput) -> Result<Self, AppError> {
        let base_url = BaseUrl::parse(&cli.base_url)?;

        if cli.page_size == 0 || cli.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::OutOfBounds {
                value: cli.page_size,
                min: 1,
                max: MAX_PAGE_SIZE,
            }
            .into());
        }
        if cli.chunk_size == 0 || cli.chunk_size > MAX_DELETION_CHUNK_SIZE {
            return Err(ValidationError::OutOfBounds {
                value: u32::try_from(cli.chunk_size).unwrap_or(u32::MAX),
                min: 1,
                max: MAX_DELETION_CHUNK_SIZE as u32,
            }
            .into());
        }

        let languages = cli
            .languages
            .iter()
            .map(|tag| LanguageTag::parse(tag))
            .collect::<Result<Vec<_>, _>>()?;

        let chunk_policy = ChunkPolicy {
            all_at_once_threshold: cli.all_at_once,
            chunk_size: cli.chunk_size,
            ..ChunkPolicy::default()
        };

        Ok(RunConfig {
            api_key,
            base_url,
            page_size: cli.page_size,
            max_retries: cli.max_retries,
            chunk_policy,
            low_water_mark: cli.low_water_mark,
            languages: LanguageFilter::from_tags(languages),
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api_key: ApiKey::new("test_default_key_for_testing_only")
                .expect("Default API key should be valid"),
            base_url: BaseUrl::parse(DEFAULT_BASE_URL).expect("Default base URL should be valid"),
            page_size: VIDEO_PAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            chunk_policy: ChunkPolicy::default(),
            low_water_mark: QUOTA_LOW_WATER_MARK,
            languages: LanguageFilter::All,
            dry_run: false,
            verbose: false,
        }
    }
}
