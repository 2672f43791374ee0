pub mod cli;
pub mod file;

use clap::Parser;

use crate::config::file::FileConfig;
use crate::domain::model::{OnInvalid, WorkdayConfig};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, RounderError};
use crate::utils::validation::{
    validate_column_name, validate_file_extensions, validate_path, validate_url,
    validate_workday_hours, Validate,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "toggl-rounder")]
#[command(about = "Rounds time-tracking entries to the nearest quarter hour")]
pub struct CliConfig {
    /// Number of days from today to process time entries (API mode)
    #[arg(default_value_t = 1)]
    pub days: i64,

    /// CSV export to round; when omitted, entries are pulled from the Toggl API
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "https://api.track.toggl.com/api/v9")]
    pub api_endpoint: String,

    /// What to do with entries whose start or stop is missing or unparseable
    #[arg(long, default_value = "skip")]
    pub on_invalid: OnInvalid,

    #[arg(long, default_value = "start")]
    pub start_column: String,

    #[arg(long, default_value = "stop")]
    pub stop_column: String,

    #[arg(long, default_value = "duration")]
    pub duration_column: String,

    /// Top up short workdays with admin filler entries ([workday] in the settings file)
    #[arg(long)]
    pub fill_admin: bool,

    /// TOML settings file overriding the flag defaults
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Effective configuration: CLI flags with the optional settings file folded
/// in. File values win over flag defaults; the workday section is only active
/// behind --fill-admin.
#[derive(Debug, Clone)]
pub struct Settings {
    pub days: i64,
    pub input: Option<String>,
    pub output_path: String,
    pub api_endpoint: String,
    pub on_invalid: OnInvalid,
    pub start_column: String,
    pub stop_column: String,
    pub duration_column: String,
    pub workday: Option<WorkdayConfig>,
    pub verbose: bool,
}

impl Settings {
    pub fn resolve(cli: CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let rounding = file.rounding.unwrap_or_default();
        let api = file.api.unwrap_or_default();

        let workday = if cli.fill_admin {
            Some(file.workday.ok_or_else(|| RounderError::ConfigError {
                message: "--fill-admin requires a [workday] section in the settings file"
                    .to_string(),
            })?)
        } else {
            None
        };

        Ok(Self {
            days: cli.days,
            input: cli.input,
            output_path: cli.output_path,
            api_endpoint: api.endpoint.unwrap_or(cli.api_endpoint),
            on_invalid: rounding.on_invalid.unwrap_or(cli.on_invalid),
            start_column: rounding.start_column.unwrap_or(cli.start_column),
            stop_column: rounding.stop_column.unwrap_or(cli.stop_column),
            duration_column: rounding.duration_column.unwrap_or(cli.duration_column),
            workday,
            verbose: cli.verbose,
        })
    }
}

impl ConfigProvider for Settings {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn days_back(&self) -> i64 {
        self.days
    }

    fn on_invalid(&self) -> OnInvalid {
        self.on_invalid
    }

    fn start_column(&self) -> &str {
        &self.start_column
    }

    fn stop_column(&self) -> &str {
        &self.stop_column
    }

    fn duration_column(&self) -> &str {
        &self.duration_column
    }

    fn workday(&self) -> Option<&WorkdayConfig> {
        self.workday.as_ref()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        validate_column_name("start_column", &self.start_column)?;
        validate_column_name("stop_column", &self.stop_column)?;
        validate_column_name("duration_column", &self.duration_column)?;

        match &self.input {
            Some(input) => {
                validate_path("input", input)?;
                validate_file_extensions("input", std::slice::from_ref(input), &["csv"])?;
            }
            None => {
                validate_url("api_endpoint", &self.api_endpoint)?;
                if self.days < 0 {
                    return Err(RounderError::InvalidConfigValueError {
                        field: "days".to_string(),
                        value: self.days.to_string(),
                        reason: "Days back cannot be negative".to_string(),
                    });
                }
            }
        }

        if let Some(workday) = &self.workday {
            validate_workday_hours("workday.target_hours", workday.target_hours)?;
        }

        Ok(())
    }
}
