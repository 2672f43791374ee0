use crate::utils::error::{Result, RounderError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RounderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RounderError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RounderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RounderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RounderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        let extension = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str());

        match extension {
            Some(extension) if allowed_set.contains(extension) => {}
            _ => {
                return Err(RounderError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!("Expected a file with extension: {}", allowed_extensions.join(", ")),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_column_name(field_name: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RounderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Column name cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_workday_hours(field_name: &str, hours: f64) -> Result<()> {
    if !(hours > 0.0 && hours <= 24.0) {
        return Err(RounderError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: hours.to_string(),
            reason: "Target hours must be between 0 and 24".to_string(),
        });
    }
    Ok(())
}
