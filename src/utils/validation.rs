use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(map_validation_error)
}

fn map_validation_error(err: ValidationErrors) -> AppError {
    let mut details = err
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let codes = errs
                .iter()
                .map(|e| e.code.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: [{}]", field, codes)
        })
        .collect::<Vec<_>>();
    details.sort();
    AppError::InvalidInput(format!("Validation failed: {}", details.join("; ")))
}

/// Image URIs must be absolute http(s) URLs whose host carries a domain.
pub fn validate_image_uri(uri: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(uri).map_err(|_| ValidationError::new("invalid_uri"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::new("unsupported_scheme"));
    }
    match parsed.host_str() {
        Some(host) if host.contains('.') && !host.starts_with('.') && !host.ends_with('.') => Ok(()),
        _ => Err(ValidationError::new("invalid_host")),
    }
}
