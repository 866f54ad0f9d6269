//! JSON response envelope printed by every command

use std::process::ExitCode;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use admin_core::error::{DomainError, FieldError};
use admin_infrastructure::BootstrapError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Domain(e) | CliError::Bootstrap(BootstrapError::Domain(e)) => e.error_code(),
            CliError::Bootstrap(BootstrapError::Connect(_) | BootstrapError::Migrate(_)) => {
                "DATABASE_ERROR"
            }
            CliError::Bootstrap(BootstrapError::Unsupported(_)) => "UNSUPPORTED",
            CliError::Output(_) => "INTERNAL_ERROR",
        }
    }

    /// Distinct non-zero status per error code.
    pub fn exit_code(&self) -> u8 {
        match self.code() {
            "VALIDATION_ERROR" => 2,
            "NOT_FOUND" => 3,
            "CYCLE_ERROR" => 4,
            "HAS_CHILDREN" => 5,
            "DUPLICATE_CODE" => 6,
            "DATABASE_ERROR" => 7,
            "UNSUPPORTED" => 8,
            _ => 1,
        }
    }

    fn details(&self) -> &[FieldError] {
        match self {
            CliError::Domain(e) | CliError::Bootstrap(BootstrapError::Domain(e)) => e.field_errors(),
            _ => &[],
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(err: &CliError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: err.code().to_string(),
                message: err.to_string(),
                fields: err.details().to_vec(),
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Prints the envelope for `outcome` and returns the process status.
pub fn emit(outcome: Result<Value, CliError>) -> ExitCode {
    let (rendered, status) = match &outcome {
        Ok(data) => (
            serde_json::to_string_pretty(&ApiResponse::success(data)),
            ExitCode::SUCCESS,
        ),
        Err(err) => (
            serde_json::to_string_pretty(&ApiResponse::<Value>::error(err)),
            ExitCode::from(err.exit_code()),
        ),
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            status
        }
        Err(e) => {
            eprintln!("Failed to render response: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use admin_core::domain::MenuId;

    use super::*;

    #[test]
    fn test_error_envelope_carries_code_and_fields() {
        let err = CliError::from(DomainError::parent_not_found(MenuId(9)));
        let value = serde_json::to_value(ApiResponse::<Value>::error(&err)).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["data"], Value::Null);
        assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(value["error"]["fields"][0]["field"], "parent_id");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            CliError::from(DomainError::MenuNotFound(MenuId(1))),
            CliError::from(DomainError::Cycle {
                node: MenuId(1),
                parent: MenuId(2),
            }),
            CliError::from(DomainError::HasChildren {
                id: MenuId(1),
                children: 2,
            }),
            CliError::from(BootstrapError::Unsupported("migrate")),
        ];
        let codes: Vec<u8> = errors.iter().map(CliError::exit_code).collect();
        assert_eq!(codes, vec![3, 4, 5, 8]);
    }

    #[test]
    fn test_success_envelope_omits_error() {
        let value = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], serde_json::json!([1, 2]));
        assert_eq!(value["error"], Value::Null);
    }
}
