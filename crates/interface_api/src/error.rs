//! API error handling
//!
//! Every failure leaves the API as a problem details document:
//!
//! ```json
//! {
//!   "title": "Validation error(s)",
//!   "detail": "One or more validation errors occurred",
//!   "status": 400,
//!   "type": "https://example.com/probs/validation",
//!   "instance": "",
//!   "errors": [{ "property": "Email", "errors": ["A customer with this email address already exists"] }]
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrorsKind;

use domain_customer::{CustomerError, FieldFailures};

const BUSINESS_TYPE: &str = "https://example.com/probs/business";
const VALIDATION_TYPE: &str = "https://example.com/probs/validation";
const NOT_FOUND_TYPE: &str = "https://example.com/probs/notfound";
const UNAVAILABLE_TYPE: &str = "https://example.com/probs/unavailable";
const INTERNAL_TYPE: &str = "https://example.com/probs/internal";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed field-level validation
    #[error("Request validation failed")]
    RequestValidation(Vec<PropertyErrors>),

    /// Request body could not be read
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Customer(#[from] CustomerError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Messages for one request property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyErrors {
    pub property: String,
    pub errors: Vec<String>,
}

/// Problem details response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDetails {
    pub title: String,
    pub detail: String,
    pub status: u16,
    #[serde(rename = "type")]
    pub problem_type: String,
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<PropertyErrors>>,
}

impl ProblemDetails {
    fn new(status: StatusCode, title: &str, problem_type: &str, detail: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            detail: detail.into(),
            status: status.as_u16(),
            problem_type: problem_type.to_string(),
            instance: String::new(),
            errors: None,
        }
    }

    fn business(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Business rule violation",
            BUSINESS_TYPE,
            detail,
        )
    }

    fn validation(errors: Vec<PropertyErrors>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(
                StatusCode::BAD_REQUEST,
                "Validation error(s)",
                VALIDATION_TYPE,
                "One or more validation errors occurred",
            )
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Groups engine failures by field, keeping the order fields first appear in
pub fn group_failures(failures: &FieldFailures) -> Vec<PropertyErrors> {
    let mut grouped: Vec<PropertyErrors> = Vec::new();
    for failure in failures {
        let property = failure.field.as_str();
        match grouped.iter_mut().find(|group| group.property == property) {
            Some(group) => group.errors.push(failure.message.clone()),
            None => grouped.push(PropertyErrors {
                property: property.to_string(),
                errors: vec![failure.message.clone()],
            }),
        }
    }
    grouped
}

/// `national_id` -> `NationalId`
fn property_name(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Collects leaf field messages, descending into nested structs
fn collect_messages(errors: &validator::ValidationErrors, grouped: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let property = property_name(field.as_ref());
                let messages = grouped.entry(property.clone()).or_default();
                for error in field_errors {
                    messages.push(match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("{} is invalid", property),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, grouped),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, grouped);
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut grouped = BTreeMap::new();
        collect_messages(&errors, &mut grouped);

        ApiError::RequestValidation(
            grouped
                .into_iter()
                .map(|(property, errors)| PropertyErrors { property, errors })
                .collect(),
        )
    }
}

impl ApiError {
    /// Builds the problem details document for this error
    pub fn to_problem(&self) -> ProblemDetails {
        match self {
            ApiError::RequestValidation(errors) => ProblemDetails::validation(errors.clone()),
            ApiError::BadRequest(message) => ProblemDetails::new(
                StatusCode::BAD_REQUEST,
                "Bad request",
                VALIDATION_TYPE,
                message.clone(),
            ),
            ApiError::Customer(CustomerError::Rejected(failures)) if failures.len() == 1 => {
                ProblemDetails::business(failures.first().message.clone())
            }
            ApiError::Customer(CustomerError::Rejected(failures)) => {
                ProblemDetails::validation(group_failures(failures))
            }
            ApiError::Customer(CustomerError::NotFound(id)) => ProblemDetails::new(
                StatusCode::NOT_FOUND,
                "Resource not found",
                NOT_FOUND_TYPE,
                format!("Customer {} not found", id),
            ),
            ApiError::Customer(CustomerError::Cancelled) => ProblemDetails::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Request cancelled",
                UNAVAILABLE_TYPE,
                "The request was cancelled before validation completed",
            ),
            ApiError::Customer(CustomerError::Port(port)) if port.is_transient() => {
                ProblemDetails::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service unavailable",
                    UNAVAILABLE_TYPE,
                    "Customer storage is temporarily unavailable",
                )
            }
            ApiError::Customer(CustomerError::Port(_)) | ApiError::Internal(_) => {
                ProblemDetails::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    INTERNAL_TYPE,
                    "An unexpected error occurred",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let problem = self.to_problem();
        if problem.status >= 500 {
            error!(error = %self, status = problem.status, "request failed");
        }
        (problem.status_code(), Json(problem)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CustomerId, PortError};
    use domain_customer::{ErrorKind, FieldFailure, FieldName};
    use validator::Validate;

    fn conflict(field: FieldName, message: &str) -> FieldFailure {
        FieldFailure::new(field, ErrorKind::Conflict, message)
    }

    #[test]
    fn test_single_failure_is_business_problem() {
        let error = ApiError::from(CustomerError::Rejected(FieldFailures::single(
            FieldFailure::new(FieldName::NationalId, ErrorKind::Checksum, "National identity number is not valid"),
        )));
        let problem = error.to_problem();

        assert_eq!(problem.status, 400);
        assert_eq!(problem.title, "Business rule violation");
        assert_eq!(problem.problem_type, BUSINESS_TYPE);
        assert_eq!(problem.detail, "National identity number is not valid");
        assert!(problem.errors.is_none());
    }

    #[test]
    fn test_multiple_failures_are_validation_problem() {
        let failures = FieldFailures::from_vec(vec![
            conflict(FieldName::NationalId, "A customer with this national identity number already exists"),
            conflict(FieldName::Email, "A customer with this email address already exists"),
        ])
        .unwrap();
        let problem = ApiError::from(CustomerError::Rejected(failures)).to_problem();

        assert_eq!(problem.title, "Validation error(s)");
        let errors = problem.errors.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].property, "NationalId");
        assert_eq!(errors[1].property, "Email");
    }

    #[test]
    fn test_not_found_cancelled_and_port_errors() {
        let problem = ApiError::from(CustomerError::NotFound(CustomerId::new())).to_problem();
        assert_eq!(problem.status, 404);

        let problem = ApiError::from(CustomerError::Cancelled).to_problem();
        assert_eq!((problem.status, problem.title.as_str()), (503, "Request cancelled"));

        let problem = ApiError::from(CustomerError::Port(PortError::connection("refused"))).to_problem();
        assert_eq!(problem.status, 503);

        let problem = ApiError::from(CustomerError::Port(PortError::internal("boom"))).to_problem();
        assert_eq!(problem.status, 500);
        assert!(!problem.detail.contains("boom"));
    }

    #[test]
    fn test_problem_serializes_type_and_omits_empty_errors() {
        let json = serde_json::to_value(ProblemDetails::business("x")).unwrap();
        assert_eq!(json["type"], BUSINESS_TYPE);
        assert_eq!(json["instance"], "");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_property_name() {
        assert_eq!(property_name("national_id"), "NationalId");
        assert_eq!(property_name("email"), "Email");
        assert_eq!(property_name("company_registration_number"), "CompanyRegistrationNumber");
    }

    #[derive(Validate)]
    struct SampleRequest {
        #[validate(length(min = 1, message = "First name is required"))]
        first_name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validator_errors_are_grouped_by_property() {
        let request = SampleRequest {
            first_name: String::new(),
            email: "not-an-email".to_string(),
        };
        let ApiError::RequestValidation(errors) = ApiError::from(request.validate().unwrap_err()) else {
            panic!("expected request validation error");
        };

        assert_eq!(errors[0].property, "Email");
        assert_eq!(errors[0].errors, vec!["Email is invalid".to_string()]);
        assert_eq!(errors[1].property, "FirstName");
        assert_eq!(errors[1].errors, vec!["First name is required".to_string()]);
    }
}
