//! Service error taxonomy.
//!
//! Services return [`ServiceError`] values tagged with an [`ErrorKind`] so
//! callers can map outcomes to precise HTTP status codes without string
//! matching.
//!
//! | Kind | Status | Usage |
//! |------|--------|-------|
//! | `Unauthenticated` | 401 | Missing or invalid actor |
//! | `Forbidden` | 403 | Authorization decision was Deny |
//! | `Validation` | 400 | Malformed input, total mismatch, invalid transition target |
//! | `NotFound` | 404 | Resource absent |
//! | `Conflict` | 409 | Invalid state transition, lost conditional write, driver taken |
//! | `Gateway` | 502 | Payment gateway unreachable or rejected after retries |
//! | `Internal` | 500 | Unexpected error |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::authorization::FilterDenial;
use crate::domain::cancellation::errors::CancellationError;
use crate::domain::delivery::errors::DeliveryError;
use crate::domain::ordering::errors::OrderError;
use crate::domain::payment::errors::PaymentError;

/// Error kinds for the order engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Missing or invalid actor identity.
    Unauthenticated,
    /// The actor may not perform this action.
    Forbidden,
    /// Malformed or inconsistent input.
    Validation,
    /// Resource absent.
    NotFound,
    /// State conflict: invalid transition or lost conditional write.
    Conflict,
    /// Payment gateway unreachable or rejected the call.
    Gateway,
    /// Unexpected internal error.
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this error kind.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Gateway => 502,
            Self::Internal => 500,
        }
    }

    /// Stable code string for response bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Gateway => "GATEWAY_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A tagged service error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[{kind}] {message}")]
pub struct ServiceError {
    /// Error kind.
    kind: ErrorKind,
    /// Human-readable message.
    message: String,
}

impl ServiceError {
    /// Create a new service error.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Missing or invalid actor.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Authorization denied.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Validation failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Resource absent.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// State conflict.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Gateway failure.
    #[must_use]
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Gateway, message)
    }

    /// Unexpected internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<OrderError> for ServiceError {
    fn from(err: OrderError) -> Self {
        let kind = match &err {
            OrderError::InvalidStateTransition { .. } | OrderError::VersionConflict { .. } => {
                ErrorKind::Conflict
            }
            OrderError::InvalidParameters { .. }
            | OrderError::UnknownMenuItem { .. }
            | OrderError::PriceMismatch { .. }
            | OrderError::TotalMismatch { .. } => ErrorKind::Validation,
            OrderError::NotFound { .. } => ErrorKind::NotFound,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<PaymentError> for ServiceError {
    fn from(err: PaymentError) -> Self {
        let kind = match &err {
            PaymentError::NotFound { .. } => ErrorKind::NotFound,
            PaymentError::InvalidParameters { .. } => ErrorKind::Validation,
            PaymentError::VersionConflict { .. } => ErrorKind::Conflict,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<DeliveryError> for ServiceError {
    fn from(err: DeliveryError) -> Self {
        let kind = match &err {
            DeliveryError::InvalidStateTransition { .. }
            | DeliveryError::DriverUnavailable { .. }
            | DeliveryError::AlreadyAssigned { .. }
            | DeliveryError::DriverBusy { .. }
            | DeliveryError::VersionConflict { .. } => ErrorKind::Conflict,
            DeliveryError::NotFound { .. } | DeliveryError::DriverNotFound { .. } => {
                ErrorKind::NotFound
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<CancellationError> for ServiceError {
    fn from(err: CancellationError) -> Self {
        let kind = match &err {
            CancellationError::NotEligible { .. }
            | CancellationError::AlreadyCancelled { .. }
            | CancellationError::VersionConflict { .. } => ErrorKind::Conflict,
            CancellationError::InvalidParameters { .. } => ErrorKind::Validation,
            CancellationError::NotFound { .. } => ErrorKind::NotFound,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<FilterDenial> for ServiceError {
    fn from(denial: FilterDenial) -> Self {
        Self::forbidden(denial.to_string())
    }
}

impl From<crate::application::ports::GatewayError> for ServiceError {
    fn from(err: crate::application::ports::GatewayError) -> Self {
        Self::gateway(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ordering::value_objects::OrderStatus;

    #[test]
    fn kind_http_status_mapping() {
        assert_eq!(ErrorKind::Unauthenticated.http_status(), 401);
        assert_eq!(ErrorKind::Forbidden.http_status(), 403);
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::Gateway.http_status(), 502);
        assert_eq!(ErrorKind::Internal.http_status(), 500);
    }

    #[test]
    fn order_error_kinds() {
        let err: ServiceError = OrderError::InvalidStateTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered,
            reason: "skip".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: ServiceError = OrderError::TotalMismatch {
            computed: "15.00".to_string(),
            supplied: "12.00".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: ServiceError = OrderError::NotFound {
            order_id: "ord-1".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn filter_denial_maps_to_forbidden() {
        use crate::domain::authorization::Role;
        let err: ServiceError = FilterDenial::Role(Role::Driver).into();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn display_includes_code() {
        let err = ServiceError::conflict("driver already assigned");
        assert_eq!(err.to_string(), "[CONFLICT] driver already assigned");
    }
}
