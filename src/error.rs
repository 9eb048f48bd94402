use crate::config::InferenceMode;
use crate::domain::payment::{PaymentEvent, PaymentId, PaymentState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wallet SDK failed to load: {0}")]
    SdkLoadFailure(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),
    #[error("Payment cancelled: {0}")]
    PaymentCancelled(PaymentId),
    #[error("Payment error: {message}")]
    PaymentError {
        payment_id: Option<PaymentId>,
        message: String,
    },
    #[error("Inference skipped: no image selected")]
    InferenceSkipped,
    #[error("Inference is not available in {0:?} mode")]
    InferenceUnavailable(InferenceMode),
    #[error("Inference failed: {0}")]
    InferenceFailure(String),
    #[error("User is not authenticated")]
    NotAuthenticated,
    #[error("Another payment is still in progress")]
    PaymentInProgress,
    #[error("Invalid payment transition from {from:?} on {event}")]
    InvalidTransition {
        from: PaymentState,
        event: &'static str,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub(crate) fn invalid_transition(from: PaymentState, event: &PaymentEvent) -> Self {
        AppError::InvalidTransition {
            from,
            event: event.name(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
