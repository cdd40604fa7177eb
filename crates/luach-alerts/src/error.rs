use crate::config::ConfigError;
use crate::schedule::ScheduleError;
use crate::telemetry::TelemetryError;
use crate::workflows::celebrations::{CelebrationError, ConversionError, DeliveryError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Celebration(CelebrationError),
    Schedule(ScheduleError),
    Conversion(ConversionError),
    Mail(DeliveryError),
    /// Some notifications could not be sent; the rest were attempted.
    Delivery { failed: usize, attempted: usize },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Celebration(err) => write!(f, "workflow error: {}", err),
            AppError::Schedule(err) => write!(f, "schedule error: {}", err),
            AppError::Conversion(err) => write!(f, "calendar error: {}", err),
            AppError::Mail(err) => write!(f, "mail error: {}", err),
            AppError::Delivery { failed, attempted } => {
                write!(f, "{failed} of {attempted} notifications failed")
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Celebration(err) => Some(err),
            AppError::Schedule(err) => Some(err),
            AppError::Conversion(err) => Some(err),
            AppError::Mail(err) => Some(err),
            AppError::Delivery { .. } => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<CelebrationError> for AppError {
    fn from(value: CelebrationError) -> Self {
        Self::Celebration(value)
    }
}

impl From<ScheduleError> for AppError {
    fn from(value: ScheduleError) -> Self {
        Self::Schedule(value)
    }
}

impl From<ConversionError> for AppError {
    fn from(value: ConversionError) -> Self {
        Self::Conversion(value)
    }
}

impl From<DeliveryError> for AppError {
    fn from(value: DeliveryError) -> Self {
        Self::Mail(value)
    }
}
