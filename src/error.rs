//! Error handling and custom error types
//!
//! Provides unified error handling across the identification pipeline using
//! thiserror. Every pipeline component returns [`Result`]; the orchestrator
//! wraps the originating [`Error`] in an [`IdentificationFailure`] together
//! with the [`Stage`] it happened in.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Image encoding error: {0}")]
    Encoding(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Plant not identifiable: {0}")]
    NotIdentifiable(String),

    #[error("Identification cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// How a failure should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The model looked at the photo and could not recognize a plant.
    NotIdentifiable,
    /// Anything that went wrong on our side or the wire.
    Technical,
    /// The caller abandoned the flow.
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::NotIdentifiable(_) => FailureKind::NotIdentifiable,
            Error::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Technical,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Position of an orchestration run in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Compressing,
    Requesting,
    Parsing,
    Succeeded,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "Idle",
            Stage::Compressing => "Compressing",
            Stage::Requesting => "Requesting",
            Stage::Parsing => "Parsing",
            Stage::Succeeded => "Succeeded",
            Stage::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Terminal failure of one orchestration run.
#[derive(Error, Debug)]
#[error("failed during {stage}: {source}")]
pub struct IdentificationFailure {
    /// Stage that was active when the error surfaced.
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl IdentificationFailure {
    pub fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }

    pub fn kind(&self) -> FailureKind {
        self.source.kind()
    }

    /// Short message suitable for the failure screen.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::NotIdentifiable => {
                "We couldn't recognize a plant. Try a clearer photo."
            }
            FailureKind::Technical => "Something went wrong. Please try again.",
            FailureKind::Cancelled => "Identification cancelled.",
        }
    }
}
