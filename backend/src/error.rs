//! Error types for summarization.
//!
//! Every error carries a structured [`ErrorContext`] describing which
//! summarizer and operation failed. Errors are `Clone` so a single in-flight
//! computation can hand the same failure to every waiter.

use std::fmt;

/// Result type for summarization operations.
pub type SummarizerResult<T> = Result<T, SummarizerError>;

/// Structured context for summarization errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "properties", "fit_linear_model")
    pub operation: Option<String>,
    /// The summarizer involved (e.g., "TrendWeeklyElaboration")
    pub summarizer: Option<String>,
    /// The dataset the configuration refers to
    pub dataset: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_summarizer(mut self, summarizer: impl Into<String>) -> Self {
        self.summarizer = Some(summarizer.into());
        self
    }

    pub fn with_dataset(mut self, dataset: impl ToString) -> Self {
        self.dataset = Some(dataset.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref summarizer) = self.summarizer {
            parts.push(format!("summarizer={}", summarizer));
        }
        if let Some(ref dataset) = self.dataset {
            parts.push(format!("dataset={}", dataset));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for summarization operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SummarizerError {
    /// Malformed or missing configuration. Raised before any computation starts.
    #[error("Configuration error: {message} {context}")]
    Config {
        message: String,
        context: ErrorContext,
    },

    /// Not enough points or weeks for a fit or grouping.
    #[error("Insufficient data: {message} {context}")]
    InsufficientData {
        message: String,
        context: ErrorContext,
    },

    /// NaN or otherwise non-numeric input to a numeric routine.
    #[error("Invalid input: {message} {context}")]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    /// The service dependency graph contains a cycle. A programming error.
    #[error("Cyclic dependency: {message} {context}")]
    CyclicDependency {
        message: String,
        context: ErrorContext,
    },

    /// The time series supplier failed.
    #[error("Data source error: {message} {context}")]
    DataSource {
        message: String,
        context: ErrorContext,
    },

    /// The computation was cancelled by an invalidation.
    #[error("Cancelled: {message} {context}")]
    Cancelled {
        message: String,
        context: ErrorContext,
    },
}

impl SummarizerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn cyclic_dependency(message: impl Into<String>) -> Self {
        Self::CyclicDependency {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::InsufficientData { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::CyclicDependency { context, .. }
            | Self::DataSource { context, .. }
            | Self::Cancelled { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::InsufficientData { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::CyclicDependency { context, .. }
            | Self::DataSource { context, .. }
            | Self::Cancelled { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the summarizer in the error context.
    pub fn with_summarizer(mut self, summarizer: impl Into<String>) -> Self {
        self.context_mut().summarizer = Some(summarizer.into());
        self
    }

    pub fn with_dataset(mut self, dataset: impl ToString) -> Self {
        self.context_mut().dataset = Some(dataset.to_string());
        self
    }
}
