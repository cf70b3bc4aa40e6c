//! Pipeline configuration.
//!
//! [`PipelineConfig`] selects the status table used for classification and
//! the default time callers wait for a request to complete.

use std::time::Duration;

use crate::status::{Disposition, StatusCode, StatusTable};

/// Settings for a [`ResponsePipeline`](crate::pipeline::ResponsePipeline).
///
/// By default the standard status table is used and waits have no timeout.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use gremwire::{
///     config::PipelineConfig,
///     status::{Disposition, StatusCode},
/// };
///
/// let config = PipelineConfig::default()
///     .with_completion_timeout(Duration::from_secs(30))
///     .with_status(StatusCode::new(203), Disposition::Success);
/// assert_eq!(config.completion_timeout(), Some(Duration::from_secs(30)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    status_table: StatusTable,
    completion_timeout: Option<Duration>,
}

impl PipelineConfig {
    /// Replace the status table used for classification.
    #[must_use]
    pub fn with_status_table(mut self, table: StatusTable) -> Self {
        self.status_table = table;
        self
    }

    /// Add or replace a single status code disposition.
    #[must_use]
    pub fn with_status(mut self, code: StatusCode, disposition: Disposition) -> Self {
        self.status_table.insert(code, disposition);
        self
    }

    /// Abandon requests whose callers wait longer than `timeout`.
    #[must_use]
    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = Some(timeout);
        self
    }

    /// Wait for completion without a timeout.
    #[must_use]
    pub fn without_completion_timeout(mut self) -> Self {
        self.completion_timeout = None;
        self
    }

    /// Status table used for classification.
    #[must_use]
    pub fn status_table(&self) -> &StatusTable { &self.status_table }

    /// Default completion timeout, if any.
    #[must_use]
    pub fn completion_timeout(&self) -> Option<Duration> { self.completion_timeout }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::PipelineConfig;
    use crate::status::{Disposition, Outcome, StatusCode, StatusTable};

    #[test]
    fn defaults_use_standard_table_without_timeout() {
        let config = PipelineConfig::default();
        assert_eq!(config.status_table(), &StatusTable::standard());
        assert_eq!(config.completion_timeout(), None);
    }

    #[test]
    fn builders_override_defaults() {
        let config = PipelineConfig::default()
            .with_completion_timeout(Duration::from_millis(5))
            .with_status(StatusCode::new(209), Disposition::Partial);
        assert_eq!(config.completion_timeout(), Some(Duration::from_millis(5)));
        assert_eq!(
            config.status_table().classify(StatusCode::new(209)),
            Outcome::SuccessPartial
        );

        let config = config
            .without_completion_timeout()
            .with_status_table(StatusTable::empty());
        assert_eq!(config.completion_timeout(), None);
        assert!(config.status_table().disposition(StatusCode::SUCCESS).is_none());
    }
}
