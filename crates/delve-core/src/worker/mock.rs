use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ResearchWorker, ResearcherOutput, ResearcherRequest, WorkerError};
use crate::config::{ResearcherConfig, DEFAULT_FAIL_MARKER};

/// Deterministic researcher for tests and offline runs.
///
/// Answers every topic with `"summary for {topic}"` and a single
/// `"note:{topic}"`, and fails any topic containing the fail marker.
/// Every dispatch is counted, including failures.
#[derive(Debug)]
pub struct MockResearcher {
    fail_marker: String,
    calls: AtomicUsize,
    topics: Mutex<Vec<String>>,
}

impl Default for MockResearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResearcher {
    /// Creates a researcher that fails on topics containing "FAIL".
    pub fn new() -> Self {
        Self::with_fail_marker(DEFAULT_FAIL_MARKER)
    }

    /// Creates a researcher with a custom fail marker.
    ///
    /// An empty marker disables failures.
    pub fn with_fail_marker(marker: impl Into<String>) -> Self {
        Self {
            fail_marker: marker.into(),
            calls: AtomicUsize::new(0),
            topics: Mutex::new(Vec::new()),
        }
    }

    /// Creates a researcher from configuration.
    pub fn from_config(config: &ResearcherConfig) -> Self {
        Self::with_fail_marker(config.fail_marker.clone())
    }

    /// Number of dispatches received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Topics received so far, in dispatch order.
    pub fn topics(&self) -> Vec<String> {
        self.topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn should_fail(&self, topic: &str) -> bool {
        !self.fail_marker.is_empty() && topic.contains(&self.fail_marker)
    }
}

#[async_trait]
impl ResearchWorker for MockResearcher {
    async fn research(&self, request: ResearcherRequest) -> Result<ResearcherOutput, WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let topic = request.topic().unwrap_or_default().to_string();
        self.topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(topic.clone());

        if self.should_fail(&topic) {
            return Err(WorkerError::failed(format!(
                "simulated researcher failure for '{}'",
                topic
            )));
        }

        Ok(ResearcherOutput::new(
            format!("summary for {}", topic),
            vec![format!("note:{}", topic)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let worker = MockResearcher::new();
        let output = worker
            .research(ResearcherRequest::for_topic("GOOD1"))
            .await
            .unwrap();

        assert_eq!(output.compressed_research.as_deref(), Some("summary for GOOD1"));
        assert_eq!(output.raw_notes, Some(vec!["note:GOOD1".to_string()]));
        assert_eq!(worker.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_is_counted() {
        let worker = MockResearcher::new();
        let result = worker.research(ResearcherRequest::for_topic("FAIL-THIS")).await;

        assert!(matches!(result, Err(WorkerError::Failed(_))));
        assert_eq!(worker.calls(), 1);
        assert_eq!(worker.topics(), vec!["FAIL-THIS"]);
    }

    #[tokio::test]
    async fn test_empty_marker_never_fails() {
        let worker = MockResearcher::with_fail_marker("");
        assert!(worker
            .research(ResearcherRequest::for_topic("FAIL"))
            .await
            .is_ok());
    }
}
