mod error;
mod mock;

pub use error::WorkerError;
pub use mock::MockResearcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A content-bearing message handed to a researcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearcherMessage {
    pub content: String,
}

/// Input for one researcher dispatch.
///
/// Carries a single message whose content is the research topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearcherRequest {
    pub researcher_messages: Vec<ResearcherMessage>,
}

impl ResearcherRequest {
    /// Builds the minimal request for a topic.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            researcher_messages: vec![ResearcherMessage {
                content: topic.into(),
            }],
        }
    }

    /// The research topic (content of the first message).
    pub fn topic(&self) -> Option<&str> {
        self.researcher_messages.first().map(|m| m.content.as_str())
    }
}

/// Successful researcher output. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearcherOutput {
    /// Condensed summary of the findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_research: Option<String>,
    /// Supporting notes, in the order the researcher produced them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_notes: Option<Vec<String>>,
}

impl ResearcherOutput {
    pub fn new(compressed_research: impl Into<String>, raw_notes: Vec<String>) -> Self {
        Self {
            compressed_research: Some(compressed_research.into()),
            raw_notes: Some(raw_notes),
        }
    }
}

/// A researcher sub-agent.
///
/// Given one research topic, produces a summary and notes or fails. The
/// supervisor makes no assumption about the shape of a failure.
///
/// # Example
///
/// ```ignore
/// use delve_core::worker::{MockResearcher, ResearchWorker, ResearcherRequest};
///
/// let worker = MockResearcher::new();
/// let output = worker.research(ResearcherRequest::for_topic("rust async")).await?;
/// ```
#[async_trait]
pub trait ResearchWorker: Send + Sync {
    /// Researches the topic carried by the request.
    async fn research(&self, request: ResearcherRequest) -> Result<ResearcherOutput, WorkerError>;
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl ResearchWorker for Box<dyn ResearchWorker> {
    async fn research(&self, request: ResearcherRequest) -> Result<ResearcherOutput, WorkerError> {
        (**self).research(request).await
    }
}
