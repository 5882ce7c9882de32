/// Candidate sources and query dispatch
///
/// A candidate source resolves a query string to an ordered list of
/// candidates. Ranking is the source's business; the session shows results
/// in the order given.
///
/// Queries are fire-and-forget from the session's point of view. The session
/// hands out a [`QueryRequest`] tagged with a [`QueryTicket`]; whoever runs
/// the request later feeds the [`QueryResponse`] back through
/// `HashtagSession::apply_response`, on the same thread that owns the
/// session. The ticket's generation lets the session drop results for
/// superseded queries.
use crate::error::SourceError;
use crate::types::Candidate;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Resolves a query string to candidates
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Fetch candidates for the text typed after the trigger
    ///
    /// An error is shown to the user as if no candidates matched.
    async fn candidates(&self, query: &str) -> Result<Vec<Candidate>, SourceError>;
}

/// Identifies the trigger context a query was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryTicket {
    pub generation: u64,
    pub start_offset: usize,
}

/// A query waiting to be sent to a candidate source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub ticket: QueryTicket,
    pub query: String,
}

impl QueryRequest {
    /// Run the query against a source
    pub async fn resolve(self, source: &dyn CandidateSource) -> QueryResponse {
        let result = source.candidates(&self.query).await;
        QueryResponse {
            ticket: self.ticket,
            query: self.query,
            result,
        }
    }
}

/// The outcome of a query, ready to be applied to the session
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub ticket: QueryTicket,
    pub query: String,
    pub result: Result<Vec<Candidate>, SourceError>,
}

/// Run a query on the tokio runtime and deliver the response on a channel
///
/// The receiving end belongs to the event loop that owns the session. If the
/// receiver has gone away the response is dropped.
pub fn spawn_query(
    source: Arc<dyn CandidateSource>,
    request: QueryRequest,
    responses: UnboundedSender<QueryResponse>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let generation = request.ticket.generation;
        let response = request.resolve(source.as_ref()).await;
        if responses.send(response).is_err() {
            tracing::debug!(generation, "query response dropped; receiver closed");
        }
    })
}

/// Case-insensitive prefix matching over a fixed candidate list
pub struct StaticCandidateSource {
    candidates: Vec<Candidate>,
    limit: Option<usize>,
}

impl StaticCandidateSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            limit: None,
        }
    }

    /// Build from plain values, using each value's position as its id
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Candidate::new(i.to_string(), value))
            .collect();
        Self::new(candidates)
    }

    /// Return at most `limit` candidates per query
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, query: &str) -> Vec<Candidate> {
        let query = query.to_lowercase();
        let matching = self
            .candidates
            .iter()
            .filter(|candidate| candidate.value.to_lowercase().starts_with(&query))
            .cloned();

        match self.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

#[async_trait]
impl CandidateSource for StaticCandidateSource {
    async fn candidates(&self, query: &str) -> Result<Vec<Candidate>, SourceError> {
        Ok(self.matches(query))
    }
}

/// Adapts an async closure into a candidate source
pub struct FnCandidateSource<F> {
    f: F,
}

impl<F, Fut> FnCandidateSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Candidate>, SourceError>> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> CandidateSource for FnCandidateSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Candidate>, SourceError>> + Send,
{
    async fn candidates(&self, query: &str) -> Result<Vec<Candidate>, SourceError> {
        (self.f)(query.to_string()).await
    }
}
