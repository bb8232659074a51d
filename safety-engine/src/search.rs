use safety_core::{CoreError, ErrorExt, Post, ResolvedLocation, SearchBackend};
use std::sync::Arc;
use tracing::{debug, info};

/// Past queries, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
    limit: Option<usize>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` entries, dropping the oldest.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, query: impl Into<String>) {
        self.entries.insert(0, query.into());
        if let Some(limit) = self.limit {
            self.entries.truncate(limit);
        }
    }

    /// Removes the entry at `index`; out of range is ignored.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank query or no location; nothing was sent.
    Skipped,
    Completed { result_count: usize },
    Failed,
}

/// Location-scoped remote search with its query, result and history state.
pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
    query_text: String,
    results: Vec<Post>,
    has_submitted: bool,
    history: SearchHistory,
    last_error: Option<CoreError>,
}

impl SearchClient {
    pub fn new(backend: Arc<dyn SearchBackend>, history_limit: Option<usize>) -> Self {
        Self {
            backend,
            query_text: String::new(),
            results: Vec::new(),
            has_submitted: false,
            history: SearchHistory::with_limit(history_limit),
            last_error: None,
        }
    }

    /// Called when the search surface opens.
    pub fn activate(&mut self) {
        self.results.clear();
        self.has_submitted = false;
    }

    /// Stores input text only. Results stay hidden until the next submit.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
        self.has_submitted = false;
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// Submits the current input text.
    pub async fn submit_current(&mut self, location: Option<&ResolvedLocation>) -> SubmitOutcome {
        let query = std::mem::take(&mut self.query_text);
        self.submit(&query, location).await
    }

    /// Sends one search request scoped to `location`. The input text is
    /// cleared afterwards whatever the outcome.
    pub async fn submit(
        &mut self,
        query: &str,
        location: Option<&ResolvedLocation>,
    ) -> SubmitOutcome {
        self.query_text.clear();

        let location = match location {
            Some(location) if !query.trim().is_empty() => location,
            _ => {
                debug!("Search skipped: blank query or unresolved location");
                self.results.clear();
                return SubmitOutcome::Skipped;
            }
        };

        self.has_submitted = true;
        match self
            .backend
            .search_posts(query, &location.match_key())
            .await
        {
            Ok(posts) => {
                info!("Search for {:?} returned {} posts", query, posts.len());
                self.results = posts;
                self.history.push(query);
                self.last_error = None;
                SubmitOutcome::Completed {
                    result_count: self.results.len(),
                }
            }
            Err(error) => {
                error.log_error();
                self.results.clear();
                self.last_error = Some(error);
                SubmitOutcome::Failed
            }
        }
    }

    pub fn results(&self) -> &[Post] {
        &self.results
    }

    /// Results to display; empty until a submission has happened.
    pub fn visible_results(&self) -> &[Post] {
        if self.has_submitted {
            &self.results
        } else {
            &[]
        }
    }

    pub fn has_submitted(&self) -> bool {
        self.has_submitted
    }

    /// Failure of the most recent submission, if it failed.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn remove_history_entry(&mut self, index: usize) -> Option<String> {
        self.history.remove(index)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use safety_core::{ApiError, Category};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        fail: bool,
        requests: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn search_posts(
            &self,
            query: &str,
            user_location: &str,
        ) -> Result<Vec<Post>, CoreError> {
            self.requests
                .lock()
                .unwrap()
                .push((query.to_string(), user_location.to_string()));

            if self.fail {
                return Err(ApiError::ServerError {
                    endpoint: "/posts/search/location".to_string(),
                    status_code: 500,
                }
                .into());
            }

            Ok(vec![Post {
                id: "1".to_string(),
                category: Category::Caution,
                title: query.to_string(),
                message: String::new(),
                timestamp: Utc::now(),
                views: 0,
                comment_count: 0,
                location_address: user_location.to_string(),
                image: None,
            }])
        }
    }

    fn gangnam() -> ResolvedLocation {
        ResolvedLocation::new("Seoul", "Gangnam")
    }

    fn client(backend: &Arc<FakeBackend>) -> SearchClient {
        SearchClient::new(backend.clone(), None)
    }

    #[tokio::test]
    async fn test_blank_query_or_missing_location_sends_nothing() {
        let backend = Arc::new(FakeBackend::default());
        let mut search = client(&backend);

        assert_eq!(search.submit("", Some(&gangnam())).await, SubmitOutcome::Skipped);
        assert_eq!(search.submit("   ", Some(&gangnam())).await, SubmitOutcome::Skipped);
        assert_eq!(search.submit("flood", None).await, SubmitOutcome::Skipped);

        assert!(backend.requests.lock().unwrap().is_empty());
        assert!(search.results().is_empty());
        assert!(!search.has_submitted());
        assert!(search.history().is_empty());
    }

    #[tokio::test]
    async fn test_submit_uses_match_form_and_records_history() {
        let backend = Arc::new(FakeBackend::default());
        let mut search = client(&backend);

        search.set_query_text("flood");
        let outcome = search.submit_current(Some(&gangnam())).await;
        assert_eq!(outcome, SubmitOutcome::Completed { result_count: 1 });
        assert!(search.has_submitted());
        assert_eq!(search.visible_results().len(), 1);
        assert_eq!(search.query_text(), "");

        search.submit("fire", Some(&gangnam())).await;
        assert_eq!(search.history().entries(), ["fire", "flood"]);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            ("flood".to_string(), "Seoul, Gangnam".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_clears_results_and_keeps_error() {
        let backend = Arc::new(FakeBackend {
            fail: true,
            ..FakeBackend::default()
        });
        let mut search = client(&backend);

        let outcome = search.submit("flood", Some(&gangnam())).await;
        assert_eq!(outcome, SubmitOutcome::Failed);
        assert!(search.has_submitted());
        assert!(search.results().is_empty());
        assert!(search.history().is_empty());
        assert_eq!(search.last_error().map(|e| e.error_code()), Some("API".to_string()));
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submitted_flag_lifecycle() {
        let backend = Arc::new(FakeBackend::default());
        let mut search = client(&backend);

        search.submit("flood", Some(&gangnam())).await;
        assert!(search.has_submitted());

        // Typing hides results without touching them
        search.set_query_text("flo");
        assert!(!search.has_submitted());
        assert_eq!(search.results().len(), 1);
        assert!(search.visible_results().is_empty());

        search.submit("flood", Some(&gangnam())).await;
        search.activate();
        assert!(!search.has_submitted());
        assert!(search.results().is_empty());
        assert_eq!(search.history().len(), 2);
    }

    #[test]
    fn test_history_order_deletion_and_cap() {
        let mut history = SearchHistory::new();
        history.push("a");
        history.push("b");
        history.push("a");
        assert_eq!(history.entries(), ["a", "b", "a"]);

        assert_eq!(history.remove(1), Some("b".to_string()));
        assert_eq!(history.remove(9), None);
        assert_eq!(history.entries(), ["a", "a"]);

        history.clear();
        assert!(history.is_empty());

        let mut capped = SearchHistory::with_limit(Some(2));
        for query in ["one", "two", "three"] {
            capped.push(query);
        }
        assert_eq!(capped.entries(), ["three", "two"]);
    }
}
