use safety_core::CategoryFilter;
use tokio::sync::watch;
use tracing::debug;

/// The active category filter. Starts at `All`; every transition is allowed.
#[derive(Debug)]
pub struct CategorySelector {
    current: watch::Sender<CategoryFilter>,
}

impl CategorySelector {
    pub fn new() -> Self {
        let (current, _) = watch::channel(CategoryFilter::All);
        Self { current }
    }

    /// Seeds from a navigation `filter` parameter, or resets to `All`.
    pub fn activate(&self, filter_param: Option<&str>) -> CategoryFilter {
        let filter = filter_param
            .map(CategoryFilter::parse_label)
            .unwrap_or_default();
        debug!("Category selector activated with {}", filter);
        self.current.send_replace(filter.clone());
        filter
    }

    pub fn select(&self, filter: CategoryFilter) {
        self.current.send_replace(filter);
    }

    pub fn current(&self) -> CategoryFilter {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoryFilter> {
        self.current.subscribe()
    }
}

impl Default for CategorySelector {
    fn default() -> Self {
        Self::new()
    }
}
