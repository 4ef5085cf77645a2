//! Source Adapters — fetch raw content for one external source.
//!
//! Contract: ordinary failures (404, timeout, empty page, unreadable file) come
//! back as `None`, never as a panic or error. Retries and timeouts are each
//! adapter's own business; collectors treat a fetch as all-or-nothing.

use std::sync::Arc;

use async_trait::async_trait;

pub mod document;
pub mod github;
pub mod web;

pub use document::DocumentReader;
pub use github::{GithubClient, GithubProfile};
pub use web::WebPageFetcher;

/// Uniform fetch capability. `locator` is a file path or a URL.
#[async_trait]
pub trait Source<T>: Send + Sync {
    async fn fetch(&self, locator: &str) -> Option<T>;
}

/// The adapters one request needs, injected into the pipeline at startup.
#[derive(Clone)]
pub struct Sources {
    /// Resume and LinkedIn export files.
    pub documents: Arc<dyn Source<String>>,
    pub github: Arc<dyn Source<GithubProfile>>,
    /// Portfolio and other-link pages.
    pub web: Arc<dyn Source<String>>,
}

impl Sources {
    pub fn live(github_token: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            documents: Arc::new(DocumentReader),
            github: Arc::new(GithubClient::new(github_token)?),
            web: Arc::new(WebPageFetcher::new()?),
        })
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory sources keyed by locator.

    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{GithubProfile, Source, Sources};

    #[derive(Clone)]
    pub struct StaticSource<T> {
        entries: HashMap<String, T>,
    }

    impl<T: Clone + Send + Sync> StaticSource<T> {
        pub fn new() -> Self {
            Self {
                entries: HashMap::new(),
            }
        }

        pub fn with(mut self, locator: &str, value: T) -> Self {
            self.entries.insert(locator.to_string(), value);
            self
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync> Source<T> for StaticSource<T> {
        async fn fetch(&self, locator: &str) -> Option<T> {
            self.entries.get(locator).cloned()
        }
    }

    pub fn sources(
        documents: StaticSource<String>,
        github: StaticSource<GithubProfile>,
        web: StaticSource<String>,
    ) -> Sources {
        Sources {
            documents: Arc::new(documents),
            github: Arc::new(github),
            web: Arc::new(web),
        }
    }
}
