//! GitHub profile adapter — public REST API, no scraping.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Source;

const GITHUB_API_URL: &str = "https://api.github.com";
const REPOS_PER_PAGE: u32 = 100;
const EVENTS_PER_PAGE: u32 = 30;
/// Only the most recent events are handed to the model.
const RECENT_EVENTS_KEPT: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub public_repos: Option<u32>,
    pub public_gists: Option<u32>,
    pub followers: Option<u32>,
    pub following: Option<u32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubRepo {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubEventRepo {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub repo: GithubEventRepo,
    pub created_at: Option<String>,
}

/// Everything fetched for one profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubProfile {
    pub user: GithubUser,
    pub repositories: Vec<GithubRepo>,
    pub recent_events: Vec<GithubEvent>,
}

/// Aggregates computed locally, without a model call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GithubAggregates {
    pub total_stars: u64,
    pub languages_used: Vec<String>,
    pub repo_topics: Vec<String>,
    pub original_repos: usize,
    pub forked_repos: usize,
}

impl GithubProfile {
    pub fn summarize(&self) -> GithubAggregates {
        let mut languages = BTreeSet::new();
        let mut topics = BTreeSet::new();
        let mut total_stars = 0;
        let mut forked_repos = 0;

        for repo in &self.repositories {
            if let Some(language) = repo.language.as_deref().filter(|l| !l.is_empty()) {
                languages.insert(language.to_string());
            }
            topics.extend(repo.topics.iter().cloned());
            total_stars += repo.stargazers_count;
            if repo.fork {
                forked_repos += 1;
            }
        }

        GithubAggregates {
            total_stars,
            languages_used: languages.into_iter().collect(),
            repo_topics: topics.into_iter().collect(),
            original_repos: self.repositories.len() - forked_repos,
            forked_repos,
        }
    }

    /// Serialized profile plus aggregates, as handed to the model.
    pub fn to_prompt_input(&self) -> String {
        let document = serde_json::json!({
            "profile": self.user,
            "aggregates": self.summarize(),
            "repositories": self.repositories,
            "recent_events": self.recent_events,
            "api_note": "Contribution graph data is not available via the API.",
        });
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string())
    }
}

/// Last non-empty path segment of a profile URL: `https://github.com/octocat/` → `octocat`.
pub fn username_from_url(url: &str) -> Option<&str> {
    url.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|s| s.split(['?', '#']).next().unwrap_or(s))
        .filter(|s| !s.is_empty() && !s.contains(':') && *s != "github.com")
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(20))
                .user_agent(concat!("resume-enricher/", env!("CARGO_PKG_VERSION")))
                .build()?,
            api_base: GITHUB_API_URL.to_string(),
            token,
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .header(header::ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    /// Fetches a JSON list; any failure degrades to an empty list.
    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Vec<T> {
        match self.get(path).await {
            Ok(response) if response.status() == StatusCode::OK => {
                response.json::<Vec<T>>().await.unwrap_or_else(|e| {
                    warn!("GitHub {path} returned unreadable JSON: {e}");
                    Vec::new()
                })
            }
            Ok(response) => {
                warn!("GitHub {path} returned {}", response.status());
                Vec::new()
            }
            Err(e) => {
                warn!("GitHub {path} request failed: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_profile(&self, username: &str) -> Option<GithubProfile> {
        let user = match self.get(&format!("/users/{username}")).await {
            Ok(response) if response.status() == StatusCode::OK => {
                match response.json::<GithubUser>().await {
                    Ok(user) => user,
                    Err(e) => {
                        warn!("GitHub user payload unreadable: {e}");
                        return None;
                    }
                }
            }
            Ok(response) => {
                warn!("GitHub user {username} lookup returned {}", response.status());
                return None;
            }
            Err(e) => {
                warn!("GitHub user {username} lookup failed: {e}");
                return None;
            }
        };

        let repos_path = format!("/users/{username}/repos?per_page={REPOS_PER_PAGE}");
        let events_path = format!("/users/{username}/events/public?per_page={EVENTS_PER_PAGE}");
        let (repositories, mut recent_events) = tokio::join!(
            self.get_list::<GithubRepo>(&repos_path),
            self.get_list::<GithubEvent>(&events_path),
        );
        recent_events.truncate(RECENT_EVENTS_KEPT);

        debug!(
            "GitHub profile {username}: {} repos, {} events",
            repositories.len(),
            recent_events.len()
        );

        Some(GithubProfile {
            user,
            repositories,
            recent_events,
        })
    }
}

#[async_trait]
impl Source<GithubProfile> for GithubClient {
    async fn fetch(&self, locator: &str) -> Option<GithubProfile> {
        let Some(username) = username_from_url(locator) else {
            warn!("No GitHub username in '{locator}'");
            return None;
        };
        self.fetch_profile(username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(language: Option<&str>, stars: u64, topics: &[&str], fork: bool) -> GithubRepo {
        GithubRepo {
            name: Some("repo".to_string()),
            language: language.map(String::from),
            stargazers_count: stars,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            fork,
            ..GithubRepo::default()
        }
    }

    #[test]
    fn test_username_from_url_variants() {
        assert_eq!(username_from_url("https://github.com/octocat"), Some("octocat"));
        assert_eq!(username_from_url("https://github.com/octocat/"), Some("octocat"));
        assert_eq!(
            username_from_url("https://github.com/octocat?tab=repositories"),
            Some("octocat")
        );
        assert_eq!(username_from_url("https://github.com/"), None);
        assert_eq!(username_from_url(""), None);
    }

    #[test]
    fn test_summarize_dedups_and_sorts() {
        let profile = GithubProfile {
            repositories: vec![
                repo(Some("Rust"), 10, &["cli", "parser"], false),
                repo(Some("Go"), 3, &["cli"], false),
                repo(Some("Rust"), 0, &[], true),
                repo(None, 2, &["async"], false),
            ],
            ..GithubProfile::default()
        };

        let aggregates = profile.summarize();
        assert_eq!(aggregates.total_stars, 15);
        assert_eq!(aggregates.languages_used, vec!["Go", "Rust"]);
        assert_eq!(aggregates.repo_topics, vec!["async", "cli", "parser"]);
        assert_eq!(aggregates.original_repos, 3);
        assert_eq!(aggregates.forked_repos, 1);
    }

    #[test]
    fn test_repo_deserializes_from_api_shape() {
        let json = r#"{
            "name": "templar",
            "full_name": "octocat/templar",
            "description": null,
            "language": "Rust",
            "fork": false,
            "stargazers_count": 42,
            "forks_count": 3,
            "topics": ["resume"],
            "html_url": "https://github.com/octocat/templar",
            "unrelated_field": true
        }"#;
        let repo: GithubRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.stargazers_count, 42);
        assert_eq!(repo.topics, vec!["resume"]);
    }

    #[test]
    fn test_prompt_input_contains_aggregates() {
        let profile = GithubProfile {
            repositories: vec![repo(Some("Rust"), 7, &[], false)],
            ..GithubProfile::default()
        };
        let input = profile.to_prompt_input();
        assert!(input.contains("\"total_stars\": 7"));
        assert!(input.contains("\"languages_used\""));
    }

    #[tokio::test]
    async fn test_fetch_profile_joins_repos_and_events() {
        use axum::{routing::get, Json, Router};
        use serde_json::json;

        let events: Vec<_> = (0..15)
            .map(|i| json!({"type": "PushEvent", "repo": {"name": format!("ada/r{i}")}}))
            .collect();
        let app = Router::new()
            .route("/users/ada", get(|| async { Json(json!({"login": "ada", "followers": 5})) }))
            .route(
                "/users/ada/repos",
                get(|| async { Json(json!([{"name": "engine", "stargazers_count": 4}])) }),
            )
            .route(
                "/users/ada/events/public",
                get(move || async move { Json(events) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let mut client = GithubClient::new(None).unwrap();
        client.api_base = format!("http://{addr}");

        let profile = client.fetch("https://github.com/ada").await.unwrap();
        assert_eq!(profile.user.login.as_deref(), Some("ada"));
        assert_eq!(profile.repositories.len(), 1);
        assert_eq!(profile.recent_events.len(), RECENT_EVENTS_KEPT);
    }
}
