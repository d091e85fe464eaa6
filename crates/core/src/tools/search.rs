//! # Web Search
//!
//! Topic search through SearXNG. A configured instance is tried first, then
//! a few public instances, then a local one. Failures never surface to the
//! caller; they are logged and reported as "no results".

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`. Provider failures yield an empty list.
    async fn search(&self, query: &str) -> Vec<SearchHit>;
}

const PUBLIC_INSTANCES: [&str; 3] = [
    "https://searx.be",
    "https://search.sapti.me",
    "https://searx.tiekoetter.com",
];

const LOCAL_INSTANCES: [&str; 2] = ["http://localhost:8888", "http://127.0.0.1:8888"];

pub struct SearxngSearch {
    client: reqwest::Client,
    endpoints: Vec<String>,
    max_results: usize,
}

impl SearxngSearch {
    /// Build the endpoint list: `instance` (if any), public instances, local.
    pub fn new(instance: Option<&str>, max_results: usize) -> Self {
        let mut endpoints: Vec<String> = Vec::new();
        if let Some(url) = instance.filter(|u| !u.trim().is_empty()) {
            endpoints.push(search_endpoint(url));
        }
        endpoints.extend(PUBLIC_INSTANCES.iter().map(|u| search_endpoint(u)));
        endpoints.extend(LOCAL_INSTANCES.iter().map(|u| search_endpoint(u)));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoints,
            max_results,
        }
    }

    /// Use exactly these instances, with no public or local fallback.
    pub fn with_instances(instances: &[&str], max_results: usize) -> Self {
        let mut search = Self::new(None, max_results);
        search.endpoints = instances.iter().map(|u| search_endpoint(u)).collect();
        search
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn query_endpoint(&self, endpoint: &str, query: &str) -> Result<Vec<SearchHit>, String> {
        let url = format!("{}?q={}&format=json", endpoint, urlencoding::encode(query));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        let json: Value = response.json().await.map_err(|e| e.to_string())?;
        hits_from_json(&json, self.max_results).ok_or_else(|| "no results array".to_string())
    }
}

fn search_endpoint(base: &str) -> String {
    format!("{}/search", base.trim_end_matches('/'))
}

/// Map a SearXNG JSON body to hits. Entries without a link are skipped.
fn hits_from_json(json: &Value, max_results: usize) -> Option<Vec<SearchHit>> {
    let results = json.get("results")?.as_array()?;
    Some(
        results
            .iter()
            .filter_map(|r| {
                let link = r.get("url").and_then(|u| u.as_str())?;
                Some(SearchHit {
                    title: r
                        .get("title")
                        .and_then(|t| t.as_str())
                        .unwrap_or(link)
                        .to_string(),
                    link: link.to_string(),
                    snippet: r
                        .get("content")
                        .and_then(|c| c.as_str())
                        .unwrap_or("")
                        .to_string(),
                })
            })
            .take(max_results)
            .collect(),
    )
}

#[async_trait]
impl SearchProvider for SearxngSearch {
    async fn search(&self, query: &str) -> Vec<SearchHit> {
        for endpoint in &self.endpoints {
            match self.query_endpoint(endpoint, query).await {
                Ok(hits) => {
                    tracing::debug!(endpoint = %endpoint, hits = hits.len(), "Search succeeded");
                    return hits;
                }
                Err(e) => {
                    tracing::debug!(endpoint = %endpoint, error = %e, "Search endpoint failed");
                }
            }
        }
        tracing::warn!(query = %query, "No search backend reachable, continuing without results");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_order() {
        let search = SearxngSearch::new(Some("https://search.example.org/"), 5);
        let endpoints = search.endpoints();
        assert_eq!(endpoints[0], "https://search.example.org/search");
        assert_eq!(endpoints[1], "https://searx.be/search");
        assert_eq!(endpoints.last().unwrap(), "http://127.0.0.1:8888/search");
    }

    #[test]
    fn test_blank_instance_ignored() {
        let search = SearxngSearch::new(Some("  "), 5);
        assert_eq!(search.endpoints()[0], "https://searx.be/search");
    }

    #[test]
    fn test_hits_from_json() {
        let body = json!({
            "results": [
                { "title": "Indexes 101", "url": "https://a.example", "content": "B-trees" },
                { "title": "No link" },
                { "url": "https://b.example" },
                { "title": "Third", "url": "https://c.example" }
            ]
        });
        let hits = hits_from_json(&body, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Indexes 101");
        assert_eq!(hits[0].snippet, "B-trees");
        assert_eq!(hits[1].title, "https://b.example");

        assert!(hits_from_json(&json!({ "error": "x" }), 5).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_instances_yield_nothing() {
        let search = SearxngSearch::with_instances(&["http://127.0.0.1:9"], 5);
        assert!(search.search("rust").await.is_empty());
    }
}
