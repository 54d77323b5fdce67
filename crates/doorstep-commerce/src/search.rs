//! Service search for the header search box.
//!
//! Each keystroke starts a query; a query waits out the debounce period and
//! is dropped if another one started meanwhile. Responses that arrive after
//! a newer query began are discarded as well.

use crate::api::StorefrontApi;
use crate::catalog::CatalogItem;
use crate::config::SearchConfig;
use crate::latest::{Fetched, LatestOnly};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchHit {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "title")]
    pub name: String,
    pub category: String,
    pub price: Option<Money>,
    #[serde(alias = "image")]
    pub image_url: String,
}

impl From<&CatalogItem> for SearchHit {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: Some(item.id.to_string()),
            name: item.name.clone(),
            category: item.category.clone(),
            price: Some(item.price),
            image_url: item.image_url.clone(),
        }
    }
}

/// Debounced, latest-only search over [`StorefrontApi::search`].
pub struct SearchSession<A> {
    api: Arc<A>,
    latest: LatestOnly,
    debounce: Duration,
    min_query_len: usize,
}

impl<A: StorefrontApi> SearchSession<A> {
    pub fn new(api: Arc<A>, config: &SearchConfig) -> Self {
        Self {
            api,
            latest: LatestOnly::new(),
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_len: config.min_query_len,
        }
    }

    /// Run a query. Queries shorter than the minimum length return no hits
    /// without a network call. A failed search yields no hits.
    pub async fn query(&self, text: &str) -> Fetched<Vec<SearchHit>> {
        let ticket = self.latest.begin();
        let text = text.trim();
        if text.chars().count() < self.min_query_len {
            return self.latest.settle(ticket, Vec::new());
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if !self.latest.is_current(ticket) {
                debug!(query = text, "search superseded while debouncing");
                return Fetched::Superseded;
            }
        }

        let hits = match self.api.search(text).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, query = text, "search failed");
                Vec::new()
            }
        };
        self.latest.settle(ticket, hits)
    }

    /// Drop whatever query is in flight, e.g. when the search box closes.
    pub fn cancel(&self) {
        self.latest.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, InMemoryStorefront};
    use crate::catalog::{ServiceDocument, SubServiceRecord};
    use serde_json::json;

    fn api() -> Arc<InMemoryStorefront> {
        Arc::new(InMemoryStorefront::new().with_catalog(
            vec![],
            vec![
                ServiceDocument::new("g", "Geyser", vec![SubServiceRecord::new("Geyser repair", 349)]),
                ServiceDocument::new("a", "AC Repair", vec![SubServiceRecord::new("Gas refill", 2499)]),
            ],
        ))
    }

    fn config(debounce_ms: u64) -> SearchConfig {
        SearchConfig {
            debounce_ms,
            min_query_len: 2,
        }
    }

    #[tokio::test]
    async fn test_query_returns_hits() {
        let session = SearchSession::new(api(), &config(0));
        let hits = session.query("gey").await.into_current().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Geyser repair");
        assert_eq!(hits[0].price, Some(Money::from_rupees(349)));
    }

    #[tokio::test]
    async fn test_short_query_skips_network() {
        let api = api();
        let session = SearchSession::new(api.clone(), &config(0));
        assert_eq!(session.query(" g ").await, Fetched::Current(Vec::new()));
        assert_eq!(api.calls(Endpoint::Search), 0);
    }

    #[tokio::test]
    async fn test_debounce_keeps_only_latest() {
        let api = api();
        let session = SearchSession::new(api.clone(), &config(30));

        let (first, second) = tokio::join!(session.query("ge"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.query("gas").await
        });
        assert!(first.is_superseded());
        assert_eq!(second.into_current().unwrap()[0].name, "Gas refill");
        assert_eq!(api.calls(Endpoint::Search), 1);
    }

    #[tokio::test]
    async fn test_cancel_discards_result() {
        let session = SearchSession::new(api(), &config(20));
        let (result, ()) = tokio::join!(session.query("geyser"), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session.cancel();
        });
        assert!(result.is_superseded());
    }

    #[tokio::test]
    async fn test_failure_yields_no_hits() {
        let api = api();
        api.fail_always(Endpoint::Search);
        let session = SearchSession::new(api, &config(0));
        assert_eq!(session.query("geyser").await, Fetched::Current(Vec::new()));
    }

    #[test]
    fn test_hit_parses_loose_shape() {
        let hit: SearchHit = serde_json::from_value(json!({
            "_id": "x",
            "title": "Chimney cleaning",
            "price": "599"
        }))
        .unwrap();
        assert_eq!(hit.name, "Chimney cleaning");
        assert_eq!(hit.price, Some(Money::from_rupees(599)));
        assert_eq!(hit.category, "");
    }
}
