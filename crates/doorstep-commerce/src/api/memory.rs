//! In-memory [`StorefrontApi`] for tests and offline development.

use crate::api::StorefrontApi;
use crate::cart::{CartItem, CartRecord};
use crate::catalog::{CategoryRecord, ServiceDocument};
use crate::checkout::{Enquiry, EnquiryReceipt};
use crate::identity::AuthToken;
use crate::ids::{EnquiryId, SubServiceId};
use crate::search::SearchHit;
use async_trait::async_trait;
use doorstep_data::FetchError;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Identifies one API operation, for scripting failures and counting calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Categories,
    Services,
    ServicesInCategory,
    Cart,
    AddToCart,
    RemoveFromCart,
    ClearCart,
    SubmitEnquiry,
    Search,
}

#[derive(Debug, Default)]
struct State {
    categories: Vec<CategoryRecord>,
    services: Vec<ServiceDocument>,
    carts: HashMap<String, Vec<CartItem>>,
    enquiries: Vec<Enquiry>,
    fail_next: HashMap<Endpoint, Vec<String>>,
    fail_always: HashSet<Endpoint>,
    calls: HashMap<Endpoint, usize>,
}

/// A storefront backend held in memory.
///
/// Carts are keyed by bearer token. Failures can be scripted per endpoint:
/// [`fail_next`](Self::fail_next) answers with an HTTP 500 carrying the given
/// message, [`fail_always`](Self::fail_always) fails at the transport level
/// until [`recover`](Self::recover) is called.
#[derive(Debug, Default)]
pub struct InMemoryStorefront {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl InMemoryStorefront {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalog.
    pub fn with_catalog(
        self,
        categories: Vec<CategoryRecord>,
        services: Vec<ServiceDocument>,
    ) -> Self {
        {
            let mut state = self.lock();
            state.categories = categories;
            state.services = services;
        }
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail the next call to `endpoint` with an HTTP 500 carrying `message`.
    /// Calls queue up: scripting twice fails the next two calls.
    pub fn fail_next(&self, endpoint: Endpoint, message: impl Into<String>) {
        self.lock()
            .fail_next
            .entry(endpoint)
            .or_default()
            .push(message.into());
    }

    /// Fail every call to `endpoint` as if the network were down.
    pub fn fail_always(&self, endpoint: Endpoint) {
        self.lock().fail_always.insert(endpoint);
    }

    /// Undo [`fail_always`](Self::fail_always) for `endpoint`.
    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().fail_always.remove(&endpoint);
    }

    /// Number of calls made to `endpoint`, including failed ones.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Replace the server-side cart for `token`.
    pub fn seed_cart(&self, token: &AuthToken, items: Vec<CartItem>) {
        self.lock().carts.insert(token.expose().to_string(), items);
    }

    /// The server-side cart for `token`.
    pub fn cart_of(&self, token: &AuthToken) -> Vec<CartItem> {
        self.lock()
            .carts
            .get(token.expose())
            .cloned()
            .unwrap_or_default()
    }

    /// Enquiries received so far.
    pub fn enquiries(&self) -> Vec<Enquiry> {
        self.lock().enquiries.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        *state.calls.entry(endpoint).or_default() += 1;
        if state.fail_always.contains(&endpoint) {
            return Err(FetchError::RequestError("connection refused".to_string()));
        }
        if let Some(queue) = state.fail_next.get_mut(&endpoint) {
            if !queue.is_empty() {
                let message = queue.remove(0);
                return Err(FetchError::HttpError {
                    status: 500,
                    message,
                });
            }
        }
        Ok(())
    }

    async fn enter_as(&self, endpoint: Endpoint, token: &AuthToken) -> Result<(), FetchError> {
        self.enter(endpoint).await?;
        if token.is_empty() {
            return Err(FetchError::HttpError {
                status: 401,
                message: "Unauthorized".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorefrontApi for InMemoryStorefront {
    async fn categories(&self) -> Result<Vec<CategoryRecord>, FetchError> {
        self.enter(Endpoint::Categories).await?;
        Ok(self.lock().categories.clone())
    }

    async fn services(&self) -> Result<Vec<ServiceDocument>, FetchError> {
        self.enter(Endpoint::Services).await?;
        Ok(self.lock().services.clone())
    }

    async fn services_in_category(&self, name: &str) -> Result<Vec<ServiceDocument>, FetchError> {
        self.enter(Endpoint::ServicesInCategory).await?;
        let wanted = name.trim().to_lowercase();
        Ok(self
            .lock()
            .services
            .iter()
            .filter(|doc| doc.category_name().to_lowercase() == wanted)
            .cloned()
            .collect())
    }

    async fn cart(&self, token: &AuthToken) -> Result<Vec<CartRecord>, FetchError> {
        self.enter_as(Endpoint::Cart, token).await?;
        // Round-trip through JSON so callers see the same shapes as over HTTP.
        let items = self.cart_of(token);
        let value = serde_json::to_value(&items)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn add_to_cart(&self, token: &AuthToken, item: &CartItem) -> Result<(), FetchError> {
        self.enter_as(Endpoint::AddToCart, token).await?;
        let mut state = self.lock();
        let cart = state.carts.entry(token.expose().to_string()).or_default();
        if cart.iter().any(|i| i.sub_service_id == item.sub_service_id) {
            return Err(FetchError::HttpError {
                status: 409,
                message: "Item already in cart".to_string(),
            });
        }
        cart.push(item.clone());
        Ok(())
    }

    async fn remove_from_cart(
        &self,
        token: &AuthToken,
        sub_service_id: &SubServiceId,
    ) -> Result<(), FetchError> {
        self.enter_as(Endpoint::RemoveFromCart, token).await?;
        if let Some(cart) = self.lock().carts.get_mut(token.expose()) {
            cart.retain(|i| &i.sub_service_id != sub_service_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, token: &AuthToken) -> Result<(), FetchError> {
        self.enter_as(Endpoint::ClearCart, token).await?;
        self.lock().carts.remove(token.expose());
        Ok(())
    }

    async fn submit_enquiry(
        &self,
        token: &AuthToken,
        enquiry: &Enquiry,
    ) -> Result<EnquiryReceipt, FetchError> {
        self.enter_as(Endpoint::SubmitEnquiry, token).await?;
        let mut state = self.lock();
        state.enquiries.push(enquiry.clone());
        Ok(EnquiryReceipt {
            id: Some(EnquiryId::new(format!("enq-{}", state.enquiries.len()))),
            message: Some("Enquiry submitted successfully".to_string()),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, FetchError> {
        self.enter(Endpoint::Search).await?;
        let needle = query.trim().to_lowercase();
        let state = self.lock();
        Ok(state
            .services
            .iter()
            .enumerate()
            .flat_map(|(index, doc)| doc.catalog_items(index))
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item.category.to_lowercase().contains(&needle)
            })
            .map(|item| SearchHit::from(&item))
            .collect())
    }
}
