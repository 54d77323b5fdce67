//! The storefront REST API seam.
//!
//! Components talk to the backend through [`StorefrontApi`] so they can run
//! against [`HttpStorefront`] in production and [`InMemoryStorefront`] in
//! tests.

mod http;
mod memory;

pub use http::HttpStorefront;
pub use memory::{Endpoint, InMemoryStorefront};

use crate::cart::{CartItem, CartRecord};
use crate::catalog::{CategoryRecord, ServiceDocument};
use crate::checkout::{Enquiry, EnquiryReceipt};
use crate::identity::AuthToken;
use crate::ids::SubServiceId;
use crate::search::SearchHit;
use async_trait::async_trait;
use doorstep_data::FetchError;

/// Storefront backend operations.
///
/// Identity-scoped calls take the caller's bearer token.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// `GET /categories`
    async fn categories(&self) -> Result<Vec<CategoryRecord>, FetchError>;

    /// `GET /services`
    async fn services(&self) -> Result<Vec<ServiceDocument>, FetchError>;

    /// `GET /services/category/{name}`
    async fn services_in_category(&self, name: &str) -> Result<Vec<ServiceDocument>, FetchError>;

    /// `GET /cart`
    async fn cart(&self, token: &AuthToken) -> Result<Vec<CartRecord>, FetchError>;

    /// `POST /cart/add`
    async fn add_to_cart(&self, token: &AuthToken, item: &CartItem) -> Result<(), FetchError>;

    /// `DELETE /cart/{subServiceId}`
    async fn remove_from_cart(
        &self,
        token: &AuthToken,
        sub_service_id: &SubServiceId,
    ) -> Result<(), FetchError>;

    /// `DELETE /cart`
    async fn clear_cart(&self, token: &AuthToken) -> Result<(), FetchError>;

    /// `POST /customer/enquiry`
    async fn submit_enquiry(
        &self,
        token: &AuthToken,
        enquiry: &Enquiry,
    ) -> Result<EnquiryReceipt, FetchError>;

    /// `GET /search?q=`
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, FetchError>;
}
