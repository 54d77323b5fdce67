//! The storefront facade: one value wiring every component to one API.

use crate::api::{HttpStorefront, StorefrontApi};
use crate::cart::{CartNotice, CartStore};
use crate::catalog::{CatalogAggregator, CatalogItem};
use crate::checkout::{AddressResolver, CheckoutPipeline};
use crate::config::StorefrontConfig;
use crate::error::CommerceError;
use crate::identity::Identity;
use crate::search::SearchSession;
use std::sync::Arc;
use tracing::info;

/// Catalog, cart, checkout, and search over a shared [`StorefrontApi`].
pub struct Storefront<A> {
    api: Arc<A>,
    catalog: CatalogAggregator<A>,
    cart: Arc<CartStore<A>>,
    checkout: CheckoutPipeline<A>,
    search: SearchSession<A>,
}

impl Storefront<HttpStorefront> {
    /// Validate `config` and connect to the configured API.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, CommerceError> {
        config.validate()?;
        let api = Arc::new(HttpStorefront::from_config(&config.api)?);
        info!(base_url = %config.api.base_url, "storefront configured");
        Ok(Self::with_api(api, config))
    }
}

impl<A: StorefrontApi> Storefront<A> {
    /// Wire the components to an existing API.
    pub fn with_api(api: Arc<A>, config: &StorefrontConfig) -> Self {
        let cart = Arc::new(CartStore::new(api.clone()));
        let resolver =
            AddressResolver::default().with_suggestion_limit(config.address.suggestion_limit);
        Self {
            catalog: CatalogAggregator::new(api.clone()),
            checkout: CheckoutPipeline::new(api.clone(), cart.clone(), resolver),
            search: SearchSession::new(api.clone(), &config.search),
            cart,
            api,
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn catalog(&self) -> &CatalogAggregator<A> {
        &self.catalog
    }

    pub fn cart(&self) -> &Arc<CartStore<A>> {
        &self.cart
    }

    pub fn checkout(&self) -> &CheckoutPipeline<A> {
        &self.checkout
    }

    pub fn search(&self) -> &SearchSession<A> {
        &self.search
    }

    pub fn addresses(&self) -> &AddressResolver {
        self.checkout.resolver()
    }

    /// Adopt a signed-in identity and load its server cart.
    pub async fn sign_in(&self, identity: Identity) -> Result<(), CartNotice> {
        self.cart.set_identity(Some(identity));
        self.cart.load().await
    }

    /// Drop the identity; the cart empties.
    pub fn sign_out(&self) {
        self.cart.set_identity(None);
    }

    /// Add a catalog item to the cart with a quantity of one.
    pub async fn add_to_cart(&self, item: &CatalogItem) -> Result<(), CartNotice> {
        self.cart.add(item.to_cart_item()).await
    }
}
