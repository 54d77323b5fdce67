//! Storefront core for Doorstep home-appliance services.
//!
//! This crate holds everything between the storefront UI and the REST API:
//!
//! - **Catalog**: categories and sub-services aggregated from the backend
//! - **Cart**: a server-synced cart with local quantities and pricing
//! - **Checkout**: address lookup and enquiry submission
//! - **Search**: debounced service search
//!
//! # Example
//!
//! ```rust,ignore
//! use doorstep_commerce::prelude::*;
//!
//! let config = StorefrontConfig::load("storefront.toml")?.with_env_overrides();
//! config.init_logging()?;
//! let storefront = Storefront::from_config(&config)?;
//!
//! let load = storefront.catalog().load().await.into_current().unwrap_or_default();
//! storefront.sign_in(Identity::new(user_id, AuthToken::new(token))).await?;
//! if let Some(item) = load.catalog.items().next() {
//!     storefront.add_to_cart(item).await?;
//! }
//!
//! let confirmation = storefront.checkout().submit(&form).await?;
//! println!("Total: {}", confirmation.pricing.total);
//! ```

pub mod error;
pub mod identity;
pub mod ids;
pub mod latest;
pub mod money;
mod wire;

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod search;
pub mod storefront;

pub use error::CommerceError;
pub use ids::*;
pub use money::Money;
pub use storefront::Storefront;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::identity::{AuthToken, Identity};
    pub use crate::ids::*;
    pub use crate::latest::Fetched;
    pub use crate::money::Money;

    // API
    pub use crate::api::{HttpStorefront, InMemoryStorefront, StorefrontApi};

    // Catalog
    pub use crate::catalog::{
        resolve_slug, slugify, Catalog, CatalogAggregator, CatalogItem, CatalogLoad,
        CatalogSource, Category, CategoryView, ResolvedSlug,
    };

    // Cart
    pub use crate::cart::{CartItem, CartNotice, CartPhase, CartPricing, CartStore, Priced};

    // Checkout
    pub use crate::checkout::{
        AddressRecord, AddressResolver, BookedFor, CheckoutError, CheckoutField, CheckoutForm,
        CheckoutPipeline, EnquiryConfirmation,
    };

    // Search
    pub use crate::search::{SearchHit, SearchSession};

    pub use crate::config::StorefrontConfig;
    pub use crate::storefront::Storefront;
}
