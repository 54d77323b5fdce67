//! Catalog: categories, service documents, and route resolution.

mod aggregator;
mod category;
mod record;
mod slug;

pub use aggregator::{aggregate, CatalogAggregator, CatalogLoad, CatalogSource};
pub use category::{slugify, Catalog, CatalogItem, Category, CategorySource, CategoryView};
pub use record::{CategoryRecord, ServiceDocument, SubServiceRecord, UNCATEGORIZED};
pub use slug::{
    resolve_slug, CatalogTier, DerivedTier, LegacyTier, ResolvedSlug, SlugChain, SlugResolver,
    SlugTier, LEGACY_CATEGORY_NAMES,
};
