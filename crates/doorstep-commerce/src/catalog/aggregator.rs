//! Catalog aggregation.
//!
//! Category records and service documents are fetched independently and
//! ordered independently. [`aggregate`] merges them: administrative display
//! order wins at the category level, sub-services are concatenated in
//! service-document order, and any category name that only appears on
//! service documents is appended afterwards so nothing purchasable is lost.

use crate::api::StorefrontApi;
use crate::catalog::category::{slugify, Catalog, Category, CategorySource, CategoryView};
use crate::catalog::record::{CategoryRecord, ServiceDocument};
use crate::catalog::slug::{resolve_slug, DerivedTier, ResolvedSlug, SlugResolver, SlugTier};
use crate::ids::CategoryId;
use crate::latest::{Fetched, LatestOnly};
use crate::wire::non_blank;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// A catalog source that could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// `GET /categories`
    Categories,
    /// `GET /services`
    Services,
}

/// A fetched catalog plus the sources it had to do without.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub degraded: Vec<CatalogSource>,
}

impl CatalogLoad {
    /// Whether any source failed.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Service documents sharing one category key, in encounter order.
struct Group<'a> {
    name: &'a str,
    docs: Vec<(usize, &'a ServiceDocument)>,
}

impl Group<'_> {
    fn items(&self) -> Vec<crate::catalog::CatalogItem> {
        self.docs
            .iter()
            .flat_map(|(index, doc)| doc.catalog_items(*index))
            .collect()
    }

    fn first_image(&self) -> Option<&str> {
        self.docs.iter().find_map(|(_, doc)| doc.first_image())
    }
}

/// Merge category records and service documents into the ordered catalog.
pub fn aggregate(categories: &[CategoryRecord], services: &[ServiceDocument]) -> Catalog {
    let mut keys: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group<'_>> = HashMap::new();
    for (index, doc) in services.iter().enumerate() {
        let name = doc.category_name();
        let key = slugify(name);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                keys.push(key);
                Group {
                    name,
                    docs: Vec::new(),
                }
            })
            .docs
            .push((index, doc));
    }

    // Records without an order keep their relative position after ordered ones.
    let mut records: Vec<&CategoryRecord> = categories.iter().collect();
    records.sort_by_key(|r| match r.display_order() {
        Some(order) => (0, order),
        None => (1, 0),
    });

    let mut claimed: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(records.len() + keys.len());

    for record in records {
        let Some(name) = record.name() else {
            warn!(id = ?record.id, "category record without a name, skipping");
            continue;
        };
        let key = slugify(name);
        if !claimed.insert(key.clone()) {
            warn!(category = name, "duplicate category record, keeping the first");
            continue;
        }

        let group = groups.get(&key);
        let image = non_blank(record.image.as_deref())
            .or_else(|| group.and_then(Group::first_image))
            .unwrap_or_default()
            .to_string();
        let id = non_blank(record.id.as_deref()).unwrap_or(&key).to_string();

        result.push(Category {
            id: CategoryId::new(id),
            title: name.to_string(),
            description: record.description.clone().unwrap_or_default(),
            image_url: image,
            items: group.map(Group::items).unwrap_or_default(),
            source: CategorySource::Admin,
        });
    }

    for key in keys {
        if claimed.contains(&key) {
            continue;
        }
        let Some(group) = groups.get(&key) else {
            continue;
        };
        debug!(category = group.name, "category has no administrative record, deriving one");
        result.push(Category {
            id: CategoryId::new(key.clone()),
            title: group.name.to_string(),
            description: String::new(),
            image_url: group.first_image().unwrap_or_default().to_string(),
            items: group.items(),
            source: CategorySource::Derived,
        });
    }

    Catalog::new(result)
}

/// Fetches and aggregates the catalog for a page.
///
/// Each load takes a generation ticket; a load that was superseded by a newer
/// one, or by [`abandon`](CatalogAggregator::abandon) when the page is left,
/// comes back as [`Fetched::Superseded`].
pub struct CatalogAggregator<A> {
    api: Arc<A>,
    latest: LatestOnly,
}

impl<A: StorefrontApi> CatalogAggregator<A> {
    /// Create an aggregator over the given API.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            latest: LatestOnly::new(),
        }
    }

    /// Discard the results of every load still in flight.
    pub fn abandon(&self) {
        self.latest.abandon();
    }

    /// Fetch categories and services concurrently and aggregate them.
    ///
    /// A failed source degrades the catalog instead of failing the load.
    pub async fn load(&self) -> Fetched<CatalogLoad> {
        let ticket = self.latest.begin();
        let (categories, services) =
            futures::join!(self.api.categories(), self.api.services());

        let mut degraded = Vec::new();
        let categories = match categories {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "category fetch failed, continuing with services only");
                degraded.push(CatalogSource::Categories);
                Vec::new()
            }
        };
        let services = match services {
            Ok(services) => services,
            Err(e) => {
                warn!(error = %e, "service fetch failed, continuing with categories only");
                degraded.push(CatalogSource::Services);
                Vec::new()
            }
        };

        let catalog = aggregate(&categories, &services);
        debug!(
            categories = catalog.categories().len(),
            items = catalog.item_count(),
            degraded = degraded.len(),
            "catalog aggregated"
        );
        self.latest.settle(ticket, CatalogLoad { catalog, degraded })
    }

    /// Load the category behind a route segment (category detail and
    /// enquiry pages).
    ///
    /// The segment is resolved against the full aggregated catalog, so
    /// categories that only exist on service documents keep their deep
    /// links. The services for the resolved name are then fetched; if the
    /// per-category endpoint fails the full service list is filtered
    /// instead. A legacy name that yields nothing is retried under the
    /// segment's own name. Zero items yields [`CategoryView::NotFound`].
    pub async fn load_category(&self, segment: &str) -> Fetched<CategoryView> {
        let ticket = self.latest.begin();

        let (categories, all_services) =
            futures::join!(self.api.categories(), self.api.services());
        let categories = categories.unwrap_or_else(|e| {
            warn!(error = %e, "category fetch failed, resolving without records");
            Vec::new()
        });
        let all_services = all_services.unwrap_or_else(|e| {
            warn!(error = %e, "service fetch failed, resolving without documents");
            Vec::new()
        });

        let known = aggregate(&categories, &all_services);
        let resolved = resolve_slug(known.categories(), segment);
        let mut view = self
            .category_view(&categories, &all_services, resolved.clone())
            .await;

        if view.category().is_none() && resolved.tier == SlugTier::Legacy {
            if let Some(own) = DerivedTier.resolve(segment) {
                if own.name != resolved.name {
                    debug!(segment, legacy = %resolved.name, "legacy name empty, retrying segment name");
                    if let CategoryView::Found(category) =
                        self.category_view(&categories, &all_services, own).await
                    {
                        view = CategoryView::Found(category);
                    }
                }
            }
        }
        self.latest.settle(ticket, view)
    }

    async fn category_view(
        &self,
        categories: &[CategoryRecord],
        all_services: &[ServiceDocument],
        resolved: ResolvedSlug,
    ) -> CategoryView {
        let wanted = slugify(&resolved.name);
        let services = match self.api.services_in_category(&resolved.name).await {
            Ok(services) => services,
            Err(e) => {
                warn!(error = %e, category = %resolved.name, "category service fetch failed, filtering all services");
                all_services
                    .iter()
                    .filter(|doc| slugify(doc.category_name()) == wanted)
                    .cloned()
                    .collect()
            }
        };

        let catalog = aggregate(categories, &services);
        match catalog
            .categories()
            .iter()
            .find(|c| c.id == resolved.id || c.slug() == wanted)
        {
            Some(category) if !category.is_empty() => CategoryView::Found(category.clone()),
            _ => {
                debug!(category = %resolved.name, "category has no items");
                CategoryView::NotFound(resolved)
            }
        }
    }
}
