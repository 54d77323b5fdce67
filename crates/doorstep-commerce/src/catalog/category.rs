//! Category and catalog item types.

use crate::cart::{CartItem, Priced};
use crate::catalog::slug::{resolve_slug, ResolvedSlug};
use crate::ids::{CategoryId, ServiceId, SubServiceId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Derive a category slug from its name: lower-cased, whitespace runs
/// replaced by a single hyphen.
///
/// ```
/// use doorstep_commerce::catalog::slugify;
/// assert_eq!(slugify("Washing Machine"), "washing-machine");
/// ```
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A purchasable sub-service, flattened out of its service document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// `{serviceDocumentId}-{indexWithinDocument}`.
    pub id: SubServiceId,
    /// Owning service document.
    pub service_id: ServiceId,
    /// Category name as written on the service document.
    pub category: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    /// Pre-discount reference price; only kept when it is at least `price`.
    pub actual_price: Option<Money>,
    pub image_url: String,
    pub issues_resolved: Vec<String>,
}

impl CatalogItem {
    /// Build the cart line for this item with a quantity of one.
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            service_id: self.service_id.clone(),
            sub_service_id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            actual_price: self.actual_price,
            image_url: self.image_url.clone(),
            issues_resolved: self.issues_resolved.clone(),
            quantity: 1,
        }
    }

    /// Discount against the reference price, in whole percent.
    pub fn discount_percent(&self) -> u8 {
        match self.actual_price {
            Some(actual) if actual > self.price => (actual - self.price).percent_of(actual),
            _ => 0,
        }
    }
}

impl Priced for CatalogItem {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn reference_price(&self) -> Option<Money> {
        self.actual_price
    }

    fn quantity(&self) -> i64 {
        1
    }
}

/// Where a category's identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    /// An administrative category record.
    Admin,
    /// Synthesized from the category name on service documents.
    Derived,
}

/// A catalog category with its flattened items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Stable identity used in `/category/{id}` links.
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub items: Vec<CatalogItem>,
    pub source: CategorySource,
}

impl Category {
    /// Slug derived from the title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Whether `segment` names this category by id or by slug.
    pub fn matches(&self, segment: &str) -> bool {
        let segment = segment.trim().trim_matches('/');
        if segment.is_empty() {
            return false;
        }
        if self.id.as_str() == segment {
            return true;
        }
        let wanted = slugify(segment);
        wanted == self.id.as_str().to_lowercase() || wanted == self.slug()
    }

    /// Lowest item price, for "starting at" labels.
    pub fn starting_price(&self) -> Option<Money> {
        self.items.iter().map(|item| item.price).min()
    }

    /// Check if the category has no purchasable items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What a category route renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryView {
    /// The category and its items.
    Found(Category),
    /// Nothing purchasable under this route; carries the resolved display name.
    NotFound(ResolvedSlug),
}

impl CategoryView {
    /// The category, if one was found.
    pub fn category(&self) -> Option<&Category> {
        match self {
            CategoryView::Found(category) => Some(category),
            CategoryView::NotFound(_) => None,
        }
    }
}

/// The ordered storefront catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Create a catalog from already-ordered categories.
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Consume and return the categories.
    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    /// Find a category by id or slug.
    pub fn category(&self, segment: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches(segment))
    }

    /// Resolve a route segment to a view, falling back to a not-found state.
    pub fn view(&self, segment: &str) -> CategoryView {
        match self.category(segment) {
            Some(category) if !category.is_empty() => CategoryView::Found(category.clone()),
            _ => CategoryView::NotFound(resolve_slug(&self.categories, segment)),
        }
    }

    /// Find an item anywhere in the catalog.
    pub fn find_item(&self, id: &SubServiceId) -> Option<&CatalogItem> {
        self.items().find(|item| &item.id == id)
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Total number of purchasable items.
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Check if the catalog has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
