//! Raw catalog records as delivered by the storefront API.
//!
//! These mirror the backend documents loosely: every field is optional and
//! numeric fields may arrive as strings. They are turned into fully-specified
//! [`CatalogItem`]s at the aggregation boundary so nothing downstream has to
//! ask whether a field is present.

use crate::catalog::category::CatalogItem;
use crate::ids::{ServiceId, SubServiceId};
use crate::money::Money;
use crate::wire::{loose_i64, non_blank, nullable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Category name used for service documents that carry none.
pub const UNCATEGORIZED: &str = "Other Services";

/// An administrative category record (`GET /categories`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryRecord {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "title")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "imageUrl")]
    pub image: Option<String>,
    /// Display position; lower sorts first.
    #[serde(alias = "displayOrder", alias = "position")]
    pub order: Option<Value>,
}

impl CategoryRecord {
    /// Convenience constructor used by fixtures and admin tooling.
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            description: None,
            image: None,
            order: Some(Value::from(order)),
        }
    }

    /// Trimmed category name.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Display order, when it parses.
    pub fn display_order(&self) -> Option<i64> {
        self.order.as_ref().and_then(loose_i64)
    }
}

/// A service document (`GET /services`): sub-services grouped under a
/// category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDocument {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "subservices", deserialize_with = "nullable")]
    pub sub_services: Vec<SubServiceRecord>,
}

impl ServiceDocument {
    /// Convenience constructor used by fixtures and admin tooling.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        sub_services: Vec<SubServiceRecord>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            category: Some(category.into()),
            sub_services,
        }
    }

    /// Category name, or [`UNCATEGORIZED`] when blank.
    pub fn category_name(&self) -> &str {
        non_blank(self.category.as_deref()).unwrap_or(UNCATEGORIZED)
    }

    /// The document id; `fallback_index` names documents that arrive without one.
    pub fn service_id(&self, fallback_index: usize) -> ServiceId {
        match non_blank(self.id.as_deref()) {
            Some(id) => ServiceId::new(id),
            None => {
                warn!(
                    index = fallback_index,
                    category = self.category_name(),
                    "service document without id"
                );
                ServiceId::new(format!("service{}", fallback_index))
            }
        }
    }

    /// Flatten the sub-services into catalog items, in array order.
    pub fn catalog_items(&self, fallback_index: usize) -> Vec<CatalogItem> {
        let service_id = self.service_id(fallback_index);
        let category = self.category_name();
        self.sub_services
            .iter()
            .enumerate()
            .map(|(index, sub)| sub.to_catalog_item(&service_id, index, category))
            .collect()
    }

    /// First non-empty sub-service image.
    pub fn first_image(&self) -> Option<&str> {
        self.sub_services
            .iter()
            .find_map(|sub| non_blank(sub.image.as_deref()))
    }
}

/// One entry of a service document's sub-service array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubServiceRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub actual_price: Option<Value>,
    #[serde(alias = "imageUrl")]
    pub image: Option<String>,
    #[serde(alias = "issues", deserialize_with = "nullable")]
    pub issues_resolved: Vec<String>,
}

impl SubServiceRecord {
    /// Convenience constructor used by fixtures and admin tooling.
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: Some(name.into()),
            price: Some(Value::from(price)),
            ..Self::default()
        }
    }

    /// Set the pre-discount reference price.
    pub fn with_actual_price(mut self, actual_price: i64) -> Self {
        self.actual_price = Some(Value::from(actual_price));
        self
    }

    /// Set the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Build the fully-specified catalog item, defaulting absent fields.
    pub fn to_catalog_item(
        &self,
        service_id: &ServiceId,
        index: usize,
        category: &str,
    ) -> CatalogItem {
        let id = SubServiceId::compose(service_id, index);

        let price = match self.price.as_ref().and_then(Money::from_json) {
            Some(price) if !price.is_negative() => price,
            other => {
                warn!(item = %id, raw = ?self.price, parsed = ?other, "sub-service without a usable price");
                Money::ZERO
            }
        };

        let actual_price = match self.actual_price.as_ref() {
            None | Some(Value::Null) => None,
            Some(raw) => match Money::from_json(raw) {
                Some(actual) if actual >= price => Some(actual),
                Some(actual) => {
                    warn!(item = %id, %actual, %price, "actual price below price, ignoring");
                    None
                }
                None => {
                    warn!(item = %id, raw = ?raw, "unparsable actual price, ignoring");
                    None
                }
            },
        };

        let name = match non_blank(self.name.as_deref()) {
            Some(name) => name.to_string(),
            None => {
                warn!(item = %id, "sub-service without a name");
                format!("{} service", category)
            }
        };

        CatalogItem {
            id,
            service_id: service_id.clone(),
            category: category.to_string(),
            name,
            description: self.description.clone().unwrap_or_default(),
            price,
            actual_price,
            image_url: non_blank(self.image.as_deref()).unwrap_or_default().to_string(),
            issues_resolved: self
                .issues_resolved
                .iter()
                .filter_map(|issue| non_blank(Some(issue.as_str())))
                .map(str::to_string)
                .collect(),
        }
    }
}
