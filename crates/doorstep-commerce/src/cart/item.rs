//! Cart lines and their wire form.

use crate::cart::Priced;
use crate::ids::{ServiceId, SubServiceId};
use crate::money::Money;
use crate::wire::{loose_i64, non_blank, nullable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A line in the visitor's cart.
///
/// `sub_service_id` is the cart key; a sub-service appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub service_id: ServiceId,
    pub sub_service_id: SubServiceId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_price: Option<Money>,
    pub image_url: String,
    #[serde(default)]
    pub issues_resolved: Vec<String>,
    pub quantity: i64,
}

impl CartItem {
    /// Line total at the current quantity.
    pub fn line_total(&self) -> Money {
        crate::cart::line_total(self)
    }
}

impl Priced for CartItem {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn reference_price(&self) -> Option<Money> {
        self.actual_price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// A cart line as returned by `GET /cart`, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartRecord {
    #[serde(alias = "serviceID")]
    pub service_id: Option<String>,
    #[serde(alias = "subServiceID", alias = "_id")]
    pub sub_service_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Value>,
    pub actual_price: Option<Value>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub issues_resolved: Vec<String>,
    pub quantity: Option<Value>,
}

impl CartRecord {
    /// Validate into a cart line. Records without a sub-service id are
    /// dropped; everything else defaults.
    pub fn into_cart_item(self) -> Option<CartItem> {
        let Some(sub_service_id) = non_blank(self.sub_service_id.as_deref()).map(SubServiceId::new)
        else {
            warn!(name = ?self.name, "cart line without a sub-service id, dropping");
            return None;
        };

        let service_id = match non_blank(self.service_id.as_deref()) {
            Some(id) => ServiceId::new(id),
            None => sub_service_id
                .split()
                .map(|(service, _)| service)
                .unwrap_or_else(|| ServiceId::new(sub_service_id.as_str())),
        };

        let price = match self.price.as_ref().and_then(Money::from_json) {
            Some(price) if !price.is_negative() => price,
            _ => {
                warn!(item = %sub_service_id, raw = ?self.price, "cart line without a usable price");
                Money::ZERO
            }
        };
        let actual_price = self
            .actual_price
            .as_ref()
            .and_then(Money::from_json)
            .filter(|actual| *actual >= price);

        let quantity = self
            .quantity
            .as_ref()
            .and_then(loose_i64)
            .unwrap_or(1)
            .clamp(1, MAX_QUANTITY_PER_ITEM);

        Some(CartItem {
            service_id,
            name: non_blank(self.name.as_deref())
                .unwrap_or(sub_service_id.as_str())
                .to_string(),
            sub_service_id,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            price,
            actual_price,
            image_url: self.image_url.unwrap_or_default(),
            issues_resolved: self.issues_resolved,
            quantity,
        })
    }
}
