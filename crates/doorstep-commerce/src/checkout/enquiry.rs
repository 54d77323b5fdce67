//! Enquiry payload and submission results.

use crate::cart::{CartItem, CartPricing};
use crate::checkout::{BookedFor, CheckoutForm};
use crate::ids::EnquiryId;
use crate::wire::non_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /customer/enquiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub items: Vec<CartItem>,
    pub message: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub booked_for: BookedFor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Enquiry {
    /// Package cart lines with the form, trimming every field.
    pub fn new(items: Vec<CartItem>, form: &CheckoutForm) -> Self {
        let text = |value: &str| value.trim().to_string();
        Self {
            items,
            message: text(&form.message),
            name: text(&form.name),
            phone: text(&form.phone),
            address: text(&form.address),
            landmark: text(&form.landmark),
            city: text(&form.city),
            state: text(&form.state),
            pincode: text(&form.pincode),
            booked_for: form.booked_for,
            brand: non_blank(Some(form.brand.as_str())).map(str::to_string),
        }
    }
}

/// What the server said about a submitted enquiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnquiryReceipt {
    /// Server id, when the response carried one.
    pub id: Option<EnquiryId>,
    pub message: Option<String>,
}

impl EnquiryReceipt {
    /// Read the receipt out of a response body. The id may sit at the top
    /// level or under `enquiry` / `data`, as `_id`, `id` or `enquiryId`.
    pub fn from_value(body: &Value) -> Self {
        let text = |value: &Value, key: &str| {
            non_blank(value.get(key).and_then(Value::as_str)).map(str::to_string)
        };
        let id_of = |value: &Value| {
            ["_id", "id", "enquiryId"]
                .into_iter()
                .find_map(|key| text(value, key))
        };

        let id = id_of(body).or_else(|| {
            ["enquiry", "data"]
                .into_iter()
                .filter_map(|key| body.get(key))
                .find_map(&id_of)
        });

        Self {
            id: id.map(EnquiryId::new),
            message: text(body, "message"),
        }
    }
}

/// A submitted enquiry with the cart as it was at submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryConfirmation {
    pub receipt: EnquiryReceipt,
    pub enquiry: Enquiry,
    /// Totals over the frozen lines.
    pub pricing: CartPricing,
    pub submitted_at: DateTime<Utc>,
}

impl EnquiryConfirmation {
    /// Build the confirmation for an accepted enquiry.
    pub fn new(receipt: EnquiryReceipt, enquiry: Enquiry) -> Self {
        let pricing = CartPricing::calculate(&enquiry.items);
        Self {
            receipt,
            enquiry,
            pricing,
            submitted_at: Utc::now(),
        }
    }
}
