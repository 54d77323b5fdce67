//! The enquiry form filled in at checkout.

use crate::checkout::AddressRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who the service is booked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookedFor {
    #[default]
    #[serde(rename = "self")]
    Myself,
    Other,
}

/// A required form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutField {
    Name,
    Phone,
    Address,
    City,
    Pincode,
}

impl CheckoutField {
    /// Label shown next to the field.
    pub fn label(&self) -> &'static str {
        match self {
            CheckoutField::Name => "Full name",
            CheckoutField::Phone => "Phone number",
            CheckoutField::Address => "Address",
            CheckoutField::City => "City",
            CheckoutField::Pincode => "Pincode",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contact and address details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    /// Address line.
    pub address: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Free-text note for the technician.
    pub message: String,
    /// Appliance brand, if the customer knows it.
    pub brand: String,
    pub booked_for: BookedFor,
}

impl CheckoutForm {
    /// Required fields that are still blank, in form order.
    pub fn missing_fields(&self) -> Vec<CheckoutField> {
        [
            (CheckoutField::Name, &self.name),
            (CheckoutField::Phone, &self.phone),
            (CheckoutField::Address, &self.address),
            (CheckoutField::City, &self.city),
            (CheckoutField::Pincode, &self.pincode),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Whether every required field is filled in.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fill city, state and pincode from a resolver suggestion, all at once.
    pub fn apply_suggestion(&mut self, record: &AddressRecord) {
        self.city = record.city.to_string();
        self.state = record.state.to_string();
        self.pincode = record.pincode.to_string();
    }
}
