//! Enquiry submission.
//!
//! Submission holds a [`CartLease`](crate::cart::CartLease) from snapshot to
//! clear, so the lines that are priced, sent, and then cleared are the same
//! lines. A failed POST leaves the cart exactly as it was.

use crate::api::StorefrontApi;
use crate::cart::{CartNotice, CartStore};
use crate::checkout::{
    AddressResolver, CheckoutField, CheckoutForm, Enquiry, EnquiryConfirmation,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Shown when a submission fails without a server message.
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit enquiry. Please try again.";

/// Why a submission did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Please sign in to submit an enquiry")]
    SignInRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please fill in: {}", join_labels(.0))]
    MissingFields(Vec<CheckoutField>),

    #[error("Your enquiry is already being submitted")]
    InProgress,

    #[error("Your cart is updating, please wait")]
    CartBusy,

    /// The server refused the enquiry; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("{}", SUBMIT_FAILED_MESSAGE)]
    Failed,
}

fn join_labels(fields: &[CheckoutField]) -> String {
    fields
        .iter()
        .map(CheckoutField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<CartNotice> for CheckoutError {
    fn from(notice: CartNotice) -> Self {
        match notice {
            CartNotice::SignInRequired => CheckoutError::SignInRequired,
            CartNotice::Busy => CheckoutError::CartBusy,
            _ => CheckoutError::Failed,
        }
    }
}

/// Whether the form and cart allow submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub cart_empty: bool,
    pub missing: Vec<CheckoutField>,
}

impl Readiness {
    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.cart_empty && self.missing.is_empty()
    }
}

/// Packages the cart and form into an enquiry and submits it once.
pub struct CheckoutPipeline<A> {
    api: Arc<A>,
    cart: Arc<CartStore<A>>,
    resolver: AddressResolver,
    submitting: AtomicBool,
}

struct Submitting<'a>(&'a AtomicBool);

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<A: StorefrontApi> CheckoutPipeline<A> {
    pub fn new(api: Arc<A>, cart: Arc<CartStore<A>>, resolver: AddressResolver) -> Self {
        Self {
            api,
            cart,
            resolver,
            submitting: AtomicBool::new(false),
        }
    }

    /// The address resolver backing city and pincode suggestions.
    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Check the cart and form without submitting.
    pub fn readiness(&self, form: &CheckoutForm) -> Readiness {
        Readiness {
            cart_empty: self.cart.is_empty(),
            missing: form.missing_fields(),
        }
    }

    /// Submit the enquiry.
    ///
    /// On success the cart is cleared and the confirmation carries the lines
    /// and totals as submitted. If the clear fails the confirmation is still
    /// returned and the cart re-syncs from the server. There is no retry.
    pub async fn submit(&self, form: &CheckoutForm) -> Result<EnquiryConfirmation, CheckoutError> {
        self.submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CheckoutError::InProgress)?;
        let _submitting = Submitting(&self.submitting);

        let lease = self.cart.lease()?;
        let items = lease.snapshot();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::MissingFields(missing));
        }

        let enquiry = Enquiry::new(items, form);
        let receipt = match self.api.submit_enquiry(lease.token(), &enquiry).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(error = %e, lines = enquiry.items.len(), "enquiry submission failed");
                return Err(match e.server_message() {
                    Some(message) => CheckoutError::Rejected(message.to_string()),
                    None => CheckoutError::Failed,
                });
            }
        };

        let confirmation = EnquiryConfirmation::new(receipt, enquiry);
        info!(
            enquiry = ?confirmation.receipt.id.as_ref().map(|id| id.as_str()),
            lines = confirmation.enquiry.items.len(),
            total = %confirmation.pricing.total,
            city = %confirmation.enquiry.city,
            "enquiry submitted"
        );

        if let Err(notice) = lease.clear().await {
            warn!(%notice, "cart clear after enquiry failed, re-syncing");
            if let Err(notice) = self.cart.load().await {
                warn!(%notice, "cart re-sync failed");
            }
        }
        Ok(confirmation)
    }
}
