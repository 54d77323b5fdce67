//! Checkout: address lookup, the enquiry form, and submission.

mod address;
mod enquiry;
mod form;
mod pipeline;

pub use address::{
    is_pincode, AddressRecord, AddressResolver, ADDRESS_TABLE, DEFAULT_SUGGESTION_LIMIT,
};
pub use enquiry::{Enquiry, EnquiryConfirmation, EnquiryReceipt};
pub use form::{BookedFor, CheckoutField, CheckoutForm};
pub use pipeline::{CheckoutError, CheckoutPipeline, Readiness, SUBMIT_FAILED_MESSAGE};
