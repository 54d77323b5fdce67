//! Cart: lines, pricing, and the synced store.

mod item;
mod pricing;
mod store;

pub use item::{CartItem, CartRecord, MAX_QUANTITY_PER_ITEM};
pub use pricing::{
    item_count, line_reference_total, line_savings, line_total, reference_total, savings, total,
    CartPricing, LinePricing, Priced,
};
pub use store::{CartLease, CartNotice, CartPhase, CartStore, SYNC_FAILED_MESSAGE};
