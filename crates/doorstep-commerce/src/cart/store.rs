//! The visitor's cart, kept in step with the server.
//!
//! The server owns cart contents and prices; the store mirrors them and owns
//! quantities, which are local only. Every round trip holds the `syncing`
//! flag, and any mutation attempted while it is set is rejected with
//! [`CartNotice::Busy`] rather than queued. Network failures never escape as
//! raw errors; they become [`CartNotice::SyncFailed`] with a message fit for
//! display.
//!
//! Every round trip puts the store in [`CartPhase::Loading`]. A load for a
//! new identity waits out a round trip still running for the previous one.

use crate::api::StorefrontApi;
use crate::cart::{CartItem, CartPricing, CartRecord, MAX_QUANTITY_PER_ITEM};
use crate::identity::{AuthToken, Identity};
use crate::ids::SubServiceId;
use doorstep_data::FetchError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Shown when a cart round trip fails without a server message.
pub const SYNC_FAILED_MESSAGE: &str = "Could not update your cart. Please try again.";

/// Cart lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CartPhase {
    /// No server cart has been loaded for the current identity.
    Uninitialized,
    /// The server cart is being fetched.
    Loading,
    /// Local items mirror the server cart.
    Ready,
}

/// User-facing outcome of a cart operation that did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartNotice {
    #[error("Please sign in to add services to your cart")]
    SignInRequired,

    #[error("{0} is already in your cart")]
    AlreadyInCart(String),

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    #[error("Quantity {0} exceeds the limit of {1}")]
    QuantityExceedsLimit(i64, i64),

    #[error("{0} is not in your cart")]
    NotInCart(SubServiceId),

    #[error("Your cart is updating, please wait")]
    Busy,

    #[error("{0}")]
    SyncFailed(String),
}

impl CartNotice {
    /// The server's message when it sent one, otherwise [`SYNC_FAILED_MESSAGE`].
    pub fn sync_failed(error: &FetchError) -> Self {
        CartNotice::SyncFailed(
            error
                .server_message()
                .unwrap_or(SYNC_FAILED_MESSAGE)
                .to_string(),
        )
    }
}

#[derive(Debug)]
struct CartState {
    identity: Option<Identity>,
    items: Vec<CartItem>,
    phase: CartPhase,
    /// Bumped on every identity change so late responses for a previous
    /// identity are discarded.
    epoch: u64,
    /// Epoch the in-flight round trip was started for.
    sync_epoch: u64,
}

fn lock_state(state: &Mutex<CartState>) -> MutexGuard<'_, CartState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the `syncing` flag for the duration of one round trip.
struct SyncGuard<'a> {
    syncing: &'a AtomicBool,
    state: &'a Mutex<CartState>,
    idle: &'a Notify,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = lock_state(self.state);
            // A round trip that never settled (failed, rejected or cancelled)
            // still leaves the cart usable.
            if state.phase == CartPhase::Loading {
                state.phase = if state.identity.is_some() {
                    CartPhase::Ready
                } else {
                    CartPhase::Uninitialized
                };
            }
        }
        self.syncing.store(false, Ordering::SeqCst);
        self.idle.notify_waiters();
    }
}

/// Client-side cart bound to one [`StorefrontApi`].
///
/// Share it with `Arc`; all methods take `&self`.
pub struct CartStore<A> {
    api: Arc<A>,
    state: Mutex<CartState>,
    syncing: AtomicBool,
    idle: Notify,
}

impl<A> CartStore<A> {
    /// An empty, signed-out cart.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(CartState {
                identity: None,
                items: Vec::new(),
                phase: CartPhase::Uninitialized,
                epoch: 0,
                sync_epoch: 0,
            }),
            syncing: AtomicBool::new(false),
            idle: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        lock_state(&self.state)
    }

    /// Switch identity. Items are cleared either way; signing out also
    /// returns the store to [`CartPhase::Uninitialized`].
    pub fn set_identity(&self, identity: Option<Identity>) {
        let mut state = self.lock();
        if state.identity == identity {
            return;
        }
        debug!(
            user = ?identity.as_ref().map(|i| i.user_id.as_str()),
            "cart identity changed"
        );
        state.epoch += 1;
        state.identity = identity;
        state.items.clear();
        state.phase = CartPhase::Uninitialized;
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    /// Snapshot of the current lines.
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().items.clone()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Whether a sub-service is already in the cart.
    pub fn contains(&self, sub_service_id: &SubServiceId) -> bool {
        self.lock()
            .items
            .iter()
            .any(|item| &item.sub_service_id == sub_service_id)
    }

    /// Pricing for the current lines.
    pub fn pricing(&self) -> CartPricing {
        CartPricing::calculate(&self.lock().items)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> CartPhase {
        self.lock().phase
    }

    /// Whether a round trip is in flight.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Whether the decrement control should be enabled for a line.
    pub fn can_decrement(&self, sub_service_id: &SubServiceId) -> bool {
        self.quantity_of(sub_service_id).is_some_and(|q| q > 1)
    }

    fn quantity_of(&self, sub_service_id: &SubServiceId) -> Option<i64> {
        self.lock()
            .items
            .iter()
            .find(|item| &item.sub_service_id == sub_service_id)
            .map(|item| item.quantity)
    }

    /// Set a line's quantity. Local only; the server does not track
    /// quantities.
    pub fn update_quantity(
        &self,
        sub_service_id: &SubServiceId,
        quantity: i64,
    ) -> Result<(), CartNotice> {
        if self.lock().identity.is_none() {
            return Err(CartNotice::SignInRequired);
        }
        if quantity < 1 {
            return Err(CartNotice::InvalidQuantity(quantity));
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CartNotice::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }
        if self.is_syncing() {
            return Err(CartNotice::Busy);
        }

        let mut state = self.lock();
        let item = state
            .items
            .iter_mut()
            .find(|item| &item.sub_service_id == sub_service_id)
            .ok_or_else(|| CartNotice::NotInCart(sub_service_id.clone()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Raise a line's quantity by one.
    pub fn increment(&self, sub_service_id: &SubServiceId) -> Result<(), CartNotice> {
        let current = self
            .quantity_of(sub_service_id)
            .ok_or_else(|| CartNotice::NotInCart(sub_service_id.clone()))?;
        self.update_quantity(sub_service_id, current.saturating_add(1))
    }

    /// Lower a line's quantity by one; never below one.
    pub fn decrement(&self, sub_service_id: &SubServiceId) -> Result<(), CartNotice> {
        let current = self
            .quantity_of(sub_service_id)
            .ok_or_else(|| CartNotice::NotInCart(sub_service_id.clone()))?;
        self.update_quantity(sub_service_id, current.saturating_sub(1))
    }

    fn session(&self) -> Result<(AuthToken, u64), CartNotice> {
        let state = self.lock();
        match &state.identity {
            Some(identity) => Ok((identity.token.clone(), state.epoch)),
            None => Err(CartNotice::SignInRequired),
        }
    }

    fn begin_sync(&self, epoch: u64) -> Result<SyncGuard<'_>, CartNotice> {
        let mut state = self.lock();
        self.syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CartNotice::Busy)?;
        state.sync_epoch = epoch;
        if state.epoch == epoch {
            state.phase = CartPhase::Loading;
        }
        drop(state);
        Ok(SyncGuard {
            syncing: &self.syncing,
            state: &self.state,
            idle: &self.idle,
        })
    }

    fn take_line(&self, sub_service_id: &SubServiceId) -> Option<(usize, CartItem)> {
        let mut state = self.lock();
        let index = state
            .items
            .iter()
            .position(|item| &item.sub_service_id == sub_service_id)?;
        Some((index, state.items.remove(index)))
    }

    /// Apply `f` to the state if the identity has not changed since `epoch`.
    fn with_epoch(&self, epoch: u64, f: impl FnOnce(&mut CartState)) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("identity changed during cart round trip, discarding result");
            return false;
        }
        f(&mut state);
        true
    }
}

impl<A: StorefrontApi> CartStore<A> {
    /// Fetch the server cart and replace local items wholesale.
    ///
    /// Ignored while another round trip for the same identity is in flight.
    /// A round trip left over from a previous identity is waited out first.
    pub async fn load(&self) -> Result<(), CartNotice> {
        loop {
            // Registered before the check so a release in between still wakes us.
            let idle = self.idle.notified();
            let (token, epoch) = self.session()?;
            match self.begin_sync(epoch) {
                Ok(_guard) => return self.refresh(&token, epoch, false).await,
                Err(_) if self.lock().sync_epoch == epoch => {
                    debug!("cart round trip already in flight, ignoring load");
                    return Ok(());
                }
                Err(_) => {
                    debug!("waiting for previous identity's cart round trip");
                    idle.await;
                }
            }
        }
    }

    /// Add a line. On success the server cart is reloaded; quantities of
    /// lines that survive the reload are kept.
    pub async fn add(&self, item: CartItem) -> Result<(), CartNotice> {
        let (token, epoch) = self.session()?;
        let _guard = self.begin_sync(epoch)?;
        if self.contains(&item.sub_service_id) {
            return Err(CartNotice::AlreadyInCart(item.name));
        }

        let mut item = item;
        item.quantity = item.quantity.clamp(1, MAX_QUANTITY_PER_ITEM);
        if let Err(e) = self.api.add_to_cart(&token, &item).await {
            warn!(error = %e, item = %item.sub_service_id, "add to cart failed");
            return Err(CartNotice::sync_failed(&e));
        }
        debug!(item = %item.sub_service_id, "added to cart");

        if self.refresh(&token, epoch, true).await.is_err() {
            // The server accepted the line; show it until the next load.
            self.with_epoch(epoch, |state| {
                if !state
                    .items
                    .iter()
                    .any(|line| line.sub_service_id == item.sub_service_id)
                {
                    state.items.push(item);
                }
            });
        }
        Ok(())
    }

    /// Remove a line optimistically, then on the server. If the server call
    /// fails the store re-fetches the server cart; if that fails too the
    /// line is put back.
    pub async fn remove(&self, sub_service_id: &SubServiceId) -> Result<(), CartNotice> {
        let (token, epoch) = self.session()?;
        let _guard = self.begin_sync(epoch)?;

        let Some((index, removed)) = self.take_line(sub_service_id) else {
            return Err(CartNotice::NotInCart(sub_service_id.clone()));
        };

        let Err(e) = self.api.remove_from_cart(&token, sub_service_id).await else {
            debug!(item = %sub_service_id, "removed from cart");
            return Ok(());
        };
        warn!(error = %e, item = %sub_service_id, "remove from cart failed, re-syncing");
        let notice = CartNotice::sync_failed(&e);

        if self.refresh(&token, epoch, true).await.is_err() {
            self.with_epoch(epoch, |state| {
                let index = index.min(state.items.len());
                state.items.insert(index, removed);
            });
        }
        Err(notice)
    }

    /// Empty the cart on the server, then locally.
    pub async fn clear(&self) -> Result<(), CartNotice> {
        self.lease()?.clear().await
    }

    /// Hold the cart still for a multi-step operation such as checkout.
    ///
    /// While the lease lives every other mutation is rejected with
    /// [`CartNotice::Busy`].
    pub fn lease(&self) -> Result<CartLease<'_, A>, CartNotice> {
        let (token, epoch) = self.session()?;
        let guard = self.begin_sync(epoch)?;
        Ok(CartLease {
            store: self,
            _guard: guard,
            token,
            epoch,
        })
    }

    async fn refresh(
        &self,
        token: &AuthToken,
        epoch: u64,
        keep_quantities: bool,
    ) -> Result<(), CartNotice> {
        let records = match self.api.cart(token).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "cart fetch failed");
                return Err(CartNotice::sync_failed(&e));
            }
        };

        let mut fetched: Vec<CartItem> = Vec::with_capacity(records.len());
        for item in records.into_iter().filter_map(CartRecord::into_cart_item) {
            if fetched
                .iter()
                .any(|line| line.sub_service_id == item.sub_service_id)
            {
                warn!(item = %item.sub_service_id, "duplicate cart line from server, ignoring");
                continue;
            }
            fetched.push(item);
        }

        self.with_epoch(epoch, |state| {
            if keep_quantities {
                for item in &mut fetched {
                    if let Some(local) = state
                        .items
                        .iter()
                        .find(|line| line.sub_service_id == item.sub_service_id)
                    {
                        item.quantity = local.quantity;
                    }
                }
            }
            debug!(lines = fetched.len(), "cart synced");
            state.items = fetched;
            state.phase = CartPhase::Ready;
        });
        Ok(())
    }
}

/// Exclusive hold on a [`CartStore`], obtained from [`CartStore::lease`].
pub struct CartLease<'a, A> {
    store: &'a CartStore<A>,
    _guard: SyncGuard<'a>,
    token: AuthToken,
    epoch: u64,
}

impl<A: StorefrontApi> CartLease<'_, A> {
    /// Lines as of now; they cannot change while the lease is held.
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.store.items()
    }

    /// Bearer token of the identity the lease was taken for.
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    /// Delete the server cart, then reset local lines.
    pub async fn clear(self) -> Result<(), CartNotice> {
        if let Err(e) = self.store.api.clear_cart(&self.token).await {
            warn!(error = %e, "clear cart failed");
            return Err(CartNotice::sync_failed(&e));
        }
        self.store.with_epoch(self.epoch, |state| state.items.clear());
        debug!("cart cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, InMemoryStorefront};
    use crate::catalog::{ServiceDocument, SubServiceRecord};
    use crate::money::Money;
    use std::time::Duration;

    fn item(service: &str, index: usize, name: &str, price: i64) -> CartItem {
        let mut subs: Vec<SubServiceRecord> = (0..index)
            .map(|i| SubServiceRecord::new(format!("filler {}", i), 1))
            .collect();
        subs.push(SubServiceRecord::new(name, price));
        ServiceDocument::new(service, "AC Repair", subs)
            .catalog_items(0)
            .remove(index)
            .to_cart_item()
    }

    fn token() -> AuthToken {
        AuthToken::new("token-1")
    }

    fn signed_in(api: &Arc<InMemoryStorefront>) -> CartStore<InMemoryStorefront> {
        let store = CartStore::new(api.clone());
        store.set_identity(Some(Identity::new("user-1", token())));
        store
    }

    #[tokio::test]
    async fn test_signed_out_operations_fail_fast() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = CartStore::new(api.clone());

        assert_eq!(
            store.add(item("s", 0, "Gas refill", 2499)).await,
            Err(CartNotice::SignInRequired)
        );
        assert_eq!(store.load().await, Err(CartNotice::SignInRequired));
        assert_eq!(
            store.update_quantity(&SubServiceId::new("s-0"), 2),
            Err(CartNotice::SignInRequired)
        );
        assert_eq!(api.calls(Endpoint::AddToCart), 0);
        assert_eq!(store.phase(), CartPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_add_twice_reports_already_in_cart() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);

        store.add(line.clone()).await.unwrap();
        assert_eq!(
            store.add(line).await,
            Err(CartNotice::AlreadyInCart("Gas refill".to_string()))
        );
        assert_eq!(api.calls(Endpoint::AddToCart), 1);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.phase(), CartPhase::Ready);
    }

    #[tokio::test]
    async fn test_add_keeps_local_quantities() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let first = item("s", 0, "Gas refill", 2499);
        store.add(first.clone()).await.unwrap();
        store.update_quantity(&first.sub_service_id, 3).unwrap();

        store.add(item("s", 1, "Filter clean", 399)).await.unwrap();
        let items = store.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[1].quantity, 1);
    }

    #[tokio::test]
    async fn test_add_failure_surfaces_server_message() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        api.fail_next(Endpoint::AddToCart, "Service unavailable in your area");

        assert_eq!(
            store.add(item("s", 0, "Gas refill", 2499)).await,
            Err(CartNotice::SyncFailed("Service unavailable in your area".to_string()))
        );
        assert!(store.is_empty());
        assert!(!store.is_syncing());
    }

    #[tokio::test]
    async fn test_add_survives_reload_failure() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        api.fail_next(Endpoint::Cart, "");

        store.add(item("s", 0, "Gas refill", 2499)).await.unwrap();
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_quantity_floor() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);
        store.add(line.clone()).await.unwrap();

        assert_eq!(
            store.update_quantity(&line.sub_service_id, 0),
            Err(CartNotice::InvalidQuantity(0))
        );
        assert_eq!(
            store.update_quantity(&line.sub_service_id, -1),
            Err(CartNotice::InvalidQuantity(-1))
        );
        assert_eq!(store.items()[0].quantity, 1);
        assert!(!store.can_decrement(&line.sub_service_id));
        assert!(store.decrement(&line.sub_service_id).is_err());
        assert_eq!(store.items()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_quantity_ceiling_and_steps() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);
        store.add(line.clone()).await.unwrap();

        store.increment(&line.sub_service_id).unwrap();
        store.increment(&line.sub_service_id).unwrap();
        assert!(store.can_decrement(&line.sub_service_id));
        store.decrement(&line.sub_service_id).unwrap();
        assert_eq!(store.items()[0].quantity, 2);
        assert_eq!(store.pricing().total, Money::from_rupees(4998));

        assert_eq!(
            store.update_quantity(&line.sub_service_id, MAX_QUANTITY_PER_ITEM + 1),
            Err(CartNotice::QuantityExceedsLimit(
                MAX_QUANTITY_PER_ITEM + 1,
                MAX_QUANTITY_PER_ITEM
            ))
        );
        assert_eq!(
            store.update_quantity(&SubServiceId::new("missing-0"), 2),
            Err(CartNotice::NotInCart(SubServiceId::new("missing-0")))
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);
        store.add(line.clone()).await.unwrap();

        store.remove(&line.sub_service_id).await.unwrap();
        assert!(store.is_empty());
        assert!(api.cart_of(&token()).is_empty());
        assert_eq!(
            store.remove(&line.sub_service_id).await,
            Err(CartNotice::NotInCart(line.sub_service_id.clone()))
        );
    }

    #[tokio::test]
    async fn test_remove_failure_resyncs_from_server() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);
        store.add(line.clone()).await.unwrap();
        api.fail_next(Endpoint::RemoveFromCart, "");

        assert_eq!(
            store.remove(&line.sub_service_id).await,
            Err(CartNotice::SyncFailed(SYNC_FAILED_MESSAGE.to_string()))
        );
        // The server still has the line, so the re-sync brings it back.
        assert_eq!(store.items().len(), 1);
        assert_eq!(api.calls(Endpoint::Cart), 2);
    }

    #[tokio::test]
    async fn test_remove_failure_restores_line_when_resync_fails() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let first = item("s", 0, "Gas refill", 2499);
        let second = item("s", 1, "Filter clean", 399);
        store.add(first.clone()).await.unwrap();
        store.add(second).await.unwrap();

        api.fail_always(Endpoint::RemoveFromCart);
        api.fail_always(Endpoint::Cart);
        assert!(store.remove(&first.sub_service_id).await.is_err());
        let items = store.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sub_service_id, first.sub_service_id);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_are_rejected() {
        let api = Arc::new(InMemoryStorefront::new().with_latency(Duration::from_millis(20)));
        let store = signed_in(&api);

        let (a, b) = tokio::join!(
            store.add(item("s", 0, "Gas refill", 2499)),
            store.add(item("s", 1, "Filter clean", 399)),
        );
        assert!(a.is_ok());
        assert_eq!(b, Err(CartNotice::Busy));
        assert_eq!(api.calls(Endpoint::AddToCart), 1);
    }

    #[tokio::test]
    async fn test_quantity_update_rejected_while_syncing() {
        let api = Arc::new(InMemoryStorefront::new().with_latency(Duration::from_millis(20)));
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);
        store.add(line.clone()).await.unwrap();

        let (_, update) = tokio::join!(store.load(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.update_quantity(&line.sub_service_id, 2)
        });
        assert_eq!(update, Err(CartNotice::Busy));
        assert_eq!(store.items()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_reentrant_load_is_ignored() {
        let api = Arc::new(InMemoryStorefront::new().with_latency(Duration::from_millis(10)));
        let store = signed_in(&api);
        let (a, b) = tokio::join!(store.load(), store.load());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(api.calls(Endpoint::Cart), 1);
    }

    #[tokio::test]
    async fn test_round_trips_enter_loading() {
        let api = Arc::new(InMemoryStorefront::new().with_latency(Duration::from_millis(20)));
        let store = signed_in(&api);
        store.load().await.unwrap();
        let line = item("s", 0, "Gas refill", 2499);

        let (added, phase) = tokio::join!(store.add(line.clone()), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.phase()
        });
        added.unwrap();
        assert_eq!(phase, CartPhase::Loading);
        assert_eq!(store.phase(), CartPhase::Ready);

        let (removed, phase) = tokio::join!(store.remove(&line.sub_service_id), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.phase()
        });
        removed.unwrap();
        assert_eq!(phase, CartPhase::Loading);

        let lease = store.lease().unwrap();
        assert_eq!(store.phase(), CartPhase::Loading);
        drop(lease);
        assert_eq!(store.phase(), CartPhase::Ready);
    }

    #[tokio::test]
    async fn test_load_for_new_identity_waits_for_previous_round_trip() {
        let api = Arc::new(InMemoryStorefront::new().with_latency(Duration::from_millis(20)));
        let other = AuthToken::new("token-2");
        api.seed_cart(&other, vec![item("t", 0, "Drum repair", 799)]);
        let store = signed_in(&api);

        let (added, loaded) = tokio::join!(store.add(item("s", 0, "Gas refill", 2499)), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.set_identity(Some(Identity::new("user-2", other.clone())));
            store.load().await
        });
        assert!(added.is_ok());
        assert!(loaded.is_ok());
        assert_eq!(store.phase(), CartPhase::Ready);
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Drum repair");
        assert_eq!(api.cart_of(&token()).len(), 1);
    }

    #[tokio::test]
    async fn test_load_replaces_items() {
        let api = Arc::new(InMemoryStorefront::new());
        api.seed_cart(&token(), vec![item("s", 0, "Gas refill", 2499)]);
        let store = signed_in(&api);
        assert_eq!(store.phase(), CartPhase::Uninitialized);

        store.load().await.unwrap();
        assert_eq!(store.phase(), CartPhase::Ready);
        assert_eq!(store.items()[0].price, Money::from_rupees(2499));
    }

    #[tokio::test]
    async fn test_load_failure_leaves_cart_usable() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        api.fail_next(Endpoint::Cart, "Session expired");

        assert_eq!(
            store.load().await,
            Err(CartNotice::SyncFailed("Session expired".to_string()))
        );
        assert_eq!(store.phase(), CartPhase::Ready);
        assert!(!store.is_syncing());
    }

    #[tokio::test]
    async fn test_identity_change_discards_late_load() {
        let api = Arc::new(InMemoryStorefront::new().with_latency(Duration::from_millis(20)));
        api.seed_cart(&token(), vec![item("s", 0, "Gas refill", 2499)]);
        let store = signed_in(&api);

        let (result, ()) = tokio::join!(store.load(), async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.set_identity(None);
        });
        assert!(result.is_ok());
        assert!(store.is_empty());
        assert_eq!(store.phase(), CartPhase::Uninitialized);
    }

    #[tokio::test]
    async fn test_sign_out_clears_items() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        store.add(item("s", 0, "Gas refill", 2499)).await.unwrap();

        store.set_identity(None);
        assert!(store.is_empty());
        assert_eq!(store.phase(), CartPhase::Uninitialized);
        assert!(store.identity().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        store.add(item("s", 0, "Gas refill", 2499)).await.unwrap();

        api.fail_next(Endpoint::ClearCart, "");
        assert!(matches!(store.clear().await, Err(CartNotice::SyncFailed(_))));
        assert_eq!(store.items().len(), 1);

        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert!(api.cart_of(&token()).is_empty());
    }

    #[tokio::test]
    async fn test_lease_blocks_mutations() {
        let api = Arc::new(InMemoryStorefront::new());
        let store = signed_in(&api);
        let line = item("s", 0, "Gas refill", 2499);
        store.add(line.clone()).await.unwrap();

        let lease = store.lease().unwrap();
        assert_eq!(lease.snapshot().len(), 1);
        assert_eq!(store.add(item("s", 1, "Filter clean", 399)).await, Err(CartNotice::Busy));
        assert_eq!(store.remove(&line.sub_service_id).await, Err(CartNotice::Busy));
        assert!(matches!(store.lease(), Err(CartNotice::Busy)));
        drop(lease);

        assert!(!store.is_syncing());
        store.remove(&line.sub_service_id).await.unwrap();
    }
}
