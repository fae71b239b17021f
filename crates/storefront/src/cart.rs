//! Cart synchronization store.
//!
//! An explicit state container holding the session's cart snapshot, a
//! derived line-item counter, and a loading flag. Each operation acquires a
//! client through the [`ClientProvider`] seam, performs exactly one remote
//! call, and replaces the snapshot from the response.
//!
//! Operations are serialized: an async mutex admits at most one mutation at
//! a time, so completions cannot race on the shared snapshot. They are not
//! deduplicated - two rapid `add_item` calls still issue two remote calls.
//!
//! On failure the store logs, drops the loading flag, and - under the
//! default [`ErrorPolicy::KeepStale`] - leaves the previous snapshot in
//! place. Callers that must distinguish "no cart yet" from "last operation
//! failed" use the returned `Result` instead of the snapshot.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{instrument, warn};

use midnight_runners_core::{LineItemId, ProductId, VariantId};

use crate::wix::types::{Cart, CatalogItemOptions, CatalogReference, LineItemInput};
use crate::wix::{ClientProvider, CommerceClient, WixError};

/// A cart operation failure, by boundary.
#[derive(Debug, Error)]
pub enum CartError {
    /// The client provider could not hand out a client.
    #[error("client acquisition failed: {0}")]
    Acquire(#[source] WixError),

    /// The remote cart call failed.
    #[error("cart call failed: {0}")]
    Remote(#[source] WixError),
}

/// What happens to the snapshot when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Keep the previous cart and counter (stale-state-on-error).
    #[default]
    KeepStale,
    /// Clear the cart and reset the counter to zero.
    Reset,
}

/// Point-in-time view of the store state.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Last successfully synchronized cart, if any.
    pub cart: Option<Cart>,
    /// Cached line-item count; recomputed whenever `cart` changes.
    pub counter: u32,
    /// Whether an operation is currently in flight.
    pub is_loading: bool,
}

#[derive(Debug, Default)]
struct CartState {
    cart: Option<Cart>,
    counter: u32,
    is_loading: bool,
}

impl CartState {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart: self.cart.clone(),
            counter: self.counter,
            is_loading: self.is_loading,
        }
    }
}

/// The cart synchronization store.
///
/// Created once at process start and shared by reference; state lives for
/// the process.
pub struct CartStore<P: ClientProvider> {
    provider: P,
    /// App/catalog ID stamped onto every catalog reference.
    app_id: String,
    policy: ErrorPolicy,
    state: RwLock<CartState>,
    /// Admits at most one in-flight mutation.
    op_lock: Mutex<()>,
}

impl<P: ClientProvider> CartStore<P> {
    /// Create a store with the default [`ErrorPolicy::KeepStale`].
    pub fn new(provider: P, app_id: impl Into<String>) -> Self {
        Self::with_policy(provider, app_id, ErrorPolicy::default())
    }

    /// Create a store with an explicit error policy.
    pub fn with_policy(provider: P, app_id: impl Into<String>, policy: ErrorPolicy) -> Self {
        Self {
            provider,
            app_id: app_id.into(),
            policy,
            state: RwLock::new(CartState::default()),
            op_lock: Mutex::new(()),
        }
    }

    /// Current state without touching the network.
    pub async fn snapshot(&self) -> CartSnapshot {
        self.state.read().await.snapshot()
    }

    /// Fetch the current cart and replace the snapshot with it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] on acquisition or remote failure; the snapshot
    /// is handled per the store's [`ErrorPolicy`].
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<CartSnapshot, CartError> {
        let _guard = self.op_lock.lock().await;
        self.begin().await;

        let client = self.acquire().await?;
        let result = client.current_cart().await;
        self.finish(result).await
    }

    /// Add one line item built from a catalog reference.
    ///
    /// The app/catalog ID comes from process-wide configuration, not from
    /// the call arguments. `options.variantId` is sent only when
    /// `variant_id` is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] on acquisition or remote failure.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        let _guard = self.op_lock.lock().await;
        self.begin().await;

        let line = LineItemInput {
            catalog_reference: CatalogReference {
                app_id: self.app_id.clone(),
                catalog_item_id: product_id.into_inner(),
                options: (!variant_id.is_empty()).then(|| CatalogItemOptions {
                    variant_id: variant_id.into_inner(),
                }),
            },
            quantity,
        };

        let client = self.acquire().await?;
        let result = client.add_to_current_cart(vec![line]).await;
        self.finish(result).await
    }

    /// Remove the identified line item from the cart.
    ///
    /// The predecessor of this store removed a coupon here and ignored the
    /// argument; this implementation removes the line item (see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`CartError`] on acquisition or remote failure.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: LineItemId) -> Result<CartSnapshot, CartError> {
        let _guard = self.op_lock.lock().await;
        self.begin().await;

        let client = self.acquire().await?;
        let result = client.remove_line_items(vec![item_id.into_inner()]).await;
        self.finish(result).await
    }

    /// Mark an operation as in flight.
    async fn begin(&self) {
        self.state.write().await.is_loading = true;
    }

    /// Acquire a client, surfacing failure as a finished, failed operation.
    async fn acquire(&self) -> Result<Arc<P::Client>, CartError> {
        match self.provider.client().await {
            Ok(client) => Ok(client),
            Err(e) => {
                warn!(error = %e, "failed to acquire commerce client");
                self.state.write().await.is_loading = false;
                Err(CartError::Acquire(e))
            }
        }
    }

    /// Apply the remote call result to the store state.
    async fn finish(&self, result: Result<Cart, WixError>) -> Result<CartSnapshot, CartError> {
        match result {
            Ok(cart) => {
                let mut state = self.state.write().await;
                state.counter = cart.line_item_count();
                state.cart = Some(cart);
                state.is_loading = false;
                Ok(state.snapshot())
            }
            Err(e) => {
                warn!(error = %e, "cart operation failed");
                if e.is_auth() {
                    self.provider.invalidate().await;
                }

                let mut state = self.state.write().await;
                state.is_loading = false;
                if self.policy == ErrorPolicy::Reset {
                    state.cart = None;
                    state.counter = 0;
                }
                Err(CartError::Remote(e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::wix::types::LineItem;

    /// A recorded outgoing remote call.
    #[derive(Debug, Clone, PartialEq)]
    enum RemoteCall {
        GetCart,
        AddToCart(Vec<LineItemInput>),
        RemoveLineItems(Vec<String>),
    }

    /// Mock commerce backend: records calls, replays queued responses.
    #[derive(Default)]
    struct MockClient {
        responses: StdMutex<VecDeque<Result<Cart, WixError>>>,
        calls: StdMutex<Vec<RemoteCall>>,
    }

    impl MockClient {
        fn respond_with(results: Vec<Result<Cart, WixError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(results.into()),
                calls: StdMutex::new(Vec::new()),
            })
        }

        fn next_response(&self) -> Result<Cart, WixError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(WixError::Status {
                        status: 500,
                        message: "mock response queue exhausted".to_string(),
                    })
                })
        }

        fn calls(&self) -> Vec<RemoteCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommerceClient for MockClient {
        async fn current_cart(&self) -> Result<Cart, WixError> {
            self.calls.lock().unwrap().push(RemoteCall::GetCart);
            self.next_response()
        }

        async fn add_to_current_cart(
            &self,
            line_items: Vec<LineItemInput>,
        ) -> Result<Cart, WixError> {
            self.calls
                .lock()
                .unwrap()
                .push(RemoteCall::AddToCart(line_items));
            self.next_response()
        }

        async fn remove_line_items(&self, line_item_ids: Vec<String>) -> Result<Cart, WixError> {
            self.calls
                .lock()
                .unwrap()
                .push(RemoteCall::RemoveLineItems(line_item_ids));
            self.next_response()
        }
    }

    /// Mock provider: hands out a shared `MockClient` or fails acquisition.
    struct MockProvider {
        client: Arc<MockClient>,
        fail_acquire: bool,
        invalidations: AtomicUsize,
    }

    impl MockProvider {
        fn providing(client: Arc<MockClient>) -> Self {
            Self {
                client,
                fail_acquire: false,
                invalidations: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                client: Arc::new(MockClient::default()),
                fail_acquire: true,
                invalidations: AtomicUsize::new(0),
            }
        }
    }

    impl ClientProvider for MockProvider {
        type Client = MockClient;

        async fn client(&self) -> Result<Arc<MockClient>, WixError> {
            if self.fail_acquire {
                return Err(WixError::Status {
                    status: 500,
                    message: "Internal Server Error".to_string(),
                });
            }
            Ok(Arc::clone(&self.client))
        }

        async fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn cart_with_items(n: usize) -> Cart {
        Cart {
            id: Some("cart-1".to_string()),
            line_items: (0..n)
                .map(|i| LineItem {
                    id: Some(format!("li-{i}")),
                    quantity: Some(1),
                    catalog_reference: None,
                    product_name: None,
                })
                .collect(),
        }
    }

    fn store_over(client: Arc<MockClient>) -> CartStore<Arc<MockProvider>> {
        CartStore::new(Arc::new(MockProvider::providing(client)), "test-app-id")
    }

    #[tokio::test]
    async fn get_cart_counter_matches_line_item_count() {
        let client = MockClient::respond_with(vec![Ok(cart_with_items(3))]);
        let store = store_over(Arc::clone(&client));

        let snapshot = store.get_cart().await.unwrap();
        assert_eq!(snapshot.counter, 3);
        assert!(!snapshot.is_loading);
        assert_eq!(client.calls(), vec![RemoteCall::GetCart]);
    }

    #[tokio::test]
    async fn get_cart_counter_is_zero_for_empty_cart() {
        let client = MockClient::respond_with(vec![Ok(cart_with_items(0))]);
        let store = store_over(client);

        let snapshot = store.get_cart().await.unwrap();
        assert_eq!(snapshot.counter, 0);
        assert!(snapshot.cart.is_some());
    }

    #[tokio::test]
    async fn acquisition_failure_leaves_prior_state_untouched() {
        // Seed a snapshot first, then swap in a failing provider via a
        // second store sharing nothing - state must simply stay put.
        let client = MockClient::respond_with(vec![Ok(cart_with_items(2))]);
        let provider = Arc::new(MockProvider::providing(Arc::clone(&client)));
        let store = CartStore::new(Arc::clone(&provider), "test-app-id");
        store.get_cart().await.unwrap();

        let failing = CartStore::new(Arc::new(MockProvider::failing()), "test-app-id");
        let err = failing.get_cart().await.unwrap_err();
        assert!(matches!(err, CartError::Acquire(_)));

        let snapshot = failing.snapshot().await;
        assert!(snapshot.cart.is_none());
        assert_eq!(snapshot.counter, 0);
        assert!(!snapshot.is_loading);

        // The seeded store is untouched by the failing one.
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.counter, 2);
    }

    #[tokio::test]
    async fn remote_failure_keeps_stale_state_by_default() {
        let client = MockClient::respond_with(vec![
            Ok(cart_with_items(2)),
            Err(WixError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        ]);
        let store = store_over(client);

        store.get_cart().await.unwrap();
        let err = store.get_cart().await.unwrap_err();
        assert!(matches!(err, CartError::Remote(_)));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.counter, 2);
        assert!(snapshot.cart.is_some());
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn remote_failure_clears_state_under_reset_policy() {
        let client = MockClient::respond_with(vec![
            Ok(cart_with_items(2)),
            Err(WixError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        ]);
        let provider = Arc::new(MockProvider::providing(client));
        let store = CartStore::with_policy(provider, "test-app-id", ErrorPolicy::Reset);

        store.get_cart().await.unwrap();
        store.get_cart().await.unwrap_err();

        let snapshot = store.snapshot().await;
        assert!(snapshot.cart.is_none());
        assert_eq!(snapshot.counter, 0);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn add_item_builds_exactly_one_line_item() {
        let client = MockClient::respond_with(vec![Ok(cart_with_items(1))]);
        let store = store_over(Arc::clone(&client));

        store
            .add_item(ProductId::new("prod123"), VariantId::new("var-9"), 1)
            .await
            .unwrap();

        let calls = client.calls();
        let RemoteCall::AddToCart(lines) = calls.first().unwrap() else {
            panic!("expected add-to-cart call, got {calls:?}");
        };
        assert_eq!(lines.len(), 1);
        let line = lines.first().unwrap();
        assert_eq!(line.catalog_reference.catalog_item_id, "prod123");
        assert_eq!(line.catalog_reference.app_id, "test-app-id");
        assert_eq!(
            line.catalog_reference.options.as_ref().unwrap().variant_id,
            "var-9"
        );
        assert_eq!(line.quantity, 1);
    }

    #[tokio::test]
    async fn add_item_omits_options_for_empty_variant() {
        let client = MockClient::respond_with(vec![Ok(cart_with_items(1))]);
        let store = store_over(Arc::clone(&client));

        store
            .add_item(ProductId::new("prod123"), VariantId::new(""), 2)
            .await
            .unwrap();

        let calls = client.calls();
        let RemoteCall::AddToCart(lines) = calls.first().unwrap() else {
            panic!("expected add-to-cart call, got {calls:?}");
        };
        assert!(lines.first().unwrap().catalog_reference.options.is_none());
        assert_eq!(lines.first().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn add_item_snapshot_reflects_returned_cart() {
        // add_item("prod123", "", 2) against a backend returning 3 items.
        let returned = cart_with_items(3);
        let client = MockClient::respond_with(vec![Ok(returned.clone())]);
        let store = store_over(client);

        let snapshot = store
            .add_item(ProductId::new("prod123"), VariantId::new(""), 2)
            .await
            .unwrap();

        assert_eq!(snapshot.cart, Some(returned));
        assert_eq!(snapshot.counter, 3);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn remove_item_sends_the_identified_line_item() {
        // Corrected contract: the outgoing request carries the argument
        // (the predecessor removed a coupon and ignored it).
        let client = MockClient::respond_with(vec![Ok(cart_with_items(0))]);
        let store = store_over(Arc::clone(&client));

        store
            .remove_item(LineItemId::new("li-42"))
            .await
            .unwrap();

        assert_eq!(
            client.calls(),
            vec![RemoteCall::RemoveLineItems(vec!["li-42".to_string()])]
        );
    }

    #[tokio::test]
    async fn auth_failure_invalidates_the_provider_cache() {
        let client = MockClient::respond_with(vec![Err(WixError::Unauthorized(
            "token expired".to_string(),
        ))]);
        let provider = Arc::new(MockProvider::providing(client));
        let store = CartStore::new(Arc::clone(&provider), "test-app-id");

        store.get_cart().await.unwrap_err();
        assert_eq!(provider.invalidations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_auth_failure_does_not_invalidate() {
        let client = MockClient::respond_with(vec![Err(WixError::Status {
            status: 500,
            message: "boom".to_string(),
        })]);
        let provider = Arc::new(MockProvider::providing(client));
        let store = CartStore::new(Arc::clone(&provider), "test-app-id");

        store.get_cart().await.unwrap_err();
        assert_eq!(provider.invalidations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_adds_are_serialized_not_deduplicated() {
        let client = MockClient::respond_with(vec![
            Ok(cart_with_items(1)),
            Ok(cart_with_items(2)),
        ]);
        let provider = Arc::new(MockProvider::providing(Arc::clone(&client)));
        let store = Arc::new(CartStore::new(provider, "test-app-id"));

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .add_item(ProductId::new("p1"), VariantId::new(""), 1)
                    .await
            })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .add_item(ProductId::new("p2"), VariantId::new(""), 1)
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Two remote calls were issued; the final counter is whichever
        // response the mutex admitted last.
        assert_eq!(client.calls().len(), 2);
        assert_eq!(store.snapshot().await.counter, 2);
    }
}
