//! End-to-end storefront flow against the in-memory API.

use doorstep_commerce::api::Endpoint;
use doorstep_commerce::catalog::{CategoryRecord, ServiceDocument, SubServiceRecord};
use doorstep_commerce::prelude::*;
use std::sync::Arc;

fn backend() -> InMemoryStorefront {
    InMemoryStorefront::new().with_catalog(
        vec![
            CategoryRecord::new("65f0aa01", "AC Repair", 1),
            CategoryRecord::new("65f0aa02", "Washing Machine", 2),
        ],
        vec![
            ServiceDocument::new(
                "svc-ac",
                "AC Repair",
                vec![
                    SubServiceRecord::new("Gas refill", 449).with_actual_price(599),
                    SubServiceRecord::new("Jet service", 499),
                ],
            ),
            ServiceDocument::new(
                "svc-wm",
                "Washing Machine",
                vec![SubServiceRecord::new("Drum repair", 799)],
            ),
            ServiceDocument::new("svc-gy", "Geyser", vec![SubServiceRecord::new("Install", 349)]),
        ],
    )
}

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "Asha Patil".to_string(),
        phone: "9876543210".to_string(),
        address: "12 Shivaji Nagar".to_string(),
        message: "Cooling is weak".to_string(),
        brand: "Voltas".to_string(),
        ..CheckoutForm::default()
    }
}

#[tokio::test]
async fn browse_add_and_submit_enquiry() {
    let api = Arc::new(backend());
    let storefront = Storefront::with_api(api.clone(), &StorefrontConfig::default());

    let load = storefront.catalog().load().await.into_current().unwrap();
    assert!(!load.is_degraded());
    let titles: Vec<&str> = load.catalog.categories().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["AC Repair", "Washing Machine", "Geyser"]);
    assert_eq!(load.catalog.categories()[2].id.as_str(), "geyser");

    // Browsing is open to everyone, the cart is not.
    let ac = load.catalog.category("ac-repair").unwrap();
    assert_eq!(
        storefront.add_to_cart(&ac.items[0]).await,
        Err(CartNotice::SignInRequired)
    );

    storefront
        .sign_in(Identity::new("user-1", AuthToken::new("token-1")))
        .await
        .unwrap();
    for item in &ac.items {
        storefront.add_to_cart(item).await.unwrap();
    }
    assert_eq!(
        storefront.add_to_cart(&ac.items[0]).await,
        Err(CartNotice::AlreadyInCart("Gas refill".to_string()))
    );

    let pricing = storefront.cart().pricing();
    assert_eq!(pricing.total.to_string(), "\u{20b9}948");
    assert_eq!(pricing.savings, Money::from_rupees(150));

    // Pick the city from suggestions, then submit.
    let mut form = form();
    let checkout = storefront.checkout();
    assert_eq!(
        checkout.readiness(&form).missing,
        vec![CheckoutField::City, CheckoutField::Pincode]
    );
    let suggestion = storefront.addresses().resolve("431602")[0];
    form.apply_suggestion(&suggestion);
    assert!(checkout.readiness(&form).can_submit());

    api.fail_next(Endpoint::SubmitEnquiry, "");
    assert_eq!(checkout.submit(&form).await, Err(CheckoutError::Failed));
    assert_eq!(storefront.cart().items().len(), 2);

    let confirmation = checkout.submit(&form).await.unwrap();
    assert!(storefront.cart().is_empty());
    assert_eq!(confirmation.pricing.total, Money::from_rupees(948));

    let sent = &api.enquiries()[0];
    assert_eq!(sent.city, "Nanded");
    assert_eq!(sent.pincode, "431602");
    assert_eq!(sent.brand.as_deref(), Some("Voltas"));
    assert_eq!(sent.items.len(), 2);
}

#[tokio::test]
async fn category_routes_resolve_and_degrade() {
    let api = Arc::new(backend());
    let storefront = Storefront::with_api(api.clone(), &StorefrontConfig::default());

    let view = storefront
        .catalog()
        .load_category("washing-machine")
        .await
        .into_current()
        .unwrap();
    assert_eq!(view.category().map(|c| c.id.as_str()), Some("65f0aa02"));

    match storefront
        .catalog()
        .load_category("kitchen-chimney")
        .await
        .into_current()
        .unwrap()
    {
        CategoryView::NotFound(resolved) => assert_eq!(resolved.name, "Kitchen Chimney"),
        CategoryView::Found(category) => panic!("unexpected category {}", category.title),
    }

    api.fail_always(Endpoint::Categories);
    let load = storefront.catalog().load().await.into_current().unwrap();
    assert_eq!(load.degraded, vec![CatalogSource::Categories]);
    assert_eq!(load.catalog.item_count(), 4);
}

#[tokio::test]
async fn cart_follows_identity() {
    let api = Arc::new(backend());
    let storefront = Storefront::with_api(api.clone(), &StorefrontConfig::default());
    let load = storefront.catalog().load().await.into_current().unwrap();
    let item = load.catalog.items().next().unwrap().clone();

    storefront
        .sign_in(Identity::new("user-1", AuthToken::new("token-1")))
        .await
        .unwrap();
    storefront.add_to_cart(&item).await.unwrap();

    storefront.sign_out();
    assert!(storefront.cart().is_empty());

    storefront
        .sign_in(Identity::new("user-2", AuthToken::new("token-2")))
        .await
        .unwrap();
    assert!(storefront.cart().is_empty());

    storefront
        .sign_in(Identity::new("user-1", AuthToken::new("token-1")))
        .await
        .unwrap();
    assert_eq!(storefront.cart().items()[0].sub_service_id, item.id);
}
