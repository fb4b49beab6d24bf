use inventory::config::{InventoryConfig, StockPolicy};
use inventory::error::InventoryError;
use inventory::events::ChangeKind;
use inventory::lifecycle::InventorySystem;
use inventory::model::{Product, ProductCreate, ProductId, ProductQuery};

fn unseeded(policy: StockPolicy) -> InventoryConfig {
    InventoryConfig {
        stock_policy: policy,
        seed_on_empty: false,
        ..InventoryConfig::default()
    }
}

async fn find_by_name(system: &InventorySystem, name: &str) -> Product {
    system
        .catalog
        .find(ProductQuery::All, None, 0)
        .await
        .expect("Failed to list products")
        .into_iter()
        .find(|p| p.name == name)
        .expect("Seed product missing")
}

/// Seeded store, one purchase through the router.
#[tokio::test]
async fn test_buy_seeded_iphone() {
    let system = InventorySystem::start(&InventoryConfig::default())
        .await
        .expect("Failed to start system");

    let iphone = find_by_name(&system, "iPhone 11 Pro").await;
    assert_eq!(iphone.quantity, 25);

    let message = system.catalog.buy(iphone.id).await.expect("Purchase failed");
    assert_eq!(message, "Successfully bought iPhone 11 Pro at price of 999");

    let after = system.stock.count(iphone.id).await.unwrap();
    assert_eq!(after.quantity, 24);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_buy_nonexistent_product_changes_nothing() {
    let system = InventorySystem::start(&InventoryConfig::default())
        .await
        .unwrap();
    let before = system.catalog.find(ProductQuery::All, None, 0).await.unwrap();
    let mut events = system.changes.subscribe();

    let result = system.catalog.buy(ProductId(404)).await;
    assert_eq!(result, Err(InventoryError::NotFound("product_404".into())));
    assert_eq!(result.unwrap_err().to_string(), "Product not found");

    assert_eq!(system.catalog.find(ProductQuery::All, None, 0).await.unwrap(), before);
    assert!(events.try_recv().is_err());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_buy_from_ten_leaves_nine_and_one_event() {
    let system = InventorySystem::start(&unseeded(StockPolicy::Strict))
        .await
        .unwrap();
    let product = system
        .store()
        .insert(ProductCreate {
            name: "Samsung Galaxy S10 Plus".into(),
            price: 704.0,
            quantity: 10,
        })
        .await
        .unwrap();
    let mut events = system.changes.subscribe();

    system.catalog.buy(product.id).await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.kind, ChangeKind::Updated);
    assert_eq!(event.product.quantity, 9);
    assert!(events.try_recv().is_err());
    assert_eq!(system.catalog.get(product.id).await.unwrap().quantity, 9);

    system.shutdown().await.unwrap();
}

/// Concurrent decrements through the router lose no updates.
#[tokio::test]
async fn test_concurrent_buys_are_atomic() {
    let system = InventorySystem::start(&unseeded(StockPolicy::Strict))
        .await
        .unwrap();
    let id = system
        .store()
        .insert(ProductCreate {
            name: "Huawei P30 Pro".into(),
            price: 679.0,
            quantity: 10,
        })
        .await
        .unwrap()
        .id;

    let mut handles = vec![];
    for _ in 0..7 {
        let catalog = system.catalog.clone();
        handles.push(tokio::spawn(async move { catalog.buy(id).await }));
    }
    for handle in handles {
        handle.await.unwrap().expect("Purchase failed");
    }

    assert_eq!(system.stock.count(id).await.unwrap().quantity, 3);
    system.shutdown().await.unwrap();
}

/// Under the strict policy only the available units are sold.
#[tokio::test]
async fn test_strict_policy_never_oversells() {
    let system = InventorySystem::start(&unseeded(StockPolicy::Strict))
        .await
        .unwrap();
    let id = system
        .store()
        .insert(ProductCreate {
            name: "Limited Edition".into(),
            price: 50.0,
            quantity: 3,
        })
        .await
        .unwrap()
        .id;

    let mut handles = vec![];
    for _ in 0..8 {
        let catalog = system.catalog.clone();
        handles.push(tokio::spawn(async move { catalog.buy(id).await }));
    }

    let mut sold = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(InventoryError::InsufficientStock { requested: 1, .. }) => refused += 1,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }
    assert_eq!((sold, refused), (3, 5));
    assert_eq!(system.stock.count(id).await.unwrap().quantity, 0);
    assert!(system.catalog.list_in_stock().await.unwrap().is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_permissive_policy_allows_negative_stock() {
    let system = InventorySystem::start(&unseeded(StockPolicy::Permissive))
        .await
        .unwrap();
    let id = system
        .store()
        .insert(ProductCreate {
            name: "Last One".into(),
            price: 5.0,
            quantity: 1,
        })
        .await
        .unwrap()
        .id;

    system.catalog.buy(id).await.unwrap();
    system.catalog.buy(id).await.unwrap();
    assert_eq!(system.stock.count(id).await.unwrap().quantity, -1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_decrease_leaves_quantity() {
    let system = InventorySystem::start(&InventoryConfig::default())
        .await
        .unwrap();
    let huawei = find_by_name(&system, "Huawei P30 Pro").await;

    for value in [0, -5] {
        let result = system.stock.decrease(huawei.id, value).await;
        assert!(matches!(result, Err(InventoryError::InvalidArgument(_))));
    }
    assert_eq!(system.stock.count(huawei.id).await.unwrap().quantity, 15);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_list_in_stock_tracks_quantity() {
    let system = InventorySystem::start(&InventoryConfig::default())
        .await
        .unwrap();

    let created = system
        .catalog
        .create(inventory::catalog::NewProduct {
            name: "Pixel 4".into(),
            price: 799.0,
            quantity: Some(12),
        })
        .await
        .unwrap();
    assert_eq!(created.quantity, 0);

    let first = system.catalog.list_in_stock().await.unwrap();
    let second = system.catalog.list_in_stock().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|p| p.quantity > 0));
    assert!(first.iter().all(|p| p.id != created.id));

    system.shutdown().await.unwrap();
}
