use crate::error::InventoryError;
use crate::model::{Product, ProductCreate};
use entity_store::StoreClient;
use tracing::{info, instrument};

/// The products inserted into an empty store at startup.
pub fn sample_catalog() -> Vec<ProductCreate> {
    [
        ("Samsung Galaxy S10 Plus", 704.0, 10),
        ("iPhone 11 Pro", 999.0, 25),
        ("Huawei P30 Pro", 679.0, 15),
    ]
    .into_iter()
    .map(|(name, price, quantity)| ProductCreate {
        name: name.to_string(),
        price,
        quantity,
    })
    .collect()
}

/// Inserts `products` in one batch if the store holds no records.
///
/// Returns how many records were inserted; zero when the store was already populated.
/// This is the one path that sets `quantity` at creation.
#[instrument(skip_all)]
pub async fn seed_if_empty(
    store: &StoreClient<Product>,
    products: Vec<ProductCreate>,
) -> Result<usize, InventoryError> {
    let existing = store.count().await?;
    if existing > 0 {
        info!(existing, "Store already populated, skipping seed");
        return Ok(0);
    }
    let ids = store.insert_many(products).await?;
    info!(inserted = ids.len(), "Seeded sample catalog");
    Ok(ids.len())
}
