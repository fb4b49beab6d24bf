use crate::error::InventoryError;
use crate::events::{ChangeFeed, ChangeKind};
use crate::model::{
    validate_name, validate_price, Product, ProductCreate, ProductId, ProductQuery, ProductUpdate,
};
use crate::router::{StockApi, StockClient};
use entity_store::StoreClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Larger page sizes are clamped to this.
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub rows: Vec<Product>,
    /// Products in the whole catalog.
    pub total: usize,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Request body for creating a product. Any `quantity` sent is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Catalog edit. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDetails {
    pub name: Option<String>,
    pub price: Option<f64>,
}

/// The catalog component.
///
/// Reads and edits product details directly in the store. Stock changes always go
/// through `S`, normally a [`StockClient`] pointed at the warehouse.
#[derive(Clone)]
pub struct CatalogService<S: StockApi = StockClient> {
    store: StoreClient<Product>,
    stock: S,
    changes: ChangeFeed,
}

impl<S: StockApi> CatalogService<S> {
    pub fn new(store: StoreClient<Product>, stock: S, changes: ChangeFeed) -> Self {
        Self {
            store,
            stock,
            changes,
        }
    }

    /// Products matching `query` in id order, skipping `offset` and returning at most `limit`.
    pub async fn find(
        &self,
        query: ProductQuery,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Product>, InventoryError> {
        Ok(self.store.find_page(query, offset, limit).await?.items)
    }

    /// Number of products matching `query`.
    pub async fn count(&self, query: ProductQuery) -> Result<usize, InventoryError> {
        Ok(self.store.find_page(query, 0, Some(0)).await?.total)
    }

    /// Page `page` (1-based) of the whole catalog. `page_size` above [`MAX_PAGE_SIZE`]
    /// is clamped; zero for either argument is an invalid argument.
    #[instrument(skip(self))]
    pub async fn list(&self, page: usize, page_size: usize) -> Result<ProductPage, InventoryError> {
        if page == 0 || page_size == 0 {
            return Err(InventoryError::InvalidArgument(
                "page and pageSize must be at least 1".to_string(),
            ));
        }
        let page_size = page_size.min(MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(page_size);

        let found = self
            .store
            .find_page(ProductQuery::All, offset, Some(page_size))
            .await?;
        Ok(ProductPage {
            rows: found.items,
            total: found.total,
            page,
            page_size,
            total_pages: found.total.div_ceil(page_size),
        })
    }

    /// Products with `quantity > 0`, ordered by id.
    pub async fn list_in_stock(&self) -> Result<Vec<Product>, InventoryError> {
        self.find(ProductQuery::InStock, None, 0).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, InventoryError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    /// Creates a product with zero stock.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewProduct) -> Result<Product, InventoryError> {
        debug!(?new, "create called");
        validate_name(&new.name)?;
        validate_price(new.price)?;
        if let Some(requested) = new.quantity.filter(|q| *q != 0) {
            debug!(requested, "Ignoring requested quantity");
        }

        let product = self
            .store
            .insert(ProductCreate {
                name: new.name,
                price: new.price,
                quantity: 0,
            })
            .await?;
        info!(id = %product.id, "Product created");
        self.changes.publish(ChangeKind::Created, product.clone());
        Ok(product)
    }

    /// Changes name and/or price. Quantity is out of reach here.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: ProductId,
        details: ProductDetails,
    ) -> Result<Product, InventoryError> {
        if let Some(name) = &details.name {
            validate_name(name)?;
        }
        if let Some(price) = details.price {
            validate_price(price)?;
        }

        let update = ProductUpdate::Details {
            name: details.name,
            price: details.price,
        };
        let product = self.store.update_by_id(id, update).await?;
        self.changes.publish(ChangeKind::Updated, product.clone());
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<Product, InventoryError> {
        let product = self.store.remove(id).await?;
        info!("Product removed");
        self.changes.publish(ChangeKind::Removed, product.clone());
        Ok(product)
    }

    /// Buys one unit of `id`.
    ///
    /// Reads the product, then asks the warehouse to decrease its stock by one and
    /// waits for the answer. A missing product fails with `NotFound` before the
    /// warehouse is called. Any warehouse failure is returned exactly as received;
    /// nothing is compensated since the read changed nothing.
    ///
    /// The confirmation quotes name and price as read before the decrement.
    #[instrument(skip(self))]
    pub async fn buy(&self, id: ProductId) -> Result<String, InventoryError> {
        let product = self.get(id).await?;

        if let Err(e) = self.stock.decrease(id, 1).await {
            warn!(error = %e, "Purchase failed");
            return Err(e);
        }

        info!(name = %product.name, "Purchase completed");
        Ok(format!(
            "Successfully bought {} at price of {}",
            product.name, product.price
        ))
    }
}
