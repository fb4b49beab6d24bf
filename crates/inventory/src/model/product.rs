//! The product record shared by the catalog and the warehouse.
//!
//! # Entity Store
//! [`Product`] implements the [`StoreEntity`](entity_store::StoreEntity) trait, so one
//! [`EntityStore`](entity_store::EntityStore) keeps every product for both services.
//! The catalog edits `name` and `price`; only the warehouse changes `quantity`, and only
//! through [`ProductUpdate::AdjustQuantity`].

use entity_store::StoreEntity;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Minimum length of a product name, counted in characters after trimming.
pub const MIN_NAME_LEN: usize = 3;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// Accepts both the display form (`product_7`) and the bare number (`7`).
impl FromStr for ProductId {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProductError::Invalid {
            field: "id",
            reason: format!("'{}' is not a product id", s),
        };
        let digits = s.strip_prefix("product_").unwrap_or(s);
        // `u32::from_str` alone would also take a leading `+`.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse::<u32>().map(ProductId).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
    pub quantity: i64,
}

/// Whole prices go out as integers (`999`, not `999.0`).
fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // Below 2^53 every whole f64 is exactly representable as i64.
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if price.fract() == 0.0 && price.abs() < EXACT {
        serializer.serialize_i64(*price as i64)
    } else {
        serializer.serialize_f64(*price)
    }
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Store-level payload for a new product.
///
/// This is the only way a product enters the store. The catalog always builds it
/// with `quantity: 0`; the startup seed is the one caller that sets a stock level.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl ProductCreate {
    pub fn validate(&self) -> Result<(), ProductError> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        if self.quantity < 0 {
            return Err(ProductError::Invalid {
                field: "quantity",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Trims surrounding whitespace and checks the length of what remains. Names are
/// stored in this form.
pub fn normalize_name(name: &str) -> Result<String, ProductError> {
    let trimmed = name.trim();
    validate_name(trimmed)?;
    Ok(trimmed.to_string())
}

pub fn validate_name(name: &str) -> Result<(), ProductError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ProductError::Invalid {
            field: "name",
            reason: format!("must be at least {} characters", MIN_NAME_LEN),
        });
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ProductError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ProductError::Invalid {
            field: "price",
            reason: "must be a positive number".to_string(),
        });
    }
    Ok(())
}

/// Filters understood by `find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductQuery {
    All,
    /// `quantity > 0`
    InStock,
}

/// Field-level changes applied atomically by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductUpdate {
    /// Catalog edit. Never touches `quantity`.
    Details {
        name: Option<String>,
        price: Option<f64>,
    },
    /// Add `delta` to `quantity`. With a `floor`, the change is refused when the
    /// result would fall below it.
    AdjustQuantity { delta: i64, floor: Option<i64> },
}

/// Errors raised by the product record itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// A field failed validation.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },
}

impl StoreEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Query = ProductQuery;
    type Update = ProductUpdate;
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        params.validate()?;
        let name = normalize_name(&params.name)?;
        Ok(Self::new(id, name, params.price, params.quantity))
    }

    fn matches(&self, query: &ProductQuery) -> bool {
        match query {
            ProductQuery::All => true,
            ProductQuery::InStock => self.in_stock(),
        }
    }

    fn apply_update(&mut self, update: ProductUpdate) -> Result<(), Self::Error> {
        match update {
            ProductUpdate::Details { name, price } => {
                if let Some(name) = name {
                    self.name = normalize_name(&name)?;
                }
                if let Some(price) = price {
                    validate_price(price)?;
                    self.price = price;
                }
                Ok(())
            }
            ProductUpdate::AdjustQuantity { delta, floor } => {
                let next = self
                    .quantity
                    .checked_add(delta)
                    .ok_or_else(|| ProductError::Invalid {
                        field: "quantity",
                        reason: format!("adjusting {} by {} overflows", self.quantity, delta),
                    })?;
                if let Some(floor) = floor {
                    if next < floor {
                        return Err(ProductError::InsufficientStock {
                            requested: delta.saturating_neg(),
                            available: self.quantity - floor,
                        });
                    }
                }
                self.quantity = next;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone(quantity: i64) -> Product {
        Product::new(ProductId(1), "iPhone 11 Pro", 999.0, quantity)
    }

    #[test]
    fn test_product_id_parses_both_forms() {
        assert_eq!("product_12".parse::<ProductId>().unwrap(), ProductId(12));
        assert_eq!("12".parse::<ProductId>().unwrap(), ProductId(12));
        assert_eq!(ProductId(12).to_string(), "product_12");
        assert!(matches!(
            "".parse::<ProductId>(),
            Err(ProductError::Invalid { field: "id", .. })
        ));
        assert!("product_x".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_product_id_rejects_signs_and_padding() {
        for raw in ["+2", "product_+2", "-2", " 2", "2 ", "product_", "4294967296"] {
            assert!(
                matches!(raw.parse::<ProductId>(), Err(ProductError::Invalid { field: "id", .. })),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn test_names_are_stored_trimmed() {
        let product = Product::from_create_params(
            ProductId(1),
            ProductCreate {
                name: "  Pixel 4 ".into(),
                price: 799.0,
                quantity: 0,
            },
        )
        .unwrap();
        assert_eq!(product.name, "Pixel 4");

        let mut product = product;
        product
            .apply_update(ProductUpdate::Details {
                name: Some(" Pixel 5\t".into()),
                price: None,
            })
            .unwrap();
        assert_eq!(product.name, "Pixel 5");

        // Padding does not count towards the minimum length.
        assert!(normalize_name(" ab").is_err());
        assert_eq!(normalize_name("abc").unwrap(), "abc");
    }

    #[test]
    fn test_whole_prices_serialize_as_integers() {
        let json = serde_json::to_value(phone(25)).unwrap();
        assert_eq!(json["price"], serde_json::json!(999));
        assert!(json["price"].is_i64());

        let cheap = Product::new(ProductId(3), "Huawei P30 Pro", 679.5, 1);
        let json = serde_json::to_value(cheap).unwrap();
        assert!(json["price"].is_f64());
        assert_eq!(json["price"], 679.5);

        let back: Product = serde_json::from_str(r#"{"id":1,"name":"abc","price":999,"quantity":2}"#).unwrap();
        assert_eq!(back.price, 999.0);
    }

    #[test]
    fn test_create_validation() {
        let ok = ProductCreate {
            name: "Pixel".into(),
            price: 10.0,
            quantity: 0,
        };
        assert!(ok.validate().is_ok());

        let short = ProductCreate {
            name: " ab ".into(),
            ..ok.clone()
        };
        assert!(matches!(
            short.validate(),
            Err(ProductError::Invalid { field: "name", .. })
        ));

        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let bad = ProductCreate { price, ..ok.clone() };
            assert!(matches!(
                bad.validate(),
                Err(ProductError::Invalid { field: "price", .. })
            ));
        }
    }

    #[test]
    fn test_adjust_quantity_with_floor_refuses_overdraw() {
        let mut product = phone(2);
        let err = product
            .apply_update(ProductUpdate::AdjustQuantity {
                delta: -3,
                floor: Some(0),
            })
            .unwrap_err();
        assert_eq!(
            err,
            ProductError::InsufficientStock {
                requested: 3,
                available: 2
            }
        );

        product
            .apply_update(ProductUpdate::AdjustQuantity {
                delta: -2,
                floor: Some(0),
            })
            .unwrap();
        assert_eq!(product.quantity, 0);
    }

    #[test]
    fn test_adjust_quantity_without_floor_may_go_negative() {
        let mut product = phone(1);
        product
            .apply_update(ProductUpdate::AdjustQuantity {
                delta: -3,
                floor: None,
            })
            .unwrap();
        assert_eq!(product.quantity, -2);
        assert!(!product.matches(&ProductQuery::InStock));
    }

    #[test]
    fn test_adjust_quantity_overflow_is_invalid() {
        let mut product = phone(i64::MIN + 1);
        let err = product
            .apply_update(ProductUpdate::AdjustQuantity {
                delta: -2,
                floor: None,
            })
            .unwrap_err();
        assert!(matches!(err, ProductError::Invalid { field: "quantity", .. }));
    }

    #[test]
    fn test_details_update_leaves_quantity_alone() {
        let mut product = phone(7);
        product
            .apply_update(ProductUpdate::Details {
                name: Some("iPhone 12".into()),
                price: Some(1099.0),
            })
            .unwrap();
        assert_eq!(product.name, "iPhone 12");
        assert_eq!(product.price, 1099.0);
        assert_eq!(product.quantity, 7);
    }
}
