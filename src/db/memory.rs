use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::RwLock;

use super::{duplicate_name, ProductStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewProduct, Product, ProductUpdate};

/// Store `price` the way a `NUMERIC(10, 2)` column does: round half away from zero to
/// two places, and refuse anything with more than eight integer digits.
fn numeric_10_2(price: Decimal) -> AppResult<Decimal> {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() >= Decimal::new(100_000_000, 0) {
        return Err(AppError::Database(sqlx::Error::Protocol(
            "numeric field overflow".to_string(),
        )));
    }
    Ok(rounded)
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, Product>,
    last_id: i32,
    writes: usize,
}

/// In-memory `ProductStore` used by the handler tests. Mirrors the table's rules:
/// unique names and ids that are never handed out twice.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductStore {
    table: Arc<RwLock<Table>>,
    failing: Arc<AtomicBool>,
    unreachable: Arc<AtomicBool>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query fails with a driver error while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Only `ping` fails while set.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of committed writes so far.
    pub async fn writes(&self) -> usize {
        self.table.read().await.writes
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        self.check()?;
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        self.check()?;
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        self.check()?;
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| p.name == name).cloned())
    }

    async fn insert(&self, product: &NewProduct) -> AppResult<Product> {
        self.check()?;
        let mut table = self.table.write().await;
        if table.rows.values().any(|p| p.name == product.name) {
            return Err(duplicate_name(&product.name));
        }

        let price = numeric_10_2(product.price)?;
        table.last_id += 1;
        let created = Product {
            id: table.last_id,
            name: product.name.clone(),
            description: product.description.clone(),
            price,
        };
        table.rows.insert(created.id, created.clone());
        table.writes += 1;
        Ok(created)
    }

    async fn update_by_name(&self, name: &str, patch: &ProductUpdate) -> AppResult<Option<Product>> {
        self.check()?;
        let mut table = self.table.write().await;
        let Some(product) = table.rows.values_mut().find(|p| p.name == name) else {
            return Ok(None);
        };
        let price = patch.price.map(numeric_10_2).transpose()?;

        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(price) = price {
            product.price = price;
        }
        let updated = product.clone();
        table.writes += 1;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i32) -> AppResult<Option<Product>> {
        self.check()?;
        let mut table = self.table.write().await;
        let removed = table.rows.remove(&id);
        if removed.is_some() {
            table.writes += 1;
        }
        Ok(removed)
    }

    async fn ping(&self) -> AppResult<()> {
        self.check()?;
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn prices_round_half_away_from_zero() {
        assert_eq!(numeric_10_2(dec("0.125")).unwrap(), dec("0.13"));
        assert_eq!(numeric_10_2(dec("0.135")).unwrap(), dec("0.14"));
        assert_eq!(numeric_10_2(dec("2.004")).unwrap(), dec("2.00"));
    }

    #[test]
    fn prices_beyond_the_column_overflow() {
        assert_eq!(numeric_10_2(dec("99999999.99")).unwrap(), dec("99999999.99"));
        assert!(matches!(numeric_10_2(dec("100000000")), Err(AppError::Database(_))));
        // rounds up past the limit
        assert!(numeric_10_2(dec("99999999.995")).is_err());
    }

    #[tokio::test]
    async fn overflowing_insert_writes_nothing() {
        let store = InMemoryProductStore::new();
        let product = NewProduct {
            name: "Yacht".into(),
            description: String::new(),
            price: dec("100000000"),
        };

        assert!(store.insert(&product).await.is_err());
        assert_eq!(store.writes().await, 0);
        assert!(store.find_by_name("Yacht").await.unwrap().is_none());
    }
}
