//! Catalog fixtures. The engine never writes to the catalog, so tests have to put stores and products there
//! themselves.
use chrono::{DateTime, Utc};

use crate::{
    db_types::{Cents, OrderId, Product, ProductId, Store, StoreId},
    sqlite_db::catalog,
    SqliteDatabase,
};

pub async fn seed_store(db: &SqliteDatabase, store_id: &str, owner: &str) -> Store {
    let store = Store {
        id: StoreId::from(store_id),
        user_id: owner.to_string(),
        name: format!("Store {store_id}"),
        created_at: Utc::now(),
    };
    let mut conn = db.pool().acquire().await.expect("Could not acquire connection");
    catalog::insert_store(&store, &mut conn).await.expect("Could not insert store");
    store
}

/// Inserts or replaces a product. `price` is in cents.
pub async fn seed_product(
    db: &SqliteDatabase,
    product_id: &str,
    store_id: &str,
    name: &str,
    price: Option<i64>,
    published: bool,
) -> Product {
    let product = Product {
        id: ProductId::from(product_id),
        store_id: StoreId::from(store_id),
        name: name.to_string(),
        price: price.map(Cents::from),
        published,
        created_at: Utc::now(),
    };
    let mut conn = db.pool().acquire().await.expect("Could not acquire connection");
    catalog::upsert_product(&product, &mut conn).await.expect("Could not insert product");
    product
}

/// Rewrites an order's creation time, so that tests can place orders outside the revenue window.
pub async fn backdate_order(db: &SqliteDatabase, order_id: &OrderId, created_at: DateTime<Utc>) {
    sqlx::query("UPDATE orders SET created_at = $1 WHERE id = $2")
        .bind(created_at)
        .bind(order_id.as_str())
        .execute(db.pool())
        .await
        .expect("Could not backdate order");
}

pub async fn count_rows(db: &SqliteDatabase, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .expect("Could not count rows");
    count
}
