use sqlx::SqliteConnection;

use crate::db_types::{Product, ProductId, Store, StoreId};

pub async fn fetch_store(store_id: &StoreId, conn: &mut SqliteConnection) -> Result<Option<Store>, sqlx::Error> {
    let store = sqlx::query_as("SELECT * FROM stores WHERE id = $1").bind(store_id.as_str()).fetch_optional(conn).await?;
    Ok(store)
}

/// Returns the product if it exists and is published.
pub async fn fetch_published_product(
    product_id: &ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1 AND published = 1")
        .bind(product_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Catalog writes are owned by the catalog service. These exist so that tests and local tooling can seed a database.
pub async fn insert_store(store: &Store, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO stores (id, user_id, name, created_at) VALUES ($1, $2, $3, $4)")
        .bind(store.id.as_str())
        .bind(&store.user_id)
        .bind(&store.name)
        .bind(store.created_at)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn upsert_product(product: &Product, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO products (id, store_id, name, price, published, created_at) VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            price = excluded.price,
            published = excluded.published
        "#,
    )
    .bind(product.id.as_str())
    .bind(product.store_id.as_str())
    .bind(&product.name)
    .bind(product.price)
    .bind(product.published)
    .bind(product.created_at)
    .execute(conn)
    .await?;
    Ok(())
}
