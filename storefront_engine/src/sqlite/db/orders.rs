use std::collections::HashMap;

use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{LineItem, NewOrder, Order, OrderId, OrderItem},
    order_objects::OrderQueryFilter,
    traits::OrderStoreError,
};

/// SQLite refuses statements with too many bound parameters, so item lookups are done in batches of this size.
const ITEM_FETCH_BATCH: usize = 250;

/// Inserts a new order and all of its items using the given connection. This is not atomic. Embed this call inside a
/// transaction and pass `&mut *tx` as the connection argument to get all-or-nothing behaviour.
///
/// The order `INSERT` must stay the first statement of that transaction. A read first would leave SQLite unable to
/// upgrade to a write lock when another checkout commits in between, and it fails with `SQLITE_BUSY` instead of
/// waiting on the busy timeout.
pub async fn insert_order_with_items(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderStoreError> {
    if order.items.is_empty() {
        return Err(OrderStoreError::EmptyOrder(order.id));
    }
    let NewOrder { id, store_id, user_id, items, created_at } = order;
    let mut stored: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (id, store_id, user_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'Pending', $4, $4)
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(store_id.as_str())
    .bind(user_id)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            OrderStoreError::OrderAlreadyExists(id.clone())
        },
        e => OrderStoreError::from(e),
    })?;
    debug!("📝️ Order [{id}] inserted for store {store_id}");
    for item in items {
        let item = insert_order_item(&id, item, &mut *conn).await?;
        trace!("📝️ Order [{id}] item #{} ({} x {}) inserted", item.id, item.quantity, item.product_name);
        stored.items.push(item);
    }
    Ok(stored)
}

async fn insert_order_item(
    order_id: &OrderId,
    item: LineItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(item.product_id.as_str())
    .bind(item.name)
    .bind(item.unit_price)
    .bind(item.quantity)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

/// Returns the order with the given id, with its items.
pub async fn fetch_order_by_id(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id.as_str()).fetch_optional(&mut *conn).await?;
    match order {
        Some(order) => {
            let mut orders = vec![order];
            attach_items(&mut orders, conn).await?;
            Ok(orders.pop())
        },
        None => Ok(None),
    }
}

/// The only status write in the system. The `status = 'Pending'` guard makes the transition a compare-and-set:
/// concurrent callers are serialised by SQLite and only the first one sees an affected row.
pub async fn mark_paid_if_pending(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET status = 'Paid', updated_at = $1 WHERE id = $2 AND status = 'Pending'")
        .bind(Utc::now())
        .bind(order_id.as_str())
        .execute(conn)
        .await?;
    let transitioned = result.rows_affected() == 1;
    trace!("📝️ Conditional status update for order [{order_id}] affected {} rows", result.rows_affected());
    Ok(transitioned)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`, with their items.
///
/// Resulting orders are ordered by `created_at` in descending order (newest first).
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(store_id) = query.store_id {
        where_clause.push("store_id = ");
        where_clause.push_bind_unseparated(store_id.0);
    }
    if let Some(statuses) = query.status.as_ref().filter(|s| !s.is_empty()) {
        // Statuses come from the enum's Display impl, so they are safe to inline.
        let status_clause = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    // Timestamps may be stored in more than one text format, so compare them as julian days
    if let Some(since) = query.since {
        where_clause.push("julianday(created_at) >= julianday(");
        where_clause.push_bind_unseparated(since);
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY julianday(created_at) DESC, id ASC");
    if let Some(page) = query.pagination {
        builder.push(" LIMIT ");
        builder.push_bind(page.limit());
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());
    }

    trace!("📝️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    trace!("📝️ Result of search_orders: {} orders", orders.len());
    attach_items(&mut orders, conn).await?;
    Ok(orders)
}

/// Loads the items for every order in `orders` and stores them in place.
async fn attach_items(orders: &mut [Order], conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    if orders.is_empty() {
        return Ok(());
    }
    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::with_capacity(orders.len());
    for batch in orders.chunks(ITEM_FETCH_BATCH) {
        let mut builder = QueryBuilder::new("SELECT * FROM order_items WHERE order_id IN (");
        let mut ids = builder.separated(", ");
        for order in batch {
            ids.push_bind(order.id.as_str().to_string());
        }
        builder.push(") ORDER BY id ASC");
        let items = builder.build_query_as::<OrderItem>().fetch_all(&mut *conn).await?;
        for item in items {
            items_by_order.entry(item.order_id.clone()).or_default().push(item);
        }
    }
    for order in orders.iter_mut() {
        order.items = items_by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}
