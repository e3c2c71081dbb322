//! Order Repository

use super::{RepoError, RepoResult, counter};
use shared::PageRequest;
use shared::models::{
    CartItem, DeliveryType, Order, OrderStatus, PaymentMethod, PaymentStatus,
};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, user_id, items, subtotal, discount, total, coupon_code, status,
    payment_method, payment_status, delivery_type, delivery_address, notes, created_at, updated_at";

/// Fields of an order supplied at checkout
pub struct NewOrder<'a> {
    pub user_id: i64,
    pub items: &'a [CartItem],
    pub subtotal: i64,
    pub discount: i64,
    pub coupon_code: Option<&'a str>,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<&'a str>,
    pub notes: Option<&'a str>,
}

/// Insert a `pending` order (run inside the checkout transaction)
pub async fn create(conn: &mut SqliteConnection, new: NewOrder<'_>) -> RepoResult<Order> {
    let id = counter::next_id(&mut *conn, counter::ORDERS).await?;
    let now = shared::util::now_millis();
    let total = (new.subtotal - new.discount).max(0);
    sqlx::query(
        "INSERT INTO orders (id, user_id, items, subtotal, discount, total, coupon_code, status,
            payment_method, payment_status, delivery_type, delivery_address, notes,
            created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, 'pending', ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(new.user_id)
    .bind(Json(new.items))
    .bind(new.subtotal)
    .bind(new.discount)
    .bind(total)
    .bind(new.coupon_code)
    .bind(new.payment_method)
    .bind(new.delivery_type)
    .bind(new.delivery_address)
    .bind(new.notes)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(order)
}

/// A user's orders, newest first
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE user_id = ? ORDER BY id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Admin listing, optionally filtered by status, with total count
pub async fn list(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    page: &PageRequest,
) -> RepoResult<(Vec<Order>, u64)> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM orders"));
    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    if let Some(status) = status {
        qb.push(" WHERE status = ").push_bind(status);
        count_qb.push(" WHERE status = ").push_bind(status);
    }
    qb.push(" ORDER BY id DESC LIMIT ")
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let orders = qb.build_query_as::<Order>().fetch_all(pool).await?;
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;
    Ok((orders, total as u64))
}

/// Compare-and-set status change; false when the order is no longer in `from`
pub async fn transition_status<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> RepoResult<bool> {
    let result =
        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(shared::util::now_millis())
            .bind(id)
            .bind(from)
            .execute(db)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_payment_status<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    payment_status: PaymentStatus,
) -> RepoResult<bool> {
    let result = sqlx::query("UPDATE orders SET payment_status = ?, updated_at = ? WHERE id = ?")
        .bind(payment_status)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;
    use crate::db::repository::user::{self, NewUser};
    use shared::models::UserRole;

    async fn seed_user(pool: &SqlitePool) -> i64 {
        user::create(
            pool,
            NewUser {
                name: "Ana",
                email: "ana@example.com",
                password_hash: None,
                role: UserRole::Client,
                phone: None,
                allergies: &[],
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn place(pool: &SqlitePool, user_id: i64) -> Order {
        let items = vec![CartItem::new(1, "Margherita", 900, 2)];
        let mut conn = pool.acquire().await.unwrap();
        create(
            &mut conn,
            NewOrder {
                user_id,
                items: &items,
                subtotal: 1800,
                discount: 300,
                coupon_code: Some("SAVE3"),
                payment_method: PaymentMethod::Cash,
                delivery_type: DeliveryType::Takeaway,
                delivery_address: None,
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_computes_total() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let order = place(&pool, user_id).await;
        assert_eq!(order.total, 1500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items[0].subtotal, 1800);
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let order = place(&pool, user_id).await;

        assert!(
            transition_status(&pool, order.id, OrderStatus::Pending, OrderStatus::Confirmed)
                .await
                .unwrap()
        );
        assert!(
            !transition_status(&pool, order.id, OrderStatus::Pending, OrderStatus::Cancelled)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn list_filters_and_counts() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool).await;
        let first = place(&pool, user_id).await;
        place(&pool, user_id).await;
        place(&pool, user_id).await;
        transition_status(&pool, first.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap();

        let page = PageRequest::from_query(Some(1), Some(2));
        let (orders, total) = list(&pool, None, &page).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, 3);

        let (cancelled, total) = list(&pool, Some(OrderStatus::Cancelled), &page)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(cancelled[0].id, first.id);

        assert_eq!(find_by_user(&pool, user_id).await.unwrap().len(), 3);
    }
}
