//! Cart Repository
//!
//! A cart belongs to a user or to a guest session, never both.

use super::{RepoError, RepoResult, counter};
use shared::models::Cart;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, user_id, session_id, items, subtotal, updated_at";

/// Who a cart belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartKey {
    User(i64),
    Session(String),
}

pub async fn find<'e, E: SqliteExecutor<'e>>(db: E, key: &CartKey) -> RepoResult<Option<Cart>> {
    let cart = match key {
        CartKey::User(user_id) => {
            sqlx::query_as::<_, Cart>(&format!("SELECT {COLUMNS} FROM carts WHERE user_id = ?"))
                .bind(user_id)
                .fetch_optional(db)
                .await?
        }
        CartKey::Session(session_id) => {
            sqlx::query_as::<_, Cart>(&format!(
                "SELECT {COLUMNS} FROM carts WHERE session_id = ?"
            ))
            .bind(session_id)
            .fetch_optional(db)
            .await?
        }
    };
    Ok(cart)
}

/// Existing cart or an unsaved empty one
pub async fn find_or_empty<'e, E: SqliteExecutor<'e>>(db: E, key: &CartKey) -> RepoResult<Cart> {
    Ok(find(db, key).await?.unwrap_or_else(|| match key {
        CartKey::User(user_id) => Cart::empty(Some(*user_id), None),
        CartKey::Session(session_id) => Cart::empty(None, Some(session_id.clone())),
    }))
}

/// Insert or update; subtotal is recomputed from the items first
pub async fn save(conn: &mut SqliteConnection, cart: &mut Cart) -> RepoResult<()> {
    cart.recompute();
    cart.updated_at = shared::util::now_millis();

    if cart.id == 0 {
        cart.id = counter::next_id(&mut *conn, counter::CARTS).await?;
        sqlx::query(
            "INSERT INTO carts (id, user_id, session_id, items, subtotal, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(&cart.session_id)
        .bind(Json(&cart.items))
        .bind(cart.subtotal)
        .bind(cart.updated_at)
        .execute(&mut *conn)
        .await?;
        return Ok(());
    }

    let result = sqlx::query("UPDATE carts SET items = ?, subtotal = ?, updated_at = ? WHERE id = ?")
        .bind(Json(&cart.items))
        .bind(cart.subtotal)
        .bind(cart.updated_at)
        .bind(cart.id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cart {}", cart.id)));
    }
    Ok(())
}

pub async fn delete<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM carts WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;

    #[tokio::test]
    async fn guest_cart_roundtrip() {
        let pool = test_pool().await;
        let key = CartKey::Session("guest-1".into());
        let mut cart = find_or_empty(&pool, &key).await.unwrap();
        assert_eq!(cart.id, 0);

        cart.add_item(5, "Margherita", 900, 2);
        let mut conn = pool.acquire().await.unwrap();
        save(&mut conn, &mut cart).await.unwrap();
        drop(conn);
        assert_eq!(cart.id, 1);

        let loaded = find(&pool, &key).await.unwrap().unwrap();
        assert_eq!(loaded.subtotal, 1800);
        assert_eq!(loaded.items.len(), 1);
        assert!(find(&pool, &CartKey::User(1)).await.unwrap().is_none());

        delete(&pool, loaded.id).await.unwrap();
        assert!(find(&pool, &key).await.unwrap().is_none());
    }
}
