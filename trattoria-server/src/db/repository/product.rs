//! Product Repository
//!
//! Stock only moves through conditional updates, so concurrent carts can
//! never drive it below zero.

use super::{RepoError, RepoResult, counter};
use shared::models::{MAX_QUANTITY, MenuQuery, Product, ProductCreate, ProductUpdate};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, description, price, stock, ingredients, category, image_url,
    is_active, created_at, updated_at";

/// Menu listing with optional category, search and inactive filters
pub async fn find_all(pool: &SqlitePool, query: &MenuQuery) -> RepoResult<Vec<Product>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM products WHERE 1 = 1"));
    if !query.include_inactive {
        qb.push(" AND is_active = 1");
    }
    if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
        qb.push(" AND category = ").push_bind(category.trim().to_string());
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim().to_lowercase());
        qb.push(" AND (LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(COALESCE(description, '')) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(" ORDER BY category, name");

    let products = qb.build_query_as::<Product>().fetch_all(pool).await?;
    Ok(products)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Product>> {
    let product =
        sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM products WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let id = counter::next_id(pool, counter::PRODUCTS).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO products (id, name, description, price, stock, ingredients, category,
            image_url, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock)
    .bind(Json(&data.ingredients))
    .bind(data.category.trim())
    .bind(&data.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id}")))?;

    let name = data.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
    let description = data.description.or(existing.description);
    let price = data.price.unwrap_or(existing.price);
    let stock = data.stock.unwrap_or(existing.stock);
    let ingredients = data.ingredients.unwrap_or(existing.ingredients);
    let category = data
        .category
        .map(|c| c.trim().to_string())
        .unwrap_or(existing.category);
    let image_url = data.image_url.or(existing.image_url);
    let is_active = data.is_active.unwrap_or(existing.is_active);

    sqlx::query(
        "UPDATE products SET name = ?, description = ?, price = ?, stock = ?, ingredients = ?,
            category = ?, image_url = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&name)
    .bind(&description)
    .bind(price)
    .bind(stock)
    .bind(Json(&ingredients))
    .bind(&category)
    .bind(&image_url)
    .bind(is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id}")))
}

/// Apply a signed stock delta; `None` when the product is missing or the
/// result would leave `0..=MAX_QUANTITY`
pub async fn adjust_stock<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    delta: i64,
) -> RepoResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET stock = stock + ?, updated_at = ?
         WHERE id = ? AND stock + ? BETWEEN 0 AND ?
         RETURNING stock",
    )
    .bind(delta)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(delta)
    .bind(MAX_QUANTITY)
    .fetch_optional(db)
    .await?;
    Ok(stock)
}

/// Take `quantity` units from an active product; false when stock is short
pub async fn reserve_stock<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    quantity: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?, updated_at = ?
         WHERE id = ? AND is_active = 1 AND stock >= ?",
    )
    .bind(quantity)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(quantity)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Give `quantity` units back (also for products deactivated meanwhile)
pub async fn release_stock<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    quantity: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE products SET stock = stock + ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Soft delete
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE products SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) fn sample(name: &str, price: i64, stock: i64) -> ProductCreate {
    ProductCreate {
        name: name.to_string(),
        description: None,
        price,
        stock,
        ingredients: vec![],
        category: "Pizza".to_string(),
        image_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_pool;

    #[tokio::test]
    async fn reserve_never_goes_negative() {
        let pool = test_pool().await;
        let p = create(&pool, sample("Margherita", 900, 3)).await.unwrap();

        assert!(reserve_stock(&pool, p.id, 2).await.unwrap());
        assert!(!reserve_stock(&pool, p.id, 2).await.unwrap());
        assert!(reserve_stock(&pool, p.id, 1).await.unwrap());
        assert_eq!(find_by_id(&pool, p.id).await.unwrap().unwrap().stock, 0);

        release_stock(&pool, p.id, 3).await.unwrap();
        assert_eq!(find_by_id(&pool, p.id).await.unwrap().unwrap().stock, 3);
    }

    #[tokio::test]
    async fn inactive_products_cannot_be_reserved() {
        let pool = test_pool().await;
        let p = create(&pool, sample("Calzone", 1000, 5)).await.unwrap();
        assert!(delete(&pool, p.id).await.unwrap());
        assert!(!reserve_stock(&pool, p.id, 1).await.unwrap());
    }

    #[tokio::test]
    async fn adjust_stock_is_bounded() {
        let pool = test_pool().await;
        let p = create(&pool, sample("Marinara", 800, 2)).await.unwrap();
        assert_eq!(adjust_stock(&pool, p.id, 5).await.unwrap(), Some(7));
        assert_eq!(adjust_stock(&pool, p.id, -8).await.unwrap(), None);
        assert_eq!(adjust_stock(&pool, p.id, -7).await.unwrap(), Some(0));
        assert_eq!(adjust_stock(&pool, 999, 1).await.unwrap(), None);
        assert_eq!(adjust_stock(&pool, p.id, MAX_QUANTITY + 1).await.unwrap(), None);
        assert_eq!(adjust_stock(&pool, p.id, i64::MAX).await.unwrap(), None);
        assert_eq!(adjust_stock(&pool, p.id, MAX_QUANTITY).await.unwrap(), Some(MAX_QUANTITY));
    }

    #[tokio::test]
    async fn menu_filters() {
        let pool = test_pool().await;
        create(&pool, sample("Margherita", 900, 1)).await.unwrap();
        let mut dessert = sample("Tiramisu", 550, 1);
        dessert.category = "Dolci".into();
        dessert.description = Some("Mascarpone and coffee".into());
        create(&pool, dessert).await.unwrap();
        let hidden = create(&pool, sample("Old Special", 100, 1)).await.unwrap();
        delete(&pool, hidden.id).await.unwrap();

        let all = find_all(&pool, &MenuQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let dolci = find_all(
            &pool,
            &MenuQuery {
                category: Some("Dolci".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(dolci.len(), 1);

        let coffee = find_all(
            &pool,
            &MenuQuery {
                search: Some("COFFEE".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(coffee[0].name, "Tiramisu");

        let with_inactive = find_all(
            &pool,
            &MenuQuery {
                include_inactive: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(with_inactive.len(), 3);
    }
}
