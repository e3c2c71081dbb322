//! Coupon Repository

use super::{RepoError, RepoResult, counter};
use shared::models::{Coupon, CouponCreate, CouponUpdate, CouponUsage, check_coupon_rules};
use shared::util::normalize_coupon_code;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, code, description, discount_type, discount_value, min_order_amount,
    max_discount, valid_from, valid_until, usage_limit, per_user_limit, used_count, is_active,
    created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Coupon>> {
    let coupons =
        sqlx::query_as::<_, Coupon>(&format!("SELECT {COLUMNS} FROM coupons ORDER BY id DESC"))
            .fetch_all(pool)
            .await?;
    Ok(coupons)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(db: E, id: i64) -> RepoResult<Option<Coupon>> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!("SELECT {COLUMNS} FROM coupons WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(coupon)
}

/// Lookup by code, case-insensitive
pub async fn find_by_code<'e, E: SqliteExecutor<'e>>(
    db: E,
    code: &str,
) -> RepoResult<Option<Coupon>> {
    let coupon =
        sqlx::query_as::<_, Coupon>(&format!("SELECT {COLUMNS} FROM coupons WHERE code = ?"))
            .bind(normalize_coupon_code(code))
            .fetch_optional(db)
            .await?;
    Ok(coupon)
}

pub async fn create(pool: &SqlitePool, data: CouponCreate) -> RepoResult<Coupon> {
    let code = normalize_coupon_code(&data.code);
    let id = counter::next_id(pool, counter::COUPONS).await?;
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO coupons (id, code, description, discount_type, discount_value,
            min_order_amount, max_discount, valid_from, valid_until, usage_limit, per_user_limit,
            used_count, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 1, ?, ?)",
    )
    .bind(id)
    .bind(&code)
    .bind(&data.description)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.min_order_amount)
    .bind(data.max_discount)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(data.usage_limit)
    .bind(data.per_user_limit)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| duplicate_code(e, &code))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create coupon".to_string()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CouponUpdate) -> RepoResult<Coupon> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coupon {id}")))?;

    let code = data
        .code
        .as_deref()
        .map(normalize_coupon_code)
        .unwrap_or(existing.code);
    let discount_type = data.discount_type.unwrap_or(existing.discount_type);
    let discount_value = data.discount_value.unwrap_or(existing.discount_value);
    let valid_from = data.valid_from.unwrap_or(existing.valid_from);
    let valid_until = data.valid_until.unwrap_or(existing.valid_until);
    check_coupon_rules(discount_type, discount_value, valid_from, valid_until).map_err(|e| {
        RepoError::Validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string()),
        )
    })?;

    sqlx::query(
        "UPDATE coupons SET code = ?, description = ?, discount_type = ?, discount_value = ?,
            min_order_amount = ?, max_discount = ?, valid_from = ?, valid_until = ?,
            usage_limit = ?, per_user_limit = ?, is_active = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&code)
    .bind(data.description.or(existing.description))
    .bind(discount_type)
    .bind(discount_value)
    .bind(data.min_order_amount.unwrap_or(existing.min_order_amount))
    .bind(data.max_discount.or(existing.max_discount))
    .bind(valid_from)
    .bind(valid_until)
    .bind(data.usage_limit.or(existing.usage_limit))
    .bind(data.per_user_limit.unwrap_or(existing.per_user_limit))
    .bind(data.is_active.unwrap_or(existing.is_active))
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| duplicate_code(e, &code))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Coupon {id}")))
}

/// Soft delete (usages keep pointing at the row)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE coupons SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_user_usages<'e, E: SqliteExecutor<'e>>(
    db: E,
    coupon_id: i64,
    user_id: i64,
) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM coupon_usages WHERE coupon_id = ? AND user_id = ?")
            .bind(coupon_id)
            .bind(user_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

/// Bump `used_count` within the global limit and record the usage.
/// False when the limit was reached in the meantime.
pub async fn record_usage(
    conn: &mut SqliteConnection,
    coupon_id: i64,
    user_id: i64,
    order_id: i64,
    discount: i64,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let bumped = sqlx::query(
        "UPDATE coupons SET used_count = used_count + 1, updated_at = ?
         WHERE id = ? AND (usage_limit IS NULL OR used_count < usage_limit)",
    )
    .bind(now)
    .bind(coupon_id)
    .execute(&mut *conn)
    .await?;
    if bumped.rows_affected() == 0 {
        return Ok(false);
    }

    let id = counter::next_id(&mut *conn, counter::COUPON_USAGES).await?;
    sqlx::query(
        "INSERT INTO coupon_usages (id, coupon_id, user_id, order_id, discount, used_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(coupon_id)
    .bind(user_id)
    .bind(order_id)
    .bind(discount)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(true)
}

pub async fn find_usages(pool: &SqlitePool, coupon_id: i64) -> RepoResult<Vec<CouponUsage>> {
    let usages = sqlx::query_as::<_, CouponUsage>(
        "SELECT id, coupon_id, user_id, order_id, discount, used_at
         FROM coupon_usages WHERE coupon_id = ? ORDER BY used_at DESC, id DESC",
    )
    .bind(coupon_id)
    .fetch_all(pool)
    .await?;
    Ok(usages)
}

fn duplicate_code(err: sqlx::Error, code: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Coupon '{code}' already exists")),
        other => other,
    }
}

#[cfg(test)]
pub(crate) fn sample(code: &str) -> CouponCreate {
    use shared::models::DiscountType;
    CouponCreate {
        code: code.to_string(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: 10,
        min_order_amount: 0,
        max_discount: None,
        valid_from: 0,
        valid_until: i64::MAX / 2,
        usage_limit: None,
        per_user_limit: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::order::{self, NewOrder};
    use crate::db::repository::test_pool;
    use crate::db::repository::user::{self, NewUser};
    use shared::models::{CartItem, DeliveryType, PaymentMethod, UserRole};

    #[tokio::test]
    async fn codes_are_upper_cased_and_unique() {
        let pool = test_pool().await;
        let coupon = create(&pool, sample("summer10")).await.unwrap();
        assert_eq!(coupon.code, "SUMMER10");
        assert_eq!(
            find_by_code(&pool, " Summer10 ").await.unwrap().map(|c| c.id),
            Some(coupon.id)
        );
        assert!(matches!(
            create(&pool, sample("SUMMER10")).await,
            Err(RepoError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn update_validates_merged_window() {
        let pool = test_pool().await;
        let coupon = create(&pool, sample("WINDOW")).await.unwrap();
        let err = update(
            &pool,
            coupon.id,
            CouponUpdate {
                code: None,
                description: None,
                discount_type: None,
                discount_value: None,
                min_order_amount: None,
                max_discount: None,
                valid_from: None,
                valid_until: Some(-1),
                usage_limit: None,
                per_user_limit: None,
                is_active: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn usage_respects_global_limit() {
        let pool = test_pool().await;
        let user = user::create(
            &pool,
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
        .unwrap();
        let mut data = sample("ONCE");
        data.usage_limit = Some(1);
        let coupon = create(&pool, data).await.unwrap();

        let items = vec![CartItem::new(1, "Margherita", 900, 1)];
        let mut conn = pool.acquire().await.unwrap();
        let order = order::create(
            &mut conn,
            NewOrder {
                user_id: user.id,
                items: &items,
                subtotal: 900,
                discount: 90,
                coupon_code: Some("ONCE"),
                payment_method: PaymentMethod::Card,
                delivery_type: DeliveryType::DineIn,
                delivery_address: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert!(record_usage(&mut conn, coupon.id, user.id, order.id, 90).await.unwrap());
        assert!(!record_usage(&mut conn, coupon.id, user.id, order.id, 90).await.unwrap());
        assert_eq!(count_user_usages(&mut *conn, coupon.id, user.id).await.unwrap(), 1);
        drop(conn);

        let coupon = find_by_id(&pool, coupon.id).await.unwrap().unwrap();
        assert_eq!(coupon.used_count, 1);
        assert_eq!(find_usages(&pool, coupon.id).await.unwrap().len(), 1);
    }
}
