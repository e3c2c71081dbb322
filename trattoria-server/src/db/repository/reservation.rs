//! Reservation Repository
//!
//! The overlap check and the insert are a single statement, so two bookings
//! racing for the same slot cannot both land.

use super::{RepoError, RepoResult, counter};
use shared::models::{Reservation, ReservationQuery, ReservationStatus, TimeRange};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, user_id, area_id, start_time, end_time, guests, price, status, notes,
    created_at, updated_at";

/// Statuses that hold a slot
const BLOCKING: &str = "('pending', 'paid')";

/// Fields of a reservation supplied at booking
pub struct NewReservation<'a> {
    pub user_id: i64,
    pub area_id: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub guests: i64,
    pub price: i64,
    pub notes: Option<&'a str>,
}

/// Insert a `pending` reservation unless a blocking one overlaps
/// `[start_time, end_time)` in the same area. `Ok(None)` means overlap.
pub async fn create_if_free(
    conn: &mut SqliteConnection,
    new: NewReservation<'_>,
) -> RepoResult<Option<Reservation>> {
    let id = counter::next_id(&mut *conn, counter::RESERVATIONS).await?;
    let now = shared::util::now_millis();
    let result = sqlx::query(&format!(
        "INSERT INTO reservations (id, user_id, area_id, start_time, end_time, guests, price,
            status, notes, created_at, updated_at)
         SELECT ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?
         WHERE NOT EXISTS (
            SELECT 1 FROM reservations
            WHERE area_id = ? AND status IN {BLOCKING} AND start_time < ? AND end_time > ?
         )"
    ))
    .bind(id)
    .bind(new.user_id)
    .bind(new.area_id)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.guests)
    .bind(new.price)
    .bind(new.notes)
    .bind(now)
    .bind(now)
    .bind(new.area_id)
    .bind(new.end_time)
    .bind(new.start_time)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(&mut *conn, id).await
}

/// Blocking ranges in an area that intersect `[start, end)`
pub async fn find_conflicts<'e, E: SqliteExecutor<'e>>(
    db: E,
    area_id: i64,
    start: i64,
    end: i64,
) -> RepoResult<Vec<TimeRange>> {
    let ranges = sqlx::query_as::<_, TimeRange>(&format!(
        "SELECT start_time, end_time FROM reservations
         WHERE area_id = ? AND status IN {BLOCKING} AND start_time < ? AND end_time > ?
         ORDER BY start_time"
    ))
    .bind(area_id)
    .bind(end)
    .bind(start)
    .fetch_all(db)
    .await?;
    Ok(ranges)
}

pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(reservation)
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservations WHERE user_id = ? ORDER BY start_time DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(reservations)
}

/// Admin listing filtered by area and status
pub async fn list(pool: &SqlitePool, query: &ReservationQuery) -> RepoResult<Vec<Reservation>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM reservations WHERE 1 = 1"));
    if let Some(area_id) = query.area_id {
        qb.push(" AND area_id = ").push_bind(area_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY start_time");
    let reservations = qb.build_query_as::<Reservation>().fetch_all(pool).await?;
    Ok(reservations)
}

/// Compare-and-set status change; false when the reservation moved meanwhile
pub async fn transition_status<'e, E: SqliteExecutor<'e>>(
    db: E,
    id: i64,
    from: ReservationStatus,
    to: ReservationStatus,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE reservations SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
    )
    .bind(to)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(from)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Load after a successful transition
pub async fn reload(pool: &SqlitePool, id: i64) -> RepoResult<Reservation> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::area;
    use crate::db::repository::test_pool;
    use crate::db::repository::user::{self, NewUser};
    use shared::models::UserRole;

    const HOUR: i64 = 3_600_000;

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let user = user::create(
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
        .unwrap();
        let area = area::create(pool, area::sample("Terrace")).await.unwrap();
        (user.id, area.id)
    }

    async fn book(pool: &SqlitePool, user_id: i64, area_id: i64, start: i64, end: i64) -> Option<Reservation> {
        let mut conn = pool.acquire().await.unwrap();
        create_if_free(
            &mut conn,
            NewReservation {
                user_id,
                area_id,
                start_time: start,
                end_time: end,
                guests: 4,
                price: 2000,
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn overlapping_booking_is_refused() {
        let pool = test_pool().await;
        let (user_id, area_id) = seed(&pool).await;
        let first = book(&pool, user_id, area_id, 10 * HOUR, 12 * HOUR).await;
        assert!(first.is_some());
        assert!(book(&pool, user_id, area_id, 11 * HOUR, 13 * HOUR).await.is_none());
        assert!(book(&pool, user_id, area_id, 9 * HOUR, 10 * HOUR + 1).await.is_none());
    }

    #[tokio::test]
    async fn touching_ranges_do_not_conflict() {
        let pool = test_pool().await;
        let (user_id, area_id) = seed(&pool).await;
        book(&pool, user_id, area_id, 10 * HOUR, 12 * HOUR).await.unwrap();
        assert!(book(&pool, user_id, area_id, 12 * HOUR, 13 * HOUR).await.is_some());
        assert!(book(&pool, user_id, area_id, 8 * HOUR, 10 * HOUR).await.is_some());
    }

    #[tokio::test]
    async fn cancelled_reservations_free_the_slot() {
        let pool = test_pool().await;
        let (user_id, area_id) = seed(&pool).await;
        let r = book(&pool, user_id, area_id, 10 * HOUR, 12 * HOUR).await.unwrap();
        assert!(
            transition_status(&pool, r.id, ReservationStatus::Pending, ReservationStatus::Cancelled)
                .await
                .unwrap()
        );
        assert!(find_conflicts(&pool, area_id, 10 * HOUR, 12 * HOUR)
            .await
            .unwrap()
            .is_empty());
        assert!(book(&pool, user_id, area_id, 10 * HOUR, 12 * HOUR).await.is_some());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let pool = test_pool().await;
        let (user_id, area_id) = seed(&pool).await;
        let r = book(&pool, user_id, area_id, HOUR, 2 * HOUR).await.unwrap();
        book(&pool, user_id, area_id, 3 * HOUR, 4 * HOUR).await.unwrap();
        transition_status(&pool, r.id, ReservationStatus::Pending, ReservationStatus::Paid)
            .await
            .unwrap();

        let paid = list(
            &pool,
            &ReservationQuery {
                area_id: Some(area_id),
                status: Some(ReservationStatus::Paid),
            },
        )
        .await
        .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, r.id);
        assert_eq!(find_by_user(&pool, user_id).await.unwrap().len(), 2);
    }
}
