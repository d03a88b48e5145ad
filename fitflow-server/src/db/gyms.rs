//! Gym Repository

use super::{RepoError, RepoResult, like_pattern, users};
use shared::models::{Gym, GymCreate, GymUpdate, PageQuery, Role};
use sqlx::{SqliteConnection, SqlitePool};

const GYM_SELECT: &str = "SELECT u.id, u.email, u.name, u.is_active, g.gym_code, g.address, g.city, g.state, g.zip_code, g.latitude, g.longitude, g.facilities, g.capacity, g.operating_hours, g.phone, u.created_at, u.updated_at FROM users u JOIN gyms g ON g.user_id = u.id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Gym>> {
    let sql = format!("{GYM_SELECT} WHERE u.id = ?");
    let row = sqlx::query_as::<_, Gym>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Gym>> {
    let sql = format!("{GYM_SELECT} WHERE u.id = ? AND u.is_active = 1");
    let row = sqlx::query_as::<_, Gym>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// `code` must already be uppercased
pub async fn find_active_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Gym>> {
    let sql = format!("{GYM_SELECT} WHERE g.gym_code = ? AND u.is_active = 1");
    let row = sqlx::query_as::<_, Gym>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn code_exists(pool: &SqlitePool, code: &str) -> RepoResult<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM gyms WHERE gym_code = ?")
        .bind(code)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

fn to_json<T: serde::Serialize>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|e| RepoError::Validation(e.to_string()))
}

/// Create the user + gym rows; returns the new id
pub async fn create(
    pool: &SqlitePool,
    data: &GymCreate,
    gym_code: &str,
    password_hash: &str,
    now: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let email = data.email.trim().to_lowercase();
    let facilities = to_json(&data.facilities)?;
    let hours = to_json(&data.operating_hours.clone().unwrap_or_default())?;
    let coords = data.location.coordinates;

    let mut tx = pool.begin().await?;
    users::insert(&mut tx, id, &email, password_hash, Role::Gym, data.name.trim(), now).await?;
    sqlx::query(
        "INSERT INTO gyms (user_id, gym_code, address, city, state, zip_code, latitude, longitude, facilities, capacity, operating_hours, phone) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(id)
    .bind(gym_code)
    .bind(&data.location.address)
    .bind(&data.location.city)
    .bind(&data.location.state)
    .bind(&data.location.zip_code)
    .bind(coords.map(|c| c.lat))
    .bind(coords.map(|c| c.lng))
    .bind(&facilities)
    .bind(data.capacity)
    .bind(&hours)
    .bind(&data.phone)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Newest first, optional case-insensitive name/email/code search
pub async fn list(pool: &SqlitePool, query: &PageQuery) -> RepoResult<(Vec<Gym>, i64)> {
    let pattern = query.search().map(like_pattern);
    let filter = "(?1 IS NULL OR LOWER(u.name) LIKE ?1 ESCAPE '\\' OR u.email LIKE ?1 ESCAPE '\\' OR LOWER(g.gym_code) LIKE ?1 ESCAPE '\\')";

    let sql = format!("{GYM_SELECT} WHERE {filter} ORDER BY u.created_at DESC, u.id DESC LIMIT ?2 OFFSET ?3");
    let rows = sqlx::query_as::<_, Gym>(&sql)
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM users u JOIN gyms g ON g.user_id = u.id WHERE {filter}");
    let (total,): (i64,) = sqlx::query_as(&count_sql)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok((rows, total))
}

async fn find_in_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Gym>> {
    let sql = format!("{GYM_SELECT} WHERE u.id = ?");
    let row = sqlx::query_as::<_, Gym>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn update(pool: &SqlitePool, id: i64, data: &GymUpdate, now: i64) -> RepoResult<Gym> {
    let facilities = data.facilities.as_ref().map(to_json).transpose()?;
    let hours = data.operating_hours.as_ref().map(to_json).transpose()?;
    let location = data.location.as_ref();
    // Replacing the location replaces the coordinates too
    let coords = location.map(|l| l.coordinates);

    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE gyms SET
            address = COALESCE(?1, address),
            city = COALESCE(?2, city),
            state = COALESCE(?3, state),
            zip_code = COALESCE(?4, zip_code),
            latitude = CASE WHEN ?5 THEN ?6 ELSE latitude END,
            longitude = CASE WHEN ?5 THEN ?7 ELSE longitude END,
            facilities = COALESCE(?8, facilities),
            capacity = COALESCE(?9, capacity),
            operating_hours = COALESCE(?10, operating_hours),
            phone = COALESCE(?11, phone)
         WHERE user_id = ?12",
    )
    .bind(location.map(|l| l.address.as_str()))
    .bind(location.map(|l| l.city.as_str()))
    .bind(location.map(|l| l.state.as_str()))
    .bind(location.map(|l| l.zip_code.as_str()))
    .bind(coords.is_some())
    .bind(coords.flatten().map(|c| c.lat))
    .bind(coords.flatten().map(|c| c.lng))
    .bind(facilities)
    .bind(data.capacity)
    .bind(hours)
    .bind(&data.phone)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Gym {id} not found")));
    }
    users::update_base(&mut tx, id, data.name.as_deref().map(str::trim), data.is_active, now).await?;
    let gym = find_in_tx(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Gym {id} not found")))?;
    tx.commit().await?;
    Ok(gym)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_gym, test_pool};
    use shared::models::{Coordinates, Location};

    #[tokio::test]
    async fn code_lookup_only_matches_active_gyms() {
        let pool = test_pool().await;
        let id = seed_gym(&pool, "FZ001", "FitZone Downtown").await;

        let gym = find_active_by_code(&pool, "FZ001").await.unwrap().unwrap();
        assert_eq!(gym.id, id);
        assert_eq!(gym.facility_list(), vec!["Cardio".to_string()]);
        assert!(code_exists(&pool, "FZ001").await.unwrap());

        users::deactivate(&pool, id, 2_000).await.unwrap();
        assert!(find_active_by_code(&pool, "FZ001").await.unwrap().is_none());
        assert!(find_active_by_id(&pool, id).await.unwrap().is_none());
        assert!(find_by_id(&pool, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let pool = test_pool().await;
        seed_gym(&pool, "FZ001", "FitZone Downtown").await;
        let data = GymCreate {
            name: "Other".into(),
            email: "other@gyms.fitflow.app".into(),
            gym_code: Some("FZ001".into()),
            location: Location {
                address: "2 Side St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip_code: "62702".into(),
                coordinates: None,
            },
            facilities: vec![],
            capacity: 10,
            operating_hours: None,
            phone: None,
        };
        let err = create(&pool, &data, "FZ001", "hash", 1_000).await.unwrap_err();
        assert!(err.is_duplicate_of("gyms.gym_code"));
    }

    #[tokio::test]
    async fn update_replaces_location_and_keeps_other_fields() {
        let pool = test_pool().await;
        let id = seed_gym(&pool, "FZ002", "FitZone Uptown").await;
        let update_data = GymUpdate {
            location: Some(Location {
                address: "9 Hill Rd".into(),
                city: "Shelbyville".into(),
                state: "IL".into(),
                zip_code: "62565".into(),
                coordinates: Some(Coordinates { lat: 39.4, lng: -88.8 }),
            }),
            capacity: Some(120),
            ..Default::default()
        };
        let gym = update(&pool, id, &update_data, 3_000).await.unwrap();
        assert_eq!(gym.city, "Shelbyville");
        assert_eq!(gym.latitude, Some(39.4));
        assert_eq!(gym.capacity, 120);
        assert_eq!(gym.name, "FitZone Uptown");
        assert_eq!(gym.gym_code, "FZ002");
        assert_eq!(gym.updated_at, 3_000);

        let missing = update(&pool, 1, &GymUpdate::default(), 3_000).await;
        assert!(matches!(missing, Err(RepoError::NotFound(_))));
    }
}
