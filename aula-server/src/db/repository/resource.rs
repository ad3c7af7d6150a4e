//! Resource Repository

use super::{RepoError, RepoResult};
use shared::models::{Resource, ResourceCreate, ResourceState, ResourceUpdate, ResourceView};
use sqlx::{SqliteExecutor, SqlitePool};

const RESOURCE_COLUMNS: &str = "id, room_id, category, code, state, origin_room_id, created_at";

const RESOURCE_VIEW_SELECT: &str = "SELECT x.id, x.room_id, r.name AS room_name, r.module AS room_module, x.category, x.code, x.state, x.origin_room_id, x.created_at FROM resources x JOIN rooms r ON r.id = x.room_id";

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<ResourceView>> {
    let resources = sqlx::query_as::<_, ResourceView>(&format!(
        "{RESOURCE_VIEW_SELECT} ORDER BY r.name, x.category, x.code"
    ))
    .fetch_all(pool)
    .await?;
    Ok(resources)
}

pub async fn list_by_room(pool: &SqlitePool, room_id: i64) -> RepoResult<Vec<Resource>> {
    let resources = sqlx::query_as::<_, Resource>(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE room_id = ? ORDER BY category, code"
    ))
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(resources)
}

pub async fn find_view(pool: &SqlitePool, id: i64) -> RepoResult<Option<ResourceView>> {
    let resource =
        sqlx::query_as::<_, ResourceView>(&format!("{RESOURCE_VIEW_SELECT} WHERE x.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(resource)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Resource>>
where
    E: SqliteExecutor<'e>,
{
    let resource = sqlx::query_as::<_, Resource>(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(resource)
}

pub async fn create(pool: &SqlitePool, data: ResourceCreate) -> RepoResult<Resource> {
    let resource = sqlx::query_as::<_, Resource>(&format!(
        "INSERT INTO resources (room_id, category, code, state, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {RESOURCE_COLUMNS}"
    ))
    .bind(data.room_id)
    .bind(data.category.trim())
    .bind(data.code.trim())
    .bind(data.state.unwrap_or_default())
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Resource code '{}' already exists", data.code.trim()))
        }
        other => other,
    })?;
    Ok(resource)
}

pub async fn update(pool: &SqlitePool, id: i64, data: ResourceUpdate) -> RepoResult<Resource> {
    let code = data.code.as_deref().map(str::trim);
    sqlx::query_as::<_, Resource>(&format!(
        "UPDATE resources SET room_id = COALESCE(?1, room_id), category = COALESCE(?2, category), code = COALESCE(?3, code), state = COALESCE(?4, state) WHERE id = ?5 RETURNING {RESOURCE_COLUMNS}"
    ))
    .bind(data.room_id)
    .bind(data.category.as_deref().map(str::trim))
    .bind(code)
    .bind(data.state)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Resource code '{}' already exists", code.unwrap_or("")))
        }
        other => other,
    })?
    .ok_or_else(|| RepoError::NotFound(format!("Resource {id} not found")))
}

/// Change the lifecycle state of a resource.
///
/// `Loaned` moves the resource into `destination_room_id` and remembers the
/// room it came from. Returning to `Active` from a loan moves it back.
pub async fn change_state(
    pool: &SqlitePool,
    id: i64,
    state: ResourceState,
    destination_room_id: Option<i64>,
) -> RepoResult<Resource> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Resource {id} not found")))?;

    let (room_id, origin_room_id) = match (state, current.state) {
        (ResourceState::Loaned, _) => {
            let destination = destination_room_id.ok_or_else(|| {
                RepoError::Validation("A loan needs a destination room".into())
            })?;
            if destination == current.room_id {
                return Err(RepoError::Validation(
                    "Destination room must differ from the current room".into(),
                ));
            }
            let origin = current.origin_room_id.unwrap_or(current.room_id);
            (destination, Some(origin))
        }
        (_, ResourceState::Loaned) => (current.origin_room_id.unwrap_or(current.room_id), None),
        _ => (current.room_id, current.origin_room_id),
    };

    let resource = sqlx::query_as::<_, Resource>(&format!(
        "UPDATE resources SET state = ?1, room_id = ?2, origin_room_id = ?3 WHERE id = ?4 RETURNING {RESOURCE_COLUMNS}"
    ))
    .bind(state)
    .bind(room_id)
    .bind(origin_room_id)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(resource)
}

pub async fn set_state<'e, E>(executor: E, id: i64, state: ResourceState) -> RepoResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE resources SET state = ?1 WHERE id = ?2")
        .bind(state)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM resources WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}
