use crate::db;
use crate::models::Principal;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Chat,
    Document,
}

/// Whether `principal` owns the resource. A resource that does not exist is not owned,
/// callers must not tell the two cases apart.
#[tracing::instrument(name = "Check resource ownership", skip(pool, principal), fields(account_id = principal.account_id))]
pub async fn authorize(
    pool: &PgPool,
    principal: &Principal,
    kind: ResourceKind,
    resource_id: i32,
) -> Result<bool, sqlx::Error> {
    match kind {
        ResourceKind::Chat => db::chat::account_owns(pool, principal.account_id, resource_id).await,
        ResourceKind::Document => {
            db::document::account_owns(pool, principal.account_id, resource_id).await
        }
    }
}
