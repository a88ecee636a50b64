use tracing::debug;
use uuid::Uuid;

use crate::contract::model::Actor;
use crate::domain::error::DomainError;
use crate::domain::repo::Directory;

/// Turn the acting user id into an [`Actor`]. Unknown users are unauthorized.
pub async fn resolve_actor(directory: &dyn Directory, user_id: Uuid) -> Result<Actor, DomainError> {
    match directory.find_user(user_id).await? {
        Some(user) => Ok(Actor::from(&user)),
        None => {
            debug!(%user_id, "acting user is not registered");
            Err(DomainError::unauthorized(user_id))
        }
    }
}
