use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{User, UserCreate, UserFilter};
use crate::user_actor::UserError;

/// Client for the user store.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

crate::impl_basic_client!(UserClient, User, UserError, user);

impl UserClient {
    #[instrument(skip(self, params), fields(user_email = %params.email, role = %params.role))]
    pub async fn create_user(&self, params: UserCreate) -> Result<User, UserError> {
        debug!("Sending request");
        let user = self.inner.create(params).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        let filter = UserFilter { email: Some(email.to_string()) };
        Ok(self.inner.find(filter).await?.into_iter().next())
    }
}
