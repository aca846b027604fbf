use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::category_actor::CategoryError;
use crate::domain::{Category, CategoryCreate, CategoryId, CategoryPatch};

/// Client for the category store.
#[derive(Clone)]
pub struct CategoryClient {
    inner: ResourceClient<Category>,
}

crate::impl_basic_client!(CategoryClient, Category, CategoryError, category);

impl CategoryClient {
    /// # Errors
    /// `AlreadyExists` when another category has the same name; no row is created.
    #[instrument(skip(self), fields(category_name = %params.name))]
    pub async fn create_category(&self, params: CategoryCreate) -> Result<Category, CategoryError> {
        debug!("Sending request");
        let category = self.inner.create(params).await?;
        info!(category_id = category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn update_category(&self, id: CategoryId, patch: CategoryPatch) -> Result<Category, CategoryError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CategoryError> {
        debug!("Sending request");
        Ok(self.inner.find(()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{sequence, ResourceActor};

    fn start() -> CategoryClient {
        let (actor, client) = ResourceActor::<Category>::new(8, sequence());
        tokio::spawn(actor.run());
        CategoryClient::new(client)
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts_without_new_row() {
        let categories = start();
        categories.create_category(CategoryCreate::new("Peripherals")).await.unwrap();

        let dup = categories.create_category(CategoryCreate::new("Peripherals")).await;
        assert_eq!(dup, Err(CategoryError::AlreadyExists("Peripherals".to_string())));
        assert_eq!(categories.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_update_delete() {
        let categories = start();
        let audio = categories.create_category(CategoryCreate::new("Audio")).await.unwrap();
        let video = categories.create_category(CategoryCreate::new("Video")).await.unwrap();

        let renamed = categories
            .update_category(audio.id, CategoryPatch { name: Some("Sound".into()) })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Sound");

        let clash = categories
            .update_category(video.id, CategoryPatch { name: Some("Sound".into()) })
            .await;
        assert!(matches!(clash, Err(CategoryError::AlreadyExists(_))));

        categories.delete_category(audio.id).await.unwrap();
        assert_eq!(
            categories.get_category(audio.id).await,
            Err(CategoryError::NotFound(audio.id.to_string()))
        );
        assert_eq!(categories.get_category(video.id).await.unwrap().name, "Video");
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let categories = start();
        let blank = categories.create_category(CategoryCreate::new("  ")).await;
        assert!(matches!(blank, Err(CategoryError::ValidationError(_))));
    }
}
