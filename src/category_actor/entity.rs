use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Category, CategoryCreate, CategoryId, CategoryPatch};

fn validate_name(name: &str) -> Result<(), FrameworkError> {
    if name.trim().is_empty() {
        return Err(FrameworkError::Validation("category name required".to_string()));
    }
    Ok(())
}

impl Entity for Category {
    const NAME: &'static str = "Category";

    type Id = CategoryId;
    type CreateParams = CategoryCreate;
    type Patch = CategoryPatch;
    type Filter = ();
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &CategoryId {
        &self.id
    }

    fn from_create_params(id: CategoryId, params: CategoryCreate) -> Result<Self, FrameworkError> {
        validate_name(&params.name)?;
        Ok(Self { id, name: params.name })
    }

    fn on_update(&mut self, patch: CategoryPatch) -> Result<(), FrameworkError> {
        if let Some(name) = patch.name {
            validate_name(&name)?;
            self.name = name;
        }
        Ok(())
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some(("name", self.name.clone()))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), FrameworkError> {
        Ok(())
    }
}
