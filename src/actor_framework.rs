use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Filters, and Actions)
// =============================================================================

/// Errors raised by the generic store itself, before any domain mapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{field} already exists: {value}")]
    Conflict { field: &'static str, value: String },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human readable entity name, used in logs and error messages.
    const NAME: &'static str;

    type Id: Ord + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Filter: Send + Sync + Debug;

    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, FrameworkError>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), FrameworkError> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), FrameworkError>;
    fn on_delete(&self) -> Result<(), FrameworkError> {
        Ok(())
    }

    /// Whether this row belongs in the result of a `Find` request.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// A `(field, value)` pair that must be unique across the store.
    fn unique_key(&self) -> Option<(&'static str, String)> {
        None
    }

    /// Handle a domain-specific conditional update. Runs with exclusive access to the row.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, FrameworkError>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Find {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns every row of one entity type. Requests are handled one at a time, so each
/// request (including an `Action`) is atomic with respect to all others.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: BTreeMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = T::NAME))]
    pub async fn run(mut self) {
        info!("Store starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::Find { filter, respond_to } => {
                    let rows: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&filter))
                        .cloned()
                        .collect();
                    debug!(?filter, rows = rows.len(), "Find executed");
                    let _ = respond_to.send(Ok(rows));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.handle_action(action),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
            }
        }
        info!("Store stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params)?;
        item.on_create()?;
        self.ensure_unique(&item)?;
        self.store.insert(id.clone(), item.clone());
        debug!(id = %id, "Row created");
        Ok(item)
    }

    /// The patch is applied to a copy so a rejected update leaves the stored row untouched.
    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let mut candidate = self
            .store
            .get(&id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        candidate.on_update(patch)?;
        self.ensure_unique(&candidate)?;
        self.store.insert(id, candidate.clone());
        Ok(candidate)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete()?;
        self.store.remove(&id);
        debug!(id = %id, "Row deleted");
        Ok(())
    }

    fn ensure_unique(&self, candidate: &T) -> Result<(), FrameworkError> {
        let Some((field, value)) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = self.store.values().any(|other| {
            other.id() != candidate.id()
                && other.unique_key().is_some_and(|(_, existing)| existing == value)
        });
        if taken {
            warn!(field, value = %value, "Unique constraint violated");
            return Err(FrameworkError::Conflict { field, value });
        }
        Ok(())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn find(&self, filter: T::Filter) -> Result<Vec<T>, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Find { filter, respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.call(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

/// Sequential id generator starting at 1, shared by every store.
pub fn sequence() -> impl Fn() -> u64 + Send + Sync + 'static {
    let counter = std::sync::atomic::AtomicU64::new(1);
    move || counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Tag {
        id: u64,
        label: String,
        uses: u32,
    }

    #[derive(Debug)]
    struct TagCreate {
        label: String,
    }

    #[derive(Debug)]
    struct TagPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    struct TagFilter {
        prefix: String,
    }

    #[derive(Debug)]
    enum TagAction {
        Use,
        Retire,
    }

    impl Entity for Tag {
        const NAME: &'static str = "Tag";

        type Id = u64;
        type CreateParams = TagCreate;
        type Patch = TagPatch;
        type Filter = TagFilter;
        type Action = TagAction;
        type ActionResult = u32;

        fn id(&self) -> &u64 {
            &self.id
        }

        fn from_create_params(id: u64, params: TagCreate) -> Result<Self, FrameworkError> {
            if params.label.is_empty() {
                return Err(FrameworkError::Validation("label required".to_string()));
            }
            Ok(Self { id, label: params.label, uses: 0 })
        }

        fn on_update(&mut self, patch: TagPatch) -> Result<(), FrameworkError> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn on_delete(&self) -> Result<(), FrameworkError> {
            if self.uses > 0 {
                return Err(FrameworkError::Validation("tag in use".to_string()));
            }
            Ok(())
        }

        fn matches(&self, filter: &TagFilter) -> bool {
            self.label.starts_with(&filter.prefix)
        }

        fn unique_key(&self) -> Option<(&'static str, String)> {
            Some(("label", self.label.clone()))
        }

        fn handle_action(&mut self, action: TagAction) -> Result<u32, FrameworkError> {
            match action {
                TagAction::Use => {
                    self.uses += 1;
                    Ok(self.uses)
                }
                TagAction::Retire => Ok(self.uses),
            }
        }
    }

    fn start() -> ResourceClient<Tag> {
        let (actor, client) = ResourceActor::<Tag>::new(10, sequence());
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = start();

        let tag = client.create(TagCreate { label: "rust".into() }).await.unwrap();
        assert_eq!(tag.id, 1);

        assert_eq!(client.perform_action(1, TagAction::Use).await.unwrap(), 1);
        assert_eq!(client.perform_action(1, TagAction::Use).await.unwrap(), 2);
        assert_eq!(client.perform_action(1, TagAction::Retire).await.unwrap(), 2);

        let stored = client.get(1).await.unwrap().unwrap();
        assert_eq!(stored.uses, 2);

        let missing = client.perform_action(99, TagAction::Use).await;
        assert_eq!(missing, Err(FrameworkError::NotFound("99".to_string())));
    }

    #[tokio::test]
    async fn test_unique_key_rejects_duplicates_on_create_and_update() {
        let client = start();
        client.create(TagCreate { label: "a".into() }).await.unwrap();
        let b = client.create(TagCreate { label: "b".into() }).await.unwrap();

        let dup = client.create(TagCreate { label: "a".into() }).await;
        assert_eq!(
            dup,
            Err(FrameworkError::Conflict { field: "label", value: "a".to_string() })
        );

        let rename = client.update(b.id, TagPatch { label: Some("a".into()) }).await;
        assert!(matches!(rename, Err(FrameworkError::Conflict { .. })));
        assert_eq!(client.get(b.id).await.unwrap().unwrap().label, "b");

        // Re-saving a row with its own key is not a conflict.
        let same = client.update(b.id, TagPatch { label: Some("b".into()) }).await;
        assert!(same.is_ok());
        assert_eq!(client.find(TagFilter { prefix: String::new() }).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_returns_rows_in_id_order() {
        let client = start();
        for label in ["beta", "alpha", "bravo"] {
            client.create(TagCreate { label: label.into() }).await.unwrap();
        }
        let rows = client.find(TagFilter { prefix: "b".into() }).await.unwrap();
        let ids: Vec<u64> = rows.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_delete_hook_can_veto() {
        let client = start();
        let tag = client.create(TagCreate { label: "busy".into() }).await.unwrap();
        client.perform_action(tag.id, TagAction::Use).await.unwrap();

        assert!(matches!(client.delete(tag.id).await, Err(FrameworkError::Validation(_))));
        assert!(client.get(tag.id).await.unwrap().is_some());
        assert_eq!(client.delete(42).await, Err(FrameworkError::NotFound("42".into())));
    }

    #[tokio::test]
    async fn test_closed_actor_reports_error() {
        let (actor, client) = ResourceActor::<Tag>::new(1, sequence());
        drop(actor);
        assert_eq!(client.get(1).await, Err(FrameworkError::ActorClosed));
    }
}
