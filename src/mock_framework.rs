//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_action`] to script the store's
//! replies, including failures a real store would rarely produce.

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};

type Reply<R> = oneshot::Sender<Result<R, FrameworkError>>;

/// Creates a mock client and the receiving end of its mailbox.
///
/// The test plays the actor: it pulls each request off the receiver, asserts on it,
/// and answers through the request's responder.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Reply<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Reply<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Find request
pub async fn expect_find<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Filter, Reply<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Find { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Reply<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, CategoryCreate};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Category>(10);

        let create_task = tokio::spawn(async move { client.create(CategoryCreate::new("Books")).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Books");
        responder.send(Ok(Category { id: 1, name: payload.name })).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(Category { id: 1, name: "Books".to_string() }));
    }

    #[tokio::test]
    async fn test_mock_reports_unexpected_request() {
        let (client, mut receiver) = create_mock_client::<Category>(10);

        let get_task = tokio::spawn(async move { client.get(3).await });

        assert!(expect_find(&mut receiver).await.is_none());
        // The request was consumed and its responder dropped with it.
        assert_eq!(get_task.await.unwrap(), Err(FrameworkError::ActorDropped));
    }
}
