//! Session actor: maps opaque bearer tokens to the principal they were issued for.

use std::collections::HashMap;

use chrono::{TimeDelta, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use super::token::{AccessToken, Principal};
use super::AuthError;

pub type ServiceResponse<T> = oneshot::Sender<Result<T, AuthError>>;

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
/// Arguments are skipped in spans since they carry credentials.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[instrument(skip_all)]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, AuthError> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| AuthError::ServiceUnavailable("session service closed".to_string()))?;

                response
                    .await
                    .map_err(|_| AuthError::ServiceUnavailable("session service dropped".to_string()))?
            }
        }
    };
}

#[derive(Debug)]
pub enum SessionRequest {
    Issue {
        principal: Principal,
        respond_to: ServiceResponse<AccessToken>,
    },
    Resolve {
        token: String,
        respond_to: ServiceResponse<Principal>,
    },
    Revoke {
        token: String,
        respond_to: ServiceResponse<bool>,
    },
    Shutdown,
    #[cfg(test)]
    SessionCount {
        respond_to: ServiceResponse<usize>,
    },
}

pub struct SessionService {
    receiver: mpsc::Receiver<SessionRequest>,
    sessions: HashMap<String, AccessToken>,
    ttl: TimeDelta,
}

impl SessionService {
    pub fn new(buffer_size: usize, ttl: TimeDelta) -> (Self, SessionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            sessions: HashMap::new(),
            ttl,
        };
        (service, SessionClient::new(sender))
    }

    #[instrument(name = "session_service", skip(self))]
    pub async fn run(mut self) {
        info!("SessionService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SessionRequest::Issue { principal, respond_to } => {
                    self.handle_issue(principal, respond_to);
                }
                SessionRequest::Resolve { token, respond_to } => {
                    self.handle_resolve(token, respond_to);
                }
                SessionRequest::Revoke { token, respond_to } => {
                    let removed = self.sessions.remove(&token).is_some();
                    debug!(removed, "Session revoked");
                    let _ = respond_to.send(Ok(removed));
                }
                SessionRequest::Shutdown => {
                    info!("SessionService shutting down");
                    break;
                }
                #[cfg(test)]
                SessionRequest::SessionCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.sessions.len()));
                }
            }
        }

        info!("SessionService stopped");
    }

    #[instrument(fields(subject_id = principal.subject_id, role = %principal.role), skip(self, principal, respond_to))]
    fn handle_issue(&mut self, principal: Principal, respond_to: ServiceResponse<AccessToken>) {
        let token = AccessToken::issue(principal, self.ttl);
        info!(expires_at = %token.expires_at, "Session issued");
        self.sessions.insert(token.token.clone(), token.clone());
        let _ = respond_to.send(Ok(token));
    }

    /// Expired sessions are evicted when they are looked up.
    #[instrument(skip_all)]
    fn handle_resolve(&mut self, token: String, respond_to: ServiceResponse<Principal>) {
        let now = Utc::now();
        let result = match self.sessions.get(&token) {
            Some(session) if session.is_expired_at(now) => {
                warn!(subject_id = session.principal.subject_id, "Session expired");
                self.sessions.remove(&token);
                Err(AuthError::InvalidToken)
            }
            Some(session) => Ok(session.principal.clone()),
            None => {
                debug!("Unknown session token");
                Err(AuthError::InvalidToken)
            }
        };
        let _ = respond_to.send(result);
    }
}

/// Client for SessionService.
#[derive(Clone)]
pub struct SessionClient {
    sender: mpsc::Sender<SessionRequest>,
}

impl SessionClient {
    pub fn new(sender: mpsc::Sender<SessionRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), AuthError> {
        debug!("Sending shutdown request");
        self.sender
            .send(SessionRequest::Shutdown)
            .await
            .map_err(|_| AuthError::ServiceUnavailable("session service closed".to_string()))
    }
}

client_method!(SessionClient => fn issue(principal: Principal) -> AccessToken as SessionRequest::Issue);
client_method!(SessionClient => fn resolve(token: String) -> Principal as SessionRequest::Resolve);
client_method!(SessionClient => fn revoke(token: String) -> bool as SessionRequest::Revoke);

#[cfg(test)]
client_method!(SessionClient => fn session_count() -> usize as SessionRequest::SessionCount);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn bob() -> Principal {
        Principal { subject_id: 7, email: "bob@example.com".into(), role: Role::Admin }
    }

    #[tokio::test]
    async fn test_issue_resolve_revoke() -> Result<(), Box<dyn std::error::Error>> {
        let (service, client) = SessionService::new(8, TimeDelta::days(1));
        let handle = tokio::spawn(service.run());

        let token = client.issue(bob()).await?;
        assert_eq!(client.resolve(token.token.clone()).await?, bob());
        assert_eq!(client.session_count().await?, 1);

        assert!(client.revoke(token.token.clone()).await?);
        assert_eq!(client.resolve(token.token).await, Err(AuthError::InvalidToken));

        client.shutdown().await?;
        handle.await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_evicted() -> Result<(), Box<dyn std::error::Error>> {
        let (service, client) = SessionService::new(8, TimeDelta::zero());
        tokio::spawn(service.run());

        let token = client.issue(bob()).await?;
        assert_eq!(client.resolve(token.token).await, Err(AuthError::InvalidToken));
        assert_eq!(client.session_count().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (service, client) = SessionService::new(8, TimeDelta::days(1));
        tokio::spawn(service.run());
        assert_eq!(client.resolve("nope".to_string()).await, Err(AuthError::InvalidToken));
    }
}
