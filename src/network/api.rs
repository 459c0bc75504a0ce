use async_trait::async_trait;

use crate::common::Message;
use crate::gateway::{GatewayError, MutationGateway};

/// The three calls a visitor's client makes. Implemented by the in-process
/// gateway and by [`super::HttpApi`] talking to `guestbook serve`.
#[async_trait]
pub trait GuestbookApi: Send + Sync {
    async fn list_recent(&self, limit: usize) -> Vec<Message>;

    async fn create(&self, author: String, body: String) -> Result<String, GatewayError>;

    async fn delete(&self, id: String, secret: String) -> Result<(), GatewayError>;
}

/// Store calls block, so each one is moved onto the blocking pool. A task
/// that dies there is reported as the generic failure for its operation.
#[async_trait]
impl GuestbookApi for MutationGateway {
    async fn list_recent(&self, limit: usize) -> Vec<Message> {
        self.blocking(move |gateway| gateway.list_recent(limit))
            .await
            .unwrap_or_else(|err| {
                log::error!("List task failed: {err}");
                Vec::new()
            })
    }

    async fn create(&self, author: String, body: String) -> Result<String, GatewayError> {
        self.blocking(move |gateway| gateway.create(&author, &body))
            .await
            .unwrap_or_else(|err| {
                log::error!("Create task failed: {err}");
                Err(GatewayError::Submission)
            })
    }

    async fn delete(&self, id: String, secret: String) -> Result<(), GatewayError> {
        self.blocking(move |gateway| gateway.delete(&id, &secret))
            .await
            .unwrap_or_else(|err| {
                log::error!("Delete task failed: {err}");
                Err(GatewayError::Deletion)
            })
    }
}
