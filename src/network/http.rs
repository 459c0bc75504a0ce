use async_trait::async_trait;
use reqwest::{Client, Response};

use super::api::GuestbookApi;
use super::server::{ADMIN_KEY_HEADER, API_PATH, CreateRequest, CreatedResponse};
use crate::common::Message;
use crate::gateway::GatewayError;

/// Talks to a gateway started with `guestbook serve`.
///
/// Transport failures are logged and reported as the generic backend error
/// for the call (`Submission` or `Deletion`); the visitor cannot do anything
/// different about them.
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}{API_PATH}", self.base_url)
    }
}

/// Recovers the gateway's error from a non-2xx response body.
async fn gateway_error(response: Response, fallback: GatewayError) -> GatewayError {
    let status = response.status();
    match response.json::<GatewayError>().await {
        Ok(err) => err,
        Err(err) => {
            log::error!("Unexpected {status} from gateway: {err}");
            fallback
        }
    }
}

#[async_trait]
impl GuestbookApi for HttpApi {
    async fn list_recent(&self, limit: usize) -> Vec<Message> {
        let url = format!("{}?limit={limit}", self.messages_url());
        let result = async {
            self.client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<Message>>()
                .await
        }
        .await;

        match result {
            Ok(messages) => messages,
            Err(err) => {
                log::error!("Failed to fetch messages: {err}");
                Vec::new()
            }
        }
    }

    async fn create(&self, author: String, body: String) -> Result<String, GatewayError> {
        let response = match self
            .client
            .post(self.messages_url())
            .json(&CreateRequest { author, body })
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::error!("Failed to reach gateway: {err}");
                return Err(GatewayError::Submission);
            }
        };

        if !response.status().is_success() {
            return Err(gateway_error(response, GatewayError::Submission).await);
        }

        match response.json::<CreatedResponse>().await {
            Ok(created) => Ok(created.id),
            Err(err) => {
                log::error!("Malformed create response: {err}");
                Err(GatewayError::Submission)
            }
        }
    }

    async fn delete(&self, id: String, secret: String) -> Result<(), GatewayError> {
        let url = format!("{}/{id}", self.messages_url());
        let response = match self
            .client
            .delete(url)
            .header(ADMIN_KEY_HEADER, secret)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                log::error!("Failed to reach gateway: {err}");
                return Err(GatewayError::Deletion);
            }
        };

        if response.status().is_success() {
            Ok(())
        } else {
            Err(gateway_error(response, GatewayError::Deletion).await)
        }
    }
}
