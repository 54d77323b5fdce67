//! [`StorefrontApi`] over HTTP.

use crate::api::StorefrontApi;
use crate::cart::{CartItem, CartRecord};
use crate::catalog::{CategoryRecord, ServiceDocument};
use crate::checkout::{Enquiry, EnquiryReceipt};
use crate::config::ApiConfig;
use crate::identity::AuthToken;
use crate::ids::SubServiceId;
use crate::search::SearchHit;
use crate::wire::ListBody;
use async_trait::async_trait;
use doorstep_data::{ClientConfig, FetchClient, FetchError, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// The storefront REST API, reached through a [`FetchClient`].
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    client: FetchClient,
}

impl HttpStorefront {
    /// Wrap a client that already has its base URL configured.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Build the client from API settings.
    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        let client_config = ClientConfig {
            base_url: Some(config.base_url.clone()),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        };
        Ok(Self::new(FetchClient::with_config(&client_config)?))
    }

    /// The underlying client.
    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, FetchError> {
        let url = self.client.endpoint(segments)?;
        decode_list(self.client.get(url).send().await?)
    }
}

fn decode_list<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, FetchError> {
    Ok(response.error_for_status()?.json::<ListBody<T>>()?.into_vec())
}

fn decode_receipt(response: Response) -> Result<EnquiryReceipt, FetchError> {
    let response = response.error_for_status()?;
    // Some deployments answer 201 with an empty body.
    let body = if response.body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        response.json::<Value>()?
    };
    Ok(EnquiryReceipt::from_value(&body))
}

#[async_trait]
impl StorefrontApi for HttpStorefront {
    async fn categories(&self) -> Result<Vec<CategoryRecord>, FetchError> {
        self.get_list(&["categories"]).await
    }

    async fn services(&self) -> Result<Vec<ServiceDocument>, FetchError> {
        self.get_list(&["services"]).await
    }

    async fn services_in_category(&self, name: &str) -> Result<Vec<ServiceDocument>, FetchError> {
        self.get_list(&["services", "category", name]).await
    }

    async fn cart(&self, token: &AuthToken) -> Result<Vec<CartRecord>, FetchError> {
        let url = self.client.endpoint(&["cart"])?;
        decode_list(
            self.client
                .get(url)
                .bearer_auth(token.expose())
                .send()
                .await?,
        )
    }

    async fn add_to_cart(&self, token: &AuthToken, item: &CartItem) -> Result<(), FetchError> {
        let url = self.client.endpoint(&["cart", "add"])?;
        self.client
            .post(url)
            .bearer_auth(token.expose())
            .json(item)?
            .execute()
            .await
    }

    async fn remove_from_cart(
        &self,
        token: &AuthToken,
        sub_service_id: &SubServiceId,
    ) -> Result<(), FetchError> {
        let url = self.client.endpoint(&["cart", sub_service_id.as_str()])?;
        self.client
            .delete(url)
            .bearer_auth(token.expose())
            .execute()
            .await
    }

    async fn clear_cart(&self, token: &AuthToken) -> Result<(), FetchError> {
        let url = self.client.endpoint(&["cart"])?;
        self.client
            .delete(url)
            .bearer_auth(token.expose())
            .execute()
            .await
    }

    async fn submit_enquiry(
        &self,
        token: &AuthToken,
        enquiry: &Enquiry,
    ) -> Result<EnquiryReceipt, FetchError> {
        let url = self.client.endpoint(&["customer", "enquiry"])?;
        decode_receipt(
            self.client
                .post(url)
                .bearer_auth(token.expose())
                .json(enquiry)?
                .send()
                .await?,
        )
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, FetchError> {
        let url = self.client.endpoint(&["search"])?;
        decode_list(self.client.get(url).query("q", query).send().await?)
    }
}
