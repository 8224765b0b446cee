// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runner variant that forwards invocations to an out-of-process microservice.
//!
//! The configure phase only records the validated configuration; the remote
//! service receives context, configuration and parameters together in a single
//! `POST <endpoint>/plugin/run` request during the run phase.

use std::time::Duration;

use actionhub_core::{
    ActionHubError, ActionRunner, FieldError, Params, PluginContext, RunnerFactory,
    ValidatedConfig,
};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Builds the shared HTTP client used by remote runners.
pub fn remote_http_client(timeout: Duration) -> Result<reqwest::Client, ActionHubError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ActionHubError::Remote {
            message: format!("failed to build HTTP client: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })
}

/// Creates [`RemoteRunner`] instances bound to one remote plugin.
#[derive(Debug, Clone)]
pub struct RemoteRunnerFactory {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    plugin_id: String,
}

impl RemoteRunnerFactory {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        service_id: impl Into<String>,
        plugin_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            service_id: service_id.into(),
            plugin_id: plugin_id.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RunnerFactory for RemoteRunnerFactory {
    fn create(&self) -> Result<Box<dyn ActionRunner>, ActionHubError> {
        let base = self.endpoint.trim_end_matches('/');
        let url = Url::parse_with_params(
            &format!("{base}/plugin/run"),
            [
                ("service_id", self.service_id.as_str()),
                ("action_id", self.plugin_id.as_str()),
            ],
        )
        .map_err(|e| ActionHubError::Remote {
            message: format!("invalid remote endpoint `{}`: {e}", self.endpoint),
            status: None,
            source: Some(Box::new(e)),
        })?;

        Ok(Box::new(RemoteRunner {
            client: self.client.clone(),
            url,
            context: PluginContext::default(),
            init: None,
        }))
    }
}

/// One remote invocation. Holds the bound context and configuration until run.
#[derive(Debug)]
pub struct RemoteRunner {
    client: reqwest::Client,
    url: Url,
    context: PluginContext,
    init: Option<Value>,
}

#[derive(Serialize)]
struct RunBody<'a> {
    context: &'a Map<String, Value>,
    init: &'a Value,
    params: &'a Params,
}

/// Error body accepted from a remote service on 422.
#[derive(Deserialize)]
struct RejectionBody {
    #[serde(default, alias = "detail")]
    errors: Vec<FieldError>,
}

#[async_trait]
impl ActionRunner for RemoteRunner {
    fn bind_context(&mut self, context: PluginContext) {
        self.context = context;
    }

    async fn configure(&mut self, config: ValidatedConfig) -> Result<(), ActionHubError> {
        self.init = Some(config.into_value());
        Ok(())
    }

    async fn execute(&mut self, params: Params) -> Result<Value, ActionHubError> {
        let empty = Value::Object(Map::new());
        let body = RunBody {
            context: self.context.as_map(),
            init: self.init.as_ref().unwrap_or(&empty),
            params: &params,
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ActionHubError::Remote {
                message: format!("HTTP request failed: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, url = %self.url, "remote run response received");

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let text = error_body(response).await;
            return match serde_json::from_str::<RejectionBody>(&text) {
                Ok(body) if !body.errors.is_empty() => Err(ActionHubError::Validation(body.errors)),
                _ => Err(ActionHubError::Remote {
                    message: format!("remote service rejected configuration: {text}"),
                    status: Some(status.as_u16()),
                    source: None,
                }),
            };
        }

        if !status.is_success() {
            let text = error_body(response).await;
            warn!(status = %status, body = %text, "remote run failed");
            return Err(ActionHubError::Remote {
                message: format!("remote service returned {status}: {text}"),
                status: Some(status.as_u16()),
                source: None,
            });
        }

        response.json::<Value>().await.map_err(|e| ActionHubError::Remote {
            message: format!("remote service returned invalid JSON: {e}"),
            status: Some(status.as_u16()),
            source: Some(Box::new(e)),
        })
    }
}

/// Body of a failed response, or a note naming why it could not be read.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(text) => text,
        Err(e) => format!("<response body unreadable: {e}>"),
    }
}
