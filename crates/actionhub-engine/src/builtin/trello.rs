// SPDX-FileCopyrightText: 2026 ActionHub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process "Add card" plugin for the built-in Trello service.
//!
//! Resolves the configured list on the configured board, then creates a card
//! in it through the Trello REST API.

use std::sync::Arc;

use actionhub_core::{
    ActionHubError, ActionRunner, ErrorCode, FieldError, Params, PluginContext, PluginIdentity,
    RunnerFactory, ValidatedConfig,
};
use actionhub_registry::{
    Documentation, Form, FormComponent, FormField, FormGroup, PluginDescriptor, PortDoc,
};
use actionhub_schema::ConfigSchema;
use async_trait::async_trait;
use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::remote::error_body;

pub const ADD_CARD_PLUGIN_ID: &str = "a04381af-c008-4328-ab61-0e73825903ce";

/// Default Trello REST API base.
pub const DEFAULT_API_BASE_URL: &str = "https://api.trello.com/1";

/// Configuration of the "Add card" plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TrelloConfig {
    /// Trello API key.
    pub api_key: String,
    /// Trello API token.
    pub token: String,
    /// Board URL, e.g. `https://trello.com/b/AbCd1234/roadmap`.
    pub board_url: String,
    /// Name of the list that receives the card.
    pub list_name: String,
    pub card: CardSpec,
}

/// Card to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CardSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Link attached to the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Due date, ISO 8601.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    /// `latitude,longitude`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrelloList {
    id: String,
    name: String,
}

/// Creates [`TrelloCardAdder`] runners against one API base.
#[derive(Debug, Clone)]
pub struct TrelloCardAdderFactory {
    client: reqwest::Client,
    api_base_url: String,
}

impl TrelloCardAdderFactory {
    pub fn new(client: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
        }
    }
}

impl RunnerFactory for TrelloCardAdderFactory {
    fn create(&self) -> Result<Box<dyn ActionRunner>, ActionHubError> {
        Ok(Box::new(TrelloCardAdder {
            client: self.client.clone(),
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            context: PluginContext::default(),
            state: None,
        }))
    }
}

#[derive(Debug)]
struct Configured {
    config: TrelloConfig,
    board_id: String,
}

/// One "Add card" invocation.
#[derive(Debug)]
pub struct TrelloCardAdder {
    client: reqwest::Client,
    api_base_url: String,
    context: PluginContext,
    state: Option<Configured>,
}

impl TrelloCardAdder {
    fn url(&self, path: &str, extra: &[(&str, &str)], config: &TrelloConfig) -> Result<Url, ActionHubError> {
        let mut params = vec![("key", config.api_key.as_str()), ("token", config.token.as_str())];
        params.extend_from_slice(extra);
        Url::parse_with_params(&format!("{}/{path}", self.api_base_url), params)
            .map_err(|e| ActionHubError::Internal(format!("invalid Trello API URL: {e}")))
    }

    async fn find_list(&self, configured: &Configured) -> Result<String, ActionHubError> {
        let url = self.url(
            &format!("boards/{}/lists", configured.board_id),
            &[],
            &configured.config,
        )?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let lists: Vec<TrelloList> = checked(response).await?.json().await.map_err(transport_error)?;

        lists
            .into_iter()
            .find(|list| list.name == configured.config.list_name)
            .map(|list| list.id)
            .ok_or_else(|| {
                ActionHubError::runtime(format!(
                    "list `{}` not found on board `{}`",
                    configured.config.list_name, configured.board_id
                ))
            })
    }
}

#[async_trait]
impl ActionRunner for TrelloCardAdder {
    fn bind_context(&mut self, context: PluginContext) {
        self.context = context;
    }

    async fn configure(&mut self, config: ValidatedConfig) -> Result<(), ActionHubError> {
        let config: TrelloConfig = config.parse()?;
        let board_id = board_id(&config.board_url)?;
        debug!(board_id = %board_id, list = %config.list_name, "trello card adder configured");
        self.state = Some(Configured { config, board_id });
        Ok(())
    }

    async fn execute(&mut self, _params: Params) -> Result<Value, ActionHubError> {
        let configured = self
            .state
            .as_ref()
            .ok_or_else(|| ActionHubError::Internal("plugin run before configure".into()))?;

        let list_id = self.find_list(configured).await?;
        let url = self.url("cards", &[("idList", list_id.as_str())], &configured.config)?;

        let card = &configured.config.card;
        let mut body = Map::new();
        body.insert("name".into(), Value::String(card.name.clone()));
        let optional = [
            ("desc", &card.desc),
            ("urlSource", &card.url),
            ("due", &card.due),
            ("coordinates", &card.coordinates),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                body.insert(key.into(), Value::String(value.clone()));
            }
        }

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let created: Value = checked(response).await?.json().await.map_err(transport_error)?;
        debug!(
            node = ?self.context.node().and_then(|n| n.get("id")),
            list_id = %list_id,
            "trello card created"
        );
        Ok(created)
    }
}

/// Extract the board short id from a `https://trello.com/b/<id>/...` URL.
fn board_id(board_url: &str) -> Result<String, ActionHubError> {
    let invalid = || {
        ActionHubError::invalid_field(FieldError::new(
            "board_url",
            "expected a Trello board URL such as https://trello.com/b/<board-id>/<name>",
            ErrorCode::Format,
        ))
    };

    let url = Url::parse(board_url).map_err(|_| invalid())?;
    let mut segments = url.path_segments().ok_or_else(invalid)?;
    match (segments.next(), segments.next()) {
        (Some("b"), Some(id)) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(invalid()),
    }
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ActionHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = error_body(response).await;
    Err(ActionHubError::Remote {
        message: format!("Trello API returned {status}: {body}"),
        status: Some(status.as_u16()),
        source: None,
    })
}

fn transport_error(e: reqwest::Error) -> ActionHubError {
    ActionHubError::Remote {
        message: format!("Trello API request failed: {e}"),
        status: e.status().map(|s| s.as_u16()),
        source: Some(Box::new(e)),
    }
}

/// Blank configuration offered to form consumers. Satisfies the schema.
pub fn default_init() -> Value {
    json!({
        "api_key": "",
        "token": "",
        "board_url": "",
        "list_name": "",
        "card": {"name": ""}
    })
}

fn text_field(id: &str, name: &str, description: &str, required: bool) -> FormField {
    FormField {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        component: FormComponent {
            kind: "text".to_string(),
            props: Map::new(),
        },
        required,
    }
}

pub fn form() -> Form {
    Form {
        submit: None,
        groups: vec![
            FormGroup {
                name: Some("Trello access".to_string()),
                description: Some("Credentials and the board that receives the card.".to_string()),
                fields: vec![
                    text_field("api_key", "API key", "Trello API key.", true),
                    text_field("token", "Token", "Trello API token.", true),
                    text_field("board_url", "Board URL", "URL of the Trello board.", true),
                    text_field("list_name", "List name", "List the card is added to.", true),
                ],
            },
            FormGroup {
                name: Some("Card".to_string()),
                description: None,
                fields: vec![
                    text_field("card.name", "Name", "Card title.", true),
                    text_field("card.desc", "Description", "Card description.", false),
                    text_field("card.url", "Link", "URL attached to the card.", false),
                    text_field("card.due", "Due date", "Due date in ISO 8601.", false),
                    text_field(
                        "card.coordinates",
                        "Coordinates",
                        "Location as latitude,longitude.",
                        false,
                    ),
                ],
            },
        ],
    }
}

pub fn identity() -> PluginIdentity {
    PluginIdentity::new("TrelloCardAdder", module_path!())
}

/// Descriptor of the "Add card" plugin backed by `implementation`.
pub fn add_card_plugin(implementation: Arc<dyn RunnerFactory>) -> PluginDescriptor {
    PluginDescriptor::new(ADD_CARD_PLUGIN_ID, "Add card", identity(), implementation)
        .with_schema(ConfigSchema::for_type::<TrelloConfig>())
        .with_init(default_init())
        .with_form(form())
        .with_ports(["payload"], ["payload", "error"])
        .with_documentation(Documentation {
            inputs: [("payload".to_string(), PortDoc::new("This port takes payload object."))]
                .into_iter()
                .collect(),
            outputs: [
                ("payload".to_string(), PortDoc::new("Returns the created card.")),
                ("error".to_string(), PortDoc::new("Returns an error if the card was not created.")),
            ]
            .into_iter()
            .collect(),
        })
}
