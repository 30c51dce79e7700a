//! Callable tools exposed to a host tool runtime.
//!
//! The host lists [`tool_definitions`] and forwards each invocation to
//! [`Toolbox::call`] with the tool name and its JSON arguments.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::aggregator::SearchAggregator;
use crate::error::{SearchError, SearchResult as Result};

pub const GREET: &str = "greet";
pub const GET_TIME: &str = "get_time";
pub const WEB_SEARCH: &str = "web_search";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name, description and JSON schema of one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: GREET.to_string(),
            description: "Returns a greeting message.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Who to greet" }
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: GET_TIME.to_string(),
            description: "Returns the current server time as a string.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        ToolDefinition {
            name: WEB_SEARCH.to_string(),
            description: "Searches Google and DuckDuckGo and returns a merged, deduplicated list of {title, url} results.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "num_results": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Maximum number of results (default 20)"
                    }
                },
                "required": ["query"]
            }),
        },
    ]
}

pub fn greet(name: &str) -> String {
    format!("Heyup, {name}!")
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`
pub fn get_time() -> String {
    format_time(&Local::now())
}

fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIME_FORMAT).to_string()
}

#[derive(Debug, Deserialize)]
struct GreetArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default)]
    num_results: Option<usize>,
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, args: Value) -> Result<T> {
    // hosts may send no arguments at all for argument-less calls
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| SearchError::InvalidInput(format!("invalid arguments for {tool}: {e}")))
}

/// Dispatches tool invocations by name.
#[derive(Debug)]
pub struct Toolbox {
    search: SearchAggregator,
}

impl Toolbox {
    pub fn new(search: SearchAggregator) -> Self {
        Self { search }
    }

    pub fn search(&self) -> &SearchAggregator {
        &self.search
    }

    /// Run tool `name` with JSON `args`, returning its JSON result.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidInput`] for an unknown tool, arguments that do
    /// not match the tool's schema, or a blank search query.
    pub async fn call(&self, name: &str, args: Value) -> Result<Value> {
        log::debug!("tool call: {name}");
        match name {
            GREET => {
                let args: GreetArgs = parse_args(name, args)?;
                Ok(Value::String(greet(&args.name)))
            }
            GET_TIME => Ok(Value::String(get_time())),
            WEB_SEARCH => {
                let args: WebSearchArgs = parse_args(name, args)?;
                let num_results = args
                    .num_results
                    .unwrap_or_else(|| self.search.default_num_results());
                let results = self.search.search(&args.query, num_results).await?;
                Ok(serde_json::to_value(results)?)
            }
            other => Err(SearchError::InvalidInput(format!("unknown tool: {other}"))),
        }
    }
}
