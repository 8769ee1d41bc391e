//! Tool catalog: names, input schemas, annotations and dispatch.

use crate::calendars;
use crate::client::WorksClient;
use crate::config::WorksApiConfig;
use crate::error::{Result, WorksToolsError};
use crate::events;
use crate::semantics::annotations_for_method;
use crate::tasks;
use crate::validation::parse_args;
use reqwest::Method;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// Every tool the server exposes, one per remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorksTool {
    GetMyTasks,
    DeleteMyTask,
    CreateMyTask,
    GetMyCategories,
    DeleteMyCategory,
    GetDefaultCalendarEvents,
    CreateDefaultCalendarEvent,
    DeleteDefaultCalendarEvent,
    GetCalendarPersonalUserList,
    DeleteCalendar,
    CreateCalendar,
}

impl WorksTool {
    pub const ALL: [Self; 11] = [
        Self::GetMyTasks,
        Self::DeleteMyTask,
        Self::CreateMyTask,
        Self::GetMyCategories,
        Self::DeleteMyCategory,
        Self::GetDefaultCalendarEvents,
        Self::CreateDefaultCalendarEvent,
        Self::DeleteDefaultCalendarEvent,
        Self::GetCalendarPersonalUserList,
        Self::DeleteCalendar,
        Self::CreateCalendar,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetMyTasks => "get_my_tasks",
            Self::DeleteMyTask => "delete_my_task",
            Self::CreateMyTask => "create_my_task",
            Self::GetMyCategories => "get_my_categories",
            Self::DeleteMyCategory => "delete_my_category",
            Self::GetDefaultCalendarEvents => "get_default_calendar_events",
            Self::CreateDefaultCalendarEvent => "create_default_calendar_event",
            Self::DeleteDefaultCalendarEvent => "delete_default_calendar_event",
            Self::GetCalendarPersonalUserList => "get_calendar_personal_user_list",
            Self::DeleteCalendar => "delete_calendar",
            Self::CreateCalendar => "create_calendar",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::GetMyTasks
            | Self::GetMyCategories
            | Self::GetDefaultCalendarEvents
            | Self::GetCalendarPersonalUserList => Method::GET,
            Self::CreateMyTask | Self::CreateDefaultCalendarEvent | Self::CreateCalendar => {
                Method::POST
            }
            Self::DeleteMyTask
            | Self::DeleteMyCategory
            | Self::DeleteDefaultCalendarEvent
            | Self::DeleteCalendar => Method::DELETE,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::GetMyTasks => "Get my tasks",
            Self::DeleteMyTask => "Delete my task",
            Self::CreateMyTask => "Create task",
            Self::GetMyCategories => "Get my task categories",
            Self::DeleteMyCategory => "Delete task category",
            Self::GetDefaultCalendarEvents => "Get default calendar events",
            Self::CreateDefaultCalendarEvent => "Create default calendar event",
            Self::DeleteDefaultCalendarEvent => "Delete default calendar event",
            Self::GetCalendarPersonalUserList => "Get calendar personal properties",
            Self::DeleteCalendar => "Delete calendar",
            Self::CreateCalendar => "Create calendar",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::GetMyTasks => {
                "List my tasks in a category, filtered by status and by my role (assignee/assignor)."
            }
            Self::DeleteMyTask => "Delete one of my tasks by id.",
            Self::CreateMyTask => {
                "Create a task assigned to one or more users. dueDate is YYYY-MM-DD."
            }
            Self::GetMyCategories => "List my task categories.",
            Self::DeleteMyCategory => "Delete one of my task categories by id.",
            Self::GetDefaultCalendarEvents => {
                "List events of my default calendar between two ISO-8601 datetimes \
                 (e.g. 2024-01-15T09:00:00+09:00)."
            }
            Self::CreateDefaultCalendarEvent => {
                "Create an event in my default calendar. Attendees need an email or id; \
                 reminders use method DISPLAY or EMAIL."
            }
            Self::DeleteDefaultCalendarEvent => "Delete an event from my default calendar by id.",
            Self::GetCalendarPersonalUserList => {
                "List my per-calendar personal properties. Pass the returned cursor to get the \
                 next page."
            }
            Self::DeleteCalendar => "Delete a calendar by id.",
            Self::CreateCalendar => {
                "Create a calendar, optionally shared with users, groups or org units."
            }
        }
    }

    /// JSON Schema (draft 2020-12 subset) for the tool's arguments.
    #[must_use]
    pub fn input_schema(self) -> Value {
        match self {
            Self::GetMyTasks => object_schema(
                json!({
                    "categoryId": { "type": "string", "description": "Task category id" },
                    "count": { "type": "integer", "minimum": 0, "maximum": 100, "default": 50 },
                    "status": { "type": "string", "enum": tasks::TASK_STATUSES, "default": "TODO" },
                    "searchFilterType": {
                        "type": "string",
                        "enum": tasks::SEARCH_FILTER_TYPES,
                        "default": "ALL"
                    }
                }),
                &["categoryId"],
            ),
            Self::DeleteMyTask => object_schema(
                json!({ "taskId": { "type": "string" } }),
                &["taskId"],
            ),
            Self::CreateMyTask => object_schema(
                json!({
                    "assignorId": { "type": "string" },
                    "assignees": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "properties": {
                                "assigneeId": { "type": "string" },
                                "status": { "type": "string", "enum": tasks::ASSIGNEE_STATUSES }
                            },
                            "required": ["assigneeId", "status"]
                        }
                    },
                    "title": { "type": "string" },
                    "content": { "type": "string" },
                    "dueDate": { "type": "string", "format": "date" },
                    "completionCondition": {
                        "type": "string",
                        "enum": tasks::COMPLETION_CONDITIONS,
                        "default": "ANY_ONE"
                    },
                    "categoryId": { "type": "string" }
                }),
                &["assignorId", "assignees", "title", "content"],
            ),
            Self::GetMyCategories => object_schema(json!({}), &[]),
            Self::DeleteMyCategory => object_schema(
                json!({ "categoryId": { "type": "string" } }),
                &["categoryId"],
            ),
            Self::GetDefaultCalendarEvents => object_schema(
                json!({
                    "fromDateTime": { "type": "string", "format": "date-time" },
                    "untilDateTime": { "type": "string", "format": "date-time" }
                }),
                &["fromDateTime", "untilDateTime"],
            ),
            Self::CreateDefaultCalendarEvent => object_schema(
                json!({
                    "summary": { "type": "string" },
                    "start_datetime": { "type": "string", "format": "date-time" },
                    "end_datetime": { "type": "string", "format": "date-time" },
                    "timezone": { "type": "string", "default": events::DEFAULT_TIMEZONE },
                    "description": { "type": "string" },
                    "location": { "type": "string" },
                    "event_id": { "type": "string" },
                    "category_id": { "type": "string" },
                    "attendees": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "email": { "type": "string" },
                                "id": { "type": "string" },
                                "displayName": { "type": "string" },
                                "partstat": { "type": "string", "default": "NEEDS-ACTION" },
                                "isOptional": { "type": "boolean", "default": false },
                                "isResource": { "type": "boolean", "default": false },
                                "resourceValue": { "type": "string" }
                            }
                        }
                    },
                    "visibility": {
                        "type": "string",
                        "enum": events::VISIBILITIES,
                        "default": "PUBLIC"
                    },
                    "transparency": {
                        "type": "string",
                        "enum": events::TRANSPARENCIES,
                        "default": "OPAQUE"
                    },
                    "priority": { "type": "integer", "minimum": 0, "maximum": 9, "default": 0 },
                    "recurrence": { "type": "array", "items": { "type": "string" } },
                    "reminders": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "method": { "type": "string", "enum": events::REMINDER_METHODS },
                                "trigger": { "type": "string" },
                                "triggerDateTime": { "type": "string" }
                            },
                            "required": ["method"]
                        }
                    },
                    "video_meeting_url": { "type": "string" },
                    "send_notification": { "type": "boolean", "default": true }
                }),
                &["summary", "start_datetime", "end_datetime"],
            ),
            Self::DeleteDefaultCalendarEvent => object_schema(
                json!({ "eventId": { "type": "string" } }),
                &["eventId"],
            ),
            Self::GetCalendarPersonalUserList => object_schema(
                json!({
                    "count": { "type": "integer", "minimum": 1, "maximum": 50, "default": 50 },
                    "cursor": { "type": "string", "default": "" }
                }),
                &[],
            ),
            Self::DeleteCalendar => object_schema(
                json!({ "calendarId": { "type": "string" } }),
                &["calendarId"],
            ),
            Self::CreateCalendar => object_schema(
                json!({
                    "calendarName": {
                        "type": "string",
                        "minLength": 1,
                        "maxLength": calendars::CALENDAR_NAME_MAX_CHARS
                    },
                    "description": {
                        "type": "string",
                        "maxLength": calendars::DESCRIPTION_MAX_CHARS,
                        "default": ""
                    },
                    "members": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": { "type": "string" },
                                "type": { "type": "string", "enum": calendars::MEMBER_TYPES },
                                "role": { "type": "string", "enum": calendars::MEMBER_ROLES }
                            },
                            "required": ["id", "type", "role"]
                        }
                    },
                    "isPublic": { "type": "boolean", "default": false }
                }),
                &["calendarName"],
            ),
        }
    }

    #[must_use]
    pub fn to_tool(self) -> Tool {
        let schema = match self.input_schema() {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        let mut tool = Tool::new(self.name(), self.description(), Arc::new(schema));
        tool.annotations = Some(annotations_for_method(&self.method(), self.title()));
        tool
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// The Works tool surface bound to one API client.
#[derive(Clone)]
pub struct WorksToolSource {
    client: WorksClient,
}

impl WorksToolSource {
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(config: WorksApiConfig) -> Result<Self> {
        Ok(Self::with_client(WorksClient::new(config)?))
    }

    #[must_use]
    pub fn with_client(client: WorksClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &WorksClient {
        &self.client
    }

    /// List the MCP `Tool`s exposed by this source.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        WorksTool::ALL.into_iter().map(WorksTool::to_tool).collect()
    }

    /// Run `tool` with raw JSON `arguments` and return its JSON output.
    ///
    /// # Errors
    ///
    /// Validation errors for malformed arguments; `Http`/`Transport` errors from the call.
    pub async fn invoke(&self, tool: WorksTool, arguments: Value) -> Result<Value> {
        let client = &self.client;
        let name = tool.name();
        match tool {
            WorksTool::GetMyTasks => tasks::get_my_tasks(client, parse_args(name, arguments)?).await,
            WorksTool::DeleteMyTask => {
                tasks::delete_my_task(client, parse_args(name, arguments)?).await
            }
            WorksTool::CreateMyTask => {
                tasks::create_my_task(client, parse_args(name, arguments)?).await
            }
            WorksTool::GetMyCategories => tasks::get_my_categories(client).await,
            WorksTool::DeleteMyCategory => {
                tasks::delete_my_category(client, parse_args(name, arguments)?).await
            }
            WorksTool::GetDefaultCalendarEvents => {
                events::get_default_calendar_events(client, parse_args(name, arguments)?).await
            }
            WorksTool::CreateDefaultCalendarEvent => {
                events::create_default_calendar_event(client, parse_args(name, arguments)?).await
            }
            WorksTool::DeleteDefaultCalendarEvent => {
                events::delete_default_calendar_event(client, parse_args(name, arguments)?).await
            }
            WorksTool::GetCalendarPersonalUserList => {
                calendars::get_calendar_personal_user_list(client, parse_args(name, arguments)?)
                    .await
            }
            WorksTool::DeleteCalendar => {
                calendars::delete_calendar(client, parse_args(name, arguments)?).await
            }
            WorksTool::CreateCalendar => {
                calendars::create_calendar(client, parse_args(name, arguments)?).await
            }
        }
    }

    /// Execute a tool call by name.
    ///
    /// Tool failures (validation, remote status, transport) come back as a result with
    /// `isError: true` and the error message as text.
    ///
    /// # Errors
    ///
    /// Returns [`WorksToolsError::UnknownTool`] if no tool has this name.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<CallToolResult> {
        let tool = WorksTool::from_name(tool_name)
            .ok_or_else(|| WorksToolsError::UnknownTool(tool_name.to_string()))?;

        match self.invoke(tool, arguments).await {
            Ok(output) => {
                info!(tool = tool_name, "tool call succeeded");
                let text = serde_json::to_string(&output).unwrap_or_else(|_| output.to_string());
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => {
                warn!(tool = tool_name, status = ?e.status(), error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_round_trip_and_are_unique() {
        let names: HashSet<_> = WorksTool::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), WorksTool::ALL.len());
        for tool in WorksTool::ALL {
            assert_eq!(WorksTool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(WorksTool::from_name("get_my_task"), None);
    }

    #[test]
    fn schemas_list_required_fields_that_exist() {
        for tool in WorksTool::ALL {
            let schema = tool.input_schema();
            assert_eq!(schema["type"], "object", "{}", tool.name());
            let props = schema["properties"].as_object().expect("properties");
            for req in schema["required"].as_array().expect("required") {
                let req = req.as_str().expect("string");
                assert!(props.contains_key(req), "{} requires unknown {req}", tool.name());
            }
        }
    }

    #[test]
    fn tools_carry_method_annotations() {
        let source = WorksToolSource::new(
            WorksApiConfig::new("http://127.0.0.1:9/v1.0", "t").expect("config"),
        )
        .expect("source");
        let tools = source.list_tools();
        assert_eq!(tools.len(), 11);

        let by_name = |n: &str| {
            tools
                .iter()
                .find(|t| t.name == n)
                .and_then(|t| t.annotations.clone())
                .expect("annotated")
        };
        assert_eq!(by_name("get_my_tasks").read_only_hint, Some(true));
        assert_eq!(by_name("create_calendar").idempotent_hint, Some(false));
        assert_eq!(by_name("delete_calendar").destructive_hint, Some(true));
    }

    #[test]
    fn enums_in_schema_match_validation_sets() {
        let schema = WorksTool::GetMyTasks.input_schema();
        assert_eq!(schema["properties"]["status"]["enum"], json!(["TODO", "ALL"]));
        let schema = WorksTool::CreateCalendar.input_schema();
        assert_eq!(schema["properties"]["calendarName"]["maxLength"], 50);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_and_bad_args_are_tool_errors() {
        let source = WorksToolSource::new(
            WorksApiConfig::new("http://127.0.0.1:9/v1.0", "t").expect("config"),
        )
        .expect("source");

        let err = source.call_tool("nope", json!({})).await.expect_err("unknown");
        assert!(matches!(err, WorksToolsError::UnknownTool(_)));

        // Fails validation before any connection attempt.
        let result = source
            .call_tool("get_my_tasks", json!({"categoryId": "c", "count": 101}))
            .await
            .expect("tool result");
        assert_eq!(result.is_error, Some(true));

        let result = source
            .call_tool("delete_calendar", json!({"calendarId": 7}))
            .await
            .expect("tool result");
        assert_eq!(result.is_error, Some(true));
    }
}
