//! Task and task-category tools.

use crate::client::WorksClient;
use crate::error::{Result, WorksToolsError};
use crate::request::{ApiRequest, path_segment};
use crate::response;
use crate::validation::{calendar_date, in_range, one_of, optional_str, required_str};
use serde::Deserialize;
use serde_json::{Value, json};

pub const TASK_STATUSES: &[&str] = &["TODO", "ALL"];
pub const SEARCH_FILTER_TYPES: &[&str] = &["ALL", "ASSIGNEE", "ASSIGNOR"];
pub const COMPLETION_CONDITIONS: &[&str] = &["ANY_ONE", "MUST_ALL"];
pub const ASSIGNEE_STATUSES: &[&str] = &["TODO", "DONE"];

const DEFAULT_TASK_COUNT: i64 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMyTasksArgs {
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::lenient_int")]
    pub count: Option<i64>,
    pub status: Option<String>,
    pub search_filter_type: Option<String>,
}

/// `GET /users/me/tasks`.
///
/// # Errors
///
/// Returns a validation error for a blank `categoryId`, a `count` outside 0-100, or an unknown
/// `status` / `searchFilterType`.
pub fn get_my_tasks_request(args: &GetMyTasksArgs) -> Result<ApiRequest> {
    let category_id = required_str("categoryId", args.category_id.as_deref())?;
    let count = in_range("count", args.count.unwrap_or(DEFAULT_TASK_COUNT), 0..=100)?;
    let status = one_of("status", args.status.as_deref().unwrap_or("TODO"), TASK_STATUSES)?;
    let filter = one_of(
        "searchFilterType",
        args.search_filter_type.as_deref().unwrap_or("ALL"),
        SEARCH_FILTER_TYPES,
    )?;

    Ok(ApiRequest::get("/users/me/tasks")
        .query("categoryId", category_id)
        .query("count", count)
        .query("status", status)
        .query("searchFilterType", filter))
}

/// List my tasks; returns the remote body verbatim.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn get_my_tasks(client: &WorksClient, args: GetMyTasksArgs) -> Result<Value> {
    let request = get_my_tasks_request(&args)?;
    Ok(client.execute(request).await?.body)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMyTaskArgs {
    pub task_id: Option<String>,
}

/// `DELETE /tasks/{taskId}`.
///
/// # Errors
///
/// Returns a validation error for a blank `taskId`.
pub fn delete_my_task_request(args: &DeleteMyTaskArgs) -> Result<ApiRequest> {
    delete_my_task_target(args).map(|(_, request)| request)
}

fn delete_my_task_target(args: &DeleteMyTaskArgs) -> Result<(&str, ApiRequest)> {
    let task_id = required_str("taskId", args.task_id.as_deref())?;
    let request = ApiRequest::delete(format!("/tasks/{}", path_segment(task_id)));
    Ok((task_id, request))
}

/// Delete a task and report `{success, message, status_code, task_id}`.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn delete_my_task(client: &WorksClient, args: DeleteMyTaskArgs) -> Result<Value> {
    let (task_id, request) = delete_my_task_target(&args)?;
    let resp = client.execute(request).await?;
    Ok(response::deleted(
        format!("Task {task_id} deleted successfully"),
        "task_id",
        task_id,
        &resp,
    ))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMyTaskArgs {
    pub assignor_id: Option<String>,
    /// Kept untyped so malformed entries get a per-index error message.
    pub assignees: Option<Value>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub due_date: Option<String>,
    pub completion_condition: Option<String>,
    pub category_id: Option<String>,
}

/// `POST /users/me/tasks`.
///
/// # Errors
///
/// Returns a validation error for blank required fields, an empty or malformed assignee list, an
/// unknown completion condition, or a `dueDate` that is not `YYYY-MM-DD`.
pub fn create_my_task_request(args: &CreateMyTaskArgs) -> Result<ApiRequest> {
    let assignor_id = required_str("assignorId", args.assignor_id.as_deref())?;
    let assignees = validate_assignees(args.assignees.as_ref())?;
    let title = required_str("title", args.title.as_deref())?;
    let content = required_str("content", args.content.as_deref())?;
    let completion_condition = one_of(
        "completionCondition",
        args.completion_condition.as_deref().unwrap_or("ANY_ONE"),
        COMPLETION_CONDITIONS,
    )?;

    let mut body = json!({
        "assignorId": assignor_id,
        "assignees": assignees,
        "title": title,
        "content": content,
        "completionCondition": completion_condition,
    });

    if let Some(due_date) = args.due_date.as_deref().filter(|d| !d.is_empty()) {
        calendar_date("dueDate", due_date)?;
        body["dueDate"] = json!(due_date);
    }
    if let Some(category_id) = optional_str(args.category_id.as_deref()) {
        body["categoryId"] = json!(category_id);
    }

    Ok(ApiRequest::post("/users/me/tasks", body))
}

fn validate_assignees(assignees: Option<&Value>) -> Result<Vec<Value>> {
    let Some(list) = assignees.and_then(Value::as_array).filter(|l| !l.is_empty()) else {
        return Err(WorksToolsError::validation(
            "assignees must be a non-empty list",
        ));
    };

    list.iter()
        .enumerate()
        .map(|(i, assignee)| {
            let Some(obj) = assignee.as_object() else {
                return Err(WorksToolsError::validation(format!(
                    "assignee at index {i} must be an object"
                )));
            };
            let (Some(id), Some(status)) = (obj.get("assigneeId"), obj.get("status")) else {
                return Err(WorksToolsError::validation(format!(
                    "assignee at index {i} must have 'assigneeId' and 'status'"
                )));
            };
            let id = id
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    WorksToolsError::validation(format!(
                        "assignee at index {i} must have a valid assigneeId"
                    ))
                })?;
            let status = status
                .as_str()
                .filter(|s| ASSIGNEE_STATUSES.contains(s))
                .ok_or_else(|| {
                    WorksToolsError::validation(format!(
                        "assignee at index {i} 'status' must be 'TODO' or 'DONE'"
                    ))
                })?;
            Ok(json!({ "assigneeId": id, "status": status }))
        })
        .collect()
}

/// Create a task and wrap the created resource in the write envelope.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn create_my_task(client: &WorksClient, args: CreateMyTaskArgs) -> Result<Value> {
    let request = create_my_task_request(&args)?;
    let resp = client.execute(request).await?;
    Ok(response::created("Task created successfully", resp))
}

/// `GET /users/me/task-categories`.
#[must_use]
pub fn get_my_categories_request() -> ApiRequest {
    ApiRequest::get("/users/me/task-categories")
}

/// List my task categories, unwrapped from the `taskCategories` container.
///
/// # Errors
///
/// `Http`/`Transport` errors from the call; a validation error if the body has no
/// `taskCategories` key.
pub async fn get_my_categories(client: &WorksClient) -> Result<Value> {
    let resp = client.execute(get_my_categories_request()).await?;
    response::unwrap_key(resp.body, "taskCategories")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMyCategoryArgs {
    pub category_id: Option<String>,
}

/// `DELETE /users/me/task-categories/{categoryId}`.
///
/// # Errors
///
/// Returns a validation error for a blank `categoryId`.
pub fn delete_my_category_request(args: &DeleteMyCategoryArgs) -> Result<ApiRequest> {
    delete_my_category_target(args).map(|(_, request)| request)
}

fn delete_my_category_target(args: &DeleteMyCategoryArgs) -> Result<(&str, ApiRequest)> {
    let category_id = required_str("categoryId", args.category_id.as_deref())?;
    let request = ApiRequest::delete(format!(
        "/users/me/task-categories/{}",
        path_segment(category_id)
    ));
    Ok((category_id, request))
}

/// Delete a task category.
///
/// The deleted id is echoed under `event_id`, which is the key existing callers read.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn delete_my_category(
    client: &WorksClient,
    args: DeleteMyCategoryArgs,
) -> Result<Value> {
    let (category_id, request) = delete_my_category_target(&args)?;
    let resp = client.execute(request).await?;
    Ok(response::deleted(
        format!("category {category_id} deleted successfully"),
        "event_id",
        category_id,
        &resp,
    ))
}
