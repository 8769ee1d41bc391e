//! Calendar tools.

use crate::client::WorksClient;
use crate::error::{Result, WorksToolsError};
use crate::request::{ApiRequest, path_segment};
use crate::response;
use crate::validation::{in_range, max_chars, one_of, optional_str, required_str};
use serde::Deserialize;
use serde_json::{Value, json};

pub const MEMBER_TYPES: &[&str] = &["USER", "GROUP", "ORGUNIT"];
pub const MEMBER_ROLES: &[&str] = &[
    "CALENDAR_EVENT_READ_WRITE",
    "EVENT_READ_WRITE",
    "EVENT_READ",
    "EVENT_READ_FREE_BUSY",
];

pub const CALENDAR_NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

const DEFAULT_PERSONAL_COUNT: i64 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetCalendarPersonalUserListArgs {
    #[serde(default, deserialize_with = "crate::validation::lenient_int")]
    pub count: Option<i64>,
    pub cursor: Option<String>,
}

/// `GET /users/me/calendar-personals?count[&cursor]`.
///
/// The cursor is passed through literally; no pagination loop is run.
///
/// # Errors
///
/// Returns a validation error for a `count` outside 1-50.
pub fn get_calendar_personal_user_list_request(
    args: &GetCalendarPersonalUserListArgs,
) -> Result<ApiRequest> {
    let count = in_range("count", args.count.unwrap_or(DEFAULT_PERSONAL_COUNT), 1..=50)?;
    let mut request = ApiRequest::get("/users/me/calendar-personals").query("count", count);
    if let Some(cursor) = optional_str(args.cursor.as_deref()) {
        request = request.query("cursor", cursor);
    }
    Ok(request)
}

/// List calendar personal properties; returns the remote body verbatim.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn get_calendar_personal_user_list(
    client: &WorksClient,
    args: GetCalendarPersonalUserListArgs,
) -> Result<Value> {
    let request = get_calendar_personal_user_list_request(&args)?;
    Ok(client.execute(request).await?.body)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCalendarArgs {
    pub calendar_id: Option<String>,
}

/// `DELETE /calendars/{calendarId}`.
///
/// # Errors
///
/// Returns a validation error for a blank `calendarId`.
pub fn delete_calendar_request(args: &DeleteCalendarArgs) -> Result<ApiRequest> {
    delete_calendar_target(args).map(|(_, request)| request)
}

fn delete_calendar_target(args: &DeleteCalendarArgs) -> Result<(&str, ApiRequest)> {
    let calendar_id = required_str("calendarId", args.calendar_id.as_deref())?;
    let request = ApiRequest::delete(format!("/calendars/{}", path_segment(calendar_id)));
    Ok((calendar_id, request))
}

/// Delete a calendar.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn delete_calendar(client: &WorksClient, args: DeleteCalendarArgs) -> Result<Value> {
    let (calendar_id, request) = delete_calendar_target(&args)?;
    let resp = client.execute(request).await?;
    Ok(response::deleted(
        format!("Calendar {calendar_id} deleted successfully"),
        "calendar_id",
        calendar_id,
        &resp,
    ))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarArgs {
    pub calendar_name: Option<String>,
    pub description: Option<String>,
    /// Kept untyped so each malformed member gets its own error message.
    pub members: Option<Value>,
    pub is_public: Option<bool>,
}

/// `POST /calendars`.
///
/// # Errors
///
/// Returns a validation error for a blank or over-long name, an over-long description, or a
/// member that lacks `id`/`type`/`role` or uses a type/role outside the fixed sets.
pub fn create_calendar_request(args: &CreateCalendarArgs) -> Result<ApiRequest> {
    let calendar_name = required_str("calendarName", args.calendar_name.as_deref())?;
    max_chars("calendarName", calendar_name, CALENDAR_NAME_MAX_CHARS)?;

    let description = args.description.as_deref().map(str::trim).unwrap_or_default();
    max_chars("description", description, DESCRIPTION_MAX_CHARS)?;

    let members = validate_members(args.members.as_ref())?;

    Ok(ApiRequest::post(
        "/calendars",
        json!({
            "calendarName": calendar_name,
            "description": description,
            "members": members,
            "isPublic": args.is_public.unwrap_or(false),
        }),
    ))
}

fn validate_members(members: Option<&Value>) -> Result<Vec<Value>> {
    let list = match members {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(list)) => list,
        Some(_) => {
            return Err(WorksToolsError::validation("members must be a list"));
        }
    };

    list.iter()
        .enumerate()
        .map(|(i, member)| {
            let field = |key: &str| member.get(key).and_then(Value::as_str);
            let (Some(id), Some(kind), Some(role)) = (
                field("id").map(str::trim).filter(|s| !s.is_empty()),
                field("type"),
                field("role"),
            ) else {
                return Err(WorksToolsError::validation(format!(
                    "member at index {i} must have 'id', 'type', and 'role'"
                )));
            };
            let kind = one_of(&format!("members[{i}].type"), kind, MEMBER_TYPES)?;
            let role = one_of(&format!("members[{i}].role"), role, MEMBER_ROLES)?;
            Ok(json!({ "id": id, "type": kind, "role": role }))
        })
        .collect()
}

/// Create a calendar; returns the created calendar verbatim.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn create_calendar(client: &WorksClient, args: CreateCalendarArgs) -> Result<Value> {
    let request = create_calendar_request(&args)?;
    Ok(client.execute(request).await?.body)
}
