//! Default-calendar event tools.

use crate::client::WorksClient;
use crate::error::Result;
use crate::request::{ApiRequest, path_segment};
use crate::response;
use crate::validation::{in_range, iso_datetime, one_of, optional_str, required_str};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
pub const VISIBILITIES: &[&str] = &["PUBLIC", "PRIVATE"];
pub const TRANSPARENCIES: &[&str] = &["OPAQUE", "TRANSPARENT"];
pub const REMINDER_METHODS: &[&str] = &["DISPLAY", "EMAIL"];

/// Event creation is the only call with an explicit deadline.
pub const CREATE_EVENT_TIMEOUT: Duration = Duration::from_secs(30);

const EVENTS_PATH: &str = "/users/me/calendar/events";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDefaultCalendarEventsArgs {
    pub from_date_time: Option<String>,
    pub until_date_time: Option<String>,
}

/// `GET /users/me/calendar/events?fromDateTime&untilDateTime`.
///
/// Offsets like `+09:00` are sent with `+` encoded as `%2B`.
///
/// # Errors
///
/// Returns a validation error if either bound is missing or not ISO-8601.
pub fn get_default_calendar_events_request(
    args: &GetDefaultCalendarEventsArgs,
) -> Result<ApiRequest> {
    let from = required_str("fromDateTime", args.from_date_time.as_deref())?;
    let until = required_str("untilDateTime", args.until_date_time.as_deref())?;
    iso_datetime("fromDateTime", from)?;
    iso_datetime("untilDateTime", until)?;

    Ok(ApiRequest::get(EVENTS_PATH)
        .query("fromDateTime", from)
        .query("untilDateTime", until))
}

/// List events of the default calendar in a time window; returns the remote body verbatim.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn get_default_calendar_events(
    client: &WorksClient,
    args: GetDefaultCalendarEventsArgs,
) -> Result<Value> {
    let request = get_default_calendar_events_request(&args)?;
    Ok(client.execute(request).await?.body)
}

/// Caller-facing arguments use snake_case; the remote body uses camelCase.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDefaultCalendarEventArgs {
    pub summary: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub timezone: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_id: Option<String>,
    pub category_id: Option<String>,
    /// Untyped: malformed entries are dropped, not rejected.
    pub attendees: Option<Vec<Value>>,
    pub visibility: Option<String>,
    pub transparency: Option<String>,
    #[serde(default, deserialize_with = "crate::validation::lenient_int")]
    pub priority: Option<i64>,
    pub recurrence: Option<Vec<String>>,
    /// Untyped: malformed entries are dropped, not rejected.
    pub reminders: Option<Vec<Value>>,
    pub video_meeting_url: Option<String>,
    pub send_notification: Option<bool>,
}

/// `POST /users/me/calendar/events` with a 30 second timeout.
///
/// # Errors
///
/// Returns a validation error for a blank summary, non-ISO start/end, an unknown visibility or
/// transparency, or a priority outside 0-9.
pub fn create_default_calendar_event_request(
    args: &CreateDefaultCalendarEventArgs,
) -> Result<ApiRequest> {
    let summary = required_str("summary", args.summary.as_deref())?;
    let start = required_str("start_datetime", args.start_datetime.as_deref())?;
    let end = required_str("end_datetime", args.end_datetime.as_deref())?;
    iso_datetime("start_datetime", start)?;
    iso_datetime("end_datetime", end)?;

    let timezone = optional_str(args.timezone.as_deref()).unwrap_or(DEFAULT_TIMEZONE);
    let visibility = one_of(
        "visibility",
        args.visibility.as_deref().unwrap_or("PUBLIC"),
        VISIBILITIES,
    )?;
    let transparency = one_of(
        "transparency",
        args.transparency.as_deref().unwrap_or("OPAQUE"),
        TRANSPARENCIES,
    )?;
    let priority = in_range("priority", args.priority.unwrap_or(0), 0..=9)?;

    let mut event = json!({
        "summary": summary,
        "start": { "dateTime": start, "timeZone": timezone },
        "end": { "dateTime": end, "timeZone": timezone },
        "visibility": visibility,
        "transparency": transparency,
        "priority": priority,
    });

    for (key, value) in [
        ("eventId", &args.event_id),
        ("description", &args.description),
        ("location", &args.location),
        ("categoryId", &args.category_id),
    ] {
        if let Some(v) = optional_str(value.as_deref()) {
            event[key] = json!(v);
        }
    }

    if let Some(recurrence) = args.recurrence.as_ref().filter(|r| !r.is_empty()) {
        event["recurrence"] = json!(recurrence);
    }

    let attendees = args
        .attendees
        .as_deref()
        .map(normalize_attendees)
        .unwrap_or_default();
    if !attendees.is_empty() {
        event["attendees"] = Value::Array(attendees);
    }

    if let Some(url) = optional_str(args.video_meeting_url.as_deref()) {
        event["videoMeeting"] = json!({ "url": url });
    }

    let reminders = args
        .reminders
        .as_deref()
        .map(normalize_reminders)
        .unwrap_or_default();
    if !reminders.is_empty() {
        event["reminders"] = Value::Array(reminders);
    }

    let body = json!({
        "eventComponents": [event],
        "sendNotification": args.send_notification.unwrap_or(true),
    });

    Ok(ApiRequest::post(EVENTS_PATH, body).timeout(CREATE_EVENT_TIMEOUT))
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Keep attendees that carry an `email` or an `id`, filling in participation defaults.
fn normalize_attendees(attendees: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(attendees.len());
    for (i, attendee) in attendees.iter().enumerate() {
        let Some(obj) = attendee.as_object() else {
            warn!(index = i, "dropping attendee: not an object");
            continue;
        };
        let email = non_empty_str(obj, "email");
        let id = non_empty_str(obj, "id");
        if email.is_none() && id.is_none() {
            warn!(index = i, "dropping attendee: neither email nor id");
            continue;
        }

        let mut normalized = json!({
            "partstat": obj.get("partstat").and_then(Value::as_str).unwrap_or("NEEDS-ACTION"),
            "isOptional": obj.get("isOptional").and_then(Value::as_bool).unwrap_or(false),
            "isResource": obj.get("isResource").and_then(Value::as_bool).unwrap_or(false),
        });
        if let Some(email) = email {
            normalized["email"] = json!(email);
        }
        if let Some(id) = id {
            normalized["id"] = json!(id);
        }
        for key in ["displayName", "resourceValue"] {
            if let Some(v) = non_empty_str(obj, key) {
                normalized[key] = json!(v);
            }
        }
        out.push(normalized);
    }
    out
}

/// Keep reminders with a known method; `trigger` wins over `triggerDateTime`.
fn normalize_reminders(reminders: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(reminders.len());
    for (i, reminder) in reminders.iter().enumerate() {
        let Some(obj) = reminder.as_object() else {
            warn!(index = i, "dropping reminder: not an object");
            continue;
        };
        let Some(method) = obj
            .get("method")
            .and_then(Value::as_str)
            .filter(|m| REMINDER_METHODS.contains(m))
        else {
            warn!(index = i, "dropping reminder: unsupported method");
            continue;
        };

        let mut normalized = json!({ "method": method });
        if let Some(trigger) = non_empty_str(obj, "trigger") {
            normalized["trigger"] = json!(trigger);
        } else if let Some(at) = non_empty_str(obj, "triggerDateTime") {
            normalized["triggerDateTime"] = json!(at);
        }
        out.push(normalized);
    }
    out
}

/// Create an event in the default calendar and wrap the result in the write envelope.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn create_default_calendar_event(
    client: &WorksClient,
    args: CreateDefaultCalendarEventArgs,
) -> Result<Value> {
    let request = create_default_calendar_event_request(&args)?;
    let resp = client.execute(request).await?;
    Ok(response::created("Event created successfully", resp))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDefaultCalendarEventArgs {
    pub event_id: Option<String>,
}

/// `DELETE /users/me/calendar/events/{eventId}`.
///
/// # Errors
///
/// Returns a validation error for a blank `eventId`.
pub fn delete_default_calendar_event_request(
    args: &DeleteDefaultCalendarEventArgs,
) -> Result<ApiRequest> {
    delete_default_calendar_event_target(args).map(|(_, request)| request)
}

fn delete_default_calendar_event_target(
    args: &DeleteDefaultCalendarEventArgs,
) -> Result<(&str, ApiRequest)> {
    let event_id = required_str("eventId", args.event_id.as_deref())?;
    let request = ApiRequest::delete(format!("{EVENTS_PATH}/{}", path_segment(event_id)));
    Ok((event_id, request))
}

/// Delete an event from the default calendar.
///
/// # Errors
///
/// Validation errors before the call; `Http`/`Transport` errors from the call.
pub async fn delete_default_calendar_event(
    client: &WorksClient,
    args: DeleteDefaultCalendarEventArgs,
) -> Result<Value> {
    let (event_id, request) = delete_default_calendar_event_target(&args)?;
    let resp = client.execute(request).await?;
    Ok(response::deleted(
        format!("Event {event_id} deleted successfully"),
        "event_id",
        event_id,
        &resp,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn event_args(start: &str, end: &str) -> CreateDefaultCalendarEventArgs {
        CreateDefaultCalendarEventArgs {
            summary: Some(" Team meeting ".to_string()),
            start_datetime: Some(start.to_string()),
            end_datetime: Some(end.to_string()),
            ..CreateDefaultCalendarEventArgs::default()
        }
    }

    fn first_event(req: &ApiRequest) -> &Value {
        &req.body.as_ref().expect("body")["eventComponents"][0]
    }

    #[test]
    fn get_events_requires_both_bounds() {
        let err = get_default_calendar_events_request(&GetDefaultCalendarEventsArgs {
            from_date_time: Some("2024-01-01T00:00:00+09:00".to_string()),
            until_date_time: None,
        })
        .expect_err("missing until");
        assert!(err.to_string().contains("untilDateTime"));
    }

    #[test]
    fn get_events_rejects_non_iso_bounds() {
        assert!(
            get_default_calendar_events_request(&GetDefaultCalendarEventsArgs {
                from_date_time: Some("yesterday".to_string()),
                until_date_time: Some("2024-01-02T00:00:00+09:00".to_string()),
            })
            .is_err()
        );
    }

    #[test]
    fn get_events_keeps_raw_offsets_for_the_encoder() {
        let req = get_default_calendar_events_request(&GetDefaultCalendarEventsArgs {
            from_date_time: Some("2024-01-01T00:00:00+09:00".to_string()),
            until_date_time: Some("2024-01-31T23:59:59+09:00".to_string()),
        })
        .expect("valid");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.query_value("fromDateTime"), Some("2024-01-01T00:00:00+09:00"));
    }

    #[test]
    fn create_event_rejects_non_iso_datetimes() {
        for (start, end) in [
            ("2024/01/15 14:00", "2024-01-15T15:00:00"),
            ("2024-01-15T14:00:00", "3pm"),
            ("", "2024-01-15T15:00:00"),
        ] {
            assert!(
                create_default_calendar_event_request(&event_args(start, end)).is_err(),
                "{start} / {end}"
            );
        }
    }

    #[test]
    fn create_event_builds_start_end_with_timezone() {
        let mut args = event_args("2024-01-15T14:00:00", "2024-01-15T15:00:00");
        args.timezone = Some("Europe/Helsinki".to_string());
        let req = create_default_calendar_event_request(&args).expect("valid");

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/users/me/calendar/events");
        assert_eq!(req.timeout, Some(CREATE_EVENT_TIMEOUT));

        let event = first_event(&req);
        assert_eq!(event["summary"], "Team meeting");
        assert_eq!(event["start"]["dateTime"], "2024-01-15T14:00:00");
        assert_eq!(event["end"]["dateTime"], "2024-01-15T15:00:00");
        assert_eq!(event["start"]["timeZone"], "Europe/Helsinki");
        assert_eq!(event["end"]["timeZone"], "Europe/Helsinki");
    }

    #[test]
    fn create_event_applies_defaults_and_omits_empty_optionals() {
        let mut args = event_args("2024-01-15T14:00:00", "2024-01-15T15:00:00");
        args.description = Some("   ".to_string());
        args.recurrence = Some(Vec::new());
        let req = create_default_calendar_event_request(&args).expect("valid");

        let body = req.body.as_ref().expect("body");
        assert_eq!(body["sendNotification"], true);
        let event = first_event(&req);
        assert_eq!(event["start"]["timeZone"], DEFAULT_TIMEZONE);
        assert_eq!(event["visibility"], "PUBLIC");
        assert_eq!(event["transparency"], "OPAQUE");
        assert_eq!(event["priority"], 0);
        for absent in [
            "description",
            "location",
            "eventId",
            "categoryId",
            "recurrence",
            "attendees",
            "reminders",
            "videoMeeting",
        ] {
            assert!(event.get(absent).is_none(), "{absent} should be omitted");
        }
    }

    #[test]
    fn create_event_renames_optional_fields() {
        let mut args = event_args("2024-01-15T14:00:00+09:00", "2024-01-15T15:00:00+09:00");
        args.event_id = Some(" evt-1 ".to_string());
        args.category_id = Some("cat".to_string());
        args.location = Some("Room A".to_string());
        args.video_meeting_url = Some("https://meet.example/abc".to_string());
        args.recurrence = Some(vec!["RRULE:FREQ=WEEKLY".to_string()]);
        args.send_notification = Some(false);
        let req = create_default_calendar_event_request(&args).expect("valid");

        let event = first_event(&req);
        assert_eq!(event["eventId"], "evt-1");
        assert_eq!(event["categoryId"], "cat");
        assert_eq!(event["location"], "Room A");
        assert_eq!(event["videoMeeting"], json!({"url": "https://meet.example/abc"}));
        assert_eq!(event["recurrence"], json!(["RRULE:FREQ=WEEKLY"]));
        assert_eq!(req.body.as_ref().expect("body")["sendNotification"], false);
    }

    #[test]
    fn create_event_validates_enumerations_and_priority() {
        let mut args = event_args("2024-01-15T14:00:00", "2024-01-15T15:00:00");
        args.visibility = Some("SECRET".to_string());
        assert!(create_default_calendar_event_request(&args).is_err());

        let mut args = event_args("2024-01-15T14:00:00", "2024-01-15T15:00:00");
        args.transparency = Some("BUSY".to_string());
        assert!(create_default_calendar_event_request(&args).is_err());

        let mut args = event_args("2024-01-15T14:00:00", "2024-01-15T15:00:00");
        args.priority = Some(10);
        assert!(create_default_calendar_event_request(&args).is_err());
    }

    #[test]
    fn attendees_without_email_or_id_are_dropped() {
        let out = normalize_attendees(&[
            json!({"email": "a@example.com", "displayName": "Kim"}),
            json!({"displayName": "nobody"}),
            json!({"email": "", "id": ""}),
            json!("b@example.com"),
            json!({"id": "u-2", "partstat": "ACCEPTED", "isOptional": true}),
        ]);
        assert_eq!(
            out,
            vec![
                json!({
                    "email": "a@example.com",
                    "displayName": "Kim",
                    "partstat": "NEEDS-ACTION",
                    "isOptional": false,
                    "isResource": false
                }),
                json!({
                    "id": "u-2",
                    "partstat": "ACCEPTED",
                    "isOptional": true,
                    "isResource": false
                }),
            ]
        );
    }

    #[test]
    fn reminders_with_unknown_method_are_dropped() {
        let out = normalize_reminders(&[
            json!({"method": "DISPLAY", "trigger": "-PT10M", "triggerDateTime": "ignored"}),
            json!({"method": "SMS", "trigger": "-PT5M"}),
            json!({"trigger": "-PT5M"}),
            json!({"method": "EMAIL", "triggerDateTime": "2024-01-15T13:00:00"}),
            json!(42),
        ]);
        assert_eq!(
            out,
            vec![
                json!({"method": "DISPLAY", "trigger": "-PT10M"}),
                json!({"method": "EMAIL", "triggerDateTime": "2024-01-15T13:00:00"}),
            ]
        );
    }

    #[test]
    fn all_malformed_attendees_leave_the_field_out() {
        let mut args = event_args("2024-01-15T14:00:00", "2024-01-15T15:00:00");
        args.attendees = Some(vec![json!({"displayName": "x"})]);
        args.reminders = Some(vec![json!({"method": "PUSH"})]);
        let req = create_default_calendar_event_request(&args).expect("valid");
        let event = first_event(&req);
        assert!(event.get("attendees").is_none());
        assert!(event.get("reminders").is_none());
    }

    #[test]
    fn delete_event_requires_id() {
        assert!(
            delete_default_calendar_event_request(&DeleteDefaultCalendarEventArgs::default())
                .is_err()
        );
        let req = delete_default_calendar_event_request(&DeleteDefaultCalendarEventArgs {
            event_id: Some("e1".to_string()),
        })
        .expect("valid");
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.path, "/users/me/calendar/events/e1");
    }
}
