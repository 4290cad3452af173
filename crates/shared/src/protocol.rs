use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::domain::{EventId, OrganizerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: OrganizerId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Events are decoded leniently: one odd record must not make the whole
/// list undecodable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// `None` when the backend stored no usable number (e.g. `null`).
    #[serde(default)]
    pub capacity: Option<Number>,
    pub organizer_id: OrganizerId,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /organizers`. The draft is sent as-is, so an unset
/// organization travels as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrganizerRequest {
    pub name: String,
    pub email: String,
    pub organization: String,
}

/// Body of `POST /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    /// `None` is a capacity that did not coerce to a number; it is still sent
    /// (as `null`) and left for the backend to reject.
    pub capacity: Option<Number>,
    pub organizer_id: OrganizerId,
}

/// Body of `POST /events/{event_id}/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub participant_name: String,
    pub participant_email: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn event_decodes_without_description() {
        let event: Event = serde_json::from_value(json!({
            "id": 3,
            "title": "Finals",
            "capacity": 50,
            "organizer_id": 1
        }))
        .expect("event");
        assert_eq!(event.id, EventId::new("3"));
        assert_eq!(event.organizer_id, OrganizerId::new("1"));
        assert!(event.description.is_empty());
    }

    #[test]
    fn event_list_tolerates_null_description_and_odd_capacities() {
        let events: Vec<Event> = serde_json::from_value(json!([
            { "id": "evt-1", "title": "Heats", "description": null, "capacity": 5_000_000_000u64, "organizer_id": 1 },
            { "id": "evt-2", "title": "Finals", "description": "", "capacity": null, "organizer_id": 1 },
            { "id": "evt-3", "title": "Relay", "capacity": 2.5, "organizer_id": 2 }
        ]))
        .expect("whole list decodes");
        assert_eq!(events.len(), 3);
        assert!(events[0].description.is_empty());
        assert_eq!(events[0].capacity, Some(Number::from(5_000_000_000u64)));
        assert_eq!(events[1].capacity, None);
        assert_eq!(events[2].capacity, Number::from_f64(2.5));
    }

    #[test]
    fn uncoercible_capacity_is_sent_as_null() {
        let body = CreateEventRequest {
            title: "Finals".into(),
            description: String::new(),
            capacity: None,
            organizer_id: OrganizerId::new("org-1"),
        };
        let value = serde_json::to_value(&body).expect("encode");
        assert_eq!(value["capacity"], serde_json::Value::Null);
        assert_eq!(value["organizer_id"], json!("org-1"));
    }
}
