//! Uncommitted drafts, selection refs and the actions that edit them.

use serde_json::Number;
use shared::{
    domain::{EventId, OrganizerId},
    protocol::{CreateEventRequest, CreateOrganizerRequest, RegistrationRequest},
};
use thiserror::Error;

pub const DEFAULT_EVENT_CAPACITY: &str = "50";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizerDraft {
    pub name: String,
    pub email: String,
    pub organization: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    /// Kept as typed; coerced only when the event is submitted.
    pub capacity: String,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            capacity: DEFAULT_EVENT_CAPACITY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub participant_name: String,
    pub participant_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    pub organizer: Option<OrganizerId>,
    pub event: Option<EventId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub organizer: OrganizerDraft,
    pub event: EventDraft,
    pub registration: RegistrationDraft,
    pub selections: Selections,
}

/// Every local edit goes through one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    SetOrganizerName(String),
    SetOrganizerEmail(String),
    SetOrganizerOrganization(String),
    SetEventTitle(String),
    SetEventDescription(String),
    SetEventCapacity(String),
    SetParticipantName(String),
    SetParticipantEmail(String),
    SelectOrganizer(Option<OrganizerId>),
    SelectEvent(Option<EventId>),
}

impl FormState {
    pub fn apply(&mut self, action: FormAction) {
        match action {
            FormAction::SetOrganizerName(value) => self.organizer.name = value,
            FormAction::SetOrganizerEmail(value) => self.organizer.email = value,
            FormAction::SetOrganizerOrganization(value) => self.organizer.organization = value,
            FormAction::SetEventTitle(value) => self.event.title = value,
            FormAction::SetEventDescription(value) => self.event.description = value,
            FormAction::SetEventCapacity(value) => self.event.capacity = value,
            FormAction::SetParticipantName(value) => self.registration.participant_name = value,
            FormAction::SetParticipantEmail(value) => self.registration.participant_email = value,
            FormAction::SelectOrganizer(id) => self.selections.organizer = id,
            FormAction::SelectEvent(id) => self.selections.event = id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("organizer name is required")]
    MissingOrganizerName,
    #[error("organizer email is required")]
    MissingOrganizerEmail,
    #[error("no organizer selected")]
    NoOrganizerSelected,
    #[error("event title is required")]
    MissingEventTitle,
    #[error("no event selected")]
    NoEventSelected,
    #[error("selected organizer is not in the catalog")]
    UnknownOrganizer,
    #[error("selected event is not in the catalog")]
    UnknownEvent,
}

impl OrganizerDraft {
    pub fn to_request(&self) -> Result<CreateOrganizerRequest, RejectReason> {
        if self.name.is_empty() {
            return Err(RejectReason::MissingOrganizerName);
        }
        if self.email.is_empty() {
            return Err(RejectReason::MissingOrganizerEmail);
        }
        Ok(CreateOrganizerRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            organization: self.organization.clone(),
        })
    }
}

impl EventDraft {
    pub fn to_request(
        &self,
        organizer: Option<&OrganizerId>,
    ) -> Result<CreateEventRequest, RejectReason> {
        let organizer = organizer.ok_or(RejectReason::NoOrganizerSelected)?;
        if self.title.is_empty() {
            return Err(RejectReason::MissingEventTitle);
        }
        Ok(CreateEventRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            capacity: coerce_capacity(&self.capacity),
            organizer_id: organizer.clone(),
        })
    }
}

impl RegistrationDraft {
    /// Participant fields are not checked locally; empty strings are sent.
    pub fn to_request(
        &self,
        event: Option<&EventId>,
    ) -> Result<(EventId, RegistrationRequest), RejectReason> {
        let event = event.ok_or(RejectReason::NoEventSelected)?;
        Ok((
            event.clone(),
            RegistrationRequest {
                participant_name: self.participant_name.clone(),
                participant_email: self.participant_email.clone(),
            },
        ))
    }
}

/// Numeric conversion of a capacity draft. Blank input is zero, integral
/// values are sent as integers, other decimals become floats, and anything else (including infinities)
/// is not-a-number, reported as `None`.
pub fn coerce_capacity(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Number::from(0));
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(Number::from(value));
    }
    if let Ok(value) = trimmed.parse::<u64>() {
        return Some(Number::from(value));
    }
    if !looks_numeric(trimmed) {
        return None;
    }
    let value = trimmed.parse::<f64>().ok()?;
    // "1e3" and "2.0" go out as 1000 and 2, not 1000.0 and 2.0.
    let integral = value.is_finite() && value.fract() == 0.0;
    if integral && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

// f64::from_str also accepts "inf" and "NaN"; only plain decimal and
// exponent literals count here.
fn looks_numeric(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_coercion_follows_numeric_conversion() {
        assert_eq!(coerce_capacity("75"), Some(Number::from(75)));
        assert_eq!(coerce_capacity(" 12 "), Some(Number::from(12)));
        assert_eq!(coerce_capacity(""), Some(Number::from(0)));
        assert_eq!(coerce_capacity("-3"), Some(Number::from(-3)));
        assert_eq!(coerce_capacity("2.5"), Number::from_f64(2.5));
        assert_eq!(coerce_capacity("1e3"), Some(Number::from(1000)));
        assert_eq!(coerce_capacity("2.0"), Some(Number::from(2)));
        assert_eq!(coerce_capacity("abc"), None);
        assert_eq!(coerce_capacity("inf"), None);
        assert_eq!(coerce_capacity("NaN"), None);
        assert_eq!(coerce_capacity("1e999"), None);
    }

    #[test]
    fn coerced_capacity_serializes_as_a_number() {
        let request = EventDraft {
            title: "Finals".into(),
            description: String::new(),
            capacity: "75".into(),
        }
        .to_request(Some(&OrganizerId::new("org-1")))
        .expect("valid draft");
        let value = serde_json::to_value(&request).expect("encode");
        assert_eq!(value["capacity"], serde_json::json!(75));
        assert!(value["capacity"].is_number());
    }

    #[test]
    fn organizer_draft_requires_name_and_email() {
        let mut draft = OrganizerDraft::default();
        assert_eq!(draft.to_request(), Err(RejectReason::MissingOrganizerName));
        draft.name = "Ada".into();
        assert_eq!(draft.to_request(), Err(RejectReason::MissingOrganizerEmail));
        draft.email = "ada@x.io".into();
        let request = draft.to_request().expect("valid");
        assert_eq!(request.organization, "");
    }

    #[test]
    fn event_draft_requires_selected_organizer_before_title() {
        let draft = EventDraft {
            title: "Finals".into(),
            ..EventDraft::default()
        };
        assert_eq!(
            draft.to_request(None),
            Err(RejectReason::NoOrganizerSelected)
        );
        assert_eq!(
            EventDraft::default().to_request(Some(&OrganizerId::new("org-1"))),
            Err(RejectReason::MissingEventTitle)
        );
    }

    #[test]
    fn registration_draft_allows_empty_participant_fields() {
        let (event, request) = RegistrationDraft::default()
            .to_request(Some(&EventId::new("evt-1")))
            .expect("no local validation");
        assert_eq!(event, EventId::new("evt-1"));
        assert!(request.participant_name.is_empty());
        assert_eq!(
            RegistrationDraft::default().to_request(None),
            Err(RejectReason::NoEventSelected)
        );
    }

    #[test]
    fn default_event_draft_carries_default_capacity() {
        assert_eq!(EventDraft::default().capacity, "50");
    }

    #[test]
    fn actions_edit_one_field_each() {
        let mut forms = FormState::default();
        forms.apply(FormAction::SetOrganizerName("Ada".into()));
        forms.apply(FormAction::SetEventCapacity("abc".into()));
        forms.apply(FormAction::SelectEvent(Some(EventId::new("evt-1"))));
        assert_eq!(forms.organizer.name, "Ada");
        assert!(forms.organizer.email.is_empty());
        assert_eq!(forms.event.capacity, "abc");
        assert_eq!(forms.selections.event, Some(EventId::new("evt-1")));
        forms.apply(FormAction::SelectEvent(None));
        assert_eq!(forms.selections.event, None);
    }
}
