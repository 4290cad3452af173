//! Plain-text views of the catalog, the drafts and submission outcomes.

use client_core::{
    CatalogSnapshot, FlowKind, FormState, RefreshOutcome, SubmitOutcome,
};

pub fn render_catalog(snapshot: &CatalogSnapshot) -> String {
    let mut lines = vec![format!("Organizers ({})", snapshot.organizers.len())];
    for organizer in &snapshot.organizers {
        let organization = organizer
            .organization
            .as_deref()
            .filter(|o| !o.is_empty())
            .map(|o| format!(" [{o}]"))
            .unwrap_or_default();
        let hosted = snapshot.events_for(&organizer.id).count();
        lines.push(format!(
            "  {}  {} <{}>{organization}  events {hosted}",
            organizer.id, organizer.name, organizer.email
        ));
    }

    lines.push(format!("Events ({})", snapshot.events.len()));
    for event in &snapshot.events {
        let capacity = event
            .capacity
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        lines.push(format!(
            "  {}  {}  capacity {capacity}  Organizer {}",
            event.id, event.title, event.organizer_id
        ));
    }

    if let Some(fetched_at) = snapshot.fetched_at {
        lines.push(format!("(fetched {})", fetched_at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.join("\n")
}

pub fn render_forms(forms: &FormState) -> String {
    let selected_organizer = forms
        .selections
        .organizer
        .as_ref()
        .map_or("-", |id| id.as_str());
    let selected_event = forms
        .selections
        .event
        .as_ref()
        .map_or("-", |id| id.as_str());
    [
        format!(
            "Organizer draft: name={:?} email={:?} organization={:?}",
            forms.organizer.name, forms.organizer.email, forms.organizer.organization
        ),
        format!("Selected organizer: {selected_organizer}"),
        format!(
            "Event draft: title={:?} description={:?} capacity={:?}",
            forms.event.title, forms.event.description, forms.event.capacity
        ),
        format!("Selected event: {selected_event}"),
        format!(
            "Registration draft: name={:?} email={:?}",
            forms.registration.participant_name, forms.registration.participant_email
        ),
    ]
    .join("\n")
}

pub fn describe_outcome(flow: FlowKind, outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Rejected(reason) => format!("{}: not submitted ({reason})", flow.name()),
        SubmitOutcome::Failed(err) => format!("{}: failed ({err})", flow.name()),
        SubmitOutcome::Submitted { refresh } => match refresh {
            RefreshOutcome::Applied(_) | RefreshOutcome::Superseded(_) => {
                format!("{}: done", flow.name())
            }
            RefreshOutcome::Failed(err) => {
                format!("{}: done, but refreshing the catalog failed ({err})", flow.name())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use client_core::forms::RejectReason;
    use shared::{
        domain::{EventId, OrganizerId},
        error::{ApiError, ErrorCode},
        protocol::{Event, Organizer},
    };

    use super::*;

    #[test]
    fn catalog_lists_events_with_their_organizer() {
        let snapshot = CatalogSnapshot {
            organizers: vec![Organizer {
                id: OrganizerId::new("1"),
                name: "Ada".into(),
                email: "ada@x.io".into(),
                organization: Some(String::new()),
            }],
            events: vec![
                Event {
                    id: EventId::new("evt-1"),
                    title: "Finals".into(),
                    description: String::new(),
                    capacity: Some(50.into()),
                    organizer_id: OrganizerId::new("1"),
                },
                Event {
                    id: EventId::new("evt-2"),
                    title: "Exhibition".into(),
                    description: String::new(),
                    capacity: None,
                    organizer_id: OrganizerId::new("1"),
                },
            ],
            fetched_at: None,
        };
        let text = render_catalog(&snapshot);
        assert!(text.contains("  1  Ada <ada@x.io>  events 2\n"));
        assert!(text.contains("evt-1  Finals  capacity 50  Organizer 1"));
        assert!(text.contains("evt-2  Exhibition  capacity -  Organizer 1"));
    }

    #[test]
    fn forms_show_dash_for_missing_selection() {
        let text = render_forms(&FormState::default());
        assert!(text.contains("Selected event: -"));
        assert!(text.contains("capacity=\"50\""));
    }

    #[test]
    fn outcomes_describe_each_branch() {
        assert_eq!(
            describe_outcome(
                FlowKind::CreateEvent,
                &SubmitOutcome::Rejected(RejectReason::NoOrganizerSelected)
            ),
            "create_event: not submitted (no organizer selected)"
        );
        let failed = SubmitOutcome::Failed(ApiError::new(ErrorCode::Conflict, "full"));
        assert_eq!(
            describe_outcome(FlowKind::Register, &failed),
            "register: failed (Conflict: full)"
        );
    }
}
