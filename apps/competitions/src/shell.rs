//! Line-oriented interactive front end over the workflow.

use anyhow::{bail, Result};
use client_core::{CatalogClient, CatalogWorkflow, FlowKind, FormAction, SubmitOutcome};
use shared::domain::{EventId, OrganizerId};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::{describe_outcome, render_catalog, render_forms};

pub const HELP: &str = "\
commands:
  refresh                          re-fetch organizers and events
  show                             print catalog and drafts
  set <field> <value>              edit a draft field
  select organizer|event <id>      choose the organizer or event to act on
  clear organizer|event            drop a selection
  submit organizer|event|registration
  help
  quit
fields: organizer.name organizer.email organizer.organization
        event.title event.description event.capacity
        registration.name registration.email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Refresh,
    Show,
    Edit(FormAction),
    Submit(FlowKind),
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match verb {
        "refresh" => ShellCommand::Refresh,
        "show" => ShellCommand::Show,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "set" => {
            let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
            ShellCommand::Edit(field_action(field, value.to_string())?)
        }
        "select" => {
            let (target, id) = rest.split_once(' ').unwrap_or((rest, ""));
            ShellCommand::Edit(selection_action(target, id.trim())?)
        }
        "clear" => ShellCommand::Edit(selection_action(rest.trim(), "")?),
        "submit" => ShellCommand::Submit(match rest.trim() {
            "organizer" => FlowKind::CreateOrganizer,
            "event" => FlowKind::CreateEvent,
            "registration" | "register" => FlowKind::Register,
            other => bail!("unknown submit target '{other}'"),
        }),
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

fn field_action(field: &str, value: String) -> Result<FormAction> {
    Ok(match field {
        "organizer.name" => FormAction::SetOrganizerName(value),
        "organizer.email" => FormAction::SetOrganizerEmail(value),
        "organizer.organization" => FormAction::SetOrganizerOrganization(value),
        "event.title" => FormAction::SetEventTitle(value),
        "event.description" => FormAction::SetEventDescription(value),
        "event.capacity" => FormAction::SetEventCapacity(value),
        "registration.name" => FormAction::SetParticipantName(value),
        "registration.email" => FormAction::SetParticipantEmail(value),
        other => bail!("unknown field '{other}'"),
    })
}

fn selection_action(target: &str, id: &str) -> Result<FormAction> {
    Ok(match target {
        "organizer" => FormAction::SelectOrganizer(OrganizerId::from_selection(id)),
        "event" => FormAction::SelectEvent(EventId::from_selection(id)),
        other => bail!("unknown selection '{other}'"),
    })
}

pub async fn submit<R: CatalogClient>(
    workflow: &CatalogWorkflow<R>,
    flow: FlowKind,
) -> SubmitOutcome {
    match flow {
        FlowKind::CreateOrganizer => workflow.create_organizer().await,
        FlowKind::CreateEvent => workflow.create_event().await,
        FlowKind::Register => workflow.register().await,
    }
}

pub async fn run<R: CatalogClient>(workflow: &CatalogWorkflow<R>) -> Result<()> {
    let refresh = workflow.refresh().await;
    tracing::debug!(?refresh, "initial catalog load");
    println!("{}", render_catalog(&workflow.snapshot().await));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Show => {
                println!("{}", render_catalog(&workflow.snapshot().await));
                println!("{}", render_forms(&workflow.forms().await));
            }
            ShellCommand::Refresh => {
                let outcome = workflow.refresh().await;
                println!("{outcome:?}");
                println!("{}", render_catalog(&workflow.snapshot().await));
            }
            ShellCommand::Edit(action) => workflow.dispatch(action).await,
            ShellCommand::Submit(flow) => {
                let outcome = submit(workflow, flow).await;
                println!("{}", describe_outcome(flow, &outcome));
                if outcome.is_submitted() {
                    println!("{}", render_catalog(&workflow.snapshot().await));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_the_rest_of_the_line_as_value() {
        assert_eq!(
            parse_line("set event.description  the last round ").expect("parse"),
            Some(ShellCommand::Edit(FormAction::SetEventDescription(
                " the last round".into()
            )))
        );
        assert_eq!(
            parse_line("set organizer.organization").expect("parse"),
            Some(ShellCommand::Edit(FormAction::SetOrganizerOrganization(
                String::new()
            )))
        );
    }

    #[test]
    fn select_and_clear_map_to_selection_actions() {
        assert_eq!(
            parse_line("select event evt-1").expect("parse"),
            Some(ShellCommand::Edit(FormAction::SelectEvent(Some(
                EventId::new("evt-1")
            ))))
        );
        assert_eq!(
            parse_line("clear organizer").expect("parse"),
            Some(ShellCommand::Edit(FormAction::SelectOrganizer(None)))
        );
    }

    #[test]
    fn submit_targets_map_to_flows() {
        assert_eq!(
            parse_line("submit registration").expect("parse"),
            Some(ShellCommand::Submit(FlowKind::Register))
        );
        assert!(parse_line("submit everything").is_err());
    }

    #[test]
    fn blank_lines_are_skipped_and_unknown_verbs_rejected() {
        assert_eq!(parse_line("   ").expect("parse"), None);
        let err = parse_line("dance").expect_err("unknown");
        assert!(err.to_string().contains("unknown command"));
        assert!(parse_line("set nope.field x").is_err());
    }
}
