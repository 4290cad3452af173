use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    forms::DEFAULT_EVENT_CAPACITY, CatalogClient, CatalogWorkflow, FlowKind, FormAction,
    HttpCatalogClient, RefreshOutcome, WorkflowEvent, WorkflowOptions,
};
use shared::domain::{EventId, OrganizerId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

use config::load_settings;
use render::{describe_outcome, render_catalog};

#[derive(Parser, Debug)]
#[command(about = "Manage organizers, events and registrations on a competitions backend")]
struct Cli {
    /// TOML settings file (defaults to ./competitions.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print organizers and events.
    List,
    CreateOrganizer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        organization: String,
    },
    CreateEvent {
        #[arg(long)]
        organizer: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = DEFAULT_EVENT_CAPACITY, allow_hyphen_values = true)]
        capacity: String,
    },
    Register {
        #[arg(long)]
        event: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Interactive session keeping drafts and selections between commands.
    Shell,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref(), cli.backend_url.as_deref())?;
    let client = match settings.request_timeout {
        Some(timeout) => HttpCatalogClient::with_timeout(&settings.backend_url, timeout),
        None => HttpCatalogClient::new(&settings.backend_url),
    }
    .context("failed to build catalog client")?;
    info!(backend_url = %client.base_url(), "using competitions backend");

    let workflow = CatalogWorkflow::with_options(
        client,
        WorkflowOptions {
            strict_selection: settings.strict_selection,
        },
    );
    tokio::spawn(log_workflow_events(workflow.subscribe_events()));

    match cli.command {
        Command::Shell => {
            shell::run(&workflow).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            if let RefreshOutcome::Failed(err) = workflow.refresh().await {
                return Err(err).context("failed to load the catalog");
            }
            println!("{}", render_catalog(&workflow.snapshot().await));
            Ok(ExitCode::SUCCESS)
        }
        Command::CreateOrganizer {
            name,
            email,
            organization,
        } => {
            let actions = vec![
                FormAction::SetOrganizerName(name),
                FormAction::SetOrganizerEmail(email),
                FormAction::SetOrganizerOrganization(organization),
            ];
            run_once(&workflow, FlowKind::CreateOrganizer, actions).await
        }
        Command::CreateEvent {
            organizer,
            title,
            description,
            capacity,
        } => {
            let actions = vec![
                FormAction::SelectOrganizer(OrganizerId::from_selection(&organizer)),
                FormAction::SetEventTitle(title),
                FormAction::SetEventDescription(description),
                FormAction::SetEventCapacity(capacity),
            ];
            run_once(&workflow, FlowKind::CreateEvent, actions).await
        }
        Command::Register { event, name, email } => {
            let actions = vec![
                FormAction::SelectEvent(EventId::from_selection(&event)),
                FormAction::SetParticipantName(name),
                FormAction::SetParticipantEmail(email),
            ];
            run_once(&workflow, FlowKind::Register, actions).await
        }
    }
}

async fn run_once<R: CatalogClient>(
    workflow: &CatalogWorkflow<R>,
    flow: FlowKind,
    actions: Vec<FormAction>,
) -> Result<ExitCode> {
    if let RefreshOutcome::Failed(err) = workflow.refresh().await {
        warn!(error = %err, "initial catalog load failed; submitting anyway");
    }
    for action in actions {
        workflow.dispatch(action).await;
    }

    let outcome = shell::submit(workflow, flow).await;
    println!("{}", describe_outcome(flow, &outcome));
    if !outcome.is_submitted() {
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", render_catalog(&workflow.snapshot().await));
    Ok(ExitCode::SUCCESS)
}

async fn log_workflow_events(mut events: broadcast::Receiver<WorkflowEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => debug!(?event, "workflow event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "workflow event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
