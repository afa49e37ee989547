use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::DEFAULT_CONFIG_PATH, load_settings_from, ContactFormController, EmailRelayGateway,
    SubmissionOutcome,
};
use shared::domain::FormField;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Send a message through the site's contact form relay")]
struct Args {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    message: String,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings_from(&args.config);
    let direct_contact = settings.direct_contact.clone();
    let gateway = EmailRelayGateway::new(settings).with_context(|| {
        format!(
            "contact relay is not configured; check {} or EMAILJS_* environment",
            args.config.display()
        )
    })?;
    let controller = ContactFormController::new(Arc::new(gateway));

    let mut snapshots = controller.subscribe();
    let renderer = tokio::spawn(async move {
        let mut was_in_flight = false;
        loop {
            match snapshots.recv().await {
                Ok(snapshot) => {
                    if snapshot.in_flight && !was_in_flight {
                        println!("{}", render::SENDING_LABEL);
                    }
                    was_in_flight = snapshot.in_flight;
                    debug!(?snapshot.status, in_flight = snapshot.in_flight, "form state changed");
                }
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "renderer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    controller.update_field(FormField::Name, args.name);
    controller.update_field(FormField::Email, args.email);
    controller.update_field(FormField::Message, args.message);

    let outcome = controller.submit().await;
    let snapshot = controller.snapshot();
    drop(controller);
    let _ = renderer.await;

    print!("{}", render::render_snapshot(&snapshot));
    if let Some(address) = direct_contact {
        println!("{}", render::direct_contact_line(&address));
    }
    let code = match outcome {
        SubmissionOutcome::Sent => ExitCode::SUCCESS,
        SubmissionOutcome::Rejected(_) => ExitCode::from(2),
        SubmissionOutcome::Failed | SubmissionOutcome::AlreadyInFlight => ExitCode::FAILURE,
    };
    Ok(code)
}
