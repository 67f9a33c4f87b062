use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use client_core::{
    load_settings, validate_server_url, AnswerClient, Renderer, SessionController, Transition,
};
use shared::domain::Role;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
struct Args {
    /// Answer service base URL; overrides configuration.
    #[arg(long)]
    server_url: Option<String>,
    /// Print answer service statistics and exit.
    #[arg(long)]
    stats: bool,
    /// One-shot question; omit to start an interactive session.
    question: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    let server_url = validate_server_url(&settings.server_url)?;

    let client = Arc::new(AnswerClient::new(server_url));

    if args.stats {
        let stats = client.stats().await?;
        println!(
            "{} documents indexed in {}",
            stats.total_documents, stats.database
        );
        return Ok(());
    }

    let renderer = Renderer::new(settings.theme);
    let mut controller =
        SessionController::new(Arc::clone(&client), settings.result_count, settings.overlap);

    if args.question.is_empty() {
        run_interactive(&client, &mut controller, &renderer).await
    } else {
        let question = args.question.join(" ");
        run_once(&mut controller, &renderer, &question).await
    }
}

async fn run_once(
    controller: &mut SessionController<Arc<AnswerClient>>,
    renderer: &Renderer,
    question: &str,
) -> Result<()> {
    let before = controller.session().messages().len();
    controller.submit_question(question).await;
    print_new_messages(controller, renderer, before);
    Ok(())
}

async fn run_interactive(
    client: &AnswerClient,
    controller: &mut SessionController<Arc<AnswerClient>>,
    renderer: &Renderer,
) -> Result<()> {
    match client.health().await {
        Ok(health) => info!(status = %health.status, "answer service reachable"),
        Err(err) => warn!(error = %err, "answer service health check failed"),
    }

    println!("VEDAN AI - Legal Information Assistant");
    println!("Type your questions ('quit' to exit)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if matches!(
            input.to_ascii_lowercase().as_str(),
            "quit" | "exit" | "q"
        ) {
            break;
        }

        let before = controller.session().messages().len();
        if controller.submit_question(input).await == Transition::IgnoredEmpty {
            continue;
        }
        print_new_messages(controller, renderer, before);
    }

    Ok(())
}

fn print_new_messages(
    controller: &SessionController<Arc<AnswerClient>>,
    renderer: &Renderer,
    from: usize,
) {
    for message in &controller.session().messages()[from..] {
        if message.role != Role::User {
            println!("{}\n", renderer.message(message));
        }
    }
}
