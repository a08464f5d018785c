//! Command-line incident notification composer.

mod interactive;

use std::io::Write;

use clap::{Parser, Subcommand};
use notification_core::{
    template_source_from_env, ComposerSession, PlainTextNormalizer, RenderLinks, TemplateOrigin,
    UpdateOptions,
};
use pagerduty_client::{PagerDutyClient, PagerDutyConfig, DEFAULT_WEB_URL};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{info, warn};

use crate::interactive::{describe, Command, HELP};

#[derive(Debug, Parser)]
#[command(name = "notify-cli")]
#[command(about = "Compose PagerDuty incident notifications")]
struct Args {
    /// PagerDuty API token. Falls back to PAGER_DUTY_TOKEN env.
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch an incident and print the notification
    Render {
        /// PagerDuty incident number
        ticket_number: String,

        /// Update number
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        update_number: u32,

        /// Prefix the update line with "Resolved |"
        #[arg(short, long)]
        resolve: bool,

        /// Prefix the update line with "Downgraded |"
        #[arg(short, long)]
        downgrade: bool,
    },

    /// Fetch an incident once and re-render as options change
    Interactive {
        /// PagerDuty incident number
        ticket_number: String,
    },

    /// Read edited markup on stdin and print the text that would be delivered
    PlainText,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("notify_cli=info".parse()?)
                .add_directive("notification_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::PlainText => {
            let normalizer = PlainTextNormalizer::for_links(&configured_links())?;
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            println!("{}", normalizer.normalize(&input));
        }
        Commands::Render {
            ticket_number,
            update_number,
            resolve,
            downgrade,
        } => {
            let client = pagerduty_client(args.token)?;
            let mut session = load_session(&client).await?;
            let options = UpdateOptions {
                update_number,
                resolve,
                downgrade,
            };

            info!(ticket = %ticket_number, "Fetching incident");
            let message = session
                .compose(&client, &ticket_number, options, false)
                .await?;
            println!("{}", message);
        }
        Commands::Interactive { ticket_number } => {
            let client = pagerduty_client(args.token)?;
            let session = load_session(&client).await?;
            run_interactive(&client, session, &ticket_number).await?;
        }
    }

    Ok(())
}

/// Links for `PAGERDUTY_WEB_URL`, which needs no token.
fn configured_links() -> RenderLinks {
    let web_url = std::env::var("PAGERDUTY_WEB_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_WEB_URL.to_string());
    RenderLinks::for_web_url(&web_url)
}

fn pagerduty_client(token: Option<String>) -> Result<PagerDutyClient, Box<dyn std::error::Error>> {
    let config = match token {
        Some(token) => PagerDutyConfig::new(token).with_env_urls(),
        None => PagerDutyConfig::from_env()?,
    };
    Ok(PagerDutyClient::new(config)?)
}

async fn load_session(
    client: &PagerDutyClient,
) -> Result<ComposerSession, Box<dyn std::error::Error>> {
    let source = template_source_from_env()?;
    let mut session =
        ComposerSession::with_links(RenderLinks::for_web_url(&client.config().web_url));

    if let TemplateOrigin::BuiltIn { reason } = session.load_template(source.as_ref()).await {
        warn!(reason = %reason, "Using built-in notification template");
    }
    Ok(session)
}

async fn run_interactive(
    client: &PagerDutyClient,
    mut session: ComposerSession,
    ticket_number: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = UpdateOptions::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    compose_and_print(client, &mut session, ticket_number, options, false).await;
    println!("{}", HELP);

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{}", err);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            _ => {
                command.apply(&mut options);
                let refresh = command == Command::Refresh;
                compose_and_print(client, &mut session, ticket_number, options, refresh).await;
            }
        }
    }

    Ok(())
}

async fn compose_and_print(
    client: &PagerDutyClient,
    session: &mut ComposerSession,
    ticket_number: &str,
    options: UpdateOptions,
    refresh: bool,
) {
    match session
        .compose(client, ticket_number, options, refresh)
        .await
    {
        Ok(message) => println!("\n[{}]\n{}\n", describe(&options), message),
        Err(err) => eprintln!("Error: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args() {
        let args = Args::try_parse_from(["notify-cli", "render", "2668960", "2", "-r"]).unwrap();
        match args.command {
            Commands::Render {
                ticket_number,
                update_number,
                resolve,
                downgrade,
            } => {
                assert_eq!(ticket_number, "2668960");
                assert_eq!(update_number, 2);
                assert!(resolve);
                assert!(!downgrade);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_defaults_to_first_update() {
        let args =
            Args::try_parse_from(["notify-cli", "render", "2668960", "--token", "abc"]).unwrap();
        assert_eq!(args.token.as_deref(), Some("abc"));
        assert!(matches!(
            args.command,
            Commands::Render {
                update_number: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_update_number_must_be_positive() {
        assert!(Args::try_parse_from(["notify-cli", "render", "2668960", "0"]).is_err());
    }

    #[test]
    fn test_plain_text_takes_no_arguments() {
        let args = Args::try_parse_from(["notify-cli", "plain-text"]).unwrap();
        assert!(matches!(args.command, Commands::PlainText));
        assert!(Args::try_parse_from(["notify-cli", "plain-text", "extra"]).is_err());
    }
}
