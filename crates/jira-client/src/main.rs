use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, command, value_parser};
use jira_client::{Credentials, JiraClient, config::DEFAULT_ENV, update::fields_document};
use miette::{Diagnostic, Result};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let matches = cli().get_matches();
    run(&matches).await
}

fn cli() -> Command {
    let issue = Arg::new("issue")
        .required(true)
        .help("The ID or key of the issue, e.g. WM-48");
    command!()
        .subcommand_required(true)
        .arg(
            Arg::new("env")
                .long("env")
                .env("ENV")
                .default_value(DEFAULT_ENV)
                .global(true)
                .help("Which `.env.<ENV>` file to load credentials from"),
        )
        .arg(
            Arg::new("env-dir")
                .long("env-dir")
                .env("JIRA_ENV_DIR")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Directory containing the env file, defaults to the executable's directory"),
        )
        .subcommand(Command::new("confirm").about("Check that the configured credentials work"))
        .subcommand(
            Command::new("get")
                .about("Print an issue as JSON")
                .arg(issue.clone()),
        )
        .subcommand(
            Command::new("update")
                .about("Update fields on an issue")
                .arg(issue)
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .help("New description for the issue"),
                )
                .arg(
                    Arg::new("label")
                        .long("label")
                        .short('l')
                        .action(ArgAction::Append)
                        .help("Label to set on the issue, may be repeated. Replaces existing labels."),
                )
                .arg(
                    Arg::new("fields")
                        .long("fields")
                        .value_parser(parse_fields)
                        .help(r#"Raw JSON object of fields to set, e.g. '{"summary": "New"}'"#),
                ),
        )
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let env = matches
        .get_one::<String>("env")
        .map_or(DEFAULT_ENV, String::as_str);
    let env_dir = match matches.get_one::<PathBuf>("env-dir") {
        Some(dir) => dir.clone(),
        None => executable_dir(),
    };
    let credentials = Credentials::load(env, &env_dir)?;
    let client = JiraClient::new(&credentials)?;

    match matches.subcommand() {
        Some(("confirm", _)) => {
            client.confirm_connection().await;
        }
        Some(("get", sub_matches)) => {
            let issue = issue_arg(sub_matches);
            if let Some(issue) = client.get_issue(issue).await {
                print_json(&issue);
            }
        }
        Some(("update", sub_matches)) => {
            let issue = issue_arg(sub_matches);
            let fields = sub_matches
                .get_one::<Map<String, Value>>("fields")
                .cloned()
                .unwrap_or_default();
            let description = sub_matches.get_one::<String>("description").cloned();
            let labels = sub_matches
                .get_many::<String>("label")
                .map(|labels| labels.cloned().collect())
                .unwrap_or_default();
            let document = fields_document(fields, description, labels).ok_or(NothingToUpdate)?;
            if let Some(updated) = client.update_issue(issue, &document).await {
                print_json(&updated);
            }
        }
        _ => return Err(NoCommand.into()),
    }
    Ok(())
}

fn issue_arg(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("issue")
        .map_or("", String::as_str)
}

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_fields(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{pretty}"),
        Err(_) => println!("{value}"),
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("Nothing to update")]
#[diagnostic(
    code(update::empty),
    help("Pass at least one of --description, --label or --fields")
)]
struct NothingToUpdate;

#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("No command given")]
#[diagnostic(code(cli::no_command), help("Run with --help to see the available commands"))]
struct NoCommand;
