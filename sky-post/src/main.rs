//! sky-post - Post content to a Bluesky account

use clap::Parser;
use libskymirror::publish::create_publisher;
use libskymirror::types::MirrorRecord;
use libskymirror::{Config, Database, Result, SkymirrorError};
use std::io::Read;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sky-post")]
#[command(version)]
#[command(about = "Post content to a Bluesky account", long_about = None)]
struct Cli {
    /// Content to post (reads from stdin if not provided)
    content: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Skip recording the post in the history database
    #[arg(long)]
    no_history: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("error")
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let content = read_content(cli.content)?;

    let config = Config::load()?;

    let mut publisher = create_publisher(&config).await?;
    publisher.authenticate().await?;

    let post_id = publisher.publish(&content).await?;
    info!(post_id = %post_id, "Posted");

    if !cli.no_history {
        if let Some(db_config) = &config.database {
            let record = MirrorRecord {
                id: None,
                identifier: libskymirror::identifier::identifier(&content),
                content: content.clone(),
                source: "sky-post".to_string(),
                platform: publisher.name().to_string(),
                platform_post_id: Some(post_id.clone()),
                published_at: chrono::Utc::now().timestamp(),
            };
            match Database::new(&db_config.path).await {
                Ok(db) => {
                    if let Err(e) = db.record_mirror(&record).await {
                        tracing::warn!("Failed to record post in history: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to open history database: {}", e),
            }
        }
    }

    match cli.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "platform": publisher.name(),
                "post_id": post_id,
                "content": content,
            });
            println!("{}", output);
        }
        _ => {
            println!("Posted to {}: {}", publisher.name(), post_id);
        }
    }

    Ok(())
}

/// Content from the CLI argument, or stdin when absent.
///
/// Unlike the mirror loop (which republishes whatever the source shows,
/// empty or not), interactive posting rejects empty content as operator
/// error.
fn read_content(arg: Option<String>) -> Result<String> {
    let content = match arg {
        Some(content) => content,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| SkymirrorError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
            buffer
        }
    };

    let content = content.trim_end_matches('\n').to_string();
    if content.trim().is_empty() {
        return Err(SkymirrorError::InvalidInput(
            "Content cannot be empty".to_string(),
        ));
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_content_from_arg() {
        let content = read_content(Some("hello".to_string())).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_read_content_strips_trailing_newline() {
        let content = read_content(Some("hello\n".to_string())).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_read_content_rejects_empty() {
        let result = read_content(Some("".to_string()));
        assert!(matches!(result, Err(SkymirrorError::InvalidInput(_))));

        let result = read_content(Some("   \n".to_string()));
        assert!(matches!(result, Err(SkymirrorError::InvalidInput(_))));
    }
}
