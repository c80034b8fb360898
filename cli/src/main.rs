use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "bookmarks", about = "CLI for managing bookmarks")]
struct Cli {
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every bookmark
    List,
    /// Show one bookmark
    Get { id: i64 },
    /// Create a bookmark
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rating: u8,
    },
    /// Change some fields of a bookmark
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        rating: Option<u8>,
    },
    /// Delete a bookmark
    Delete { id: i64 },
}

#[derive(Deserialize)]
struct Config {
    base_url: String,
    api_token: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let base_url = config.base_url.trim_end_matches('/');
    let token = auth_header(&config.api_token)?;

    let client = reqwest::Client::new();
    let request = |method: Method, path: String| -> RequestBuilder {
        client
            .request(method, format!("{}{}", base_url, path))
            .header(AUTHORIZATION, token.clone())
    };

    let response = match cli.command {
        Commands::List => request(Method::GET, "/bookmarks".into()).send().await,
        Commands::Get { id } => request(Method::GET, format!("/bookmarks/{}", id)).send().await,
        Commands::Add {
            title,
            url,
            description,
            rating,
        } => {
            let body = fields(Some(title), Some(url), description, Some(rating));
            request(Method::POST, "/bookmarks".into())
                .json(&body)
                .send()
                .await
        }
        Commands::Update {
            id,
            title,
            url,
            description,
            rating,
        } => {
            let body = fields(title, url, description, rating);
            if body.is_empty() {
                anyhow::bail!("provide at least one of --title, --url, --description or --rating");
            }
            request(Method::PATCH, format!("/bookmarks/{}", id))
                .json(&body)
                .send()
                .await
        }
        Commands::Delete { id } => {
            request(Method::DELETE, format!("/bookmarks/{}", id))
                .send()
                .await
        }
    }
    .context("failed to send request")?;

    handle_response(response).await
}

fn fields(
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    rating: Option<u8>,
) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(title) = title {
        body.insert("title".into(), title.into());
    }
    if let Some(url) = url {
        body.insert("url".into(), url.into());
    }
    if let Some(description) = description {
        body.insert("description".into(), description.into());
    }
    if let Some(rating) = rating {
        body.insert("rating".into(), rating.into());
    }
    body
}

fn load_config(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

fn auth_header(token: &str) -> Result<HeaderValue> {
    let value = if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    };
    HeaderValue::from_str(&value).context("invalid api token")
}

async fn handle_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.context("failed to read response")?;
    if !status.is_success() {
        anyhow::bail!("request failed with status {}: {}", status, body);
    }
    if let Some(location) = location {
        eprintln!("created {}", location);
    }
    if body.is_empty() {
        println!("{}", status);
    } else {
        println!("{}", body);
    }
    Ok(())
}
