//! Sentiment chat - terminal client for a sentiment analysis service
//!
//! Submissions appear in the conversation immediately and are reconciled
//! once the service answers. Past analyses can be browsed and pruned.

mod auth;
mod client;
mod config;
mod render;
mod runtime;
mod sentiment;
mod state_machine;
mod terminal;

use auth::{NoToken, StaticToken, TokenFile};
use client::HttpSentimentApi;
use config::{ClientConfig, TokenSource};
use runtime::TokenProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the chat view
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sentiment_chat=info".into());
    let fmt_layer = if std::env::var_os("SENTIMENT_CHAT_LOG_JSON").is_some() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        token = ?config.token,
        timeout = ?config.http_timeout,
        "Starting sentiment chat"
    );

    let api = HttpSentimentApi::new(&config.api_url, config.http_timeout)?;
    match api.health().await {
        Ok(status) => tracing::info!(status = %status, url = %api.base_url(), "Sentiment service reachable"),
        Err(e) => tracing::warn!(error = %e, url = %api.base_url(), "Sentiment service health check failed"),
    }

    let tokens: Box<dyn TokenProvider> = match &config.token {
        TokenSource::Static(token) => Box::new(StaticToken::new(token.clone())),
        TokenSource::File(path) => Box::new(TokenFile::new(path.clone())),
        TokenSource::None => {
            tracing::warn!("No SENTIMENT_TOKEN or SENTIMENT_TOKEN_FILE set; requests will be unauthenticated");
            Box::new(NoToken)
        }
    };

    let (handle, updates, session) = runtime::start_session(api, tokens);
    terminal::run(&handle, updates, config.history_limit).await?;

    // Calls still in flight on quit are abandoned
    drop(handle);
    session.abort();
    Ok(())
}
