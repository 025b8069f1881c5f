//! Bugsmith server binary.

use std::process::ExitCode;
use std::sync::Arc;

use bugsmith_commands::CommandRouter;
use bugsmith_llm::LlmClient;
use bugsmith_ratelimits::{OPENAI_OPERATION, RateLimiter};
use bugsmith_settings::SettingsService;
use bugsmith_slack::SlackClient;
use bugsmith_store::{MongoStore, OrgStore, RateLimitStore};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod env;

use app::{AppState, build_app};
use env::ServerEnv;

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = match ServerEnv::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let store = match MongoStore::connect(&config.mongo_url, &config.database).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(%err, "failed to connect to the document store");
            return ExitCode::FAILURE;
        }
    };

    let org_store: Arc<dyn OrgStore> = store.clone();
    let limit_store: Arc<dyn RateLimitStore> = store;

    let settings = SettingsService::new(org_store);
    let limiter = RateLimiter::new(
        limit_store,
        config.rate_limit_max,
        config.rate_limit_window_seconds,
        OPENAI_OPERATION,
    );

    let llm = match config.llm.clone().map(LlmClient::new).transpose() {
        Ok(llm) => llm,
        Err(err) => {
            error!(%err, "failed to build AI client");
            return ExitCode::FAILURE;
        }
    };

    let slack = match SlackClient::new(config.slack.bot_token()) {
        Ok(slack) => slack,
        Err(err) => {
            error!(%err, "failed to build Slack client");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState {
        router: CommandRouter::new(settings, limiter, llm),
        slack,
        signing_secret: config.slack.signing_secret().to_string(),
    };

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, port = config.port, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(port = config.port, "bugsmith server listening");
    if let Err(err) = axum::serve(listener, build_app(state)).await {
        error!(%err, "server exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
