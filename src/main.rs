//! FinBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use tracing::{debug, info, warn, error};

use FinBuddy::{
    config::Settings,
    content::ContentStore,
    handlers::{self, Command},
    middleware::{rate_limit::CLEANUP_INTERVAL, LoggingMiddleware, RateLimitMiddleware},
    services::ServiceFactory,
    state::{MemoryStateStore, StateStorage, StateStore},
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", FinBuddy::info());

    // Load static content
    info!("Loading content...");
    let mut content = ContentStore::new(&settings.content);
    if let Err(e) = content.load().await {
        warn!(error = %e, "Content directory unusable, falling back to bundled English content");
        content = ContentStore::bundled()?;
    }
    let stats = content.get_stats();
    for language in &stats.languages {
        debug!(language = %language.code, keys = language.key_count, "Content language loaded");
    }
    info!(languages = stats.languages.len(), keys = stats.total_keys, "Content loaded");
    let content = Arc::new(content);

    // Initialize state storage
    info!("Connecting to Redis...");
    let store: Arc<dyn StateStore> = match StateStorage::new(settings.redis.clone()).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, keeping conversation state in memory");
            Arc::new(MemoryStateStore::new(&settings.redis))
        }
    };

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(&settings, content, store)?;
    let health = services.health_check().await;
    for issue in health.get_issues() {
        warn!(issue = %issue, "Service health issue");
    }

    let rate_limiter = RateLimitMiddleware::new(
        &settings.rate_limit,
        settings.features.rate_limiting,
        settings.bot.admin_ids.clone(),
    );
    let _rate_limit_cleanup = rate_limiter.spawn_cleanup(CLEANUP_INTERVAL);
    let logging_middleware = LoggingMiddleware::default();

    let bot = Bot::new(&settings.bot.token);

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![
            Arc::new(services),
            Arc::new(rate_limiter),
            Arc::new(logging_middleware)
        ])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("FinBuddy bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("FinBuddy bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_commands),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: Arc<ServiceFactory>,
    logging: Arc<LoggingMiddleware>,
) -> HandlerResult {
    if let Err(e) = handlers::handle_command(bot, msg, cmd, &services, &logging).await {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    rate_limiter: Arc<RateLimitMiddleware>,
    logging: Arc<LoggingMiddleware>,
) -> HandlerResult {
    if let Err(e) = handlers::handle_message(bot, msg, &services, &rate_limiter, &logging).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle quick-reply button presses
async fn handle_callbacks(
    bot: Bot,
    query: CallbackQuery,
    services: Arc<ServiceFactory>,
    rate_limiter: Arc<RateLimitMiddleware>,
    logging: Arc<LoggingMiddleware>,
) -> HandlerResult {
    if let Err(e) = handlers::handle_callback_query(bot, query, &services, &rate_limiter, &logging).await {
        error!(error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
