use jobboard_backend::{
    config::{init_config, LogFormat, Settings},
    database::pool::{create_pool, run_migrations},
    routes,
    services::mail_service::{LogMailer, MailSink, WebhookMailer},
    store::PgStore,
    utils::time::SystemClock,
    AppState,
};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = init_config()?;
    init_tracing(config.log_format);

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;

    let mailer: Arc<dyn MailSink> = match &config.mail_webhook_url {
        Some(url) => {
            let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
            info!(url = %url, "mail relay enabled");
            Arc::new(WebhookMailer::new(
                client,
                url.clone(),
                config.mail_webhook_secret.clone(),
            ))
        }
        None => {
            info!("MAIL_WEBHOOK_URL not set, mails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let app_state = AppState::new(
        Arc::new(PgStore::new(pool)),
        mailer,
        Arc::new(SystemClock),
        config.jwt_secret.as_str(),
        Settings::from(config),
    );

    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
