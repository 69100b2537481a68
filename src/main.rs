use clap::Parser;
use like_toggle::{
    ClickEvent, Completion, Dispatch, HandlerConfig, JsonFilePage, ReqwestTransport, ResourceId,
    ToggleInteractionHandler,
};
use reqwest::Url;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
struct Args {
    /// JSON snapshot of the server-rendered page
    #[arg(long, env = "LIKE_PAGE", default_value = "data/page.json")]
    page: PathBuf,

    /// Origin the page was served from, e.g. `http://127.0.0.1:8000`
    #[arg(long, env = "LIKE_ORIGIN")]
    origin: Url,

    /// Cookie string of the page session (must contain the CSRF token)
    #[arg(long, env = "LIKE_COOKIES")]
    cookies: Option<String>,

    /// Resource ids to click, in order
    ids: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();
    let config = HandlerConfig::from_env();
    let transport = ReqwestTransport::same_origin(&args.origin)?;
    let handler = ToggleInteractionHandler::init(
        config,
        args.origin,
        args.cookies.as_deref(),
        transport,
        JsonFilePage::new(args.page),
    )
    .await?;

    tokio::select! {
        _ = click_all(&handler, &args.ids) => {}
        _ = tokio::signal::ctrl_c() => warn!("interrupted, pending requests dropped"),
    }

    print!("{}", handler.render().await);
    Ok(())
}

async fn click_all(
    handler: &ToggleInteractionHandler<ReqwestTransport, JsonFilePage>,
    ids: &[String],
) {
    for id in ids {
        let mut event = ClickEvent::new(ResourceId::new(id.as_str()));
        match handler.click(&mut event).await {
            Ok(Dispatch::Sent(pending)) => match pending.settled().await {
                Completion::Applied { outcome, .. } => info!(
                    "{id}: {} -> {} (count {:?})",
                    outcome.previous, outcome.current, outcome.count
                ),
                other => info!("{id}: {other:?}"),
            },
            Ok(Dispatch::Suppressed) => info!("{id}: suppressed"),
            Err(err) => warn!("{id}: {err}"),
        }
    }
}
