use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};

use upload_relay::context::{self, Config};
use upload_relay::handlers;
use upload_relay::logger::setup_logger;
use upload_relay::store::{ContentStore, GitHubStore};

struct State {
    config: &'static Config,
    store: Box<dyn ContentStore>,
}

async fn handler(req: Request<Body>, state: Arc<State>) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();
    let response = handlers::handle(req, state.config, &*state.store).await;
    log::info!(
        "{} {} {} {}ms",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    Ok(response)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = context::init()?;
    setup_logger(config)?;
    if config.token.is_none() {
        log::warn!("GITHUB_TOKEN is not set, uploads will be rejected");
    }
    let store = GitHubStore::new(config)?;
    let state = Arc::new(State {
        config,
        store: Box::new(store),
    });

    let make_svc = make_service_fn(move |_: &AddrStream| {
        let state = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handler(req, state.clone()))) }
    });

    let server = Server::try_bind(&config.addr)?.serve(make_svc);
    log::info!(
        "relaying uploads to {} ({}) on http://{}",
        config.repo,
        config.branch,
        config.addr
    );

    if let Err(e) = server.with_graceful_shutdown(shutdown_signal()).await {
        log::error!("server error: {}", e);
    }
    Ok(())
}
