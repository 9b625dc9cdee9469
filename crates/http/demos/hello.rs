use std::time::Duration;

use h1_pipeline::handler::make_handler;
use h1_pipeline::message::{IncomingMessage, OutgoingMessage};
use h1_pipeline::server::Server;
use http::StatusCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let handler = make_handler(hello_world).reply_on_client_error(StatusCode::BAD_REQUEST);
    let mut server = match Server::builder().address("127.0.0.1:8080").handler(handler).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server setup");
            return;
        }
    };
    server.set_timeout(Duration::from_secs(30), |info| {
        info!(id = info.id, peer = ?info.peer_addr, "idle connection dropped");
    });

    info!(port = 8080, "start listening");
    if let Err(e) = server.start().await {
        error!(cause = %e, "bind server error");
    }
}

async fn hello_world(mut request: IncomingMessage, mut response: OutgoingMessage) {
    info!(method = %request.method(), path = request.url(), "request");

    let body = match request.body_mut().collect_bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(cause = %e, "request body aborted");
            return;
        }
    };
    info!(body = %String::from_utf8_lossy(&body), "receiving request body");

    let result = response
        .set_header(http::header::CONTENT_TYPE, "text/plain")
        .and_then(|()| response.end_with("Hello World!\r\n"));
    if let Err(e) = result {
        error!(cause = %e, "can't send response");
    }
}
