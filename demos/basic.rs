//! Minimal tsu-pipe example: an API-key gate in front of two answers.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/                        → 401
//!   curl -i -H 'x-api-key: secret' http://localhost:3000/ → 200 "hello"
//!   curl -i -H 'x-api-key: secret' http://localhost:3000/teapot → 418

use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tsu_pipe::{Pipeline, PipelineService, filter_fn, filters};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Pipeline::builder()
        .filter(filters::set_header("x-served-by", "tsu-pipe"))
        .filter(filter_fn(|res, req| {
            if req.header("x-api-key") != Some("secret") {
                res.write_head(StatusCode::UNAUTHORIZED);
            }
        }))
        .filter(filter_fn(|res, req| {
            if req.path() == "/teapot" {
                res.write_head(StatusCode::IM_A_TEAPOT);
                res.write(b"short and stout");
            }
        }))
        .filter(filters::respond(StatusCode::OK, "hello"))
        .build();

    let svc = PipelineService::new(Arc::new(app));

    let addr: SocketAddr = ([127, 0, 0, 1], 3000).into();
    let listener = TcpListener::bind(addr).await.expect("bind failed");
    info!(%addr, "tsu-pipe demo listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        let svc = svc.clone();
        tokio::spawn(async move {
            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!(%peer, "connection error: {e}");
            }
        });
    }
}
