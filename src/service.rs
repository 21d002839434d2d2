//! gRPC front-end: the `ExtractService.ExtractData` operation.
//!
//! Each call is independent and stateless; it runs the same pipeline as the
//! CLI and returns both the JSON text and the typed instance packed into a
//! `google.protobuf.Any`. Requests run concurrently under a bounded tower
//! concurrency limit, and any pipeline error becomes a failed `Status` —
//! one bad request must never take the worker or the process down with it.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::extract;
use std::net::SocketAddr;
use tonic::{transport::Server, Request, Response, Status};
use tower::limit::ConcurrencyLimitLayer;
use tracing::{error, info};

/// Generated protobuf/tonic stubs for `proto/extract_service.proto`.
pub mod pb {
    tonic::include_proto!("extract");
}

use pb::extract_service_server::{ExtractService, ExtractServiceServer};
use pb::{ExtractRequest, ExtractResponse};

/// The service implementation. Holds only the shared (immutable) config.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }
}

#[tonic::async_trait]
impl ExtractService for Extractor {
    async fn extract_data(
        &self,
        request: Request<ExtractRequest>,
    ) -> Result<Response<ExtractResponse>, Status> {
        let req = request.into_inner();
        info!(
            "ExtractData: file='{}' schema='{}' model='{}'",
            req.file_path, req.proto_schema, req.model
        );

        let output = extract::extract(&req.file_path, &req.proto_schema, &req.model, &self.config)
            .await
            .map_err(status_for)?;

        let any = output.resolved.pack(&output.message);

        Ok(Response::new(ExtractResponse {
            json_result: output.json,
            proto_instance: Some(any),
        }))
    }
}

/// Map pipeline errors onto gRPC status codes.
///
/// The contract only requires distinguishing client-input problems from
/// server-internal ones; provider sub-causes (auth vs. rate limit) are not
/// surfaced, matching the adapter's best-effort policy.
fn status_for(err: ExtractError) -> Status {
    error!("ExtractData failed: {}", err);
    let message = err.to_string();
    match err {
        ExtractError::InvalidReference { .. }
        | ExtractError::UnknownProvider { .. }
        | ExtractError::Decode { .. } => Status::invalid_argument(message),
        ExtractError::Io { .. } | ExtractError::Resolution { .. } => Status::not_found(message),
        ExtractError::Fetch { .. } | ExtractError::ProviderFailed { .. } => {
            Status::unavailable(message)
        }
        ExtractError::Parse { .. }
        | ExtractError::Coercion { .. }
        | ExtractError::InvalidConfig(_)
        | ExtractError::Internal(_) => Status::internal(message),
    }
}

/// Serve the extraction service until `ctrl-c`.
///
/// Binds plaintext TCP on `addr`, caps in-flight requests at
/// `config.concurrency`, and drains in-flight work before returning once a
/// shutdown signal arrives.
pub async fn serve(addr: SocketAddr, config: ExtractConfig) -> Result<(), ExtractError> {
    let concurrency = config.concurrency;
    let service = ExtractServiceServer::new(Extractor::new(config));

    info!(
        "ExtractService listening on {} ({} concurrent requests max)",
        addr, concurrency
    );

    Server::builder()
        .layer(ConcurrencyLimitLayer::new(concurrency))
        .add_service(service)
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .map_err(|e| ExtractError::Internal(format!("gRPC server error: {e}")))
}

/// Serve on an already-bound listener. Used by tests to pick an ephemeral
/// port, and by callers that manage their own sockets.
pub async fn serve_with_listener(
    listener: tokio::net::TcpListener,
    config: ExtractConfig,
    shutdown: impl std::future::Future<Output = ()> + Send,
) -> Result<(), ExtractError> {
    let concurrency = config.concurrency;
    let service = ExtractServiceServer::new(Extractor::new(config));
    let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);

    Server::builder()
        .layer(ConcurrencyLimitLayer::new(concurrency))
        .add_service(service)
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await
        .map_err(|e| ExtractError::Internal(format!("gRPC server error: {e}")))
}

/// Resolves when the process receives SIGINT.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    } else {
        info!("Shutdown signal received, draining in-flight requests");
    }
}
