// src/transport/mongo.rs
use super::{Connection, PingResponse, Transport, TransportError};
use crate::config::{CheckConfig, ConnectionTarget};
use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, Credential, ServerApi, ServerApiVersion};
use mongodb::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

/// Transport backed by the official MongoDB driver.
#[derive(Debug, Clone)]
pub struct MongoTransport {
    connect_timeout: Duration,
    server_selection_timeout: Duration,
}

impl MongoTransport {
    pub fn new(connect_timeout: Duration, server_selection_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            server_selection_timeout,
        }
    }

    pub fn from_config(config: &CheckConfig) -> Self {
        Self::new(config.connect_timeout(), config.server_selection_timeout())
    }

    async fn client_options(
        &self,
        target: &ConnectionTarget,
    ) -> Result<ClientOptions, TransportError> {
        let uri = connection_uri(target);
        let mut options = ClientOptions::parse(&uri).await.map_err(classify)?;

        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.server_selection_timeout);
        options.app_name = target.app_name.clone();
        if let Some(replica_set) = &target.replica_set {
            options.repl_set_name = Some(replica_set.clone());
        }
        if target.server_api.is_some() {
            options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        }
        if let Some(credentials) = &target.credentials {
            let mut credential = Credential::default();
            credential.username = Some(credentials.username.clone());
            credential.password = Some(credentials.password.clone());
            credential.source = target.auth_source.clone();
            options.credential = Some(credential);
        }

        Ok(options)
    }
}

#[async_trait]
impl Transport for MongoTransport {
    async fn connect(
        &self,
        target: &ConnectionTarget,
    ) -> Result<Box<dyn Connection>, TransportError> {
        let options = self.client_options(target).await?;
        let client = Client::with_options(options).map_err(classify)?;
        debug!("Client created for {}", target);

        Ok(Box::new(MongoConnection {
            client: Some(client),
        }))
    }

    fn name(&self) -> &'static str {
        "mongodb"
    }
}

pub struct MongoConnection {
    client: Option<Client>,
}

#[async_trait]
impl Connection for MongoConnection {
    async fn admin_ping(&mut self) -> Result<PingResponse, TransportError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TransportError::Protocol("connection already closed".to_string()))?;

        let reply = client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(classify)?;

        Ok(PingResponse {
            ok: reply_ok(&reply)?,
        })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
        }
        Ok(())
    }
}

/// Credentials are set on the options struct, never in the URI.
fn connection_uri(target: &ConnectionTarget) -> String {
    let mut uri = target.to_string();
    uri.push('/');
    if target.tls {
        uri.push_str("?tls=true");
    }
    uri
}

fn reply_ok(reply: &Document) -> Result<bool, TransportError> {
    match reply.get("ok") {
        Some(Bson::Double(v)) => Ok(*v == 1.0),
        Some(Bson::Int32(v)) => Ok(*v == 1),
        Some(Bson::Int64(v)) => Ok(*v == 1),
        Some(Bson::Boolean(v)) => Ok(*v),
        Some(other) => Err(TransportError::Protocol(format!(
            "unexpected ok value in ping reply: {}",
            other
        ))),
        None => Err(TransportError::Protocol(
            "ping reply has no ok field".to_string(),
        )),
    }
}

/// Coarse family of a driver error, before it becomes a `TransportError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverFailure {
    Authentication,
    ServerSelection,
    Network,
    Protocol,
    Other,
}

fn driver_failure(kind: &ErrorKind) -> DriverFailure {
    match kind {
        ErrorKind::Authentication { .. } => DriverFailure::Authentication,
        ErrorKind::ServerSelection { .. } => DriverFailure::ServerSelection,
        ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } | ErrorKind::ConnectionPoolCleared { .. } => {
            DriverFailure::Network
        }
        ErrorKind::Command(_)
        | ErrorKind::InvalidResponse { .. }
        | ErrorKind::InvalidArgument { .. }
        | ErrorKind::InvalidTlsConfig { .. } => DriverFailure::Protocol,
        _ => DriverFailure::Other,
    }
}

fn map_failure(failure: DriverFailure, auth_cause: bool, message: String) -> TransportError {
    match failure {
        DriverFailure::Authentication => TransportError::Authentication(message),
        DriverFailure::ServerSelection if auth_cause => TransportError::Authentication(message),
        DriverFailure::ServerSelection | DriverFailure::Network => TransportError::Network(message),
        DriverFailure::Protocol => TransportError::Protocol(message),
        DriverFailure::Other => TransportError::Unknown(message),
    }
}

/// Whether an authentication rejection sits behind `err`.
///
/// Server selection errors carry the handshake failure as text, not as a
/// source error. For those the driver's SCRAM rejection message
/// ("Authentication failed") is the only marker, so the text is checked
/// after the source chain.
fn has_auth_cause(err: &MongoError) -> bool {
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        if let Some(inner) = cause.downcast_ref::<MongoError>() {
            if matches!(inner.kind.as_ref(), ErrorKind::Authentication { .. }) {
                return true;
            }
        }
        source = cause.source();
    }
    err.to_string().contains("Authentication failed")
}

fn classify(err: MongoError) -> TransportError {
    let failure = driver_failure(err.kind.as_ref());
    let auth_cause = failure == DriverFailure::ServerSelection && has_auth_cause(&err);
    map_failure(failure, auth_cause, err.to_string())
}
