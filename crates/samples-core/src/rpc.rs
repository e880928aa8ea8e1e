//! Request guard for the local gRPC service
//!
//! Only clients that send the `sec-x-stripe-cli` header are served. Browsers
//! cannot set it from a web page, which keeps arbitrary sites from driving
//! the local service.

use crate::profile::ProfileStore;
use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{GrpcMethod, Request, Status};
use tracing::debug;

pub const REQUIRED_HEADER: &str = "sec-x-stripe-cli";

/// Reject requests that do not carry [`REQUIRED_HEADER`]
pub fn authorize(metadata: &MetadataMap) -> Result<(), Status> {
    if metadata.contains_key(REQUIRED_HEADER) {
        Ok(())
    } else {
        Err(Status::unauthenticated(format!(
            "{} header is not supplied",
            REQUIRED_HEADER
        )))
    }
}

/// Attached to every authorized request for the handlers to read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMetadata {
    /// Account the CLI is logged in as; empty when unknown
    pub merchant: String,
    /// Full gRPC method path, e.g. `/rpc.StripeCLI/SampleCreate`
    pub command_path: String,
}

/// Interceptor that authorizes requests and attaches [`EventMetadata`]
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    merchant: String,
}

impl RequestGuard {
    pub fn new(merchant: impl Into<String>) -> Self {
        Self {
            merchant: merchant.into(),
        }
    }

    /// Build from the profile. A missing account id does not block requests.
    pub fn from_profile(profile: &dyn ProfileStore) -> Self {
        Self::new(profile.account_id().unwrap_or_default())
    }
}

impl Interceptor for RequestGuard {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let command_path = request
            .extensions()
            .get::<GrpcMethod>()
            .map(|m| format!("/{}/{}", m.service(), m.method()))
            .unwrap_or_default();
        debug!(prefix = "gRPC", "Method invoked: {}", command_path);

        authorize(request.metadata())?;

        request.extensions_mut().insert(EventMetadata {
            merchant: self.merchant.clone(),
            command_path,
        });
        Ok(request)
    }
}
