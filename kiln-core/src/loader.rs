//! Controller discovery contract.

use crate::{error::BoxError, types::ComponentType};
use async_trait::async_trait;

/// Supplies the candidate controller types for a compilation pass.
///
/// A failing loader aborts the pass; the error reaches the caller unchanged.
#[async_trait]
pub trait ControllerLoader: Send + Sync {
    /// Load candidate controller types.
    async fn load_controllers(&self) -> Result<Vec<ComponentType>, BoxError>;
}
