//! Inbound port. Chat adapters call into the application.

use crate::domain::DomainError;

/// Input port: a chat front-end that receives messages and routes them to the dispatcher.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Receive and answer messages until the front-end is closed or interrupted.
    async fn run(&self) -> Result<(), DomainError>;
}
