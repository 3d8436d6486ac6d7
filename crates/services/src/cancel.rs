use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Cooperative cancellation outcome. Not a failure and never logged as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation canceled")]
pub struct Canceled;

pub fn ensure_active(token: &CancellationToken) -> Result<(), Canceled> {
    if token.is_cancelled() {
        Err(Canceled)
    } else {
        Ok(())
    }
}
