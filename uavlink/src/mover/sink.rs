//! Outbound seam between the motion loop and the link.

use std::future::Future;

use crate::link::{LinkError, LinkManager, LinkMessage, Transport};
use crate::position::PositionSample;

/// Destination for position reports.
pub trait PositionSink: Send + Sync + 'static {
    /// Deliver one sample. An error means the link is no longer usable.
    fn send_position(
        &self,
        sample: &PositionSample,
    ) -> impl Future<Output = Result<(), LinkError>> + Send;
}

impl<T: Transport> PositionSink for LinkManager<T> {
    async fn send_position(&self, sample: &PositionSample) -> Result<(), LinkError> {
        self.send(&LinkMessage::PositionUpdate(*sample)).await
    }
}
