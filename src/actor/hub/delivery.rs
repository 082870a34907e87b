use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::ClientId;
use super::clients::HubActor;
use crate::reload::message::UpdateMessage;

impl HubActor {
    /// Serialize once and enqueue on every client without waiting.
    ///
    /// A client whose queue is full is dropped from the set, which closes
    /// its queue and ends its outbound loop.
    pub(super) fn broadcast(&mut self, msg: &UpdateMessage) {
        if self.clients.is_empty() {
            crate::debug!("hub"; "no clients connected");
            return;
        }

        let text: Arc<str> = msg.to_json().into();
        let before = self.clients.len();
        self.clients
            .retain(|id, queue| Self::deliver(*id, queue, Arc::clone(&text)));
        crate::debug!("hub"; "broadcast to {} clients", before);
    }

    /// Non-blocking enqueue. Returns `false` when the client must go.
    pub(super) fn deliver(id: ClientId, queue: &mpsc::Sender<Arc<str>>, text: Arc<str>) -> bool {
        match queue.try_send(text) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                crate::log!("hub"; "client {} is not keeping up, disconnecting", id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                crate::debug!("hub"; "client {} queue closed", id);
                false
            }
        }
    }
}
