//! Hub event loop.
//!
//! The only owner of the client set. Register, unregister, broadcast and
//! log messages are processed one at a time from a single inbox, so a
//! broadcast always sees a stable client set.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::ClientId;
use super::files::FileStore;
use super::logs::LogBuffer;
use crate::actor::messages::HubMsg;
use crate::reload::message::UpdateMessage;

pub(super) struct HubActor {
    rx: mpsc::UnboundedReceiver<HubMsg>,
    pub(super) clients: FxHashMap<ClientId, mpsc::Sender<Arc<str>>>,
    pub(super) logs: LogBuffer,
    files: Arc<Mutex<FileStore>>,
}

impl HubActor {
    pub fn new(
        rx: mpsc::UnboundedReceiver<HubMsg>,
        files: Arc<Mutex<FileStore>>,
        log_capacity: usize,
    ) -> Self {
        Self {
            rx,
            clients: FxHashMap::default(),
            logs: LogBuffer::new(log_capacity),
            files,
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                HubMsg::Register { id, queue } => self.register(id, queue),

                HubMsg::Unregister(id) => {
                    // Dropping the sender closes the client's queue
                    if self.clients.remove(&id).is_some() {
                        crate::debug!("hub"; "client {} disconnected ({} left)", id, self.clients.len());
                    }
                }

                HubMsg::Broadcast(msg) => self.broadcast(&msg),

                HubMsg::Log(entry) => {
                    self.logs.push(entry.clone());
                    self.broadcast(&UpdateMessage::Log { entry });
                }

                HubMsg::ClientCount(reply) => {
                    let _ = reply.send(self.clients.len());
                }

                HubMsg::Shutdown => {
                    crate::debug!("hub"; "shutting down, closing {} clients", self.clients.len());
                    self.clients.clear();
                    break;
                }
            }
        }
    }

    /// Send the bootstrap to this client only, then add it to the set.
    fn register(&mut self, id: ClientId, queue: mpsc::Sender<Arc<str>>) {
        let files = {
            let store = self.files.lock();
            UpdateMessage::files(store.ordered().into_iter().map(|e| &e.file))
        };
        let logs = UpdateMessage::Logs {
            entries: self.logs.replay(),
        };

        for msg in [files, logs] {
            if !Self::deliver(id, &queue, msg.to_json().into()) {
                return;
            }
        }

        self.clients.insert(id, queue);
        crate::debug!("hub"; "client {} connected (total: {})", id, self.clients.len());
    }
}
