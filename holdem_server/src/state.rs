use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use holdem_core::{GameService, TableId};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::protocol::ServerMessage;
use crate::settings::Settings;

pub type ConnectionId = Uuid;

type Observers = HashMap<ConnectionId, mpsc::Sender<ServerMessage>>;

/// Shared server state: the engine plus the WebSocket observers of each
/// table.
///
/// Observer sets are only touched under their map shard and never across an
/// `.await`; publishing clones the senders out first.
pub struct AppState {
    pub game: GameService,
    observers: DashMap<TableId, Observers>,
    channel_capacity: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(settings: &Settings) -> AppState {
        AppState::with_game(GameService::with_config(settings.table.clone()), settings.server.channel_capacity)
    }

    pub fn with_game(game: GameService, channel_capacity: usize) -> AppState {
        AppState {
            game,
            observers: DashMap::new(),
            channel_capacity,
        }
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn subscribe(&self, table_id: &str, connection_id: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        self.observers
            .entry(table_id.to_string())
            .or_default()
            .insert(connection_id, sender);
        debug!(table = %table_id, %connection_id, "observer subscribed");
    }

    /// Drops the observer, and the table's entry once nobody is left.
    pub fn unsubscribe(&self, table_id: &str, connection_id: ConnectionId) {
        if let Some(mut observers) = self.observers.get_mut(table_id) {
            observers.remove(&connection_id);
        }
        self.observers.remove_if(table_id, |_, observers| observers.is_empty());
        debug!(table = %table_id, %connection_id, "observer unsubscribed");
    }

    #[cfg(test)]
    pub fn observer_count(&self, table_id: &str) -> usize {
        self.observers.get(table_id).map_or(0, |observers| observers.len())
    }

    #[cfg(test)]
    pub fn observed_tables(&self) -> usize {
        self.observers.len()
    }

    /// Sends `message` to every observer of the table.
    pub async fn publish(&self, table_id: &str, message: ServerMessage) {
        let senders: Vec<(ConnectionId, mpsc::Sender<ServerMessage>)> = match self.observers.get(table_id) {
            Some(observers) => observers.iter().map(|(id, tx)| (*id, tx.clone())).collect(),
            None => return,
        };
        broadcast(senders.iter().map(|(id, tx)| (id, tx)), &message).await;
    }

    /// Publishes the table's current snapshot.
    pub async fn publish_snapshot(&self, table_id: &str) {
        match self.game.get_table(table_id) {
            Ok(snapshot) => self.publish(table_id, ServerMessage::TableSnapshot(snapshot)).await,
            Err(err) => warn!(table = %table_id, %err, "no snapshot to publish"),
        }
    }
}

async fn broadcast(
    observers: impl Iterator<Item = (&ConnectionId, &mpsc::Sender<ServerMessage>)>,
    message: &ServerMessage,
) {
    for (connection_id, sender) in observers {
        if sender.send(message.clone()).await.is_err() {
            // The connection's own task cleans up after itself.
            warn!(%connection_id, "observer gone, message dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let game = GameService::new().with_seed(3);
        game.create_table("t1").unwrap();
        AppState::with_game(game, 8)
    }

    #[tokio::test]
    async fn test_publish_reaches_only_table_observers() {
        let state = state();
        state.game.create_table("t2").unwrap();

        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        state.subscribe("t1", Uuid::new_v4(), tx1);
        state.subscribe("t2", Uuid::new_v4(), tx2);

        state.publish_snapshot("t1").await;

        match rx1.recv().await {
            Some(ServerMessage::TableSnapshot(snapshot)) => assert_eq!(snapshot.id, "t1"),
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let state = state();
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(8);
        state.subscribe("t1", id, tx);
        assert_eq!(state.observer_count("t1"), 1);

        state.unsubscribe("t1", id);
        assert_eq!(state.observer_count("t1"), 0);
        assert_eq!(state.observed_tables(), 0);
        state.publish_snapshot("t1").await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_closed_observer_does_not_block_others() {
        let state = state();
        let (dead, dead_rx) = mpsc::channel(8);
        drop(dead_rx);
        let (live, mut live_rx) = mpsc::channel(8);
        state.subscribe("t1", Uuid::new_v4(), dead);
        state.subscribe("t1", Uuid::new_v4(), live);

        state.publish_snapshot("t1").await;
        assert!(matches!(live_rx.recv().await, Some(ServerMessage::TableSnapshot(_))));
    }

    #[test]
    fn test_table_entry_kept_while_observed() {
        let state = state();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let (tx, _rx) = mpsc::channel(8);
        state.subscribe("t1", first, tx.clone());
        state.subscribe("t1", second, tx);

        state.unsubscribe("t1", first);
        assert_eq!(state.observed_tables(), 1);
        assert_eq!(state.observer_count("t1"), 1);

        state.unsubscribe("t1", second);
        assert_eq!(state.observed_tables(), 0);

        // unknown ids and tables are ignored
        state.unsubscribe("t1", second);
        state.unsubscribe("nope", first);
        assert_eq!(state.observed_tables(), 0);
    }
}
