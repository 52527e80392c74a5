use crate::deck::Deck;
use crate::error::{GameError, GameResult};
use crate::state::{ActionType, Chips, Player, StreetOutcome, Table, TableConfig, TableId, TableSnapshot};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for transports: the table repository plus every table
/// operation.
///
/// Each table sits behind its own mutex. Every mutating call takes that lock
/// for its whole duration, so calls on one table are serialized while calls
/// on different tables never contend. The repository map only guards lookup
/// and insertion.
#[derive(Debug, Default)]
pub struct GameService {
    tables: DashMap<TableId, Arc<Mutex<Table>>>,
    config: TableConfig,
    seed: Option<u64>,
    tables_created: AtomicU64,
}

impl GameService {
    pub fn new() -> GameService {
        GameService::default()
    }

    pub fn with_config(config: TableConfig) -> GameService {
        GameService {
            config,
            ..GameService::default()
        }
    }

    /// Makes every deck reproducible: the n-th table created is seeded with
    /// `seed + n`.
    pub fn with_seed(mut self, seed: u64) -> GameService {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    fn new_deck(&self) -> Deck {
        let n = self.tables_created.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => Deck::with_seed(seed.wrapping_add(n)),
            None => Deck::new(),
        }
    }

    /// Creates an empty table at pre-flop with a fresh deck.
    pub fn create_table(&self, table_id: &str) -> GameResult<TableSnapshot> {
        match self.tables.entry(table_id.to_string()) {
            Entry::Occupied(_) => Err(GameError::TableAlreadyExists(table_id.to_string())),
            Entry::Vacant(slot) => {
                let table = Table::with_deck(table_id, self.config.clone(), self.new_deck());
                let snapshot = table.snapshot();
                slot.insert(Arc::new(Mutex::new(table)));
                info!(table = %table_id, "table created");
                Ok(snapshot)
            }
        }
    }

    pub fn join_player(&self, table_id: &str, player_id: &str, name: &str, chips: Chips) -> GameResult<()> {
        self.with_table(table_id, |table| {
            table.add_player(Player::new(player_id, name, chips))?;
            debug!(table = %table_id, player = %player_id, chips, "player joined");
            Ok(())
        })
    }

    pub fn start_game(&self, table_id: &str) -> GameResult<()> {
        self.with_table(table_id, Table::start_hand)
    }

    pub fn submit_action(
        &self,
        table_id: &str,
        player_id: &str,
        action: ActionType,
        amount: Chips,
    ) -> GameResult<()> {
        self.with_table(table_id, |table| table.apply_action(player_id, action, amount))
    }

    pub fn next_street(&self, table_id: &str) -> GameResult<StreetOutcome> {
        self.with_table(table_id, Table::advance_street)
    }

    /// Copy of the table's current state.
    pub fn get_table(&self, table_id: &str) -> GameResult<TableSnapshot> {
        let table = self.table(table_id)?;
        let snapshot = table.lock().snapshot();
        Ok(snapshot)
    }

    pub fn table_ids(&self) -> Vec<TableId> {
        self.tables.iter().map(|entry| entry.key().clone()).collect()
    }

    fn table(&self, table_id: &str) -> GameResult<Arc<Mutex<Table>>> {
        self.tables
            .get(table_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GameError::TableNotFound(table_id.to_string()))
    }

    /// Runs `op` while holding the table's lock. The map shard is released
    /// before the lock is taken, and the guard drops on every return path.
    fn with_table<T, F>(&self, table_id: &str, op: F) -> GameResult<T>
    where
        F: FnOnce(&mut Table) -> GameResult<T>,
    {
        let table = self.table(table_id)?;
        let mut guard = table.lock();
        op(&mut *guard)
    }
}
