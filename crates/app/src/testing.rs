//! In-memory test doubles for the app-layer ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use velobridge_domain::battery::{BatteryReading, SequenceItem};
use velobridge_domain::error::TelemetryError;
use velobridge_domain::id::BatteryId;
use velobridge_domain::location::LocationReading;

use crate::ports::{ReadingStore, ReadingTransaction, Subscriber, TopicHandler};

/// Where the in-memory store should fail.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    Begin,
    /// Zero-based index of the statement within a transaction; 0 is the
    /// parent insert.
    Statement(usize),
    Commit,
    Location,
}

/// Committed contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub batteries: Vec<(BatteryId, BatteryReading)>,
    pub cell_voltages: Vec<(BatteryId, SequenceItem)>,
    pub bat_temps: Vec<(BatteryId, SequenceItem)>,
    pub locations: Vec<LocationReading>,
    pub statements_attempted: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Default)]
struct State {
    committed: Snapshot,
    next_id: i64,
    fault: Option<Fault>,
}

fn injected() -> TelemetryError {
    TelemetryError::Storage(Box::new(std::io::Error::other("injected failure")))
}

/// Store that keeps committed rows in memory and can fail on demand.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn with_fault(fault: Fault) -> Self {
        let store = Self::default();
        store.set_fault(Some(fault));
        store
    }

    pub fn set_fault(&self, fault: Option<Fault>) {
        self.state.lock().unwrap().fault = fault;
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().unwrap().committed.clone()
    }
}

impl ReadingStore for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, TelemetryError> {
        let fault = self.state.lock().unwrap().fault;
        if matches!(fault, Some(Fault::Begin)) {
            return Err(injected());
        }
        Ok(InMemoryTransaction {
            state: Arc::clone(&self.state),
            fault,
            staged: Snapshot::default(),
            statement: 0,
        })
    }

    async fn insert_location(&self, reading: &LocationReading) -> Result<(), TelemetryError> {
        let mut state = self.state.lock().unwrap();
        if matches!(state.fault, Some(Fault::Location)) {
            return Err(injected());
        }
        state.committed.locations.push(reading.clone());
        Ok(())
    }
}

/// Transaction staging rows until commit.
pub(crate) struct InMemoryTransaction {
    state: Arc<Mutex<State>>,
    fault: Option<Fault>,
    staged: Snapshot,
    statement: usize,
}

impl InMemoryTransaction {
    fn next_statement(&mut self) -> Result<(), TelemetryError> {
        let index = self.statement;
        self.statement += 1;
        self.state.lock().unwrap().committed.statements_attempted += 1;
        match self.fault {
            Some(Fault::Statement(failing)) if failing == index => Err(injected()),
            _ => Ok(()),
        }
    }
}

impl ReadingTransaction for InMemoryTransaction {
    async fn insert_battery(&mut self, reading: &BatteryReading) -> Result<BatteryId, TelemetryError> {
        self.next_statement()?;
        let id = {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            BatteryId::from_raw(state.next_id)
        };
        self.staged.batteries.push((id, reading.clone()));
        Ok(id)
    }

    async fn insert_cell_voltage(
        &mut self,
        battery_id: BatteryId,
        item: SequenceItem,
    ) -> Result<(), TelemetryError> {
        self.next_statement()?;
        self.staged.cell_voltages.push((battery_id, item));
        Ok(())
    }

    async fn insert_bat_temp(
        &mut self,
        battery_id: BatteryId,
        item: SequenceItem,
    ) -> Result<(), TelemetryError> {
        self.next_statement()?;
        self.staged.bat_temps.push((battery_id, item));
        Ok(())
    }

    async fn commit(self) -> Result<(), TelemetryError> {
        if matches!(self.fault, Some(Fault::Commit)) {
            return Err(injected());
        }
        let mut state = self.state.lock().unwrap();
        let committed = &mut state.committed;
        committed.batteries.extend(self.staged.batteries);
        committed.cell_voltages.extend(self.staged.cell_voltages);
        committed.bat_temps.extend(self.staged.bat_temps);
        committed.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), TelemetryError> {
        self.state.lock().unwrap().committed.rollbacks += 1;
        Ok(())
    }
}

/// Subscriber recording bound handlers so tests can deliver payloads directly.
#[derive(Default)]
pub(crate) struct RecordingSubscriber {
    pub handlers: HashMap<String, TopicHandler>,
    pub reject: bool,
}

impl RecordingSubscriber {
    pub async fn deliver(&self, topic: &str, payload: &[u8]) {
        let handler = self.handlers.get(topic).expect("topic should be bound");
        handler(payload.to_vec()).await;
    }
}

impl Subscriber for RecordingSubscriber {
    async fn subscribe(&mut self, topic: &str, handler: TopicHandler) -> Result<(), TelemetryError> {
        if self.reject {
            return Err(TelemetryError::Broker(Box::new(std::io::Error::other(
                "subscription refused",
            ))));
        }
        self.handlers.insert(topic.to_string(), handler);
        Ok(())
    }
}
