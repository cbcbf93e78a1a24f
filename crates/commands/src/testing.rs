//! Test doubles: a shared integer cell and a command that sets it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use slidedeck_core::{DomainError, DomainResult};

use crate::command::{Command, CommandMeta};
use crate::error::CommandResult;
use crate::record::CommandRecord;

#[derive(Debug)]
struct CellInner {
    id: Uuid,
    value: Mutex<i64>,
    applies: AtomicUsize,
    fail_apply: AtomicBool,
    fail_revert: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

/// Shared integer standing in for an entity store.
#[derive(Debug, Clone)]
pub(crate) struct Cell {
    inner: Arc<CellInner>,
}

impl Cell {
    pub(crate) fn new(value: i64) -> Self {
        Self {
            inner: Arc::new(CellInner {
                id: Uuid::now_v7(),
                value: Mutex::new(value),
                applies: AtomicUsize::new(0),
                fail_apply: AtomicBool::new(false),
                fail_revert: AtomicBool::new(false),
                delay: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn get(&self) -> i64 {
        *self.inner.value.lock().unwrap()
    }

    fn set(&self, value: i64) {
        *self.inner.value.lock().unwrap() = value;
    }

    pub(crate) fn applies(&self) -> usize {
        self.inner.applies.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_apply(&self) {
        self.inner.fail_apply.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_revert(&self) {
        self.inner.fail_revert.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_delay(&self, delay: Option<Duration>) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    async fn pause(&self) {
        let delay = *self.inner.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SetValuePayload {
    value: i64,
}

/// Sets the cell to `value`, remembering the previous value for undo.
#[derive(Debug)]
pub(crate) struct SetValue {
    meta: CommandMeta,
    value: i64,
    prior: Option<i64>,
    cell: Cell,
}

impl SetValue {
    pub(crate) const TYPE: &'static str = "test.set";

    pub(crate) fn new(cell: &Cell, value: i64) -> Self {
        Self {
            meta: CommandMeta::new(Self::TYPE, cell.inner.id, "cell"),
            value,
            prior: None,
            cell: cell.clone(),
        }
    }

    pub(crate) fn boxed(cell: &Cell, value: i64) -> Box<dyn Command> {
        Box::new(Self::new(cell, value))
    }

    pub(crate) fn from_record(record: &CommandRecord, cell: &Cell) -> CommandResult<Self> {
        let payload: SetValuePayload = record.payload_as()?;
        Ok(Self {
            meta: CommandMeta::from_record(record),
            value: payload.value,
            prior: None,
            cell: cell.clone(),
        })
    }
}

#[async_trait]
impl Command for SetValue {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn description(&self) -> String {
        format!("Set value to {}", self.value)
    }

    fn payload(&self) -> JsonValue {
        serde_json::json!({ "value": self.value })
    }

    async fn apply(&mut self) -> DomainResult<()> {
        self.cell.pause().await;
        if self.cell.inner.fail_apply.swap(false, Ordering::SeqCst) {
            return Err(DomainError::unavailable("injected apply failure"));
        }
        self.prior = Some(self.cell.get());
        self.cell.set(self.value);
        self.cell.inner.applies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn revert(&mut self) -> DomainResult<()> {
        self.cell.pause().await;
        if self.cell.inner.fail_revert.swap(false, Ordering::SeqCst) {
            return Err(DomainError::conflict("injected revert failure"));
        }
        let prior = self
            .prior
            .ok_or_else(|| DomainError::invariant("no prior value captured"))?;
        self.cell.set(prior);
        Ok(())
    }
}
