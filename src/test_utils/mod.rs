//! Scripted in-memory transport for tests.
//!
//! `MockTransport` records every submitted statement and replays scripted
//! results in order. An unscripted submission completes immediately with no
//! rows, which keeps execute-path tests short.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::WarehouseDbError;
use crate::transport::{
    ConnectOptions, StatementHandle, StatementStatus, Transport, TransportConnection, WireRow,
};
use crate::types::RowValue;

/// One statement as the transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub binds: Vec<RowValue>,
}

/// What the next submitted statement should do.
#[derive(Debug, Clone)]
pub enum ScriptedResult {
    /// Stream these rows, then end.
    Rows(Vec<WireRow>),
    /// Stream these rows, then fail the stream.
    RowsThenError(Vec<WireRow>, String),
    /// Reject the submission itself.
    SubmitError(String),
    /// Report these statuses in order from `status()`; the last one repeats.
    Statuses(Vec<StatementStatus>),
}

#[derive(Default)]
struct MockState {
    script: VecDeque<ScriptedResult>,
    statements: Vec<RecordedStatement>,
    connects: usize,
    status_reads: usize,
}

/// Scripted [`Transport`] double.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

fn lock(state: &Arc<Mutex<MockState>>) -> MutexGuard<'_, MockState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the behavior of the next submitted statement.
    pub fn push(&self, result: ScriptedResult) {
        lock(&self.state).script.push_back(result);
    }

    /// Every statement submitted so far, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<RecordedStatement> {
        lock(&self.state).statements.clone()
    }

    /// How many connections the pool has opened.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        lock(&self.state).connects
    }

    /// How many times statement status has been polled, across statements.
    #[must_use]
    pub fn status_read_count(&self) -> usize {
        lock(&self.state).status_reads
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(
        &self,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn TransportConnection>, WarehouseDbError> {
        lock(&self.state).connects += 1;
        Ok(Box::new(MockConnection {
            state: self.state.clone(),
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl TransportConnection for MockConnection {
    async fn submit(
        &mut self,
        sql: &str,
        binds: &[RowValue],
    ) -> Result<Box<dyn StatementHandle>, WarehouseDbError> {
        let mut state = lock(&self.state);
        state.statements.push(RecordedStatement {
            sql: sql.to_string(),
            binds: binds.to_vec(),
        });
        let scripted = state
            .script
            .pop_front()
            .unwrap_or(ScriptedResult::Rows(Vec::new()));
        match scripted {
            ScriptedResult::SubmitError(message) => {
                Err(WarehouseDbError::ExecutionError(message))
            }
            ScriptedResult::Rows(rows) => Ok(Box::new(MockStatement {
                state: self.state.clone(),
                rows: rows.into(),
                stream_error: None,
                statuses: VecDeque::new(),
            })),
            ScriptedResult::RowsThenError(rows, message) => Ok(Box::new(MockStatement {
                state: self.state.clone(),
                rows: rows.into(),
                stream_error: Some(message),
                statuses: VecDeque::new(),
            })),
            ScriptedResult::Statuses(statuses) => Ok(Box::new(MockStatement {
                state: self.state.clone(),
                rows: VecDeque::new(),
                stream_error: None,
                statuses: statuses.into(),
            })),
        }
    }
}

struct MockStatement {
    state: Arc<Mutex<MockState>>,
    rows: VecDeque<WireRow>,
    stream_error: Option<String>,
    statuses: VecDeque<StatementStatus>,
}

#[async_trait]
impl StatementHandle for MockStatement {
    async fn next_row(&mut self) -> Result<Option<WireRow>, WarehouseDbError> {
        if let Some(row) = self.rows.pop_front() {
            return Ok(Some(row));
        }
        if let Some(message) = self.stream_error.take() {
            return Err(WarehouseDbError::StreamError(message));
        }
        Ok(None)
    }

    async fn status(&mut self) -> Result<StatementStatus, WarehouseDbError> {
        lock(&self.state).status_reads += 1;
        let status = if self.statuses.len() > 1 {
            self.statuses.pop_front()
        } else {
            self.statuses.front().copied()
        };
        Ok(status.unwrap_or(StatementStatus::Complete))
    }
}
