// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-task lifecycle records.
//!
//! Records are created at enqueue time and only ever move forward
//! (`queued → processing → sent | error`). Nothing is evicted: the table
//! grows for the lifetime of the process.

use std::collections::BTreeMap;

use chrono::Utc;
use dashmap::DashMap;

use courier_core::{StatusRecord, TaskState};

/// Task id → lifecycle record. Written by the dispatch worker, read by handlers.
#[derive(Debug, Default)]
pub struct StatusTable {
    records: DashMap<String, StatusRecord>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any previous record with the same id.
    pub fn insert(&self, record: StatusRecord) {
        self.records.insert(record.task_id.0.clone(), record);
    }

    /// Exact-id lookup.
    pub fn get(&self, task_id: &str) -> Option<StatusRecord> {
        self.records.get(task_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of every record, ordered by task id (ids start with the enqueue time).
    pub fn snapshot(&self) -> BTreeMap<String, StatusRecord> {
        self.records
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    pub fn mark_processing(&self, task_id: &str) {
        if let Some(mut record) = self.records.get_mut(task_id) {
            record.state = TaskState::Processing;
            record.started_at = Some(Utc::now());
        }
    }

    pub fn mark_sent(&self, task_id: &str) {
        if let Some(mut record) = self.records.get_mut(task_id) {
            record.state = TaskState::Sent;
            record.completed_at = Some(Utc::now());
        }
    }

    pub fn mark_failed(&self, task_id: &str, error: impl Into<String>) {
        if let Some(mut record) = self.records.get_mut(task_id) {
            record.state = TaskState::Error;
            record.error = Some(error.into());
            record.completed_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::SendTask;

    #[test]
    fn lifecycle_transitions() {
        let table = StatusTable::new();
        let task = SendTask::text("5511", "hi");
        table.insert(StatusRecord::queued(&task, 1));

        let record = table.get(task.id.as_str()).unwrap();
        assert_eq!(record.state, TaskState::Queued);
        assert!(record.started_at.is_none());

        table.mark_processing(task.id.as_str());
        let record = table.get(task.id.as_str()).unwrap();
        assert_eq!(record.state, TaskState::Processing);
        assert!(record.started_at.is_some());
        assert!(record.completed_at.is_none());

        table.mark_failed(task.id.as_str(), "chat not found");
        let record = table.get(task.id.as_str()).unwrap();
        assert_eq!(record.state, TaskState::Error);
        assert_eq!(record.error.as_deref(), Some("chat not found"));
        assert!(record.completed_at.is_some());
        assert_eq!(record.position, 1);
    }

    #[test]
    fn unknown_id_is_none() {
        let table = StatusTable::new();
        assert!(table.get("nope").is_none());
        table.mark_sent("nope");
        assert!(table.is_empty());
    }

    #[test]
    fn snapshot_holds_every_record() {
        let table = StatusTable::new();
        for i in 0..5 {
            let task = SendTask::text(format!("{i}"), "x");
            table.insert(StatusRecord::queued(&task, i + 1));
        }
        assert_eq!(table.len(), 5);
        assert_eq!(table.snapshot().len(), 5);
    }
}
