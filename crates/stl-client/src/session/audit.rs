// ST&L Logistics
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Audit trail for session lifecycle events

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{info, warn};

/// Audit event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AuditEventType {
    /// Session restored or left anonymous at startup
    Bootstrap,
    /// Credentials exchanged for tokens
    Login,
    /// Current-user resource fetched
    ProfileFetch,
    /// Session cleared after a failed profile fetch
    SessionInvalidated,
    /// Session cleared on request
    Logout,
    /// Client account created
    Registration,
}

/// Audit event result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditResult {
    Success,
    Failure,
}

/// Audit event entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: String,

    pub event_type: AuditEventType,
    pub timestamp: DateTime<Utc>,

    /// Username the event concerns, when known
    pub actor: Option<String>,

    pub result: AuditResult,

    /// Additional event details
    pub details: HashMap<String, String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, actor: Option<String>, result: AuditResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            timestamp: Utc::now(),
            actor,
            result,
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Bounded in-memory audit log, mirrored to structured logging
#[derive(Debug)]
pub struct AuditLogger {
    events: RwLock<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLogger {
    pub fn new() -> Self {
        Self::with_max_events(1000)
    }

    pub fn with_max_events(max_events: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            max_events: max_events.max(1),
        }
    }

    /// Record an event, dropping the oldest once the log is full
    pub fn log_event(&self, event: AuditEvent) {
        match event.result {
            AuditResult::Success => {
                info!(event_type = ?event.event_type, actor = ?event.actor, details = ?event.details, "Audit event: {:?}", event.event_type);
            }
            AuditResult::Failure => {
                warn!(event_type = ?event.event_type, actor = ?event.actor, details = ?event.details, "Audit event: {:?} failed", event.event_type);
            }
        }

        let mut events = self.events.write();
        events.push_back(event);
        while events.len() > self.max_events {
            events.pop_front();
        }
    }

    pub fn log(&self, event_type: AuditEventType, actor: Option<&str>, result: AuditResult) {
        self.log_event(AuditEvent::new(event_type, actor.map(str::to_string), result));
    }

    pub fn log_failure(&self, event_type: AuditEventType, actor: Option<&str>, reason: &str) {
        self.log_event(AuditEvent::new(event_type, actor.map(str::to_string), AuditResult::Failure).with_detail("reason", reason));
    }

    /// Most recent events first
    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        self.events.read().iter().rev().take(limit).cloned().collect()
    }

    pub fn events_of_type(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.events.read().iter().filter(|event| event.event_type == event_type).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}
