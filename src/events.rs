// src/events.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use uuid::Uuid;

const AUDIT_CAPACITY: usize = 256;

/// Запись журнала аудита: какой администратор что изменил
#[derive(Serialize, Clone, Debug)]
pub struct AuditEvent {
    pub action: &'static str,
    /// `None` для операций оператора из CLI
    pub admin_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub details: BTreeMap<&'static str, String>,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: &'static str, admin_id: Option<Uuid>, subject_id: Option<Uuid>) -> Self {
        Self {
            action,
            admin_id,
            subject_id,
            details: BTreeMap::new(),
            at: Utc::now(),
        }
    }

    pub fn detail(mut self, key: &'static str, value: impl ToString) -> Self {
        self.details.insert(key, value.to_string());
        self
    }
}

/// Рассылка событий аудита подписчикам (журнал, тесты)
pub struct EventHub {
    tx: broadcast::Sender<AuditEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(AUDIT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: AuditEvent) {
        // без подписчиков событие просто теряется
        let _ = self.tx.send(event);
    }

    /// Писать события в журнал (target "audit") до закрытия канала
    pub fn spawn_logger(&self) -> tokio::task::JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => tracing::info!(
                        target: "audit",
                        action = event.action,
                        admin = ?event.admin_id,
                        subject = ?event.subject_id,
                        details = ?event.details,
                        "audit event"
                    ),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(target: "audit", "audit logger lagged, {} events dropped", skipped)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

/// `audit_log!(hub, "record.created", Some(admin), Some(id), "entrepriseId" => org)`
#[macro_export]
macro_rules! audit_log {
    ($hub:expr, $action:expr, $admin:expr, $subject:expr $(, $key:literal => $value:expr)* $(,)?) => {
        $hub.publish(
            $crate::events::AuditEvent::new($action, $admin, $subject)
                $(.detail($key, $value))*
        )
    };
}
