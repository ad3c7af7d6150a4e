//! Shared fixtures for the integration tests
//!
//! Every test gets its own SQLite file in a temporary directory.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aula_server::audit::AuditWorker;
use aula_server::auth::hash_password;
use aula_server::db::DbService;
use aula_server::db::repository as repo;
use aula_server::notify::{MailError, Mailer, OutgoingEmail};
use aula_server::{Config, CurrentUser, ServerState};
use chrono::{NaiveDate, NaiveTime};
use shared::models::{Room, RoomCreate, Role};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const PASSWORD: &str = "secreto123";

/// Collects outgoing e-mails instead of sending them
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.subject.clone())
            .collect()
    }

    /// Mail is dispatched on a spawned task; wait until `n` messages arrived
    pub async fn wait_for(&self, n: usize) -> Vec<OutgoingEmail> {
        for _ in 0..100 {
            {
                let sent = self.sent.lock().unwrap();
                if sent.len() >= n {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub state: ServerState,
    pub mails: Arc<RecordingMailer>,
    pub shutdown: CancellationToken,
    _dir: TempDir,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

pub async fn setup() -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let db = DbService::new(&config.database_path).await.unwrap();

    let mails = Arc::new(RecordingMailer::default());
    let (state, audit_rx) = ServerState::assemble(&config, db.pool, mails.clone());

    let shutdown = CancellationToken::new();
    tokio::spawn(
        AuditWorker::new(state.audit_service.storage().clone()).run(audit_rx, shutdown.clone()),
    );

    TestContext {
        state,
        mails,
        shutdown,
        _dir: dir,
    }
}

pub async fn seed_user(state: &ServerState, name: &str, email: &str, role: Role) -> CurrentUser {
    let hash = hash_password(PASSWORD).unwrap();
    let user = repo::user::create(
        &state.pool,
        repo::user::NewUser {
            name,
            email,
            password_hash: &hash,
            role,
            phone: None,
        },
    )
    .await
    .unwrap();

    CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }
}

pub async fn seed_room(state: &ServerState, name: &str) -> Room {
    repo::room::create(
        &state.pool,
        RoomCreate {
            name: name.to_string(),
            module: "Módulo A".to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}
