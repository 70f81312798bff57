//! Fake backend collaborators shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use rosa_console::backend::{StatusClient, TaskResponse, TaskRunner};
use rosa_console::operations::TaskRequest;
use rosa_console::status::{
    AuthStatus, ConfigStatus, ConfiguredField, ConnectionStatus, NextAction,
    REQUIRED_CONFIG_FIELDS, SetupStatus,
};
use rosa_console::storage::{MemoryStore, PersistenceLayer};
use rosa_console::{Console, ConsoleSettings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Status backend returning fixed values, or an error per source
#[derive(Clone)]
pub struct FakeStatus {
    pub authenticated: bool,
    pub fields: Vec<ConfiguredField>,
    pub connected: bool,
    pub connection_error: Option<String>,
}

impl FakeStatus {
    pub fn ready() -> Self {
        Self {
            authenticated: true,
            fields: all_fields(),
            connected: true,
            connection_error: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            ..Self::ready()
        }
    }
}

pub fn all_fields() -> Vec<ConfiguredField> {
    REQUIRED_CONFIG_FIELDS
        .iter()
        .map(|f| ConfiguredField::new(*f, "****"))
        .collect()
}

#[async_trait]
impl StatusClient for FakeStatus {
    async fn fetch_auth(&self) -> Result<AuthStatus> {
        Ok(AuthStatus {
            authenticated: self.authenticated,
            ..AuthStatus::default()
        })
    }

    async fn fetch_config(&self) -> Result<ConfigStatus> {
        Ok(ConfigStatus {
            // The backend flag is ignored by the aggregator
            configured: true,
            configured_fields: self.fields.clone(),
            ..ConfigStatus::default()
        })
    }

    async fn fetch_connection(&self) -> Result<ConnectionStatus> {
        if let Some(error) = &self.connection_error {
            return Err(anyhow::anyhow!("{}", error));
        }
        Ok(ConnectionStatus {
            connected: self.connected,
            api_url: Some("https://api.hub.example.com:6443".to_string()),
            ..ConnectionStatus::default()
        })
    }

    async fn fetch_setup(&self) -> Result<SetupStatus> {
        Ok(SetupStatus {
            current_step: 4,
            next_action: NextAction::Ready,
            all_prerequisites_met: true,
        })
    }
}

/// How the fake runner answers
#[derive(Clone)]
pub enum Behavior {
    Respond(TaskResponse),
    RespondAfter(Duration, TaskResponse),
    Error(String),
    Hang,
}

/// Task runner that records every request it receives
pub struct FakeRunner {
    behavior: Behavior,
    calls: AtomicUsize,
    tasks: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tasks(&self) -> Vec<String> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskRunner for FakeRunner {
    async fn run_task(&self, request: &TaskRequest) -> Result<TaskResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tasks.lock().unwrap().push(request.task_id.clone());

        match &self.behavior {
            Behavior::Respond(response) => Ok(response.clone()),
            Behavior::RespondAfter(delay, response) => {
                tokio::time::sleep(*delay).await;
                Ok(response.clone())
            }
            Behavior::Error(message) => Err(anyhow::anyhow!("{}", message)),
            Behavior::Hang => std::future::pending::<Result<TaskResponse>>().await,
        }
    }
}

pub fn console(status: FakeStatus, runner: Arc<FakeRunner>) -> Console {
    console_with_store(status, runner, MemoryStore::new())
}

pub fn console_with_store(
    status: FakeStatus,
    runner: Arc<FakeRunner>,
    store: MemoryStore,
) -> Console {
    Console::new(
        Arc::new(status),
        runner,
        PersistenceLayer::new(Arc::new(store)),
        ConsoleSettings::default(),
    )
}
