//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use derive_new::new;
use ocsw_interface::{Engine, LookupTables, SwitchClient};
use ocsw_yang::device::Device;
use ocsw_yang::{Path, tree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::northbound::client::api::{CommitConfiguration, CommitResponse};
use crate::northbound::{Error, Result, snapshot};

#[derive(Debug)]
pub struct Northbound {
    // Running configuration along with its lookup tables.
    datastore: RwLock<Datastore>,
    // Configuration transaction engine.
    engine: Engine,
    // Location of the configuration snapshot.
    snapshot_path: PathBuf,
}

#[derive(Debug)]
struct Datastore {
    running: Device,
    tables: LookupTables,
    transactions: Vec<Transaction>,
    next_id: u32,
}

#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct Transaction {
    // Unique identifier for the transaction.
    #[new(default)]
    pub id: u32,

    // Date and time for when the transaction occurred.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,

    // Optional comment for the transaction.
    pub comment: String,

    // Commands executed against the switch.
    pub commands: Vec<String>,
}

// ===== impl Northbound =====

impl Northbound {
    pub fn new(
        config: &Config,
        client: Arc<dyn SwitchClient>,
    ) -> Northbound {
        let engine = Engine::new(client, config.switch.rpc_deadline());
        let datastore = Datastore {
            running: Device::default(),
            tables: LookupTables::new(config.switch.limits()),
            transactions: Default::default(),
            next_id: 0,
        };

        Northbound {
            datastore: RwLock::new(datastore),
            engine,
            snapshot_path: PathBuf::from(&config.snapshot_path),
        }
    }

    // Loads the configuration snapshot, if any, and replays it as a single
    // transaction from the empty configuration.
    #[instrument(skip_all, "northbound")]
    pub async fn load_snapshot(&self) -> Result<()> {
        let Some(device) = snapshot::load(&self.snapshot_path)? else {
            info!(path = %self.snapshot_path.display(), "no snapshot found");
            return Ok(());
        };

        let config = CommitConfiguration::Replace(device);
        let response = self.commit(config, "snapshot replay").await?;
        info!(
            path = %self.snapshot_path.display(),
            commands = %response.commands.len(),
            "snapshot replayed"
        );
        Ok(())
    }

    // Saves the running configuration to the snapshot file.
    #[instrument(skip_all, "northbound")]
    pub async fn save_snapshot(&self) -> Result<()> {
        let datastore = self.datastore.read().await;
        snapshot::save(&self.snapshot_path, &datastore.running)?;
        info!(path = %self.snapshot_path.display(), "snapshot saved");
        Ok(())
    }

    // Returns the running configuration subtree addressed by the given path.
    pub async fn get(&self, path: &Path) -> Result<Value> {
        let datastore = self.datastore.read().await;
        let running =
            datastore.running.to_value().map_err(Error::YangInternal)?;
        tree::lookup(&running, path)
            .cloned()
            .ok_or_else(|| Error::PathNotFound(path.clone()))
    }

    // Changes the running configuration.
    //
    // The write lock is held during the whole transaction, so readers never
    // observe a partially applied configuration.
    #[instrument(skip_all, "northbound")]
    pub async fn commit(
        &self,
        config: CommitConfiguration,
        comment: &str,
    ) -> Result<CommitResponse> {
        let mut datastore = self.datastore.write().await;
        let candidate = datastore.candidate(config)?;

        // Check if the configuration has changed.
        if candidate == datastore.running {
            debug!("configuration unchanged");
            return Ok(CommitResponse {
                transaction_id: 0,
                commands: vec![],
            });
        }

        let outcome = self
            .engine
            .commit(&datastore.tables, &datastore.running, &candidate)
            .await
            .map_err(|error| {
                error.log();
                Error::Transaction(error)
            })?;

        // Update the running configuration.
        datastore.running = candidate;
        datastore.tables = outcome.tables;

        // Record the transaction.
        let transaction =
            Transaction::new(Utc::now(), comment.to_owned(), outcome.commands);
        let transaction_id = datastore.record(transaction.clone());
        info!(
            %transaction_id,
            commands = %transaction.commands.len(),
            "configuration committed"
        );

        Ok(CommitResponse {
            transaction_id,
            commands: transaction.commands,
        })
    }

    // Returns all committed transactions, oldest first.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.datastore.read().await.transactions.clone()
    }

    // Returns a copy of the running lookup tables.
    pub async fn tables(&self) -> LookupTables {
        self.datastore.read().await.tables.clone()
    }
}

// ===== impl Datastore =====

impl Datastore {
    // Builds the candidate configuration of a commit request.
    fn candidate(&self, config: CommitConfiguration) -> Result<Device> {
        match config {
            CommitConfiguration::Replace(device) => Ok(device),
            CommitConfiguration::Edit(edits) => {
                let mut candidate =
                    self.running.to_value().map_err(Error::YangInternal)?;
                for edit in edits {
                    edit.apply(&mut candidate)?;
                }
                Device::from_value(candidate).map_err(|error| {
                    warn!(%error, "invalid candidate configuration");
                    Error::YangInvalidData(error)
                })
            }
        }
    }

    // Assigns the next transaction ID and stores the transaction.
    fn record(&mut self, mut transaction: Transaction) -> u32 {
        self.next_id += 1;
        transaction.id = self.next_id;
        self.transactions.push(transaction);
        self.next_id
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use ocsw_interface::SimulatedSwitch;
    use ocsw_interface::southbound::{FailurePolicy, SwitchRequest};
    use serde_json::json;

    use super::*;
    use crate::northbound::client::api::Edit;

    fn northbound(
        snapshot_path: &str,
    ) -> (Arc<SimulatedSwitch>, Northbound) {
        let config = Config {
            snapshot_path: snapshot_path.to_owned(),
            ..Default::default()
        };
        let switch = Arc::new(SimulatedSwitch::new());
        let nb = Northbound::new(&config, switch.clone());
        (switch, nb)
    }

    fn interface_path(name: &str) -> Path {
        format!("/interfaces/interface[name={name}]").parse().unwrap()
    }

    fn create_interface(name: &str) -> CommitConfiguration {
        CommitConfiguration::Edit(vec![Edit::Update(
            interface_path(name),
            json!({"config": {"name": name}}),
        )])
    }

    #[tokio::test]
    async fn commit_records_transaction() {
        let (switch, nb) = northbound("/nonexistent/running.json");

        let response = nb.commit(create_interface("eth-1"), "test").await;
        let response = response.unwrap();
        assert_eq!(response.transaction_id, 1);
        assert_eq!(response.commands, vec!["create-eth(eth-1)".to_owned()]);
        assert_eq!(
            switch.log(),
            vec![SwitchRequest::CreateEthernetIntf {
                ifname: "eth-1".to_owned()
            }]
        );

        let transactions = nb.transactions().await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, 1);
        assert_eq!(transactions[0].comment, "test");
        assert!(nb.tables().await.is_configured("eth-1"));

        let value = nb.get(&interface_path("eth-1")).await.unwrap();
        assert_eq!(value["name"], "eth-1");
    }

    #[tokio::test]
    async fn unchanged_configuration() {
        let (switch, nb) = northbound("/nonexistent/running.json");
        nb.commit(create_interface("eth-1"), "").await.unwrap();
        switch.clear_log();

        let response =
            nb.commit(create_interface("eth-1"), "").await.unwrap();
        assert_eq!(response.transaction_id, 0);
        assert!(response.commands.is_empty());
        assert!(switch.log().is_empty());
        assert_eq!(nb.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_commit_keeps_running() {
        let (switch, nb) = northbound("/nonexistent/running.json");
        nb.commit(create_interface("eth-1"), "").await.unwrap();
        switch.set_failure(FailurePolicy::Always);

        let error = nb.commit(create_interface("eth-2"), "").await;
        assert!(matches!(error, Err(Error::Transaction(..))));
        assert!(matches!(
            nb.get(&interface_path("eth-2")).await,
            Err(Error::PathNotFound(..))
        ));
        assert!(!nb.tables().await.is_configured("eth-2"));
        assert_eq!(nb.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn invalid_candidate() {
        let (switch, nb) = northbound("/nonexistent/running.json");

        let config = CommitConfiguration::Edit(vec![Edit::Update(
            interface_path("eth-1"),
            json!({"config": {"mtu": "large"}}),
        )]);
        let error = nb.commit(config, "").await;
        assert!(matches!(error, Err(Error::YangInvalidData(..))));
        assert!(switch.log().is_empty());
    }

    #[tokio::test]
    async fn snapshot_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("ocswd-snapshot-{}.json", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let (_, nb) = northbound(&path);
        nb.commit(create_interface("eth-1"), "").await.unwrap();
        nb.commit(create_interface("eth-2"), "").await.unwrap();
        nb.save_snapshot().await.unwrap();

        // A fresh daemon replays the snapshot against its switch.
        let (switch, nb) = northbound(&path);
        nb.load_snapshot().await.unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(switch.state().ethernet.len(), 2);
        assert!(nb.tables().await.is_configured("eth-2"));
        let transactions = nb.transactions().await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].comment, "snapshot replay");
    }

    #[tokio::test]
    async fn missing_snapshot() {
        let (switch, nb) = northbound("/nonexistent/running.json");
        nb.load_snapshot().await.unwrap();
        assert!(switch.log().is_empty());
    }
}
