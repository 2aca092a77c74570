//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use ocsw_interface::LookupTables;
use ocsw_utils::ip::AddressFamily;
use ocsw_utils::task::Task;
use ocsw_yang::{Path, ToYang};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tokio::runtime::Handle;
use tonic::Request;
use tracing::{debug, debug_span, warn};

use crate::northbound::Northbound;
use crate::northbound::client::gnmi::{GnmiService, proto};

const HELP: &str = "\
show running-config [path]  Display the running configuration
show tables                 Display the configuration lookup tables
show history                Display the committed transactions
show capabilities           Display the supported models and encodings
save                        Save the running configuration snapshot
help                        Display this help message
exit                        Leave the shell";

// Diagnostic shell commands. None of them changes the configuration.
#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    ShowRunning(Option<Path>),
    ShowTables,
    ShowHistory,
    ShowCapabilities,
    Save,
    Help,
    Exit,
}

#[derive(Debug)]
pub struct Shell {
    nb: Arc<Northbound>,
    gnmi: GnmiService,
}

// ===== impl Command =====

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Command, String> {
        let words = line.split_whitespace().collect::<Vec<_>>();
        match words.as_slice() {
            ["show", "running-config"] => Ok(Command::ShowRunning(None)),
            ["show", "running-config", path] => path
                .parse()
                .map(|path| Command::ShowRunning(Some(path)))
                .map_err(|error: ocsw_yang::Error| error.to_string()),
            ["show", "tables"] => Ok(Command::ShowTables),
            ["show", "history"] => Ok(Command::ShowHistory),
            ["show", "capabilities"] => Ok(Command::ShowCapabilities),
            ["save"] => Ok(Command::Save),
            ["help"] | ["?"] => Ok(Command::Help),
            ["exit"] | ["quit"] => Ok(Command::Exit),
            _ => Err(format!("unknown command: {}", line.trim())),
        }
    }
}

// ===== impl Shell =====

impl Shell {
    pub fn new(nb: Arc<Northbound>) -> Shell {
        let gnmi = GnmiService::new(nb.clone());
        Shell { nb, gnmi }
    }

    // Executes a command, returning its output.
    pub async fn execute(&self, command: Command) -> Result<String, String> {
        debug_span!("northbound").in_scope(|| {
            debug_span!("client", name = "shell").in_scope(|| {
                debug!(?command, "received command");
            });
        });

        match command {
            Command::ShowRunning(path) => {
                let path = path.unwrap_or_default();
                let value = self
                    .nb
                    .get(&path)
                    .await
                    .map_err(|error| error.to_string())?;
                serde_json::to_string_pretty(&value)
                    .map_err(|error| error.to_string())
            }
            Command::ShowTables => Ok(fmt_tables(&self.nb.tables().await)),
            Command::ShowHistory => {
                let transactions = self.nb.transactions().await;
                serde_json::to_string_pretty(&transactions)
                    .map_err(|error| error.to_string())
            }
            Command::ShowCapabilities => {
                let request = Request::new(proto::CapabilityRequest {});
                let response = self
                    .gnmi
                    .capabilities(request)
                    .await
                    .map_err(|status| status.message().to_owned())?
                    .into_inner();
                Ok(fmt_capabilities(&response))
            }
            Command::Save => self
                .nb
                .save_snapshot()
                .await
                .map(|_| "Configuration saved".to_owned())
                .map_err(|error| error.to_string()),
            Command::Help => Ok(HELP.to_owned()),
            Command::Exit => Ok(String::new()),
        }
    }

    // Reads and executes commands until the user leaves the shell.
    fn run(&self, runtime: &Handle) {
        let mut line_editor = Reedline::create();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("ocswd".to_owned()),
            DefaultPromptSegment::Empty,
        );

        loop {
            let line = match line_editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => line,
                Ok(Signal::CtrlC) => continue,
                Ok(_) => break,
                Err(error) => {
                    warn!(%error, "failed to read shell input");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(Command::Exit) => break,
                Ok(command) => command,
                Err(error) => {
                    println!("% {error}");
                    continue;
                }
            };
            match runtime.block_on(self.execute(command)) {
                Ok(output) => println!("{output}"),
                Err(error) => println!("% {error}"),
            }
        }
    }
}

// ===== helper functions =====

fn fmt_tables(tables: &LookupTables) -> String {
    let lines = tables
        .interfaces()
        .map(|ifname| {
            let mut attrs = vec![];
            if let Some(index) = tables.index_of(&ifname) {
                attrs.push(format!("index {index}"));
            }
            if let Some(lag_type) = tables.lag_type(&ifname) {
                attrs.push(format!("lag-type {}", lag_type.to_yang()));
                let members = tables.eths_by_lag(&ifname);
                if !members.is_empty() {
                    attrs.push(format!("members {}", members.join(",")));
                }
            }
            if let Some(lag) = tables.lag_by_eth(&ifname) {
                attrs.push(format!("aggregate-id {lag}"));
            }
            for (af, name) in
                [(AddressFamily::Ipv4, "ipv4"), (AddressFamily::Ipv6, "ipv6")]
            {
                let addrs = tables.addresses(&ifname, af);
                if !addrs.is_empty() {
                    attrs.push(format!("{name} {}", addrs.iter().join(",")));
                }
            }
            if let Some(mode) = tables.vlan_mode(&ifname) {
                attrs.push(format!("vlan-mode {}", mode.to_yang()));
            }
            format!("{ifname}: {}", attrs.join(", "))
        })
        .collect::<Vec<_>>();

    if lines.is_empty() {
        return "No interfaces configured".to_owned();
    }
    lines.join("\n")
}

fn fmt_capabilities(response: &proto::CapabilityResponse) -> String {
    let mut lines = vec![
        format!("gNMI version: {}", response.g_nmi_version),
        format!(
            "Encodings: {}",
            response
                .supported_encodings
                .iter()
                .map(|encoding| format!("{encoding:?}"))
                .join(", ")
        ),
        "Models:".to_owned(),
    ];
    lines.extend(
        response
            .supported_models
            .iter()
            .map(|model| format!("  {} {}", model.name, model.version)),
    );
    lines.join("\n")
}

// ===== global functions =====

// Starts the interactive shell on a blocking thread.
pub fn start(nb: Arc<Northbound>) -> Task<()> {
    let runtime = Handle::current();
    let shell = Shell::new(nb);
    Task::spawn_blocking(move || shell.run(&runtime))
}

// ===== unit tests =====
