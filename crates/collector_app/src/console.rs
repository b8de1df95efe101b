//! Line-oriented control surface: the popup and options page of the
//! browser extension, as stdin commands.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use collector_core::{normalize_endpoint, parse_list};
use collector_engine::{AgentHandle, ConfigStore, ReqwestTransport, Transport};
use collector_logging::collector_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan,
    Scroll,
    Enable,
    Disable,
    Status,
    Reset,
    Health,
    SetEndpoint(String),
    SetKeywords(Vec<String>),
    SetAccounts(Vec<String>),
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "scan" => Command::Scan,
        "scroll" => Command::Scroll,
        "enable" | "start" => Command::Enable,
        "disable" | "stop" => Command::Disable,
        "status" => Command::Status,
        "reset" => Command::Reset,
        "health" => Command::Health,
        "endpoint" => Command::SetEndpoint(normalize_endpoint(rest)),
        "keywords" => Command::SetKeywords(parse_list(rest)),
        "accounts" => Command::SetAccounts(parse_list(rest)),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(Some(command))
}

const HELP: &str = "\
commands:
  scan                 scan the current view now
  scroll               report view activity
  enable | disable     toggle automatic collection
  status               show settings and counters
  reset                zero the collected counter
  health               check the collector endpoint
  endpoint <url>       set the collector endpoint (blank for default)
  keywords <a, b, ..>  set keywords
  accounts <a, b, ..>  set monitored accounts
  quit";

pub struct Console {
    store: Arc<dyn ConfigStore>,
    agent: AgentHandle,
    transport: ReqwestTransport,
    /// Runs health checks; the agent's runtime lives on another thread.
    runtime: tokio::runtime::Runtime,
}

impl Console {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        agent: AgentHandle,
        transport: ReqwestTransport,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build runtime for health checks")?;
        Ok(Self {
            store,
            agent,
            transport,
            runtime,
        })
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&self, input: impl BufRead, mut out: impl Write) -> anyhow::Result<()> {
        writeln!(out, "type `help` for commands")?;
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    writeln!(out, "{message}")?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            if let Err(err) = self.execute(command, &mut out) {
                collector_warn!("Command failed: {:#}", err);
                writeln!(out, "error: {err:#}")?;
            }
        }
        Ok(())
    }

    fn execute(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Scan => {
                let ack = self.agent.scan_now_blocking()?;
                writeln!(out, "collected {} item(s)", ack.collected)?;
            }
            Command::Scroll => self.agent.scrolled(),
            Command::Enable | Command::Disable => {
                self.store.set_enabled(command == Command::Enable)?;
                self.agent.config_changed();
            }
            Command::Status => {
                let settings = self.store.load()?;
                writeln!(out, "enabled:   {}", settings.enabled)?;
                writeln!(out, "endpoint:  {}", settings.endpoint)?;
                writeln!(out, "keywords:  {}", settings.keywords.join(", "))?;
                writeln!(out, "accounts:  {}", settings.monitored_accounts.join(", "))?;
                writeln!(out, "collected: {}", settings.collected_count)?;
                writeln!(
                    out,
                    "last sync: {}",
                    settings.last_sync.as_deref().unwrap_or("never")
                )?;
            }
            Command::Reset => {
                self.store.reset_collected()?;
                writeln!(out, "collected count reset")?;
            }
            Command::Health => {
                let endpoint = self.store.config()?.endpoint;
                let reply = self.runtime.block_on(self.transport.health(&endpoint))?;
                writeln!(out, "{endpoint}: {reply}")?;
            }
            Command::SetEndpoint(endpoint) => {
                let mut config = self.store.config()?;
                config.endpoint = endpoint;
                self.save(&config)?;
            }
            Command::SetKeywords(keywords) => {
                let mut config = self.store.config()?;
                config.keywords = keywords;
                self.save(&config)?;
            }
            Command::SetAccounts(accounts) => {
                let mut config = self.store.config()?;
                config.monitored_accounts = accounts;
                self.save(&config)?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn save(&self, config: &collector_core::Config) -> anyhow::Result<()> {
        self.store.save(config)?;
        self.agent.config_changed();
        Ok(())
    }
}
