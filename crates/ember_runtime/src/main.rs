//! Ember Runtime
//!
//! Line-driven host for the scripting bridge. Each input line is one host
//! event; deferred work runs in the scheduling turn that follows it.
//!
//! Usage: `ember [--settings <file>] [--search-path <dir>]...`
//!
//! ```text
//! new [name]          create an owner, prints its identity
//! free <id>           destroy an owner
//! <id> <message...>   send a message, e.g. `u000001 eval 1+1`
//! quit
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use ember_core::{Diagnostic, OwnerId};
use ember_host::{Channel, Host, Output, Outlets};
use ember_script::{Lifecycle, LifecycleError};
use ember_services::{SearchPath, Settings};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Parser)]
#[command(name = "ember", version)]
struct Cli {
    /// JSON settings file; defaults apply when omitted.
    #[clap(long, short = 'f')]
    settings: Option<PathBuf>,

    /// Extra script directories, searched after the configured ones.
    #[clap(long = "search-path", short = 'p')]
    search_paths: Vec<PathBuf>,
}

impl Cli {
    fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        settings.search_paths.extend(self.search_paths.iter().cloned());
        Ok(settings)
    }
}

/// Outlets printed to stdout as `<id> <outlet>: <value>`.
struct Console;

impl Outlets for Console {
    fn emit(&mut self, owner: &OwnerId, channel: Channel, output: Output) {
        let outlet = match channel {
            Channel::Signal => 0,
            Channel::Reply => 1,
        };
        println!("{owner} {outlet}: {output}");
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{diagnostic}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Cli::parse().load_settings()?;

    tracing::info!("Ember v{}", ember_core::VERSION);

    let lifecycle = Rc::new(Lifecycle::new(settings.interpreter.clone()));
    let files = SearchPath::new(settings.search_paths.clone());
    let mut host = Host::new(lifecycle, files, Console);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        dispatch(&mut host, &settings, line)?;
        host.turn();
        io::stdout().flush()?;
    }

    tracing::info!("Shutting down");
    Ok(())
}

fn dispatch(host: &mut Host<Console>, settings: &Settings, line: &str) -> Result<()> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "new" => {
            let mut owner = settings.owner.clone();
            if !rest.is_empty() {
                owner.name = Some(rest.to_string());
            }
            match host.spawn(owner) {
                Ok(identity) => println!("{identity}"),
                Err(err @ LifecycleError::ModuleRegistration { .. }) => {
                    anyhow::bail!("interpreter startup failed: {err}");
                }
                Err(err) => eprintln!("cannot create owner: {err}"),
            }
        }
        "free" => {
            if !host.free(&OwnerId::new(rest)) {
                eprintln!("no owner '{rest}'");
            }
        }
        identity => {
            let owner = OwnerId::new(identity);
            match host.send_line(&owner, rest) {
                Ok(true) => {}
                Ok(false) => eprintln!("no owner '{identity}'"),
                Err(err) => eprintln!("bad message: {err}"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_is_optional() {
        let cli = Cli::try_parse_from(["ember"]).unwrap();
        assert!(cli.settings.is_none());
        assert!(cli.load_settings().unwrap().owner.debug);
    }

    #[test]
    fn search_paths_extend_the_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("ember.json");
        std::fs::write(&file, r#"{ "search_paths": ["/scripts"], "owner": { "debug": false } }"#).unwrap();

        let file = file.to_str().unwrap();
        let cli = Cli::try_parse_from(["ember", "--settings", file, "-p", "/more"]).unwrap();
        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.search_paths, vec![PathBuf::from("/scripts"), PathBuf::from("/more")]);
        assert!(!settings.owner.debug);
    }

    #[test]
    fn unreadable_settings_are_an_error() {
        let cli = Cli::try_parse_from(["ember", "-f", "/nonexistent/ember.json"]).unwrap();
        assert!(cli.load_settings().is_err());
    }
}
