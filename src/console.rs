//! Console host: a line-based adapter plus the sample handler sets.
//!
//! The console has no native per-command subscription, so the adapter keeps
//! its own handler tables and the host loop tokenizes each line before
//! delivering it.

use std::io::Write;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crier::adapter::{Caller, ChatOutput, CommandHandler, EventHandler, SubscriptionAdapter};
use crier::commands::CommandOptions;
use crier::error::RegistrationError;
use crier::hub::{CommandDecls, EventDecls, Registrant};

/// Line-based subscription adapter backed by in-memory handler tables.
#[derive(Default)]
pub struct ConsoleAdapter {
    commands: IndexMap<String, CommandHandler>,
    events: IndexMap<String, Vec<EventHandler>>,
}

impl ConsoleAdapter {
    /// Creates an adapter with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes one tokenized command line to its handler.
    ///
    /// Returns false when nothing is subscribed under the name.
    pub fn deliver_command(&mut self, caller: &Caller, name: &str, args: &[String]) -> bool {
        match self.commands.get_mut(name) {
            Some(handler) => {
                debug!(command = %name, "delivering command");
                handler(caller, args);
                true
            }
            None => false,
        }
    }

    /// Fans one event out to every handler subscribed under the name, in
    /// subscription order.
    pub fn fire(&self, name: &str, payload: &Value) {
        let handlers: Vec<EventHandler> = match self.events.get(name) {
            Some(handlers) => handlers.clone(),
            None => return,
        };
        debug!(event = %name, handlers = handlers.len(), "firing event");
        for handler in handlers {
            (&mut *handler.borrow_mut())(payload);
        }
    }
}

impl SubscriptionAdapter for ConsoleAdapter {
    fn subscribe_command(&mut self, name: &str, handler: CommandHandler) {
        self.commands.insert(name.to_string(), handler);
    }

    fn subscribe_event(&mut self, name: &str, handler: EventHandler) {
        self.events.entry(name.to_string()).or_default().push(handler);
    }
}

/// Output collaborator that prints reply lines to stdout.
#[derive(Default)]
pub struct ConsoleOutput;

impl ChatOutput for ConsoleOutput {
    fn send_text(&mut self, to: &Caller, text: &str) {
        println!("[{}] {}", to.name, text);
        let _ = std::io::stdout().flush();
    }
}

/// Session-level commands and the console events.
pub struct SystemCommands {
    help: String,
    lines_seen: usize,
    quit_requested: bool,
}

impl SystemCommands {
    /// Creates the handler set with pre-rendered help text.
    pub fn new(help: String) -> Self {
        Self {
            help,
            lines_seen: 0,
            quit_requested: false,
        }
    }

    /// True once `/quit` (or `/exit`) has run.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Number of non-command lines seen this session.
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    fn help(&mut self, _caller: &Caller, _usage: &str, _args: &[String]) {
        println!("{}", self.help);
    }

    fn quit(&mut self, _caller: &Caller, _usage: &str, _args: &[String]) {
        self.quit_requested = true;
    }

    fn echo(&mut self, _caller: &Caller, usage: &str, args: &[String]) {
        if args.is_empty() {
            println!("{usage}");
        } else {
            println!("{}", args.join(" "));
        }
    }

    fn on_ready(&mut self, payload: &Value) {
        let user = payload
            .get("user")
            .and_then(Value::as_str)
            .unwrap_or("there");
        println!("Ready. Hello, {user} - try /help.");
    }

    fn on_line(&mut self, _payload: &Value) {
        self.lines_seen += 1;
    }
}

impl Registrant for SystemCommands {
    fn commands(decls: &mut CommandDecls<'_, Self>) -> Result<(), RegistrationError> {
        decls.command(&["help", "h"], CommandOptions::new(), Self::help)?;
        decls.command(&["quit", "exit"], CommandOptions::new(), Self::quit)?;
        decls.command(
            &["echo"],
            CommandOptions::new().description("Usage: /{{cmdName}} <text>"),
            Self::echo,
        )?;
        Ok(())
    }

    fn events(decls: &mut EventDecls<'_, Self>) -> Result<(), RegistrationError> {
        decls.event(&["console:ready"], Self::on_ready)?;
        decls.event(&["console:line"], Self::on_line)?;
        Ok(())
    }
}

/// A small grouped-command demo: `/note add|list|remove`.
#[derive(Default)]
pub struct Notebook {
    notes: Vec<String>,
}

impl Notebook {
    fn add(&mut self, _caller: &Caller, usage: &str, args: &[String]) {
        if args.is_empty() {
            println!("{usage}");
            return;
        }
        self.notes.push(args.join(" "));
        println!("Noted ({} total).", self.notes.len());
    }

    fn list(&mut self, _caller: &Caller, _usage: &str, _args: &[String]) {
        if self.notes.is_empty() {
            println!("No notes yet.");
            return;
        }
        for (index, note) in self.notes.iter().enumerate() {
            println!("{index}: {note}");
        }
    }

    fn remove(&mut self, _caller: &Caller, usage: &str, args: &[String]) {
        let index = args.first().and_then(|arg| arg.parse::<usize>().ok());
        match index {
            Some(index) if index < self.notes.len() => {
                let note = self.notes.remove(index);
                println!("Removed: {note}");
            }
            _ => println!("{usage}"),
        }
    }
}

impl Registrant for Notebook {
    fn commands(decls: &mut CommandDecls<'_, Self>) -> Result<(), RegistrationError> {
        decls.command(
            &["add"],
            CommandOptions::new()
                .group("note")
                .description("Usage: /{{groupName}} {{cmdName}} <text>"),
            Self::add,
        )?;
        decls.command(&["list", "ls"], "note", Self::list)?;
        decls.command(
            &["remove", "rm"],
            CommandOptions::new()
                .group("note")
                .description("Usage: /{{groupName}} {{cmdName}} <index>"),
            Self::remove,
        )?;
        Ok(())
    }
}
