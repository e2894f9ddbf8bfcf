//! The wiring hub: global registries, per-type declarations and binding.
//!
//! A [`Hub`] owns the process-wide command and event tables, the per-type
//! binding state, and shared handles to the two host collaborators. Handler
//! types implement [`Registrant`] to declare what they respond to;
//! [`Hub::declare`] validates and records the declarations, and
//! [`Hub::bind`] performs the one-time wiring when the first instance of the
//! type is constructed.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::adapter::{ChatOutput, SubscriptionAdapter};
use crate::commands::definitions::normalize_names;
use crate::commands::{
    dispatch, CommandDef, CommandEntry, CommandFn, CommandOptions, CommandRegistry, CommandTable,
};
use crate::error::{BindingError, RegistrationError};
use crate::events::{self, EventBinding, EventDef, EventFn, EventRegistry, EventTable};

/// A handler type that declares commands and/or events.
///
/// Both methods run once per type, during [`Hub::declare`], against fresh
/// accumulators. The default implementations declare nothing, so a type may
/// implement only the side it uses.
pub trait Registrant: Sized + 'static {
    /// Declares the type's commands.
    fn commands(_decls: &mut CommandDecls<'_, Self>) -> Result<(), RegistrationError> {
        Ok(())
    }

    /// Declares the type's events.
    fn events(_decls: &mut EventDecls<'_, Self>) -> Result<(), RegistrationError> {
        Ok(())
    }
}

/// Accumulates one type's command declarations and checks them against the
/// global registry as they are made.
pub struct CommandDecls<'a, H> {
    registry: &'a mut CommandRegistry,
    table: &'a mut CommandTable<H>,
}

impl<H> CommandDecls<'_, H> {
    /// Declares one command.
    ///
    /// `options` may be a [`CommandOptions`] value or a bare `&str` group
    /// name. Duplicate and conflicting aliases fail here, at declaration
    /// time, against every declaration made so far on any type.
    pub fn command(
        &mut self,
        aliases: &[&str],
        options: impl Into<CommandOptions>,
        handler: CommandFn<H>,
    ) -> Result<(), RegistrationError> {
        let options = options.into();
        let meta = self.registry.register(
            aliases,
            options.group.as_deref(),
            options.description.as_deref(),
        )?;

        let group = options.group.filter(|g| !g.is_empty());
        let main_name = match &group {
            Some(group) => group.clone(),
            None => meta.aliases[0].clone(),
        };
        let def = CommandDef {
            aliases: meta.aliases,
            descriptions: meta.descriptions,
            group,
            handler,
        };

        if def.group.is_some() {
            match self.table.entry(main_name) {
                Entry::Occupied(mut slot) => {
                    if let CommandEntry::Group(members) = slot.get_mut() {
                        members.push(def);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(CommandEntry::Group(vec![def]));
                }
            }
        } else {
            self.table.insert(main_name, CommandEntry::Single(def));
        }
        Ok(())
    }
}

/// Accumulates one type's event declarations.
pub struct EventDecls<'a, H> {
    table: &'a mut EventTable<H>,
}

impl<H> EventDecls<'_, H> {
    /// Declares one event handler listening on every given name.
    ///
    /// Names are deduplicated keeping first occurrences; the first one is
    /// the primary name the declaration is recorded under. Events carry no
    /// uniqueness constraint.
    pub fn event(&mut self, names: &[&str], handler: EventFn<H>) -> Result<(), RegistrationError> {
        let names = normalize_names(names);
        if names.is_empty() {
            return Err(RegistrationError::MissingEventName);
        }
        let primary = names[0].clone();
        self.table
            .entry(primary)
            .or_default()
            .push(EventDef { names, handler });
        Ok(())
    }
}

/// Per-type binding state and type-erased declaration tables.
struct TypeSlot {
    type_name: &'static str,
    initialized: bool,
    commands: Box<dyn Any>,
    events: Box<dyn Any>,
}

/// The engine facade.
///
/// The hub is `Rc`/`RefCell`-based and deliberately single-threaded: it
/// cannot be sent across threads, so the check-and-set on the per-type
/// binding state cannot race.
pub struct Hub {
    commands: CommandRegistry,
    events: EventRegistry,
    types: HashMap<TypeId, TypeSlot>,
    adapter: Rc<RefCell<dyn SubscriptionAdapter>>,
    output: Rc<RefCell<dyn ChatOutput>>,
}

impl Hub {
    /// Creates a hub wired to the given host collaborators.
    pub fn new(
        adapter: Rc<RefCell<dyn SubscriptionAdapter>>,
        output: Rc<RefCell<dyn ChatOutput>>,
    ) -> Self {
        Self {
            commands: CommandRegistry::new(),
            events: EventRegistry::new(),
            types: HashMap::new(),
            adapter,
            output,
        }
    }

    /// Runs a type's declarations and records them.
    ///
    /// Command declarations are validated against every declaration made so
    /// far, across all types. Declaring the same type twice is an error.
    pub fn declare<H: Registrant>(&mut self) -> Result<(), RegistrationError> {
        let id = TypeId::of::<H>();
        if self.types.contains_key(&id) {
            return Err(RegistrationError::Redeclared(type_name::<H>()));
        }

        let mut command_table: CommandTable<H> = IndexMap::new();
        let mut event_table: EventTable<H> = IndexMap::new();

        H::commands(&mut CommandDecls {
            registry: &mut self.commands,
            table: &mut command_table,
        })?;
        H::events(&mut EventDecls {
            table: &mut event_table,
        })?;

        debug!(
            handler_type = type_name::<H>(),
            commands = command_table.len(),
            events = event_table.len(),
            "declared handler type"
        );
        self.types.insert(
            id,
            TypeSlot {
                type_name: type_name::<H>(),
                initialized: false,
                commands: Box::new(command_table),
                events: Box::new(event_table),
            },
        );
        Ok(())
    }

    /// Binds an instance, wiring its type's declarations on first use.
    ///
    /// The first bound instance of a type owns the live wiring: its methods
    /// are what the adapter will invoke from then on. Later instances of the
    /// same type are returned untouched, with no subscriptions made. One
    /// live handler instance per type.
    pub fn bind<H: Registrant>(&mut self, instance: H) -> Result<Rc<RefCell<H>>, BindingError> {
        let instance = Rc::new(RefCell::new(instance));
        let slot = self
            .types
            .get_mut(&TypeId::of::<H>())
            .ok_or_else(|| BindingError::Undeclared(type_name::<H>()))?;

        if slot.initialized {
            debug!(handler_type = slot.type_name, "type already bound, skipping");
            return Ok(instance);
        }

        let command_table = slot
            .commands
            .downcast_ref::<CommandTable<H>>()
            .expect("slot holds this type's command table");
        for (main_name, entry) in command_table {
            match entry {
                CommandEntry::Single(def) => {
                    for (alias, bound) in dispatch::single_bindings(def, &instance) {
                        self.adapter.borrow_mut().subscribe_command(&alias, bound);
                    }
                }
                CommandEntry::Group(members) => {
                    let bound =
                        dispatch::group_binding(main_name, members, &instance, &self.output);
                    self.adapter.borrow_mut().subscribe_command(main_name, bound);
                }
            }
        }

        let event_table = slot
            .events
            .downcast_ref::<EventTable<H>>()
            .expect("slot holds this type's event table");
        for (primary, defs) in event_table {
            for def in defs {
                let resolved = events::resolve(def, &instance);
                self.events.append(
                    primary,
                    EventBinding {
                        names: def.names.clone(),
                        handler: Rc::clone(&resolved),
                    },
                );
                for name in &def.names {
                    self.adapter
                        .borrow_mut()
                        .subscribe_event(name, Rc::clone(&resolved));
                }
            }
        }

        slot.initialized = true;
        info!(handler_type = slot.type_name, "bound handler type");
        Ok(instance)
    }

    /// Returns true if the type has been declared.
    pub fn is_declared<H: Registrant>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<H>())
    }

    /// Returns true if the type's declarations have been wired.
    pub fn is_bound<H: Registrant>(&self) -> bool {
        self.types
            .get(&TypeId::of::<H>())
            .is_some_and(|slot| slot.initialized)
    }

    /// Renders every registered usage line, in registration order.
    pub fn help_text(&self) -> String {
        self.commands.help_text()
    }

    /// The global command validation table.
    pub fn command_registry(&self) -> &CommandRegistry {
        &self.commands
    }

    /// The global table of resolved event bindings.
    pub fn event_registry(&self) -> &EventRegistry {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Caller, CommandHandler, EventHandler};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    /// Adapter that records subscriptions and lets tests drive them.
    #[derive(Default)]
    struct RecordingAdapter {
        command_names: Vec<String>,
        command_handlers: IndexMap<String, CommandHandler>,
        event_names: Vec<String>,
        event_handlers: IndexMap<String, Vec<EventHandler>>,
    }

    impl SubscriptionAdapter for RecordingAdapter {
        fn subscribe_command(&mut self, name: &str, handler: CommandHandler) {
            self.command_names.push(name.to_string());
            self.command_handlers.insert(name.to_string(), handler);
        }

        fn subscribe_event(&mut self, name: &str, handler: EventHandler) {
            self.event_names.push(name.to_string());
            self.event_handlers
                .entry(name.to_string())
                .or_default()
                .push(handler);
        }
    }

    impl RecordingAdapter {
        fn deliver(&mut self, caller: &Caller, name: &str, args: &[&str]) {
            let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            let handler = self
                .command_handlers
                .get_mut(name)
                .expect("command subscribed");
            handler(caller, &args);
        }

        fn fire(&self, name: &str, payload: &Value) {
            if let Some(handlers) = self.event_handlers.get(name) {
                for handler in handlers {
                    (&mut *handler.borrow_mut())(payload);
                }
            }
        }
    }

    #[derive(Default)]
    struct NullOutput;

    impl ChatOutput for NullOutput {
        fn send_text(&mut self, _to: &Caller, _text: &str) {}
    }

    #[derive(Default)]
    struct Moderation {
        kicked: Vec<String>,
        banned: Vec<(String, Vec<String>)>,
        muted: usize,
        joins: Vec<Value>,
    }

    impl Moderation {
        fn kick(&mut self, _caller: &Caller, _usage: &str, args: &[String]) {
            self.kicked.extend(args.iter().cloned());
        }

        fn ban(&mut self, _caller: &Caller, usage: &str, args: &[String]) {
            self.banned.push((usage.to_string(), args.to_vec()));
        }

        fn mute(&mut self, _caller: &Caller, _usage: &str, _args: &[String]) {
            self.muted += 1;
        }

        fn on_join(&mut self, payload: &Value) {
            self.joins.push(payload.clone());
        }
    }

    impl Registrant for Moderation {
        fn commands(decls: &mut CommandDecls<'_, Self>) -> Result<(), RegistrationError> {
            decls.command(&["kick"], "admin", Self::kick)?;
            decls.command(&["ban", "b"], CommandOptions::new().group("admin"), Self::ban)?;
            decls.command(&["mute"], CommandOptions::new(), Self::mute)?;
            Ok(())
        }

        fn events(decls: &mut EventDecls<'_, Self>) -> Result<(), RegistrationError> {
            decls.event(&["playerJoin", "playerSpawn"], Self::on_join)?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Greeter {
        greeted: usize,
    }

    impl Greeter {
        fn on_join(&mut self, _payload: &Value) {
            self.greeted += 1;
        }
    }

    impl Registrant for Greeter {
        fn events(decls: &mut EventDecls<'_, Self>) -> Result<(), RegistrationError> {
            decls.event(&["playerJoin"], Self::on_join)?;
            Ok(())
        }
    }

    fn hub_with_recorder() -> (Hub, Rc<RefCell<RecordingAdapter>>) {
        let adapter = Rc::new(RefCell::new(RecordingAdapter::default()));
        let output = Rc::new(RefCell::new(NullOutput));
        (Hub::new(adapter.clone(), output), adapter)
    }

    #[test]
    fn test_bind_subscribes_groups_once_and_aliases_each() {
        let (mut hub, adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        hub.bind(Moderation::default()).unwrap();

        let adapter = adapter.borrow();
        // Group under its main name only; standalone under every alias.
        assert_eq!(adapter.command_names, vec!["admin", "mute"]);
        assert_eq!(adapter.event_names, vec!["playerJoin", "playerSpawn"]);
    }

    #[test]
    fn test_binding_is_idempotent_per_type() {
        let (mut hub, adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        hub.bind(Moderation::default()).unwrap();
        hub.bind(Moderation::default()).unwrap();

        let adapter = adapter.borrow();
        assert_eq!(adapter.command_names.len(), 2);
        assert_eq!(adapter.event_names.len(), 2);
        assert_eq!(hub.event_registry().bindings("playerJoin").len(), 1);
    }

    #[test]
    fn test_first_instance_owns_the_wiring() {
        let (mut hub, adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        let first = hub.bind(Moderation::default()).unwrap();
        let second = hub.bind(Moderation::default()).unwrap();

        let caller = Caller::new(1, "tester");
        adapter.borrow_mut().deliver(&caller, "mute", &[]);

        assert_eq!(first.borrow().muted, 1);
        assert_eq!(second.borrow().muted, 0);
    }

    #[test]
    fn test_dispatch_reaches_bound_instance() {
        let (mut hub, adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        let moderation = hub.bind(Moderation::default()).unwrap();

        let caller = Caller::new(1, "tester");
        adapter.borrow_mut().deliver(&caller, "admin", &["ban", "5"]);
        adapter.borrow_mut().deliver(&caller, "admin", &["kick", "joe"]);

        let moderation = moderation.borrow();
        assert_eq!(
            moderation.banned,
            vec![("Usage /admin ban".to_string(), vec!["5".to_string()])]
        );
        assert_eq!(moderation.kicked, vec!["joe"]);
    }

    #[test]
    fn test_events_fire_through_adapter() {
        let (mut hub, adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        let moderation = hub.bind(Moderation::default()).unwrap();

        adapter.borrow().fire("playerSpawn", &json!({"id": 9}));
        assert_eq!(moderation.borrow().joins, vec![json!({"id": 9})]);
    }

    #[test]
    fn test_event_bindings_append_across_types_in_bind_order() {
        let (mut hub, adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        hub.declare::<Greeter>().unwrap();
        let moderation = hub.bind(Moderation::default()).unwrap();
        let greeter = hub.bind(Greeter::default()).unwrap();

        let bindings = hub.event_registry().bindings("playerJoin");
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].names, vec!["playerJoin", "playerSpawn"]);
        assert_eq!(bindings[1].names, vec!["playerJoin"]);

        adapter.borrow().fire("playerJoin", &json!(null));
        assert_eq!(moderation.borrow().joins.len(), 1);
        assert_eq!(greeter.borrow().greeted, 1);
    }

    #[test]
    fn test_bind_undeclared_type_fails() {
        let (mut hub, _adapter) = hub_with_recorder();
        assert!(matches!(
            hub.bind(Moderation::default()),
            Err(BindingError::Undeclared(_))
        ));
    }

    #[test]
    fn test_redeclare_fails() {
        let (mut hub, _adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        assert!(matches!(
            hub.declare::<Moderation>(),
            Err(RegistrationError::Redeclared(_))
        ));
    }

    #[test]
    fn test_cross_type_duplicate_alias_fails_at_declare() {
        #[derive(Default)]
        struct Other;

        impl Other {
            fn mute(&mut self, _caller: &Caller, _usage: &str, _args: &[String]) {}
        }

        impl Registrant for Other {
            fn commands(decls: &mut CommandDecls<'_, Self>) -> Result<(), RegistrationError> {
                decls.command(&["mute"], CommandOptions::new(), Self::mute)?;
                Ok(())
            }
        }

        let (mut hub, _adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        assert!(matches!(
            hub.declare::<Other>(),
            Err(RegistrationError::Duplicate(name)) if name == "mute"
        ));
    }

    #[test]
    fn test_is_declared_and_is_bound() {
        let (mut hub, _adapter) = hub_with_recorder();
        assert!(!hub.is_declared::<Moderation>());
        hub.declare::<Moderation>().unwrap();
        assert!(hub.is_declared::<Moderation>());
        assert!(!hub.is_bound::<Moderation>());
        hub.bind(Moderation::default()).unwrap();
        assert!(hub.is_bound::<Moderation>());
    }

    #[test]
    fn test_help_text_covers_all_declarations() {
        let (mut hub, _adapter) = hub_with_recorder();
        hub.declare::<Moderation>().unwrap();
        assert_eq!(
            hub.help_text(),
            "Usage /admin kick\n\
             Usage /admin ban\n\
             Usage /admin b\n\
             Usage /mute"
        );
    }
}
