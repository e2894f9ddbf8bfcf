//! Routing closures handed to the subscription adapter.
//!
//! Binding turns each [`CommandDef`] into ready-made closures over the bound
//! instance. Standalone commands get one closure per alias with that alias's
//! usage line baked in; a group gets a single closure under its main name
//! that resolves the subcommand token itself and falls back to printing the
//! member usage lines when the token is unknown.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::definitions::{CommandDef, CommandFn};
use crate::adapter::{Caller, ChatOutput, CommandHandler};

/// Splits one raw input line into a command name and its arguments.
///
/// Returns `None` for a blank line. Hosts without native per-command
/// subscription use this to tokenize lines before delivering them.
pub fn split_line(line: &str) -> Option<(String, Vec<String>)> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?.to_string();
    Some((name, tokens.map(str::to_string).collect()))
}

/// Builds one `(alias, closure)` pair per alias of a standalone command.
///
/// Each closure invokes the handler with the usage line of the alias that
/// was actually typed, not the first one.
pub(crate) fn single_bindings<H: 'static>(
    def: &CommandDef<H>,
    instance: &Rc<RefCell<H>>,
) -> Vec<(String, CommandHandler)> {
    def.aliases
        .iter()
        .enumerate()
        .map(|(index, alias)| {
            let description = def.descriptions[index].clone();
            let handler = def.handler;
            let instance = Rc::clone(instance);
            let bound: CommandHandler = Box::new(move |caller: &Caller, args: &[String]| {
                handler(&mut *instance.borrow_mut(), caller, &description, args);
            });
            (alias.clone(), bound)
        })
        .collect()
}

/// Builds the single closure subscribed under a group's main name.
///
/// The first argument token selects the member; members are scanned in
/// declaration order and only the first match fires. A missing or unknown
/// token sends every member usage line, in order, through the output
/// collaborator instead of invoking anything.
pub(crate) fn group_binding<H: 'static>(
    main_name: &str,
    members: &[CommandDef<H>],
    instance: &Rc<RefCell<H>>,
    output: &Rc<RefCell<dyn ChatOutput>>,
) -> CommandHandler {
    let flat_aliases: Vec<String> = members
        .iter()
        .flat_map(|member| member.aliases.iter().cloned())
        .collect();
    let flat_descriptions: Vec<String> = members
        .iter()
        .flat_map(|member| member.descriptions.iter().cloned())
        .collect();
    let routes: Vec<(Vec<String>, CommandFn<H>)> = members
        .iter()
        .map(|member| (member.aliases.clone(), member.handler))
        .collect();

    let main_name = main_name.to_string();
    let instance = Rc::clone(instance);
    let output = Rc::clone(output);
    Box::new(move |caller: &Caller, args: &[String]| {
        let matched = args.split_first().and_then(|(sub, rest)| {
            flat_aliases
                .iter()
                .position(|alias| alias == sub)
                .map(|index| (sub, rest, index))
        });

        let Some((sub, rest, description_index)) = matched else {
            debug!(group = %main_name, "unknown subcommand, sending usage lines");
            let mut output = output.borrow_mut();
            for line in &flat_descriptions {
                output.send_text(caller, line);
            }
            return;
        };

        for (aliases, handler) in &routes {
            if aliases.iter().any(|alias| alias == sub) {
                handler(
                    &mut *instance.borrow_mut(),
                    caller,
                    &flat_descriptions[description_index],
                    rest,
                );
                break;
            }
        }
    })
}
