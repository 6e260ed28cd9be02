//! Separates configuration flags from a binary's own arguments.
//!
//! The binaries parse their positional and command flags with `clap` while
//! `ortho_config` owns the layered configuration flags. Routing happens once
//! here so each parser only sees the flags it understands, regardless of where
//! on the command line the operator placed them.

use std::ffi::{OsStr, OsString};

/// Flags recognised by the configuration loader.
///
/// MAINTENANCE: keep this list in sync with the fields of [`crate::Config`].
pub const CONFIG_CLI_FLAGS: &[ConfigFlag] = &[
    ConfigFlag::valued("--config-path"),
    ConfigFlag::valued("--log-filter"),
    ConfigFlag::valued("--log-format"),
    ConfigFlag::valued("--host-version"),
    ConfigFlag::valued("--cache-dir"),
    ConfigFlag::valued("--host-executable"),
    ConfigFlag::valued("--repository-root"),
    ConfigFlag::valued("--extension-tests-path"),
    ConfigFlag::switch("--reuse-machine-install"),
    ConfigFlag::switch("--keep-user-config"),
    ConfigFlag::switch("--skip-host-verification"),
];

/// Describes one configuration flag and whether it consumes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFlag {
    name: &'static str,
    takes_value: bool,
}

impl ConfigFlag {
    const fn valued(name: &'static str) -> Self {
        Self {
            name,
            takes_value: true,
        }
    }

    const fn switch(name: &'static str) -> Self {
        Self {
            name,
            takes_value: false,
        }
    }

    /// Long flag name including the leading dashes.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the flag expects a value.
    #[must_use]
    pub const fn takes_value(&self) -> bool {
        self.takes_value
    }
}

/// Result of splitting a raw argument list.
///
/// Both vectors start with the program name so each can be handed directly to
/// a parser expecting `argv` semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigArgumentSplit {
    /// Arguments destined for [`crate::Config`].
    pub config_arguments: Vec<OsString>,
    /// Arguments destined for the binary's own parser.
    pub command_arguments: Vec<OsString>,
}

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }

    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };

    CONFIG_CLI_FLAGS
        .iter()
        .find(|candidate| candidate.name == flag)
        .map_or(FlagAction::Skip, |candidate| FlagAction::Include {
            needs_value: candidate.takes_value && !has_inline_value,
        })
}

/// Routes configuration flags and their values away from command arguments.
///
/// Everything after a bare `--` is treated as a command argument.
#[must_use]
pub fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut split = ConfigArgumentSplit::default();
    let mut remaining = args.iter();
    let Some(program) = remaining.next() else {
        return split;
    };
    split.config_arguments.push(program.clone());
    split.command_arguments.push(program.clone());

    while let Some(argument) = remaining.next() {
        if argument == "--" {
            split.command_arguments.extend(remaining.cloned());
            break;
        }
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                split.config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    split.config_arguments.push(value.clone());
                }
            }
            FlagAction::Skip => split.command_arguments.push(argument.clone()),
        }
    }

    split
}
