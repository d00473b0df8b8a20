//! Command-line definition

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Log level used when neither `--log-level` nor `RUST_LOG` is set
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn version_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

/// Build the `cfgmig` command
#[must_use]
pub fn command() -> Command {
    Command::new("cfgmig")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate gNMI configuration trees between schema versions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value(DEFAULT_LOG_LEVEL)
                .help("Log filter when RUST_LOG is unset (e.g. debug, cfgmig_core=trace)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate one target's configuration into another target")
                .arg(
                    Arg::new("from-target")
                        .long("from-target")
                        .required(true)
                        .help("Target holding the configuration to migrate"),
                )
                .arg(
                    Arg::new("to-target")
                        .long("to-target")
                        .required(true)
                        .help("Target receiving the migrated configuration"),
                )
                .arg(version_arg("from-version", "Schema version of the source target"))
                .arg(version_arg("to-version", "Schema version of the destination target"))
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file with store settings; flags override it"),
                )
                .arg(
                    Arg::new("address")
                        .long("address")
                        .help("Address of the gNMI gateway"),
                )
                .arg(
                    Arg::new("ca-cert")
                        .long("ca-cert")
                        .value_parser(value_parser!(PathBuf))
                        .help("PEM bundle of CA certificates to trust"),
                )
                .arg(
                    Arg::new("client-cert")
                        .long("client-cert")
                        .value_parser(value_parser!(PathBuf))
                        .requires("client-key")
                        .help("PEM client certificate"),
                )
                .arg(
                    Arg::new("client-key")
                        .long("client-key")
                        .value_parser(value_parser!(PathBuf))
                        .requires("client-cert")
                        .help("PEM private key of the client certificate"),
                )
                .arg(
                    Arg::new("no-tls")
                        .long("no-tls")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["ca-cert", "client-cert", "client-key"])
                        .help("Do not load TLS credentials"),
                )
                .arg(
                    Arg::new("timeout-secs")
                        .long("timeout-secs")
                        .value_parser(value_parser!(u64).range(1..))
                        .help("Per-request transport timeout in seconds"),
                ),
        )
        .subcommand(Command::new("steps").about("List the registered migration steps"))
        .subcommand(
            Command::new("chain")
                .about("Print the step chain between two versions without touching the store")
                .arg(version_arg("from-version", "Version to migrate from"))
                .arg(version_arg("to-version", "Version to migrate to")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn migrate_requires_targets_and_versions() {
        let result = command().try_get_matches_from(["cfgmig", "migrate", "--from-target", "v2"]);
        assert!(result.is_err());
    }

    #[test]
    fn no_tls_conflicts_with_certs() {
        let result = command().try_get_matches_from([
            "cfgmig",
            "migrate",
            "--from-target",
            "v2",
            "--to-target",
            "v21",
            "--from-version",
            "2.0.0",
            "--to-version",
            "2.1.0",
            "--no-tls",
            "--ca-cert",
            "ca.crt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_log_level_after_subcommand() {
        let matches = command()
            .try_get_matches_from(["cfgmig", "steps", "--log-level", "debug"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("log-level").map(String::as_str),
            Some("debug")
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = command().try_get_matches_from([
            "cfgmig",
            "migrate",
            "--from-target",
            "a",
            "--to-target",
            "b",
            "--from-version",
            "1",
            "--to-version",
            "2",
            "--timeout-secs",
            "0",
        ]);
        assert!(result.is_err());
    }
}
