use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use m27q_control::devices::gigabyte::m27q;
use m27q_control::properties::{self, Property};
use m27q_control::{KvmToggleMode, MonitorSession, SessionConfig};

#[macro_use]
extern crate tracing;

#[derive(Parser, Debug)]
#[command(name = "m27q", version, about = "Control a Gigabyte M27Q over USB")]
struct Cli {
    /// Pause after every USB transfer, in milliseconds
    #[arg(long, default_value_t = 50)]
    settle_ms: u64,

    /// Timeout for each control transfer, in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Toggle the KVM by writing this firmware code instead of reading the status back
    #[arg(long, value_parser = parse_byte)]
    kvm_fixed: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current value of a property
    Get { property: String },
    /// Set a property
    Set {
        property: String,
        #[arg(value_parser = parse_byte)]
        value: u8,
    },
    /// Switch the KVM to the other computer
    ToggleKvm,
    /// Step a property towards a target value
    Transition {
        property: String,
        #[arg(value_parser = parse_byte)]
        target: u8,
        #[arg(long, default_value_t = 3)]
        step: u8,
    },
    /// List the known properties
    List,
    /// Check whether the current user can access the device
    Permissions,
    /// Print a udev rule granting access to the device
    UdevRule,
}

/// Accepts decimal or `0x`-prefixed hex
fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte value '{}': {}", s, e))
}

fn setup_logs() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}=warn,m27q_control=warn",
        env!("CARGO_CRATE_NAME")
    )));

    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn print_properties() {
    let mut table: Vec<&Property> = properties::table().values().collect();
    table.sort_by_key(|p| p.name);
    for property in table {
        println!(
            "{:<22} {:02x} {:02x}  {}",
            property.name, property.message_a, property.message_b, property.constraint
        );
    }
}

#[cfg(all(target_os = "linux", feature = "permissions-check"))]
fn print_permissions() -> anyhow::Result<()> {
    use m27q_control::permissions::{self, RequirementStatus};

    let result = permissions::check_usb_permissions(&m27q::SPEC);
    for requirement in &result.requirements {
        let mark = match requirement.status {
            RequirementStatus::Met => "ok",
            RequirementStatus::NotMet => "missing",
            RequirementStatus::NotApplicable => "n/a",
        };
        println!("[{:>7}] {}: {}", mark, requirement.name, requirement.description);
    }
    println!("{}", result.summary());

    if result.has_issues() {
        anyhow::bail!("device is not accessible");
    }
    Ok(())
}

#[cfg(not(all(target_os = "linux", feature = "permissions-check")))]
fn print_permissions() -> anyhow::Result<()> {
    anyhow::bail!("permission checks are only available on Linux")
}

fn main() -> anyhow::Result<()> {
    setup_logs();
    let cli = Cli::parse();

    let mut config = SessionConfig::default()
        .with_settle_delay(Duration::from_millis(cli.settle_ms))
        .with_timeout(Duration::from_millis(cli.timeout_ms));
    if let Some(code) = cli.kvm_fixed {
        config = config.with_kvm_toggle(KvmToggleMode::Fixed(code));
    }

    match cli.command {
        Command::List => {
            print_properties();
            return Ok(());
        }
        Command::Permissions => return print_permissions(),
        Command::UdevRule => {
            println!("{}", m27q::SPEC.udev_rule());
            return Ok(());
        }
        _ => {}
    }

    let mut monitor = MonitorSession::with_config(config);
    let device_name = monitor.spec().name;
    debug!("Using {:?} with {:?}", monitor, monitor.config());

    monitor
        .scoped(|m| match &cli.command {
            Command::Get { property } => {
                let value = m.get_by_name(property)?;
                println!("{}", value);
                Ok(())
            }
            Command::Set { property, value } => m.set_by_name(property, *value),
            Command::ToggleKvm => {
                let written = m.toggle_kvm()?;
                println!("{}", written);
                Ok(())
            }
            Command::Transition {
                property,
                target,
                step,
            } => {
                let property = properties::lookup(property)?;
                m.transition(&property, *target, *step)
            }
            Command::List | Command::Permissions | Command::UdevRule => Ok(()),
        })
        .with_context(|| format!("{} command failed", device_name))
}
