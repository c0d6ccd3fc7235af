//! oFono conformance checker.
//!
//! Enumerates the modems ofonod exposes on the system bus (or replays a
//! recorded session), derives each modem's expectation profile from its
//! power state, SIM presence, and the device variant, and reports every
//! property that deviates. Read-only: no modem state is ever mutated.

mod ofono;

use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ofono_sanity_core::replay::{Recording, ReplayBus};
use ofono_sanity_core::{CallerExpectations, ModemBus, ModemOutcome, RunSummary, run_all, run_paths};

/// Conformance checker for the oFono telephony daemon.
#[derive(Parser, Debug)]
#[command(name = "ofono-sanity", about = "Check ofonod's advertised capabilities against expectations")]
struct Cli {
    /// Validate a single modem object path instead of enumerating all.
    #[arg(long)]
    modem: Option<String>,

    /// Device variant override (default: `getprop ro.build.product`).
    #[arg(long)]
    variant: Option<String>,

    /// Expected MobileCountryCode, for variants without a canned SIM.
    #[arg(long)]
    mcc: Option<String>,

    /// Expected MobileNetworkCode, for variants without a canned SIM.
    #[arg(long)]
    mnc: Option<String>,

    /// Expected SubscriberIdentity (IMSI), for variants without a canned SIM.
    #[arg(long)]
    subscriber: Option<String>,

    /// TOML file carrying mcc/mnc/subscriber_identity expectations.
    /// Flags win over file entries.
    #[arg(long)]
    expect: Option<PathBuf>,

    /// Validate a recorded JSON session instead of the live bus.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Emit the run summary as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let variant = cli.variant.clone().unwrap_or_else(detect_variant);
    let caller = load_expectations(&cli)?;
    tracing::info!(variant = %variant, "ofono-sanity starting");

    let bus: Box<dyn ModemBus> = match &cli.replay {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading recording {}", path.display()))?;
            let recording: Recording =
                serde_json::from_str(&raw).context("parsing recording")?;
            Box::new(ReplayBus::new(recording))
        }
        None => Box::new(ofono::OfonoBus::system()?),
    };

    let summary = match &cli.modem {
        Some(path) => run_paths(bus.as_ref(), std::slice::from_ref(path), &variant, &caller),
        None => run_all(bus.as_ref(), &variant, &caller)?,
    };

    render(&summary, cli.json)?;
    if summary.passed() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

/// Variant identity comes from the Android property service; absent that,
/// "unknown" gets the generic expectation tables.
fn detect_variant() -> String {
    match Command::new("getprop").arg("ro.build.product").output() {
        Ok(out) if out.status.success() => {
            let product = String::from_utf8_lossy(&out.stdout).trim().to_owned();
            if product.is_empty() {
                "unknown".to_owned()
            } else {
                product
            }
        }
        _ => {
            tracing::warn!("ro.build.product unavailable, assuming variant \"unknown\"");
            "unknown".to_owned()
        }
    }
}

fn load_expectations(cli: &Cli) -> anyhow::Result<CallerExpectations> {
    let mut caller = match &cli.expect {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading expectations {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("parsing expectations {}", path.display()))?
        }
        None => CallerExpectations::default(),
    };
    if cli.mcc.is_some() {
        caller.mcc = cli.mcc.clone();
    }
    if cli.mnc.is_some() {
        caller.mnc = cli.mnc.clone();
    }
    if cli.subscriber.is_some() {
        caller.subscriber_identity = cli.subscriber.clone();
    }
    Ok(caller)
}

fn render(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    for outcome in &summary.outcomes {
        match outcome {
            ModemOutcome::Validated(report) => {
                let failed = report.failures().count();
                if failed == 0 {
                    println!(
                        "PASS {} ({} checks, {}, sim {})",
                        report.modem_path,
                        report.checks.len(),
                        report.state.power,
                        if report.state.sim_present { "present" } else { "absent" },
                    );
                } else {
                    println!(
                        "FAIL {} ({failed} of {} checks failed)",
                        report.modem_path,
                        report.checks.len(),
                    );
                    for check in report.failures() {
                        if let Some(failure) = &check.failure {
                            println!("  {failure}");
                        }
                    }
                }
            }
            ModemOutcome::Transport { modem_path, error } => {
                println!("ERROR {modem_path}: {error}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_expectation_file_fields() {
        let cli = Cli::parse_from(["ofono-sanity", "--mcc", "310", "--mnc", "260"]);
        let caller = load_expectations(&cli).unwrap();
        assert_eq!(caller.mcc.as_deref(), Some("310"));
        assert_eq!(caller.mnc.as_deref(), Some("260"));
        assert!(caller.subscriber_identity.is_none());
    }

    #[test]
    fn expectations_toml_parses() {
        let caller: CallerExpectations =
            toml::from_str("mcc = \"234\"\nsubscriber_identity = \"234150000000000\"\n").unwrap();
        assert_eq!(caller.mcc.as_deref(), Some("234"));
        assert_eq!(caller.subscriber_identity.as_deref(), Some("234150000000000"));
        assert!(caller.mnc.is_none());
    }
}
