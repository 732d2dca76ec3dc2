//! Colored console output for deploy runs.
//!
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow warnings/deferred work, dimmed secondary text.

use alloy_primitives::{Address, B256};
use colored::Colorize;
use std::path::Path;

use crate::wiring::PendingCall;

// ── Helpers ────────────────────────────────────────────────────────

/// Shorten a hash to `0x1234…abcd` for progress lines.
pub fn short_hash(hash: &B256) -> String {
    let full = format!("{hash}");
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

// ── Banner & Identity ──────────────────────────────────────────────

/// Print the run banner with the target network.
pub fn print_banner(network: &str, chain_id: u64, tags: &[String]) {
    println!();
    println!("{}", "=== Tunnel Deploy ===".blue().bold());
    println!("  Network:      {}", network.cyan());
    println!("  Chain ID:     {}", chain_id.to_string().cyan());
    if !tags.is_empty() {
        println!("  Tags:         {}", tags.join(", ").cyan());
    }
}

/// Print a companion network attached to the run.
pub fn print_companion(tag: &str, network: &str) {
    println!("  Companion:    {} {}", network.cyan(), format!("({tag})").dimmed());
}

// ── Signer Info ────────────────────────────────────────────────────

/// Print the controlled accounts.
pub fn print_signers(signers: &[Address]) {
    println!("  Controlled accounts ({}):", signers.len().to_string().cyan());
    for (i, signer) in signers.iter().enumerate() {
        println!("    {}. {}", (i + 1).to_string().dimmed(), format!("{signer}").cyan());
    }
}

/// Print confirmation that a signer key was loaded.
pub fn print_signer_loaded(addr: &Address) {
    println!("  {} Signer key loaded: {}", "OK".green().bold(), format!("{addr}").cyan());
}

/// Print confirmation that dev signers were loaded.
pub fn print_dev_signers_loaded(count: usize) {
    println!("  {} Dev signers loaded: {} keys", "OK".green().bold(), count.to_string().cyan());
}

/// Print a warning when no signer key is provided.
pub fn print_no_signer_warning() {
    println!(
        "  {} No signer key provided. Every write will be deferred.",
        "WARNING:".yellow().bold()
    );
    println!("  {}", "Set --signer-key or SIGNER_KEY environment variable.".dimmed());
}

// ── Steps ──────────────────────────────────────────────────────────

pub fn print_step(id: &str) {
    println!();
    println!("{} {}", "Step".blue().bold(), id.blue().bold());
}

pub fn print_step_skipped(id: &str) {
    println!("{} {} {}", "Step".dimmed(), id.dimmed(), "(skipped)".dimmed());
}

// ── Transactions ───────────────────────────────────────────────────

/// Print a fresh deployment.
pub fn print_deployed(name: &str, address: &Address, tx: Option<&B256>) {
    let tx = tx.map(|h| format!(" (tx: {})", short_hash(h))).unwrap_or_default();
    println!(
        "  {} {} at {}{}",
        "deployed".green().bold(),
        name,
        format!("{address}").cyan(),
        tx.dimmed()
    );
}

/// Print a deployment reused from the registry.
pub fn print_reused(name: &str, address: &Address) {
    println!("  {} {} at {}", "reusing".dimmed(), name, format!("{address}").cyan());
}

/// Print an executed state-changing call.
pub fn print_executed(contract: &str, method: &str, from: &Address, tx: &B256) {
    println!(
        "  {} {}.{} from {} {}",
        "executed".green().bold(),
        contract,
        method,
        format!("{from}").cyan(),
        format!("(tx: {})", short_hash(tx)).dimmed()
    );
}

/// Print a call captured for an external signer.
pub fn print_deferred(call: &PendingCall) {
    println!(
        "  {} {}.{} needs {} on {}",
        "deferred".yellow().bold(),
        call.contract,
        call.signature,
        format!("{}", call.from).cyan(),
        call.network
    );
}

/// Print that a counterpart contract is not deployed yet.
pub fn print_not_ready(contract: &str, network: &str) {
    println!(
        "  {} {} is not deployed on {} yet, wiring postponed",
        "waiting".yellow(),
        contract,
        network.cyan()
    );
}

// ── Summary ────────────────────────────────────────────────────────

/// Print the totals of a run.
pub fn print_summary(executed: &[String], skipped: &[String], deferred: &[PendingCall]) {
    println!();
    println!("{}", "Summary:".blue().bold());
    println!("  {} {}", "Steps run:    ".dimmed(), executed.len().to_string().cyan());
    println!("  {} {}", "Steps skipped:".dimmed(), skipped.len().to_string().cyan());
    let count = deferred.len().to_string();
    println!(
        "  {} {}",
        "Deferred:     ".dimmed(),
        if deferred.is_empty() { count.green() } else { count.yellow() }
    );
}

/// Print where the deferred calls were written.
pub fn print_deferred_written(path: &Path, count: usize) {
    println!(
        "  {} {} deferred call(s) written to {}",
        "OK".green().bold(),
        count.to_string().cyan(),
        path.display().to_string().cyan()
    );
}
