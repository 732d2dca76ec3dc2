use tunnel_deploy::chain::LocalChain;
use tunnel_deploy::cli::Cli;
use tunnel_deploy::deploy::DeployRunner;
use tunnel_deploy::network::{DeployConfig, DeployEnv, NetworkConfig, NetworkContext};
use tunnel_deploy::output;
use tunnel_deploy::registry::FileRegistry;
use tunnel_deploy::signer::{dev::DEV_PRIVATE_KEYS, SignerManager};
use tunnel_deploy::wiring::{write_deferred_file, DeferredCalls};

use clap::Parser;
use eyre::WrapErr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Local chains opened by the run, saved when it ends
type OpenChains = Vec<(PathBuf, Arc<LocalChain>)>;

/// Main entry point for a deploy run
#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match &cli.config {
        Some(path) => DeployConfig::load(path)
            .await
            .wrap_err_with(|| format!("Failed to load network configuration: {}", path.display()))?,
        None => DeployConfig::local_dev(),
    };
    let network = config.network(&cli.network)?.clone();

    output::print_banner(&network.name, network.chain_id, &cli.tags);

    // Load signers
    let signers = Arc::new(SignerManager::new());
    if let Some(key) = &cli.signer_key {
        let address = signers
            .add_signer_from_hex(key)
            .await
            .wrap_err("Failed to load signer key")?;
        output::print_signer_loaded(&address);
    }
    if network.is_testnet() && !network.live && cli.dev_keys > 0 {
        let count = cli.dev_keys.min(DEV_PRIVATE_KEYS.len());
        for key in DEV_PRIVATE_KEYS.iter().take(count) {
            signers.add_signer_from_hex(key).await?;
        }
        output::print_dev_signers_loaded(count);
    }
    let controlled = signers.signer_addresses().await;
    if controlled.is_empty() {
        output::print_no_signer_warning();
    } else {
        output::print_signers(&controlled);
    }

    // Open the network and its companions over one deferred-call log
    let deferred = DeferredCalls::new();
    let mut chains = OpenChains::new();
    let ctx = open_network(&cli, network.clone(), &signers, &deferred, &mut chains).await?;
    let mut env = DeployEnv::new(ctx);
    for (tag, name) in &network.companions {
        let companion = config.network(name)?.clone();
        let ctx = open_network(&cli, companion, &signers, &deferred, &mut chains).await?;
        output::print_companion(tag, name);
        env = env.with_companion(tag, ctx);
    }

    let result = DeployRunner::with_default_steps().run(&env, &cli.tags).await;

    // Persist chain state even when a step failed, so a re-run resumes from it
    for (path, chain) in &chains {
        chain
            .save(path)
            .await
            .wrap_err_with(|| format!("Failed to save chain state: {}", path.display()))?;
    }

    let report = result.wrap_err("Deploy run failed")?;
    output::print_summary(&report.executed, &report.skipped, &report.deferred);

    write_deferred_file(&cli.deferred_out, &report.deferred)
        .await
        .wrap_err_with(|| format!("Failed to write deferred calls: {}", cli.deferred_out.display()))?;
    if !report.deferred.is_empty() {
        output::print_deferred_written(&cli.deferred_out, report.deferred.len());
    }

    Ok(())
}

/// Build the context of one network over its deployments folder and state file.
async fn open_network(
    cli: &Cli,
    config: NetworkConfig,
    signers: &Arc<SignerManager>,
    deferred: &DeferredCalls,
    chains: &mut OpenChains,
) -> eyre::Result<Arc<NetworkContext>> {
    let registry = FileRegistry::open(&cli.deployments, &config.name, config.chain_id)
        .await
        .wrap_err_with(|| format!("Failed to open deployments of {}", config.name))?;

    let state_path = cli.state_dir.join(format!("{}.json", config.name));
    let chain = Arc::new(
        LocalChain::load_or_new(&state_path, config.chain_id)
            .await
            .wrap_err_with(|| format!("Failed to load chain state: {}", state_path.display()))?,
    );
    chains.push((state_path, chain.clone()));

    let ctx = NetworkContext::new(config, Arc::new(registry), chain.clone(), chain, signers.clone())?
        .with_deferred(deferred.clone());
    Ok(Arc::new(ctx))
}

/// Log to stderr so progress output on stdout stays readable.
///
/// `RUST_LOG` overrides the default `warn` level.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
