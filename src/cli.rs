use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for a deploy run
#[derive(Parser, Debug)]
#[command(name = "tunnel-deploy", about = "Deploy and wire the land tunnel contracts")]
pub struct Cli {
    /// Network to deploy to (must exist in the configuration)
    #[arg(long, default_value = "polygon_local")]
    pub network: String,

    /// Network configuration file (JSON).
    ///
    /// Defaults to the built-in local pair `ethereum_local` (L1) and
    /// `polygon_local` (L2).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root of the deployment records, one sub-folder per network
    #[arg(long, default_value = "deployments")]
    pub deployments: PathBuf,

    /// Folder holding the local chain state files
    #[arg(long, default_value = "data")]
    pub state_dir: PathBuf,

    /// Comma-separated deploy tags to run, with their dependencies.
    /// Runs every step when empty.
    /// Example: `--tags PolygonLandTunnel,ChildGameToken`
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Signer private key (hex, without 0x prefix).
    /// Can also be set via SIGNER_KEY environment variable.
    #[arg(long, env = "SIGNER_KEY")]
    pub signer_key: Option<String>,

    /// Number of dev mnemonic keys to load on non-live test networks.
    /// Set to 0 to only use --signer-key.
    #[arg(long, default_value = "10")]
    pub dev_keys: usize,

    /// Where to write calls deferred for signers this run does not control
    #[arg(long, default_value = "deferred.json")]
    pub deferred_out: PathBuf,

    /// Enable structured JSON logging instead of human-readable output.
    ///
    /// When enabled, all log output is emitted as newline-delimited JSON.
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["tunnel-deploy"]);
        assert_eq!(cli.network, "polygon_local");
        assert!(cli.tags.is_empty());
        assert_eq!(cli.dev_keys, 10);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_tags_are_comma_separated() {
        let cli = Cli::parse_from([
            "tunnel-deploy",
            "--network",
            "ethereum_local",
            "--tags",
            "LandTunnel,Land",
            "--dev-keys",
            "0",
        ]);
        assert_eq!(cli.network, "ethereum_local");
        assert_eq!(cli.tags, vec!["LandTunnel", "Land"]);
        assert_eq!(cli.dev_keys, 0);
    }
}
