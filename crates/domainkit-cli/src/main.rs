use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use domainkit_tasks::BuiltinAccount;

mod completion;
mod config;
mod dispatch;
mod logging;
mod render;

use completion::CliCompletionShell;

#[derive(Parser, Debug)]
#[command(name = "domainkit")]
#[command(about = "Windows domain administration tasks", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// TOML file with default task settings.
    #[arg(long, global = true, env = "DOMAINKIT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
    /// More log output; repeat for trace level.
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the highest-versioned file in a directory.
    Locate(LocateArgs),
    /// Install or upgrade the smart card minidriver.
    Minidriver {
        #[command(subcommand)]
        command: MinidriverCommands,
    },
    /// Manage group managed service accounts.
    Gmsa {
        #[command(subcommand)]
        command: GmsaCommands,
    },
    /// Install SQL Server Express.
    Sql {
        #[command(subcommand)]
        command: SqlCommands,
    },
    /// Request certificates from an enterprise CA.
    Cert {
        #[command(subcommand)]
        command: CertCommands,
    },
    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
    /// Print the domainkit version.
    Version,
}

#[derive(Subcommand, Debug)]
enum MinidriverCommands {
    /// Install the newest minidriver from a share if it is not already present.
    Update(MinidriverUpdateArgs),
}

#[derive(Subcommand, Debug)]
enum GmsaCommands {
    /// Create a group managed service account.
    Create(GmsaCreateArgs),
}

#[derive(Subcommand, Debug)]
enum SqlCommands {
    /// Run an unattended SQL Server Express install.
    Install(SqlInstallArgs),
}

#[derive(Subcommand, Debug)]
enum CertCommands {
    /// Generate a key and CSR, then submit it to an enterprise CA.
    Request(CertRequestArgs),
}

#[derive(Args, Debug)]
struct LocateArgs {
    dir: PathBuf,
    #[arg(long)]
    extension: Option<String>,
    #[arg(long)]
    no_recurse: bool,
    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct MinidriverUpdateArgs {
    #[arg(long)]
    share: Option<PathBuf>,
    /// Installed product name prefix, as shown in Programs and Features.
    #[arg(long)]
    product: Option<String>,
    #[arg(long)]
    extension: Option<String>,
    #[arg(long, value_name = "HEX")]
    sha256: Option<String>,
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Reinstall even when the installed version is current.
    #[arg(long)]
    force: bool,
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct GmsaCreateArgs {
    name: String,
    #[arg(long)]
    domain: Option<String>,
    /// Group or computer allowed to retrieve the managed password.
    #[arg(long = "principal")]
    principals: Vec<String>,
    #[arg(long)]
    dns_host_name: Option<String>,
    #[arg(long = "spn")]
    service_principal_names: Vec<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    install_locally: bool,
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("service_account_kind")
        .args(["gmsa", "service_account", "builtin_account"])
        .multiple(false)
))]
struct SqlInstallArgs {
    #[arg(long)]
    setup: Option<PathBuf>,
    #[arg(long)]
    instance: Option<String>,
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,
    /// Run the engine as this gMSA; no password is needed.
    #[arg(long)]
    gmsa: Option<String>,
    /// Run the engine as a domain account; the password is read from
    /// DOMAINKIT_SQL_SVC_PASSWORD.
    #[arg(long)]
    service_account: Option<String>,
    #[arg(long, value_parser = parse_builtin_account)]
    builtin_account: Option<BuiltinAccount>,
    #[arg(long = "sysadmin")]
    sysadmins: Vec<String>,
    /// Enable SQL logins; the sa password is read from DOMAINKIT_SQL_SA_PASSWORD.
    #[arg(long)]
    mixed_mode: bool,
    #[arg(long)]
    enable_tcp: bool,
    #[arg(long)]
    install_dir: Option<PathBuf>,
    /// Let setup pull product updates.
    #[arg(long)]
    update: bool,
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct CertRequestArgs {
    common_name: String,
    #[arg(long = "dns")]
    dns_names: Vec<String>,
    #[arg(long)]
    org: Option<String>,
    #[arg(long)]
    org_unit: Option<String>,
    #[arg(long)]
    locality: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    key_bits: Option<u32>,
    /// CA config string, `host\CA Name`.
    #[arg(long)]
    ca: Option<String>,
    #[arg(long)]
    template: Option<String>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Also export a PFX; the password is read from DOMAINKIT_PFX_PASSWORD.
    #[arg(long)]
    pfx: bool,
    #[arg(long)]
    dry_run: bool,
}

fn parse_builtin_account(value: &str) -> std::result::Result<BuiltinAccount, String> {
    BuiltinAccount::parse(value).ok_or_else(|| {
        format!("unknown built-in account '{value}' (expected network-service, local-system or virtual)")
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);
    dispatch::run_cli(cli)
}

#[cfg(test)]
mod tests;
