use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use domainkit_core::ExtensionFilter;
use domainkit_locator::{locate_highest, LocatorOptions};
use domainkit_tasks::{
    create_gmsa, install_sql_express, request_certificate, update_minidriver, BuiltinAccount,
    CertificateRequest, GmsaRequest, MinidriverUpdateRequest, SqlExpressRequest,
    SqlSecurityMode, SqlServiceAccount, DEFAULT_KEY_BITS, DEFAULT_SQL_FEATURES,
    DEFAULT_SQL_INSTANCE, PFX_PASSWORD_ENV,
};
use tracing::debug;

use crate::completion::write_completions_script;
use crate::config::{list_or, load_config, required, DomainkitConfig};
use crate::render::{
    format_cert_lines, format_gmsa_lines, format_locate_lines, format_minidriver_lines,
    format_sql_lines, TerminalRenderer,
};
use crate::{
    CertCommands, CertRequestArgs, Cli, Commands, GmsaCommands, GmsaCreateArgs, LocateArgs,
    MinidriverCommands, MinidriverUpdateArgs, SqlCommands, SqlInstallArgs,
};

pub(crate) const SQL_SVC_PASSWORD_ENV: &str = "DOMAINKIT_SQL_SVC_PASSWORD";
pub(crate) const SQL_SA_PASSWORD_ENV: &str = "DOMAINKIT_SQL_SA_PASSWORD";

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            println!("domainkit {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Completions { shell } => {
            let mut stdout = io::stdout().lock();
            return write_completions_script(shell, &mut stdout);
        }
        _ => {}
    }

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let config = load_config(cli.config.as_deref(), &cwd)?;
    debug!(config = ?cli.config, "loaded configuration");
    let renderer = TerminalRenderer::current();

    match cli.command {
        Commands::Locate(args) => {
            let json = args.json;
            let (root, extension, options) = locate_settings(args, &config);
            let report = locate_highest(&root, &extension, options)
                .with_context(|| format!("failed to locate a file in {}", root.display()))?;
            if json {
                let rendered = serde_json::to_string_pretty(&report)
                    .context("failed to serialize locate report")?;
                println!("{rendered}");
            } else {
                renderer.print_lines(&format_locate_lines(&report));
            }
        }
        Commands::Minidriver {
            command: MinidriverCommands::Update(args),
        } => {
            let request = build_minidriver_request(args, &config)?;
            renderer.print_section("minidriver update");
            let outcome = update_minidriver(&request)?;
            renderer.print_lines(&format_minidriver_lines(&outcome));
        }
        Commands::Gmsa {
            command: GmsaCommands::Create(args),
        } => {
            let request = build_gmsa_request(args, &config)?;
            renderer.print_section("gmsa create");
            let outcome = create_gmsa(&request)?;
            renderer.print_lines(&format_gmsa_lines(&outcome, request.dry_run));
        }
        Commands::Sql {
            command: SqlCommands::Install(args),
        } => {
            let request = build_sql_request(args, &config, env_lookup)?;
            renderer.print_section("sql install");
            let outcome = install_sql_express(&request)?;
            renderer.print_lines(&format_sql_lines(&outcome));
        }
        Commands::Cert {
            command: CertCommands::Request(args),
        } => {
            let request = build_cert_request(args, &config, env_lookup)?;
            renderer.print_section("cert request");
            let outcome = request_certificate(&request)?;
            renderer.print_lines(&format_cert_lines(&outcome));
        }
        Commands::Version | Commands::Completions { .. } => {}
    }

    Ok(())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn secret_from_env<Lookup>(lookup: &Lookup, name: &str, purpose: &str) -> Result<String>
where
    Lookup: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("{purpose} requires the {name} environment variable"))
}

pub(crate) fn locate_settings(
    args: LocateArgs,
    config: &DomainkitConfig,
) -> (PathBuf, ExtensionFilter, LocatorOptions) {
    let extension = args
        .extension
        .as_deref()
        .map(ExtensionFilter::new)
        .or_else(|| config.locator.extension.clone())
        .unwrap_or_default();
    let recursive = !args.no_recurse && config.locator.recursive.unwrap_or(true);
    (args.dir, extension, LocatorOptions { recursive })
}

pub(crate) fn build_minidriver_request(
    args: MinidriverUpdateArgs,
    config: &DomainkitConfig,
) -> Result<MinidriverUpdateRequest> {
    let section = &config.minidriver;
    let extension = args
        .extension
        .as_deref()
        .map(ExtensionFilter::new)
        .or_else(|| section.extension.clone())
        .or_else(|| config.locator.extension.clone())
        .unwrap_or_default();

    Ok(MinidriverUpdateRequest {
        share: required(
            args.share,
            section.share.clone(),
            "--share",
            "minidriver.share",
        )?,
        extension,
        recursive: config.locator.recursive.unwrap_or(true),
        product_name: required(
            args.product,
            section.product_name.clone(),
            "--product",
            "minidriver.product_name",
        )?,
        expected_sha256: args.sha256.or_else(|| section.expected_sha256.clone()),
        log_dir: args.log_dir.or_else(|| section.log_dir.clone()),
        force: args.force,
        dry_run: args.dry_run,
    })
}

pub(crate) fn build_gmsa_request(
    args: GmsaCreateArgs,
    config: &DomainkitConfig,
) -> Result<GmsaRequest> {
    Ok(GmsaRequest {
        name: args.name,
        domain: required(
            args.domain,
            config.gmsa.domain.clone(),
            "--domain",
            "gmsa.domain",
        )?,
        dns_host_name: args.dns_host_name,
        principals: list_or(args.principals, &config.gmsa.principals),
        service_principal_names: args.service_principal_names,
        description: args.description,
        install_locally: args.install_locally,
        dry_run: args.dry_run,
    })
}

pub(crate) fn build_sql_request<Lookup>(
    args: SqlInstallArgs,
    config: &DomainkitConfig,
    lookup: Lookup,
) -> Result<SqlExpressRequest>
where
    Lookup: Fn(&str) -> Option<String>,
{
    let section = &config.sql;
    let service_account = match (args.gmsa, args.service_account, args.builtin_account) {
        (Some(gmsa), _, _) => SqlServiceAccount::Gmsa(gmsa),
        (None, Some(name), _) => SqlServiceAccount::Account {
            password: secret_from_env(
                &lookup,
                SQL_SVC_PASSWORD_ENV,
                &format!("service account '{name}'"),
            )?,
            name,
        },
        (None, None, Some(builtin)) => SqlServiceAccount::Builtin(builtin),
        (None, None, None) => SqlServiceAccount::Builtin(BuiltinAccount::VirtualAccount),
    };
    let security_mode = if args.mixed_mode {
        SqlSecurityMode::Mixed {
            sa_password: secret_from_env(&lookup, SQL_SA_PASSWORD_ENV, "--mixed-mode")?,
        }
    } else {
        SqlSecurityMode::Windows
    };
    let mut features = list_or(args.features, &section.features);
    if features.is_empty() {
        features.push(DEFAULT_SQL_FEATURES.to_string());
    }

    Ok(SqlExpressRequest {
        setup_path: required(
            args.setup,
            section.setup_path.clone(),
            "--setup",
            "sql.setup_path",
        )?,
        instance_name: args
            .instance
            .or_else(|| section.instance_name.clone())
            .unwrap_or_else(|| DEFAULT_SQL_INSTANCE.to_string()),
        features,
        service_account,
        sysadmins: list_or(args.sysadmins, &section.sysadmins),
        security_mode,
        tcp_enabled: args.enable_tcp,
        install_dir: args.install_dir.or_else(|| section.install_dir.clone()),
        update_enabled: args.update,
        dry_run: args.dry_run,
    })
}

pub(crate) fn build_cert_request<Lookup>(
    args: CertRequestArgs,
    config: &DomainkitConfig,
    lookup: Lookup,
) -> Result<CertificateRequest>
where
    Lookup: Fn(&str) -> Option<String>,
{
    let section = &config.cert;
    let pfx_password = if args.pfx {
        Some(secret_from_env(&lookup, PFX_PASSWORD_ENV, "--pfx")?)
    } else {
        None
    };

    Ok(CertificateRequest {
        common_name: args.common_name,
        organization: args.org.or_else(|| section.organization.clone()),
        organizational_unit: args
            .org_unit
            .or_else(|| section.organizational_unit.clone()),
        locality: args.locality.or_else(|| section.locality.clone()),
        state: args.state.or_else(|| section.state.clone()),
        country: args.country.or_else(|| section.country.clone()),
        dns_names: args.dns_names,
        key_bits: args
            .key_bits
            .or(section.key_bits)
            .unwrap_or(DEFAULT_KEY_BITS),
        ca_config: required(args.ca, section.ca_config.clone(), "--ca", "cert.ca_config")?,
        template: required(
            args.template,
            section.template.clone(),
            "--template",
            "cert.template",
        )?,
        output_dir: args
            .out_dir
            .or_else(|| section.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        pfx_password,
        dry_run: args.dry_run,
    })
}
