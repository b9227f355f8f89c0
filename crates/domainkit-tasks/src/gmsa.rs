use std::process::Command;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::powershell::{build_powershell_command, output_lines, quote_ps_list, quote_ps_literal};
use crate::process::{execute_command, render_command, CommandOutput};

const GMSA_NAME_MAX_LEN: usize = 15;
const AD_MODULE_IMPORT: &str = "$ErrorActionPreference = 'Stop'; Import-Module ActiveDirectory;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmsaRequest {
    pub name: String,
    pub domain: String,
    pub dns_host_name: Option<String>,
    pub principals: Vec<String>,
    pub service_principal_names: Vec<String>,
    pub description: Option<String>,
    pub install_locally: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GmsaStatus {
    Created,
    AlreadyExists,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmsaOutcome {
    pub account: String,
    pub dns_host_name: String,
    pub status: GmsaStatus,
    pub installed_locally: bool,
    pub planned_commands: Vec<String>,
}

/// Validated account settings ready to be turned into cmdlet calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmsaSpec {
    pub name: String,
    pub dns_host_name: String,
    pub principals: Vec<String>,
    pub service_principal_names: Vec<String>,
    pub description: Option<String>,
}

pub fn create_gmsa(request: &GmsaRequest) -> Result<GmsaOutcome> {
    create_gmsa_with_runner(request, execute_command)
}

pub fn create_gmsa_with_runner<RunCommand>(
    request: &GmsaRequest,
    mut run: RunCommand,
) -> Result<GmsaOutcome>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<CommandOutput>,
{
    let spec = validate_gmsa_request(request)?;

    if !probe_present(
        &mut run,
        build_ad_module_check_command(),
        "failed to check for the ActiveDirectory PowerShell module",
    )? {
        return Err(anyhow!(
            "the ActiveDirectory PowerShell module is not installed; install RSAT AD tools first"
        ));
    }
    if !probe_present(
        &mut run,
        build_kds_root_key_check_command(),
        "failed to check for a KDS root key",
    )? {
        return Err(anyhow!(
            "no KDS root key exists in the domain; create one with Add-KdsRootKey before creating a gMSA"
        ));
    }
    let exists = probe_present(
        &mut run,
        build_gmsa_exists_command(&spec.name),
        &format!("failed to look up service account '{}'", spec.name),
    )?;

    let mut steps = Vec::new();
    if !exists {
        steps.push((
            build_new_gmsa_command(&spec),
            format!("failed to create service account '{}'", spec.name),
        ));
    }
    if request.install_locally {
        steps.push((
            build_install_gmsa_command(&spec.name),
            format!("failed to install service account '{}' locally", spec.name),
        ));
    }
    let planned_commands = steps
        .iter()
        .map(|(command, _)| render_command(command, &[]))
        .collect::<Vec<_>>();

    if request.dry_run {
        return Ok(GmsaOutcome {
            account: spec.name,
            dns_host_name: spec.dns_host_name,
            status: if exists {
                GmsaStatus::AlreadyExists
            } else {
                GmsaStatus::Planned
            },
            installed_locally: false,
            planned_commands,
        });
    }

    for (mut command, context_message) in steps {
        run(&mut command, &context_message)?.ensure_success(&context_message, &[0])?;
    }
    if !exists {
        info!(account = %spec.name, dns_host_name = %spec.dns_host_name, "created gMSA");
    }

    if request.install_locally {
        let context_message = format!("failed to verify service account '{}'", spec.name);
        let mut command = build_test_gmsa_command(&spec.name);
        let output = run(&mut command, &context_message)?;
        output.ensure_success(&context_message, &[0])?;
        if !output_lines(&output.stdout).any(|line| line.eq_ignore_ascii_case("true")) {
            return Err(anyhow!(
                "Test-ADServiceAccount did not confirm '{}' on this host; check that this computer is listed in the allowed principals and has been rebooted or had its Kerberos tickets purged",
                spec.name
            ));
        }
        info!(account = %spec.name, "verified gMSA on local host");
    }

    Ok(GmsaOutcome {
        account: spec.name,
        dns_host_name: spec.dns_host_name,
        status: if exists {
            GmsaStatus::AlreadyExists
        } else {
            GmsaStatus::Created
        },
        installed_locally: request.install_locally,
        planned_commands,
    })
}

pub fn validate_gmsa_request(request: &GmsaRequest) -> Result<GmsaSpec> {
    let name = request.name.trim().trim_end_matches('$').to_string();
    if name.is_empty() || name.len() > GMSA_NAME_MAX_LEN {
        return Err(anyhow!(
            "gMSA name must be 1 to {GMSA_NAME_MAX_LEN} characters: '{}'",
            request.name
        ));
    }
    if !name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
        return Err(anyhow!(
            "gMSA name may only contain ASCII letters, digits and '-': '{name}'"
        ));
    }
    if name.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(anyhow!("gMSA name must not be purely numeric: '{name}'"));
    }

    let domain = request.domain.trim().trim_matches('.').to_ascii_lowercase();
    if !domain.contains('.')
        || !domain
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '.')
    {
        return Err(anyhow!(
            "domain must be a DNS domain name such as corp.example.com: '{}'",
            request.domain
        ));
    }

    let principals = request
        .principals
        .iter()
        .map(|principal| principal.trim().to_string())
        .filter(|principal| !principal.is_empty())
        .collect::<Vec<_>>();
    if principals.is_empty() {
        return Err(anyhow!(
            "at least one principal allowed to retrieve the managed password is required"
        ));
    }

    let dns_host_name = match request.dns_host_name.as_deref().map(str::trim) {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => format!("{}.{domain}", name.to_ascii_lowercase()),
    };

    Ok(GmsaSpec {
        name,
        dns_host_name,
        principals,
        service_principal_names: request
            .service_principal_names
            .iter()
            .map(|spn| spn.trim().to_string())
            .filter(|spn| !spn.is_empty())
            .collect(),
        description: request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    })
}

pub fn build_ad_module_check_command() -> Command {
    build_powershell_command(
        "if (Get-Module -ListAvailable -Name ActiveDirectory) { 'present' } else { 'missing' }",
    )
}

pub fn build_kds_root_key_check_command() -> Command {
    build_powershell_command(&format!(
        "{AD_MODULE_IMPORT} if (Get-KdsRootKey) {{ 'present' }} else {{ 'missing' }}"
    ))
}

pub fn build_gmsa_exists_command(name: &str) -> Command {
    build_powershell_command(&format!(
        "{AD_MODULE_IMPORT} if (Get-ADServiceAccount -Filter \"Name -eq '{name}'\") {{ 'present' }} else {{ 'missing' }}"
    ))
}

pub fn build_new_gmsa_command(spec: &GmsaSpec) -> Command {
    let mut script = format!(
        "{AD_MODULE_IMPORT} New-ADServiceAccount -Name {} -DNSHostName {} -PrincipalsAllowedToRetrieveManagedPassword {}",
        quote_ps_literal(&spec.name),
        quote_ps_literal(&spec.dns_host_name),
        quote_ps_list(&spec.principals)
    );
    if !spec.service_principal_names.is_empty() {
        script.push_str(&format!(
            " -ServicePrincipalNames {}",
            quote_ps_list(&spec.service_principal_names)
        ));
    }
    if let Some(description) = &spec.description {
        script.push_str(&format!(" -Description {}", quote_ps_literal(description)));
    }
    script.push_str(" -Enabled $true");
    build_powershell_command(&script)
}

pub fn build_install_gmsa_command(name: &str) -> Command {
    build_powershell_command(&format!(
        "{AD_MODULE_IMPORT} Install-ADServiceAccount -Identity {}",
        quote_ps_literal(name)
    ))
}

pub fn build_test_gmsa_command(name: &str) -> Command {
    build_powershell_command(&format!(
        "{AD_MODULE_IMPORT} Test-ADServiceAccount -Identity {}",
        quote_ps_literal(name)
    ))
}

fn probe_present<RunCommand>(
    run: &mut RunCommand,
    mut command: Command,
    context_message: &str,
) -> Result<bool>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<CommandOutput>,
{
    let output = run(&mut command, context_message)?;
    output.ensure_success(context_message, &[0])?;
    match output_lines(&output.stdout).last() {
        Some("present") => Ok(true),
        Some("missing") => Ok(false),
        other => Err(anyhow!(
            "{context_message}: unexpected probe output {:?}",
            other.unwrap_or("")
        )),
    }
}
