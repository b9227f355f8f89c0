use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::process::{execute_command, render_command, CommandOutput};

pub const DEFAULT_SQL_INSTANCE: &str = "SQLEXPRESS";
pub const DEFAULT_SQL_FEATURES: &str = "SQLENGINE";

const SQL_INSTANCE_MAX_LEN: usize = 16;
const SQL_SETUP_SUCCESS_CODES: [i32; 2] = [0, 3010];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAccount {
    NetworkService,
    LocalSystem,
    VirtualAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlServiceAccount {
    Gmsa(String),
    Builtin(BuiltinAccount),
    Account { name: String, password: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlSecurityMode {
    Windows,
    Mixed { sa_password: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlExpressRequest {
    pub setup_path: PathBuf,
    pub instance_name: String,
    pub features: Vec<String>,
    pub service_account: SqlServiceAccount,
    pub sysadmins: Vec<String>,
    pub security_mode: SqlSecurityMode,
    pub tcp_enabled: bool,
    pub install_dir: Option<PathBuf>,
    pub update_enabled: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlInstallOutcome {
    pub instance_name: String,
    pub service_account: String,
    pub command_line: String,
    pub applied: bool,
    pub reboot_required: bool,
}

impl BuiltinAccount {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "network-service" | "networkservice" => Some(Self::NetworkService),
            "local-system" | "localsystem" | "system" => Some(Self::LocalSystem),
            "virtual" | "virtual-account" => Some(Self::VirtualAccount),
            _ => None,
        }
    }

    fn account_name(self, instance_name: &str) -> String {
        match self {
            Self::NetworkService => "NT AUTHORITY\\NETWORK SERVICE".to_string(),
            Self::LocalSystem => "NT AUTHORITY\\SYSTEM".to_string(),
            Self::VirtualAccount => format!("NT Service\\MSSQL${instance_name}"),
        }
    }
}

impl SqlServiceAccount {
    pub fn account_name(&self, instance_name: &str) -> String {
        match self {
            Self::Gmsa(name) => {
                let trimmed = name.trim();
                if trimmed.ends_with('$') {
                    trimmed.to_string()
                } else {
                    format!("{trimmed}$")
                }
            }
            Self::Builtin(builtin) => builtin.account_name(instance_name),
            Self::Account { name, .. } => name.trim().to_string(),
        }
    }
}

impl SqlExpressRequest {
    fn secrets(&self) -> Vec<&str> {
        let mut secrets = Vec::new();
        if let SqlServiceAccount::Account { password, .. } = &self.service_account {
            secrets.push(password.as_str());
        }
        if let SqlSecurityMode::Mixed { sa_password } = &self.security_mode {
            secrets.push(sa_password.as_str());
        }
        secrets
    }
}

pub fn install_sql_express(request: &SqlExpressRequest) -> Result<SqlInstallOutcome> {
    install_sql_express_with_runner(request, execute_command)
}

pub fn install_sql_express_with_runner<RunCommand>(
    request: &SqlExpressRequest,
    mut run: RunCommand,
) -> Result<SqlInstallOutcome>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<CommandOutput>,
{
    validate_sql_request(request)?;
    if !request.setup_path.is_file() {
        return Err(anyhow!(
            "SQL Server setup was not found: {}",
            request.setup_path.display()
        ));
    }

    let instance_name = request.instance_name.trim().to_ascii_uppercase();
    let service_account = request.service_account.account_name(&instance_name);
    let mut command = build_sql_setup_command(request);
    let command_line = render_command(&command, &request.secrets());

    if request.dry_run {
        return Ok(SqlInstallOutcome {
            instance_name,
            service_account,
            command_line,
            applied: false,
            reboot_required: false,
        });
    }

    info!(instance = %instance_name, account = %service_account, "starting SQL Server setup");
    let context_message = format!("SQL Server setup failed for instance '{instance_name}'");
    let code = run(&mut command, &context_message)?
        .ensure_success(&context_message, &SQL_SETUP_SUCCESS_CODES)
        .map_err(|err| redact_error(err, &request.secrets()))?;
    let reboot_required = code == 3010;
    if reboot_required {
        warn!(instance = %instance_name, "SQL Server setup requires a reboot");
    }

    Ok(SqlInstallOutcome {
        instance_name,
        service_account,
        command_line,
        applied: true,
        reboot_required,
    })
}

pub fn validate_sql_request(request: &SqlExpressRequest) -> Result<()> {
    validate_instance_name(&request.instance_name)?;
    if request
        .features
        .iter()
        .all(|feature| feature.trim().is_empty())
    {
        return Err(anyhow!("at least one SQL Server feature is required"));
    }
    if request
        .sysadmins
        .iter()
        .all(|account| account.trim().is_empty())
    {
        return Err(anyhow!("at least one sysadmin account is required"));
    }
    match &request.service_account {
        SqlServiceAccount::Gmsa(name) if name.trim().trim_end_matches('$').is_empty() => {
            return Err(anyhow!("gMSA service account name must not be empty"));
        }
        SqlServiceAccount::Account { name, password } => {
            if name.trim().is_empty() {
                return Err(anyhow!("service account name must not be empty"));
            }
            if password.is_empty() {
                return Err(anyhow!(
                    "a password is required for service account '{}'",
                    name.trim()
                ));
            }
        }
        _ => {}
    }
    if let SqlSecurityMode::Mixed { sa_password } = &request.security_mode {
        if sa_password.is_empty() {
            return Err(anyhow!("mixed-mode authentication requires an sa password"));
        }
    }
    Ok(())
}

fn validate_instance_name(instance_name: &str) -> Result<()> {
    let name = instance_name.trim();
    if name.is_empty() || name.len() > SQL_INSTANCE_MAX_LEN {
        return Err(anyhow!(
            "SQL instance name must be 1 to {SQL_INSTANCE_MAX_LEN} characters: '{instance_name}'"
        ));
    }
    let mut chars = name.chars();
    if !chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
    {
        return Err(anyhow!(
            "SQL instance name must start with a letter or '_': '{name}'"
        ));
    }
    if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$') {
        return Err(anyhow!(
            "SQL instance name may only contain letters, digits, '_' and '$': '{name}'"
        ));
    }
    if name.eq_ignore_ascii_case("DEFAULT") {
        return Err(anyhow!("'{name}' is a reserved SQL instance name"));
    }
    Ok(())
}

pub fn build_sql_setup_command(request: &SqlExpressRequest) -> Command {
    let instance_name = request.instance_name.trim().to_ascii_uppercase();
    let features = request
        .features
        .iter()
        .map(|feature| feature.trim().to_ascii_uppercase())
        .filter(|feature| !feature.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    let mut command = Command::new(&request.setup_path);
    command
        .arg("/Q")
        .arg("/ACTION=Install")
        .arg("/IACCEPTSQLSERVERLICENSETERMS")
        .arg(format!("/FEATURES={features}"))
        .arg(format!("/INSTANCENAME={instance_name}"))
        .arg(format!(
            "/SQLSVCACCOUNT={}",
            request.service_account.account_name(&instance_name)
        ));
    if let SqlServiceAccount::Account { password, .. } = &request.service_account {
        command.arg(format!("/SQLSVCPASSWORD={password}"));
    }
    command.arg("/SQLSVCSTARTUPTYPE=Automatic");

    let mut sysadmins = request
        .sysadmins
        .iter()
        .map(|account| account.trim())
        .filter(|account| !account.is_empty());
    if let Some(first) = sysadmins.next() {
        command.arg(format!("/SQLSYSADMINACCOUNTS={first}"));
        command.args(sysadmins);
    }

    if let SqlSecurityMode::Mixed { sa_password } = &request.security_mode {
        command
            .arg("/SECURITYMODE=SQL")
            .arg(format!("/SAPWD={sa_password}"));
    }
    command.arg(format!(
        "/TCPENABLED={}",
        if request.tcp_enabled { 1 } else { 0 }
    ));
    if let Some(install_dir) = &request.install_dir {
        command.arg(format!("/INSTANCEDIR={}", install_dir.display()));
    }
    command.arg(format!(
        "/UPDATEENABLED={}",
        if request.update_enabled {
            "True"
        } else {
            "False"
        }
    ));
    command
}

fn redact_error(err: anyhow::Error, secrets: &[&str]) -> anyhow::Error {
    let mut message = format!("{err:#}");
    for secret in secrets.iter().filter(|secret| !secret.is_empty()) {
        message = message.replace(secret, crate::process::REDACTED);
    }
    anyhow!(message)
}
