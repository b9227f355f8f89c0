use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::fs_utils::{remove_file_if_exists, write_file_creating_parent};
use crate::process::{execute_command, render_command, CommandOutput};

pub const PFX_PASSWORD_ENV: &str = "DOMAINKIT_PFX_PASSWORD";
pub const DEFAULT_KEY_BITS: u32 = 2048;
const ALLOWED_KEY_BITS: [u32; 3] = [2048, 3072, 4096];
const OPENSSL_PROGRAM: &str = "openssl";
const CERTREQ_PROGRAM: &str = "certreq";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    pub common_name: String,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub dns_names: Vec<String>,
    pub key_bits: u32,
    pub ca_config: String,
    pub template: String,
    pub output_dir: PathBuf,
    pub pfx_password: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateArtifacts {
    pub config: PathBuf,
    pub key: PathBuf,
    pub csr: PathBuf,
    pub certificate: PathBuf,
    pub pfx: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateOutcome {
    pub artifacts: CertificateArtifacts,
    pub subject_alt_names: Vec<String>,
    pub planned_commands: Vec<String>,
    pub applied: bool,
}

pub fn request_certificate(request: &CertificateRequest) -> Result<CertificateOutcome> {
    request_certificate_with_runner(request, execute_command)
}

pub fn request_certificate_with_runner<RunCommand>(
    request: &CertificateRequest,
    mut run: RunCommand,
) -> Result<CertificateOutcome>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<CommandOutput>,
{
    let subject_alt_names = validate_certificate_request(request)?;
    let artifacts = certificate_artifacts(request);

    let mut steps = vec![
        (
            build_openssl_csr_command(request.key_bits, &artifacts),
            "failed to generate private key and CSR with openssl".to_string(),
        ),
        (
            build_certreq_submit_command(request, &artifacts),
            format!("certreq submission to '{}' failed", request.ca_config.trim()),
        ),
    ];
    if let Some(password) = &request.pfx_password {
        steps.push((
            build_pfx_export_command(&artifacts, password),
            "failed to export PFX bundle with openssl".to_string(),
        ));
    }
    let planned_commands = steps
        .iter()
        .map(|(command, _)| render_command(command, &[]))
        .collect::<Vec<_>>();

    if request.dry_run {
        return Ok(CertificateOutcome {
            artifacts,
            subject_alt_names,
            planned_commands,
            applied: false,
        });
    }

    let config = render_openssl_request_config(request, &subject_alt_names);
    write_file_creating_parent(&artifacts.config, config.as_bytes())
        .context("failed to write openssl request config")?;
    // certreq prompts before overwriting an existing certificate file.
    remove_file_if_exists(&artifacts.certificate).with_context(|| {
        format!(
            "failed to remove stale certificate: {}",
            artifacts.certificate.display()
        )
    })?;
    if let Some(pfx) = &artifacts.pfx {
        remove_file_if_exists(pfx)
            .with_context(|| format!("failed to remove stale PFX: {}", pfx.display()))?;
    }

    let mut steps = steps.into_iter();
    if let Some((mut command, context_message)) = steps.next() {
        run(&mut command, &context_message)?.ensure_success(&context_message, &[0])?;
    }
    if let Some((mut command, context_message)) = steps.next() {
        run(&mut command, &context_message)?.ensure_success(&context_message, &[0])?;
        if !artifacts.certificate.exists() {
            return Err(anyhow!(
                "certreq returned success but no certificate was written to {}; the request may be pending CA manager approval",
                artifacts.certificate.display()
            ));
        }
    }
    for (mut command, context_message) in steps {
        run(&mut command, &context_message)?.ensure_success(&context_message, &[0])?;
    }
    info!(
        common_name = %request.common_name.trim(),
        certificate = %artifacts.certificate.display(),
        "certificate issued"
    );

    Ok(CertificateOutcome {
        artifacts,
        subject_alt_names,
        planned_commands,
        applied: true,
    })
}

/// Returns the subject alternative names, common name first when it is a
/// DNS name.
pub fn validate_certificate_request(request: &CertificateRequest) -> Result<Vec<String>> {
    let common_name = request.common_name.trim();
    if common_name.is_empty() {
        return Err(anyhow!("certificate common name must not be empty"));
    }
    for (label, value) in subject_fields(request) {
        if value.contains(['\n', '\r']) {
            return Err(anyhow!("subject field {label} must not contain line breaks"));
        }
    }
    if let Some(country) = request
        .country
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        if country.len() != 2 || !country.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(anyhow!(
                "country must be a two-letter ISO code, got '{country}'"
            ));
        }
    }
    if !ALLOWED_KEY_BITS.contains(&request.key_bits) {
        return Err(anyhow!(
            "unsupported RSA key size {}; use one of 2048, 3072 or 4096",
            request.key_bits
        ));
    }
    if request.ca_config.trim().is_empty() || !request.ca_config.contains('\\') {
        return Err(anyhow!(
            "CA config must look like 'host\\CA Name', got '{}'",
            request.ca_config
        ));
    }
    if request.template.trim().is_empty() {
        return Err(anyhow!("certificate template must not be empty"));
    }
    if request
        .pfx_password
        .as_deref()
        .is_some_and(|password| password.is_empty())
    {
        return Err(anyhow!("PFX password must not be empty when PFX export is requested"));
    }

    let mut names: Vec<String> = Vec::new();
    if is_valid_dns_name(common_name) {
        names.push(common_name.to_ascii_lowercase());
    }
    for raw in &request.dns_names {
        let name = raw.trim();
        if !is_valid_dns_name(name) {
            return Err(anyhow!("invalid DNS subject alternative name '{raw}'"));
        }
        let lower = name.to_ascii_lowercase();
        if !names.contains(&lower) {
            names.push(lower);
        }
    }
    Ok(names)
}

pub fn render_openssl_request_config(
    request: &CertificateRequest,
    subject_alt_names: &[String],
) -> String {
    let mut config = String::from(
        "[req]\ndefault_md = sha256\nprompt = no\ndistinguished_name = req_distinguished_name\nreq_extensions = v3_req\n\n[req_distinguished_name]\n",
    );
    for (label, value) in subject_fields(request) {
        config.push_str(&format!("{label} = {value}\n"));
    }
    config.push_str(
        "\n[v3_req]\nkeyUsage = critical, digitalSignature, keyEncipherment\nextendedKeyUsage = serverAuth, clientAuth\n",
    );
    if !subject_alt_names.is_empty() {
        config.push_str("subjectAltName = @alt_names\n\n[alt_names]\n");
        for (index, name) in subject_alt_names.iter().enumerate() {
            config.push_str(&format!("DNS.{} = {name}\n", index + 1));
        }
    }
    config
}

pub fn certificate_artifacts(request: &CertificateRequest) -> CertificateArtifacts {
    let stem = certificate_file_stem(&request.common_name);
    let dir = &request.output_dir;
    CertificateArtifacts {
        config: dir.join(format!("{stem}.cnf")),
        key: dir.join(format!("{stem}.key")),
        csr: dir.join(format!("{stem}.csr")),
        certificate: dir.join(format!("{stem}.cer")),
        pfx: request
            .pfx_password
            .as_ref()
            .map(|_| dir.join(format!("{stem}.pfx"))),
    }
}

pub fn build_openssl_csr_command(key_bits: u32, artifacts: &CertificateArtifacts) -> Command {
    let mut command = Command::new(OPENSSL_PROGRAM);
    command
        .arg("req")
        .arg("-new")
        .arg("-newkey")
        .arg(format!("rsa:{key_bits}"))
        .arg("-nodes")
        .arg("-keyout")
        .arg(&artifacts.key)
        .arg("-out")
        .arg(&artifacts.csr)
        .arg("-config")
        .arg(&artifacts.config);
    command
}

pub fn build_certreq_submit_command(
    request: &CertificateRequest,
    artifacts: &CertificateArtifacts,
) -> Command {
    let mut command = Command::new(CERTREQ_PROGRAM);
    command
        .arg("-submit")
        .arg("-attrib")
        .arg(format!("CertificateTemplate:{}", request.template.trim()))
        .arg("-config")
        .arg(request.ca_config.trim())
        .arg(&artifacts.csr)
        .arg(&artifacts.certificate);
    command
}

/// The password travels in the child's environment, never on its command line.
pub fn build_pfx_export_command(artifacts: &CertificateArtifacts, password: &str) -> Command {
    let pfx = artifacts
        .pfx
        .clone()
        .unwrap_or_else(|| artifacts.certificate.with_extension("pfx"));
    let mut command = Command::new(OPENSSL_PROGRAM);
    command
        .arg("pkcs12")
        .arg("-export")
        .arg("-out")
        .arg(pfx)
        .arg("-inkey")
        .arg(&artifacts.key)
        .arg("-in")
        .arg(&artifacts.certificate)
        .arg("-passout")
        .arg(format!("env:{PFX_PASSWORD_ENV}"))
        .env(PFX_PASSWORD_ENV, password);
    command
}

fn subject_fields(request: &CertificateRequest) -> Vec<(&'static str, &str)> {
    let mut fields = vec![("CN", request.common_name.trim())];
    let optional = [
        ("O", &request.organization),
        ("OU", &request.organizational_unit),
        ("L", &request.locality),
        ("ST", &request.state),
        ("C", &request.country),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            fields.push((label, value));
        }
    }
    fields
}

fn is_valid_dns_name(name: &str) -> bool {
    let host = name.strip_prefix("*.").unwrap_or(name);
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
        })
}

fn certificate_file_stem(common_name: &str) -> String {
    common_name
        .trim()
        .replace('*', "wildcard")
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
