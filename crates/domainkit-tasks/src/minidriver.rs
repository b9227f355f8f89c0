use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use domainkit_core::{ExtensionFilter, FileVersion};
use domainkit_locator::{locate_highest, LocateReport, LocatorOptions};
use tracing::{info, warn};

use crate::digest::verify_sha256_file;
use crate::msi::{
    build_installed_product_query_command, build_msi_install_command,
    build_msi_uninstall_command, msi_reboot_required, parse_installed_products, InstalledProduct,
    MSI_SUCCESS_CODES,
};
use crate::process::{execute_command, render_command, CommandOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidriverUpdateRequest {
    pub share: PathBuf,
    pub extension: ExtensionFilter,
    pub recursive: bool,
    pub product_name: String,
    pub expected_sha256: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub force: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    Install,
    Upgrade { from: Vec<InstalledProduct> },
    UpToDate { installed: FileVersion },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinidriverUpdateOutcome {
    pub report: LocateReport,
    pub decision: UpdateDecision,
    pub planned_commands: Vec<String>,
    pub applied: bool,
    pub reboot_required: bool,
}

pub fn update_minidriver(request: &MinidriverUpdateRequest) -> Result<MinidriverUpdateOutcome> {
    update_minidriver_with_runner(request, execute_command)
}

pub fn update_minidriver_with_runner<RunCommand>(
    request: &MinidriverUpdateRequest,
    mut run: RunCommand,
) -> Result<MinidriverUpdateOutcome>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<CommandOutput>,
{
    if request.product_name.trim().is_empty() {
        return Err(anyhow!("minidriver product name must not be empty"));
    }

    let report = locate_highest(
        &request.share,
        &request.extension,
        LocatorOptions {
            recursive: request.recursive,
        },
    )
    .with_context(|| {
        format!(
            "failed to locate a minidriver installer in {}",
            request.share.display()
        )
    })?;
    let available = report.selected.version;

    if let Some(expected) = &request.expected_sha256 {
        verify_sha256_file(&report.selected.path, expected)?;
    }

    let installed = query_installed_products(&request.product_name, &mut run)?;
    let decision = decide_update(available, &installed, request.force);
    info!(
        product = %request.product_name,
        available = %available,
        installed = installed.len(),
        decision = ?decision,
        "minidriver update decision"
    );

    let mut steps = Vec::new();
    if let UpdateDecision::Upgrade { from } = &decision {
        for product in from {
            steps.push((
                build_msi_uninstall_command(&product.product_code),
                format!(
                    "failed to uninstall {} {}",
                    product.product_code, product.version
                ),
            ));
        }
    }
    if !matches!(decision, UpdateDecision::UpToDate { .. }) {
        let log_path = request
            .log_dir
            .as_deref()
            .map(|dir| msiexec_log_path(dir, &report.selected.path));
        steps.push((
            build_msi_install_command(&report.selected.path, log_path.as_deref()),
            format!("failed to install {}", report.selected.path.display()),
        ));
    }

    let planned_commands = steps
        .iter()
        .map(|(command, _)| render_command(command, &[]))
        .collect::<Vec<_>>();

    if request.dry_run || steps.is_empty() {
        return Ok(MinidriverUpdateOutcome {
            report,
            decision,
            planned_commands,
            applied: false,
            reboot_required: false,
        });
    }

    if let Some(log_dir) = &request.log_dir {
        fs::create_dir_all(log_dir).with_context(|| {
            format!("failed to create msiexec log directory {}", log_dir.display())
        })?;
    }

    let mut reboot_required = false;
    for (mut command, context_message) in steps {
        let code = run(&mut command, &context_message)?
            .ensure_success(&context_message, &MSI_SUCCESS_CODES)?;
        if msi_reboot_required(code) {
            warn!(exit_code = code, "msiexec requested a reboot");
            reboot_required = true;
        }
    }

    Ok(MinidriverUpdateOutcome {
        report,
        decision,
        planned_commands,
        applied: true,
        reboot_required,
    })
}

pub fn decide_update(
    available: FileVersion,
    installed: &[InstalledProduct],
    force: bool,
) -> UpdateDecision {
    let Some(newest_installed) = installed.iter().map(|product| product.version).max() else {
        return UpdateDecision::Install;
    };
    if !force && newest_installed >= available {
        return UpdateDecision::UpToDate {
            installed: newest_installed,
        };
    }
    UpdateDecision::Upgrade {
        from: installed.to_vec(),
    }
}

fn query_installed_products<RunCommand>(
    product_name: &str,
    run: &mut RunCommand,
) -> Result<Vec<InstalledProduct>>
where
    RunCommand: FnMut(&mut Command, &str) -> Result<CommandOutput>,
{
    let context_message = format!("failed to query installed products named '{product_name}'");
    let mut command = build_installed_product_query_command(product_name);
    let output = run(&mut command, &context_message)?;
    output.ensure_success(&context_message, &[0])?;
    parse_installed_products(&output.stdout).with_context(|| context_message.clone())
}

fn msiexec_log_path(log_dir: &Path, package_path: &Path) -> PathBuf {
    let stem = package_path
        .file_stem()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_else(|| "minidriver".to_string());
    log_dir.join(format!("{stem}.log"))
}
