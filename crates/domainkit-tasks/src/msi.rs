use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use domainkit_core::FileVersion;

use crate::powershell::{build_powershell_command, output_lines, quote_ps_literal};

pub(crate) const MSIEXEC_PROGRAM: &str = "msiexec";

/// 1641: reboot initiated, 3010: reboot required.
pub const MSI_SUCCESS_CODES: [i32; 3] = [0, 1641, 3010];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledProduct {
    pub product_code: String,
    pub version: FileVersion,
}

pub fn msi_reboot_required(code: i32) -> bool {
    matches!(code, 1641 | 3010)
}

pub fn build_msi_install_command(package_path: &Path, log_path: Option<&Path>) -> Command {
    let mut command = Command::new(MSIEXEC_PROGRAM);
    command
        .arg("/i")
        .arg(package_path)
        .arg("/qn")
        .arg("/norestart");
    if let Some(log_path) = log_path {
        command.arg("/l*v").arg(log_path);
    }
    command
}

pub fn build_msi_uninstall_command(product_code: &str) -> Command {
    let mut command = Command::new(MSIEXEC_PROGRAM);
    command
        .arg("/x")
        .arg(product_code)
        .arg("/qn")
        .arg("/norestart");
    command
}

/// Lists installed MSI products whose name starts with `product_name`, one
/// `ProductCode<TAB>Version` line each.
pub fn build_installed_product_query_command(product_name: &str) -> Command {
    let pattern = quote_ps_literal(&format!("{product_name}*"));
    let script = format!(
        "$ErrorActionPreference = 'Stop'; Get-CimInstance -ClassName Win32_Product | Where-Object {{ $_.Name -like {pattern} }} | ForEach-Object {{ \"{{0}}`t{{1}}\" -f $_.IdentifyingNumber, $_.Version }}"
    );
    build_powershell_command(&script)
}

pub fn parse_installed_products(stdout: &str) -> Result<Vec<InstalledProduct>> {
    let mut products = Vec::new();
    for line in output_lines(stdout) {
        let Some((code, version)) = line.split_once('\t') else {
            return Err(anyhow!("invalid installed product row: {line}"));
        };
        let product_code = code.trim();
        if !(product_code.starts_with('{') && product_code.ends_with('}')) {
            return Err(anyhow!("invalid MSI product code '{product_code}'"));
        }
        let version = FileVersion::parse_lenient(version)
            .with_context(|| format!("invalid installed version for {product_code}"))?;
        products.push(InstalledProduct {
            product_code: product_code.to_string(),
            version,
        });
    }
    Ok(products)
}
