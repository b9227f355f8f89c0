//! Windows administration workflows driven through external tooling.
//!
//! Every workflow has a `*_with_runner` form taking the command runner as a
//! closure so it can be exercised without PowerShell, msiexec, SQL Server
//! setup or a certificate authority.

mod cert;
mod digest;
mod fs_utils;
mod gmsa;
mod minidriver;
mod msi;
mod powershell;
mod process;
mod sql;

pub use cert::{
    build_certreq_submit_command, build_openssl_csr_command, build_pfx_export_command,
    certificate_artifacts, render_openssl_request_config, request_certificate,
    request_certificate_with_runner, validate_certificate_request, CertificateArtifacts,
    CertificateOutcome, CertificateRequest, DEFAULT_KEY_BITS, PFX_PASSWORD_ENV,
};
pub use digest::{sha256_file, verify_sha256_file};
pub use gmsa::{
    build_ad_module_check_command, build_gmsa_exists_command, build_install_gmsa_command,
    build_kds_root_key_check_command, build_new_gmsa_command, build_test_gmsa_command,
    create_gmsa, create_gmsa_with_runner, validate_gmsa_request, GmsaOutcome, GmsaRequest,
    GmsaSpec, GmsaStatus,
};
pub use minidriver::{
    decide_update, update_minidriver, update_minidriver_with_runner, MinidriverUpdateOutcome,
    MinidriverUpdateRequest, UpdateDecision,
};
pub use msi::{
    build_installed_product_query_command, build_msi_install_command,
    build_msi_uninstall_command, msi_reboot_required, parse_installed_products, InstalledProduct,
    MSI_SUCCESS_CODES,
};
pub use powershell::{build_powershell_command, quote_ps_literal};
pub use process::{execute_command, render_command, CommandOutput};
pub use sql::{
    build_sql_setup_command, install_sql_express, install_sql_express_with_runner,
    validate_sql_request, BuiltinAccount, SqlExpressRequest, SqlInstallOutcome,
    SqlSecurityMode, SqlServiceAccount, DEFAULT_SQL_FEATURES, DEFAULT_SQL_INSTANCE,
};
