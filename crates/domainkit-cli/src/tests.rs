use super::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{load_config, parse_config, required, DomainkitConfig};
use crate::dispatch::{
    build_cert_request, build_gmsa_request, build_minidriver_request, build_sql_request,
    locate_settings, SQL_SA_PASSWORD_ENV, SQL_SVC_PASSWORD_ENV,
};
use crate::logging::default_log_directive;
use crate::render::{
    format_cert_lines, format_gmsa_lines, format_locate_lines, format_minidriver_lines,
    format_sql_lines, render_section_header, render_status_line, resolve_output_style,
    OutputStyle,
};
use domainkit_core::{ExtensionFilter, FileVersion};
use domainkit_locator::{Candidate, LocateReport, SkippedFile};
use domainkit_tasks::{
    CertificateArtifacts, CertificateOutcome, GmsaOutcome, GmsaStatus, InstalledProduct,
    MinidriverUpdateOutcome, SqlInstallOutcome, SqlSecurityMode, SqlServiceAccount,
    UpdateDecision, PFX_PASSWORD_ENV,
};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let sequence = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "domainkit-cli-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    fs::create_dir_all(&path).expect("must create test dir");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_with(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

const SAMPLE_CONFIG: &str = r#"
[locator]
extension = ".MSI"
recursive = false

[minidriver]
share = '\\fs01\drivers\minidriver'
product_name = "Acme Minidriver"
log_dir = 'C:\Logs'

[gmsa]
domain = "corp.example.com"
principals = ["SQL-Servers"]

[sql]
setup_path = 'D:\setup.exe'
sysadmins = ['CORP\SQL Admins']

[cert]
ca_config = 'ca01.corp.example.com\Corp Issuing CA'
template = "WebServer"
key_bits = 3072
country = "US"
"#;

fn sample_config() -> DomainkitConfig {
    parse_config(SAMPLE_CONFIG).expect("sample config must parse")
}

// argument parsing

#[test]
fn cli_parses_locate_with_flags() {
    let cli = Cli::try_parse_from([
        "domainkit",
        "locate",
        "/srv/share",
        "--extension",
        "exe",
        "--no-recurse",
        "--json",
    ])
    .expect("command must parse");
    match cli.command {
        Commands::Locate(args) => {
            assert_eq!(args.dir, PathBuf::from("/srv/share"));
            assert_eq!(args.extension.as_deref(), Some("exe"));
            assert!(args.no_recurse);
            assert!(args.json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_counts_verbosity_and_accepts_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["domainkit", "locate", ".", "-vv", "--config", "a.toml"])
        .expect("command must parse");
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
}

#[test]
fn cli_rejects_quiet_with_verbose() {
    let err = Cli::try_parse_from(["domainkit", "-q", "-v", "version"])
        .expect_err("quiet and verbose conflict");
    assert!(err.to_string().contains("cannot be used with"));
}

#[test]
fn cli_parses_gmsa_create_with_repeated_principals() {
    let cli = Cli::try_parse_from([
        "domainkit",
        "gmsa",
        "create",
        "svc-web",
        "--domain",
        "corp.example.com",
        "--principal",
        "Web-Servers",
        "--principal",
        "WEB01$",
        "--spn",
        "HTTP/web.corp.example.com",
        "--install-locally",
    ])
    .expect("command must parse");
    match cli.command {
        Commands::Gmsa {
            command: GmsaCommands::Create(args),
        } => {
            assert_eq!(args.name, "svc-web");
            assert_eq!(args.principals, vec!["Web-Servers", "WEB01$"]);
            assert_eq!(
                args.service_principal_names,
                vec!["HTTP/web.corp.example.com"]
            );
            assert!(args.install_locally);
            assert!(!args.dry_run);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_sql_service_account_kinds_are_exclusive() {
    let err = Cli::try_parse_from([
        "domainkit",
        "sql",
        "install",
        "--gmsa",
        "CORP\\svc-sql",
        "--builtin-account",
        "network-service",
    ])
    .expect_err("two account kinds must conflict");
    assert!(err.to_string().contains("cannot be used with"));
}

#[test]
fn cli_parses_builtin_account_names() {
    let cli = Cli::try_parse_from([
        "domainkit",
        "sql",
        "install",
        "--builtin-account",
        "Local-System",
        "--features",
        "SQLENGINE,FULLTEXT",
    ])
    .expect("command must parse");
    match cli.command {
        Commands::Sql {
            command: SqlCommands::Install(args),
        } => {
            assert_eq!(args.builtin_account, Some(BuiltinAccount::LocalSystem));
            assert_eq!(args.features, vec!["SQLENGINE", "FULLTEXT"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let err = Cli::try_parse_from(["domainkit", "sql", "install", "--builtin-account", "guest"])
        .expect_err("unknown account must fail");
    assert!(err.to_string().contains("unknown built-in account 'guest'"));
}

#[test]
fn cli_parses_completions_for_each_supported_shell() {
    let cases = vec![
        ("bash", CliCompletionShell::Bash),
        ("zsh", CliCompletionShell::Zsh),
        ("fish", CliCompletionShell::Fish),
        ("powershell", CliCompletionShell::Powershell),
    ];

    for (shell, expected) in cases {
        let cli =
            Cli::try_parse_from(["domainkit", "completions", shell]).expect("command parses");
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, expected),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

#[test]
fn cli_rejects_unsupported_completion_shell() {
    let err = Cli::try_parse_from(["domainkit", "completions", "elvish"])
        .expect_err("unsupported shell must fail");
    let rendered = err.to_string();
    assert!(rendered.contains("elvish"));
    assert!(rendered.contains("possible values"));
}

#[test]
fn cli_parses_version_subcommand_but_not_flag() {
    let cli = Cli::try_parse_from(["domainkit", "version"]).expect("command must parse");
    assert!(matches!(cli.command, Commands::Version));
    assert!(Cli::try_parse_from(["domainkit", "--version"]).is_err());
}

#[test]
fn every_subcommand_has_help_text() {
    let command = <Cli as clap::CommandFactory>::command();
    for subcommand in command.get_subcommands() {
        assert!(
            subcommand.get_about().is_some(),
            "subcommand '{}' has no description",
            subcommand.get_name()
        );
    }
}

#[test]
fn completions_script_mentions_subcommands() {
    let mut output = Vec::new();
    completion::write_completions_script(CliCompletionShell::Bash, &mut output)
        .expect("must generate");
    let script = String::from_utf8(output).expect("utf8");
    assert!(script.contains("domainkit"));
    assert!(script.contains("minidriver"));
    assert!(script.contains("completions"));
}

// logging

#[test]
fn log_directive_follows_verbosity() {
    assert_eq!(default_log_directive(0, true), "warn");
    assert_eq!(default_log_directive(0, false), "info");
    assert_eq!(default_log_directive(1, false), "debug");
    assert_eq!(default_log_directive(4, false), "trace");
}

// config

#[test]
fn config_parses_all_sections() {
    let config = sample_config();
    assert_eq!(config.locator.extension, Some(ExtensionFilter::new("msi")));
    assert_eq!(config.locator.recursive, Some(false));
    assert_eq!(
        config.minidriver.product_name.as_deref(),
        Some("Acme Minidriver")
    );
    assert_eq!(config.gmsa.principals, vec!["SQL-Servers"]);
    assert_eq!(config.sql.sysadmins, vec!["CORP\\SQL Admins"]);
    assert_eq!(config.cert.key_bits, Some(3072));
}

#[test]
fn config_rejects_unknown_keys() {
    let err = parse_config("[sql]\ninstance = \"X\"\n").expect_err("unknown key must fail");
    assert!(format!("{err:#}").contains("unknown field"));

    let err = parse_config("[gmssa]\ndomain = \"x.y\"\n").expect_err("unknown section must fail");
    assert!(format!("{err:#}").contains("unknown field"));
}

#[test]
fn config_loading_prefers_explicit_path_then_default_file() {
    let dir = test_dir();
    assert_eq!(
        load_config(None, &dir).expect("missing default is empty"),
        DomainkitConfig::default()
    );

    fs::write(dir.join("domainkit.toml"), "[gmsa]\ndomain = \"default.example\"\n")
        .expect("write default config");
    let explicit = dir.join("explicit.toml");
    fs::write(&explicit, "[gmsa]\ndomain = \"explicit.example\"\n")
        .expect("write explicit config");

    let config = load_config(None, &dir).expect("default config loads");
    assert_eq!(config.gmsa.domain.as_deref(), Some("default.example"));
    let config = load_config(Some(&explicit), &dir).expect("explicit config loads");
    assert_eq!(config.gmsa.domain.as_deref(), Some("explicit.example"));

    let err = load_config(Some(Path::new(&dir.join("missing.toml"))), &dir)
        .expect_err("explicit missing file must fail");
    assert!(err.to_string().contains("failed reading config file"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn required_value_error_names_flag_and_key() {
    assert_eq!(
        required(Some(1), Some(2), "--x", "s.x").expect("flag wins"),
        1
    );
    assert_eq!(required(None, Some(2), "--x", "s.x").expect("file used"), 2);
    let err = required::<u32>(None, None, "--share", "minidriver.share")
        .expect_err("missing must fail");
    assert_eq!(
        err.to_string(),
        "missing required value: pass --share or set `minidriver.share` in the config file"
    );
}

// request building

#[test]
fn locate_settings_merge_flags_and_config() {
    let args = LocateArgs {
        dir: PathBuf::from("share"),
        extension: None,
        no_recurse: false,
        json: false,
    };
    let (root, extension, options) = locate_settings(args, &sample_config());
    assert_eq!(root, PathBuf::from("share"));
    assert_eq!(extension.as_str(), "msi");
    assert!(!options.recursive, "config disables recursion");

    let args = LocateArgs {
        dir: PathBuf::from("share"),
        extension: Some("EXE".to_string()),
        no_recurse: false,
        json: false,
    };
    let (_, extension, options) = locate_settings(args, &DomainkitConfig::default());
    assert_eq!(extension.as_str(), "exe");
    assert!(options.recursive);
}

#[test]
fn minidriver_request_takes_flags_over_config() {
    let cli = Cli::try_parse_from([
        "domainkit",
        "minidriver",
        "update",
        "--product",
        "Other Driver",
        "--dry-run",
    ])
    .expect("command must parse");
    let Commands::Minidriver {
        command: MinidriverCommands::Update(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let request = build_minidriver_request(args, &sample_config()).expect("must build");
    assert_eq!(request.share, PathBuf::from("\\\\fs01\\drivers\\minidriver"));
    assert_eq!(request.product_name, "Other Driver");
    assert_eq!(request.log_dir, Some(PathBuf::from("C:\\Logs")));
    assert!(!request.recursive);
    assert!(request.dry_run);
}

#[test]
fn minidriver_request_without_share_names_both_sources() {
    let cli = Cli::try_parse_from(["domainkit", "minidriver", "update", "--product", "X"])
        .expect("command must parse");
    let Commands::Minidriver {
        command: MinidriverCommands::Update(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let err = build_minidriver_request(args, &DomainkitConfig::default())
        .expect_err("share is required");
    assert!(err.to_string().contains("--share"));
    assert!(err.to_string().contains("minidriver.share"));
}

#[test]
fn gmsa_request_falls_back_to_config_principals() {
    let cli = Cli::try_parse_from(["domainkit", "gmsa", "create", "svc-sql01"])
        .expect("command must parse");
    let Commands::Gmsa {
        command: GmsaCommands::Create(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let request = build_gmsa_request(args, &sample_config()).expect("must build");
    assert_eq!(request.domain, "corp.example.com");
    assert_eq!(request.principals, vec!["SQL-Servers"]);
}

#[test]
fn sql_request_defaults_to_virtual_account_and_windows_auth() {
    let cli = Cli::try_parse_from(["domainkit", "sql", "install"]).expect("command must parse");
    let Commands::Sql {
        command: SqlCommands::Install(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let request = build_sql_request(args, &sample_config(), no_env).expect("must build");
    assert_eq!(request.setup_path, PathBuf::from("D:\\setup.exe"));
    assert_eq!(request.instance_name, "SQLEXPRESS");
    assert_eq!(request.features, vec!["SQLENGINE"]);
    assert_eq!(
        request.service_account,
        SqlServiceAccount::Builtin(BuiltinAccount::VirtualAccount)
    );
    assert_eq!(request.security_mode, SqlSecurityMode::Windows);
    assert_eq!(request.sysadmins, vec!["CORP\\SQL Admins"]);
}

#[test]
fn sql_request_reads_passwords_from_environment() {
    let cli = Cli::try_parse_from([
        "domainkit",
        "sql",
        "install",
        "--service-account",
        "CORP\\sqlsvc",
        "--mixed-mode",
    ])
    .expect("command must parse");
    let Commands::Sql {
        command: SqlCommands::Install(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let request = build_sql_request(
        args,
        &sample_config(),
        env_with(&[
            (SQL_SVC_PASSWORD_ENV, "svc-secret"),
            (SQL_SA_PASSWORD_ENV, "sa-secret"),
        ]),
    )
    .expect("must build");
    assert_eq!(
        request.service_account,
        SqlServiceAccount::Account {
            name: "CORP\\sqlsvc".to_string(),
            password: "svc-secret".to_string(),
        }
    );
    assert_eq!(
        request.security_mode,
        SqlSecurityMode::Mixed {
            sa_password: "sa-secret".to_string()
        }
    );
}

#[test]
fn sql_request_without_sa_password_fails() {
    let cli = Cli::try_parse_from(["domainkit", "sql", "install", "--mixed-mode"])
        .expect("command must parse");
    let Commands::Sql {
        command: SqlCommands::Install(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let err = build_sql_request(args, &sample_config(), no_env).expect_err("sa password needed");
    assert!(err.to_string().contains(SQL_SA_PASSWORD_ENV));
}

#[test]
fn cert_request_merges_config_defaults() {
    let cli = Cli::try_parse_from([
        "domainkit",
        "cert",
        "request",
        "web01.corp.example.com",
        "--dns",
        "web.corp.example.com",
        "--pfx",
    ])
    .expect("command must parse");
    let Commands::Cert {
        command: CertCommands::Request(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let request = build_cert_request(
        args,
        &sample_config(),
        env_with(&[(PFX_PASSWORD_ENV, "pfx-secret")]),
    )
    .expect("must build");
    assert_eq!(request.ca_config, "ca01.corp.example.com\\Corp Issuing CA");
    assert_eq!(request.template, "WebServer");
    assert_eq!(request.key_bits, 3072);
    assert_eq!(request.country.as_deref(), Some("US"));
    assert_eq!(request.output_dir, PathBuf::from("."));
    assert_eq!(request.pfx_password.as_deref(), Some("pfx-secret"));
}

#[test]
fn cert_request_requires_ca_config() {
    let cli = Cli::try_parse_from(["domainkit", "cert", "request", "web01.corp.example.com"])
        .expect("command must parse");
    let Commands::Cert {
        command: CertCommands::Request(args),
    } = cli.command
    else {
        panic!("unexpected command");
    };
    let err = build_cert_request(args, &DomainkitConfig::default(), no_env)
        .expect_err("CA config is required");
    assert!(err.to_string().contains("cert.ca_config"));
}

// rendering

#[test]
fn resolve_output_style_follows_stdout_tty() {
    assert_eq!(resolve_output_style(true), OutputStyle::Rich);
    assert_eq!(resolve_output_style(false), OutputStyle::Plain);
}

#[test]
fn render_status_line_plain_is_unadorned() {
    assert_eq!(
        render_status_line(OutputStyle::Plain, "ok", "created gMSA svc-web"),
        "created gMSA svc-web"
    );
}

#[test]
fn render_status_line_rich_includes_ascii_badge() {
    assert_eq!(
        render_status_line(OutputStyle::Rich, "ok", "created gMSA svc-web"),
        "[OK] created gMSA svc-web"
    );
    assert_eq!(
        render_status_line(OutputStyle::Rich, "warn", "reboot required"),
        "[WARN] reboot required"
    );
    assert_eq!(
        render_status_line(OutputStyle::Rich, "step", "would run: msiexec"),
        "[..] would run: msiexec"
    );
}

#[test]
fn section_header_only_in_rich_mode() {
    assert_eq!(render_section_header(OutputStyle::Plain, "sql install"), None);
    assert_eq!(
        render_section_header(OutputStyle::Rich, "sql install").as_deref(),
        Some("== sql install ==")
    );
}

#[test]
fn locate_lines_report_skipped_files_then_selection() {
    let report = LocateReport {
        root: PathBuf::from("share"),
        extension: ExtensionFilter::default(),
        selected: Candidate {
            path: PathBuf::from("share/driver-1.2.10.0.msi"),
            version: FileVersion::new(1, 2, 10, 0),
        },
        skipped: vec![SkippedFile {
            path: PathBuf::from("share/driver-latest.msi"),
            reason: "no version".to_string(),
        }],
        scanned: 2,
    };
    let lines = format_locate_lines(&report)
        .iter()
        .map(|line| line.render(OutputStyle::Rich))
        .collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[WARN] skipped "));
    assert!(lines[1].starts_with("[OK] selected "));
    assert!(lines[1].ends_with("version=1.2.10.0 (scanned=2 skipped=1)"));
}

#[test]
fn gmsa_lines_show_plan_only_for_dry_runs() {
    let outcome = GmsaOutcome {
        account: "svc-web".to_string(),
        dns_host_name: "svc-web.corp.example.com".to_string(),
        status: GmsaStatus::Planned,
        installed_locally: false,
        planned_commands: vec!["powershell.exe New-ADServiceAccount".to_string()],
    };
    let dry = format_gmsa_lines(&outcome, true);
    assert_eq!(dry.len(), 2);
    assert_eq!(
        dry[1].render(OutputStyle::Plain),
        "would run: powershell.exe New-ADServiceAccount"
    );

    let applied = GmsaOutcome {
        status: GmsaStatus::Created,
        ..outcome
    };
    let lines = format_gmsa_lines(&applied, false);
    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0].render(OutputStyle::Rich),
        "[OK] created gMSA svc-web (dns=svc-web.corp.example.com)"
    );
}

#[test]
fn sql_lines_warn_about_reboot() {
    let outcome = SqlInstallOutcome {
        instance_name: "SQLEXPRESS".to_string(),
        service_account: "CORP\\svc-sql$".to_string(),
        command_line: "setup.exe /Q".to_string(),
        applied: true,
        reboot_required: true,
    };
    let lines = format_sql_lines(&outcome)
        .iter()
        .map(|line| line.render(OutputStyle::Rich))
        .collect::<Vec<_>>();
    assert_eq!(
        lines,
        vec![
            "[OK] SQL Server instance SQLEXPRESS installed (service account CORP\\svc-sql$)",
            "[WARN] a reboot is required to finish the installation",
        ]
    );
}

fn minidriver_outcome(decision: UpdateDecision, applied: bool) -> MinidriverUpdateOutcome {
    MinidriverUpdateOutcome {
        report: LocateReport {
            root: PathBuf::from("share"),
            extension: ExtensionFilter::default(),
            selected: Candidate {
                path: PathBuf::from("share/driver-2.0.0.0.msi"),
                version: FileVersion::new(2, 0, 0, 0),
            },
            skipped: Vec::new(),
            scanned: 1,
        },
        decision,
        planned_commands: Vec::new(),
        applied,
        reboot_required: false,
    }
}

fn rich(lines: &[crate::render::StatusLine]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.render(OutputStyle::Rich))
        .collect()
}

#[test]
fn minidriver_lines_describe_fresh_install() {
    let lines = rich(&format_minidriver_lines(&minidriver_outcome(
        UpdateDecision::Install,
        true,
    )));
    assert_eq!(
        lines,
        vec![
            format!(
                "[..] newest installer: {} version=2.0.0.0",
                Path::new("share/driver-2.0.0.0.msi").display()
            ),
            "[..] not installed; installing 2.0.0.0".to_string(),
            "[OK] minidriver 2.0.0.0 installed".to_string(),
        ]
    );
}

#[test]
fn minidriver_lines_list_upgraded_versions_and_reboot() {
    let mut outcome = minidriver_outcome(
        UpdateDecision::Upgrade {
            from: vec![
                InstalledProduct {
                    product_code: "{OLD-1}".to_string(),
                    version: FileVersion::new(1, 5, 0, 0),
                },
                InstalledProduct {
                    product_code: "{OLD-2}".to_string(),
                    version: FileVersion::new(1, 9, 0, 1),
                },
            ],
        },
        true,
    );
    outcome.reboot_required = true;

    let lines = rich(&format_minidriver_lines(&outcome));
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "[..] upgrading 1.5.0.0, 1.9.0.1 -> 2.0.0.0");
    assert_eq!(lines[2], "[OK] minidriver 2.0.0.0 installed");
    assert_eq!(
        lines[3],
        "[WARN] a reboot is required to finish the installation"
    );
}

#[test]
fn minidriver_lines_report_up_to_date_and_dry_run_plan() {
    let current = rich(&format_minidriver_lines(&minidriver_outcome(
        UpdateDecision::UpToDate {
            installed: FileVersion::new(2, 0, 0, 0),
        },
        false,
    )));
    assert_eq!(
        current[1..],
        [
            "[..] installed version 2.0.0.0 is up to date".to_string(),
            "[OK] minidriver update: nothing to do".to_string(),
        ]
    );

    let mut planned = minidriver_outcome(UpdateDecision::Install, false);
    planned.planned_commands = vec!["msiexec /i driver-2.0.0.0.msi /qn /norestart".to_string()];
    let lines = rich(&format_minidriver_lines(&planned));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("[..] would run: msiexec /i driver-2.0.0.0.msi /qn /norestart")
    );
    assert!(!lines.iter().any(|line| line.starts_with("[OK]")));
}

fn cert_outcome(pfx: Option<PathBuf>, applied: bool) -> CertificateOutcome {
    CertificateOutcome {
        artifacts: CertificateArtifacts {
            config: PathBuf::from("out/web.corp.example.com.cnf"),
            key: PathBuf::from("out/web.corp.example.com.key"),
            csr: PathBuf::from("out/web.corp.example.com.csr"),
            certificate: PathBuf::from("out/web.corp.example.com.cer"),
            pfx,
        },
        subject_alt_names: vec![
            "web.corp.example.com".to_string(),
            "web".to_string(),
        ],
        planned_commands: vec!["openssl req -new".to_string()],
        applied,
    }
}

#[test]
fn cert_lines_list_written_artifacts() {
    let lines = rich(&format_cert_lines(&cert_outcome(
        Some(PathBuf::from("out/web.corp.example.com.pfx")),
        true,
    )));
    assert_eq!(
        lines,
        vec![
            "[..] subject alternative names: web.corp.example.com, web".to_string(),
            format!(
                "[OK] certificate written to {}",
                Path::new("out/web.corp.example.com.cer").display()
            ),
            format!(
                "[OK] private key written to {}",
                Path::new("out/web.corp.example.com.key").display()
            ),
            format!(
                "[OK] PFX bundle written to {}",
                Path::new("out/web.corp.example.com.pfx").display()
            ),
        ]
    );

    let without_pfx = format_cert_lines(&cert_outcome(None, true));
    assert_eq!(without_pfx.len(), 3);
}

#[test]
fn cert_lines_show_plan_for_dry_runs() {
    let lines = rich(&format_cert_lines(&cert_outcome(None, false)));
    assert_eq!(
        lines,
        vec![
            "[..] subject alternative names: web.corp.example.com, web".to_string(),
            "[..] would run: openssl req -new".to_string(),
        ]
    );
}
