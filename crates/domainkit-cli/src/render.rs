use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use domainkit_locator::LocateReport;
use domainkit_tasks::{
    CertificateOutcome, GmsaOutcome, GmsaStatus, MinidriverUpdateOutcome, SqlInstallOutcome,
    UpdateDecision,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn current() -> Self {
        Self {
            style: current_output_style(),
        }
    }

    pub(crate) fn print_section(self, title: &str) {
        if let Some(line) = render_section_header(self.style, title) {
            println!("{}", colorize(section_style(), &line));
        }
    }

    /// Lines from the `format_*` helpers, with badges colored on a terminal.
    pub(crate) fn print_lines(self, lines: &[StatusLine]) {
        for line in lines {
            let rendered = match self.style {
                OutputStyle::Plain => line.render(OutputStyle::Plain),
                OutputStyle::Rich => render_colored_status_line(line.status, &line.message),
            };
            println!("{rendered}");
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct StatusLine {
    pub(crate) status: &'static str,
    pub(crate) message: String,
}

impl StatusLine {
    fn new(status: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn render(&self, style: OutputStyle) -> String {
        render_status_line(style, self.status, &self.message)
    }
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn render_colored_status_line(status: &str, message: &str) -> String {
    format!(
        "{} {message}",
        colorize(badge_style(status), status_badge(status))
    )
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

fn badge_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "err" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightCyan,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(format!("== {title} ==")),
    }
}

fn planned_command_lines(planned_commands: &[String]) -> Vec<StatusLine> {
    planned_commands
        .iter()
        .map(|command| StatusLine::new("step", format!("would run: {command}")))
        .collect()
}

pub(crate) fn format_locate_lines(report: &LocateReport) -> Vec<StatusLine> {
    let mut lines = report
        .skipped
        .iter()
        .map(|skipped| {
            StatusLine::new(
                "warn",
                format!("skipped {}: {}", skipped.path.display(), skipped.reason),
            )
        })
        .collect::<Vec<_>>();
    lines.push(StatusLine::new(
        "ok",
        format!(
            "selected {} version={} (scanned={} skipped={})",
            report.selected.path.display(),
            report.selected.version,
            report.scanned,
            report.skipped.len()
        ),
    ));
    lines
}

pub(crate) fn format_minidriver_lines(outcome: &MinidriverUpdateOutcome) -> Vec<StatusLine> {
    let available = outcome.report.selected.version;
    let mut lines = vec![StatusLine::new(
        "step",
        format!(
            "newest installer: {} version={available}",
            outcome.report.selected.path.display()
        ),
    )];
    let decision = match &outcome.decision {
        UpdateDecision::Install => format!("not installed; installing {available}"),
        UpdateDecision::Upgrade { from } => {
            let installed = from
                .iter()
                .map(|product| product.version.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("upgrading {installed} -> {available}")
        }
        UpdateDecision::UpToDate { installed } => {
            format!("installed version {installed} is up to date")
        }
    };
    lines.push(StatusLine::new("step", decision));

    if !outcome.applied {
        lines.extend(planned_command_lines(&outcome.planned_commands));
        if matches!(outcome.decision, UpdateDecision::UpToDate { .. }) {
            lines.push(StatusLine::new("ok", "minidriver update: nothing to do"));
        }
        return lines;
    }
    lines.push(StatusLine::new(
        "ok",
        format!("minidriver {available} installed"),
    ));
    if outcome.reboot_required {
        lines.push(StatusLine::new(
            "warn",
            "a reboot is required to finish the installation",
        ));
    }
    lines
}

pub(crate) fn format_gmsa_lines(outcome: &GmsaOutcome, dry_run: bool) -> Vec<StatusLine> {
    let mut lines = vec![match outcome.status {
        GmsaStatus::Created => StatusLine::new(
            "ok",
            format!(
                "created gMSA {} (dns={})",
                outcome.account, outcome.dns_host_name
            ),
        ),
        GmsaStatus::AlreadyExists => StatusLine::new(
            "warn",
            format!("gMSA {} already exists; not recreated", outcome.account),
        ),
        GmsaStatus::Planned => StatusLine::new(
            "step",
            format!(
                "gMSA {} does not exist yet (dns={})",
                outcome.account, outcome.dns_host_name
            ),
        ),
    }];
    if dry_run {
        lines.extend(planned_command_lines(&outcome.planned_commands));
    }
    if outcome.installed_locally {
        lines.push(StatusLine::new(
            "ok",
            format!("gMSA {} installed and verified on this host", outcome.account),
        ));
    }
    lines
}

pub(crate) fn format_sql_lines(outcome: &SqlInstallOutcome) -> Vec<StatusLine> {
    if !outcome.applied {
        return vec![
            StatusLine::new(
                "step",
                format!(
                    "instance {} would run as {}",
                    outcome.instance_name, outcome.service_account
                ),
            ),
            StatusLine::new("step", format!("would run: {}", outcome.command_line)),
        ];
    }
    let mut lines = vec![StatusLine::new(
        "ok",
        format!(
            "SQL Server instance {} installed (service account {})",
            outcome.instance_name, outcome.service_account
        ),
    )];
    if outcome.reboot_required {
        lines.push(StatusLine::new(
            "warn",
            "a reboot is required to finish the installation",
        ));
    }
    lines
}

pub(crate) fn format_cert_lines(outcome: &CertificateOutcome) -> Vec<StatusLine> {
    let mut lines = vec![StatusLine::new(
        "step",
        format!("subject alternative names: {}", outcome.subject_alt_names.join(", ")),
    )];
    if !outcome.applied {
        lines.extend(planned_command_lines(&outcome.planned_commands));
        return lines;
    }
    lines.push(StatusLine::new(
        "ok",
        format!(
            "certificate written to {}",
            outcome.artifacts.certificate.display()
        ),
    ));
    lines.push(StatusLine::new(
        "ok",
        format!("private key written to {}", outcome.artifacts.key.display()),
    ));
    if let Some(pfx) = &outcome.artifacts.pfx {
        lines.push(StatusLine::new(
            "ok",
            format!("PFX bundle written to {}", pfx.display()),
        ));
    }
    lines
}
