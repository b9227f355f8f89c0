use std::process::Command;

pub(crate) const POWERSHELL_PROGRAM: &str = "powershell.exe";

pub fn build_powershell_command(script: &str) -> Command {
    let mut command = Command::new(POWERSHELL_PROGRAM);
    command
        .arg("-NoProfile")
        .arg("-NonInteractive")
        .arg("-ExecutionPolicy")
        .arg("Bypass")
        .arg("-Command")
        .arg(script);
    command
}

/// Single-quoted PowerShell literal; embedded quotes are doubled.
pub fn quote_ps_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn quote_ps_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| quote_ps_literal(value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Reads the trimmed, non-empty lines a script wrote to stdout.
pub(crate) fn output_lines(stdout: &str) -> impl Iterator<Item = &str> {
    stdout.lines().map(str::trim).filter(|line| !line.is_empty())
}
