use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap_complete::{generate, Shell};

use crate::app::AppError;

const BIN_NAME: &str = "studylog";

pub fn generate_completions(shell: Shell, buf: &mut dyn Write) {
    let mut cmd = crate::cli::styled_command();
    generate(shell, &mut cmd, BIN_NAME, buf);
}

fn parse_shell(raw: &str) -> Option<Shell> {
    let name = raw.rsplit('/').next()?;
    match name.trim().to_ascii_lowercase().as_str() {
        "bash" => Some(Shell::Bash),
        "zsh" => Some(Shell::Zsh),
        "fish" => Some(Shell::Fish),
        _ => None,
    }
}

/// Where each supported shell picks completion files up without any rc edits,
/// except zsh, which needs the directory on `fpath`.
fn install_path(shell: Shell, home: &Path) -> PathBuf {
    match shell {
        Shell::Zsh => home.join(".zfunc/_studylog"),
        Shell::Fish => home.join(".config/fish/completions/studylog.fish"),
        _ => home.join(".local/share/bash-completion/completions/studylog"),
    }
}

fn install_completions_into(shell: Shell, home: &Path) -> io::Result<PathBuf> {
    let path = install_path(shell, home);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut buf = Vec::new();
    generate_completions(shell, &mut buf);
    std::fs::write(&path, buf)?;
    Ok(path)
}

pub fn run_completions_command(shell_arg: Option<&str>, install: bool) -> Result<(), AppError> {
    let shell = match shell_arg {
        Some(name) => parse_shell(name)
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown shell '{name}'")))?,
        None => std::env::var("SHELL")
            .ok()
            .and_then(|path| parse_shell(&path))
            .ok_or_else(|| {
                AppError::InvalidArgument(
                    "unable to detect shell from $SHELL; pass bash, zsh or fish".to_string(),
                )
            })?,
    };

    if !install {
        generate_completions(shell, &mut io::stdout().lock());
        return Ok(());
    }

    let home = std::env::var_os("HOME")
        .ok_or_else(|| AppError::InvalidArgument("HOME is not set".to_string()))?;
    let path = install_completions_into(shell, Path::new(&home))?;
    println!("completions installed to {}", path.display());
    if shell == Shell::Zsh {
        println!("add `fpath=(~/.zfunc $fpath)` before compinit in ~/.zshrc");
    }
    Ok(())
}
