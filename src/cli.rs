//! Command-line argument definitions

use certstamp::{ASSETS_ENV_VAR, FontRole};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// certstamp - stamp names, levels and dates onto certificate templates
#[derive(Parser, Debug)]
#[command(name = "certstamp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Assets directory holding templates/ and fonts/
    #[arg(long, global = true, env = ASSETS_ENV_VAR)]
    pub assets: Option<PathBuf>,

    /// Template PDF, relative to the assets directory
    #[arg(long, global = true)]
    pub template: Option<PathBuf>,

    /// Font override as ROLE=FILE (roles: bold, regular, italic, display)
    #[arg(long = "font", global = true, value_parser = parse_font_override)]
    pub fonts: Vec<(FontRole, PathBuf)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue a single certificate
    #[command(alias = "i")]
    Issue(IssueArgs),

    /// Issue every certificate listed in a JSON array of requests
    Batch(BatchArgs),

    /// List asset paths with their size and SHA-256
    Assets,
}

#[derive(Parser, Debug)]
pub struct IssueArgs {
    /// Student name as it should appear on the certificate
    #[arg(short = 'n', long = "name")]
    pub name: String,

    /// CEFR level: A1, A2, B1, B2 or C1
    #[arg(short = 'l', long = "level")]
    pub level: String,

    /// Issue date as YYYY-MM-DD
    #[arg(short = 'd', long = "date")]
    pub date: String,

    /// Output PDF path
    #[arg(short = 'o', long = "out", default_value = "certificate.pdf")]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// JSON file with an array of {studentName, level, date} objects
    pub input: PathBuf,

    /// Directory the PDFs are written to
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,
}

fn parse_font_override(raw: &str) -> Result<(FontRole, PathBuf), String> {
    let (role, file) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROLE=FILE, got `{raw}`"))?;
    let role = FontRole::ALL
        .into_iter()
        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(role.trim()))
        .ok_or_else(|| format!("unknown font role `{role}`"))?;
    if file.is_empty() {
        return Err(format!("missing file for font role `{role}`"));
    }
    Ok((role, PathBuf::from(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn font_overrides_parse_role_and_file() {
        assert_eq!(
            parse_font_override("display=Anton.ttf"),
            Ok((FontRole::Display, PathBuf::from("Anton.ttf")))
        );
        assert_eq!(
            parse_font_override("Italic=x.otf"),
            Ok((FontRole::Italic, PathBuf::from("x.otf")))
        );
        assert!(parse_font_override("serif=x.ttf").is_err());
        assert!(parse_font_override("display").is_err());
        assert!(parse_font_override("bold=").is_err());
    }

    #[test]
    fn issue_arguments_parse() {
        let cli = Cli::try_parse_from([
            "certstamp",
            "--font",
            "display=Anton.ttf",
            "issue",
            "--name",
            "Juan Pablo",
            "--level",
            "A1",
            "--date",
            "2026-02-16",
        ])
        .expect("parse");
        assert_eq!(cli.fonts.len(), 1);
        match cli.command {
            Commands::Issue(args) => {
                assert_eq!(args.name, "Juan Pablo");
                assert_eq!(args.out, PathBuf::from("certificate.pdf"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
