//! certstamp command-line front end

mod cli;

use certstamp::{CertError, CertificateEngine, CertificateRequest};
use clap::Parser;
use cli::{BatchArgs, Cli, Commands, IssueArgs};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CertError> {
    let engine = build_engine(&cli)?;
    match cli.command {
        Commands::Issue(args) => issue(&engine, &args),
        Commands::Batch(args) => batch(&engine, &args),
        Commands::Assets => {
            print_manifest(&engine);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_engine(cli: &Cli) -> Result<CertificateEngine, CertError> {
    let mut builder = CertificateEngine::builder();
    if let Some(root) = &cli.assets {
        builder = builder.assets_root(root);
    }
    if let Some(template) = &cli.template {
        builder = builder.template_file(template);
    }
    for (role, file) in &cli.fonts {
        builder = builder.font_file(*role, file);
    }
    builder.build()
}

fn issue(engine: &CertificateEngine, args: &IssueArgs) -> Result<ExitCode, CertError> {
    let request = CertificateRequest::new(&args.name, &args.level, &args.date)?;
    let pdf = engine.issue(&request)?;
    write_pdf(&args.out, &pdf)?;
    println!("{}", args.out.display());
    Ok(ExitCode::SUCCESS)
}

fn batch(engine: &CertificateEngine, args: &BatchArgs) -> Result<ExitCode, CertError> {
    let raw = fs::read_to_string(&args.input)?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(|err| {
        CertError::InvalidInput(format!("{}: {err}", args.input.display()))
    })?;

    // Entries that fail validation are reported and skipped; the rest still run.
    let mut failures = 0usize;
    let mut accepted = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<CertificateRequest>(entry) {
            Ok(request) => accepted.push((index, request)),
            Err(err) => {
                failures += 1;
                log::error!("entry {}: {err}", index + 1);
            }
        }
    }

    let requests: Vec<CertificateRequest> =
        accepted.iter().map(|(_, request)| request.clone()).collect();
    let results = engine.issue_batch(&requests);

    fs::create_dir_all(&args.out_dir)?;
    for ((index, request), result) in accepted.iter().zip(results) {
        let written = result.and_then(|pdf| {
            let path = args
                .out_dir
                .join(format!("{:03}-{}.pdf", index + 1, slug(request.student_name())));
            write_pdf(&path, &pdf)?;
            Ok(path)
        });
        match written {
            Ok(path) => println!("{}", path.display()),
            Err(err) => {
                failures += 1;
                log::error!("entry {}: {err}", index + 1);
            }
        }
    }

    if failures > 0 {
        log::warn!("{failures} certificate(s) failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_manifest(engine: &CertificateEngine) {
    println!("root {}", engine.assets().root().display());
    for record in engine.assets().manifest() {
        match &record.sha256 {
            Some(digest) => println!(
                "{:<16} {:>9} {} {}",
                record.kind.label(),
                record.bytes_len,
                digest,
                record.path.display()
            ),
            None => println!(
                "{:<16} {:>9} {:<64} {}",
                record.kind.label(),
                "-",
                "missing",
                record.path.display()
            ),
        }
    }
}

fn write_pdf(path: &Path, pdf: &[u8]) -> Result<(), CertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, pdf)?;
    log::debug!("wrote {} ({} bytes)", path.display(), pdf.len());
    Ok(())
}

/// Lowercase ASCII file stem for a student name.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(&word.to_ascii_lowercase());
    }
    if out.is_empty() {
        out.push_str("certificate");
    }
    out
}
