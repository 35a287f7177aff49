//! `playground` command line
//!
//! Runs extraction over a saved transcript and writes what the browser
//! surface would show or download, for the kinds that need no engine.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use playground_artifact::{Artifact, ExportFormat, ExportSource};
use playground_core::{ExportPayload, PlaygroundConfig};
use playground_extract::{extract, StreamingExtractor};
use playground_render::renderers::html::enrich_document;
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command {
    Command::new("playground")
        .version(playground_core::VERSION)
        .about("Detect and export artifacts in model output")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("extract")
                .about("Print the artifact found in a transcript")
                .arg(transcript_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("stream")
                        .long("stream")
                        .value_parser(value_parser!(usize))
                        .help("Replay the transcript in chunks of this many characters"),
                ),
        )
        .subcommand(
            Command::new("sandbox")
                .about("Print the document an HTML artifact runs as")
                .arg(transcript_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Write the artifact's download file")
                .arg(transcript_arg())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory"),
                ),
        )
}

fn transcript_arg() -> Arg {
    Arg::new("transcript")
        .required(true)
        .help("Transcript file, or - for stdin")
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "playground=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_transcript(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read transcript from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read transcript {path}"))
}

fn load_config(args: &ArgMatches) -> Result<PlaygroundConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => PlaygroundConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(PlaygroundConfig::default()),
    }
}

fn require_artifact(transcript: &str) -> Result<Artifact> {
    extract(transcript).context("no renderable artifact in transcript")
}

/// Artifacts seen while replaying `text` in `chunk_len`-character chunks
fn replay(text: &str, chunk_len: usize) -> Vec<Artifact> {
    let chars: Vec<char> = text.chars().collect();
    let mut extractor = StreamingExtractor::new();
    let mut seen: Vec<Artifact> = chars
        .chunks(chunk_len.max(1))
        .filter_map(|chunk| extractor.push(&chunk.iter().collect::<String>()).cloned())
        .collect();
    if let Some(last) = extractor.finish() {
        if seen.last().map_or(true, |prev| prev.differs_from(&last)) {
            seen.push(last);
        }
    }
    seen
}

fn describe(artifact: &Artifact, as_json: bool) -> String {
    if as_json {
        json!({
            "kind": artifact.kind(),
            "hash": artifact.hash().to_hex(),
            "content": artifact.content(),
        })
        .to_string()
    } else {
        format!(
            "{} {}\n{}",
            artifact.kind(),
            artifact.hash().short(),
            artifact.content()
        )
    }
}

fn run_extract(args: &ArgMatches) -> Result<()> {
    let transcript = read_transcript(args.get_one::<String>("transcript").map_or("-", String::as_str))?;
    let as_json = args.get_flag("json");

    match args.get_one::<usize>("stream") {
        Some(&chunk_len) => {
            let seen = replay(&transcript, chunk_len);
            if seen.is_empty() {
                bail!("no renderable artifact in transcript");
            }
            for artifact in &seen {
                println!("{}", describe(artifact, as_json));
            }
        }
        None => println!("{}", describe(&require_artifact(&transcript)?, as_json)),
    }
    Ok(())
}

fn run_sandbox(args: &ArgMatches, config: &PlaygroundConfig) -> Result<()> {
    let transcript = read_transcript(args.get_one::<String>("transcript").map_or("-", String::as_str))?;
    let artifact = require_artifact(&transcript)?;
    if artifact.kind() != playground_artifact::ArtifactKind::Html {
        bail!("{} artifacts do not run in a sandbox", artifact.kind());
    }
    let token = uuid::Uuid::new_v4().simple().to_string();
    println!("{}", enrich_document(artifact.content(), &token, &config.sandbox));
    Ok(())
}

fn export_payload(artifact: &Artifact, stem: &str) -> Result<ExportPayload> {
    let format = ExportFormat::for_kind(artifact.kind());
    if format.source != ExportSource::Source {
        bail!(
            "{} export needs a rendered {}; open it in the preview surface",
            artifact.kind(),
            format.extension
        );
    }
    Ok(ExportPayload::new(
        artifact.kind(),
        stem,
        artifact.content().as_bytes().to_vec(),
    ))
}

fn run_export(args: &ArgMatches, config: &PlaygroundConfig) -> Result<PathBuf> {
    let transcript = read_transcript(args.get_one::<String>("transcript").map_or("-", String::as_str))?;
    let artifact = require_artifact(&transcript)?;
    let payload = export_payload(&artifact, &config.export.file_stem)?;

    let out = args
        .get_one::<PathBuf>("out")
        .map_or_else(|| Path::new(".").to_path_buf(), Clone::clone);
    std::fs::create_dir_all(&out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let path = out.join(&payload.file_name);
    std::fs::write(&path, &payload.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), mime = payload.mime, "artifact exported");
    Ok(path)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("extract", args)) => run_extract(args),
        Some(("sandbox", args)) => run_sandbox(args, &config),
        Some(("export", args)) => {
            let path = run_export(args, &config)?;
            println!("{}", path.display());
            Ok(())
        }
        Some((other, _)) => bail!("unknown command {other}"),
        None => bail!("no command given"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_artifact::ArtifactKind;
    use pretty_assertions::assert_eq;

    const TRANSCRIPT: &str = "Here you go:\n```html\n<h1>Hello</h1>\n```\n";

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn replay_reports_each_change_once() {
        let seen = replay(TRANSCRIPT, 4);
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|a| a.kind() == ArtifactKind::Html));
        assert_eq!(seen.last().unwrap().content(), "<h1>Hello</h1>");
        for pair in seen.windows(2) {
            assert!(pair[0].differs_from(&pair[1]));
        }
    }

    #[test]
    fn json_description() {
        let artifact = require_artifact(TRANSCRIPT).unwrap();
        let value: serde_json::Value = serde_json::from_str(&describe(&artifact, true)).unwrap();
        assert_eq!(value["kind"], "html");
        assert_eq!(value["content"], "<h1>Hello</h1>");
    }

    #[test]
    fn export_writes_source_kinds_only() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("t.md");
        std::fs::write(&transcript, TRANSCRIPT).unwrap();

        let matches = cli().get_matches_from([
            "playground",
            "export",
            transcript.to_str().unwrap(),
            "--out",
            dir.path().to_str().unwrap(),
        ]);
        let (_, args) = matches.subcommand().unwrap();
        let path = run_export(args, &PlaygroundConfig::default()).unwrap();
        assert_eq!(path.file_name().unwrap(), "artifact.html");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<h1>Hello</h1>");

        let chart = require_artifact("```echarts\n{\"series\":[]}\n```").unwrap();
        assert!(export_payload(&chart, "artifact").is_err());
    }

    #[test]
    fn missing_artifact_is_an_error() {
        assert!(require_artifact("no blocks here").is_err());
    }
}
