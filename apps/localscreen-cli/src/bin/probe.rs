use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use serde_json::{json, Value};

use localscreen_core::config::DEFAULT_MAX_FRAME_BYTES;
use localscreen_host::{read_frame, write_frame};

/// Send one request to a host process and print its reply.
#[derive(Parser, Debug)]
#[command(name = "localscreen-probe", version)]
struct Cli {
    /// Host executable (defaults to localscreen-host next to this binary).
    #[arg(long)]
    host: Option<PathBuf>,
    /// Config file passed through to the host.
    #[arg(long)]
    config: Option<PathBuf>,
    /// classify, batch or scan. Anything else is sent as-is.
    #[arg(long, default_value = "classify")]
    cmd: String,
    /// Input text; repeat for batch.
    #[arg(long = "text")]
    texts: Vec<String>,
}

fn default_host() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("locating probe executable")?;
    let dir = exe.parent().ok_or_else(|| anyhow!("probe executable has no parent directory"))?;
    Ok(dir.join(format!("localscreen-host{}", std::env::consts::EXE_SUFFIX)))
}

fn build_request(cmd: &str, texts: &[String]) -> Value {
    match cmd {
        "batch" => json!({ "cmd": cmd, "texts": texts }),
        _ => json!({ "cmd": cmd, "text": texts.join("\n") }),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let host = match cli.host {
        Some(path) => path,
        None => default_host()?,
    };
    let mut command = Command::new(&host);
    if let Some(config) = &cli.config {
        command.arg("--config").arg(config);
    }
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning {}", host.display()))?;

    let request = build_request(&cli.cmd, &cli.texts);
    {
        let mut stdin = child.stdin.take().ok_or_else(|| anyhow!("host stdin unavailable"))?;
        write_frame(&mut stdin, request.to_string().as_bytes())?;
        // Dropping stdin closes the stream so the host exits after replying.
    }

    let mut stdout = child.stdout.take().ok_or_else(|| anyhow!("host stdout unavailable"))?;
    let reply = read_frame(&mut stdout, DEFAULT_MAX_FRAME_BYTES)?;
    let status = child.wait()?;

    match reply {
        Some(payload) => {
            let value: Value = serde_json::from_slice(&payload).context("host replied with invalid JSON")?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                pipe.read_to_string(&mut stderr)?;
            }
            std::io::stderr().write_all(stderr.as_bytes())?;
            bail!("host exited ({}) without replying", status)
        }
    }
}
