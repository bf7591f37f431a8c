//! Line-oriented engine host
//!
//! Reads one JSON request envelope per line on stdin and writes one JSON
//! response per line on stdout. Requests are handled by a worker thread; a
//! request that outlives the configured timeout is answered with a failure.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use curve_engine::engine::encode_response;
use curve_engine::protocol::{decode_request, recover_ids};
use curve_engine::{Engine, EngineConfig, EngineError, EngineWorker, Response};

#[derive(Parser, Debug)]
#[command(name = "curve-engine", version, about = "Curve downsampling and aggregation engine")]
struct Cli {
    /// TOML config file (defaults to ./curve-engine.toml when present)
    #[arg(short, long, env = "CURVE_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the default downsample target
    #[arg(long)]
    target_points: Option<usize>,

    /// Override the result cache bound
    #[arg(long)]
    cache_size: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = {
        puffin::set_scopes_on(true);
        match puffin_http::Server::new(&format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT)) {
            Ok(server) => Some(server),
            Err(e) => {
                log::warn!("puffin server unavailable: {}", e);
                None
            }
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(2);
        }
    };
    log::info!(
        "cache max_entries={}, default target_points={}, timeout={:?}",
        config.cache.max_entries,
        config.downsample.default_target_points,
        config.worker.request_timeout()
    );

    match serve(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig, EngineError> {
    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(target) = cli.target_points {
        config.downsample.default_target_points = target;
    }
    if let Some(size) = cli.cache_size {
        config.cache.max_entries = size;
    }
    config.validate()?;
    Ok(config)
}

fn serve(config: &EngineConfig) -> Result<(), EngineError> {
    let mut worker = EngineWorker::spawn(Engine::new(config))?;
    let timeout = config.worker.request_timeout();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match decode_request(&line) {
            Ok(request) => {
                let (id, kind) = (request.id.clone(), request.kind.clone());
                match worker.call(request, timeout) {
                    Ok(response) => response,
                    Err(err @ EngineError::Timeout { .. }) => {
                        log::warn!("{}", err);
                        Response::failure(id, kind, &err)
                    }
                    Err(err) => return Err(err),
                }
            }
            Err(err) => {
                let (id, kind) = recover_ids(&line);
                log::warn!("{}: {}", err.title(), err);
                Response::failure(id, kind, &err)
            }
        };

        if writeln!(out, "{}", encode_response(&response))
            .and_then(|_| out.flush())
            .is_err()
        {
            // Reader went away
            break;
        }
    }

    Ok(())
}
