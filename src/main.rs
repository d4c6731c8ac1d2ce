mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::time::Duration;

use loopcast::{config, pregen, server};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "loopcast=trace,loopcast_av=trace,loopcast_spec=debug,tower_http=debug".to_string()
        } else {
            "loopcast=debug,loopcast_av=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Pregen => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_pregen(cli.config.as_deref()))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, json))
        }
        Commands::CheckTools => check_tools(),
        Commands::Version => {
            println!("loopcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start_server(host: String, port: u16, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI overrides.
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting loopcast");
    config.paths.ensure_layout()?;

    let pregen_timeout = Duration::from_secs(config.transcode.pregen_timeout_secs);
    let ctx = server::AppContext::new(config);

    // Startup pregeneration runs in the background with its own timeout,
    // deliberately decoupled from any request lifetime.
    let pregenerator = pregen::Pregenerator::new(
        &ctx.config,
        ctx.library.clone(),
        ctx.transcoder.clone(),
    );
    let _pregen_task = pregenerator.spawn_startup(pregen_timeout);

    server::start_server(ctx).await
}

async fn run_pregen(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    config.paths.ensure_layout()?;

    let ctx = server::AppContext::new(config);
    let pregenerator = pregen::Pregenerator::new(
        &ctx.config,
        ctx.library.clone(),
        ctx.transcoder.clone(),
    );
    pregenerator.run().await
}

async fn probe_file(file: &Path, json: bool) -> Result<()> {
    let info = loopcast_av::probe(file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Container: {}", info.format.format_name);
    if let Some(duration) = info.duration_secs() {
        println!("Duration:  {:.2}s", duration);
    }
    for stream in &info.streams {
        match stream.codec_type.as_str() {
            "video" => println!(
                "Video:     {} {}x{}{}",
                stream.codec_name.as_deref().unwrap_or("?"),
                stream.width.unwrap_or(0),
                stream.height.unwrap_or(0),
                if info.is_portrait() { " (portrait)" } else { "" }
            ),
            "audio" => println!(
                "Audio:     {} {} ch",
                stream.codec_name.as_deref().unwrap_or("?"),
                stream.channels.unwrap_or(0)
            ),
            other => println!("Stream:    {}", other),
        }
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    let mut all_ok = true;

    for tool in loopcast_av::check_tools() {
        if tool.available {
            println!(
                "ok      {} ({})",
                tool.name,
                tool.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            println!("missing {}", tool.name);
            all_ok = false;
        }
    }

    if !all_ok {
        anyhow::bail!("Missing required tools");
    }
    Ok(())
}
