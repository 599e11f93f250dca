use anyhow::{Context, Result};
use clap::Parser;
use speechmetry_engine::Transcriber as _;
use speechmetry_submit::SubmissionSink as _;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "speechmetry", about = "Read-aloud speech analysis session runner")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// How long to record before stopping, in seconds
    #[arg(short, long, default_value_t = 35)]
    duration: u64,

    /// List available input devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = speechmetry_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("speechmetry starting");

    if cli.list_devices {
        let manager = speechmetry_audio::DeviceManager::new();
        let devices = manager
            .list_input_devices()
            .context("failed to enumerate input devices")?;
        for (name, _) in devices {
            println!("{name}");
        }
        return Ok(());
    }

    let pool = config.passage_pool().context("no passages available")?;
    let pick = (uuid::Uuid::new_v4().as_u128() % pool.len() as u128) as usize;
    let passage = speechmetry_core::Passage::new(pool[pick].clone());
    tracing::info!(passage_index = pick, "passage selected");
    println!("Read this passage aloud:\n\n{}\n", passage.text());

    // Transcription capability is decided once, before the session starts.
    let mode = match config.transcription {
        Some(ref transcription) => {
            let registry = speechmetry_engine::TranscriberRegistry::new();
            let mut engine = registry
                .create(&transcription.engine)
                .with_context(|| format!("unknown engine '{}'", transcription.engine))?;
            engine
                .initialize(transcription.engine_config())
                .await
                .with_context(|| {
                    format!("failed to initialize engine '{}'", transcription.engine)
                })?;
            tracing::info!(engine = %transcription.engine, "transcription engine active");
            speechmetry_session::Mode::Full(engine)
        }
        None => {
            tracing::info!("no transcription engine configured, running in fallback mode");
            speechmetry_session::Mode::Fallback
        }
    };

    let microphone = speechmetry_audio::Microphone::new(
        &config.capture.device_name,
        config.general.sample_rate,
        1,
        config.general.buffer_size,
    );

    let mut session = speechmetry_session::RecordingSession::new(
        passage,
        config.analysis.clone(),
        config.general.sample_rate,
    );
    session
        .start(&microphone, mode)
        .context("failed to start recording session")?;
    tracing::info!(duration_secs = cli.duration, "recording, press Ctrl-C to stop early");

    let deadline = tokio::time::sleep(Duration::from_secs(cli.duration));
    tokio::pin!(deadline);
    let mut fault_poll = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = &mut deadline => {
                tracing::info!("duration reached");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            _ = fault_poll.tick() => {
                if let Some(reason) = session.check_fault() {
                    tracing::error!("transcription unavailable ({reason}), restarting without it");
                    session
                        .start(&microphone, speechmetry_session::Mode::Fallback)
                        .context("failed to fall back to acoustic-only capture")?;
                }
            }
        }
    }

    let outcome = session.stop().await.context("failed to stop session")?;

    let payload = speechmetry_submit::SubmissionPayload::from_features(
        &outcome.features,
        session.mode(),
        outcome.audio.as_ref(),
    )
    .context("failed to build submission payload")?;

    let registry = speechmetry_submit::SinkRegistry::new();
    let sink = match config.submission {
        Some(ref submission) => {
            let mut sink = registry
                .create(&submission.sink)
                .with_context(|| format!("unknown sink '{}'", submission.sink))?;
            sink.initialize(submission.extra.clone())
                .await
                .with_context(|| format!("failed to initialize sink '{}'", submission.sink))?;
            sink
        }
        None => registry.create("log").context("log sink missing")?,
    };

    sink.submit(&payload).await.context("failed to submit features")?;
    sink.shutdown().await.context("sink shutdown failed")?;

    tracing::info!("done");
    Ok(())
}
