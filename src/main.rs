use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stembot_audio::Notifier;
use stembot_motion::MotionBackend;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stembot", about = "Voice-controlled command dispatcher for a bipedal robot")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = stembot_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("stembot starting");

    // Motion backend
    let backend_registry = stembot_motion::BackendRegistry::new();
    let mut backend = backend_registry
        .create(&config.robot.backend)
        .with_context(|| format!("unknown robot backend '{}'", config.robot.backend))?;

    let backend_config = match config.robot.board {
        Some(ref board_cfg) if config.robot.backend == "board" => {
            toml::Value::try_from(board_cfg).context("failed to serialize board config")?
        }
        _ => toml::Value::Table(Default::default()),
    };
    backend
        .initialize(backend_config)
        .await
        .with_context(|| format!("failed to initialize robot backend '{}'", config.robot.backend))?;
    let backend: Arc<dyn MotionBackend> = Arc::from(backend);

    // Startup posture: apply the persisted trim, then stand up
    if let Some(ref path) = config.robot.servo_file {
        let trim = stembot_motion::ServoTrim::load_from_file(path)
            .with_context(|| format!("failed to load servo trim from {:?}", path))?;
        backend
            .set_servo_pulse(1, 1500, 500)
            .await
            .context("failed to set servo 1")?;
        backend
            .set_servo_pulse(2, trim.servo2, 500)
            .await
            .context("failed to set servo 2")?;
    }
    backend
        .run_action("stand", 1, true)
        .await
        .context("failed to run stand action")?;
    tracing::info!("robot standing, posture applied");

    // Speech engine
    let engine_registry = stembot_asr::EngineRegistry::new();
    let mut engine = engine_registry.create(&config.asr.engine).with_context(|| {
        format!(
            "unknown ASR engine '{}' (available: {}); the whisper engine needs a build with the 'whisper' cargo feature",
            config.asr.engine,
            engine_registry.list_engines().join(", "),
        )
    })?;

    let engine_config = match config.asr.whisper {
        Some(ref whisper_cfg) if config.asr.engine == "whisper" => {
            toml::Value::try_from(whisper_cfg).context("failed to serialize whisper config")?
        }
        _ => toml::Value::Table(Default::default()),
    };
    engine
        .initialize(engine_config)
        .await
        .with_context(|| format!("failed to initialize ASR engine '{}'", config.asr.engine))?;
    tracing::info!("ASR engine '{}' ready", config.asr.engine);

    // Transcription worker
    let sample_rate = config.general.sample_rate;
    let window_samples = config.dispatch.window_samples(sample_rate);
    let mut worker = stembot_asr::TranscriptionWorker::new(engine, window_samples);
    let mut transcript_rx = worker
        .take_transcript_receiver()
        .context("transcript receiver already taken")?;

    let (frame_tx, frame_rx) = tokio::sync::mpsc::unbounded_channel();
    let worker_handle = worker.start(frame_rx);

    // Microphone capture
    let device_manager = stembot_audio::DeviceManager::new();
    let input_device = device_manager
        .get_input_device(&config.audio.device_name)
        .with_context(|| format!("failed to get input device '{}'", config.audio.device_name))?;

    let _capture = stembot_audio::CaptureNode::new(
        &input_device,
        frame_tx,
        sample_rate,
        1,
        config.general.buffer_size,
    )
    .context("failed to create capture node")?;
    tracing::info!(
        "listening on '{}' at {}Hz, {}-sample windows",
        config.audio.device_name,
        sample_rate,
        window_samples,
    );

    // Audible ready signal
    if let Some(ref sound_path) = config.audio.ready_sound {
        let notifier = stembot_audio::PlaybackNotifier::new(&config.audio.player, sound_path.clone());
        notifier.ready();
    }

    // Dispatch loop
    let dispatcher = Arc::new(stembot_dispatch::CommandDispatcher::new(
        Arc::clone(&backend),
        config.dispatch.cooldown(),
        config.dispatch.dance_interval(),
    ));

    let dispatch_handle = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            while let Some(transcript) = transcript_rx.recv().await {
                tracing::info!("CMD: {}", transcript.text);
                let outcome = dispatcher.dispatch(&transcript.text).await;
                tracing::debug!(?outcome, "dispatched");
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");

    dispatcher.dance_controller().stop();
    if let Err(e) = backend.stop_all().await {
        tracing::warn!("stop_all during shutdown failed: {}", e);
    }

    // Dropping capture closes the frame channel; the worker drains and
    // shuts its engine down, which in turn ends the dispatch loop.
    drop(_capture);
    worker_handle.await.context("transcription worker panicked")?;
    dispatch_handle.await.context("dispatch loop panicked")?;

    if let Err(e) = backend.shutdown().await {
        tracing::warn!("backend shutdown failed: {}", e);
    }

    Ok(())
}
