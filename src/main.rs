use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use clap::Parser;

use deskwave::{
    actions::DesktopActions,
    app::{App, Console, TerminalConsole},
    camera::{self, CameraFeed, CaptureBackend},
    config::Settings,
    detect,
    dispatch::Dispatcher,
    events::{self, CameraRequest},
    motion::GestureDebounce,
    voice::{self, CommandSink, SpeechSink},
};

#[derive(Debug, Parser)]
#[command(name = "deskwave", about = "Voice, motion and camera control for the desktop")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "DESKWAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Capture device index, overriding the config.
    #[arg(long)]
    camera_index: Option<u32>,

    /// Start with the camera already active.
    #[arg(long)]
    start_camera: bool,

    /// Disable the voice listening loop.
    #[arg(long)]
    no_voice: bool,

    /// Disable gesture recognition.
    #[arg(long)]
    no_motion: bool,

    /// List capture devices and exit.
    #[arg(long)]
    list_cameras: bool,
}

fn capture_backend() -> Box<dyn CaptureBackend> {
    #[cfg(feature = "camera-nokhwa")]
    {
        Box::new(camera::NokhwaBackend)
    }
    #[cfg(not(feature = "camera-nokhwa"))]
    {
        log::warn!("built without a camera backend; using the synthetic test pattern");
        Box::new(camera::SyntheticBackend::default())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_cameras {
        return list_cameras();
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(index) = cli.camera_index {
        settings.camera_index = index;
    }

    let (producer, drain) = events::channel();
    producer.status("Ready");

    // Capabilities are resolved once, here; every dependent component sees
    // a flag, not an error type.
    let detector = detect::resolve_detector(&settings.detector_backend)?;
    let speech = voice::resolve_speech_source(settings.stt_program.as_deref());

    let voice_loop = match (cli.no_voice, speech) {
        (true, _) => {
            producer.log("Voice control disabled by flag");
            None
        }
        (false, None) => {
            producer.log("No recognizer configured; voice control disabled");
            None
        }
        (false, Some(source)) => {
            let sink: Option<Box<dyn SpeechSink>> = settings
                .speak_back
                .then(|| Box::new(CommandSink::new(settings.tts_program.clone())) as _);
            let dispatcher = Dispatcher::new(
                settings.app_table(),
                Box::new(DesktopActions::new(producer.clone())),
            );
            Some(voice::start_voice_loop(
                source,
                sink,
                dispatcher,
                producer.clone(),
                settings.listen_timeout,
            ))
        }
    };

    let camera = CameraFeed::new(settings.camera_index, capture_backend());
    if cli.start_camera {
        producer.camera(CameraRequest::Start);
    }

    let dispatcher = Dispatcher::new(
        settings.app_table(),
        Box::new(DesktopActions::new(producer.clone())),
    );
    let console: Box<dyn Console> = Box::new(TerminalConsole);
    let mut app = App::new(
        camera,
        detector,
        GestureDebounce::new(settings.gesture_cooldown_ticks),
        dispatcher,
        producer,
        drain,
        console,
        !cli.no_motion,
        std::env::current_dir()?,
        settings.tick_interval,
    );

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    })?;

    app.run(stop);

    // Cooperative shutdown; an in-flight listen may hold this up for one
    // timeout. The voice thread queues its exit lines on the way out, so
    // drain once more after the join to get them onto the console.
    if let Some(voice_loop) = voice_loop {
        voice_loop.stop();
        app.tick();
    }

    Ok(())
}

#[cfg(feature = "camera-nokhwa")]
fn list_cameras() -> Result<()> {
    for device in camera::available_cameras()? {
        println!("{}: {}", device.index, device.label);
    }
    Ok(())
}

#[cfg(not(feature = "camera-nokhwa"))]
fn list_cameras() -> Result<()> {
    println!("built without a camera backend");
    Ok(())
}
