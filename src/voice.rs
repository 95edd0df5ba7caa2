use std::{
    process::Command,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use thiserror::Error;

use crate::{
    dispatch::Dispatcher,
    events::EventProducer,
    types::CommandEvent,
};

/// One listen attempt's failure modes. Everything except
/// `DeviceUnavailable` is transient: the loop logs and continues.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("no speech detected")]
    Timeout,
    #[error("could not understand the audio")]
    Unintelligible,
    #[error("transcription request failed: {0}")]
    Service(String),
    #[error("microphone unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Microphone + speech-to-text collaborator. Implementations acquire the
/// microphone for the duration of one `listen` call and release it before
/// returning, whatever the outcome.
pub trait SpeechSource: Send {
    /// One-shot ambient noise calibration at startup.
    fn calibrate(&mut self) -> Result<(), ListenError> {
        Ok(())
    }

    /// Block for up to `timeout` waiting for speech, then transcribe it.
    fn listen(&mut self, timeout: Duration) -> Result<String, ListenError>;
}

/// Text-to-speech collaborator for speaking dispatch results back.
pub trait SpeechSink: Send {
    fn speak(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Speaks by launching an external synthesizer command (e.g. `espeak`,
/// `say`) with the text as its argument.
pub struct CommandSink {
    program: String,
}

impl CommandSink {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SpeechSink for CommandSink {
    fn speak(&mut self, text: &str) -> anyhow::Result<()> {
        let status = Command::new(&self.program).arg(text).status()?;
        anyhow::ensure!(status.success(), "{} exited with {status}", self.program);
        Ok(())
    }
}

/// Listens by running an external recognizer command. The program receives
/// the listen timeout in whole seconds as its only argument and prints the
/// transcript on stdout; empty output means nothing was heard.
pub struct CommandSource {
    program: String,
}

impl CommandSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SpeechSource for CommandSource {
    fn listen(&mut self, timeout: Duration) -> Result<String, ListenError> {
        let output = Command::new(&self.program)
            .arg(timeout.as_secs().to_string())
            .output()
            .map_err(|err| ListenError::DeviceUnavailable(err.to_string()))?;
        if !output.status.success() {
            return Err(ListenError::Service(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if transcript.is_empty() {
            return Err(ListenError::Timeout);
        }
        Ok(transcript)
    }
}

/// Resolve the microphone capability once at startup. Voice mode needs a
/// configured recognizer command; without one it stays in its documented
/// disabled state without touching the other modes.
pub fn resolve_speech_source(recognizer: Option<&str>) -> Option<Box<dyn SpeechSource>> {
    recognizer.map(|program| Box::new(CommandSource::new(program)) as Box<dyn SpeechSource>)
}

/// Handle to the background voice loop. Dropping it requests a cooperative
/// stop and joins; an in-flight listen is not interrupted, so shutdown can
/// lag by up to one listen timeout.
pub struct VoiceLoop {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl VoiceLoop {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for VoiceLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn start_voice_loop(
    mut source: Box<dyn SpeechSource>,
    mut sink: Option<Box<dyn SpeechSink>>,
    mut dispatcher: Dispatcher,
    events: EventProducer,
    listen_timeout: Duration,
) -> VoiceLoop {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        match source.calibrate() {
            Ok(()) => events.log("Microphone calibrated successfully"),
            Err(err) => events.log(format!("Microphone calibration: {err}")),
        }
        events.status("Listening");

        while !stop_flag.load(Ordering::Relaxed) {
            let transcript = match source.listen(listen_timeout) {
                Ok(text) => text.to_lowercase(),
                Err(ListenError::Timeout) => continue,
                Err(err @ ListenError::DeviceUnavailable(_)) => {
                    // Not transient: disable the mode until the user
                    // re-toggles it, and say so exactly once.
                    log::error!("voice mode disabled: {err}");
                    events.log(format!("Voice control disabled: {err}"));
                    break;
                }
                Err(err) => {
                    log::warn!("listen attempt failed: {err}");
                    events.log(err.to_string());
                    continue;
                }
            };

            events.log(format!("Heard: \"{transcript}\""));
            let result = dispatcher.dispatch(CommandEvent::Voice(transcript));
            events.log(result.message.clone());

            if let Some(sink) = sink.as_mut() {
                // A broken synthesizer must never take the loop down.
                if let Err(err) = sink.speak(&result.message) {
                    log::warn!("text-to-speech failed: {err:?}");
                }
            }
        }

        events.status("Voice control stopped");
    });

    VoiceLoop {
        stop,
        handle: Some(handle),
    }
}
