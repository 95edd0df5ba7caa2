use std::collections::HashMap;

use chrono::Local;

use crate::{
    actions::{Actions, VolumeKey},
    events::CameraRequest,
    types::{CommandEvent, CommandResult, Gesture},
};

/// Volume commands press the key this many times, matching the original
/// coarse step size.
const VOLUME_KEY_REPEAT: u32 = 5;
const SCROLL_STEP: i32 = 3;

/// Closed set of voice-triggered actions. `OpenApp` carries no argument here;
/// the app token is extracted from the transcript at dispatch time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceAction {
    StartCamera,
    StopCamera,
    VolumeUp,
    VolumeDown,
    MuteVolume,
    UnmuteVolume,
    Capture,
    ScrollUp,
    ScrollDown,
    TellTime,
    OpenApp,
}

/// Ordered first-substring-match table. The first rule whose phrase occurs
/// in the transcript wins; nothing re-evaluates after a match. The bare
/// "open" rule is last on purpose so that "open camera" hits the camera rule.
const VOICE_RULES: &[(&[&str], VoiceAction)] = &[
    (&["start camera", "open camera"], VoiceAction::StartCamera),
    (&["stop camera"], VoiceAction::StopCamera),
    (&["volume up"], VoiceAction::VolumeUp),
    (&["volume down"], VoiceAction::VolumeDown),
    // "unmute volume" contains "mute volume", so the mute rule also answers
    // unmute requests with the same toggle press. Matches the original rule
    // ordering; the entry below is kept for the table's shape but never
    // reached.
    (&["mute volume"], VoiceAction::MuteVolume),
    (&["unmute volume"], VoiceAction::UnmuteVolume),
    (&["take picture", "take screenshot"], VoiceAction::Capture),
    (&["scroll up"], VoiceAction::ScrollUp),
    (&["scroll down"], VoiceAction::ScrollDown),
    (&["what is the time", "tell time"], VoiceAction::TellTime),
    (&["open"], VoiceAction::OpenApp),
];

pub fn match_transcript(transcript: &str) -> Option<VoiceAction> {
    for (phrases, action) in VOICE_RULES {
        if phrases.iter().any(|phrase| transcript.contains(phrase)) {
            return Some(*action);
        }
    }
    None
}

/// Static application name -> launch path table. Lookups are
/// case-insensitive; keys are stored lowercased.
#[derive(Clone, Debug, Default)]
pub struct AppTable {
    entries: HashMap<String, String>,
}

impl AppTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(name, path)| (name.to_lowercase(), path))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// Maps command events to side effects and structured results. Each thread
/// that dispatches owns its own `Dispatcher`; the shared pieces (the app
/// table) are cheap clones and the side-effect sink is per-instance.
pub struct Dispatcher {
    apps: AppTable,
    actions: Box<dyn Actions>,
}

impl Dispatcher {
    pub fn new(apps: AppTable, actions: Box<dyn Actions>) -> Self {
        Self { apps, actions }
    }

    pub fn dispatch(&mut self, event: CommandEvent) -> CommandResult {
        match event {
            CommandEvent::Voice(transcript) => self.dispatch_voice(&transcript),
            CommandEvent::Gesture(gesture) => self.dispatch_gesture(gesture),
        }
    }

    fn dispatch_voice(&mut self, transcript: &str) -> CommandResult {
        let Some(action) = match_transcript(transcript) else {
            return CommandResult::fail(format!("Unknown command: {transcript}"));
        };

        match action {
            VoiceAction::StartCamera => {
                self.actions.request_camera(CameraRequest::Start);
                CommandResult::ok("Starting camera")
            }
            VoiceAction::StopCamera => {
                self.actions.request_camera(CameraRequest::Stop);
                CommandResult::ok("Stopping camera")
            }
            VoiceAction::VolumeUp => self.press_volume(VolumeKey::Up, "Volume increased"),
            VoiceAction::VolumeDown => self.press_volume(VolumeKey::Down, "Volume decreased"),
            VoiceAction::MuteVolume => self.press_volume(VolumeKey::Mute, "Volume muted"),
            VoiceAction::UnmuteVolume => self.press_volume(VolumeKey::Mute, "Volume unmuted"),
            VoiceAction::Capture => {
                self.actions.request_camera(CameraRequest::Snapshot);
                CommandResult::ok("Capturing picture")
            }
            VoiceAction::ScrollUp => self.scroll(SCROLL_STEP, "Scrolled up"),
            VoiceAction::ScrollDown => self.scroll(-SCROLL_STEP, "Scrolled down"),
            VoiceAction::TellTime => CommandResult::ok(format!(
                "The current time is {}",
                Local::now().format("%I:%M %p")
            )),
            VoiceAction::OpenApp => self.open_app(transcript),
        }
    }

    fn dispatch_gesture(&mut self, gesture: Gesture) -> CommandResult {
        match gesture {
            Gesture::ThumbsDown => self.press_volume(VolumeKey::Down, "Volume decreased"),
            Gesture::OpenPalm => match self.actions.media_play_pause() {
                Ok(()) => CommandResult::ok("Media play/pause toggled"),
                Err(err) => CommandResult::fail(format!("Media key failed: {err}")),
            },
            Gesture::PointingUp => CommandResult::ok("Pointing detected"),
            Gesture::Unknown | Gesture::None => CommandResult::fail(format!(
                "Unknown gesture: {}",
                gesture.display_name()
            )),
        }
    }

    fn press_volume(&mut self, key: VolumeKey, message: &str) -> CommandResult {
        for _ in 0..VOLUME_KEY_REPEAT {
            if let Err(err) = self.actions.press_volume(key) {
                return CommandResult::fail(format!("Volume control failed: {err}"));
            }
        }
        CommandResult::ok(message)
    }

    fn scroll(&mut self, amount: i32, message: &str) -> CommandResult {
        match self.actions.scroll(amount) {
            Ok(()) => CommandResult::ok(message),
            Err(err) => CommandResult::fail(format!("Scroll failed: {err}")),
        }
    }

    /// "open <app>": the token immediately after the word "open" names the
    /// application; a table miss or spawn failure is a structured failure.
    fn open_app(&mut self, transcript: &str) -> CommandResult {
        let mut words = transcript.split_whitespace();
        let app_name = loop {
            match words.next() {
                Some("open") => break words.next(),
                Some(_) => continue,
                None => break None,
            }
        };
        let Some(app_name) = app_name else {
            return CommandResult::fail(format!("Unknown command: {transcript}"));
        };

        let Some(path) = self.apps.lookup(app_name) else {
            return CommandResult::fail(format!(
                "Application not found in database: {app_name}"
            ));
        };

        match self.actions.launch(path) {
            Ok(()) => CommandResult::ok(format!("Opened application: {app_name}")),
            Err(err) => CommandResult::fail(format!(
                "Failed to open application {app_name}: {err}"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::testutil::RecordingActions;

    fn dispatcher() -> (Dispatcher, RecordingActions) {
        let actions = RecordingActions::default();
        let dispatcher =
            Dispatcher::new(Settings::default().app_table(), Box::new(actions.clone()));
        (dispatcher, actions)
    }

    fn voice(text: &str) -> CommandEvent {
        CommandEvent::Voice(text.to_string())
    }

    #[test]
    fn first_matching_rule_wins() {
        // "open camera" must hit the camera rule, not the app launcher.
        assert_eq!(match_transcript("open camera"), Some(VoiceAction::StartCamera));
        assert_eq!(match_transcript("open notepad"), Some(VoiceAction::OpenApp));
        assert_eq!(match_transcript("please tell time now"), Some(VoiceAction::TellTime));
        assert_eq!(match_transcript("good morning"), None);
    }

    #[test]
    fn volume_up_presses_the_key_exactly_five_times() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(voice("volume up"));
        assert!(result.success);
        assert_eq!(result.message, "Volume increased");
        assert_eq!(actions.volume_up_presses(), 5);
    }

    #[test]
    fn unmute_phrase_falls_into_the_mute_rule() {
        // Substring containment makes the mute rule win; both phrases press
        // the same toggle key, so only the reply text differs.
        assert_eq!(
            match_transcript("unmute volume"),
            Some(VoiceAction::MuteVolume)
        );

        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(voice("unmute volume"));
        assert!(result.success);
        assert_eq!(result.message, "Volume muted");
        assert_eq!(actions.mute_presses(), 5);
    }

    #[test]
    fn unknown_command_is_a_failure_with_no_side_effect() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(voice("make me a sandwich"));
        assert!(!result.success);
        assert!(result.message.contains("Unknown command"));
        assert!(actions.is_untouched());
    }

    #[test]
    fn open_known_app_launches_once() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(voice("open notepad"));
        assert!(result.success, "{}", result.message);
        assert_eq!(actions.launches(), vec!["notepad.exe".to_string()]);
    }

    #[test]
    fn open_app_lookup_is_case_insensitive() {
        let (mut dispatcher, _) = dispatcher();
        // The voice loop lowercases transcripts, but the table itself must
        // not depend on that.
        let result = dispatcher.dispatch(voice("open NOTEPAD"));
        assert!(result.success, "{}", result.message);
    }

    #[test]
    fn open_missing_app_never_invokes_the_launcher() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(voice("open zzz"));
        assert!(!result.success);
        assert!(result.message.contains("not found"));
        assert!(actions.launches().is_empty());
    }

    #[test]
    fn launch_failure_surfaces_the_underlying_error() {
        let (mut dispatcher, actions) = dispatcher();
        actions.fail_launches();
        let result = dispatcher.dispatch(voice("open notepad"));
        assert!(!result.success);
        assert!(result.message.contains("Failed to open application notepad"));
    }

    #[test]
    fn tell_time_is_a_pure_query() {
        let (mut dispatcher, actions) = dispatcher();
        let first = dispatcher.dispatch(voice("what is the time"));
        let second = dispatcher.dispatch(voice("tell time"));
        assert!(first.success && second.success);
        assert!(first.message.starts_with("The current time is "));
        assert!(second.message.starts_with("The current time is "));
        assert!(actions.is_untouched());
    }

    #[test]
    fn camera_phrases_route_through_the_event_queue() {
        let (mut dispatcher, actions) = dispatcher();
        dispatcher.dispatch(voice("start camera"));
        dispatcher.dispatch(voice("take picture"));
        dispatcher.dispatch(voice("stop camera"));
        assert_eq!(
            actions.camera_requests(),
            vec![
                CameraRequest::Start,
                CameraRequest::Snapshot,
                CameraRequest::Stop
            ]
        );
    }

    #[test]
    fn thumbs_down_gesture_lowers_volume() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(CommandEvent::Gesture(Gesture::ThumbsDown));
        assert!(result.success);
        assert_eq!(result.message, "Volume decreased");
        assert_eq!(actions.volume_down_presses(), 5);
    }

    #[test]
    fn open_palm_gesture_toggles_media() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(CommandEvent::Gesture(Gesture::OpenPalm));
        assert!(result.success);
        assert_eq!(actions.media_toggles(), 1);
    }

    #[test]
    fn pointing_up_gesture_is_an_informational_no_op() {
        let (mut dispatcher, actions) = dispatcher();
        let result = dispatcher.dispatch(CommandEvent::Gesture(Gesture::PointingUp));
        assert!(result.success);
        assert!(actions.is_untouched());
    }

    #[test]
    fn unmapped_gesture_is_a_failure() {
        let (mut dispatcher, _) = dispatcher();
        let result = dispatcher.dispatch(CommandEvent::Gesture(Gesture::Unknown));
        assert!(!result.success);
        assert!(result.message.contains("Unknown gesture"));
    }
}
