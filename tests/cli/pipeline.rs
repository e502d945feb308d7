#[path = "../common/mod.rs"]
mod common;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use ttspro::audio::io::AudioIo;
use ttspro::engine::models::{find_model, ModelDescriptor, TACOTRON2_DDC, YOUR_TTS};
use ttspro::error::{EngineError, RequestError};
use ttspro::validate::DurationIssue;
use ttspro::{
    AudioBuffer, ConversionRequest, ReferenceLimits, SpeechService, SynthesisEngine, SynthesisError,
    TextOverflow,
};

/// Records every call and writes a short tone to the requested output.
struct RecordingEngine {
    descriptor: ModelDescriptor,
    calls: Mutex<Vec<Option<PathBuf>>>,
    references: Mutex<Vec<AudioBuffer>>,
    fail: bool,
}

impl RecordingEngine {
    fn new(model: &str) -> Self {
        Self {
            descriptor: find_model(model).expect("known model"),
            calls: Mutex::new(Vec::new()),
            references: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Writes part of the output, then fails.
    fn failing(model: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(model)
        }
    }

    fn references(&self) -> Vec<AudioBuffer> {
        self.references.lock().expect("lock").clone()
    }

    fn calls(&self) -> Vec<Option<PathBuf>> {
        self.calls.lock().expect("lock").clone()
    }
}

impl SynthesisEngine for RecordingEngine {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn synthesize(
        &self,
        request: &ConversionRequest,
        reference: Option<&Path>,
        output: &Path,
    ) -> Result<(), EngineError> {
        self.check_request(request, reference)?;
        self.calls
            .lock()
            .expect("lock")
            .push(reference.map(Path::to_path_buf));
        if let Some(reference) = reference {
            let buffer = AudioIo::read_audio(reference).expect("read reference");
            self.references.lock().expect("lock").push(buffer);
        }
        if self.fail {
            std::fs::write(output, b"RIFF")?;
            return Err(EngineError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "out of memory".to_string(),
            });
        }
        let dir = output.parent().expect("output dir");
        let written = common::write_mono_tone(dir, "tone.wav", 0.25, 22050);
        std::fs::rename(written, output)?;
        Ok(())
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    service: SpeechService,
}

impl Fixture {
    fn new(overflow: TextOverflow) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = SpeechService::new(
            dir.path().join("outputs"),
            dir.path().join("temp"),
            ReferenceLimits::default(),
            overflow,
        )
        .expect("service");
        Self { dir, service }
    }

    fn outputs(&self) -> usize {
        common::file_count(&self.dir.path().join("outputs"))
    }

    fn temps(&self) -> usize {
        common::file_count(&self.dir.path().join("temp"))
    }
}

#[test]
fn clone_voice_rejects_short_reference_without_calling_engine() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::new(YOUR_TTS);
    let reference = common::write_mono_tone(fx.dir.path(), "short.wav", 1.0, 16000);
    let request = fx
        .service
        .request_for(&engine, "Hello there", "en")
        .expect("request");

    let err = fx
        .service
        .clone_voice(&engine, &request, &reference)
        .unwrap_err();
    match err {
        SynthesisError::Rejected(report) => {
            assert!(!report.is_valid);
            assert_eq!(report.issue, Some(DurationIssue::TooShort));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(engine.calls().is_empty());
    assert_eq!(fx.outputs(), 0);
    assert_eq!(fx.temps(), 0);
}

#[test]
fn clone_voice_reports_unreadable_reference_as_audio_error() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::new(YOUR_TTS);
    let reference = fx.dir.path().join("broken.wav");
    std::fs::write(&reference, b"RIFF but not really").expect("write broken");
    let request = fx
        .service
        .request_for(&engine, "Hello there", "en")
        .expect("request");

    let err = fx
        .service
        .clone_voice(&engine, &request, &reference)
        .unwrap_err();
    assert!(matches!(err, SynthesisError::Audio(_)), "got {err:?}");
    assert!(engine.calls().is_empty());
    assert_eq!(fx.outputs(), 0);
}

#[test]
fn clone_voice_hands_normalized_reference_to_engine() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::new(YOUR_TTS);
    let reference = common::write_stereo_tone(fx.dir.path(), "ref.wav", 5.0, 48000);
    let request = fx
        .service
        .request_for(&engine, "Bonjour tout le monde", "fr")
        .expect("request");

    let output = fx
        .service
        .clone_voice(&engine, &request, &reference)
        .expect("clone");
    assert_eq!(output.message, "Voice cloned successfully");
    assert_eq!(output.model, YOUR_TTS);
    assert!(output.path.exists());
    let name = output.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("cloned_voice_") && name.ends_with(".wav"));

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    let processed = calls[0].clone().expect("reference passed");
    assert!(processed.starts_with(fx.service.normalizer().output_dir()));
    let references = engine.references();
    let normalized = &references[0];
    assert_eq!(normalized.sample_rate(), 22050);
    assert_eq!(normalized.channel_count(), 1);
    assert!((normalized.duration_seconds() - 5.0).abs() < 0.01);

    assert!(!processed.exists());
    assert_eq!(fx.temps(), 0);
    assert_eq!(fx.outputs(), 1);
}

#[test]
fn failed_engine_leaves_no_files_behind() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::failing(YOUR_TTS);
    let reference = common::write_mono_tone(fx.dir.path(), "ref.wav", 5.0, 16000);
    let request = fx
        .service
        .request_for(&engine, "Hello there", "en")
        .expect("request");

    let err = fx
        .service
        .clone_voice(&engine, &request, &reference)
        .unwrap_err();
    assert!(matches!(err, SynthesisError::Engine(EngineError::Failed { .. })));
    assert_eq!(engine.calls().len(), 1);
    assert_eq!(fx.outputs(), 0);
    assert_eq!(fx.temps(), 0);

    let err = fx.service.synthesize(&engine, &request).unwrap_err();
    assert!(matches!(err, SynthesisError::Engine(_)));
    assert_eq!(fx.outputs(), 0);
}

#[test]
fn normalizing_a_normalized_file_is_sample_identical() {
    let fx = Fixture::new(TextOverflow::Reject);
    let source = common::write_mono_tone(fx.dir.path(), "ref.wav", 4.0, 22050);
    let normalizer = fx.service.normalizer();

    let first = normalizer.normalize(&source).expect("first pass");
    let second = normalizer.normalize(&first.path).expect("second pass");
    assert_ne!(first.path, second.path);

    let original = AudioIo::read_audio(&source).expect("read source");
    let once = AudioIo::read_audio(&first.path).expect("read first");
    let twice = AudioIo::read_audio(&second.path).expect("read second");
    assert_eq!(once.sample_rate(), 22050);
    assert_eq!(once, original);
    assert_eq!(twice, once);

    let resampled = common::write_stereo_tone(fx.dir.path(), "stereo.wav", 4.0, 44100);
    let first = normalizer.normalize(&resampled).expect("first pass");
    let second = normalizer.normalize(&first.path).expect("second pass");
    let once = AudioIo::read_audio(&first.path).expect("read first");
    let twice = AudioIo::read_audio(&second.path).expect("read second");
    assert_eq!(twice, once);
}

#[test]
fn clone_voice_refuses_non_cloning_model_before_normalizing() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::new(TACOTRON2_DDC);
    let reference = common::write_mono_tone(fx.dir.path(), "ref.wav", 5.0, 22050);
    let request = fx
        .service
        .request_for(&engine, "Hello", "en")
        .expect("request");

    let err = fx
        .service
        .clone_voice(&engine, &request, &reference)
        .unwrap_err();
    assert!(matches!(
        err,
        SynthesisError::Engine(EngineError::CloningUnsupported { .. })
    ));
    assert_eq!(fx.temps(), 0);
}

#[test]
fn unsupported_languages_never_reach_the_engine() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::new(YOUR_TTS);

    let err = fx.service.request_for(&engine, "Hello", "xx").unwrap_err();
    assert!(matches!(err, RequestError::UnsupportedLanguage { .. }));
    assert!(err.to_string().contains("Choose from"));

    let err = fx.service.request_for(&engine, "Hello", "ar").unwrap_err();
    assert_eq!(
        err,
        RequestError::LanguageNotSupportedByModel {
            code: "ar".to_string(),
            model: YOUR_TTS.to_string(),
        }
    );
    assert!(engine.calls().is_empty());
    assert_eq!(fx.outputs(), 0);
}

#[test]
fn overlong_text_is_rejected_unless_truncation_is_enabled() {
    let text = "a".repeat(2001);
    let engine = RecordingEngine::new(YOUR_TTS);

    let strict = Fixture::new(TextOverflow::Reject);
    let err = strict.service.request_for(&engine, &text, "en").unwrap_err();
    assert_eq!(err, RequestError::TextTooLong { len: 2001, max: 2000 });

    let lenient = Fixture::new(TextOverflow::Truncate);
    let request = lenient
        .service
        .request_for(&engine, &text, "en")
        .expect("truncated request");
    assert_eq!(request.text().chars().count(), 2000);
}

#[test]
fn synthesize_names_output_after_model() {
    let fx = Fixture::new(TextOverflow::Reject);
    let engine = RecordingEngine::new(TACOTRON2_DDC);
    let request = fx
        .service
        .request_for(&engine, "Hello world", "en")
        .expect("request");

    let output = fx.service.synthesize(&engine, &request).expect("synthesize");
    assert_eq!(output.message, "Text converted to speech successfully");
    let name = output.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("advanced_tts_") && name.ends_with(".wav"));
    assert_eq!(engine.calls(), vec![None]);
}

#[cfg(unix)]
mod command_engine {
    use super::common;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::process::{Command, Output};
    use ttspro::audio::io::AudioIo;
    use ttspro::engine::models::YOUR_TTS;
    use ttspro::engine::CommandEngineConfig;
    use ttspro::AppConfig;

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let mut say = CommandEngineConfig::new("demo", "sh");
        say.args = vec![
            "-c".into(),
            "printf '%s' \"$1\" > \"$2\"".into(),
            "sh".into(),
            "{text}".into(),
            "{output}".into(),
        ];

        let mut clone = CommandEngineConfig::new(YOUR_TTS, "sh");
        clone.args = vec![
            "-c".into(),
            "cp \"$2\" \"$1\"".into(),
            "sh".into(),
            "{output}".into(),
        ];
        clone.reference_args = vec!["{reference}".into()];

        let mut engines = BTreeMap::new();
        engines.insert("echo".to_string(), say);
        engines.insert("copy".to_string(), clone);
        let config = AppConfig {
            output_directory: dir.join("outputs"),
            temp_directory: dir.join("temp"),
            engines,
            ..AppConfig::default()
        };
        let path = dir.join("engines.yaml");
        std::fs::write(&path, serde_yaml::to_string(&config).expect("yaml")).expect("write");
        path
    }

    fn ttspro(config: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ttspro"))
            .arg("--config")
            .arg(config)
            .args(args)
            .output()
            .expect("run ttspro")
    }

    #[test]
    fn say_runs_configured_program() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path());
        let output = ttspro(&config, &["say", "Hello; $(world)", "--engine", "echo"]);
        assert!(output.status.success(), "{output:?}");

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        assert!(path.contains("advanced_tts_"));
        assert_eq!(
            std::fs::read_to_string(path).expect("read output"),
            "Hello; $(world)"
        );
    }

    #[test]
    fn clone_passes_normalized_reference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path());
        let reference = common::write_stereo_tone(dir.path(), "voice.wav", 4.0, 44100);
        let output = ttspro(
            &config,
            &[
                "clone",
                "Hello world",
                "--reference",
                reference.to_str().unwrap(),
                "--engine",
                "copy",
            ],
        );
        assert!(output.status.success(), "{output:?}");

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        assert!(path.contains("cloned_voice_"));
        let cloned = AudioIo::read_audio(&path).expect("read cloned");
        assert_eq!(cloned.sample_rate(), 22050);
        assert_eq!(cloned.channel_count(), 1);
    }

    #[test]
    fn clone_with_short_reference_fails_without_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path());
        let reference = common::write_mono_tone(dir.path(), "voice.wav", 1.0, 16000);
        let output = ttspro(
            &config,
            &[
                "clone",
                "Hello world",
                "--reference",
                reference.to_str().unwrap(),
                "--engine",
                "copy",
            ],
        );
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Reference audio rejected"));
        assert_eq!(common::file_count(&dir.path().join("outputs")), 0);
    }

    #[test]
    fn say_rejects_language_outside_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path());
        let output = ttspro(
            &config,
            &["say", "Hello", "--engine", "copy", "--language", "xx"],
        );
        assert!(!output.status.success());
        assert_eq!(common::file_count(&dir.path().join("outputs")), 0);
    }
}
