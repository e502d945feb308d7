use crate::audio::format::AudioFormat;
use crate::engine::models::{find_model, ModelDescriptor};
use crate::engine::SynthesisEngine;
use crate::error::EngineError;
use crate::language::Language;
use crate::perf::{self, Metric};
use crate::request::ConversionRequest;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{error, info};

/// How to invoke an external synthesis program.
///
/// Argument templates may contain `{text}`, `{language}`, `{output}`,
/// `{reference}`, `{model}`, `{speed}`, and `{slow}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandEngineConfig {
    /// Model id, looked up in the built-in registry.
    pub model: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Appended only when a reference clip is supplied.
    #[serde(default)]
    pub reference_args: Vec<String>,
    /// Appended for every request.
    #[serde(default)]
    pub language_args: Vec<String>,
    /// Appended only when the request sets a speed.
    #[serde(default)]
    pub speed_args: Vec<String>,
    /// Appended only for slow requests.
    #[serde(default)]
    pub slow_args: Vec<String>,
    /// Write the text to the program's stdin instead of an argument.
    #[serde(default)]
    pub text_via_stdin: bool,
    #[serde(default)]
    pub languages: Option<Vec<Language>>,
    #[serde(default)]
    pub voice_cloning: Option<bool>,
    #[serde(default)]
    pub output_format: Option<AudioFormat>,
    #[serde(default)]
    pub max_text_chars: Option<usize>,
}

impl CommandEngineConfig {
    pub fn new(model: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            program: program.into(),
            args: Vec::new(),
            reference_args: Vec::new(),
            language_args: Vec::new(),
            speed_args: Vec::new(),
            slow_args: Vec::new(),
            text_via_stdin: false,
            languages: None,
            voice_cloning: None,
            output_format: None,
            max_text_chars: None,
        }
    }

    /// Registry descriptor for `model` with the config's overrides applied.
    pub fn descriptor(&self) -> ModelDescriptor {
        let mut descriptor =
            find_model(&self.model).unwrap_or_else(|| ModelDescriptor::generic(&self.model));
        if let Some(languages) = &self.languages {
            descriptor.languages = languages.clone();
        }
        if let Some(voice_cloning) = self.voice_cloning {
            descriptor.voice_cloning = voice_cloning;
        }
        if let Some(output_format) = self.output_format {
            descriptor.output_format = output_format;
        }
        if let Some(max_text_chars) = self.max_text_chars {
            descriptor.max_text_chars = max_text_chars;
        }
        descriptor
    }
}

/// Engine backed by an external program that writes the output file itself.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    config: CommandEngineConfig,
    descriptor: ModelDescriptor,
}

impl CommandEngine {
    pub fn new(config: CommandEngineConfig) -> Self {
        let descriptor = config.descriptor();
        Self { config, descriptor }
    }

    pub fn config(&self) -> &CommandEngineConfig {
        &self.config
    }

    fn build_args(
        &self,
        request: &ConversionRequest,
        reference: Option<&Path>,
        output: &Path,
    ) -> Vec<String> {
        let speed = request.speed().map(|s| s.to_string()).unwrap_or_default();
        let output = output.display().to_string();
        let reference_str = reference.map(|p| p.display().to_string()).unwrap_or_default();
        let vars: [(&str, &str); 7] = [
            ("text", request.text()),
            ("language", request.language().code()),
            ("output", output.as_str()),
            ("reference", reference_str.as_str()),
            ("model", self.config.model.as_str()),
            ("speed", speed.as_str()),
            ("slow", if request.slow() { "true" } else { "false" }),
        ];

        let mut templates: Vec<&String> = self.config.args.iter().collect();
        if reference.is_some() {
            templates.extend(&self.config.reference_args);
        }
        templates.extend(&self.config.language_args);
        if request.speed().is_some() {
            templates.extend(&self.config.speed_args);
        }
        if request.slow() {
            templates.extend(&self.config.slow_args);
        }
        templates
            .into_iter()
            .map(|template| expand(template, &vars))
            .collect()
    }
}

impl SynthesisEngine for CommandEngine {
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
        let _span = perf::span(Metric::EngineSynthesize);
        perf::add_count(Metric::EngineCalls, 1);

        let args = self.build_args(request, reference, output);
        info!(
            program = %self.config.program,
            model = %self.descriptor.id,
            chars = request.text().chars().count(),
            "running synthesis engine"
        );
        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(if self.config.text_via_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        // A failed write usually means the program exited early; its exit
        // status and stderr explain why, so reap it before reporting.
        let write_result = child
            .stdin
            .take()
            .map(|mut stdin| stdin.write_all(request.text().as_bytes()));
        let result = child.wait_with_output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            error!("Synthesis engine failed: {stderr}");
            return Err(EngineError::Failed {
                status: result.status.to_string(),
                stderr,
            });
        }
        if let Some(Err(err)) = write_result {
            return Err(EngineError::Io(err));
        }
        if !output.exists() {
            return Err(EngineError::MissingOutput(output.to_path_buf()));
        }
        info!("Audio saved to: {}", output.display());
        Ok(())
    }
}

/// Replace `{name}` placeholders in one pass, so substituted values are never
/// expanded again. Unknown placeholders are left untouched.
fn expand(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
