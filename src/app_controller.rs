use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::checkpoint::CheckpointStore;
use crate::language_utils;
use crate::translation::{BatchTranslator, CompletionBackend, PipelineResult, TranslationPipeline, TranslationService};

// @module: Application controller for subtitle translation

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Step-by-step messages instead of a progress bar
    verbose: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        Ok(Self {
            config,
            verbose: false,
        })
    }

    /// Report each step instead of drawing a progress bar
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate `input_file` into `output_file` with the configured provider
    ///
    /// A missing credential fails before any file is touched.
    pub async fn run(
        &self,
        input_file: &Path,
        output_file: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<PipelineResult> {
        let translation_config = self.config.translation.clone();
        let api_key = translation_config.resolve_api_key()?;
        let service = TranslationService::new(translation_config, api_key)?;

        let progress_bar = self.progress_bar();
        let pipeline = self.build_pipeline(BatchTranslator::new(service), progress_bar.clone())?;
        let result = self
            .run_pipeline(&pipeline, progress_bar, input_file, output_file, source_language, target_language)
            .await?;

        if let Some(usage) = pipeline.translator().backend().token_usage() {
            if usage.requests > 0 {
                info!("🔢 {}", usage.summary());
            }
        }

        Ok(result)
    }

    /// Translate `input_file` into `output_file` with the given backend
    pub async fn run_with_backend<B: CompletionBackend>(
        &self,
        backend: B,
        input_file: &Path,
        output_file: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<PipelineResult> {
        let progress_bar = self.progress_bar();
        let pipeline = self.build_pipeline(BatchTranslator::new(backend), progress_bar.clone())?;
        self.run_pipeline(&pipeline, progress_bar, input_file, output_file, source_language, target_language)
            .await
    }

    fn build_pipeline<B: CompletionBackend>(
        &self,
        translator: BatchTranslator<B>,
        progress_bar: Option<ProgressBar>,
    ) -> Result<TranslationPipeline<B>> {
        let pipeline = TranslationPipeline::new(translator, self.config.translation.common.batch_size)?;

        Ok(match progress_bar {
            Some(bar) => pipeline.with_progress_callback(move |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            }),
            None => pipeline,
        })
    }

    async fn run_pipeline<B: CompletionBackend>(
        &self,
        pipeline: &TranslationPipeline<B>,
        progress_bar: Option<ProgressBar>,
        input_file: &Path,
        output_file: &Path,
        source_language: &str,
        target_language: &str,
    ) -> Result<PipelineResult> {
        let start_time = Instant::now();

        if language_utils::same_language(source_language, target_language) {
            warn!(
                "Source and target language are the same ({} / {}), translating anyway",
                source_language, target_language
            );
        }

        info!(
            "🚀 {} - {}",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model()
        );

        if self.verbose {
            info!("Input: {}", input_file.display());
            info!("Output: {}", output_file.display());
            info!("Languages: {} -> {}", source_language, target_language);
            info!("Batch size: {}", pipeline.batch_size());

            let checkpoint = CheckpointStore::for_output(output_file);
            if checkpoint.exists() {
                info!("Found checkpoint {}", checkpoint.path().display());
            }
        }

        let result = pipeline
            .run(input_file, output_file, source_language, target_language)
            .await;

        if let Some(bar) = progress_bar {
            bar.finish_and_clear();
        }

        let result = result.with_context(|| format!("Failed to translate {}", input_file.display()))?;

        if !result.warnings.is_empty() {
            warn!(
                "Translation completed with {} warning(s); affected entries kept their original text",
                result.warnings.len()
            );
            for warning in &result.warnings {
                debug!("  {}", warning);
            }
        }

        info!(
            "Success: {} ({}, {})",
            output_file.display(),
            result.summary(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(result)
    }

    // No bar in verbose mode; it would fight with the log lines
    fn progress_bar(&self) -> Option<ProgressBar> {
        if self.verbose {
            return None;
        }

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        Some(progress_bar)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
