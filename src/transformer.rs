//! Transcript transformation pipeline.
//!
//! Coordinates the whole process for one input: ledger check, prompt
//! assembly, AI call, response parsing, quality gate, and persistence.
//! Batches are strictly sequential; the AI call is the only suspension
//! point, and cancellation is checked between files, never mid-call.

use crate::client::AiRequestClient;
use crate::config::{PromptConfig, ProviderConfig, Settings};
use crate::document::{ParserStrategy, ReformattedDocument};
use crate::error::{NotatError, ProcessingError, Result};
use crate::ledger::{LedgerCheck, ProcessingLedger};
use crate::progress::{NullObserver, ProcessingStatus, ProgressEvent, ProgressObserver};
use crate::sanitize::sanitize;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// One time-coded transcript segment.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub text: String,
    /// Timestamp string ("HH:MM:SS" or "MM:SS"). Dropped for the prompt.
    #[serde(default)]
    pub at: String,
}

/// The input record produced by the transcript downloader.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptRecord {
    /// Free-form metadata map; `channel_name` is mandatory for output pathing.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "transcript")]
    pub segments: Vec<Segment>,
}

impl TranscriptRecord {
    /// The channel name used to build the output directory.
    pub fn channel_name(&self) -> Option<&str> {
        self.metadata.get("channel_name").and_then(|v| v.as_str())
    }

    /// Flatten all segment texts with a single space separator.
    pub fn combined_text(&self) -> String {
        let mut text = String::new();
        for segment in &self.segments {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&segment.text);
        }
        text
    }
}

/// A successfully persisted transformation.
#[derive(Debug, Clone)]
pub struct DocumentOutput {
    pub title: String,
    pub summary: String,
    pub content: String,
    /// Output filename (without directory).
    pub filename: String,
    /// Full output path.
    pub output_path: PathBuf,
}

/// Outcome of processing one input file.
#[derive(Debug)]
pub enum Outcome {
    /// Output written and ledger updated.
    Completed(DocumentOutput),
    /// Skipped: already processed and the output still exists.
    AlreadyProcessed { output_path: String },
    /// Skipped: reformatted content fell below the quality gate. The ledger
    /// is left untouched so the input is retried on a future run.
    ContentTooShort,
}

/// Tally for a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The transcript-to-document transformer.
pub struct TranscriptTransformer {
    client: AiRequestClient,
    prompts: PromptConfig,
    model: String,
    parser: ParserStrategy,
    timeout: Duration,
    max_retries: u32,
    min_title_length: usize,
    min_summary_length: usize,
    min_content_length: usize,
    output_dir: PathBuf,
    ledger: ProcessingLedger,
    observer: Arc<dyn ProgressObserver>,
}

impl TranscriptTransformer {
    /// Build a transformer for the given provider.
    pub fn new(
        settings: &Settings,
        provider: &ProviderConfig,
        prompts: PromptConfig,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self> {
        let client = AiRequestClient::configure_provider(provider)?
            .with_retry(
                settings.processing.max_retries,
                Duration::from_millis(settings.processing.retry_delay_ms),
            )
            .with_observer(observer.clone());

        let model = provider
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| settings.processing.default_model.clone());

        Ok(Self::with_client(client, model, settings, prompts, observer))
    }

    /// Build a transformer over a pre-configured client.
    pub fn with_client(
        client: AiRequestClient,
        model: String,
        settings: &Settings,
        prompts: PromptConfig,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            client,
            prompts,
            model,
            parser: settings.processing.parser,
            timeout: Duration::from_secs(settings.processing.timeout_seconds),
            max_retries: settings.processing.max_retries.max(1),
            min_title_length: settings.processing.min_title_length,
            min_summary_length: settings.processing.min_summary_length,
            min_content_length: settings.processing.min_content_length,
            output_dir: settings.output_dir(),
            ledger: ProcessingLedger::new(settings.ledger_path()),
            observer,
        }
    }

    /// Replace the progress observer (events from the AI client keep the
    /// observer it was built with).
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn notify(&self, status: ProcessingStatus, message: impl Into<String>) {
        self.observer.notify(&ProgressEvent::new(status, message));
    }

    /// Reformat one transcript record through the AI provider.
    ///
    /// Returns `None` when the reformatted document fell below the quality
    /// gate; nothing is persisted in that case.
    #[instrument(skip(self, record))]
    pub async fn transform(&self, record: &TranscriptRecord) -> Result<Option<DocumentOutput>> {
        if self.prompts.is_incomplete() {
            return Err(NotatError::Config(
                "System or user prompt is empty; configure prompts before processing".to_string(),
            ));
        }

        let channel_name = record.channel_name().ok_or_else(|| {
            NotatError::InvalidInput("Input metadata is missing 'channel_name'".to_string())
        })?;
        let channel_name = channel_name.to_string();

        let user_prompt = self.build_user_prompt(record)?;

        // Unparsable replies re-issue the whole call: a different completion
        // may parse successfully.
        let mut attempt = 0u32;
        let document = loop {
            attempt += 1;
            let raw = self
                .client
                .complete(&self.prompts.system_prompt, &user_prompt, &self.model, self.timeout)
                .await?;

            match self.parser.parse(&raw) {
                Ok(document) => break document,
                Err(e) if attempt < self.max_retries => {
                    warn!("Unparsable AI response (attempt {}): {}", attempt, e);
                    self.notify(
                        ProcessingStatus::Retrying,
                        format!("AI response could not be parsed, requesting again: {}", e),
                    );
                }
                Err(e) => return Err(e.into()),
            }
        };

        if !document.meets_minimum_lengths(
            self.min_title_length,
            self.min_summary_length,
            self.min_content_length,
        ) {
            self.notify(
                ProcessingStatus::ContentTooShort,
                "Skipping file: reformatted content is too short",
            );
            return Ok(None);
        }

        self.persist(&document, &channel_name).map(Some)
    }

    /// Assemble the user prompt: template, schema reminder, metadata, transcript.
    fn build_user_prompt(&self, record: &TranscriptRecord) -> Result<String> {
        let metadata_json = serde_json::to_string(&record.metadata)?;
        let schema_reminder = match self.parser {
            ParserStrategy::Json => {
                "Use this JSON schema:\n\nReturn: {'title': str, 'summary': str, 'content': str}"
            }
            ParserStrategy::Labeled => {
                "Return plain text with three sections, in order, each introduced by its label:\nTitle: ...\nSummary: ...\nContent: ..."
            }
        };

        Ok(format!(
            "{}\n\n{}\n\nHere is the original metadata and transcript for reference:\n\nOriginal metadata:\n{}\n\nTranscript:\n{}",
            self.prompts.user_prompt,
            schema_reminder,
            metadata_json,
            record.combined_text(),
        ))
    }

    /// Write the document under `<output_dir>/<channel>/<title>.json`.
    fn persist(&self, document: &ReformattedDocument, channel_name: &str) -> Result<DocumentOutput> {
        let channel_dir = self.output_dir.join(sanitize(channel_name));
        std::fs::create_dir_all(&channel_dir)?;

        let filename = format!("{}.json", sanitize(&document.title));
        let output_path = channel_dir.join(&filename);

        // serde_json writes UTF-8 without escaping non-ASCII characters.
        let content = serde_json::to_string_pretty(document)?;
        std::fs::write(&output_path, content)?;

        info!("Saved reformatted document to {}", output_path.display());

        Ok(DocumentOutput {
            title: document.title.clone(),
            summary: document.summary.clone(),
            content: document.content.clone(),
            filename,
            output_path,
        })
    }

    /// Process one input file end to end, consulting and updating the ledger.
    #[instrument(skip(self), fields(file = %file.display()))]
    pub async fn process_file(&self, file: &Path) -> Result<Outcome> {
        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                NotatError::InvalidInput(format!("Not a valid file path: {}", file.display()))
            })?
            .to_string();

        self.observer.notify(
            &ProgressEvent::new(
                ProcessingStatus::Started,
                format!("Processing file: {}", filename),
            )
            .with_file(file),
        );

        // The ledger is keyed by base filename only; same-named inputs in
        // different directories collide.
        match self.ledger.check(&filename)? {
            LedgerCheck::Processed { output_path } => {
                self.notify(
                    ProcessingStatus::AlreadyProcessed,
                    "File already processed. Skipping.",
                );
                return Ok(Outcome::AlreadyProcessed { output_path });
            }
            LedgerCheck::Stale { .. } => {
                self.notify(
                    ProcessingStatus::StaleEntry,
                    "File was processed before, but the output file is missing. Reprocessing...",
                );
            }
            LedgerCheck::NotProcessed => {}
        }

        let content = std::fs::read_to_string(file)?;
        let record: TranscriptRecord = serde_json::from_str(&content)?;

        match self.transform(&record).await? {
            Some(output) => {
                self.ledger
                    .record_success(&filename, &output.output_path.to_string_lossy())?;
                self.observer.notify(
                    &ProgressEvent::new(
                        ProcessingStatus::FileCompleted,
                        format!("File processed. Saved as: {}", output.filename),
                    )
                    .with_file(file),
                );
                Ok(Outcome::Completed(output))
            }
            None => Ok(Outcome::ContentTooShort),
        }
    }

    /// Process a set of files and/or directories, strictly one at a time.
    ///
    /// Directories contribute their `.json` files, descending into
    /// subdirectories when `recursive` is set. The cancellation flag is
    /// checked between files only; prior outputs and ledger entries are
    /// left intact on cancellation.
    pub async fn process_batch(
        &self,
        paths: &[PathBuf],
        recursive: bool,
        cancel: Option<&AtomicBool>,
    ) -> Result<BatchSummary> {
        let files = collect_input_files(paths, recursive)?;
        let mut summary = BatchSummary {
            total: files.len(),
            ..Default::default()
        };

        for file in &files {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    self.notify(ProcessingStatus::Cancelled, "Processing cancelled by user");
                    return Err(NotatError::Cancelled);
                }
            }

            match self.process_file(file).await {
                Ok(Outcome::Completed(_)) => summary.completed += 1,
                Ok(Outcome::AlreadyProcessed { .. }) | Ok(Outcome::ContentTooShort) => {
                    summary.skipped += 1
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Failed to process {}: {}", file.display(), e);
                    self.observer.notify(
                        &ProgressEvent::new(
                            ProcessingStatus::Failed,
                            format!("Failed to process {}: {}", file.display(), e),
                        )
                        .with_file(file),
                    );
                }
            }
        }

        self.notify(
            ProcessingStatus::BatchCompleted,
            format!(
                "Processing complete. {} of {} files processed",
                summary.completed, summary.total
            ),
        );
        Ok(summary)
    }
}

/// Expand files and directories into the ordered list of `.json` inputs.
fn collect_input_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_from_dir(path, recursive, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn collect_from_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            if recursive {
                collect_from_dir(&entry, recursive, files)?;
            }
        } else if entry.extension().is_some_and(|ext| ext == "json") {
            files.push(entry);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{Scripted, ScriptedTransport};

    fn long_reply() -> String {
        format!(
            "{{\"title\": \"{}\", \"summary\": \"{}\", \"content\": \"{}\"}}",
            "A Sufficiently Long Title",
            "s".repeat(150),
            "c".repeat(600),
        )
    }

    fn settings_in(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.processing.output_dir = dir.join("processed").to_string_lossy().into_owned();
        settings.processing.ledger_path = dir.join("ledger.json").to_string_lossy().into_owned();
        settings.processing.retry_delay_ms = 1;
        settings.processing.timeout_seconds = 5;
        settings
    }

    fn transformer_with(
        script: Vec<Scripted>,
        settings: Settings,
    ) -> (TranscriptTransformer, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(script));
        let client = AiRequestClient::with_transport(transport.clone()).with_retry(
            settings.processing.max_retries,
            Duration::from_millis(settings.processing.retry_delay_ms),
        );
        let transformer = TranscriptTransformer::with_client(
            client,
            "test-model".to_string(),
            &settings,
            PromptConfig {
                system_prompt: "system".to_string(),
                user_prompt: "user".to_string(),
            },
            Arc::new(NullObserver),
        );
        (transformer, transport)
    }

    fn write_input(dir: &Path, name: &str, channel: &str) -> PathBuf {
        let path = dir.join(name);
        let record = serde_json::json!({
            "metadata": {
                "channel_name": channel,
                "video_title": "Original Title",
                "publish_date": "2024-01-01",
                "tags": ["a", "b"]
            },
            "transcript": [
                {"text": "hello", "at": "00:01"},
                {"text": "world", "at": "00:02"}
            ]
        });
        std::fs::write(&path, serde_json::to_string(&record).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_combined_text_single_space_join() {
        let record: TranscriptRecord = serde_json::from_value(serde_json::json!({
            "metadata": {"channel_name": "c"},
            "transcript": [
                {"text": "one", "at": "00:01"},
                {"text": "two", "at": "00:02"},
                {"text": "three", "at": "00:03"}
            ]
        }))
        .unwrap();
        assert_eq!(record.combined_text(), "one two three");
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let (transformer, transport) =
            transformer_with(vec![Scripted::Reply(long_reply())], settings.clone());

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let outcome = transformer.process_file(&input).await.unwrap();

        let output = match outcome {
            Outcome::Completed(output) => output,
            other => panic!("expected Completed, got {:?}", other),
        };

        let expected = settings
            .output_dir()
            .join("Test Channel")
            .join("A Sufficiently Long Title.json");
        assert_eq!(output.output_path, expected);
        assert!(expected.exists());

        // Exactly the three document fields.
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&expected).unwrap()).unwrap();
        let obj = written.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("title") && obj.contains_key("summary") && obj.contains_key("content"));

        // Ledger keyed by base filename, pointing at the output.
        let ledger = ProcessingLedger::new(settings.ledger_path());
        let entries = ledger.load().unwrap();
        assert_eq!(
            entries["input.json"].output_path,
            expected.to_string_lossy()
        );
        assert_eq!(*transport.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_timeout_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings_in(dir.path());
        // Zero-second timeout elapses on the first pending poll.
        settings.processing.timeout_seconds = 0;
        settings.processing.max_retries = 3;
        let (transformer, transport) = transformer_with(
            vec![Scripted::Hang, Scripted::Hang, Scripted::Hang],
            settings.clone(),
        );

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let err = transformer.process_file(&input).await.unwrap_err();
        assert!(matches!(
            err,
            NotatError::Processing(ProcessingError::Timeout { attempts: 3 })
        ));

        assert!(!settings.output_dir().exists());
        assert!(ProcessingLedger::new(settings.ledger_path())
            .load()
            .unwrap()
            .is_empty());
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_too_short_content_is_skip_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let reply = format!(
            "{{\"title\": \"{}\", \"summary\": \"{}\", \"content\": \"{}\"}}",
            "A Sufficiently Long Title",
            "s".repeat(150),
            "c".repeat(400), // below the 500-char gate
        );
        let (transformer, _) = transformer_with(vec![Scripted::Reply(reply)], settings.clone());

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let outcome = transformer.process_file(&input).await.unwrap();
        assert!(matches!(outcome, Outcome::ContentTooShort));

        assert!(!settings.output_dir().exists());
        assert!(ProcessingLedger::new(settings.ledger_path())
            .load()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_gate_boundary_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        // Exactly 20/100/500 chars must be rejected.
        let reply = format!(
            "{{\"title\": \"{}\", \"summary\": \"{}\", \"content\": \"{}\"}}",
            "t".repeat(20),
            "s".repeat(100),
            "c".repeat(500),
        );
        let (transformer, _) = transformer_with(vec![Scripted::Reply(reply)], settings);

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let outcome = transformer.process_file(&input).await.unwrap();
        assert!(matches!(outcome, Outcome::ContentTooShort));
    }

    #[tokio::test]
    async fn test_parse_failure_reissues_full_call() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let (transformer, transport) = transformer_with(
            vec![
                Scripted::Reply("this is not json at all".to_string()),
                Scripted::Reply(long_reply()),
            ],
            settings,
        );

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let outcome = transformer.process_file(&input).await.unwrap();
        assert!(matches!(outcome, Outcome::Completed(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_parse_failure_exhausts_budget() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let garbage = || Scripted::Reply("still not json".to_string());
        let (transformer, transport) =
            transformer_with(vec![garbage(), garbage(), garbage()], settings);

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let err = transformer.process_file(&input).await.unwrap_err();
        assert!(matches!(
            err,
            NotatError::Processing(ProcessingError::Parse(_))
        ));
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_already_processed_skips_without_ai_call() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());

        // Pre-record a ledger entry whose output file exists.
        let prior_output = dir.path().join("prior.json");
        std::fs::write(&prior_output, "{}").unwrap();
        ProcessingLedger::new(settings.ledger_path())
            .record_success("input.json", prior_output.to_str().unwrap())
            .unwrap();

        let (transformer, transport) =
            transformer_with(vec![Scripted::Reply(long_reply())], settings);

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let outcome = transformer.process_file(&input).await.unwrap();
        assert!(matches!(outcome, Outcome::AlreadyProcessed { .. }));
        assert_eq!(*transport.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stale_entry_reprocesses_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());

        // Ledger points at an output that no longer exists.
        ProcessingLedger::new(settings.ledger_path())
            .record_success("input.json", dir.path().join("gone.json").to_str().unwrap())
            .unwrap();

        let (transformer, transport) =
            transformer_with(vec![Scripted::Reply(long_reply())], settings.clone());

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let outcome = transformer.process_file(&input).await.unwrap();
        assert!(matches!(outcome, Outcome::Completed(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 1);

        let entries = ProcessingLedger::new(settings.ledger_path()).load().unwrap();
        assert!(entries["input.json"].output_path.ends_with("A Sufficiently Long Title.json"));
    }

    #[tokio::test]
    async fn test_empty_prompts_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let client = AiRequestClient::with_transport(transport.clone());
        let transformer = TranscriptTransformer::with_client(
            client,
            "test-model".to_string(),
            &settings,
            PromptConfig::default(),
            Arc::new(NullObserver),
        );

        let input = write_input(dir.path(), "input.json", "Test Channel");
        let err = transformer.process_file(&input).await.unwrap_err();
        assert!(matches!(err, NotatError::Config(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_channel_name_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let (transformer, transport) =
            transformer_with(vec![Scripted::Reply(long_reply())], settings);

        let path = dir.path().join("input.json");
        std::fs::write(
            &path,
            r#"{"metadata": {"video_title": "t"}, "transcript": [{"text": "x", "at": "00:01"}]}"#,
        )
        .unwrap();

        let err = transformer.process_file(&path).await.unwrap_err();
        assert!(matches!(err, NotatError::InvalidInput(_)));
        assert_eq!(*transport.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sanitized_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let reply = format!(
            "{{\"title\": \"Part 1: Setting_up your RAG AI\", \"summary\": \"{}\", \"content\": \"{}\"}}",
            "s".repeat(150),
            "c".repeat(600),
        );
        let (transformer, _) = transformer_with(
            vec![Scripted::Reply(reply)],
            settings.clone(),
        );

        let input = write_input(dir.path(), "input.json", "My: Channel");
        let outcome = transformer.process_file(&input).await.unwrap();
        let output = match outcome {
            Outcome::Completed(output) => output,
            other => panic!("expected Completed, got {:?}", other),
        };

        assert_eq!(
            output.output_path,
            settings
                .output_dir()
                .join("My - Channel")
                .join("Part 1 - Setting up your RAG AI.json")
        );
    }

    #[tokio::test]
    async fn test_non_ascii_preserved_in_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let reply = format!(
            "{{\"title\": \"Læring med æøå i tittelen\", \"summary\": \"{}\", \"content\": \"{}\"}}",
            "s".repeat(150),
            "c".repeat(600),
        );
        let (transformer, _) = transformer_with(vec![Scripted::Reply(reply)], settings);

        let input = write_input(dir.path(), "input.json", "Kanal");
        let outcome = transformer.process_file(&input).await.unwrap();
        let output = match outcome {
            Outcome::Completed(output) => output,
            other => panic!("expected Completed, got {:?}", other),
        };

        let written = std::fs::read_to_string(&output.output_path).unwrap();
        assert!(written.contains("æøå"));
        assert!(!written.contains("\\u"));
    }

    #[tokio::test]
    async fn test_batch_counts_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let inputs_dir = dir.path().join("inputs");
        std::fs::create_dir_all(&inputs_dir).unwrap();
        write_input(&inputs_dir, "a.json", "Chan A");
        write_input(&inputs_dir, "b.json", "Chan B");
        std::fs::write(inputs_dir.join("notes.txt"), "ignored").unwrap();

        let (transformer, transport) = transformer_with(
            vec![
                Scripted::Reply(long_reply()),
                Scripted::Reply(long_reply()),
            ],
            settings,
        );

        let summary = transformer
            .process_batch(&[inputs_dir], false, None)
            .await
            .unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(*transport.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_batch_cancellation_between_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_input(dir.path(), "a.json", "Chan A");

        let (transformer, transport) =
            transformer_with(vec![Scripted::Reply(long_reply())], settings);

        let cancel = AtomicBool::new(true);
        let err = transformer
            .process_batch(&[dir.path().to_path_buf()], false, Some(&cancel))
            .await
            .unwrap_err();
        assert!(matches!(err, NotatError::Cancelled));
        assert_eq!(*transport.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_continues_after_per_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let inputs_dir = dir.path().join("inputs");
        std::fs::create_dir_all(&inputs_dir).unwrap();
        // First file (alphabetically) is malformed JSON, second is valid.
        std::fs::write(inputs_dir.join("a.json"), "not a record").unwrap();
        write_input(&inputs_dir, "b.json", "Chan B");

        let (transformer, _) = transformer_with(
            vec![Scripted::Reply(long_reply())],
            settings,
        );

        let summary = transformer
            .process_batch(&[inputs_dir], false, None)
            .await
            .unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn test_collect_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(sub.join("b.json"), "{}").unwrap();

        let flat = collect_input_files(&[dir.path().to_path_buf()], false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_input_files(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(deep.len(), 2);
    }
}
