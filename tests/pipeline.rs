use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::io::{Cursor, Write};
use std::time::Duration;

use tubesum::config::{Config, Credentials};
use tubesum::fetch::local::LocalFileSource;
use tubesum::frontend::batch::{self, BatchOutcome};
use tubesum::frontend::interactive::{summarize_into, FormState};
use tubesum::openai::OpenAiClient;
use tubesum::{Fetcher, Pipeline, PipelineError, SourceRegistry, Summarizer, Transcriber};

fn pipeline(server: &ServerGuard, download_dir: &std::path::Path) -> Pipeline {
    let mut settings = Config::default().openai;
    settings.api_base = format!("{}/v1", server.url());
    let client = OpenAiClient::new(&settings, Credentials::new("test-key")).unwrap();

    Pipeline::new(
        Fetcher::new(
            SourceRegistry::empty().with(Box::new(LocalFileSource::new())),
            download_dir.to_path_buf(),
            Duration::from_secs(1),
        ),
        Transcriber::new(client.clone(), "whisper-1"),
        Summarizer::new(client, "gpt-4o-mini", 0.5),
    )
}

fn media_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("ten-second-clip")
        .suffix(".mp4")
        .tempfile()
        .unwrap();
    file.write_all(&[0u8; 1024]).unwrap();
    file
}

async fn mock_transcription(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
    server
        .mock("POST", "/v1/audio/transcriptions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text": "hello world"}"#)
        .expect(hits)
        .create_async()
        .await
}

async fn mock_summary(server: &mut ServerGuard, max_tokens: u32, content: &str) -> mockito::Mock {
    let body = json!({"choices": [{"message": {"role": "assistant", "content": content}}]});
    server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "max_tokens": max_tokens,
            "temperature": 0.5
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn test_interactive_form_asks_for_four_tokens_per_word() {
    let mut server = Server::new_async().await;
    let transcription = mock_transcription(&mut server, 1).await;
    let summary = mock_summary(&mut server, 40, "A short greeting.").await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());

    let mut state = FormState::new(10);
    state.set_url(&media.path().to_string_lossy());
    let (handle, transcript) = pipeline.transcript_for(&state.url).await.unwrap();
    state.toggle_summarize();
    summarize_into(&pipeline, &mut state, &transcript).await;

    assert_eq!(handle.path, media.path().canonicalize().unwrap());
    assert_eq!(transcript, "hello world");
    assert_eq!(state.summary.as_deref(), Some("A short greeting."));
    assert!(state.error.is_none());
    transcription.assert_async().await;
    summary.assert_async().await;
}

#[tokio::test]
async fn test_interactive_summary_failure_sets_error_state() {
    let mut server = Server::new_async().await;
    let completion = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&server, dir.path());

    let mut state = FormState::new(100);
    state.status = Some("Summarizing the transcription...");
    summarize_into(&pipeline, &mut state, "hello world").await;

    assert!(state.summary.is_none());
    assert!(state.status.is_none());
    assert!(state.error.unwrap().starts_with("Something went wrong: "));
    completion.assert_async().await;
}

#[tokio::test]
async fn test_repeat_runs_hit_the_cache() {
    let mut server = Server::new_async().await;
    let transcription = mock_transcription(&mut server, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());
    let identifier = media.path().to_string_lossy().to_string();

    let (first_media, first) = pipeline.transcript_for(&identifier).await.unwrap();
    let (second_media, second) = pipeline.transcript_for(&identifier).await.unwrap();

    assert_eq!(first_media, second_media);
    assert_eq!(first, second);
    transcription.assert_async().await;
}

#[tokio::test]
async fn test_transcription_failure_propagates() {
    let mut server = Server::new_async().await;
    let transcription = server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());

    let err = pipeline
        .transcript_for(&media.path().to_string_lossy())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::TranscriptionService(_)));
    transcription.assert_async().await;
}

#[tokio::test]
async fn test_batch_prints_summary_with_literal_budget() {
    let mut server = Server::new_async().await;
    let _transcription = mock_transcription(&mut server, 1).await;
    let summary = mock_summary(&mut server, 10, "A greeting.").await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());

    let mut input = Cursor::new(format!("{}\nyes\n10\n", media.path().display()));
    let mut out: Vec<u8> = Vec::new();
    let outcome = batch::run(&pipeline, &mut input, &mut out).await.unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(outcome, BatchOutcome::Summary("A greeting.".to_string()));
    assert!(printed.contains("Enter the YouTube video URL: "));
    assert!(printed.contains("Do you want to summarize the transcription? (yes/no): "));
    assert!(printed.ends_with("\nSummary:\nA greeting.\n"));
    summary.assert_async().await;
}

#[tokio::test]
async fn test_batch_prints_transcript_when_declined() {
    let mut server = Server::new_async().await;
    let _transcription = mock_transcription(&mut server, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());

    let mut input = Cursor::new(format!("{}\nno\n", media.path().display()));
    let mut out: Vec<u8> = Vec::new();
    let outcome = batch::run(&pipeline, &mut input, &mut out).await.unwrap();

    assert_eq!(outcome, BatchOutcome::Transcript("hello world".to_string()));
    assert!(String::from_utf8(out).unwrap().ends_with("\nTranscription:\nhello world\n"));
}

#[tokio::test]
async fn test_batch_rejects_bad_length() {
    let mut server = Server::new_async().await;
    let _transcription = mock_transcription(&mut server, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());

    let mut input = Cursor::new(format!("{}\nyes\nlots\n", media.path().display()));
    let err = batch::run(&pipeline, &mut input, &mut Vec::<u8>::new()).await.unwrap_err();

    assert!(err.to_string().contains("Invalid summary length"));
}

#[tokio::test]
async fn test_batch_rejects_zero_length() {
    let mut server = Server::new_async().await;
    let _transcription = mock_transcription(&mut server, 1).await;
    let completion = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let media = media_file();
    let pipeline = pipeline(&server, dir.path());

    let mut input = Cursor::new(format!("{}\nyes\n0\n", media.path().display()));
    let err = batch::run(&pipeline, &mut input, &mut Vec::<u8>::new()).await.unwrap_err();

    assert!(err.to_string().contains("Invalid summary length"));
    completion.assert_async().await;
}

#[tokio::test]
async fn test_batch_surfaces_unavailable_source() {
    let server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(&server, dir.path());

    let mut input = Cursor::new("./missing/clip.mp4\n");
    let err = batch::run(&pipeline, &mut input, &mut Vec::<u8>::new()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::UnavailableSource { .. })
    ));
}
