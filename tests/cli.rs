use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn tubesum(config_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tubesum").unwrap();
    cmd.env("TUBESUM_CONFIG", config_dir.path().join("config.yaml"))
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_sources_lists_every_source() {
    let dir = tempfile::tempdir().unwrap();

    tubesum(&dir)
        .arg("sources")
        .env_remove("OPENAI_API_KEY")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local File"))
        .stdout(predicate::str::contains("yt-dlp"))
        .stdout(predicate::str::contains("Direct URL"));
}

#[test]
fn test_config_show_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();

    tubesum(&dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transcription Model: whisper-1"));

    assert!(dir.path().join("config.yaml").exists());
}

#[test]
fn test_missing_api_key_is_a_startup_failure() {
    let dir = tempfile::tempdir().unwrap();

    tubesum(&dir)
        .env_remove("OPENAI_API_KEY")
        .write_stdin("https://youtu.be/abc\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"))
        .stdout(predicate::str::contains("Enter the YouTube video URL").not());
}

#[test]
fn test_batch_run_against_local_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text": "hello world"}"#)
        .create();

    let config = format!(
        "openai:
  api_base: {}/v1
  transcription_model: whisper-1
  summary_model: gpt-4o-mini
  temperature: 0.5
  request_timeout_secs: 30
fetch:
  yt_dlp_path: yt-dlp
  preferred_extension: mp4
  retry_backoff_secs: 1
  download_dir: null
app:
  default_summary_length: 100
",
        server.url()
    );
    fs_err::write(dir.path().join("config.yaml"), config).unwrap();

    let mut media = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    media.write_all(&[0u8; 256]).unwrap();
    let saved = dir.path().join("transcript.txt");

    tubesum(&dir)
        .env("OPENAI_API_KEY", "test-key")
        .args(["--quiet", "--output"])
        .arg(&saved)
        .write_stdin(format!("{}\nno\n", media.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Transcription:\nhello world"));

    assert_eq!(fs_err::read_to_string(&saved).unwrap(), "hello world\n");
}

#[test]
fn test_batch_stage_failure_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();

    tubesum(&dir)
        .env("OPENAI_API_KEY", "test-key")
        .write_stdin("./no/such/clip.mp4\nno\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source unavailable"));
}
