use pipexpect::{Error, ExitError, ProcessDuplex, SpawnError};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_cat_round_trip() {
    let (mut duplex, done) = ProcessDuplex::spawn("cat", &[] as &[&str]).unwrap();
    assert!(duplex.id().is_some());

    duplex.write_all(b"hello\n").await.unwrap();
    let mut buf = [0u8; 6];
    duplex.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"hello\n");

    duplex.close().await.unwrap();
    done.wait().await.unwrap();
}

#[tokio::test]
async fn test_eof_after_process_exits() {
    let (mut duplex, done) = ProcessDuplex::spawn("sh", &["-c", "echo one"]).unwrap();
    let mut out = String::new();
    duplex.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "one\n");
    done.wait().await.unwrap();
}

#[tokio::test]
async fn test_unknown_command_is_spawn_error() {
    let err = ProcessDuplex::spawn("definitely-not-a-command-4821", &[] as &[&str]).unwrap_err();
    match err {
        Error::Spawn(SpawnError::NotFound { command, path }) => {
            assert_eq!(command, "definitely-not-a-command-4821");
            assert_eq!(path, std::env::var("PATH").unwrap_or_default());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_non_zero_exit_is_reported() {
    let (_duplex, done) = ProcessDuplex::spawn("sh", &["-c", "exit 3"]).unwrap();
    match done.wait().await {
        Err(ExitError::Status(status)) => assert_eq!(status.code(), Some(3)),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_completion_is_buffered() {
    let (_duplex, done) = ProcessDuplex::spawn("sh", &["-c", "exit 0"]).unwrap();
    // The child is long gone before anyone listens.
    tokio::time::sleep(Duration::from_millis(200)).await;
    done.wait().await.unwrap();
}

#[tokio::test]
async fn test_close_twice_reports_both_pipes() {
    let (mut duplex, done) = ProcessDuplex::spawn("cat", &[] as &[&str]).unwrap();
    duplex.close().await.unwrap();

    let err = duplex.close().await.unwrap_err();
    assert_eq!(
        err.input.as_ref().map(io::Error::kind),
        Some(io::ErrorKind::NotConnected)
    );
    assert_eq!(
        err.output.as_ref().map(io::Error::kind),
        Some(io::ErrorKind::NotConnected)
    );
    let message = err.to_string();
    assert!(message.contains("stdin already closed"), "got: {message}");
    assert!(message.contains("stdout already closed"), "got: {message}");

    done.wait().await.unwrap();
}

#[tokio::test]
async fn test_io_after_close_fails() {
    let (mut duplex, done) = ProcessDuplex::spawn("cat", &[] as &[&str]).unwrap();
    duplex.close().await.unwrap();

    let mut buf = [0u8; 1];
    let err = duplex.read(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    let err = duplex.write(b"x").await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotConnected);

    done.wait().await.unwrap();
}

#[tokio::test]
async fn test_close_does_not_kill_process() {
    let (mut duplex, done) = ProcessDuplex::spawn("sh", &["-c", "sleep 0.2; exit 4"]).unwrap();
    duplex.close().await.unwrap();
    match done.wait().await {
        Err(ExitError::Status(status)) => assert_eq!(status.code(), Some(4)),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
