//! Side-effecting seams used by the built-in tools. Both are passed in at
//! construction so tests can count invocations or serve canned data.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::ToolError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or -1 when the process was killed or ended by a signal.
    pub exit_code: i32,
    pub timed_out: bool,
    /// Earlier output was dropped to stay within the output limit.
    pub truncated: bool,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        timeout: Duration,
        output_limit: usize,
    ) -> Result<CommandOutput, ToolError>;
}

/// Drains `pipe` keeping at most the last `limit` bytes, so a chatty command
/// cannot grow the buffer without bound.
async fn read_tail<R>(mut pipe: R, limit: usize) -> std::io::Result<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8 * 1024];
    let mut dropped = false;
    loop {
        let read = pipe.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > limit.saturating_mul(2).max(chunk.len()) {
            buffer.drain(..buffer.len() - limit);
            dropped = true;
        }
    }
    if buffer.len() > limit {
        buffer.drain(..buffer.len() - limit);
        dropped = true;
    }
    if dropped {
        // skip a split UTF-8 sequence at the cut
        let start = buffer
            .iter()
            .take(3)
            .take_while(|byte| (**byte & 0b1100_0000) == 0b1000_0000)
            .count();
        buffer.drain(..start);
    }
    Ok((buffer, dropped))
}

/// Runs commands through `bash -lc`.
#[derive(Clone, Debug, Default)]
pub struct LocalCommandRunner;

#[async_trait]
impl CommandRunner for LocalCommandRunner {
    async fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        timeout: Duration,
        output_limit: usize,
    ) -> Result<CommandOutput, ToolError> {
        let mut process = Command::new("bash");
        process.arg("-lc").arg(command);
        if let Some(dir) = working_dir {
            process.current_dir(dir);
        }
        process.stdin(Stdio::null());
        process.stdout(Stdio::piped());
        process.stderr(Stdio::piped());
        process.kill_on_drop(true);

        let mut child = process
            .spawn()
            .map_err(|error| ToolError::Spawn(error.to_string()))?;
        let stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::Spawn("missing stdout pipe".to_string()))?;
        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::Spawn("missing stderr pipe".to_string()))?;

        let stdout_task = tokio::spawn(read_tail(stdout_pipe, output_limit));
        let stderr_task = tokio::spawn(read_tail(stderr_pipe, output_limit));

        let wait_result = tokio::time::timeout(timeout, child.wait()).await;
        let (exit_code, timed_out) = match wait_result {
            Ok(status) => (status?.code().unwrap_or(-1), false),
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                (-1, true)
            }
        };

        let (stdout, stdout_dropped) = stdout_task
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default();
        let (stderr, stderr_dropped) = stderr_task
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default();
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code,
            timed_out,
            truncated: stdout_dropped || stderr_dropped,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchedBody {
    pub status: u16,
    pub body: String,
    pub truncated: bool,
}

#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(
        &self,
        url: &str,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<FetchedBody, ToolError>;
}

#[derive(Clone, Debug, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(
        &self,
        url: &str,
        max_bytes: usize,
        timeout: Duration,
    ) -> Result<FetchedBody, ToolError> {
        let read = async {
            let mut response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let mut body = Vec::new();
            let mut truncated = false;
            while let Some(chunk) = response.chunk().await? {
                let room = max_bytes.saturating_sub(body.len());
                if chunk.len() > room {
                    body.extend_from_slice(&chunk[..room]);
                    truncated = true;
                    break;
                }
                body.extend_from_slice(&chunk);
            }
            Ok::<_, ToolError>(FetchedBody {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
                truncated,
            })
        };
        tokio::time::timeout(timeout, read)
            .await
            .map_err(|_| ToolError::Http(format!("request timed out after {timeout:?}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "current_thread")]
    async fn local_runner_captures_output_and_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = LocalCommandRunner
            .run(
                "pwd; echo oops >&2; exit 3",
                Some(dir.path()),
                Duration::from_secs(10),
                1_000,
            )
            .await
            .expect("bash should run");
        let printed = output.stdout.lines().last().expect("pwd output");
        assert_eq!(
            Path::new(printed).canonicalize().expect("pwd"),
            dir.path().canonicalize().expect("canonical")
        );
        assert!(output.stderr.trim_end().ends_with("oops"));
        assert_eq!(output.exit_code, 3);
        assert!(!output.timed_out);
        assert!(!output.truncated);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_runner_keeps_only_output_tail() {
        let output = LocalCommandRunner
            .run(
                "head -c 200000 /dev/zero | tr '\\0' x; printf END",
                None,
                Duration::from_secs(10),
                100,
            )
            .await
            .expect("bash should run");
        assert!(output.truncated);
        assert_eq!(output.stdout.len(), 100);
        assert!(output.stdout.ends_with("xxxEND"));
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn read_tail_drops_split_utf8_sequence_at_the_cut() {
        let input = "é".repeat(10);
        let (tail, dropped) = read_tail(input.as_bytes(), 5).await.expect("read");
        assert!(dropped);
        assert_eq!(String::from_utf8(tail).expect("utf-8"), "éé");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn local_runner_kills_on_timeout() {
        let output = LocalCommandRunner
            .run("exec sleep 5", None, Duration::from_millis(100), 1_000)
            .await
            .expect("bash should run");
        assert!(output.timed_out);
        assert_eq!(output.exit_code, -1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetcher_caps_body_and_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(404).set_body_string("x".repeat(100)))
            .mount(&server)
            .await;

        let fetched = ReqwestFetcher::default()
            .get(&format!("{}/big", server.uri()), 10, Duration::from_secs(5))
            .await
            .expect("fetch");
        assert_eq!(fetched.status, 404);
        assert_eq!(fetched.body, "xxxxxxxxxx");
        assert!(fetched.truncated);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetcher_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let error = ReqwestFetcher::default()
            .get(&server.uri(), 100, Duration::from_millis(100))
            .await
            .expect_err("should time out");
        assert!(matches!(error, ToolError::Http(_)));
    }
}
