//! Session recording
//!
//! Wraps the simulator's built-in recorder. The file is written server-side;
//! relative names land in the server's save directory.

use tracing::{debug, info, instrument};

use crate::client::{CarlaClient, ReplayRequest};
use crate::error::Result;

/// A running recorder session
///
/// Call [`Recording::stop`] when done. Dropping the guard does not stop the
/// server-side recorder since that needs an async call.
#[derive(Debug)]
pub struct Recording {
    file: String,
    reply: String,
    stopped: bool,
}

impl Recording {
    /// Start recording into `file`
    ///
    /// `additional_data` also records bounding boxes, lights and controls.
    #[instrument(name = "recorder_start", skip(client))]
    pub async fn start<C: CarlaClient>(client: &C, file: &str, additional_data: bool) -> Result<Self> {
        let reply = client.start_recorder(file, additional_data).await?;
        info!(file, reply = %reply, "recorder started");
        Ok(Self {
            file: file.to_string(),
            reply,
            stopped: false,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// What the simulator answered on start
    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stop the recorder; later calls are no-ops
    #[instrument(name = "recorder_stop", skip_all, fields(file = %self.file))]
    pub async fn stop<C: CarlaClient>(&mut self, client: &C) -> Result<()> {
        if self.stopped {
            debug!("recorder already stopped");
            return Ok(());
        }
        client.stop_recorder().await?;
        self.stopped = true;
        info!("recorder stopped");
        Ok(())
    }
}

/// Replay a recorded file, returning the simulator's reply
#[instrument(name = "recorder_replay", skip_all, fields(file = %request.file, start = request.start, duration = request.duration))]
pub async fn replay<C: CarlaClient>(client: &C, request: &ReplayRequest) -> Result<String> {
    let reply = client.replay_file(request).await?;
    info!(follow_id = request.follow_id, reply = %reply, "replay started");
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UtilsError;
    use crate::mock_client::MockCarlaClient;

    async fn connected() -> MockCarlaClient {
        let mut client = MockCarlaClient::new();
        client.connect("localhost", 2000).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_recording_start_stop() {
        let client = connected().await;
        let mut recording = Recording::start(&client, "session.log", true).await.unwrap();

        assert_eq!(recording.file(), "session.log");
        assert!(recording.reply().contains("session.log"));
        assert_eq!(client.active_recording().as_deref(), Some("session.log"));

        recording.stop(&client).await.unwrap();
        assert!(recording.is_stopped());
        assert_eq!(client.active_recording(), None);
    }

    #[tokio::test]
    async fn test_stop_twice_is_noop() {
        let client = connected().await;
        let mut recording = Recording::start(&client, "a.log", false).await.unwrap();
        recording.stop(&client).await.unwrap();

        // A second session started by someone else must survive our second stop
        let mut other = Recording::start(&client, "b.log", false).await.unwrap();
        recording.stop(&client).await.unwrap();
        assert_eq!(client.active_recording().as_deref(), Some("b.log"));
        other.stop(&client).await.unwrap();
    }

    #[tokio::test]
    async fn test_start_while_running_fails() {
        let client = connected().await;
        let _recording = Recording::start(&client, "a.log", false).await.unwrap();
        let err = Recording::start(&client, "b.log", false).await.unwrap_err();
        assert!(matches!(err, UtilsError::Recorder { .. }));
    }

    #[tokio::test]
    async fn test_replay() {
        let client = connected().await;
        let mut recording = Recording::start(&client, "a.log", false).await.unwrap();
        recording.stop(&client).await.unwrap();

        let request = ReplayRequest {
            file: "a.log".into(),
            start: -10.0,
            duration: 5.0,
            follow_id: 1003,
        };
        replay(&client, &request).await.unwrap();
        assert_eq!(client.replays(), vec![request]);

        assert!(replay(&client, &ReplayRequest::whole_file("missing.log"))
            .await
            .is_err());
    }
}
