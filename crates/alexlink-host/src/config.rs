use std::time::Duration;

/// Runtime settings for the controller, independent of serial line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Consecutive read failures tolerated before the receive loop stops.
    /// Default: 3.
    pub read_retry_limit: u32,
    /// Pause between failed reads. Default: 100 ms.
    pub read_retry_delay: Duration,
    /// Time the Arduino needs to reboot after the port is opened.
    /// Default: 2 s.
    pub startup_delay: Duration,
    /// Announce the host with a HELLO packet once connected. Default: true.
    pub send_hello: bool,
    /// When set, wait this long for the robot to answer the hello with OK
    /// before starting the receive loop. Default: none (fire-and-forget).
    pub hello_timeout: Option<Duration>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            read_retry_limit: 3,
            read_retry_delay: Duration::from_millis(100),
            startup_delay: Duration::from_secs(2),
            send_hello: true,
            hello_timeout: None,
        }
    }
}
