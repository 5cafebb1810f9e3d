//! Sensors and alarms driven by external commands.
//!
//! Each sensor read runs a short-lived process and takes the first integer
//! on its standard output. Alarm commands run one at a time, in the order
//! they were requested, on a background task; the caller never waits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sumpwatch_adapters::script::{ScriptCommand, ScriptSensor};
//! use sumpwatch_core::SensorSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sensor = ScriptSensor::new(
//!         ScriptCommand::parse("python3 read-depth.py")?,
//!         ScriptCommand::parse("python3 read-leak1.py")?,
//!     );
//!
//!     println!("depth code: {}", sensor.read_depth_code().await?);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use sumpwatch_core::{AlarmAction, AlarmSink, SensorSource};

use crate::AdapterError;

/// Default command that prints one depth ADC code.
pub const DEFAULT_DEPTH_COMMAND: &str = "python3 read-depth.py";
/// Default command that prints one leak sensor code.
pub const DEFAULT_LEAK_COMMAND: &str = "python3 read-leak1.py";
/// Default command that sounds the alarm.
pub const DEFAULT_ALARM_ON_COMMAND: &str = "python3 alarm-on.py";
/// Default command that stops the alarm.
pub const DEFAULT_ALARM_OFF_COMMAND: &str = "python3 alarm-off.py";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A program and its arguments.
///
/// Parsed from a single string split on whitespace; no shell quoting is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ScriptCommand {
    program: String,
    args: Vec<String>,
}

impl ScriptCommand {
    pub fn parse(line: &str) -> Result<Self, AdapterError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AdapterError::Command("empty command line".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run to completion and return standard output.
    pub async fn output(&self, timeout: Duration) -> Result<String, AdapterError> {
        self.run(Some(timeout)).await
    }

    /// Run to completion, killing the process if `timeout` elapses first.
    /// With no timeout the process may run for as long as it likes.
    pub async fn run(&self, timeout: Option<Duration>) -> Result<String, AdapterError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(timeout.is_some())
            .output();

        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, child)
                .await
                .map_err(|_| AdapterError::Spawn {
                    command: self.to_string(),
                    reason: format!("timed out after {limit:?}"),
                })?,
            None => child.await,
        };
        let output = result.map_err(|e| AdapterError::Spawn {
            command: self.to_string(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(AdapterError::ExitStatus {
                command: self.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run and parse the leading integer of the output.
    pub async fn read_code(&self, timeout: Duration) -> Result<i32, AdapterError> {
        let stdout = self.output(timeout).await?;
        parse_code(&stdout)
    }
}

impl TryFrom<String> for ScriptCommand {
    type Error = AdapterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Parse the first whitespace-separated token as an integer.
pub fn parse_code(output: &str) -> Result<i32, AdapterError> {
    let token = output
        .split_whitespace()
        .next()
        .ok_or_else(|| AdapterError::Parse("empty output".to_string()))?;
    token
        .parse()
        .map_err(|_| AdapterError::Parse(format!("expected an integer, got '{token}'")))
}

/// Sensor source that runs one command per raw code.
#[derive(Debug, Clone)]
pub struct ScriptSensor {
    depth: ScriptCommand,
    leak: ScriptCommand,
    timeout: Duration,
    description: String,
}

impl ScriptSensor {
    pub fn new(depth: ScriptCommand, leak: ScriptCommand) -> Self {
        let description = format!("script: {}", depth.program());
        Self {
            depth,
            leak,
            timeout: DEFAULT_TIMEOUT,
            description,
        }
    }

    /// Limit how long a single read may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SensorSource for ScriptSensor {
    async fn read_depth_code(&mut self) -> sumpwatch_core::Result<i32> {
        Ok(self.depth.read_code(self.timeout).await?)
    }

    async fn read_leak_code(&mut self) -> sumpwatch_core::Result<i32> {
        Ok(self.leak.read_code(self.timeout).await?)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Alarm sink that runs a command on each edge.
///
/// Requests are queued to a single worker task on the given runtime, so the
/// on and off commands always run in the order they were asked for and never
/// overlap. Callers do not wait; failures are logged.
#[derive(Debug, Clone)]
pub struct ScriptAlarm {
    actions: mpsc::UnboundedSender<AlarmAction>,
}

impl ScriptAlarm {
    /// Start the worker. `timeout` bounds each command; `None` lets an
    /// alarm command sound for as long as it runs.
    pub fn new(
        on: ScriptCommand,
        off: ScriptCommand,
        timeout: Option<Duration>,
        runtime: Handle,
    ) -> Self {
        let (actions, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_alarm_commands(rx, on, off, timeout));
        Self { actions }
    }

    fn request(&self, action: AlarmAction) {
        if self.actions.send(action).is_err() {
            warn!(?action, "Alarm worker has stopped, request dropped");
        }
    }
}

async fn run_alarm_commands(
    mut rx: mpsc::UnboundedReceiver<AlarmAction>,
    on: ScriptCommand,
    off: ScriptCommand,
    timeout: Option<Duration>,
) {
    while let Some(action) = rx.recv().await {
        let command = match action {
            AlarmAction::Activate => &on,
            AlarmAction::Deactivate => &off,
        };
        match command.run(timeout).await {
            Ok(_) => debug!(%command, "Alarm command finished"),
            Err(e) => warn!("Alarm command failed: {e}"),
        }
    }
    debug!("Alarm worker stopped");
}

impl AlarmSink for ScriptAlarm {
    fn activate(&self) {
        self.request(AlarmAction::Activate);
    }

    fn deactivate(&self) {
        self.request(AlarmAction::Deactivate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parse_splits_program_and_args() {
        let cmd = ScriptCommand::parse("  python3   read-depth.py --raw ").unwrap();
        assert_eq!(cmd.program(), "python3");
        assert_eq!(cmd.args(), ["read-depth.py", "--raw"]);
        assert_eq!(cmd.to_string(), "python3 read-depth.py --raw");
    }

    #[test]
    fn parse_rejects_blank_lines() {
        assert!(matches!(ScriptCommand::parse("   "), Err(AdapterError::Command(_))));
    }

    #[test]
    fn parse_code_takes_leading_integer() {
        assert_eq!(parse_code("812\n").unwrap(), 812);
        assert_eq!(parse_code("  -3 extra").unwrap(), -3);
        assert!(matches!(parse_code(""), Err(AdapterError::Parse(_))));
        assert!(matches!(parse_code("n/a"), Err(AdapterError::Parse(_))));
    }

    #[tokio::test]
    async fn sensor_reads_command_output() {
        let mut sensor = ScriptSensor::new(
            ScriptCommand::parse("echo 812").unwrap(),
            ScriptCommand::parse("echo 3").unwrap(),
        );
        assert_eq!(sensor.read_depth_code().await.unwrap(), 812);
        assert_eq!(sensor.read_leak_code().await.unwrap(), 3);
        assert_eq!(sensor.description(), "script: echo");
    }

    #[tokio::test]
    async fn failing_command_reports_exit_status() {
        let cmd = ScriptCommand::parse("false").unwrap();
        let err = cmd.read_code(DEFAULT_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, AdapterError::ExitStatus { .. }));
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_error() {
        let cmd = ScriptCommand::parse("sumpwatch-no-such-program").unwrap();
        let err = cmd.read_code(DEFAULT_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, AdapterError::Spawn { .. }));
    }

    /// Write a shell script that appends `word` to `log` after `delay`.
    fn logging_script(
        dir: &Path,
        name: &str,
        delay: &str,
        word: &str,
        log: &Path,
    ) -> ScriptCommand {
        let script = dir.join(name);
        std::fs::write(
            &script,
            format!("sleep {delay}\necho {word} >> {}\n", log.display()),
        )
        .unwrap();
        ScriptCommand::parse(&format!("sh {}", script.display())).unwrap()
    }

    async fn wait_for_lines(log: &Path, count: usize) -> Vec<String> {
        for _ in 0..250 {
            if let Ok(text) = std::fs::read_to_string(log) {
                let lines: Vec<String> = text.lines().map(str::to_string).collect();
                if lines.len() >= count {
                    return lines;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        Vec::new()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn alarm_commands_run_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("siren.log");
        let on = logging_script(dir.path(), "on.sh", "0.3", "on", &log);
        let off = logging_script(dir.path(), "off.sh", "0", "off", &log);

        let alarm = ScriptAlarm::new(on, off, None, Handle::current());
        alarm.activate();
        tokio::time::sleep(Duration::from_millis(50)).await;
        alarm.deactivate();

        // The slow on-command must not finish after the off-command
        assert_eq!(wait_for_lines(&log, 2).await, ["on", "off"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn alarm_commands_outlive_the_read_timeout_unless_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("siren.log");
        let on = logging_script(dir.path(), "on.sh", "0.3", "on", &log);
        let off = logging_script(dir.path(), "off.sh", "0", "off", &log);

        // Unbounded: the whole on-command runs
        let alarm = ScriptAlarm::new(on.clone(), off.clone(), None, Handle::current());
        alarm.activate();
        alarm.deactivate();
        assert_eq!(wait_for_lines(&log, 2).await, ["on", "off"]);

        // Bounded below its runtime: the on-command is killed, the queue moves on
        std::fs::remove_file(&log).unwrap();
        let alarm = ScriptAlarm::new(
            on,
            off,
            Some(Duration::from_millis(50)),
            Handle::current(),
        );
        alarm.activate();
        alarm.deactivate();
        assert_eq!(wait_for_lines(&log, 1).await, ["off"]);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "off\n");
    }

    #[test]
    fn deserializes_from_a_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            cmd: ScriptCommand,
        }
        let w: Wrapper = serde_json::from_str(r#"{"cmd": "python3 alarm-on.py"}"#).unwrap();
        assert_eq!(w.cmd, ScriptCommand::parse(DEFAULT_ALARM_ON_COMMAND).unwrap());
    }
}
