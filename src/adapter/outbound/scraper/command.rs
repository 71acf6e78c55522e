//! Scraper backed by an external command.
//!
//! The command is run as `<program> <args...> <url>` and must print a JSON
//! array of [`RawActivityRow`]s to stdout, newest row first.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::row::{normalize_rows, RawActivityRow};
use crate::domain::ActivityEvent;
use crate::error::ScrapeError;
use crate::port::{ActivityScraper, ScrapeOutcome};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How to run the scraping program.
#[derive(Debug, Clone)]
pub struct CommandScraperConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Currency label the site appends to prices.
    pub price_unit: String,
}

impl Default for CommandScraperConfig {
    fn default() -> Self {
        Self {
            program: "alto-scrape".into(),
            args: Vec::new(),
            timeout: Duration::from_secs(90),
            price_unit: "CANTO".into(),
        }
    }
}

/// Runs one child process per scrape.
pub struct CommandScraper {
    config: CommandScraperConfig,
}

/// Kills the child if it is still running when the scrape ends.
struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            let _ = self.0.kill();
        }
        let _ = self.0.wait();
    }
}

impl CommandScraper {
    #[must_use]
    pub fn new(config: CommandScraperConfig) -> Self {
        Self { config }
    }

    fn run(&self, url: &str) -> Result<String, ScrapeError> {
        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ScrapeError::Launch(format!("{}: {e}", self.config.program)))?;
        let mut child = ChildGuard(child);

        let stdout = read_in_background(child.0.stdout.take());
        let stderr = read_in_background(child.0.stderr.take());

        let deadline = Instant::now() + self.config.timeout;
        let status = loop {
            match child.0.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    warn!(url = %url, "Scraper timed out, killing it");
                    return Err(ScrapeError::Timeout {
                        secs: self.config.timeout.as_secs(),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(ScrapeError::Launch(e.to_string())),
            }
        };

        let stdout = stdout.join().unwrap_or_default();
        if !status.success() {
            let stderr = stderr.join().unwrap_or_default();
            return Err(ScrapeError::Exited {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

impl ActivityScraper for CommandScraper {
    fn scrape(&self, url: &str, known_events: &[ActivityEvent]) -> ScrapeOutcome {
        let output = match self.run(url) {
            Ok(output) => output,
            Err(error) => return ScrapeOutcome::failed(error),
        };

        let rows: Vec<RawActivityRow> = match serde_json::from_str(&output) {
            Ok(rows) => rows,
            Err(e) => return ScrapeOutcome::failed(ScrapeError::Parse(e.to_string())),
        };
        debug!(url = %url, rows = rows.len(), "Activity table read");

        normalize_rows(rows, url, &self.config.price_unit, known_events)
    }
}

fn read_in_background<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const URL: &str = "https://alto.build/collections/foo";

    fn shell(script: &str, timeout: Duration) -> CommandScraper {
        CommandScraper::new(CommandScraperConfig {
            program: "sh".into(),
            args: vec!["-c".into(), script.into(), "scrape".into()],
            timeout,
            price_unit: "CANTO".into(),
        })
    }

    #[test]
    fn reads_rows_from_stdout() {
        let scraper = shell(
            r#"printf '%s' '[{"event_type":"Sale","token_id":"2","price":"5\nCANTO","to_text":"--","from_text":"--"},{"event_type":"List","token_id":"1","price":"--","to_text":"--","from_text":"--"}]'"#,
            Duration::from_secs(5),
        );

        let events = scraper.scrape(URL, &[]).into_result().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "List");
        assert_eq!(events[1].price(), Some("5"));
        assert_eq!(events[1].token_url(), "https://alto.build/collections/foo/2");
    }

    #[test]
    fn url_is_passed_as_last_argument() {
        let scraper = shell(
            r#"test "$1" = "https://alto.build/collections/foo" && echo '[]'"#,
            Duration::from_secs(5),
        );

        let outcome = scraper.scrape(URL, &[]);

        assert!(outcome.error.is_none(), "{:?}", outcome.error);
    }

    #[test]
    fn non_zero_exit_is_reported_with_stderr() {
        let scraper = shell("echo 'no activity tab' >&2; exit 3", Duration::from_secs(5));

        let err = scraper.scrape(URL, &[]).into_result().unwrap_err();

        match err {
            ScrapeError::Exited { stderr, .. } => assert_eq!(stderr, "no activity tab"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hung_scraper_is_killed_after_timeout() {
        let scraper = shell("sleep 30", Duration::from_millis(200));
        let started = Instant::now();

        let err = scraper.scrape(URL, &[]).into_result().unwrap_err();

        assert!(matches!(err, ScrapeError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn garbage_output_is_a_parse_error() {
        let scraper = shell("echo '<html>'", Duration::from_secs(5));

        let err = scraper.scrape(URL, &[]).into_result().unwrap_err();

        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let scraper = CommandScraper::new(CommandScraperConfig {
            program: "/nonexistent/alto-scrape".into(),
            ..CommandScraperConfig::default()
        });

        let err = scraper.scrape(URL, &[]).into_result().unwrap_err();

        assert!(matches!(err, ScrapeError::Launch(_)));
    }
}
