use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};

use crate::config::TransferConfig;
use crate::schedule::{WireTimestamp, iso_8601, run_time_on};
use crate::transfer::TransferService;
use crate::types::StartManualTransferRunsResponse;

pub mod config;
pub mod schedule;
pub mod transfer;
pub mod types;

pub const APP_NAME: &str = "bqtransfer";

pub fn set_up_logger(calling_module: &'static str, verbose: bool) -> Result<()> {
    jluszcz_rust_utils::set_up_logger(APP_NAME, calling_module, verbose)
}

/// Requests a manual run of `config` at noon UTC on the current UTC day of `now`.
pub async fn trigger_manual_run<S: TransferService>(
    service: &S,
    config: &TransferConfig,
    now: DateTime<Utc>,
) -> Result<StartManualTransferRunsResponse> {
    trigger_manual_run_on(service, config, now.date_naive()).await
}

/// Requests a manual run of `config` at noon UTC on `date`.
pub async fn trigger_manual_run_on<S: TransferService>(
    service: &S,
    config: &TransferConfig,
    date: NaiveDate,
) -> Result<StartManualTransferRunsResponse> {
    let run_time = run_time_on(date)?;
    let requested_run_time = WireTimestamp::from(run_time);
    let parent = config.resource_path();
    debug!("Requesting run of {parent} at {requested_run_time:?}");

    let response = service
        .start_manual_transfer_runs(&parent, requested_run_time)
        .await?;

    info!(
        "Scheduled query triggered at {} for config {}",
        iso_8601(&run_time),
        config.config_id
    );

    Ok(response)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::TransferRun;
    use anyhow::anyhow;
    use chrono::TimeZone;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::cell::RefCell;
    use std::sync::Mutex;

    thread_local! {
        static LOGGED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    /// Records log lines per thread, so tests running in parallel don't see each other's.
    struct ThreadLogger;

    impl Log for ThreadLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            LOGGED.with(|logged| {
                logged
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    static LOGGER: ThreadLogger = ThreadLogger;

    fn capture_logs() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
        LOGGED.with(|logged| logged.borrow_mut().clear());
    }

    fn info_lines() -> Vec<String> {
        LOGGED.with(|logged| {
            logged
                .borrow()
                .iter()
                .filter(|(level, _)| *level == Level::Info)
                .map(|(_, line)| line.clone())
                .collect()
        })
    }

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<(String, WireTimestamp)>>,
        fail: bool,
    }

    impl RecordingService {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, WireTimestamp)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TransferService for RecordingService {
        async fn start_manual_transfer_runs(
            &self,
            parent: &str,
            requested_run_time: WireTimestamp,
        ) -> Result<StartManualTransferRunsResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((parent.to_owned(), requested_run_time));

            if self.fail {
                return Err(anyhow!("HTTP status client error (404 Not Found)"));
            }

            Ok(StartManualTransferRunsResponse {
                runs: vec![TransferRun {
                    name: format!("{parent}/runs/run-1"),
                    state: Some("PENDING".to_owned()),
                    run_time: None,
                    schedule_time: None,
                    data_source_id: None,
                    destination_dataset_id: None,
                    other: Default::default(),
                }],
            })
        }
    }

    fn config() -> TransferConfig {
        TransferConfig::new("your-project", "eu", "config-1")
    }

    const PARENT: &str = "projects/your-project/locations/eu/transferConfigs/config-1";

    #[tokio::test]
    async fn test_trigger_makes_single_call() -> Result<()> {
        let service = RecordingService::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 27, 3).unwrap();

        let response = trigger_manual_run(&service, &config(), now).await?;

        assert_eq!(
            service.calls(),
            vec![(
                PARENT.to_owned(),
                WireTimestamp {
                    seconds: 1710504000,
                    nanos: 0
                }
            )]
        );
        assert_eq!(response.runs.len(), 1);
        assert_eq!(response.runs[0].name, format!("{PARENT}/runs/run-1"));

        Ok(())
    }

    #[tokio::test]
    async fn test_trigger_logs_run_time_and_config() -> Result<()> {
        capture_logs();
        let service = RecordingService::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 27, 3).unwrap();

        trigger_manual_run(&service, &config(), now).await?;

        assert_eq!(
            info_lines(),
            vec!["Scheduled query triggered at 2024-03-15T12:00:00.000Z for config config-1"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_trigger_failure_logs_nothing() {
        capture_logs();
        let service = RecordingService::failing();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 27, 3).unwrap();

        assert!(trigger_manual_run(&service, &config(), now).await.is_err());

        assert!(info_lines().is_empty());
    }

    #[tokio::test]
    async fn test_trigger_on_explicit_date() -> Result<()> {
        let service = RecordingService::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        trigger_manual_run_on(&service, &config(), date).await?;

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.seconds, 1704110400);
        assert_eq!(calls[0].1.nanos, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_trigger_propagates_failure() {
        let service = RecordingService::failing();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();

        let result = trigger_manual_run(&service, &config(), now).await;

        let err = result.expect_err("failure should propagate");
        assert!(err.to_string().contains("404"));
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_twice_same_day_requests_twice() -> Result<()> {
        let service = RecordingService::default();
        let morning = Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 15, 21, 0, 0).unwrap();

        trigger_manual_run(&service, &config(), morning).await?;
        trigger_manual_run(&service, &config(), evening).await?;

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);

        Ok(())
    }
}
