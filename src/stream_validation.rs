use std::collections::BTreeMap;
use std::fs;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use futures_util::{stream, StreamExt};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::timeout;

use crate::config::{Config, StreamValidationConfig};
use crate::logging::logger;
use crate::stations::Catalog;

const FALLBACK_RANGE: &str = "bytes=0-1023";
const CAUSE_TIMEOUT: &str = "timeout";
const CAUSE_CONNECTION: &str = "connection-error";

#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub url: String,
    pub station_id: String,
    pub station_name: String,
}

/// What a single probe observed: either an HTTP status (any status — the
/// classification into working/failed happens later) or a transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Responded { status: u16, latency: f64 },
    TransportFailed { cause: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeDetail {
    pub url: String,
    pub status: u16,
    pub working: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub station_id: String,
    pub station_name: String,
    pub check_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub stations: BTreeMap<String, String>,
    pub details: Vec<ProbeDetail>,
    pub validation_time: String,
    pub summary: String,
}

pub struct StreamValidator {
    config: StreamValidationConfig,
    client: Client,
}

impl StreamValidator {
    pub fn new(config: StreamValidationConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, client })
    }

    /// Probes every target with bounded concurrency. Workers share nothing;
    /// this loop is the single writer of counters, map, and details, and
    /// consumes outcomes in completion order.
    pub async fn validate(&self, targets: Vec<ProbeTarget>) -> ValidationReport {
        let total = targets.len();
        let probe_timeout = Duration::from_millis(self.config.timeout_ms);

        let mut outcomes = stream::iter(targets.into_iter().map(|target| {
            let client = self.client.clone();
            async move {
                let outcome = probe_url(&client, &target.url, probe_timeout).await;
                (target, outcome)
            }
        }))
        .buffer_unordered(self.config.concurrency);

        let mut report = ValidationReport {
            total,
            working: 0,
            failed: 0,
            success_rate: 0.0,
            stations: BTreeMap::new(),
            details: Vec::with_capacity(total),
            validation_time: String::new(),
            summary: String::new(),
        };

        let mut completed = 0usize;
        while let Some((target, outcome)) = outcomes.next().await {
            let detail = detail_from_outcome(target, &outcome);
            if detail.working {
                report.working += 1;
            } else {
                report.failed += 1;
            }
            report.stations.insert(
                detail.url.clone(),
                if detail.working { "ok" } else { "failed" }.to_string(),
            );
            report.details.push(detail);

            completed += 1;
            if completed % self.config.progress_interval == 0 {
                logger().info(
                    "validate.progress",
                    json!({ "checked": completed, "total": total }),
                );
            }
        }

        report.success_rate = if report.total > 0 {
            report.working as f64 / report.total as f64
        } else {
            0.0
        };
        report.validation_time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        report.summary = format!(
            "{}/{} streams working ({} failures)",
            report.working, report.total, report.failed
        );
        report
    }
}

/// One stream URL per station stream in catalog order.
pub fn targets_from_catalog(catalog: &Catalog) -> Vec<ProbeTarget> {
    catalog
        .stations
        .iter()
        .flat_map(|station| {
            station.streams.iter().map(move |stream| ProbeTarget {
                url: stream.url.clone(),
                station_id: station.id.clone(),
                station_name: station.name.clone(),
            })
        })
        .collect()
}

/// HEAD probe with a single ranged-GET fallback. Some origins reject bare
/// HEAD requests with a 4xx; the fallback asks for the first kilobyte and
/// drops the connection after the first body chunk.
pub(crate) async fn probe_url(client: &Client, url: &str, probe_timeout: Duration) -> ProbeOutcome {
    let started = Instant::now();
    let response = match timeout(probe_timeout, client.head(url).send()).await {
        Err(_) => {
            return ProbeOutcome::TransportFailed {
                cause: CAUSE_TIMEOUT.to_string(),
            }
        }
        Ok(Err(err)) => {
            return ProbeOutcome::TransportFailed {
                cause: classify_transport_error(err),
            }
        }
        Ok(Ok(response)) => response,
    };
    let head_status = response.status().as_u16();
    let head_latency = started.elapsed().as_secs_f64();

    if !(400..500).contains(&head_status) {
        return ProbeOutcome::Responded {
            status: head_status,
            latency: head_latency,
        };
    }

    match ranged_get(client, url, probe_timeout).await {
        Some(outcome) => outcome,
        None => ProbeOutcome::Responded {
            status: head_status,
            latency: head_latency,
        },
    }
}

async fn ranged_get(client: &Client, url: &str, probe_timeout: Duration) -> Option<ProbeOutcome> {
    let started = Instant::now();
    let request = client.get(url).header(header::RANGE, FALLBACK_RANGE);
    let response = timeout(probe_timeout, request.send()).await.ok()?.ok()?;
    let status = response.status().as_u16();
    let latency = started.elapsed().as_secs_f64();

    // Confirm a body exists, then release the connection unread.
    let mut body = response.bytes_stream();
    let _ = timeout(probe_timeout, body.next()).await;

    Some(ProbeOutcome::Responded { status, latency })
}

fn classify_transport_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        CAUSE_TIMEOUT.to_string()
    } else if err.is_connect() {
        CAUSE_CONNECTION.to_string()
    } else {
        err.without_url().to_string()
    }
}

pub(crate) fn status_is_working(status: u16) -> bool {
    (200..400).contains(&status)
}

fn detail_from_outcome(target: ProbeTarget, outcome: &ProbeOutcome) -> ProbeDetail {
    let check_time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    match outcome {
        ProbeOutcome::Responded { status, latency } => ProbeDetail {
            url: target.url,
            status: *status,
            working: status_is_working(*status),
            latency: Some(round_latency(*latency)),
            error: None,
            station_id: target.station_id,
            station_name: target.station_name,
            check_time,
        },
        ProbeOutcome::TransportFailed { cause } => ProbeDetail {
            url: target.url,
            status: 0,
            working: false,
            latency: None,
            error: Some(cause.clone()),
            station_id: target.station_id,
            station_name: target.station_name,
            check_time,
        },
    }
}

fn round_latency(latency: f64) -> f64 {
    (latency * 100.0).round() / 100.0
}

/// The `validate` batch command: probe every stream of the latest catalog
/// and write the results file the next generate run reconciles against.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let catalog_file = config.catalog_file();
    let raw = fs::read_to_string(&catalog_file).with_context(|| {
        format!(
            "catalog file {} is missing; run `generate` first",
            catalog_file.display()
        )
    })?;
    let catalog: Catalog =
        serde_json::from_str(&raw).context("catalog file is not valid JSON")?;

    let targets = targets_from_catalog(&catalog);
    logger().info(
        "validate.started",
        json!({
            "streams": targets.len(),
            "concurrency": config.validation.concurrency,
            "timeoutMs": config.validation.timeout_ms,
        }),
    );

    let validator = StreamValidator::new(config.validation.clone())?;
    let report = validator.validate(targets).await;

    let rendered = serde_json::to_string_pretty(&report).context("failed to encode results")?;
    fs::write(&config.validation_results_file, rendered).with_context(|| {
        format!(
            "failed to write {}",
            config.validation_results_file.display()
        )
    })?;

    logger().info(
        "validate.completed",
        json!({
            "total": report.total,
            "working": report.working,
            "failed": report.failed,
            "successRate": report.success_rate,
        }),
    );
    Ok(())
}
