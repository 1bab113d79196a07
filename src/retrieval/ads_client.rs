use crate::error::{ProcessingError, Result};
use crate::models::RequestDescriptor;
use crate::retrieval::{DataProvider, ProviderCredentials, RetrievalHandle};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Deserialize)]
struct JobStatus {
    #[serde(rename = "jobID")]
    job_id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct JobResults {
    asset: Asset,
}

#[derive(Debug, Deserialize)]
struct Asset {
    value: AssetValue,
}

#[derive(Debug, Deserialize)]
struct AssetValue {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiProblem {
    title: Option<String>,
    detail: Option<String>,
}

/// Client for the data store's "retrieve v1" process API.
///
/// A request is submitted as a job, polled until it finishes, and resolved
/// to the download location of its result bundle. Calls block without a
/// timeout; a hung provider stalls the run.
pub struct AdsClient {
    http: Client,
    credentials: ProviderCredentials,
    poll_interval: Duration,
}

impl AdsClient {
    pub fn new(credentials: ProviderCredentials, poll_interval: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("airquality-pl/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            http,
            credentials,
            poll_interval,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/retrieve/v1/{}", self.credentials.url, path)
    }

    fn submit(&self, dataset: &str, request: &RequestDescriptor) -> Result<JobStatus> {
        let url = self.api_url(&format!("processes/{}/execution", dataset));
        debug!(%url, "Submitting request");

        let response = self
            .http
            .post(&url)
            .header(TOKEN_HEADER, &self.credentials.key)
            .json(&serde_json::json!({ "inputs": request }))
            .send()?;

        Ok(check_status(response)?.json()?)
    }

    fn wait_for(&self, mut job: JobStatus) -> Result<JobStatus> {
        loop {
            match job.status.as_str() {
                "accepted" | "running" => {
                    debug!(job = %job.job_id, status = %job.status, "Waiting for job");
                    thread::sleep(self.poll_interval);
                    let response = self
                        .http
                        .get(self.api_url(&format!("jobs/{}", job.job_id)))
                        .header(TOKEN_HEADER, &self.credentials.key)
                        .send()?;
                    job = check_status(response)?.json()?;
                }
                _ => return Ok(job),
            }
        }
    }

    fn results(&self, job: &JobStatus) -> Result<JobResults> {
        let response = self
            .http
            .get(self.api_url(&format!("jobs/{}/results", job.job_id)))
            .header(TOKEN_HEADER, &self.credentials.key)
            .send()?;

        Ok(check_status(response)?.json()?)
    }
}

impl DataProvider for AdsClient {
    type Handle = AdsJob;

    fn retrieve(&self, dataset: &str, request: &RequestDescriptor) -> Result<AdsJob> {
        let job = self.wait_for(self.submit(dataset, request)?)?;
        info!(job = %job.job_id, status = %job.status, "Job finished");

        // Failed jobs answer the results call with a problem document.
        let results = self.results(&job)?;
        if job.status != "successful" {
            return Err(ProcessingError::Provider(format!(
                "job {} ended with status '{}'",
                job.job_id, job.status
            )));
        }

        Ok(AdsJob {
            http: self.http.clone(),
            href: results.asset.value.href,
        })
    }
}

/// Finished job with a downloadable bundle.
#[derive(Debug)]
pub struct AdsJob {
    http: Client,
    href: String,
}

impl RetrievalHandle for AdsJob {
    fn download(&self, path: &Path) -> Result<u64> {
        info!(href = %self.href, path = %path.display(), "Downloading bundle");
        let mut response = check_status(self.http.get(&self.href).send()?)?;

        let mut writer = BufWriter::new(File::create(path)?);
        let bytes = response.copy_to(&mut writer)?;
        writer.flush()?;

        Ok(bytes)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(classify_failure(status, &body))
}

/// Provider failures become `SizeLimit` when they signal an oversized request.
fn classify_failure(status: StatusCode, body: &str) -> ProcessingError {
    let problem: ApiProblem = serde_json::from_str(body).unwrap_or_default();
    let detail = problem
        .detail
        .or(problem.title)
        .unwrap_or_else(|| body.trim().to_string());
    let message = format!("{} {}", status, detail);

    let error = ProcessingError::Provider(message);
    if status == StatusCode::FORBIDDEN || error.is_size_limit() {
        match error {
            ProcessingError::Provider(message) => ProcessingError::SizeLimit(message),
            other => other,
        }
    } else {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_forbidden_as_size_limit() {
        let error = classify_failure(
            StatusCode::FORBIDDEN,
            r#"{"title": "Forbidden", "detail": "Your request exceeds the cost limits"}"#,
        );
        assert!(matches!(error, ProcessingError::SizeLimit(_)));
        assert!(error.to_string().contains("cost limits"));
    }

    #[test]
    fn test_classify_too_large_message() {
        let error = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"title": "Bad request", "detail": "Request too large. Please split it."}"#,
        );
        assert!(error.is_size_limit());
    }

    #[test]
    fn test_classify_other_failures() {
        let error = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        assert!(matches!(error, ProcessingError::Provider(ref m) if m.contains("upstream exploded")));
        assert!(!error.is_size_limit());
    }

    #[test]
    fn test_job_status_deserialization() {
        let job: JobStatus =
            serde_json::from_str(r#"{"jobID": "abc", "status": "running", "type": "process"}"#)
                .unwrap();
        assert_eq!(job.job_id, "abc");
        assert_eq!(job.status, "running");

        let results: JobResults = serde_json::from_str(
            r#"{"asset": {"value": {"href": "https://download.example/x.zip", "type": "application/zip"}}}"#,
        )
        .unwrap();
        assert_eq!(results.asset.value.href, "https://download.example/x.zip");
    }

    #[test]
    fn test_api_url() {
        let credentials = ProviderCredentials::new("https://example.org/api/", Some("k")).unwrap();
        let client = AdsClient::new(credentials, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.api_url("jobs/1"),
            "https://example.org/api/retrieve/v1/jobs/1"
        );
    }
}
