use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::result::{ProbeBody, ProbeResponse};
use reqwest::{Client, Response, header};
use tracing::debug;
use url::Url;

/// Issues one bounded GET per (candidate, path) pair.
///
/// Redirects are never followed: a 3xx is itself a classifiable response and
/// its `Location` is reported alongside the verdict.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    body_size_ceiling: usize,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self::with_client(client, config.body_size_ceiling))
    }

    /// Use a caller-built client. The client's own timeout applies.
    pub fn with_client(client: Client, body_size_ceiling: usize) -> Self {
        Self {
            client,
            body_size_ceiling,
        }
    }

    pub async fn probe(
        &self,
        base_url: &str,
        path: &str,
    ) -> std::result::Result<ProbeResponse, ProbeError> {
        let url = build_probe_url(base_url, path)?;
        debug!("Probing {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(&url, e))?;

        let status = response.status();
        let location = if status.is_redirection() {
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        } else {
            None
        };

        let body = if status.is_success() || status.is_redirection() {
            self.read_capped(response, &url).await?
        } else {
            debug!("{} answered {}, skipping body", url, status.as_u16());
            ProbeBody::Skipped
        };

        Ok(ProbeResponse {
            url,
            status_code: status.as_u16(),
            location,
            body,
        })
    }

    /// Read the body chunk by chunk, giving up as soon as the ceiling is passed.
    async fn read_capped(
        &self,
        mut response: Response,
        url: &str,
    ) -> std::result::Result<ProbeBody, ProbeError> {
        if let Some(declared) = response.content_length()
            && declared > self.body_size_ceiling as u64
        {
            debug!("{} declares {} bytes, over ceiling", url, declared);
            return Ok(ProbeBody::Oversized(usize::try_from(declared).unwrap_or(usize::MAX)));
        }

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProbeError::from_reqwest(url, e))?
        {
            if buf.len() + chunk.len() > self.body_size_ceiling {
                debug!("{} body passed {} bytes, over ceiling", url, self.body_size_ceiling);
                return Ok(ProbeBody::Oversized(buf.len() + chunk.len()));
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(ProbeBody::Text(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Join a candidate base URL and a path suffix with exactly one separator.
pub fn build_probe_url(base_url: &str, path: &str) -> std::result::Result<String, ProbeError> {
    let mut url =
        Url::parse(base_url).map_err(|_| ProbeError::InvalidTarget(base_url.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ProbeError::InvalidTarget(base_url.to_string()));
    }

    let current_path = url.path().to_string();
    let path_base = if current_path.ends_with('/') {
        current_path
    } else {
        format!("{}/", current_path)
    };

    url.set_path(&format!("{}{}", path_base, path.trim_start_matches('/')));
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.to_string())
}
