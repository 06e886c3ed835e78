use futures::StreamExt;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use vidfetch_resolver_api::reqwest::Response;
use vidfetch_resolver_api::{ResolveContext, ResolveError};

pub struct HTTPDownloader {}

impl HTTPDownloader {
    pub fn new() -> Self {
        Self {}
    }

    /// Streams `url` into `output`, going through a `.part` file so a failed
    /// transfer never leaves something that looks complete. Returns bytes written.
    ///
    /// There is no overall deadline; the transfer fails once no data arrived
    /// for the configured timeout.
    pub async fn download_to<P>(
        &self,
        ctx: &ResolveContext,
        url: &str,
        output: P,
    ) -> Result<u64, ResolveError>
    where
        P: AsRef<Path>,
    {
        let output = output.as_ref();
        let fetch_url = ctx.proxied(url);
        tracing::debug!(%fetch_url, output = %output.display(), "starting download");

        let response = ctx
            .send_request("download", ctx.http.get(&fetch_url))
            .await
            .map_err(|e| ResolveError::Download(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Download(format!(
                "Fetch failed: {}",
                status.as_u16()
            )));
        }

        let part = output.with_extension(match output.extension() {
            Some(ext) => format!("{}.part", ext.to_string_lossy()),
            None => "part".to_string(),
        });

        let written = match write_part(ctx, response, &part).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&part).await;
                return Err(e);
            }
        };
        if let Err(e) = fs::rename(&part, output).await {
            let _ = fs::remove_file(&part).await;
            return Err(io_error(e));
        }

        Ok(written)
    }
}

async fn write_part(
    ctx: &ResolveContext,
    response: Response,
    part: &Path,
) -> Result<u64, ResolveError> {
    let stall = ctx.config.timeout();
    let mut file = fs::File::create(part).await.map_err(io_error)?;
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    loop {
        let chunk = match timeout(stall, stream.next()).await {
            Ok(Some(chunk)) => chunk.map_err(|e| ResolveError::Download(e.to_string()))?,
            Ok(None) => break,
            Err(_) => {
                return Err(ResolveError::Download(format!(
                    "Download stalled: no data for {}s",
                    stall.as_secs()
                )))
            }
        };
        file.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;
    Ok(written)
}

fn io_error(e: std::io::Error) -> ResolveError {
    ResolveError::Download(e.to_string())
}
