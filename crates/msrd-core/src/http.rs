//! Blocking HTTP GET helpers over libcurl.
//!
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

use anyhow::{Context, Result};
use std::io::Write;
use std::time::Duration;

use crate::storage::PartFile;

/// Connection settings shared by every request.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub transfer_timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(3600),
        }
    }
}

fn configure(easy: &mut curl::easy::Easy, url: &str, opts: HttpOptions) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(opts.transfer_timeout)?;
    easy.useragent(concat!("msrd/", env!("CARGO_PKG_VERSION")))?;
    Ok(())
}

/// GET `url` into memory. Returns the HTTP status and body; the caller decides what a non-2xx means.
pub fn get_bytes(url: &str, opts: HttpOptions) -> Result<(u32, Vec<u8>), curl::Error> {
    let mut body = Vec::new();
    let mut easy = curl::easy::Easy::new();
    configure(&mut easy, url, opts)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    let code = easy.response_code()?;
    Ok((code, body))
}

/// Streams `url` into `part` sequentially. Returns the number of bytes written.
///
/// The part file is left in place on failure; the caller discards it.
pub fn download_to(url: &str, part: &mut PartFile, opts: HttpOptions) -> Result<u64> {
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    configure(&mut easy, url, opts).context("invalid request")?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match part.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_err {
        return Err(e).context("writing download to disk");
    }
    performed.context("GET request failed")?;

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    Ok(written)
}
