//! Single-stream HTTP GET over libcurl.
//!
//! Follows redirects, streams the body to a caller-supplied sink and keeps the
//! header lines of the final response. TLS peer verification is libcurl's
//! default (system CA bundle).

use std::io;
use std::str;

use super::FetchError;
use crate::config::FetchConfig;

/// What the caller needs after the body has been consumed.
#[derive(Debug, Clone)]
pub struct Response {
    /// URL after following redirects.
    pub effective_url: Option<String>,
    /// Header lines of the final response in the redirect chain.
    pub headers: Vec<String>,
}

/// GET `url`, passing each body chunk to `sink`. `extra_headers` are complete
/// header lines (e.g. `"Cookie: a=b"`).
///
/// A sink error aborts the transfer and is returned as [`FetchError::Write`].
pub fn get<F>(
    cfg: &FetchConfig,
    url: &str,
    extra_headers: &[String],
    mut sink: F,
) -> Result<Response, FetchError>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(cfg.connect_timeout())?;
    easy.low_speed_limit(cfg.low_speed_limit_bytes)?;
    easy.low_speed_time(cfg.low_speed_time())?;
    easy.useragent(&cfg.user_agent)?;

    if !extra_headers.is_empty() {
        let mut list = curl::easy::List::new();
        for h in extra_headers {
            list.append(h)?;
        }
        easy.http_headers(list)?;
    }

    let mut headers: Vec<String> = Vec::new();
    let mut sink_error: Option<io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                // Each response in a redirect chain starts with a status line.
                if s.starts_with("HTTP/") {
                    headers.clear();
                }
                let line = s.trim_end();
                if !line.is_empty() {
                    headers.push(line.to_string());
                }
            }
            true
        })?;
        transfer.write_function(|data| match sink(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                sink_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Err(e) = performed {
        return Err(match sink_error {
            Some(io) => FetchError::Write(io),
            None => FetchError::Transport(e),
        });
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http {
            url: url.to_string(),
            code,
        });
    }
    let effective_url = easy.effective_url()?.map(str::to_string);

    Ok(Response {
        effective_url,
        headers,
    })
}

/// Values of every header named `name` (case-insensitive) in `lines`.
pub fn header_values<'a>(lines: &'a [String], name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    lines.iter().filter_map(move |line| {
        let (n, v) = line.split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}
