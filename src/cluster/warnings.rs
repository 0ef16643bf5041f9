//! API server warning handling
//!
//! The API server attaches `Warning` headers to responses, e.g. when a
//! request uses a deprecated API version. A [`WarningLayer`] on the kube
//! client forwards them to the process-wide default [`WarningHandler`].

use http::header::{HeaderMap, WARNING};
use http::{Request, Response};
use nu_ansi_term::Color;
use std::collections::HashSet;
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::pin::Pin;
use std::sync::{Arc, Mutex, RwLock};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Warn-agent code used for all Kubernetes API warnings
const MISC_PERSISTENT_WARNING: u16 = 299;

/// Receives warnings sent by the API server
pub trait WarningHandler: Send + Sync {
    fn handle_warning(&self, message: &str);
}

/// Handler used until one is installed: routes warnings to the log
struct LogWarnings;

impl WarningHandler for LogWarnings {
    fn handle_warning(&self, message: &str) {
        log::warn!("{}", message);
    }
}

static DEFAULT_HANDLER: RwLock<Option<Arc<dyn WarningHandler>>> = RwLock::new(None);

/// Install the process-wide warning handler
pub fn set_default_handler(handler: Arc<dyn WarningHandler>) {
    let mut slot = DEFAULT_HANDLER.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(handler);
}

/// Currently installed warning handler
pub fn default_handler() -> Arc<dyn WarningHandler> {
    let slot = DEFAULT_HANDLER.read().unwrap_or_else(|e| e.into_inner());
    slot.clone().unwrap_or_else(|| Arc::new(LogWarnings))
}

/// Options for [`WarningWriter`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WarningWriterOptions {
    /// Print each distinct message only once
    pub deduplicate: bool,
    /// Highlight the `Warning:` prefix
    pub color: bool,
}

/// Writes warnings to an output stream, one `Warning: <message>` per line
pub struct WarningWriter<W: Write + Send> {
    out: Mutex<W>,
    options: WarningWriterOptions,
    written: Mutex<HashSet<String>>,
}

impl<W: Write + Send> WarningWriter<W> {
    pub fn new(out: W, options: WarningWriterOptions) -> Self {
        Self {
            out: Mutex::new(out),
            options,
            written: Mutex::new(HashSet::new()),
        }
    }

    /// Consume the writer and return the underlying stream
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> WarningHandler for WarningWriter<W> {
    fn handle_warning(&self, message: &str) {
        if self.options.deduplicate {
            let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());
            if !written.insert(message.to_string()) {
                return;
            }
        }

        let prefix = if self.options.color {
            Color::Yellow.bold().paint("Warning:").to_string()
        } else {
            "Warning:".to_string()
        };

        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{} {}", prefix, message) {
            log::debug!("failed to write API warning: {}", e);
        }
    }
}

/// Whether colored output should be written to `stream`
pub fn allows_color_output<S: IsTerminal>(stream: &S) -> bool {
    if !stream.is_terminal() {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
}

/// Extract warning texts from `Warning` headers
///
/// Each header value may hold several comma-separated warnings of the form
/// `<code> <agent> "<text>" ["<date>"]`. Only code 299 warnings are returned.
pub fn parse_warning_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(WARNING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_warning_value)
        .collect()
}

fn parse_warning_value(value: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut rest = value.trim();

    while !rest.is_empty() {
        match parse_one_warning(rest) {
            Some((code, text, remainder)) => {
                if code == MISC_PERSISTENT_WARNING {
                    warnings.push(text);
                }
                rest = remainder.trim_start();
                rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
            }
            None => {
                log::debug!("ignoring malformed Warning header: {:?}", value);
                break;
            }
        }
    }

    warnings
}

/// Parse `code agent "text" ["date"]`, returning the rest of the input
fn parse_one_warning(input: &str) -> Option<(u16, String, &str)> {
    let (code, rest) = input.split_once(' ')?;
    let code: u16 = code.parse().ok()?;
    let (_agent, rest) = rest.trim_start().split_once(' ')?;
    let (text, mut rest) = parse_quoted(rest.trim_start())?;

    // Optional quoted date
    let trimmed = rest.trim_start();
    if trimmed.starts_with('"') {
        let (_date, after) = parse_quoted(trimmed)?;
        rest = after;
    }

    Some((code, text, rest))
}

fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('"')?;
    let mut text = String::new();
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if escaped {
            text.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some((text, &body[i + 1..]));
        } else {
            text.push(c);
        }
    }

    None
}

/// Tower layer reporting response warnings to a handler
#[derive(Clone)]
pub struct WarningLayer {
    handler: Arc<dyn WarningHandler>,
}

impl WarningLayer {
    pub fn new(handler: Arc<dyn WarningHandler>) -> Self {
        Self { handler }
    }
}

impl<S> Layer<S> for WarningLayer {
    type Service = WarningService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        WarningService {
            inner,
            handler: self.handler.clone(),
        }
    }
}

/// Service produced by [`WarningLayer`]
#[derive(Clone)]
pub struct WarningService<S> {
    inner: S,
    handler: Arc<dyn WarningHandler>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for WarningService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let fut = self.inner.call(req);
        let handler = self.handler.clone();

        Box::pin(async move {
            let res = fut.await?;
            for warning in parse_warning_headers(res.headers()) {
                handler.handle_warning(&warning);
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl WarningHandler for Collect {
        fn handle_warning(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn headers(values: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(WARNING, HeaderValue::from_str(v).unwrap());
        }
        map
    }

    #[test]
    fn test_parse_single_warning() {
        let map = headers(&[
            r#"299 - "extensions/v1beta1 Ingress is deprecated in v1.14+, unavailable in v1.22+""#,
        ]);
        assert_eq!(
            parse_warning_headers(&map),
            vec!["extensions/v1beta1 Ingress is deprecated in v1.14+, unavailable in v1.22+"]
        );
    }

    #[test]
    fn test_parse_multiple_values_and_escapes() {
        let map = headers(&[
            r#"299 - "first \"quoted\"", 299 kube-apiserver "second" "Tue, 15 Nov 1994 08:12:31 GMT""#,
            r#"199 - "not a kubernetes warning""#,
        ]);
        assert_eq!(
            parse_warning_headers(&map),
            vec![r#"first "quoted""#.to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_parse_malformed() {
        let map = headers(&["garbage", r#"299 - "unterminated"#]);
        assert!(parse_warning_headers(&map).is_empty());
    }

    #[test]
    fn test_writer_deduplicates() {
        let writer = WarningWriter::new(
            Vec::new(),
            WarningWriterOptions {
                deduplicate: true,
                color: false,
            },
        );
        writer.handle_warning("deprecated");
        writer.handle_warning("deprecated");
        writer.handle_warning("other");

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "Warning: deprecated\nWarning: other\n");
    }

    #[test]
    fn test_writer_without_dedup_and_with_color() {
        let writer = WarningWriter::new(
            Vec::new(),
            WarningWriterOptions {
                deduplicate: false,
                color: true,
            },
        );
        writer.handle_warning("again");
        writer.handle_warning("again");

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out.matches("again").count(), 2);
        assert!(out.contains("\u{1b}["));
    }

    #[tokio::test]
    async fn test_layer_forwards_warnings() {
        let collect = Arc::new(Collect::default());
        let inner = service_fn(|_req: Request<()>| async {
            Ok::<_, Infallible>(
                Response::builder()
                    .header(WARNING, r#"299 - "apps/v1beta1 is deprecated""#)
                    .body("ok")
                    .unwrap(),
            )
        });
        let service = WarningLayer::new(collect.clone()).layer(inner);

        let res = service
            .oneshot(Request::new(()))
            .await
            .unwrap();

        assert_eq!(*res.body(), "ok");
        assert_eq!(
            *collect.0.lock().unwrap(),
            vec!["apps/v1beta1 is deprecated".to_string()]
        );
    }
}
