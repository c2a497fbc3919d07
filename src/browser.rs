use crate::constants::{READY_ATTRIBUTE, READY_POLL_INTERVAL_MS};
use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// headless browser session used to sample canvas output
///
/// one tab is reused for the whole run; each generation navigates it to a
/// fresh page load
pub struct Capturer {
    // kept alive for the tab's lifetime, closed on drop
    _browser: Browser,
    tab: Arc<Tab>,
    wait: Duration,
}

impl Capturer {
    /// launch a headless browser with one tab
    pub fn launch(wait: Duration) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((1280, 960)))
            .build()
            .map_err(|e| anyhow!("failed to build browser launch options: {e}"))?;
        let browser = Browser::new(options).context("failed to launch headless browser")?;
        let tab = browser.new_tab().context("failed to open browser tab")?;
        Ok(Self {
            _browser: browser,
            tab,
            wait,
        })
    }

    /// navigate the tab to a fresh page load
    pub fn load(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("failed to navigate to {url}"))?;
        self.tab
            .wait_until_navigated()
            .context("page never finished navigating")?;
        Ok(())
    }

    /// sample the first canvas on the page as PNG bytes
    ///
    /// returns None when the page has no canvas element
    pub fn sample_canvas(&self) -> Result<Option<Vec<u8>>> {
        self.wait_for_frame();

        let Ok(canvas) = self.tab.find_element("canvas") else {
            return Ok(None);
        };

        let args: Vec<serde_json::Value> = Vec::new();
        let exported = canvas
            .call_js_fn(
                "function() { return this.toDataURL('image/png'); }",
                args,
                false,
            )
            .context("failed to export canvas")?;
        let data_url = exported
            .value
            .and_then(|value| value.as_str().map(str::to_string))
            .context("canvas export returned no data")?;

        Ok(Some(decode_data_url(&data_url)?))
    }

    /// wait for the page to mark itself ready, or for the fixed delay to
    /// elapse
    ///
    /// pages may set the `data-capture-ready` attribute on the document
    /// element once a frame is complete; without it the fixed delay is only
    /// an approximation and a slow page can still be mid-render when sampled.
    /// the attribute is cleared after each wait, so multi-slide pages must
    /// set it again per frame or every subsequent slide waits the full delay
    fn wait_for_frame(&self) {
        let probe = format!("document.documentElement.hasAttribute('{READY_ATTRIBUTE}')");
        poll_until(
            self.wait,
            Duration::from_millis(READY_POLL_INTERVAL_MS),
            || {
                self.tab
                    .evaluate(&probe, false)
                    .ok()
                    .and_then(|result| result.value)
                    .and_then(|value| value.as_bool())
                    .unwrap_or(false)
            },
        );

        // re-arm the signal for the next slide's wait
        let clear = format!("document.documentElement.removeAttribute('{READY_ATTRIBUTE}')");
        let _ = self.tab.evaluate(&clear, false);
    }
}

/// poll `ready` at the given interval until it reports true or `wait` has
/// elapsed; returns whether readiness was signalled
fn poll_until(wait: Duration, interval: Duration, mut ready: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + wait;
    loop {
        if ready() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(interval);
    }
}

/// strip the `data:<mime>;base64,` header and decode the payload
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let (header, payload) = data_url
        .split_once(',')
        .context("malformed data url: no payload")?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        bail!("unsupported data url header: {header}");
    }
    STANDARD
        .decode(payload)
        .context("failed to base64-decode canvas payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// encode a tiny rgba png with known dimensions
    fn make_png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let pixels = vec![0xff; (width * height * 4) as usize];
            writer.write_image_data(&pixels).unwrap();
        }
        bytes
    }

    #[test]
    fn test_decode_round_trips_png_dimensions() {
        let original = make_png(3, 2);
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(&original));

        let decoded = decode_data_url(&data_url).unwrap();
        assert_eq!(decoded, original);

        // re-decode the png and verify the pixel dimensions survived
        let decoder = png::Decoder::new(&decoded[..]);
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 3);
        assert_eq!(reader.info().height, 2);
    }

    #[test]
    fn test_decode_rejects_missing_payload() {
        assert!(decode_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn test_decode_rejects_non_base64_header() {
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(decode_data_url("data:image/png;base64,!!!not-base64!!!").is_err());
    }

    #[test]
    fn test_poll_until_returns_on_ready() {
        let start = Instant::now();
        let signalled = poll_until(Duration::from_secs(5), Duration::from_millis(10), || true);
        assert!(signalled);
        assert!(start.elapsed() < Duration::from_secs(1), "ready page must not wait");
    }

    #[test]
    fn test_poll_until_retries_until_ready() {
        let mut polls = 0;
        let signalled = poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
            polls += 1;
            polls == 3
        });
        assert!(signalled);
        assert_eq!(polls, 3);
    }

    #[test]
    fn test_poll_until_falls_back_to_fixed_delay() {
        let wait = Duration::from_millis(30);
        let start = Instant::now();
        let signalled = poll_until(wait, Duration::from_millis(5), || false);
        assert!(!signalled);
        assert!(start.elapsed() >= wait, "full delay must elapse when never ready");
    }
}
