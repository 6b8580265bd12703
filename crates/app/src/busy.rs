//! Blocking "working" indicator for mutating calls.

use std::{future::Future, io::Write, time::Duration};

/// Awaits `fut` behind an indicator on stderr.
///
/// After `timeout` the indicator is released with a warning, but the request
/// keeps being awaited: it is never cancelled.
pub async fn busy<F: Future>(label: &str, timeout: Duration, fut: F) -> F::Output {
    busy_with(&mut std::io::stderr(), label, timeout, fut).await
}

async fn busy_with<W: Write, F: Future>(out: &mut W, label: &str, timeout: Duration, fut: F) -> F::Output {
    let _ = write!(out, "{label}... ");
    let _ = out.flush();

    tokio::pin!(fut);
    let output = tokio::select! {
        output = &mut fut => output,
        () = tokio::time::sleep(timeout) => {
            tracing::warn!("{label} is taking longer than {}s", timeout.as_secs());
            let _ = writeln!(out, "still waiting for the server, do not repeat the action");
            let _ = out.flush();
            fut.await
        }
    };
    let _ = writeln!(out, "done");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fast_calls_finish_quietly() {
        let mut out = Vec::new();
        let value = busy_with(&mut out, "saving", Duration::from_secs(5), async { 7 }).await;
        assert_eq!(value, 7);
        assert_eq!(String::from_utf8(out).unwrap(), "saving... done\n");
    }

    #[tokio::test]
    async fn slow_calls_release_the_indicator_but_complete() {
        let mut out = Vec::new();
        let value = busy_with(&mut out, "saving", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            "committed"
        })
        .await;
        assert_eq!(value, "committed");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("still waiting"));
        assert!(text.ends_with("done\n"));
    }
}
