//! Dispatch a request and race it against a timer-fired cancellation token.
//!
//! # Design
//! `execute` runs the round trip and the timer as two independent tasks and
//! waits on a oneshot channel for the single result. The round trip is
//! raced against `CancellationToken::cancelled`; when the token wins, the
//! in-flight reqwest future is dropped, which closes the connection.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::RequestError;
use crate::http::{HttpRequest, HttpResponse};

/// Sends `HttpRequest`s through a caller-supplied `reqwest::Client`.
///
/// Cloning is cheap; clones share the client's connection pool.
#[derive(Debug, Clone)]
pub struct Requester {
    client: reqwest::Client,
}

impl Requester {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Perform one round trip unless `token` fires first.
    ///
    /// The whole body is read before returning. Non-2xx statuses are not
    /// errors here.
    pub async fn send(
        &self,
        request: &HttpRequest,
        token: &CancellationToken,
    ) -> Result<HttpResponse, RequestError> {
        tracing::info!(method = %request.method, url = %request.url, "start request");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(RequestError::Cancelled),
            result = self.round_trip(request) => result,
        };

        match &result {
            Ok(response) => tracing::info!(
                status = response.status,
                bytes = response.body.len(),
                "end request"
            ),
            Err(err) => tracing::warn!(error = %err, "error request"),
        }
        result
    }

    /// Dispatch `request` in the background and cancel it once
    /// `cancel_after` has elapsed. Returns the response body, or the error
    /// that ended the request.
    ///
    /// Dropping the returned future cancels the in-flight request.
    pub async fn execute(
        &self,
        request: HttpRequest,
        cancel_after: Duration,
    ) -> Result<Bytes, RequestError> {
        self.execute_with(request, CancellationToken::new(), cancel_after)
            .await
    }

    /// Like [`Requester::execute`], but bound to a caller-owned `token` that
    /// may also be fired from outside. The token is cancelled when the
    /// returned future completes or is dropped.
    pub async fn execute_with(
        &self,
        request: HttpRequest,
        token: CancellationToken,
        cancel_after: Duration,
    ) -> Result<Bytes, RequestError> {
        let _guard = token.clone().drop_guard();
        let (tx, rx) = oneshot::channel();

        let requester = self.clone();
        let request_token = token.clone();
        tokio::spawn(async move {
            let result = requester
                .send(&request, &request_token)
                .await
                .map(|response| response.body);
            if tx.send(result).is_err() {
                tracing::debug!("caller went away before the result was delivered");
            }
        });

        let timer = tokio::spawn(cancel_after_delay(token.clone(), cancel_after));

        let result = receive(rx).await;
        timer.abort();
        result
    }

    async fn round_trip(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Wait for the request task's single result. A sender dropped without
/// sending is reported, never swallowed.
async fn receive(
    rx: oneshot::Receiver<Result<Bytes, RequestError>>,
) -> Result<Bytes, RequestError> {
    rx.await.unwrap_or(Err(RequestError::Abandoned))
}

/// Fire `token` after `delay`. Returns early if someone else fires it first.
pub async fn cancel_after_delay(token: CancellationToken, delay: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {
            tracing::info!(after_ms = delay.as_millis() as u64, "cancelling request");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester() -> Requester {
        Requester::new(reqwest::Client::new())
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        // nothing listens on the discard port; the token must win anyway
        let request = HttpRequest::form_post("http://127.0.0.1:9/", &[("token", "x")]).unwrap();

        let err = requester().send(&request, &token).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn cancelling_twice_is_harmless() {
        let token = CancellationToken::new();
        let child = token.child_token();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_delay() {
        let token = CancellationToken::new();
        let timer = tokio::spawn(cancel_after_delay(token.clone(), Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(!token.is_cancelled());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(token.is_cancelled());
        timer.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_sender_is_abandoned() {
        let (tx, rx) = oneshot::channel::<Result<Bytes, RequestError>>();
        drop(tx);
        assert!(matches!(receive(rx).await, Err(RequestError::Abandoned)));
    }

    #[tokio::test]
    async fn delivered_result_is_passed_through() {
        let (tx, rx) = oneshot::channel();
        tx.send(Ok(Bytes::from_static(b"hi"))).unwrap();
        assert_eq!(&receive(rx).await.unwrap()[..], b"hi");
    }

    #[tokio::test]
    async fn panicking_request_task_is_abandoned() {
        let (tx, rx) = oneshot::channel::<Result<Bytes, RequestError>>();
        let task = tokio::spawn(async move {
            let _tx = tx;
            panic!("request task blew up");
        });
        assert!(task.await.is_err());
        assert!(matches!(receive(rx).await, Err(RequestError::Abandoned)));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_exits_when_token_fired_elsewhere() {
        let token = CancellationToken::new();
        let timer = tokio::spawn(cancel_after_delay(token.clone(), Duration::from_secs(3600)));
        token.cancel();
        timer.await.unwrap();
    }
}
