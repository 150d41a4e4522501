// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dispatch adapter. The pipeline hands a finished artifact to a
// `PrintDispatcher` and never talks to a printer itself; the network
// implementation below speaks raw TCP (JetDirect, port 9100) for
// printer-native command streams and LPR (RFC 1179, port 515) for normal
// queue submission.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

use labelwerk_core::JobId;
use labelwerk_core::error::{LabelwerkError, Result};

/// Default deadline for one complete dispatch operation.
const DISPATCH_TIMEOUT_SECS: u64 = 30;

/// Named options for queue submission.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Job name shown in the queue.
    pub job_name: String,
    /// Ask the queue to scale the document to the medium ("fit-to-page").
    pub fit_to_page: bool,
}

/// Contract between the pipeline and the physical print path.
///
/// Injected into the pipeline so the same state machine drives a real
/// printer in production and a recording double in tests.
pub trait PrintDispatcher {
    /// Deliver a printer-native byte stream in raw mode.
    fn send_raw(&self, data: &[u8]) -> impl Future<Output = Result<JobId>> + Send;

    /// Submit a finished document file to the print queue.
    fn send_file(
        &self,
        path: &Path,
        options: &DispatchOptions,
    ) -> impl Future<Output = Result<JobId>> + Send;
}

/// Dispatcher talking to a network label printer.
///
/// The deadline covers the whole operation, connect through final ack; a
/// printer that accepts the connection and then stalls still fails within
/// the configured timeout.
#[derive(Debug, Clone)]
pub struct NetworkDispatcher {
    host: String,
    raw_port: u16,
    lpr_port: u16,
    queue: String,
    timeout: Duration,
}

impl NetworkDispatcher {
    pub fn new(host: impl Into<String>, raw_port: u16, lpr_port: u16, queue: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            raw_port,
            lpr_port,
            queue: queue.into(),
            timeout: Duration::from_secs(DISPATCH_TIMEOUT_SECS),
        }
    }

    /// Override the per-operation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connect(&self, port: u16) -> Result<TcpStream> {
        let addr = format!("{}:{}", self.host, port);
        TcpStream::connect(&addr)
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("connect to {}: {}", addr, err)))
    }

    /// Raw mode: open a socket and dump the bytes. The printer must
    /// understand the stream natively — no negotiation, no feedback.
    async fn deliver_raw(&self, data: &[u8]) -> Result<JobId> {
        let mut stream = self.connect(self.raw_port).await?;

        stream
            .write_all(data)
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("raw send: {}", err)))?;
        stream
            .flush()
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("raw flush: {}", err)))?;
        stream
            .shutdown()
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("raw shutdown: {}", err)))?;

        let job_id = JobId::new();
        info!(%job_id, total = data.len(), "raw stream delivered");
        Ok(job_id)
    }

    /// Queue submission via a minimal RFC 1179 client: receive-job command,
    /// control file with the job metadata, then the data file.
    async fn submit_queue_job(&self, path: &Path, options: &DispatchOptions) -> Result<JobId> {
        let document = tokio::fs::read(path).await.map_err(|err| {
            LabelwerkError::Dispatch(format!("cannot read {}: {}", path.display(), err))
        })?;

        if options.fit_to_page {
            // LPR carries no rendering options on the wire; queues configured
            // for label media apply fit-to-page themselves.
            debug!("fit-to-page hint requested for queue submission");
        }

        let mut stream = self.connect(self.lpr_port).await?;

        let receive_job = format!("\x02{}\n", self.queue);
        stream
            .write_all(receive_job.as_bytes())
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR receive-job: {}", err)))?;
        expect_ack(&mut stream, "receive-job").await?;

        let hostname = "labelwerk";
        let job_num = 1;
        let control_file = format!(
            "H{hostname}\nP{hostname}\nJ{job}\nldfA{job_num:03}{hostname}\nUdfA{job_num:03}{hostname}\nN{job}\n",
            job = options.job_name,
        );

        let control_header =
            format!("\x02{} cfA{:03}{}\n", control_file.len(), job_num, hostname);
        stream
            .write_all(control_header.as_bytes())
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR control header: {}", err)))?;
        expect_ack(&mut stream, "control header").await?;

        stream
            .write_all(control_file.as_bytes())
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR control file: {}", err)))?;
        stream
            .write_all(&[0])
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR control terminator: {}", err)))?;
        expect_ack(&mut stream, "control file").await?;

        let data_header = format!("\x03{} dfA{:03}{}\n", document.len(), job_num, hostname);
        stream
            .write_all(data_header.as_bytes())
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR data header: {}", err)))?;
        expect_ack(&mut stream, "data header").await?;

        stream
            .write_all(&document)
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR data send: {}", err)))?;
        stream
            .write_all(&[0])
            .await
            .map_err(|err| LabelwerkError::Dispatch(format!("LPR data terminator: {}", err)))?;

        // Some printers return a non-zero final ack even after accepting the
        // job; log it rather than failing a job that already transferred.
        let mut ack = [0u8; 1];
        match stream.read_exact(&mut ack).await {
            Ok(_) if ack[0] != 0 => warn!("printer returned non-zero final ack"),
            Ok(_) => {}
            Err(err) => warn!(%err, "no final ack after data transfer"),
        }

        let job_id = JobId::new();
        info!(%job_id, queue = %self.queue, job = %options.job_name, "queue job submitted");
        Ok(job_id)
    }
}

impl PrintDispatcher for NetworkDispatcher {
    #[instrument(skip_all, fields(host = %self.host, bytes = data.len()))]
    async fn send_raw(&self, data: &[u8]) -> Result<JobId> {
        tokio::time::timeout(self.timeout, self.deliver_raw(data))
            .await
            .map_err(|_| {
                LabelwerkError::Dispatch(format!(
                    "raw dispatch to {}:{} timed out after {:?}",
                    self.host, self.raw_port, self.timeout
                ))
            })?
    }

    #[instrument(skip_all, fields(host = %self.host, path = %path.display()))]
    async fn send_file(&self, path: &Path, options: &DispatchOptions) -> Result<JobId> {
        tokio::time::timeout(self.timeout, self.submit_queue_job(path, options))
            .await
            .map_err(|_| {
                LabelwerkError::Dispatch(format!(
                    "queue submission to {}:{} timed out after {:?}",
                    self.host, self.lpr_port, self.timeout
                ))
            })?
    }
}

async fn expect_ack(stream: &mut TcpStream, what: &str) -> Result<()> {
    let mut ack = [0u8; 1];
    stream
        .read_exact(&mut ack)
        .await
        .map_err(|err| LabelwerkError::Dispatch(format!("LPR {} ack: {}", what, err)))?;
    if ack[0] != 0 {
        return Err(LabelwerkError::Dispatch(format!(
            "printer rejected LPR {} (ack {})",
            what, ack[0]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    #[tokio::test]
    async fn stalled_queue_submission_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept the connection, then never acknowledge anything — the
        // wedged-printer case.
        let hold = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.pdf");
        std::fs::write(&path, b"%PDF-data").unwrap();

        let dispatcher = NetworkDispatcher::new("127.0.0.1", 9, port, "lp")
            .with_timeout(Duration::from_millis(100));
        let options = DispatchOptions {
            job_name: "label.pdf".into(),
            fit_to_page: false,
        };

        match dispatcher.send_file(&path, &options).await {
            Err(LabelwerkError::Dispatch(msg)) => {
                assert!(msg.contains("timed out"), "unexpected error: {}", msg);
            }
            other => panic!("expected a dispatch timeout, got {:?}", other),
        }
        hold.abort();
    }

    #[tokio::test]
    async fn stalled_raw_delivery_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept but never read; a large payload cannot drain into the
        // socket buffer, so the write itself must hit the deadline.
        let hold = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let dispatcher = NetworkDispatcher::new("127.0.0.1", port, 9, "lp")
            .with_timeout(Duration::from_millis(100));
        let payload = vec![0u8; 64 * 1024 * 1024];

        match dispatcher.send_raw(&payload).await {
            Err(LabelwerkError::Dispatch(msg)) => {
                assert!(msg.contains("timed out"), "unexpected error: {}", msg);
            }
            other => panic!("expected a dispatch timeout, got {:?}", other),
        }
        hold.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_a_dispatch_error() {
        // Bind a listener to reserve a free port, then drop it so nothing
        // accepts there.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dispatcher = NetworkDispatcher::new("127.0.0.1", port, port, "lp")
            .with_timeout(Duration::from_millis(500));
        let result = dispatcher.send_raw(b"^XA^XZ").await;
        assert!(matches!(result, Err(LabelwerkError::Dispatch(_))));
    }
}
