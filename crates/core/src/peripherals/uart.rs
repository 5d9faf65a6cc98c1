use crate::{LabError, LabResult, ReportSink};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// UART transmitter with DMA-style transfers.
///
/// Each frame is handed to a background transmitter thread; the
/// transfer-complete notification comes back over a channel. `transmit`
/// waits for it, so only one frame is ever in flight.
#[derive(Debug)]
pub struct Uart {
    tx: Option<Sender<Vec<u8>>>,
    done: Receiver<io::Result<usize>>,
    worker: Option<JoinHandle<()>>,
    bytes_sent: u64,
    transfers: u64,
}

impl Uart {
    pub fn new<W: Write + Send + 'static>(mut out: W) -> Self {
        let (tx, rx) = bounded::<Vec<u8>>(1);
        let (done_tx, done) = bounded(1);

        let worker = thread::spawn(move || {
            for frame in rx.iter() {
                let result = out
                    .write_all(&frame)
                    .and_then(|_| out.flush())
                    .map(|_| frame.len());
                if done_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            tx: Some(tx),
            done,
            worker: Some(worker),
            bytes_sent: 0,
            transfers: 0,
        }
    }

    /// Transmitter wired to the host's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Transmitter whose output goes nowhere.
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn transfers(&self) -> u64 {
        self.transfers
    }
}

impl ReportSink for Uart {
    fn transmit(&mut self, text: &str) -> LabResult<()> {
        let tx = self.tx.as_ref().ok_or(LabError::SinkClosed)?;
        tx.send(text.as_bytes().to_vec())
            .map_err(|_| LabError::SinkClosed)?;

        // Transfer complete.
        let written = self.done.recv().map_err(|_| LabError::SinkClosed)??;
        self.bytes_sent += written as u64;
        self.transfers += 1;
        tracing::trace!("UART transfer {} complete: {} bytes", self.transfers, written);
        Ok(())
    }
}

impl Drop for Uart {
    fn drop(&mut self) {
        // Closing the channel stops the transmitter thread.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Sink that records every frame in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    frames: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn text(&self) -> String {
        self.frames().concat()
    }
}

impl ReportSink for Transcript {
    fn transmit(&mut self, text: &str) -> LabResult<()> {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "line down"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_uart_transmit_waits_for_completion() {
        let out = SharedWriter::default();
        let mut uart = Uart::new(out.clone());

        uart.transmit("hello\r\n").unwrap();
        // transmit only returns after the write landed.
        assert_eq!(out.0.lock().unwrap().as_slice(), b"hello\r\n");

        uart.transmit("world\r\n").unwrap();
        assert_eq!(out.0.lock().unwrap().as_slice(), b"hello\r\nworld\r\n");
        assert_eq!(uart.transfers(), 2);
        assert_eq!(uart.bytes_sent(), 14);
    }

    #[test]
    fn test_uart_reports_write_error() {
        let mut uart = Uart::new(BrokenWriter);
        let err = uart.transmit("x").unwrap_err();
        assert!(matches!(err, LabError::TransmitFailed(_)));
        assert_eq!(uart.transfers(), 0);
    }

    #[test]
    fn test_transcript_clones_share_frames() {
        let transcript = Transcript::new();
        let mut sink = transcript.clone();
        sink.transmit("a").unwrap();
        sink.transmit("b").unwrap();
        assert_eq!(transcript.frames(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(transcript.text(), "ab");
    }
}
