// Best-effort byte link to the LED controller.
// Writes are fire-and-forget: when the link is down the frame is dropped,
// never queued, and the next tick sends fresh state.

use std::io::Write;
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info, warn};

use crate::error::Error;

pub trait Transport {
    fn is_connected(&self) -> bool;

    /// Try to write all of `bytes`. Returns false if nothing was sent
    /// (not connected) or the write failed.
    fn try_send(&mut self, bytes: &[u8]) -> bool;
}

/// USB/UART serial link via the `serialport` crate.
pub struct SerialTransport {
    path: Option<String>,
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// A disconnected transport; call [`connect`](Self::connect) to open it.
    pub fn new(path: Option<String>, baud_rate: u32) -> Self {
        Self { path, baud_rate, port: None }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn open(&self) -> Result<Box<dyn SerialPort>, Error> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => {
                // No port configured: take the first one the OS reports
                let ports = serialport::available_ports()
                    .map_err(|e| Error::Serial(format!("List ports: {e}")))?;
                ports
                    .into_iter()
                    .next()
                    .map(|p| p.port_name)
                    .ok_or_else(|| Error::Serial("no serial ports found".into()))?
            }
        };

        serialport::new(&path, self.baud_rate)
            .timeout(Duration::from_millis(20))
            .open()
            .map_err(|e| Error::Serial(format!("Open {path}: {e}")))
    }

    /// (Re)open the port. Failure is logged and leaves the link down.
    pub fn connect(&mut self) -> bool {
        match self.open() {
            Ok(port) => {
                let name = port.name().unwrap_or_default();
                info!(port = %name, baud = self.baud_rate, "Serial connected");
                self.port = Some(port);
                true
            }
            Err(e) => {
                warn!(error = %e, "Serial connect failed");
                self.port = None;
                false
            }
        }
    }
}

impl Transport for SerialTransport {
    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn try_send(&mut self, bytes: &[u8]) -> bool {
        let Some(port) = self.port.as_mut() else {
            return false;
        };
        match port.write_all(bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Serial write failed, dropping connection");
                self.port = None;
                false
            }
        }
    }
}

/// Send the color line then the face line. Each is attempted on its own;
/// returns how many of the two went out.
pub fn send_frame<T: Transport + ?Sized>(transport: &mut T, frame_line: &str, face_line: &str) -> usize {
    if !transport.is_connected() {
        return 0;
    }
    let sent = [frame_line, face_line]
        .iter()
        .filter(|line| transport.try_send(line.as_bytes()))
        .count();
    debug!(sent, frame_bytes = frame_line.len(), face_bytes = face_line.len(), "Frame sent");
    sent
}

#[cfg(test)]
pub mod testing {
    use super::Transport;

    /// In-memory transport that records every successful write.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub connected: bool,
        /// Fail writes after this many have succeeded.
        pub fail_after: Option<usize>,
        pub writes: Vec<Vec<u8>>,
    }

    impl Transport for RecordingTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn try_send(&mut self, bytes: &[u8]) -> bool {
            if !self.connected {
                return false;
            }
            if self.fail_after.is_some_and(|n| self.writes.len() >= n) {
                self.connected = false;
                return false;
            }
            self.writes.push(bytes.to_vec());
            true
        }
    }
}
