// Opening connections and reading one response window from them.
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use crate::config::{config_json, PortParameters};
use crate::error::{Result, ScanError};

/// An open connection whose read timeout can be narrowed between reads.
pub trait SerialLink: Read + Write {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Opens a connection to the device at a given rate. The scanner drops the
/// returned port to close it.
pub trait Connector {
    type Port: SerialLink;

    fn open(&mut self, device: &str, baud_rate: u32, timeout: Duration) -> Result<Self::Port>;
}

pub struct SerialConnector {
    data_bits: DataBits,
    parity: Parity,
    stop_bits: StopBits,
}

impl SerialConnector {
    pub fn new(parameters: &PortParameters) -> Result<SerialConnector> {
        Ok(SerialConnector {
            data_bits: config_json::decode_char_size(parameters.char_size)?,
            parity: config_json::decode_parity(&parameters.parity)?,
            stop_bits: config_json::decode_stop_bits(parameters.stop_bits)?,
        })
    }
}

impl Connector for SerialConnector {
    type Port = Box<dyn SerialPort>;

    fn open(&mut self, device: &str, baud_rate: u32, timeout: Duration) -> Result<Self::Port> {
        serialport::new(device, baud_rate)
            .data_bits(self.data_bits)
            .parity(self.parity)
            .stop_bits(self.stop_bits)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|source| ScanError::Device { baud_rate, source })
    }
}

/// Reads until `limit` bytes have arrived, the port times out or `window`
/// has elapsed. `window` is a total budget: each read only gets what is left
/// of it. A short read is not an error.
pub fn read_response<P: SerialLink + ?Sized>(
    port: &mut P,
    limit: usize,
    window: Duration,
) -> io::Result<Vec<u8>> {
    let deadline = Instant::now()
        .checked_add(window)
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "read window too long"))?;
    let mut buffer = vec![0u8; limit];
    let mut filled = 0;
    while filled < limit {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        port.set_read_timeout(remaining)?;
        match port.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(ref e) if e.kind() == ErrorKind::TimedOut => break,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    buffer.truncate(filled);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::thread;

    impl SerialLink for Cursor<Vec<u8>> {
        fn set_read_timeout(&mut self, _: Duration) -> io::Result<()> {
            Ok(())
        }
    }

    // Hands out its data in fixed chunks, then times out.
    struct ChunkedPort {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for ChunkedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Err(io::Error::new(ErrorKind::TimedOut, "timed out"));
            }
            let chunk = self.chunks.remove(0);
            let count = chunk.len().min(buf.len());
            buf[..count].copy_from_slice(&chunk[..count]);
            Ok(count)
        }
    }

    impl Write for ChunkedPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SerialLink for ChunkedPort {
        fn set_read_timeout(&mut self, _: Duration) -> io::Result<()> {
            Ok(())
        }
    }

    // A device that needs `delay` per byte and honours the read timeout the
    // way a real port does.
    struct SlowPort {
        delay: Duration,
        timeout: Duration,
        timeouts: Vec<Duration>,
    }

    impl Read for SlowPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.delay > self.timeout {
                thread::sleep(self.timeout);
                return Err(io::Error::new(ErrorKind::TimedOut, "timed out"));
            }
            thread::sleep(self.delay);
            buf[0] = b'x';
            Ok(1)
        }
    }

    impl Write for SlowPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SerialLink for SlowPort {
        fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            self.timeout = timeout;
            self.timeouts.push(timeout);
            Ok(())
        }
    }

    #[test]
    fn short_read_is_not_an_error() {
        let mut port = Cursor::new(b"login".to_vec());
        let data = read_response(&mut port, 1024, Duration::from_millis(500)).unwrap();
        assert_eq!(data, b"login");
    }

    #[test]
    fn timeout_ends_the_window() {
        let mut port = ChunkedPort {
            chunks: vec![b"command ".to_vec(), b"not found".to_vec()],
        };
        let data = read_response(&mut port, 1024, Duration::from_millis(500)).unwrap();
        assert_eq!(data, b"command not found");
    }

    #[test]
    fn window_is_a_total_budget() {
        let mut port = SlowPort {
            delay: Duration::from_millis(400),
            timeout: Duration::from_millis(500),
            timeouts: Vec::new(),
        };
        let started = Instant::now();
        let data = read_response(&mut port, 1024, Duration::from_millis(500)).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(data, b"x");
        assert!(elapsed < Duration::from_millis(700), "took {:?}", elapsed);
        assert_eq!(port.timeouts.len(), 2);
        assert!(port.timeouts[0] <= Duration::from_millis(500));
        assert!(port.timeouts[1] <= Duration::from_millis(100));
    }

    #[test]
    fn stops_at_the_limit() {
        let mut port = Cursor::new(vec![b'x'; 4096]);
        let data = read_response(&mut port, 1024, Duration::from_millis(500)).unwrap();
        assert_eq!(data.len(), 1024);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let mut port = Cursor::new(b"login".to_vec());
        let err = read_response(&mut port, 1024, Duration::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn other_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged"))
            }
        }
        impl Write for Broken {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        impl SerialLink for Broken {
            fn set_read_timeout(&mut self, _: Duration) -> io::Result<()> {
                Ok(())
            }
        }
        let err = read_response(&mut Broken, 1024, Duration::from_millis(500)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn connector_rejects_bad_line_settings() {
        let parameters = PortParameters {
            parity: "Sideways".to_string(),
            ..PortParameters::default()
        };
        assert!(matches!(
            SerialConnector::new(&parameters),
            Err(ScanError::Config(_))
        ));
    }
}
