use std::time::Duration;

/// The two operations the protocol needs from an open, claimed device.
///
/// Implementations must report an expired read as `rusb::Error::Timeout`;
/// every other error is treated as a fault of the session.
pub trait Transport {
    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
    ) -> Result<usize, rusb::Error>;

    fn read_in(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, rusb::Error>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::Transport;
    use std::collections::VecDeque;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    pub struct ControlWrite {
        pub request_type: u8,
        pub request: u8,
        pub value: u16,
        pub index: u16,
        pub data: Vec<u8>,
    }

    /// Replays a queue of reads, and times out once it runs dry.
    #[derive(Default)]
    pub struct MockTransport {
        pub writes: Vec<ControlWrite>,
        pub reads: VecDeque<Result<Vec<u8>, rusb::Error>>,
        pub read_timeouts: Vec<Duration>,
        pub fail_writes: Option<rusb::Error>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn queue(&mut self, frame: &[u8]) -> &mut Self {
            self.reads.push_back(Ok(frame.to_vec()));
            self
        }

        pub fn queue_error(&mut self, error: rusb::Error) -> &mut Self {
            self.reads.push_back(Err(error));
            self
        }

        pub fn last_command(&self) -> &[u8] {
            self.writes.last().map(|w| w.data.as_slice()).unwrap_or(&[])
        }
    }

    impl Transport for MockTransport {
        fn write_control(
            &mut self,
            request_type: u8,
            request: u8,
            value: u16,
            index: u16,
            data: &[u8],
        ) -> Result<usize, rusb::Error> {
            if let Some(error) = self.fail_writes {
                return Err(error);
            }
            self.writes.push(ControlWrite {
                request_type,
                request,
                value,
                index,
                data: data.to_vec(),
            });
            Ok(data.len())
        }

        fn read_in(
            &mut self,
            _endpoint: u8,
            buf: &mut [u8],
            timeout: Duration,
        ) -> Result<usize, rusb::Error> {
            self.read_timeouts.push(timeout);
            match self.reads.pop_front() {
                Some(Ok(frame)) => {
                    let length = frame.len().min(buf.len());
                    buf[..length].copy_from_slice(&frame[..length]);
                    Ok(length)
                }
                Some(Err(error)) => Err(error),
                None => Err(rusb::Error::Timeout),
            }
        }
    }
}
