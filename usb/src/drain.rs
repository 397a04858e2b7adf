use crate::error::CommandError;
use crate::frame::{Response, FRAME_SIZE};
use crate::session::Session;
use crate::transport::Transport;
use log::{debug, error, warn};
use std::time::Duration;

/// A single bounded read from the IN endpoint. `Ok(None)` means nothing
/// arrived in time, which is the normal way of learning the device is idle.
pub fn read_one<T: Transport>(
    session: &mut Session<T>,
    timeout: Duration,
) -> Result<Option<Response>, CommandError> {
    let endpoint = session.config().endpoint_in;
    let mut buf = [0; FRAME_SIZE];

    match session.transport_mut().read_in(endpoint, &mut buf, timeout) {
        Ok(0) => {
            debug!("Zero length read from {:#04x}", endpoint);
            Ok(None)
        }
        Ok(length) => {
            if length < FRAME_SIZE {
                warn!(
                    "Short frame from the device, Expected: {}, Received: {}",
                    FRAME_SIZE, length
                );
            }
            let response = Response::from_bytes(&buf[..length]);
            debug!("Received {:02x?}", &response.as_bytes()[..12]);
            Ok(Some(response))
        }
        Err(rusb::Error::Timeout) => Ok(None),
        Err(err) => {
            error!("Error Occurred during packet read: {}", err);
            Err(CommandError::TransportFault(err))
        }
    }
}

/// Collects frames until a read times out.
///
/// The device gives no count or end marker for the notifications it emits
/// after a change, so silence is the only terminator. `drain_limit` stops a
/// device that never goes quiet. Frames past the limit stay queued, and the
/// session is marked with a backlog until a later drain ends on a timeout.
pub fn drain<T: Transport>(
    session: &mut Session<T>,
    timeout: Duration,
) -> Result<Vec<Response>, CommandError> {
    let limit = session.config().drain_limit;
    let mut responses = vec![];

    while let Some(response) = read_one(session, timeout)? {
        responses.push(response);
        if responses.len() >= limit {
            warn!("Stopped draining after {} frames, device is still talking", limit);
            session.set_backlog(true);
            return Ok(responses);
        }
    }

    session.set_backlog(false);
    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::transport::mock::MockTransport;

    fn session(transport: MockTransport) -> Session<MockTransport> {
        Session::new(transport, SessionConfig::default())
    }

    #[test]
    fn read_one_timeout_is_not_an_error() {
        let mut session = session(MockTransport::new());
        let result = read_one(&mut session, Duration::from_millis(10)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn read_one_uses_the_given_timeout() {
        let mut transport = MockTransport::new();
        transport.queue(&[0x5a, 0x06, 0x00]);
        let mut session = session(transport);

        let response = read_one(&mut session, Duration::from_millis(250))
            .unwrap()
            .unwrap();
        assert_eq!(response.opcode(), 0x06);
        assert_eq!(
            session.transport().read_timeouts,
            vec![Duration::from_millis(250)]
        );
    }

    #[test]
    fn silent_device_ends_drain_after_one_read() {
        let mut session = session(MockTransport::new());
        let frames = drain(&mut session, Duration::from_millis(500)).unwrap();

        assert!(frames.is_empty());
        assert_eq!(session.transport().read_timeouts.len(), 1);
    }

    #[test]
    fn drain_collects_until_first_timeout() {
        let mut transport = MockTransport::new();
        transport
            .queue(&[0x5a, 0x02, 0x0a, 0x12])
            .queue(&[0x5a, 0x6e, 0x01])
            .queue(&[0x5a, 0x6e, 0x02])
            .queue_error(rusb::Error::Timeout)
            .queue(&[0x5a, 0x11, 0x08]);
        let mut session = session(transport);

        let frames = drain(&mut session, Duration::from_millis(500)).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_ack());
        assert_eq!(frames[2].length(), 0x02);

        // The frame queued after the timeout belongs to whatever comes next.
        assert_eq!(session.transport().reads.len(), 1);
        assert_eq!(session.transport().read_timeouts.len(), 4);
    }

    #[test]
    fn drain_stops_at_the_limit() {
        let mut transport = MockTransport::new();
        for _ in 0..10 {
            transport.queue(&[0x5a, 0x6e, 0x00]);
        }
        let config = SessionConfig {
            drain_limit: 4,
            ..SessionConfig::default()
        };
        let mut session = Session::new(transport, config);

        let frames = drain(&mut session, Duration::from_millis(1)).unwrap();
        assert_eq!(frames.len(), 4);
        assert!(session.has_backlog());
    }

    #[test]
    fn backlog_clears_once_the_device_goes_quiet() {
        let mut transport = MockTransport::new();
        for _ in 0..3 {
            transport.queue(&[0x5a, 0x6e, 0x00]);
        }
        let config = SessionConfig {
            drain_limit: 2,
            ..SessionConfig::default()
        };
        let mut session = Session::new(transport, config);

        assert_eq!(drain(&mut session, Duration::from_millis(1)).unwrap().len(), 2);
        assert!(session.has_backlog());

        assert_eq!(drain(&mut session, Duration::from_millis(1)).unwrap().len(), 1);
        assert!(!session.has_backlog());
    }

    #[test]
    fn faults_abort_the_drain() {
        let mut transport = MockTransport::new();
        transport
            .queue(&[0x5a, 0x02, 0x0a, 0x12])
            .queue_error(rusb::Error::NoDevice);
        let mut session = session(transport);

        let result = drain(&mut session, Duration::from_millis(500));
        assert!(matches!(
            result,
            Err(CommandError::TransportFault(rusb::Error::NoDevice))
        ));
    }

    #[test]
    fn zero_length_read_counts_as_nothing() {
        let mut transport = MockTransport::new();
        transport.queue(&[]);
        let mut session = session(transport);
        assert!(read_one(&mut session, Duration::from_millis(5))
            .unwrap()
            .is_none());
    }
}
