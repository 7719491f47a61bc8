//! Socket configuration and bounded readiness waits
//!
//! Sockets run either in blocking mode with fixed send/receive timeouts or
//! in nonblocking mode, always close-on-exec. The bounded wait primitive
//! polls for readability for at most the caller's timeout and retries
//! interruption transparently with the remaining time.

use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd};
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use tracing::trace;

use crate::error::{Result, TransportError};

/// Outcome of a bounded readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data (or a hangup) is available to read
    Ready,
    /// The bounded wait expired
    TimedOut,
}

/// Configure a connected socket for bus use.
///
/// Close-on-exec is always set. With `Some(timeout)` the socket is blocking
/// with that send/receive timeout; with `None` it is nonblocking (callers
/// get immediate, no-wait semantics).
pub fn configure(stream: &UnixStream, timeout: Option<Duration>) -> Result<()> {
    fcntl(stream.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(|errno| {
        TransportError::Configure {
            source: io::Error::from_raw_os_error(errno as i32),
        }
    })?;

    let apply = |res: io::Result<()>| res.map_err(|source| TransportError::Configure { source });
    match timeout {
        Some(t) => {
            // zero would disable the std timeout entirely
            let t = if t.is_zero() { Duration::from_millis(1) } else { t };
            apply(stream.set_nonblocking(false))?;
            apply(stream.set_read_timeout(Some(t)))?;
            apply(stream.set_write_timeout(Some(t)))?;
        }
        None => apply(stream.set_nonblocking(true))?,
    }
    Ok(())
}

/// Block until `stream` is readable, for at most `timeout`.
///
/// Interruption is retried with the recomputed remaining time. A peer
/// hangup counts as ready: the pending EOF still has to be read.
pub fn wait_readable(stream: &UnixStream, timeout: Duration) -> Result<Readiness> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        // one poll round covers at most u16::MAX ms; the loop re-arms
        let mut ms = remaining.as_millis().min(u16::MAX as u128) as u16;
        if ms == 0 && !remaining.is_zero() {
            ms = 1;
        }

        let mut fds = [PollFd::new(stream.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(ms)) {
            Ok(0) => {
                if Instant::now() >= deadline {
                    return Ok(Readiness::TimedOut);
                }
            }
            Ok(_) => {
                let revents = fds[0].revents().unwrap_or(PollFlags::empty());
                if revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP) {
                    return Ok(Readiness::Ready);
                }
                if revents.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL) {
                    return Err(TransportError::Recv {
                        source: io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            "socket error reported by poll",
                        ),
                    });
                }
                // spurious wakeup, re-poll with the remaining time
            }
            Err(nix::errno::Errno::EINTR) => {
                trace!("poll interrupted, retrying with remaining time");
            }
            Err(errno) => {
                return Err(TransportError::Recv {
                    source: io::Error::from_raw_os_error(errno as i32),
                });
            }
        }
    }
}

/// One receive attempt. `Ok(None)` means the read would block (nonblocking
/// socket with nothing pending, or a configured receive timeout expiring).
///
/// A zero-length read maps to [`TransportError::PeerClosed`]; interruption
/// is retried internally.
pub fn read_once(stream: &UnixStream, buf: &mut [u8]) -> Result<Option<usize>> {
    loop {
        match (&*stream).read(buf) {
            Ok(0) => return Err(TransportError::PeerClosed),
            Ok(n) => return Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(e) => return Err(TransportError::Recv { source: e }),
        }
    }
}

/// Bounded receive: wait for readability, then read once.
pub fn recv_bounded(stream: &UnixStream, buf: &mut [u8], timeout: Duration) -> Result<usize> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match wait_readable(stream, remaining)? {
            Readiness::TimedOut => {
                return Err(TransportError::timeout("recv", timeout.as_millis() as u64))
            }
            Readiness::Ready => {}
        }
        // readiness can be spurious under contention; re-wait in that case
        if let Some(n) = read_once(stream, buf)? {
            return Ok(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zero_timeout_wait_does_not_block() {
        let (a, _b) = UnixStream::pair().unwrap();
        let started = Instant::now();
        let outcome = wait_readable(&a, Duration::ZERO).unwrap();
        assert_eq!(outcome, Readiness::TimedOut);
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn wait_sees_pending_data() {
        let (a, mut b) = UnixStream::pair().unwrap();
        b.write_all(b"x").unwrap();
        assert_eq!(
            wait_readable(&a, Duration::from_secs(1)).unwrap(),
            Readiness::Ready
        );
    }

    #[test]
    fn read_once_maps_eof_to_peer_closed() {
        let (a, b) = UnixStream::pair().unwrap();
        drop(b);
        let mut buf = [0u8; 8];
        assert!(matches!(
            read_once(&a, &mut buf),
            Err(TransportError::PeerClosed)
        ));
    }

    #[test]
    fn nonblocking_read_returns_none_when_idle() {
        let (a, _b) = UnixStream::pair().unwrap();
        configure(&a, None).unwrap();
        let mut buf = [0u8; 8];
        assert!(matches!(read_once(&a, &mut buf), Ok(None)));
    }

    #[test]
    fn recv_bounded_times_out_promptly() {
        let (a, _b) = UnixStream::pair().unwrap();
        let mut buf = [0u8; 8];
        let started = Instant::now();
        let err = recv_bounded(&a, &mut buf, Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
