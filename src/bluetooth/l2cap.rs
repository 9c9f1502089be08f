//! L2CAP sequential packet sockets carrying the HID control and interrupt
//! channels.

use std::io;
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout};
use nix::sys::socket::MsgFlags;
use thiserror::Error;

const BTPROTO_L2CAP: libc::c_int = 0;

/// Possible errors on a listening or connected channel
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Unable to create socket: {0}")]
    Socket(io::Error),
    #[error("Unable to bind PSM {psm:#06x}: {source}")]
    Bind { psm: u16, source: io::Error },
    #[error("Unable to listen on PSM {psm:#06x}: {source}")]
    Listen { psm: u16, source: io::Error },
    #[error("Waiting for a connection failed: {0}")]
    Poll(Errno),
    #[error("Accepting a connection failed: {0}")]
    Accept(io::Error),
    #[error("Channel I/O error: {0}")]
    Io(#[from] Errno),
}

/// Connected channel to the remote host
pub trait Channel {
    /// Address of the remote host
    fn peer(&self) -> &str;

    /// Send one packet, returning the number of bytes written
    fn send(&mut self, data: &[u8]) -> Result<usize, ChannelError>;

    /// Receive one pending packet without blocking. Returns [None] if
    /// nothing is pending and `Some(0)` once the remote closed the channel.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ChannelError>;
}

/// Listening endpoint that hands out connected channels
pub trait ChannelListener {
    type Conn: Channel;

    /// Wait up to `timeout` for an incoming connection
    fn accept_timeout(&mut self, timeout: Duration) -> Result<Option<Self::Conn>, ChannelError>;
}

/// Kernel `struct sockaddr_l2`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct SockaddrL2 {
    l2_family: libc::sa_family_t,
    l2_psm: u16,
    l2_bdaddr: [u8; 6],
    l2_cid: u16,
    l2_bdaddr_type: u8,
}

impl SockaddrL2 {
    /// Address on any local adapter for the given PSM
    fn any(psm: u16) -> Self {
        Self {
            l2_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            l2_psm: psm.to_le(),
            ..Default::default()
        }
    }
}

/// Format a device address. Addresses are stored little endian.
pub fn format_address(bdaddr: [u8; 6]) -> String {
    let b = bdaddr;
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        b[5], b[4], b[3], b[2], b[1], b[0]
    )
}

/// Listening L2CAP socket
#[derive(Debug)]
pub struct L2capListener {
    psm: u16,
    fd: OwnedFd,
}

impl L2capListener {
    /// Bind to the given PSM on any local adapter and start listening with a
    /// backlog of one.
    pub fn bind(psm: u16) -> Result<Self, ChannelError> {
        let raw_fd = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_SEQPACKET | libc::SOCK_CLOEXEC,
                BTPROTO_L2CAP,
            )
        };
        if raw_fd < 0 {
            return Err(ChannelError::Socket(io::Error::last_os_error()));
        }
        // SAFETY: the descriptor was just returned by socket() and is owned here
        let fd = unsafe { OwnedFd::from_raw_fd(raw_fd) };

        let addr = SockaddrL2::any(psm);
        let result = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                &addr as *const SockaddrL2 as *const libc::sockaddr,
                mem::size_of::<SockaddrL2>() as libc::socklen_t,
            )
        };
        if result < 0 {
            let source = io::Error::last_os_error();
            return Err(ChannelError::Bind { psm, source });
        }

        let result = unsafe { libc::listen(fd.as_raw_fd(), 1) };
        if result < 0 {
            let source = io::Error::last_os_error();
            return Err(ChannelError::Listen { psm, source });
        }

        log::debug!("Listening on PSM {psm:#06x}");
        Ok(Self { psm, fd })
    }

    fn accept(&self) -> Result<L2capChannel, ChannelError> {
        let mut addr = SockaddrL2::default();
        let mut len = mem::size_of::<SockaddrL2>() as libc::socklen_t;
        let raw_fd = unsafe {
            libc::accept4(
                self.fd.as_raw_fd(),
                &mut addr as *mut SockaddrL2 as *mut libc::sockaddr,
                &mut len,
                libc::SOCK_CLOEXEC,
            )
        };
        if raw_fd < 0 {
            return Err(ChannelError::Accept(io::Error::last_os_error()));
        }
        // SAFETY: the descriptor was just returned by accept4() and is owned here
        let fd = unsafe { OwnedFd::from_raw_fd(raw_fd) };
        let peer = format_address(addr.l2_bdaddr);
        log::debug!("Accepted {peer} on PSM {:#06x}", self.psm);
        Ok(L2capChannel { peer, fd })
    }
}

impl ChannelListener for L2capListener {
    type Conn = L2capChannel;

    fn accept_timeout(&mut self, timeout: Duration) -> Result<Option<L2capChannel>, ChannelError> {
        let millis = timeout.as_millis().min(u16::MAX as u128) as u16;
        let mut fds = [PollFd::new(self.fd.as_fd(), PollFlags::POLLIN)];
        match nix::poll::poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) | Err(Errno::EINTR) => return Ok(None),
            Ok(_) => (),
            Err(e) => return Err(ChannelError::Poll(e)),
        }
        let readable = fds[0]
            .revents()
            .is_some_and(|revents| revents.contains(PollFlags::POLLIN));
        if !readable {
            return Ok(None);
        }
        self.accept().map(Some)
    }
}

/// Connected L2CAP channel. The socket is closed on drop.
#[derive(Debug)]
pub struct L2capChannel {
    peer: String,
    fd: OwnedFd,
}

impl AsFd for L2capChannel {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl Channel for L2capChannel {
    fn peer(&self) -> &str {
        self.peer.as_str()
    }

    fn send(&mut self, data: &[u8]) -> Result<usize, ChannelError> {
        let written = nix::sys::socket::send(self.fd.as_raw_fd(), data, MsgFlags::MSG_NOSIGNAL)?;
        Ok(written)
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ChannelError> {
        match nix::sys::socket::recv(self.fd.as_raw_fd(), buf, MsgFlags::MSG_DONTWAIT) {
            Ok(count) => Ok(Some(count)),
            Err(Errno::EAGAIN) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
