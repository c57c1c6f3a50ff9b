//! Per-socket connect timeout.
//!
//! A connect that never hears back would otherwise sit on the kernel's own
//! SYN retry schedule. Each platform exposes a different TCP option for
//! bounding that; [option_for] maps the target OS to the one it has and
//! [apply_connect_timeout] sets it on a fresh socket.

use log::debug;
use std::{io, time::Duration};
use tokio::net::TcpSocket;

/// Default bound on a single connect attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TimeoutOption {
    /// `TCP_USER_TIMEOUT`, in milliseconds.
    UserTimeout,
    /// `TCP_CONNECTIONTIMEOUT`, in seconds.
    ConnectionTimeout,
    /// `TCP_MAXRT`, in seconds.
    MaxRetransmitTime,
    /// Nothing suitable; the OS default connect timeout applies.
    Unsupported,
}

const PLATFORM_OPTIONS: &[(&str, TimeoutOption)] = &[
    ("linux", TimeoutOption::UserTimeout),
    ("android", TimeoutOption::UserTimeout),
    ("fuchsia", TimeoutOption::UserTimeout),
    ("macos", TimeoutOption::ConnectionTimeout),
    ("ios", TimeoutOption::ConnectionTimeout),
    ("windows", TimeoutOption::MaxRetransmitTime),
];

/// Timeout option for an OS name as spelled by [`std::env::consts::OS`].
pub fn option_for(os: &str) -> TimeoutOption {
    PLATFORM_OPTIONS
        .iter()
        .find(|(name, _)| *name == os)
        .map_or(TimeoutOption::Unsupported, |&(_, opt)| opt)
}

/// Timeout option for the platform we are running on.
pub fn platform_option() -> TimeoutOption {
    option_for(std::env::consts::OS)
}

/// Bound how long `socket` may spend connecting.
///
/// Returns `false` when the platform has no suitable option or setting it
/// failed; the attempt then proceeds with the OS default.
pub fn apply_connect_timeout(socket: &TcpSocket, timeout: Duration) -> bool {
    let option = platform_option();
    let res = match option {
        TimeoutOption::UserTimeout => set_user_timeout(socket, timeout),
        TimeoutOption::ConnectionTimeout => set_connection_timeout(socket, timeout),
        TimeoutOption::MaxRetransmitTime => set_max_rt(socket, timeout),
        TimeoutOption::Unsupported => return false,
    };

    match res {
        Ok(()) => true,
        Err(err) => {
            debug!("{option:?} not applied, using OS connect timeout: {err}");
            false
        }
    }
}

#[cfg_attr(
    not(any(target_os = "macos", target_os = "ios", windows)),
    allow(dead_code)
)]
fn whole_secs(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_secs().max(1)).unwrap_or(i32::MAX)
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "fuchsia"))]
fn set_user_timeout(socket: &TcpSocket, timeout: Duration) -> io::Result<()> {
    socket2::SockRef::from(socket).set_tcp_user_timeout(Some(timeout))
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "fuchsia")))]
fn set_user_timeout(_socket: &TcpSocket, _timeout: Duration) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
fn set_connection_timeout(socket: &TcpSocket, timeout: Duration) -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let secs: libc::c_int = whole_secs(timeout);
    // SAFETY: the descriptor is owned by `socket` for the whole call and
    // `secs` outlives it; the length matches the pointed-to type.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::IPPROTO_TCP,
            libc::TCP_CONNECTIONTIMEOUT,
            (&secs as *const libc::c_int).cast(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn set_connection_timeout(_socket: &TcpSocket, _timeout: Duration) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}

#[cfg(windows)]
fn set_max_rt(socket: &TcpSocket, timeout: Duration) -> io::Result<()> {
    use std::os::windows::io::AsRawSocket;

    const IPPROTO_TCP: i32 = 6;
    const TCP_MAXRT: i32 = 5;

    #[link(name = "ws2_32")]
    unsafe extern "system" {
        fn setsockopt(s: usize, level: i32, optname: i32, optval: *const u8, optlen: i32) -> i32;
    }

    let secs = whole_secs(timeout);
    // SAFETY: the handle is owned by `socket` for the whole call and `secs`
    // outlives it; the length matches the pointed-to type.
    let rc = unsafe {
        setsockopt(
            socket.as_raw_socket() as usize,
            IPPROTO_TCP,
            TCP_MAXRT,
            (&secs as *const i32).cast(),
            std::mem::size_of::<i32>() as i32,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(windows))]
fn set_max_rt(_socket: &TcpSocket, _timeout: Duration) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}
