//! Read-only host introspection for the network specs endpoint.

use std::ffi::CStr;
use std::io;
use std::net::Ipv4Addr;
use std::time::Instant;

use serde::Serialize;

/// Host summary returned by `/api/network/specs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSpecs {
    /// First non-loopback IPv4 address, or `"unknown"`.
    pub ip: String,
    /// Host name.
    pub hostname: String,
    /// Kernel name and release, e.g. `"Linux 6.1.0"`.
    pub os: String,
    /// Host uptime in whole minutes, e.g. `"42 min"`.
    pub uptime: String,
    /// Connection count is not tracked.
    pub connections: &'static str,
}

/// Gather host information. `started` is used when host uptime is unavailable.
pub fn collect(started: Instant) -> io::Result<NetworkSpecs> {
    let ip = first_external_ipv4()?
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let uptime_secs = host_uptime_secs().unwrap_or_else(|| started.elapsed().as_secs());

    Ok(NetworkSpecs {
        ip,
        hostname: hostname()?,
        os: os_description()?,
        uptime: format_uptime(uptime_secs),
        connections: "N/A",
    })
}

/// Format seconds as whole minutes.
pub fn format_uptime(secs: u64) -> String {
    format!("{} min", secs / 60)
}

#[cfg(unix)]
fn first_external_ipv4() -> io::Result<Option<Ipv4Addr>> {
    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: on success getifaddrs stores a list head that we free below.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(io::Error::last_os_error());
    }

    let mut found = None;
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: cursor is a non-null node of the list returned by getifaddrs.
        let entry = unsafe { &*cursor };
        if !entry.ifa_addr.is_null() {
            // SAFETY: ifa_addr is non-null and points to a sockaddr.
            let family = unsafe { (*entry.ifa_addr).sa_family };
            if i32::from(family) == libc::AF_INET {
                // SAFETY: AF_INET addresses are sockaddr_in.
                let sin = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
                let ip = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
                if !ip.is_loopback() {
                    found = Some(ip);
                    break;
                }
            }
        }
        cursor = entry.ifa_next;
    }

    // SAFETY: head came from a successful getifaddrs and is freed once.
    unsafe { libc::freeifaddrs(head) };
    Ok(found)
}

#[cfg(not(unix))]
fn first_external_ipv4() -> io::Result<Option<Ipv4Addr>> {
    Ok(None)
}

#[cfg(unix)]
fn hostname() -> io::Result<String> {
    let mut buf = [0 as libc::c_char; 256];
    // SAFETY: buf is writable for buf.len() bytes.
    if unsafe { libc::gethostname(buf.as_mut_ptr(), buf.len()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // gethostname may not terminate on truncation.
    buf[buf.len() - 1] = 0;
    // SAFETY: buf is NUL-terminated.
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn hostname() -> io::Result<String> {
    std::env::var("COMPUTERNAME").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))
}

#[cfg(unix)]
fn os_description() -> io::Result<String> {
    // SAFETY: utsname is plain old data; zeroed is a valid initial value.
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: uts is a valid, writable utsname.
    if unsafe { libc::uname(&mut uts) } != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: uname fills NUL-terminated fields.
    let (sysname, release) = unsafe {
        (
            CStr::from_ptr(uts.sysname.as_ptr()),
            CStr::from_ptr(uts.release.as_ptr()),
        )
    };
    Ok(format!(
        "{} {}",
        sysname.to_string_lossy(),
        release.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn os_description() -> io::Result<String> {
    Ok(std::env::consts::OS.to_string())
}

#[cfg(target_os = "linux")]
fn host_uptime_secs() -> Option<u64> {
    // SAFETY: sysinfo is plain old data; zeroed is a valid initial value.
    let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
    // SAFETY: info is a valid, writable sysinfo struct.
    if unsafe { libc::sysinfo(&mut info) } != 0 {
        return None;
    }
    u64::try_from(info.uptime).ok()
}

#[cfg(not(target_os = "linux"))]
fn host_uptime_secs() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_is_whole_minutes() {
        assert_eq!(format_uptime(0), "0 min");
        assert_eq!(format_uptime(59), "0 min");
        assert_eq!(format_uptime(60), "1 min");
        assert_eq!(format_uptime(3_725), "62 min");
    }

    #[test]
    fn collect_fills_every_field() {
        let specs = collect(Instant::now()).unwrap();
        assert!(!specs.ip.is_empty());
        assert!(specs.ip == "unknown" || specs.ip.parse::<Ipv4Addr>().is_ok());
        assert!(!specs.os.is_empty());
        assert!(specs.uptime.ends_with(" min"));
        assert_eq!(specs.connections, "N/A");
    }

    #[test]
    fn serializes_expected_keys() {
        let specs = NetworkSpecs {
            ip: "10.0.0.5".into(),
            hostname: "diag-host".into(),
            os: "Linux 6.1.0".into(),
            uptime: "12 min".into(),
            connections: "N/A",
        };
        let json = serde_json::to_value(&specs).unwrap();
        assert_eq!(json["ip"], "10.0.0.5");
        assert_eq!(json["hostname"], "diag-host");
        assert_eq!(json["connections"], "N/A");
    }
}
