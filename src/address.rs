//! Discovery of the local host's site-local addresses.

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// Value used when the network interfaces cannot be enumerated.
pub const UNKNOWN_LOCAL_IP: &str = "unknown-local-ip";

// Enumerated on first use, then shared by every interceptor in the process.
static LOCAL_ADDRESS: Lazy<LocalAddress> = Lazy::new(LocalAddress::discover);

/// The local host's identity as it appears in SQL comments.
///
/// A comma-joined list of every site-local address bound to this host, in the
/// order the network stack reports them. Computed once at startup and then
/// shared read-only by every interceptor.
///
/// # Example
///
/// ```rust
/// use std::net::IpAddr;
/// use sea_orm_caller_comment::LocalAddress;
///
/// let addrs: Vec<IpAddr> = vec![
///     "127.0.0.1".parse().unwrap(),
///     "10.0.0.12".parse().unwrap(),
///     "192.168.1.7".parse().unwrap(),
/// ];
/// assert_eq!(LocalAddress::from_addrs(addrs).as_str(), "10.0.0.12,192.168.1.7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalAddress(Arc<str>);

impl LocalAddress {
    fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    /// Use an already known address list, such as one read from configuration.
    ///
    /// The value ends up inside a SQL comment, so it must be empty, the
    /// [`UNKNOWN_LOCAL_IP`] sentinel, or a comma-separated list of IP
    /// addresses.
    pub fn parse(value: &str) -> Result<Self> {
        let valid = value.is_empty()
            || value == UNKNOWN_LOCAL_IP
            || value.split(',').all(|ip| ip.parse::<IpAddr>().is_ok());

        if !valid {
            return Err(Error::invalid_configuration(format!(
                "local address '{value}' must be a comma-separated list of IP addresses."
            )));
        }

        Ok(Self::new(value))
    }

    /// The process-wide address, discovered once on first use.
    ///
    /// Every call returns a handle to the same shared string.
    pub fn shared() -> Self {
        LOCAL_ADDRESS.clone()
    }

    /// Enumerate the host's network interfaces and keep the site-local ones.
    ///
    /// Never fails: an enumeration error yields [`UNKNOWN_LOCAL_IP`].
    pub fn discover() -> Self {
        let lookup = if_addrs::get_if_addrs()
            .map(|interfaces| interfaces.into_iter().map(|iface| iface.ip()));
        Self::from_lookup(lookup)
    }

    /// Build the address from the outcome of an interface lookup.
    pub fn from_lookup<I>(lookup: io::Result<I>) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        match lookup {
            Ok(addrs) => {
                let local = Self::from_addrs(addrs);
                tracing::debug!(local_address = %local, "Discovered local address");
                local
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to enumerate network interfaces");
                Self::unknown()
            }
        }
    }

    /// Filter and join a list of interface addresses.
    pub fn from_addrs<I>(addrs: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let joined = addrs
            .into_iter()
            .filter(|ip| !ip.is_loopback() && !is_link_local(ip) && is_site_local(ip))
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(joined)
    }

    /// The sentinel address used when discovery fails.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_LOCAL_IP)
    }

    /// Get the address list as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether discovery failed and this is the sentinel value.
    pub fn is_unknown(&self) -> bool {
        &*self.0 == UNKNOWN_LOCAL_IP
    }
}

#[cfg(test)]
impl LocalAddress {
    pub(crate) fn shares_storage_with(&self, other: &LocalAddress) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocalAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        // fe80::/10
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn is_site_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_site_local_v6(v6),
    }
}

// 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_private()
}

// fec0::/10, the deprecated IPv6 site-local prefix
fn is_site_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfec0
}
