// Network display helpers
// Finds the address other devices on the LAN can reach us at; display only

use std::net::{IpAddr, Ipv4Addr};

/// Best guess of this machine's LAN address, `127.0.0.1` when unknown
pub fn local_ip() -> IpAddr {
    local_ip_address::local_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
