use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

use crate::warn;

/// Address used to ask the kernel which source address it would route through.
/// Nothing is sent: connecting a UDP socket only selects a route.
const ROUTE_PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 168, 0, 1), 53);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback interfaces never carry the LAN address.
    IsLoopback,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface has no private IPv4 address.
    NoPrivateIpv4,
}

/// Returns this machine's LAN IPv4 address.
///
/// Tries the interface table first, then the routing table. Falls back to
/// `127.0.0.1` with a warning so callers always get an address to work with.
pub fn local_ipv4() -> Ipv4Addr {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();

    if let Some(addr) = select_lan_ipv4(&interfaces) {
        return addr;
    }

    match resolve_route_source_ip() {
        Some(IpAddr::V4(addr)) if !addr.is_unspecified() => addr,
        _ => {
            warn!("Could not determine local IP, using 127.0.0.1");
            Ipv4Addr::LOCALHOST
        }
    }
}

/// Picks the first private IPv4 address of the first viable interface.
///
/// Interfaces whose name suggests a wired link (`e*`) are preferred.
pub fn select_lan_ipv4(interfaces: &[NetworkInterface]) -> Option<Ipv4Addr> {
    let mut viable: Vec<&NetworkInterface> = interfaces
        .iter()
        .filter(|interface| is_viable_lan_interface(interface).is_ok())
        .collect();

    viable.sort_by_key(|i| if i.name.starts_with('e') { 0 } else { 1 });

    viable.into_iter().find_map(private_ipv4)
}

fn is_viable_lan_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if private_ipv4(interface).is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn private_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(v4.ip()),
        _ => None,
    })
}

fn resolve_route_source_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(ROUTE_PROBE_ADDR).ok()?;
    socket.local_addr().ok().map(|s| s.ip())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;

    const IFF_UP: u32 = 1;
    const IFF_BROADCAST: u32 = 1 << 1;
    const IFF_LOOPBACK: u32 = 1 << 3;
    const IFF_POINTTOPOINT: u32 = 1 << 4;

    fn create_mock_interface(name: &str, ips: Vec<IpNetwork>, flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            description: "An interface".to_string(),
            index: 0,
            mac: Some(MacAddr(0x1, 0x2, 0x3, 0x4, 0x5, 0x6)),
            ips,
            flags,
        }
    }

    fn net(s: &str) -> IpNetwork {
        s.parse().unwrap()
    }

    #[test]
    fn is_viable_lan_interface_should_succeed() {
        let interface =
            create_mock_interface("eth0", vec![net("192.168.1.100/24")], IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&interface), Ok(()));
    }

    #[test]
    fn is_viable_lan_interface_should_reject_down_loopback_and_tunnels() {
        let down = create_mock_interface("eth0", vec![net("192.168.1.100/24")], IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&down), Err(ViabilityError::IsDown));

        let lo = create_mock_interface("lo", vec![net("127.0.0.1/8")], IFF_UP | IFF_LOOPBACK);
        assert_eq!(is_viable_lan_interface(&lo), Err(ViabilityError::IsLoopback));

        let tun = create_mock_interface("tun0", vec![net("10.8.0.2/24")], IFF_UP | IFF_POINTTOPOINT);
        assert_eq!(is_viable_lan_interface(&tun), Err(ViabilityError::IsPointToPoint));

        let public = create_mock_interface("eth1", vec![net("8.8.4.4/24")], IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_lan_interface(&public), Err(ViabilityError::NoPrivateIpv4));
    }

    #[test]
    fn select_lan_ipv4_prefers_wired_interfaces() {
        let interfaces = vec![
            create_mock_interface("lo", vec![net("127.0.0.1/8")], IFF_UP | IFF_LOOPBACK),
            create_mock_interface("wlan0", vec![net("192.168.1.50/24")], IFF_UP | IFF_BROADCAST),
            create_mock_interface(
                "enp9s0",
                vec![net("fe80::1/64"), net("192.168.1.10/24")],
                IFF_UP | IFF_BROADCAST,
            ),
        ];
        assert_eq!(select_lan_ipv4(&interfaces), Some(Ipv4Addr::new(192, 168, 1, 10)));
    }

    #[test]
    fn select_lan_ipv4_returns_none_without_lan() {
        let interfaces = vec![
            create_mock_interface("lo", vec![net("127.0.0.1/8")], IFF_UP | IFF_LOOPBACK),
            create_mock_interface("tun0", vec![net("10.8.0.2/24")], IFF_UP | IFF_POINTTOPOINT),
        ];
        assert_eq!(select_lan_ipv4(&interfaces), None);
    }
}
