use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};
use selfcheck_protocols::icmp;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

/// Sends one echo request to `addr` and waits up to `wait` for the matching reply.
///
/// Blocking; needs raw socket privileges. Returns the round trip time, or
/// `None` when no reply arrived in time.
pub fn echo(addr: Ipv4Addr, wait: Duration) -> anyhow::Result<Option<Duration>> {
    let (mut tx, mut rx) = open_channel()?;
    let identifier: u16 = rand::random();
    let request: Vec<u8> = icmp::create_echo_request(identifier, 1)?;
    let packet = IcmpPacket::new(&request).context("viewing echo request")?;

    let started = Instant::now();
    tx.send_to(packet, IpAddr::V4(addr))
        .with_context(|| format!("sending echo request to {addr}"))?;

    let mut replies = transport::icmp_packet_iter(&mut rx);
    loop {
        // A zero receive timeout would block forever.
        let remaining = match wait.checked_sub(started.elapsed()) {
            Some(remaining) if !remaining.is_zero() => remaining,
            _ => return Ok(None),
        };

        match replies
            .next_with_timeout(remaining)
            .context("reading echo reply")?
        {
            Some((reply, source))
                if source == IpAddr::V4(addr) && icmp::is_echo_reply(reply.packet(), identifier) =>
            {
                return Ok(Some(started.elapsed()));
            }
            Some(_) => continue,
            None => return Ok(None),
        }
    }
}

fn open_channel() -> anyhow::Result<(TransportSender, TransportReceiver)> {
    let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("opening ICMP channel")?;
    Ok((tx, rx))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
