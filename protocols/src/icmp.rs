use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};

const ICMP_ECHO_HDR_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8] = b"selfcheck-echo";

pub const ECHO_REQUEST_LEN: usize = ICMP_ECHO_HDR_LEN + ECHO_PAYLOAD.len();

/// Builds an ICMPv4 echo request (no IP header) with a valid checksum.
pub fn create_echo_request(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_REQUEST_LEN];
    {
        let mut echo: MutableEchoRequestPacket =
            MutableEchoRequestPacket::new(&mut buffer).context("creating echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_payload(ECHO_PAYLOAD);
        echo.set_checksum(0);

        let checksum: u16 = {
            let view = IcmpPacket::new(echo.packet()).context("viewing echo request")?;
            icmp::checksum(&view)
        };
        echo.set_checksum(checksum);
    }
    Ok(buffer)
}

/// Whether `bytes` is an echo reply carrying our `identifier`.
pub fn is_echo_reply(bytes: &[u8], identifier: u16) -> bool {
    EchoReplyPacket::new(bytes).is_some_and(|reply| {
        reply.get_icmp_type() == IcmpTypes::EchoReply && reply.get_identifier() == identifier
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
