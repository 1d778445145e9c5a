//! # DNS Message Codec
//!
//! Minimal DNS client wire format: encodes standard queries and decodes
//! responses including compressed names. Not a full implementation — no
//! EDNS0, no DNSSEC — but it handles the typical answers and RDATA
//! shapes a reconnaissance scan cares about.
//!
//! Decoding is deliberately forgiving: a malformed record skips that
//! record, a malformed header yields an empty record list. Adversarial
//! input (out-of-bounds pointers, pointer loops, truncated buffers)
//! must terminate cleanly, never panic.

use std::collections::HashSet;

use anyhow::ensure;
use tracing::trace;

use rekon_common::dns::{DnsRecord, RecordType};
use rekon_common::error::InputError;

pub const DNS_HDR_LEN: usize = 12;

/// Standard query: recursion desired, everything else zero.
const FLAGS_STANDARD_QUERY: u16 = 0x0100;
const CLASS_IN: u16 = 1;

/// RFC 1035 caps a label at 63 bytes; the two high bits of the length
/// octet are reserved for compression pointers.
const MAX_LABEL_LEN: usize = 63;

/// Encodes a standard query for `name`/`rtype` with a random
/// transaction id. The name may carry a trailing dot or not; empty
/// names are rejected.
pub fn encode_query(name: &str, rtype: RecordType) -> anyhow::Result<Vec<u8>> {
    encode_query_with_id(name, rtype, rand::random::<u16>())
}

/// Same as [`encode_query`] but with a caller-chosen transaction id,
/// so a transport can match the response against the query it sent.
pub fn encode_query_with_id(name: &str, rtype: RecordType, id: u16) -> anyhow::Result<Vec<u8>> {
    if name.trim_matches('.').is_empty() {
        return Err(InputError::EmptyQueryName.into());
    }

    let mut buffer: Vec<u8> = Vec::with_capacity(DNS_HDR_LEN + name.len() + 6);

    buffer.extend_from_slice(&id.to_be_bytes());
    buffer.extend_from_slice(&FLAGS_STANDARD_QUERY.to_be_bytes());
    buffer.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    buffer.extend_from_slice(&[0u8; 6]); // ancount, nscount, arcount

    for label in name.split('.') {
        if label.is_empty() {
            continue;
        }
        ensure!(
            label.len() <= MAX_LABEL_LEN,
            "label {label:?} exceeds {MAX_LABEL_LEN} bytes"
        );
        buffer.push(label.len() as u8);
        buffer.extend_from_slice(label.as_bytes());
    }
    buffer.push(0);

    buffer.extend_from_slice(&rtype.to_u16().to_be_bytes());
    buffer.extend_from_slice(&CLASS_IN.to_be_bytes());

    Ok(buffer)
}

/// Reads the transaction id of an encoded message, if it has one.
pub fn transaction_id(message: &[u8]) -> Option<u16> {
    let bytes: [u8; 2] = message.get(0..2)?.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

/// Decodes every resource record across the answer, authority and
/// additional sections. Records of types the engine does not know are
/// dropped; a record that fails to parse is skipped without aborting
/// the rest.
pub fn decode_response(message: &[u8]) -> Vec<DnsRecord> {
    decode_inner(message).unwrap_or_default()
}

fn decode_inner(message: &[u8]) -> Option<Vec<DnsRecord>> {
    let mut cursor = Cursor::new(message);

    cursor.skip(2)?; // transaction id
    cursor.skip(2)?; // flags
    let qdcount = cursor.read_u16()?;
    let ancount = cursor.read_u16()?;
    let nscount = cursor.read_u16()?;
    let arcount = cursor.read_u16()?;

    for _ in 0..qdcount {
        skip_name(&mut cursor)?;
        cursor.skip(4)?; // qtype + qclass
    }

    let total = ancount as usize + nscount as usize + arcount as usize;
    let mut records: Vec<DnsRecord> = Vec::with_capacity(total.min(64));

    for _ in 0..total {
        // A record cut off mid-way ends the message; keep what we have.
        let Some(record) = read_record(&mut cursor, message) else {
            break;
        };
        if let Some(record) = record {
            records.push(record);
        }
    }

    Some(records)
}

/// `Ok(None)` in spirit: outer `Option` is "buffer exhausted", inner is
/// "record skipped" (unknown type or undecodable RDATA).
fn read_record(cursor: &mut Cursor, message: &[u8]) -> Option<Option<DnsRecord>> {
    let (name, _) = read_name_at(message, cursor.pos)?;
    skip_name(cursor)?;
    let rtype_raw = cursor.read_u16()?;
    cursor.skip(2)?; // class
    let ttl = cursor.read_u32()?;
    let rdlength = cursor.read_u16()? as usize;
    let rdata_pos = cursor.pos;
    cursor.skip(rdlength)?;

    let Some(rtype) = RecordType::from_u16(rtype_raw) else {
        trace!("skipping record of uninteresting type {rtype_raw}");
        return Some(None);
    };

    let Some(data) = parse_rdata(rtype, message, rdata_pos, rdlength) else {
        trace!("skipping undecodable {rtype} record for {name}");
        return Some(None);
    };

    Some(Some(DnsRecord::new(name, rtype, ttl as i64, data)))
}

fn parse_rdata(rtype: RecordType, message: &[u8], pos: usize, len: usize) -> Option<String> {
    let rdata = message.get(pos..pos.checked_add(len)?)?;
    match rtype {
        RecordType::A => {
            if len != 4 {
                return None;
            }
            Some(format!("{}.{}.{}.{}", rdata[0], rdata[1], rdata[2], rdata[3]))
        }
        RecordType::Aaaa => {
            if len != 16 {
                return None;
            }
            let groups: Vec<String> = rdata
                .chunks_exact(2)
                .map(|pair| format!("{:x}", u16::from_be_bytes([pair[0], pair[1]])))
                .collect();
            Some(groups.join(":"))
        }
        RecordType::Ns | RecordType::Cname => read_name_at(message, pos).map(|(name, _)| name),
        RecordType::Mx => {
            if len < 3 {
                return None;
            }
            let preference = u16::from_be_bytes([rdata[0], rdata[1]]);
            let (exchange, _) = read_name_at(message, pos + 2)?;
            Some(format!("{exchange} preference={preference}"))
        }
        RecordType::Txt => {
            let mut parts: Vec<String> = Vec::new();
            let mut off = 0usize;
            while off < len {
                let l = rdata[off] as usize;
                off += 1;
                if l == 0 {
                    continue;
                }
                let chunk = rdata.get(off..off + l)?;
                parts.push(String::from_utf8_lossy(chunk).into_owned());
                off += l;
            }
            Some(parts.join(" "))
        }
        RecordType::Soa => {
            let (mname, consumed) = read_name_at(message, pos)?;
            let mut off = pos + consumed;
            let (rname, consumed) = read_name_at(message, off)?;
            off += consumed;
            let mut fields = [0u64; 5];
            for field in fields.iter_mut() {
                let bytes: [u8; 4] = message.get(off..off + 4)?.try_into().ok()?;
                *field = u32::from_be_bytes(bytes) as u64;
                off += 4;
            }
            let [serial, refresh, retry, expire, minimum] = fields;
            Some(format!(
                "mname={mname} rname={rname} serial={serial} refresh={refresh} retry={retry} expire={expire} minimum={minimum}"
            ))
        }
    }
}

/// Reads a possibly compressed name starting at `pos`, returning the
/// dotted name and how many bytes the name occupies *at `pos`* (a
/// compression pointer counts as two bytes regardless of how long the
/// referenced name is).
///
/// Pointer chasing tracks visited offsets so a malicious pointer loop
/// terminates instead of recursing forever.
fn read_name_at(message: &[u8], pos: usize) -> Option<(String, usize)> {
    let mut visited: HashSet<usize> = HashSet::new();
    let name = follow_name(message, pos, &mut visited)?;
    let consumed = name_len_at(message, pos)?;
    Some((name, consumed))
}

fn follow_name(message: &[u8], pos: usize, visited: &mut HashSet<usize>) -> Option<String> {
    if !visited.insert(pos) {
        return None; // pointer loop
    }

    let mut labels: Vec<String> = Vec::new();
    let mut p = pos;

    loop {
        let len = *message.get(p)? as usize;
        if len == 0 {
            break;
        }
        if len & 0xC0 == 0xC0 {
            let low = *message.get(p + 1)? as usize;
            let target = ((len & 0x3F) << 8) | low;
            let rest = follow_name(message, target, visited)?;
            if !rest.is_empty() && rest != "." {
                labels.push(rest);
            }
            break;
        }
        p += 1;
        let label = message.get(p..p + len)?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        p += len;
    }

    if labels.is_empty() {
        return Some(".".to_string());
    }
    Some(labels.join("."))
}

/// Byte length a name occupies in place, without following pointers.
fn name_len_at(message: &[u8], pos: usize) -> Option<usize> {
    let mut p = pos;
    loop {
        let len = *message.get(p)? as usize;
        if len == 0 {
            return Some(p - pos + 1);
        }
        if len & 0xC0 == 0xC0 {
            message.get(p + 1)?;
            return Some(p - pos + 2);
        }
        p += 1 + len;
    }
}

fn skip_name(cursor: &mut Cursor) -> Option<()> {
    loop {
        let len = cursor.read_u8()? as usize;
        if len == 0 {
            return Some(());
        }
        if len & 0xC0 == 0xC0 {
            cursor.skip(1)?;
            return Some(());
        }
        cursor.skip(len)?;
    }
}

/// Explicit read position over an immutable message buffer. Every read
/// is bounds-checked; `None` means the buffer ran out.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn read_u16(&mut self) -> Option<u16> {
        let bytes: [u8; 2] = self.buf.get(self.pos..self.pos + 2)?.try_into().ok()?;
        self.pos += 2;
        Some(u16::from_be_bytes(bytes))
    }

    fn read_u32(&mut self) -> Option<u32> {
        let bytes: [u8; 4] = self.buf.get(self.pos..self.pos + 4)?.try_into().ok()?;
        self.pos += 4;
        Some(u32::from_be_bytes(bytes))
    }

    fn skip(&mut self, n: usize) -> Option<()> {
        let end = self.pos.checked_add(n)?;
        if end > self.buf.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
