//! Wire decode for state-transition header transactions.
//!
//! A transition header is a Dash special transaction: the 32-bit version
//! field packs a 16-bit version and a 16-bit type, and special types carry a
//! length-prefixed extra payload after the locktime. For transition headers
//! the extra payload embeds the hash of the off-chain data packet, binding
//! the two together.

use crate::domain::hash::txid_hex;

/// Special-transaction type for a state transition header.
pub const TRANSITION_TX_TYPE: u16 = 12;

/// Decode failures for header transactions.
#[derive(Debug, thiserror::Error)]
pub enum HeaderDecodeError {
    #[error("transaction data truncated at byte {0}")]
    Truncated(usize),
    #[error("trailing bytes after transaction")]
    TrailingBytes,
    #[error("not a transition transaction (type {0})")]
    UnexpectedType(u16),
    #[error("transaction has no extra payload")]
    MissingPayload,
    #[error("invalid extra payload: {0}")]
    InvalidPayload(&'static str),
}

/// Parsed transition header, keeping the raw serialization for rebroadcast.
#[derive(Debug, Clone)]
pub struct TransitionHeader {
    raw: Vec<u8>,
    pub version: u16,
    pub tx_type: u16,
    pub payload: TransitionPayload,
}

/// Extra payload of a transition header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPayload {
    pub version: u16,
    /// Identity registration transaction this transition belongs to
    pub reg_tx_id: [u8; 32],
    /// Previous transition in the identity's chain (zero for the first)
    pub hash_prev_sub_tx: [u8; 32],
    /// Fee paid in credits
    pub credit_fee: u64,
    /// Hash of the off-chain data packet
    pub hash_st_packet: [u8; 32],
    /// Identity signature over the payload
    pub signature: Vec<u8>,
}

impl TransitionHeader {
    /// Decode a transition header from its wire encoding.
    pub fn decode(raw: &[u8]) -> Result<Self, HeaderDecodeError> {
        let mut reader = Reader::new(raw);

        let version_and_type = reader.read_u32()?;
        let version = (version_and_type & 0xffff) as u16;
        let tx_type = (version_and_type >> 16) as u16;

        if tx_type != TRANSITION_TX_TYPE {
            return Err(HeaderDecodeError::UnexpectedType(tx_type));
        }

        let input_count = reader.read_varint()?;
        for _ in 0..input_count {
            reader.skip(32)?; // prev txid
            reader.read_u32()?; // prev vout
            let script_len = reader.read_varint()? as usize;
            reader.skip(script_len)?;
            reader.read_u32()?; // sequence
        }

        let output_count = reader.read_varint()?;
        for _ in 0..output_count {
            reader.read_u64()?; // value
            let script_len = reader.read_varint()? as usize;
            reader.skip(script_len)?;
        }

        reader.read_u32()?; // locktime

        if reader.remaining() == 0 {
            return Err(HeaderDecodeError::MissingPayload);
        }

        let payload_len = reader.read_varint()? as usize;
        let payload_bytes = reader.read_bytes(payload_len)?;

        if reader.remaining() != 0 {
            return Err(HeaderDecodeError::TrailingBytes);
        }

        let payload = TransitionPayload::decode(payload_bytes)?;

        Ok(Self {
            raw: raw.to_vec(),
            version,
            tx_type,
            payload,
        })
    }

    /// Raw serialization, byte-identical to the decoded input.
    pub fn to_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Transaction id: reversed double SHA-256 of the raw serialization.
    pub fn txid(&self) -> String {
        txid_hex(&self.raw)
    }

    /// Lower-case hex of the embedded packet hash.
    pub fn packet_hash_hex(&self) -> String {
        hex::encode(self.payload.hash_st_packet)
    }

    /// Whether the header binds an off-chain packet.
    pub fn requires_packet(&self) -> bool {
        self.payload.hash_st_packet != [0u8; 32]
    }
}

impl TransitionPayload {
    fn decode(bytes: &[u8]) -> Result<Self, HeaderDecodeError> {
        let mut reader = Reader::new(bytes);

        let version = reader
            .read_u16()
            .map_err(|_| HeaderDecodeError::InvalidPayload("version"))?;
        let reg_tx_id = reader
            .read_hash()
            .map_err(|_| HeaderDecodeError::InvalidPayload("regTxId"))?;
        let hash_prev_sub_tx = reader
            .read_hash()
            .map_err(|_| HeaderDecodeError::InvalidPayload("hashPrevSubTx"))?;
        let credit_fee = reader
            .read_u64()
            .map_err(|_| HeaderDecodeError::InvalidPayload("creditFee"))?;
        let hash_st_packet = reader
            .read_hash()
            .map_err(|_| HeaderDecodeError::InvalidPayload("hashSTPacket"))?;
        let sig_len = reader
            .read_varint()
            .map_err(|_| HeaderDecodeError::InvalidPayload("signature length"))?
            as usize;
        let signature = reader
            .read_bytes(sig_len)
            .map_err(|_| HeaderDecodeError::InvalidPayload("signature"))?
            .to_vec();

        if reader.remaining() != 0 {
            return Err(HeaderDecodeError::InvalidPayload("trailing bytes"));
        }

        Ok(Self {
            version,
            reg_tx_id,
            hash_prev_sub_tx,
            credit_fee,
            hash_st_packet,
            signature,
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + 32 + 32 + 8 + 32 + 1 + self.signature.len());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.reg_tx_id);
        out.extend_from_slice(&self.hash_prev_sub_tx);
        out.extend_from_slice(&self.credit_fee.to_le_bytes());
        out.extend_from_slice(&self.hash_st_packet);
        write_varint(&mut out, self.signature.len() as u64);
        out.extend_from_slice(&self.signature);
        out
    }
}

/// Transaction version carrying special-transaction payloads.
const SPECIAL_TX_VERSION: u16 = 3;

/// Serialize a minimal transition transaction (no inputs or outputs) around
/// the given payload. Used by clients assembling transitions and by tests.
pub fn encode_transition_tx(payload: &TransitionPayload) -> Vec<u8> {
    let payload_bytes = payload.to_bytes();
    let mut out = Vec::with_capacity(4 + 1 + 1 + 4 + 3 + payload_bytes.len());

    let version_and_type = (SPECIAL_TX_VERSION as u32) | ((TRANSITION_TX_TYPE as u32) << 16);
    out.extend_from_slice(&version_and_type.to_le_bytes());
    write_varint(&mut out, 0); // inputs
    write_varint(&mut out, 0); // outputs
    out.extend_from_slice(&0u32.to_le_bytes()); // locktime
    write_varint(&mut out, payload_bytes.len() as u64);
    out.extend_from_slice(&payload_bytes);
    out
}

fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Little-endian cursor over a byte slice.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], HeaderDecodeError> {
        if self.remaining() < len {
            return Err(HeaderDecodeError::Truncated(self.pos));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), HeaderDecodeError> {
        self.read_bytes(len).map(|_| ())
    }

    fn read_u16(&mut self) -> Result<u16, HeaderDecodeError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, HeaderDecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, HeaderDecodeError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_hash(&mut self) -> Result<[u8; 32], HeaderDecodeError> {
        let bytes = self.read_bytes(32)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(bytes);
        Ok(hash)
    }

    fn read_varint(&mut self) -> Result<u64, HeaderDecodeError> {
        let first = self.read_bytes(1)?[0];
        match first {
            0xfd => self.read_u16().map(u64::from),
            0xfe => self.read_u32().map(u64::from),
            0xff => self.read_u64(),
            n => Ok(u64::from(n)),
        }
    }
}
