use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use sign_core::cipher::rc4;
use sign_core::codec::{Alphabet, encode};
use sign_core::hash::sm3;
use sign_core::{Clock, RandomSource, SignError, SignResult};
use tracing::{debug, trace};

use crate::field_table::FieldTable;

/**
    Offsets folded into the checksum byte at offset 72.
*/
const CHECKSUM_OFFSETS: [usize; 43] = [
    18, 20, 26, 30, 38, 40, 42, 21, 27, 31, 35, 39, 41, 43, 22, 28, 32, 36, 23, 29, 33, 37, 44, 45,
    46, 47, 48, 49, 50, 24, 25, 52, 53, 54, 55, 57, 58, 59, 60, 65, 66, 70, 71,
];

/**
    Order in which table offsets are emitted into the cipher buffer.
*/
const EMIT_ORDER: [usize; 44] = [
    18, 20, 52, 26, 30, 34, 58, 38, 40, 53, 42, 21, 27, 54, 55, 31, 35, 57, 39, 41, 43, 22, 28, 32,
    60, 36, 23, 29, 33, 37, 44, 45, 59, 46, 47, 48, 49, 50, 24, 25, 65, 66, 70, 71,
];

const CHECKSUM_OFFSET: usize = 72;
const BUFFER_KEY: [u8; 1] = [121];
const SALT_OPTIONS: [(u8, u8); 3] = [(3, 45), (1, 0), (1, 5)];

/**
    Three-integer protocol selector.

    The third element also keys the user-agent cipher step.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant(pub [u32; 3]);

impl Variant {
    /// Content detail endpoints.
    pub const DETAIL: Self = Self([0, 1, 14]);
    /// Comment reply endpoints.
    pub const REPLY: Self = Self([0, 1, 8]);
}

impl Default for Variant {
    fn default() -> Self {
        Self::DETAIL
    }
}

/**
    Fixed browser-environment parameters mixed into every device signature.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Pipe-delimited screen and platform descriptor.
    pub environment: String,
    pub suffix: String,
    pub page_id: u32,
    pub app_id: u32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            environment: "1536|747|1536|834|0|30|0|0|1536|834|1536|864|1525|747|24|24|Win32"
                .to_owned(),
            suffix: "cus".to_owned(),
            page_id: 6241,
            app_id: 6383,
        }
    }
}

static DEFAULT_PROFILE: LazyLock<DeviceProfile> = LazyLock::new(DeviceProfile::default);

impl DeviceProfile {
    /**
        Load a profile from JSON. Missing fields take their defaults.
    */
    pub fn from_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /**
        Produce the device signature for a raw query string and user agent.
    */
    pub fn sign(
        &self,
        query: &str,
        user_agent: &str,
        variant: Variant,
        clock: &impl Clock,
        rand: &mut impl RandomSource,
    ) -> SignResult<String> {
        let env_len = u16::try_from(self.environment.len()).map_err(|_| {
            SignError::invalid("environment", "descriptor exceeds 65535 bytes")
        })?;
        let [v0, v1, v2] = variant.0;

        let query_digest = sm3(&sm3(format!("{query}{}", self.suffix).as_bytes()));
        let suffix_digest = sm3(&sm3(self.suffix.as_bytes()));
        let ua_cipher = rc4(&[0, 1, v2 as u8], user_agent.as_bytes())?;
        let ua_digest = sm3(encode(Alphabet::S3, &ua_cipher).as_bytes());

        // Read once; the start and end stamps are the same instant.
        let ts = clock.now_millis();

        let mut table = FieldTable::new();
        table.set(18, 44)?;
        write_timestamp(&mut table, [20, 21, 22, 23, 24, 25], ts)?;
        table.set_all(26, &v0.to_be_bytes())?;
        table.set_all(30, &[(v1 / 256) as u8, v1 as u8, (v1 >> 24) as u8, (v1 >> 16) as u8])?;
        table.set_all(34, &v2.to_be_bytes())?;
        table.set_all(38, &query_digest[21..23])?;
        table.set_all(40, &suffix_digest[21..23])?;
        table.set_all(42, &ua_digest[23..25])?;
        write_timestamp(&mut table, [44, 45, 46, 47, 49, 50], ts)?;
        table.set(48, 3)?;
        table.set_all(52, &self.page_id.to_be_bytes())?;
        table.set_all(57, &self.app_id.to_le_bytes())?;
        table.set_all(65, &env_len.to_le_bytes())?;
        table.set_all(70, &[0, 0])?;
        table.set(CHECKSUM_OFFSET, table.xor_of(&CHECKSUM_OFFSETS)?)?;

        let mut buffer = table.gather(&EMIT_ORDER)?;
        buffer.extend_from_slice(self.environment.as_bytes());
        buffer.push(table.get(CHECKSUM_OFFSET)?);
        trace!(buffer_len = buffer.len(), "assembled device field buffer");
        let ciphertext = rc4(&BUFFER_KEY, &buffer)?;

        let mut payload = Vec::with_capacity(12 + ciphertext.len());
        for (o0, o1) in SALT_OPTIONS {
            payload.extend_from_slice(&salt_bytes(rand.next_draw(), o0, o1));
        }
        payload.extend_from_slice(&ciphertext);

        let mut out = encode(Alphabet::S4, &payload);
        out.push('=');
        debug!(?variant, ts, len = out.len(), "built device signature");
        Ok(out)
    }
}

/**
    Device signature with the default profile.
*/
pub fn device_sign(
    query: &str,
    user_agent: &str,
    variant: Variant,
    clock: &impl Clock,
    rand: &mut impl RandomSource,
) -> SignResult<String> {
    DEFAULT_PROFILE.sign(query, user_agent, variant, clock, rand)
}

/**
    Bits 24..31, 16..23, 8..15 and 0..7 of `ts`, then `ts / 2^32` and
    `ts / 2^40`, each truncated to a byte.
*/
fn write_timestamp(table: &mut FieldTable, offsets: [usize; 6], ts: u64) -> SignResult<()> {
    let values = [ts >> 24, ts >> 16, ts >> 8, ts, ts >> 32, ts >> 40];
    for (offset, value) in offsets.into_iter().zip(values) {
        table.set(offset, value as u8)?;
    }
    Ok(())
}

fn salt_bytes(draw: u32, o0: u8, o1: u8) -> [u8; 4] {
    let lo = draw as u8;
    let hi = (draw >> 8) as u8;
    [
        (lo & 170) | (o0 & 85),
        (lo & 85) | (o0 & 170),
        (hi & 170) | (o1 & 85),
        (hi & 85) | (o1 & 170),
    ]
}
