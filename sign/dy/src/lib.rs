/*!
    Request signers for the short-video platform.

    - [`device_sign`]: the device-fingerprint query signature
    - [`ticket_guard_sign`] and [`ticket_guard_headers`]: per-request
      ticket-guard client data
    - [`canonical_sign`]: SigV4-style signing for upload endpoints
*/

mod canonical;
mod device_sign;
mod field_table;
mod ticket_guard;

pub use self::canonical::{CanonicalRequest, CanonicalVariant, Credentials, canonical_sign};
pub use self::device_sign::{DeviceProfile, Variant, device_sign};
pub use self::field_table::{FIELD_TABLE_LEN, FieldTable};
pub use self::ticket_guard::{
    TICKET_GUARD_COMMON_NAME, TicketGuardConfig, TicketGuardVersion, ticket_guard_headers,
    ticket_guard_sign,
};
