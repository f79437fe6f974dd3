/*!
    Request signers for the lifestyle-notes platform.

    - [`content_sign`] and [`content_sign_extra`]: the `x-s` / `x-t` pair
      and its `x-sc` companion
    - [`object_storage_query_sign`]: upload authorization strings
    - [`captcha_sign`], trace ids, and the `a1` / `webId` cookies
*/

mod captcha;
mod content_sign;
mod ids;
mod q_sign;

pub use self::captcha::captcha_sign;
pub use self::content_sign::{
    ContentProfile, ContentSignature, XS_PREFIX, content_sign, content_sign_extra,
};
pub use self::ids::{CookieIds, b3_trace_id, search_id, xray_trace_id};
pub use self::q_sign::{DEFAULT_EXPIRES, QSignOptions, object_storage_query_sign};
