use std::collections::BTreeMap;
use std::sync::LazyLock;

use data_encoding::BASE64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sign_core::cipher::aes128_cbc_encrypt;
use sign_core::codec::{be_split_u32, mrc};
use sign_core::hash::md5_hex;
use sign_core::{Clock, Cookies, SignError, SignResult};
use tracing::{debug, trace};

use crate::ids::{b3_trace_id, xray_trace_id};

/**
    Prefix of every x-s token.
*/
pub const XS_PREFIX: &str = "XYW_";

const AES_KEY_WORDS: [u32; 4] = [929_260_340, 1_633_971_297, 895_580_464, 925_905_270];
const AES_IV: &[u8; 16] = b"4uzjr7mbsibcaldp";
const DESCRIPTOR_FLAGS: &str = "0|0|0|1|0|0|1|0|0|0|1|0|0|0|0|1|0|0|0";

static AES_KEY: LazyLock<[u8; 16]> = LazyLock::new(|| {
    let mut key = [0u8; 16];
    for (chunk, word) in key.chunks_exact_mut(4).zip(AES_KEY_WORDS) {
        chunk.copy_from_slice(&be_split_u32(word));
    }
    key
});

/**
    Client identity literals embedded in the content signatures.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentProfile {
    pub app_id: String,
    /// Operating-system label written into x-sc.
    pub platform: String,
}

impl Default for ContentProfile {
    fn default() -> Self {
        Self {
            app_id: "xhs-pc-web".to_owned(),
            platform: "Windows".to_owned(),
        }
    }
}

static DEFAULT_PROFILE: LazyLock<ContentProfile> = LazyLock::new(ContentProfile::default);

/**
    The x-s token and the x-t timestamp it was built for.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSignature {
    pub xs: String,
    pub xt: String,
}

// Field order is the serialized key order.
#[derive(Serialize)]
struct XsEnvelope<'a> {
    #[serde(rename = "appID")]
    app_id: &'a str,
    payload: String,
    #[serde(rename = "signSvn")]
    sign_svn: &'static str,
    #[serde(rename = "signType")]
    sign_type: &'static str,
    #[serde(rename = "signVersion")]
    sign_version: &'static str,
}

// Field order is the serialized key order: "x1" < "x10" < "x2".
#[derive(Serialize)]
struct XscPayload<'a> {
    s0: u32,
    s1: &'static str,
    x0: &'static str,
    x1: &'a str,
    x10: u32,
    x2: &'a str,
    x3: &'a str,
    x4: &'a str,
    x5: &'a str,
    x6: &'a str,
    x7: &'a str,
    x8: &'a str,
    x9: String,
}

/**
    Bytes of `text` after form-escaping it and decoding only the `%XX`
    escapes: every byte is kept except space, which stays `+`.
*/
fn form_bytes(text: &str) -> Vec<u8> {
    text.bytes()
        .map(|b| if b == b' ' { b'+' } else { b })
        .collect()
}

fn require<'a>(field: &str, value: &'a str) -> SignResult<&'a str> {
    if value.is_empty() {
        Err(SignError::MissingField(field.to_owned()))
    } else {
        Ok(value)
    }
}

impl ContentProfile {
    pub fn from_json(json: &str) -> SignResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /**
        Build the x-s and x-t pair for `url` (path plus query).
    */
    pub fn sign(
        &self,
        url: &str,
        device_id: &str,
        clock: &impl Clock,
    ) -> SignResult<ContentSignature> {
        let url = require("url", url)?;
        let device_id = require("device_id", device_id)?;
        let xt = clock.now_millis().to_string();

        let descriptor = format!(
            "x1={};x2={DESCRIPTOR_FLAGS};x3={device_id};x4={xt};",
            md5_hex(format!("url={url}").as_bytes())
        );
        let ciphertext = aes128_cbc_encrypt(
            &AES_KEY,
            AES_IV,
            BASE64.encode(descriptor.as_bytes()).as_bytes(),
        );
        trace!(ciphertext_len = ciphertext.len(), "encrypted x-s descriptor");

        let envelope = XsEnvelope {
            app_id: &self.app_id,
            payload: hex::encode(ciphertext),
            sign_svn: "56",
            sign_type: "x2",
            sign_version: "1",
        };
        let json = serde_json::to_string(&envelope)?;
        let xs = format!("{XS_PREFIX}{}", BASE64.encode(json.as_bytes()));

        debug!(xt = %xt, len = xs.len(), "built x-s");
        Ok(ContentSignature { xs, xt })
    }

    /**
        Build the x-sc companion token for an existing x-s / x-t pair.
    */
    pub fn sign_extra(
        &self,
        signature: &ContentSignature,
        device_id: &str,
        x1: &str,
        x4: &str,
        b1: &str,
    ) -> SignResult<String> {
        let xs = require("xs", &signature.xs)?;
        let xt = require("xt", &signature.xt)?;
        let device_id = require("device_id", device_id)?;
        let b1 = require("b1", b1)?;

        let checksum = mrc(format!("{xt}{xs}{b1}").as_bytes());
        let payload = XscPayload {
            s0: 5,
            s1: "",
            x0: "1",
            x1,
            x10: 24,
            x2: &self.platform,
            x3: &self.app_id,
            x4,
            x5: device_id,
            x6: xt,
            x7: xs,
            x8: b1,
            x9: checksum.to_string(),
        };
        let json = serde_json::to_string(&payload)?;
        let bytes = form_bytes(&json);

        debug!(x9 = checksum, "built x-sc");
        Ok(BASE64.encode(&bytes))
    }

    /**
        [`Self::sign`] with the device id read from the `a1` cookie.
    */
    pub fn sign_from_cookies(
        &self,
        url: &str,
        cookie_header: &str,
        clock: &impl Clock,
    ) -> SignResult<ContentSignature> {
        let cookies = Cookies::parse(cookie_header);
        self.sign(url, cookies.require("a1")?, clock)
    }

    /**
        [`Self::sign_extra`] with `a1`, `x1`, `x4` and `b1` read from cookies.
    */
    pub fn sign_extra_from_cookies(
        &self,
        signature: &ContentSignature,
        cookie_header: &str,
    ) -> SignResult<String> {
        let cookies = Cookies::parse(cookie_header);
        self.sign_extra(
            signature,
            cookies.require("a1")?,
            cookies.require("x1")?,
            cookies.require("x4")?,
            cookies.require("b1")?,
        )
    }

    /**
        Every content header for one request: `x-s`, `x-t`, `x-sc` and the
        two trace ids.
    */
    pub fn sign_headers(
        &self,
        url: &str,
        cookie_header: &str,
        clock: &impl Clock,
        rng: &mut impl Rng,
    ) -> SignResult<BTreeMap<String, String>> {
        let signature = self.sign_from_cookies(url, cookie_header, clock)?;
        let xsc = self.sign_extra_from_cookies(&signature, cookie_header)?;
        let b3 = b3_trace_id(rng);
        let xray = xray_trace_id(&b3);

        Ok(BTreeMap::from([
            ("x-s".to_owned(), signature.xs),
            ("x-t".to_owned(), signature.xt),
            ("x-sc".to_owned(), xsc),
            ("x-b3-traceid".to_owned(), b3),
            ("x-xray-traceid".to_owned(), xray),
        ]))
    }
}

/**
    x-s and x-t with the default profile.
*/
pub fn content_sign(
    url: &str,
    device_id: &str,
    clock: &impl Clock,
) -> SignResult<ContentSignature> {
    DEFAULT_PROFILE.sign(url, device_id, clock)
}

/**
    x-sc with the default profile.
*/
pub fn content_sign_extra(
    xs: &str,
    xt: &str,
    device_id: &str,
    x1: &str,
    x4: &str,
    b1: &str,
) -> SignResult<String> {
    let signature = ContentSignature {
        xs: xs.to_owned(),
        xt: xt.to_owned(),
    };
    DEFAULT_PROFILE.sign_extra(&signature, device_id, x1, x4, b1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sign_core::FixedClock;

    const URL: &str = "/api/sns/web/v1/feed";
    const CLOCK: FixedClock = FixedClock(1_700_000_000_000);
    const XS: &str = "XYW_eyJhcHBJRCI6Inhocy1wYy13ZWIiLCJwYXlsb2FkIjoiOGY1ZDJkYzY3ZWI3ZDJjODIyYzk0Yjc3ODc4N2EzN2U4YzJlMTk1ZTdlM2E3Mzk0ODZmNGQ2YWZmYmEzYTlmNmRkZWM2YWY2MzYwNWY0YzM3YjU4YThmOTJlZmVhNTFjZTcxZWQxZmMxYjgzZjlmYTNkZWE1MDYyZDRiNWM1ZDZkZmQ1ODQzYzVhNDY3NmM3NmY1ODQxMDU1NDI2YmYwZWQ1NzJiZDRjNzIxZGI1YzlkNGEwZTM5Njc5YzNjZDBhZmNmZjhhMzMxMWRjZTBmYTg1ZDM4YWQ3MDRjNDcyYTFiYTI0Mzk3MTEyMDQ2MTNhZGNiNjY5YTI1Y2NhNGRmNTY5NGYyMGM4YjVlZGY0ZTkxYmI3NGIzYzIxNjJkYjU0MDI0NDZlYzFjN2NjY2UwNzQ0ZThhNDQ3NGJmYjhjOTQiLCJzaWduU3ZuIjoiNTYiLCJzaWduVHlwZSI6IngyIiwic2lnblZlcnNpb24iOiIxIn0=";
    const XSC: &str = "eyJzMCI6NSwiczEiOiIiLCJ4MCI6IjEiLCJ4MSI6IjQuMi4yIiwieDEwIjoyNCwieDIiOiJXaW5kb3dzIiwieDMiOiJ4aHMtcGMtd2ViIiwieDQiOiI0LjY4LjAiLCJ4NSI6ImRldmljZUlkIiwieDYiOiIxNzAwMDAwMDAwMDAwIiwieDciOiJYWVdfZXlKaGNIQkpSQ0k2SW5ob2N5MXdZeTEzWldJaUxDSndZWGxzYjJGa0lqb2lPR1kxWkRKa1l6WTNaV0kzWkRKak9ESXlZemswWWpjM09EYzROMkV6TjJVNFl6SmxNVGsxWlRkbE0yRTNNemswT0RabU5HUTJZV1ptWW1FellUbG1ObVJrWldNMllXWTJNell3TldZMFl6TTNZalU0WVRobU9USmxabVZoTlRGalpUY3haV1F4Wm1NeFlqZ3paamxtWVROa1pXRTFNRFl5WkRSaU5XTTFaRFprWm1RMU9EUXpZelZoTkRZM05tTTNObVkxT0RReE1EVTFOREkyWW1Zd1pXUTFOekppWkRSak56SXhaR0kxWXpsa05HRXdaVE01TmpjNVl6TmpaREJoWm1ObVpqaGhNek14TVdSalpUQm1ZVGcxWkRNNFlXUTNNRFJqTkRjeVlURmlZVEkwTXprM01URXlNRFEyTVROaFpHTmlOalk1WVRJMVkyTmhOR1JtTlRZNU5HWXlNR000WWpWbFpHWTBaVGt4WW1JM05HSXpZekl4TmpKa1lqVTBNREkwTkRabFl6RmpOMk5qWTJVd056UTBaVGhoTkRRM05HSm1ZamhqT1RRaUxDSnphV2R1VTNadUlqb2lOVFlpTENKemFXZHVWSGx3WlNJNkluZ3lJaXdpYzJsbmJsWmxjbk5wYjI0aU9pSXhJbjA9IiwieDgiOiJiMXZhbHVlIiwieDkiOiIzNjUyODkwNjIxIn0=";
    const COOKIES: &str = "a1=deviceId; x1=4.2.2; x4=4.68.0; b1=b1value; web_session=s";

    #[test]
    fn aes_key_from_words() {
        assert_eq!(&*AES_KEY, b"7cc4adla5ay0701v");
    }

    #[test]
    fn descriptor_ciphertext_fixture() {
        let descriptor = format!(
            "x1={};x2={DESCRIPTOR_FLAGS};x3=deviceId;x4=1700000000000;",
            md5_hex(format!("url={URL}").as_bytes())
        );
        assert!(descriptor.starts_with("x1=72ff6a81a0474a774ad1db6681c9614a;"));
        let ciphertext = aes128_cbc_encrypt(
            &AES_KEY,
            AES_IV,
            BASE64.encode(descriptor.as_bytes()).as_bytes(),
        );
        assert_eq!(
            ciphertext,
            hex!(
                "8f5d2dc67eb7d2c822c94b778787a37e8c2e195e7e3a739486f4d6affba3a9f6"
                "ddec6af63605f4c37b58a8f92efea51ce71ed1fc1b83f9fa3dea5062d4b5c5d6"
                "dfd5843c5a4676c76f5841055426bf0ed572bd4c721db5c9d4a0e39679c3cd0a"
                "fcff8a3311dce0fa85d38ad704c472a1ba2439711204613adcb669a25cca4df5"
                "694f20c8b5edf4e91bb74b3c2162db5402446ec1c7ccce0744e8a4474bfb8c94"
            )
        );
    }

    #[test]
    fn xs_golden_vector() {
        let signature = content_sign(URL, "deviceId", &CLOCK).unwrap();
        assert_eq!(signature.xt, "1700000000000");
        assert_eq!(signature.xs, XS);
    }

    #[test]
    fn xsc_golden_vector() {
        let xsc = content_sign_extra(
            XS,
            "1700000000000",
            "deviceId",
            "4.2.2",
            "4.68.0",
            "b1value",
        )
        .unwrap();
        assert_eq!(xsc, XSC);
    }

    #[test]
    fn cookie_helpers_match_explicit_calls() {
        let profile = ContentProfile::default();
        let signature = profile.sign_from_cookies(URL, COOKIES, &CLOCK).unwrap();
        assert_eq!(signature.xs, XS);
        assert_eq!(profile.sign_extra_from_cookies(&signature, COOKIES).unwrap(), XSC);
    }

    #[test]
    fn missing_a1_cookie_is_invalid_input() {
        let err = ContentProfile::default()
            .sign_from_cookies(URL, "web_session=s; b1=v", &CLOCK)
            .unwrap_err();
        assert_eq!(err, SignError::MissingField("a1".into()));
        assert_eq!(err.kind(), sign_core::ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_fields_rejected() {
        assert_eq!(
            content_sign("", "deviceId", &CLOCK),
            Err(SignError::MissingField("url".into()))
        );
        assert_eq!(
            content_sign(URL, "", &CLOCK),
            Err(SignError::MissingField("device_id".into()))
        );
        assert_eq!(
            content_sign_extra(XS, "1", "deviceId", "", "", ""),
            Err(SignError::MissingField("b1".into()))
        );
        assert_eq!(
            content_sign_extra("", "1", "deviceId", "", "", "b1"),
            Err(SignError::MissingField("xs".into()))
        );
    }

    #[test]
    fn spaces_become_plus_in_xsc() {
        let xsc = content_sign_extra("XYW_a b", "1", "d", "4.2.2", "4.68.0", "b").unwrap();
        let json = String::from_utf8(BASE64.decode(xsc.as_bytes()).unwrap()).unwrap();
        assert!(json.contains(r#""x7":"XYW_a+b""#));
    }

    #[test]
    fn header_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let headers = ContentProfile::default()
            .sign_headers(URL, COOKIES, &CLOCK, &mut rng)
            .unwrap();
        assert_eq!(headers["x-s"], XS);
        assert_eq!(headers["x-t"], "1700000000000");
        assert_eq!(headers["x-sc"], XSC);
        assert_eq!(headers["x-b3-traceid"].len(), 16);
        assert_eq!(headers["x-xray-traceid"], md5_hex(headers["x-b3-traceid"].as_bytes()));
    }

    #[test]
    fn profile_from_json() {
        let profile = ContentProfile::from_json(r#"{"app_id":"ugc"}"#).unwrap();
        assert_eq!(profile.app_id, "ugc");
        assert_eq!(profile.platform, "Windows");
        assert!(ContentProfile::from_json("[").is_err());
    }
}
