use core::str::FromStr;
use core::time::Duration;

use chrono::{DateTime, Months, Utc};
use data_encoding::BASE64;
use p256::PublicKey;
use p256::ecdsa::DerSignature;
use p256::elliptic_curve::rand_core::CryptoRngCore;
use p256::pkcs8::EncodePublicKey;
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::builder::{Builder, CertificateBuilder, Profile, RequestBuilder};
use x509_cert::der::asn1::{GeneralizedTime, UtcTime};
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::der::pem::LineEnding;
use x509_cert::der::{DecodePem, EncodePem};
use x509_cert::ext::pkix::{ExtendedKeyUsage, KeyUsage, KeyUsages};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::{Time, Validity};

use super::KeyMaterial;
use crate::error::{SignError, SignResult};

const ID_KP_SERVER_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.1");

/**
    Extract the P-256 public key from a PEM certificate.
*/
pub(super) fn peer_public_key(pem: &str) -> SignResult<PublicKey> {
    let normalized = pem.replace("\r\n", "\n");
    let cert = Certificate::from_pem(normalized.trim().as_bytes())
        .map_err(|e| SignError::CertificateParse(e.to_string()))?;
    let point = cert
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| SignError::CertificateParse("public key has unused bits".into()))?;
    PublicKey::from_sec1_bytes(point)
        .map_err(|_| SignError::CertificateParse("public key is not a P-256 point".into()))
}

impl KeyMaterial {
    /**
        PKCS#10 request for `CN=<common_name>`, signed with ECDSA-SHA256.

        Returns base64 of the PEM text.
    */
    pub fn certificate_signing_request(&self, common_name: &str) -> SignResult<String> {
        let subject = common_name_subject(common_name)?;
        let signer = self.signing_key();
        let request = RequestBuilder::new(subject, &signer)
            .map_err(|e| SignError::CertificateBuild(e.to_string()))?
            .build::<DerSignature>()
            .map_err(|e| SignError::CertificateBuild(e.to_string()))?;
        let pem = request
            .to_pem(LineEnding::LF)
            .map_err(|e| SignError::Der(e.to_string()))?;
        Ok(BASE64.encode(pem.as_bytes()))
    }

    /**
        Self-signed certificate for `CN=<common_name>`, valid for one year
        from `now`, with a random positive 128-bit serial.

        Carries KeyUsage `digitalSignature | keyEncipherment` and the
        server-auth extended key usage. Returns base64 of the PEM text.
    */
    pub fn self_signed_certificate(
        &self,
        common_name: &str,
        now: DateTime<Utc>,
        rng: &mut impl CryptoRngCore,
    ) -> SignResult<String> {
        let subject = common_name_subject(common_name)?;

        let mut serial = [0u8; 16];
        rng.fill_bytes(&mut serial);
        serial[0] = (serial[0] & 0x7f) | 0x40;
        let serial =
            SerialNumber::new(&serial).map_err(|e| SignError::CertificateBuild(e.to_string()))?;

        let not_after = now
            .checked_add_months(Months::new(12))
            .ok_or_else(|| SignError::CertificateBuild("validity end overflows".into()))?;
        let validity = Validity {
            not_before: asn1_time(now)?,
            not_after: asn1_time(not_after)?,
        };

        let spki_der = self
            .public_key()
            .to_public_key_der()
            .map_err(|e| SignError::Der(e.to_string()))?;
        let spki = SubjectPublicKeyInfoOwned::try_from(spki_der.as_bytes())
            .map_err(|e| SignError::Der(e.to_string()))?;

        let signer = self.signing_key();
        let mut builder = CertificateBuilder::new(
            Profile::Manual { issuer: None },
            serial,
            validity,
            subject,
            spki,
            &signer,
        )
        .map_err(|e| SignError::CertificateBuild(e.to_string()))?;
        builder
            .add_extension(&KeyUsage(
                KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment,
            ))
            .map_err(|e| SignError::CertificateBuild(e.to_string()))?;
        builder
            .add_extension(&ExtendedKeyUsage(vec![ID_KP_SERVER_AUTH]))
            .map_err(|e| SignError::CertificateBuild(e.to_string()))?;

        let cert = builder
            .build::<DerSignature>()
            .map_err(|e| SignError::CertificateBuild(e.to_string()))?;
        let pem = cert
            .to_pem(LineEnding::LF)
            .map_err(|e| SignError::Der(e.to_string()))?;
        debug!(common_name, "built self-signed certificate");
        Ok(BASE64.encode(pem.as_bytes()))
    }
}

fn common_name_subject(common_name: &str) -> SignResult<Name> {
    if common_name.is_empty() || common_name.contains([',', '=', '+']) {
        return Err(SignError::invalid(
            "common name",
            "must be non-empty without RDN separators",
        ));
    }
    Name::from_str(&format!("CN={common_name}"))
        .map_err(|e| SignError::CertificateBuild(e.to_string()))
}

/**
    RFC 5280 time: UTCTime through 2049, GeneralizedTime after.
*/
fn asn1_time(at: DateTime<Utc>) -> SignResult<Time> {
    let secs = u64::try_from(at.timestamp())
        .map_err(|_| SignError::CertificateBuild("time precedes the unix epoch".into()))?;
    let dt = x509_cert::der::DateTime::from_unix_duration(Duration::from_secs(secs))
        .map_err(|e| SignError::Der(e.to_string()))?;
    if dt.year() < 2050 {
        let utc = UtcTime::from_date_time(dt).map_err(|e| SignError::Der(e.to_string()))?;
        Ok(Time::UtcTime(utc))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(dt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::tests::{KEY_A_RAW, KEY_B_RAW, SERVER_CERT_B};
    use p256::elliptic_curve::rand_core::OsRng;
    use x509_cert::der::Decode;
    use x509_cert::request::CertReq;

    fn decode_pem(b64: &str) -> String {
        String::from_utf8(BASE64.decode(b64.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn peer_key_from_certificate() {
        let b = KeyMaterial::from_raw_hex(KEY_B_RAW).unwrap();
        assert_eq!(&peer_public_key(SERVER_CERT_B).unwrap(), b.public_key());
        assert_eq!(
            &peer_public_key(&SERVER_CERT_B.replace('\n', "\r\n")).unwrap(),
            b.public_key()
        );
    }

    #[test]
    fn self_signed_certificate_fields() {
        let key = KeyMaterial::from_raw_hex(KEY_A_RAW).unwrap();
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let b64 = key
            .self_signed_certificate("bd-ticket-guard", now, &mut OsRng)
            .unwrap();
        let pem = decode_pem(&b64);
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));

        let cert = Certificate::from_pem(pem.as_bytes()).unwrap();
        let tbs = &cert.tbs_certificate;
        assert_eq!(tbs.subject.to_string(), "CN=bd-ticket-guard");
        assert_eq!(tbs.issuer, tbs.subject);

        let serial = tbs.serial_number.as_bytes();
        assert_eq!(serial.len(), 16);
        assert_eq!(serial[0] & 0xc0, 0x40);

        assert_eq!(
            tbs.validity.not_before.to_unix_duration().as_secs(),
            1_700_000_000
        );
        // 2023-11-14 plus twelve calendar months.
        assert_eq!(
            tbs.validity.not_after.to_unix_duration().as_secs(),
            1_731_622_400
        );
        assert_eq!(tbs.extensions.as_ref().map(Vec::len), Some(2));

        assert_eq!(&peer_public_key(&pem).unwrap(), key.public_key());
    }

    #[test]
    fn csr_carries_subject_and_key() {
        let key = KeyMaterial::from_raw_hex(KEY_A_RAW).unwrap();
        let pem = decode_pem(&key.certificate_signing_request("bd-ticket-guard").unwrap());
        let (label, der) = x509_cert::der::pem::decode_vec(pem.as_bytes()).unwrap();
        assert_eq!(label, "CERTIFICATE REQUEST");
        let req = CertReq::from_der(&der).unwrap();
        assert_eq!(req.info.subject.to_string(), "CN=bd-ticket-guard");
        assert_eq!(
            req.info.public_key.subject_public_key.as_bytes().unwrap(),
            key.public_key_uncompressed().as_slice()
        );
    }

    #[test]
    fn rejects_bad_common_name() {
        let key = KeyMaterial::from_raw_hex(KEY_A_RAW).unwrap();
        let err = key.certificate_signing_request("a,b").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }
}
