// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! V2 signed URLs.
//!
//! A signed URL grants time-limited access to a blob to anyone holding the
//! URL, with no further authentication. The signature covers the HTTP
//! method, the expiration instant, the blob path, and optionally the
//! content type and MD5 the request must carry:
//!
//! ```text
//! {METHOD}\n{MD5}\n{CONTENT_TYPE}\n{EXPIRES_EPOCH_SECONDS}\n/{bucket}/{name}
//! ```
//!
//! signed with the service account's RSA key (PKCS#1 v1.5, SHA-256).

use crate::model::BlobInfo;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use gax::clock::Clock;
use gax::error::Error;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::{Digest, Sha256};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use std::time::{Duration, UNIX_EPOCH};

const HOST: &str = "https://storage.googleapis.com";

/// A service account identity and key used to mint signed URLs.
#[derive(Clone)]
pub struct SigningCredentials {
    client_email: String,
    key: RsaPrivateKey,
}

impl SigningCredentials {
    pub fn new<E: Into<String>>(client_email: E, key: RsaPrivateKey) -> Self {
        Self {
            client_email: client_email.into(),
            key,
        }
    }

    /// Loads the key from unencrypted PKCS#8 DER, the binary form of the
    /// `private_key` field in a service account JSON file.
    pub fn from_pkcs8_der<E: Into<String>>(client_email: E, der: &[u8]) -> gax::Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_der(der).map_err(Error::authentication)?;
        Ok(Self::new(client_email, key))
    }

    /// Loads the key from unencrypted PKCS#8 PEM.
    pub fn from_pkcs8_pem<E: Into<String>>(client_email: E, pem: &str) -> gax::Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem).map_err(Error::authentication)?;
        Ok(Self::new(client_email, key))
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }
}

impl std::fmt::Debug for SigningCredentials {
    // The key never appears in debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

/// The HTTP method a signed URL authorizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Head,
    Put,
    Post,
    Delete,
}

impl HttpMethod {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// An option for [crate::client::Storage::sign_url].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignUrlOption {
    /// Signs for this method instead of the default `GET`.
    Method(HttpMethod),
    /// Covers the blob's content type; requests must then send a matching
    /// `Content-Type` header.
    WithContentType,
    /// Covers the blob's MD5; requests must then send a matching
    /// `Content-MD5` header.
    WithMd5,
}

pub(crate) fn sign_url(
    credentials: &SigningCredentials,
    clock: &dyn Clock,
    blob: &BlobInfo,
    expires_in: Duration,
    options: &[SignUrlOption],
) -> gax::Result<url::Url> {
    let mut method = HttpMethod::default();
    let mut with_content_type = false;
    let mut with_md5 = false;
    for opt in options {
        match opt {
            SignUrlOption::Method(m) => method = *m,
            SignUrlOption::WithContentType => with_content_type = true,
            SignUrlOption::WithMd5 => with_md5 = true,
        }
    }

    let content_type = if with_content_type {
        blob.content_type().ok_or_else(|| {
            Error::other("signing covers the content type but the blob does not carry one")
        })?
    } else {
        ""
    };
    let md5 = if with_md5 {
        blob.md5().ok_or_else(|| {
            Error::other("signing covers the MD5 hash but the blob does not carry one")
        })?
    } else {
        ""
    };

    let now = clock
        .now()
        .duration_since(UNIX_EPOCH)
        .map_err(Error::other)?;
    let expires = now.as_secs() + expires_in.as_secs();

    let path = format!("/{}/{}", blob.bucket(), blob.name());
    let to_sign = format!(
        "{}\n{}\n{}\n{}\n{}",
        method.as_str(),
        md5,
        content_type,
        expires,
        path
    );
    let digest = Sha256::digest(to_sign.as_bytes());
    let signature = credentials
        .key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(Error::other)?;

    let mut url = url::Url::parse(HOST).map_err(Error::other)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::other("malformed base URL"))?;
        segments.push(blob.bucket());
        // Slashes in the blob name stay path delimiters.
        segments.extend(blob.name().split('/'));
    }
    url.query_pairs_mut()
        .append_pair("GoogleAccessId", credentials.client_email())
        .append_pair("Expires", &expires.to_string())
        .append_pair("Signature", &BASE64.encode(&signature));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlobInfo;
    use rsa::RsaPublicKey;
    use rsa::pkcs8::DecodePublicKey;
    use std::time::SystemTime;

    // An RSA key pair dedicated to tests: PKCS#8 private key and SPKI
    // public key, both base64.
    const PRIVATE_KEY_B64: &str = "MIICdwIBADANBgkqhkiG9w0BAQEFAASCAmEwggJdAgEAAoG\
        BAL2xolH1zrISQ8+GzOV29BNjjzq4/HIP8Psd1+cZb81vDklSF+95wB250MSE0BDc81pvIMwj5OmIfLg1NY6uB\
        1xavOPpVdx1z664AGc/BEJ1zInXGXaQ6s+SxGenVq40Yws57gikQGMZjttpf1Qbz4DjkxsbRoeaRHn06n9pH1e\
        jAgMBAAECgYEAkWcm0AJF5LMhbWKbjkxm/LG06UNApkHX6vTOOOODkonM/qDBnhvKCj8Tan+PaU2j7679Cd19q\
        xCm4SBQJET7eBhqLD9L2j9y0h2YUQnLbISaqUS1/EXcr2C1Lf9VCEn1y/GYuDYqs85rGoQ4ZYfM9ClROSq86fH\
        +cbIIssqJqukCQQD18LjfJz/ichFeli5/l1jaFid2XoCH3T6TVuuysszVx68fh60gSIxEF/0X2xB+wuPxTP4IQ\
        +t8tD/ktd232oWXAkEAxXPych2QBHePk9/lek4tOkKBgfnDzex7S/pI0G1vpB3VmzBbCsokn9lpOv7JV8071GD\
        lW/7R6jlLfpQy3hN31QJAE10osSk99m5Uv8XDU3hvHnywDrnSFOBulNs7I47AYfSe7TSZhPkxUgsxejddTR27J\
        LyTI8N1PxRSE4feNSOXcQJAMMKJRJT4U6IS2rmXubREhvaVdLtxFxEnAYQ1JwNfZm/XqBMw6GEy2iaeTetNXVl\
        ZRQEIoscyn1y2v/No/F5iYQJBAKBOGASoQcBjGTOg/H/SfcE8QVNsKEpthRrs6CkpT80aZ/AV+ksfoIf2zw2M3\
        mAHfrO+TBLdz4sicuFQvlN9SEc=";
    const PUBLIC_KEY_B64: &str = "MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQC9saJR9c6y\
        EkPPhszldvQTY486uPxyD/D7HdfnGW/Nbw5JUhfvecAdudDEhNAQ3PNabyDMI+TpiHy4NTWOrgdcWrzj6VXcdc\
        +uuABnPwRCdcyJ1xl2kOrPksRnp1auNGMLOe4IpEBjGY7baX9UG8+A45MbG0aHmkR59Op/aR9XowIDAQAB";
    const ACCOUNT: &str = "account@gmail.com";

    #[derive(Debug)]
    struct FixedClock(SystemTime);
    impl Clock for FixedClock {
        fn now(&self) -> SystemTime {
            self.0
        }
    }

    fn credentials() -> SigningCredentials {
        let der = BASE64.decode(PRIVATE_KEY_B64).unwrap();
        SigningCredentials::from_pkcs8_der(ACCOUNT, &der).unwrap()
    }

    fn public_key() -> RsaPublicKey {
        let der = BASE64.decode(PUBLIC_KEY_B64).unwrap();
        RsaPublicKey::from_public_key_der(&der).unwrap()
    }

    fn verify(message: &str, signature_b64: &str) {
        let signature = BASE64.decode(signature_b64).unwrap();
        let digest = Sha256::digest(message.as_bytes());
        public_key()
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &signature)
            .unwrap();
    }

    fn query<'a>(url: &'a url::Url, key: &str) -> String {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_else(|| panic!("missing query parameter {key} in {url}"))
    }

    #[test]
    fn default_method_and_empty_headers() {
        let clock = FixedClock(UNIX_EPOCH + Duration::from_millis(42000));
        let blob = BlobInfo::builder("b1", "n1").build();
        let url = sign_url(
            &credentials(),
            &clock,
            &blob,
            Duration::from_secs(14 * 24 * 3600),
            &[],
        )
        .unwrap();

        assert!(
            url.as_str()
                .starts_with("https://storage.googleapis.com/b1/n1?"),
            "{url}"
        );
        let expires = 42 + 1209600;
        assert_eq!(query(&url, "GoogleAccessId"), ACCOUNT);
        assert_eq!(query(&url, "Expires"), expires.to_string());

        let message = format!("GET\n\n\n{expires}\n/b1/n1");
        verify(&message, &query(&url, "Signature"));
    }

    #[test]
    fn options_cover_method_md5_and_content_type() {
        let clock = FixedClock(UNIX_EPOCH + Duration::from_millis(42000));
        let blob = BlobInfo::builder("b1", "n1")
            .set_content_type("text/plain")
            .set_md5("md5string".to_string())
            .build();
        let url = sign_url(
            &credentials(),
            &clock,
            &blob,
            Duration::from_secs(14 * 24 * 3600),
            &[
                SignUrlOption::Method(HttpMethod::Post),
                SignUrlOption::WithContentType,
                SignUrlOption::WithMd5,
            ],
        )
        .unwrap();

        let expires = 42 + 1209600;
        let message = format!("POST\nmd5string\ntext/plain\n{expires}\n/b1/n1");
        verify(&message, &query(&url, "Signature"));
    }

    #[test]
    fn md5_option_requires_md5() {
        let clock = FixedClock(UNIX_EPOCH + Duration::from_millis(42000));
        let blob = BlobInfo::builder("b1", "n1").build();
        let err = sign_url(
            &credentials(),
            &clock,
            &blob,
            Duration::from_secs(60),
            &[SignUrlOption::WithMd5],
        )
        .unwrap_err();
        assert!(err.to_string().contains("MD5"), "{err}");
    }

    #[test]
    fn slashes_in_blob_names_stay_delimiters() {
        let clock = FixedClock(UNIX_EPOCH + Duration::from_millis(42000));
        let blob = BlobInfo::builder("b1", "dir/n1").build();
        let url = sign_url(&credentials(), &clock, &blob, Duration::from_secs(60), &[]).unwrap();
        assert_eq!(url.path(), "/b1/dir/n1");
    }
}
