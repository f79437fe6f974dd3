use hex_literal::hex;

/**
    Standard base64 symbols (RFC 4648), also published as device alphabet `s0`.
*/
pub const STANDARD_SYMBOLS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";

/**
    Device-signature alphabets `s1` through `s4`.

    `s1` and `s2` carry a 65th `=` that is never selected, since only the
    low six bits of each group index the table.
*/
pub const S1_SYMBOLS: &str = "Dkdpgh4ZKsQB80/Mfvw36XI1R25+WUAlEi7NLboqYTOPuzmFjJnryx9HVGcaStCe=";
pub const S2_SYMBOLS: &str = "Dkdpgh4ZKsQB80/Mfvw36XI1R25-WUAlEi7NLboqYTOPuzmFjJnryx9HVGcaStCe=";
pub const S3_SYMBOLS: &str = "ckdp1h4ZKsUB80/Mfvw36XIgR25+WQAlEi7NLboqYTOPuzmFjJnryx9HVGDaStCe";
pub const S4_SYMBOLS: &str = "Dkdpgh2ZmsQB80/MfvV36XI1R45-WUAlEixNLwoqYTOPuzKFjJnry79HbGcaStCe";

/**
    Content-platform substitute for the standard base64 table.
*/
pub const LOOKUP_SYMBOLS: &str = "ZmserbBoHQtNP+wOcza/LpngG8yJq42KWYj0DSfdikx3VT16IlUAFM97hECvuRX5";

/**
    Captcha-signature alphabet. The 65th symbol is unreachable for the same
    reason as in `s1`.
*/
pub const CAPTCHA_SYMBOLS: &str =
    "A4NjFqYu5wPHsO0XTdDgMa2r1ZQocVte9UJBvk6/7=yRnhISGKblCWi+LpfE8xzm3";

/**
    Base58 symbols; the first symbol stands in for each leading zero byte.
*/
pub const BASE58_SYMBOLS: &str = "NOPQRStuvwxWXYZabcyz012DEFTKLMdefghijkl4563GHIJBC7mnop89+/";

/**
    Fixed XOR table applied by [`crate::cipher::xor_transform`].
*/
pub const XOR_TABLE: [u8; 200] = hex!(
    "af572b95ca65b2d9ec76bb5d2e97cb653299cc663399cc663399cce673399cce"
    "6733190c06030100000000008040209048241289c4e271381c0e0703018040a0"
    "5028148ac56231180c0683c16030984c2693c964b259ac56abd5eaf5fafd7e3f"
    "9f4f279349a4d2e9743a9d4e279349a4d2e9f47a3d1e8f47239148a4d269341a"
    "8d4623110884422190c86432994ca6d3e974baddee773b1d8e47a35128148ac5"
    "623198cce6f3f97c3e1f8f47a3d168b45aad562b158ac5e2f1f87c3e9f4f2793"
    "49a4d269b45aad56"
);

/**
    Reflected IEEE 802.3 polynomial; also the final mask of the `mrc` checksum.
*/
pub const CRC32_IEEE_POLY: u32 = 0xEDB8_8320;
