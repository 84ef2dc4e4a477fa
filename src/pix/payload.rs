//! PIX "copia e cola" payload encoding.
//!
//! EMV-MPM tag/length/value framing: merchant account information under
//! tag 26 (GUI `BR.GOV.BCB.PIX` + key), amount under tag 54, txid under
//! tag 62/05, and a CRC-16/XMODEM trailer under tag 63. The payload is
//! deterministic: the same key, amount and txid always encode to the
//! same string.

use crc::{CRC_16_XMODEM, Crc};

use crate::money::Amount;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

const MAX_MERCHANT_NAME: usize = 25;
const MAX_MERCHANT_CITY: usize = 15;

fn field(id: &str, value: &str) -> String {
    format!("{}{:02}{}", id, value.len(), value)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Build the full payload string, CRC trailer included.
pub fn build_payload(
    pix_key: &str,
    merchant_name: &str,
    merchant_city: &str,
    amount: Amount,
    txid: &str,
) -> String {
    let merchant_account = format!(
        "{}{}",
        field("00", "BR.GOV.BCB.PIX"),
        field("01", pix_key)
    );

    let body = [
        field("00", "01"),
        field("26", &merchant_account),
        field("52", "0000"),
        field("53", "986"), // BRL
        field("54", &amount.to_string()),
        field("58", "BR"),
        field("59", truncate(merchant_name, MAX_MERCHANT_NAME)),
        field("60", truncate(merchant_city, MAX_MERCHANT_CITY)),
        field("62", &field("05", txid)),
    ]
    .concat();

    let crc = CRC16.checksum(format!("{}6304", body).as_bytes());
    format!("{}6304{:04X}", body, crc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(minor: i64) -> Amount {
        Amount::from_minor_units(minor)
    }

    #[test]
    fn test_crc16_xmodem_known_vector() {
        assert_eq!(CRC16.checksum(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_payload_is_deterministic() {
        let a = build_payload("maria@example.com", "Maria Silva", "SAO PAULO", amount(10_000), "TX1");
        let b = build_payload("maria@example.com", "Maria Silva", "SAO PAULO", amount(10_000), "TX1");
        assert_eq!(a, b);

        let c = build_payload("maria@example.com", "Maria Silva", "SAO PAULO", amount(10_001), "TX1");
        assert_ne!(a, c);
    }

    #[test]
    fn test_payload_structure() {
        let p = build_payload("chave@pix.br", "Maria", "RECIFE", amount(12_345), "TXID99");
        assert!(p.starts_with("000201"));
        assert!(p.contains("BR.GOV.BCB.PIX"));
        assert!(p.contains("chave@pix.br"));
        assert!(p.contains(&field("54", "123.45")));
        assert!(p.contains("TXID99"));

        // Trailer: tag 63, length 04, then 4 uppercase hex digits.
        let trailer = &p[p.len() - 8..];
        assert!(trailer.starts_with("6304"));
        assert!(trailer[4..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_merchant_fields_are_truncated() {
        let long_name = "A".repeat(40);
        let long_city = "B".repeat(40);
        let p = build_payload("k", &long_name, &long_city, amount(100), "T");
        assert!(p.contains(&field("59", &"A".repeat(25))));
        assert!(p.contains(&field("60", &"B".repeat(15))));
    }

    #[test]
    fn test_crc_trailer_verifies() {
        let p = build_payload("k@x.br", "N", "C", amount(5_000), "T123");
        let (body, trailer) = p.split_at(p.len() - 4);
        let expected = CRC16.checksum(body.as_bytes());
        assert_eq!(trailer, format!("{:04X}", expected));
    }
}
