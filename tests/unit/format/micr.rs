use super::*;

#[test]
fn nine_digit_routing_is_required() {
    assert!(encode_micr("123456789", "000123456", "1001").is_ok());

    let err = encode_micr("12345", "000123456", "1001").unwrap_err();
    assert!(matches!(err, CheckForgeError::Format(_)));
    assert!(encode_micr("1234567890", "1", "1").is_err());
    assert!(encode_micr("12345678x", "1", "1").is_err());
}

#[test]
fn account_and_check_must_be_digits() {
    let err = encode_micr("123456789", "12A34", "1001").unwrap_err();
    assert!(matches!(err, CheckForgeError::Format(_)));
    assert!(encode_micr("123456789", "1234", "10-01").is_err());
    assert!(encode_micr("123456789", "", "1001").is_err());
    assert!(encode_micr("123456789", "1234", "").is_err());
}

#[test]
fn field_order_and_symbols() {
    let line = encode_micr("123456789", "000123456", "1001").unwrap();
    assert_eq!(
        line.to_string(),
        "\u{2446}123456789\u{2446} 000123456\u{2448} 1001"
    );
    assert_eq!(line.to_font_text(), "A123456789A 000123456C 1001");
    assert_eq!(line.routing(), "123456789");
    assert_eq!(line.account(), "000123456");
    assert_eq!(line.check(), "1001");
}

#[test]
fn aba_checksum() {
    assert!(routing_checksum_ok("011000015"));
    assert!(routing_checksum_ok("121000248"));
    assert!(!routing_checksum_ok("123456789"));
    assert!(!routing_checksum_ok("12345"));
}
