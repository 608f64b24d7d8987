use tern::QValue;

#[test]
pub fn test_qvalue_roundtrip() {
  for value in 0..=1000u16 {
    let qvalue = QValue::from_clamped(value);
    assert_eq!(qvalue.as_u16(), value);

    let printed = qvalue.to_string();
    assert!(printed.len() >= 3);
    assert!(printed.len() <= 5);

    let parsed = QValue::parse(&printed).unwrap_or_else(|| panic!("failed to parse '{printed}'"));
    assert_eq!(parsed, qvalue, "'{printed}' parsed to {} instead of {}", parsed.as_u16(), value);
  }
}

#[test]
pub fn test_qvalue_parse() {
  assert_eq!(QValue::parse("0"), Some(QValue::ZERO));
  assert_eq!(QValue::parse("1"), Some(QValue::MAX));
  assert_eq!(QValue::parse("1.0"), Some(QValue::MAX));
  assert_eq!(QValue::parse("1.00"), Some(QValue::MAX));
  assert_eq!(QValue::parse("1.000"), Some(QValue::MAX));
  assert_eq!(QValue::parse("0.5"), Some(QValue::from_clamped(500)));
  assert_eq!(QValue::parse("0.05"), Some(QValue::from_clamped(50)));
  assert_eq!(QValue::parse("0.005"), Some(QValue::from_clamped(5)));
  assert_eq!(QValue::parse("0.999"), Some(QValue::from_clamped(999)));

  assert_eq!(QValue::parse(""), None);
  assert_eq!(QValue::parse("2"), None);
  assert_eq!(QValue::parse("0."), None);
  assert_eq!(QValue::parse("1.1"), None);
  assert_eq!(QValue::parse("1.001"), None);
  assert_eq!(QValue::parse("0.absc"), None);
  assert_eq!(QValue::parse("0.9999"), None);
  assert_eq!(QValue::parse("-0.5"), None);
}

#[test]
pub fn test_qvalue_display() {
  assert_eq!(QValue::ZERO.to_string(), "0.0");
  assert_eq!(QValue::MAX.to_string(), "1.0");
  assert_eq!(QValue::from_clamped(500).to_string(), "0.5");
  assert_eq!(QValue::from_clamped(50).to_string(), "0.05");
  assert_eq!(QValue::from_clamped(5).to_string(), "0.005");
  assert_eq!(QValue::from_clamped(123).to_string(), "0.123");
}

#[test]
pub fn test_qvalue_clamping_and_order() {
  assert_eq!(QValue::from_clamped(5000), QValue::MAX);
  assert!(QValue::from_clamped(800) > QValue::from_clamped(200));
  assert_eq!(QValue::default(), QValue::MAX);
  assert!((QValue::from_clamped(250).as_f32() - 0.25).abs() < f32::EPSILON);
}
