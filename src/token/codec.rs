use chrono::{DateTime, Utc};

use super::error::TokenError;
use crate::domain::TokenPayload;

/// Serializes `payload` into the string rendered as the QR code.
///
/// Keys are written in declaration order, so an unchanged payload always
/// encodes to the same bytes.
pub fn encode(payload: &TokenPayload) -> Result<String, TokenError> {
    serde_json::to_string(payload).map_err(|e| TokenError::Malformed(e.to_string()))
}

/// Parses a scanned code. Unknown keys are ignored; missing required keys are not.
pub fn decode(encoded: &str) -> Result<TokenPayload, TokenError> {
    serde_json::from_str(encoded.trim()).map_err(|e| TokenError::Malformed(e.to_string()))
}

/// Rejects a token presented after its expiry time.
pub fn validate(payload: &TokenPayload, now: DateTime<Utc>) -> Result<(), TokenError> {
    if payload.is_expired_at(now) {
        return Err(TokenError::Expired { expired_at: payload.expiry_time });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderId, OrderItem, PaymentMethod};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn payload() -> TokenPayload {
        let issued_at = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        TokenPayload {
            order_id: OrderId::new(7),
            total: dec!(6.50),
            items: vec![
                OrderItem { id: 1, name: "Chicken Pie".into(), price: dec!(2.50), quantity: 2 },
                OrderItem { id: 3, name: "Coca Cola 500ml".into(), price: dec!(1.00), quantity: 1 },
            ],
            issued_at,
            expiry_time: issued_at + Duration::minutes(15),
            payment_method: PaymentMethod::Cash,
            phone_number: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let original = payload();
        assert_eq!(decode(&encode(&original).unwrap()).unwrap(), original);

        let mut with_phone = payload();
        with_phone.payment_method = PaymentMethod::MobileMoney;
        with_phone.phone_number = Some("771234567".into());
        assert_eq!(decode(&encode(&with_phone).unwrap()).unwrap(), with_phone);
    }

    #[test]
    fn test_encoding_is_stable() {
        let first = encode(&payload()).unwrap();
        let second = encode(&payload().clone()).unwrap();
        assert_eq!(first, second);

        let keys = ["\"orderId\"", "\"total\"", "\"items\"", "\"issuedAt\"", "\"expiryTime\"", "\"paymentMethod\""];
        let positions: Vec<usize> = keys.iter().map(|k| first.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "keys out of order: {}", first);
        assert!(first.contains("\"orderId\":\"ORD-000007\""));
        assert!(!first.contains("phoneNumber"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut value: serde_json::Value = serde_json::from_str(&encode(&payload()).unwrap()).unwrap();
        value["printerHint"] = serde_json::json!("counter-2");
        value["items"][0]["image"] = serde_json::json!("/placeholder.svg");
        assert_eq!(decode(&value.to_string()).unwrap(), payload());
    }

    #[test]
    fn test_accepts_legacy_wire_names() {
        let legacy = r#"{
            "orderId": "ORD-4821",
            "total": 6.5,
            "items": [{"id": 1, "name": "Chicken Pie", "price": 2.5, "quantity": 2, "stock": 15}],
            "timestamp": "2026-03-02T10:00:00.000Z",
            "expiryTime": "2026-03-02T11:00:00.000Z",
            "paymentMethod": "ecocash",
            "phoneNumber": "771234567"
        }"#;
        let decoded = decode(legacy).unwrap();
        assert_eq!(decoded.order_id, OrderId::new(4821));
        assert_eq!(decoded.total, dec!(6.5));
        assert_eq!(decoded.items[0].price, dec!(2.5));
        assert_eq!(decoded.payment_method, PaymentMethod::MobileMoney);
        assert_eq!(decoded.expiry_time - decoded.issued_at, Duration::minutes(60));
    }

    #[test]
    fn test_missing_required_fields_are_malformed() {
        let mut value: serde_json::Value = serde_json::from_str(&encode(&payload()).unwrap()).unwrap();
        for key in ["orderId", "items", "total"] {
            let mut broken = value.clone();
            broken.as_object_mut().unwrap().remove(key);
            assert!(matches!(decode(&broken.to_string()), Err(TokenError::Malformed(_))), "{} accepted", key);
        }
        value["orderId"] = serde_json::json!("not-an-order");
        assert!(matches!(decode(&value.to_string()), Err(TokenError::Malformed(_))));
        assert!(matches!(decode("not json"), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_validate_expiry() {
        let token = payload();
        assert!(validate(&token, token.expiry_time).is_ok());
        assert_eq!(
            validate(&token, token.expiry_time + Duration::seconds(1)),
            Err(TokenError::Expired { expired_at: token.expiry_time })
        );
    }
}
