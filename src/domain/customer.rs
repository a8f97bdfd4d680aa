use serde::{Deserialize, Serialize};

/// The two customer segments the bank serves. Eligibility rules branch on
/// this exhaustively.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Personal,
    Business,
}

/// Customer attributes as resolved from the customer service.
///
/// Ephemeral: retrieved per creation request and never cached across
/// requests.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub id: String,
    pub customer_type: CustomerType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_deserializes_remote_body() {
        let body = r#"{"id": "c-42", "customerType": "BUSINESS"}"#;
        let snapshot: CustomerSnapshot = serde_json::from_str(body).unwrap();

        assert_eq!(snapshot.id, "c-42");
        assert_eq!(snapshot.customer_type, CustomerType::Business);
    }
}
