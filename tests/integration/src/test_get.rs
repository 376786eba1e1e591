//! Point lookups against a running DynamoDB-compatible server.

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use aws_sdk_dynamodb::types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
        ScalarAttributeType,
    };
    use bigdecimal::BigDecimal;
    use ddb_core::{FetchError, FetchRequest, NativeValue, TypeMap, fetch_item};

    use crate::{ddb_client, sdk_client, test_table_name};

    /// Helper: create a table from `(name, key type, attribute type)` triples.
    async fn create_table(
        client: &aws_sdk_dynamodb::Client,
        table_name: &str,
        keys: &[(&str, KeyType, ScalarAttributeType)],
    ) {
        let mut req = client
            .create_table()
            .table_name(table_name)
            .billing_mode(BillingMode::PayPerRequest);
        for (name, key_type, attr_type) in keys {
            req = req
                .key_schema(
                    KeySchemaElement::builder()
                        .attribute_name(*name)
                        .key_type(key_type.clone())
                        .build()
                        .unwrap(),
                )
                .attribute_definitions(
                    AttributeDefinition::builder()
                        .attribute_name(*name)
                        .attribute_type(attr_type.clone())
                        .build()
                        .unwrap(),
                );
        }
        req.send()
            .await
            .unwrap_or_else(|e| panic!("failed to create table {table_name}: {e}"));
    }

    async fn delete_table(client: &aws_sdk_dynamodb::Client, table_name: &str) {
        let _ = client.delete_table().table_name(table_name).send().await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_fetch_item_by_numeric_key() {
        let sdk = sdk_client();
        let table_name = test_table_name("numeric");
        create_table(&sdk, &table_name, &[("id", KeyType::Hash, ScalarAttributeType::N)]).await;

        sdk.put_item()
            .table_name(&table_name)
            .item("id", AttributeValue::N("42".to_owned()))
            .item("total", AttributeValue::N("1234567890123456789.5".to_owned()))
            .item("name", AttributeValue::S("widget".to_owned()))
            .item("active", AttributeValue::Bool(true))
            .send()
            .await
            .unwrap();

        let record = fetch_item(
            &ddb_client(),
            &TypeMap::complete(),
            &FetchRequest::new(&table_name, "42"),
        )
        .await
        .unwrap();

        assert_eq!(record.typed_fields().next().map(|(n, _)| n), Some("id"));
        assert_eq!(record.get("id"), Some(&NativeValue::Number(BigDecimal::from(42))));
        assert_eq!(
            record.get("total").and_then(NativeValue::as_number),
            Some(&BigDecimal::from_str("1234567890123456789.5").unwrap())
        );
        assert_eq!(record.get("name").and_then(NativeValue::as_text), Some("widget"));
        assert_eq!(record.get("active"), Some(&NativeValue::Bool(true)));

        delete_table(&sdk, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_fetch_item_by_composite_key() {
        let sdk = sdk_client();
        let table_name = test_table_name("composite");
        create_table(
            &sdk,
            &table_name,
            &[
                ("device", KeyType::Hash, ScalarAttributeType::S),
                ("ts", KeyType::Range, ScalarAttributeType::N),
            ],
        )
        .await;

        for ts in ["100", "200"] {
            sdk.put_item()
                .table_name(&table_name)
                .item("device", AttributeValue::S("d1".to_owned()))
                .item("ts", AttributeValue::N(ts.to_owned()))
                .item("reading", AttributeValue::S(format!("at-{ts}")))
                .send()
                .await
                .unwrap();
        }

        let request = FetchRequest::new(&table_name, "d1").with_sort_value("200");
        let record = fetch_item(&ddb_client(), &TypeMap::complete(), &request)
            .await
            .unwrap();

        let typed: Vec<&str> = record.typed_fields().map(|(n, _)| n).collect();
        assert_eq!(typed, ["device", "ts"]);
        assert_eq!(record.get("reading").and_then(NativeValue::as_text), Some("at-200"));

        delete_table(&sdk, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_report_missing_item_as_not_found() {
        let sdk = sdk_client();
        let table_name = test_table_name("missing");
        create_table(&sdk, &table_name, &[("pk", KeyType::Hash, ScalarAttributeType::S)]).await;

        let err = fetch_item(
            &ddb_client(),
            &TypeMap::standard(),
            &FetchRequest::new(&table_name, "nobody"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));

        delete_table(&sdk, &table_name).await;
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_pass_through_service_error_for_unknown_table() {
        let err = fetch_item(
            &ddb_client(),
            &TypeMap::standard(),
            &FetchRequest::new(test_table_name("ghost"), "1"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::External(_)));
        assert!(err.to_string().contains("ResourceNotFoundException"));
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB endpoint"]
    async fn test_should_reject_partition_only_read_on_composite_table() {
        let sdk = sdk_client();
        let table_name = test_table_name("partial");
        create_table(
            &sdk,
            &table_name,
            &[
                ("pk", KeyType::Hash, ScalarAttributeType::S),
                ("sk", KeyType::Range, ScalarAttributeType::S),
            ],
        )
        .await;

        let err = fetch_item(
            &ddb_client(),
            &TypeMap::standard(),
            &FetchRequest::new(&table_name, "a"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::External(_)));

        delete_table(&sdk, &table_name).await;
    }
}
