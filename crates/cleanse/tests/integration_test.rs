//! End-to-end tests: raw entity tables through the cleansing engine.

use chrono::{NaiveDate, NaiveTime};

use cleanse::{
    CleanseError, CleansedTable, CleansingEngine, EngineConfig, EntityKind, SchemaPolicy, Table,
    Value,
};

fn ymd(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn approx(value: Option<&Value>, expected: f64) -> bool {
    value
        .and_then(Value::as_f64)
        .is_some_and(|v| (v - expected).abs() < 1e-6)
}

/// Every row holds a value in every column, and labels run 0..n.
fn assert_fully_cleansed(table: &CleansedTable) {
    assert!(table.table().has_dense_index(), "index is not dense");
    for column in table.columns() {
        assert_eq!(table.table().null_count(column), 0, "nulls left in '{column}'");
    }
}

// =============================================================================
// Fixtures
// =============================================================================

const USER_COLUMNS: &[&str] = &[
    "index",
    "first_name",
    "last_name",
    "date_of_birth",
    "company",
    "email_address",
    "address",
    "country",
    "country_code",
    "phone_number",
    "join_date",
    "user_uuid",
];

fn user_row<'a>(
    index: &'a str,
    dob: &'a str,
    country_code: &'a str,
    phone: &'a str,
    join_date: &'a str,
) -> Vec<&'a str> {
    vec![
        index,
        "Sigfried",
        "Noack",
        dob,
        "Heydrich Junitz KG",
        "rudi79@example.net",
        "Zimmerstr. 1/0, 59015 Gießen",
        "Germany",
        country_code,
        phone,
        join_date,
        "93caf182-e4e9-4c6e-bebb-60a1a9dcf9b8",
    ]
}

const PRODUCT_COLUMNS: &[&str] = &[
    "Unnamed: 0",
    "product_name",
    "product_price",
    "weight",
    "category",
    "EAN",
    "date_added",
    "uuid",
    "removed",
    "product_code",
];

fn product_row<'a>(
    pos: &'a str,
    name: &'a str,
    price: &'a str,
    weight: &'a str,
    date_added: &'a str,
    removed: &'a str,
) -> Vec<&'a str> {
    vec![
        pos,
        name,
        price,
        weight,
        "toys-and-games",
        "7425710935115",
        date_added,
        "83dc0a69-f96f-4c34-bcb7-928acae19a94",
        removed,
        "R7-3126933h",
    ]
}

const STORE_COLUMNS: &[&str] = &[
    "index",
    "address",
    "longitude",
    "lat",
    "locality",
    "store_code",
    "staff_numbers",
    "opening_date",
    "store_type",
    "latitude",
    "country_code",
    "continent",
];

const ORDER_COLUMNS: &[&str] = &[
    "level_0",
    "index",
    "date_uuid",
    "first_name",
    "last_name",
    "user_uuid",
    "card_number",
    "store_code",
    "product_code",
    "1",
    "product_quantity",
];

const DATE_PART_COLUMNS: &[&str] = &["timestamp", "month", "year", "day", "time_period", "date_uuid"];

const CARD_COLUMNS: &[&str] = &[
    "card_number",
    "expiry_date",
    "card_provider",
    "date_payment_confirmed",
];

// =============================================================================
// Users
// =============================================================================

#[test]
fn test_users_uk_international_number() {
    let raw = Table::from_text(
        USER_COLUMNS,
        &[user_row("0", "1968-10-16", "GB", "+44 (0)1234 567 890", "2016-10-12")],
    );

    let users = CleansingEngine::new().clean_users(raw).unwrap();

    assert_eq!(users.row_count(), 1);
    assert_eq!(users.value(0, "phone_number"), Some(&Value::text("01234567890")));
    assert_eq!(users.value(0, "join_date"), Some(&ymd(2016, 10, 12)));
    assert_eq!(users.value(0, "date_of_birth"), Some(&ymd(1968, 10, 16)));
    assert!(!users.columns().iter().any(|c| c == "index"));
    assert_fully_cleansed(&users);
}

#[test]
fn test_users_drop_invalid_rows() {
    let raw = Table::from_text(
        USER_COLUMNS,
        &[
            // Invalid German number (first significant digit 1).
            user_row("0", "1968-10-16", "DE", "+49 1234567", "2016-10-12"),
            // Sentinel null.
            user_row("1", "NULL", "GB", "01234567890", "2016-10-12"),
            // Unparseable join date.
            user_row("2", "1990-01-01", "GB", "01234567890", "GFJQ2AAEQ8"),
            // Country code typo, valid number.
            user_row("3", "July 4 1999", "GGB", "020 7946 0000", "2005 January 27"),
            // Unknown country passes through.
            user_row("4", "1980/05/06", "FR", "+33 1 23 45 67 89", "2020-01-01"),
        ],
    );

    let users = CleansingEngine::new().clean_users(raw).unwrap();

    assert_eq!(users.row_count(), 2);
    assert_eq!(users.value(0, "country_code"), Some(&Value::text("GB")));
    assert_eq!(users.value(0, "phone_number"), Some(&Value::text("02079460000")));
    assert_eq!(users.value(0, "join_date"), Some(&ymd(2005, 1, 27)));
    assert_eq!(users.value(1, "country_code"), Some(&Value::text("FR")));
    assert_eq!(users.value(1, "phone_number"), Some(&Value::text("+33123456789")));
    assert_fully_cleansed(&users);
}

// =============================================================================
// Cards
// =============================================================================

#[test]
fn test_cards_validation() {
    let raw = Table::from_text(
        CARD_COLUMNS,
        &[
            vec!["30060773296197", "09/26", "Diners Club / Carte Blanche", "2015-11-25"],
            vec!["???12345678901", "04/24", "VISA 13 digit", "2001-06-18"],
            vec!["4252720361802860", "13/22", "VISA 16 digit", "2001-06-18"],
            vec!["NULL", "NULL", "NULL", "NULL"],
            vec!["VAB9DSB8ZM", "NB71VBAHJE", "WJVMUO4QX6", "JRPRLPIBZ2"],
        ],
    );

    let (cards, report) = CleansingEngine::new()
        .clean_with_report(EntityKind::Cards, raw)
        .unwrap();

    assert_eq!(cards.row_count(), 2);
    assert_eq!(cards.value(1, "card_number"), Some(&Value::text("12345678901")));
    assert_eq!(cards.value(0, "date_payment_confirmed"), Some(&ymd(2015, 11, 25)));
    assert_eq!(report.rows_in, 5);
    assert_eq!(report.rows_out, 2);
    assert_eq!(report.rows_dropped(), 3);
    assert_eq!(cards.destination(), "dim_card_details");
    assert_fully_cleansed(&cards);
}

// =============================================================================
// Stores
// =============================================================================

#[test]
fn test_stores_cleansing() {
    let raw = Table::from_text(
        STORE_COLUMNS,
        &[
            vec![
                "0", "Flat 72W, Sally isle", "-2.3", "N/A", "High Wycombe", "HI-9B97EE4E", "J78",
                "2014-02-27", "Local", "51.62907", "GB", "eeEurope",
            ],
            vec![
                "1", "NULL", "NULL", "NULL", "NULL", "NULL", "NULL", "NULL", "NULL", "NULL",
                "NULL", "NULL",
            ],
            vec![
                "2", "Heckerstraße 4/5", "abc", "N/A", "Landshut", "LA-0772C7B9", "92",
                "October 2012 08", "Super Store", "48.52961", "DE", "Europe",
            ],
        ],
    );

    let stores = CleansingEngine::new().clean_stores(raw).unwrap();

    assert_eq!(stores.row_count(), 2);
    assert!(!stores.columns().iter().any(|c| c == "lat" || c == "index"));
    assert_eq!(stores.value(0, "staff_numbers"), Some(&Value::Integer(78)));
    assert_eq!(stores.value(0, "continent"), Some(&Value::text("Europe")));
    assert!(approx(stores.value(0, "longitude"), -2.3));
    assert_eq!(stores.value(1, "opening_date"), Some(&ymd(2012, 10, 8)));
    // Bad coordinates survive as nulls.
    assert_eq!(stores.value(1, "longitude"), Some(&Value::Null));
    assert!(stores.table().has_dense_index());
    assert_eq!(stores.table().null_count("opening_date"), 0);
}

// =============================================================================
// Products
// =============================================================================

#[test]
fn test_products_keep_latest_and_convert_weights() {
    let raw = Table::from_text(
        PRODUCT_COLUMNS,
        &[
            product_row("0", "Kettle", "£1.00", "100g", "2019-01-01", "Still_available"),
            product_row("1", "Kettle", "£2.50", "2kg", "2020-05-05", "Still_available"),
            product_row("2", "Crisps", "£3.99", "6 x 80g", "2018-01-01", "Still_available"),
            product_row("3", "Teddy", "£9.99", "500ml", "2018-01-01", "Removed"),
            product_row("4", "Mug", "£4.00", "1kg", "not a date", "Still_available"),
            product_row("5", "Lamp", "unknown", "16oz", "2017-03-03", "Still_available"),
            product_row("6", "Fork", "£0.50", "9GO5H4", "2017-03-03", "Still_available"),
        ],
    );

    let products = CleansingEngine::new().clean_products(raw).unwrap();

    assert_eq!(products.row_count(), 2);
    assert_eq!(products.value(0, "product_name"), Some(&Value::text("Kettle")));
    assert_eq!(products.value(0, "date_added"), Some(&ymd(2020, 5, 5)));
    assert!(approx(products.value(0, "weight"), 2.0));
    assert!(approx(products.value(0, "product_price"), 2.5));
    assert_eq!(products.value(1, "product_name"), Some(&Value::text("Crisps")));
    assert!(approx(products.value(1, "weight"), 0.48));
    assert!(!products.columns().iter().any(|c| c == "Unnamed: 0"));
    assert_fully_cleansed(&products);
}

#[test]
fn test_products_numeric_weights_untouched() {
    let mut raw = Table::from_text(
        PRODUCT_COLUMNS,
        &[product_row("0", "Kettle", "£1.00", "0", "2019-01-01", "Still_available")],
    );
    raw.rows[0].values[3] = Value::Float(1.25);

    let products = CleansingEngine::new().clean_products(raw).unwrap();
    assert_eq!(products.value(0, "weight"), Some(&Value::Float(1.25)));
}

// =============================================================================
// Orders
// =============================================================================

fn order_row<'a>(card: &'a str, quantity: &'a str) -> Vec<&'a str> {
    vec![
        "0",
        "0",
        "9476f17e-5d6a-4117-874d-9cdb38ca1fa6",
        "",
        "",
        "93caf182-e4e9-4c6e-bebb-60a1a9dcf9b8",
        card,
        "BL-8387506C",
        "R7-3126933h",
        "",
        quantity,
    ]
}

#[test]
fn test_orders_drop_personal_columns() {
    let mut raw = Table::from_text(
        ORDER_COLUMNS,
        &[order_row("4971858637664481", "3"), order_row("", "2")],
    );
    // Empty delimited cells arrive as nulls.
    for row in &mut raw.rows {
        for value in &mut row.values {
            if value.as_text() == Some("") {
                *value = Value::Null;
            }
        }
    }

    let orders = CleansingEngine::new().clean_orders(raw).unwrap();

    assert_eq!(
        orders.columns(),
        &["date_uuid", "user_uuid", "card_number", "store_code", "product_code", "product_quantity"]
    );
    assert_eq!(orders.row_count(), 1);
    assert_eq!(orders.value(0, "product_quantity"), Some(&Value::Integer(3)));
    assert_fully_cleansed(&orders);
}

#[test]
fn test_orders_non_integer_quantity_is_fatal() {
    let raw = Table::from_text(ORDER_COLUMNS, &[order_row("4971858637664481", "three")]);

    let err = CleansingEngine::new().clean_orders(raw).unwrap_err();
    match err {
        CleanseError::Coercion { column, value, .. } => {
            assert_eq!(column, "product_quantity");
            assert_eq!(value, "three");
        }
        other => panic!("expected coercion error, got {other}"),
    }
}

// =============================================================================
// Date parts
// =============================================================================

#[test]
fn test_date_parts_reconstruction() {
    let raw = Table::from_text(
        DATE_PART_COLUMNS,
        &[
            vec!["22:00:06", "9", "2013", "19", "Evening", "3b7ca996-37f9-433f-b6d0-ce8391b615ad"],
            vec!["10:00:00", "2", "2021", "30", "Morning", "adc86836-6c35-49ca-bb0d-65b6507a00fa"],
            vec!["NULL", "NULL", "NULL", "NULL", "NULL", "NULL"],
            vec!["17:01:16", "1PF2X", "2013", "1", "Evening", "f9b8fc0b-fdff-4d95-85d2-2e4f0e9e2bbe"],
            vec!["07:29:53", "12", "2016", "01", "Breakfast", "86e2f0f6-7c27-4f5c-b1b5-1d3d1f4f8f8a"],
        ],
    );

    let dates = CleansingEngine::new().clean_date_parts(raw).unwrap();

    assert_eq!(dates.row_count(), 2);
    assert_eq!(dates.columns(), DATE_PART_COLUMNS);
    assert_eq!(dates.value(0, "year"), Some(&Value::Integer(2013)));
    assert_eq!(dates.value(0, "month"), Some(&Value::Integer(9)));
    assert_eq!(dates.value(0, "day"), Some(&Value::Integer(19)));
    assert_eq!(
        dates.value(0, "timestamp"),
        Some(&Value::Time(NaiveTime::from_hms_opt(22, 0, 6).unwrap()))
    );
    assert_eq!(dates.value(1, "day"), Some(&Value::Integer(1)));
    assert_fully_cleansed(&dates);
}

// =============================================================================
// Schema checks
// =============================================================================

#[test]
fn test_missing_column_is_schema_error() {
    let raw = Table::from_text(&["card_number", "expiry_date"], &[vec!["30060773296197", "09/26"]]);

    let err = CleansingEngine::new().clean_cards(raw).unwrap_err();
    match err {
        CleanseError::Schema { entity, missing, .. } => {
            assert_eq!(entity, "cards");
            assert_eq!(missing, vec!["card_provider", "date_payment_confirmed"]);
        }
        other => panic!("expected schema error, got {other}"),
    }
}

#[test]
fn test_extra_columns_policy() {
    let mut columns = CARD_COLUMNS.to_vec();
    columns.push("source_page");
    let rows = vec![vec!["30060773296197", "09/26", "VISA 16 digit", "2015-11-25", "3"]];

    let strict = CleansingEngine::new().clean_cards(Table::from_text(&columns, &rows));
    assert!(matches!(strict, Err(CleanseError::Schema { .. })));

    let lenient = CleansingEngine::with_config(
        EngineConfig::default().with_schema_policy(SchemaPolicy::AllowExtra),
    );
    let cards = lenient.clean_cards(Table::from_text(&columns, &rows)).unwrap();
    assert_eq!(cards.value(0, "source_page"), Some(&Value::text("3")));
}

#[test]
fn test_every_entity_yields_dense_index_on_empty_input() {
    let engine = CleansingEngine::new();
    for kind in EntityKind::ALL {
        let raw = Table::from_text(kind.expected_columns(), &[]);
        let table = engine.clean(kind, raw).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.entity(), kind);
    }
}
