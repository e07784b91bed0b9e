use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use record_csv::{
    CsvOptions, CsvRendererBuilder, HeaderTranslation, LineTerminator, to_csv, to_csv_serialized,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Car {
    year: u16,
    make: String,
    model: String,
    description: Option<String>,
}

fn cars() -> Vec<Car> {
    vec![
        Car {
            year: 1948,
            make: "Porsche".to_string(),
            model: "356".to_string(),
            description: Some("Luxury sports car".to_string()),
        },
        Car {
            year: 1995,
            make: "Peugeot".to_string(),
            model: "205".to_string(),
            description: None,
        },
        Car {
            year: 2021,
            make: "Mazda".to_string(),
            model: "CX-30".to_string(),
            description: Some("SUV Compact".to_string()),
        },
    ]
}

struct Shipment {
    id: u64,
    customer: String,
    weight: f64,
    fragile: bool,
    shipped: NaiveDate,
    delivered: Option<NaiveDate>,
    scanned: DateTime<FixedOffset>,
}

record_csv::impl_record!(Shipment {
    id as "Id": u64,
    customer as "Customer": String,
    weight as "Weight": f64,
    fragile as "Fragile": bool,
    shipped as "Shipped": NaiveDate,
    delivered as "Delivered": Option<NaiveDate>,
    scanned as "Scanned": DateTime<FixedOffset>,
});

fn shipments() -> Vec<Shipment> {
    let paris = FixedOffset::east_opt(2 * 3600).unwrap();
    vec![
        Shipment {
            id: 10,
            customer: "Ann".to_string(),
            weight: 12.375,
            fragile: false,
            shipped: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            delivered: NaiveDate::from_ymd_opt(2023, 6, 3),
            scanned: paris.with_ymd_and_hms(2023, 6, 1, 8, 15, 0).unwrap(),
        },
        Shipment {
            id: 11,
            customer: "Bob".to_string(),
            weight: 0.5,
            fragile: true,
            shipped: NaiveDate::from_ymd_opt(2023, 6, 2).unwrap(),
            delivered: None,
            scanned: paris.with_ymd_and_hms(2023, 6, 2, 17, 40, 30).unwrap(),
        },
    ]
}

#[test]
fn serialized_records_read_back_with_csv_reader() {
    init_logger();

    let options = CsvOptions {
        line_terminator: LineTerminator::Lf,
        ..CsvOptions::default()
    };
    let output = to_csv_serialized(&cars(), &options).unwrap();

    assert_eq!(
        output.lines().next(),
        Some("year,make,model,description")
    );

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(output.as_bytes());
    let read: Vec<Car> = reader.deserialize().map(|record| record.unwrap()).collect();

    assert_eq!(read, cars());
}

#[test]
fn records_with_formats_read_back_with_custom_delimiter() {
    init_logger();

    let renderer = CsvRendererBuilder::new()
        .separator(";")
        .date_format("yyyy-MM-dd")
        .field_format("weight", "0.00")
        .field_format("scanned", "HH:mm zzz")
        .line_terminator(LineTerminator::CrLf)
        .build();

    let output = renderer.render(&shipments()).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(output.as_bytes());

    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<&str>>(),
        vec!["Id", "Customer", "Weight", "Fragile", "Shipped", "Delivered", "Scanned"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|record| record.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].iter().collect::<Vec<&str>>(),
        vec!["10", "Ann", "12.38", "false", "2023-06-01", "2023-06-03", "08:15 +02:00"]
    );
    assert_eq!(
        rows[1].iter().collect::<Vec<&str>>(),
        vec!["11", "Bob", "0.50", "true", "2023-06-02", "", "17:40 +02:00"]
    );
}

#[test]
fn universal_pattern_converts_timestamps_to_utc() {
    let renderer = CsvRendererBuilder::new()
        .field_format("scanned", "u")
        .ignore_field("customer")
        .ignore_field("weight")
        .ignore_field("fragile")
        .ignore_field("shipped")
        .ignore_field("delivered")
        .line_terminator(LineTerminator::Lf)
        .build();

    let output = renderer.render(&shipments()).unwrap();

    assert_eq!(
        output,
        "Id,Scanned\n10,2023-06-01 06:15:00Z\n11,2023-06-02 15:40:30Z\n"
    );
}

#[test]
fn utc_timestamps_are_records_fields_too() {
    struct Event {
        name: String,
        at: DateTime<Utc>,
    }

    record_csv::impl_record!(Event {
        name: String,
        at: DateTime<Utc>,
    });

    let events = [
        Event {
            name: "start".to_string(),
            at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        },
        Event {
            name: "never".to_string(),
            at: DateTime::<Utc>::default(),
        },
    ];

    let options = CsvOptions {
        date_format: Some("o".to_string()),
        line_terminator: LineTerminator::Lf,
        ..CsvOptions::default()
    };

    assert_eq!(
        to_csv(&events, &options).unwrap(),
        "name,at\nstart,2024-01-02T03:04:05.0000000+00:00\nnever,\n"
    );
}

#[test]
fn options_load_from_json_configuration() {
    let configuration = r#"{
        "separator": "\t",
        "ignoredFields": ["fragile", "scanned"],
        "dateFormat": "dd MMM yyyy",
        "fieldFormats": [["weight", "N1"]],
        "quotedFields": ["customer"],
        "columnTranslations": [["Id", "Number"], ["Customer", "Client"]],
        "headerTranslation": "perColumn",
        "lineTerminator": "lf"
    }"#;
    let options: CsvOptions = serde_json::from_str(configuration).unwrap();

    assert_eq!(options.header_translation, HeaderTranslation::PerColumn);

    let output = to_csv(&shipments(), &options).unwrap();

    assert_eq!(
        output,
        "Number\tClient\tWeight\tShipped\tDelivered\n\
         10\t\"Ann\"\t12.4\t01 Jun 2023\t03 Jun 2023\n\
         11\t\"Bob\"\t0.5\t02 Jun 2023\t\n"
    );
}

#[test]
fn quoted_output_reads_back_with_csv_reader() {
    let renderer = CsvRendererBuilder::new()
        .quote_all(true)
        .line_terminator(LineTerminator::Lf)
        .build();

    let cars = vec![Car {
        year: 2012,
        make: "Citroën".to_string(),
        model: "C4, Picasso".to_string(),
        description: Some("SUV".to_string()),
    }];

    let output = renderer.render_serialized(&cars).unwrap();

    let mut reader = csv::ReaderBuilder::new().from_reader(output.as_bytes());
    let read: Vec<Car> = reader.deserialize().map(|record| record.unwrap()).collect();

    assert_eq!(read, cars);
}

#[test]
fn single_serialized_record_renders_one_line() {
    let options = CsvOptions {
        suppress_header: true,
        line_terminator: LineTerminator::Lf,
        ..CsvOptions::default()
    };

    let output = to_csv_serialized(&cars()[0], &options).unwrap();

    assert_eq!(output, "1948,Porsche,356,Luxury sports car\n");
}

#[test]
fn serialized_numbers_take_numeric_formats() {
    let rows = serde_json::json!([
        { "label": "a", "ratio": 0.256, "count": 1234567 },
        { "label": "b", "ratio": 1.0, "count": -42 }
    ]);

    let renderer = CsvRendererBuilder::new()
        .field_format("ratio", "P1")
        .field_format("count", "#,##0")
        .field_format("label", "000")
        .line_terminator(LineTerminator::Lf)
        .build();

    assert_eq!(
        renderer.render_serialized(&rows).unwrap(),
        "label,ratio,count\na,25.6 %,1,234,567\nb,100.0 %,-42\n"
    );
}

#[test]
fn writer_output_matches_rendered_text() {
    let renderer = CsvRendererBuilder::new()
        .line_terminator(LineTerminator::Lf)
        .build();
    let mut buffer: Vec<u8> = Vec::new();

    renderer.render_to_writer(&shipments(), &mut buffer).unwrap();

    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        renderer.render(&shipments()).unwrap()
    );
}
