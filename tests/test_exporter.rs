//! End-to-end runs of `SunsynkExporter` against a mocked API.

mod common;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Local, NaiveDate};
use mockito::{Matcher, Server};
use sunsynk_export::{ExportError, Granularity, SunsynkExporter};

fn start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 3, 2)
}

#[test]
fn export_resolves_plant_and_writes_both_granularities() {
    let mut server = Server::new();
    let login = common::mock_login(&mut server);
    let plants = common::mock_plants(&mut server);
    let _m1 = common::mock_energy(
        &mut server,
        "month",
        "2024-03",
        vec![common::category("Grid", "kWh", &[("2024-03", "10.0")])],
    );
    let _m2 = common::mock_energy(
        &mut server,
        "month",
        "2024-02",
        vec![
            common::category("Grid", "kWh", &[("2024-02", "10.0")]),
            // Correction entry for the same month and metric.
            common::category("Grid", "kWh", &[("2024-02", "5.5")]),
        ],
    );
    let _m3 = common::mock_energy_empty(&mut server, "month", "2024-01");
    let _d1 = common::mock_energy(
        &mut server,
        "day",
        "2024-03-02",
        vec![common::category("PV", "kW", &[("08:00", "0.4")])],
    );
    let _d2 = common::mock_energy_empty(&mut server, "day", "2024-03-01");

    let mut exporter = common::builder_for(&server).build().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.xlsx");
    exporter.export_to(&path, start()).unwrap();

    login.assert();
    plants.assert();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let monthly = workbook.worksheet_range("Monthly Data").unwrap();
    let rows: Vec<Vec<Data>> = monthly.rows().map(|r| r.to_vec()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], vec![Data::String("2024-02".into()), Data::Float(15.5)]);
    assert_eq!(rows[2], vec![Data::String("2024-03".into()), Data::Float(10.0)]);

    let daily = workbook.worksheet_range("Daily Data").unwrap();
    let rows: Vec<Vec<Data>> = daily.rows().map(|r| r.to_vec()).collect();
    assert_eq!(
        rows,
        vec![
            vec![Data::String("Date/Time".into()), Data::String("PV (kW)".into())],
            vec![Data::String("2024-03-02 08:00".into()), Data::Float(0.4)],
        ]
    );
}

#[test]
fn preconfigured_plant_and_token_skip_login_and_lookup() {
    let mut server = Server::new();
    let login = server.mock("POST", "/oauth/token").expect(0).create();
    let plants = server
        .mock("GET", "/api/v1/plants")
        .match_query(Matcher::Any)
        .expect(0)
        .create();
    let _m = common::mock_energy_empty(&mut server, "month", "2024-03");

    let mut exporter = SunsynkExporter::builder()
        .base_url(server.url())
        .bearer_token(common::TOKEN)
        .plant_id(common::PLANT_ID)
        .build()
        .unwrap();

    let payloads = exporter
        .fetch_history(Granularity::Monthly, start())
        .unwrap();
    assert!(payloads.is_empty());
    login.assert();
    plants.assert();
}

#[test]
fn bad_value_aborts_before_writing() {
    let mut server = Server::new();
    let _login = common::mock_login(&mut server);
    let _m1 = common::mock_energy(
        &mut server,
        "month",
        "2024-03",
        vec![common::category("Grid", "kWh", &[("2024-03", "abc")])],
    );
    let _m2 = common::mock_energy_empty(&mut server, "month", "2024-02");

    let mut exporter = common::builder_for(&server)
        .plant_id(common::PLANT_ID)
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.xlsx");

    let err = exporter.export_to(&path, start()).unwrap_err();
    assert!(matches!(err, ExportError::InvalidValue { ref value, .. } if value == "abc"));
    assert!(!path.exists());
}

#[test]
fn malformed_category_aborts_instead_of_exporting_a_partial_history() {
    let mut server = Server::new();
    let _login = common::mock_login(&mut server);
    let _m1 = common::mock_energy(
        &mut server,
        "month",
        "2024-03",
        vec![common::category("Grid", "kWh", &[("2024-03", "1.0")])],
    );
    let _m2 = common::mock_energy(
        &mut server,
        "month",
        "2024-02",
        vec![serde_json::json!({"label": "Grid", "unit": "kWh", "records": [{"value": [1]}]})],
    );

    let mut exporter = common::builder_for(&server)
        .plant_id(common::PLANT_ID)
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.xlsx");

    let err = exporter.export_to(&path, start()).unwrap_err();
    assert!(matches!(err, ExportError::Json(_)));
    assert!(!path.exists());
}

#[test]
fn rejected_login_aborts_the_run() {
    let mut server = Server::new();
    let _login = server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_body(r#"{"msg": "Incorrect password", "success": false}"#)
        .create();

    let mut exporter = common::builder_for(&server).build().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = exporter.run(dir.path()).unwrap_err();
    assert!(matches!(err, ExportError::Auth(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn run_names_the_file_after_the_plant() {
    let mut server = Server::new();
    let _login = common::mock_login(&mut server);
    let _plants = common::mock_plants(&mut server);
    // Everything unmatched answers 501, which ends each walk immediately.
    let this_month = Local::now().date_naive().format("%Y-%m").to_string();
    let _m = common::mock_energy(
        &mut server,
        "month",
        &this_month,
        vec![common::category("Grid", "kWh", &[("", "1")])],
    );

    let mut exporter = common::builder_for(&server).build().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = exporter.run(dir.path()).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with(&format!("solar_data_history_{}_", common::PLANT_ID)));
    assert!(name.ends_with(".xlsx"));
    assert!(path.exists());
    assert!(exporter.to_string().contains("authenticated=true"));
}

#[test]
fn builder_requires_some_way_to_authenticate() {
    let err = SunsynkExporter::builder().build().err().unwrap();
    assert!(matches!(err, ExportError::Config(_)));
}
