use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_forecast::data::{aggregate, DataLoader, RawRecord};
use price_forecast::utils::DateOrder;
use price_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_aggregate_means_and_market_count() {
    let records = vec![
        RawRecord::new("2024-01-05", 100.0, 80.0, 120.0, "Lasalgaon"),
        RawRecord::new("2024-01-05", 200.0, 150.0, 250.0, "Pimpalgaon"),
        RawRecord::new("2024-01-05", 300.0, 250.0, 350.0, "Lasalgaon"),
    ];

    let table = aggregate(&records, DateOrder::MonthFirst);
    assert_eq!(table.len(), 1);

    let row = &table.rows()[0];
    assert_eq!(row.date, ymd(2024, 1, 5));
    assert_eq!(row.avg_modal_price, 200.0);
    assert_eq!(row.min_price, Some(160.0));
    assert_eq!(row.max_price, Some(240.0));
    assert_eq!(row.num_markets, 2);
}

#[test]
fn test_unparseable_dates_dropped() {
    let records = vec![
        RawRecord::new("2024-01-01", 100.0, 90.0, 110.0, "Lasalgaon"),
        RawRecord::new("not-a-date", 9999.0, 9999.0, 9999.0, "Lasalgaon"),
        RawRecord::new("", 9999.0, 9999.0, 9999.0, "Nashik"),
        RawRecord::new("2024-01-02", 110.0, 100.0, 120.0, "Nashik"),
    ];

    let table = aggregate(&records, DateOrder::MonthFirst);
    let series = table.price_series().unwrap();

    assert_eq!(series.dates(), vec![ymd(2024, 1, 1), ymd(2024, 1, 2)]);
    assert_eq!(series.values(), vec![100.0, 110.0]);
}

#[test]
fn test_output_sorted_across_formats() {
    let records = vec![
        RawRecord::new("03/01/2024", 130.0, 0.0, 0.0, "A"),
        RawRecord::new("2024-01-01", 110.0, 0.0, 0.0, "A"),
        RawRecord::new("02 Jan 2024", 120.0, 0.0, 0.0, "A"),
    ];

    // day first: 03/01/2024 is January 3rd
    let table = aggregate(&records, DateOrder::DayFirst);
    let dates: Vec<NaiveDate> = table.rows().iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]);
}

#[test]
fn test_empty_input_gives_empty_table() {
    let table = aggregate(&[], DateOrder::MonthFirst);
    assert!(table.is_empty());
    assert!(table.price_series().unwrap().is_empty());

    let only_bad = vec![RawRecord::new("??", 1.0, 1.0, 1.0, "A")];
    assert!(aggregate(&only_bad, DateOrder::MonthFirst).is_empty());
}

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "State,District,Market,Commodity,Min_Price,Max_Price,Modal_Price,Date").unwrap();
    writeln!(file, "Maharashtra,Nashik,Lasalgaon,Onion,900,1400,1200,2024-01-01").unwrap();
    writeln!(file, "Maharashtra,Nashik,Pimpalgaon,Onion,1000,1500,1300,2024-01-01").unwrap();
    writeln!(file, "Maharashtra,Pune,Pune,Onion,950,\"1,450\",1250,2024-01-02").unwrap();
    writeln!(file, "Maharashtra,Pune,Pune,Onion,950,1450,1250,31/02/2024").unwrap();

    let records = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].max_price, Some(1450.0));
    assert_eq!(records[0].market, "Lasalgaon");

    let table = DataLoader::load_daily(file.path(), DateOrder::MonthFirst).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].avg_modal_price, 1250.0);
    assert_eq!(table.rows()[0].num_markets, 2);
    assert_eq!(table.rows()[1].avg_modal_price, 1250.0);
}

#[test]
fn test_data_loader_optional_columns() {
    let csv = "date,modal_price\n2024-01-01,10\n2024-01-02,12\n";
    let records = DataLoader::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].min_price, None);
    assert_eq!(records[0].market, "");

    let table = aggregate(&records, DateOrder::MonthFirst);
    assert_eq!(table.rows()[1].num_markets, 0);
    assert_eq!(table.rows()[1].max_price, None);
}

#[test]
fn test_data_loader_error_handling() {
    let result = DataLoader::from_csv("nonexistent_file.csv");
    assert!(matches!(result, Err(ForecastError::DataError(_))));

    let result = DataLoader::from_reader("market,price_min\nA,1\n".as_bytes());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_daily_table_dataframe() {
    let records = vec![
        RawRecord::new("2024-01-01", 100.0, 90.0, 110.0, "A"),
        RawRecord::new("2024-01-02", 120.0, 100.0, 130.0, "B"),
    ];
    let table = aggregate(&records, DateOrder::MonthFirst);
    let df = table.to_dataframe().unwrap();

    assert_eq!(df.height(), 2);
    assert_eq!(
        df.get_column_names(),
        vec!["date", "avg_modal_price", "min_price", "max_price", "num_markets"]
    );
}

#[test]
fn test_negative_price_row_does_not_fail_load() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Market,Modal_Price").unwrap();
    writeln!(file, "2024-01-01,Lasalgaon,1200").unwrap();
    writeln!(file, "2024-01-01,Nashik,-500").unwrap();
    writeln!(file, "2024-01-02,Nashik,-1").unwrap();
    writeln!(file, "2024-01-03,Lasalgaon,1300").unwrap();

    let table = DataLoader::load_daily(file.path(), DateOrder::MonthFirst).unwrap();
    let series = table.price_series().unwrap();
    assert_eq!(series.dates(), vec![ymd(2024, 1, 1), ymd(2024, 1, 3)]);
    assert_eq!(series.values(), vec![1200.0, 1300.0]);
}

#[test]
fn test_modal_price_column_wins_over_generic_price() {
    let csv = "Price,Date,Modal_Price,Market\n1,2024-01-01,1500,Lasalgaon\n";
    let records = DataLoader::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(records[0].modal_price, Some(1500.0));
    assert_eq!(records[0].market, "Lasalgaon");
}
