use datalens::{
    aggregate, build_chart, describe, dtypes, head, load, shape, tail, value_counts, AggOp,
    AggregationSpec, ChartKind, DataType, FormatHint, RoleMap, Value,
};

const SALES_CSV: &str = "\
region,product,sales,when
E,apples,10,2024-01-01
E,pears,20,2024-01-02
W,apples,30,2024-01-03
W,pears,,2024-01-04
E,apples,5,2024-01-05
";

fn sales_table() -> datalens::Table {
    load(SALES_CSV.as_bytes(), FormatHint::Csv).unwrap()
}

#[test]
fn test_upload_then_summarize() {
    let table = sales_table();
    assert_eq!(shape(&table), (5, 4));
    assert_eq!(
        dtypes(&table),
        vec![
            ("region".to_string(), DataType::Str),
            ("product".to_string(), DataType::Str),
            ("sales".to_string(), DataType::Int),
            ("when".to_string(), DataType::DateTime),
        ]
    );

    let report = describe(&table);
    assert_eq!(report.row_count, 5);
    assert_eq!(report.column_count, 4);
    assert_eq!(report.stats.len(), 1);
    assert_eq!(report.stats[0].name, "sales");
    assert_eq!(report.stats[0].count, 4);

    assert_eq!(head(&table, 2).n_rows(), 2);
    assert_eq!(tail(&table, 2).n_rows(), 2);
    assert_eq!(
        tail(&table, 1).column("region").unwrap().values()[0],
        Value::Str("E".to_string())
    );
}

#[test]
fn test_count_then_chart() {
    let table = sales_table();
    let counts = value_counts(&table, "product", 10).unwrap();
    assert_eq!(
        counts.entries,
        vec![
            (Value::Str("apples".to_string()), 3),
            (Value::Str("pears".to_string()), 2),
        ]
    );

    let result = counts.to_table().unwrap();
    let spec = build_chart(
        &result,
        ChartKind::Bar,
        RoleMap {
            x: Some("product".to_string()),
            y: Some("count".to_string()),
            ..RoleMap::default()
        },
    )
    .unwrap();
    assert_eq!(spec.kind, ChartKind::Bar);
    assert_eq!(spec.data.n_rows(), 2);

    let pie = build_chart(
        &result,
        ChartKind::Pie,
        RoleMap {
            values: Some("count".to_string()),
            names: Some("product".to_string()),
            ..RoleMap::default()
        },
    )
    .unwrap();
    assert!(pie.to_json().unwrap().contains("\"pie\""));
}

#[test]
fn test_group_then_chart() {
    let table = sales_table();
    let result = aggregate(
        &table,
        &AggregationSpec {
            keys: vec!["region".to_string()],
            target: "sales".to_string(),
            ops: vec![AggOp::Sum, AggOp::Mean, AggOp::Count],
        },
    )
    .unwrap();

    // First-seen group order: E before W.
    assert_eq!(
        result.column("region").unwrap().values(),
        &[Value::Str("E".to_string()), Value::Str("W".to_string())]
    );
    assert_eq!(
        result.column("sales_sum").unwrap().values(),
        &[Value::Int(35), Value::Int(30)]
    );

    // count covers all rows, including the missing target cell.
    let counts = result.column("sales_count").unwrap().values();
    assert_eq!(counts, &[Value::Int(3), Value::Int(2)]);
    let total: i64 = counts
        .iter()
        .filter_map(|v| match v {
            Value::Int(i) => Some(*i),
            _ => None,
        })
        .sum();
    assert_eq!(total as usize, table.n_rows());

    // mean = sum / non-missing count per group.
    assert_eq!(
        result.column("sales_mean").unwrap().values(),
        &[Value::Float(35.0 / 3.0), Value::Float(30.0)]
    );

    let spec = build_chart(
        &result,
        ChartKind::Sunburst,
        RoleMap {
            path: vec!["region".to_string()],
            values: Some("sales_sum".to_string()),
            ..RoleMap::default()
        },
    )
    .unwrap();
    assert_eq!(spec.kind, ChartKind::Sunburst);
}

#[test]
fn test_spec_worked_examples() {
    let city = load("city\nA\nB\nA\nA\nC\n".as_bytes(), FormatHint::Csv).unwrap();
    let counts = value_counts(&city, "city", 2).unwrap();
    assert_eq!(
        counts.entries,
        vec![
            (Value::Str("A".to_string()), 3),
            (Value::Str("B".to_string()), 1),
        ]
    );

    let table = load(
        "region,sales\nE,10\nE,20\nW,30\n".as_bytes(),
        FormatHint::Csv,
    )
    .unwrap();
    let result = aggregate(
        &table,
        &AggregationSpec {
            keys: vec!["region".to_string()],
            target: "sales".to_string(),
            ops: vec![AggOp::Sum, AggOp::Mean],
        },
    )
    .unwrap();
    assert_eq!(result.n_rows(), 2);
    assert_eq!(
        result.column("sales_sum").unwrap().values(),
        &[Value::Int(30), Value::Int(30)]
    );
    assert_eq!(
        result.column("sales_mean").unwrap().values(),
        &[Value::Float(15.0), Value::Float(30.0)]
    );
}

#[test]
fn test_round_trip_law_end_to_end() {
    let table = sales_table();
    let reloaded = load(table.to_csv_string().unwrap().as_bytes(), FormatHint::Csv).unwrap();
    assert_eq!(table.column_names(), reloaded.column_names());
    assert_eq!(table.dtypes(), reloaded.dtypes());
    for (a, b) in table.columns().iter().zip(reloaded.columns()) {
        assert_eq!(a.values(), b.values());
    }
}

#[test]
fn test_errors_surface_per_interaction() {
    let table = sales_table();

    assert!(value_counts(&table, "nope", 5).is_err());
    assert!(aggregate(
        &table,
        &AggregationSpec {
            keys: vec![],
            target: "sales".to_string(),
            ops: vec![AggOp::Sum],
        },
    )
    .is_err());
    assert!(build_chart(&table, ChartKind::Pie, RoleMap::default()).is_err());

    // A failed interaction leaves the table untouched for the next one.
    assert_eq!(shape(&table), (5, 4));
    assert!(value_counts(&table, "region", 5).is_ok());
}
