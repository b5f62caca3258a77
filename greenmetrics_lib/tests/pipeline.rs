//! End-to-end pipeline test: catalogs on disk → mapping → join → session
//! entry and commit → results store → aggregation.

use chrono::NaiveDate;
use greenmetrics_lib::{
    count_by_category, filter_records, mean_by_category, rows_for_innovation, CatalogCache,
    CatalogPaths, MappingMethod, MetricDomain, ReportFilter, ResultsStore, Session,
};

const INNOVATIONS_CSV: &str = "\
Innovation,Description,Tags,Engagement
Smart Irrigation,Precision watering for vineyards,water; climate,Pilot farms in the Douro
Solar Pumping,Off-grid solar pumps for remote plots,energy; climate,
";

const METADATA_CSV: &str = "\
Indicators,Description,Measurement,Category
Return on Investment (ROI),Profitability of the investment,% per year,Economic
Water Saved,Volume of water saved,m3 per season,Environmental
Energy Produced,On-site renewable generation,kWh per year,Environmental
";

const REFERENCE_CSV: &str = "\
Indicators,Description,Measurement
Return on Investment (ROI),Official ROI definition,% net gain over cost
Water Saved,Official water definition,m3 measured at the meter
";

const LINKS_CSV: &str = "\
Innovation,Indicator
Smart Irrigation,Retorno do Investimento (ROI)
,Water Saved
Solar Pumping,Custo Total
";

fn write_catalogs(dir: &std::path::Path) {
    std::fs::write(dir.join("innovations.csv"), INNOVATIONS_CSV).unwrap();
    std::fs::write(dir.join("indicator_metadata.csv"), METADATA_CSV).unwrap();
    std::fs::write(dir.join("indicators_reference_114.csv"), REFERENCE_CSV).unwrap();
    std::fs::write(dir.join("innovation_indicators.csv"), LINKS_CSV).unwrap();
}

#[test]
fn full_pipeline_from_catalogs_to_report() {
    let dir = tempfile::tempdir().unwrap();
    write_catalogs(dir.path());

    let cache = CatalogCache::new();
    let bundle = cache
        .load_or_init(&CatalogPaths::from_dir(dir.path()))
        .unwrap();
    let bundle = bundle.as_ref();

    // Mapping: abbreviation tier for ROI, exact-normalized similarity for
    // Water Saved, and no mapping for the dissimilar Custo Total.
    let roi = bundle.mapping_for("Retorno do Investimento (ROI)").unwrap();
    assert_eq!(roi.method, MappingMethod::Abbrev);
    assert_eq!(
        roi.reference_label.as_deref(),
        Some("Return on Investment (ROI)")
    );

    let water = bundle.mapping_for("Water Saved").unwrap();
    assert_eq!(water.method, MappingMethod::Similar);

    let custo = bundle.mapping_for("Custo Total").unwrap();
    assert_eq!(custo.method, MappingMethod::None);
    assert_eq!(custo.reference_label, None);

    // Join: both Smart Irrigation rows carry model context; domains follow
    // the measurement text.
    let rows = rows_for_innovation(bundle, "Smart Irrigation");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].domain(), MetricDomain::Percent);
    assert_eq!(rows[1].domain(), MetricDomain::NonNeg);
    assert_eq!(
        rows[0].reference_measurement.as_deref(),
        Some("% net gain over cost")
    );

    // Entry: a failed first commit reports every problem, then corrected
    // values commit atomically.
    let mut session = Session::new("Douro pilot");
    session.record_entry(&rows[0], 0, "1.5", true);

    let err = session
        .commit(
            bundle,
            "Smart Irrigation",
            NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
        .unwrap_err();
    let problems = match err {
        greenmetrics_lib::CommitError::Incomplete(problems) => problems,
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(problems.len(), 2);

    session.record_entry(&rows[0], 0, "0.25", true);
    session.record_entry(&rows[1], 1, "120,5", false);
    let records = session
        .commit(
            bundle,
            "Smart Irrigation",
            NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].normalized_value, 25.0);
    assert_eq!(records[1].normalized_value, 120.5);

    // Store: append twice, load the combined set back.
    let store = ResultsStore::new(dir.path().join("results.csv"));
    store.append(&records).unwrap();
    let mut more = records.clone();
    more[0].project = "Second project".to_string();
    more.truncate(1);
    more[0].normalized_value = 75.0;
    store.append(&more).unwrap();

    let all = store.load().unwrap();
    assert_eq!(all.len(), 3);

    // Report: filter by project, then aggregate by category.
    let douro = filter_records(
        &all,
        &ReportFilter {
            project: Some("Douro pilot".to_string()),
            innovation: None,
        },
    );
    assert_eq!(douro.len(), 2);

    let everything = filter_records(&all, &ReportFilter::default());
    let means = mean_by_category(&everything);
    let economic = means.iter().find(|m| m.category == "Economic").unwrap();
    assert_eq!(economic.mean, 50.0); // (25 + 75) / 2
    let environmental = means
        .iter()
        .find(|m| m.category == "Environmental")
        .unwrap();
    assert_eq!(environmental.mean, 120.5);

    let counts = count_by_category(&everything);
    assert_eq!(
        counts
            .iter()
            .find(|c| c.category == "Economic")
            .unwrap()
            .count,
        2
    );
}
