//! CLI integration tests for the backtest command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config) and defaults
//! - Command-line overrides and path resolution
//! - Argument parsing for every subcommand
//! - Full pipeline over CSV files on disk with the SVG chart adapter

mod common;

use clap::Parser;
use common::*;
use smacross::adapters::csv_adapter::CsvAdapter;
use smacross::adapters::file_config_adapter::FileConfigAdapter;
use smacross::adapters::svg_chart_adapter::SvgChartAdapter;
use smacross::cli::{self, Cli, Command, Overrides};
use smacross::domain::error::SmacrossError;
use smacross::domain::metrics::CagrBase;
use smacross::ports::config_port::ConfigPort;
use smacross::ports::report_port::ReportPort;
use std::fs;
use std::path::PathBuf;

const VALID_INI: &str = r#"
[backtest]
symbol = ^IXIC
start_date = 2019-01-01
end_date = 2025-01-01
initial_capital = 25000
cagr_base = first

[strategy]
fast_window = 10
slow_window = 50

[data]
csv_dir = /srv/prices

[report]
chart_path = reports/ixic.svg
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();

        assert_eq!(config.symbol, "^IXIC");
        assert_eq!(config.start_date, date(2019, 1, 1));
        assert_eq!(config.end_date, date(2025, 1, 1));
        assert_eq!(config.fast_window, 10);
        assert_eq!(config.slow_window, 50);
        assert!((config.initial_capital - 25_000.0).abs() < f64::EPSILON);
        assert_eq!(config.cagr_base, CagrBase::FirstRow);
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let ini = "[backtest]\nstart_date = 2019-01-01\nend_date = 2025-01-01\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();

        assert_eq!(config.symbol, "^IXIC");
        assert_eq!(config.fast_window, 20);
        assert_eq!(config.slow_window, 100);
        assert!((config.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(config.cagr_base, CagrBase::SecondRow);
    }

    #[test]
    fn build_backtest_config_missing_start_date() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nend_date = 2025-01-01\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigMissing { key, .. } if key == "start_date"));
    }

    #[test]
    fn build_backtest_config_bad_cagr_base() {
        let ini = "[backtest]\nstart_date = 2019-01-01\nend_date = 2025-01-01\ncagr_base = zero\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "cagr_base"));
    }

    #[test]
    fn negative_window_is_invalid_not_defaulted() {
        let ini = "[backtest]\nstart_date = 2019-01-01\nend_date = 2025-01-01\n\n[strategy]\nfast_window = -5\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "fast_window"));
    }

    #[test]
    fn zero_window_is_invalid() {
        let ini = "[backtest]\nstart_date = 2019-01-01\nend_date = 2025-01-01\n\n[strategy]\nslow_window = 0\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "slow_window"));
    }

    #[test]
    fn configured_symbol_is_trimmed() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol =   SPY  \n").unwrap();
        assert_eq!(cli::configured_symbol(&adapter), "SPY");
    }

    #[test]
    fn blank_configured_symbol_falls_back_to_default() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol =\n").unwrap();
        assert_eq!(cli::configured_symbol(&adapter), "^IXIC");

        let adapter = FileConfigAdapter::from_string("[data]\n").unwrap();
        assert_eq!(cli::configured_symbol(&adapter), "^IXIC");
    }

    /// Minimal in-memory config: the port only needs string, int and double access.
    struct MapConfig(Vec<(&'static str, &'static str, &'static str)>);

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
                .map(|(_, _, v)| v.to_string())
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    #[test]
    fn build_backtest_config_from_any_port() {
        let port = MapConfig(vec![
            ("backtest", "start_date", "2020-01-01"),
            ("backtest", "end_date", "2021-01-01"),
            ("strategy", "fast_window", "3"),
        ]);
        let config = cli::build_backtest_config(&port).unwrap();
        assert_eq!(config.fast_window, 3);
        assert_eq!(config.slow_window, 100);
        assert_eq!(config.symbol, "^IXIC");
    }

    #[test]
    fn resolves_paths_from_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::resolve_data_dir(&adapter), PathBuf::from("/srv/prices"));
        assert_eq!(
            cli::resolve_chart_path(&adapter),
            Some(PathBuf::from("reports/ixic.svg"))
        );
    }

    #[test]
    fn path_defaults() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(cli::resolve_data_dir(&adapter), PathBuf::from("data"));
        assert_eq!(cli::resolve_chart_path(&adapter), None);
    }
}

mod overrides {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = sample_config(20, 100);
        let overrides = Overrides {
            symbol: Some(" SPY ".into()),
            fast_window: Some(5),
            slow_window: Some(30),
        };
        cli::apply_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.symbol, "SPY");
        assert_eq!(config.fast_window, 5);
        assert_eq!(config.slow_window, 30);
    }

    #[test]
    fn empty_overrides_keep_config() {
        let mut config = sample_config(20, 100);
        cli::apply_overrides(&mut config, &Overrides::default()).unwrap();
        assert_eq!(config, sample_config(20, 100));
    }

    #[test]
    fn zero_window_override_rejected() {
        let mut config = sample_config(20, 100);
        let overrides = Overrides {
            slow_window: Some(0),
            ..Overrides::default()
        };
        let err = cli::apply_overrides(&mut config, &overrides).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "slow_window"));
    }

    #[test]
    fn blank_symbol_override_rejected() {
        let mut config = sample_config(20, 100);
        let overrides = Overrides {
            symbol: Some("  ".into()),
            ..Overrides::default()
        };
        assert!(cli::apply_overrides(&mut config, &overrides).is_err());
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn backtest_with_all_flags() {
        let cli = Cli::try_parse_from([
            "smacross",
            "backtest",
            "-c",
            "run.ini",
            "--symbol",
            "SPY",
            "--data-dir",
            "prices",
            "--fast",
            "5",
            "--slow",
            "30",
            "--chart",
            "out.svg",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Backtest {
                config,
                symbol,
                data_dir,
                fast,
                slow,
                chart,
                dry_run,
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(symbol.as_deref(), Some("SPY"));
                assert_eq!(data_dir, Some(PathBuf::from("prices")));
                assert_eq!(fast, Some(5));
                assert_eq!(slow, Some(30));
                assert_eq!(chart, Some(PathBuf::from("out.svg")));
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn validate_and_info() {
        let cli = Cli::try_parse_from(["smacross", "validate", "--config", "run.ini"]).unwrap();
        assert!(matches!(cli.command, Command::Validate { .. }));

        let cli = Cli::try_parse_from(["smacross", "info", "-c", "run.ini", "--symbol", "QQQ"])
            .unwrap();
        assert!(
            matches!(cli.command, Command::Info { symbol: Some(ref s), .. } if s == "QQQ")
        );
    }

    #[test]
    fn backtest_requires_config() {
        assert!(Cli::try_parse_from(["smacross", "backtest"]).is_err());
    }

    #[test]
    fn non_numeric_window_rejected() {
        assert!(Cli::try_parse_from(["smacross", "backtest", "-c", "x.ini", "--fast", "ten"]).is_err());
    }
}

mod full_pipeline_on_disk {
    use super::*;

    fn write_csv(dir: &std::path::Path, symbol: &str, closes: &[f64]) {
        let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
        for p in daily_points("2024-01-01", closes) {
            content.push_str(&format!(
                "{},{c},{c},{c},{c},{c},1000\n",
                p.date,
                c = p.close
            ));
        }
        fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
    }

    #[test]
    fn csv_to_chart() {
        let dir = tempfile::TempDir::new().unwrap();
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 20.0, 21.0, 22.0, 23.0, 24.0];
        write_csv(dir.path(), "^IXIC", &closes);

        let chart_path = dir.path().join("chart.svg");
        let data_port = CsvAdapter::new(dir.path().to_path_buf());
        let chart = SvgChartAdapter::new(chart_path.clone());
        let reports: [&dyn ReportPort; 1] = [&chart];

        let result = cli::run_backtest_pipeline(&data_port, &sample_config(2, 4), &reports).unwrap();

        assert_eq!(result.signals.len(), 10);
        assert_eq!(result.events.buys.len(), 1);
        let svg = fs::read_to_string(chart_path).unwrap();
        assert!(svg.contains("Fast MA (2d)"));
        assert!(svg.contains(r#"<polygon fill="green""#));
    }

    #[test]
    fn missing_csv_is_data_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_port = CsvAdapter::new(dir.path().to_path_buf());
        let err = cli::run_backtest_pipeline(&data_port, &sample_config(2, 4), &[]).unwrap_err();
        assert!(matches!(err, SmacrossError::Data { .. }));
    }

    #[test]
    fn csv_outside_range_is_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        write_csv(dir.path(), "^IXIC", &[1.0, 2.0, 3.0]);

        let mut config = sample_config(2, 4);
        config.start_date = date(2030, 1, 1);
        config.end_date = date(2031, 1, 1);

        let data_port = CsvAdapter::new(dir.path().to_path_buf());
        let err = cli::run_backtest_pipeline(&data_port, &config, &[]).unwrap_err();
        assert!(matches!(err, SmacrossError::NoData { .. }));
    }
}
