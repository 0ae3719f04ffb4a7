use keyspaces_estimator::config::Config;
use keyspaces_estimator::ReadConsistency;
use std::fs;
use tempfile::tempdir;

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();

        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.output, "console");

        assert_eq!(config.estimate.read_target_utilization, 0.70);
        assert_eq!(config.estimate.write_target_utilization, 0.70);
        assert!(config.estimate.point_in_time_recovery);
        assert_eq!(config.estimate.read_consistency, ReadConsistency::Strong);

        assert_eq!(config.paths.log_directory.to_str(), Some("logs"));
        assert!(config.paths.pricing_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keyspaces-estimate.toml");
        fs::write(
            &path,
            r#"
[logging]
level = "DEBUG"
format = "json"
output = "file"

[estimate]
read_target_utilization = 0.8
write_target_utilization = 0.9
point_in_time_recovery = false
read_consistency = "eventual"

[paths]
log_directory = "/var/log/keyspaces"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.logging.level, "DEBUG");
        assert_eq!(config.logging.format, "json");

        let options = config.cost_options();
        assert_eq!(options.read_target_utilization, 0.8);
        assert_eq!(options.write_target_utilization, 0.9);
        assert!(!options.point_in_time_recovery);
        assert_eq!(options.read_consistency, ReadConsistency::Eventual);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[estimate\nread_target_utilization = ").unwrap();
        assert!(Config::load_from_file(&path).is_err());
        assert!(Config::load_from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let pricing = dir.path().join("pricing.json");
        fs::write(&pricing, "{}").unwrap();

        let mut config = Config::default();
        config.estimate.read_consistency = ReadConsistency::Eventual;
        config.paths.pricing_file = Some(pricing.clone());
        config.save_to_file(&path).unwrap();

        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.paths.pricing_file, Some(pricing));
    }

    #[test]
    fn test_validation_bounds() {
        let mut config = Config::default();
        config.estimate.read_target_utilization = 1.0;
        assert!(config.validate().is_ok());

        config.estimate.read_target_utilization = -0.1;
        assert!(config.validate().is_err());

        config.estimate.read_target_utilization = f64::NAN;
        assert!(config.validate().is_err());
    }
}
