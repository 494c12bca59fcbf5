#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_default_recommendation_limits() {
        let rec = RecommendationConfig::default();
        assert_eq!(rec.default_limit, 6);
        assert!(rec.default_limit <= rec.max_limit);
        assert_eq!(rec.default_radius_km, 15.0);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 8080

            [recommendations]
            max_limit = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.recommendations.max_limit, 20);
        assert_eq!(config.recommendations.lookup_timeout_ms, 5_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_yaml_is_accepted() {
        let config = Config::from_yaml_str(
            "storage:\n  backend: postgres\n  database_url: postgres://localhost/tabletalk\n",
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = Config::from_toml_str("[storage]\nbackend = \"postgres\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_limit_above_max_rejected() {
        let config = Config::from_toml_str("[recommendations]\ndefault_limit = 60\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        assert!(Config::from_path("/nonexistent/tabletalk.toml").is_err());
    }
}
