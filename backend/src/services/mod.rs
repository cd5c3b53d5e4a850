pub mod chart_service;
pub mod csv_export_service;
pub mod dashboard_service;
pub mod indicators;
pub mod market_data_service;
