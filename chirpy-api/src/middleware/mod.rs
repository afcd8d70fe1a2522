/// Middleware modules for the API server
///
/// - File server hit counting

pub mod metrics;
