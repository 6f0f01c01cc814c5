use crate::wire::HealthRes;
use ddx_core::DiagnosisService;

/// Health check shared by the REST API and the CLI.
///
/// The service is only constructed once the dataset has loaded, so a reachable service is a
/// healthy one; the response reports what was loaded and when.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthService;

impl HealthService {
    /// Report the loaded dataset.
    pub fn check_health(service: &DiagnosisService) -> HealthRes {
        HealthRes {
            ok: true,
            status: "healthy".into(),
            message: "DDX is alive".into(),
            diseases: service.knowledge().len(),
            symptoms: service.catalog().len(),
            loaded_at: service.loaded_at().to_rfc3339(),
        }
    }
}
