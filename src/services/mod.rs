/// Activity lifecycle and participation.
pub mod activity_service;
/// Aggregate point application with optimistic concurrency.
pub mod aggregate;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Match lifecycle, score reporting and goal recording.
pub mod match_service;
/// Canonicalisation and comparison of captains' score reports.
pub mod reconciliation;
/// Season rollover of ratings.
pub mod season_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Background storage connection supervisor.
pub mod storage_supervisor;
/// Team registry and player rating views.
pub mod team_service;
