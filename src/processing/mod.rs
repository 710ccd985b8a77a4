//! Analytics pipeline: input resolution, analytic dispatch, and search index persistence.

mod mappers;
mod service;
pub mod types;

pub use service::{AnalyticsApi, AnalyticsService};
pub use types::{
    AnalyticsResponse, AnonymizeRequest, ClusteringRequest, DocumentInput, DocumentsRequest,
    IndexDocumentRequest, IngestOutcome, IngestRequest, KeywordsRequest, ProcessingError,
    ServiceCapabilities, StatisticsRequest, SummarizeRequest, SummaryStrategy, TableInput,
    TrendRequest,
};
